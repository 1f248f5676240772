// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::calls::{GlBufferTarget, GlCall, GlFramebufferTarget, GlTextureTarget};
use super::context::GlContext;
use super::conversions::IntoGl;
use super::renderer::{apply_pipeline_state, specify_vertex_attributes, GlRenderer, GlTargets};
use super::resources::{destroy_native, GlLocation, GlResource};
use prism_core::renderer::binding::{
    bind_sampler_state, check_range_type, validate_descriptor_table, SamplerTable,
};
use prism_core::renderer::emulation::{
    emulated_draw_records, plan_emulated_draws, DrawRecord, NativeDraw,
};
use prism_core::renderer::render_target::ActiveRenderTarget;
use prism_core::renderer::{
    write_bytes, BindingError, Capabilities, ClearFlags, CommandError, CommandExecutor,
    CommandId, DescriptorRange, DescriptorRangeType, DrawArguments, DrawIndexedArguments,
    IndexFormat, PrimitiveTopology, RenderError, ResourceError, ResourceHandle, ResourceType,
    SamplerState, ScissorRectangle, Viewport,
};

/// The native bind a descriptor table change resolves to.
#[derive(Debug)]
enum DescriptorBinding {
    UniformBlock {
        binding: u32,
        buffer: u32,
    },
    Texture {
        handle: ResourceHandle,
        unit: u32,
        target: GlTextureTarget,
        texture: u32,
        sampler: Option<(u32, SamplerState)>,
    },
}

impl<C: GlContext> GlRenderer<C> {
    fn descriptor_binding(
        &self,
        parameter_index: u32,
        resource: ResourceHandle,
        range: &DescriptorRange,
        samplers: &SamplerTable,
    ) -> Result<Option<DescriptorBinding>, RenderError> {
        let entry = self.resources.get(resource)?;
        let unit = range.base_shader_register;
        match &entry.payload {
            GlResource::Buffer(buffer) if range.range_type == DescriptorRangeType::UniformBuffer => {
                // Emulated uniform buffers are uploaded by `flush_uniforms`.
                Ok(self
                    .capabilities
                    .uniform_buffer
                    .then_some(DescriptorBinding::UniformBlock {
                        binding: parameter_index,
                        buffer: buffer.name,
                    }))
            }
            GlResource::Buffer(buffer) => Ok(buffer.texture.map(|(texture, _)| {
                DescriptorBinding::Texture {
                    handle: resource,
                    unit,
                    target: GlTextureTarget::Buffer,
                    texture,
                    sampler: None,
                }
            })),
            GlResource::Texture(texture) => {
                let sampler = range
                    .sampler_root_parameter_index
                    .and_then(|index| samplers.get(index))
                    .and_then(|handle| self.resources.get(handle).ok())
                    .and_then(|entry| match entry.payload {
                        GlResource::SamplerState { sampler, state } => Some((sampler, state)),
                        _ => None,
                    });
                Ok(Some(DescriptorBinding::Texture {
                    handle: resource,
                    unit,
                    target: texture.target,
                    texture: texture.name,
                    sampler,
                }))
            }
            _ => Ok(None),
        }
    }

    fn issue_descriptor_binding(&mut self, binding: DescriptorBinding) {
        match binding {
            DescriptorBinding::UniformBlock { binding, buffer } => {
                self.context.issue(GlCall::BindBufferBase {
                    target: GlBufferTarget::Uniform,
                    index: binding,
                    buffer,
                })
            }
            DescriptorBinding::Texture {
                handle,
                unit,
                target,
                texture,
                sampler,
            } => {
                self.context.issue(GlCall::ActiveTexture { unit });
                self.context.issue(GlCall::BindTexture { target, texture });
                self.texture_units.activate(unit);
                self.texture_units.bind(target, handle);
                match sampler {
                    Some((sampler, _)) if self.capabilities.sampler_objects => {
                        self.context.issue(GlCall::BindSampler { unit, sampler })
                    }
                    Some((_, state)) => self.context.issue(GlCall::TexParameters {
                        target,
                        sampler: state,
                    }),
                    None => {}
                }
            }
        }
    }

    /// Uploads the emulated uniform buffers of the descriptor tables to the bound
    /// program. Stays dirty until a pipeline is bound.
    fn flush_uniforms(&mut self) {
        if self.capabilities.uniform_buffer || !self.uniforms_dirty {
            return;
        }
        let Some(pipeline) = self.bound_pipeline() else {
            return;
        };
        let Ok(GlResource::Program { bindings, .. }) = self
            .resources
            .get(pipeline.program)
            .map(|entry| &entry.payload)
        else {
            return;
        };

        let mut uploads = Vec::new();
        for (parameter_index, slot) in self.descriptor_tables.iter().enumerate() {
            let Some(buffer) = slot
                .get()
                .and_then(|handle| self.resources.get(handle).ok())
                .and_then(|entry| entry.payload.as_buffer())
                .filter(|buffer| buffer.target == GlBufferTarget::Uniform)
            else {
                continue;
            };
            match bindings.location(parameter_index as u32) {
                Some(GlLocation::Uniform { location }) => uploads.push(GlCall::Uniform4fv {
                    location,
                    data: uniform_vectors(&buffer.contents),
                }),
                _ => log::debug!(
                    "{}: root parameter {parameter_index} is not used by the bound program",
                    self.backend_name
                ),
            }
        }
        for upload in uploads {
            self.context.issue(upload);
        }
        self.uniforms_dirty = false;
    }

    /// Reads records out of an indirect buffer together with its buffer name.
    fn indirect_records<A: DrawRecord>(
        &self,
        indirect_buffer: ResourceHandle,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) -> Result<(u32, Vec<A>), RenderError> {
        let entry = self
            .resources
            .validate(indirect_buffer, &[ResourceType::IndirectBuffer])?;
        let buffer = entry.payload.as_buffer().ok_or(ResourceError::NotFound {
            handle: indirect_buffer,
        })?;
        let records =
            emulated_draw_records(&buffer.contents, indirect_buffer_offset, number_of_draws)?;
        Ok((buffer.name, records))
    }

    fn bound_index_format(&self) -> Result<IndexFormat, RenderError> {
        self.bound_vertex_array()
            .and_then(|vertex_array| vertex_array.index)
            .map(|(_, format)| format)
            .ok_or_else(|| BindingError::NoIndexBuffer.into())
    }

    fn uses_native_indirect(&self, buffer: u32) -> bool {
        self.capabilities.native_indirect_draw && buffer != 0
    }

    fn issue_draws(&mut self, draws: Vec<(DrawArguments, NativeDraw)>) {
        self.flush_uniforms();
        let mode = self.primitive_topology.into_gl();
        for (record, draw) in draws {
            let first = record.start_vertex_location;
            let count = record.vertex_count_per_instance;
            let instances = record.instance_count;
            self.context.issue(if draw.base_instance {
                GlCall::DrawArraysInstancedBaseInstance {
                    mode,
                    first,
                    count,
                    instances,
                    base_instance: record.start_instance_location,
                }
            } else if draw.instanced {
                GlCall::DrawArraysInstanced {
                    mode,
                    first,
                    count,
                    instances,
                }
            } else {
                GlCall::DrawArrays { mode, first, count }
            });
        }
    }

    fn issue_indexed_draws(
        &mut self,
        draws: Vec<(DrawIndexedArguments, NativeDraw)>,
        index_format: IndexFormat,
    ) {
        self.flush_uniforms();
        let mode = self.primitive_topology.into_gl();
        let index_type = index_format.into_gl();
        for (record, draw) in draws {
            let count = record.index_count_per_instance;
            let offset = record.start_index_location as u64 * index_format.size() as u64;
            let instances = record.instance_count;
            let base_vertex = record.base_vertex_location;
            self.context.issue(if draw.base_instance {
                GlCall::DrawElementsInstancedBaseVertexBaseInstance {
                    mode,
                    count,
                    index_type,
                    offset,
                    instances,
                    base_vertex,
                    base_instance: record.start_instance_location,
                }
            } else if draw.instanced && draw.base_vertex {
                GlCall::DrawElementsInstancedBaseVertex {
                    mode,
                    count,
                    index_type,
                    offset,
                    instances,
                    base_vertex,
                }
            } else if draw.instanced {
                GlCall::DrawElementsInstanced {
                    mode,
                    count,
                    index_type,
                    offset,
                    instances,
                }
            } else if draw.base_vertex {
                GlCall::DrawElementsBaseVertex {
                    mode,
                    count,
                    index_type,
                    offset,
                    base_vertex,
                }
            } else {
                GlCall::DrawElements {
                    mode,
                    count,
                    index_type,
                    offset,
                }
            });
        }
    }

    fn debug_output(&self) -> bool {
        self.settings.debug_markers && self.capabilities.debug_markers
    }
}

impl<C: GlContext> CommandExecutor for GlRenderer<C> {
    fn backend_name(&self) -> &'static str {
        self.backend_name
    }

    fn copy_resource_data(
        &mut self,
        resource: ResourceHandle,
        offset: u32,
        data: &[u8],
    ) -> Result<(), RenderError> {
        self.ready()?;
        let buffer = self
            .resources
            .validate_mut(resource, &ResourceType::BUFFERS)?
            .payload
            .as_buffer_mut()
            .ok_or(ResourceError::NotMappable { handle: resource })?;
        if buffer.mapped.is_some() {
            return Err(ResourceError::AlreadyMapped { handle: resource }.into());
        }
        write_bytes(&mut buffer.contents, offset as u64, data)?;
        let (target, name) = (buffer.target, buffer.name);
        if name == 0 {
            self.uniforms_dirty |= target == GlBufferTarget::Uniform;
            return Ok(());
        }
        self.write_buffer(
            target,
            name,
            GlCall::BufferSubData {
                target,
                offset,
                data: data.to_vec(),
            },
        );
        Ok(())
    }

    fn set_graphics_root_signature(
        &mut self,
        root_signature: Option<ResourceHandle>,
    ) -> Result<(), RenderError> {
        self.ready()?;
        let number_of_parameters = match root_signature {
            Some(handle) => match &self
                .resources
                .validate(handle, &[ResourceType::RootSignature])?
                .payload
            {
                GlResource::RootSignature { descriptor, .. } => descriptor.len(),
                _ => 0,
            },
            None => 0,
        };
        if self
            .root_signature
            .set(&mut self.resources, root_signature, |base, payload| {
                destroy_native(&mut self.context, base, payload)
            })?
        {
            self.reset_descriptor_tables(number_of_parameters);
            self.uniforms_dirty = true;
        }
        Ok(())
    }

    fn set_graphics_root_descriptor_table(
        &mut self,
        root_parameter_index: u32,
        resource: Option<ResourceHandle>,
    ) -> Result<(), RenderError> {
        self.ready()?;
        let signature = self
            .root_signature
            .get()
            .ok_or(BindingError::RootSignatureNotSet)?;
        let (range_type, binding) = {
            let GlResource::RootSignature {
                descriptor,
                samplers,
            } = &self.resources.get(signature)?.payload
            else {
                return Err(BindingError::RootSignatureNotSet.into());
            };
            let range = validate_descriptor_table(
                descriptor,
                root_parameter_index,
                &self.capabilities,
                self.backend_name,
            )?;
            let binding = match resource {
                Some(resource) => {
                    check_range_type(
                        root_parameter_index,
                        range,
                        self.resources.resource_type(resource)?,
                    )?;
                    self.descriptor_binding(root_parameter_index, resource, range, samplers)?
                }
                None => None,
            };
            (range.range_type, binding)
        };

        if range_type == DescriptorRangeType::Sampler {
            bind_sampler_state(
                &mut self.resources,
                signature,
                root_parameter_index,
                resource,
                |payload| match payload {
                    GlResource::RootSignature { samplers, .. } => Some(samplers),
                    _ => None,
                },
                |base, payload| destroy_native(&mut self.context, base, payload),
            )?;
            return Ok(());
        }

        if let Some(slot) = self.descriptor_tables.get_mut(root_parameter_index as usize) {
            let changed = slot.set(&mut self.resources, resource, |base, payload| {
                destroy_native(&mut self.context, base, payload)
            })?;
            self.uniforms_dirty |= changed && range_type == DescriptorRangeType::UniformBuffer;
        }
        if let Some(binding) = binding {
            self.issue_descriptor_binding(binding);
        }
        Ok(())
    }

    fn set_graphics_pipeline_state(
        &mut self,
        pipeline_state: Option<ResourceHandle>,
    ) -> Result<(), RenderError> {
        self.ready()?;
        if let Some(handle) = pipeline_state {
            self.resources
                .validate(handle, &[ResourceType::PipelineState])?;
        }
        let changed = self
            .pipeline_state
            .set(&mut self.resources, pipeline_state, |base, payload| {
                destroy_native(&mut self.context, base, payload)
            })?;
        if !changed {
            return Ok(());
        }
        self.uniforms_dirty = true;
        match pipeline_state {
            Some(handle) => {
                if let GlResource::PipelineState(pipeline) = &self.resources.get(handle)?.payload {
                    apply_pipeline_state(&mut self.context, &self.capabilities, pipeline);
                }
            }
            None => self.context.issue(GlCall::UseProgram { program: 0 }),
        }
        Ok(())
    }

    fn set_graphics_vertex_array(
        &mut self,
        vertex_array: Option<ResourceHandle>,
    ) -> Result<(), RenderError> {
        self.ready()?;
        if let Some(handle) = vertex_array {
            self.resources.validate(handle, &[ResourceType::VertexArray])?;
        }
        let changed = self
            .vertex_array
            .set(&mut self.resources, vertex_array, |base, payload| {
                destroy_native(&mut self.context, base, payload)
            })?;
        if !changed {
            return Ok(());
        }
        match vertex_array {
            Some(handle) => {
                if let GlResource::VertexArray(vertex_array) = &self.resources.get(handle)?.payload
                {
                    if vertex_array.vertex_array != 0 {
                        self.context.issue(GlCall::BindVertexArray {
                            vertex_array: vertex_array.vertex_array,
                        });
                    } else {
                        self.enabled_vertex_attributes = specify_vertex_attributes(
                            &mut self.context,
                            vertex_array,
                            self.enabled_vertex_attributes,
                        );
                    }
                }
            }
            None if self.capabilities.vertex_array_objects => {
                self.context
                    .issue(GlCall::BindVertexArray { vertex_array: 0 })
            }
            None => {
                for index in 0..std::mem::take(&mut self.enabled_vertex_attributes) {
                    self.context
                        .issue(GlCall::DisableVertexAttribArray { index });
                }
            }
        }
        Ok(())
    }

    fn set_graphics_primitive_topology(
        &mut self,
        primitive_topology: PrimitiveTopology,
    ) -> Result<(), RenderError> {
        self.ready()?;
        if primitive_topology == PrimitiveTopology::PatchList {
            Capabilities::require(
                self.capabilities.tessellation_shaders,
                "patch list topology",
                self.backend_name,
            )?;
        }
        self.primitive_topology = primitive_topology;
        Ok(())
    }

    fn set_graphics_viewports(&mut self, viewports: &[Viewport]) -> Result<(), RenderError> {
        self.ready()?;
        let maximum = self.capabilities.maximum_number_of_viewports as usize;
        if viewports.len() > maximum {
            log::warn!(
                "{}: {} viewports given, only the first {maximum} are used",
                self.backend_name,
                viewports.len()
            );
        }
        let height = self.flip_height();
        let top = |viewport: &Viewport| match height {
            Some(height) => height - (viewport.top_left_y + viewport.height),
            None => viewport.top_left_y,
        };

        if maximum > 1 && viewports.len() > 1 {
            for (index, viewport) in viewports.iter().take(maximum).enumerate() {
                let index = index as u32;
                self.context.issue(GlCall::ViewportIndexed {
                    index,
                    x: viewport.top_left_x,
                    y: top(viewport),
                    width: viewport.width,
                    height: viewport.height,
                });
                self.context.issue(GlCall::DepthRangeIndexed {
                    index,
                    near: viewport.min_depth,
                    far: viewport.max_depth,
                });
            }
        } else if let Some(viewport) = viewports.first() {
            self.context.issue(GlCall::Viewport {
                x: viewport.top_left_x as i32,
                y: top(viewport) as i32,
                width: viewport.width as i32,
                height: viewport.height as i32,
            });
            self.context.issue(GlCall::DepthRange {
                near: viewport.min_depth,
                far: viewport.max_depth,
            });
        }
        Ok(())
    }

    fn set_graphics_scissor_rectangles(
        &mut self,
        scissor_rectangles: &[ScissorRectangle],
    ) -> Result<(), RenderError> {
        self.ready()?;
        let maximum = self.capabilities.maximum_number_of_viewports as usize;
        if scissor_rectangles.len() > maximum {
            log::warn!(
                "{}: {} scissor rectangles given, only the first {maximum} are used",
                self.backend_name,
                scissor_rectangles.len()
            );
        }
        let height = self.flip_height().map(|height| height as i32);
        let native = |rectangle: &ScissorRectangle| {
            let y = match height {
                Some(height) => height.checked_sub(rectangle.bottom_right_y)?,
                None => rectangle.top_left_y,
            };
            Some((
                rectangle.top_left_x,
                y,
                rectangle.bottom_right_x.checked_sub(rectangle.top_left_x)?,
                rectangle.bottom_right_y.checked_sub(rectangle.top_left_y)?,
            ))
        };
        let rectangles = scissor_rectangles
            .iter()
            .take(maximum.max(1))
            .map(native)
            .collect::<Option<Vec<_>>>()
            .ok_or(CommandError::InvalidArgument {
                command: CommandId::SetGraphicsScissorRectangles,
                details: "scissor rectangle extent overflows",
            })?;

        if rectangles.len() > 1 {
            for (index, &(x, y, width, height)) in rectangles.iter().enumerate() {
                self.context.issue(GlCall::ScissorIndexed {
                    index: index as u32,
                    x,
                    y,
                    width,
                    height,
                });
            }
        } else if let Some(&(x, y, width, height)) = rectangles.first() {
            self.context.issue(GlCall::Scissor {
                x,
                y,
                width,
                height,
            });
        }
        Ok(())
    }

    fn set_render_target(
        &mut self,
        render_target: Option<ResourceHandle>,
    ) -> Result<(), RenderError> {
        self.ready()?;
        let next = match render_target {
            Some(handle) => {
                let entry = self
                    .resources
                    .validate(handle, &ResourceType::RENDER_TARGETS)?;
                let generate_mipmaps = matches!(
                    &entry.payload,
                    GlResource::Framebuffer { layout, .. } if layout.generate_mipmaps
                );
                ActiveRenderTarget::new(handle, entry.base.resource_type, generate_mipmaps)
            }
            None => None,
        };
        let mut targets = GlTargets {
            context: &mut self.context,
            texture_units: &self.texture_units,
        };
        self.render_target
            .set(&mut self.resources, &mut targets, next)?;
        Ok(())
    }

    fn clear(
        &mut self,
        flags: ClearFlags,
        color: [f32; 4],
        z: f32,
        stencil: u32,
    ) -> Result<(), RenderError> {
        self.ready()?;
        if flags.contains(ClearFlags::COLOR) {
            self.context.issue(GlCall::ClearColor(color));
        }
        if flags.contains(ClearFlags::DEPTH) {
            self.context.issue(GlCall::ClearDepth(z));
        }
        if flags.contains(ClearFlags::STENCIL) {
            self.context.issue(GlCall::ClearStencil(stencil as i32));
        }
        // A disabled depth mask also masks depth clears.
        let unmask_depth = flags.contains(ClearFlags::DEPTH)
            && self
                .bound_pipeline()
                .is_some_and(|pipeline| !pipeline.depth_stencil.depth_write_enabled);
        if unmask_depth {
            self.context.issue(GlCall::DepthMask(true));
        }
        self.context.issue(GlCall::Clear(flags));
        if unmask_depth {
            self.context.issue(GlCall::DepthMask(false));
        }
        Ok(())
    }

    fn resolve_multisample_framebuffer(
        &mut self,
        destination_render_target: ResourceHandle,
        source_multisample_framebuffer: ResourceHandle,
    ) -> Result<(), RenderError> {
        self.ready()?;
        Capabilities::require(
            self.capabilities.multisample_resolve,
            "multisample resolve",
            self.backend_name,
        )?;
        let (source, source_width, source_height) = match &self
            .resources
            .validate(source_multisample_framebuffer, &[ResourceType::Framebuffer])?
            .payload
        {
            GlResource::Framebuffer {
                framebuffer,
                layout,
            } => (*framebuffer, layout.width, layout.height),
            _ => {
                return Err(ResourceError::NotFound {
                    handle: source_multisample_framebuffer,
                }
                .into())
            }
        };
        let (destination, destination_width, destination_height) = match &self
            .resources
            .validate(destination_render_target, &ResourceType::RENDER_TARGETS)?
            .payload
        {
            GlResource::SwapChain { width, height, .. } => (0, *width, *height),
            GlResource::Framebuffer {
                framebuffer,
                layout,
            } => (*framebuffer, layout.width, layout.height),
            _ => {
                return Err(ResourceError::NotFound {
                    handle: destination_render_target,
                }
                .into())
            }
        };

        let current = self.active_framebuffer_name();
        self.context.issue(GlCall::BindFramebuffer {
            target: GlFramebufferTarget::Read,
            framebuffer: source,
        });
        self.context.issue(GlCall::BindFramebuffer {
            target: GlFramebufferTarget::Draw,
            framebuffer: destination,
        });
        self.context.issue(GlCall::BlitFramebuffer {
            source: [0, 0, source_width as i32, source_height as i32],
            destination: [0, 0, destination_width as i32, destination_height as i32],
        });
        self.context.issue(GlCall::BindFramebuffer {
            target: GlFramebufferTarget::Framebuffer,
            framebuffer: current,
        });
        Ok(())
    }

    fn copy_resource(
        &mut self,
        destination_resource: ResourceHandle,
        source_resource: ResourceHandle,
    ) -> Result<(), RenderError> {
        self.ready()?;
        Capabilities::require(
            self.capabilities.copy_resource,
            "resource copies",
            self.backend_name,
        )?;
        let texture = |handle| -> Result<_, RenderError> {
            match &self
                .resources
                .validate(handle, &ResourceType::TEXTURES)?
                .payload
            {
                GlResource::Texture(texture) => {
                    Ok((texture.name, texture.target, texture.dimension.extent()))
                }
                _ => Err(ResourceError::NotFound { handle }.into()),
            }
        };
        let (destination, destination_target, destination_extent) = texture(destination_resource)?;
        let (source, source_target, source_extent) = texture(source_resource)?;
        if destination_extent != source_extent {
            return Err(ResourceError::InvalidDescription(format!(
                "cannot copy a {source_extent:?} texture into a {destination_extent:?} texture"
            ))
            .into());
        }
        let (width, height, depth) = source_extent;
        self.context.issue(GlCall::CopyImageSubData {
            source,
            source_target,
            destination,
            destination_target,
            width,
            height,
            depth,
        });
        Ok(())
    }

    fn draw_indirect(
        &mut self,
        indirect_buffer: ResourceHandle,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) -> Result<(), RenderError> {
        self.ready()?;
        let (buffer, records) = self.indirect_records::<DrawArguments>(
            indirect_buffer,
            indirect_buffer_offset,
            number_of_draws,
        )?;
        if self.uses_native_indirect(buffer) {
            self.flush_uniforms();
            let mode = self.primitive_topology.into_gl();
            self.context.issue(GlCall::BindBuffer {
                target: GlBufferTarget::DrawIndirect,
                buffer,
            });
            for index in 0..number_of_draws {
                self.context.issue(GlCall::DrawArraysIndirect {
                    mode,
                    offset: indirect_buffer_offset + index * DrawArguments::SIZE_BYTES as u32,
                });
            }
            return Ok(());
        }
        let draws = plan_emulated_draws(records, &self.capabilities, self.backend_name)?;
        self.issue_draws(draws);
        Ok(())
    }

    fn draw_indexed_indirect(
        &mut self,
        indirect_buffer: ResourceHandle,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) -> Result<(), RenderError> {
        self.ready()?;
        let index_format = self.bound_index_format()?;
        let (buffer, records) = self.indirect_records::<DrawIndexedArguments>(
            indirect_buffer,
            indirect_buffer_offset,
            number_of_draws,
        )?;
        if self.uses_native_indirect(buffer) {
            self.flush_uniforms();
            let mode = self.primitive_topology.into_gl();
            let index_type = index_format.into_gl();
            self.context.issue(GlCall::BindBuffer {
                target: GlBufferTarget::DrawIndirect,
                buffer,
            });
            for index in 0..number_of_draws {
                self.context.issue(GlCall::DrawElementsIndirect {
                    mode,
                    index_type,
                    offset: indirect_buffer_offset
                        + index * DrawIndexedArguments::SIZE_BYTES as u32,
                });
            }
            return Ok(());
        }
        let draws = plan_emulated_draws(records, &self.capabilities, self.backend_name)?;
        self.issue_indexed_draws(draws, index_format);
        Ok(())
    }

    fn draw_emulated(
        &mut self,
        emulation_data: &[u8],
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) -> Result<(), RenderError> {
        self.ready()?;
        let records = emulated_draw_records::<DrawArguments>(
            emulation_data,
            indirect_buffer_offset,
            number_of_draws,
        )?;
        let draws = plan_emulated_draws(records, &self.capabilities, self.backend_name)?;
        self.issue_draws(draws);
        Ok(())
    }

    fn draw_indexed_emulated(
        &mut self,
        emulation_data: &[u8],
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) -> Result<(), RenderError> {
        self.ready()?;
        let index_format = self.bound_index_format()?;
        let records = emulated_draw_records::<DrawIndexedArguments>(
            emulation_data,
            indirect_buffer_offset,
            number_of_draws,
        )?;
        let draws = plan_emulated_draws(records, &self.capabilities, self.backend_name)?;
        self.issue_indexed_draws(draws, index_format);
        Ok(())
    }

    fn set_debug_marker(&mut self, name: &str) -> Result<(), RenderError> {
        self.ready()?;
        if self.debug_output() {
            self.context.issue(GlCall::DebugMessageInsert {
                message: name.to_string(),
            });
        }
        Ok(())
    }

    fn begin_debug_event(&mut self, name: &str) -> Result<(), RenderError> {
        self.ready()?;
        if !self.settings.debug_markers {
            return Ok(());
        }
        self.open_debug_events += 1;
        if self.debug_output() {
            self.context.issue(GlCall::PushDebugGroup {
                message: name.to_string(),
            });
        }
        Ok(())
    }

    fn end_debug_event(&mut self) -> Result<(), RenderError> {
        self.ready()?;
        if !self.settings.debug_markers {
            return Ok(());
        }
        self.open_debug_events = self.open_debug_events.checked_sub(1).ok_or(
            CommandError::InvalidArgument {
                command: CommandId::EndDebugEvent,
                details: "no debug event is open",
            },
        )?;
        if self.debug_output() {
            self.context.issue(GlCall::PopDebugGroup);
        }
        Ok(())
    }
}

/// Reinterprets shadow bytes as `f32`s padded to whole `vec4`s.
fn uniform_vectors(contents: &[u8]) -> Vec<f32> {
    let mut data: Vec<f32> = contents
        .chunks(4)
        .map(|chunk| {
            let mut bytes = [0u8; 4];
            bytes[..chunk.len()].copy_from_slice(chunk);
            f32::from_ne_bytes(bytes)
        })
        .collect();
    data.resize(data.len().div_ceil(4) * 4, 0.0);
    data
}
