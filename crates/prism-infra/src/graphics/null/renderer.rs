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

use super::resources::NullResource;
use prism_core::renderer::binding::{
    bind_sampler_state, check_range_type, validate_descriptor_table, SamplerTable,
};
use prism_core::renderer::emulation::{emulated_draw_records, plan_emulated_draws, DrawRecord};
use prism_core::renderer::program::{validate_program, validate_shader};
use prism_core::renderer::render_target::{
    ActiveRenderTarget, FramebufferLayout, RenderTargetBackend, RenderTargetState,
};
use prism_core::renderer::resource::{BoundSlot, ResourceBase};
use prism_core::renderer::{
    write_bytes, BackendKind, BindingError, BufferDescriptor, Capabilities, CapabilityError,
    ClearFlags,
    CommandBuffer, CommandError, CommandExecutor, CommandId, DescriptorRangeType, DispatchTable,
    DrawArguments, DrawIndexedArguments, FramebufferDescriptor, IndexBufferDescriptor,
    IndirectBufferDescriptor, LeakReport, MapType, MappedSubresource, PipelineStateDescriptor,
    PrimitiveTopology, ProgramDescriptor, RenderError, Renderer, RendererId, RendererSettings,
    ResourceError, ResourceHandle, ResourceRegistry, ResourceStatistics, ResourceType,
    RootSignatureDescriptor, SamplerState, ScissorRectangle, ShaderDescriptor, SubmissionStats,
    SwapChainDescriptor, TextureBufferDescriptor, TextureDescriptor, VertexArrayDescriptor,
    Viewport,
};

const NAME: &str = BackendKind::Null.name();
const SHADER_LANGUAGE: &str = "Null";

fn destroy(base: ResourceBase, _payload: NullResource) {
    log::trace!("{NAME}: destroyed {} {:?}", base.resource_type, base.handle);
}

/// Render target changes without native work.
struct NullTargets;

impl RenderTargetBackend<NullResource> for NullTargets {
    fn bind_default_framebuffer(&mut self) {
        log::trace!("{NAME}: bind default framebuffer");
    }

    fn bind_render_target(&mut self, target: &ActiveRenderTarget, _payload: &NullResource) {
        log::trace!("{NAME}: bind {:?} {:?}", target.kind, target.handle);
    }

    fn generate_framebuffer_mipmaps(
        &mut self,
        _framebuffer: &NullResource,
        _registry: &ResourceRegistry<NullResource>,
    ) {
        log::trace!("{NAME}: generate framebuffer mipmaps");
    }

    fn destroy_resource(&mut self, base: ResourceBase, payload: NullResource) {
        destroy(base, payload);
    }
}

/// A renderer that validates everything and draws nothing.
///
/// It runs the full resource model (reference counting, ownership, the binding
/// model and capability checks) so command buffers can be checked without a GPU.
#[derive(Debug)]
pub struct NullRenderer {
    id: RendererId,
    settings: RendererSettings,
    capabilities: Capabilities,
    resources: ResourceRegistry<NullResource>,
    root_signature: BoundSlot,
    descriptor_tables: Vec<BoundSlot>,
    pipeline_state: BoundSlot,
    vertex_array: BoundSlot,
    primitive_topology: PrimitiveTopology,
    render_target: RenderTargetState,
    open_debug_events: u32,
    dispatch: DispatchTable<NullRenderer>,
}

impl NullRenderer {
    /// Creates a null renderer without any capability gap.
    pub fn new(settings: RendererSettings) -> Self {
        Self::with_capabilities(settings, Capabilities::full("Null device"))
    }

    /// Creates a null renderer reporting the given capabilities, to check command
    /// streams against the gaps of a real back end.
    pub fn with_capabilities(settings: RendererSettings, capabilities: Capabilities) -> Self {
        let id = RendererId::next();
        log::info!("{NAME} renderer {id} created ({})", capabilities.device_name);
        Self {
            id,
            settings,
            capabilities,
            resources: ResourceRegistry::new(id),
            root_signature: BoundSlot::new(),
            descriptor_tables: Vec::new(),
            pipeline_state: BoundSlot::new(),
            vertex_array: BoundSlot::new(),
            primitive_topology: PrimitiveTopology::default(),
            render_target: RenderTargetState::new(),
            open_debug_events: 0,
            dispatch: DispatchTable::new(),
        }
    }

    /// The active render target.
    pub fn active_render_target(&self) -> Option<ResourceHandle> {
        self.render_target.active().map(|target| target.handle)
    }

    /// The primitive topology of following draws.
    pub fn primitive_topology(&self) -> PrimitiveTopology {
        self.primitive_topology
    }

    fn reset_descriptor_tables(&mut self, number_of_parameters: usize) {
        for mut slot in std::mem::take(&mut self.descriptor_tables) {
            if let Err(err) = slot.set(&mut self.resources, None, destroy) {
                log::warn!("{NAME}: failed to unbind descriptor table: {err}");
            }
        }
        self.descriptor_tables = vec![BoundSlot::new(); number_of_parameters];
    }

    fn unbind_all(&mut self) {
        if let Err(err) = self
            .render_target
            .set(&mut self.resources, &mut NullTargets, None)
        {
            log::warn!("{NAME}: failed to unbind the render target: {err}");
        }
        self.reset_descriptor_tables(0);
        for slot in [
            &mut self.pipeline_state,
            &mut self.vertex_array,
            &mut self.root_signature,
        ] {
            if let Err(err) = slot.set(&mut self.resources, None, destroy) {
                log::warn!("{NAME}: failed to unbind state: {err}");
            }
        }
    }

    fn insert(
        &mut self,
        resource_type: ResourceType,
        payload: NullResource,
    ) -> Result<ResourceHandle, RenderError> {
        Ok(self.resources.insert(resource_type, payload)?)
    }

    fn create_buffer(
        &mut self,
        resource_type: ResourceType,
        descriptor: &BufferDescriptor<'_>,
    ) -> Result<ResourceHandle, RenderError> {
        let contents = descriptor.initial_contents().ok_or_else(|| {
            ResourceError::InvalidDescription(format!(
                "initial data does not fit into {} bytes",
                descriptor.size
            ))
        })?;
        self.insert(
            resource_type,
            NullResource::Buffer {
                contents,
                mapped: None,
            },
        )
    }

    fn indirect_records<A: DrawRecord>(
        &self,
        indirect_buffer: ResourceHandle,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) -> Result<Vec<A>, RenderError> {
        let entry = self
            .resources
            .validate(indirect_buffer, &[ResourceType::IndirectBuffer])?;
        let NullResource::Buffer { contents, .. } = &entry.payload else {
            return Err(ResourceError::NotFound {
                handle: indirect_buffer,
            }
            .into());
        };
        Ok(emulated_draw_records(
            contents,
            indirect_buffer_offset,
            number_of_draws,
        )?)
    }

    fn require_index_buffer(&self) -> Result<(), RenderError> {
        let has_index_buffer = self
            .vertex_array
            .get()
            .and_then(|handle| self.resources.get(handle).ok())
            .is_some_and(|entry| {
                matches!(
                    entry.payload,
                    NullResource::VertexArray {
                        index_buffer: Some(_),
                        ..
                    }
                )
            });
        if has_index_buffer {
            Ok(())
        } else {
            Err(BindingError::NoIndexBuffer.into())
        }
    }

    fn draw_records<A: DrawRecord>(&self, records: Vec<A>) -> Result<(), RenderError> {
        let draws = plan_emulated_draws(records, &self.capabilities, NAME)?;
        log::trace!(
            "{NAME}: {} draws with {:?}",
            draws.len(),
            self.primitive_topology
        );
        Ok(())
    }
}

impl Drop for NullRenderer {
    fn drop(&mut self) {
        self.unbind_all();
        if self.settings.report_leaks {
            self.resources.leak_report().log(NAME);
        }
    }
}

impl CommandExecutor for NullRenderer {
    fn backend_name(&self) -> &'static str {
        NAME
    }

    fn copy_resource_data(
        &mut self,
        resource: ResourceHandle,
        offset: u32,
        data: &[u8],
    ) -> Result<(), RenderError> {
        let entry = self.resources.validate_mut(resource, &ResourceType::BUFFERS)?;
        let NullResource::Buffer { contents, mapped } = &mut entry.payload else {
            return Err(ResourceError::NotMappable { handle: resource }.into());
        };
        if mapped.is_some() {
            return Err(ResourceError::AlreadyMapped { handle: resource }.into());
        }
        write_bytes(contents, offset as u64, data)?;
        Ok(())
    }

    fn set_graphics_root_signature(
        &mut self,
        root_signature: Option<ResourceHandle>,
    ) -> Result<(), RenderError> {
        let number_of_parameters = match root_signature {
            Some(handle) => match &self
                .resources
                .validate(handle, &[ResourceType::RootSignature])?
                .payload
            {
                NullResource::RootSignature { descriptor, .. } => descriptor.len(),
                _ => 0,
            },
            None => 0,
        };
        if self
            .root_signature
            .set(&mut self.resources, root_signature, destroy)?
        {
            self.reset_descriptor_tables(number_of_parameters);
        }
        Ok(())
    }

    fn set_graphics_root_descriptor_table(
        &mut self,
        root_parameter_index: u32,
        resource: Option<ResourceHandle>,
    ) -> Result<(), RenderError> {
        let signature = self
            .root_signature
            .get()
            .ok_or(BindingError::RootSignatureNotSet)?;
        let range_type = {
            let NullResource::RootSignature { descriptor, .. } =
                &self.resources.get(signature)?.payload
            else {
                return Err(BindingError::RootSignatureNotSet.into());
            };
            let range = validate_descriptor_table(
                descriptor,
                root_parameter_index,
                &self.capabilities,
                NAME,
            )?;
            if let Some(resource) = resource {
                check_range_type(
                    root_parameter_index,
                    range,
                    self.resources.resource_type(resource)?,
                )?;
            }
            range.range_type
        };

        if range_type == DescriptorRangeType::Sampler {
            bind_sampler_state(
                &mut self.resources,
                signature,
                root_parameter_index,
                resource,
                |payload| match payload {
                    NullResource::RootSignature { samplers, .. } => Some(samplers),
                    _ => None,
                },
                destroy,
            )?;
        } else if let Some(slot) = self.descriptor_tables.get_mut(root_parameter_index as usize) {
            slot.set(&mut self.resources, resource, destroy)?;
        }
        Ok(())
    }

    fn set_graphics_pipeline_state(
        &mut self,
        pipeline_state: Option<ResourceHandle>,
    ) -> Result<(), RenderError> {
        if let Some(handle) = pipeline_state {
            self.resources
                .validate(handle, &[ResourceType::PipelineState])?;
        }
        self.pipeline_state
            .set(&mut self.resources, pipeline_state, destroy)?;
        Ok(())
    }

    fn set_graphics_vertex_array(
        &mut self,
        vertex_array: Option<ResourceHandle>,
    ) -> Result<(), RenderError> {
        if let Some(handle) = vertex_array {
            self.resources.validate(handle, &[ResourceType::VertexArray])?;
        }
        self.vertex_array
            .set(&mut self.resources, vertex_array, destroy)?;
        Ok(())
    }

    fn set_graphics_primitive_topology(
        &mut self,
        primitive_topology: PrimitiveTopology,
    ) -> Result<(), RenderError> {
        if primitive_topology == PrimitiveTopology::PatchList {
            Capabilities::require(
                self.capabilities.tessellation_shaders,
                "patch list topology",
                NAME,
            )?;
        }
        self.primitive_topology = primitive_topology;
        Ok(())
    }

    fn set_graphics_viewports(&mut self, viewports: &[Viewport]) -> Result<(), RenderError> {
        let maximum = self.capabilities.maximum_number_of_viewports as usize;
        if viewports.len() > maximum {
            log::warn!(
                "{NAME}: {} viewports given, only the first {maximum} are used",
                viewports.len()
            );
        }
        Ok(())
    }

    fn set_graphics_scissor_rectangles(
        &mut self,
        scissor_rectangles: &[ScissorRectangle],
    ) -> Result<(), RenderError> {
        let maximum = self.capabilities.maximum_number_of_viewports as usize;
        if scissor_rectangles.len() > maximum {
            log::warn!(
                "{NAME}: {} scissor rectangles given, only the first {maximum} are used",
                scissor_rectangles.len()
            );
        }
        Ok(())
    }

    fn set_render_target(
        &mut self,
        render_target: Option<ResourceHandle>,
    ) -> Result<(), RenderError> {
        let next = match render_target {
            Some(handle) => {
                let entry = self
                    .resources
                    .validate(handle, &ResourceType::RENDER_TARGETS)?;
                let generate_mipmaps = matches!(
                    &entry.payload,
                    NullResource::Framebuffer(layout) if layout.generate_mipmaps
                );
                ActiveRenderTarget::new(handle, entry.base.resource_type, generate_mipmaps)
            }
            None => None,
        };
        self.render_target
            .set(&mut self.resources, &mut NullTargets, next)?;
        Ok(())
    }

    fn clear(
        &mut self,
        flags: ClearFlags,
        _color: [f32; 4],
        _z: f32,
        _stencil: u32,
    ) -> Result<(), RenderError> {
        log::trace!("{NAME}: clear {flags:?}");
        Ok(())
    }

    fn resolve_multisample_framebuffer(
        &mut self,
        destination_render_target: ResourceHandle,
        source_multisample_framebuffer: ResourceHandle,
    ) -> Result<(), RenderError> {
        Capabilities::require(
            self.capabilities.multisample_resolve,
            "multisample resolve",
            NAME,
        )?;
        self.resources
            .validate(destination_render_target, &ResourceType::RENDER_TARGETS)?;
        self.resources
            .validate(source_multisample_framebuffer, &[ResourceType::Framebuffer])?;
        Ok(())
    }

    fn copy_resource(
        &mut self,
        destination_resource: ResourceHandle,
        source_resource: ResourceHandle,
    ) -> Result<(), RenderError> {
        Capabilities::require(self.capabilities.copy_resource, "resource copies", NAME)?;
        let extent = |handle| -> Result<_, RenderError> {
            match &self
                .resources
                .validate(handle, &ResourceType::TEXTURES)?
                .payload
            {
                NullResource::Texture { dimension, .. } => Ok(dimension.extent()),
                _ => Err(ResourceError::NotFound { handle }.into()),
            }
        };
        let destination = extent(destination_resource)?;
        let source = extent(source_resource)?;
        if destination != source {
            return Err(ResourceError::InvalidDescription(format!(
                "cannot copy a {source:?} texture into a {destination:?} texture"
            ))
            .into());
        }
        Ok(())
    }

    fn draw_indirect(
        &mut self,
        indirect_buffer: ResourceHandle,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) -> Result<(), RenderError> {
        let records = self.indirect_records::<DrawArguments>(
            indirect_buffer,
            indirect_buffer_offset,
            number_of_draws,
        )?;
        self.draw_records(records)
    }

    fn draw_indexed_indirect(
        &mut self,
        indirect_buffer: ResourceHandle,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) -> Result<(), RenderError> {
        self.require_index_buffer()?;
        let records = self.indirect_records::<DrawIndexedArguments>(
            indirect_buffer,
            indirect_buffer_offset,
            number_of_draws,
        )?;
        self.draw_records(records)
    }

    fn draw_emulated(
        &mut self,
        emulation_data: &[u8],
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) -> Result<(), RenderError> {
        let records = emulated_draw_records::<DrawArguments>(
            emulation_data,
            indirect_buffer_offset,
            number_of_draws,
        )?;
        self.draw_records(records)
    }

    fn draw_indexed_emulated(
        &mut self,
        emulation_data: &[u8],
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) -> Result<(), RenderError> {
        self.require_index_buffer()?;
        let records = emulated_draw_records::<DrawIndexedArguments>(
            emulation_data,
            indirect_buffer_offset,
            number_of_draws,
        )?;
        self.draw_records(records)
    }

    fn set_debug_marker(&mut self, name: &str) -> Result<(), RenderError> {
        if self.settings.debug_markers {
            log::trace!("{NAME}: marker '{name}'");
        }
        Ok(())
    }

    fn begin_debug_event(&mut self, name: &str) -> Result<(), RenderError> {
        if self.settings.debug_markers {
            log::trace!("{NAME}: begin '{name}'");
            self.open_debug_events += 1;
        }
        Ok(())
    }

    fn end_debug_event(&mut self) -> Result<(), RenderError> {
        if !self.settings.debug_markers {
            return Ok(());
        }
        self.open_debug_events = self.open_debug_events.checked_sub(1).ok_or(
            CommandError::InvalidArgument {
                command: CommandId::EndDebugEvent,
                details: "no debug event is open",
            },
        )?;
        Ok(())
    }
}

impl Renderer for NullRenderer {
    fn renderer_id(&self) -> RendererId {
        self.id
    }

    fn is_initialized(&self) -> bool {
        true
    }

    fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn shader_language_name(&self) -> &'static str {
        SHADER_LANGUAGE
    }

    fn create_swap_chain(
        &mut self,
        descriptor: &SwapChainDescriptor,
    ) -> Result<ResourceHandle, RenderError> {
        self.insert(
            ResourceType::SwapChain,
            NullResource::SwapChain {
                width: descriptor.width.max(1),
                height: descriptor.height.max(1),
            },
        )
    }

    fn create_framebuffer(
        &mut self,
        descriptor: &FramebufferDescriptor,
    ) -> Result<ResourceHandle, RenderError> {
        let layout = FramebufferLayout::validate(
            &mut self.resources,
            descriptor,
            self.capabilities
                .maximum_number_of_simultaneous_render_targets,
            |payload| match payload {
                NullResource::Texture { dimension, flags } => Some((*dimension, *flags)),
                _ => None,
            },
        );
        self.insert(ResourceType::Framebuffer, NullResource::Framebuffer(layout))
    }

    fn create_vertex_buffer(
        &mut self,
        descriptor: &BufferDescriptor<'_>,
    ) -> Result<ResourceHandle, RenderError> {
        self.create_buffer(ResourceType::VertexBuffer, descriptor)
    }

    fn create_index_buffer(
        &mut self,
        descriptor: &IndexBufferDescriptor<'_>,
    ) -> Result<ResourceHandle, RenderError> {
        self.create_buffer(ResourceType::IndexBuffer, &descriptor.buffer)
    }

    fn create_uniform_buffer(
        &mut self,
        descriptor: &BufferDescriptor<'_>,
    ) -> Result<ResourceHandle, RenderError> {
        self.create_buffer(ResourceType::UniformBuffer, descriptor)
    }

    fn create_texture_buffer(
        &mut self,
        descriptor: &TextureBufferDescriptor<'_>,
    ) -> Result<ResourceHandle, RenderError> {
        Capabilities::require(self.capabilities.texture_buffer, "texture buffers", NAME)?;
        self.create_buffer(ResourceType::TextureBuffer, &descriptor.buffer)
    }

    fn create_indirect_buffer(
        &mut self,
        descriptor: &IndirectBufferDescriptor<'_>,
    ) -> Result<ResourceHandle, RenderError> {
        self.create_buffer(ResourceType::IndirectBuffer, &descriptor.buffer)
    }

    fn create_vertex_array(
        &mut self,
        descriptor: &VertexArrayDescriptor,
    ) -> Result<ResourceHandle, RenderError> {
        if descriptor.attributes.has_instanced_attributes() {
            Capabilities::require(
                self.capabilities.instanced_arrays,
                "per-instance vertex attributes",
                NAME,
            )?;
        }
        for attribute in &descriptor.attributes.attributes {
            if attribute.input_slot as usize >= descriptor.vertex_buffers.len() {
                return Err(ResourceError::InvalidDescription(format!(
                    "attribute '{}' reads input slot {} but only {} vertex buffers are given",
                    attribute.name,
                    attribute.input_slot,
                    descriptor.vertex_buffers.len()
                ))
                .into());
            }
        }
        for &buffer in &descriptor.vertex_buffers {
            self.resources
                .validate(buffer, &[ResourceType::VertexBuffer])?;
        }
        if let Some(buffer) = descriptor.index_buffer {
            self.resources.validate(buffer, &[ResourceType::IndexBuffer])?;
        }

        for buffer in descriptor
            .vertex_buffers
            .iter()
            .chain(descriptor.index_buffer.iter())
        {
            self.resources.add_reference(*buffer)?;
        }
        self.insert(
            ResourceType::VertexArray,
            NullResource::VertexArray {
                vertex_buffers: descriptor.vertex_buffers.clone(),
                index_buffer: descriptor.index_buffer,
            },
        )
    }

    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor<'_>,
    ) -> Result<ResourceHandle, RenderError> {
        descriptor.validate(self.capabilities.maximum_texture_dimension)?;
        self.insert(
            descriptor.dimension.resource_type(),
            NullResource::Texture {
                dimension: descriptor.dimension,
                flags: descriptor.flags,
            },
        )
    }

    fn create_root_signature(
        &mut self,
        descriptor: &RootSignatureDescriptor,
    ) -> Result<ResourceHandle, RenderError> {
        self.insert(
            ResourceType::RootSignature,
            NullResource::RootSignature {
                descriptor: descriptor.clone(),
                samplers: SamplerTable::new(descriptor.len()),
            },
        )
    }

    fn create_pipeline_state(
        &mut self,
        descriptor: &PipelineStateDescriptor,
    ) -> Result<ResourceHandle, RenderError> {
        let maximum = self
            .capabilities
            .maximum_number_of_simultaneous_render_targets;
        if descriptor.number_of_render_targets > maximum {
            return Err(CapabilityError::TooManyRenderTargets {
                requested: descriptor.number_of_render_targets,
                maximum,
            }
            .into());
        }
        self.resources
            .validate(descriptor.root_signature, &[ResourceType::RootSignature])?;
        self.resources
            .validate(descriptor.program, &[ResourceType::Program])?;

        self.resources.add_reference(descriptor.root_signature)?;
        self.resources.add_reference(descriptor.program)?;
        self.insert(
            ResourceType::PipelineState,
            NullResource::PipelineState {
                root_signature: descriptor.root_signature,
                program: descriptor.program,
            },
        )
    }

    fn create_sampler_state(
        &mut self,
        _descriptor: &SamplerState,
    ) -> Result<ResourceHandle, RenderError> {
        self.insert(ResourceType::SamplerState, NullResource::SamplerState)
    }

    fn create_shader(
        &mut self,
        descriptor: &ShaderDescriptor<'_>,
    ) -> Result<ResourceHandle, RenderError> {
        validate_shader(descriptor, SHADER_LANGUAGE, &self.capabilities, NAME)?;
        self.insert(
            descriptor.stage.resource_type(),
            NullResource::Shader {
                language: descriptor.language.to_string(),
            },
        )
    }

    fn create_program(
        &mut self,
        descriptor: &ProgramDescriptor,
    ) -> Result<ResourceHandle, RenderError> {
        validate_program(&self.resources, descriptor, |payload| match payload {
            NullResource::Shader { language } => Some(language.as_str()),
            _ => None,
        })?;
        self.insert(ResourceType::Program, NullResource::Program)
    }

    fn add_reference(&mut self, handle: ResourceHandle) -> Result<u32, RenderError> {
        Ok(self.resources.add_reference(handle)?)
    }

    fn release(&mut self, handle: ResourceHandle) -> Result<u32, RenderError> {
        Ok(self.resources.release_with(handle, destroy)?)
    }

    fn reference_count(&self, handle: ResourceHandle) -> Result<u32, RenderError> {
        Ok(self.resources.reference_count(handle)?)
    }

    fn resource_type(&self, handle: ResourceHandle) -> Result<ResourceType, RenderError> {
        Ok(self.resources.resource_type(handle)?)
    }

    fn map(
        &mut self,
        handle: ResourceHandle,
        map_type: MapType,
    ) -> Result<MappedSubresource<'_>, RenderError> {
        let entry = self.resources.get_mut(handle)?;
        let NullResource::Buffer { contents, mapped } = &mut entry.payload else {
            return Err(ResourceError::NotMappable { handle }.into());
        };
        if mapped.is_some() {
            return Err(ResourceError::AlreadyMapped { handle }.into());
        }
        *mapped = Some(map_type);
        let size = contents.len() as u32;
        Ok(MappedSubresource {
            data: contents.as_mut_slice(),
            row_pitch: size,
            depth_pitch: size,
        })
    }

    fn unmap(&mut self, handle: ResourceHandle) -> Result<(), RenderError> {
        let entry = self.resources.get_mut(handle)?;
        let NullResource::Buffer { mapped, .. } = &mut entry.payload else {
            return Err(ResourceError::NotMappable { handle }.into());
        };
        mapped.take().ok_or(ResourceError::NotMapped { handle })?;
        Ok(())
    }

    fn render_target_size(&self, handle: ResourceHandle) -> Result<(u32, u32), RenderError> {
        match &self
            .resources
            .validate(handle, &ResourceType::RENDER_TARGETS)?
            .payload
        {
            NullResource::SwapChain { width, height } => Ok((*width, *height)),
            NullResource::Framebuffer(layout) => Ok((layout.width, layout.height)),
            _ => Err(ResourceError::NotFound { handle }.into()),
        }
    }

    fn resize_swap_chain(
        &mut self,
        swap_chain: ResourceHandle,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let entry = self
            .resources
            .validate_mut(swap_chain, &[ResourceType::SwapChain])?;
        if let NullResource::SwapChain {
            width: current_width,
            height: current_height,
        } = &mut entry.payload
        {
            *current_width = width.max(1);
            *current_height = height.max(1);
        }
        Ok(())
    }

    fn present(&mut self, swap_chain: ResourceHandle) -> Result<(), RenderError> {
        self.resources
            .validate(swap_chain, &[ResourceType::SwapChain])?;
        log::trace!("{NAME}: present {swap_chain:?}");
        Ok(())
    }

    fn submit_command_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
    ) -> Result<SubmissionStats, RenderError> {
        let dispatch = self.dispatch;
        Ok(dispatch.execute(self, command_buffer))
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn finish(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn statistics(&self) -> &ResourceStatistics {
        self.resources.statistics()
    }

    fn leak_report(&self) -> LeakReport {
        self.resources.leak_report()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::renderer::{
        DescriptorRange, FramebufferAttachment, RootParameter, ShaderVisibility, TextureFlags,
        TextureFormat,
    };

    fn renderer() -> NullRenderer {
        NullRenderer::new(RendererSettings {
            report_leaks: false,
            ..RendererSettings::default()
        })
    }

    #[test]
    fn mapping_is_exclusive() {
        let mut renderer = renderer();
        let buffer = renderer
            .create_vertex_buffer(&BufferDescriptor::zeroed(8, Default::default()))
            .unwrap();

        renderer.map(buffer, MapType::Write).unwrap().data[0] = 42;
        assert!(matches!(
            renderer.map(buffer, MapType::Read),
            Err(RenderError::Resource(ResourceError::AlreadyMapped { .. }))
        ));
        assert!(matches!(
            renderer.copy_resource_data(buffer, 0, &[1]),
            Err(RenderError::Resource(ResourceError::AlreadyMapped { .. }))
        ));
        renderer.unmap(buffer).unwrap();
        assert!(matches!(
            renderer.unmap(buffer),
            Err(RenderError::Resource(ResourceError::NotMapped { .. }))
        ));
        assert_eq!(renderer.map(buffer, MapType::Read).unwrap().data[0], 42);
    }

    #[test]
    fn textures_cannot_be_mapped() {
        let mut renderer = renderer();
        let texture = renderer
            .create_texture_2d(4, 4, TextureFormat::Rgba8Unorm, None, TextureFlags::empty())
            .unwrap();
        assert_eq!(
            renderer.map(texture, MapType::Read).unwrap_err(),
            RenderError::Resource(ResourceError::NotMappable { handle: texture })
        );
    }

    #[test]
    fn root_signature_change_releases_descriptor_tables() {
        let mut renderer = renderer();
        let signature = renderer
            .create_root_signature(&RootSignatureDescriptor::new(vec![RootParameter::table(
                DescriptorRange::new(DescriptorRangeType::UniformBuffer, 0, "PassUniforms"),
                ShaderVisibility::ALL_GRAPHICS,
            )]))
            .unwrap();
        let uniforms = renderer
            .create_uniform_buffer(&BufferDescriptor::zeroed(64, Default::default()))
            .unwrap();

        renderer.set_graphics_root_signature(Some(signature)).unwrap();
        renderer
            .set_graphics_root_descriptor_table(0, Some(uniforms))
            .unwrap();
        assert_eq!(renderer.reference_count(uniforms), Ok(2));

        renderer.set_graphics_root_signature(None).unwrap();
        assert_eq!(renderer.reference_count(uniforms), Ok(1));
        assert_eq!(renderer.reference_count(signature), Ok(1));
    }

    #[test]
    fn debug_events_must_be_balanced() {
        let mut renderer = renderer();
        renderer.begin_debug_event("Frame").unwrap();
        renderer.end_debug_event().unwrap();
        assert!(matches!(
            renderer.end_debug_event(),
            Err(RenderError::Command(CommandError::InvalidArgument { .. }))
        ));

        let mut silent = NullRenderer::new(RendererSettings {
            debug_markers: false,
            report_leaks: false,
            ..RendererSettings::default()
        });
        assert!(silent.end_debug_event().is_ok());
    }

    #[test]
    fn framebuffer_skips_foreign_attachments() {
        let mut other = renderer();
        let mut renderer = renderer();
        let color = renderer
            .create_texture_2d(32, 16, TextureFormat::Rgba8Unorm, None, TextureFlags::RENDER_TARGET)
            .unwrap();
        let foreign = other
            .create_texture_2d(64, 64, TextureFormat::Rgba8Unorm, None, TextureFlags::RENDER_TARGET)
            .unwrap();

        let framebuffer = renderer
            .create_framebuffer(&FramebufferDescriptor {
                color_attachments: vec![
                    FramebufferAttachment::new(foreign),
                    FramebufferAttachment::new(color),
                ],
                depth_stencil_attachment: None,
            })
            .unwrap();
        assert_eq!(renderer.render_target_size(framebuffer), Ok((32, 16)));
        assert_eq!(renderer.reference_count(color), Ok(2));
        assert_eq!(other.reference_count(foreign), Ok(1));
    }
}
