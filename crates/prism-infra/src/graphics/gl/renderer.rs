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

use super::calls::{
    GlAttachment, GlBufferTarget, GlCall, GlCapability, GlFace, GlFramebufferTarget, GlObjectKind,
    GlPolygonMode, GlTextureTarget,
};
use super::context::{GlContext, GlExtensions};
use super::conversions::{texture_target, IntoGl};
use super::resources::{
    destroy_native, GlBuffer, GlLocation, GlPipelineState, GlResource, GlTexture, GlVertexArray,
};
use prism_core::renderer::binding::{RootParameterBindings, SamplerTable};
use prism_core::renderer::program::{validate_program, validate_shader};
use prism_core::renderer::render_target::{
    ActiveRenderTarget, FramebufferLayout, RenderTargetBackend, RenderTargetState,
};
use prism_core::renderer::resource::{BoundSlot, ResourceBase};
use prism_core::renderer::{
    BufferDescriptor, Capabilities, CapabilityError, CommandBuffer, DescriptorRangeType,
    DispatchTable, FramebufferDescriptor, IndexBufferDescriptor, IndirectBufferDescriptor,
    LeakReport, MapType, MappedSubresource, PipelineStateDescriptor, PrimitiveTopology,
    PrimitiveTopologyType, ProgramDescriptor, RenderError, Renderer, RendererId,
    RendererSettings, ResourceError, ResourceHandle, ResourceRegistry, ResourceStatistics,
    ResourceType, RootSignatureDescriptor, SamplerState, ShaderDescriptor, SubmissionStats,
    SwapChainDescriptor, TextureBufferDescriptor, TextureDescriptor, TextureDimension,
    TextureFlags, TextureFormat, VertexArrayDescriptor,
};
use std::collections::HashMap;

/// Textures bound to texture units through descriptor tables, so that a
/// temporary bind during an upload can put them back.
#[derive(Debug, Default)]
pub(super) struct TextureUnits {
    active: u32,
    bound: HashMap<(u32, GlTextureTarget), ResourceHandle>,
}

impl TextureUnits {
    pub fn activate(&mut self, unit: u32) {
        self.active = unit;
    }

    pub fn bind(&mut self, target: GlTextureTarget, texture: ResourceHandle) {
        self.bound.insert((self.active, target), texture);
    }

    /// Texture name bound to `target` of the active unit, 0 once it was destroyed.
    pub fn bound_name(
        &self,
        target: GlTextureTarget,
        registry: &ResourceRegistry<GlResource>,
    ) -> u32 {
        self.bound
            .get(&(self.active, target))
            .and_then(|handle| registry.get(*handle).ok())
            .map_or(0, |entry| entry.payload.texture_name())
    }
}

/// Render target changes issued on a GL context.
pub(super) struct GlTargets<'a, C> {
    pub context: &'a mut C,
    pub texture_units: &'a TextureUnits,
}

impl<C: GlContext> RenderTargetBackend<GlResource> for GlTargets<'_, C> {
    fn bind_default_framebuffer(&mut self) {
        self.context.issue(GlCall::BindFramebuffer {
            target: GlFramebufferTarget::Framebuffer,
            framebuffer: 0,
        });
    }

    fn bind_render_target(&mut self, target: &ActiveRenderTarget, payload: &GlResource) {
        match payload {
            GlResource::SwapChain { surface, .. } => {
                self.context.issue(GlCall::MakeCurrent { surface: *surface })
            }
            GlResource::Framebuffer { framebuffer, .. } => {
                self.context.issue(GlCall::BindFramebuffer {
                    target: GlFramebufferTarget::Framebuffer,
                    framebuffer: *framebuffer,
                })
            }
            _ => log::warn!("{:?} is not a render target", target.handle),
        }
    }

    fn generate_framebuffer_mipmaps(
        &mut self,
        framebuffer: &GlResource,
        registry: &ResourceRegistry<GlResource>,
    ) {
        let GlResource::Framebuffer { layout, .. } = framebuffer else {
            return;
        };
        for attachment in &layout.color_attachments {
            let Some(texture) = registry
                .get(attachment.texture)
                .ok()
                .and_then(|entry| entry.payload.as_texture())
            else {
                continue;
            };
            self.context.issue(GlCall::BindTexture {
                target: texture.target,
                texture: texture.name,
            });
            self.context.issue(GlCall::GenerateMipmap {
                target: texture.target,
            });
            self.context.issue(GlCall::BindTexture {
                target: texture.target,
                texture: self.texture_units.bound_name(texture.target, registry),
            });
        }
    }

    fn destroy_resource(&mut self, base: ResourceBase, payload: GlResource) {
        destroy_native(&mut *self.context, base, payload);
    }
}

/// Issues the attribute pointers of a vertex array on the current vertex array
/// object (or the default one when objects are emulated). Returns the number of
/// enabled attributes; attributes beyond it that were enabled before are disabled.
pub(super) fn specify_vertex_attributes<C: GlContext>(
    context: &mut C,
    vertex_array: &GlVertexArray,
    previously_enabled: u32,
) -> u32 {
    for (index, attribute) in vertex_array.attributes.attributes.iter().enumerate() {
        let index = index as u32;
        let buffer = vertex_array
            .buffer_names
            .get(attribute.input_slot as usize)
            .copied()
            .unwrap_or_default();
        context.issue(GlCall::BindBuffer {
            target: GlBufferTarget::Array,
            buffer,
        });
        context.issue(GlCall::EnableVertexAttribArray { index });
        context.issue(GlCall::VertexAttribPointer {
            index,
            size: attribute.format.components(),
            data_type: attribute.format.into_gl(),
            normalized: attribute.format.is_normalized(),
            stride: attribute.stride_in_bytes,
            offset: attribute.aligned_byte_offset,
        });
        if attribute.instances_per_element > 0 {
            context.issue(GlCall::VertexAttribDivisor {
                index,
                divisor: attribute.instances_per_element,
            });
        }
    }

    let enabled = vertex_array.attributes.attributes.len() as u32;
    for index in enabled..previously_enabled {
        context.issue(GlCall::DisableVertexAttribArray { index });
    }
    if let Some((index_buffer, _)) = vertex_array.index {
        context.issue(GlCall::BindBuffer {
            target: GlBufferTarget::ElementArray,
            buffer: index_buffer,
        });
    }
    enabled
}

fn enable<C: GlContext>(context: &mut C, capability: GlCapability, enabled: bool) {
    context.issue(if enabled {
        GlCall::Enable(capability)
    } else {
        GlCall::Disable(capability)
    });
}

/// Uses the program of a pipeline state and copies its stored state into native
/// calls.
pub(super) fn apply_pipeline_state<C: GlContext>(
    context: &mut C,
    capabilities: &Capabilities,
    pipeline: &GlPipelineState,
) {
    context.issue(GlCall::UseProgram {
        program: pipeline.program_name,
    });

    let rasterizer = &pipeline.rasterizer;
    match rasterizer.cull_mode.into_gl() {
        Some(face) => {
            enable(context, GlCapability::CullFace, true);
            context.issue(GlCall::CullFace(face));
        }
        None => enable(context, GlCapability::CullFace, false),
    }
    context.issue(GlCall::FrontFace(rasterizer.front_face.into_gl()));
    let polygon_mode: GlPolygonMode = rasterizer.fill_mode.into_gl();
    if capabilities.wireframe_fill {
        context.issue(GlCall::PolygonMode(polygon_mode));
    } else if polygon_mode == GlPolygonMode::Line {
        log::warn!(
            "Wireframe fill mode is not supported by {}, filling solid",
            capabilities.device_name
        );
    }
    let polygon_offset =
        rasterizer.depth_bias != 0 || rasterizer.slope_scaled_depth_bias != 0.0;
    enable(context, GlCapability::PolygonOffsetFill, polygon_offset);
    if polygon_offset {
        context.issue(GlCall::PolygonOffset {
            factor: rasterizer.slope_scaled_depth_bias,
            units: rasterizer.depth_bias as f32,
        });
    }
    enable(context, GlCapability::ScissorTest, rasterizer.scissor_enable);

    let depth_stencil = &pipeline.depth_stencil;
    enable(context, GlCapability::DepthTest, depth_stencil.depth_enable);
    context.issue(GlCall::DepthMask(depth_stencil.depth_write_enabled));
    context.issue(GlCall::DepthFunc(depth_stencil.depth_compare));
    enable(context, GlCapability::StencilTest, depth_stencil.stencil_enable);
    if depth_stencil.stencil_enable {
        for (face, state) in [
            (GlFace::Front, depth_stencil.stencil_front),
            (GlFace::Back, depth_stencil.stencil_back),
        ] {
            context.issue(GlCall::StencilFuncSeparate {
                face,
                function: state.compare,
                reference: 0,
                mask: depth_stencil.stencil_read_mask as u32,
            });
            context.issue(GlCall::StencilOpSeparate {
                face,
                stencil_fail: state.fail_op,
                depth_fail: state.depth_fail_op,
                pass: state.pass_op,
            });
        }
        context.issue(GlCall::StencilMask(depth_stencil.stencil_write_mask as u32));
    }

    let blend = &pipeline.blend;
    let target = &blend.render_targets[0];
    enable(
        context,
        GlCapability::SampleAlphaToCoverage,
        blend.alpha_to_coverage_enable,
    );
    enable(context, GlCapability::Blend, target.blend_enable);
    if target.blend_enable {
        context.issue(GlCall::BlendFuncSeparate {
            source_rgb: target.src_blend,
            destination_rgb: target.dst_blend,
            source_alpha: target.src_blend_alpha,
            destination_alpha: target.dst_blend_alpha,
        });
        context.issue(GlCall::BlendEquationSeparate {
            rgb: target.blend_op,
            alpha: target.blend_op_alpha,
        });
    }
    context.issue(GlCall::ColorMask(target.write_mask));
}

/// A renderer for the OpenGL family, driving any [`GlContext`].
///
/// The profile (ES 2, ES 3 or desktop core) is not selected explicitly: the
/// capabilities computed once from the context's extension queries decide which
/// native path every operation takes.
#[derive(Debug)]
pub struct GlRenderer<C: GlContext> {
    pub(super) context: C,
    pub(super) id: RendererId,
    pub(super) settings: RendererSettings,
    pub(super) extensions: GlExtensions,
    pub(super) capabilities: Capabilities,
    pub(super) initialized: bool,
    pub(super) backend_name: &'static str,
    pub(super) shader_language: &'static str,
    pub(super) resources: ResourceRegistry<GlResource>,
    pub(super) root_signature: BoundSlot,
    pub(super) descriptor_tables: Vec<BoundSlot>,
    pub(super) pipeline_state: BoundSlot,
    pub(super) vertex_array: BoundSlot,
    pub(super) enabled_vertex_attributes: u32,
    pub(super) texture_units: TextureUnits,
    /// Emulated uniform buffers must be uploaded before the next draw.
    pub(super) uniforms_dirty: bool,
    pub(super) primitive_topology: PrimitiveTopology,
    pub(super) render_target: RenderTargetState,
    pub(super) open_debug_events: u32,
    pub(super) dispatch: DispatchTable<GlRenderer<C>>,
}

impl<C: GlContext> GlRenderer<C> {
    /// Creates a renderer over `context`.
    ///
    /// If the context cannot be made current the renderer is still returned but
    /// reports `is_initialized() == false`, and every operation fails with
    /// [`RenderError::NotInitialized`].
    pub fn new(mut context: C, settings: RendererSettings) -> Self {
        let extensions = context.extensions();
        let capabilities = extensions.capabilities();
        let backend_name = extensions.backend().name();
        let id = RendererId::next();
        let initialized = match context.make_current() {
            Ok(()) => {
                log::info!(
                    "{backend_name} renderer {id} created on \"{}\" ({}.{})",
                    extensions.renderer_name,
                    extensions.major_version,
                    extensions.minor_version
                );
                log::debug!("{backend_name} capabilities: {capabilities:?}");
                true
            }
            Err(err) => {
                log::error!("{backend_name}: failed to initialize the GL context: {err}");
                false
            }
        };

        Self {
            context,
            id,
            settings,
            shader_language: extensions.shader_language(),
            extensions,
            capabilities,
            initialized,
            backend_name,
            resources: ResourceRegistry::new(id),
            root_signature: BoundSlot::new(),
            descriptor_tables: Vec::new(),
            pipeline_state: BoundSlot::new(),
            vertex_array: BoundSlot::new(),
            enabled_vertex_attributes: 0,
            texture_units: TextureUnits::default(),
            uniforms_dirty: false,
            primitive_topology: PrimitiveTopology::default(),
            render_target: RenderTargetState::new(),
            open_debug_events: 0,
            dispatch: DispatchTable::new(),
        }
    }

    /// The native context.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// The native context, e.g. to drain a [`RecordingContext`](super::RecordingContext).
    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// The extension queries the capabilities were computed from.
    pub fn extensions(&self) -> &GlExtensions {
        &self.extensions
    }

    /// The active render target.
    pub fn active_render_target(&self) -> Option<ResourceHandle> {
        self.render_target.active().map(|target| target.handle)
    }

    /// The primitive topology of following draws.
    pub fn primitive_topology(&self) -> PrimitiveTopology {
        self.primitive_topology
    }

    pub(super) fn ready(&self) -> Result<(), RenderError> {
        if self.initialized {
            Ok(())
        } else {
            Err(RenderError::NotInitialized)
        }
    }

    pub(super) fn bound_pipeline(&self) -> Option<&GlPipelineState> {
        let handle = self.pipeline_state.get()?;
        match &self.resources.get(handle).ok()?.payload {
            GlResource::PipelineState(pipeline) => Some(pipeline),
            _ => None,
        }
    }

    pub(super) fn bound_vertex_array(&self) -> Option<&GlVertexArray> {
        let handle = self.vertex_array.get()?;
        match &self.resources.get(handle).ok()?.payload {
            GlResource::VertexArray(vertex_array) => Some(vertex_array),
            _ => None,
        }
    }

    /// Framebuffer name of the active render target, 0 for none or a swap chain.
    pub(super) fn active_framebuffer_name(&self) -> u32 {
        self.render_target
            .active()
            .and_then(|target| self.resources.get(target.handle).ok())
            .map_or(0, |entry| entry.payload.framebuffer_name())
    }

    /// Height used to flip viewports and scissors to a bottom-left origin.
    pub(super) fn flip_height(&self) -> Option<f32> {
        if self.capabilities.upper_left_origin {
            return None;
        }
        let target = self.render_target.active()?;
        match &self.resources.get(target.handle).ok()?.payload {
            GlResource::SwapChain { height, .. } => Some(*height as f32),
            GlResource::Framebuffer { layout, .. } => Some(layout.height as f32),
            _ => None,
        }
    }

    pub(super) fn reset_descriptor_tables(&mut self, number_of_parameters: usize) {
        for mut slot in std::mem::take(&mut self.descriptor_tables) {
            if let Err(err) = slot.set(&mut self.resources, None, |base, payload| {
                destroy_native(&mut self.context, base, payload)
            }) {
                log::warn!("{}: failed to unbind descriptor table: {err}", self.backend_name);
            }
        }
        self.descriptor_tables = vec![BoundSlot::new(); number_of_parameters];
    }

    fn unbind_all(&mut self) {
        let mut targets = GlTargets {
            context: &mut self.context,
            texture_units: &self.texture_units,
        };
        if let Err(err) = self.render_target.set(&mut self.resources, &mut targets, None) {
            log::warn!("{}: failed to unbind the render target: {err}", self.backend_name);
        }
        self.reset_descriptor_tables(0);
        for slot in [
            &mut self.pipeline_state,
            &mut self.vertex_array,
            &mut self.root_signature,
        ] {
            if let Err(err) = slot.set(&mut self.resources, None, |base, payload| {
                destroy_native(&mut self.context, base, payload)
            }) {
                log::warn!("{}: failed to unbind state: {err}", self.backend_name);
            }
        }
    }

    fn insert(
        &mut self,
        resource_type: ResourceType,
        payload: GlResource,
    ) -> Result<ResourceHandle, RenderError> {
        Ok(self.resources.insert(resource_type, payload)?)
    }

    /// Issues `upload` with `buffer` bound to `target`. Element array uploads keep
    /// the index binding of the bound vertex array.
    pub(super) fn write_buffer(&mut self, target: GlBufferTarget, buffer: u32, upload: GlCall) {
        let element_array = match self.bound_vertex_array() {
            Some(vertex_array) if target == GlBufferTarget::ElementArray => Some((
                vertex_array.vertex_array,
                vertex_array.index.map_or(0, |(name, _)| name),
            )),
            _ => None,
        };
        if element_array.is_some_and(|(vertex_array, _)| vertex_array != 0) {
            self.context
                .issue(GlCall::BindVertexArray { vertex_array: 0 });
        }
        self.context.issue(GlCall::BindBuffer { target, buffer });
        self.context.issue(upload);
        match element_array {
            // Without vertex array objects the index binding is global.
            Some((0, index)) => self.context.issue(GlCall::BindBuffer {
                target,
                buffer: index,
            }),
            Some((vertex_array, _)) => self
                .context
                .issue(GlCall::BindVertexArray { vertex_array }),
            None => {}
        }
    }

    /// Puts back the texture a descriptor table bound to `target` of the active unit.
    fn restore_texture_binding(&mut self, target: GlTextureTarget) {
        let texture = self.texture_units.bound_name(target, &self.resources);
        self.context.issue(GlCall::BindTexture { target, texture });
    }

    /// Creates the shadow copy of a buffer and, when `native`, its GL object.
    fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor<'_>,
        target: GlBufferTarget,
        native: bool,
    ) -> Result<GlBuffer, RenderError> {
        let contents = descriptor.initial_contents().ok_or_else(|| {
            ResourceError::InvalidDescription(format!(
                "initial data does not fit into {} bytes",
                descriptor.size
            ))
        })?;
        let name = if native {
            let name = self.context.create_object(GlObjectKind::Buffer);
            self.write_buffer(
                target,
                name,
                GlCall::BufferData {
                    target,
                    data: contents.clone(),
                    usage: descriptor.usage,
                },
            );
            name
        } else {
            log::trace!(
                "{}: {} byte {target:?} buffer kept in system memory",
                self.backend_name,
                contents.len()
            );
            0
        };
        Ok(GlBuffer {
            name,
            target,
            contents,
            mapped: None,
            index_format: None,
            texture: None,
        })
    }

    fn upload_texture(&mut self, texture: &GlTexture, descriptor: &TextureDescriptor<'_>) {
        let format = descriptor.format.into_gl();
        let samples = descriptor.sample_count.max(1);
        let bytes_per_pixel = descriptor.format.bytes_per_pixel() as usize;
        let levels = if descriptor.data.is_some()
            && descriptor.flags.contains(TextureFlags::DATA_CONTAINS_MIPMAPS)
        {
            descriptor.mip_level_count()
        } else {
            1
        };

        let mut offset = 0usize;
        for level in 0..levels {
            let (width, height) = descriptor.dimension.mip_size(level);
            let depth = match descriptor.dimension {
                TextureDimension::D3 { depth, .. } => depth.checked_shr(level).unwrap_or(0).max(1),
                dimension => dimension.extent().2,
            };
            let size = width as usize * height as usize * depth as usize * bytes_per_pixel;
            let data = match descriptor.data {
                Some(data) => match data.get(offset..offset + size) {
                    Some(level_data) => Some(level_data.to_vec()),
                    None => {
                        log::warn!(
                            "{}: texture data ends before mip level {level}",
                            self.backend_name
                        );
                        break;
                    }
                },
                None => None,
            };
            self.context.issue(GlCall::TexImage {
                target: texture.target,
                level,
                format,
                width,
                height,
                depth,
                samples,
                data,
            });
            offset += size;
        }

        if descriptor.data.is_some()
            && descriptor.flags.contains(TextureFlags::GENERATE_MIPMAPS)
            && !descriptor.flags.contains(TextureFlags::DATA_CONTAINS_MIPMAPS)
        {
            self.context.issue(GlCall::GenerateMipmap {
                target: texture.target,
            });
        }
    }

    /// Resolves every root parameter of `signature` against a linked program and
    /// points sampler uniforms at their texture units.
    fn resolve_bindings(
        &mut self,
        program: u32,
        signature: &RootSignatureDescriptor,
    ) -> RootParameterBindings<GlLocation> {
        let uniform_buffer = self.capabilities.uniform_buffer;
        let context = &mut self.context;
        let mut texture_units = Vec::new();
        let bindings = RootParameterBindings::resolve(signature, |parameter_index, range| {
            let name = range.base_shader_register_name.as_ref();
            match range.range_type {
                DescriptorRangeType::UniformBuffer if uniform_buffer => {
                    let block_index = context.uniform_block_index(program, name)?;
                    context.issue(GlCall::UniformBlockBinding {
                        program,
                        block_index,
                        binding: parameter_index,
                    });
                    Some(GlLocation::UniformBlock {
                        binding: parameter_index,
                    })
                }
                DescriptorRangeType::UniformBuffer => context
                    .uniform_location(program, name)
                    .map(|location| GlLocation::Uniform { location }),
                _ => {
                    if let Some(location) = context.uniform_location(program, name) {
                        texture_units.push((location, range.base_shader_register as i32));
                    }
                    Some(GlLocation::TextureUnit {
                        unit: range.base_shader_register,
                    })
                }
            }
        });

        if !texture_units.is_empty() {
            let current = self
                .bound_pipeline()
                .map_or(0, |pipeline| pipeline.program_name);
            self.context.issue(GlCall::UseProgram { program });
            for (location, value) in texture_units {
                self.context.issue(GlCall::Uniform1i { location, value });
            }
            self.context.issue(GlCall::UseProgram { program: current });
        }
        for index in 0..signature.len() as u32 {
            if bindings.location(index).is_none() {
                log::debug!(
                    "{}: root parameter {index} is not used by program {program}",
                    self.backend_name
                );
            }
        }
        bindings
    }
}

impl<C: GlContext> Drop for GlRenderer<C> {
    fn drop(&mut self) {
        if !self.initialized {
            return;
        }
        self.unbind_all();
        if self.settings.report_leaks {
            self.resources.leak_report().log(self.backend_name);
        }
    }
}

impl<C: GlContext> Renderer for GlRenderer<C> {
    fn renderer_id(&self) -> RendererId {
        self.id
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn shader_language_name(&self) -> &'static str {
        self.shader_language
    }

    fn create_swap_chain(
        &mut self,
        descriptor: &SwapChainDescriptor,
    ) -> Result<ResourceHandle, RenderError> {
        self.ready()?;
        let width = descriptor.width.max(1);
        let height = descriptor.height.max(1);
        let surface = self
            .context
            .create_surface(descriptor.window, width, height)
            .map_err(ResourceError::BackendError)?;
        self.insert(
            ResourceType::SwapChain,
            GlResource::SwapChain {
                surface,
                width,
                height,
            },
        )
    }

    fn create_framebuffer(
        &mut self,
        descriptor: &FramebufferDescriptor,
    ) -> Result<ResourceHandle, RenderError> {
        self.ready()?;
        let layout = FramebufferLayout::validate(
            &mut self.resources,
            descriptor,
            self.capabilities
                .maximum_number_of_simultaneous_render_targets,
            |payload| {
                payload
                    .as_texture()
                    .map(|texture| (texture.dimension, texture.flags))
            },
        );

        let current = self.active_framebuffer_name();
        let framebuffer = self.context.create_object(GlObjectKind::Framebuffer);
        self.context.issue(GlCall::BindFramebuffer {
            target: GlFramebufferTarget::Framebuffer,
            framebuffer,
        });
        let color = layout
            .color_attachments
            .iter()
            .enumerate()
            .map(|(index, attachment)| (GlAttachment::Color(index as u32), attachment));
        let depth_stencil = layout
            .depth_stencil_attachment
            .iter()
            .map(|attachment| (GlAttachment::Depth, attachment));
        for (attachment_point, attachment) in color.chain(depth_stencil) {
            let Some(texture) = self
                .resources
                .get(attachment.texture)
                .ok()
                .and_then(|entry| entry.payload.as_texture())
            else {
                continue;
            };
            let attachment_point = match attachment_point {
                GlAttachment::Depth if texture.format == TextureFormat::Depth24PlusStencil8 => {
                    GlAttachment::DepthStencil
                }
                other => other,
            };
            self.context.issue(GlCall::FramebufferTexture {
                attachment: attachment_point,
                texture: texture.name,
                level: attachment.mipmap_index,
                layer: attachment.layer_index,
            });
        }
        self.context.issue(GlCall::DrawBuffers {
            count: layout.color_attachments.len() as u32,
        });
        self.context.issue(GlCall::BindFramebuffer {
            target: GlFramebufferTarget::Framebuffer,
            framebuffer: current,
        });

        self.insert(
            ResourceType::Framebuffer,
            GlResource::Framebuffer {
                framebuffer,
                layout,
            },
        )
    }

    fn create_vertex_buffer(
        &mut self,
        descriptor: &BufferDescriptor<'_>,
    ) -> Result<ResourceHandle, RenderError> {
        self.ready()?;
        let buffer = self.create_buffer(descriptor, GlBufferTarget::Array, true)?;
        self.insert(ResourceType::VertexBuffer, GlResource::Buffer(buffer))
    }

    fn create_index_buffer(
        &mut self,
        descriptor: &IndexBufferDescriptor<'_>,
    ) -> Result<ResourceHandle, RenderError> {
        self.ready()?;
        let mut buffer =
            self.create_buffer(&descriptor.buffer, GlBufferTarget::ElementArray, true)?;
        buffer.index_format = Some(descriptor.format);
        self.insert(ResourceType::IndexBuffer, GlResource::Buffer(buffer))
    }

    fn create_uniform_buffer(
        &mut self,
        descriptor: &BufferDescriptor<'_>,
    ) -> Result<ResourceHandle, RenderError> {
        self.ready()?;
        let native = self.capabilities.uniform_buffer;
        let buffer = self.create_buffer(descriptor, GlBufferTarget::Uniform, native)?;
        self.insert(ResourceType::UniformBuffer, GlResource::Buffer(buffer))
    }

    fn create_texture_buffer(
        &mut self,
        descriptor: &TextureBufferDescriptor<'_>,
    ) -> Result<ResourceHandle, RenderError> {
        self.ready()?;
        Capabilities::require(
            self.capabilities.texture_buffer,
            "texture buffers",
            self.backend_name,
        )?;
        let mut buffer = self.create_buffer(&descriptor.buffer, GlBufferTarget::Texture, true)?;
        let format = descriptor.format.into_gl();
        let texture = self.context.create_object(GlObjectKind::Texture);
        self.context.issue(GlCall::BindTexture {
            target: GlTextureTarget::Buffer,
            texture,
        });
        self.context.issue(GlCall::TexBuffer {
            format,
            buffer: buffer.name,
        });
        self.restore_texture_binding(GlTextureTarget::Buffer);
        buffer.texture = Some((texture, format));
        self.insert(ResourceType::TextureBuffer, GlResource::Buffer(buffer))
    }

    fn create_indirect_buffer(
        &mut self,
        descriptor: &IndirectBufferDescriptor<'_>,
    ) -> Result<ResourceHandle, RenderError> {
        self.ready()?;
        let native = self.capabilities.native_indirect_draw;
        let buffer = self.create_buffer(&descriptor.buffer, GlBufferTarget::DrawIndirect, native)?;
        self.insert(ResourceType::IndirectBuffer, GlResource::Buffer(buffer))
    }

    fn create_vertex_array(
        &mut self,
        descriptor: &VertexArrayDescriptor,
    ) -> Result<ResourceHandle, RenderError> {
        self.ready()?;
        if descriptor.attributes.has_instanced_attributes() {
            Capabilities::require(
                self.capabilities.instanced_arrays,
                "per-instance vertex attributes",
                self.backend_name,
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

        let mut buffer_names = Vec::with_capacity(descriptor.vertex_buffers.len());
        for &buffer in &descriptor.vertex_buffers {
            let entry = self
                .resources
                .validate(buffer, &[ResourceType::VertexBuffer])?;
            buffer_names.push(entry.payload.as_buffer().map_or(0, |buffer| buffer.name));
        }
        let index = match descriptor.index_buffer {
            Some(buffer) => {
                let entry = self.resources.validate(buffer, &[ResourceType::IndexBuffer])?;
                entry
                    .payload
                    .as_buffer()
                    .map(|buffer| (buffer.name, buffer.index_format.unwrap_or_default()))
            }
            None => None,
        };

        for buffer in descriptor
            .vertex_buffers
            .iter()
            .chain(descriptor.index_buffer.iter())
        {
            self.resources.add_reference(*buffer)?;
        }

        let mut vertex_array = GlVertexArray {
            vertex_array: 0,
            attributes: descriptor.attributes.clone(),
            vertex_buffers: descriptor.vertex_buffers.clone(),
            buffer_names,
            index_buffer: descriptor.index_buffer,
            index,
        };
        if self.capabilities.vertex_array_objects {
            let current = self
                .bound_vertex_array()
                .map_or(0, |vertex_array| vertex_array.vertex_array);
            vertex_array.vertex_array = self.context.create_object(GlObjectKind::VertexArray);
            self.context.issue(GlCall::BindVertexArray {
                vertex_array: vertex_array.vertex_array,
            });
            specify_vertex_attributes(&mut self.context, &vertex_array, 0);
            self.context.issue(GlCall::BindVertexArray {
                vertex_array: current,
            });
        }
        self.insert(ResourceType::VertexArray, GlResource::VertexArray(vertex_array))
    }

    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor<'_>,
    ) -> Result<ResourceHandle, RenderError> {
        self.ready()?;
        descriptor.validate(self.capabilities.maximum_texture_dimension)?;
        if descriptor.sample_count > 1 {
            Capabilities::require(
                self.capabilities.multisample_resolve,
                "multisample textures",
                self.backend_name,
            )?;
        }

        let target = texture_target(&descriptor.dimension, descriptor.sample_count);
        let name = self.context.create_object(GlObjectKind::Texture);
        self.context.issue(GlCall::BindTexture {
            target,
            texture: name,
        });
        let texture = GlTexture {
            name,
            target,
            dimension: descriptor.dimension,
            format: descriptor.format,
            flags: descriptor.flags,
        };
        self.upload_texture(&texture, descriptor);
        self.restore_texture_binding(target);
        self.insert(
            descriptor.dimension.resource_type(),
            GlResource::Texture(texture),
        )
    }

    fn create_root_signature(
        &mut self,
        descriptor: &RootSignatureDescriptor,
    ) -> Result<ResourceHandle, RenderError> {
        self.ready()?;
        self.insert(
            ResourceType::RootSignature,
            GlResource::RootSignature {
                descriptor: descriptor.clone(),
                samplers: SamplerTable::new(descriptor.len()),
            },
        )
    }

    fn create_pipeline_state(
        &mut self,
        descriptor: &PipelineStateDescriptor,
    ) -> Result<ResourceHandle, RenderError> {
        self.ready()?;
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
        if descriptor.primitive_topology_type == PrimitiveTopologyType::Patch {
            Capabilities::require(
                self.capabilities.tessellation_shaders,
                "patch primitives",
                self.backend_name,
            )?;
        }
        self.resources
            .validate(descriptor.root_signature, &[ResourceType::RootSignature])?;
        let program_name = match &self
            .resources
            .validate(descriptor.program, &[ResourceType::Program])?
            .payload
        {
            GlResource::Program { program, .. } => *program,
            _ => 0,
        };

        self.resources.add_reference(descriptor.root_signature)?;
        self.resources.add_reference(descriptor.program)?;
        self.insert(
            ResourceType::PipelineState,
            GlResource::PipelineState(GlPipelineState {
                root_signature: descriptor.root_signature,
                program: descriptor.program,
                program_name,
                rasterizer: descriptor.rasterizer,
                depth_stencil: descriptor.depth_stencil,
                blend: descriptor.blend,
            }),
        )
    }

    fn create_sampler_state(
        &mut self,
        descriptor: &SamplerState,
    ) -> Result<ResourceHandle, RenderError> {
        self.ready()?;
        let sampler = if self.capabilities.sampler_objects {
            let sampler = self.context.create_object(GlObjectKind::Sampler);
            self.context.issue(GlCall::SamplerParameters {
                sampler,
                state: *descriptor,
            });
            sampler
        } else {
            0
        };
        self.insert(
            ResourceType::SamplerState,
            GlResource::SamplerState {
                sampler,
                state: *descriptor,
            },
        )
    }

    fn create_shader(
        &mut self,
        descriptor: &ShaderDescriptor<'_>,
    ) -> Result<ResourceHandle, RenderError> {
        self.ready()?;
        validate_shader(
            descriptor,
            self.shader_language,
            &self.capabilities,
            self.backend_name,
        )?;

        let kind = GlObjectKind::Shader(descriptor.stage);
        let shader = self.context.create_object(kind);
        if let Err(details) = self.context.compile_shader(shader, &descriptor.source) {
            self.context.issue(GlCall::Delete { kind, name: shader });
            log::warn!("{}: shader compilation failed: {details}", self.backend_name);
            return Err(ResourceError::CompilationFailed {
                label: format!("{:?} shader", descriptor.stage),
                details,
            }
            .into());
        }
        self.insert(
            descriptor.stage.resource_type(),
            GlResource::Shader {
                shader,
                stage: descriptor.stage,
                language: self.shader_language,
            },
        )
    }

    fn create_program(
        &mut self,
        descriptor: &ProgramDescriptor,
    ) -> Result<ResourceHandle, RenderError> {
        self.ready()?;
        let stages = validate_program(&self.resources, descriptor, |payload| match payload {
            GlResource::Shader { language, .. } => Some(*language),
            _ => None,
        })?;
        let shaders: Vec<u32> = stages
            .iter()
            .filter_map(|(_, handle)| match self.resources.get(*handle).ok()?.payload {
                GlResource::Shader { shader, .. } => Some(shader),
                _ => None,
            })
            .collect();
        let signature = match &self.resources.get(descriptor.root_signature)?.payload {
            GlResource::RootSignature { descriptor, .. } => descriptor.clone(),
            _ => RootSignatureDescriptor::default(),
        };

        let program = self.context.create_object(GlObjectKind::Program);
        for shader in shaders {
            self.context.issue(GlCall::AttachShader { program, shader });
        }
        for (index, attribute) in descriptor.vertex_attributes.attributes.iter().enumerate() {
            self.context.issue(GlCall::BindAttribLocation {
                program,
                index: index as u32,
                name: attribute.name.to_string(),
            });
        }
        if let Err(details) = self.context.link_program(program) {
            self.context.issue(GlCall::Delete {
                kind: GlObjectKind::Program,
                name: program,
            });
            log::warn!("{}: program link failed: {details}", self.backend_name);
            return Err(ResourceError::CompilationFailed {
                label: "program".to_string(),
                details,
            }
            .into());
        }

        let bindings = self.resolve_bindings(program, &signature);
        self.insert(ResourceType::Program, GlResource::Program { program, bindings })
    }

    fn add_reference(&mut self, handle: ResourceHandle) -> Result<u32, RenderError> {
        self.ready()?;
        Ok(self.resources.add_reference(handle)?)
    }

    fn release(&mut self, handle: ResourceHandle) -> Result<u32, RenderError> {
        self.ready()?;
        Ok(self.resources.release_with(handle, |base, payload| {
            destroy_native(&mut self.context, base, payload)
        })?)
    }

    fn reference_count(&self, handle: ResourceHandle) -> Result<u32, RenderError> {
        self.ready()?;
        Ok(self.resources.reference_count(handle)?)
    }

    fn resource_type(&self, handle: ResourceHandle) -> Result<ResourceType, RenderError> {
        self.ready()?;
        Ok(self.resources.resource_type(handle)?)
    }

    fn map(
        &mut self,
        handle: ResourceHandle,
        map_type: MapType,
    ) -> Result<MappedSubresource<'_>, RenderError> {
        self.ready()?;
        let buffer = self
            .resources
            .get_mut(handle)?
            .payload
            .as_buffer_mut()
            .ok_or(ResourceError::NotMappable { handle })?;
        if buffer.mapped.is_some() {
            return Err(ResourceError::AlreadyMapped { handle }.into());
        }
        buffer.mapped = Some(map_type);
        let size = buffer.contents.len() as u32;
        Ok(MappedSubresource {
            data: buffer.contents.as_mut_slice(),
            row_pitch: size,
            depth_pitch: size,
        })
    }

    fn unmap(&mut self, handle: ResourceHandle) -> Result<(), RenderError> {
        self.ready()?;
        let buffer = self
            .resources
            .get_mut(handle)?
            .payload
            .as_buffer_mut()
            .ok_or(ResourceError::NotMappable { handle })?;
        let map_type = buffer
            .mapped
            .take()
            .ok_or(ResourceError::NotMapped { handle })?;
        if !map_type.writes() {
            return Ok(());
        }
        let (target, name) = (buffer.target, buffer.name);
        if name == 0 {
            self.uniforms_dirty |= target == GlBufferTarget::Uniform;
            return Ok(());
        }
        let data = buffer.contents.clone();
        self.write_buffer(
            target,
            name,
            GlCall::BufferSubData {
                target,
                offset: 0,
                data,
            },
        );
        Ok(())
    }

    fn render_target_size(&self, handle: ResourceHandle) -> Result<(u32, u32), RenderError> {
        self.ready()?;
        match &self
            .resources
            .validate(handle, &ResourceType::RENDER_TARGETS)?
            .payload
        {
            GlResource::SwapChain { width, height, .. } => Ok((*width, *height)),
            GlResource::Framebuffer { layout, .. } => Ok((layout.width, layout.height)),
            _ => Err(ResourceError::NotFound { handle }.into()),
        }
    }

    fn resize_swap_chain(
        &mut self,
        swap_chain: ResourceHandle,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        self.ready()?;
        let entry = self
            .resources
            .validate_mut(swap_chain, &[ResourceType::SwapChain])?;
        if let GlResource::SwapChain {
            surface,
            width: current_width,
            height: current_height,
        } = &mut entry.payload
        {
            *current_width = width.max(1);
            *current_height = height.max(1);
            self.context.issue(GlCall::ResizeSurface {
                surface: *surface,
                width: *current_width,
                height: *current_height,
            });
        }
        Ok(())
    }

    fn present(&mut self, swap_chain: ResourceHandle) -> Result<(), RenderError> {
        self.ready()?;
        let entry = self
            .resources
            .validate(swap_chain, &[ResourceType::SwapChain])?;
        if let GlResource::SwapChain { surface, .. } = entry.payload {
            self.context.issue(GlCall::SwapBuffers { surface });
        }
        Ok(())
    }

    fn submit_command_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
    ) -> Result<SubmissionStats, RenderError> {
        self.ready()?;
        let dispatch = self.dispatch;
        Ok(dispatch.execute(self, command_buffer))
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        self.ready()?;
        self.context.issue(GlCall::Flush);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), RenderError> {
        self.ready()?;
        self.context.issue(GlCall::Finish);
        Ok(())
    }

    fn statistics(&self) -> &ResourceStatistics {
        self.resources.statistics()
    }

    fn leak_report(&self) -> LeakReport {
        self.resources.leak_report()
    }
}
