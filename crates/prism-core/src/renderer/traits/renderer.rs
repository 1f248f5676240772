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

use crate::renderer::api::buffer::{
    BufferDescriptor, IndexBufferDescriptor, IndirectBufferDescriptor, MapType, MappedSubresource,
    TextureBufferDescriptor,
};
use crate::renderer::api::pipeline::PipelineStateDescriptor;
use crate::renderer::api::render_target::{FramebufferDescriptor, SwapChainDescriptor};
use crate::renderer::api::resource::{RendererId, ResourceHandle, ResourceType};
use crate::renderer::api::root_signature::RootSignatureDescriptor;
use crate::renderer::api::shader::{ProgramDescriptor, ShaderDescriptor};
use crate::renderer::api::state::SamplerState;
use crate::renderer::api::texture::{TextureDescriptor, TextureDimension, TextureFlags, TextureFormat};
use crate::renderer::api::vertex::VertexArrayDescriptor;
use crate::renderer::capabilities::Capabilities;
use crate::renderer::command::{CommandBuffer, SubmissionStats};
use crate::renderer::error::RenderError;
use crate::renderer::resource::{LeakReport, ResourceStatistics};
use crate::renderer::settings::RendererSettings;
use crate::renderer::traits::CommandExecutor;

/// A renderer instance: one native context of one back end.
///
/// Every `create_*` method returns a handle with a reference count of one, owned by
/// the caller. Every resource passed to a renderer must have been created by that
/// same renderer. A renderer whose native context failed to initialize reports
/// [`is_initialized`](Self::is_initialized) `false` and every other entry point
/// returns [`RenderError::NotInitialized`].
///
/// A renderer is used from one thread at a time; every mutating method takes
/// `&mut self`.
pub trait Renderer: CommandExecutor {
    /// The identity carried by every handle this renderer creates.
    fn renderer_id(&self) -> RendererId;

    /// Human readable name of the back end.
    fn name(&self) -> &'static str {
        self.backend_name()
    }

    /// Whether the native context is usable.
    fn is_initialized(&self) -> bool;

    /// The settings the renderer was created with.
    fn settings(&self) -> &RendererSettings;

    /// Capabilities, computed once when the renderer was created.
    fn capabilities(&self) -> &Capabilities;

    /// Name of the shading language shaders must be written in.
    fn shader_language_name(&self) -> &'static str;

    // --- Resource creation ---

    /// Creates a swap chain presenting into a native window.
    fn create_swap_chain(
        &mut self,
        descriptor: &SwapChainDescriptor,
    ) -> Result<ResourceHandle, RenderError>;

    /// Creates a framebuffer. Unsupported attachments are reported and skipped.
    fn create_framebuffer(
        &mut self,
        descriptor: &FramebufferDescriptor,
    ) -> Result<ResourceHandle, RenderError>;

    /// Creates a vertex buffer.
    fn create_vertex_buffer(
        &mut self,
        descriptor: &BufferDescriptor<'_>,
    ) -> Result<ResourceHandle, RenderError>;

    /// Creates an index buffer.
    fn create_index_buffer(
        &mut self,
        descriptor: &IndexBufferDescriptor<'_>,
    ) -> Result<ResourceHandle, RenderError>;

    /// Creates a uniform buffer.
    fn create_uniform_buffer(
        &mut self,
        descriptor: &BufferDescriptor<'_>,
    ) -> Result<ResourceHandle, RenderError>;

    /// Creates a texture buffer.
    fn create_texture_buffer(
        &mut self,
        descriptor: &TextureBufferDescriptor<'_>,
    ) -> Result<ResourceHandle, RenderError>;

    /// Creates an indirect buffer holding draw argument records.
    fn create_indirect_buffer(
        &mut self,
        descriptor: &IndirectBufferDescriptor<'_>,
    ) -> Result<ResourceHandle, RenderError>;

    /// Creates a vertex array; it retains its vertex and index buffers.
    fn create_vertex_array(
        &mut self,
        descriptor: &VertexArrayDescriptor,
    ) -> Result<ResourceHandle, RenderError>;

    /// Creates a texture of any shape.
    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor<'_>,
    ) -> Result<ResourceHandle, RenderError>;

    /// Creates a 1D texture.
    fn create_texture_1d(
        &mut self,
        width: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
        flags: TextureFlags,
    ) -> Result<ResourceHandle, RenderError> {
        self.create_texture(&TextureDescriptor {
            dimension: TextureDimension::D1 { width },
            data,
            ..TextureDescriptor::new_2d(width, 1, format, flags)
        })
    }

    /// Creates a 2D texture.
    fn create_texture_2d(
        &mut self,
        width: u32,
        height: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
        flags: TextureFlags,
    ) -> Result<ResourceHandle, RenderError> {
        self.create_texture(&TextureDescriptor {
            data,
            ..TextureDescriptor::new_2d(width, height, format, flags)
        })
    }

    /// Creates a 2D array texture.
    fn create_texture_2d_array(
        &mut self,
        width: u32,
        height: u32,
        layers: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
        flags: TextureFlags,
    ) -> Result<ResourceHandle, RenderError> {
        self.create_texture(&TextureDescriptor {
            dimension: TextureDimension::D2Array {
                width,
                height,
                layers,
            },
            data,
            ..TextureDescriptor::new_2d(width, height, format, flags)
        })
    }

    /// Creates a 3D texture.
    fn create_texture_3d(
        &mut self,
        width: u32,
        height: u32,
        depth: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
        flags: TextureFlags,
    ) -> Result<ResourceHandle, RenderError> {
        self.create_texture(&TextureDescriptor {
            dimension: TextureDimension::D3 {
                width,
                height,
                depth,
            },
            data,
            ..TextureDescriptor::new_2d(width, height, format, flags)
        })
    }

    /// Creates a cube texture.
    fn create_texture_cube(
        &mut self,
        size: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
        flags: TextureFlags,
    ) -> Result<ResourceHandle, RenderError> {
        self.create_texture(&TextureDescriptor {
            dimension: TextureDimension::Cube { size },
            data,
            ..TextureDescriptor::new_2d(size, size, format, flags)
        })
    }

    /// Creates a root signature; the description is stored verbatim.
    fn create_root_signature(
        &mut self,
        descriptor: &RootSignatureDescriptor,
    ) -> Result<ResourceHandle, RenderError>;

    /// Creates a pipeline state; it retains its root signature and program.
    fn create_pipeline_state(
        &mut self,
        descriptor: &PipelineStateDescriptor,
    ) -> Result<ResourceHandle, RenderError>;

    /// Creates an immutable sampler state.
    fn create_sampler_state(
        &mut self,
        descriptor: &SamplerState,
    ) -> Result<ResourceHandle, RenderError>;

    /// Creates a shader for one stage. The language must be
    /// [`shader_language_name`](Self::shader_language_name).
    fn create_shader(
        &mut self,
        descriptor: &ShaderDescriptor<'_>,
    ) -> Result<ResourceHandle, RenderError>;

    /// Links a program and resolves the root parameters of its root signature.
    fn create_program(
        &mut self,
        descriptor: &ProgramDescriptor,
    ) -> Result<ResourceHandle, RenderError>;

    // --- Lifetime ---

    /// Adds an owner to a resource and returns the new reference count.
    fn add_reference(&mut self, handle: ResourceHandle) -> Result<u32, RenderError>;

    /// Removes an owner and returns the remaining reference count. The resource is
    /// destroyed when it reaches zero.
    fn release(&mut self, handle: ResourceHandle) -> Result<u32, RenderError>;

    /// The current reference count of a resource.
    fn reference_count(&self, handle: ResourceHandle) -> Result<u32, RenderError>;

    /// The type tag of a resource.
    fn resource_type(&self, handle: ResourceHandle) -> Result<ResourceType, RenderError>;

    // --- Data access ---

    /// Maps a buffer for CPU access. Only buffers can be mapped, and only once at
    /// a time.
    fn map(
        &mut self,
        handle: ResourceHandle,
        map_type: MapType,
    ) -> Result<MappedSubresource<'_>, RenderError>;

    /// Ends the mapping of a buffer, uploading what a writing mapping changed.
    fn unmap(&mut self, handle: ResourceHandle) -> Result<(), RenderError>;

    // --- Render targets ---

    /// `(width, height)` of a swap chain or framebuffer.
    fn render_target_size(&self, handle: ResourceHandle) -> Result<(u32, u32), RenderError>;

    /// Resizes the back buffer of a swap chain.
    fn resize_swap_chain(
        &mut self,
        swap_chain: ResourceHandle,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError>;

    /// Presents the back buffer of a swap chain.
    fn present(&mut self, swap_chain: ResourceHandle) -> Result<(), RenderError>;

    // --- Submission ---

    /// Executes every packet of `command_buffer` in recorded order, exactly once.
    ///
    /// Rejected packets are logged, counted and skipped. Only an uninitialized
    /// renderer rejects the whole submission.
    fn submit_command_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
    ) -> Result<SubmissionStats, RenderError>;

    /// Hands queued native work to the driver.
    fn flush(&mut self) -> Result<(), RenderError>;

    /// Blocks until queued native work is done.
    fn finish(&mut self) -> Result<(), RenderError>;

    // --- Diagnostics ---

    /// Per-type counters of alive and created resources.
    fn statistics(&self) -> &ResourceStatistics;

    /// Resources currently alive, as they would be reported at teardown.
    fn leak_report(&self) -> LeakReport;
}
