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

use crate::renderer::api::resource::ResourceHandle;
use crate::renderer::api::state::{ClearFlags, PrimitiveTopology, ScissorRectangle, Viewport};
use crate::renderer::error::RenderError;

/// The native side of every command: one method per dispatch index.
///
/// The [`DispatchTable`](crate::renderer::DispatchTable) of a back end decodes
/// packets and calls these methods; they can also be called directly, without
/// recording a command buffer.
///
/// Every method validates its resources against the renderer and returns an error,
/// without issuing any native call and without touching bound state, when
/// validation fails. Errors never leave the renderer in an unusable state.
pub trait CommandExecutor {
    /// Name of the back end, used as prefix of every diagnostic.
    fn backend_name(&self) -> &'static str;

    /// Writes `data` into a buffer at `offset`.
    fn copy_resource_data(
        &mut self,
        resource: ResourceHandle,
        offset: u32,
        data: &[u8],
    ) -> Result<(), RenderError>;

    /// Binds the graphics root signature; `None` unbinds.
    fn set_graphics_root_signature(
        &mut self,
        root_signature: Option<ResourceHandle>,
    ) -> Result<(), RenderError>;

    /// Binds a resource to the single-range descriptor table at `root_parameter_index`.
    ///
    /// Fails if no root signature is set, if the index is out of range, if the
    /// parameter is not a single-range descriptor table, if the resource type does
    /// not match the declared range type, or if the parameter is only visible to
    /// stages the back end lacks.
    fn set_graphics_root_descriptor_table(
        &mut self,
        root_parameter_index: u32,
        resource: Option<ResourceHandle>,
    ) -> Result<(), RenderError>;

    /// Binds a pipeline state: uses its program and applies its fixed-function state.
    fn set_graphics_pipeline_state(
        &mut self,
        pipeline_state: Option<ResourceHandle>,
    ) -> Result<(), RenderError>;

    /// Binds a vertex array.
    fn set_graphics_vertex_array(
        &mut self,
        vertex_array: Option<ResourceHandle>,
    ) -> Result<(), RenderError>;

    /// Selects the topology of following draws.
    fn set_graphics_primitive_topology(
        &mut self,
        primitive_topology: PrimitiveTopology,
    ) -> Result<(), RenderError>;

    /// Sets the viewports.
    fn set_graphics_viewports(&mut self, viewports: &[Viewport]) -> Result<(), RenderError>;

    /// Sets the scissor rectangles.
    fn set_graphics_scissor_rectangles(
        &mut self,
        scissor_rectangles: &[ScissorRectangle],
    ) -> Result<(), RenderError>;

    /// Changes the active render target; see
    /// [`RenderTargetState::set`](crate::renderer::render_target::RenderTargetState::set).
    fn set_render_target(
        &mut self,
        render_target: Option<ResourceHandle>,
    ) -> Result<(), RenderError>;

    /// Clears the active render target.
    fn clear(
        &mut self,
        flags: ClearFlags,
        color: [f32; 4],
        z: f32,
        stencil: u32,
    ) -> Result<(), RenderError>;

    /// Resolves a multisample framebuffer into a render target.
    fn resolve_multisample_framebuffer(
        &mut self,
        destination_render_target: ResourceHandle,
        source_multisample_framebuffer: ResourceHandle,
    ) -> Result<(), RenderError>;

    /// Copies a whole resource into another.
    fn copy_resource(
        &mut self,
        destination_resource: ResourceHandle,
        source_resource: ResourceHandle,
    ) -> Result<(), RenderError>;

    /// Draws `number_of_draws` records read from an indirect buffer.
    fn draw_indirect(
        &mut self,
        indirect_buffer: ResourceHandle,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) -> Result<(), RenderError>;

    /// Draws `number_of_draws` indexed records read from an indirect buffer.
    fn draw_indexed_indirect(
        &mut self,
        indirect_buffer: ResourceHandle,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) -> Result<(), RenderError>;

    /// Draws records read from system memory, one native draw per record.
    fn draw_emulated(
        &mut self,
        emulation_data: &[u8],
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) -> Result<(), RenderError>;

    /// Draws indexed records read from system memory, one native draw per record.
    fn draw_indexed_emulated(
        &mut self,
        emulation_data: &[u8],
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) -> Result<(), RenderError>;

    /// Inserts a debug marker. A no-op when debug markers are disabled.
    fn set_debug_marker(&mut self, name: &str) -> Result<(), RenderError>;

    /// Opens a debug event. A no-op when debug markers are disabled.
    fn begin_debug_event(&mut self, name: &str) -> Result<(), RenderError>;

    /// Closes the innermost debug event. A no-op when debug markers are disabled.
    fn end_debug_event(&mut self) -> Result<(), RenderError>;
}
