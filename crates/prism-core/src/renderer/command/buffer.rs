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

use super::commands::*;
use super::packet::{Packet, PacketHeader, PacketIter, PACKET_ALIGNMENT};
use crate::renderer::api::draw::{DrawArguments, DrawIndexedArguments};
use crate::renderer::api::resource::ResourceHandle;
use crate::renderer::api::state::{ClearFlags, PrimitiveTopology, ScissorRectangle, Viewport};
use crate::renderer::settings::RendererSettings;

/// A linear recording of command packets.
///
/// Recording needs no renderer: the same buffer can be submitted to any number of
/// renderers, any number of times. Renderers only ever read it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandBuffer {
    bytes: Vec<u8>,
    last_packet: Option<usize>,
    number_of_commands: u32,
}

impl CommandBuffer {
    /// An empty command buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty command buffer with room for `capacity` bytes of packets.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// An empty command buffer sized by [`RendererSettings::command_buffer_capacity`].
    pub fn with_settings(settings: &RendererSettings) -> Self {
        Self::with_capacity(settings.command_buffer_capacity)
    }

    /// Returns `true` if nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.number_of_commands == 0
    }

    /// Number of recorded packets.
    pub fn number_of_commands(&self) -> u32 {
        self.number_of_commands
    }

    /// The raw packet bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Forgets every recorded packet, keeping the allocation.
    pub fn reset(&mut self) {
        self.bytes.clear();
        self.last_packet = None;
        self.number_of_commands = 0;
    }

    /// Walks the recorded packets in order.
    pub fn packets(&self) -> PacketIter<'_> {
        PacketIter::new(&self.bytes)
    }

    /// Appends a copy of every packet of `other`, linked after the packets of `self`.
    pub fn append(&mut self, other: &CommandBuffer) {
        for packet in other.packets().flatten() {
            self.push_raw(packet.command_id, packet.arguments, packet.auxiliary);
        }
    }

    /// Records a packet for the argument struct `arguments` with optional auxiliary
    /// bytes.
    pub fn push<A: Command>(&mut self, arguments: &A, auxiliary: &[u8]) {
        self.push_raw(A::ID as u32, bytemuck::bytes_of(arguments), auxiliary);
    }

    fn push_raw(&mut self, command_id: u32, arguments: &[u8], auxiliary: &[u8]) {
        let offset = self.bytes.len();
        if let Some(last) = self.last_packet {
            let next_offset = core::mem::offset_of!(PacketHeader, next_offset);
            self.bytes[last + next_offset..last + next_offset + 4]
                .copy_from_slice(&(offset as u32).to_ne_bytes());
        }

        let header = PacketHeader {
            command_id,
            next_offset: PacketHeader::NO_NEXT,
            arguments_size: arguments.len() as u32,
            auxiliary_size: auxiliary.len() as u32,
        };
        self.bytes.extend_from_slice(bytemuck::bytes_of(&header));
        self.bytes.extend_from_slice(arguments);
        self.bytes.extend_from_slice(auxiliary);
        let padded = self.bytes.len().next_multiple_of(PACKET_ALIGNMENT);
        self.bytes.resize(padded, 0);

        self.last_packet = Some(offset);
        self.number_of_commands += 1;
    }

    /// Points the packet at `offset` to `next_offset`.
    #[cfg(test)]
    pub(crate) fn link(&mut self, offset: usize, next_offset: u32) {
        let field = offset + core::mem::offset_of!(PacketHeader, next_offset);
        self.bytes[field..field + 4].copy_from_slice(&next_offset.to_ne_bytes());
    }

    /// Writes `data` into a buffer at `offset` when the packet executes.
    pub fn copy_resource_data(&mut self, resource: ResourceHandle, offset: u32, data: &[u8]) {
        self.push(&CopyResourceData { resource, offset }, data);
    }

    /// Binds (or with `None` unbinds) the graphics root signature.
    pub fn set_graphics_root_signature(&mut self, root_signature: Option<ResourceHandle>) {
        self.push(
            &SetGraphicsRootSignature {
                root_signature: ResourceHandle::pack(root_signature),
            },
            &[],
        );
    }

    /// Binds a resource to the descriptor table at `root_parameter_index`.
    pub fn set_graphics_root_descriptor_table(
        &mut self,
        root_parameter_index: u32,
        resource: Option<ResourceHandle>,
    ) {
        self.push(
            &SetGraphicsRootDescriptorTable {
                root_parameter_index,
                resource: ResourceHandle::pack(resource),
            },
            &[],
        );
    }

    /// Binds a pipeline state.
    pub fn set_graphics_pipeline_state(&mut self, pipeline_state: Option<ResourceHandle>) {
        self.push(
            &SetGraphicsPipelineState {
                pipeline_state: ResourceHandle::pack(pipeline_state),
            },
            &[],
        );
    }

    /// Binds a vertex array.
    pub fn set_graphics_vertex_array(&mut self, vertex_array: Option<ResourceHandle>) {
        self.push(
            &SetGraphicsVertexArray {
                vertex_array: ResourceHandle::pack(vertex_array),
            },
            &[],
        );
    }

    /// Selects the topology of following draws.
    pub fn set_graphics_primitive_topology(&mut self, primitive_topology: PrimitiveTopology) {
        self.push(
            &SetGraphicsPrimitiveTopology {
                primitive_topology: primitive_topology as u32,
            },
            &[],
        );
    }

    /// Sets the viewports. A single viewport is stored inline in the packet.
    pub fn set_graphics_viewports(&mut self, viewports: &[Viewport]) {
        match viewports {
            [viewport] => self.push(
                &SetGraphicsViewports {
                    number_of_viewports: 1,
                    viewport: *viewport,
                },
                &[],
            ),
            _ => self.set_graphics_viewports_auxiliary(viewports),
        }
    }

    /// Sets the viewports, always storing them in the auxiliary region.
    pub fn set_graphics_viewports_auxiliary(&mut self, viewports: &[Viewport]) {
        self.push(
            &SetGraphicsViewports {
                number_of_viewports: viewports.len() as u32,
                viewport: Viewport::default(),
            },
            bytemuck::cast_slice(viewports),
        );
    }

    /// Sets the scissor rectangles. A single rectangle is stored inline in the packet.
    pub fn set_graphics_scissor_rectangles(&mut self, scissor_rectangles: &[ScissorRectangle]) {
        match scissor_rectangles {
            [scissor_rectangle] => self.push(
                &SetGraphicsScissorRectangles {
                    number_of_scissor_rectangles: 1,
                    scissor_rectangle: *scissor_rectangle,
                },
                &[],
            ),
            _ => self.set_graphics_scissor_rectangles_auxiliary(scissor_rectangles),
        }
    }

    /// Sets the scissor rectangles, always storing them in the auxiliary region.
    pub fn set_graphics_scissor_rectangles_auxiliary(
        &mut self,
        scissor_rectangles: &[ScissorRectangle],
    ) {
        self.push(
            &SetGraphicsScissorRectangles {
                number_of_scissor_rectangles: scissor_rectangles.len() as u32,
                scissor_rectangle: ScissorRectangle::default(),
            },
            bytemuck::cast_slice(scissor_rectangles),
        );
    }

    /// Binds the active render target.
    pub fn set_render_target(&mut self, render_target: Option<ResourceHandle>) {
        self.push(
            &SetRenderTarget {
                render_target: ResourceHandle::pack(render_target),
            },
            &[],
        );
    }

    /// Clears the active render target.
    pub fn clear(&mut self, flags: ClearFlags, color: [f32; 4], z: f32, stencil: u32) {
        self.push(
            &Clear {
                clear_flags: flags.bits(),
                color,
                z,
                stencil,
            },
            &[],
        );
    }

    /// Resolves a multisample framebuffer into a render target.
    pub fn resolve_multisample_framebuffer(
        &mut self,
        destination_render_target: ResourceHandle,
        source_multisample_framebuffer: ResourceHandle,
    ) {
        self.push(
            &ResolveMultisampleFramebuffer {
                destination_render_target,
                source_multisample_framebuffer,
            },
            &[],
        );
    }

    /// Copies a whole resource into another of the same kind and size.
    pub fn copy_resource(
        &mut self,
        destination_resource: ResourceHandle,
        source_resource: ResourceHandle,
    ) {
        self.push(
            &CopyResource {
                destination_resource,
                source_resource,
            },
            &[],
        );
    }

    /// Draws `number_of_draws` records read from an indirect buffer.
    pub fn draw_indirect(
        &mut self,
        indirect_buffer: ResourceHandle,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) {
        self.push(
            &Draw {
                indirect_buffer,
                indirect_buffer_offset,
                number_of_draws,
            },
            &[],
        );
    }

    /// Draws one record, stored in the packet itself.
    pub fn draw(&mut self, arguments: DrawArguments) {
        self.draw_records(&[arguments]);
    }

    /// Draws every record, stored in the packet itself.
    pub fn draw_records(&mut self, records: &[DrawArguments]) {
        self.push(
            &Draw {
                indirect_buffer: ResourceHandle::pack(None),
                indirect_buffer_offset: 0,
                number_of_draws: records.len() as u32,
            },
            bytemuck::cast_slice(records),
        );
    }

    /// Draws `number_of_draws` indexed records read from an indirect buffer.
    pub fn draw_indexed_indirect(
        &mut self,
        indirect_buffer: ResourceHandle,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) {
        self.push(
            &DrawIndexed {
                indirect_buffer,
                indirect_buffer_offset,
                number_of_draws,
            },
            &[],
        );
    }

    /// Draws one indexed record, stored in the packet itself.
    pub fn draw_indexed(&mut self, arguments: DrawIndexedArguments) {
        self.draw_indexed_records(&[arguments]);
    }

    /// Draws every indexed record, stored in the packet itself.
    pub fn draw_indexed_records(&mut self, records: &[DrawIndexedArguments]) {
        self.push(
            &DrawIndexed {
                indirect_buffer: ResourceHandle::pack(None),
                indirect_buffer_offset: 0,
                number_of_draws: records.len() as u32,
            },
            bytemuck::cast_slice(records),
        );
    }

    /// Inserts a named debug marker.
    pub fn set_debug_marker(&mut self, name: &str) {
        self.push(
            &SetDebugMarker {
                name_length: name.len() as u32,
            },
            name.as_bytes(),
        );
    }

    /// Opens a named debug event; close it with [`end_debug_event`](Self::end_debug_event).
    pub fn begin_debug_event(&mut self, name: &str) {
        self.push(
            &BeginDebugEvent {
                name_length: name.len() as u32,
            },
            name.as_bytes(),
        );
    }

    /// Closes the innermost debug event.
    pub fn end_debug_event(&mut self) {
        self.push(&EndDebugEvent::default(), &[]);
    }
}

impl<'a> IntoIterator for &'a CommandBuffer {
    type Item = Result<Packet<'a>, crate::renderer::error::CommandError>;
    type IntoIter = PacketIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.packets()
    }
}
