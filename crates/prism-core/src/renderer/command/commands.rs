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

//! Dispatch indices and the argument struct of every command.
//!
//! Argument structs are plain old data so they can be stored verbatim inside the
//! packets of a command buffer. Optional resources are stored as
//! [`ResourceHandle::pack`]ed handles (all zero means none).

use crate::renderer::api::resource::ResourceHandle;
use crate::renderer::api::state::{ScissorRectangle, Viewport};
use bytemuck::{Pod, Zeroable};

/// The dispatch index of a command; one slot per operation in a
/// [`DispatchTable`](super::DispatchTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CommandId {
    /// Writes bytes into a buffer.
    CopyResourceData = 0,
    /// Binds the graphics root signature.
    SetGraphicsRootSignature = 1,
    /// Binds a resource to a descriptor table of the root signature.
    SetGraphicsRootDescriptorTable = 2,
    /// Binds a pipeline state.
    SetGraphicsPipelineState = 3,
    /// Binds a vertex array.
    SetGraphicsVertexArray = 4,
    /// Selects the primitive topology of following draws.
    SetGraphicsPrimitiveTopology = 5,
    /// Sets the viewports.
    SetGraphicsViewports = 6,
    /// Sets the scissor rectangles.
    SetGraphicsScissorRectangles = 7,
    /// Binds the active render target.
    SetRenderTarget = 8,
    /// Clears the active render target.
    Clear = 9,
    /// Resolves a multisample framebuffer into another render target.
    ResolveMultisampleFramebuffer = 10,
    /// Copies a whole resource into another.
    CopyResource = 11,
    /// Non-indexed draws.
    Draw = 12,
    /// Indexed draws.
    DrawIndexed = 13,
    /// Inserts a debug marker.
    SetDebugMarker = 14,
    /// Opens a debug event.
    BeginDebugEvent = 15,
    /// Closes the innermost debug event.
    EndDebugEvent = 16,
}

impl CommandId {
    /// Number of operations, which is the size of every dispatch table.
    pub const COUNT: usize = 17;

    /// Every operation in dispatch index order.
    pub const ALL: [CommandId; CommandId::COUNT] = [
        CommandId::CopyResourceData,
        CommandId::SetGraphicsRootSignature,
        CommandId::SetGraphicsRootDescriptorTable,
        CommandId::SetGraphicsPipelineState,
        CommandId::SetGraphicsVertexArray,
        CommandId::SetGraphicsPrimitiveTopology,
        CommandId::SetGraphicsViewports,
        CommandId::SetGraphicsScissorRectangles,
        CommandId::SetRenderTarget,
        CommandId::Clear,
        CommandId::ResolveMultisampleFramebuffer,
        CommandId::CopyResource,
        CommandId::Draw,
        CommandId::DrawIndexed,
        CommandId::SetDebugMarker,
        CommandId::BeginDebugEvent,
        CommandId::EndDebugEvent,
    ];

    /// Decodes a raw dispatch index.
    pub fn from_raw(value: u32) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// The dispatch index.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Argument struct of a command, tied to its dispatch index.
pub trait Command: Pod {
    /// The dispatch index packets of this command are recorded with.
    const ID: CommandId;
}

macro_rules! commands {
    ($($(#[$meta:meta])* $name:ident = $id:ident { $($(#[$field_meta:meta])* $field:ident : $ty:ty),* $(,)? })*) => {
        $(
            $(#[$meta])*
            #[repr(C)]
            #[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
            pub struct $name {
                $($(#[$field_meta])* pub $field: $ty,)*
            }

            impl Command for $name {
                const ID: CommandId = CommandId::$id;
            }
        )*
    };
}

commands! {
    /// Auxiliary region: the bytes written into the resource.
    CopyResourceData = CopyResourceData {
        /// The destination buffer.
        resource: ResourceHandle,
        /// Destination offset in bytes.
        offset: u32,
    }

    /// Root signature to bind; none unbinds.
    SetGraphicsRootSignature = SetGraphicsRootSignature {
        /// The packed root signature handle.
        root_signature: ResourceHandle,
    }

    /// Resource bound to one root parameter.
    SetGraphicsRootDescriptorTable = SetGraphicsRootDescriptorTable {
        /// Index of the descriptor-table parameter.
        root_parameter_index: u32,
        /// The packed resource handle; none unbinds.
        resource: ResourceHandle,
    }

    /// Pipeline state to bind.
    SetGraphicsPipelineState = SetGraphicsPipelineState {
        /// The packed pipeline state handle.
        pipeline_state: ResourceHandle,
    }

    /// Vertex array to bind.
    SetGraphicsVertexArray = SetGraphicsVertexArray {
        /// The packed vertex array handle.
        vertex_array: ResourceHandle,
    }

    /// Topology of following draws.
    SetGraphicsPrimitiveTopology = SetGraphicsPrimitiveTopology {
        /// Raw [`PrimitiveTopology`](crate::renderer::PrimitiveTopology) value.
        primitive_topology: u32,
    }

    /// A single viewport is stored inline; more go to the auxiliary region.
    SetGraphicsViewports = SetGraphicsViewports {
        /// Number of viewports.
        number_of_viewports: u32,
        /// The viewport when stored inline.
        viewport: Viewport,
    }

    /// A single rectangle is stored inline; more go to the auxiliary region.
    SetGraphicsScissorRectangles = SetGraphicsScissorRectangles {
        /// Number of scissor rectangles.
        number_of_scissor_rectangles: u32,
        /// The rectangle when stored inline.
        scissor_rectangle: ScissorRectangle,
    }

    /// Render target to bind.
    SetRenderTarget = SetRenderTarget {
        /// The packed swap chain or framebuffer handle; none unbinds.
        render_target: ResourceHandle,
    }

    /// Clear of the active render target.
    Clear = Clear {
        /// Raw [`ClearFlags`](crate::renderer::ClearFlags) bits.
        clear_flags: u32,
        /// RGBA clear color.
        color: [f32; 4],
        /// Depth clear value.
        z: f32,
        /// Stencil clear value.
        stencil: u32,
    }

    /// Multisample resolve.
    ResolveMultisampleFramebuffer = ResolveMultisampleFramebuffer {
        /// The destination render target.
        destination_render_target: ResourceHandle,
        /// The multisample framebuffer.
        source_multisample_framebuffer: ResourceHandle,
    }

    /// Whole resource copy.
    CopyResource = CopyResource {
        /// The destination resource.
        destination_resource: ResourceHandle,
        /// The source resource.
        source_resource: ResourceHandle,
    }

    /// Draws reading their arguments from an indirect buffer, or from the auxiliary
    /// region when no indirect buffer is given.
    Draw = Draw {
        /// The packed indirect buffer handle.
        indirect_buffer: ResourceHandle,
        /// Offset of the first record in the indirect buffer.
        indirect_buffer_offset: u32,
        /// Number of argument records.
        number_of_draws: u32,
    }

    /// Indexed draws, with the same argument storage as [`Draw`].
    DrawIndexed = DrawIndexed {
        /// The packed indirect buffer handle.
        indirect_buffer: ResourceHandle,
        /// Offset of the first record in the indirect buffer.
        indirect_buffer_offset: u32,
        /// Number of argument records.
        number_of_draws: u32,
    }

    /// Auxiliary region: the UTF-8 marker name.
    SetDebugMarker = SetDebugMarker {
        /// Length of the name in bytes.
        name_length: u32,
    }

    /// Auxiliary region: the UTF-8 event name.
    BeginDebugEvent = BeginDebugEvent {
        /// Length of the name in bytes.
        name_length: u32,
    }

    /// Closes the innermost debug event.
    EndDebugEvent = EndDebugEvent {
        /// Unused.
        reserved: u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_indices_are_dense() {
        for (index, id) in CommandId::ALL.iter().enumerate() {
            assert_eq!(id.index(), index);
            assert_eq!(CommandId::from_raw(index as u32), Some(*id));
        }
        assert_eq!(CommandId::from_raw(CommandId::COUNT as u32), None);
    }

    #[test]
    fn argument_structs_have_no_padding() {
        assert_eq!(core::mem::size_of::<SetGraphicsViewports>(), 4 + 24);
        assert_eq!(core::mem::size_of::<Clear>(), 28);
        assert_eq!(core::mem::size_of::<Draw>(), 16);
        assert_eq!(<DrawIndexed as Command>::ID, CommandId::DrawIndexed);
    }
}
