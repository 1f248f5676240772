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

use super::buffer::CommandBuffer;
use super::commands::*;
use super::packet::Packet;
use crate::renderer::api::resource::ResourceHandle;
use crate::renderer::api::state::{ClearFlags, PrimitiveTopology, ScissorRectangle, Viewport};
use crate::renderer::error::{CommandError, RenderError};
use crate::renderer::traits::CommandExecutor;
use bytemuck::Pod;

/// Decodes one packet and forwards it to the executor.
pub type CommandHandler<E> = fn(&mut E, &Packet<'_>) -> Result<(), RenderError>;

/// A packet that was not executed.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    /// Byte offset of the packet.
    pub offset: u32,
    /// The operation, when the dispatch index was known.
    pub command: Option<CommandId>,
    /// Why it was rejected.
    pub error: RenderError,
}

/// The outcome of one command buffer submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionStats {
    /// Packets executed successfully.
    pub executed: u32,
    /// Packets rejected with a diagnostic and skipped.
    pub rejected: u32,
    /// Why each rejected packet was rejected, in order.
    pub rejections: Vec<Rejection>,
}

impl SubmissionStats {
    /// Returns `true` if every packet executed.
    pub fn is_clean(&self) -> bool {
        self.rejected == 0
    }
}

/// The fixed-size `dispatch index -> handler` table of one back end.
///
/// Every back end instantiates the same table with itself as executor; the
/// handlers only decode packets, all native work happens in the executor.
pub struct DispatchTable<E> {
    handlers: [CommandHandler<E>; CommandId::COUNT],
}

impl<E> Clone for DispatchTable<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for DispatchTable<E> {}

impl<E> std::fmt::Debug for DispatchTable<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchTable")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl<E: CommandExecutor> Default for DispatchTable<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor> DispatchTable<E> {
    /// The table whose slots forward to the methods of `E`.
    pub fn new() -> Self {
        Self {
            handlers: [
                copy_resource_data::<E>,
                set_graphics_root_signature::<E>,
                set_graphics_root_descriptor_table::<E>,
                set_graphics_pipeline_state::<E>,
                set_graphics_vertex_array::<E>,
                set_graphics_primitive_topology::<E>,
                set_graphics_viewports::<E>,
                set_graphics_scissor_rectangles::<E>,
                set_render_target::<E>,
                clear::<E>,
                resolve_multisample_framebuffer::<E>,
                copy_resource::<E>,
                draw::<E>,
                draw_indexed::<E>,
                set_debug_marker::<E>,
                begin_debug_event::<E>,
                end_debug_event::<E>,
            ],
        }
    }

    /// The handler of one operation.
    pub fn handler(&self, command: CommandId) -> CommandHandler<E> {
        self.handlers[command.index()]
    }

    /// Executes every packet of `command_buffer`, in order, exactly once.
    ///
    /// A rejected packet is logged and skipped; execution continues with the next
    /// one. A broken packet chain ends the walk.
    pub fn execute(&self, executor: &mut E, command_buffer: &CommandBuffer) -> SubmissionStats {
        let mut stats = SubmissionStats::default();
        for packet in command_buffer.packets() {
            let packet = match packet {
                Ok(packet) => packet,
                Err(err) => {
                    log::warn!("{}: {err}", executor.backend_name());
                    stats.reject(err.offset().unwrap_or_default(), None, err.into());
                    break;
                }
            };

            let Some(command) = packet.command() else {
                let err = CommandError::UnknownCommand {
                    command_id: packet.command_id,
                    offset: packet.offset,
                };
                log::warn!("{}: {err}", executor.backend_name());
                stats.reject(packet.offset, None, err.into());
                continue;
            };

            match self.handler(command)(executor, &packet) {
                Ok(()) => stats.executed += 1,
                Err(err) => {
                    log::warn!(
                        "{}: {command:?} at offset {} rejected: {err}",
                        executor.backend_name(),
                        packet.offset
                    );
                    stats.reject(packet.offset, Some(command), err);
                }
            }
        }
        stats
    }
}

impl SubmissionStats {
    fn reject(&mut self, offset: u32, command: Option<CommandId>, error: RenderError) {
        self.rejected += 1;
        self.rejections.push(Rejection {
            offset,
            command,
            error,
        });
    }
}

fn arguments<A: Command>(packet: &Packet<'_>) -> Result<A, RenderError> {
    Ok(packet.read_arguments::<A>(A::ID)?)
}

/// Entries stored inline when the auxiliary region is empty, in the auxiliary
/// region otherwise.
fn inline_or_auxiliary<T: Pod>(
    packet: &Packet<'_>,
    command: CommandId,
    count: u32,
    inline: T,
) -> Result<Vec<T>, RenderError> {
    if !packet.auxiliary.is_empty() {
        return Ok(packet.auxiliary_records(command, count)?);
    }
    match count {
        0 => Ok(Vec::new()),
        1 => Ok(vec![inline]),
        _ => Err(CommandError::Truncated {
            command,
            expected: count as usize * core::mem::size_of::<T>(),
            found: 0,
        }
        .into()),
    }
}

fn debug_name<'a>(packet: &Packet<'a>, command: CommandId) -> Result<&'a str, RenderError> {
    std::str::from_utf8(packet.auxiliary).map_err(|_| {
        CommandError::InvalidArgument {
            command,
            details: "debug name is not valid UTF-8",
        }
        .into()
    })
}

fn copy_resource_data<E: CommandExecutor>(
    executor: &mut E,
    packet: &Packet<'_>,
) -> Result<(), RenderError> {
    let args: CopyResourceData = arguments(packet)?;
    executor.copy_resource_data(args.resource, args.offset, packet.auxiliary)
}

fn set_graphics_root_signature<E: CommandExecutor>(
    executor: &mut E,
    packet: &Packet<'_>,
) -> Result<(), RenderError> {
    let args: SetGraphicsRootSignature = arguments(packet)?;
    executor.set_graphics_root_signature(args.root_signature.unpack())
}

fn set_graphics_root_descriptor_table<E: CommandExecutor>(
    executor: &mut E,
    packet: &Packet<'_>,
) -> Result<(), RenderError> {
    let args: SetGraphicsRootDescriptorTable = arguments(packet)?;
    executor.set_graphics_root_descriptor_table(args.root_parameter_index, args.resource.unpack())
}

fn set_graphics_pipeline_state<E: CommandExecutor>(
    executor: &mut E,
    packet: &Packet<'_>,
) -> Result<(), RenderError> {
    let args: SetGraphicsPipelineState = arguments(packet)?;
    executor.set_graphics_pipeline_state(args.pipeline_state.unpack())
}

fn set_graphics_vertex_array<E: CommandExecutor>(
    executor: &mut E,
    packet: &Packet<'_>,
) -> Result<(), RenderError> {
    let args: SetGraphicsVertexArray = arguments(packet)?;
    executor.set_graphics_vertex_array(args.vertex_array.unpack())
}

fn set_graphics_primitive_topology<E: CommandExecutor>(
    executor: &mut E,
    packet: &Packet<'_>,
) -> Result<(), RenderError> {
    let args: SetGraphicsPrimitiveTopology = arguments(packet)?;
    let topology = PrimitiveTopology::from_raw(args.primitive_topology).ok_or(
        CommandError::InvalidArgument {
            command: CommandId::SetGraphicsPrimitiveTopology,
            details: "unknown primitive topology",
        },
    )?;
    executor.set_graphics_primitive_topology(topology)
}

fn set_graphics_viewports<E: CommandExecutor>(
    executor: &mut E,
    packet: &Packet<'_>,
) -> Result<(), RenderError> {
    let args: SetGraphicsViewports = arguments(packet)?;
    let viewports: Vec<Viewport> = inline_or_auxiliary(
        packet,
        CommandId::SetGraphicsViewports,
        args.number_of_viewports,
        args.viewport,
    )?;
    executor.set_graphics_viewports(&viewports)
}

fn set_graphics_scissor_rectangles<E: CommandExecutor>(
    executor: &mut E,
    packet: &Packet<'_>,
) -> Result<(), RenderError> {
    let args: SetGraphicsScissorRectangles = arguments(packet)?;
    let rectangles: Vec<ScissorRectangle> = inline_or_auxiliary(
        packet,
        CommandId::SetGraphicsScissorRectangles,
        args.number_of_scissor_rectangles,
        args.scissor_rectangle,
    )?;
    executor.set_graphics_scissor_rectangles(&rectangles)
}

fn set_render_target<E: CommandExecutor>(
    executor: &mut E,
    packet: &Packet<'_>,
) -> Result<(), RenderError> {
    let args: SetRenderTarget = arguments(packet)?;
    executor.set_render_target(args.render_target.unpack())
}

fn clear<E: CommandExecutor>(executor: &mut E, packet: &Packet<'_>) -> Result<(), RenderError> {
    let args: Clear = arguments(packet)?;
    executor.clear(
        ClearFlags::from_bits_retain(args.clear_flags),
        args.color,
        args.z,
        args.stencil,
    )
}

fn required(handle: ResourceHandle, command: CommandId) -> Result<ResourceHandle, RenderError> {
    handle.unpack().ok_or_else(|| {
        CommandError::InvalidArgument {
            command,
            details: "missing resource",
        }
        .into()
    })
}

fn resolve_multisample_framebuffer<E: CommandExecutor>(
    executor: &mut E,
    packet: &Packet<'_>,
) -> Result<(), RenderError> {
    let args: ResolveMultisampleFramebuffer = arguments(packet)?;
    executor.resolve_multisample_framebuffer(
        required(args.destination_render_target, CommandId::ResolveMultisampleFramebuffer)?,
        required(
            args.source_multisample_framebuffer,
            CommandId::ResolveMultisampleFramebuffer,
        )?,
    )
}

fn copy_resource<E: CommandExecutor>(
    executor: &mut E,
    packet: &Packet<'_>,
) -> Result<(), RenderError> {
    let args: CopyResource = arguments(packet)?;
    executor.copy_resource(
        required(args.destination_resource, CommandId::CopyResource)?,
        required(args.source_resource, CommandId::CopyResource)?,
    )
}

fn draw<E: CommandExecutor>(executor: &mut E, packet: &Packet<'_>) -> Result<(), RenderError> {
    let args: Draw = arguments(packet)?;
    match args.indirect_buffer.unpack() {
        Some(indirect_buffer) => executor.draw_indirect(
            indirect_buffer,
            args.indirect_buffer_offset,
            args.number_of_draws,
        ),
        None => executor.draw_emulated(packet.auxiliary, 0, args.number_of_draws),
    }
}

fn draw_indexed<E: CommandExecutor>(
    executor: &mut E,
    packet: &Packet<'_>,
) -> Result<(), RenderError> {
    let args: DrawIndexed = arguments(packet)?;
    match args.indirect_buffer.unpack() {
        Some(indirect_buffer) => executor.draw_indexed_indirect(
            indirect_buffer,
            args.indirect_buffer_offset,
            args.number_of_draws,
        ),
        None => executor.draw_indexed_emulated(packet.auxiliary, 0, args.number_of_draws),
    }
}

fn set_debug_marker<E: CommandExecutor>(
    executor: &mut E,
    packet: &Packet<'_>,
) -> Result<(), RenderError> {
    let _: SetDebugMarker = arguments(packet)?;
    executor.set_debug_marker(debug_name(packet, CommandId::SetDebugMarker)?)
}

fn begin_debug_event<E: CommandExecutor>(
    executor: &mut E,
    packet: &Packet<'_>,
) -> Result<(), RenderError> {
    let _: BeginDebugEvent = arguments(packet)?;
    executor.begin_debug_event(debug_name(packet, CommandId::BeginDebugEvent)?)
}

fn end_debug_event<E: CommandExecutor>(
    executor: &mut E,
    packet: &Packet<'_>,
) -> Result<(), RenderError> {
    let _: EndDebugEvent = arguments(packet)?;
    executor.end_debug_event()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::draw::{DrawArguments, DrawIndexedArguments};
    use crate::renderer::api::resource::RendererId;
    use crate::renderer::error::BindingError;

    /// Records every executor call as text.
    #[derive(Default)]
    struct Trace {
        calls: Vec<String>,
    }

    impl CommandExecutor for Trace {
        fn backend_name(&self) -> &'static str {
            "Trace"
        }

        fn copy_resource_data(
            &mut self,
            resource: ResourceHandle,
            offset: u32,
            data: &[u8],
        ) -> Result<(), RenderError> {
            self.calls
                .push(format!("copy_resource_data {resource:?} {offset} {data:?}"));
            Ok(())
        }

        fn set_graphics_root_signature(
            &mut self,
            root_signature: Option<ResourceHandle>,
        ) -> Result<(), RenderError> {
            self.calls.push(format!("root_signature {root_signature:?}"));
            Ok(())
        }

        fn set_graphics_root_descriptor_table(
            &mut self,
            root_parameter_index: u32,
            _resource: Option<ResourceHandle>,
        ) -> Result<(), RenderError> {
            Err(BindingError::ParameterIndexOutOfRange {
                parameter_index: root_parameter_index,
                number_of_parameters: 0,
            }
            .into())
        }

        fn set_graphics_pipeline_state(
            &mut self,
            _pipeline_state: Option<ResourceHandle>,
        ) -> Result<(), RenderError> {
            Ok(())
        }

        fn set_graphics_vertex_array(
            &mut self,
            _vertex_array: Option<ResourceHandle>,
        ) -> Result<(), RenderError> {
            Ok(())
        }

        fn set_graphics_primitive_topology(
            &mut self,
            primitive_topology: PrimitiveTopology,
        ) -> Result<(), RenderError> {
            self.calls.push(format!("topology {primitive_topology:?}"));
            Ok(())
        }

        fn set_graphics_viewports(&mut self, viewports: &[Viewport]) -> Result<(), RenderError> {
            self.calls.push(format!("viewports {viewports:?}"));
            Ok(())
        }

        fn set_graphics_scissor_rectangles(
            &mut self,
            scissor_rectangles: &[ScissorRectangle],
        ) -> Result<(), RenderError> {
            self.calls.push(format!("scissors {scissor_rectangles:?}"));
            Ok(())
        }

        fn set_render_target(
            &mut self,
            _render_target: Option<ResourceHandle>,
        ) -> Result<(), RenderError> {
            Ok(())
        }

        fn clear(
            &mut self,
            flags: ClearFlags,
            _color: [f32; 4],
            z: f32,
            stencil: u32,
        ) -> Result<(), RenderError> {
            self.calls.push(format!("clear {flags:?} {z} {stencil}"));
            Ok(())
        }

        fn resolve_multisample_framebuffer(
            &mut self,
            _destination_render_target: ResourceHandle,
            _source_multisample_framebuffer: ResourceHandle,
        ) -> Result<(), RenderError> {
            Ok(())
        }

        fn copy_resource(
            &mut self,
            _destination_resource: ResourceHandle,
            _source_resource: ResourceHandle,
        ) -> Result<(), RenderError> {
            Ok(())
        }

        fn draw_indirect(
            &mut self,
            indirect_buffer: ResourceHandle,
            indirect_buffer_offset: u32,
            number_of_draws: u32,
        ) -> Result<(), RenderError> {
            self.calls.push(format!(
                "draw_indirect {indirect_buffer:?} {indirect_buffer_offset} {number_of_draws}"
            ));
            Ok(())
        }

        fn draw_indexed_indirect(
            &mut self,
            _indirect_buffer: ResourceHandle,
            _indirect_buffer_offset: u32,
            _number_of_draws: u32,
        ) -> Result<(), RenderError> {
            Ok(())
        }

        fn draw_emulated(
            &mut self,
            emulation_data: &[u8],
            indirect_buffer_offset: u32,
            number_of_draws: u32,
        ) -> Result<(), RenderError> {
            self.calls.push(format!(
                "draw_emulated {} {indirect_buffer_offset} {number_of_draws}",
                emulation_data.len()
            ));
            Ok(())
        }

        fn draw_indexed_emulated(
            &mut self,
            emulation_data: &[u8],
            indirect_buffer_offset: u32,
            number_of_draws: u32,
        ) -> Result<(), RenderError> {
            self.calls.push(format!(
                "draw_indexed_emulated {} {indirect_buffer_offset} {number_of_draws}",
                emulation_data.len()
            ));
            Ok(())
        }

        fn set_debug_marker(&mut self, name: &str) -> Result<(), RenderError> {
            self.calls.push(format!("marker {name}"));
            Ok(())
        }

        fn begin_debug_event(&mut self, name: &str) -> Result<(), RenderError> {
            self.calls.push(format!("begin {name}"));
            Ok(())
        }

        fn end_debug_event(&mut self) -> Result<(), RenderError> {
            self.calls.push("end".to_string());
            Ok(())
        }
    }

    #[test]
    fn packets_reach_the_executor_in_order() {
        let handle = ResourceHandle::new(3, RendererId(9));
        let mut buffer = CommandBuffer::new();
        buffer.begin_debug_event("frame");
        buffer.set_graphics_root_signature(None);
        buffer.copy_resource_data(handle, 8, &[1, 2]);
        buffer.set_graphics_primitive_topology(PrimitiveTopology::TriangleStrip);
        buffer.clear(ClearFlags::DEPTH, [0.0; 4], 1.0, 0);
        buffer.draw_indirect(handle, 32, 2);
        buffer.draw_indexed_records(&[DrawIndexedArguments::new(3), DrawIndexedArguments::new(6)]);
        buffer.end_debug_event();

        let mut trace = Trace::default();
        let stats = DispatchTable::<Trace>::new().execute(&mut trace, &buffer);
        assert!(stats.is_clean());
        assert_eq!(stats.executed, 8);
        assert_eq!(
            trace.calls,
            vec![
                "begin frame".to_string(),
                "root_signature None".to_string(),
                format!("copy_resource_data {handle:?} 8 [1, 2]"),
                "topology TriangleStrip".to_string(),
                "clear ClearFlags(DEPTH) 1 0".to_string(),
                format!("draw_indirect {handle:?} 32 2"),
                "draw_indexed_emulated 40 0 2".to_string(),
                "end".to_string(),
            ]
        );
    }

    #[test]
    fn inline_and_auxiliary_storage_decode_identically() {
        let viewport = Viewport::new(640.0, 480.0);
        let scissor = ScissorRectangle {
            top_left_x: 1,
            top_left_y: 2,
            bottom_right_x: 3,
            bottom_right_y: 4,
        };

        let mut inline = CommandBuffer::new();
        inline.set_graphics_viewports(&[viewport]);
        inline.set_graphics_scissor_rectangles(&[scissor]);
        let mut auxiliary = CommandBuffer::new();
        auxiliary.set_graphics_viewports_auxiliary(&[viewport]);
        auxiliary.set_graphics_scissor_rectangles_auxiliary(&[scissor]);
        assert_ne!(inline.as_bytes(), auxiliary.as_bytes());

        let table = DispatchTable::<Trace>::new();
        let mut from_inline = Trace::default();
        let mut from_auxiliary = Trace::default();
        table.execute(&mut from_inline, &inline);
        table.execute(&mut from_auxiliary, &auxiliary);
        assert_eq!(from_inline.calls, from_auxiliary.calls);
        assert_eq!(from_inline.calls.len(), 2);
    }

    #[test]
    fn rejected_packets_are_skipped_not_fatal() {
        let mut buffer = CommandBuffer::new();
        buffer.set_graphics_root_descriptor_table(5, None);
        buffer.draw(DrawArguments::new(3));

        let mut trace = Trace::default();
        let stats = DispatchTable::<Trace>::new().execute(&mut trace, &buffer);
        assert_eq!(stats.executed, 1);
        assert_eq!(stats.rejected, 1);
        assert_eq!(
            stats.rejections[0].command,
            Some(CommandId::SetGraphicsRootDescriptorTable)
        );
        assert_eq!(trace.calls, vec!["draw_emulated 16 0 1".to_string()]);
    }

    #[test]
    fn test_broken_chain_is_rejected_at_the_offending_packet() {
        // --- 1. ARRANGE ---
        let mut buffer = CommandBuffer::new();
        buffer.set_graphics_primitive_topology(PrimitiveTopology::LineList);
        buffer.set_graphics_primitive_topology(PrimitiveTopology::PointList);
        buffer.end_debug_event();
        let offsets: Vec<u32> = buffer
            .packets()
            .map(|packet| packet.unwrap().offset)
            .collect();
        buffer.link(offsets[1] as usize, 0);

        // --- 2. ACT ---
        let mut trace = Trace::default();
        let stats = DispatchTable::<Trace>::new().execute(&mut trace, &buffer);

        // --- 3. ASSERT ---
        assert_eq!(stats.executed, 1, "Only the packet before the break runs");
        assert_eq!(stats.rejected, 1);
        assert_eq!(
            stats.rejections[0].offset, offsets[1],
            "The rejection should point at the packet with the bad link"
        );
        assert_eq!(stats.rejections[0].command, None);
        assert_eq!(
            stats.rejections[0].error,
            RenderError::Command(CommandError::BrokenChain {
                offset: offsets[1],
                next_offset: 0,
            })
        );
        assert_eq!(trace.calls, vec!["topology LineList".to_string()]);
    }
}
