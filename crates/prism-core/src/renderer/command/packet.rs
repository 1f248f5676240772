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

use crate::renderer::command::CommandId;
use crate::renderer::error::CommandError;
use bytemuck::{Pod, Zeroable};

/// The fixed header in front of every packet.
///
/// Layout of a packet: header, argument struct (`arguments_size` bytes), auxiliary
/// bytes (`auxiliary_size` bytes), then padding up to the next 4 byte boundary.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct PacketHeader {
    /// Dispatch index, see [`CommandId`].
    pub command_id: u32,
    /// Byte offset of the next packet, or [`PacketHeader::NO_NEXT`] for the last one.
    pub next_offset: u32,
    /// Size of the argument struct in bytes.
    pub arguments_size: u32,
    /// Size of the auxiliary region in bytes; zero when unused.
    pub auxiliary_size: u32,
}

impl PacketHeader {
    /// Sentinel `next_offset` of the last packet.
    pub const NO_NEXT: u32 = u32::MAX;

    /// Size of the header in bytes.
    pub const SIZE_BYTES: usize = core::mem::size_of::<Self>();
}

/// Packets start on 4 byte boundaries.
pub(crate) const PACKET_ALIGNMENT: usize = 4;

/// One decoded packet, borrowing the command buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet<'a> {
    /// Byte offset of the packet header.
    pub offset: u32,
    /// Raw dispatch index.
    pub command_id: u32,
    /// Argument struct bytes.
    pub arguments: &'a [u8],
    /// Auxiliary bytes; empty when unused.
    pub auxiliary: &'a [u8],
}

impl<'a> Packet<'a> {
    /// The operation, if the dispatch index is known.
    pub fn command(&self) -> Option<CommandId> {
        CommandId::from_raw(self.command_id)
    }

    /// Reads the argument struct of `command`.
    pub fn read_arguments<A: Pod>(&self, command: CommandId) -> Result<A, CommandError> {
        let size = core::mem::size_of::<A>();
        if self.arguments.len() < size {
            return Err(CommandError::Truncated {
                command,
                expected: size,
                found: self.arguments.len(),
            });
        }
        Ok(bytemuck::pod_read_unaligned(&self.arguments[..size]))
    }

    /// Reads the auxiliary region as `count` consecutive records of `T`.
    pub fn auxiliary_records<T: Pod>(
        &self,
        command: CommandId,
        count: u32,
    ) -> Result<Vec<T>, CommandError> {
        let size = core::mem::size_of::<T>();
        let expected = size * count as usize;
        if self.auxiliary.len() < expected {
            return Err(CommandError::Truncated {
                command,
                expected,
                found: self.auxiliary.len(),
            });
        }
        Ok(self.auxiliary[..expected]
            .chunks_exact(size)
            .map(bytemuck::pod_read_unaligned::<T>)
            .collect())
    }
}

/// Walks the packet chain of a command buffer in recorded order.
///
/// Stops after the packet whose next offset is [`PacketHeader::NO_NEXT`]. A packet
/// that does not fit the buffer, or a next offset pointing backwards, ends the walk
/// with an error.
#[derive(Debug, Clone)]
pub struct PacketIter<'a> {
    bytes: &'a [u8],
    next: Option<usize>,
}

impl<'a> PacketIter<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            next: (!bytes.is_empty()).then_some(0),
        }
    }

    fn read(&mut self, offset: usize) -> Result<Packet<'a>, CommandError> {
        let remaining = self.bytes.len().saturating_sub(offset);
        let malformed = |expected: usize| CommandError::MalformedPacket {
            offset: offset as u32,
            expected,
            found: remaining,
        };

        let header_end = offset + PacketHeader::SIZE_BYTES;
        let header_bytes = self
            .bytes
            .get(offset..header_end)
            .ok_or_else(|| malformed(PacketHeader::SIZE_BYTES))?;
        let header: PacketHeader = bytemuck::pod_read_unaligned(header_bytes);

        let arguments_end = header_end + header.arguments_size as usize;
        let auxiliary_end = arguments_end + header.auxiliary_size as usize;
        let (Some(arguments), Some(auxiliary)) = (
            self.bytes.get(header_end..arguments_end),
            self.bytes.get(arguments_end..auxiliary_end),
        ) else {
            return Err(malformed(auxiliary_end - offset));
        };

        self.next = match header.next_offset {
            PacketHeader::NO_NEXT => None,
            next if (next as usize) >= auxiliary_end => Some(next as usize),
            next => {
                return Err(CommandError::BrokenChain {
                    offset: offset as u32,
                    next_offset: next,
                })
            }
        };

        Ok(Packet {
            offset: offset as u32,
            command_id: header.command_id,
            arguments,
            auxiliary,
        })
    }
}

impl<'a> Iterator for PacketIter<'a> {
    type Item = Result<Packet<'a>, CommandError>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.next.take()?;
        Some(self.read(offset))
    }
}
