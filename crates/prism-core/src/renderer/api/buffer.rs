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

//! Defines data structures related to GPU buffer resources.

use crate::prism_bitflags;
use crate::renderer::api::texture::TextureFormat;
use crate::renderer::error::ResourceError;
use std::borrow::Cow;

/// A hint describing how often the contents of a buffer will change.
///
/// Back ends forward the hint to the driver so it can place the buffer in the most
/// suitable memory; it never changes what operations are allowed on the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    /// Written once, drawn many times.
    #[default]
    StaticDraw,
    /// Written repeatedly, drawn many times.
    DynamicDraw,
    /// Written once per frame, drawn a few times.
    StreamDraw,
    /// Read back by the CPU.
    StaticRead,
    /// Copied from one GPU resource to another.
    StaticCopy,
}

/// Specifies the data type of indices in an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexFormat {
    /// Indices are 16-bit unsigned integers.
    #[default]
    Uint16,
    /// Indices are 32-bit unsigned integers.
    Uint32,
}

impl IndexFormat {
    /// Size of one index in bytes.
    pub const fn size(self) -> u32 {
        match self {
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }
}

prism_bitflags! {
    /// Which kind of draw argument records an indirect buffer holds.
    pub struct IndirectBufferFlags: u32 {
        /// The buffer holds [`DrawArguments`](crate::renderer::DrawArguments) records.
        const DRAW_ARGUMENTS = 1 << 0;
        /// The buffer holds [`DrawIndexedArguments`](crate::renderer::DrawIndexedArguments) records.
        const DRAW_INDEXED_ARGUMENTS = 1 << 1;
    }
}

/// A descriptor shared by every buffer kind.
#[derive(Debug, Clone, Default)]
pub struct BufferDescriptor<'a> {
    /// An optional debug label for the buffer.
    pub label: Option<Cow<'a, str>>,
    /// The total size of the buffer in bytes.
    pub size: u64,
    /// Optional initial contents. When shorter than `size` the rest is zeroed; when
    /// longer, creation fails.
    pub data: Option<&'a [u8]>,
    /// Update frequency hint.
    pub usage: BufferUsage,
}

impl<'a> BufferDescriptor<'a> {
    /// A buffer initialized with `data`, sized to fit it.
    pub fn with_data(data: &'a [u8], usage: BufferUsage) -> Self {
        Self {
            label: None,
            size: data.len() as u64,
            data: Some(data),
            usage,
        }
    }

    /// An uninitialized (zeroed) buffer of `size` bytes.
    pub fn zeroed(size: u64, usage: BufferUsage) -> Self {
        Self {
            label: None,
            size,
            data: None,
            usage,
        }
    }

    /// Produces the initial contents of the buffer, zero-padded to `size`.
    ///
    /// Returns `None` when the provided data does not fit into `size` bytes.
    pub fn initial_contents(&self) -> Option<Vec<u8>> {
        let size = usize::try_from(self.size).ok()?;
        let mut contents = vec![0u8; size];
        if let Some(data) = self.data {
            if data.len() > size {
                return None;
            }
            contents[..data.len()].copy_from_slice(data);
        }
        Some(contents)
    }
}

/// A descriptor used to create an index buffer.
#[derive(Debug, Clone, Default)]
pub struct IndexBufferDescriptor<'a> {
    /// Size, contents and usage of the buffer.
    pub buffer: BufferDescriptor<'a>,
    /// The type of each index.
    pub format: IndexFormat,
}

/// A descriptor used to create a texture buffer.
#[derive(Debug, Clone)]
pub struct TextureBufferDescriptor<'a> {
    /// Size, contents and usage of the buffer.
    pub buffer: BufferDescriptor<'a>,
    /// The texel format shaders read the buffer with.
    pub format: TextureFormat,
}

/// A descriptor used to create an indirect buffer.
#[derive(Debug, Clone)]
pub struct IndirectBufferDescriptor<'a> {
    /// Size, contents and usage of the buffer.
    pub buffer: BufferDescriptor<'a>,
    /// The kind of draw records stored in the buffer.
    pub flags: IndirectBufferFlags,
}

/// How a mapped resource will be accessed by the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapType {
    /// Read only.
    Read,
    /// Write only.
    Write,
    /// Read and write.
    ReadWrite,
    /// Write only; the previous contents may be discarded.
    WriteDiscard,
    /// Write only; the caller promises not to overwrite data in use by the GPU.
    WriteNoOverwrite,
}

impl MapType {
    /// Returns `true` if the mapping can modify the resource.
    pub fn writes(self) -> bool {
        !matches!(self, MapType::Read)
    }
}

/// CPU access to the contents of a mapped resource.
///
/// The mapping borrows the renderer mutably, so the resource cannot be bound or
/// drawn from until the borrow ends and `unmap` is called.
#[derive(Debug)]
pub struct MappedSubresource<'a> {
    /// The mapped bytes.
    pub data: &'a mut [u8],
    /// Distance in bytes between two rows (the whole size for buffers).
    pub row_pitch: u32,
    /// Distance in bytes between two depth slices (the whole size for buffers).
    pub depth_pitch: u32,
}

/// Copies `data` into `destination` at `offset`, failing without writing anything if
/// it does not fit.
pub fn write_bytes(destination: &mut [u8], offset: u64, data: &[u8]) -> Result<(), ResourceError> {
    let capacity = destination.len() as u64;
    let out_of_bounds = || ResourceError::OutOfBounds {
        offset,
        size: data.len() as u64,
        capacity,
    };
    let start = usize::try_from(offset).map_err(|_| out_of_bounds())?;
    let end = start.checked_add(data.len()).ok_or_else(out_of_bounds)?;
    destination
        .get_mut(start..end)
        .ok_or_else(out_of_bounds)?
        .copy_from_slice(data);
    Ok(())
}
