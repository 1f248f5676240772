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

//! Draw argument records.
//!
//! The same records are read by native indirect draws and by the software
//! emulation of indirect draws, so their layout is fixed:
//!
//! - [`DrawArguments`]: four `u32`, 16 bytes.
//! - [`DrawIndexedArguments`]: `u32, u32, u32, i32, u32`, 20 bytes.

use bytemuck::{Pod, Zeroable};

/// Arguments of one non-indexed, instanced draw.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawArguments {
    /// Vertices drawn per instance.
    pub vertex_count_per_instance: u32,
    /// Number of instances; `1` for a plain draw.
    pub instance_count: u32,
    /// First vertex read from the vertex buffers.
    pub start_vertex_location: u32,
    /// First instance id.
    pub start_instance_location: u32,
}

impl DrawArguments {
    /// Size of one record in bytes.
    pub const SIZE_BYTES: usize = core::mem::size_of::<Self>();

    /// A single-instance draw of `vertex_count` vertices.
    pub const fn new(vertex_count: u32) -> Self {
        Self {
            vertex_count_per_instance: vertex_count,
            instance_count: 1,
            start_vertex_location: 0,
            start_instance_location: 0,
        }
    }

    /// View this record as raw bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Arguments of one indexed, instanced draw.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawIndexedArguments {
    /// Indices read per instance.
    pub index_count_per_instance: u32,
    /// Number of instances; `1` for a plain draw.
    pub instance_count: u32,
    /// First index read from the index buffer.
    pub start_index_location: u32,
    /// Value added to each index before reading the vertex buffers.
    pub base_vertex_location: i32,
    /// First instance id.
    pub start_instance_location: u32,
}

impl DrawIndexedArguments {
    /// Size of one record in bytes.
    pub const SIZE_BYTES: usize = core::mem::size_of::<Self>();

    /// A single-instance draw of `index_count` indices.
    pub const fn new(index_count: u32) -> Self {
        Self {
            index_count_per_instance: index_count,
            instance_count: 1,
            start_index_location: 0,
            base_vertex_location: 0,
            start_instance_location: 0,
        }
    }

    /// View this record as raw bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
