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

//! Vertex input layout and vertex array descriptions.

use crate::renderer::api::resource::ResourceHandle;
use std::borrow::Cow;

/// The memory format of a single vertex attribute's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    /// Four 8-bit unsigned integer components normalized to `[0.0, 1.0]`.
    Unorm8x4,
    /// Four 8-bit unsigned integer components.
    Uint8x4,
    /// Two 16-bit signed integer components.
    Sint16x2,
    /// Four 16-bit signed integer components.
    Sint16x4,
    /// One 32-bit float component.
    Float32,
    /// Two 32-bit float components.
    Float32x2,
    /// Three 32-bit float components.
    Float32x3,
    /// Four 32-bit float components.
    Float32x4,
}

impl VertexFormat {
    /// Returns the size in bytes of this vertex format.
    pub const fn size(&self) -> u32 {
        match self {
            VertexFormat::Unorm8x4 | VertexFormat::Uint8x4 => 4,
            VertexFormat::Sint16x2 => 4,
            VertexFormat::Sint16x4 => 8,
            VertexFormat::Float32 => 4,
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
            VertexFormat::Float32x4 => 16,
        }
    }

    /// Number of components per attribute.
    pub const fn components(&self) -> u32 {
        match self {
            VertexFormat::Float32 => 1,
            VertexFormat::Sint16x2 | VertexFormat::Float32x2 => 2,
            VertexFormat::Float32x3 => 3,
            VertexFormat::Unorm8x4
            | VertexFormat::Uint8x4
            | VertexFormat::Sint16x4
            | VertexFormat::Float32x4 => 4,
        }
    }

    /// Returns `true` if integer data is normalized when read as float.
    pub const fn is_normalized(&self) -> bool {
        matches!(self, VertexFormat::Unorm8x4)
    }
}

/// Describes a single vertex attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Attribute name as declared in the vertex shader.
    pub name: Cow<'static, str>,
    /// The format of the attribute's data.
    pub format: VertexFormat,
    /// Index of the vertex buffer (inside the vertex array) the attribute is read from.
    pub input_slot: u32,
    /// Byte offset of the attribute from the start of the vertex.
    pub aligned_byte_offset: u32,
    /// Byte distance between two consecutive vertices of the input slot.
    pub stride_in_bytes: u32,
    /// Zero for per-vertex data, otherwise the number of instances drawn per element.
    pub instances_per_element: u32,
}

/// The complete vertex input layout of a program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VertexAttributes {
    /// Attributes in shader location order.
    pub attributes: Vec<VertexAttribute>,
}

impl VertexAttributes {
    /// Builds a layout from the given attributes.
    pub fn new(attributes: Vec<VertexAttribute>) -> Self {
        Self { attributes }
    }

    /// Returns `true` when any attribute advances per instance.
    pub fn has_instanced_attributes(&self) -> bool {
        self.attributes
            .iter()
            .any(|attribute| attribute.instances_per_element > 0)
    }
}

/// A descriptor used to create a vertex array.
///
/// The vertex array retains a reference to every buffer it names for as long as it
/// lives.
#[derive(Debug, Clone)]
pub struct VertexArrayDescriptor {
    /// The input layout.
    pub attributes: VertexAttributes,
    /// One vertex buffer per input slot.
    pub vertex_buffers: Vec<ResourceHandle>,
    /// Optional index buffer for indexed draws.
    pub index_buffer: Option<ResourceHandle>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instanced_layout_is_detected() {
        let mut attributes = VertexAttributes::new(vec![VertexAttribute {
            name: Cow::Borrowed("Position"),
            format: VertexFormat::Float32x3,
            input_slot: 0,
            aligned_byte_offset: 0,
            stride_in_bytes: 12,
            instances_per_element: 0,
        }]);
        assert!(!attributes.has_instanced_attributes());

        attributes.attributes.push(VertexAttribute {
            name: Cow::Borrowed("InstanceOffset"),
            format: VertexFormat::Float32x2,
            input_slot: 1,
            aligned_byte_offset: 0,
            stride_in_bytes: 8,
            instances_per_element: 1,
        });
        assert!(attributes.has_instanced_attributes());
        assert_eq!(VertexFormat::Float32x3.size(), 12);
        assert_eq!(VertexFormat::Float32x3.components(), 3);
    }
}
