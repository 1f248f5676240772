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

//! Defines the generic root signature / descriptor table binding model.
//!
//! A root signature is an ordered list of parameters. Each parameter is either a
//! descriptor table (an ordered list of descriptor ranges) or a block of inline
//! constants. Back ends translate the parameters into their own binding scheme:
//! explicit slots, texture units, uniform block binding points or plain uniform
//! locations. Parameter indices are stable for the lifetime of every program and
//! pipeline state created against the signature.

use crate::prism_bitflags;
use crate::renderer::api::resource::ResourceType;
use crate::renderer::error::BindingError;
use std::borrow::Cow;

prism_bitflags! {
    /// Which shader stages can see a root parameter.
    pub struct ShaderVisibility: u32 {
        /// Vertex shader stage.
        const VERTEX = 1 << 0;
        /// Tessellation control stage.
        const TESSELLATION_CONTROL = 1 << 1;
        /// Tessellation evaluation stage.
        const TESSELLATION_EVALUATION = 1 << 2;
        /// Geometry stage.
        const GEOMETRY = 1 << 3;
        /// Fragment stage.
        const FRAGMENT = 1 << 4;
        /// Both tessellation stages.
        const TESSELLATION = 0b00110;
        /// Every graphics stage.
        const ALL_GRAPHICS = 0b11111;
    }
}

/// The kind of resource a descriptor range declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorRangeType {
    /// Sampler states.
    Sampler,
    /// Sampled textures of any shape.
    Texture,
    /// Texture buffers read through texel fetches.
    Buffer,
    /// Uniform (constant) buffers.
    UniformBuffer,
}

impl DescriptorRangeType {
    /// Returns `true` if a resource of type `resource_type` may be bound to a range
    /// of this kind.
    pub fn accepts(self, resource_type: ResourceType) -> bool {
        match self {
            DescriptorRangeType::Sampler => resource_type == ResourceType::SamplerState,
            DescriptorRangeType::Texture => resource_type.is_texture(),
            DescriptorRangeType::Buffer => resource_type == ResourceType::TextureBuffer,
            DescriptorRangeType::UniformBuffer => resource_type == ResourceType::UniformBuffer,
        }
    }
}

/// A declared span of shader registers of one resource kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DescriptorRange {
    /// Kind of the bound resources.
    pub range_type: DescriptorRangeType,
    /// Number of consecutive registers.
    pub number_of_descriptors: u32,
    /// First register. Texture ranges bind to the texture unit of the same number.
    pub base_shader_register: u32,
    /// Name of the shader variable (sampler uniform or uniform block) back ends
    /// without explicit registers resolve at link time.
    pub base_shader_register_name: Cow<'static, str>,
    /// For texture ranges: the root parameter holding the sampler state applied
    /// right after the texture is bound.
    pub sampler_root_parameter_index: Option<u32>,
}

impl DescriptorRange {
    /// A single-descriptor range.
    pub fn new(
        range_type: DescriptorRangeType,
        base_shader_register: u32,
        base_shader_register_name: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            range_type,
            number_of_descriptors: 1,
            base_shader_register,
            base_shader_register_name: base_shader_register_name.into(),
            sampler_root_parameter_index: None,
        }
    }

    /// Sets the root parameter the sampler state for this texture range lives in.
    pub fn with_sampler(mut self, sampler_root_parameter_index: u32) -> Self {
        self.sampler_root_parameter_index = Some(sampler_root_parameter_index);
        self
    }
}

/// One root signature parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RootParameter {
    /// A table of descriptor ranges.
    DescriptorTable {
        /// The ranges of the table.
        ranges: Vec<DescriptorRange>,
        /// Stages that can see the table.
        visibility: ShaderVisibility,
    },
    /// Inline 32-bit constants.
    Constants {
        /// First register of the constants.
        shader_register: u32,
        /// Number of 32-bit values.
        number_of_values: u32,
        /// Stages that can see the constants.
        visibility: ShaderVisibility,
    },
}

impl RootParameter {
    /// A descriptor table holding exactly one range.
    pub fn table(range: DescriptorRange, visibility: ShaderVisibility) -> Self {
        RootParameter::DescriptorTable {
            ranges: vec![range],
            visibility,
        }
    }

    /// Stages that can see the parameter.
    pub fn visibility(&self) -> ShaderVisibility {
        match self {
            RootParameter::DescriptorTable { visibility, .. }
            | RootParameter::Constants { visibility, .. } => *visibility,
        }
    }
}

/// A descriptor used to create a root signature; stored verbatim by every back end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RootSignatureDescriptor {
    /// Parameters in index order.
    pub parameters: Vec<RootParameter>,
}

impl RootSignatureDescriptor {
    /// Builds a signature from its parameters.
    pub fn new(parameters: Vec<RootParameter>) -> Self {
        Self { parameters }
    }

    /// Number of root parameters.
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Returns `true` if the signature declares no parameter.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Resolves the single descriptor range of the table at `parameter_index`.
    ///
    /// Fails if the index is out of range, if the parameter is not a descriptor table,
    /// or if the table holds anything but exactly one range: descriptor tables are
    /// restricted to a single range.
    pub fn descriptor_table_range(
        &self,
        parameter_index: u32,
    ) -> Result<(&DescriptorRange, ShaderVisibility), BindingError> {
        let parameter = self
            .parameters
            .get(parameter_index as usize)
            .ok_or(BindingError::ParameterIndexOutOfRange {
                parameter_index,
                number_of_parameters: self.parameters.len() as u32,
            })?;
        match parameter {
            RootParameter::DescriptorTable { ranges, visibility } => match ranges.as_slice() {
                [range] => Ok((range, *visibility)),
                _ => Err(BindingError::UnsupportedRangeCount {
                    parameter_index,
                    number_of_ranges: ranges.len() as u32,
                }),
            },
            RootParameter::Constants { .. } => {
                Err(BindingError::NotADescriptorTable { parameter_index })
            }
        }
    }
}
