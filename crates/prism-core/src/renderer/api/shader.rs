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

//! Shader stage and program descriptions.

use crate::renderer::api::resource::{ResourceHandle, ResourceType};
use crate::renderer::api::vertex::VertexAttributes;
use std::borrow::Cow;

/// Defines the programmable stage in the graphics pipeline a shader is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// The vertex shader stage.
    Vertex,
    /// The tessellation control (hull) stage.
    TessellationControl,
    /// The tessellation evaluation (domain) stage.
    TessellationEvaluation,
    /// The geometry stage.
    Geometry,
    /// The fragment (or pixel) shader stage.
    Fragment,
}

impl ShaderStage {
    /// The resource type a shader of this stage is tagged with.
    pub const fn resource_type(self) -> ResourceType {
        match self {
            ShaderStage::Vertex => ResourceType::VertexShader,
            ShaderStage::TessellationControl => ResourceType::TessellationControlShader,
            ShaderStage::TessellationEvaluation => ResourceType::TessellationEvaluationShader,
            ShaderStage::Geometry => ResourceType::GeometryShader,
            ShaderStage::Fragment => ResourceType::FragmentShader,
        }
    }

    /// Returns `true` for the tessellation stages.
    pub const fn is_tessellation(self) -> bool {
        matches!(
            self,
            ShaderStage::TessellationControl | ShaderStage::TessellationEvaluation
        )
    }
}

/// A finished shader handed over by the shader toolchain.
#[derive(Debug, Clone)]
pub struct ShaderDescriptor<'a> {
    /// The stage the shader runs in.
    pub stage: ShaderStage,
    /// Name of the shading language the source is written in. Must match the
    /// back end's [`shader_language_name`](crate::Renderer::shader_language_name).
    pub language: Cow<'a, str>,
    /// Shader source code or a textual blob understood by the back end.
    pub source: Cow<'a, str>,
}

/// A descriptor used to link a program out of shader stages.
#[derive(Debug, Clone)]
pub struct ProgramDescriptor {
    /// The root signature whose descriptor tables are resolved at link time.
    pub root_signature: ResourceHandle,
    /// The vertex input layout; attribute `i` is bound to location `i`.
    pub vertex_attributes: VertexAttributes,
    /// The vertex stage.
    pub vertex_shader: Option<ResourceHandle>,
    /// The tessellation control stage.
    pub tessellation_control_shader: Option<ResourceHandle>,
    /// The tessellation evaluation stage.
    pub tessellation_evaluation_shader: Option<ResourceHandle>,
    /// The geometry stage.
    pub geometry_shader: Option<ResourceHandle>,
    /// The fragment stage.
    pub fragment_shader: Option<ResourceHandle>,
}

impl ProgramDescriptor {
    /// Every provided stage with the stage it is expected to be.
    pub fn stages(&self) -> impl Iterator<Item = (ShaderStage, ResourceHandle)> + '_ {
        [
            (ShaderStage::Vertex, self.vertex_shader),
            (
                ShaderStage::TessellationControl,
                self.tessellation_control_shader,
            ),
            (
                ShaderStage::TessellationEvaluation,
                self.tessellation_evaluation_shader,
            ),
            (ShaderStage::Geometry, self.geometry_shader),
            (ShaderStage::Fragment, self.fragment_shader),
        ]
        .into_iter()
        .filter_map(|(stage, handle)| handle.map(|handle| (stage, handle)))
    }
}
