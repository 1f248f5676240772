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

//! Pipeline state description.

use crate::renderer::api::resource::ResourceHandle;
use crate::renderer::api::state::{
    BlendState, DepthStencilState, PrimitiveTopologyType, RasterizerState,
};

/// A descriptor used to create an immutable pipeline state.
///
/// The pipeline state retains a reference to its root signature and program for as
/// long as it lives.
#[derive(Debug, Clone)]
pub struct PipelineStateDescriptor {
    /// The binding layout the program was linked against.
    pub root_signature: ResourceHandle,
    /// The linked program.
    pub program: ResourceHandle,
    /// The primitive class the pipeline draws.
    pub primitive_topology_type: PrimitiveTopologyType,
    /// Rasterizer state.
    pub rasterizer: RasterizerState,
    /// Depth and stencil state.
    pub depth_stencil: DepthStencilState,
    /// Blend state.
    pub blend: BlendState,
    /// Number of color targets the pipeline writes.
    pub number_of_render_targets: u32,
}

impl PipelineStateDescriptor {
    /// A pipeline with default fixed-function state and one render target.
    pub fn new(root_signature: ResourceHandle, program: ResourceHandle) -> Self {
        Self {
            root_signature,
            program,
            primitive_topology_type: PrimitiveTopologyType::Triangle,
            rasterizer: RasterizerState::default(),
            depth_stencil: DepthStencilState::default(),
            blend: BlendState::default(),
            number_of_render_targets: 1,
        }
    }
}
