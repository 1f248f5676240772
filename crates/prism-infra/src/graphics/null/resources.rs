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

use prism_core::renderer::binding::SamplerTable;
use prism_core::renderer::render_target::FramebufferLayout;
use prism_core::renderer::resource::OwnsReferences;
use prism_core::renderer::{
    MapType, ResourceHandle, RootSignatureDescriptor, TextureDimension, TextureFlags,
};

/// What the null back end keeps per resource.
#[derive(Debug)]
pub(crate) enum NullResource {
    SwapChain {
        width: u32,
        height: u32,
    },
    Framebuffer(FramebufferLayout),
    Buffer {
        contents: Vec<u8>,
        mapped: Option<MapType>,
    },
    VertexArray {
        vertex_buffers: Vec<ResourceHandle>,
        index_buffer: Option<ResourceHandle>,
    },
    Texture {
        dimension: TextureDimension,
        flags: TextureFlags,
    },
    RootSignature {
        descriptor: RootSignatureDescriptor,
        samplers: SamplerTable,
    },
    PipelineState {
        root_signature: ResourceHandle,
        program: ResourceHandle,
    },
    Shader {
        language: String,
    },
    Program,
    SamplerState,
}

impl OwnsReferences for NullResource {
    fn owned_references(&self) -> Vec<ResourceHandle> {
        match self {
            NullResource::Framebuffer(layout) => layout.owned_references(),
            NullResource::VertexArray {
                vertex_buffers,
                index_buffer,
            } => vertex_buffers
                .iter()
                .copied()
                .chain(index_buffer.iter().copied())
                .collect(),
            NullResource::RootSignature { samplers, .. } => samplers.handles().collect(),
            NullResource::PipelineState {
                root_signature,
                program,
            } => vec![*root_signature, *program],
            _ => Vec::new(),
        }
    }
}
