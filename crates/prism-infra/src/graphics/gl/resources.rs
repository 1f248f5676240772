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

use super::calls::{GlBufferTarget, GlCall, GlInternalFormat, GlObjectKind, GlTextureTarget};
use super::context::GlContext;
use prism_core::renderer::binding::{RootParameterBindings, SamplerTable};
use prism_core::renderer::render_target::FramebufferLayout;
use prism_core::renderer::resource::{OwnsReferences, ResourceBase};
use prism_core::renderer::{
    BlendState, DepthStencilState, IndexFormat, MapType, RasterizerState, ResourceHandle,
    RootSignatureDescriptor, SamplerState, ShaderStage, TextureDimension, TextureFlags,
    TextureFormat, VertexAttributes,
};

/// Where a root parameter lands in a linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GlLocation {
    /// Uniform buffer binding point, equal to the parameter index.
    UniformBlock { binding: u32 },
    /// Uniform buffer emulated by a `vec4` uniform array, uploaded before draws.
    Uniform { location: i32 },
    /// Texture unit, equal to the base register of the range.
    TextureUnit { unit: u32 },
}

/// A buffer of any kind. The system memory copy is authoritative; `name` is 0 when
/// the buffer has no GL object (emulated uniform and indirect buffers).
#[derive(Debug)]
pub(crate) struct GlBuffer {
    pub name: u32,
    pub target: GlBufferTarget,
    pub contents: Vec<u8>,
    pub mapped: Option<MapType>,
    pub index_format: Option<IndexFormat>,
    /// Texture object and texel format of texture buffers.
    pub texture: Option<(u32, GlInternalFormat)>,
}

#[derive(Debug)]
pub(crate) struct GlVertexArray {
    /// 0 when vertex array objects are emulated.
    pub vertex_array: u32,
    pub attributes: VertexAttributes,
    pub vertex_buffers: Vec<ResourceHandle>,
    pub buffer_names: Vec<u32>,
    pub index_buffer: Option<ResourceHandle>,
    pub index: Option<(u32, IndexFormat)>,
}

#[derive(Debug)]
pub(crate) struct GlTexture {
    pub name: u32,
    pub target: GlTextureTarget,
    pub dimension: TextureDimension,
    pub format: TextureFormat,
    pub flags: TextureFlags,
}

#[derive(Debug)]
pub(crate) struct GlPipelineState {
    pub root_signature: ResourceHandle,
    pub program: ResourceHandle,
    pub program_name: u32,
    pub rasterizer: RasterizerState,
    pub depth_stencil: DepthStencilState,
    pub blend: BlendState,
}

/// What the GL back end keeps per resource.
#[derive(Debug)]
pub(crate) enum GlResource {
    SwapChain {
        surface: u32,
        width: u32,
        height: u32,
    },
    Framebuffer {
        framebuffer: u32,
        layout: FramebufferLayout,
    },
    Buffer(GlBuffer),
    VertexArray(GlVertexArray),
    Texture(GlTexture),
    RootSignature {
        descriptor: RootSignatureDescriptor,
        samplers: SamplerTable,
    },
    PipelineState(GlPipelineState),
    SamplerState {
        sampler: u32,
        state: SamplerState,
    },
    Shader {
        shader: u32,
        stage: ShaderStage,
        language: &'static str,
    },
    Program {
        program: u32,
        bindings: RootParameterBindings<GlLocation>,
    },
}

impl GlResource {
    pub fn as_buffer(&self) -> Option<&GlBuffer> {
        match self {
            GlResource::Buffer(buffer) => Some(buffer),
            _ => None,
        }
    }

    pub fn as_buffer_mut(&mut self) -> Option<&mut GlBuffer> {
        match self {
            GlResource::Buffer(buffer) => Some(buffer),
            _ => None,
        }
    }

    pub fn as_texture(&self) -> Option<&GlTexture> {
        match self {
            GlResource::Texture(texture) => Some(texture),
            _ => None,
        }
    }

    /// Texture object of a texture or a texture buffer.
    pub fn texture_name(&self) -> u32 {
        match self {
            GlResource::Texture(texture) => texture.name,
            GlResource::Buffer(buffer) => buffer.texture.map_or(0, |(texture, _)| texture),
            _ => 0,
        }
    }

    /// Framebuffer name of a render target, 0 for swap chains.
    pub fn framebuffer_name(&self) -> u32 {
        match self {
            GlResource::Framebuffer { framebuffer, .. } => *framebuffer,
            _ => 0,
        }
    }
}

impl OwnsReferences for GlResource {
    fn owned_references(&self) -> Vec<ResourceHandle> {
        match self {
            GlResource::Framebuffer { layout, .. } => layout.owned_references(),
            GlResource::VertexArray(vertex_array) => vertex_array
                .vertex_buffers
                .iter()
                .copied()
                .chain(vertex_array.index_buffer)
                .collect(),
            GlResource::RootSignature { samplers, .. } => samplers.handles().collect(),
            GlResource::PipelineState(pipeline) => vec![pipeline.root_signature, pipeline.program],
            _ => Vec::new(),
        }
    }
}

/// Deletes the GL objects of a resource whose last reference was released.
pub(crate) fn destroy_native<C: GlContext>(context: &mut C, base: ResourceBase, payload: GlResource) {
    log::debug!("Deleting GL objects of {} {:?}", base.resource_type, base.handle);
    let mut delete = |kind, name| {
        if name != 0 {
            context.issue(GlCall::Delete { kind, name });
        }
    };
    match payload {
        GlResource::SwapChain { surface, .. } => delete(GlObjectKind::Surface, surface),
        GlResource::Framebuffer { framebuffer, .. } => {
            delete(GlObjectKind::Framebuffer, framebuffer)
        }
        GlResource::Buffer(buffer) => {
            if let Some((texture, _)) = buffer.texture {
                delete(GlObjectKind::Texture, texture);
            }
            delete(GlObjectKind::Buffer, buffer.name);
        }
        GlResource::VertexArray(vertex_array) => {
            delete(GlObjectKind::VertexArray, vertex_array.vertex_array)
        }
        GlResource::Texture(texture) => delete(GlObjectKind::Texture, texture.name),
        GlResource::SamplerState { sampler, .. } => delete(GlObjectKind::Sampler, sampler),
        GlResource::Shader { shader, stage, .. } => delete(GlObjectKind::Shader(stage), shader),
        GlResource::Program { program, .. } => delete(GlObjectKind::Program, program),
        GlResource::RootSignature { .. } | GlResource::PipelineState(_) => {}
    }
}
