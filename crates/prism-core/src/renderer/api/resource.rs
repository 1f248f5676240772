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

//! Resource identity: renderer ids, resource handles and the resource type tag.

use bytemuck::{Pod, Zeroable};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_RENDERER_ID: AtomicU32 = AtomicU32::new(1);

/// The identity of one renderer instance.
///
/// Every resource handle carries the id of the renderer that created it. The id is
/// only ever compared; it never keeps a renderer alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RendererId(pub u32);

impl RendererId {
    /// Allocates a new, process-unique renderer id.
    pub fn next() -> Self {
        RendererId(NEXT_RENDERER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RendererId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "renderer#{}", self.0)
    }
}

/// An opaque handle to a resource created by a [`Renderer`](crate::Renderer).
///
/// The handle pairs a stable numeric id with the id of the owning renderer. Ids are
/// never reused by a renderer, so a handle that outlived its resource resolves to
/// "not found" instead of aliasing a newer resource.
///
/// The layout is plain old data so handles can be stored verbatim inside command
/// packets.
#[repr(C)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct ResourceHandle {
    id: u32,
    renderer: u32,
}

impl ResourceHandle {
    /// Builds a handle for resource `id` owned by `renderer`.
    ///
    /// Only resource registries should mint handles; the constructor is public so
    /// back ends living in other crates can implement their own storage.
    pub const fn new(id: u32, renderer: RendererId) -> Self {
        Self {
            id,
            renderer: renderer.0,
        }
    }

    /// The resource id, unique within its renderer.
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// The renderer that created this resource.
    pub const fn renderer(&self) -> RendererId {
        RendererId(self.renderer)
    }

    /// Packs an optional handle into its command-packet representation (all zero = none).
    pub fn pack(handle: Option<ResourceHandle>) -> ResourceHandle {
        handle.unwrap_or_else(ResourceHandle::zeroed)
    }

    /// Unpacks a handle read from a command packet.
    pub fn unpack(self) -> Option<ResourceHandle> {
        if self.id == 0 {
            None
        } else {
            Some(self)
        }
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceHandle({}@{})", self.id, self.renderer)
    }
}

/// The closed set of resource kinds a renderer can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceType {
    /// A swap chain presenting into a native window.
    SwapChain,
    /// An off-screen render target made of texture attachments.
    Framebuffer,
    /// A buffer of vertex data.
    VertexBuffer,
    /// A buffer of 16 or 32 bit indices.
    IndexBuffer,
    /// A buffer of shader constants.
    UniformBuffer,
    /// A buffer read through a texture fetch.
    TextureBuffer,
    /// A buffer of draw argument records.
    IndirectBuffer,
    /// Vertex input layout plus the bound vertex and index buffers.
    VertexArray,
    /// A one dimensional texture.
    Texture1D,
    /// A two dimensional texture.
    Texture2D,
    /// An array of two dimensional textures.
    Texture2DArray,
    /// A volume texture.
    Texture3D,
    /// A cube map.
    TextureCube,
    /// Immutable pipeline state: program, root signature and fixed-function state.
    PipelineState,
    /// The declared shape of all resource bindings of a pipeline.
    RootSignature,
    /// Immutable sampler state.
    SamplerState,
    /// A compiled vertex shader.
    VertexShader,
    /// A compiled tessellation control (hull) shader.
    TessellationControlShader,
    /// A compiled tessellation evaluation (domain) shader.
    TessellationEvaluationShader,
    /// A compiled geometry shader.
    GeometryShader,
    /// A compiled fragment (pixel) shader.
    FragmentShader,
    /// A linked program.
    Program,
}

impl ResourceType {
    /// Every resource type, in declaration order.
    pub const ALL: [ResourceType; 22] = [
        ResourceType::SwapChain,
        ResourceType::Framebuffer,
        ResourceType::VertexBuffer,
        ResourceType::IndexBuffer,
        ResourceType::UniformBuffer,
        ResourceType::TextureBuffer,
        ResourceType::IndirectBuffer,
        ResourceType::VertexArray,
        ResourceType::Texture1D,
        ResourceType::Texture2D,
        ResourceType::Texture2DArray,
        ResourceType::Texture3D,
        ResourceType::TextureCube,
        ResourceType::PipelineState,
        ResourceType::RootSignature,
        ResourceType::SamplerState,
        ResourceType::VertexShader,
        ResourceType::TessellationControlShader,
        ResourceType::TessellationEvaluationShader,
        ResourceType::GeometryShader,
        ResourceType::FragmentShader,
        ResourceType::Program,
    ];

    /// Texture kinds that can be sampled through a texture descriptor range.
    pub const TEXTURES: [ResourceType; 5] = [
        ResourceType::Texture1D,
        ResourceType::Texture2D,
        ResourceType::Texture2DArray,
        ResourceType::Texture3D,
        ResourceType::TextureCube,
    ];

    /// Resource kinds that can be bound as the active render target.
    pub const RENDER_TARGETS: [ResourceType; 2] =
        [ResourceType::SwapChain, ResourceType::Framebuffer];

    /// Buffer kinds that can be mapped.
    pub const BUFFERS: [ResourceType; 5] = [
        ResourceType::VertexBuffer,
        ResourceType::IndexBuffer,
        ResourceType::UniformBuffer,
        ResourceType::TextureBuffer,
        ResourceType::IndirectBuffer,
    ];

    /// Returns `true` for every texture kind.
    pub fn is_texture(self) -> bool {
        Self::TEXTURES.contains(&self)
    }

    /// Returns `true` for every buffer kind.
    pub fn is_buffer(self) -> bool {
        Self::BUFFERS.contains(&self)
    }

    /// Returns `true` for every shader stage kind.
    pub fn is_shader(self) -> bool {
        matches!(
            self,
            ResourceType::VertexShader
                | ResourceType::TessellationControlShader
                | ResourceType::TessellationEvaluationShader
                | ResourceType::GeometryShader
                | ResourceType::FragmentShader
        )
    }

    /// Position of this type inside [`ResourceType::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_none_round_trips_to_none() {
        let packed = ResourceHandle::pack(None);
        assert_eq!(packed.id(), 0);
        assert!(packed.unpack().is_none());

        let handle = ResourceHandle::new(7, RendererId(3));
        assert_eq!(ResourceHandle::pack(Some(handle)).unpack(), Some(handle));
    }

    #[test]
    fn renderer_ids_are_unique() {
        let a = RendererId::next();
        let b = RendererId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn resource_type_index_matches_table() {
        for (index, ty) in ResourceType::ALL.iter().enumerate() {
            assert_eq!(ty.index(), index);
        }
        assert!(ResourceType::TextureCube.is_texture());
        assert!(!ResourceType::TextureBuffer.is_texture());
        assert!(ResourceType::IndirectBuffer.is_buffer());
        assert!(ResourceType::GeometryShader.is_shader());
    }
}
