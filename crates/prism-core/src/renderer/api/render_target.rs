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

//! Swap chain and framebuffer descriptions.

use crate::renderer::api::resource::ResourceHandle;
use crate::renderer::api::texture::TextureFormat;
use raw_window_handle::RawWindowHandle;

/// The two kinds of render target a renderer can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderTargetKind {
    /// Presents into a native window.
    SwapChain,
    /// Renders into texture attachments.
    Framebuffer,
}

/// A descriptor used to create a swap chain.
#[derive(Debug, Clone, Copy)]
pub struct SwapChainDescriptor {
    /// The native window supplied by the window/context provider.
    pub window: RawWindowHandle,
    /// Initial back buffer width in pixels.
    pub width: u32,
    /// Initial back buffer height in pixels.
    pub height: u32,
    /// Back buffer format.
    pub format: TextureFormat,
    /// Optional depth/stencil buffer format.
    pub depth_stencil_format: Option<TextureFormat>,
}

/// One framebuffer attachment: a texture and the sub-resource rendered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferAttachment {
    /// The attached texture.
    pub texture: ResourceHandle,
    /// Mip level rendered to.
    pub mipmap_index: u32,
    /// Array layer rendered to (2D array textures only).
    pub layer_index: u32,
}

impl FramebufferAttachment {
    /// Attaches mip level 0, layer 0 of `texture`.
    pub fn new(texture: ResourceHandle) -> Self {
        Self {
            texture,
            mipmap_index: 0,
            layer_index: 0,
        }
    }
}

/// A descriptor used to create a framebuffer.
///
/// The framebuffer retains a reference to every accepted attachment.
#[derive(Debug, Clone, Default)]
pub struct FramebufferDescriptor {
    /// Color attachments in render target order.
    pub color_attachments: Vec<FramebufferAttachment>,
    /// Optional depth/stencil attachment.
    pub depth_stencil_attachment: Option<FramebufferAttachment>,
}
