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

//! Defines data structures related to GPU texture resources.

use crate::prism_bitflags;
use crate::renderer::api::resource::ResourceType;
use crate::renderer::error::ResourceError;
use std::borrow::Cow;

/// Defines the memory format of pixels in a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// One 8-bit unsigned normalized component.
    R8Unorm,
    /// Four 8-bit unsigned normalized components (RGBA).
    Rgba8Unorm,
    /// Four 8-bit unsigned normalized components (RGBA) in the sRGB color space.
    Rgba8UnormSrgb,
    /// Four 8-bit unsigned normalized components (BGRA).
    Bgra8Unorm,
    /// Four 16-bit float components.
    Rgba16Float,
    /// One 32-bit float component.
    R32Float,
    /// Four 32-bit float components.
    Rgba32Float,
    /// 32-bit float depth.
    Depth32Float,
    /// 24-bit depth with an 8-bit stencil.
    Depth24PlusStencil8,
}

impl TextureFormat {
    /// Size of one texel in bytes.
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            TextureFormat::R8Unorm => 1,
            TextureFormat::Rgba8Unorm
            | TextureFormat::Rgba8UnormSrgb
            | TextureFormat::Bgra8Unorm
            | TextureFormat::R32Float
            | TextureFormat::Depth32Float
            | TextureFormat::Depth24PlusStencil8 => 4,
            TextureFormat::Rgba16Float => 8,
            TextureFormat::Rgba32Float => 16,
        }
    }

    /// Returns `true` for depth and depth/stencil formats.
    pub const fn is_depth(self) -> bool {
        matches!(
            self,
            TextureFormat::Depth32Float | TextureFormat::Depth24PlusStencil8
        )
    }
}

prism_bitflags! {
    /// Creation flags of a texture.
    pub struct TextureFlags: u32 {
        /// The provided data already contains every mipmap level.
        const DATA_CONTAINS_MIPMAPS = 1 << 0;
        /// Mipmaps are generated by the GPU: after creation and whenever a
        /// framebuffer rendering into the texture is detached.
        const GENERATE_MIPMAPS = 1 << 1;
        /// The texture can be used as a framebuffer attachment.
        const RENDER_TARGET = 1 << 2;
    }
}

/// The shape of a texture together with its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureDimension {
    /// A one-dimensional texture.
    D1 {
        /// Width in texels.
        width: u32,
    },
    /// A two-dimensional texture.
    D2 {
        /// Width in texels.
        width: u32,
        /// Height in texels.
        height: u32,
    },
    /// An array of two-dimensional textures.
    D2Array {
        /// Width in texels.
        width: u32,
        /// Height in texels.
        height: u32,
        /// Number of array slices.
        layers: u32,
    },
    /// A volume texture.
    D3 {
        /// Width in texels.
        width: u32,
        /// Height in texels.
        height: u32,
        /// Depth in texels.
        depth: u32,
    },
    /// A cube map made of six square faces.
    Cube {
        /// Width and height of one face in texels.
        size: u32,
    },
}

impl TextureDimension {
    /// The resource type a texture of this shape is tagged with.
    pub const fn resource_type(&self) -> ResourceType {
        match self {
            TextureDimension::D1 { .. } => ResourceType::Texture1D,
            TextureDimension::D2 { .. } => ResourceType::Texture2D,
            TextureDimension::D2Array { .. } => ResourceType::Texture2DArray,
            TextureDimension::D3 { .. } => ResourceType::Texture3D,
            TextureDimension::Cube { .. } => ResourceType::TextureCube,
        }
    }

    /// `(width, height, depth or layers)` of mip level 0.
    pub const fn extent(&self) -> (u32, u32, u32) {
        match *self {
            TextureDimension::D1 { width } => (width, 1, 1),
            TextureDimension::D2 { width, height } => (width, height, 1),
            TextureDimension::D2Array {
                width,
                height,
                layers,
            } => (width, height, layers),
            TextureDimension::D3 {
                width,
                height,
                depth,
            } => (width, height, depth),
            TextureDimension::Cube { size } => (size, size, 6),
        }
    }

    /// `(width, height)` of the given mip level, never smaller than one texel.
    pub fn mip_size(&self, mip_level: u32) -> (u32, u32) {
        let (width, height, _) = self.extent();
        (
            width.checked_shr(mip_level).unwrap_or(0).max(1),
            height.checked_shr(mip_level).unwrap_or(0).max(1),
        )
    }
}

/// Number of mip levels of a complete chain for the largest dimension `size`.
pub fn full_mip_chain_length(size: u32) -> u32 {
    32 - size.max(1).leading_zeros()
}

/// A descriptor used to create a texture of any shape.
#[derive(Debug, Clone)]
pub struct TextureDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Shape and size.
    pub dimension: TextureDimension,
    /// The format of the texels in the texture.
    pub format: TextureFormat,
    /// Creation flags.
    pub flags: TextureFlags,
    /// Samples per texel; values above one request a multisample texture.
    pub sample_count: u32,
    /// Optional initial texel data for mip level 0 (or every level with
    /// [`TextureFlags::DATA_CONTAINS_MIPMAPS`]).
    pub data: Option<&'a [u8]>,
}

impl<'a> TextureDescriptor<'a> {
    /// A 2D texture descriptor with no initial data.
    pub fn new_2d(width: u32, height: u32, format: TextureFormat, flags: TextureFlags) -> Self {
        Self {
            label: None,
            dimension: TextureDimension::D2 { width, height },
            format,
            flags,
            sample_count: 1,
            data: None,
        }
    }

    /// Bytes of mip level 0.
    pub fn base_level_size(&self) -> u64 {
        let (width, height, depth) = self.dimension.extent();
        width as u64 * height as u64 * depth as u64 * self.format.bytes_per_pixel() as u64
    }

    /// Checks the extent against `maximum_dimension` and the initial data against
    /// the size of mip level 0.
    pub fn validate(&self, maximum_dimension: u32) -> Result<(), ResourceError> {
        let (width, height, depth) = self.dimension.extent();
        if width == 0 || height == 0 || depth == 0 {
            return Err(ResourceError::InvalidDescription(format!(
                "texture extent {width}x{height}x{depth} is empty"
            )));
        }
        if width.max(height) > maximum_dimension {
            return Err(ResourceError::InvalidDescription(format!(
                "texture extent {width}x{height} exceeds the maximum dimension {maximum_dimension}"
            )));
        }
        if self.sample_count > 1 && !matches!(self.dimension, TextureDimension::D2 { .. }) {
            return Err(ResourceError::InvalidDescription(
                "only 2D textures can be multisampled".to_string(),
            ));
        }
        if let Some(data) = self.data {
            let required = self.base_level_size();
            if (data.len() as u64) < required {
                return Err(ResourceError::InvalidDescription(format!(
                    "texture data holds {} bytes, mip level 0 needs {required}",
                    data.len()
                )));
            }
        }
        Ok(())
    }

    /// The number of mip levels the texture will have.
    pub fn mip_level_count(&self) -> u32 {
        if self
            .flags
            .intersects(TextureFlags::GENERATE_MIPMAPS | TextureFlags::DATA_CONTAINS_MIPMAPS)
        {
            let (width, height, depth) = self.dimension.extent();
            let largest = match self.dimension {
                TextureDimension::D3 { .. } => width.max(height).max(depth),
                _ => width.max(height),
            };
            full_mip_chain_length(largest)
        } else {
            1
        }
    }
}
