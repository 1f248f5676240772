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

use super::calls::{
    GlDataType, GlFace, GlIndexType, GlInternalFormat, GlPolygonMode, GlPrimitive,
    GlTextureTarget, GlWinding,
};
use prism_core::renderer::{
    CullMode, FillMode, FrontFace, IndexFormat, PrimitiveTopology, TextureDimension,
    TextureFormat, VertexFormat,
};

/// A local extension trait to convert API types into GL call arguments.
/// This avoids Rust's orphan rules while keeping an idiomatic `.into_gl()` syntax.
pub trait IntoGl<T> {
    /// Consumes self and converts it into a GL-compatible type.
    fn into_gl(self) -> T;
}

impl IntoGl<GlPrimitive> for PrimitiveTopology {
    fn into_gl(self) -> GlPrimitive {
        match self {
            PrimitiveTopology::PointList => GlPrimitive::Points,
            PrimitiveTopology::LineList => GlPrimitive::Lines,
            PrimitiveTopology::LineStrip => GlPrimitive::LineStrip,
            PrimitiveTopology::TriangleList => GlPrimitive::Triangles,
            PrimitiveTopology::TriangleStrip => GlPrimitive::TriangleStrip,
            PrimitiveTopology::PatchList => GlPrimitive::Patches,
        }
    }
}

impl IntoGl<GlIndexType> for IndexFormat {
    fn into_gl(self) -> GlIndexType {
        match self {
            IndexFormat::Uint16 => GlIndexType::UnsignedShort,
            IndexFormat::Uint32 => GlIndexType::UnsignedInt,
        }
    }
}

impl IntoGl<GlInternalFormat> for TextureFormat {
    fn into_gl(self) -> GlInternalFormat {
        match self {
            TextureFormat::R8Unorm => GlInternalFormat::R8,
            TextureFormat::Rgba8Unorm => GlInternalFormat::Rgba8,
            TextureFormat::Rgba8UnormSrgb => GlInternalFormat::Srgb8Alpha8,
            TextureFormat::Bgra8Unorm => GlInternalFormat::Bgra8,
            TextureFormat::Rgba16Float => GlInternalFormat::Rgba16F,
            TextureFormat::R32Float => GlInternalFormat::R32F,
            TextureFormat::Rgba32Float => GlInternalFormat::Rgba32F,
            TextureFormat::Depth32Float => GlInternalFormat::DepthComponent32F,
            TextureFormat::Depth24PlusStencil8 => GlInternalFormat::Depth24Stencil8,
        }
    }
}

/// The texture target of a texture shape, multisampled when `sample_count > 1`.
pub fn texture_target(dimension: &TextureDimension, sample_count: u32) -> GlTextureTarget {
    match dimension {
        TextureDimension::D1 { .. } => GlTextureTarget::Texture1D,
        TextureDimension::D2 { .. } if sample_count > 1 => GlTextureTarget::Texture2DMultisample,
        TextureDimension::D2 { .. } => GlTextureTarget::Texture2D,
        TextureDimension::D2Array { .. } => GlTextureTarget::Texture2DArray,
        TextureDimension::D3 { .. } => GlTextureTarget::Texture3D,
        TextureDimension::Cube { .. } => GlTextureTarget::CubeMap,
    }
}

impl IntoGl<GlDataType> for VertexFormat {
    fn into_gl(self) -> GlDataType {
        match self {
            VertexFormat::Unorm8x4 | VertexFormat::Uint8x4 => GlDataType::UnsignedByte,
            VertexFormat::Sint16x2 | VertexFormat::Sint16x4 => GlDataType::Short,
            VertexFormat::Float32
            | VertexFormat::Float32x2
            | VertexFormat::Float32x3
            | VertexFormat::Float32x4 => GlDataType::Float,
        }
    }
}

/// The face culled by `glCullFace`, `None` when culling is disabled.
impl IntoGl<Option<GlFace>> for CullMode {
    fn into_gl(self) -> Option<GlFace> {
        match self {
            CullMode::None => None,
            CullMode::Front => Some(GlFace::Front),
            CullMode::Back => Some(GlFace::Back),
        }
    }
}

impl IntoGl<GlWinding> for FrontFace {
    fn into_gl(self) -> GlWinding {
        match self {
            FrontFace::Cw => GlWinding::Cw,
            FrontFace::Ccw => GlWinding::Ccw,
        }
    }
}

impl IntoGl<GlPolygonMode> for FillMode {
    fn into_gl(self) -> GlPolygonMode {
        match self {
            FillMode::Solid => GlPolygonMode::Fill,
            FillMode::Wireframe => GlPolygonMode::Line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multisampled_2d_textures_use_their_own_target() {
        let dimension = TextureDimension::D2 {
            width: 4,
            height: 4,
        };
        assert_eq!(texture_target(&dimension, 1), GlTextureTarget::Texture2D);
        assert_eq!(
            texture_target(&dimension, 4),
            GlTextureTarget::Texture2DMultisample
        );
        assert_eq!(
            texture_target(&TextureDimension::Cube { size: 4 }, 1),
            GlTextureTarget::CubeMap
        );
    }

    #[test]
    fn culling_none_disables_the_face() {
        let none: Option<GlFace> = CullMode::None.into_gl();
        let back: Option<GlFace> = CullMode::Back.into_gl();
        assert_eq!(none, None);
        assert_eq!(back, Some(GlFace::Back));
    }
}
