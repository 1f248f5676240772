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

//! Immutable state object descriptions and the small value types set by commands.
//!
//! Rasterizer, depth-stencil, blend and sampler states are plain descriptions. A
//! back end creates a state object once from a description and re-applies the
//! stored fields on every bind; state objects never reference other resources.

use crate::prism_bitflags;
use bytemuck::{Pod, Zeroable};

/// Defines how vertices are connected to form a geometric primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum PrimitiveTopology {
    /// Vertices are rendered as a list of isolated points.
    PointList = 1,
    /// Every two vertices form a line.
    LineList = 2,
    /// Vertices are rendered as a connected line strip.
    LineStrip = 3,
    /// Every three vertices form a triangle.
    #[default]
    TriangleList = 4,
    /// Vertices are rendered as a connected triangle strip.
    TriangleStrip = 5,
    /// Patches of control points consumed by the tessellation stages.
    PatchList = 6,
}

impl PrimitiveTopology {
    /// Decodes the raw value stored in a command packet.
    pub const fn from_raw(value: u32) -> Option<Self> {
        match value {
            1 => Some(PrimitiveTopology::PointList),
            2 => Some(PrimitiveTopology::LineList),
            3 => Some(PrimitiveTopology::LineStrip),
            4 => Some(PrimitiveTopology::TriangleList),
            5 => Some(PrimitiveTopology::TriangleStrip),
            6 => Some(PrimitiveTopology::PatchList),
            _ => None,
        }
    }
}

/// The primitive class a pipeline state is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopologyType {
    /// Points.
    Point,
    /// Lines.
    Line,
    /// Triangles.
    #[default]
    Triangle,
    /// Tessellation patches.
    Patch,
}

/// Defines how polygons are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FillMode {
    /// Polygons are rendered as outlines (wireframe).
    Wireframe,
    /// Polygons are filled. This is the normal rendering mode.
    #[default]
    Solid,
}

/// Defines which face of a triangle to cull (not render).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    /// No culling is performed.
    None,
    /// Cull front-facing triangles.
    Front,
    /// Cull back-facing triangles.
    #[default]
    Back,
}

/// Defines which vertex winding order considers a triangle to be "front-facing".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrontFace {
    /// Counter-clockwise winding order is the front face.
    Ccw,
    /// Clockwise winding order is the front face.
    #[default]
    Cw,
}

/// The comparison function used for depth and stencil testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareFunction {
    /// The test never passes.
    Never,
    /// The test passes if the new value is less than the existing value.
    #[default]
    Less,
    /// The test passes if the new value is equal to the existing value.
    Equal,
    /// The test passes if the new value is less than or equal to the existing value.
    LessEqual,
    /// The test passes if the new value is greater than the existing value.
    Greater,
    /// The test passes if the new value is not equal to the existing value.
    NotEqual,
    /// The test passes if the new value is greater than or equal to the existing value.
    GreaterEqual,
    /// The test always passes.
    Always,
}

/// An operation to perform on a stencil buffer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StencilOperation {
    /// Keep the existing stencil value.
    #[default]
    Keep,
    /// Set the stencil value to 0.
    Zero,
    /// Replace the stencil value with the reference value.
    Replace,
    /// Bitwise invert the stencil value.
    Invert,
    /// Increment the stencil value, clamping at the maximum value.
    IncrementClamp,
    /// Decrement the stencil value, clamping at 0.
    DecrementClamp,
    /// Increment the stencil value, wrapping to 0 on overflow.
    IncrementWrap,
    /// Decrement the stencil value, wrapping to the maximum value on underflow.
    DecrementWrap,
}

/// A factor in a blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// The factor is `0.0`.
    Zero,
    /// The factor is `1.0`.
    One,
    /// The factor is the source color.
    SrcColor,
    /// The factor is `1.0 - src`.
    OneMinusSrcColor,
    /// The factor is the source alpha component (`src.a`).
    SrcAlpha,
    /// The factor is `1.0 - src.a`.
    OneMinusSrcAlpha,
    /// The factor is the destination alpha component.
    DstAlpha,
    /// The factor is `1.0 - dst.a`.
    OneMinusDstAlpha,
    /// The factor is the destination color.
    DstColor,
    /// The factor is `1.0 - dst`.
    OneMinusDstColor,
}

/// The operation used to combine source and destination colors in a blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendOperation {
    /// The result is `source + destination`.
    #[default]
    Add,
    /// The result is `source - destination`.
    Subtract,
    /// The result is `destination - source`.
    ReverseSubtract,
    /// The result is `min(source, destination)`.
    Min,
    /// The result is `max(source, destination)`.
    Max,
}

/// Describes the state for primitive rasterization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterizerState {
    /// Solid or wireframe.
    pub fill_mode: FillMode,
    /// The face culling mode.
    pub cull_mode: CullMode,
    /// The vertex winding order that determines the "front" face of a triangle.
    pub front_face: FrontFace,
    /// A constant value added to the depth of each fragment.
    pub depth_bias: i32,
    /// A factor that scales with the fragment's depth slope.
    pub slope_scaled_depth_bias: f32,
    /// Enables the scissor test.
    pub scissor_enable: bool,
    /// Enables multisample rasterization.
    pub multisample_enable: bool,
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self {
            fill_mode: FillMode::Solid,
            cull_mode: CullMode::Back,
            front_face: FrontFace::Cw,
            depth_bias: 0,
            slope_scaled_depth_bias: 0.0,
            scissor_enable: false,
            multisample_enable: false,
        }
    }
}

/// Describes the stencil test and operations for a single face of a primitive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StencilFaceState {
    /// The comparison function used for the stencil test.
    pub compare: CompareFunction,
    /// The operation to perform if the stencil test fails.
    pub fail_op: StencilOperation,
    /// The operation to perform if the stencil test passes but the depth test fails.
    pub depth_fail_op: StencilOperation,
    /// The operation to perform if both the stencil and depth tests pass.
    pub pass_op: StencilOperation,
}

/// Describes the state for depth and stencil testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilState {
    /// Enables the depth test.
    pub depth_enable: bool,
    /// If `true`, depth values will be written to the depth buffer.
    pub depth_write_enabled: bool,
    /// The comparison function used for the depth test.
    pub depth_compare: CompareFunction,
    /// Enables the stencil test.
    pub stencil_enable: bool,
    /// A bitmask for reading from the stencil buffer.
    pub stencil_read_mask: u8,
    /// A bitmask for writing to the stencil buffer.
    pub stencil_write_mask: u8,
    /// The stencil state for front-facing primitives.
    pub stencil_front: StencilFaceState,
    /// The stencil state for back-facing primitives.
    pub stencil_back: StencilFaceState,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_enable: true,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil_enable: false,
            stencil_read_mask: 0xff,
            stencil_write_mask: 0xff,
            stencil_front: StencilFaceState::default(),
            stencil_back: StencilFaceState::default(),
        }
    }
}

prism_bitflags! {
    /// A bitmask to enable or disable writes to individual color channels.
    pub struct ColorWrites: u8 {
        /// Enable writes to the Red channel.
        const R = 0b0001;
        /// Enable writes to the Green channel.
        const G = 0b0010;
        /// Enable writes to the Blue channel.
        const B = 0b0100;
        /// Enable writes to the Alpha channel.
        const A = 0b1000;
        /// Enable writes to all channels.
        const ALL = 0b1111;
    }
}

/// Describes the blend state of one render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetBlendState {
    /// Enables blending.
    pub blend_enable: bool,
    /// The blend factor for the source color.
    pub src_blend: BlendFactor,
    /// The blend factor for the destination color.
    pub dst_blend: BlendFactor,
    /// The operation combining color factors.
    pub blend_op: BlendOperation,
    /// The blend factor for the source alpha.
    pub src_blend_alpha: BlendFactor,
    /// The blend factor for the destination alpha.
    pub dst_blend_alpha: BlendFactor,
    /// The operation combining alpha factors.
    pub blend_op_alpha: BlendOperation,
    /// Channels written to the target.
    pub write_mask: ColorWrites,
}

impl Default for RenderTargetBlendState {
    fn default() -> Self {
        Self {
            blend_enable: false,
            src_blend: BlendFactor::One,
            dst_blend: BlendFactor::Zero,
            blend_op: BlendOperation::Add,
            src_blend_alpha: BlendFactor::One,
            dst_blend_alpha: BlendFactor::Zero,
            blend_op_alpha: BlendOperation::Add,
            write_mask: ColorWrites::ALL,
        }
    }
}

/// Describes blending for up to eight simultaneous render targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlendState {
    /// Use the alpha channel as multisample coverage.
    pub alpha_to_coverage_enable: bool,
    /// Use a distinct blend state per render target instead of `render_targets[0]` for all.
    pub independent_blend_enable: bool,
    /// Per render target blend states.
    pub render_targets: [RenderTargetBlendState; 8],
}

/// Defines the filtering mode for texture sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Point sampling. Returns the value of the nearest texel.
    Nearest,
    /// Linear interpolation.
    #[default]
    Linear,
}

/// Defines how texture coordinates are handled when sampling outside the `[0, 1]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressMode {
    /// Coordinates wrap around.
    Repeat,
    /// Coordinates wrap around, mirroring at each integer boundary.
    MirrorRepeat,
    /// Coordinates are clamped to the edge.
    #[default]
    ClampToEdge,
    /// Coordinates outside the range are given the border color.
    ClampToBorder,
}

/// Describes how a shader samples a texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerState {
    /// Minification filter.
    pub min_filter: FilterMode,
    /// Magnification filter.
    pub mag_filter: FilterMode,
    /// Filter between mip levels; `None` disables mipmapping.
    pub mipmap_filter: Option<FilterMode>,
    /// Address mode for the U coordinate.
    pub address_u: AddressMode,
    /// Address mode for the V coordinate.
    pub address_v: AddressMode,
    /// Address mode for the W coordinate.
    pub address_w: AddressMode,
    /// Bias added to the computed level of detail.
    pub mip_lod_bias: f32,
    /// Maximum anisotropy; one disables anisotropic filtering.
    pub max_anisotropy: u32,
    /// If `Some`, creates a comparison sampler.
    pub compare: Option<CompareFunction>,
    /// Border color used with [`AddressMode::ClampToBorder`].
    pub border_color: [f32; 4],
    /// Lowest accessible level of detail.
    pub min_lod: f32,
    /// Highest accessible level of detail.
    pub max_lod: f32,
}

impl Default for SamplerState {
    fn default() -> Self {
        Self {
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            mipmap_filter: Some(FilterMode::Linear),
            address_u: AddressMode::ClampToEdge,
            address_v: AddressMode::ClampToEdge,
            address_w: AddressMode::ClampToEdge,
            mip_lod_bias: 0.0,
            max_anisotropy: 1,
            compare: None,
            border_color: [0.0; 4],
            min_lod: f32::MIN,
            max_lod: f32::MAX,
        }
    }
}

/// A viewport rectangle with its depth range, in render target pixels with a
/// top-left origin.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Viewport {
    /// Left edge.
    pub top_left_x: f32,
    /// Top edge.
    pub top_left_y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
    /// Near depth.
    pub min_depth: f32,
    /// Far depth.
    pub max_depth: f32,
}

impl Viewport {
    /// A viewport covering `width` x `height` pixels with the full depth range.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            top_left_x: 0.0,
            top_left_y: 0.0,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// A scissor rectangle in render target pixels with a top-left origin.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct ScissorRectangle {
    /// Left edge.
    pub top_left_x: i32,
    /// Top edge.
    pub top_left_y: i32,
    /// Right edge (exclusive).
    pub bottom_right_x: i32,
    /// Bottom edge (exclusive).
    pub bottom_right_y: i32,
}

prism_bitflags! {
    /// Which buffers of the render target a clear touches.
    pub struct ClearFlags: u32 {
        /// Clear the color attachments.
        const COLOR = 1 << 0;
        /// Clear the depth buffer.
        const DEPTH = 1 << 1;
        /// Clear the stencil buffer.
        const STENCIL = 1 << 2;
        /// Clear color, depth and stencil.
        const COLOR_DEPTH_STENCIL = 0b111;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topology_raw_values_round_trip() {
        for topology in [
            PrimitiveTopology::PointList,
            PrimitiveTopology::LineList,
            PrimitiveTopology::LineStrip,
            PrimitiveTopology::TriangleList,
            PrimitiveTopology::TriangleStrip,
            PrimitiveTopology::PatchList,
        ] {
            assert_eq!(PrimitiveTopology::from_raw(topology as u32), Some(topology));
        }
        assert_eq!(PrimitiveTopology::from_raw(0), None);
    }

    #[test]
    fn clear_flags_combine() {
        let flags = ClearFlags::COLOR | ClearFlags::DEPTH;
        assert!(flags.contains(ClearFlags::DEPTH));
        assert!(!flags.contains(ClearFlags::STENCIL));
        assert_eq!(ClearFlags::COLOR_DEPTH_STENCIL.bits(), 0b111);
    }
}
