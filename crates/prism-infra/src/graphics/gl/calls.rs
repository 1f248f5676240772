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

//! The native OpenGL call vocabulary.
//!
//! Every state change the GL back end performs is expressed as one [`GlCall`] handed
//! to [`GlContext::issue`](super::GlContext::issue), so a context implementation is a
//! thin forwarder to the real API and tests can assert on the exact sequence.

use prism_core::renderer::{
    BlendFactor, BlendOperation, BufferUsage, ClearFlags, ColorWrites, CompareFunction,
    SamplerState, ShaderStage, StencilOperation,
};

/// Kinds of named GL objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlObjectKind {
    Surface,
    Buffer,
    Texture,
    Sampler,
    Framebuffer,
    VertexArray,
    Shader(ShaderStage),
    Program,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlBufferTarget {
    Array,
    ElementArray,
    Uniform,
    Texture,
    DrawIndirect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlTextureTarget {
    Texture1D,
    Texture2D,
    Texture2DMultisample,
    Texture2DArray,
    Texture3D,
    CubeMap,
    Buffer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlFramebufferTarget {
    Framebuffer,
    Read,
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlAttachment {
    Color(u32),
    Depth,
    DepthStencil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlInternalFormat {
    R8,
    Rgba8,
    Srgb8Alpha8,
    Bgra8,
    Rgba16F,
    R32F,
    Rgba32F,
    DepthComponent32F,
    Depth24Stencil8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlDataType {
    UnsignedByte,
    Short,
    Float,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlIndexType {
    UnsignedShort,
    UnsignedInt,
}

/// Primitive modes of draw calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlPrimitive {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
    Patches,
}

/// Server-side capabilities toggled with `glEnable` / `glDisable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlCapability {
    CullFace,
    DepthTest,
    StencilTest,
    Blend,
    ScissorTest,
    PolygonOffsetFill,
    Multisample,
    SampleAlphaToCoverage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlFace {
    Front,
    Back,
    FrontAndBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlWinding {
    Cw,
    Ccw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlPolygonMode {
    Fill,
    Line,
}

/// One native GL call with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    // Objects
    Create {
        kind: GlObjectKind,
        name: u32,
    },
    Delete {
        kind: GlObjectKind,
        name: u32,
    },

    // Buffers
    BindBuffer {
        target: GlBufferTarget,
        buffer: u32,
    },
    BufferData {
        target: GlBufferTarget,
        data: Vec<u8>,
        usage: BufferUsage,
    },
    BufferSubData {
        target: GlBufferTarget,
        offset: u32,
        data: Vec<u8>,
    },
    BindBufferBase {
        target: GlBufferTarget,
        index: u32,
        buffer: u32,
    },
    UniformBlockBinding {
        program: u32,
        block_index: u32,
        binding: u32,
    },
    TexBuffer {
        format: GlInternalFormat,
        buffer: u32,
    },

    // Textures and samplers
    ActiveTexture {
        unit: u32,
    },
    BindTexture {
        target: GlTextureTarget,
        texture: u32,
    },
    TexImage {
        target: GlTextureTarget,
        level: u32,
        format: GlInternalFormat,
        width: u32,
        height: u32,
        depth: u32,
        samples: u32,
        data: Option<Vec<u8>>,
    },
    GenerateMipmap {
        target: GlTextureTarget,
    },
    TexParameters {
        target: GlTextureTarget,
        sampler: SamplerState,
    },
    BindSampler {
        unit: u32,
        sampler: u32,
    },
    SamplerParameters {
        sampler: u32,
        state: SamplerState,
    },

    // Shaders and programs
    AttachShader {
        program: u32,
        shader: u32,
    },
    BindAttribLocation {
        program: u32,
        index: u32,
        name: String,
    },
    UseProgram {
        program: u32,
    },
    Uniform1i {
        location: i32,
        value: i32,
    },
    Uniform4fv {
        location: i32,
        data: Vec<f32>,
    },

    // Vertex input
    BindVertexArray {
        vertex_array: u32,
    },
    EnableVertexAttribArray {
        index: u32,
    },
    DisableVertexAttribArray {
        index: u32,
    },
    VertexAttribPointer {
        index: u32,
        size: u32,
        data_type: GlDataType,
        normalized: bool,
        stride: u32,
        offset: u32,
    },
    VertexAttribDivisor {
        index: u32,
        divisor: u32,
    },

    // Framebuffers
    BindFramebuffer {
        target: GlFramebufferTarget,
        framebuffer: u32,
    },
    FramebufferTexture {
        attachment: GlAttachment,
        texture: u32,
        level: u32,
        layer: u32,
    },
    DrawBuffers {
        count: u32,
    },
    BlitFramebuffer {
        source: [i32; 4],
        destination: [i32; 4],
    },
    CopyImageSubData {
        source: u32,
        source_target: GlTextureTarget,
        destination: u32,
        destination_target: GlTextureTarget,
        width: u32,
        height: u32,
        depth: u32,
    },

    // Viewports and scissors
    Viewport {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    DepthRange {
        near: f32,
        far: f32,
    },
    ViewportIndexed {
        index: u32,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    DepthRangeIndexed {
        index: u32,
        near: f32,
        far: f32,
    },
    Scissor {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    ScissorIndexed {
        index: u32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },

    // Fixed-function state
    Enable(GlCapability),
    Disable(GlCapability),
    CullFace(GlFace),
    FrontFace(GlWinding),
    PolygonMode(GlPolygonMode),
    PolygonOffset {
        factor: f32,
        units: f32,
    },
    DepthMask(bool),
    DepthFunc(CompareFunction),
    StencilFuncSeparate {
        face: GlFace,
        function: CompareFunction,
        reference: i32,
        mask: u32,
    },
    StencilOpSeparate {
        face: GlFace,
        stencil_fail: StencilOperation,
        depth_fail: StencilOperation,
        pass: StencilOperation,
    },
    StencilMask(u32),
    BlendFuncSeparate {
        source_rgb: BlendFactor,
        destination_rgb: BlendFactor,
        source_alpha: BlendFactor,
        destination_alpha: BlendFactor,
    },
    BlendEquationSeparate {
        rgb: BlendOperation,
        alpha: BlendOperation,
    },
    ColorMask(ColorWrites),

    // Clears
    ClearColor([f32; 4]),
    ClearDepth(f32),
    ClearStencil(i32),
    Clear(ClearFlags),

    // Draws
    DrawArrays {
        mode: GlPrimitive,
        first: u32,
        count: u32,
    },
    DrawArraysInstanced {
        mode: GlPrimitive,
        first: u32,
        count: u32,
        instances: u32,
    },
    DrawArraysInstancedBaseInstance {
        mode: GlPrimitive,
        first: u32,
        count: u32,
        instances: u32,
        base_instance: u32,
    },
    DrawElements {
        mode: GlPrimitive,
        count: u32,
        index_type: GlIndexType,
        offset: u64,
    },
    DrawElementsInstanced {
        mode: GlPrimitive,
        count: u32,
        index_type: GlIndexType,
        offset: u64,
        instances: u32,
    },
    DrawElementsBaseVertex {
        mode: GlPrimitive,
        count: u32,
        index_type: GlIndexType,
        offset: u64,
        base_vertex: i32,
    },
    DrawElementsInstancedBaseVertex {
        mode: GlPrimitive,
        count: u32,
        index_type: GlIndexType,
        offset: u64,
        instances: u32,
        base_vertex: i32,
    },
    DrawElementsInstancedBaseVertexBaseInstance {
        mode: GlPrimitive,
        count: u32,
        index_type: GlIndexType,
        offset: u64,
        instances: u32,
        base_vertex: i32,
        base_instance: u32,
    },
    DrawArraysIndirect {
        mode: GlPrimitive,
        offset: u32,
    },
    DrawElementsIndirect {
        mode: GlPrimitive,
        index_type: GlIndexType,
        offset: u32,
    },

    // Debug
    PushDebugGroup {
        message: String,
    },
    PopDebugGroup,
    DebugMessageInsert {
        message: String,
    },

    // Surfaces and synchronization
    MakeCurrent {
        surface: u32,
    },
    ResizeSurface {
        surface: u32,
        width: u32,
        height: u32,
    },
    SwapBuffers {
        surface: u32,
    },
    Flush,
    Finish,
}

impl GlCall {
    /// Returns `true` for every call that draws primitives.
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            GlCall::DrawArrays { .. }
                | GlCall::DrawArraysInstanced { .. }
                | GlCall::DrawArraysInstancedBaseInstance { .. }
                | GlCall::DrawElements { .. }
                | GlCall::DrawElementsInstanced { .. }
                | GlCall::DrawElementsBaseVertex { .. }
                | GlCall::DrawElementsInstancedBaseVertex { .. }
                | GlCall::DrawElementsInstancedBaseVertexBaseInstance { .. }
                | GlCall::DrawArraysIndirect { .. }
                | GlCall::DrawElementsIndirect { .. }
        )
    }
}
