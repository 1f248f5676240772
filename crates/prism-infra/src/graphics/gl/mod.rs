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

//! The OpenGL family back end.
//!
//! One [`GlRenderer`] serves desktop OpenGL, OpenGL ES 3 and OpenGL ES 2. The
//! renderer never asks which profile it runs on: it reads the capabilities derived
//! from [`GlExtensions`] and picks a native path per operation (vertex array objects
//! or re-specified attributes, uniform blocks or uniform arrays, native or emulated
//! indirect draws).
//!
//! Native work goes through a [`GlContext`]. [`RecordingContext`] is a context that
//! records every [`GlCall`] instead of executing it.

mod calls;
mod command;
mod context;
mod conversions;
mod recording;
mod renderer;
mod resources;

pub use self::calls::{
    GlAttachment, GlBufferTarget, GlCall, GlCapability, GlDataType, GlFace,
    GlFramebufferTarget, GlIndexType, GlInternalFormat, GlObjectKind, GlPolygonMode,
    GlPrimitive, GlTextureTarget, GlWinding,
};
pub use self::context::{GlContext, GlExtensions, GlProfile};
pub use self::conversions::IntoGl;
pub use self::recording::RecordingContext;
pub use self::renderer::GlRenderer;
