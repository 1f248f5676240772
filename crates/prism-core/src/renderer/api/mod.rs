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

//! Backend-agnostic rendering API.
//!
//! Organized into several logical sub-modules:
//!
//! - **[`resource`]**: Resource handles, renderer identity and the resource type tag.
//! - **[`buffer`]**, **[`texture`]**, **[`vertex`]**: Descriptions of the creatable GPU objects.
//! - **[`shader`]**: Shader stages and program descriptions.
//! - **[`root_signature`]**: The generic root signature / descriptor table binding model.
//! - **[`state`]**, **[`pipeline`]**: Immutable state object descriptions.
//! - **[`render_target`]**: Swap chain and framebuffer descriptions.
//! - **[`draw`]**: Draw argument records shared by indirect and emulated draws.

pub mod buffer;
pub mod draw;
pub mod pipeline;
pub mod render_target;
pub mod resource;
pub mod root_signature;
pub mod shader;
pub mod state;
pub mod texture;
pub mod vertex;

pub use self::buffer::*;
pub use self::draw::*;
pub use self::pipeline::*;
pub use self::render_target::*;
pub use self::resource::*;
pub use self::root_signature::*;
pub use self::shader::*;
pub use self::state::*;
pub use self::texture::*;
pub use self::vertex::*;
