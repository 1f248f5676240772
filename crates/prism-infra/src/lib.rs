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

//! # Prism Infra
//!
//! Concrete back ends for the contracts defined in `prism-core`:
//!
//! - [`NullRenderer`](graphics::null::NullRenderer): validates every call and
//!   issues nothing, for tests and headless tools.
//! - [`GlRenderer`](graphics::gl::GlRenderer): the OpenGL family (ES 2, ES 3 and
//!   desktop core profile) over any [`GlContext`](graphics::gl::GlContext).

pub mod graphics;

pub use graphics::create_renderer;
