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

//! The null back end.
//!
//! Every call goes through the same validation as a native back end (ownership,
//! types, binding model, capabilities and reference counting) but nothing is
//! drawn. Buffers keep their contents in system memory so mapping and emulated
//! draws behave as they would on a real device.

mod renderer;
mod resources;

pub use self::renderer::NullRenderer;
