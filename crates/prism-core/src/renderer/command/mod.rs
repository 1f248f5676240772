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

//! The backend-independent command packet format and its dispatch.
//!
//! A [`CommandBuffer`] is recorded without knowing which renderer will execute it.
//! Each packet carries a dispatch index ([`CommandId`]), a plain-old-data argument
//! struct and an optional auxiliary byte region. A renderer replays the buffer
//! through its [`DispatchTable`], which decodes every packet and forwards it to the
//! renderer's [`CommandExecutor`](crate::renderer::CommandExecutor) methods.

mod buffer;
mod commands;
mod dispatch;
mod packet;

pub use self::buffer::*;
pub use self::commands::*;
pub use self::dispatch::*;
pub use self::packet::*;
