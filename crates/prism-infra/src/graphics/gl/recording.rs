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

use super::calls::{GlCall, GlObjectKind};
use super::context::{GlContext, GlExtensions};
use raw_window_handle::RawWindowHandle;
use std::collections::{HashMap, HashSet};

/// A [`GlContext`] that records every native call instead of executing it.
///
/// Object names are handed out sequentially from 1. Uniform locations and block
/// indices are assigned per program in query order. A shader whose source contains
/// `#error` fails to compile.
#[derive(Debug)]
pub struct RecordingContext {
    extensions: GlExtensions,
    calls: Vec<GlCall>,
    next_name: u32,
    locations: HashMap<(u32, String), i32>,
    unused_uniforms: HashSet<String>,
    fail_initialization: bool,
}

impl RecordingContext {
    /// A context exposing `extensions`.
    pub fn new(extensions: GlExtensions) -> Self {
        Self {
            extensions,
            calls: Vec::new(),
            next_name: 1,
            locations: HashMap::new(),
            unused_uniforms: HashSet::new(),
            fail_initialization: false,
        }
    }

    /// An OpenGL ES 2.0 context without extensions.
    pub fn gles2() -> Self {
        Self::new(GlExtensions::gles2())
    }

    /// An OpenGL ES 3.0 context.
    pub fn gles3() -> Self {
        Self::new(GlExtensions::gles3())
    }

    /// A desktop OpenGL 4.6 core context.
    pub fn desktop() -> Self {
        Self::new(GlExtensions::desktop())
    }

    /// A context that cannot be made current.
    pub fn failing(extensions: GlExtensions) -> Self {
        Self {
            fail_initialization: true,
            ..Self::new(extensions)
        }
    }

    /// Makes `name` an inactive uniform (and uniform block) of every program.
    pub fn with_unused_uniform(mut self, name: impl Into<String>) -> Self {
        self.unused_uniforms.insert(name.into());
        self
    }

    /// The calls recorded so far, in issue order.
    pub fn calls(&self) -> &[GlCall] {
        &self.calls
    }

    /// Returns and forgets the recorded calls.
    pub fn take_calls(&mut self) -> Vec<GlCall> {
        std::mem::take(&mut self.calls)
    }

    /// Forgets the recorded calls.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn location(&mut self, program: u32, name: &str) -> Option<i32> {
        if self.unused_uniforms.contains(name) {
            return None;
        }
        let next = self
            .locations
            .keys()
            .filter(|(owner, _)| *owner == program)
            .count() as i32;
        Some(
            *self
                .locations
                .entry((program, name.to_string()))
                .or_insert(next),
        )
    }
}

impl GlContext for RecordingContext {
    fn make_current(&mut self) -> Result<(), String> {
        if self.fail_initialization {
            Err("the context could not be made current".to_string())
        } else {
            Ok(())
        }
    }

    fn extensions(&self) -> GlExtensions {
        self.extensions.clone()
    }

    fn create_surface(
        &mut self,
        _window: RawWindowHandle,
        _width: u32,
        _height: u32,
    ) -> Result<u32, String> {
        Ok(self.create_object(GlObjectKind::Surface))
    }

    fn create_object(&mut self, kind: GlObjectKind) -> u32 {
        let name = self.next_name;
        self.next_name += 1;
        self.calls.push(GlCall::Create { kind, name });
        name
    }

    fn issue(&mut self, call: GlCall) {
        log::trace!("{call:?}");
        self.calls.push(call);
    }

    fn compile_shader(&mut self, shader: u32, source: &str) -> Result<(), String> {
        match source.find("#error") {
            Some(position) => Err(format!("0:{position}: error: {}", &source[position..])),
            None => {
                log::trace!("Compiled shader {shader}");
                Ok(())
            }
        }
    }

    fn link_program(&mut self, program: u32) -> Result<(), String> {
        log::trace!("Linked program {program}");
        Ok(())
    }

    fn uniform_location(&mut self, program: u32, name: &str) -> Option<i32> {
        self.location(program, name)
    }

    fn uniform_block_index(&mut self, program: u32, name: &str) -> Option<u32> {
        self.location(program, name).map(|location| location as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_sequential_and_recorded() {
        let mut context = RecordingContext::gles3();
        assert_eq!(context.create_object(GlObjectKind::Buffer), 1);
        assert_eq!(context.create_object(GlObjectKind::Texture), 2);
        assert_eq!(
            context.take_calls(),
            vec![
                GlCall::Create {
                    kind: GlObjectKind::Buffer,
                    name: 1
                },
                GlCall::Create {
                    kind: GlObjectKind::Texture,
                    name: 2
                },
            ]
        );
        assert!(context.calls().is_empty());
    }

    #[test]
    fn uniform_locations_are_stable_per_program() {
        let mut context = RecordingContext::desktop().with_unused_uniform("Unused");
        assert_eq!(context.uniform_location(7, "DiffuseMap"), Some(0));
        assert_eq!(context.uniform_location(7, "NormalMap"), Some(1));
        assert_eq!(context.uniform_location(7, "DiffuseMap"), Some(0));
        assert_eq!(context.uniform_location(8, "NormalMap"), Some(0));
        assert_eq!(context.uniform_location(7, "Unused"), None);
    }

    #[test]
    fn error_directive_fails_compilation() {
        let mut context = RecordingContext::gles2();
        assert!(context.compile_shader(1, "void main() {}").is_ok());
        assert!(context
            .compile_shader(1, "#error unsupported")
            .unwrap_err()
            .contains("unsupported"));
        assert!(RecordingContext::failing(GlExtensions::gles2())
            .make_current()
            .is_err());
    }
}
