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

//! Graphics back ends and their selection.

#[cfg(feature = "gl")]
pub mod gl;
#[cfg(feature = "null")]
pub mod null;

use prism_core::renderer::{BackendKind, RenderError, Renderer, RendererSettings};

/// Creates the renderer named by `settings.backend`.
///
/// The OpenGL family is created over a [`RecordingContext`](gl::RecordingContext)
/// exposing the extension set typical of the requested profile; applications owning
/// a real context construct [`GlRenderer`](gl::GlRenderer) directly.
pub fn create_renderer(settings: &RendererSettings) -> Result<Box<dyn Renderer>, RenderError> {
    log::info!("Creating {} renderer", settings.backend);
    match settings.backend {
        #[cfg(feature = "null")]
        BackendKind::Null => Ok(Box::new(null::NullRenderer::new(settings.clone()))),
        #[cfg(feature = "gl")]
        BackendKind::OpenGl => Ok(Box::new(gl::GlRenderer::new(
            gl::RecordingContext::desktop(),
            settings.clone(),
        ))),
        #[cfg(feature = "gl")]
        BackendKind::OpenGles3 => Ok(Box::new(gl::GlRenderer::new(
            gl::RecordingContext::gles3(),
            settings.clone(),
        ))),
        #[cfg(feature = "gl")]
        BackendKind::OpenGles2 => Ok(Box::new(gl::GlRenderer::new(
            gl::RecordingContext::gles2(),
            settings.clone(),
        ))),
        #[allow(unreachable_patterns)]
        backend => Err(RenderError::InitializationFailed(format!(
            "the {backend} back end is not compiled in"
        ))),
    }
}

#[cfg(all(test, feature = "null", feature = "gl"))]
mod tests {
    use super::*;

    #[test]
    fn every_backend_kind_can_be_created() {
        for backend in BackendKind::ALL {
            let settings = RendererSettings {
                backend,
                report_leaks: false,
                ..RendererSettings::default()
            };
            let renderer = create_renderer(&settings).unwrap();
            assert!(renderer.is_initialized());
            assert_eq!(renderer.name(), backend.name());
        }
    }
}
