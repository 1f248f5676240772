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

//! Render target lifecycle: framebuffer validation and the active target state machine.

use crate::renderer::api::render_target::{
    FramebufferAttachment, FramebufferDescriptor, RenderTargetKind,
};
use crate::renderer::api::resource::{ResourceHandle, ResourceType};
use crate::renderer::api::texture::{TextureDimension, TextureFlags};
use crate::renderer::error::ResourceError;
use crate::renderer::resource::{OwnsReferences, ResourceBase, ResourceRegistry};

/// Texture kinds accepted as framebuffer attachments.
pub const FRAMEBUFFER_ATTACHMENT_TYPES: [ResourceType; 2] =
    [ResourceType::Texture2D, ResourceType::Texture2DArray];

/// The validated attachments of a framebuffer.
///
/// Holds one reference on every accepted attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramebufferLayout {
    /// Accepted color attachments, in the order they were given.
    pub color_attachments: Vec<FramebufferAttachment>,
    /// The accepted depth/stencil attachment.
    pub depth_stencil_attachment: Option<FramebufferAttachment>,
    /// Width derived from the first accepted attachment.
    pub width: u32,
    /// Height derived from the first accepted attachment.
    pub height: u32,
    /// Whether color attachment mipmaps are regenerated when the framebuffer stops
    /// being the active render target.
    pub generate_mipmaps: bool,
}

impl FramebufferLayout {
    /// Validates a framebuffer description against the textures of `registry`.
    ///
    /// Attachments that do not resolve, or whose type is not 2D or 2D array, are
    /// reported and skipped; the remaining attachments are still processed. Color
    /// attachments beyond `maximum_color_attachments` are skipped too. The size
    /// comes from the first accepted attachment at its mip level, `(1, 1)` when none
    /// is accepted. `describe` extracts the shape and flags of a texture payload.
    pub fn validate<T, F>(
        registry: &mut ResourceRegistry<T>,
        descriptor: &FramebufferDescriptor,
        maximum_color_attachments: u32,
        describe: F,
    ) -> Self
    where
        T: OwnsReferences,
        F: Fn(&T) -> Option<(TextureDimension, TextureFlags)>,
    {
        let mut layout = FramebufferLayout {
            color_attachments: Vec::with_capacity(descriptor.color_attachments.len()),
            depth_stencil_attachment: None,
            width: 1,
            height: 1,
            generate_mipmaps: false,
        };
        let mut size = None;

        for (index, attachment) in descriptor.color_attachments.iter().enumerate() {
            if index as u32 >= maximum_color_attachments {
                log::warn!(
                    "Framebuffer color attachment {index} exceeds the maximum of {maximum_color_attachments} render targets, skipping it"
                );
                continue;
            }
            if let Some((dimension, flags)) = accept(registry, attachment, &describe) {
                size.get_or_insert(dimension.mip_size(attachment.mipmap_index));
                if flags.contains(TextureFlags::GENERATE_MIPMAPS) {
                    layout.generate_mipmaps = true;
                }
                layout.color_attachments.push(*attachment);
            }
        }

        if let Some(attachment) = &descriptor.depth_stencil_attachment {
            if let Some((dimension, _)) = accept(registry, attachment, &describe) {
                size.get_or_insert(dimension.mip_size(attachment.mipmap_index));
                layout.depth_stencil_attachment = Some(*attachment);
            }
        }

        if let Some((width, height)) = size {
            layout.width = width;
            layout.height = height;
        }
        layout
    }

    /// Every attached texture handle.
    pub fn attachments(&self) -> impl Iterator<Item = ResourceHandle> + '_ {
        self.color_attachments
            .iter()
            .chain(self.depth_stencil_attachment.iter())
            .map(|attachment| attachment.texture)
    }
}

impl OwnsReferences for FramebufferLayout {
    fn owned_references(&self) -> Vec<ResourceHandle> {
        self.attachments().collect()
    }
}

fn accept<T, F>(
    registry: &mut ResourceRegistry<T>,
    attachment: &FramebufferAttachment,
    describe: &F,
) -> Option<(TextureDimension, TextureFlags)>
where
    T: OwnsReferences,
    F: Fn(&T) -> Option<(TextureDimension, TextureFlags)>,
{
    let described = registry
        .validate(attachment.texture, &FRAMEBUFFER_ATTACHMENT_TYPES)
        .map(|entry| describe(&entry.payload));
    match described {
        Ok(Some(described)) => match registry.add_reference(attachment.texture) {
            Ok(_) => Some(described),
            Err(err) => {
                log::warn!("Skipping framebuffer attachment: {err}");
                None
            }
        },
        Ok(None) => {
            log::warn!(
                "Skipping framebuffer attachment {:?}: not a texture",
                attachment.texture
            );
            None
        }
        Err(err) => {
            log::warn!("Skipping framebuffer attachment: {err}");
            None
        }
    }
}

/// The render target bound as the active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveRenderTarget {
    /// The swap chain or framebuffer.
    pub handle: ResourceHandle,
    /// Which of the two it is.
    pub kind: RenderTargetKind,
    /// For framebuffers: regenerate attachment mipmaps when it stops being active.
    pub generate_mipmaps: bool,
}

impl ActiveRenderTarget {
    /// Builds the active target for a resource, or `None` if the type is not a
    /// render target.
    pub fn new(
        handle: ResourceHandle,
        resource_type: ResourceType,
        generate_mipmaps: bool,
    ) -> Option<Self> {
        let kind = match resource_type {
            ResourceType::SwapChain => RenderTargetKind::SwapChain,
            ResourceType::Framebuffer => RenderTargetKind::Framebuffer,
            _ => return None,
        };
        Some(Self {
            handle,
            kind,
            generate_mipmaps: generate_mipmaps && kind == RenderTargetKind::Framebuffer,
        })
    }

    fn is_framebuffer(&self) -> bool {
        self.kind == RenderTargetKind::Framebuffer
    }
}

/// The native side of a render target change.
pub trait RenderTargetBackend<T> {
    /// Explicitly binds the default (window) framebuffer.
    fn bind_default_framebuffer(&mut self);

    /// Makes `target` the native render target.
    fn bind_render_target(&mut self, target: &ActiveRenderTarget, payload: &T);

    /// Regenerates the mipmaps of every color attachment of a framebuffer.
    fn generate_framebuffer_mipmaps(&mut self, framebuffer: &T, registry: &ResourceRegistry<T>);

    /// Destroys the native object of a resource whose last reference was released.
    fn destroy_resource(&mut self, base: ResourceBase, payload: T);
}

/// The active render target of a renderer: `{none}` or `{target bound}`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetState {
    active: Option<ActiveRenderTarget>,
}

impl RenderTargetState {
    /// An empty state.
    pub const fn new() -> Self {
        Self { active: None }
    }

    /// The active render target.
    pub fn active(&self) -> Option<ActiveRenderTarget> {
        self.active
    }

    /// Changes the active render target.
    ///
    /// Binding the target that is already active is a no-op returning `Ok(false)`.
    /// Otherwise, in order: the new target is retained; if a framebuffer is replaced
    /// by something that is not a framebuffer the default framebuffer is bound
    /// explicitly; the new target is bound; the previous framebuffer has its mipmaps
    /// generated if it asked for it; the previous target is released.
    pub fn set<T, B>(
        &mut self,
        registry: &mut ResourceRegistry<T>,
        backend: &mut B,
        next: Option<ActiveRenderTarget>,
    ) -> Result<bool, ResourceError>
    where
        T: OwnsReferences,
        B: RenderTargetBackend<T>,
    {
        if self.active.map(|active| active.handle) == next.map(|next| next.handle) {
            return Ok(false);
        }
        if let Some(next) = &next {
            registry.add_reference(next.handle)?;
        }
        let previous = std::mem::replace(&mut self.active, next);

        let previous_was_framebuffer = previous.is_some_and(|previous| previous.is_framebuffer());
        let next_is_framebuffer = next.is_some_and(|next| next.is_framebuffer());
        if previous_was_framebuffer && !next_is_framebuffer {
            backend.bind_default_framebuffer();
        }

        if let Some(next) = &next {
            let entry = registry.get(next.handle)?;
            backend.bind_render_target(next, &entry.payload);
        }

        if let Some(previous) = previous {
            if previous.generate_mipmaps {
                if let Ok(entry) = registry.get(previous.handle) {
                    backend.generate_framebuffer_mipmaps(&entry.payload, registry);
                }
            }
            if let Err(err) = registry.release_with(previous.handle, |base, payload| {
                backend.destroy_resource(base, payload)
            }) {
                log::warn!("Failed to release previous render target: {err}");
            }
        }
        Ok(true)
    }

    /// Empties the state and hands the active target's reference to the caller.
    pub fn take(&mut self) -> Option<ActiveRenderTarget> {
        self.active.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::resource::RendererId;

    #[derive(Debug)]
    enum Payload {
        Texture(TextureDimension, TextureFlags),
        Target,
    }

    impl OwnsReferences for Payload {}

    #[derive(Debug, PartialEq, Eq)]
    enum Event {
        BindDefault,
        Bind(ResourceHandle),
        Mipmaps,
        Destroy(ResourceHandle),
    }

    #[derive(Default)]
    struct Backend {
        events: Vec<Event>,
    }

    impl RenderTargetBackend<Payload> for Backend {
        fn bind_default_framebuffer(&mut self) {
            self.events.push(Event::BindDefault);
        }

        fn bind_render_target(&mut self, target: &ActiveRenderTarget, _: &Payload) {
            self.events.push(Event::Bind(target.handle));
        }

        fn generate_framebuffer_mipmaps(&mut self, _: &Payload, _: &ResourceRegistry<Payload>) {
            self.events.push(Event::Mipmaps);
        }

        fn destroy_resource(&mut self, base: ResourceBase, _: Payload) {
            self.events.push(Event::Destroy(base.handle));
        }
    }

    fn describe(payload: &Payload) -> Option<(TextureDimension, TextureFlags)> {
        match payload {
            Payload::Texture(dimension, flags) => Some((*dimension, *flags)),
            Payload::Target => None,
        }
    }

    fn texture(registry: &mut ResourceRegistry<Payload>, size: u32, flags: TextureFlags) -> ResourceHandle {
        registry
            .insert(
                ResourceType::Texture2D,
                Payload::Texture(
                    TextureDimension::D2 {
                        width: size,
                        height: size,
                    },
                    flags,
                ),
            )
            .unwrap()
    }

    #[test]
    fn size_comes_from_the_first_attachment() {
        let mut registry = ResourceRegistry::new(RendererId::next());
        let a = texture(&mut registry, 256, TextureFlags::empty());
        let b = texture(&mut registry, 256, TextureFlags::empty());
        let c = texture(&mut registry, 1024, TextureFlags::empty());

        let two = FramebufferDescriptor {
            color_attachments: vec![FramebufferAttachment::new(a), FramebufferAttachment::new(b)],
            depth_stencil_attachment: None,
        };
        let layout = FramebufferLayout::validate(&mut registry, &two, 8, describe);
        assert_eq!((layout.width, layout.height), (256, 256));

        let three = FramebufferDescriptor {
            color_attachments: vec![
                FramebufferAttachment::new(a),
                FramebufferAttachment::new(b),
                FramebufferAttachment::new(c),
            ],
            depth_stencil_attachment: None,
        };
        let layout = FramebufferLayout::validate(&mut registry, &three, 8, describe);
        assert_eq!((layout.width, layout.height), (256, 256));
        assert_eq!(registry.reference_count(a), Ok(3));
        assert_eq!(registry.reference_count(c), Ok(2));
    }

    #[test]
    fn unsupported_attachments_are_skipped() {
        let mut registry = ResourceRegistry::new(RendererId::next());
        let cube = registry
            .insert(
                ResourceType::TextureCube,
                Payload::Texture(TextureDimension::Cube { size: 64 }, TextureFlags::empty()),
            )
            .unwrap();
        let valid = texture(&mut registry, 128, TextureFlags::GENERATE_MIPMAPS);
        let descriptor = FramebufferDescriptor {
            color_attachments: vec![
                FramebufferAttachment::new(cube),
                FramebufferAttachment {
                    texture: valid,
                    mipmap_index: 1,
                    layer_index: 0,
                },
            ],
            depth_stencil_attachment: None,
        };
        let layout = FramebufferLayout::validate(&mut registry, &descriptor, 8, describe);
        assert_eq!(layout.color_attachments.len(), 1);
        assert_eq!((layout.width, layout.height), (64, 64));
        assert!(layout.generate_mipmaps);
        assert_eq!(registry.reference_count(cube), Ok(1));

        let empty = FramebufferLayout::validate(
            &mut registry,
            &FramebufferDescriptor::default(),
            8,
            describe,
        );
        assert_eq!((empty.width, empty.height), (1, 1));
        assert!(!empty.generate_mipmaps);
    }

    #[test]
    fn detaching_a_mipmapped_framebuffer_generates_once_before_release() {
        let mut registry = ResourceRegistry::new(RendererId::next());
        let f = registry
            .insert(ResourceType::Framebuffer, Payload::Target)
            .unwrap();
        let g = registry
            .insert(ResourceType::Framebuffer, Payload::Target)
            .unwrap();
        let mut state = RenderTargetState::new();
        let mut backend = Backend::default();

        let active_f = ActiveRenderTarget::new(f, ResourceType::Framebuffer, true);
        assert_eq!(state.set(&mut registry, &mut backend, active_f), Ok(true));
        // The creator drops its reference: only the render target state keeps F alive.
        registry.release(f).unwrap();
        backend.events.clear();

        let active_g = ActiveRenderTarget::new(g, ResourceType::Framebuffer, false);
        state.set(&mut registry, &mut backend, active_g).unwrap();
        assert_eq!(
            backend.events,
            vec![Event::Bind(g), Event::Mipmaps, Event::Destroy(f)]
        );
    }

    #[test]
    fn leaving_a_framebuffer_binds_the_default_one_first() {
        let mut registry = ResourceRegistry::new(RendererId::next());
        let framebuffer = registry
            .insert(ResourceType::Framebuffer, Payload::Target)
            .unwrap();
        let swap_chain = registry
            .insert(ResourceType::SwapChain, Payload::Target)
            .unwrap();
        let mut state = RenderTargetState::new();
        let mut backend = Backend::default();

        let first = ActiveRenderTarget::new(framebuffer, ResourceType::Framebuffer, false);
        state.set(&mut registry, &mut backend, first).unwrap();
        assert_eq!(state.set(&mut registry, &mut backend, first), Ok(false));
        assert_eq!(registry.reference_count(framebuffer), Ok(2));

        backend.events.clear();
        let second = ActiveRenderTarget::new(swap_chain, ResourceType::SwapChain, true);
        state.set(&mut registry, &mut backend, second).unwrap();
        assert_eq!(
            backend.events,
            vec![Event::BindDefault, Event::Bind(swap_chain)]
        );
        assert_eq!(registry.reference_count(framebuffer), Ok(1));
        assert_eq!(state.active().map(|active| active.generate_mipmaps), Some(false));
    }
}
