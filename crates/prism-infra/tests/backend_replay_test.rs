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

use prism_core::renderer::{
    BackendKind, BindingError, BufferDescriptor, BufferUsage, ClearFlags, CommandBuffer,
    CommandId, DescriptorRange, DescriptorRangeType, DrawArguments, RenderError, Renderer,
    RendererSettings, ResourceError, ResourceType, RootParameter, RootSignatureDescriptor,
    ShaderVisibility, TextureFlags, TextureFormat, Viewport,
};
use prism_infra::create_renderer;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn renderer(backend: BackendKind) -> Box<dyn Renderer> {
    init_logging();
    create_renderer(&RendererSettings {
        backend,
        report_leaks: false,
        ..RendererSettings::default()
    })
    .unwrap()
}

#[test]
fn test_every_backend_rejects_the_same_packets() {
    for backend in BackendKind::ALL {
        // --- 1. ARRANGE ---
        let mut renderer = renderer(backend);
        let signature = renderer
            .create_root_signature(&RootSignatureDescriptor::new(vec![RootParameter::table(
                DescriptorRange::new(DescriptorRangeType::Texture, 0, "Albedo"),
                ShaderVisibility::ALL_GRAPHICS,
            )]))
            .unwrap();
        let texture = renderer
            .create_texture_2d(16, 16, TextureFormat::Rgba8Unorm, None, TextureFlags::empty())
            .unwrap();

        let mut commands = CommandBuffer::new();
        commands.set_graphics_viewports(&[Viewport::new(16.0, 16.0)]);
        commands.clear(ClearFlags::COLOR, [0.0, 0.0, 0.0, 1.0], 1.0, 0);
        commands.set_graphics_root_signature(Some(signature));
        commands.set_graphics_root_descriptor_table(0, Some(texture));
        commands.set_graphics_root_descriptor_table(5, Some(texture));
        commands.draw(DrawArguments::new(3));

        // --- 2. ACT ---
        let stats = renderer.submit_command_buffer(&commands).unwrap();

        // --- 3. ASSERT ---
        assert_eq!(stats.executed, 5, "{backend} should execute every valid packet");
        assert_eq!(stats.rejected, 1, "{backend} should reject the bad table index");
        let rejection = &stats.rejections[0];
        assert_eq!(
            rejection.command,
            Some(CommandId::SetGraphicsRootDescriptorTable)
        );
        assert_eq!(
            rejection.error,
            RenderError::Binding(BindingError::ParameterIndexOutOfRange {
                parameter_index: 5,
                number_of_parameters: 1,
            })
        );
        assert_eq!(
            renderer.reference_count(texture),
            Ok(2),
            "{backend}: the rejected packet must not touch the valid binding"
        );
    }
}

#[test]
fn test_foreign_handles_are_rejected() {
    // --- 1. ARRANGE ---
    let mut first = renderer(BackendKind::Null);
    let mut second = renderer(BackendKind::OpenGles3);
    let buffer = first
        .create_vertex_buffer(&BufferDescriptor::zeroed(16, BufferUsage::StaticDraw))
        .unwrap();

    // --- 2. ACT ---
    let add = second.add_reference(buffer);
    let release = second.release(buffer);

    // --- 3. ASSERT ---
    let expected = Err(RenderError::Resource(ResourceError::OwnershipMismatch {
        handle: buffer,
        renderer: second.renderer_id(),
    }));
    assert_eq!(add, expected);
    assert_eq!(release, expected);
    assert_eq!(first.reference_count(buffer), Ok(1));
}

#[test]
fn test_leak_report_lists_alive_resources() {
    for backend in BackendKind::ALL {
        let mut renderer = renderer(backend);
        let kept = renderer
            .create_uniform_buffer(&BufferDescriptor::zeroed(64, BufferUsage::DynamicDraw))
            .unwrap();
        let released = renderer
            .create_vertex_buffer(&BufferDescriptor::zeroed(16, BufferUsage::StaticDraw))
            .unwrap();
        assert_eq!(renderer.release(released), Ok(0));

        let report = renderer.leak_report();
        assert_eq!(report.count(), 1, "{backend} should report one leak");
        assert!(report.contains(kept));
        assert!(!report.contains(released));
        assert_eq!(report.per_type(), vec![(ResourceType::UniformBuffer, 1)]);

        let statistics = renderer.statistics();
        assert_eq!(statistics.total_alive(), 1);
        assert_eq!(statistics.total_created(), 2);
        assert_eq!(statistics.alive(ResourceType::VertexBuffer), 0);
    }
}

#[test]
fn test_destroyed_handles_stay_dead() {
    let mut renderer = renderer(BackendKind::Null);
    let buffer = renderer
        .create_vertex_buffer(&BufferDescriptor::zeroed(16, BufferUsage::StaticDraw))
        .unwrap();
    assert_eq!(renderer.add_reference(buffer), Ok(2));
    assert_eq!(renderer.release(buffer), Ok(1));
    assert_eq!(renderer.release(buffer), Ok(0));

    let next = renderer
        .create_vertex_buffer(&BufferDescriptor::zeroed(16, BufferUsage::StaticDraw))
        .unwrap();

    assert_ne!(next, buffer, "Handles are never reused");
    assert_eq!(
        renderer.release(buffer),
        Err(RenderError::Resource(ResourceError::NotFound { handle: buffer }))
    );
    assert_eq!(renderer.reference_count(next), Ok(1));
}
