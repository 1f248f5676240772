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

use approx::assert_relative_eq;
use prism_core::renderer::{
    BindingError, BufferDescriptor, BufferUsage, CommandBuffer, CommandError, CommandExecutor,
    CommandId, DescriptorRange, DescriptorRangeType, DrawArguments, DrawIndexedArguments,
    FramebufferAttachment, FramebufferDescriptor, IndexBufferDescriptor, IndexFormat,
    PipelineStateDescriptor, ProgramDescriptor, RenderError, Renderer, RendererSettings,
    ResourceError, ResourceHandle, RootParameter, RootSignatureDescriptor, ScissorRectangle,
    ShaderDescriptor, ShaderStage, ShaderVisibility, SwapChainDescriptor, TextureFlags,
    TextureFormat, VertexArrayDescriptor, VertexAttribute, VertexAttributes, VertexFormat,
    Viewport,
};
use prism_infra::graphics::gl::{
    GlBufferTarget, GlCall, GlExtensions, GlFramebufferTarget, GlObjectKind, GlPrimitive,
    GlRenderer, GlTextureTarget, RecordingContext,
};
use raw_window_handle::{RawWindowHandle, WebWindowHandle};

type TestRenderer = GlRenderer<RecordingContext>;

fn renderer(context: RecordingContext) -> TestRenderer {
    let _ = env_logger::builder().is_test(true).try_init();
    GlRenderer::new(
        context,
        RendererSettings {
            report_leaks: false,
            ..RendererSettings::default()
        },
    )
}

fn take_calls(renderer: &mut TestRenderer) -> Vec<GlCall> {
    renderer.context_mut().take_calls()
}

/// Name of the last object of `kind` created since the calls were last taken.
fn created_name(renderer: &mut TestRenderer, kind: GlObjectKind) -> u32 {
    take_calls(renderer)
        .into_iter()
        .rev()
        .find_map(|call| match call {
            GlCall::Create { kind: created, name } if created == kind => Some(name),
            _ => None,
        })
        .expect("an object of the requested kind should have been created")
}

fn uniform_signature(renderer: &mut TestRenderer) -> ResourceHandle {
    renderer
        .create_root_signature(&RootSignatureDescriptor::new(vec![RootParameter::table(
            DescriptorRange::new(DescriptorRangeType::UniformBuffer, 0, "PassUniforms"),
            ShaderVisibility::ALL_GRAPHICS,
        )]))
        .unwrap()
}

fn render_texture(renderer: &mut TestRenderer, size: u32, flags: TextureFlags) -> ResourceHandle {
    renderer
        .create_texture_2d(
            size,
            size,
            TextureFormat::Rgba8Unorm,
            None,
            flags | TextureFlags::RENDER_TARGET,
        )
        .unwrap()
}

fn framebuffer(renderer: &mut TestRenderer, textures: &[ResourceHandle]) -> ResourceHandle {
    renderer
        .create_framebuffer(&FramebufferDescriptor {
            color_attachments: textures
                .iter()
                .copied()
                .map(FramebufferAttachment::new)
                .collect(),
            depth_stencil_attachment: None,
        })
        .unwrap()
}

fn window() -> RawWindowHandle {
    RawWindowHandle::Web(WebWindowHandle::new(1))
}

#[test]
fn test_released_resources_are_destroyed_exactly_once() {
    // --- 1. ARRANGE ---
    let mut renderer = renderer(RecordingContext::desktop());
    let buffer = renderer
        .create_vertex_buffer(&BufferDescriptor::zeroed(16, BufferUsage::StaticDraw))
        .unwrap();
    let buffer_name = created_name(&mut renderer, GlObjectKind::Buffer);
    let vertex_array = renderer
        .create_vertex_array(&VertexArrayDescriptor {
            attributes: VertexAttributes::default(),
            vertex_buffers: vec![buffer],
            index_buffer: None,
        })
        .unwrap();
    let vertex_array_name = created_name(&mut renderer, GlObjectKind::VertexArray);
    renderer.set_graphics_vertex_array(Some(vertex_array)).unwrap();

    // --- 2. ACT ---
    // The application lets go of both; only the binding keeps them alive.
    assert_eq!(renderer.release(buffer), Ok(1));
    assert_eq!(renderer.release(vertex_array), Ok(1));
    take_calls(&mut renderer);
    renderer.set_graphics_vertex_array(None).unwrap();

    // --- 3. ASSERT ---
    let calls = take_calls(&mut renderer);
    let deletions = |kind, name| {
        calls
            .iter()
            .filter(|call| **call == GlCall::Delete { kind, name })
            .count()
    };
    assert_eq!(deletions(GlObjectKind::VertexArray, vertex_array_name), 1);
    assert_eq!(
        deletions(GlObjectKind::Buffer, buffer_name),
        1,
        "The vertex buffer should be destroyed with the vertex array that retained it"
    );
    assert_eq!(
        renderer.release(buffer),
        Err(RenderError::Resource(ResourceError::NotFound { handle: buffer }))
    );
    assert!(take_calls(&mut renderer).is_empty());
}

#[test]
fn test_rebinding_the_same_resource_is_a_no_op() {
    // --- 1. ARRANGE ---
    let mut renderer = renderer(RecordingContext::gles3());
    let signature = uniform_signature(&mut renderer);
    let buffer = renderer
        .create_vertex_buffer(&BufferDescriptor::zeroed(16, BufferUsage::StaticDraw))
        .unwrap();
    let vertex_array = renderer
        .create_vertex_array(&VertexArrayDescriptor {
            attributes: VertexAttributes::default(),
            vertex_buffers: vec![buffer],
            index_buffer: None,
        })
        .unwrap();
    renderer.set_graphics_root_signature(Some(signature)).unwrap();
    renderer.set_graphics_vertex_array(Some(vertex_array)).unwrap();
    take_calls(&mut renderer);

    // --- 2. ACT ---
    renderer.set_graphics_root_signature(Some(signature)).unwrap();
    renderer.set_graphics_vertex_array(Some(vertex_array)).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(renderer.reference_count(signature), Ok(2));
    assert_eq!(renderer.reference_count(vertex_array), Ok(2));
    assert!(
        take_calls(&mut renderer).is_empty(),
        "Rebinding should not issue any native call"
    );
}

#[test]
fn test_inline_and_auxiliary_viewports_issue_the_same_calls() {
    // --- 1. ARRANGE ---
    let viewport = Viewport {
        top_left_y: 100.0,
        ..Viewport::new(400.0, 300.0)
    };
    let mut inline = CommandBuffer::new();
    inline.set_graphics_viewports(&[viewport]);
    let mut auxiliary = CommandBuffer::new();
    auxiliary.set_graphics_viewports_auxiliary(&[viewport]);

    let replay = |buffer: &CommandBuffer| {
        let mut renderer = renderer(RecordingContext::gles3());
        let swap_chain = renderer
            .create_swap_chain(&SwapChainDescriptor {
                window: window(),
                width: 800,
                height: 600,
                format: TextureFormat::Bgra8Unorm,
                depth_stencil_format: None,
            })
            .unwrap();
        renderer.set_render_target(Some(swap_chain)).unwrap();
        take_calls(&mut renderer);
        let stats = renderer.submit_command_buffer(buffer).unwrap();
        assert!(stats.is_clean());
        take_calls(&mut renderer)
    };

    // --- 2. ACT ---
    let inline_calls = replay(&inline);
    let auxiliary_calls = replay(&auxiliary);

    // --- 3. ASSERT ---
    assert_eq!(inline_calls, auxiliary_calls);
    assert_eq!(
        inline_calls[0],
        GlCall::Viewport {
            x: 0,
            y: 200,
            width: 400,
            height: 300
        },
        "The viewport should be flipped to a bottom-left origin"
    );
}

#[test]
fn test_viewport_arrays_are_flipped_per_viewport() {
    let mut renderer = renderer(RecordingContext::desktop());
    let texture = render_texture(&mut renderer, 256, TextureFlags::empty());
    let target = framebuffer(&mut renderer, &[texture]);
    renderer.set_render_target(Some(target)).unwrap();
    take_calls(&mut renderer);

    renderer
        .set_graphics_viewports(&[
            Viewport::new(128.0, 128.0),
            Viewport {
                top_left_x: 128.0,
                top_left_y: 64.0,
                ..Viewport::new(128.0, 32.0)
            },
        ])
        .unwrap();

    let flipped: Vec<(u32, f32, f32)> = take_calls(&mut renderer)
        .into_iter()
        .filter_map(|call| match call {
            GlCall::ViewportIndexed { index, x, y, .. } => Some((index, x, y)),
            _ => None,
        })
        .collect();
    assert_eq!(flipped.len(), 2);
    assert_relative_eq!(flipped[0].2, 128.0);
    assert_relative_eq!(flipped[1].1, 128.0);
    assert_relative_eq!(flipped[1].2, 160.0);
}

#[test]
fn test_type_mismatch_keeps_the_previous_binding() {
    // --- 1. ARRANGE ---
    let mut renderer = renderer(RecordingContext::gles3());
    let signature = uniform_signature(&mut renderer);
    let uniforms = renderer
        .create_uniform_buffer(&BufferDescriptor::zeroed(64, BufferUsage::DynamicDraw))
        .unwrap();
    let texture = render_texture(&mut renderer, 4, TextureFlags::empty());
    renderer.set_graphics_root_signature(Some(signature)).unwrap();
    renderer
        .set_graphics_root_descriptor_table(0, Some(uniforms))
        .unwrap();
    take_calls(&mut renderer);

    // --- 2. ACT ---
    let result = renderer.set_graphics_root_descriptor_table(0, Some(texture));

    // --- 3. ASSERT ---
    assert!(matches!(
        result,
        Err(RenderError::Binding(BindingError::RangeTypeMismatch {
            parameter_index: 0,
            ..
        }))
    ));
    assert!(take_calls(&mut renderer).is_empty());
    assert_eq!(
        renderer.reference_count(uniforms),
        Ok(2),
        "The uniform buffer should still be bound"
    );
    assert_eq!(renderer.reference_count(texture), Ok(1));
}

#[test]
fn test_emulated_records_become_one_draw_each_in_order() {
    // --- 1. ARRANGE ---
    let mut renderer = renderer(RecordingContext::gles2());
    let records = [
        DrawArguments::new(3),
        DrawArguments::new(0),
        DrawArguments {
            start_vertex_location: 5,
            ..DrawArguments::new(6)
        },
    ];
    let mut commands = CommandBuffer::new();
    commands.draw_records(&records);

    // --- 2. ACT ---
    let stats = renderer.submit_command_buffer(&commands).unwrap();

    // --- 3. ASSERT ---
    assert!(stats.is_clean());
    let draws: Vec<GlCall> = take_calls(&mut renderer)
        .into_iter()
        .filter(GlCall::is_draw)
        .collect();
    assert_eq!(
        draws,
        vec![
            GlCall::DrawArrays {
                mode: GlPrimitive::Triangles,
                first: 0,
                count: 3
            },
            GlCall::DrawArrays {
                mode: GlPrimitive::Triangles,
                first: 0,
                count: 0
            },
            GlCall::DrawArrays {
                mode: GlPrimitive::Triangles,
                first: 5,
                count: 6
            },
        ]
    );
}

#[test]
fn test_unsupported_record_fails_the_whole_draw() {
    let mut renderer = renderer(RecordingContext::gles2());
    let mut commands = CommandBuffer::new();
    commands.draw_records(&[
        DrawArguments::new(3),
        DrawArguments {
            instance_count: 4,
            ..DrawArguments::new(3)
        },
    ]);

    let stats = renderer.submit_command_buffer(&commands).unwrap();

    assert_eq!(stats.rejected, 1);
    assert!(
        !take_calls(&mut renderer).iter().any(GlCall::is_draw),
        "No record should be drawn when one of them is unsupported"
    );
}

#[test]
fn test_indexed_draws_use_the_bound_index_buffer() {
    let mut renderer = renderer(RecordingContext::gles3());
    let vertices = renderer
        .create_vertex_buffer(&BufferDescriptor::zeroed(48, BufferUsage::StaticDraw))
        .unwrap();
    let indices = renderer
        .create_index_buffer(&IndexBufferDescriptor {
            buffer: BufferDescriptor::zeroed(12, BufferUsage::StaticDraw),
            format: IndexFormat::Uint16,
        })
        .unwrap();
    let vertex_array = renderer
        .create_vertex_array(&VertexArrayDescriptor {
            attributes: VertexAttributes::default(),
            vertex_buffers: vec![vertices],
            index_buffer: Some(indices),
        })
        .unwrap();

    let missing = renderer.draw_indexed_emulated(DrawIndexedArguments::new(3).as_bytes(), 0, 1);
    assert_eq!(
        missing,
        Err(RenderError::Binding(BindingError::NoIndexBuffer))
    );

    renderer.set_graphics_vertex_array(Some(vertex_array)).unwrap();
    take_calls(&mut renderer);
    let record = DrawIndexedArguments {
        start_index_location: 3,
        ..DrawIndexedArguments::new(3)
    };
    renderer
        .draw_indexed_emulated(record.as_bytes(), 0, 1)
        .unwrap();
    assert_eq!(
        take_calls(&mut renderer),
        vec![GlCall::DrawElements {
            mode: GlPrimitive::Triangles,
            count: 3,
            index_type: prism_infra::graphics::gl::GlIndexType::UnsignedShort,
            offset: 6,
        }]
    );
}

#[test]
fn test_framebuffer_size_comes_from_the_first_attachment() {
    let mut renderer = renderer(RecordingContext::desktop());
    let first = render_texture(&mut renderer, 256, TextureFlags::empty());
    let second = render_texture(&mut renderer, 256, TextureFlags::empty());
    let larger = render_texture(&mut renderer, 512, TextureFlags::empty());

    let target = framebuffer(&mut renderer, &[first, second, larger]);

    assert_eq!(renderer.render_target_size(target), Ok((256, 256)));
    assert_eq!(renderer.reference_count(larger), Ok(2));
}

#[test]
fn test_framebuffer_mipmaps_are_generated_when_it_is_replaced() {
    // --- 1. ARRANGE ---
    let mut renderer = renderer(RecordingContext::desktop());
    let mipmapped = render_texture(&mut renderer, 64, TextureFlags::GENERATE_MIPMAPS);
    let mipmapped_name = created_name(&mut renderer, GlObjectKind::Texture);
    let plain = render_texture(&mut renderer, 64, TextureFlags::empty());
    let first = framebuffer(&mut renderer, &[mipmapped]);
    let first_name = created_name(&mut renderer, GlObjectKind::Framebuffer);
    let second = framebuffer(&mut renderer, &[plain]);
    let second_name = created_name(&mut renderer, GlObjectKind::Framebuffer);

    renderer.set_render_target(Some(first)).unwrap();
    assert_eq!(renderer.release(first), Ok(1));
    take_calls(&mut renderer);

    // --- 2. ACT ---
    renderer.set_render_target(Some(second)).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(
        take_calls(&mut renderer),
        vec![
            GlCall::BindFramebuffer {
                target: GlFramebufferTarget::Framebuffer,
                framebuffer: second_name,
            },
            GlCall::BindTexture {
                target: GlTextureTarget::Texture2D,
                texture: mipmapped_name,
            },
            GlCall::GenerateMipmap {
                target: GlTextureTarget::Texture2D,
            },
            GlCall::BindTexture {
                target: GlTextureTarget::Texture2D,
                texture: 0,
            },
            GlCall::Delete {
                kind: GlObjectKind::Framebuffer,
                name: first_name,
            },
        ]
    );
    assert_eq!(renderer.active_render_target(), Some(second));
    assert_eq!(
        renderer.reference_count(mipmapped),
        Ok(1),
        "The attachment should outlive the framebuffer that retained it"
    );
}

#[test]
fn test_descriptor_table_without_root_signature_is_rejected() {
    let mut renderer = renderer(RecordingContext::gles3());
    let uniforms = renderer
        .create_uniform_buffer(&BufferDescriptor::zeroed(64, BufferUsage::DynamicDraw))
        .unwrap();
    take_calls(&mut renderer);

    let mut commands = CommandBuffer::new();
    commands.set_graphics_root_descriptor_table(0, Some(uniforms));
    let stats = renderer.submit_command_buffer(&commands).unwrap();

    assert_eq!(stats.rejected, 1);
    assert_eq!(
        stats.rejections[0].error,
        RenderError::Binding(BindingError::RootSignatureNotSet)
    );
    assert!(take_calls(&mut renderer).is_empty());
    assert_eq!(renderer.reference_count(uniforms), Ok(1));
}

#[test]
fn test_uninitialized_renderer_rejects_everything() {
    let mut renderer = renderer(RecordingContext::failing(GlExtensions::gles3()));

    assert!(!renderer.is_initialized());
    assert_eq!(
        renderer.create_vertex_buffer(&BufferDescriptor::zeroed(16, BufferUsage::StaticDraw)),
        Err(RenderError::NotInitialized)
    );
    assert_eq!(
        renderer
            .submit_command_buffer(&CommandBuffer::new())
            .unwrap_err(),
        RenderError::NotInitialized
    );
    assert_eq!(
        renderer.set_graphics_viewports(&[Viewport::new(1.0, 1.0)]),
        Err(RenderError::NotInitialized)
    );
    assert!(take_calls(&mut renderer).is_empty());
}

/// Pipeline over a GLES program that reads "PassUniforms" as a uniform array.
fn gles2_pipeline(renderer: &mut TestRenderer, signature: ResourceHandle) -> ResourceHandle {
    let shader = |renderer: &mut TestRenderer, stage| {
        renderer
            .create_shader(&ShaderDescriptor {
                stage,
                language: "ESSL".into(),
                source: "void main() {}".into(),
            })
            .unwrap()
    };
    let vertex_shader = shader(renderer, ShaderStage::Vertex);
    let fragment_shader = shader(renderer, ShaderStage::Fragment);
    let program = renderer
        .create_program(&ProgramDescriptor {
            root_signature: signature,
            vertex_attributes: VertexAttributes::new(vec![VertexAttribute {
                name: "Position".into(),
                format: VertexFormat::Float32x3,
                input_slot: 0,
                aligned_byte_offset: 0,
                stride_in_bytes: 12,
                instances_per_element: 0,
            }]),
            vertex_shader: Some(vertex_shader),
            tessellation_control_shader: None,
            tessellation_evaluation_shader: None,
            geometry_shader: None,
            fragment_shader: Some(fragment_shader),
        })
        .unwrap();
    renderer
        .create_pipeline_state(&PipelineStateDescriptor::new(signature, program))
        .unwrap()
}

fn float_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|value| value.to_ne_bytes()).collect()
}

fn triangle() -> GlCall {
    GlCall::DrawArrays {
        mode: GlPrimitive::Triangles,
        first: 0,
        count: 3,
    }
}

#[test]
fn test_gles2_uploads_uniform_buffers_to_the_program() {
    // --- 1. ARRANGE ---
    let mut renderer = renderer(RecordingContext::gles2());
    let signature = uniform_signature(&mut renderer);
    let pipeline = gles2_pipeline(&mut renderer, signature);
    let uniforms = renderer
        .create_uniform_buffer(&BufferDescriptor::with_data(
            &float_bytes(&[1.0, 2.0]),
            BufferUsage::DynamicDraw,
        ))
        .unwrap();
    assert!(
        !take_calls(&mut renderer).iter().any(|call| matches!(
            call,
            GlCall::Create {
                kind: GlObjectKind::Buffer,
                ..
            }
        )),
        "Uniform buffers have no GL object without uniform buffer support"
    );

    // --- 2. ACT ---
    // The table is bound before any pipeline, as the GLES3 back end accepts.
    let table_first = renderer
        .set_graphics_root_signature(Some(signature))
        .and_then(|()| renderer.set_graphics_root_descriptor_table(0, Some(uniforms)));
    renderer.set_graphics_pipeline_state(Some(pipeline)).unwrap();
    let before_draw = take_calls(&mut renderer);
    renderer
        .draw_emulated(DrawArguments::new(3).as_bytes(), 0, 1)
        .unwrap();

    // --- 3. ASSERT ---
    assert_eq!(table_first, Ok(()), "Binding order should not matter");
    assert!(
        !before_draw
            .iter()
            .any(|call| matches!(call, GlCall::Uniform4fv { .. })),
        "Uniforms are uploaded when a draw needs them"
    );
    assert_eq!(
        take_calls(&mut renderer),
        vec![
            GlCall::Uniform4fv {
                location: 0,
                data: vec![1.0, 2.0, 0.0, 0.0],
            },
            triangle(),
        ]
    );
}

#[test]
fn test_gles2_uniforms_follow_buffer_writes_and_pipeline_changes() {
    // --- 1. ARRANGE ---
    let mut renderer = renderer(RecordingContext::gles2());
    let signature = uniform_signature(&mut renderer);
    let first_pipeline = gles2_pipeline(&mut renderer, signature);
    let second_pipeline = gles2_pipeline(&mut renderer, signature);
    let uniforms = renderer
        .create_uniform_buffer(&BufferDescriptor::with_data(
            &float_bytes(&[1.0, 2.0]),
            BufferUsage::DynamicDraw,
        ))
        .unwrap();
    renderer.set_graphics_root_signature(Some(signature)).unwrap();
    renderer.set_graphics_pipeline_state(Some(first_pipeline)).unwrap();
    renderer
        .set_graphics_root_descriptor_table(0, Some(uniforms))
        .unwrap();
    let draw = |renderer: &mut TestRenderer| {
        renderer
            .draw_emulated(DrawArguments::new(3).as_bytes(), 0, 1)
            .unwrap();
        take_calls(renderer)
    };
    draw(&mut renderer);

    // --- 2. ACT ---
    renderer
        .copy_resource_data(uniforms, 0, &float_bytes(&[1.5]))
        .unwrap();
    let after_write = take_calls(&mut renderer);
    let updated_draw = draw(&mut renderer);
    let clean_draw = draw(&mut renderer);
    renderer.set_graphics_pipeline_state(Some(second_pipeline)).unwrap();
    take_calls(&mut renderer);
    let switched_draw = draw(&mut renderer);

    // --- 3. ASSERT ---
    let upload = GlCall::Uniform4fv {
        location: 0,
        data: vec![1.5, 2.0, 0.0, 0.0],
    };
    assert!(
        after_write.is_empty(),
        "The write only touches system memory"
    );
    assert_eq!(
        updated_draw,
        vec![upload.clone(), triangle()],
        "The next draw should see the written value"
    );
    assert_eq!(
        clean_draw,
        vec![triangle()],
        "Unchanged uniforms are not uploaded again"
    );
    assert_eq!(
        switched_draw,
        vec![upload, triangle()],
        "A new program should receive the current uniforms"
    );
}

#[test]
fn test_gles2_vertex_arrays_respecify_attributes_on_bind() {
    let mut renderer = renderer(RecordingContext::gles2());
    let buffer = renderer
        .create_vertex_buffer(&BufferDescriptor::zeroed(36, BufferUsage::StaticDraw))
        .unwrap();
    let buffer_name = created_name(&mut renderer, GlObjectKind::Buffer);
    let vertex_array = renderer
        .create_vertex_array(&VertexArrayDescriptor {
            attributes: VertexAttributes::new(vec![VertexAttribute {
                name: "Position".into(),
                format: VertexFormat::Float32x3,
                input_slot: 0,
                aligned_byte_offset: 0,
                stride_in_bytes: 12,
                instances_per_element: 0,
            }]),
            vertex_buffers: vec![buffer],
            index_buffer: None,
        })
        .unwrap();
    assert!(
        take_calls(&mut renderer).is_empty(),
        "No vertex array object exists on this profile"
    );

    renderer.set_graphics_vertex_array(Some(vertex_array)).unwrap();
    renderer.set_graphics_vertex_array(None).unwrap();

    assert_eq!(
        take_calls(&mut renderer),
        vec![
            GlCall::BindBuffer {
                target: GlBufferTarget::Array,
                buffer: buffer_name,
            },
            GlCall::EnableVertexAttribArray { index: 0 },
            GlCall::VertexAttribPointer {
                index: 0,
                size: 3,
                data_type: prism_infra::graphics::gl::GlDataType::Float,
                normalized: false,
                stride: 12,
                offset: 0,
            },
            GlCall::DisableVertexAttribArray { index: 0 },
        ]
    );
}

#[test]
fn test_creating_an_index_buffer_keeps_the_bound_vertex_array_indices() {
    // --- 1. ARRANGE ---
    let mut renderer = renderer(RecordingContext::gles3());
    let vertices = renderer
        .create_vertex_buffer(&BufferDescriptor::zeroed(48, BufferUsage::StaticDraw))
        .unwrap();
    let indices = renderer
        .create_index_buffer(&IndexBufferDescriptor {
            buffer: BufferDescriptor::zeroed(12, BufferUsage::StaticDraw),
            format: IndexFormat::Uint16,
        })
        .unwrap();
    take_calls(&mut renderer);
    let vertex_array = renderer
        .create_vertex_array(&VertexArrayDescriptor {
            attributes: VertexAttributes::default(),
            vertex_buffers: vec![vertices],
            index_buffer: Some(indices),
        })
        .unwrap();
    let vertex_array_name = created_name(&mut renderer, GlObjectKind::VertexArray);
    renderer.set_graphics_vertex_array(Some(vertex_array)).unwrap();
    take_calls(&mut renderer);

    // --- 2. ACT ---
    renderer
        .create_index_buffer(&IndexBufferDescriptor {
            buffer: BufferDescriptor::zeroed(6, BufferUsage::StaticDraw),
            format: IndexFormat::Uint16,
        })
        .unwrap();
    let created = take_calls(&mut renderer);
    renderer.copy_resource_data(indices, 0, &[1, 0]).unwrap();
    let updated = take_calls(&mut renderer);

    // --- 3. ASSERT ---
    let new_buffer = match &created[0] {
        GlCall::Create {
            kind: GlObjectKind::Buffer,
            name,
        } => *name,
        other => panic!("expected a buffer to be created first, got {other:?}"),
    };
    assert_eq!(
        created[1..3],
        [
            GlCall::BindVertexArray { vertex_array: 0 },
            GlCall::BindBuffer {
                target: GlBufferTarget::ElementArray,
                buffer: new_buffer,
            },
        ],
        "The upload should not go through the bound vertex array"
    );
    let restore = GlCall::BindVertexArray {
        vertex_array: vertex_array_name,
    };
    assert_eq!(created.last(), Some(&restore));
    assert_eq!(
        updated.first(),
        Some(&GlCall::BindVertexArray { vertex_array: 0 })
    );
    assert_eq!(
        updated.last(),
        Some(&restore),
        "Index updates should also leave the vertex array bound"
    );
}

#[test]
fn test_gles2_index_buffer_creation_rebinds_the_emulated_indices() {
    // --- 1. ARRANGE ---
    let mut renderer = renderer(RecordingContext::gles2());
    let vertices = renderer
        .create_vertex_buffer(&BufferDescriptor::zeroed(48, BufferUsage::StaticDraw))
        .unwrap();
    let indices = renderer
        .create_index_buffer(&IndexBufferDescriptor {
            buffer: BufferDescriptor::zeroed(12, BufferUsage::StaticDraw),
            format: IndexFormat::Uint16,
        })
        .unwrap();
    let indices_name = created_name(&mut renderer, GlObjectKind::Buffer);
    let vertex_array = renderer
        .create_vertex_array(&VertexArrayDescriptor {
            attributes: VertexAttributes::default(),
            vertex_buffers: vec![vertices],
            index_buffer: Some(indices),
        })
        .unwrap();
    renderer.set_graphics_vertex_array(Some(vertex_array)).unwrap();
    take_calls(&mut renderer);

    // --- 2. ACT ---
    renderer
        .create_index_buffer(&IndexBufferDescriptor {
            buffer: BufferDescriptor::zeroed(6, BufferUsage::StaticDraw),
            format: IndexFormat::Uint16,
        })
        .unwrap();

    // --- 3. ASSERT ---
    let calls = take_calls(&mut renderer);
    assert!(
        !calls
            .iter()
            .any(|call| matches!(call, GlCall::BindVertexArray { .. })),
        "This profile has no vertex array objects"
    );
    assert_eq!(
        calls.last(),
        Some(&GlCall::BindBuffer {
            target: GlBufferTarget::ElementArray,
            buffer: indices_name,
        }),
        "The global index binding should point at the bound indices again"
    );
}

#[test]
fn test_creating_a_texture_keeps_the_texture_bound_through_a_table() {
    // --- 1. ARRANGE ---
    let mut renderer = renderer(RecordingContext::desktop());
    let signature = renderer
        .create_root_signature(&RootSignatureDescriptor::new(vec![RootParameter::table(
            DescriptorRange::new(DescriptorRangeType::Texture, 0, "Albedo"),
            ShaderVisibility::ALL_GRAPHICS,
        )]))
        .unwrap();
    let texture = |renderer: &mut TestRenderer| {
        renderer
            .create_texture_2d(16, 16, TextureFormat::Rgba8Unorm, None, TextureFlags::empty())
            .unwrap()
    };
    let bound = texture(&mut renderer);
    let bound_name = created_name(&mut renderer, GlObjectKind::Texture);
    renderer.set_graphics_root_signature(Some(signature)).unwrap();
    renderer
        .set_graphics_root_descriptor_table(0, Some(bound))
        .unwrap();
    take_calls(&mut renderer);

    // --- 2. ACT ---
    texture(&mut renderer);

    // --- 3. ASSERT ---
    let calls = take_calls(&mut renderer);
    let created_name = match &calls[0] {
        GlCall::Create {
            kind: GlObjectKind::Texture,
            name,
        } => *name,
        other => panic!("expected a texture to be created first, got {other:?}"),
    };
    assert_eq!(
        calls[1],
        GlCall::BindTexture {
            target: GlTextureTarget::Texture2D,
            texture: created_name,
        }
    );
    assert_eq!(
        calls.last(),
        Some(&GlCall::BindTexture {
            target: GlTextureTarget::Texture2D,
            texture: bound_name,
        }),
        "The texture of the descriptor table should be bound again"
    );
}

#[test]
fn test_overflowing_scissor_rectangles_are_rejected() {
    // --- 1. ARRANGE ---
    let mut renderer = renderer(RecordingContext::desktop());
    let valid = ScissorRectangle {
        top_left_x: 0,
        top_left_y: 0,
        bottom_right_x: 64,
        bottom_right_y: 64,
    };
    let overflowing = ScissorRectangle {
        top_left_x: -1,
        top_left_y: 0,
        bottom_right_x: i32::MAX,
        bottom_right_y: 64,
    };
    take_calls(&mut renderer);

    // --- 2. ACT ---
    let result = renderer.set_graphics_scissor_rectangles(&[valid, overflowing]);

    // --- 3. ASSERT ---
    assert_eq!(
        result,
        Err(RenderError::Command(CommandError::InvalidArgument {
            command: CommandId::SetGraphicsScissorRectangles,
            details: "scissor rectangle extent overflows",
        }))
    );
    assert!(
        take_calls(&mut renderer).is_empty(),
        "No rectangle of a rejected list should reach the context"
    );
}
