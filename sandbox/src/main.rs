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

// Prism Sandbox
// Records one frame per back end and replays it, reporting what was rejected.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use prism_core::renderer::{
    BackendKind, BufferDescriptor, BufferUsage, ClearFlags, CommandBuffer, DescriptorRange,
    DescriptorRangeType, DrawArguments, MapType, PipelineStateDescriptor, ProgramDescriptor,
    Renderer, RendererSettings, ResourceHandle, RootParameter, RootSignatureDescriptor,
    ShaderDescriptor, ShaderStage, ShaderVisibility, SwapChainDescriptor, TextureFormat,
    VertexArrayDescriptor, VertexAttribute, VertexAttributes, VertexFormat, Viewport,
};
use prism_infra::graphics::create_renderer;
use raw_window_handle::{RawWindowHandle, WebWindowHandle};

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    color: [f32; 3],
}

const VERTICES: &[Vertex] = &[
    Vertex {
        position: [0.0, 0.5, 0.0],
        color: [1.0, 0.0, 0.0],
    },
    Vertex {
        position: [-0.5, -0.5, 0.0],
        color: [0.0, 1.0, 0.0],
    },
    Vertex {
        position: [0.5, -0.5, 0.0],
        color: [0.0, 0.0, 1.0],
    },
];

/// Everything one frame needs, created on a single renderer.
struct Scene {
    swap_chain: ResourceHandle,
    root_signature: ResourceHandle,
    pipeline_state: ResourceHandle,
    vertex_array: ResourceHandle,
    uniforms: ResourceHandle,
}

impl Scene {
    fn new(renderer: &mut dyn Renderer) -> Result<Self> {
        let swap_chain = renderer.create_swap_chain(&SwapChainDescriptor {
            window: RawWindowHandle::Web(WebWindowHandle::new(1)),
            width: WIDTH,
            height: HEIGHT,
            format: TextureFormat::Bgra8Unorm,
            depth_stencil_format: None,
        })?;

        let root_signature =
            renderer.create_root_signature(&RootSignatureDescriptor::new(vec![
                RootParameter::table(
                    DescriptorRange::new(DescriptorRangeType::UniformBuffer, 0, "Transform"),
                    ShaderVisibility::ALL_GRAPHICS,
                ),
            ]))?;

        let vertex_attributes = VertexAttributes::new(vec![
            VertexAttribute {
                name: "position".into(),
                format: VertexFormat::Float32x3,
                input_slot: 0,
                aligned_byte_offset: 0,
                stride_in_bytes: std::mem::size_of::<Vertex>() as u32,
                instances_per_element: 0,
            },
            VertexAttribute {
                name: "color".into(),
                format: VertexFormat::Float32x3,
                input_slot: 0,
                aligned_byte_offset: std::mem::size_of::<[f32; 3]>() as u32,
                stride_in_bytes: std::mem::size_of::<Vertex>() as u32,
                instances_per_element: 0,
            },
        ]);

        let language = renderer.shader_language_name();
        let vertex_shader = renderer.create_shader(&ShaderDescriptor {
            stage: ShaderStage::Vertex,
            language: language.into(),
            source: "void main() { gl_Position = vec4(position, 1.0); }".into(),
        })?;
        let fragment_shader = renderer.create_shader(&ShaderDescriptor {
            stage: ShaderStage::Fragment,
            language: language.into(),
            source: "void main() {}".into(),
        })?;
        let program = renderer.create_program(&ProgramDescriptor {
            root_signature,
            vertex_attributes: vertex_attributes.clone(),
            vertex_shader: Some(vertex_shader),
            tessellation_control_shader: None,
            tessellation_evaluation_shader: None,
            geometry_shader: None,
            fragment_shader: Some(fragment_shader),
        })?;
        // The program keeps what it needs; the shader objects can go.
        renderer.release(vertex_shader)?;
        renderer.release(fragment_shader)?;

        let pipeline_state = renderer
            .create_pipeline_state(&PipelineStateDescriptor::new(root_signature, program))?;
        renderer.release(program)?;

        let vertex_buffer = renderer.create_vertex_buffer(&BufferDescriptor::with_data(
            bytemuck::cast_slice(VERTICES),
            BufferUsage::StaticDraw,
        ))?;
        let vertex_array = renderer.create_vertex_array(&VertexArrayDescriptor {
            attributes: vertex_attributes,
            vertex_buffers: vec![vertex_buffer],
            index_buffer: None,
        })?;
        renderer.release(vertex_buffer)?;

        let uniforms = renderer.create_uniform_buffer(&BufferDescriptor::zeroed(
            std::mem::size_of::<[f32; 16]>() as u64,
            BufferUsage::DynamicDraw,
        ))?;

        Ok(Self {
            swap_chain,
            root_signature,
            pipeline_state,
            vertex_array,
            uniforms,
        })
    }

    fn update_transform(&self, renderer: &mut dyn Renderer, scale: f32) -> Result<()> {
        let mut transform = [0.0f32; 16];
        for diagonal in [0, 5, 10] {
            transform[diagonal] = scale;
        }
        transform[15] = 1.0;
        let mapped = renderer.map(self.uniforms, MapType::WriteDiscard)?;
        mapped
            .data
            .copy_from_slice(bytemuck::cast_slice(&transform));
        renderer.unmap(self.uniforms)?;
        Ok(())
    }

    fn record(&self, commands: &mut CommandBuffer) {
        commands.begin_debug_event("Frame");
        commands.set_render_target(Some(self.swap_chain));
        commands.set_graphics_viewports(&[Viewport::new(WIDTH as f32, HEIGHT as f32)]);
        commands.clear(ClearFlags::COLOR_DEPTH_STENCIL, [0.1, 0.1, 0.12, 1.0], 1.0, 0);
        commands.set_graphics_root_signature(Some(self.root_signature));
        commands.set_graphics_pipeline_state(Some(self.pipeline_state));
        commands.set_graphics_root_descriptor_table(0, Some(self.uniforms));
        commands.set_graphics_vertex_array(Some(self.vertex_array));
        commands.draw(DrawArguments::new(VERTICES.len() as u32));
        // Two more triangles through the emulated record path.
        commands.draw_records(&[DrawArguments::new(3), DrawArguments::new(3)]);
        commands.set_graphics_vertex_array(None);
        commands.set_graphics_pipeline_state(None);
        commands.set_graphics_root_signature(None);
        commands.set_render_target(None);
        commands.end_debug_event();
    }

    fn release(self, renderer: &mut dyn Renderer) -> Result<()> {
        for handle in [
            self.uniforms,
            self.vertex_array,
            self.pipeline_state,
            self.root_signature,
            self.swap_chain,
        ] {
            renderer.release(handle)?;
        }
        Ok(())
    }
}

fn load_settings(path: &Path) -> Result<RendererSettings> {
    if !path.exists() {
        log::warn!("{} not found, using default settings", path.display());
        return Ok(RendererSettings::default());
    }
    let source =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    RendererSettings::from_ron_str(&source).with_context(|| format!("parsing {}", path.display()))
}

fn run_backend(settings: &RendererSettings) -> Result<()> {
    let mut renderer = create_renderer(settings)?;
    log::info!(
        "{} ({}) on {}",
        renderer.name(),
        renderer.renderer_id(),
        renderer.capabilities().device_name
    );

    let scene = Scene::new(renderer.as_mut())?;
    let mut commands = CommandBuffer::with_settings(settings);
    for frame in 0..3 {
        scene.update_transform(renderer.as_mut(), 1.0 - frame as f32 * 0.25)?;
        commands.reset();
        scene.record(&mut commands);
        let stats = renderer.submit_command_buffer(&commands)?;
        if stats.is_clean() {
            log::info!("Frame {frame}: {} commands executed", stats.executed);
        } else {
            for rejection in &stats.rejections {
                log::warn!(
                    "Frame {frame}: {:?} at offset {} rejected: {}",
                    rejection.command,
                    rejection.offset,
                    rejection.error
                );
            }
        }
        renderer.present(scene.swap_chain)?;
    }
    renderer.finish()?;

    scene.release(renderer.as_mut())?;
    log::info!(
        "{}: {} resources created, {} still alive",
        renderer.name(),
        renderer.statistics().total_created(),
        renderer.statistics().total_alive()
    );
    Ok(())
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sandbox/settings.ron".to_string());
    let base_settings = load_settings(Path::new(&path))?;

    for backend in BackendKind::ALL {
        let settings = RendererSettings {
            backend,
            ..base_settings.clone()
        };
        run_backend(&settings).with_context(|| format!("running the {backend} back end"))?;
    }
    Ok(())
}
