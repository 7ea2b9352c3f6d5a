//! Rendering system with wgpu pipeline and shader management.
//!
//! Three passes share one frame: analytic sky, displaced ocean grid, and
//! instanced floater hulls. Ambient light comes from the current
//! environment bake.

mod environment;

pub use environment::{EnvironmentMap, GpuBakeBackend, ENVIRONMENT_FORMAT};

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::environment::EnvironmentBake;
use crate::floater::{HullGeometry, HullVertex};
use crate::ocean::{OceanGrid, Vertex};
use crate::params::{HullShape, OceanConfig, RenderConfig};
use crate::simulation::{FrameSink, FrameView};
use crate::sky::{Sh9Uniform, SkyUniform};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Per-frame uniforms shared by every pass (matches `scene_common.wgsl`)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub inv_view_proj: [[f32; 4]; 4],
    /// xyz = eye, w = wave time
    pub camera_position: [f32; 4],
    /// xyz = sun direction, w = environment mip count
    pub sun_direction: [f32; 4],
    /// rgb = water color, w = sun shininess
    pub water_color: [f32; 4],
    pub sun_color: [f32; 4],
}

/// One floater instance: model matrix columns + albedo
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct FloaterInstance {
    model: [[f32; 4]; 4],
    albedo: [f32; 4],
}

struct HullBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    albedo: [f32; 4],
}

/// Rendering system managing wgpu device, pipelines, and buffers
pub struct RenderSystem {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    render_config: RenderConfig,
    depth_view: wgpu::TextureView,

    sky_pipeline: wgpu::RenderPipeline,
    ocean_pipeline: wgpu::RenderPipeline,
    floater_pipeline: wgpu::RenderPipeline,

    frame_uniform_buffer: wgpu::Buffer,
    sky_uniform_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,

    sh_uniform_buffer: wgpu::Buffer,
    environment_layout: wgpu::BindGroupLayout,
    environment_sampler: wgpu::Sampler,
    environment_bind_group: Option<wgpu::BindGroup>,
    environment_mips: u32,

    ocean_grid: OceanGrid,
    ocean_vertex_buffer: wgpu::Buffer,
    ocean_index_buffer: wgpu::Buffer,
    ocean_index_count: u32,

    hull: Option<HullBuffers>,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    instances: Vec<FloaterInstance>,
}

impl RenderSystem {
    /// Create new rendering system
    pub async fn new(
        window: Arc<winit::window::Window>,
        render_config: &RenderConfig,
        ocean_config: &OceanConfig,
    ) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Window must have 'static lifetime via Arc
        let surface = instance
            .create_surface(window)
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("Failed to find suitable GPU adapter"))?;
        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .context("Failed to request device")?;
        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("Surface reports no formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if render_config.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, config.width, config.height);

        let scene_shader = |label: &str, body: &str| {
            let source = [
                include_str!("sky_common.wgsl"),
                include_str!("scene_common.wgsl"),
                body,
            ]
            .concat();
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        };
        let sky_shader = scene_shader("Sky Shader", include_str!("sky.wgsl"));
        let ocean_shader = scene_shader("Ocean Shader", include_str!("ocean.wgsl"));
        let floater_shader = scene_shader("Floater Shader", include_str!("floater.wgsl"));

        // Group 0: frame + sky uniforms
        let frame_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: std::mem::size_of::<FrameUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let sky_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sky Uniform Buffer"),
            size: std::mem::size_of::<SkyUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[uniform_entry(0), uniform_entry(1)],
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: sky_uniform_buffer.as_entire_binding(),
                },
            ],
        });

        // Group 1: environment bake (rebuilt on every bake)
        let sh_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("SH Uniform Buffer"),
            size: std::mem::size_of::<Sh9Uniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let environment_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Environment Bind Group Layout"),
                entries: &[
                    uniform_entry(0),
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });
        let environment_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Environment Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &environment_layout],
            push_constant_ranges: &[],
        });

        let sky_pipeline = scene_pipeline(
            &device,
            "Sky Pipeline",
            &pipeline_layout,
            &sky_shader,
            &[],
            surface_format,
            false,
        );

        let ocean_attributes = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];
        let ocean_pipeline = scene_pipeline(
            &device,
            "Ocean Pipeline",
            &pipeline_layout,
            &ocean_shader,
            &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &ocean_attributes,
            }],
            surface_format,
            true,
        );

        let hull_attributes = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
        let instance_attributes = wgpu::vertex_attr_array![
            2 => Float32x4, 3 => Float32x4, 4 => Float32x4, 5 => Float32x4, 6 => Float32x4
        ];
        let floater_pipeline = scene_pipeline(
            &device,
            "Floater Pipeline",
            &pipeline_layout,
            &floater_shader,
            &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<HullVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &hull_attributes,
                },
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<FloaterInstance>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &instance_attributes,
                },
            ],
            surface_format,
            true,
        );

        let ocean_grid = OceanGrid::new(ocean_config);
        let ocean_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Ocean Vertex Buffer"),
            contents: bytemuck::cast_slice(&ocean_grid.vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let ocean_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Ocean Index Buffer"),
            contents: bytemuck::cast_slice(&ocean_grid.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let ocean_index_count = ocean_grid.indices.len() as u32;

        let instance_capacity = 8;
        let instance_buffer = create_instance_buffer(&device, instance_capacity);

        log::info!(
            "Renderer ready: {}x{} {:?}, ocean grid {}x{}",
            config.width,
            config.height,
            surface_format,
            ocean_grid.grid_size(),
            ocean_grid.grid_size()
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            render_config: render_config.clone(),
            depth_view,
            sky_pipeline,
            ocean_pipeline,
            floater_pipeline,
            frame_uniform_buffer,
            sky_uniform_buffer,
            frame_bind_group,
            sh_uniform_buffer,
            environment_layout,
            environment_sampler,
            environment_bind_group: None,
            environment_mips: 1,
            ocean_grid,
            ocean_vertex_buffer,
            ocean_index_buffer,
            ocean_index_count,
            hull: None,
            instance_buffer,
            instance_capacity,
            instances: Vec::new(),
        })
    }

    /// Bake backend sharing this renderer's device
    pub fn bake_backend(&self) -> GpuBakeBackend {
        GpuBakeBackend::new(
            Arc::clone(&self.device),
            Arc::clone(&self.queue),
            &self.render_config,
        )
    }

    /// Point ambient lighting at a fresh bake
    pub fn set_environment(&mut self, bake: &EnvironmentBake<EnvironmentMap>) {
        self.queue.write_buffer(
            &self.sh_uniform_buffer,
            0,
            bytemuck::bytes_of(&bake.irradiance.uniform()),
        );
        self.environment_bind_group = Some(self.device.create_bind_group(
            &wgpu::BindGroupDescriptor {
                label: Some("Environment Bind Group"),
                layout: &self.environment_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: self.sh_uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&bake.map.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&self.environment_sampler),
                    },
                ],
            },
        ));
        self.environment_mips = bake.map.mip_count;
        log::debug!("Renderer using environment generation {}", bake.generation);
    }

    /// Upload hull geometry once the loader delivers it
    pub fn set_hull(&mut self, geometry: &HullGeometry, shape: HullShape) {
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Hull Vertex Buffer"),
                contents: bytemuck::cast_slice(&geometry.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Hull Index Buffer"),
                contents: bytemuck::cast_slice(&geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let albedo = match shape {
            HullShape::Crate => [0.8, 0.02, 0.02, 1.0],
            HullShape::Skiff => [0.45, 0.28, 0.14, 1.0],
        };
        self.hull = Some(HullBuffers {
            vertex_buffer,
            index_buffer,
            index_count: geometry.indices.len() as u32,
            albedo,
        });
    }

    fn write_uniforms(&self, frame: &FrameView, width: u32, height: u32) {
        let aspect = width as f32 / height.max(1) as f32;
        let (view_proj, eye) = frame.camera.view_proj(&self.render_config, aspect);

        let lighting = frame.lighting.snapshot();
        let sun: Vec3 = lighting.sun_direction();
        let water = &frame.lighting.water;

        let uniforms = FrameUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            inv_view_proj: view_proj.inverse().to_cols_array_2d(),
            camera_position: eye.extend(frame.time).to_array(),
            sun_direction: sun.extend(self.environment_mips as f32).to_array(),
            water_color: Vec3::from_array(water.water_color)
                .extend(water.sun_shininess)
                .to_array(),
            sun_color: Vec3::from_array(water.sun_color).extend(1.0).to_array(),
        };
        self.queue
            .write_buffer(&self.frame_uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        self.queue.write_buffer(
            &self.sky_uniform_buffer,
            0,
            bytemuck::bytes_of(&lighting.sky_uniform()),
        );
    }

    fn write_floaters(&mut self, frame: &FrameView) {
        let albedo = self.hull.as_ref().map_or([1.0; 4], |h| h.albedo);
        self.instances.clear();
        self.instances
            .extend(frame.floaters.iter().map(|f| FloaterInstance {
                model: f.pose().model_matrix().to_cols_array_2d(),
                albedo,
            }));

        if self.instances.len() > self.instance_capacity {
            self.instance_capacity = self.instances.len().next_power_of_two();
            self.instance_buffer = create_instance_buffer(&self.device, self.instance_capacity);
        }
        if !self.instances.is_empty() {
            self.queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&self.instances),
            );
        }
    }
}

impl FrameSink for RenderSystem {
    fn reconcile_viewport(&mut self, width: u32, height: u32) {
        // Minimized windows report 0x0; keep the old surface until restored
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, width, height);
    }

    fn render(&mut self, frame: &FrameView) -> Result<()> {
        let (width, height) = frame.viewport;
        if width == 0 || height == 0 {
            return Ok(());
        }
        if self.environment_bind_group.is_none() {
            return Err(anyhow!("Render called before the environment was baked"));
        }

        self.write_uniforms(frame, width, height);

        self.ocean_grid.displace(frame.waves, frame.time);
        self.queue.write_buffer(
            &self.ocean_vertex_buffer,
            0,
            bytemuck::cast_slice(&self.ocean_grid.vertices),
        );

        self.write_floaters(frame);

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(anyhow!("Failed to acquire surface texture: {}", e)),
        };
        let Some(environment) = self.environment_bind_group.as_ref() else {
            return Err(anyhow!("Environment bind group missing"));
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
            render_pass.set_bind_group(1, environment, &[]);

            // Sky first, fullscreen triangle
            render_pass.set_pipeline(&self.sky_pipeline);
            render_pass.draw(0..3, 0..1);

            // Ocean
            render_pass.set_pipeline(&self.ocean_pipeline);
            render_pass.set_vertex_buffer(0, self.ocean_vertex_buffer.slice(..));
            render_pass
                .set_index_buffer(self.ocean_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.ocean_index_count, 0, 0..1);

            // Floaters
            if let Some(hull) = &self.hull {
                if !self.instances.is_empty() {
                    render_pass.set_pipeline(&self.floater_pipeline);
                    render_pass.set_vertex_buffer(0, hull.vertex_buffer.slice(..));
                    render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                    render_pass
                        .set_index_buffer(hull.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..hull.index_count, 0, 0..self.instances.len() as u32);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn scene_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    buffers: &[wgpu::VertexBufferLayout],
    format: wgpu::TextureFormat,
    depth_write: bool,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // Ocean is seen from both sides at grazing angles
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: if depth_write {
                wgpu::CompareFunction::Less
            } else {
                wgpu::CompareFunction::Always
            },
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    depth_texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Floater Instance Buffer"),
        size: (capacity.max(1) * std::mem::size_of::<FloaterInstance>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layouts_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<FrameUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 192);
        assert_eq!(std::mem::size_of::<SkyUniform>(), 48);
        assert_eq!(std::mem::size_of::<Sh9Uniform>(), 144);
        assert_eq!(std::mem::size_of::<FloaterInstance>(), 80);
    }

    #[test]
    fn test_shaders_share_one_sky_definition() {
        for body in [
            include_str!("sky.wgsl"),
            include_str!("ocean.wgsl"),
            include_str!("floater.wgsl"),
            include_str!("bake_sky.wgsl"),
            include_str!("bake_filter.wgsl"),
        ] {
            assert!(!body.contains("struct SkyUniform"));
            assert!(!body.contains("fn sky_radiance"));
        }
        assert!(include_str!("sky_common.wgsl").contains("fn sky_radiance"));
    }

    #[test]
    fn test_floater_instance_uses_pose_matrix() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let instance = FloaterInstance {
            model: m.to_cols_array_2d(),
            albedo: [1.0; 4],
        };
        assert_eq!(instance.model[3], [1.0, 2.0, 3.0, 1.0]);
    }
}
