//! GPU environment bake: equirectangular sky capture plus a cone-filtered
//! mip chain.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use wgpu::util::DeviceExt;

use crate::environment::BakeBackend;
use crate::params::RenderConfig;
use crate::sky::{SkyEnvironment, SkyUniform};

/// HDR format for the baked map
pub const ENVIRONMENT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Samples per texel in each filter pass
const FILTER_SAMPLES: u32 = 48;

/// Uniforms for one filter pass (matches `bake_filter.wgsl`)
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct FilterUniforms {
    cone_angle: f32,
    sample_count: u32,
    _padding: [f32; 2],
}

/// A baked environment living on the GPU
pub struct EnvironmentMap {
    pub texture: wgpu::Texture,
    /// View over the full mip chain
    pub view: wgpu::TextureView,
    pub mip_count: u32,
}

/// Render-target backend for [`EnvironmentBaker`](crate::environment::EnvironmentBaker)
pub struct GpuBakeBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    sky_pipeline: wgpu::RenderPipeline,
    sky_bind_group: wgpu::BindGroup,
    sky_uniform_buffer: wgpu::Buffer,
    filter_pipeline: wgpu::RenderPipeline,
    filter_bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    width: u32,
    mip_count: u32,
}

impl GpuBakeBackend {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>, config: &RenderConfig) -> Self {
        let width = config.environment_width.clamp(16, 4096).next_power_of_two();
        let height = width / 2;
        // Stop before the smallest level degenerates
        let max_mips = height.ilog2().saturating_sub(2).max(1);
        let mip_count = config.environment_mips.clamp(1, max_mips);

        let sky_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Environment Sky Shader"),
            source: wgpu::ShaderSource::Wgsl(
                concat!(include_str!("sky_common.wgsl"), include_str!("bake_sky.wgsl")).into(),
            ),
        });

        let filter_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Environment Filter Shader"),
            source: wgpu::ShaderSource::Wgsl(
                concat!(include_str!("sky_common.wgsl"), include_str!("bake_filter.wgsl")).into(),
            ),
        });

        let sky_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Environment Sky Uniform Buffer"),
            size: std::mem::size_of::<SkyUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sky_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Environment Sky Bind Group Layout"),
                entries: &[uniform_entry(0, wgpu::ShaderStages::FRAGMENT)],
            });

        let sky_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Environment Sky Bind Group"),
            layout: &sky_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: sky_uniform_buffer.as_entire_binding(),
            }],
        });

        let filter_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Environment Filter Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                    uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
                ],
            });

        let sky_pipeline = fullscreen_pipeline(
            &device,
            "Environment Sky Pipeline",
            &sky_shader,
            &sky_bind_group_layout,
        );
        let filter_pipeline = fullscreen_pipeline(
            &device,
            "Environment Filter Pipeline",
            &filter_shader,
            &filter_bind_group_layout,
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Environment Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        log::info!(
            "Environment bake target {}x{} {:?}, {} mips",
            width,
            height,
            ENVIRONMENT_FORMAT,
            mip_count
        );

        Self {
            device,
            queue,
            sky_pipeline,
            sky_bind_group,
            sky_uniform_buffer,
            filter_pipeline,
            filter_bind_group_layout,
            sampler,
            width,
            mip_count,
        }
    }

    /// Sampler suitable for reading baked maps (repeat in u, clamp in v)
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// Allocate the render target, reporting out-of-memory as an error
    fn allocate(&self) -> Result<wgpu::Texture> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Environment Map"),
            size: wgpu::Extent3d {
                width: self.width,
                height: self.width / 2,
                depth_or_array_layers: 1,
            },
            mip_level_count: self.mip_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: ENVIRONMENT_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        match pollster::block_on(self.device.pop_error_scope()) {
            None => Ok(texture),
            Some(e) => {
                texture.destroy();
                Err(anyhow!("Environment render target allocation failed: {}", e))
            }
        }
    }

    fn level_view(texture: &wgpu::Texture, level: u32) -> wgpu::TextureView {
        texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Environment Mip View"),
            base_mip_level: level,
            mip_level_count: Some(1),
            ..Default::default()
        })
    }
}

impl BakeBackend for GpuBakeBackend {
    type Map = EnvironmentMap;

    fn render_to_target(&mut self, sky: &SkyEnvironment) -> Result<EnvironmentMap> {
        let texture = self.allocate().context("Failed to bake environment map")?;

        self.queue
            .write_buffer(&self.sky_uniform_buffer, 0, bytemuck::bytes_of(&sky.uniform()));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Environment Bake Encoder"),
            });

        // Level 0: raw sky
        {
            let target = Self::level_view(&texture, 0);
            let mut pass = begin_target_pass(&mut encoder, &target, "Environment Sky Pass");
            pass.set_pipeline(&self.sky_pipeline);
            pass.set_bind_group(0, &self.sky_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        // Each level widens the lobe; roughness grows linearly across the chain
        for level in 1..self.mip_count {
            let roughness = level as f32 / (self.mip_count - 1).max(1) as f32;
            let uniforms = FilterUniforms {
                cone_angle: (roughness * std::f32::consts::FRAC_PI_2).max(0.02),
                sample_count: FILTER_SAMPLES,
                _padding: [0.0; 2],
            };
            let uniform_buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Environment Filter Uniforms"),
                    contents: bytemuck::bytes_of(&uniforms),
                    usage: wgpu::BufferUsages::UNIFORM,
                });

            let source = Self::level_view(&texture, level - 1);
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Environment Filter Bind Group"),
                layout: &self.filter_bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&source),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: uniform_buffer.as_entire_binding(),
                    },
                ],
            });

            let target = Self::level_view(&texture, level);
            let mut pass = begin_target_pass(&mut encoder, &target, "Environment Filter Pass");
            pass.set_pipeline(&self.filter_pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(EnvironmentMap {
            texture,
            view,
            mip_count: self.mip_count,
        })
    }

    fn dispose(&mut self, map: EnvironmentMap) {
        log::debug!("Disposing environment map");
        map.texture.destroy();
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: ENVIRONMENT_FORMAT,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn begin_target_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    target: &wgpu::TextureView,
    label: &str,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    })
}
