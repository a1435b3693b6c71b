use cgmath::{prelude::*, Vector2};
use instant::Instant;
use physics::Body;
use std::{collections::VecDeque, mem, time::Duration};

const FRAME_TIME_HISTORY_COUNT: usize = 30;
const INITIAL_DISC_CAPACITY: usize = 16;

#[repr(C)]
#[derive(Copy, Clone)]
struct Uniforms {
    viewport_size: Vector2<f32>,
    _padding: [f32; 2],
}
unsafe impl bytemuck::Pod for Uniforms {}
unsafe impl bytemuck::Zeroable for Uniforms {}

/// Per-instance vertex data for one body.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Disc {
    center: [f32; 2],
    radius: f32,
    color: [f32; 4],
}
unsafe impl bytemuck::Pod for Disc {}
unsafe impl bytemuck::Zeroable for Disc {}

impl Disc {
    pub fn new(body: &Body, srgb_target: bool) -> Self {
        let mut color = unpack_color(body.color);
        if srgb_target {
            // The surface re-encodes on write, so hand it linear values
            for channel in &mut color[..3] {
                *channel = srgb_to_linear(*channel);
            }
        }
        Self {
            center: body.pos.into(),
            radius: body.radius,
            color,
        }
    }
}

fn unpack_color(rgba: u32) -> [f32; 4] {
    rgba.to_be_bytes().map(|c| c as f32 / 255.0)
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

pub struct Parameters {
    pub texture_format: wgpu::TextureFormat,
    pub present_mode: wgpu::PresentMode,
}

pub struct Graphics {
    parameters: Parameters,
    queue: wgpu::Queue,
    device: wgpu::Device,
    surface: wgpu::Surface,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    disc_buffer: wgpu::Buffer,
    disc_capacity: usize,
    uniforms_buffer: wgpu::Buffer,
    uniforms: Uniforms,
    uniforms_are_new: bool,
    window_size: (u32, u32),
    fps_latest_instant: Instant,
    fps_recent_frame_times: VecDeque<Duration>,
}

impl Graphics {
    pub fn initialize(
        parameters: Parameters,
        surface: wgpu::Surface,
        device_and_queue: (wgpu::Device, wgpu::Queue),
        size: (u32, u32),
    ) -> Self {
        let (device, queue) = device_and_queue;

        let uniforms = Uniforms {
            viewport_size: Vector2::from(size).cast().unwrap_or_else(Vector2::zero),
            _padding: [0.0; 2],
        };
        configure_surface(&parameters, &device, &surface, size);

        let disc_buffer = make_disc_buffer(&device, INITIAL_DISC_CAPACITY);
        let uniforms_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniforms buffer"),
            size: mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = make_bind_group_layout(&device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms_buffer.as_entire_binding(),
            }],
        });
        let pipeline = make_pipeline(&parameters, &device, &bind_group_layout);

        Self {
            parameters,
            queue,
            device,
            surface,
            pipeline,
            bind_group,
            disc_buffer,
            disc_capacity: INITIAL_DISC_CAPACITY,
            uniforms_buffer,
            uniforms,
            uniforms_are_new: true,
            window_size: size,
            fps_latest_instant: Instant::now(),
            fps_recent_frame_times: VecDeque::new(),
        }
    }
    #[cfg(target_arch = "wasm32")]
    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }
    pub fn srgb_target(&self) -> bool {
        self.parameters.texture_format.describe().srgb
    }
    pub fn resize(&mut self, (w, h): (u32, u32)) {
        if w == 0 || h == 0 {
            // Minimized
            return;
        }
        self.window_size = (w, h);
        self.uniforms.viewport_size = Vector2::new(w as f32, h as f32);
        self.uniforms_are_new = true;
        configure_surface(
            &self.parameters,
            &self.device,
            &self.surface,
            self.window_size,
        );
    }
    pub fn fps(&self) -> f32 {
        let total: f32 = self
            .fps_recent_frame_times
            .iter()
            .map(Duration::as_secs_f32)
            .sum();
        if total > 0.0 {
            self.fps_recent_frame_times.len() as f32 / total
        } else {
            0.0
        }
    }
    pub fn render(&mut self, bodies: &[Body]) {
        let srgb_target = self.srgb_target();
        let discs: Vec<Disc> = bodies.iter().map(|b| Disc::new(b, srgb_target)).collect();
        // Copy state to GPU
        {
            if discs.len() > self.disc_capacity {
                self.disc_capacity = discs.len().next_power_of_two();
                self.disc_buffer = make_disc_buffer(&self.device, self.disc_capacity);
                log::debug!("Grew disc buffer to {} discs", self.disc_capacity);
            }
            if !discs.is_empty() {
                self.queue
                    .write_buffer(&self.disc_buffer, 0, bytemuck::cast_slice(&discs));
            }
            if self.uniforms_are_new {
                self.queue.write_buffer(
                    &self.uniforms_buffer,
                    0,
                    bytemuck::cast_slice(&[self.uniforms]),
                );
                self.uniforms_are_new = false;
            }
        }
        // Render
        {
            let surface_texture = match self.surface.get_current_texture().or_else(|error| {
                log::debug!("retrying `wgpu::Surface::get_current_texture` once after: {error:?}");
                configure_surface(
                    &self.parameters,
                    &self.device,
                    &self.surface,
                    self.window_size,
                );
                self.surface.get_current_texture()
            }) {
                Ok(texture) => texture,
                Err(error) => {
                    log::warn!("Skipping frame: {error:?}");
                    return;
                }
            };
            let surface_texture_view = &surface_texture
                .texture
                .create_view(&wgpu::TextureViewDescriptor {
                    label: Some("frame texture view"),
                    ..Default::default()
                });

            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Command encoder"),
                });
            {
                let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("render pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: surface_texture_view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                            store: true,
                        },
                    })],
                    depth_stencil_attachment: None,
                });
                if !discs.is_empty() {
                    render_pass.set_pipeline(&self.pipeline);
                    render_pass.set_bind_group(0, &self.bind_group, &[]);
                    render_pass.set_vertex_buffer(0, self.disc_buffer.slice(..));
                    render_pass.draw(0..4, 0..discs.len() as u32);
                }
            }
            self.queue.submit(std::iter::once(encoder.finish()));
            surface_texture.present();
        }
        {
            let now = Instant::now();
            let frame_time = now.duration_since(self.fps_latest_instant);
            self.fps_latest_instant = now;

            while self.fps_recent_frame_times.len() >= FRAME_TIME_HISTORY_COUNT {
                self.fps_recent_frame_times.pop_front();
            }
            self.fps_recent_frame_times.push_back(frame_time);
        }
    }
}

fn configure_surface(
    parameters: &Parameters,
    device: &wgpu::Device,
    surface: &wgpu::Surface,
    (width, height): (u32, u32),
) {
    surface.configure(
        device,
        &wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: parameters.texture_format,
            width,
            height,
            present_mode: parameters.present_mode,
            alpha_mode: wgpu::CompositeAlphaMode::Opaque,
        },
    );
}

fn make_disc_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Disc buffer"),
        size: (capacity * mem::size_of::<Disc>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn make_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Uniforms layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None, // Only applicable to sampled textures
        }],
    })
}

fn make_pipeline(
    parameters: &Parameters,
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Pipeline layout"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    let module = device.create_shader_module(wgpu::include_wgsl!("shader.wgsl"));
    let disc_attributes = wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32, 2 => Float32x4];

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Render pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: "vs_main",
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: mem::size_of::<Disc>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &disc_attributes,
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: parameters.texture_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        // Four vertices per instance, generated in the vertex shader
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}
