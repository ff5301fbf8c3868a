//! wgpu renderer for [`DrawingSurface`] calls.
//!
//! Draw calls are collected into a [`ShapeBatch`] of instanced quads and
//! rasterised in a single pass by `shapes.wgsl`: soft circles for stars and
//! comet heads, and gradient strokes for comet tails and cards.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use tracing::{debug, info};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::error::GpuError;
use crate::surface::{sample_gradient, ColorStop, DrawingSurface};

const SHAPE_SHADER: &str = include_str!("shapes.wgsl");

/// Instances the buffer starts with; it doubles as needed.
const INITIAL_CAPACITY: usize = 4096;

const KIND_CIRCLE: u32 = 0;
const KIND_LINE: u32 = 1;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    viewport: [f32; 2],
    _padding: [f32; 2],
}

/// One quad as the shader sees it.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ShapeInstance {
    pub p0: [f32; 2],
    pub p1: [f32; 2],
    pub color0: [f32; 4],
    pub color1: [f32; 4],
    /// Circle radius or half the stroke width.
    pub size: f32,
    pub kind: u32,
    _padding: [f32; 2],
}

impl ShapeInstance {
    fn circle(center: Vec2, radius: f32, color: Vec3, alpha: f32) -> Self {
        let rgba = color.extend(alpha).to_array();
        Self {
            p0: center.to_array(),
            p1: center.to_array(),
            color0: rgba,
            color1: rgba,
            size: radius,
            kind: KIND_CIRCLE,
            _padding: [0.0; 2],
        }
    }

    fn line(from: Vec2, to: Vec2, start: (Vec3, f32), end: (Vec3, f32), width: f32) -> Self {
        Self {
            p0: from.to_array(),
            p1: to.to_array(),
            color0: start.0.extend(start.1).to_array(),
            color1: end.0.extend(end.1).to_array(),
            size: width * 0.5,
            kind: KIND_LINE,
            _padding: [0.0; 2],
        }
    }

    pub fn is_circle(&self) -> bool {
        self.kind == KIND_CIRCLE
    }

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
            0 => Float32x2,
            1 => Float32x2,
            2 => Float32x4,
            3 => Float32x4,
            4 => Float32,
            5 => Uint32,
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ShapeInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// CPU side of the renderer: a sized list of shape instances.
///
/// Multi-stop gradients are split into one two-colour segment per stop
/// interval, so the shader only ever interpolates between two colours.
#[derive(Debug, Clone, Default)]
pub struct ShapeBatch {
    width: f32,
    height: f32,
    instances: Vec<ShapeInstance>,
}

impl ShapeBatch {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            instances: Vec::with_capacity(INITIAL_CAPACITY),
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn instances(&self) -> &[ShapeInstance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl DrawingSurface for ShapeBatch {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn clear(&mut self) {
        self.instances.clear();
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Vec3, alpha: f32) {
        if radius <= 0.0 || alpha <= 0.0 {
            return;
        }
        self.instances
            .push(ShapeInstance::circle(center, radius, color, alpha));
    }

    fn draw_gradient_line(&mut self, from: Vec2, to: Vec2, stops: &[ColorStop], width: f32) {
        if stops.is_empty() || width <= 0.0 || from.distance_squared(to) == 0.0 {
            return;
        }
        let mut offsets: Vec<f32> = Vec::with_capacity(stops.len() + 2);
        offsets.push(0.0);
        offsets.extend(
            stops
                .iter()
                .map(|s| s.offset)
                .filter(|&t| t > 0.0 && t < 1.0),
        );
        offsets.push(1.0);
        offsets.sort_by(f32::total_cmp);
        offsets.dedup();

        for pair in offsets.windows(2) {
            let (t0, t1) = (pair[0], pair[1]);
            let start = sample_gradient(stops, t0);
            let end = sample_gradient(stops, t1);
            if start.1 <= 0.0 && end.1 <= 0.0 {
                continue;
            }
            self.instances.push(ShapeInstance::line(
                from.lerp(to, t0),
                from.lerp(to, t1),
                start,
                end,
                width,
            ));
        }
    }
}

/// A window surface that renders everything drawn into it since the last
/// [`clear`](DrawingSurface::clear).
pub struct GpuSurface {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    clear_color: wgpu::Color,
    batch: ShapeBatch,
}

impl GpuSurface {
    /// Set up a device and pipeline for `window`.
    ///
    /// `background` is the colour each frame is cleared to.
    pub async fn new(window: Arc<Window>, background: [f32; 3]) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        info!(adapter = %adapter.get_info().name, "GPU adapter selected");

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoSurfaceFormat)?;
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
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::bytes_of(&viewport_uniforms(&config)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shape Shader"),
            source: wgpu::ShaderSource::Wgsl(SHAPE_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shape Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shape Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[ShapeInstance::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let instance_buffer = create_instance_buffer(&device, INITIAL_CAPACITY);

        let [r, g, b] = background;
        debug!(width = config.width, height = config.height, format = ?config.format, "surface configured");

        Ok(Self {
            surface,
            device,
            queue,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            instance_buffer,
            instance_capacity: INITIAL_CAPACITY,
            clear_color: wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: 1.0,
            },
            batch: ShapeBatch::new(config.width as f32, config.height as f32),
            config,
        })
    }

    /// Reconfigure for a new window size. Zero sizes (minimised) are ignored.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.queue.write_buffer(
                &self.uniform_buffer,
                0,
                bytemuck::bytes_of(&viewport_uniforms(&self.config)),
            );
            self.batch
                .resize(new_size.width as f32, new_size.height as f32);
        }
    }

    /// Reapply the current configuration after the surface was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn batch(&self) -> &ShapeBatch {
        &self.batch
    }

    /// Draw the batch to the window and present it.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let count = self.batch.len();
        if count > self.instance_capacity {
            self.instance_capacity = count.next_power_of_two();
            self.instance_buffer = create_instance_buffer(&self.device, self.instance_capacity);
            debug!(capacity = self.instance_capacity, "instance buffer grown");
        }
        if count > 0 {
            self.queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(self.batch.instances()),
            );
        }

        let output = self.surface.get_current_texture()?;
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
                label: Some("Shape Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if count > 0 {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
                render_pass.draw(0..6, 0..count as u32);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

impl DrawingSurface for GpuSurface {
    fn width(&self) -> f32 {
        self.batch.width()
    }

    fn height(&self) -> f32 {
        self.batch.height()
    }

    fn clear(&mut self) {
        self.batch.clear();
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Vec3, alpha: f32) {
        self.batch.draw_circle(center, radius, color, alpha);
    }

    fn draw_gradient_line(&mut self, from: Vec2, to: Vec2, stops: &[ColorStop], width: f32) {
        self.batch.draw_gradient_line(from, to, stops, width);
    }
}

fn viewport_uniforms(config: &wgpu::SurfaceConfiguration) -> Uniforms {
    Uniforms {
        viewport: [config.width as f32, config.height as f32],
        _padding: [0.0; 2],
    }
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Shape Instance Buffer"),
        size: (capacity * std::mem::size_of::<ShapeInstance>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate_wgsl(source: &str) -> Result<(), String> {
        let module = naga::front::wgsl::parse_str(source)
            .map_err(|e| format!("WGSL parse error: {:?}", e))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );

        validator
            .validate(&module)
            .map_err(|e| format!("WGSL validation error: {:?}", e))?;

        Ok(())
    }

    #[test]
    fn test_shape_shader_validates() {
        if let Err(e) = validate_wgsl(SHAPE_SHADER) {
            panic!("shapes.wgsl failed validation:\n{}", e);
        }
    }

    #[test]
    fn test_instance_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<ShapeInstance>(), 64);
        assert_eq!(std::mem::size_of::<Uniforms>(), 16);
    }

    #[test]
    fn test_circle_skips_invisible() {
        let mut batch = ShapeBatch::new(100.0, 100.0);
        batch.draw_circle(Vec2::ZERO, 2.0, Vec3::ONE, 0.0);
        batch.draw_circle(Vec2::ZERO, 0.0, Vec3::ONE, 1.0);
        assert!(batch.is_empty());

        batch.draw_circle(Vec2::new(5.0, 5.0), 2.0, Vec3::ONE, 0.5);
        assert_eq!(batch.len(), 1);
        let shape = batch.instances()[0];
        assert!(shape.is_circle());
        assert_eq!(shape.size, 2.0);
        assert_eq!(shape.color0[3], 0.5);
    }

    #[test]
    fn test_gradient_split_per_stop() {
        let mut batch = ShapeBatch::new(100.0, 100.0);
        let stops = [
            ColorStop::new(0.0, Vec3::ONE, 1.0),
            ColorStop::new(0.5, Vec3::ONE, 0.5),
            ColorStop::new(1.0, Vec3::ONE, 0.2),
        ];
        batch.draw_gradient_line(Vec2::ZERO, Vec2::new(10.0, 0.0), &stops, 2.0);

        assert_eq!(batch.len(), 2);
        let first = batch.instances()[0];
        let second = batch.instances()[1];
        assert_eq!(first.p1, [5.0, 0.0]);
        assert_eq!(second.p0, [5.0, 0.0]);
        assert_eq!(first.size, 1.0);
        assert!((first.color1[3] - 0.5).abs() < 1e-6);
        assert!((second.color1[3] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_transparent_segments_dropped() {
        let mut batch = ShapeBatch::new(100.0, 100.0);
        let stops = [
            ColorStop::new(0.0, Vec3::ONE, 0.0),
            ColorStop::new(0.5, Vec3::ONE, 0.0),
            ColorStop::new(1.0, Vec3::ONE, 1.0),
        ];
        batch.draw_gradient_line(Vec2::ZERO, Vec2::new(10.0, 0.0), &stops, 1.0);
        assert_eq!(batch.len(), 1);

        batch.draw_gradient_line(Vec2::ONE, Vec2::ONE, &stops, 1.0);
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_clear_and_resize() {
        let mut batch = ShapeBatch::new(100.0, 100.0);
        batch.draw_circle(Vec2::ZERO, 1.0, Vec3::ONE, 1.0);
        batch.clear();
        assert!(batch.is_empty());
        batch.resize(320.0, 240.0);
        assert_eq!((batch.width(), batch.height()), (320.0, 240.0));
    }
}
