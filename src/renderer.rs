use std::sync::Arc;

use anyhow::{Context, Result};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::core::{GpuContext, PingPong};
use crate::uniforms::{UniformBlock, BLOCK_SIZE};

/// Accumulation targets keep linear HDR color
pub const ACCUMULATION_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// One of the two alternating off-screen targets
pub struct AccumulationTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// egui output produced before the frame is drawn
struct PendingUi {
    shapes: Vec<egui::epaint::ClippedShape>,
    textures_delta: egui::epaint::textures::TexturesDelta,
    pixels_per_point: f32,
}

impl PendingUi {
    /// Take over the texture changes of a UI frame that was never painted.
    /// Its shapes are stale, but egui will not resend its uploads or frees.
    fn carry_over(mut self, unpainted: Option<PendingUi>) -> Self {
        if let Some(old) = unpainted {
            let mut textures_delta = old.textures_delta;
            textures_delta.append(std::mem::take(&mut self.textures_delta));
            self.textures_delta = textures_delta;
        }
        self
    }
}

pub struct Renderer {
    gpu: GpuContext,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    uniform_buffer: wgpu::Buffer,
    scene_layout: wgpu::BindGroupLayout,
    display_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    raytrace_pipeline: wgpu::RenderPipeline,
    display_pipeline: wgpu::RenderPipeline,
    targets: PingPong<AccumulationTarget>,
    /// Indexed by target slot: writes that slot, reads the other one as `prev`
    scene_bind_groups: [wgpu::BindGroup; 2],
    /// Indexed by target slot: presents that slot
    display_bind_groups: [wgpu::BindGroup; 2],
    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,
    pending_ui: Option<PendingUi>,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create window surface")?;
        let gpu = GpuContext::new_with_surface(&instance, &surface).await?;

        let config = gpu.surface_config(&surface, size.width, size.height);
        surface.configure(gpu.device(), &config);

        let device = gpu.device();
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globals Buffer"),
            contents: &[0u8; BLOCK_SIZE],
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let scene_layout = Self::create_scene_layout(device);
        let display_layout = Self::create_display_layout(device);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let raytrace_pipeline = Self::create_pipeline(
            device,
            "Raytrace",
            include_str!("raytrace.wgsl"),
            &scene_layout,
            ACCUMULATION_FORMAT,
        );
        let display_pipeline = Self::create_pipeline(
            device,
            "Display",
            include_str!("display.wgsl"),
            &display_layout,
            config.format,
        );

        let targets = PingPong::from_fn(|i| Self::create_target(device, &config, i));
        let (scene_bind_groups, display_bind_groups) = Self::create_bind_groups(
            device,
            &targets,
            &uniform_buffer,
            &sampler,
            &scene_layout,
            &display_layout,
        );

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(device, config.format, egui_wgpu::RendererOptions::default());

        log::info!(
            "Renderer ready: {}x{} surface, {:?}",
            config.width,
            config.height,
            config.format
        );

        Ok(Self {
            gpu,
            surface,
            config,
            uniform_buffer,
            scene_layout,
            display_layout,
            sampler,
            raytrace_pipeline,
            display_pipeline,
            targets,
            scene_bind_groups,
            display_bind_groups,
            egui_renderer,
            egui_state,
            egui_ctx,
            pending_ui: None,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Let egui see a window event first. Returns true if egui consumed it.
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.egui_state.on_window_event(window, event).consumed
    }

    /// A text or value field has keyboard focus
    pub fn wants_keyboard_input(&self) -> bool {
        self.egui_ctx.wants_keyboard_input()
    }

    /// Run the UI for this frame. The output is painted by the next `render`.
    pub fn run_ui(&mut self, window: &Window, build: impl FnMut(&egui::Context)) {
        let raw_input = self.egui_state.take_egui_input(window);
        let egui::FullOutput {
            platform_output,
            textures_delta,
            shapes,
            pixels_per_point,
            ..
        } = self.egui_ctx.run(raw_input, build);

        self.egui_state.handle_platform_output(window, platform_output);
        let ui = PendingUi {
            shapes,
            textures_delta,
            pixels_per_point,
        };
        self.pending_ui = Some(ui.carry_over(self.pending_ui.take()));
    }

    /// Reconfigure the surface and reallocate both accumulation targets
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.reconfigure();

        let device = self.gpu.device();
        let config = &self.config;
        self.targets
            .reallocate(|i| Self::create_target(device, config, i));

        let (scene, display) = Self::create_bind_groups(
            device,
            &self.targets,
            &self.uniform_buffer,
            &self.sampler,
            &self.scene_layout,
            &self.display_layout,
        );
        self.scene_bind_groups = scene;
        self.display_bind_groups = display;
    }

    /// Reapply the current surface configuration, e.g. after `SurfaceError::Lost`
    pub fn reconfigure(&mut self) {
        self.surface.configure(self.gpu.device(), &self.config);
    }

    /// Draw one frame: raytrace into the current target while reading the
    /// previous one, present it with the UI on top, then swap targets.
    pub fn render(
        &mut self,
        uniforms: &mut UniformBlock,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        if uniforms.take_dirty() {
            self.gpu
                .queue()
                .write_buffer(&self.uniform_buffer, 0, uniforms.as_bytes());
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.gpu
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Frame Encoder"),
                });

        let slot = self.targets.current_index();

        // Scene pass - raytrace into the current accumulation target
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Raytrace Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.current().view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.raytrace_pipeline);
            pass.set_bind_group(0, &self.scene_bind_groups[slot], &[]);
            pass.draw(0..3, 0..1);
        }

        // Display pass - copy it to the swapchain
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Display Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.display_pipeline);
            pass.set_bind_group(0, &self.display_bind_groups[slot], &[]);
            pass.draw(0..3, 0..1);
        }

        let freed = match self.pending_ui.take() {
            Some(ui) => self.paint_ui(&mut encoder, &view, ui),
            None => Vec::new(),
        };

        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        output.present();

        for id in &freed {
            self.egui_renderer.free_texture(id);
        }

        self.targets.swap();
        Ok(())
    }

    /// Record the egui pass; returns textures to free after submission
    fn paint_ui(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        ui: PendingUi,
    ) -> Vec<egui::TextureId> {
        let device = self.gpu.device();
        let queue = self.gpu.queue();

        let tris = self.egui_ctx.tessellate(ui.shapes, ui.pixels_per_point);
        for (id, image_delta) in &ui.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: ui.pixels_per_point,
        };

        self.egui_renderer
            .update_buffers(device, queue, encoder, &tris, &screen_descriptor);

        // egui-wgpu wants a 'static pass; forget_lifetime ties it to the encoder at runtime
        let mut pass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            })
            .forget_lifetime();
        self.egui_renderer
            .render(&mut pass, &tris, &screen_descriptor);
        drop(pass);

        ui.textures_delta.free
    }

    fn create_target(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        index: usize,
    ) -> AccumulationTarget {
        let label = format!("Accumulation Target {}", index);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&label),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: ACCUMULATION_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        AccumulationTarget {
            _texture: texture,
            view,
        }
    }

    fn create_bind_groups(
        device: &wgpu::Device,
        targets: &PingPong<AccumulationTarget>,
        uniform_buffer: &wgpu::Buffer,
        sampler: &wgpu::Sampler,
        scene_layout: &wgpu::BindGroupLayout,
        display_layout: &wgpu::BindGroupLayout,
    ) -> ([wgpu::BindGroup; 2], [wgpu::BindGroup; 2]) {
        let views: Vec<&wgpu::TextureView> = targets.iter().map(|t| &t.view).collect();

        let scene = [0usize, 1].map(|slot| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: scene_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(views[slot ^ 1]),
                    },
                ],
                label: Some("scene_bind_group"),
            })
        });

        let display = [0usize, 1].map(|slot| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: display_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(views[slot]),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
                label: Some("display_bind_group"),
            })
        });

        (scene, display)
    }

    fn create_scene_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(BLOCK_SIZE as u64),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
            label: Some("scene_bind_group_layout"),
        })
    }

    fn create_display_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
            ],
            label: Some("display_bind_group_layout"),
        })
    }

    /// Fullscreen-triangle pipeline writing a single color target
    fn create_pipeline(
        device: &wgpu::Device,
        name: &str,
        source: &str,
        layout: &wgpu::BindGroupLayout,
        format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{} Shader", name)),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{} Pipeline Layout", name)),
            bind_group_layouts: &[layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{} Pipeline", name)),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
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
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::epaint::textures::TexturesDelta;
    use egui::TextureId;

    fn pending(free: Vec<TextureId>, pixels_per_point: f32) -> PendingUi {
        PendingUi {
            shapes: Vec::new(),
            textures_delta: TexturesDelta {
                set: Vec::new(),
                free,
            },
            pixels_per_point,
        }
    }

    #[test]
    fn unpainted_texture_changes_are_kept() {
        let skipped = pending(vec![TextureId::Managed(1)], 1.0);
        let next = pending(vec![TextureId::Managed(2)], 2.0);

        let merged = next.carry_over(Some(skipped));
        assert_eq!(
            merged.textures_delta.free,
            vec![TextureId::Managed(1), TextureId::Managed(2)]
        );
        assert_eq!(merged.pixels_per_point, 2.0);
    }

    #[test]
    fn nothing_to_carry_leaves_frame_untouched() {
        let next = pending(vec![TextureId::Managed(7)], 1.5);
        let merged = next.carry_over(None);
        assert_eq!(merged.textures_delta.free, vec![TextureId::Managed(7)]);
    }
}
