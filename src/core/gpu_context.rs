use anyhow::{anyhow, Result};
use wgpu::{Adapter, Device, DeviceDescriptor, Features, Instance, Limits, Queue, Surface};

/// Adapter, device and queue for rendering into one window surface
pub struct GpuContext {
    adapter: Adapter,
    device: Device,
    queue: Queue,
}

impl GpuContext {
    /// Create a GPU context compatible with a surface (for window rendering)
    pub async fn new_with_surface(instance: &Instance, surface: &Surface<'_>) -> Result<Self> {
        let adapter = Self::request_adapter(instance, surface).await?;
        let info = adapter.get_info();
        log::info!("Using adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = Self::request_device(&adapter).await?;

        Ok(Self {
            adapter,
            device,
            queue,
        })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Surface configuration preferring an sRGB format
    pub fn surface_config(
        &self,
        surface: &Surface<'_>,
        width: u32,
        height: u32,
    ) -> wgpu::SurfaceConfiguration {
        let surface_caps = surface.get_capabilities(&self.adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    async fn request_adapter(instance: &Instance, surface: &Surface<'_>) -> Result<Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| anyhow!("Failed to find appropriate adapter: {:?}", e))
    }

    async fn request_device(adapter: &Adapter) -> Result<(Device, Queue)> {
        // Large windows need the adapter's texture size limits
        let limits = Limits::default().using_resolution(adapter.limits());

        adapter
            .request_device(&DeviceDescriptor {
                label: Some("Raytracer Device"),
                required_features: Features::empty(),
                required_limits: limits,
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| anyhow!("Failed to create device: {:?}", e))
    }
}
