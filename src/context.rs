use thiserror::Error;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use wgpu::util;
use wgpu::{
    Adapter, Backends, Device, DeviceDescriptor, Features, Instance, Limits, PresentMode, Queue,
    Surface, SurfaceConfiguration, TextureUsages, TextureView, TextureViewDescriptor,
};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Errors that can occur while acquiring the GPU context.
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("no suitable GPU adapter found on the system")]
    AdapterRequest,

    #[error("failed to create device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("surface is not supported by adapter {0:?}")]
    SurfaceNotSupported(String),
}

/// Device, queue and surface that the widget renders into.
///
/// The window itself is owned by the host; it must outlive the context.
pub struct Context {
    pub instance: Instance,
    pub adapter: Adapter,
    pub device: Device,
    pub queue: Queue,
    pub surface: Surface,
    pub surface_config: SurfaceConfiguration,
    pub size: PhysicalSize<u32>,

    // for depth test
    pub depth_texture_view: TextureView,
}

impl Context {
    pub async fn create_context(window: &Window) -> Result<Context, ContextError> {
        #[cfg(target_os = "macos")]
        let default_backends = Backends::METAL;
        #[cfg(not(target_os = "macos"))]
        let default_backends = Backends::PRIMARY;
        let backends = util::backend_bits_from_env().unwrap_or(default_backends);

        let instance = Instance::new(backends);
        let size = window.inner_size();
        let surface = unsafe { instance.create_surface(window) };

        let adapter = util::initialize_adapter_from_env_or_default(&instance, backends, Some(&surface))
            .await
            .ok_or(ContextError::AdapterRequest)?;
        let info = adapter.get_info();
        log::info!("using adapter {:?} ({:?})", info.name, info.backend);

        let needed_limits = Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits());

        let trace_dir = std::env::var("TRACE_DIR");
        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("tetraview device"),
                    features: Features::empty(),
                    limits: needed_limits,
                },
                trace_dir.ok().as_ref().map(std::path::Path::new),
            )
            .await?;

        let format = surface
            .get_preferred_format(&adapter)
            .ok_or_else(|| ContextError::SurfaceNotSupported(info.name.clone()))?;

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: PresentMode::Fifo,
        };

        surface.configure(&device, &surface_config);

        let depth_texture_view = Self::create_depth_texture_view(&device, &surface_config);

        Ok(Context {
            instance,
            adapter,
            device,
            queue,
            surface,
            surface_config,
            size,
            depth_texture_view,
        })
    }

    pub fn create_depth_texture_view(
        device: &Device,
        surface_config: &SurfaceConfiguration,
    ) -> TextureView {
        let depth_texture_size = wgpu::Extent3d {
            width: surface_config.width,
            height: surface_config.height,
            depth_or_array_layers: 1,
        };
        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth texture"),
            size: depth_texture_size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        });

        depth_texture.create_view(&TextureViewDescriptor::default())
    }

    /// Reconfigures the surface for a new window size.
    ///
    /// A zero-sized window (minimized) keeps the previous configuration.
    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.size = size;
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.recreate_surface();
    }

    pub fn recreate_surface(&mut self) {
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_texture_view =
            Self::create_depth_texture_view(&self.device, &self.surface_config);
    }

    pub fn surface_size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.surface_config.width, self.surface_config.height)
    }
}
