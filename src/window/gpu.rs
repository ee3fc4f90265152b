//! Showing the canvas on the window with the GPU.

use glamour::{Point2, Size2};
use imgref::ImgVec;
use miette::{Context, IntoDiagnostic, Result};
use wgpu::Color;

/// Surface formats the canvas pixels can be copied to, in order of preference.
///
/// Copying requires the same format on both sides, so only 8-bit formats without conversion are possible.
const SUPPORTED_FORMATS: [wgpu::TextureFormat; 4] = [
    wgpu::TextureFormat::Bgra8UnormSrgb,
    wgpu::TextureFormat::Bgra8Unorm,
    wgpu::TextureFormat::Rgba8UnormSrgb,
    wgpu::TextureFormat::Rgba8Unorm,
];

/// GPU state for presenting a pixel buffer in a window.
pub(crate) struct Gpu {
    /// GPU device.
    device: wgpu::Device,
    /// GPU surface.
    surface: wgpu::Surface<'static>,
    /// GPU queue.
    queue: wgpu::Queue,
    /// GPU surface configuration.
    config: wgpu::SurfaceConfiguration,
    /// Texture the canvas pixels are uploaded to before being copied to the surface.
    staging: Option<wgpu::Texture>,
}

impl Gpu {
    /// Create a GPU surface on the window.
    pub(crate) async fn new<W>(window: W, size: Size2<u32>) -> Result<Self>
    where
        W: wgpu::WindowHandle + 'static,
    {
        // Get a handle to our GPU
        let instance = wgpu::Instance::default();

        log::debug!("Creating GPU surface on the window");

        // Create a GPU surface on the window
        let surface = instance
            .create_surface(window)
            .into_diagnostic()
            .wrap_err("Error creating surface on window")?;

        log::debug!("Requesting adapter");

        // Request an adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptionsBase {
                // Copying pixels doesn't need a strong GPU
                power_preference: wgpu::PowerPreference::LowPower,
                force_fallback_adapter: false,
                // Request an adaptar which can render to our surface
                compatible_surface: Some(&surface),
            })
            .await
            .ok_or_else(|| miette::miette!("Error getting GPU adapter for window"))?;

        // Get the surface capabilities
        let capabilities = surface.get_capabilities(&adapter);
        if !capabilities.usages.contains(wgpu::TextureUsages::COPY_DST) {
            miette::bail!("GPU surface can't be copied to");
        }
        let format = SUPPORTED_FORMATS
            .into_iter()
            .find(|format| capabilities.formats.contains(format))
            .ok_or_else(|| {
                miette::miette!(
                    "GPU surface supports none of the formats {SUPPORTED_FORMATS:?}, only {:?}",
                    capabilities.formats
                )
            })?;

        // Create the logical device and command queue
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                },
                None,
            )
            .await
            .into_diagnostic()
            .wrap_err("Error getting logical GPU device for surface")?;

        // Configure the render surface
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_DST,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode: capabilities.alpha_modes[0],
            view_formats: vec![format],
        };
        surface.configure(&device, &config);

        log::debug!("Configured GPU surface with format {format:?}");

        Ok(Self {
            device,
            surface,
            queue,
            config,
            staging: None,
        })
    }

    /// Resize the surface.
    pub(crate) fn resize(&mut self, new_size: Size2<u32>) {
        log::debug!(
            "Resizing the surface to ({}x{})",
            new_size.width,
            new_size.height
        );

        // Ensure that the render surface is at least 1 pixel big, otherwise an error would occur
        self.config.width = new_size.width.max(1);
        self.config.height = new_size.height.max(1);
        self.surface.configure(&self.device, &self.config);
    }

    /// Show the pixels at an offset, filling the rest of the window with the viewport color.
    pub(crate) fn present(&mut self, pixels: &ImgVec<u32>, offset: Point2, viewport_color: u32) {
        profiling::scope!("Present canvas");

        let surface_texture = match self.surface.get_current_texture() {
            Ok(surface_texture) => surface_texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("GPU surface is lost, reconfiguring");

                // Drawn again on the next frame
                self.surface.configure(&self.device, &self.config);

                return;
            }
            Err(err) => {
                log::warn!("Error acquiring next swap chain texture: {err}");

                return;
            }
        };

        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Canvas Command Encoder"),
            });

        // Fill the whole window with the viewport color
        {
            profiling::scope!("Clear viewport");

            let _ = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Viewport Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(u32_to_wgpu_color(
                            viewport_color,
                            self.config.format.is_srgb(),
                        )),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }

        self.copy_pixels(&mut encoder, &surface_texture.texture, pixels, offset);

        // Draw to the texture
        {
            profiling::scope!("Submit queue");

            self.queue.submit(Some(encoder.finish()));
        }

        // Show the texture in the window
        {
            profiling::scope!("Present surface texture");

            surface_texture.present();
        }
    }

    /// Upload the pixels and copy the part that fits in the window.
    fn copy_pixels(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::Texture,
        pixels: &ImgVec<u32>,
        offset: Point2,
    ) {
        profiling::scope!("Copy canvas");

        let (width, height) = (pixels.width() as u32, pixels.height() as u32);
        let (x, y) = (offset.x.max(0.0) as u32, offset.y.max(0.0) as u32);

        // Part of the canvas inside of the window
        let copy_width = width.min(self.config.width.saturating_sub(x));
        let copy_height = height.min(self.config.height.saturating_sub(y));
        if copy_width == 0 || copy_height == 0 {
            return;
        }

        self.prepare_staging_texture(width, height);
        let Some(staging) = &self.staging else {
            return;
        };

        let buffer: &[u32] = &pixels.buf()[..];
        let swapped;
        let bytes: &[u8] = if matches!(
            self.config.format,
            wgpu::TextureFormat::Rgba8UnormSrgb | wgpu::TextureFormat::Rgba8Unorm
        ) {
            swapped = buffer.iter().copied().map(swap_red_blue).collect::<Vec<_>>();

            bytemuck::cast_slice(&swapped)
        } else {
            // Little endian `0xAARRGGBB` is already BGRA
            bytemuck::cast_slice(buffer)
        };

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: staging,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytes,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(pixels.stride() as u32 * 4),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        encoder.copy_texture_to_texture(
            wgpu::ImageCopyTexture {
                texture: staging,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyTexture {
                texture: target,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::Extent3d {
                width: copy_width,
                height: copy_height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Create the staging texture when the canvas size changed.
    fn prepare_staging_texture(&mut self, width: u32, height: u32) {
        if self
            .staging
            .as_ref()
            .is_some_and(|staging| staging.width() == width && staging.height() == height)
        {
            return;
        }

        log::debug!("Creating canvas staging texture of {width}x{height}");

        let staging = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Canvas Staging Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.config.format,
            usage: wgpu::TextureUsages::COPY_DST | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        self.staging = Some(staging);
    }
}

/// Convert a `0xAARRGGBB` color to a `0xAABBGGRR` color.
const fn swap_red_blue(argb: u32) -> u32 {
    (argb & 0xFF00_FF00) | ((argb & 0xFF) << 16) | ((argb >> 16) & 0xFF)
}

/// Convert a `0xAARRGGBB` color to a GPU color.
fn u32_to_wgpu_color(argb: u32, srgb: bool) -> Color {
    let a = ((argb & 0xFF00_0000) >> 24) as f64 / 255.0;
    let r = ((argb & 0x00FF_0000) >> 16) as f64 / 255.0;
    let g = ((argb & 0x0000_FF00) >> 8) as f64 / 255.0;
    let b = (argb & 0x0000_00FF) as f64 / 255.0;

    if srgb {
        // Convert to sRGB space
        Color {
            a: a.powf(2.2),
            r: r.powf(2.2),
            g: g.powf(2.2),
            b: b.powf(2.2),
        }
    } else {
        Color { a, r, g, b }
    }
}
