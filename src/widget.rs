use std::rc::Rc;

use cgmath::Matrix4;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::context::Context;
use crate::loop_clock::LoopClock;
use crate::scene::{Scene, Viewport, OPENGL_TO_WGPU_MATRIX};
use crate::shapes::{Geometry, InitError, ShaderSources, TetraMesh};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.15,
    g: 0.15,
    b: 0.15,
    a: 1.0,
};

/// Something that can schedule another paint of the widget.
pub trait Repaint {
    fn request_repaint(&self);
}

impl Repaint for Window {
    fn request_repaint(&self) {
        self.request_redraw();
    }
}

impl<R: Repaint + ?Sized> Repaint for Rc<R> {
    fn request_repaint(&self) {
        (**self).request_repaint();
    }
}

enum Lifecycle {
    Created,
    Ready(TetraMesh),
    TornDown,
}

/// Spinning tetrahedron with a trackball-controlled view.
///
/// The host drives it through `initialize`, `resize`, `paint` and `teardown`,
/// all from the thread that owns the rendering context.
pub struct TetraWidget<R: Repaint> {
    scene: Scene,
    repaint: R,
    lifecycle: Lifecycle,
    clock: LoopClock,
}

impl<R: Repaint> TetraWidget<R> {
    pub fn new(repaint: R, rotating: bool) -> Self {
        TetraWidget {
            scene: Scene::new(rotating),
            repaint,
            lifecycle: Lifecycle::Created,
            clock: LoopClock::start_clock(),
        }
    }

    /// Builds the geometry, compiles the shaders and uploads everything.
    ///
    /// Also routes device errors raised later on to the log.
    pub fn initialize(&mut self, ctx: &Context, sources: &ShaderSources) -> Result<(), InitError> {
        if !matches!(self.lifecycle, Lifecycle::Created) {
            log::warn!("initialize called twice, ignoring");
            return Ok(());
        }
        ctx.device
            .on_uncaptured_error(|error: wgpu::Error| log::error!("device error: {}", error));

        let mesh = TetraMesh::new(ctx, Geometry::tetrahedron(), sources)?;
        self.lifecycle = Lifecycle::Ready(mesh);
        Ok(())
    }

    pub fn resize(&mut self, ctx: &mut Context, size: PhysicalSize<u32>, scale_factor: f64) {
        if matches!(self.lifecycle, Lifecycle::TornDown) {
            log::warn!("resize after teardown, ignoring");
            return;
        }
        ctx.resize(size);
        if is_empty(size) {
            return;
        }
        let logical = size.to_logical::<f64>(scale_factor);
        let viewport = self.scene.resize(logical.width, logical.height, scale_factor);
        log::debug!(
            "resized to {}x{} (scale {}), viewport {}x{}",
            logical.width,
            logical.height,
            scale_factor,
            viewport.width,
            viewport.height
        );
        // restarts the frame loop after a minimize
        self.repaint.request_repaint();
    }

    /// Draws one frame and schedules the next.
    pub fn paint(&mut self, ctx: &Context) -> Result<(), wgpu::SurfaceError> {
        match self.lifecycle {
            Lifecycle::Ready(_) => {}
            Lifecycle::Created => {
                log::warn!("paint before initialize, ignoring");
                return Ok(());
            }
            Lifecycle::TornDown => {
                log::warn!("paint after teardown, ignoring");
                return Ok(());
            }
        }

        if is_empty(ctx.size) {
            return Ok(());
        }

        let frame = ctx.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let viewport = clamp_viewport(self.scene.viewport(), ctx.surface_size());
        let pvm = self.step_frame();

        if let Lifecycle::Ready(mesh) = &self.lifecycle {
            mesh.write_pvm(&ctx.queue, pvm);

            let mut encoder = ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("frame encoder"),
                });
            {
                let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: None,
                    color_attachments: &[wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                            store: true,
                        },
                    }],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &ctx.depth_texture_view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: true,
                        }),
                        stencil_ops: None,
                    }),
                });
                rpass.set_viewport(
                    0.0,
                    0.0,
                    viewport.width as f32,
                    viewport.height as f32,
                    0.0,
                    1.0,
                );
                mesh.draw(&mut rpass);
            }
            ctx.queue.submit(Some(encoder.finish()));
        }
        frame.present();
        Ok(())
    }

    /// Host-side part of a frame: returns the PVM for the current frame in
    /// wgpu clip space, then advances the counter and schedules the next paint.
    pub fn step_frame(&mut self) -> Matrix4<f32> {
        let pvm = OPENGL_TO_WGPU_MATRIX * self.scene.pvm();
        self.scene.advance_frame();
        if let Some(average) = self.clock.tick() {
            log::debug!("average frame time: {:.2} ms", average);
        }
        self.repaint.request_repaint();
        pvm
    }

    /// Releases the device resources. Later calls are no-ops.
    pub fn teardown(&mut self) {
        match std::mem::replace(&mut self.lifecycle, Lifecycle::TornDown) {
            Lifecycle::Ready(mesh) => {
                mesh.destroy();
                log::info!("released tetrahedron resources");
            }
            Lifecycle::Created => {}
            Lifecycle::TornDown => log::warn!("teardown called twice"),
        }
    }

    pub fn set_rotation(&mut self, rotate: bool) {
        if self.scene.set_rotating(rotate) {
            log::info!("auto-rotation {}", if rotate { "on" } else { "off" });
            self.repaint.request_repaint();
        }
    }

    pub fn toggle_rotation(&mut self) {
        let rotate = !self.scene.is_rotating();
        self.scene.set_rotating(rotate);
        log::info!("auto-rotation {}", if rotate { "on" } else { "off" });
        self.repaint.request_repaint();
    }

    pub fn rotation(&self) -> bool {
        self.scene.is_rotating()
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Ready(_))
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn repaint_handle(&self) -> &R {
        &self.repaint
    }
}

impl<R: Repaint> Drop for TetraWidget<R> {
    fn drop(&mut self) {
        if let Lifecycle::Ready(mesh) = std::mem::replace(&mut self.lifecycle, Lifecycle::TornDown) {
            mesh.destroy();
        }
    }
}

// Minimized windows report a zero dimension; nothing is drawn until they return.
fn is_empty(size: PhysicalSize<u32>) -> bool {
    size.width == 0 || size.height == 0
}

// Rounding the logical size back up can overshoot the surface by a pixel.
fn clamp_viewport(viewport: Viewport, surface: PhysicalSize<u32>) -> Viewport {
    Viewport {
        width: viewport.width.min(surface.width).max(1),
        height: viewport.height.min(surface.height).max(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ROTATION_PERIOD;
    use cgmath::Deg;
    use std::cell::Cell;

    #[derive(Default)]
    struct CountingRepaint {
        requests: Cell<u32>,
    }

    impl Repaint for CountingRepaint {
        fn request_repaint(&self) {
            self.requests.set(self.requests.get() + 1);
        }
    }

    fn widget(rotating: bool) -> TetraWidget<CountingRepaint> {
        TetraWidget::new(CountingRepaint::default(), rotating)
    }

    #[test]
    fn set_rotation_with_same_value_does_not_repaint() {
        let mut w = widget(true);
        w.set_rotation(true);
        assert_eq!(w.repaint_handle().requests.get(), 0);
        assert!(w.rotation());
    }

    #[test]
    fn set_rotation_with_new_value_repaints_once() {
        let mut w = widget(false);
        w.set_rotation(true);
        assert_eq!(w.repaint_handle().requests.get(), 1);
        assert!(w.rotation());
        w.set_rotation(false);
        assert_eq!(w.repaint_handle().requests.get(), 2);
        assert!(!w.rotation());
    }

    #[test]
    fn toggle_always_flips_and_repaints() {
        let mut w = widget(false);
        for i in 1..=4 {
            let before = w.rotation();
            w.toggle_rotation();
            assert_eq!(w.rotation(), !before);
            assert_eq!(w.repaint_handle().requests.get(), i);
        }
    }

    #[test]
    fn teardown_without_initialize_is_harmless() {
        let mut w = widget(false);
        assert!(!w.is_initialized());
        w.teardown();
        w.teardown();
        assert!(!w.is_initialized());
    }

    #[test]
    fn viewport_never_exceeds_surface() {
        let clamped = clamp_viewport(
            Viewport {
                width: 801,
                height: 600,
            },
            PhysicalSize::new(800, 599),
        );
        assert_eq!(clamped, Viewport { width: 800, height: 599 });
    }

    fn matrices_close(a: Matrix4<f32>, b: Matrix4<f32>) -> bool {
        (0..4).all(|c| (0..4).all(|r| (a[c][r] - b[c][r]).abs() < 1e-5))
    }

    #[test]
    fn step_frame_composes_before_advancing() {
        let mut w = widget(true);
        w.scene_mut().resize(800.0, 600.0, 1.0);
        let mut reference = w.scene().clone();

        for _ in 0..3 {
            let expected = OPENGL_TO_WGPU_MATRIX * reference.pvm();
            assert!(matrices_close(w.step_frame(), expected));
            reference.advance_frame();
            assert_eq!(w.scene().frame(), reference.frame());
        }
        assert_eq!(w.repaint_handle().requests.get(), 3);
    }

    #[test]
    fn full_period_of_frames_wraps_and_repaints_each_time() {
        let mut w = widget(true);
        w.scene_mut().resize(800.0, 600.0, 1.0);
        let projection = w.scene().projection();
        let first = w.step_frame();

        for _ in 1..ROTATION_PERIOD {
            w.step_frame();
        }

        assert_eq!(w.scene().frame(), 0);
        assert_eq!(w.scene().rotation_angle(), Deg(0.0));
        assert!(matrices_close(w.scene().projection(), projection));
        assert!(matrices_close(w.step_frame(), first));
        assert_eq!(w.repaint_handle().requests.get(), ROTATION_PERIOD + 1);
    }

    #[test]
    fn zero_sized_surface_is_empty() {
        assert!(is_empty(PhysicalSize::new(0, 600)));
        assert!(is_empty(PhysicalSize::new(800, 0)));
        assert!(!is_empty(PhysicalSize::new(1, 1)));
    }

    #[test]
    fn rc_handle_forwards_requests() {
        let handle = Rc::new(CountingRepaint::default());
        let mut w = TetraWidget::new(Rc::clone(&handle), false);
        w.toggle_rotation();
        assert_eq!(handle.requests.get(), 1);
    }
}
