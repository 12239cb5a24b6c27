use std::process;
use std::rc::Rc;

use winit::dpi::{LogicalPosition, LogicalSize};
use winit::event::{
    ElementState, Event, KeyboardInput, MouseButton, VirtualKeyCode, WindowEvent,
};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use tetraview::shapes::ShaderSources;
use tetraview::{Context, Settings, TetraWidget};

fn fatal(message: &str, error: &dyn std::fmt::Display) -> ! {
    log::error!("{}: {}", message, error);
    process::exit(1);
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::from_env();
    log::debug!("{:?}", settings);

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("tetraview")
        .with_inner_size(LogicalSize::new(800.0, 600.0))
        .build(&event_loop)
        .map(Rc::new)
        .unwrap_or_else(|error| fatal("failed to create window", &error));

    let mut ctx = futures::executor::block_on(Context::create_context(&window))
        .unwrap_or_else(|error| fatal("failed to create rendering context", &error));

    let sources = ShaderSources::load(settings.shader_dir.as_deref())
        .unwrap_or_else(|error| fatal("failed to load shaders", &error));

    let mut widget = TetraWidget::new(Rc::clone(&window), settings.rotate);
    if let Err(error) = widget.initialize(&ctx, &sources) {
        fatal("failed to initialize", &error);
    }
    widget.resize(&mut ctx, window.inner_size(), window.scale_factor());

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;
        match event {
            Event::WindowEvent { event, window_id } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    widget.teardown();
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(size) => {
                    widget.resize(&mut ctx, size, window.scale_factor());
                }
                WindowEvent::ScaleFactorChanged {
                    scale_factor,
                    new_inner_size,
                } => {
                    widget.resize(&mut ctx, *new_inner_size, scale_factor);
                }
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(key),
                            ..
                        },
                    ..
                } => match key {
                    VirtualKeyCode::Escape => {
                        widget.teardown();
                        *control_flow = ControlFlow::Exit;
                    }
                    VirtualKeyCode::R => widget.toggle_rotation(),
                    VirtualKeyCode::Space => widget.set_rotation(true),
                    VirtualKeyCode::Home => {
                        widget.scene_mut().trackball_mut().reset();
                        window.request_redraw();
                    }
                    _ => {}
                },
                WindowEvent::CursorMoved { position, .. } => {
                    let cursor: LogicalPosition<f32> = position.to_logical(window.scale_factor());
                    widget
                        .scene_mut()
                        .trackball_mut()
                        .pointer_moved(cursor.x, cursor.y);
                }
                WindowEvent::MouseInput {
                    state,
                    button: MouseButton::Left,
                    ..
                } => {
                    let trackball = widget.scene_mut().trackball_mut();
                    match state {
                        ElementState::Pressed => trackball.grab(),
                        ElementState::Released => trackball.release(),
                    }
                }
                _ => {}
            },
            Event::RedrawRequested(window_id) if window_id == window.id() => {
                match widget.paint(&ctx) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        ctx.recreate_surface();
                        window.request_redraw();
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        log::warn!("surface timed out");
                        window.request_redraw();
                    }
                    Err(error @ wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("{}", error);
                        widget.teardown();
                        *control_flow = ControlFlow::Exit;
                    }
                }
            }
            _ => {}
        }
    });
}
