use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use pollster::FutureExt;
use wgpu::SurfaceError;
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

use showroom_viewer::assets::{self, ShowManifest};
use showroom_viewer::cli::Args;
use showroom_viewer::viewer::ViewerState;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::init();

    let (manifest, base) =
        assets::load_show_manifest(&args.show).context("loading show manifest")?;

    if args.headless {
        return run_headless(&manifest, &base);
    }

    let font_path = base.join(&manifest.font);
    let font_bytes = fs::read(&font_path)
        .with_context(|| format!("reading overlay font {}", font_path.display()))?;

    let model_name = manifest.model.display().to_string();
    let loader_events = assets::spawn_loader(manifest, base);

    let event_loop = EventLoop::new().context("creating winit event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(format!("Showroom Viewer - {model_name}"))
            .with_inner_size(PhysicalSize::new(
                args.window_size.width,
                args.window_size.height,
            ))
            .build(&event_loop)
            .context("creating viewer window")?,
    );

    let mut state = ViewerState::new(window, font_bytes).block_on()?;

    event_loop
        .run(move |event, target| {
            target.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                    match event {
                        WindowEvent::CloseRequested => target.exit(),
                        WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    logical_key: Key::Named(NamedKey::Escape),
                                    state: ElementState::Pressed,
                                    ..
                                },
                            ..
                        } => target.exit(),
                        WindowEvent::KeyboardInput { event, .. } => state.handle_key(&event),
                        WindowEvent::MouseInput {
                            state: button_state,
                            button: MouseButton::Left,
                            ..
                        } => match button_state {
                            ElementState::Pressed => state.mouse_pressed(),
                            ElementState::Released => state.mouse_released(),
                        },
                        WindowEvent::CursorMoved { position, .. } => {
                            state.cursor_moved(position.x as f32, position.y as f32);
                        }
                        WindowEvent::MouseWheel { delta, .. } => {
                            let amount = match delta {
                                MouseScrollDelta::LineDelta(_, y) => y,
                                MouseScrollDelta::PixelDelta(position) => position.y as f32 / 40.0,
                            };
                            state.scrolled(amount);
                        }
                        WindowEvent::Resized(new_size) => state.resize(new_size),
                        WindowEvent::RedrawRequested => match state.render() {
                            Ok(_) => {}
                            Err(SurfaceError::Lost) => state.resize(state.size()),
                            Err(SurfaceError::OutOfMemory) => target.exit(),
                            Err(err) => eprintln!("[showroom_viewer] render error: {err:?}"),
                        },
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    while let Ok(event) = loader_events.try_recv() {
                        state.apply_load_event(event);
                    }
                    state.window().request_redraw();
                }
                _ => {}
            }
        })
        .context("running viewer application")?;
    Ok(())
}

/// Loads the show synchronously and prints what a windowed run would have
/// attached to the scene.
fn run_headless(manifest: &ShowManifest, base: &Path) -> Result<()> {
    let show = assets::load_show_assets(manifest, base, None)
        .map_err(|err| anyhow!(err).context("loading show assets"))?;

    let vertex_count: usize = show.meshes.iter().map(|mesh| mesh.positions.len()).sum();
    let triangle_count: usize = show.meshes.iter().map(|mesh| mesh.indices.len() / 3).sum();
    println!(
        "Loaded {} ({} mesh(es), {} vertices, {} triangles)",
        manifest.model.display(),
        show.meshes.len(),
        vertex_count,
        triangle_count
    );
    for (key, texture) in &show.textures {
        println!("  material '{}': {}x{} texture", key, texture.width, texture.height);
    }
    for mesh in &show.meshes {
        println!("  mesh '{}' -> material '{}'", mesh.name, mesh.material);
    }
    println!("Headless mode requested; viewer window bootstrap skipped.");
    Ok(())
}
