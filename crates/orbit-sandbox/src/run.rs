use crate::graphics::Graphics;
use cgmath::Vector2;
use instant::Instant;
use physics::{PhysicsResult, Simulation, Viewport};
use std::time::Duration;
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, MouseButton, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::Window,
};

struct Stats {
    frame_number: u64,
    tick_number: u64,
    instant_start: Instant,
    time_spent_in_physics: Duration,
    time_spent_in_graphics: Duration,
}

impl Stats {
    fn report(
        &mut self,
        PhysicsResult {
            elapsed_real,
            elapsed_physics_ticks,
        }: PhysicsResult,
    ) {
        self.time_spent_in_physics += elapsed_real;
        self.tick_number += elapsed_physics_ticks;
    }
}

fn resize(graphics: &mut Graphics, simulation: &mut Simulation, (width, height): (u32, u32)) {
    if width == 0 || height == 0 {
        // Minimized, keep the last walls
        return;
    }
    graphics.resize((width, height));
    if let Err(error) = simulation.resize(Viewport::from((width, height))) {
        log::warn!("Ignoring resize to {width}x{height}: {error}");
    }
}

pub fn run(
    event_loop: EventLoop<()>,
    window: Window,
    mut graphics: Graphics,
    mut simulation: Simulation,
) -> ! {
    let mut pointer = Vector2::new(0.0, 0.0);

    let desired_frame_time = match window
        .current_monitor()
        .and_then(|mon| mon.refresh_rate_millihertz())
    {
        Some(rate) => Duration::from_secs(1000) / rate,
        None => Duration::from_secs(1) / 60,
    };
    let mut last_frame_processing_begun_instant = Instant::now();

    let mut stats = Stats {
        frame_number: 0,
        tick_number: 0,
        instant_start: Instant::now(),
        time_spent_in_physics: Duration::ZERO,
        time_spent_in_graphics: Duration::ZERO,
    };

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        match event {
            Event::WindowEvent {
                window_id: _id,
                event: w_event,
            } => match w_event {
                WindowEvent::CloseRequested => {
                    simulation.clear();
                    control_flow.set_exit();
                }
                WindowEvent::Resized(PhysicalSize { width, height })
                | WindowEvent::ScaleFactorChanged {
                    scale_factor: _,
                    new_inner_size: &mut PhysicalSize { width, height },
                } => resize(&mut graphics, &mut simulation, (width, height)),
                WindowEvent::CursorMoved { position, .. } => {
                    pointer = Vector2::new(position.x as f32, position.y as f32);
                    simulation.move_pointer(pointer);
                }
                WindowEvent::MouseInput {
                    button: MouseButton::Left,
                    state,
                    ..
                } => match state {
                    ElementState::Pressed => {
                        simulation.grab(pointer);
                    }
                    ElementState::Released => simulation.release(),
                },
                WindowEvent::Focused(false) => simulation.release(),
                _ => {}
            },
            Event::MainEventsCleared => {
                let now = Instant::now();
                if now < last_frame_processing_begun_instant + desired_frame_time {
                    control_flow
                        .set_wait_until(last_frame_processing_begun_instant + desired_frame_time);
                    return;
                }
                last_frame_processing_begun_instant = now;

                stats.report(simulation.advance_to(now));
                window.request_redraw();
            }
            Event::RedrawRequested(_window_id) => {
                #[cfg(target_arch = "wasm32")]
                {
                    let size = crate::browser_window_size();
                    if size.0 > 0 && size.1 > 0 && size != graphics.window_size() {
                        window.set_inner_size(PhysicalSize::new(size.0, size.1));
                        resize(&mut graphics, &mut simulation, size);
                    }
                }
                let instant_pre_graphics = Instant::now();
                graphics.render(simulation.bodies());
                stats.time_spent_in_graphics += Instant::now().duration_since(instant_pre_graphics);
                stats.frame_number += 1;
                if stats.frame_number.is_power_of_two() || stats.frame_number % 1024 == 0 {
                    log::info!(
                        "Elapsed {}s total, {}s physics ({} ticks), {}s graphics ({} frames, {:.1} fps)",
                        Instant::now().duration_since(stats.instant_start).as_secs(),
                        stats.time_spent_in_physics.as_secs(),
                        stats.tick_number,
                        stats.time_spent_in_graphics.as_secs(),
                        stats.frame_number,
                        graphics.fps(),
                    );
                }
                control_flow
                    .set_wait_until(last_frame_processing_begun_instant + desired_frame_time);
            }
            Event::LoopDestroyed => log::info!("Event loop destroyed"),
            _ => {}
        }
    })
}
