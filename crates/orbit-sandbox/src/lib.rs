mod graphics;
mod run;

use crate::graphics::{Graphics, Parameters};
use anyhow::Context;
use physics::{Simulation, SimulationConfig, Viewport};
use winit::{event_loop::EventLoopBuilder, window::WindowBuilder};

#[cfg_attr(target_arch = "wasm32", wasm_bindgen::prelude::wasm_bindgen)]
pub fn start() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        if let Err(error) = pollster::block_on(setup_and_run()) {
            log::error!("Setup failed: {error:#}");
        }
    }
    #[cfg(target_arch = "wasm32")]
    {
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));
        let (Ok(_) | Err(_)) = console_log::init_with_level(log::Level::Info);
        wasm_bindgen_futures::spawn_local(async {
            if let Err(error) = setup_and_run().await {
                log::error!("Setup failed: {error:#}");
            }
        });
    }
}

async fn setup_and_run() -> anyhow::Result<()> {
    log::info!("Setting up");
    let config = SimulationConfig::from_env()?;
    let instance =
        wgpu::Instance::new(wgpu::util::backend_bits_from_env().unwrap_or(wgpu::Backends::all()));
    let event_loop = EventLoopBuilder::new().build();
    let window = WindowBuilder::new()
        .with_title("Orbit Sandbox")
        .with_maximized(true)
        .build(&event_loop)?;

    #[cfg(target_arch = "wasm32")]
    {
        use winit::{dpi::PhysicalSize, platform::web::WindowExtWebSys};
        let js_window = web_sys::window().context("No browser window")?;
        let (width, height) = browser_window_size();
        window.set_inner_size(PhysicalSize::new(width, height));

        js_window
            .document()
            .and_then(|doc| {
                let dst = doc.get_element_by_id("canvas")?;
                let canvas = web_sys::Element::from(window.canvas());
                dst.append_child(&canvas).ok()?;
                Some(())
            })
            .context("Couldn't append canvas to document body.")?;
    }

    let surface = unsafe { instance.create_surface(&window) };
    let adapter = get_adapter(&instance, &surface).await?;
    let size: (u32, u32) = window.inner_size().into();

    let device_and_queue = get_device_and_queue(&adapter).await?;
    let parameters = Parameters {
        texture_format: *surface
            .get_supported_formats(&adapter)
            .first()
            .context("Surface is incompatible with the adapter")?,
        present_mode: {
            let supported = surface.get_supported_present_modes(&adapter);
            [wgpu::PresentMode::FifoRelaxed, wgpu::PresentMode::Fifo]
                .into_iter()
                .find(|p| supported.contains(p))
                .or_else(|| supported.first().copied())
                .unwrap_or(wgpu::PresentMode::Fifo)
        },
    };

    let graphics = Graphics::initialize(parameters, surface, device_and_queue, size);
    let simulation = Simulation::new(config, Viewport::from(size))?;

    log::info!("Starting event loop");
    run::run(event_loop, window, graphics, simulation)
}

/// Inner size of the browser window, zero where unavailable.
#[cfg(target_arch = "wasm32")]
fn browser_window_size() -> (u32, u32) {
    let dimension = |value: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as u32
    };
    match web_sys::window() {
        Some(js_window) => (
            dimension(js_window.inner_width()),
            dimension(js_window.inner_height()),
        ),
        None => (0, 0),
    }
}

async fn get_adapter(
    instance: &wgpu::Instance,
    surface: &wgpu::Surface,
) -> anyhow::Result<wgpu::Adapter> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        log::info!("Available adapters:");
        instance
            .enumerate_adapters(wgpu::Backends::all())
            .for_each(|adapter| log::info!("\t{:?}", adapter.get_info()));
    }
    instance
        .request_adapter(&wgpu::RequestAdapterOptionsBase {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(surface),
            force_fallback_adapter: false,
        })
        .await
        .context("Failed to acquire adapter")
}

async fn get_device_and_queue(
    adapter: &wgpu::Adapter,
) -> anyhow::Result<(wgpu::Device, wgpu::Queue)> {
    adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("device"),
                features: wgpu::Features::empty(),
                limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
            },
            None, // Trace path
        )
        .await
        .context("Failed to acquire device")
}
