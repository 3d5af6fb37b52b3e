//! Shared test helpers.

use std::path::PathBuf;

use divfx::config::DivFxConfig;

/// Try to create a wgpu device for GPU tests.
/// Returns None if no adapter is available (e.g., headless CI).
#[allow(dead_code)]
pub fn try_create_gpu_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::LowPower,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .ok()?;

    let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("Test GPU Device"),
        ..Default::default()
    }))
    .ok()?;

    Some((device, queue))
}

/// The shaders shipped under `assets/`.
#[allow(dead_code)]
pub fn shipped_assets() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
}

/// Default config pointed at the shipped assets.
#[allow(dead_code)]
pub fn shipped_config() -> DivFxConfig {
    let assets = shipped_assets();
    DivFxConfig {
        prelude_root: assets.join("prelude"),
        asset_root: assets,
        ..DivFxConfig::default()
    }
}
