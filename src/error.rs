//! Error types for the particle field.
//!
//! Configuration errors are the only failures the simulator itself reports.
//! GPU and window errors come from the viewer and never reach the core
//! update loop.

use thiserror::Error;

/// A rejected [`FieldConfig`](crate::config::FieldConfig).
///
/// Each variant names the offending option so the host can log something
/// useful before falling back to a blank field.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Viewport width or height is zero, negative or not finite.
    #[error("viewport must have positive finite dimensions, got {width}x{height}")]
    Viewport { width: f32, height: f32 },
    /// Density-based count with a non-positive area per particle.
    #[error("area per particle must be positive, got {0}")]
    Density(f32),
    /// Velocity span is negative or not finite.
    #[error("speed must be a non-negative finite number, got {0}")]
    Speed(f32),
    /// Fixed count or density cap exceeds the supported maximum.
    #[error("particle count must be at most {max}, got {count}")]
    Count { count: u32, max: u32 },
    /// Size range is empty, inverted or non-positive.
    #[error("size range must satisfy 0 < min <= max, got {min}..{max}")]
    Size { min: f32, max: f32 },
    /// An opacity value lies outside `[0, 1]` or is inverted.
    #[error("opacity range must lie within [0, 1] with low <= high, got {low}..{high}")]
    Opacity { low: f32, high: f32 },
    /// Twinkle period must be positive.
    #[error("twinkle period must be positive, got {0}")]
    TwinklePeriod(f32),
    /// Twinkle radius multiplier is non-positive or not finite.
    #[error("twinkle scale peak must be a positive finite number, got {0}")]
    ScalePeak(f32),
    /// Connection distance is negative or not finite.
    #[error("connection distance must be a non-negative finite number, got {0}")]
    ConnectionDistance(f32),
    /// Step configuration cannot produce a finite, non-negative scale.
    #[error("invalid step configuration: {0}")]
    Step(&'static str),
    /// Pointer radius, stiffness or damping is negative or not finite.
    #[error("invalid pointer configuration: {0}")]
    Pointer(&'static str),
    /// No preset with this name.
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
    /// Failed to read or write a config file.
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    /// Config file is not valid JSON for [`FieldConfig`](crate::config::FieldConfig).
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found; ensure your system supports Vulkan, Metal, DX12 or WebGPU")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface reports no usable texture format.
    #[error("surface has no supported texture formats")]
    NoSurfaceFormat,
}

/// Errors that can occur while running the windowed viewer.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Failed to create or run the event loop.
    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create the window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// Headless PNG export failed.
    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
}
