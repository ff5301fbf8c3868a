//! Error types for starscape.
//!
//! One enum per concern. Library errors from wgpu, winit, serde_json and the
//! filesystem are wrapped with `From` conversions so callers can use `?`.

use thiserror::Error;

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("Failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("No compatible GPU adapter found: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    /// Failed to create GPU device.
    #[error("Failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface reports no usable texture format.
    #[error("GPU surface supports no texture formats on this adapter")]
    NoSurfaceFormat,
}

/// Errors raised by the starfield animator.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StarfieldError {
    /// The animator was started without a drawing surface to render into.
    #[error("No drawing surface attached; the starfield cannot animate")]
    MissingSurface,
}

/// Errors raised when building a carousel.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CarouselError {
    /// A carousel needs at least one item to wrap around.
    #[error("Carousel needs at least one item")]
    Empty,
}

/// Errors raised by the music deck.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeckError {
    /// The deck was built without any tracks.
    #[error("Playlist is empty")]
    EmptyPlaylist,
    /// The deck is hidden until the Thai persona unlocks it.
    #[error("Music deck is locked")]
    Locked,
}

/// Failure reported by a contact-form notifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Notification failed: {reason}")]
pub struct NotifyError {
    pub reason: String,
}

impl NotifyError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The config file is not valid JSON for [`crate::SceneConfig`].
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur when running a scene.
#[derive(Debug, Error)]
pub enum SceneError {
    /// Failed to create event loop.
    #[error("Failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    /// The carousel could not be built.
    #[error("Carousel error: {0}")]
    Carousel(#[from] CarouselError),
    /// The music deck could not be built.
    #[error("Deck error: {0}")]
    Deck(#[from] DeckError),
    /// The starfield animator refused to start.
    #[error("Starfield error: {0}")]
    Starfield(#[from] StarfieldError),
}
