//! Fatal application errors.
//!
//! Anything that can go wrong before the first frame ends up as an
//! [`AppError`]. Per-frame surface errors are handled in place by the app;
//! only running out of GPU memory is fatal and reaches this type.

use std::fmt;

/// Errors that stop the application.
#[derive(Debug)]
pub enum AppError {
    /// The event loop could not be created or exited abnormally.
    EventLoop(winit::error::EventLoopError),
    /// The window could not be created.
    Window(winit::error::OsError),
    /// The window could not be turned into a render surface.
    Surface(wgpu::CreateSurfaceError),
    /// No GPU adapter can present to the window.
    Adapter(wgpu::RequestAdapterError),
    /// The adapter refused to create a device.
    Device(wgpu::RequestDeviceError),
    /// The surface reports no usable texture formats.
    UnsupportedSurface,
    /// The GPU ran out of memory while acquiring a frame.
    OutOfMemory,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::EventLoop(e) => write!(f, "event loop error: {}", e),
            AppError::Window(e) => write!(f, "failed to create window: {}", e),
            AppError::Surface(e) => write!(f, "failed to create surface: {}", e),
            AppError::Adapter(e) => write!(f, "no suitable GPU adapter: {}", e),
            AppError::Device(e) => write!(f, "failed to create device: {}", e),
            AppError::UnsupportedSurface => write!(f, "surface has no supported formats"),
            AppError::OutOfMemory => write!(f, "GPU out of memory"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::EventLoop(e) => Some(e),
            AppError::Window(e) => Some(e),
            AppError::Surface(e) => Some(e),
            AppError::Adapter(e) => Some(e),
            AppError::Device(e) => Some(e),
            AppError::UnsupportedSurface | AppError::OutOfMemory => None,
        }
    }
}

impl From<winit::error::EventLoopError> for AppError {
    fn from(e: winit::error::EventLoopError) -> Self {
        AppError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for AppError {
    fn from(e: winit::error::OsError) -> Self {
        AppError::Window(e)
    }
}

impl From<wgpu::CreateSurfaceError> for AppError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        AppError::Surface(e)
    }
}

impl From<wgpu::RequestAdapterError> for AppError {
    fn from(e: wgpu::RequestAdapterError) -> Self {
        AppError::Adapter(e)
    }
}

impl From<wgpu::RequestDeviceError> for AppError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        AppError::Device(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn unsupported_surface_has_no_source() {
        let err = AppError::UnsupportedSurface;
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "surface has no supported formats");
    }
}
