//! Image textures and background loading.
//!
//! Decoding happens on a worker thread through [`PendingTexture`]; only the
//! final upload in [`Texture::from_image`] needs the GPU.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use tracing::debug;

use crate::gpu::GpuContext;

/// Errors that can occur when loading a texture.
#[derive(Debug)]
pub enum TextureError {
    /// File could not be read.
    Io(std::io::Error),
    /// The bytes are not an image format we can decode.
    Decode(image::ImageError),
    /// The image is larger than the GPU can hold in one texture.
    TooLarge { width: u32, height: u32, max: u32 },
    /// The loader thread went away without sending a result.
    Disconnected,
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::Io(e) => write!(f, "IO error: {}", e),
            TextureError::Decode(e) => write!(f, "decode error: {}", e),
            TextureError::TooLarge { width, height, max } => {
                write!(f, "image is {}x{}, the GPU allows at most {}", width, height, max)
            }
            TextureError::Disconnected => write!(f, "texture loader stopped unexpectedly"),
        }
    }
}

impl std::error::Error for TextureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TextureError::Io(e) => Some(e),
            TextureError::Decode(e) => Some(e),
            TextureError::TooLarge { .. } | TextureError::Disconnected => None,
        }
    }
}

impl From<std::io::Error> for TextureError {
    fn from(e: std::io::Error) -> Self {
        TextureError::Io(e)
    }
}

impl From<image::ImageError> for TextureError {
    fn from(e: image::ImageError) -> Self {
        TextureError::Decode(e)
    }
}

/// Tightly packed RGBA8 pixels, top row first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    /// Reads and decodes an image file.
    pub fn decode_file(path: &Path) -> Result<Self, TextureError> {
        let bytes = std::fs::read(path)?;
        Self::decode_bytes(&bytes)
    }

    /// Decodes an in-memory image, guessing the format from its header.
    pub fn decode_bytes(bytes: &[u8]) -> Result<Self, TextureError> {
        let img = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            rgba: img.into_raw(),
        })
    }

    /// Checks that neither side exceeds `max_dimension`.
    ///
    /// Uploading an oversized texture is a validation error, so this runs
    /// before [`Texture::from_image`] with the device's
    /// `max_texture_dimension_2d`.
    pub fn fits_within(self, max_dimension: u32) -> Result<Self, TextureError> {
        if self.width > max_dimension || self.height > max_dimension {
            return Err(TextureError::TooLarge {
                width: self.width,
                height: self.height,
                max: max_dimension,
            });
        }
        Ok(self)
    }

    /// A red and white checkered banner used when no flag image is given.
    ///
    /// The top stripe is a solid dark band so the orientation of the plane
    /// is easy to see.
    pub fn banner(width: u32, height: u32) -> Self {
        const CELL: u32 = 8;
        const RED: [u8; 4] = [200, 16, 46, 255];
        const WHITE: [u8; 4] = [255, 255, 255, 255];
        const BAND: [u8; 4] = [20, 20, 20, 255];

        let band = height / 8;
        let mut rgba = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let pixel = if y < band {
                    BAND
                } else if ((x / CELL) + (y / CELL)) % 2 == 0 {
                    RED
                } else {
                    WHITE
                };
                rgba.extend_from_slice(&pixel);
            }
        }

        Self {
            width,
            height,
            rgba,
        }
    }

    /// A single opaque white pixel, the texture bound to untextured materials.
    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: vec![255; 4],
        }
    }
}

/// An image being decoded on a background thread.
///
/// The result is collected with [`PendingTexture::poll`], typically once
/// per frame, so startup never blocks on file IO.
#[derive(Debug)]
pub struct PendingTexture {
    path: PathBuf,
    receiver: Receiver<Result<DecodedImage, TextureError>>,
}

impl PendingTexture {
    /// Starts decoding `path` on a new thread.
    pub fn spawn(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (sender, receiver) = mpsc::channel();
        let worker_path = path.clone();

        thread::spawn(move || {
            let result = DecodedImage::decode_file(&worker_path);
            // The receiver may already be gone if the app closed first.
            let _ = sender.send(result);
        });

        debug!(path = %path.display(), "texture load started");
        Self { path, receiver }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `None` while the image is still loading.
    pub fn poll(&self) -> Option<Result<DecodedImage, TextureError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(TextureError::Disconnected)),
        }
    }
}

/// A GPU texture that can be bound to shaders.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
}

impl Texture {
    /// Create a texture from raw RGBA data.
    pub fn from_rgba(gpu: &GpuContext, data: &[u8], width: u32, height: u32, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Photos and flags want smooth filtering and no wrap at the edges
        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Uploads a decoded image.
    pub fn from_image(gpu: &GpuContext, image: &DecodedImage, label: &str) -> Self {
        Self::from_rgba(gpu, &image.rgba, image.width, image.height, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait(pending: &PendingTexture) -> Result<DecodedImage, TextureError> {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(result) = pending.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "texture loader timed out");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let pending = PendingTexture::spawn("definitely/not/here.png");
        assert!(matches!(wait(&pending), Err(TextureError::Io(_))));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = DecodedImage::decode_bytes(b"not an image at all").unwrap_err();
        assert!(matches!(err, TextureError::Decode(_)));
    }

    #[test]
    fn decodes_encoded_png() {
        let mut img = image::RgbaImage::new(3, 2);
        img.put_pixel(2, 1, image::Rgba([1, 2, 3, 4]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();

        let decoded = DecodedImage::decode_bytes(bytes.get_ref()).unwrap();
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(&decoded.rgba[20..24], &[1, 2, 3, 4]);
    }

    #[test]
    fn background_load_reads_file() {
        let path = std::env::temp_dir().join(format!("goalpost-flag-{}.png", std::process::id()));
        image::RgbaImage::from_pixel(4, 4, image::Rgba([9, 9, 9, 255]))
            .save(&path)
            .unwrap();

        let pending = PendingTexture::spawn(&path);
        let decoded = wait(&pending).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!((decoded.width, decoded.height), (4, 4));
        assert!(decoded.rgba.chunks(4).all(|p| p == [9, 9, 9, 255]));
    }

    #[test]
    fn oversized_image_is_rejected() {
        let path = std::env::temp_dir().join(format!("goalpost-wide-{}.png", std::process::id()));
        image::RgbaImage::new(9000, 2).save(&path).unwrap();

        let pending = PendingTexture::spawn(&path);
        let decoded = wait(&pending).unwrap();
        let _ = std::fs::remove_file(&path);

        let err = decoded.fits_within(8192).unwrap_err();
        assert!(matches!(
            err,
            TextureError::TooLarge {
                width: 9000,
                height: 2,
                max: 8192
            }
        ));
        assert_eq!(err.to_string(), "image is 9000x2, the GPU allows at most 8192");
    }

    #[test]
    fn image_at_the_limit_fits() {
        let tall = DecodedImage {
            width: 1,
            height: 8192,
            rgba: vec![0; 8192 * 4],
        };
        assert!(tall.fits_within(8192).is_ok());
        assert!(DecodedImage::white().fits_within(1).is_ok());
    }

    #[test]
    fn banner_has_dark_top_band() {
        let banner = DecodedImage::banner(64, 32);
        assert_eq!(banner.rgba.len(), 64 * 32 * 4);
        assert_eq!(&banner.rgba[..4], &[20, 20, 20, 255]);
        let below_band = (4 * 64 * 4) as usize;
        assert_ne!(&banner.rgba[below_band..below_band + 4], &[20, 20, 20, 255]);
    }
}
