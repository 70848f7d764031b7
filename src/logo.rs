use std::fs;
use std::io::Read;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Image formats Typst can place on the cover page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Svg,
}

impl ImageFormat {
    /// Identify the format from the leading bytes.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        match image::guess_format(bytes) {
            Ok(image::ImageFormat::Png) => Some(Self::Png),
            Ok(image::ImageFormat::Jpeg) => Some(Self::Jpeg),
            Ok(image::ImageFormat::Gif) => Some(Self::Gif),
            Ok(image::ImageFormat::WebP) => Some(Self::Webp),
            _ if is_svg(bytes) => Some(Self::Svg),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
            Self::Svg => "svg",
        }
    }

    fn raster(self) -> Option<image::ImageFormat> {
        match self {
            Self::Png => Some(image::ImageFormat::Png),
            Self::Jpeg => Some(image::ImageFormat::Jpeg),
            Self::Gif => Some(image::ImageFormat::Gif),
            Self::Webp => Some(image::ImageFormat::WebP),
            Self::Svg => None,
        }
    }
}

fn is_svg(bytes: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
    let head = head.trim_start_matches('\u{feff}').trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

/// Decoded logo bytes plus the virtual file name Typst reads them from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub name: String,
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

/// Fetches the raw bytes behind a logo reference.
pub trait ImageLoader {
    fn load(&self, source: &str) -> Result<Vec<u8>>;
}

/// Loads images from the filesystem, resolving relative paths against `base`.
#[derive(Debug, Clone, Default)]
pub struct FsImageLoader {
    base: PathBuf,
}

impl FsImageLoader {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl ImageLoader for FsImageLoader {
    fn load(&self, source: &str) -> Result<Vec<u8>> {
        let path = self.base.join(source);
        fs::read(&path).map_err(|e| Error::Image(format!("{}: {e}", path.display())))
    }
}

/// Downloads `http://` and `https://` images with a blocking request.
pub struct HttpImageLoader {
    agent: ureq::Agent,
}

impl HttpImageLoader {
    pub fn new() -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
        }
    }
}

impl Default for HttpImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageLoader for HttpImageLoader {
    fn load(&self, source: &str) -> Result<Vec<u8>> {
        log::info!("fetching logo from {source}");
        let response = self
            .agent
            .get(source)
            .call()
            .map_err(|e| Error::Image(format!("failed to fetch {source}: {e}")))?;

        let mut bytes = Vec::new();
        response
            .into_body()
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| Error::Image(format!("failed to read {source}: {e}")))?;
        Ok(bytes)
    }
}

/// Sends URLs to the `remote` loader and everything else to `local`.
pub struct LogoLoader<L = FsImageLoader, R = HttpImageLoader> {
    local: L,
    remote: R,
}

impl LogoLoader {
    /// Filesystem paths relative to `base`, URLs over HTTP.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self::with_loaders(FsImageLoader::new(base), HttpImageLoader::new())
    }
}

impl<L: ImageLoader, R: ImageLoader> LogoLoader<L, R> {
    pub fn with_loaders(local: L, remote: R) -> Self {
        Self { local, remote }
    }
}

impl<L: ImageLoader, R: ImageLoader> ImageLoader for LogoLoader<L, R> {
    fn load(&self, source: &str) -> Result<Vec<u8>> {
        if is_url(source) {
            self.remote.load(source)
        } else {
            self.local.load(source)
        }
    }
}

fn is_url(source: &str) -> bool {
    let lower = source.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Load, identify and decode the cover logo.
///
/// Raster images are fully decoded so that a corrupt file is rejected here
/// instead of failing the Typst compile.
pub fn load_logo(source: &str, loader: &dyn ImageLoader) -> Result<LoadedImage> {
    let bytes = loader.load(source)?;
    let format = ImageFormat::detect(&bytes)
        .ok_or_else(|| Error::Image(format!("{source}: unsupported image format")))?;

    if let Some(raster) = format.raster() {
        let decoded = image::load_from_memory_with_format(&bytes, raster)
            .map_err(|e| Error::Image(format!("{source}: {e}")))?;
        log::debug!(
            "logo {source}: {} {}x{}",
            format.extension(),
            decoded.width(),
            decoded.height()
        );
    }

    Ok(LoadedImage {
        name: format!("logo.{}", format.extension()),
        format,
        bytes,
    })
}
