//! Page rendering for sample documents.
//!
//! Renderers turn one page of a document into something the terminal can
//! draw: a small RGB raster for images, or plain text lines for PDFs and
//! text files. PDF support is behind the `pdf` feature.

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use thiserror::Error;

/// Largest raster kept per page, in pixels.
const MAX_RASTER_WIDTH: u32 = 240;
const MAX_RASTER_HEIGHT: u32 = 160;

/// Page separator in text documents.
const FORM_FEED: char = '\x0c';

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Document not found: {0}")]
    Missing(PathBuf),

    #[error("Document {0} has no pages")]
    Empty(PathBuf),

    #[error("Failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Rendering .{extension} files requires the `{feature}` feature")]
    FeatureDisabled { extension: String, feature: String },

    #[error("No renderer for .{0} files")]
    Unsupported(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB pixels, `width * height` entries.
    pub pixels: Vec<[u8; 3]>,
}

impl Raster {
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = (y.min(self.height.saturating_sub(1)) * self.width
            + x.min(self.width.saturating_sub(1))) as usize;
        self.pixels.get(idx).copied().unwrap_or([0, 0, 0])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedPage {
    Raster(Raster),
    Text(Vec<String>),
}

/// A page index resolved against a document's page count.
///
/// Indices past the end show the last page.
pub fn clamp_page(requested: usize, page_count: usize) -> usize {
    requested.min(page_count.saturating_sub(1))
}

pub trait DocumentRenderer {
    fn page_count(&self, path: &Path) -> Result<usize>;

    /// Render `page`, which must be below [`Self::page_count`].
    fn render_page(&self, path: &Path, page: usize) -> Result<RenderedPage>;

    /// Render the requested pages, clamping each to the document.
    fn render_pages(&self, path: &Path, pages: &[usize]) -> Result<Vec<RenderedPage>> {
        ensure_exists(path)?;
        let count = self.page_count(path)?;
        if count == 0 {
            return Err(RenderError::Empty(path.to_path_buf()));
        }
        pages
            .iter()
            .map(|page| self.render_page(path, clamp_page(*page, count)))
            .collect()
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(RenderError::Missing(path.to_path_buf()))
    }
}

/// Pick a renderer by file extension.
pub fn renderer_for_extension(extension: &str) -> Result<Box<dyn DocumentRenderer>> {
    let extension = extension.trim_start_matches('.').to_ascii_lowercase();
    match extension.as_str() {
        "png" | "jpg" | "jpeg" => Ok(Box::new(ImageRenderer)),
        "pdf" => Ok(Box::new(PdfTextRenderer)),
        "txt" => Ok(Box::new(TextRenderer)),
        other => Err(RenderError::Unsupported(other.to_string())),
    }
}

/// Single-page raster documents.
pub struct ImageRenderer;

impl DocumentRenderer for ImageRenderer {
    fn page_count(&self, path: &Path) -> Result<usize> {
        ensure_exists(path)?;
        Ok(1)
    }

    fn render_page(&self, path: &Path, _page: usize) -> Result<RenderedPage> {
        let decoded = image::open(path).map_err(|e| RenderError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let fitted = if decoded.width() > MAX_RASTER_WIDTH || decoded.height() > MAX_RASTER_HEIGHT {
            decoded.resize(MAX_RASTER_WIDTH, MAX_RASTER_HEIGHT, FilterType::Triangle)
        } else {
            decoded
        };
        let rgb = fitted.to_rgb8();
        let (width, height) = rgb.dimensions();
        let pixels = rgb.pixels().map(|p| p.0).collect();
        Ok(RenderedPage::Raster(Raster {
            width,
            height,
            pixels,
        }))
    }
}

/// Plain text split into pages on form feeds.
pub struct TextRenderer;

impl TextRenderer {
    fn pages(path: &Path) -> Result<Vec<String>> {
        let content = std::fs::read_to_string(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(content.split(FORM_FEED).map(str::to_string).collect())
    }
}

impl DocumentRenderer for TextRenderer {
    fn page_count(&self, path: &Path) -> Result<usize> {
        ensure_exists(path)?;
        Ok(Self::pages(path)?.len())
    }

    fn render_page(&self, path: &Path, page: usize) -> Result<RenderedPage> {
        let pages = Self::pages(path)?;
        Ok(text_page(pages.get(page).map(String::as_str).unwrap_or_default()))
    }

    fn render_pages(&self, path: &Path, pages: &[usize]) -> Result<Vec<RenderedPage>> {
        ensure_exists(path)?;
        let all = Self::pages(path)?;
        Ok(pages
            .iter()
            .map(|page| text_page(&all[clamp_page(*page, all.len())]))
            .collect())
    }
}

fn text_page(text: &str) -> RenderedPage {
    RenderedPage::Text(text.trim_end().lines().map(str::to_string).collect())
}

/// Text extraction of PDF pages.
pub struct PdfTextRenderer;

#[cfg(feature = "pdf")]
impl PdfTextRenderer {
    fn pages(path: &Path) -> Result<Vec<String>> {
        pdf_extract::extract_text_by_pages(path).map_err(|e| RenderError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

#[cfg(not(feature = "pdf"))]
impl PdfTextRenderer {
    fn pages(_path: &Path) -> Result<Vec<String>> {
        Err(RenderError::FeatureDisabled {
            extension: "pdf".to_string(),
            feature: "pdf".to_string(),
        })
    }
}

impl DocumentRenderer for PdfTextRenderer {
    fn page_count(&self, path: &Path) -> Result<usize> {
        ensure_exists(path)?;
        Ok(Self::pages(path)?.len())
    }

    fn render_page(&self, path: &Path, page: usize) -> Result<RenderedPage> {
        let pages = Self::pages(path)?;
        Ok(text_page(pages.get(page).map(String::as_str).unwrap_or_default()))
    }

    fn render_pages(&self, path: &Path, pages: &[usize]) -> Result<Vec<RenderedPage>> {
        ensure_exists(path)?;
        let all = Self::pages(path)?;
        if all.is_empty() {
            return Err(RenderError::Empty(path.to_path_buf()));
        }
        Ok(pages
            .iter()
            .map(|page| text_page(&all[clamp_page(*page, all.len())]))
            .collect())
    }
}
