//! OCR for scanned statements.
//!
//! Pages are rasterized once with `pdftoppm` into a per-run temp
//! directory, then each PNG is recognized with `tesseract`. The temp
//! directory is removed when the [`RasterizedPages`] handle is dropped.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

use crate::PdfError;

/// Settings for the external OCR tools.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OcrOptions {
    /// Rasterization resolution.
    pub dpi: u32,
    /// Tesseract language (e.g. `"spa"`).
    pub language: String,
    /// Tesseract page segmentation mode. `6` treats the page as one
    /// uniform block of text, which keeps table rows on single lines.
    pub psm: u8,
    /// Path or name of the `tesseract` binary.
    pub tesseract_cmd: String,
    /// Path or name of the `pdftoppm` binary.
    pub pdftoppm_cmd: String,
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            dpi: 300,
            language: "spa".to_owned(),
            psm: 6,
            tesseract_cmd: "tesseract".to_owned(),
            pdftoppm_cmd: "pdftoppm".to_owned(),
        }
    }
}

/// Rendered page images living in a temp directory.
#[derive(Debug)]
pub struct RasterizedPages {
    /// Directory holding the input copy and the page images.
    dir: PathBuf,
    /// Page images in page order.
    images: Vec<PathBuf>,
}

impl RasterizedPages {
    /// Number of rendered pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.images.len()
    }

    /// Runs `tesseract` on the page at `idx` and returns its text.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::Tool`] if `tesseract` cannot be started or
    /// exits unsuccessfully, or [`PdfError::Extraction`] if `idx` is out
    /// of range.
    pub fn recognize(&self, idx: usize, options: &OcrOptions) -> Result<String, PdfError> {
        let image = self
            .images
            .get(idx)
            .ok_or_else(|| PdfError::Extraction(format!("no rendered image for page {}", idx + 1)))?;

        let output = Command::new(&options.tesseract_cmd)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&options.language)
            .arg("--psm")
            .arg(options.psm.to_string())
            .output()
            .map_err(|e| tool_error("tesseract", &format!("failed to start: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(tool_error(
                "tesseract",
                &format!("page {}: {}", idx + 1, single_line(&stderr)),
            ));
        }

        let text = String::from_utf8(output.stdout)?;
        log::debug!("OCR page {}: {} characters", idx + 1, text.len());

        Ok(text)
    }
}

impl Drop for RasterizedPages {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.dir) {
            log::warn!("Failed to remove temp dir {}: {e}", self.dir.display());
        }
    }
}

/// Renders every page of `pdf` to a PNG image.
///
/// # Errors
///
/// Returns [`PdfError::Io`] if the temp directory cannot be written, or
/// [`PdfError::Tool`] if `pdftoppm` fails or renders nothing.
pub fn rasterize(pdf: &[u8], options: &OcrOptions) -> Result<RasterizedPages, PdfError> {
    let dir = std::env::temp_dir().join(format!("extracto-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir)?;

    // Constructed before anything else can fail so the directory is
    // cleaned up on every path.
    let mut pages = RasterizedPages {
        dir,
        images: Vec::new(),
    };

    let input = pages.dir.join("input.pdf");
    std::fs::write(&input, pdf)?;

    let prefix = pages.dir.join("page");
    let output = Command::new(&options.pdftoppm_cmd)
        .arg("-r")
        .arg(options.dpi.to_string())
        .arg("-png")
        .arg(&input)
        .arg(&prefix)
        .output()
        .map_err(|e| tool_error("pdftoppm", &format!("failed to start: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(tool_error("pdftoppm", &single_line(&stderr)));
    }

    pages.images = page_images(&pages.dir)?;

    if pages.images.is_empty() {
        return Err(tool_error("pdftoppm", "no page images were produced"));
    }

    log::info!(
        "Rasterized {} page(s) at {} dpi",
        pages.images.len(),
        options.dpi
    );

    Ok(pages)
}

/// Lists the `page-N.png` images in `dir`, in page order.
///
/// `pdftoppm` zero-pads the page number to the width of the page count,
/// so a lexicographic sort is page order.
fn page_images(dir: &Path) -> Result<Vec<PathBuf>, PdfError> {
    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_page = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("page-") && n.ends_with(".png"));
        if is_page {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

fn tool_error(tool: &str, message: &str) -> PdfError {
    PdfError::Tool {
        tool: tool.to_owned(),
        message: message.to_owned(),
    }
}

/// Collapses tool stderr to one trimmed line.
fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
