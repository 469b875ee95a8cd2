// src/rendering/export.rs

use cairo::{Context, Format, ImageSurface, PdfSurface, SvgSurface};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_cairo::CairoBackend;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::config::FigureFormat;
use crate::error::{HistError, Result};

/// Appends the default extension when `path` has none.
pub fn with_default_extension(path: &Path, default: FigureFormat) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(default.extension())
    }
}

fn figure_format(path: &Path) -> Result<FigureFormat> {
    FigureFormat::from_path(path).ok_or_else(|| {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_string();
        HistError::FigureFormat(ext)
    })
}

/// Creates the surface matching the extension of `path`, lets `paint` draw on it
/// and flushes it to disk.
pub fn render_cairo<F>(path: &Path, size: (u32, u32), paint: F) -> Result<()>
where
    F: FnOnce(&Context) -> Result<()>,
{
    let (width, height) = size;

    match figure_format(path)? {
        FigureFormat::Png => {
            let surface = ImageSurface::create(Format::ARgb32, width as i32, height as i32)?;
            {
                let ctx = Context::new(&surface)?;
                paint(&ctx)?;
            }
            let mut file = File::create(path)?;
            surface
                .write_to_png(&mut file)
                .map_err(|e| HistError::Plot(e.to_string()))?;
        }
        FigureFormat::Pdf => {
            let surface = PdfSurface::new(width as f64, height as f64, path)?;
            {
                let ctx = Context::new(&surface)?;
                paint(&ctx)?;
            }
            surface.finish();
        }
        FigureFormat::Svg => {
            let surface = SvgSurface::new(width as f64, height as f64, Some(path))?;
            {
                let ctx = Context::new(&surface)?;
                paint(&ctx)?;
            }
            surface.finish();
        }
    }

    log::info!("Figure written to {:?}", path);
    Ok(())
}

/// Runs a plotters drawing on a white cairo-backed canvas.
pub fn render_chart<F>(path: &Path, size: (u32, u32), draw: F) -> Result<()>
where
    F: FnOnce(&DrawingArea<CairoBackend<'_>, Shift>) -> std::result::Result<(), Box<dyn std::error::Error>>,
{
    render_cairo(path, size, |ctx| {
        let backend =
            CairoBackend::new(ctx, size).map_err(|e| HistError::Plot(format!("{:?}", e)))?;
        let root = backend.into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| HistError::Plot(format!("{:?}", e)))?;

        draw(&root).map_err(|e| HistError::Plot(e.to_string()))?;

        root.present()
            .map_err(|e| HistError::Plot(format!("{:?}", e)))?;
        Ok(())
    })
}
