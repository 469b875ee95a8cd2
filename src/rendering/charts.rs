// src/rendering/charts.rs

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::drawing::DrawingArea;
use plotters::prelude::*;
use std::error::Error;
use std::path::Path;

use super::export::render_chart;
use super::quantity::{energy_series, quantity_series, Quantity, Series};
use crate::config::PlotStyle;
use crate::error::Result;
use crate::hist::HistFile;

/// Panel order of the overview figure (row major, 3 rows x 2 columns).
pub const PLOT_LAYOUT: [Quantity; 6] = [
    Quantity::Abc,
    Quantity::Angles,
    Quantity::Volume,
    Quantity::Pressure,
    Quantity::Forces,
    Quantity::Energy,
];

/// (nrows, ncols) of a grid with one panel per file.
pub fn grid_shape(n: usize) -> (usize, usize) {
    if n > 1 {
        (n / 2 + n % 2, 2)
    } else {
        (1, 1)
    }
}

fn padded_range(series: &[Series]) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let mut xmax = 0.0f64;
    let mut ymin = f64::INFINITY;
    let mut ymax = f64::NEG_INFINITY;
    for s in series {
        for &(x, y) in &s.points {
            xmax = xmax.max(x);
            if y.is_finite() {
                ymin = ymin.min(y);
                ymax = ymax.max(y);
            }
        }
    }
    if !ymin.is_finite() {
        return (0.0..1.0, 0.0..1.0);
    }
    let span = ymax - ymin;
    let pad = if span > 1e-12 {
        0.05 * span
    } else {
        0.05 * ymax.abs().max(1e-3)
    };
    let xmax = if xmax > 0.0 { xmax } else { 1.0 };
    (-0.02 * xmax..1.02 * xmax, ymin - pad..ymax + pad)
}

/// Draws labelled series on a single panel: lines, circle markers, legend when
/// more than one curve.
pub fn draw_series_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    series: &[Series],
    ylabel: &str,
    caption: Option<&str>,
    style: &PlotStyle,
) -> std::result::Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let family = style.font_family.as_str();
    let font_size = style.font_size as f64;
    let (xrange, yrange) = padded_range(series);

    let mut builder = ChartBuilder::on(area);
    builder
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70);
    if let Some(text) = caption {
        builder.caption(text, (family, font_size));
    }
    let mut chart = builder.build_cartesian_2d(xrange, yrange)?;

    chart
        .configure_mesh()
        .x_desc("Step")
        .y_desc(ylabel)
        .axis_desc_style((family, font_size))
        .draw()?;

    for (i, s) in series.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        chart
            .draw_series(
                LineSeries::new(s.points.iter().copied(), color.stroke_width(2))
                    .point_size(style.marker_size),
            )?
            .label(s.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    if series.len() > 1 {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font((family, font_size * 0.8))
            .draw()?;
    }

    Ok(())
}

/// Draws one quantity of `hist` on `area`.
pub fn plot_ax<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    hist: &HistFile,
    what: Quantity,
    caption: Option<&str>,
    style: &PlotStyle,
) -> std::result::Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    draw_series_panel(area, &quantity_series(hist, what), what.ylabel(), caption, style)
}

/// Overview figure: lattice, volume, pressure, forces and energy vs step.
pub fn plot(hist: &HistFile, path: &Path, style: &PlotStyle) -> Result<()> {
    let size = (2 * style.panel_width, 3 * style.panel_height);
    log::debug!("Plotting {} steps of {:?}", hist.num_steps(), hist.path());

    render_chart(path, size, |root| {
        let panels = root.split_evenly((3, 2));
        for (area, what) in panels.iter().zip(PLOT_LAYOUT) {
            plot_ax(area, hist, what, None, style)?;
        }
        Ok(())
    })
}

/// Energy terms that are not identically zero, in eV.
pub fn plot_energies(hist: &HistFile, path: &Path, style: &PlotStyle) -> Result<()> {
    let series = energy_series(hist);
    if series.is_empty() {
        log::warn!("All energy terms of {:?} are zero", hist.path());
    }
    let size = (style.panel_width * 3 / 2, style.panel_height * 3 / 2);

    render_chart(path, size, |root| {
        draw_series_panel(root, &series, "Energy [eV]", None, style)
    })
}

/// One panel per (label, file), two columns when more than one file.
pub fn gridplot(
    entries: &[(&str, &HistFile)],
    what: Quantity,
    path: &Path,
    style: &PlotStyle,
) -> Result<()> {
    let (nrows, ncols) = grid_shape(entries.len());
    let size = (ncols as u32 * style.panel_width, nrows as u32 * style.panel_height);
    log::debug!("Grid of {}x{} panels for `{}`", nrows, ncols, what);

    render_chart(path, size, |root| {
        let panels = root.split_evenly((nrows, ncols));
        for (area, (label, hist)) in panels.iter().zip(entries) {
            plot_ax(area, hist, what, Some(*label), style)?;
        }
        Ok(())
    })
}
