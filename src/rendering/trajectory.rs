// src/rendering/trajectory.rs
//
// Flat projected views of a trajectory: the atomic paths of a whole run in one
// picture, or one picture per step.

use cairo::Context;
use nalgebra::{Matrix3, Rotation3, Vector3};
use std::f64::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};

use super::export::render_cairo;
use crate::config::Config;
use crate::error::{HistError, Result};
use crate::hist::HistFile;
use crate::model::elements::element_color;
use crate::model::Structure;
use crate::utils::linalg::frac_to_cart;

const MARGIN: f64 = 40.0;
const MAX_ARROW_PX: f64 = 60.0;

// Corner index = 4x + 2y + z
const CELL_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (0, 2),
    (0, 4),
    (1, 3),
    (1, 5),
    (2, 3),
    (2, 6),
    (4, 5),
    (4, 6),
    (7, 6),
    (7, 5),
    (7, 3),
];

#[derive(Debug, Clone)]
pub struct TrajectoryOptions {
    /// Draw every `sampling`-th step (the last step is always drawn)
    pub sampling: usize,
    pub with_forces: bool,
    /// View rotation around x, y, z in degrees
    pub rotation: [f64; 3],
    pub size: (u32, u32),
}

impl Default for TrajectoryOptions {
    fn default() -> Self {
        Self {
            sampling: 1,
            with_forces: true,
            rotation: [-60.0, 0.0, -30.0],
            size: (800, 800),
        }
    }
}

impl TrajectoryOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            sampling: config.trajectory_sampling.max(1),
            with_forces: config.trajectory_forces,
            ..Self::default()
        }
    }
}

/// Rotates Cartesian points and maps them onto a canvas, y pointing down.
#[derive(Debug, Clone)]
pub struct Projector {
    rotation: Matrix3<f64>,
    scale: f64,
    center: (f64, f64),
    canvas: (f64, f64),
}

impl Projector {
    /// Fits the rotated bounding box of `points` inside `size` minus a margin.
    pub fn new(angles_deg: [f64; 3], points: &[[f64; 3]], size: (u32, u32)) -> Self {
        let [rx, ry, rz] = angles_deg.map(|a| a * PI / 180.0);
        let rotation = (Rotation3::from_axis_angle(&Vector3::z_axis(), rz)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), ry)
            * Rotation3::from_axis_angle(&Vector3::x_axis(), rx))
        .into_inner();

        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        for p in points {
            let r = rotation * Vector3::from(*p);
            for k in 0..2 {
                min[k] = min[k].min(r[k]);
                max[k] = max[k].max(r[k]);
            }
        }
        if points.is_empty() {
            min = [0.0; 2];
            max = [0.0; 2];
        }

        let canvas = (size.0 as f64, size.1 as f64);
        let dx = (max[0] - min[0]).max(1e-9);
        let dy = (max[1] - min[1]).max(1e-9);
        let usable_w = (canvas.0 - 2.0 * MARGIN).max(1.0);
        let usable_h = (canvas.1 - 2.0 * MARGIN).max(1.0);

        Self {
            rotation,
            scale: (usable_w / dx).min(usable_h / dy),
            center: (0.5 * (min[0] + max[0]), 0.5 * (min[1] + max[1])),
            canvas,
        }
    }

    /// Pixels per Angstrom.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn project(&self, p: [f64; 3]) -> (f64, f64) {
        let r = self.rotation * Vector3::from(p);
        (
            0.5 * self.canvas.0 + (r[0] - self.center.0) * self.scale,
            0.5 * self.canvas.1 - (r[1] - self.center.1) * self.scale,
        )
    }

    /// Projects a direction (no translation), in pixels.
    pub fn project_vector(&self, v: [f64; 3]) -> (f64, f64) {
        let r = self.rotation * Vector3::from(v);
        (r[0] * self.scale, -r[1] * self.scale)
    }
}

/// matplotlib's "hot" colormap, `t` in [0, 1].
pub fn hot(t: f64) -> (f64, f64, f64) {
    let t = t.clamp(0.0, 1.0);
    let r = (t / 0.365).min(1.0);
    let g = ((t - 0.365) / 0.381).clamp(0.0, 1.0);
    let b = ((t - 0.746) / (1.0 - 0.746)).clamp(0.0, 1.0);
    (r, g, b)
}

fn cell_corners(lattice: &[[f64; 3]; 3]) -> Vec<[f64; 3]> {
    let mut corners = Vec::with_capacity(8);
    for x in 0..=1 {
        for y in 0..=1 {
            for z in 0..=1 {
                corners.push(frac_to_cart([x as f64, y as f64, z as f64], lattice));
            }
        }
    }
    corners
}

/// Steps drawn with the given stride, always ending on the last one.
pub fn sampled_steps(num_steps: usize, sampling: usize) -> Vec<usize> {
    if num_steps == 0 {
        return Vec::new();
    }
    let mut steps: Vec<usize> = (0..num_steps).step_by(sampling.max(1)).collect();
    if steps.last() != Some(&(num_steps - 1)) {
        steps.push(num_steps - 1);
    }
    steps
}

fn scene_points(hist: &HistFile) -> Vec<[f64; 3]> {
    let mut points: Vec<[f64; 3]> = hist.cart_coords().iter().flatten().copied().collect();
    for lattice in hist.lattices() {
        points.extend(cell_corners(lattice));
    }
    points
}

fn draw_cell(
    cr: &Context,
    projector: &Projector,
    lattice: &[[f64; 3]; 3],
    rgb: (f64, f64, f64),
) -> std::result::Result<(), cairo::Error> {
    let corners: Vec<(f64, f64)> = cell_corners(lattice)
        .into_iter()
        .map(|c| projector.project(c))
        .collect();

    cr.set_source_rgb(rgb.0, rgb.1, rgb.2);
    cr.set_line_width(1.5);
    for (start, end) in CELL_EDGES {
        cr.move_to(corners[start].0, corners[start].1);
        cr.line_to(corners[end].0, corners[end].1);
    }
    cr.stroke()
}

fn draw_atom(
    cr: &Context,
    (x, y): (f64, f64),
    radius: f64,
    element: &str,
) -> std::result::Result<(), cairo::Error> {
    let (r, g, b) = element_color(element);
    cr.arc(x, y, radius, 0.0, 2.0 * PI);
    cr.set_source_rgb(r, g, b);
    cr.fill_preserve()?;
    cr.set_source_rgb(0.0, 0.0, 0.0);
    cr.set_line_width(1.0);
    cr.stroke()
}

fn draw_arrow(
    cr: &Context,
    (x, y): (f64, f64),
    (dx, dy): (f64, f64),
) -> std::result::Result<(), cairo::Error> {
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1.0 {
        return Ok(());
    }
    let (ux, uy) = (dx / len, dy / len);
    let head = 8.0f64.min(0.4 * len);
    let (tx, ty) = (x + dx, y + dy);

    cr.set_source_rgb(0.1, 0.3, 0.9);
    cr.set_line_width(2.0);
    cr.move_to(x, y);
    cr.line_to(tx, ty);
    cr.stroke()?;

    cr.move_to(tx, ty);
    cr.line_to(tx - head * (ux - 0.5 * uy), ty - head * (uy + 0.5 * ux));
    cr.line_to(tx - head * (ux + 0.5 * uy), ty - head * (uy - 0.5 * ux));
    cr.close_path();
    cr.fill()
}

fn paint_background(cr: &Context) -> std::result::Result<(), cairo::Error> {
    cr.set_source_rgb(1.0, 1.0, 1.0);
    cr.paint()
}

fn paint_trajectories(
    cr: &Context,
    hist: &HistFile,
    last: &Structure,
    projector: &Projector,
    opts: &TrajectoryOptions,
) -> std::result::Result<(), cairo::Error> {
    paint_background(cr)?;

    draw_cell(cr, projector, &hist.lattices()[0], (1.0, 0.0, 0.0))?;
    draw_cell(cr, projector, &last.lattice, (0.0, 0.0, 0.0))?;

    let coords = hist.cart_coords();
    let steps = sampled_steps(hist.num_steps(), opts.sampling);
    let denom = (hist.num_steps().max(2) - 1) as f64;

    for iatom in 0..hist.natom() {
        cr.set_line_width(1.5);
        for pair in steps.windows(2) {
            // Stop short of the white end of the map
            let (r, g, b) = hot(0.75 * pair[0] as f64 / denom);
            let p0 = projector.project(coords[pair[0]][iatom]);
            let p1 = projector.project(coords[pair[1]][iatom]);
            cr.set_source_rgb(r, g, b);
            cr.move_to(p0.0, p0.1);
            cr.line_to(p1.0, p1.1);
            cr.stroke()?;
        }
        for &step in &steps {
            let (r, g, b) = hot(0.75 * step as f64 / denom);
            let (x, y) = projector.project(coords[step][iatom]);
            cr.set_source_rgb(r, g, b);
            cr.arc(x, y, 2.0, 0.0, 2.0 * PI);
            cr.fill()?;
        }
    }

    let final_coords = &coords[hist.num_steps() - 1];
    for (atom, &pos) in last.atoms.iter().zip(final_coords) {
        draw_atom(cr, projector.project(pos), 5.0, &atom.element)?;
    }

    if opts.with_forces {
        let forces = &hist.cart_forces()[hist.num_steps() - 1];
        let fmax = forces
            .iter()
            .map(|f| (f[0] * f[0] + f[1] * f[1] + f[2] * f[2]).sqrt())
            .fold(0.0f64, f64::max);
        if fmax > 1e-12 {
            for (f, &pos) in forces.iter().zip(final_coords) {
                let (dx, dy) = projector.project_vector(*f);
                let k = MAX_ARROW_PX / (fmax * projector.scale());
                draw_arrow(cr, projector.project(pos), (dx * k, dy * k))?;
            }
        }
    }
    Ok(())
}

/// Projected view of all atomic paths: initial cell in red, final cell in
/// black, path colour running along the "hot" map with the step.
pub fn render_trajectories(hist: &HistFile, opts: &TrajectoryOptions, path: &Path) -> Result<()> {
    let last = hist.final_structure()?;
    let projector = Projector::new(opts.rotation, &scene_points(hist), opts.size);
    log::debug!(
        "Drawing {} atoms over {} steps (sampling {})",
        hist.natom(),
        hist.num_steps(),
        opts.sampling
    );
    render_cairo(path, opts.size, |cr| {
        paint_trajectories(cr, hist, last, &projector, opts).map_err(HistError::from)
    })
}

/// One PNG per step (`frame_0000.png`, ...) inside `dir`, sharing the same view.
pub fn render_frames(hist: &HistFile, dir: &Path, opts: &TrajectoryOptions) -> Result<Vec<PathBuf>> {
    let structures = hist.structures()?;
    fs::create_dir_all(dir)?;
    let projector = Projector::new(opts.rotation, &scene_points(hist), opts.size);
    let coords = hist.cart_coords();

    let mut frames = Vec::with_capacity(hist.num_steps());
    for (step, structure) in structures.iter().enumerate() {
        let path = dir.join(format!("frame_{:04}.png", step));
        render_cairo(&path, opts.size, |cr| {
            paint_background(cr)?;
            draw_cell(cr, &projector, &structure.lattice, (0.0, 0.0, 0.0))?;
            for (atom, &pos) in structure.atoms.iter().zip(&coords[step]) {
                draw_atom(cr, projector.project(pos), 5.0, &atom.element)?;
            }
            Ok(())
        })?;
        log::debug!("Frame {} written to {:?}", step, path);
        frames.push(path);
    }

    log::info!("{} frames written to {:?}", frames.len(), dir);
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hist::testdata::relax_source;

    #[test]
    fn test_hot_colormap() {
        assert_eq!(hot(0.0), (0.0, 0.0, 0.0));
        assert_eq!(hot(1.0), (1.0, 1.0, 1.0));
        let (r, g, b) = hot(0.5);
        assert_eq!(r, 1.0);
        assert!(g > 0.0 && g < 1.0);
        assert_eq!(b, 0.0);
    }

    #[test]
    fn test_sampled_steps() {
        assert_eq!(sampled_steps(5, 2), vec![0, 2, 4]);
        assert_eq!(sampled_steps(6, 4), vec![0, 4, 5]);
        assert_eq!(sampled_steps(3, 0), vec![0, 1, 2]);
        assert!(sampled_steps(0, 1).is_empty());
    }

    #[test]
    fn test_projector_fits_canvas() {
        let points = vec![[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [0.0, 5.0, 0.0]];
        let proj = Projector::new([0.0, 0.0, 0.0], &points, (200, 200));
        // 120 usable pixels over 10 Angstrom
        assert!((proj.scale() - 12.0).abs() < 1e-9);
        let (x0, y0) = proj.project([0.0, 0.0, 0.0]);
        let (x1, _) = proj.project([10.0, 0.0, 0.0]);
        let (_, y2) = proj.project([0.0, 5.0, 0.0]);
        assert!((x0 - 40.0).abs() < 1e-9);
        assert!((x1 - 160.0).abs() < 1e-9);
        assert!(y2 < y0);
        assert_eq!(proj.project_vector([1.0, 0.0, 0.0]), (12.0, -0.0));
    }

    #[test]
    fn test_render_trajectories_and_frames() {
        let hist = HistFile::from_source(relax_source(3)).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let path = dir.path().join("traj.png");
        render_trajectories(&hist, &TrajectoryOptions::default(), &path).unwrap();
        assert!(path.exists());

        let frames = render_frames(&hist, &dir.path().join("frames"), &TrajectoryOptions::default()).unwrap();
        assert_eq!(frames.len(), 3);
        assert!(frames[2].ends_with("frame_0002.png"));
        assert!(frames.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_alchemical_mixing_not_drawn() {
        let hist = HistFile::from_source(relax_source(2).dim("npsp", 1)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let frames_dir = dir.path().join("frames");
        let err = render_frames(&hist, &frames_dir, &TrajectoryOptions::default()).unwrap_err();
        assert!(matches!(err, HistError::AlchemicalMixing { .. }));
        assert!(!frames_dir.exists());
    }
}
