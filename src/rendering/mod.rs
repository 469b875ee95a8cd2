pub mod charts;
pub mod export;
pub mod quantity;
pub mod trajectory;

pub use charts::{gridplot, plot, plot_ax, plot_energies};
pub use export::{render_cairo, render_chart, with_default_extension};
pub use quantity::{quantity_series, Quantity, Series};
pub use trajectory::{render_frames, render_trajectories, TrajectoryOptions};
