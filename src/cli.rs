use abihist::Quantity;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Inspect, export and plot ABINIT HIST files (relaxation and MD trajectories)."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Number of threads used to open several files.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the initial and final structures, stress and relaxation summary.
    Info(FileArgs),
    /// Export the trajectory in XDATCAR format.
    Xdatcar(XdatcarArgs),
    /// Plot lattice, volume, pressure, forces and energy vs step.
    Plot(PlotArgs),
    /// Draw the atomic trajectories in a single picture.
    Traj(TrajArgs),
    /// Write one PNG per step.
    Frames(FramesArgs),
    /// Tabulate the final results of several HIST files.
    Robot(RobotArgs),
    /// Plot one quantity for several HIST files on a grid.
    Gridplot(GridplotArgs),
    /// Write a jupyter notebook for one or more HIST files.
    Notebook(NotebookArgs),
    /// Write the settings file, creating it with the defaults when missing.
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct FileArgs {
    /// Path to the HIST file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct XdatcarArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output path (a temporary file is created when missing)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Keep the atom order of the HIST file instead of grouping by species
    #[arg(long)]
    pub no_group: bool,

    /// Overwrite an existing output file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct PlotArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Figure path; the extension (png, pdf, svg) selects the format
    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,

    /// Plot the energy terms instead of the overview
    #[arg(long)]
    pub energies: bool,
}

#[derive(Args, Debug)]
pub struct TrajArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,

    /// Draw every N-th step
    #[arg(long, value_name = "N")]
    pub sampling: Option<usize>,

    /// Do not draw the final forces
    #[arg(long)]
    pub no_forces: bool,
}

#[derive(Args, Debug)]
pub struct FramesArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct RobotArgs {
    /// HIST files or directories searched recursively
    #[arg(value_name = "PATHS", required = true)]
    pub paths: Vec<PathBuf>,

    /// Also write the table as CSV
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Skip the structure columns
    #[arg(long)]
    pub no_geo: bool,

    /// Skip the space group columns
    #[arg(long)]
    pub no_spglib: bool,

    /// Use absolute paths as row labels
    #[arg(long)]
    pub abspath: bool,
}

#[derive(Args, Debug)]
pub struct GridplotArgs {
    #[arg(value_name = "PATHS", required = true)]
    pub paths: Vec<PathBuf>,

    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,

    /// Quantity to plot: energy, abc, angles, volume, pressure, forces
    #[arg(short, long, default_value = "abc")]
    pub what: Quantity,
}

#[derive(Args, Debug)]
pub struct NotebookArgs {
    #[arg(value_name = "PATHS", required = true)]
    pub paths: Vec<PathBuf>,

    /// Notebook path (a temporary file is created when missing)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Replace the saved settings with the defaults
    #[arg(long)]
    pub reset: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_reset() {
        let cli = Cli::try_parse_from(["abihist", "config", "--reset"]).unwrap();
        assert!(matches!(cli.command, Commands::Config(ConfigArgs { reset: true })));
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_gridplot_quantity() {
        let cli = Cli::try_parse_from(["abihist", "-vv", "gridplot", "a_HIST.nc", "-o", "g.png", "-w", "volume"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Gridplot(args) => assert_eq!(args.what, Quantity::Volume),
            other => panic!("unexpected command {:?}", other),
        }
        assert!(Cli::try_parse_from(["abihist", "gridplot", "a", "-o", "g.png", "-w", "stress"]).is_err());
    }
}
