mod cli;

use abihist::io::find_hist_files;
use abihist::rendering::{self, with_default_extension, TrajectoryOptions};
use abihist::robot::TableOptions;
use abihist::utils::logger;
use abihist::{Config, HistFile, HistRobot, Result};
use clap::Parser;
use cli::{Cli, Commands};
use log::{debug, error, info, warn};
use std::path::PathBuf;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logger::init(logger::level_from_flags(cli.verbose, cli.quiet)) {
        eprintln!("Logger already set: {}", e);
    }

    if let Err(e) = run(cli) {
        error!("Command failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    info!("abihist v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let (config, msg) = Config::load();
    info!("{}", msg);

    if let Some(num_threads) = cli.threads {
        info!("Setting Rayon global thread pool to {} threads.", num_threads);
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
        {
            warn!("Failed to build global thread pool: {}", e);
        }
    }

    match cli.command {
        Commands::Info(args) => {
            let hist = HistFile::open(&args.file)?;
            println!("{}", hist.to_report(cli.verbose, None)?);
        }
        Commands::Xdatcar(args) => {
            let hist = HistFile::open(&args.file)?;
            let groupby = config.xdatcar_groupby_type && !args.no_group;
            let path = hist.write_xdatcar(args.output.as_deref(), groupby, args.force)?;
            println!("XDATCAR written to {}", path.display());
        }
        Commands::Plot(args) => {
            let hist = HistFile::open(&args.file)?;
            let path = with_default_extension(&args.output, config.default_figure_format);
            if args.energies {
                hist.plot_energies(&path, &config.style)?;
            } else {
                hist.plot(&path, &config.style)?;
            }
            println!("Figure written to {}", path.display());
        }
        Commands::Traj(args) => {
            let hist = HistFile::open(&args.file)?;
            let mut opts = TrajectoryOptions::from_config(&config);
            if let Some(n) = args.sampling {
                opts.sampling = n.max(1);
            }
            if args.no_forces {
                opts.with_forces = false;
            }
            let path = with_default_extension(&args.output, config.default_figure_format);
            rendering::render_trajectories(&hist, &opts, &path)?;
            println!("Trajectories written to {}", path.display());
        }
        Commands::Frames(args) => {
            let hist = HistFile::open(&args.file)?;
            let opts = TrajectoryOptions::from_config(&config);
            let frames = rendering::render_frames(&hist, &args.output, &opts)?;
            println!("{} frames written to {}", frames.len(), args.output.display());
        }
        Commands::Robot(args) => {
            let robot = HistRobot::from_files(&expand_paths(&args.paths)?)?;
            let opts = TableOptions {
                with_geo: !args.no_geo,
                with_spglib: !args.no_spglib,
                abspath: args.abspath,
                index: None,
                symprec: config.symprec,
            };
            let df = robot.get_dataframe(&opts, &[])?;
            println!(
                "Table with final structures, pressures in GPa and force stats in eV/Ang:\n\n{}",
                df
            );
            if let Some(csv) = args.csv {
                df.write_csv_path(&csv)?;
            }
        }
        Commands::Gridplot(args) => {
            let mut robot = HistRobot::from_files(&expand_paths(&args.paths)?)?;
            robot.trim_paths();
            let path = with_default_extension(&args.output, config.default_figure_format);
            robot.gridplot(args.what, &path, &config.style)?;
            println!("Figure written to {}", path.display());
        }
        Commands::Notebook(args) => {
            let paths = expand_paths(&args.paths)?;
            let nbpath = if paths.len() == 1 {
                HistFile::open(&paths[0])?.write_notebook(args.output.as_deref())?
            } else {
                HistRobot::from_files(&paths)?.write_notebook(args.output.as_deref())?
            };
            println!("Notebook written to {}", nbpath.display());
        }
        Commands::Config(args) => {
            let config = if args.reset { Config::default() } else { config };
            println!("{}", config.save());
        }
    }

    Ok(())
}

/// Directories are replaced by the HIST files found below them.
fn expand_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let found = find_hist_files(path)?;
            if found.is_empty() {
                warn!("No HIST file found in {:?}", path);
            }
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}
