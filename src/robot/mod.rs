// src/robot/mod.rs
pub mod table;

pub use table::{Table, Value};

use log::{info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::config::PlotStyle;
use crate::error::{HistError, Result};
use crate::hist::HistFile;
use crate::io::find_hist_files;
use crate::io::notebook::{py_str, Notebook};
use crate::physics::symmetry;
use crate::rendering::{self, Quantity};
use crate::utils::linalg;

/// Extra column computed from a file: `(column name, value)`.
pub type RowFunc = dyn Fn(&HistFile) -> (String, Value);

#[derive(Debug, Clone)]
pub struct TableOptions {
    /// Add formula, lattice parameters and volume of the final structure
    pub with_geo: bool,
    /// Add space group symbol and number (needs `with_geo`)
    pub with_spglib: bool,
    /// Use absolute file paths as row labels
    pub abspath: bool,
    /// Explicit row labels, one per file
    pub index: Option<Vec<String>>,
    pub symprec: f64,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            with_geo: true,
            with_spglib: true,
            abspath: false,
            index: None,
            symprec: 1e-3,
        }
    }
}

/// Labelled collection of HIST files analysed together.
#[derive(Debug, Clone, Default)]
pub struct HistRobot {
    entries: Vec<(String, HistFile)>,
}

impl HistRobot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens `paths` in parallel; labels are the paths as given.
    pub fn from_files<P: AsRef<Path> + Sync>(paths: &[P]) -> Result<Self> {
        let labelled: Vec<(String, PathBuf)> = paths
            .iter()
            .map(|p| (p.as_ref().display().to_string(), p.as_ref().to_path_buf()))
            .collect();
        Self::from_labelled_files(labelled)
    }

    /// Opens `(label, path)` pairs in parallel, keeping their order.
    pub fn from_labelled_files(pairs: Vec<(String, PathBuf)>) -> Result<Self> {
        let opened: Vec<(String, HistFile)> = pairs
            .into_par_iter()
            .map(|(label, path)| HistFile::open(&path).map(|hist| (label, hist)))
            .collect::<Result<_>>()?;

        let mut robot = Self::new();
        for (label, hist) in opened {
            robot.push(label, hist)?;
        }
        info!("Robot with {} files", robot.len());
        Ok(robot)
    }

    /// All HIST files found below `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let paths = find_hist_files(dir)?;
        if paths.is_empty() {
            warn!("No HIST file found in {:?}", dir);
        }
        Self::from_files(&paths)
    }

    pub fn add_file<P: AsRef<Path>>(&mut self, label: &str, path: P) -> Result<()> {
        let hist = HistFile::open(path)?;
        self.push(label.to_string(), hist)
    }

    /// Adds an already opened file. Labels must be unique.
    pub fn push(&mut self, label: String, hist: HistFile) -> Result<()> {
        if self.entries.iter().any(|(l, _)| *l == label) {
            return Err(HistError::DuplicateLabel(label));
        }
        self.entries.push((label, hist));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|(l, _)| l.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HistFile)> {
        self.entries.iter().map(|(l, h)| (l.as_str(), h))
    }

    /// Strips the directories shared by all labels.
    pub fn trim_paths(&mut self) {
        let split: Vec<Vec<&str>> = self
            .entries
            .iter()
            .map(|(l, _)| l.split('/').collect())
            .collect();
        let Some(first) = split.first() else {
            return;
        };

        // Never strip the last component (the file name)
        let mut common = split.iter().map(|parts| parts.len() - 1).min().unwrap_or(0);
        for parts in &split[1..] {
            common = common.min(first.iter().zip(parts).take_while(|(a, b)| a == b).count());
        }
        if common == 0 {
            return;
        }

        let trimmed: Vec<String> = split.iter().map(|parts| parts[common..].join("/")).collect();
        for ((label, _), new) in self.entries.iter_mut().zip(trimmed) {
            *label = new;
        }
    }

    /// Quantities accepted by [`HistRobot::gridplot`].
    pub fn what_list() -> &'static [Quantity] {
        &Quantity::ALL
    }

    /// Table with the final structure, energy, pressure (GPa) and force stats
    /// (eV/Ang) of each file.
    pub fn get_dataframe(&self, opts: &TableOptions, funcs: &[&RowFunc]) -> Result<Table> {
        if self.is_empty() {
            return Err(HistError::EmptyRobot);
        }

        let index = match &opts.index {
            Some(index) if index.len() != self.len() => {
                return Err(HistError::Shape {
                    name: "index".to_string(),
                    expected: self.len(),
                    found: index.len(),
                })
            }
            Some(index) => index.clone(),
            None if opts.abspath => self
                .entries
                .iter()
                .map(|(_, h)| absolute(h.path()).display().to_string())
                .collect(),
            None => self.labels().iter().map(|l| l.to_string()).collect(),
        };

        let records = self
            .entries
            .iter()
            .map(|(label, hist)| {
                let mut row: Vec<(String, Value)> = Vec::new();
                if opts.with_geo {
                    geometry_columns(&mut row, label, hist, opts);
                }

                let fstats = hist.final_force_stats();
                row.push(("num_steps".into(), hist.num_steps().into()));
                row.push(("final_energy".into(), hist.final_energy().into()));
                row.push(("final_pressure".into(), hist.final_pressure().into()));
                row.push(("final_min_force".into(), fstats.min.into()));
                row.push(("final_max_force".into(), fstats.max.into()));

                row.extend(funcs.iter().map(|f| f(hist)));
                row
            })
            .collect();

        Ok(Table::from_records(index, records))
    }

    pub fn to_report(&self, verbose: u8) -> Result<String> {
        let mut lines = Vec::new();
        if verbose > 0 {
            for (label, hist) in self.iter() {
                lines.push(format!("{}: {}", label, hist.relpath()));
            }
            lines.push(String::new());
        }
        let df = self.get_dataframe(&TableOptions::default(), &[])?;
        lines.push(format!(
            "Table with final structures, pressures in GPa and force stats in eV/Ang:\n\n{}",
            df
        ));
        Ok(lines.join("\n"))
    }

    /// One panel per file showing `what`.
    pub fn gridplot(&self, what: Quantity, path: &Path, style: &PlotStyle) -> Result<()> {
        if self.is_empty() {
            return Err(HistError::EmptyRobot);
        }
        let entries: Vec<(&str, &HistFile)> = self.iter().collect();
        rendering::gridplot(&entries, what, path, style)
    }

    pub fn write_notebook(&self, nbpath: Option<&Path>) -> Result<PathBuf> {
        let args: Vec<String> = self
            .iter()
            .map(|(label, hist)| {
                format!(
                    "({}, {})",
                    py_str(label),
                    py_str(&hist.path().display().to_string())
                )
            })
            .collect();

        let mut nb = Notebook::with_header(None);
        nb.push_code(&format!(
            "robot = abilab.HistRobot(*[{}])\nrobot.trim_paths()\nrobot",
            args.join(", ")
        ));
        nb.push_code("df = robot.get_dataframe()\ndisplay(df)");
        nb.write(nbpath)
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn geometry_columns(row: &mut Vec<(String, Value)>, label: &str, hist: &HistFile, opts: &TableOptions) {
    // Cell columns only need the final lattice
    let lattice = &hist.lattices()[hist.num_steps() - 1];
    let [a, b, c] = linalg::lattice_abc(lattice);
    let [alpha, beta, gamma] = linalg::lattice_angles(lattice);

    let structure = match hist.final_structure() {
        Ok(s) => Some(s),
        Err(e) => {
            warn!("{}: {}", label, e);
            None
        }
    };

    let formula = structure.map_or(Value::Missing, |s| s.formula().into());
    row.push(("formula".into(), formula));
    row.push(("natom".into(), hist.natom().into()));
    for (name, v) in [
        ("a", a),
        ("b", b),
        ("c", c),
        ("alpha", alpha),
        ("beta", beta),
        ("gamma", gamma),
        ("volume", linalg::cell_volume(lattice)),
    ] {
        row.push((name.into(), v.into()));
    }

    if opts.with_spglib {
        let (symbol, number) = match structure.map(|s| symmetry::analyze(s, opts.symprec)) {
            Some(Ok(info)) => (info.symbol.into(), info.number.into()),
            Some(Err(e)) => {
                warn!("{}: {}", label, e);
                (Value::Missing, Value::Missing)
            }
            None => (Value::Missing, Value::Missing),
        };
        row.push(("spg_symbol".into(), symbol));
        row.push(("spg_number".into(), number));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hist::testdata::{relax_source_at, write_hist_file};

    fn robot() -> HistRobot {
        let mut robot = HistRobot::new();
        for (path, nsteps) in [("calc/run1/out_HIST.nc", 3), ("calc/run2/out_HIST.nc", 5)] {
            let hist = HistFile::from_source(relax_source_at(path, nsteps)).unwrap();
            robot.push(path.to_string(), hist).unwrap();
        }
        robot
    }

    #[test]
    fn test_labels_and_duplicates() {
        let mut robot = robot();
        assert_eq!(robot.len(), 2);
        assert_eq!(robot.labels(), ["calc/run1/out_HIST.nc", "calc/run2/out_HIST.nc"]);

        let hist = HistFile::from_source(relax_source_at("x_HIST", 1)).unwrap();
        let err = robot.push("calc/run1/out_HIST.nc".to_string(), hist).unwrap_err();
        assert!(matches!(err, HistError::DuplicateLabel(_)));
    }

    #[test]
    fn test_from_files_keeps_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for (name, nsteps) in [("c_HIST.nc", 2), ("a_HIST.nc", 4), ("b_HIST.nc", 3)] {
            let path = dir.path().join(name);
            write_hist_file(&path, nsteps);
            paths.push(path);
        }

        let robot = HistRobot::from_files(&paths).unwrap();
        let expected: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        assert_eq!(robot.labels(), expected);
        let steps: Vec<usize> = robot.iter().map(|(_, h)| h.num_steps()).collect();
        assert_eq!(steps, [2, 4, 3]);
    }

    #[test]
    fn test_from_dir_and_add_file() {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["run2", "run1"] {
            std::fs::create_dir(dir.path().join(sub)).unwrap();
            write_hist_file(&dir.path().join(sub).join("out_HIST.nc"), 2);
        }
        std::fs::write(dir.path().join("run1").join("out_GSR.nc"), b"").unwrap();

        let mut robot = HistRobot::from_dir(dir.path()).unwrap();
        assert_eq!(robot.len(), 2);
        assert!(robot.labels()[0].ends_with("run1/out_HIST.nc"));
        assert!(robot.labels()[1].ends_with("run2/out_HIST.nc"));

        let extra = dir.path().join("extra_HIST.nc");
        write_hist_file(&extra, 5);
        robot.add_file("extra", &extra).unwrap();
        assert_eq!(robot.labels()[2], "extra");
        assert!(matches!(
            robot.add_file("extra", &extra),
            Err(HistError::DuplicateLabel(_))
        ));

        robot.trim_paths();
        let df = robot.get_dataframe(&TableOptions::default(), &[]).unwrap();
        assert_eq!(df.get(2, "num_steps"), Some(&Value::Int(5)));
    }

    #[test]
    fn test_from_files_missing_file() {
        let err = HistRobot::from_files(&["/nonexistent/out_HIST.nc"]).unwrap_err();
        assert!(matches!(err, HistError::Netcdf { .. }));
    }

    #[test]
    fn test_alchemical_file_keeps_row() {
        let mut robot = robot();
        let hist = HistFile::from_source(relax_source_at("alch/out_HIST.nc", 2).dim("npsp", 1)).unwrap();
        robot.push("alch/out_HIST.nc".to_string(), hist).unwrap();

        let df = robot.get_dataframe(&TableOptions::default(), &[]).unwrap();
        assert_eq!(df.num_rows(), 3);
        assert_eq!(df.get(2, "formula"), Some(&Value::Missing));
        assert_eq!(df.get(2, "spg_number"), Some(&Value::Missing));
        assert_eq!(df.get(2, "natom"), Some(&Value::Int(3)));
        assert!(matches!(df.get(2, "volume"), Some(Value::Float(v)) if *v > 0.0));
        assert!(matches!(df.get(2, "final_energy"), Some(Value::Float(_))));
    }

    #[test]
    fn test_trim_paths() {
        let mut robot = robot();
        robot.trim_paths();
        assert_eq!(robot.labels(), ["run1/out_HIST.nc", "run2/out_HIST.nc"]);

        let mut single = HistRobot::new();
        let hist = HistFile::from_source(relax_source_at("a/b/out_HIST", 1)).unwrap();
        single.push("a/b/out_HIST".to_string(), hist).unwrap();
        single.trim_paths();
        assert_eq!(single.labels(), ["out_HIST"]);
    }

    #[test]
    fn test_dataframe_columns() {
        let robot = robot();
        let opts = TableOptions {
            with_spglib: false,
            ..TableOptions::default()
        };
        let df = robot.get_dataframe(&opts, &[]).unwrap();
        assert_eq!(df.num_rows(), 2);
        assert_eq!(
            df.columns(),
            [
                "formula",
                "natom",
                "a",
                "b",
                "c",
                "alpha",
                "beta",
                "gamma",
                "volume",
                "num_steps",
                "final_energy",
                "final_pressure",
                "final_min_force",
                "final_max_force",
            ]
        );
        assert_eq!(df.get(1, "num_steps"), Some(&Value::Int(5)));
        assert_eq!(df.get(0, "formula"), Some(&Value::Text("Si1 O2".to_string())));
        assert_eq!(df.index()[0], "calc/run1/out_HIST.nc");
    }

    #[test]
    fn test_dataframe_without_geo_with_funcs() {
        let robot = robot();
        let natom: &RowFunc = &|h: &HistFile| ("natom_x2".to_string(), Value::from(2 * h.natom()));
        let opts = TableOptions {
            with_geo: false,
            index: Some(vec!["first".into(), "second".into()]),
            ..TableOptions::default()
        };
        let df = robot.get_dataframe(&opts, &[natom]).unwrap();
        assert_eq!(df.columns()[0], "num_steps");
        assert_eq!(df.columns().last().unwrap(), "natom_x2");
        assert_eq!(df.get(0, "natom_x2"), Some(&Value::Int(6)));
        assert_eq!(df.index(), ["first", "second"]);
    }

    #[test]
    fn test_dataframe_errors() {
        assert!(matches!(
            HistRobot::new().get_dataframe(&TableOptions::default(), &[]),
            Err(HistError::EmptyRobot)
        ));
        let opts = TableOptions {
            index: Some(vec!["only-one".into()]),
            ..TableOptions::default()
        };
        assert!(matches!(
            robot().get_dataframe(&opts, &[]),
            Err(HistError::Shape { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn test_spglib_columns() {
        let df = robot().get_dataframe(&TableOptions::default(), &[]).unwrap();
        let cols = df.columns();
        let isym = cols.iter().position(|c| c == "spg_symbol").unwrap();
        assert_eq!(cols[isym + 1], "spg_number");
        assert_eq!(cols[isym + 2], "num_steps");
    }

    #[test]
    fn test_report_and_notebook() {
        let robot = robot();
        let text = robot.to_report(1).unwrap();
        assert!(text.contains("Table with final structures, pressures in GPa"));
        assert!(text.contains("calc/run2/out_HIST.nc"));

        let dir = tempfile::tempdir().unwrap();
        let nbpath = dir.path().join("robot.ipynb");
        robot.write_notebook(Some(&nbpath)).unwrap();
        let nb: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&nbpath).unwrap()).unwrap();
        let cells = nb["cells"].as_array().unwrap();
        let robot_cell = cells
            .iter()
            .map(|c| c["source"].as_array().unwrap().iter().filter_map(|l| l.as_str()).collect::<String>())
            .find(|src| src.starts_with("robot = abilab.HistRobot"))
            .unwrap();
        assert!(robot_cell.contains("('calc/run1/out_HIST.nc', 'calc/run1/out_HIST.nc')"));
    }

    #[test]
    fn test_what_list() {
        let names: Vec<&str> = HistRobot::what_list().iter().map(|q| q.name()).collect();
        assert_eq!(names, ["energy", "abc", "angles", "volume", "pressure", "forces"]);
    }
}
