// src/hist/mod.rs
pub mod file;
pub mod reader;

pub use file::HistFile;
pub use reader::HistReader;

use crate::units::EnergyUnit;

/// Energy terms per step.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyTerms {
    pub unit: EnergyUnit,
    pub etotals: Vec<f64>,
    pub kinetic_terms: Vec<f64>,
    pub entropies: Vec<f64>,
}

impl EnergyTerms {
    /// (name, values) pairs in a fixed order.
    pub fn items(&self) -> [(&'static str, &[f64]); 3] {
        [
            ("etotals", self.etotals.as_slice()),
            ("kinetic_terms", self.kinetic_terms.as_slice()),
            ("entropies", self.entropies.as_slice()),
        ]
    }
}

#[cfg(test)]
pub(crate) mod testdata {
    use std::collections::HashMap;
    use std::ops::Range;
    use std::path::Path;

    use crate::io::netcdf::MemSource;

    const NATOM: usize = 3;

    /// Variables of a three-atom cell (O, Si, O) relaxing over `nsteps` steps,
    /// in ABINIT units.
    pub fn relax_arrays(nsteps: usize) -> Vec<(&'static str, Vec<f64>)> {
        let mut rprimd = Vec::new();
        let mut xred = Vec::new();
        let mut xcart = Vec::new();
        let mut fcart = Vec::new();
        let mut etotal = Vec::new();
        let mut strten = Vec::new();

        for step in 0..nsteps {
            let a = 10.0 + 0.1 * step as f64;
            rprimd.extend_from_slice(&[a, 0.0, 0.0, 0.0, a, 0.0, 0.0, 0.0, a]);

            let shift = 0.01 * step as f64;
            let frac = [
                [0.0, 0.0, 0.0],
                [0.25 + shift, 0.25, 0.25],
                [0.5, 0.5 - shift, 0.5],
            ];
            for f in frac {
                xred.extend_from_slice(&f);
                xcart.extend(f.iter().map(|x| x * a));
            }

            let scale = 1.0 / (step as f64 + 1.0);
            fcart.extend_from_slice(&[
                0.01 * scale, 0.0, 0.0, //
                0.0, -0.02 * scale, 0.0,
                0.0, 0.0, 0.0,
            ]);

            etotal.push(-10.0 - 0.1 * step as f64);
            let s = -1e-4 * scale;
            strten.extend_from_slice(&[s, s, s, 0.0, 0.0, 1e-6]);
        }

        vec![
            ("rprimd", rprimd),
            ("xred", xred),
            ("xcart", xcart),
            ("fcart", fcart.clone()),
            ("fred", fcart),
            ("etotal", etotal),
            ("ekin", vec![0.0; nsteps]),
            ("entropy", vec![0.0; nsteps]),
            ("strten", strten),
            ("typat", vec![2.0, 1.0, 2.0]),
            ("znucl", vec![14.0, 8.0]),
        ]
    }

    pub fn relax_source(nsteps: usize) -> MemSource {
        relax_source_at("relax/out_HIST.nc", nsteps)
    }

    pub fn relax_source_at(path: &str, nsteps: usize) -> MemSource {
        let src = MemSource::new(path)
            .dim("time", nsteps)
            .dim("natom", NATOM)
            .dim("npsp", 2)
            .dim("ntypat", 2);
        relax_arrays(nsteps)
            .into_iter()
            .fold(src, |src, (name, values)| src.var(name, values))
    }

    /// Writes the relaxation as a 64-bit-offset netCDF HIST file with `time` as the
    /// record dimension.
    pub fn write_hist_file(path: &Path, nsteps: usize) {
        let mut file = netcdf::create_with(path, netcdf::Options::_64BIT_OFFSET).unwrap();
        file.add_unlimited_dimension("time").unwrap();
        let lens = [("natom", NATOM), ("xyz", 3), ("six", 6), ("npsp", 2), ("ntypat", 2)];
        for (name, len) in lens {
            file.add_dimension(name, len).unwrap();
        }

        let dims: [(&str, &[&str]); 11] = [
            ("rprimd", &["time", "xyz", "xyz"]),
            ("xred", &["time", "natom", "xyz"]),
            ("xcart", &["time", "natom", "xyz"]),
            ("fcart", &["time", "natom", "xyz"]),
            ("fred", &["time", "natom", "xyz"]),
            ("etotal", &["time"]),
            ("ekin", &["time"]),
            ("entropy", &["time"]),
            ("strten", &["time", "six"]),
            ("typat", &["natom"]),
            ("znucl", &["npsp"]),
        ];
        let arrays: HashMap<_, _> = relax_arrays(nsteps).into_iter().collect();
        for (name, var_dims) in dims {
            let extents: Vec<Range<usize>> = var_dims
                .iter()
                .map(|&dim| match dim {
                    "time" => 0..nsteps,
                    other => 0..lens.iter().find(|(n, _)| *n == other).unwrap().1,
                })
                .collect();
            let values = &arrays[name];
            if name == "typat" {
                let typat: Vec<i32> = values.iter().map(|&t| t as i32).collect();
                file.add_variable::<i32>(name, var_dims)
                    .unwrap()
                    .put_values(&typat, extents)
                    .unwrap();
            } else {
                file.add_variable::<f64>(name, var_dims)
                    .unwrap()
                    .put_values(values, extents)
                    .unwrap();
            }
        }
        file.close().unwrap();
    }
}
