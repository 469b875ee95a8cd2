// src/io/mod.rs
pub mod netcdf;
pub mod notebook;
pub mod xdatcar;

use std::io;
use std::path::{Path, PathBuf};

/// True for ABINIT history files: `*_HIST` or `*_HIST.nc`.
pub fn is_hist_file(path: &Path) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name.ends_with("_HIST") || name.ends_with("_HIST.nc"),
        None => false,
    }
}

/// Recursively collects HIST files below `dir`, sorted by path.
pub fn find_hist_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut stack = vec![dir.to_path_buf()];

    while let Some(current) = stack.pop() {
        for entry in std::fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                stack.push(path);
            } else if is_hist_file(&path) {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}
