// src/utils/report.rs

use crate::model::structure::Structure;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Centers `text` in a line of `mark` characters.
pub fn marquee(text: &str, mark: char) -> String {
    let width = 80usize;
    if text.is_empty() {
        return std::iter::repeat(mark).take(width).collect();
    }
    let label = format!(" {} ", text);
    let n = label.chars().count();
    if n >= width {
        return label;
    }
    let left = (width - n) / 2;
    let right = width - n - left;
    format!(
        "{}{}{}",
        mark.to_string().repeat(left),
        label,
        mark.to_string().repeat(right)
    )
}

/// Text summary of a structure: cell parameters, then the sites.
pub fn structure_summary(structure: &Structure, verbose: u8, title: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(title) = title {
        out.push_str(&marquee(title, '='));
        out.push('\n');
    }

    let [a, b, c] = structure.abc();
    let [alpha, beta, gamma] = structure.angles();
    out.push_str(&format!("Full Formula ({})\n", structure.formula()));
    out.push_str(&format!("abc   : {:>12.6} {:>12.6} {:>12.6}\n", a, b, c));
    out.push_str(&format!("angles: {:>12.6} {:>12.6} {:>12.6}\n", alpha, beta, gamma));
    out.push_str(&format!("volume: {:>12.6}\n", structure.volume()));
    out.push_str(&format!("Sites ({})\n", structure.num_sites()));

    // Long cells are cut unless verbose
    let max_sites = if verbose > 0 { usize::MAX } else { 20 };
    for (i, atom) in structure.atoms.iter().take(max_sites).enumerate() {
        let f = atom.frac_coords;
        out.push_str(&format!(
            "{:<4} {:<4} {:>10.6} {:>10.6} {:>10.6}\n",
            i, atom.element, f[0], f[1], f[2]
        ));
    }
    if structure.atoms.len() > max_sites {
        out.push_str(&format!("... and {} more atoms.\n", structure.atoms.len() - max_sites));
    }

    out
}

/// Size and modification time of `path`, or a note when it is not on disk.
pub fn filestat(path: &Path) -> String {
    match std::fs::metadata(path) {
        Ok(meta) => {
            let mtime = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            format!(
                "Name: {}\nDirectory: {}\nSize: {} bytes\nModified (unix time): {}",
                path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
                path.parent().map(|p| p.display().to_string()).unwrap_or_default(),
                meta.len(),
                mtime
            )
        }
        Err(_) => format!("Name: {}\n(not on disk)", path.display()),
    }
}
