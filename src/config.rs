// src/config.rs

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FigureFormat {
  Png,
  Pdf,
  Svg,
}

impl FigureFormat {
  /// Format from the file extension, None if missing or unknown.
  pub fn from_path(path: &Path) -> Option<Self> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
      "png" => Some(Self::Png),
      "pdf" => Some(Self::Pdf),
      "svg" => Some(Self::Svg),
      _ => None,
    }
  }

  pub fn extension(self) -> &'static str {
    match self {
      Self::Png => "png",
      Self::Pdf => "pdf",
      Self::Svg => "svg",
    }
  }
}

// --- PlotStyle ---

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlotStyle {
  /// Size of a single panel in pixels (points for pdf/svg)
  pub panel_width: u32,
  pub panel_height: u32,
  pub marker_size: u32,
  pub font_size: u32,
  pub font_family: String,
}

impl Default for PlotStyle {
  fn default() -> Self {
    Self {
      panel_width: 480,
      panel_height: 320,
      marker_size: 3,
      font_size: 14,
      font_family: "sans-serif".to_string(),
    }
  }
}

// --- Main Config Struct ---

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
  pub default_figure_format: FigureFormat,

  /// Group atoms by species when writing XDATCAR
  #[serde(default = "default_true")]
  pub xdatcar_groupby_type: bool,

  /// Tolerance (Angstrom) for the space group search
  #[serde(default = "default_symprec")]
  pub symprec: f64,

  /// Stride over steps when drawing atomic trajectories
  #[serde(default = "default_sampling")]
  pub trajectory_sampling: usize,

  #[serde(default = "default_true")]
  pub trajectory_forces: bool,

  #[serde(default)]
  pub style: PlotStyle,
}

fn default_true() -> bool {
  true
}

fn default_symprec() -> f64 {
  1e-3
}

fn default_sampling() -> usize {
  1
}

impl Default for Config {
  fn default() -> Self {
    Self {
      default_figure_format: FigureFormat::Png,
      xdatcar_groupby_type: true,
      symprec: default_symprec(),
      trajectory_sampling: 1,
      trajectory_forces: true,
      style: PlotStyle::default(),
    }
  }
}

impl Config {
  /// Loads config from standard OS location (e.g., ~/.config/abihist/settings.json)
  pub fn load() -> (Self, String) {
    Self::load_from(&Self::get_path())
  }

  pub fn load_from(path: &Path) -> (Self, String) {
    if path.exists() {
      match File::open(path) {
        Ok(file) => {
          let reader = BufReader::new(file);
          match serde_json::from_reader(reader) {
            Ok(cfg) => (cfg, format!("Config loaded from {:?}", path)),
            Err(e) => (Self::default(), format!("Error parsing config: {}", e)),
          }
        }
        Err(e) => (Self::default(), format!("Error opening config: {}", e)),
      }
    } else {
      (
        Self::default(),
        "No config found. Using defaults.".to_string(),
      )
    }
  }

  /// Saves config to standard OS location
  pub fn save(&self) -> String {
    self.save_to(&Self::get_path())
  }

  pub fn save_to(&self, path: &Path) -> String {
    if let Some(parent) = path.parent() {
      let _ = fs::create_dir_all(parent);
    }

    match File::create(path) {
      Ok(file) => {
        let writer = BufWriter::new(file);
        match serde_json::to_writer_pretty(writer, self) {
          Ok(_) => format!("Config saved to {:?}", path),
          Err(e) => format!("Failed to save config: {}", e),
        }
      }
      Err(e) => format!("Could not create config file: {}", e),
    }
  }

  pub fn get_path() -> PathBuf {
    if let Some(proj) = ProjectDirs::from("org", "abinit", "abihist") {
      proj.config_dir().join("settings.json")
    } else {
      PathBuf::from("settings.json")
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_figure_format() {
    assert_eq!(FigureFormat::from_path(Path::new("a/plot.PNG")), Some(FigureFormat::Png));
    assert_eq!(FigureFormat::from_path(Path::new("plot.svg")), Some(FigureFormat::Svg));
    assert_eq!(FigureFormat::from_path(Path::new("plot.jpeg")), None);
    assert_eq!(FigureFormat::from_path(Path::new("plot")), None);
  }

  #[test]
  fn test_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf").join("settings.json");

    let mut cfg = Config::default();
    cfg.symprec = 0.1;
    cfg.default_figure_format = FigureFormat::Pdf;
    let msg = cfg.save_to(&path);
    assert!(msg.starts_with("Config saved"));

    let (loaded, msg) = Config::load_from(&path);
    assert!(msg.starts_with("Config loaded"));
    assert_eq!(loaded.symprec, 0.1);
    assert_eq!(loaded.default_figure_format, FigureFormat::Pdf);
  }

  #[test]
  fn test_partial_config_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{ "default_figure_format": "svg" }"#).unwrap();

    let (cfg, _) = Config::load_from(&path);
    assert_eq!(cfg.default_figure_format, FigureFormat::Svg);
    assert!(cfg.xdatcar_groupby_type);
    assert_eq!(cfg.trajectory_sampling, 1);
    assert_eq!(cfg.style.panel_width, 480);
  }

  #[test]
  fn test_missing_or_broken_config() {
    let (cfg, msg) = Config::load_from(Path::new("/no/such/settings.json"));
    assert_eq!(msg, "No config found. Using defaults.");
    assert_eq!(cfg.symprec, 1e-3);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "not json").unwrap();
    let (_, msg) = Config::load_from(&path);
    assert!(msg.starts_with("Error parsing config"));
  }
}
