// src/io/notebook.rs

use serde_json::{json, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Minimal nbformat-4 notebook.
#[derive(Debug, Clone, Default)]
pub struct Notebook {
    cells: Vec<Value>,
}

impl Notebook {
    /// Notebook with the standard import header and an optional markdown title.
    pub fn with_header(title: Option<&str>) -> Self {
        let mut nb = Self::default();
        if let Some(title) = title {
            nb.push_markdown(&format!("# {}", title));
        }
        nb.push_code(
            "from __future__ import print_function, division, unicode_literals, absolute_import\n\n\
             import numpy as np\n\
             import matplotlib.pyplot as plt\n\
             from abipy import abilab",
        );
        nb
    }

    pub fn push_code(&mut self, source: &str) {
        self.cells.push(json!({
            "cell_type": "code",
            "execution_count": null,
            "metadata": {},
            "outputs": [],
            "source": split_source(source),
        }));
    }

    pub fn push_markdown(&mut self, source: &str) {
        self.cells.push(json!({
            "cell_type": "markdown",
            "metadata": {},
            "source": split_source(source),
        }));
    }

    pub fn to_json(&self) -> Value {
        json!({
            "cells": self.cells,
            "metadata": {
                "kernelspec": {
                    "display_name": "Python 3",
                    "language": "python",
                    "name": "python3"
                },
                "language_info": { "name": "python" }
            },
            "nbformat": 4,
            "nbformat_minor": 2,
        })
    }

    /// Writes the notebook to `nbpath`, or to a fresh `.ipynb` in the working
    /// directory when None. Returns the path written.
    pub fn write(&self, nbpath: Option<&Path>) -> Result<PathBuf> {
        let path = match nbpath {
            Some(p) => p.to_path_buf(),
            None => {
                let tmp = tempfile::Builder::new()
                    .prefix("abihist_")
                    .suffix(".ipynb")
                    .tempfile_in(".")?;
                let (_, path) = tmp.keep().map_err(|e| e.error)?;
                path
            }
        };

        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, &self.to_json())?;
        writer.flush()?;
        log::info!("Notebook written to {:?}", path);
        Ok(path)
    }
}

/// Jupyter stores sources as a list of lines keeping their trailing newline.
fn split_source(source: &str) -> Vec<String> {
    let mut lines: Vec<String> = source.split_inclusive('\n').map(String::from).collect();
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Python string literal with single quotes.
pub fn py_str(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}
