// src/robot/table.rs

use std::fmt;
use std::io::Write;
use std::path::Path;

use crate::error::Result;

/// A single cell of a [`Table`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => {
                if *v != 0.0 && (v.abs() >= 1e6 || v.abs() < 1e-4) {
                    write!(f, "{:.6e}", v)
                } else {
                    write!(f, "{:.6}", v)
                }
            }
            Value::Text(s) => f.write_str(s),
            Value::Missing => f.write_str("NaN"),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

/// Row-labelled table with named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    index: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Builds a table from ordered `(column, value)` records.
    ///
    /// Columns are taken from the first record; a column absent from a later
    /// record is filled with [`Value::Missing`].
    pub fn from_records(index: Vec<String>, records: Vec<Vec<(String, Value)>>) -> Self {
        let columns: Vec<String> = records
            .first()
            .map(|r| r.iter().map(|(k, _)| k.clone()).collect())
            .unwrap_or_default();

        let rows = records
            .into_iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|col| {
                        record
                            .iter()
                            .find(|(k, _)| k == col)
                            .map(|(_, v)| v.clone())
                            .unwrap_or(Value::Missing)
                    })
                    .collect()
            })
            .collect();

        Self {
            columns,
            index,
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn index(&self) -> &[String] {
        &self.index
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let icol = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(icol)
    }

    pub fn write_csv<W: Write>(&self, out: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(out);

        let mut header = vec![String::new()];
        header.extend(self.columns.iter().cloned());
        wtr.write_record(&header)?;

        for (label, row) in self.index.iter().zip(&self.rows) {
            let mut record = vec![label.clone()];
            record.extend(row.iter().map(|v| match v {
                Value::Missing => String::new(),
                other => other.to_string(),
            }));
            wtr.write_record(&record)?;
        }

        wtr.flush()?;
        Ok(())
    }

    pub fn write_csv_path(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_csv(file)?;
        log::info!("Table with {} rows written to {:?}", self.num_rows(), path);
        Ok(())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|r| r.iter().map(|v| v.to_string()).collect())
            .collect();

        let index_width = self.index.iter().map(|s| s.len()).max().unwrap_or(0);
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                cells
                    .iter()
                    .map(|r| r[i].len())
                    .chain(std::iter::once(c.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:<w$}", "", w = index_width)?;
        for (c, w) in self.columns.iter().zip(&widths) {
            write!(f, "  {:>w$}", c, w = *w)?;
        }
        for (label, row) in self.index.iter().zip(&cells) {
            write!(f, "\n{:<w$}", label, w = index_width)?;
            for (cell, w) in row.iter().zip(&widths) {
                write!(f, "  {:>w$}", cell, w = *w)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_records(
            vec!["run1".to_string(), "run2".to_string()],
            vec![
                vec![
                    ("formula".to_string(), Value::from("Si1 O2")),
                    ("num_steps".to_string(), Value::from(3usize)),
                    ("final_energy".to_string(), Value::from(-10.5)),
                ],
                vec![
                    ("formula".to_string(), Value::from("Si1 O2")),
                    ("final_energy".to_string(), Value::from(-11.25)),
                ],
            ],
        )
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Float(1.5).to_string(), "1.500000");
        assert_eq!(Value::Float(0.0).to_string(), "0.000000");
        assert_eq!(Value::Float(2.5e-6).to_string(), "2.500000e-6");
        assert_eq!(Value::Int(7).to_string(), "7");
        assert_eq!(Value::Missing.to_string(), "NaN");
    }

    #[test]
    fn test_columns_from_first_record() {
        let table = sample();
        assert_eq!(table.columns(), ["formula", "num_steps", "final_energy"]);
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.get(1, "num_steps"), Some(&Value::Missing));
        assert_eq!(table.get(1, "final_energy"), Some(&Value::Float(-11.25)));
        assert_eq!(table.get(0, "volume"), None);
    }

    #[test]
    fn test_display_alignment() {
        let text = sample().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].trim_start().starts_with("formula"));
        assert!(lines[1].starts_with("run1"));
        assert!(lines[2].ends_with("-11.250000"));
        assert_eq!(lines[1].len(), lines[2].len());
    }

    #[test]
    fn test_write_csv() {
        let mut buf = Vec::new();
        sample().write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], ",formula,num_steps,final_energy");
        assert_eq!(lines[1], "run1,Si1 O2,3,-10.500000");
        assert_eq!(lines[2], "run2,Si1 O2,,-11.250000");
    }
}
