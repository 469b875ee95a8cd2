// src/io/xdatcar.rs

use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::error::{HistError, Result};

/// Trajectory in the VASP XDATCAR layout (fixed cell, reduced coordinates).
#[derive(Debug, Clone, PartialEq)]
pub struct Xdatcar {
    pub comment: String,
    pub scale: f64,
    pub lattice: [[f64; 3]; 3],
    pub species: Vec<String>,
    pub counts: Vec<usize>,
    /// One block of reduced coordinates per step
    pub configurations: Vec<Vec<[f64; 3]>>,
}

impl Xdatcar {
    pub fn natom(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn write<W: Write>(&self, out: &mut W) -> io::Result<()> {
        // 1. Header: comment line + scaling factor
        writeln!(out, " {}", self.comment)?;
        writeln!(out, "{}", format_scale(self.scale))?;

        // 2. Lattice Vectors
        for vec in &self.lattice {
            writeln!(out, "{:.12} {:.12} {:.12}", vec[0], vec[1], vec[2])?;
        }

        // 3. Species and counts
        writeln!(out, "{}", self.species.join(" "))?;
        let counts: Vec<String> = self.counts.iter().map(|c| c.to_string()).collect();
        writeln!(out, "{}", counts.join(" "))?;

        // 4. One block per step
        for (step, frac_coords) in self.configurations.iter().enumerate() {
            writeln!(out, "Direct configuration= {}", step + 1)?;
            for fs in frac_coords {
                writeln!(out, "{:.12} {:.12} {:.12}", fs[0], fs[1], fs[2])?;
            }
        }
        Ok(())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::parse(io::BufReader::new(file))
    }

    pub fn parse<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines().enumerate();
        let mut next_line = |what: &str| -> Result<(usize, String)> {
            match lines.next() {
                Some((i, Ok(line))) => Ok((i + 1, line)),
                Some((_, Err(e))) => Err(HistError::Io(e)),
                None => Err(HistError::Xdatcar {
                    line: 0,
                    message: format!("unexpected end of file, missing {}", what),
                }),
            }
        };

        let (_, comment) = next_line("comment")?;

        let (ln, scale_line) = next_line("scale")?;
        let scale: f64 = scale_line.trim().parse().map_err(|_| HistError::Xdatcar {
            line: ln,
            message: "invalid scale factor".to_string(),
        })?;

        let mut lattice = [[0.0; 3]; 3];
        for row in lattice.iter_mut() {
            let (ln, line) = next_line("lattice vector")?;
            *row = parse_triplet(&line, ln)?;
        }

        let (_, species_line) = next_line("species")?;
        let species: Vec<String> = species_line.split_whitespace().map(String::from).collect();

        let (ln, counts_line) = next_line("counts")?;
        let counts = counts_line
            .split_whitespace()
            .map(|x| x.parse::<usize>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| HistError::Xdatcar {
                line: ln,
                message: "invalid atom counts".to_string(),
            })?;
        if counts.len() != species.len() {
            return Err(HistError::Xdatcar {
                line: ln,
                message: format!("{} species but {} counts", species.len(), counts.len()),
            });
        }
        let natom: usize = counts.iter().sum();

        let mut configurations = Vec::new();
        loop {
            let header = match lines.next() {
                None => break,
                Some((_, Err(e))) => return Err(HistError::Io(e)),
                Some((i, Ok(line))) => (i + 1, line),
            };
            if header.1.trim().is_empty() {
                continue;
            }
            if !header.1.trim_start().to_lowercase().starts_with("direct") {
                return Err(HistError::Xdatcar {
                    line: header.0,
                    message: "expected `Direct configuration=`".to_string(),
                });
            }

            let mut frame = Vec::with_capacity(natom);
            for _ in 0..natom {
                let (ln, line) = match lines.next() {
                    Some((i, Ok(line))) => (i + 1, line),
                    Some((_, Err(e))) => return Err(HistError::Io(e)),
                    None => {
                        return Err(HistError::Xdatcar {
                            line: header.0,
                            message: "truncated configuration".to_string(),
                        })
                    }
                };
                frame.push(parse_triplet(&line, ln)?);
            }
            configurations.push(frame);
        }

        Ok(Self {
            comment: comment.trim().to_string(),
            scale,
            lattice,
            species,
            counts,
            configurations,
        })
    }
}

fn format_scale(scale: f64) -> String {
    if scale.fract() == 0.0 {
        format!("{:.1}", scale)
    } else {
        scale.to_string()
    }
}

fn parse_triplet(line: &str, ln: usize) -> Result<[f64; 3]> {
    let parts: Vec<f64> = line
        .split_whitespace()
        .take(3)
        .map(|x| x.parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| HistError::Xdatcar {
            line: ln,
            message: format!("invalid number in `{}`", line.trim()),
        })?;
    if parts.len() < 3 {
        return Err(HistError::Xdatcar {
            line: ln,
            message: "expected three numbers".to_string(),
        });
    }
    Ok([parts[0], parts[1], parts[2]])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Xdatcar {
        Xdatcar {
            comment: "Si1 O2".to_string(),
            scale: 1.0,
            lattice: [[5.0, 0.0, 0.0], [0.0, 5.0, 0.0], [0.0, 0.0, 5.0]],
            species: vec!["Si".to_string(), "O".to_string()],
            counts: vec![1, 2],
            configurations: vec![
                vec![[0.0, 0.0, 0.0], [0.25, 0.25, 0.25], [0.75, 0.75, 0.75]],
                vec![[0.01, 0.0, 0.0], [0.26, 0.25, 0.25], [0.74, 0.75, 0.75]],
            ],
        }
    }

    #[test]
    fn test_layout() {
        let mut buf = Vec::new();
        sample().write(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], " Si1 O2");
        assert_eq!(lines[1], "1.0");
        assert_eq!(lines[2], "5.000000000000 0.000000000000 0.000000000000");
        assert_eq!(lines[5], "Si O");
        assert_eq!(lines[6], "1 2");
        assert_eq!(lines[7], "Direct configuration= 1");
        assert_eq!(lines[11], "Direct configuration= 2");
        assert_eq!(lines[12], "0.010000000000 0.000000000000 0.000000000000");
        assert_eq!(lines.len(), 15);
    }

    #[test]
    fn test_parse_written() {
        let mut buf = Vec::new();
        sample().write(&mut buf).unwrap();
        let parsed = Xdatcar::parse(io::Cursor::new(buf)).unwrap();
        assert_eq!(parsed, sample());
        assert_eq!(parsed.natom(), 3);
    }

    #[test]
    fn test_truncated_configuration() {
        let text = "x\n1.0\n1 0 0\n0 1 0\n0 0 1\nSi\n2\nDirect configuration= 1\n0 0 0\n";
        let err = Xdatcar::parse(io::Cursor::new(text)).unwrap_err();
        assert!(matches!(err, HistError::Xdatcar { .. }));
    }

    #[test]
    fn test_bad_counts() {
        let text = "x\n1.0\n1 0 0\n0 1 0\n0 0 1\nSi O\n2\n";
        let err = Xdatcar::parse(io::Cursor::new(text)).unwrap_err();
        assert!(matches!(err, HistError::Xdatcar { line: 7, .. }));
    }
}
