use crate::core::error::ParseError;
use crate::core::structure::{Atom, Lattice, StructureDescriptor};
use log::debug;
use nalgebra::Vector3;
use std::fs;
use std::path::Path;

struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Lines<'a> {
    fn next(&mut self, what: &str) -> Result<(usize, &'a str), ParseError> {
        self.inner
            .next()
            .map(|(i, l)| (i + 1, l.trim()))
            .ok_or_else(|| ParseError::Malformed(format!("POSCAR ended before {}", what)))
    }
}

fn parse_float(value: &str, line: usize) -> Result<f64, ParseError> {
    value.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
        value: value.to_string(),
        line,
    })
}

fn parse_vec3(text: &str, line: usize) -> Result<Vector3<f64>, ParseError> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(ParseError::Malformed(format!("expected three numbers on line {}", line)));
    }
    Ok(Vector3::new(
        parse_float(parts[0], line)?,
        parse_float(parts[1], line)?,
        parse_float(parts[2], line)?,
    ))
}

/// Parses VASP 5 POSCAR/CONTCAR text.
///
/// A negative scale factor is the target cell volume. Selective-dynamics flags
/// on coordinate lines are ignored; Cartesian positions are converted to
/// fractional ones.
pub fn parse_poscar_str(contents: &str) -> Result<StructureDescriptor, ParseError> {
    let mut lines = Lines { inner: contents.lines().enumerate() };

    let _ = lines.next("the comment line")?;

    let (n, scale_line) = lines.next("the scale factor")?;
    let scale = parse_float(scale_line.split_whitespace().next().unwrap_or(""), n)?;

    let mut rows = [[0.0; 3]; 3];
    for row in rows.iter_mut() {
        let (n, text) = lines.next("the lattice vectors")?;
        let v = parse_vec3(text, n)?;
        *row = [v.x, v.y, v.z];
    }
    let unscaled = Lattice::from_rows(rows)?;
    let factor = if scale < 0.0 {
        (scale.abs() / unscaled.volume()).cbrt()
    } else {
        scale
    };
    let lattice = Lattice::new(unscaled.matrix * factor)?;

    let (n, species_line) = lines.next("the species line")?;
    let species: Vec<&str> = species_line.split_whitespace().collect();
    if species.first().map_or(true, |s| s.parse::<f64>().is_ok()) {
        return Err(ParseError::Malformed(format!(
            "line {}: POSCAR without a species line is not supported",
            n
        )));
    }

    let (n, counts_line) = lines.next("the atom counts")?;
    let counts = counts_line
        .split_whitespace()
        .map(|c| {
            c.parse::<usize>().map_err(|_| ParseError::InvalidNumber {
                value: c.to_string(),
                line: n,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if counts.len() != species.len() {
        return Err(ParseError::Malformed(format!(
            "{} species but {} counts",
            species.len(),
            counts.len()
        )));
    }

    let (_, mut mode_line) = lines.next("the coordinate mode")?;
    if mode_line.to_ascii_lowercase().starts_with('s') {
        mode_line = lines.next("the coordinate mode")?.1;
    }
    let is_direct = mode_line.to_ascii_lowercase().starts_with('d');

    let mut atoms = Vec::with_capacity(counts.iter().sum());
    for (label, &count) in species.iter().zip(&counts) {
        for _ in 0..count {
            let (n, text) = lines.next("all atom positions")?;
            let raw = parse_vec3(text, n)?;
            let fractional_coords = if is_direct {
                raw
            } else {
                lattice
                    .to_fractional(&(raw * factor))
                    .ok_or(ParseError::DegenerateLattice)?
            };
            atoms.push(Atom {
                label: label.to_string(),
                fractional_coords,
            });
        }
    }

    debug!("POSCAR: {} atoms of {} species", atoms.len(), species.len());
    StructureDescriptor::new(lattice, atoms)
}

pub fn from_poscar(path: &Path) -> Result<StructureDescriptor, ParseError> {
    let contents = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_poscar_str(&contents)
}
