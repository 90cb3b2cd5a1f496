use crate::chemistry::elements::symbol_from_label;
use crate::core::error::ParseError;
use crate::core::structure::{Atom, Lattice, StructureDescriptor};
use crate::io::symmetry::{expand_sites, SymmetryOperation};
use log::{debug, warn};
use nalgebra::Vector3;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const SYMMETRY_TAGS: [&str; 2] = ["_symmetry_equiv_pos_as_xyz", "_space_group_symop_operation_xyz"];

/// Parses a float value from a CIF string, removing uncertainty parentheses.
/// Example: "1.234(5)" -> 1.234
fn parse_cif_float(token: &Token) -> Result<f64, ParseError> {
    let clean = token.value.split('(').next().unwrap_or(token.value.as_str());
    clean.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
        value: token.value.clone(),
        line: token.line,
    })
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    value: String,
    line: usize,
    quoted: bool,
}

impl Token {
    fn is_keyword(&self, keyword: &str) -> bool {
        !self.quoted && self.value.to_ascii_lowercase().starts_with(keyword)
    }

    fn is_tag(&self) -> bool {
        !self.quoted && self.value.starts_with('_')
    }

    fn is_block_boundary(&self) -> bool {
        self.is_tag() || self.is_keyword("loop_") || self.is_keyword("data_")
    }
}

/// Splits CIF text into tokens. Quoted strings and `;` text fields are single tokens.
fn tokenize(contents: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lines = contents.lines().enumerate().map(|(i, l)| (i + 1, l));

    while let Some((number, line)) = lines.next() {
        if let Some(first) = line.strip_prefix(';') {
            let mut text = first.to_string();
            for (_, next) in lines.by_ref() {
                if next.starts_with(';') {
                    break;
                }
                text.push('\n');
                text.push_str(next);
            }
            tokens.push(Token { value: text, line: number, quoted: true });
            continue;
        }

        let chars: Vec<char> = line.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if c.is_whitespace() {
                i += 1;
            } else if c == '#' {
                break;
            } else if c == '\'' || c == '"' {
                // a quote only closes when followed by whitespace or end of line
                let start = i + 1;
                let mut end = start;
                while end < chars.len()
                    && !(chars[end] == c && chars.get(end + 1).map_or(true, |n| n.is_whitespace()))
                {
                    end += 1;
                }
                tokens.push(Token {
                    value: chars[start..end.min(chars.len())].iter().collect(),
                    line: number,
                    quoted: true,
                });
                i = end + 1;
            } else {
                let start = i;
                while i < chars.len() && !chars[i].is_whitespace() {
                    i += 1;
                }
                tokens.push(Token {
                    value: chars[start..i].iter().collect(),
                    line: number,
                    quoted: false,
                });
            }
        }
    }
    tokens
}

struct Loop {
    headers: Vec<String>,
    values: Vec<Token>,
}

impl Loop {
    fn column(&self, tag: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == tag)
    }

    fn rows(&self) -> impl Iterator<Item = &[Token]> {
        self.values.chunks_exact(self.headers.len().max(1))
    }
}

/// Data items and loops of the first data block.
struct CifBlock {
    items: HashMap<String, Token>,
    loops: Vec<Loop>,
}

fn read_block(tokens: &[Token]) -> CifBlock {
    let mut items = HashMap::new();
    let mut loops = Vec::new();
    let mut seen_data = false;

    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];

        if token.is_keyword("data_") {
            // only the first structure in a multi-block file is read
            if seen_data {
                break;
            }
            seen_data = true;
            i += 1;
        } else if token.is_keyword("loop_") {
            i += 1;

            let mut headers = Vec::new();
            while i < tokens.len() && tokens[i].is_tag() {
                headers.push(tokens[i].value.to_ascii_lowercase());
                i += 1;
            }

            let mut values = Vec::new();
            while i < tokens.len() && !tokens[i].is_block_boundary() {
                values.push(tokens[i].clone());
                i += 1;
            }

            if !headers.is_empty() && values.len() % headers.len() != 0 {
                warn!(
                    "loop starting with '{}' has an incomplete trailing row; ignoring it",
                    headers[0]
                );
            }
            loops.push(Loop { headers, values });
        } else if token.is_tag() {
            if let Some(value) = tokens.get(i + 1).filter(|v| !v.is_block_boundary()) {
                items.insert(token.value.to_ascii_lowercase(), value.clone());
                i += 2;
            } else {
                i += 1;
            }
        } else {
            i += 1;
        }
    }

    CifBlock { items, loops }
}

fn read_lattice(block: &CifBlock) -> Result<Lattice, ParseError> {
    let get_param = |key: &str| -> Result<f64, ParseError> {
        let token = block
            .items
            .get(key)
            .ok_or_else(|| ParseError::MissingTag(key.to_string()))?;
        parse_cif_float(token)
    };

    let a = get_param("_cell_length_a")?;
    let b = get_param("_cell_length_b")?;
    let c = get_param("_cell_length_c")?;
    let alpha = get_param("_cell_angle_alpha")?;
    let beta = get_param("_cell_angle_beta")?;
    let gamma = get_param("_cell_angle_gamma")?;

    Lattice::from_parameters(a, b, c, alpha, beta, gamma)
}

/// Asymmetric-unit sites from the `_atom_site_fract_*` loop.
fn read_sites(block: &CifBlock) -> Result<Vec<(String, Vector3<f64>)>, ParseError> {
    let atom_loop = block
        .loops
        .iter()
        .find(|l| l.column("_atom_site_fract_x").is_some())
        .ok_or(ParseError::NoAtoms)?;

    let column = |tag: &str| {
        atom_loop
            .column(tag)
            .ok_or_else(|| ParseError::MissingColumn(tag.to_string()))
    };

    // Prefer the explicit type symbol (may carry an oxidation state); the site
    // label ("Fe1") is reduced to its element symbol.
    let (label_idx, from_type_symbol) = match atom_loop.column("_atom_site_type_symbol") {
        Some(idx) => (idx, true),
        None => (column("_atom_site_label")?, false),
    };
    let x_idx = column("_atom_site_fract_x")?;
    let y_idx = column("_atom_site_fract_y")?;
    let z_idx = column("_atom_site_fract_z")?;

    atom_loop
        .rows()
        .map(|row| {
            let raw = &row[label_idx].value;
            let label = if from_type_symbol {
                raw.clone()
            } else {
                symbol_from_label(raw).unwrap_or(raw.as_str()).to_string()
            };
            let position = Vector3::new(
                parse_cif_float(&row[x_idx])?,
                parse_cif_float(&row[y_idx])?,
                parse_cif_float(&row[z_idx])?,
            );
            Ok((label, position))
        })
        .collect()
}

fn read_operations(block: &CifBlock) -> Result<Vec<SymmetryOperation>, ParseError> {
    for symmetry_loop in &block.loops {
        if let Some(idx) = SYMMETRY_TAGS.iter().find_map(|t| symmetry_loop.column(t)) {
            return symmetry_loop
                .rows()
                .map(|row| SymmetryOperation::parse(&row[idx].value))
                .collect();
        }
    }
    Ok(vec![SymmetryOperation::identity()])
}

/// Parses CIF text into a structure, expanding the asymmetric unit with the
/// listed symmetry operations (identity when none are given).
pub fn parse_cif_str(contents: &str) -> Result<StructureDescriptor, ParseError> {
    let block = read_block(&tokenize(contents));

    let lattice = read_lattice(&block)?;
    let sites = read_sites(&block)?;
    let operations = read_operations(&block)?;
    debug!("{} asymmetric sites, {} symmetry operations", sites.len(), operations.len());

    let atoms = expand_sites(&sites, &operations)
        .into_iter()
        .map(|(label, fractional_coords)| Atom { label, fractional_coords })
        .collect();

    StructureDescriptor::new(lattice, atoms)
}

/// Parses a CIF file into a structure.
pub fn from_cif(path: &Path) -> Result<StructureDescriptor, ParseError> {
    let contents = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_cif_str(&contents)
}
