use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KPointsMode {
    /// Gamma point only.
    Gamma,
    /// Monkhorst-Pack grid from `kpoints_grid` / `kpoints_shift`.
    Automatic,
}

/// Literal parameters of the relax input deck.
///
/// `Default` is the standard profile; a JSON file may override any subset of
/// fields, the rest keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaxProfile {
    // &CONTROL
    pub title: String,
    pub calculation: String,
    pub pseudo_dir: String,
    pub outdir: String,
    pub verbosity: String,
    pub forc_conv_thr: f64,
    pub nstep: u32,

    // &SYSTEM
    pub occupations: String,
    pub smearing: String,
    pub degauss: f64,
    pub ecutwfc: f64,
    pub ecutrho: f64,
    pub vdw_corr: String,
    pub dftd3_version: u32,

    // &ELECTRONS
    pub conv_thr: f64,
    pub mixing_beta: f64,

    // &CELL
    pub press_conv_thr: f64,

    // K_POINTS
    pub kpoints_mode: KPointsMode,
    pub kpoints_grid: [u32; 3],
    pub kpoints_shift: [u32; 3],
}

impl Default for RelaxProfile {
    fn default() -> Self {
        Self {
            title: "ZT".to_string(),
            calculation: "relax".to_string(),
            pseudo_dir: "./".to_string(),
            outdir: "./tmp".to_string(),
            verbosity: "high".to_string(),
            forc_conv_thr: 1e-4,
            nstep: 100,

            occupations: "smearing".to_string(),
            smearing: "gauss".to_string(),
            degauss: 0.01,
            ecutwfc: 30.0,
            ecutrho: 360.0,
            vdw_corr: "DFT-D3".to_string(),
            dftd3_version: 6,

            conv_thr: 1e-6,
            mixing_beta: 0.5,

            press_conv_thr: 0.1,

            kpoints_mode: KPointsMode::Gamma,
            kpoints_grid: [1, 1, 1],
            kpoints_shift: [0, 0, 0],
        }
    }
}

impl RelaxProfile {
    /// Reads a JSON profile. Fields absent from the file keep their defaults.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)?;
        let profile = serde_json::from_reader(BufReader::new(file))?;
        Ok(profile)
    }
}

/// Fortran double-precision literal in exponent form: `0.01` -> `1.0d-2`.
pub fn fortran_exp(value: f64) -> String {
    let s = format!("{:e}", value);
    let (mantissa, exponent) = s.split_once('e').unwrap_or((s.as_str(), "0"));
    if mantissa.contains('.') {
        format!("{}d{}", mantissa, exponent)
    } else {
        format!("{}.0d{}", mantissa, exponent)
    }
}

/// Fortran double-precision literal without scaling: `0.5` -> `0.5d0`.
pub fn fortran_fixed(value: f64) -> String {
    let s = format!("{}", value);
    if s.contains('.') {
        format!("{}d0", s)
    } else {
        format!("{}.0d0", s)
    }
}

/// Fortran character literal: single-quoted, embedded quotes doubled.
pub fn fortran_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn fortran_literals() {
        assert_eq!(fortran_exp(0.01), "1.0d-2");
        assert_eq!(fortran_exp(1e-6), "1.0d-6");
        assert_eq!(fortran_exp(1e-4), "1.0d-4");
        assert_eq!(fortran_exp(2.5e-3), "2.5d-3");
        assert_eq!(fortran_fixed(0.5), "0.5d0");
        assert_eq!(fortran_fixed(1.0), "1.0d0");
    }

    #[test]
    fn quotes_inside_strings_are_doubled() {
        assert_eq!(fortran_string("relax"), "'relax'");
        assert_eq!(fortran_string("Ni's slab"), "'Ni''s slab'");
        assert_eq!(fortran_string(""), "''");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "ecutwfc": 45, "kpoints_mode": "automatic", "kpoints_grid": [4, 4, 1] }}"#).unwrap();

        let profile = RelaxProfile::from_json_file(file.path()).unwrap();
        assert_eq!(profile.ecutwfc, 45.0);
        assert_eq!(profile.kpoints_mode, KPointsMode::Automatic);
        assert_eq!(profile.kpoints_grid, [4, 4, 1]);
        assert_eq!(profile.ecutrho, 360.0);
        assert_eq!(profile.calculation, "relax");
    }

    #[test]
    fn malformed_json_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ ecutwfc = 45 }}").unwrap();
        assert!(RelaxProfile::from_json_file(file.path()).is_err());
    }
}
