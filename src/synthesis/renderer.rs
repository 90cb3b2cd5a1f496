use crate::chemistry::species::SpeciesTable;
use crate::core::structure::Lattice;
use crate::synthesis::profile::{fortran_exp, fortran_fixed, fortran_string, KPointsMode, RelaxProfile};
use std::fmt;

/// A complete pw.x relax input deck.
///
/// Card order is fixed: `&CONTROL`, `&SYSTEM`, `&ELECTRONS`, `&IONS`, `&CELL`,
/// `ATOMIC_SPECIES`, `CELL_PARAMETERS`, `ATOMIC_POSITIONS`, `K_POINTS`.
/// Masses are written to 3 decimals, cell vectors to 6, positions to 10.
pub struct InputRenderer<'a> {
    pub nat: usize,
    pub ntyp: usize,
    pub species: &'a SpeciesTable,
    pub lattice: &'a Lattice,
    pub positions: &'a [String],
    pub profile: &'a RelaxProfile,
}

impl<'a> InputRenderer<'a> {
    pub fn render(&self) -> String {
        self.to_string()
    }

    fn write_control(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.profile;
        writeln!(f, "&CONTROL")?;
        writeln!(f, "  title={},", fortran_string(&p.title))?;
        writeln!(f, "  calculation={},", fortran_string(&p.calculation))?;
        writeln!(f, "  pseudo_dir={},", fortran_string(&p.pseudo_dir))?;
        writeln!(f, "  outdir={},", fortran_string(&p.outdir))?;
        writeln!(f, "  verbosity={},", fortran_string(&p.verbosity))?;
        writeln!(f, "  forc_conv_thr={},", fortran_exp(p.forc_conv_thr))?;
        writeln!(f, "  nstep={},", p.nstep)?;
        writeln!(f, "/")
    }

    fn write_system(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.profile;
        writeln!(f, "&SYSTEM")?;
        writeln!(f, "  ibrav= 0,")?;
        writeln!(f, "  nat= {},", self.nat)?;
        writeln!(f, "  ntyp= {},", self.ntyp)?;
        writeln!(f, "  occupations = {},", fortran_string(&p.occupations))?;
        writeln!(f, "  smearing = {},", fortran_string(&p.smearing))?;
        writeln!(f, "  degauss = {},", fortran_exp(p.degauss))?;
        writeln!(f, "  ecutwfc = {},", p.ecutwfc)?;
        writeln!(f, "  ecutrho = {},", p.ecutrho)?;
        writeln!(f, "  vdw_corr = {},", fortran_string(&p.vdw_corr))?;
        writeln!(f, "  dftd3_version = {}", p.dftd3_version)?;
        writeln!(f, "/")
    }

    fn write_electrons_ions_cell(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.profile;
        writeln!(f, "&ELECTRONS")?;
        writeln!(f, "  conv_thr = {}", fortran_exp(p.conv_thr))?;
        writeln!(f, "  mixing_beta = {}", fortran_fixed(p.mixing_beta))?;
        writeln!(f, "/")?;
        writeln!(f, "&IONS")?;
        writeln!(f, "/")?;
        writeln!(f, "&CELL")?;
        writeln!(f, "  press_conv_thr={}", p.press_conv_thr)?;
        writeln!(f, "/")
    }

    fn write_cards(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ATOMIC_SPECIES")?;
        for s in self.species.iter() {
            writeln!(f, "{} {:.3} {}", s.symbol, s.mass, s.pseudopotential())?;
        }

        writeln!(f, "CELL_PARAMETERS (angstrom)")?;
        for row in self.lattice.rows() {
            writeln!(f, "{:.6} {:.6} {:.6}", row[0], row[1], row[2])?;
        }

        writeln!(f, "ATOMIC_POSITIONS (crystal)")?;
        for line in self.positions {
            writeln!(f, "{}", line)?;
        }

        match self.profile.kpoints_mode {
            KPointsMode::Gamma => writeln!(f, "K_POINTS {{gamma}}"),
            KPointsMode::Automatic => {
                let (g, s) = (self.profile.kpoints_grid, self.profile.kpoints_shift);
                writeln!(f, "K_POINTS {{automatic}}")?;
                writeln!(f, "{} {} {} {} {} {}", g[0], g[1], g[2], s[0], s[1], s[2])
            }
        }
    }
}

impl fmt::Display for InputRenderer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_control(f)?;
        self.write_system(f)?;
        self.write_electrons_ions_cell(f)?;
        self.write_cards(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::species::SpeciesResolver;

    fn cubic() -> Lattice {
        Lattice::from_rows([[5.43, 0.0, 0.0], [0.0, 5.43, 0.0], [0.0, 0.0, 20.0]]).unwrap()
    }

    #[test]
    fn default_profile_deck() {
        let species = SpeciesResolver::resolve(&["Mg", "O"]).unwrap();
        let lattice = cubic();
        let positions = vec![
            "O 0.0000000000 0.0000000000 0.0500000000 0 0 0".to_string(),
            "Mg 0.0000000000 0.0000000000 0.1000000000".to_string(),
        ];
        let profile = RelaxProfile::default();
        let text = InputRenderer {
            nat: 2,
            ntyp: species.len(),
            species: &species,
            lattice: &lattice,
            positions: &positions,
            profile: &profile,
        }
        .render();

        let expected = "\
&CONTROL
  title='ZT',
  calculation='relax',
  pseudo_dir='./',
  outdir='./tmp',
  verbosity='high',
  forc_conv_thr=1.0d-4,
  nstep=100,
/
&SYSTEM
  ibrav= 0,
  nat= 2,
  ntyp= 2,
  occupations = 'smearing',
  smearing = 'gauss',
  degauss = 1.0d-2,
  ecutwfc = 30,
  ecutrho = 360,
  vdw_corr = 'DFT-D3',
  dftd3_version = 6
/
&ELECTRONS
  conv_thr = 1.0d-6
  mixing_beta = 0.5d0
/
&IONS
/
&CELL
  press_conv_thr=0.1
/
ATOMIC_SPECIES
Mg 24.305 Mg.UPF
O 15.999 O.UPF
CELL_PARAMETERS (angstrom)
5.430000 0.000000 0.000000
0.000000 5.430000 0.000000
0.000000 0.000000 20.000000
ATOMIC_POSITIONS (crystal)
O 0.0000000000 0.0000000000 0.0500000000 0 0 0
Mg 0.0000000000 0.0000000000 0.1000000000
K_POINTS {gamma}
";
        assert_eq!(text, expected);
    }

    #[test]
    fn automatic_kpoints_grid() {
        let species = SpeciesResolver::resolve(&["C"]).unwrap();
        let lattice = cubic();
        let profile = RelaxProfile {
            kpoints_mode: KPointsMode::Automatic,
            kpoints_grid: [4, 4, 1],
            kpoints_shift: [1, 1, 0],
            ..RelaxProfile::default()
        };
        let text = InputRenderer {
            nat: 0,
            ntyp: 1,
            species: &species,
            lattice: &lattice,
            positions: &[],
            profile: &profile,
        }
        .render();
        assert!(text.ends_with("K_POINTS {automatic}\n4 4 1 1 1 0\n"));
    }

    #[test]
    fn quoted_title_stays_one_literal() {
        let species = SpeciesResolver::resolve(&["O"]).unwrap();
        let lattice = cubic();
        let profile = RelaxProfile {
            title: "O'Brien slab".to_string(),
            ..RelaxProfile::default()
        };
        let text = InputRenderer {
            nat: 0,
            ntyp: 1,
            species: &species,
            lattice: &lattice,
            positions: &[],
            profile: &profile,
        }
        .render();
        assert!(text.contains("  title='O''Brien slab',\n"));
    }
}
