use crate::chemistry::elements::element_for_label;
use crate::core::error::UnknownElementError;
use crate::core::structure::Atom;
use log::debug;

/// One ATOMIC_SPECIES entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    pub symbol: String,
    pub mass: f64,
}

impl Species {
    /// Pseudopotential file name by convention; its existence is not checked.
    pub fn pseudopotential(&self) -> String {
        format!("{}.UPF", self.symbol)
    }
}

/// Unique element symbols with their masses, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeciesTable {
    entries: Vec<Species>,
}

impl SpeciesTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Species> {
        self.entries.iter()
    }

}

pub struct SpeciesResolver;

impl SpeciesResolver {
    /// Element symbols of `atoms`, deduplicated, in order of first appearance.
    ///
    /// Takes the atoms in their ORIGINAL order; the height sort must not
    /// influence the species order.
    pub fn unique_symbols(atoms: &[Atom]) -> Result<Vec<String>, UnknownElementError> {
        let mut symbols: Vec<String> = Vec::new();
        for atom in atoms {
            let symbol = element_for_label(&atom.label)?.get_symbol().to_string();
            if !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }
        Ok(symbols)
    }

    /// Looks up the standard atomic mass of each symbol.
    pub fn resolve<S: AsRef<str>>(symbols: &[S]) -> Result<SpeciesTable, UnknownElementError> {
        let entries = symbols
            .iter()
            .map(|symbol| {
                let element = element_for_label(symbol.as_ref())?;
                Ok(Species {
                    symbol: element.get_symbol().to_string(),
                    mass: f64::from(element.get_atomic_mass()),
                })
            })
            .collect::<Result<Vec<_>, UnknownElementError>>()?;

        debug!("resolved {} species", entries.len());
        Ok(SpeciesTable { entries })
    }

    /// `unique_symbols` followed by `resolve`.
    pub fn from_atoms(atoms: &[Atom]) -> Result<SpeciesTable, UnknownElementError> {
        Self::resolve(&Self::unique_symbols(atoms)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_appearance_order() {
        let atoms = vec![
            Atom::new("O", 0.0, 0.0, 0.9),
            Atom::new("Si", 0.0, 0.0, 0.1),
            Atom::new("O", 0.0, 0.0, 0.5),
            Atom::new("Al3+", 0.0, 0.0, 0.0),
        ];
        let symbols = SpeciesResolver::unique_symbols(&atoms).unwrap();
        assert_eq!(symbols, ["O", "Si", "Al"]);
    }

    #[test]
    fn suffixed_labels_share_a_species() {
        let atoms = vec![Atom::new("Fe2+", 0.0, 0.0, 0.0), Atom::new("Fe3+", 0.0, 0.0, 0.5)];
        let table = SpeciesResolver::from_atoms(&atoms).unwrap();
        assert_eq!(table.len(), 1);
        let pseudos: Vec<String> = table.iter().map(Species::pseudopotential).collect();
        assert_eq!(pseudos, ["Fe.UPF"]);
    }

    #[test]
    fn resolves_masses() {
        let table = SpeciesResolver::resolve(&["Si", "O"]).unwrap();
        let symbols: Vec<&str> = table.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(symbols, ["Si", "O"]);
        assert_eq!(table.iter().nth(1).map(|s| format!("{:.3}", s.mass)), Some("15.999".to_string()));
    }

    #[test]
    fn unknown_label_stops_resolution() {
        let atoms = vec![Atom::new("Si", 0.0, 0.0, 0.0), Atom::new("Qq", 0.0, 0.0, 0.0)];
        let err = SpeciesResolver::from_atoms(&atoms).unwrap_err();
        assert_eq!(err.symbol, "Qq");
        assert!(SpeciesResolver::resolve(&["Zz"]).is_err());
    }
}
