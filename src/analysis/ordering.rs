use crate::analysis::constraints::coordinate_line;
use crate::core::structure::Atom;

/// Orders atoms by height (third fractional coordinate).
pub struct CoordinateSorter;

impl CoordinateSorter {
    /// Returns the atoms sorted ascending by z.
    ///
    /// The sort is stable: atoms sharing a z value keep their input order, so
    /// layered structures get the same numbering on every run.
    pub fn sort(atoms: &[Atom]) -> Vec<Atom> {
        let mut sorted = atoms.to_vec();
        // + 0.0 folds -0.0 into 0.0 so the two tie
        sorted.sort_by(|a, b| (a.height() + 0.0).total_cmp(&(b.height() + 0.0)));
        sorted
    }

    /// Numbered listing shown to the operator before a range is picked.
    /// Rows are 1-based, matching the indices the selector accepts.
    pub fn enumerate(sorted: &[Atom]) -> Vec<String> {
        sorted
            .iter()
            .enumerate()
            .map(|(i, atom)| format!("{}: {}", i + 1, coordinate_line(atom)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layered() -> Vec<Atom> {
        vec![
            Atom::new("Si", 0.0, 0.0, 0.30),
            Atom::new("O", 0.5, 0.0, 0.10),
            Atom::new("Si", 0.5, 0.5, 0.10),
            Atom::new("O", 0.0, 0.5, 0.20),
            Atom::new("Mg", 0.2, 0.2, 0.10),
        ]
    }

    #[test]
    fn sorted_heights_are_non_decreasing() {
        let sorted = CoordinateSorter::sort(&layered());
        assert!(sorted.windows(2).all(|w| w[0].height() <= w[1].height()));
    }

    #[test]
    fn sort_is_a_permutation() {
        let input = layered();
        let sorted = CoordinateSorter::sort(&input);
        assert_eq!(sorted.len(), input.len());
        for atom in &input {
            let expected = input.iter().filter(|a| *a == atom).count();
            let got = sorted.iter().filter(|a| *a == atom).count();
            assert_eq!(expected, got);
        }
    }

    #[test]
    fn ties_keep_input_order() {
        let sorted = CoordinateSorter::sort(&layered());
        let labels: Vec<&str> = sorted.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, ["O", "Si", "Mg", "O", "Si"]);
    }

    #[test]
    fn negative_zero_ties_with_zero() {
        let atoms = [
            Atom::new("Si", 0.0, 0.0, 0.0),
            Atom::new("O", 0.5, 0.5, -0.0),
            Atom::new("Mg", 0.0, 0.5, -0.0),
        ];
        let sorted = CoordinateSorter::sort(&atoms);
        let labels: Vec<&str> = sorted.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, ["Si", "O", "Mg"]);
    }

    #[test]
    fn enumeration_is_one_based_with_ten_decimals() {
        let sorted = CoordinateSorter::sort(&[Atom::new("Si", 0.0, 0.0, 0.1), Atom::new("O", 0.0, 0.0, 0.05)]);
        let lines = CoordinateSorter::enumerate(&sorted);
        assert_eq!(
            lines,
            [
                "1: O 0.0000000000 0.0000000000 0.0500000000",
                "2: Si 0.0000000000 0.0000000000 0.1000000000",
            ]
        );
    }

    #[test]
    fn empty_input() {
        assert!(CoordinateSorter::sort(&[]).is_empty());
        assert!(CoordinateSorter::enumerate(&[]).is_empty());
    }
}
