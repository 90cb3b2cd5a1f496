use crate::core::error::RangeError;
use crate::core::structure::Atom;
use log::debug;
use std::fmt;

/// `label x y z` with every coordinate printed to 10 decimals.
pub fn coordinate_line(atom: &Atom) -> String {
    let p = &atom.fractional_coords;
    format!("{} {:.10} {:.10} {:.10}", atom.label, p.x, p.y, p.z)
}

/// One row of the ATOMIC_POSITIONS card.
///
/// A fixed atom carries the `0 0 0` force multipliers, freezing it along all
/// three axes during relaxation.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedLine {
    pub atom: Atom,
    pub fixed: bool,
}

impl RenderedLine {
    pub fn free(atom: Atom) -> Self {
        Self { atom, fixed: false }
    }
}

impl fmt::Display for RenderedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&coordinate_line(&self.atom))?;
        if self.fixed {
            f.write_str(" 0 0 0")?;
        }
        Ok(())
    }
}

/// Marks a contiguous block of height-sorted atoms as fixed.
pub struct ConstraintSelector;

impl ConstraintSelector {
    /// Fixes rows `start..=end` (1-based, inclusive) of `sorted`.
    ///
    /// Fails when the converted 0-based range leaves `[0, len-1]` or is reversed.
    pub fn select(sorted: &[Atom], start: i64, end: i64) -> Result<Vec<RenderedLine>, RangeError> {
        let len = sorted.len();
        let (start, end) = match (start.checked_sub(1), end.checked_sub(1)) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(RangeError {
                    start: start.saturating_sub(1),
                    end: end.saturating_sub(1),
                    len,
                })
            }
        };

        if start < 0 || end >= len as i64 || start > end {
            return Err(RangeError { start, end, len });
        }

        debug!("fixing rows {}..={} of {}", start, end, len);

        Ok(sorted
            .iter()
            .enumerate()
            .map(|(i, atom)| {
                let i = i as i64;
                RenderedLine {
                    atom: atom.clone(),
                    fixed: start <= i && i <= end,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(n: usize) -> Vec<Atom> {
        (0..n).map(|i| Atom::new("C", 0.0, 0.0, i as f64 / 10.0)).collect()
    }

    fn fixed_rows(lines: &[RenderedLine]) -> Vec<usize> {
        lines.iter().enumerate().filter(|(_, l)| l.fixed).map(|(i, _)| i).collect()
    }

    #[test]
    fn fixes_exactly_the_requested_block() {
        let atoms = stack(6);
        for start in 1..=6 {
            for end in start..=6 {
                let lines = ConstraintSelector::select(&atoms, start, end).unwrap();
                let expected: Vec<usize> = ((start - 1) as usize..end as usize).collect();
                assert_eq!(fixed_rows(&lines), expected);
                assert_eq!(lines.len(), atoms.len());
            }
        }
    }

    #[test]
    fn rejects_out_of_domain_ranges() {
        let atoms = stack(3);
        assert_eq!(
            ConstraintSelector::select(&atoms, 0, 2),
            Err(RangeError { start: -1, end: 1, len: 3 })
        );
        assert_eq!(
            ConstraintSelector::select(&atoms, 1, 4),
            Err(RangeError { start: 0, end: 3, len: 3 })
        );
        assert_eq!(
            ConstraintSelector::select(&atoms, 3, 2),
            Err(RangeError { start: 2, end: 1, len: 3 })
        );
    }

    #[test]
    fn extreme_bounds_are_range_errors() {
        let atoms = stack(3);
        assert_eq!(
            ConstraintSelector::select(&atoms, i64::MIN, 1),
            Err(RangeError { start: i64::MIN, end: 0, len: 3 })
        );
        assert_eq!(
            ConstraintSelector::select(&atoms, i64::MIN, i64::MIN),
            Err(RangeError { start: i64::MIN, end: i64::MIN, len: 3 })
        );
        assert!(ConstraintSelector::select(&atoms, 1, i64::MAX).is_err());
    }

    #[test]
    fn empty_structure_has_no_valid_range() {
        assert!(ConstraintSelector::select(&[], 1, 1).is_err());
    }

    #[test]
    fn line_format() {
        let atom = Atom::new("Fe2+", 0.25, 0.5, 0.123456789012);
        assert_eq!(
            RenderedLine::free(atom.clone()).to_string(),
            "Fe2+ 0.2500000000 0.5000000000 0.1234567890"
        );
        assert_eq!(
            RenderedLine { atom, fixed: true }.to_string(),
            "Fe2+ 0.2500000000 0.5000000000 0.1234567890 0 0 0"
        );
    }

    #[test]
    fn range_error_names_domain() {
        let err = ConstraintSelector::select(&stack(4), 3, 2).unwrap_err();
        assert_eq!(err.to_string(), "row range [2, 1] is outside the valid domain [0, 3] or reversed");
    }
}
