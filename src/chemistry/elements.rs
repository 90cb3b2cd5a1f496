//! Periodic-table lookup: element symbols and standard atomic masses.

use crate::core::error::UnknownElementError;
use periodic_table_on_an_enum::Element;

/// Extracts the element symbol from a site label.
///
/// Oxidation states and site numbering are dropped: `Fe2+` -> `Fe`, `O1` -> `O`.
/// Returns `None` when the label does not start with an uppercase letter.
pub fn symbol_from_label(label: &str) -> Option<&str> {
    let label = label.trim();
    let mut chars = label.char_indices();
    let (_, first) = chars.next()?;
    if !first.is_ascii_uppercase() {
        return None;
    }
    let end = match chars.next() {
        Some((i, c)) if c.is_ascii_lowercase() => i + c.len_utf8(),
        Some((i, _)) => i,
        None => label.len(),
    };
    Some(&label[..end])
}

/// Resolves a site label to its element.
pub fn element_for_label(label: &str) -> Result<Element, UnknownElementError> {
    let unknown = |symbol: &str| UnknownElementError {
        symbol: symbol.to_string(),
        label: label.to_string(),
    };
    let symbol = symbol_from_label(label).ok_or_else(|| unknown(label))?;
    Element::from_symbol(symbol).ok_or_else(|| unknown(symbol))
}

/// Standard atomic mass for the element named by `label`.
pub fn atomic_mass(label: &str) -> Result<f64, UnknownElementError> {
    element_for_label(label).map(|e| f64::from(e.get_atomic_mass()))
}
