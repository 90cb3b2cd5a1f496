// ============================================================================
// MODULE DECLARATIONS
// ============================================================================
pub mod analysis;
pub mod chemistry;
pub mod core;
pub mod io;
pub mod synthesis;

// ============================================================================
// RE-EXPORTS (Public API)
// ============================================================================
pub use crate::core::error::{ConvertError, ParseError, RangeError, UnknownElementError, WriteError};
pub use crate::core::structure::{Atom, Lattice, StructureDescriptor};
pub use crate::io::{load_structure, parser, poscar, prompt, writer};

pub use crate::analysis::constraints::{coordinate_line, ConstraintSelector, RenderedLine};
pub use crate::analysis::ordering::CoordinateSorter;
pub use crate::chemistry::species::{SpeciesResolver, SpeciesTable};
pub use crate::synthesis::profile::{KPointsMode, RelaxProfile};
pub use crate::synthesis::renderer::InputRenderer;

use log::{debug, info, warn};

// ============================================================================
// HIGH-LEVEL INTERFACE
// ============================================================================

/// Outcome of one conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    /// The pw.x input deck, ready to be written verbatim.
    pub text: String,
    pub nat: usize,
    pub ntyp: usize,
    /// Number of atoms carrying the `0 0 0` flags.
    pub constrained: usize,
    /// Set when the requested range was rejected and no atom was fixed.
    pub range_error: Option<RangeError>,
}

/// The numbered, height-sorted listing the operator picks a range from.
pub fn enumerate_sorted(structure: &StructureDescriptor) -> Vec<String> {
    CoordinateSorter::enumerate(&CoordinateSorter::sort(&structure.atoms))
}

/// Converts a structure into a relax input with the default profile.
///
/// `constraint_range` holds 1-based inclusive rows of the height-sorted atom
/// list to keep fixed; with a valid range ATOMIC_POSITIONS follows that
/// height order. With `None`, or a range that is logged and rejected, the
/// atoms are written unconstrained in their original file order. Only an
/// unknown element aborts.
pub fn convert(
    structure: &StructureDescriptor,
    constraint_range: Option<(i64, i64)>,
) -> Result<String, ConvertError> {
    convert_with_profile(structure, constraint_range, &RelaxProfile::default()).map(|c| c.text)
}

/// Full pipeline with an explicit profile, reporting how the range was applied.
pub fn convert_with_profile(
    structure: &StructureDescriptor,
    constraint_range: Option<(i64, i64)>,
    profile: &RelaxProfile,
) -> Result<Conversion, ConvertError> {
    // 1. SPECIES (original atom order)
    let species = SpeciesResolver::from_atoms(&structure.atoms)?;

    // 2. ORDERING + CONSTRAINTS
    let sorted = CoordinateSorter::sort(&structure.atoms);
    debug!("sorted {} atoms by height", sorted.len());

    let selection = constraint_range.map(|(start, end)| ConstraintSelector::select(&sorted, start, end));
    let (lines, range_error): (Vec<RenderedLine>, Option<RangeError>) = match selection {
        Some(Ok(lines)) => (lines, None),
        Some(Err(err)) => {
            warn!("{}; writing all atoms unconstrained", err);
            (unconstrained(structure), Some(err))
        }
        None => (unconstrained(structure), None),
    };
    let constrained = lines.iter().filter(|l| l.fixed).count();
    let positions: Vec<String> = lines.iter().map(ToString::to_string).collect();

    // 3. RENDERING
    let nat = structure.nat();
    let ntyp = species.len();
    let text = InputRenderer {
        nat,
        ntyp,
        species: &species,
        lattice: &structure.lattice,
        positions: &positions,
        profile,
    }
    .render();

    info!("rendered {} atoms, {} species, {} fixed", nat, ntyp, constrained);
    Ok(Conversion {
        text,
        nat,
        ntyp,
        constrained,
        range_error,
    })
}

/// Atoms in their original order, none fixed.
fn unconstrained(structure: &StructureDescriptor) -> Vec<RenderedLine> {
    structure.atoms.iter().cloned().map(RenderedLine::free).collect()
}
