pub mod parser;
pub mod poscar;
pub mod prompt;
pub mod symmetry;
pub mod writer;

use crate::core::error::ParseError;
use crate::core::structure::StructureDescriptor;
use std::path::Path;

/// Reads a structure, picking the parser from the file name.
pub fn load_structure(path: &Path) -> Result<StructureDescriptor, ParseError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if name.ends_with(".cif") {
        parser::from_cif(path)
    } else if name.ends_with(".vasp")
        || name.ends_with(".poscar")
        || name.starts_with("poscar")
        || name.starts_with("contcar")
    {
        poscar::from_poscar(path)
    } else {
        Err(ParseError::UnsupportedFormat(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_extension() {
        let err = load_structure(Path::new("structure.xyz")).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedFormat(_)));
    }

    #[test]
    fn dispatches_on_name() {
        // both fail on the missing file, which proves the parser was chosen
        assert!(matches!(load_structure(Path::new("/missing/a.CIF")), Err(ParseError::Io { .. })));
        assert!(matches!(load_structure(Path::new("/missing/CONTCAR")), Err(ParseError::Io { .. })));
    }
}
