use crate::core::error::WriteError;
use log::info;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes `text` to `path` all-or-nothing.
///
/// The text goes to a temporary file next to the destination, which is then
/// renamed over it. On any failure the temporary file is removed and the
/// destination is left untouched.
pub fn write_input(path: &Path, text: &str) -> Result<(), WriteError> {
    let wrap = |source: std::io::Error| WriteError {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(wrap)?;
    tmp.write_all(text.as_bytes()).map_err(wrap)?;
    tmp.as_file().sync_all().map_err(wrap)?;
    tmp.persist(path).map_err(|e| wrap(e.error))?;

    info!("wrote {} bytes to {:?}", text.len(), path);
    Ok(())
}
