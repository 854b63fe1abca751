//! Path resolution and extension tokens for manifest records

use std::path::{Path, PathBuf};

/// Resolve a root path to absolute form.
///
/// Uses `dunce` so Windows roots come back without the `\\?\` prefix.
/// Entries below the root are joined onto this path rather than resolved
/// individually, so a symlinked file keeps the path it was found under.
pub fn resolve_root(path: &Path) -> std::io::Result<PathBuf> {
    dunce::canonicalize(path)
}

/// Extension token including the leading dot, or empty.
///
/// Dotfiles such as `.bashrc` have no extension.
pub fn extension_token(path: &Path) -> String {
    match path.extension() {
        Some(ext) => format!(".{}", ext.to_string_lossy()),
        None => String::new(),
    }
}
