pub mod discover_source_files;
pub mod normalize_options;

use std::path::Path;

/// Existence + permission probe, the moral equivalent of an `R_OK` access
/// check.
pub fn file_readable(path: &Path) -> bool {
  std::fs::File::open(path).is_ok()
}
