//! Output file naming.

use std::path::{Path, PathBuf};

/// Extension used when the base path has none.
pub const DEFAULT_EXTENSION: &str = "snap";

/// Derive a per-solver container path from a base path.
///
/// `results.snap` with variant `par` becomes `results_par.snap`; a base
/// without an extension gets [`DEFAULT_EXTENSION`].
///
/// ```
/// use calor_io::derive_output_path;
/// use std::path::Path;
///
/// assert_eq!(
///     derive_output_path(Path::new("out/run.h5"), "seq"),
///     Path::new("out/run_seq.h5")
/// );
/// assert_eq!(
///     derive_output_path(Path::new("run"), "par"),
///     Path::new("run_par.snap")
/// );
/// ```
pub fn derive_output_path(base: &Path, variant: &str) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = base
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    base.with_file_name(format!("{stem}_{variant}.{ext}"))
}
