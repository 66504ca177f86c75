//! Cell-by-cell comparison of two finished fields.

use std::fmt;

use calor_core::MaterialProperties;

use crate::config::SimulationParams;
use crate::distributed::run_distributed;
use crate::error::RunError;
use crate::sequential::run_sequential;

/// Default per-cell absolute tolerance.
pub const DEFAULT_TOLERANCE: f32 = 1e-3;

/// Outcome of [`verify`].
///
/// A failed verification is a result, not an error: callers decide what
/// a mismatch means for them.
#[derive(Clone, Debug, PartialEq)]
pub struct VerifyReport {
    /// Tolerance the fields were compared with.
    pub tolerance: f32,
    /// Lengths of the reference and candidate fields.
    pub lengths: (usize, usize),
    /// Number of cells differing by more than the tolerance (non-finite
    /// differences included).
    pub mismatches: usize,
    /// Largest finite absolute difference seen.
    pub max_abs_diff: f32,
    /// Index of the first mismatching cell.
    pub first_mismatch: Option<usize>,
}

impl VerifyReport {
    /// Whether the fields agree within tolerance.
    pub fn passed(&self) -> bool {
        self.lengths.0 == self.lengths.1 && self.mismatches == 0
    }
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lengths.0 != self.lengths.1 {
            return write!(
                f,
                "verification FAILED: field lengths differ ({} vs {})",
                self.lengths.0, self.lengths.1
            );
        }
        if self.passed() {
            write!(f, "verification OK (max difference {:e})", self.max_abs_diff)
        } else {
            write!(
                f,
                "verification FAILED: {} cells exceed {:e} (max difference {:e})",
                self.mismatches, self.tolerance, self.max_abs_diff
            )
        }
    }
}

/// Compare `candidate` against `reference` cell by cell.
pub fn verify(reference: &[f32], candidate: &[f32], tolerance: f32) -> VerifyReport {
    let mut report = VerifyReport {
        tolerance,
        lengths: (reference.len(), candidate.len()),
        mismatches: 0,
        max_abs_diff: 0.0,
        first_mismatch: None,
    };
    for (k, (&a, &b)) in reference.iter().zip(candidate).enumerate() {
        let diff = (a - b).abs();
        if diff.is_finite() {
            report.max_abs_diff = report.max_abs_diff.max(diff);
        }
        if diff.is_nan() || diff > tolerance {
            report.mismatches += 1;
            report.first_mismatch.get_or_insert(k);
        }
    }
    report
}

/// Run the sequential and distributed solvers on the same input and
/// compare their final fields with `params.tolerance`.
pub fn compare_runs(
    material: &MaterialProperties,
    params: &SimulationParams,
) -> Result<VerifyReport, RunError> {
    let reference = run_sequential(material, params)?;
    let candidate = run_distributed(material, params)?;
    let report = verify(&reference.field, &candidate.field, params.tolerance);
    if report.passed() {
        log::info!("{report}");
    } else {
        log::warn!("{report}");
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_fields_pass() {
        let a = [1.0, 2.0, 3.0];
        let r = verify(&a, &a, 0.0);
        assert!(r.passed());
        assert_eq!(r.max_abs_diff, 0.0);
    }

    #[test]
    fn tolerance_is_inclusive() {
        let r = verify(&[1.0, 2.0], &[1.5, 2.0], 0.5);
        assert!(r.passed());
        let r = verify(&[1.0, 2.0], &[1.5, 2.75], 0.5);
        assert!(!r.passed());
        assert_eq!(r.mismatches, 1);
        assert_eq!(r.first_mismatch, Some(1));
        assert_eq!(r.max_abs_diff, 0.75);
    }

    #[test]
    fn nan_never_passes() {
        let r = verify(&[1.0], &[f32::NAN], 1e9);
        assert!(!r.passed());
        assert_eq!(r.max_abs_diff, 0.0);
    }

    #[test]
    fn length_mismatch_fails() {
        let r = verify(&[1.0, 2.0], &[1.0], 1.0);
        assert!(!r.passed());
        assert!(r.to_string().contains("lengths differ"));
    }
}
