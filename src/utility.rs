//! Numerical helpers.
use crate::error::{AnalysisError, Result};
use tracing::trace;

/// Bisection search for a root of `f` bracketed by `low_val` and `high_val`.
///
/// Stops when the bracket is narrower than `tolerance` and returns its midpoint. Fails with
/// `ConvergenceFailure` if the end points do not bracket a root or if `max_iterations` halvings
/// are not enough. `what` names the quantity being searched for in the error.
pub(crate) fn find_root<F>(
    f: F,
    mut low_val: f64,
    mut high_val: f64,
    tolerance: f64,
    max_iterations: usize,
    what: &'static str,
) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    if low_val > high_val {
        std::mem::swap(&mut low_val, &mut high_val);
    }

    let mut f_low = f(low_val);
    let f_high = f(high_val);

    if f_low == 0.0 {
        return Ok(low_val);
    }
    if f_high == 0.0 {
        return Ok(high_val);
    }
    if !(f_low * f_high < 0.0) {
        return Err(AnalysisError::ConvergenceFailure {
            what,
            iterations: 0,
        });
    }

    for iteration in 1..=max_iterations {
        let mid_val = (high_val - low_val) / 2.0 + low_val;
        let f_mid = f(mid_val);

        if f_mid == 0.0 {
            return Ok(mid_val);
        } else if f_mid * f_low > 0.0 {
            low_val = mid_val;
            f_low = f_mid;
        } else {
            high_val = mid_val;
        }

        if (high_val - low_val).abs() < tolerance {
            trace!(what, iteration, "bisection converged");
            return Ok((high_val - low_val) / 2.0 + low_val);
        }
    }

    Err(AnalysisError::ConvergenceFailure {
        what,
        iterations: max_iterations,
    })
}
