//! Interpolation in the log-pressure vertical coordinate.
//!
//! Pressure falls off roughly exponentially with height, so everything is interpolated linearly
//! in `ln(p)`. All pressure slices are assumed sorted in descending order, surface first.
use itertools::{izip, Itertools};
use metfor::{HectoPascal, Knots, Quantity, WindSpdDir, WindUV};
use optional::Optioned;

/// Fraction of the way from `p0` to `p1` where `target` lies, measured in `ln(p)`.
#[inline]
pub(crate) fn log_p_fraction(p0: f64, p1: f64, target: f64) -> f64 {
    debug_assert!(p0 > 0.0 && p1 > 0.0 && target > 0.0);
    debug_assert!((p0 - p1).abs() > 0.0);

    (p0 / target).ln() / (p0 / p1).ln()
}

/// Interpolate between `(p0, y0)` and `(p1, y1)` linearly in `ln(p)`.
#[inline]
pub(crate) fn log_p_interp(target: f64, p0: f64, p1: f64, y0: f64, y1: f64) -> f64 {
    y0 + log_p_fraction(p0, p1, target) * (y1 - y0)
}

/// Pressure where a quantity that is linear in `ln(p)` crosses zero between two samples.
///
/// The samples must have opposite signs, or at least one must be zero.
#[inline]
pub(crate) fn log_p_zero_crossing(p0: f64, y0: f64, p1: f64, y1: f64) -> f64 {
    debug_assert!(y0 * y1 <= 0.0);

    if y0 == y1 {
        return p0;
    }

    let frac = y0 / (y0 - y1);
    (p0.ln() + frac * (p1.ln() - p0.ln())).exp()
}

/// The indexes of the levels bracketing `target` in a descending pressure profile.
///
/// Both indexes are the same if `target` is exactly on a level. Returns `None` if `target` is
/// outside the profile.
pub(crate) fn bracket(pressure: &[HectoPascal], target: HectoPascal) -> Option<(usize, usize)> {
    let idx = pressure.partition_point(|&p| p > target);

    if idx == pressure.len() {
        None
    } else if pressure[idx] == target {
        Some((idx, idx))
    } else if idx == 0 {
        None
    } else {
        Some((idx - 1, idx))
    }
}

/// Interpolate a profile with gaps, using the nearest valid levels on either side of the target.
///
/// Returns a missing value if the target is not bracketed by valid values.
pub fn log_p_interpolate<Y>(
    pressure: &[HectoPascal],
    values: &[Optioned<Y>],
    target: HectoPascal,
) -> Optioned<Y>
where
    Y: Quantity + optional::Noned,
{
    debug_assert_eq!(pressure.len(), values.len());

    enum BracketType<Y> {
        Bracket((f64, Y), (f64, Y)),
        EndEqual(Y),
    }

    let tgt_p = target.unpack();

    let make_bracket = |pnt_0: (f64, Y), pnt_1: (f64, Y)| -> Option<BracketType<Y>> {
        let (p0, y0) = pnt_0;
        let (p1, y1) = pnt_1;

        if p0 > tgt_p && p1 < tgt_p {
            Some(BracketType::Bracket(pnt_0, pnt_1))
        } else if (p0 - tgt_p).abs() < std::f64::EPSILON {
            Some(BracketType::EndEqual(y0))
        } else if (p1 - tgt_p).abs() < std::f64::EPSILON {
            Some(BracketType::EndEqual(y1))
        } else {
            None
        }
    };

    let value_opt = izip!(pressure, values)
        // Skip levels with a missing value and use the ones on either side of it.
        .filter_map(|(p, y)| y.into_option().map(|y| (p.unpack(), y)))
        .tuple_windows::<(_, _)>()
        .filter_map(|(pnt_0, pnt_1)| make_bracket(pnt_0, pnt_1))
        .next()
        .map(|bracket| match bracket {
            BracketType::Bracket((p0, y0), (p1, y1)) => {
                Y::pack(log_p_interp(tgt_p, p0, p1, y0.unpack(), y1.unpack()))
            }
            BracketType::EndEqual(y) => y,
        });

    Optioned::from(value_opt)
}

/// Interpolate the wind by its components, speed and direction do not interpolate linearly.
pub fn log_p_interpolate_wind(
    pressure: &[HectoPascal],
    winds: &[Optioned<WindSpdDir<Knots>>],
    target: HectoPascal,
) -> Optioned<WindSpdDir<Knots>> {
    debug_assert_eq!(pressure.len(), winds.len());

    let tgt_p = target.unpack();

    let value_opt = izip!(pressure, winds)
        .filter_map(|(p, w)| w.into_option().map(|w| (p.unpack(), w)))
        .tuple_windows::<(_, _)>()
        .find(|&((p0, _), (p1, _))| p0 >= tgt_p && p1 <= tgt_p)
        .map(|((p0, w_below), (p1, w_above))| {
            if (p0 - tgt_p).abs() < std::f64::EPSILON {
                return w_below;
            }
            if (p1 - tgt_p).abs() < std::f64::EPSILON {
                return w_above;
            }

            let WindUV::<Knots> {
                u: x_below,
                v: y_below,
            } = WindUV::from(w_below);
            let WindUV::<Knots> {
                u: x_above,
                v: y_above,
            } = WindUV::from(w_above);

            let frac = log_p_fraction(p0, p1, tgt_p);

            let rise_x = x_above - x_below;
            let rise_y = y_above - y_below;

            let x = x_below + rise_x * frac;
            let y = y_below + rise_y * frac;

            WindSpdDir::from(WindUV { u: x, v: y })
        });

    Optioned::from(value_opt)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use metfor::Meters;
    use optional::{none, some};

    fn pressures() -> Vec<HectoPascal> {
        [1000.0, 850.0, 700.0, 500.0]
            .iter()
            .cloned()
            .map(HectoPascal)
            .collect()
    }

    #[test]
    fn test_log_p_interp() {
        // Halfway in ln(p) between 1000 and 250 is 500.
        assert_abs_diff_eq!(log_p_interp(500.0, 1000.0, 250.0, 0.0, 10.0), 5.0, epsilon = 1.0e-12);
        assert_abs_diff_eq!(log_p_interp(1000.0, 1000.0, 250.0, 3.0, 10.0), 3.0);
        assert_abs_diff_eq!(log_p_interp(250.0, 1000.0, 250.0, 3.0, 10.0), 10.0, epsilon = 1.0e-12);
    }

    #[test]
    fn test_zero_crossing() {
        let p = log_p_zero_crossing(1000.0, -1.0, 250.0, 1.0);
        assert_abs_diff_eq!(p, 500.0, epsilon = 1.0e-9);

        assert_abs_diff_eq!(log_p_zero_crossing(800.0, 0.0, 700.0, 2.0), 800.0);
        assert_abs_diff_eq!(log_p_zero_crossing(800.0, 2.0, 700.0, 0.0), 700.0, epsilon = 1.0e-9);
    }

    #[test]
    fn test_bracket() {
        let ps = pressures();
        assert_eq!(bracket(&ps, HectoPascal(1000.0)), Some((0, 0)));
        assert_eq!(bracket(&ps, HectoPascal(900.0)), Some((0, 1)));
        assert_eq!(bracket(&ps, HectoPascal(700.0)), Some((2, 2)));
        assert_eq!(bracket(&ps, HectoPascal(501.0)), Some((2, 3)));
        assert_eq!(bracket(&ps, HectoPascal(500.0)), Some((3, 3)));
        assert_eq!(bracket(&ps, HectoPascal(1001.0)), None);
        assert_eq!(bracket(&ps, HectoPascal(499.0)), None);
    }

    #[test]
    fn test_interpolate_with_gaps() {
        let ps = pressures();
        let heights = vec![some(Meters(100.0)), none(), some(Meters(3000.0)), none()];

        let z = log_p_interpolate(&ps, &heights, HectoPascal(850.0)).unwrap();
        let frac = (1000.0f64 / 850.0).ln() / (1000.0f64 / 700.0).ln();
        assert_abs_diff_eq!(z.unpack(), 100.0 + frac * 2900.0, epsilon = 1.0e-9);

        assert_eq!(
            log_p_interpolate(&ps, &heights, HectoPascal(700.0)).unwrap(),
            Meters(3000.0)
        );
        assert!(log_p_interpolate(&ps, &heights, HectoPascal(600.0)).is_none());
    }

    #[test]
    fn test_interpolate_wind() {
        let ps = pressures();
        let winds = vec![
            some(WindSpdDir {
                speed: Knots(10.0),
                direction: 180.0,
            }),
            some(WindSpdDir {
                speed: Knots(10.0),
                direction: 0.0,
            }),
            none(),
            none(),
        ];

        let frac = log_p_fraction(1000.0, 850.0, 925.0);
        let wind = log_p_interpolate_wind(&ps, &winds, HectoPascal(925.0)).unwrap();
        // The v component goes from +10 to -10, the u component stays 0.
        assert_abs_diff_eq!(wind.speed.unpack(), (10.0 - 20.0 * frac).abs(), epsilon = 1.0e-6);

        assert!(log_p_interpolate_wind(&ps, &winds, HectoPascal(600.0)).is_none());
    }
}
