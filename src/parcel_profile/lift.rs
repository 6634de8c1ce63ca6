use super::{ParcelAscentAnalysis, ParcelProfile, ParcelTrajectory, Segment, TrajectoryPoint};
use crate::{
    config::DiagramConfig,
    error::{AnalysisError, Result},
    interpolation::{log_p_fraction, log_p_zero_crossing},
    parcel::{Parcel, ParcelOrigin},
    profile::EnvironmentProfile,
    projection::ThermoPoint,
    pseudoadiabat::MoistStepper,
    thermo::{
        dew_point_from_mixing_ratio_c, dry_adiabat_k, saturation_mixing_ratio_kgkg,
        virtual_temperature_k, CELSIUS_OFFSET, G, RD,
    },
    utility::find_root,
};
use itertools::Itertools;
use metfor::{Celsius, HectoPascal, JpKg, Kelvin, Meters, Quantity};
use optional::{none, some, Optioned};
use std::cmp::Ordering;
use tracing::{debug, trace};

// Sample pressures closer than this (hPa) are the same level.
const SAME_LEVEL: f64 = 1.0e-6;
// Highest point (hPa) searched for the LCL, independent of the plot range.
const LCL_SEARCH_TOP: f64 = 1.0;

pub(super) fn lift_parcel(
    profile: &EnvironmentProfile,
    origin: ParcelOrigin,
    config: &DiagramConfig,
) -> Result<ParcelAscentAnalysis> {
    config.validate()?;
    let sampling = config.sampling();
    let range = sampling.range;

    let parcel = origin.resolve(profile)?;
    if !range.contains(parcel.pressure) {
        return Err(AnalysisError::OutOfRange {
            pressure: parcel.pressure.unpack(),
            top: range.top.unpack(),
            bottom: range.bottom.unpack(),
        });
    }

    let top = range.top.unpack();
    let (lcl_p, lcl_t) = find_lcl(&parcel, config)?;
    debug!(
        pressure = lcl_p,
        temperature = lcl_t - CELSIUS_OFFSET,
        "found lifting condensation level"
    );

    let grid = sample_grid(parcel.pressure.unpack(), lcl_p, top, config.step_hpa, profile);
    let trajectory = trace_ascent(&parcel, lcl_p, lcl_t, &grid, config)?;

    let levels = analysis_levels(&parcel, lcl_p, &trajectory, profile, config)?;
    let levels = insert_crossings(levels);

    // Levels at and above the LCL, if it is inside the environment data.
    let lcl_idx = levels
        .iter()
        .position(|lvl| lvl.pressure <= lcl_p + SAME_LEVEL);
    let lcl_height_agl: Optioned<Meters> = lcl_idx
        .filter(|&i| (levels[i].pressure - lcl_p).abs() <= SAME_LEVEL)
        .map(|i| Meters(levels[i].height))
        .into();

    let layer = lcl_idx.and_then(|start| {
        positive_layers(&levels, start)
            .into_iter()
            .find(|&(bottom, top)| {
                top == levels.len() - 1
                    || levels[bottom].pressure - levels[top].pressure
                        >= config.min_buoyant_layer_hpa
            })
            .map(|layer| (start, layer))
    });

    let mut cape = 0.0;
    let mut cin = 0.0;
    let (mut lfc_pressure, mut lfc_temperature, mut lfc_height_agl) = (none(), none(), none());
    let (mut el_pressure, mut el_temperature, mut el_height_agl) = (none(), none(), none());
    let mut ncape = none();

    if let Some((lcl_idx, (lfc_idx, top_idx))) = layer {
        cape = (lfc_idx..top_idx)
            .map(|i| layer_energy(&levels[i], &levels[i + 1]))
            .sum::<f64>()
            .max(0.0);
        cin = (lcl_idx..lfc_idx)
            .map(|i| layer_energy(&levels[i], &levels[i + 1]))
            .filter(|&energy| energy < 0.0)
            .sum::<f64>()
            .min(0.0);

        let lfc = &levels[lfc_idx];
        lfc_pressure = some(HectoPascal(lfc.pressure));
        lfc_temperature = some(Celsius::from(Kelvin(lfc.pcl_t)));
        lfc_height_agl = some(Meters(lfc.height));

        // Positive all the way to the top of the data, there is no EL.
        if top_idx < levels.len() - 1 {
            let el = &levels[top_idx];
            el_pressure = some(HectoPascal(el.pressure));
            el_temperature = some(Celsius::from(Kelvin(el.pcl_t)));
            el_height_agl = some(Meters(el.height));

            let depth = el.height - lfc.height;
            if depth > 0.0 {
                ncape = some(cape / depth);
            }
        }
    }

    debug!(
        cape,
        cin,
        lfc = ?lfc_pressure.into_option(),
        el = ?el_pressure.into_option(),
        "parcel lifted"
    );

    let profile = ParcelProfile {
        pressure: levels.iter().map(|lvl| HectoPascal(lvl.pressure)).collect(),
        height: levels.iter().map(|lvl| Meters(lvl.height)).collect(),
        parcel_t: levels
            .iter()
            .map(|lvl| Celsius::from(Kelvin(lvl.pcl_bt)))
            .collect(),
        environment_t: levels
            .iter()
            .map(|lvl| Celsius::from(Kelvin(lvl.env_bt)))
            .collect(),
    };

    Ok(ParcelAscentAnalysis {
        parcel,
        trajectory,
        profile,
        lcl_pressure: HectoPascal(lcl_p),
        lcl_temperature: Celsius::from(Kelvin(lcl_t)),
        lcl_height_agl,
        lfc_pressure,
        lfc_temperature,
        lfc_height_agl,
        el_pressure,
        el_temperature,
        el_height_agl,
        cape: JpKg(cape),
        cin: JpKg(cin),
        ncape,
    })
}

/// Pressure (hPa) and temperature (K) where the parcel saturates when lifted dry adiabatically.
///
/// The LCL may lie above the plot. A parcel too dry to saturate before -80 C saturates where it
/// reaches -80 C.
fn find_lcl(parcel: &Parcel, config: &DiagramConfig) -> Result<(f64, f64)> {
    let p0 = parcel.pressure.unpack();
    let theta = parcel.theta()?.unpack();

    if parcel.is_saturated() {
        return Ok((p0, dry_adiabat_k(theta, p0)));
    }

    let mw = parcel.mixing_ratio()?;

    // Vapor the parcel could still take up, zero at the LCL.
    let deficit = |p: f64| {
        saturation_mixing_ratio_kgkg(p, dry_adiabat_k(theta, p) - CELSIUS_OFFSET) - mw
    };

    let lcl_p = find_root(
        deficit,
        LCL_SEARCH_TOP,
        p0,
        config.pressure_tolerance_hpa,
        config.max_root_iterations,
        "lifting condensation level",
    )?;

    Ok((lcl_p, dry_adiabat_k(theta, lcl_p)))
}

/// Pressures to sample the ascent at, in decreasing order.
fn sample_grid(
    p0: f64,
    lcl_p: f64,
    top: f64,
    step: f64,
    profile: &EnvironmentProfile,
) -> Vec<f64> {
    let mut grid: Vec<f64> = (0u32..)
        .map(|k| p0 - step * f64::from(k))
        .take_while(|&p| p > top)
        .collect();

    grid.push(top);
    if lcl_p < p0 && lcl_p > top {
        grid.push(lcl_p);
    }
    grid.extend(
        profile
            .pressure()
            .iter()
            .map(|p| p.unpack())
            .filter(|&p| p < p0 && p > top),
    );

    grid.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    grid.dedup_by(|a, b| (*a - *b).abs() < SAME_LEVEL);

    grid
}

fn trace_ascent(
    parcel: &Parcel,
    lcl_p: f64,
    lcl_t: f64,
    grid: &[f64],
    config: &DiagramConfig,
) -> Result<ParcelTrajectory> {
    let theta = parcel.theta()?.unpack();
    let mut stepper = MoistStepper::new(
        ThermoPoint {
            pressure: HectoPascal(lcl_p),
            temperature: Celsius::from(Kelvin(lcl_t)),
        },
        &config.sampling(),
    )?;

    let points = grid
        .iter()
        .map(|&p| {
            if p >= lcl_p - SAME_LEVEL {
                Ok(TrajectoryPoint {
                    pressure: HectoPascal(p),
                    temperature: Celsius::from(Kelvin(dry_adiabat_k(theta, p))),
                    segment: Segment::Dry,
                })
            } else {
                let ThermoPoint {
                    pressure,
                    temperature,
                } = stepper.advance_to(HectoPascal(p))?;

                Ok(TrajectoryPoint {
                    pressure,
                    temperature,
                    segment: Segment::Moist,
                })
            }
        })
        .collect::<Result<Vec<TrajectoryPoint>>>()?;

    trace!(
        samples = points.len(),
        moist_steps = stepper.steps_taken(),
        "parcel trajectory"
    );

    Ok(ParcelTrajectory::new(points))
}

// A level in the analysis. Pressure in hPa, height in meters above the origin, temperatures in K.
#[derive(Debug, Clone, Copy)]
struct AnalLevel {
    pressure: f64,
    height: f64,
    // Parcel temperature
    pcl_t: f64,
    // Temperatures compared for buoyancy, virtual or not
    pcl_bt: f64,
    env_bt: f64,
    // Environment virtual temperature, for heights
    env_tv: f64,
}

impl AnalLevel {
    #[inline]
    fn buoyancy(&self) -> f64 {
        self.pcl_bt - self.env_bt
    }
}

/// Pair the trajectory with the environment wherever the environment exists.
fn analysis_levels(
    parcel: &Parcel,
    lcl_p: f64,
    trajectory: &ParcelTrajectory,
    profile: &EnvironmentProfile,
    config: &DiagramConfig,
) -> Result<Vec<AnalLevel>> {
    let dry_mw = parcel.mixing_ratio()?;

    let mut levels: Vec<AnalLevel> = Vec::with_capacity(trajectory.len());
    for pnt in trajectory
        .points()
        .iter()
        .filter(|pnt| profile.contains(pnt.pressure))
    {
        let p = pnt.pressure.unpack();
        let pcl_t = Kelvin::from(pnt.temperature).unpack();
        let env_t = Kelvin::from(profile.temperature_at(pnt.pressure)?).unpack();
        let env_tv = profile.virtual_temperature_at(pnt.pressure)?.unpack();

        let (pcl_bt, env_bt) = if config.virtual_temperature {
            // Saturated above the LCL, constant mixing ratio below.
            let pcl_td = if p >= lcl_p {
                dew_point_from_mixing_ratio_c(p, dry_mw)
                    .map_or(std::f64::NAN, |td| td + CELSIUS_OFFSET)
            } else {
                pcl_t
            };

            (virtual_temperature_k(p, pcl_t, pcl_td), env_tv)
        } else {
            (pcl_t, env_t)
        };

        // Hypsometric equation, layer by layer.
        let height = match levels.last() {
            Some(below) => {
                below.height
                    + RD / G * 0.5 * (below.env_tv + env_tv) * (below.pressure / p).ln()
            }
            None => 0.0,
        };

        levels.push(AnalLevel {
            pressure: p,
            height,
            pcl_t,
            pcl_bt,
            env_bt,
            env_tv,
        });
    }

    Ok(levels)
}

/// Add a level wherever the buoyancy changes sign, so every layer between two consecutive levels
/// has a single sign.
fn insert_crossings(levels: Vec<AnalLevel>) -> Vec<AnalLevel> {
    let mut result = Vec::with_capacity(levels.len() + 8);

    for (lvl0, lvl1) in levels.iter().tuple_windows::<(_, _)>() {
        result.push(*lvl0);

        let (b0, b1) = (lvl0.buoyancy(), lvl1.buoyancy());
        if b0 * b1 < 0.0 {
            let pressure = log_p_zero_crossing(lvl0.pressure, b0, lvl1.pressure, b1);
            let frac = log_p_fraction(lvl0.pressure, lvl1.pressure, pressure);
            let lerp = |a: f64, b: f64| a + frac * (b - a);

            let env_bt = lerp(lvl0.env_bt, lvl1.env_bt);
            result.push(AnalLevel {
                pressure,
                height: lerp(lvl0.height, lvl1.height),
                pcl_t: lerp(lvl0.pcl_t, lvl1.pcl_t),
                pcl_bt: env_bt,
                env_bt,
                env_tv: lerp(lvl0.env_tv, lvl1.env_tv),
            });
        }
    }

    if let Some(last) = levels.last() {
        result.push(*last);
    }

    result
}

/// Bottom and top level indexes of each positively buoyant layer, starting at `start`.
fn positive_layers(levels: &[AnalLevel], start: usize) -> Vec<(usize, usize)> {
    let mut layers = vec![];
    let mut bottom: Option<usize> = None;

    for i in start..levels.len().saturating_sub(1) {
        let positive = levels[i].buoyancy() + levels[i + 1].buoyancy() > 0.0;

        match (positive, bottom) {
            (true, None) => bottom = Some(i),
            (false, Some(b)) => {
                layers.push((b, i));
                bottom = None;
            }
            _ => {}
        }
    }

    if let Some(b) = bottom {
        layers.push((b, levels.len() - 1));
    }

    layers
}

/// `Rd * integral (Tp - Te) d ln(p)` across the layer between two levels, trapezoidal rule.
#[inline]
fn layer_energy(lvl0: &AnalLevel, lvl1: &AnalLevel) -> f64 {
    RD * 0.5 * (lvl0.buoyancy() + lvl1.buoyancy()) * (lvl0.pressure / lvl1.pressure).ln()
}
