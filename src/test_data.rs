//! Profiles used in unit tests.
use crate::{profile::EnvironmentProfile, sounding::Sounding};
use metfor::{Celsius, HectoPascal};
use optional::{none, some, Optioned};

/// Build a sounding from raw columns, `NaN` is a missing value.
pub(crate) fn make_sounding(p: &[f64], t: &[f64], td: &[f64]) -> Sounding {
    fn column<T: optional::Noned + Copy>(vals: &[f64], wrap: fn(f64) -> T) -> Vec<Optioned<T>> {
        vals.iter()
            .map(|&v| if v.is_nan() { none() } else { some(wrap(v)) })
            .collect()
    }

    Sounding::new()
        .with_pressure_profile(column(p, HectoPascal))
        .with_temperature_profile(column(t, Celsius))
        .with_dew_point_profile(column(td, Celsius))
}

fn make_profile(p: &[f64], t: &[f64], td: &[f64]) -> EnvironmentProfile {
    let p: Vec<HectoPascal> = p.iter().cloned().map(HectoPascal).collect();
    let t: Vec<Celsius> = t.iter().cloned().map(Celsius).collect();
    let td: Vec<Celsius> = td.iter().cloned().map(Celsius).collect();

    EnvironmentProfile::new(&p, &t, &td).unwrap()
}

/// A moist boundary layer under a conditionally unstable troposphere, a classic summer afternoon.
pub(crate) fn convective_profile() -> EnvironmentProfile {
    make_profile(
        &[
            1000.0, 975.0, 950.0, 925.0, 900.0, 850.0, 800.0, 750.0, 700.0, 650.0, 600.0, 550.0,
            500.0, 450.0, 400.0, 350.0, 300.0, 250.0, 200.0, 150.0, 100.0,
        ],
        &[
            30.0, 27.5, 25.2, 23.0, 21.0, 17.0, 13.0, 9.0, 5.0, 0.5, -4.0, -9.0, -14.0, -20.0,
            -27.0, -35.0, -43.0, -52.0, -58.0, -60.0, -62.0,
        ],
        &[
            22.0, 20.0, 18.5, 17.0, 15.0, 11.0, 5.0, 0.0, -5.0, -10.0, -15.0, -20.0, -25.0, -32.0,
            -40.0, -47.0, -55.0, -63.0, -70.0, -75.0, -80.0,
        ],
    )
}

/// Dry at the surface with the deepest moisture near 900 hPa.
pub(crate) fn elevated_moisture_profile() -> EnvironmentProfile {
    make_profile(
        &[1000.0, 950.0, 900.0, 850.0, 700.0, 500.0, 300.0, 200.0, 100.0],
        &[20.0, 18.0, 17.0, 14.0, 4.0, -15.0, -42.0, -55.0, -60.0],
        &[5.0, 10.0, 14.0, 9.0, -6.0, -30.0, -55.0, -70.0, -80.0],
    )
}

/// A deep inversion, every lifted parcel is colder than its surroundings.
pub(crate) fn warm_profile() -> EnvironmentProfile {
    make_profile(
        &[1000.0, 850.0, 700.0, 500.0, 300.0, 100.0],
        &[20.0, 25.0, 25.0, 20.0, 10.0, 0.0],
        &[10.0, 0.0, -10.0, -20.0, -40.0, -60.0],
    )
}
