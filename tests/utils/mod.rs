use metfor::{Celsius, HectoPascal, Knots, Meters, WindSpdDir};
use optional::Optioned;
use skewt_engine::{Sounding, StationInfo};
use std::{collections::HashMap, fs::File, io::Read, path::PathBuf, str::FromStr};

#[allow(unused_macros)] // False alarm
macro_rules! check_file_complete {
    ($test_name:ident, $fname:expr) => {
        #[test]
        fn $test_name() {
            let (snd, fvals) = utils::load_test_file($fname);

            assert!(
                skewt_engine::EnvironmentProfile::from_sounding(&snd).is_ok(),
                "Failed validation."
            );

            let fval_keys = [
                "lcl pressure",
                "lfc pressure",
                "el pressure",
                "cape",
                "cin",
            ];

            // Make sure all of these keys are in the hashmap
            for key in fval_keys.iter() {
                assert!(fvals.contains_key(*key), "missing key: {}", key);
            }

            // Make sure there are no extra keys in there being ignored.
            for key in fvals.keys() {
                assert!(fval_keys.contains(&key.as_str()), "extra key found: {}", key);
            }

            // Every expectation is either a range or absent.
            for vals in fvals.values() {
                assert!(vals.is_empty() || (vals.len() == 2 && vals[0] <= vals[1]));
            }
        }
    };
}

#[allow(unused_macros)] // False alarm
macro_rules! test_file {
    ($test_mod_name:ident, $fname:expr) => {
        mod $test_mod_name {
            use crate::utils;
            use metfor::{HectoPascal, Quantity};
            use skewt_engine::{lift_parcel, DiagramConfig, EnvironmentProfile, SkewTProjection};
            use std::collections::HashMap;

            fn load_data() -> (EnvironmentProfile, HashMap<String, Vec<f64>>) {
                let (snd, fvals) = utils::load_test_file($fname);
                let profile = EnvironmentProfile::from_sounding(&snd).expect("bad test profile");
                (profile, fvals)
            }

            #[test]
            fn parcel_levels() {
                let (profile, fvals) = load_data();
                let anal = lift_parcel(&profile, 0usize, &DiagramConfig::default()).unwrap();

                utils::check_range(anal.lcl_pressure().unpack(), &fvals, "lcl pressure");
                utils::check_optional(
                    anal.lfc_pressure().map_t(|p: HectoPascal| p.unpack()),
                    &fvals,
                    "lfc pressure",
                );
                utils::check_optional(
                    anal.el_pressure().map_t(|p: HectoPascal| p.unpack()),
                    &fvals,
                    "el pressure",
                );
            }

            #[test]
            fn cape_cin() {
                let (profile, fvals) = load_data();
                let anal = lift_parcel(&profile, 0usize, &DiagramConfig::default()).unwrap();

                assert!(anal.cape().unpack() >= 0.0);
                assert!(anal.cin().unpack() <= 0.0);
                utils::check_range(anal.cape().unpack(), &fvals, "cape");
                utils::check_range(anal.cin().unpack(), &fvals, "cin");
            }

            #[test]
            fn grid_refinement() {
                let (profile, _) = load_data();
                let coarse = DiagramConfig::default();
                let fine = DiagramConfig {
                    step_hpa: coarse.step_hpa / 2.0,
                    ..DiagramConfig::default()
                };

                let coarse = lift_parcel(&profile, 0usize, &coarse).unwrap();
                let fine = lift_parcel(&profile, 0usize, &fine).unwrap();

                utils::check_converged(coarse.cape().unpack(), fine.cape().unpack(), "cape");
                utils::check_converged(coarse.cin().unpack(), fine.cin().unpack(), "cin");
            }

            #[test]
            fn projection_round_trip() {
                let (profile, _) = load_data();
                let proj = SkewTProjection::new(&DiagramConfig::default()).unwrap();

                for (&p, &t) in profile.pressure().iter().zip(profile.temperature()) {
                    let back = proj.to_physical(proj.to_plot(p, t).unwrap());
                    assert!((back.pressure.unpack() - p.unpack()).abs() < 1.0e-9);
                    assert!((back.temperature.unpack() - t.unpack()).abs() < 1.0e-9);
                }
            }
        }
    };
}

pub fn load_test_file(fname: &str) -> (Sounding, HashMap<String, Vec<f64>>) {
    let mut test_path = PathBuf::new();
    test_path.push("test_data");
    test_path.push(fname);
    load_test_csv_sounding(&test_path)
}

/// Check a value against a `[min, max]` expectation from the analysis section.
#[allow(dead_code)] // False alarm - lint is done before macro expansion.
pub fn check_range(val: f64, fvals: &HashMap<String, Vec<f64>>, key: &str) {
    let range = &fvals[key];
    assert_eq!(range.len(), 2, "{} must be a range", key);
    assert!(
        val >= range[0] && val <= range[1],
        "{} = {} is outside [{}, {}]",
        key,
        val,
        range[0],
        range[1]
    );
}

/// An empty expectation means the value must be missing.
#[allow(dead_code)] // False alarm - lint is done before macro expansion.
pub fn check_optional(val: Optioned<f64>, fvals: &HashMap<String, Vec<f64>>, key: &str) {
    if fvals[key].is_empty() {
        assert!(val.is_none(), "{} should be absent, got {:?}", key, val);
    } else {
        check_range(val.into_option().expect("missing value"), fvals, key);
    }
}

/// Halving the step may change an integral by no more than 1%. Differences under 0.1 J/kg are
/// below what the analysis can resolve.
#[allow(dead_code)] // False alarm - lint is done before macro expansion.
pub fn check_converged(coarse: f64, fine: f64, what: &str) {
    let diff = (coarse - fine).abs();
    assert!(
        diff <= 0.01 * fine.abs() || diff < 0.1,
        "{} changed from {} to {}",
        what,
        coarse,
        fine
    );
}

fn parse_wind(wspd: Option<f64>, wdir: Option<f64>) -> Option<WindSpdDir<Knots>> {
    wspd.and_then(|wspd| {
        wdir.map(|wdir| WindSpdDir {
            speed: Knots(wspd),
            direction: wdir,
        })
    })
}

fn load_test_csv_sounding(location: &PathBuf) -> (Sounding, HashMap<String, Vec<f64>>) {
    let mut f = File::open(location).expect(&format!("Error opening file: {:#?}", location));

    let mut contents = String::new();
    f.read_to_string(&mut contents)
        .expect(&format!("Error reading file: {:#?}", location));

    let lines: Vec<&str> = contents.split('\n').collect();
    let mut line_iter = lines.iter();

    //
    // Parse profile data
    //
    let mut height: Vec<Optioned<Meters>> = Vec::with_capacity(lines.len());
    let mut temp: Vec<Optioned<Celsius>> = Vec::with_capacity(lines.len());
    let mut dp: Vec<Optioned<Celsius>> = Vec::with_capacity(lines.len());
    let mut press: Vec<Optioned<HectoPascal>> = Vec::with_capacity(lines.len());
    let mut wind: Vec<Optioned<WindSpdDir<Knots>>> = Vec::with_capacity(lines.len());

    for line in line_iter.by_ref() {
        if line.starts_with("### Surface Data ###")
            || line.starts_with("### Analysis Float Section ###")
        {
            break;
        }

        let tokens: Vec<&str> = line.split(',').collect();
        if tokens.len() < 6 {
            continue;
        }

        height.push(f64::from_str(tokens[0]).ok().map(Meters).into());
        temp.push(f64::from_str(tokens[1]).ok().map(Celsius).into());
        dp.push(f64::from_str(tokens[2]).ok().map(Celsius).into());
        press.push(f64::from_str(tokens[3]).ok().map(HectoPascal).into());
        wind.push(
            parse_wind(
                f64::from_str(tokens[4]).ok(),
                f64::from_str(tokens[5]).ok(),
            )
            .into(),
        );
    }

    //
    // Surface data, the station info has to go in before the height profile.
    //
    let mut snd = Sounding::new().with_source_description("test data".to_owned());
    let mut surface: Option<Vec<&str>> = None;
    for line in line_iter.by_ref() {
        if line.starts_with("### Analysis Float Section ###") {
            break;
        }

        let tokens: Vec<&str> = line.split(',').collect();
        if tokens.len() >= 6 {
            surface = Some(tokens);
        }
    }

    if let Some(tokens) = &surface {
        let elevation = f64::from_str(tokens[0]).ok().map(Meters);
        snd = snd.with_station_info(StationInfo::new().with_elevation(elevation));
    }

    snd = snd
        .with_height_profile(height)
        .with_temperature_profile(temp)
        .with_dew_point_profile(dp)
        .with_pressure_profile(press)
        .with_wind_profile(wind);

    if let Some(tokens) = surface {
        let t_c = f64::from_str(tokens[1]).ok().map(Celsius);
        let dp_c = f64::from_str(tokens[2]).ok().map(Celsius);
        let press_hpa = f64::from_str(tokens[3]).ok().map(HectoPascal);
        let wind = parse_wind(f64::from_str(tokens[4]).ok(), f64::from_str(tokens[5]).ok());

        snd = snd
            .with_sfc_temperature(t_c)
            .with_sfc_dew_point(dp_c)
            .with_station_pressure(press_hpa)
            .with_sfc_wind(wind);
    }

    //
    // Float values, a key followed by any number of values.
    //
    let mut target_float_vals = HashMap::new();
    for line in line_iter {
        let tokens: Vec<String> = line
            .split(',')
            .filter_map(|val| {
                let v = val.trim();
                if v != "" {
                    Some(v.to_owned())
                } else {
                    None
                }
            })
            .collect();

        if tokens.is_empty() {
            continue;
        }

        let key = tokens[0].clone();
        let vals: Vec<f64> = tokens[1..]
            .iter()
            .map(|val| f64::from_str(val).expect("bad analysis value"))
            .collect();

        target_float_vals.insert(key, vals);
    }

    (snd, target_float_vals)
}
