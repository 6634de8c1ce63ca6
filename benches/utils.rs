use metfor::{Celsius, HectoPascal, Knots, Meters, WindSpdDir};
use optional::Optioned;
use skewt_engine::{EnvironmentProfile, Sounding, StationInfo};
use std::{fs::File, io::Read, path::PathBuf, str::FromStr};

pub fn load_all_test_files() -> [EnvironmentProfile; 3] {
    let prof1 = load_test_file("convective.csv");
    let prof2 = load_test_file("capped.csv");
    let prof3 = load_test_file("stable.csv");

    [prof1, prof2, prof3]
}

fn load_test_file(fname: &str) -> EnvironmentProfile {
    let mut test_path = PathBuf::new();
    test_path.push("test_data");
    test_path.push(fname);
    let snd = load_test_csv_sounding(&test_path);

    EnvironmentProfile::from_sounding(&snd).expect("invalid test sounding")
}

fn parse_row(line: &str) -> Option<[Option<f64>; 6]> {
    let tokens: Vec<&str> = line.split(',').collect();
    if tokens.len() < 6 {
        return None;
    }

    let mut vals = [None; 6];
    for (val, token) in vals.iter_mut().zip(tokens) {
        *val = f64::from_str(token).ok();
    }

    Some(vals)
}

fn make_wind(wspd: Option<f64>, wdir: Option<f64>) -> Option<WindSpdDir<Knots>> {
    wspd.and_then(|wspd| {
        wdir.map(|wdir| WindSpdDir {
            speed: Knots(wspd),
            direction: wdir,
        })
    })
}

fn load_test_csv_sounding(location: &PathBuf) -> Sounding {
    let mut f = File::open(location).expect(&format!("Error opening file: {:#?}", location));

    let mut contents = String::new();
    f.read_to_string(&mut contents)
        .expect(&format!("Error reading file: {:#?}", location));

    let mut line_iter = contents.lines();

    //
    // Parse profile data
    //
    let mut height: Vec<Optioned<Meters>> = vec![];
    let mut temp: Vec<Optioned<Celsius>> = vec![];
    let mut dp: Vec<Optioned<Celsius>> = vec![];
    let mut press: Vec<Optioned<HectoPascal>> = vec![];
    let mut wind: Vec<Optioned<WindSpdDir<Knots>>> = vec![];

    for line in line_iter.by_ref() {
        if line.starts_with("###") {
            break;
        }

        if let Some([h, t, td, p, wspd, wdir]) = parse_row(line) {
            height.push(h.map(Meters).into());
            temp.push(t.map(Celsius).into());
            dp.push(td.map(Celsius).into());
            press.push(p.map(HectoPascal).into());
            wind.push(make_wind(wspd, wdir).into());
        }
    }

    //
    // Surface data
    //
    let sfc = line_iter
        .take_while(|line| !line.starts_with("###"))
        .filter_map(parse_row)
        .last();

    let mut snd = Sounding::new();
    if let Some([h, ..]) = sfc {
        snd = snd.with_station_info(StationInfo::new().with_elevation(h.map(Meters)));
    }

    snd = snd
        .with_height_profile(height)
        .with_temperature_profile(temp)
        .with_dew_point_profile(dp)
        .with_pressure_profile(press)
        .with_wind_profile(wind);

    if let Some([_, t, td, p, wspd, wdir]) = sfc {
        snd = snd
            .with_sfc_temperature(t.map(Celsius))
            .with_sfc_dew_point(td.map(Celsius))
            .with_station_pressure(p.map(HectoPascal))
            .with_sfc_wind(make_wind(wspd, wdir));
    }

    snd
}
