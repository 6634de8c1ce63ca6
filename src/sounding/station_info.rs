use metfor::Meters;
use optional::{Noned, Optioned};

/// Launch site metadata. Only the elevation enters the analysis, as the surface height.
///
/// ```rust
/// use metfor::{Feet, Meters};
/// use skewt_engine::StationInfo;
///
/// let blank = StationInfo::new();
/// assert!(blank.station_num().is_none());
/// assert!(blank.location().is_none());
/// assert!(blank.elevation().is_none());
///
/// let stn = StationInfo::new()
///     .with_station(72786)
///     .with_lat_lon((47.68, -117.63))
///     .with_elevation(Meters(728.0));
/// assert_eq!(stn.station_num().unwrap(), 72786);
/// assert_eq!(stn.location(), Some((47.68, -117.63)));
/// assert_eq!(stn.elevation().unwrap(), Meters(728.0));
///
/// // Any length unit works for the elevation.
/// let stn = stn.with_elevation(Feet(1000.0));
/// assert!((stn.elevation().unwrap().0 - 304.8).abs() < 1.0e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StationInfo {
    num: Optioned<i32>,
    lat_lon: Option<(f64, f64)>,
    elevation: Optioned<Meters>,
}

impl StationInfo {
    /// Station information with nothing filled in.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the WMO or USAF station number.
    #[inline]
    pub fn with_station<T>(mut self, number: T) -> Self
    where
        Optioned<i32>: From<T>,
    {
        self.num = Optioned::from(number);
        self
    }

    /// Set the latitude and longitude in degrees.
    #[inline]
    pub fn with_lat_lon<T>(mut self, coords: T) -> Self
    where
        Option<(f64, f64)>: From<T>,
    {
        self.lat_lon = Option::from(coords);
        self
    }

    /// Set the elevation of the launch site, or of the model terrain.
    #[inline]
    pub fn with_elevation<T, U>(mut self, elev: T) -> Self
    where
        Optioned<U>: From<T>,
        U: Noned + Copy + metfor::Length,
        Meters: From<U>,
    {
        let elev: Optioned<U> = Optioned::from(elev);
        self.elevation = elev.map_t(Meters::from);
        self
    }

    /// Station number.
    #[inline]
    pub fn station_num(&self) -> Optioned<i32> {
        self.num
    }

    /// Latitude and longitude.
    #[inline]
    pub fn location(&self) -> Option<(f64, f64)> {
        self.lat_lon
    }

    /// Elevation.
    #[inline]
    pub fn elevation(&self) -> Optioned<Meters> {
        self.elevation
    }
}
