use metfor::{Celsius, HectoPascal, Knots, Meters, WindSpdDir};
use optional::Optioned;

/// One level of a `Sounding`, with every value possibly missing.
#[derive(Clone, Default, Copy, Debug, PartialEq)]
pub struct DataRow {
    /// Pressure
    pub pressure: Optioned<HectoPascal>,
    /// Temperature
    pub temperature: Optioned<Celsius>,
    /// Dew point
    pub dew_point: Optioned<Celsius>,
    /// Wind speed and direction
    pub wind: Optioned<WindSpdDir<Knots>>,
    /// Geopotential height
    pub height: Optioned<Meters>,
}

impl DataRow {
    /// True if the row has everything a thermodynamic analysis needs: pressure, temperature and
    /// dew point.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.pressure.is_some() && self.temperature.is_some() && self.dew_point.is_some()
    }
}
