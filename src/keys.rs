//! Enums used as keys for looking up analysis results.
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Indexes from a parcel analysis of a sounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, AsRefStr)]
pub enum ParcelIndex {
    /// Lifting Condensation Level, or LCL (hPa), pressure vertical coordinate.
    LCLPressure,
    /// Temperature at LCL (C)
    LCLTemperature,
    /// Lifting Condensation Level meters above the parcel origin
    LCLHeightAGL,
    /// Level of Free Convection (hPa), pressure vertical coordinate
    LFCPressure,
    /// Parcel temperature at the LFC (C)
    LFCTemperature,
    /// Level of Free Convection meters above the parcel origin
    LFCHeightAGL,
    /// Equilibrium Level (hPa), pressure vertical coordinate
    ELPressure,
    /// Equilibrium level temperature (degrees C)
    ELTemperature,
    /// Equilibrium level meters above the parcel origin
    ELHeightAGL,
    /// Convective Available Potential Energy, or CAPE. (J/kg)
    CAPE,
    /// Convective Inhibition, or CIN (J/kg)
    CIN,
    /// Normalized CAPE
    NCAPE,
    /// Updraft speed implied by CAPE (m/s)
    CAPESpeed,
}
