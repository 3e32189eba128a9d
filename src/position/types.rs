use serde::{Deserialize, Serialize};
use std::fmt;

/// One observation of the tracked satellite, built from a fully parsed response entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PositionRecord {
    pub id: String,
    pub short_name: String,
    /// Decimal degrees.
    pub latitude: f64,
    /// Decimal degrees.
    pub longitude: f64,
    /// Kilometers.
    pub altitude: f64,
}

impl fmt::Display for PositionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Short Name: {}", self.short_name)?;
        writeln!(f, "Latitude: {} º", self.latitude)?;
        writeln!(f, "Longitude: {} º", self.longitude)?;
        write!(f, "Altitude: {} km", self.altitude)
    }
}

/// Raw string values of one entry of the service's position collection.
///
/// Elements absent from the response read as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionEntry {
    pub id: String,
    pub shortname: String,
    pub satlatitude: String,
    pub satlongitude: String,
    pub sataltitude: String,
}

impl PositionEntry {
    pub fn new(
        id: &str,
        shortname: &str,
        satlatitude: &str,
        satlongitude: &str,
        sataltitude: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            shortname: shortname.to_string(),
            satlatitude: satlatitude.to_string(),
            satlongitude: satlongitude.to_string(),
            sataltitude: sataltitude.to_string(),
        }
    }
}
