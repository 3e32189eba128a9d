use crate::poller::PollerError;
use crate::position::{PositionEntry, PositionRecord};

impl TryFrom<&PositionEntry> for PositionRecord {
    type Error = PollerError;

    fn try_from(entry: &PositionEntry) -> Result<Self, Self::Error> {
        let id = entry.id.trim();
        if id.is_empty() {
            return Err(PollerError::MalformedResponse("entry has no id".into()));
        }

        Ok(PositionRecord {
            id: id.to_string(),
            short_name: entry.shortname.trim().to_string(),
            latitude: parse_coordinate("satlatitude", &entry.satlatitude)?,
            longitude: parse_coordinate("satlongitude", &entry.satlongitude)?,
            altitude: parse_coordinate("sataltitude", &entry.sataltitude)?,
        })
    }
}

/// Parse the last entry of a response collection. Earlier entries are ignored.
pub fn select_latest(entries: &[PositionEntry]) -> Result<PositionRecord, PollerError> {
    let last = entries
        .last()
        .ok_or_else(|| PollerError::MalformedResponse("empty result set".into()))?;
    PositionRecord::try_from(last)
}

fn parse_coordinate(field: &str, raw: &str) -> Result<f64, PollerError> {
    let value: f64 = raw.trim().parse().map_err(|_| {
        PollerError::MalformedResponse(format!("{field}: '{raw}' is not a number"))
    })?;

    if !value.is_finite() {
        return Err(PollerError::MalformedResponse(format!(
            "{field}: '{raw}' is not finite"
        )));
    }
    Ok(value)
}
