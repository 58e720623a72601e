use crate::display::ShowMetadata;

/// Text fields and timing shown for one arriving flight.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlightMessage {
    /// Short code drawn on the left of the header row, usually the origin IATA code.
    pub origin_code: String,
    /// Label drawn right-aligned on the header row.
    pub flight_number: String,
    pub city: String,
    pub aircraft: String,
    /// Estimated minus scheduled arrival, in seconds. Negative means early.
    pub delay_secs: i64,
}

impl FlightMessage {
    pub fn new(
        origin_code: impl Into<String>,
        flight_number: impl Into<String>,
        city: impl Into<String>,
        aircraft: impl Into<String>,
        delay_secs: i64,
    ) -> Self {
        Self {
            origin_code: origin_code.into(),
            flight_number: flight_number.into(),
            city: city.into(),
            aircraft: aircraft.into(),
            delay_secs,
        }
    }

    /// Builds a message from scheduled and estimated arrival timestamps (seconds).
    pub fn from_times(
        origin_code: impl Into<String>,
        flight_number: impl Into<String>,
        city: impl Into<String>,
        aircraft: impl Into<String>,
        scheduled: i64,
        estimated: i64,
    ) -> Self {
        Self::new(origin_code, flight_number, city, aircraft, estimated.saturating_sub(scheduled))
    }

    /// Metadata naming this message when it is published to a sink.
    pub fn metadata(&self) -> ShowMetadata {
        let mut metadata = ShowMetadata::with_label(&self.flight_number);
        metadata.insert("origin_code", &self.origin_code);
        metadata.insert("city", &self.city);
        metadata.insert("aircraft", &self.aircraft);
        metadata
    }
}
