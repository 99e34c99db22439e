pub mod pacing;

use curl::easy::Easy;
use log::{debug, warn};
use serde::Deserialize;

use crate::projection::{Departure, TravelTimeLookup};

pub const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/directions/json";

// DirectionsSettings are the request parameters that do not change between calls.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DirectionsSettings {
    pub endpoint: String,
    // coaches follow driving routes
    pub mode: String,
    pub traffic_model: String,
}

impl Default for DirectionsSettings {
    fn default() -> Self {
        DirectionsSettings {
            endpoint: String::from(DEFAULT_ENDPOINT),
            mode: String::from("driving"),
            traffic_model: String::from("best_guess"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DirectionsError {
    #[error("Request failed: {0}")]
    Transfer(#[from] curl::Error),
    #[error("HTTP error {0}: {1}")]
    Http(u32, String),
    #[error("Malformed response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
    #[error("No route found")]
    NoRoute,
    #[error("API error {0}: {1}")]
    Api(String, String),
    #[error("Response has no duration in traffic")]
    MissingTrafficDuration,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsRoute {
    #[serde(default)]
    pub legs: Vec<Leg>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Leg {
    pub distance: TextValue,
    pub duration: TextValue,
    #[serde(default)]
    pub duration_in_traffic: Option<TextValue>,
    #[serde(default)]
    pub start_address: String,
    #[serde(default)]
    pub end_address: String,
}

impl Leg {
    pub fn traffic_minutes(&self) -> Result<f64, DirectionsError> {
        self.duration_in_traffic
            .as_ref()
            .map(|duration| duration.value / 60.0)
            .ok_or(DirectionsError::MissingTrafficDuration)
    }
}

// TextValue is the API's pairing of a display string with a raw value
// (metres for distances, seconds for durations).
#[derive(Debug, Clone, Deserialize)]
pub struct TextValue {
    pub text: String,
    pub value: f64,
}

// parse_response returns the first leg of the first route in a Directions API response body.
pub fn parse_response(body: &[u8]) -> Result<Leg, DirectionsError> {
    let response = serde_json::from_slice::<DirectionsResponse>(body)?;
    match response.status.as_str() {
        "OK" => response.routes
            .into_iter()
            .next()
            .and_then(|route| route.legs.into_iter().next())
            .ok_or(DirectionsError::NoRoute),
        "ZERO_RESULTS" | "NOT_FOUND" => Err(DirectionsError::NoRoute),
        _ => Err(DirectionsError::Api(
            response.status,
            response.error_message.unwrap_or_default(),
        )),
    }
}

pub struct GoogleDirections {
    api_key: String,
    settings: DirectionsSettings,
}

impl GoogleDirections {
    pub fn new(api_key: String, settings: DirectionsSettings) -> Self {
        GoogleDirections { api_key, settings }
    }

    // request_url builds the full query URL, encoding with the handle that will
    // make the request. The key is included, so the result must not be logged.
    pub fn request_url(&self, easy: &mut Easy, origin: &str, destination: &str, departure: Departure) -> String {
        let departure_time = match departure {
            Departure::Now => String::from("now"),
            Departure::At(instant) => instant.timestamp().to_string(),
        };
        let params = [
            ("origin", origin),
            ("destination", destination),
            ("mode", self.settings.mode.as_str()),
            ("departure_time", departure_time.as_str()),
            ("traffic_model", self.settings.traffic_model.as_str()),
            ("key", self.api_key.as_str()),
        ];
        let query = params.iter()
            .map(|(name, value)| format!("{}={}", name, easy.url_encode(value.as_bytes())))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.settings.endpoint, query)
    }

    // directions makes one Directions API call and returns the first leg.
    pub fn directions(&self, origin: &str, destination: &str, departure: Departure) -> Result<Leg, DirectionsError> {
        debug!("Requesting directions from '{}' to '{}'", origin, destination);
        let mut buf = Vec::new();
        let mut response = Easy::new();
        let url = self.request_url(&mut response, origin, destination, departure);
        response.url(&url)?;
        response.get(true)?;
        {
            let mut transfer = response.transfer();
            transfer.write_function(|data| {
                buf.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        match response.response_code()? {
            200 => parse_response(&buf),
            code => Err(DirectionsError::Http(code, String::from_utf8_lossy(&buf).into_owned())),
        }
    }
}

impl TravelTimeLookup for GoogleDirections {
    fn travel_minutes(&self, origin: &str, destination: &str, departure: Departure) -> Option<f64> {
        match self.directions(origin, destination, departure).and_then(|leg| leg.traffic_minutes()) {
            Ok(minutes) => Some(minutes),
            Err(DirectionsError::NoRoute) => {
                warn!("No route found from {} to {}", origin, destination);
                None
            }
            Err(e) => {
                warn!("Error getting directions from {} to {}: {}", origin, destination, e);
                None
            }
        }
    }
}
