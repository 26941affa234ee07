//! Decoder for search endpoint responses.
//!
//! Two source schemas are recognized and normalized into [`Location`]:
//!
//! - **Marker**: `{ id, name, tel, address, lat, lng }` (the id may arrive as `locationId`)
//! - **Entity**: `{ id, locationName: { locationName }, locationNumber: { locationNumber },
//!   locationAddress: { address }, latitude: { latitude }, longitude: { longitude } }`,
//!   where each wrapped value may also appear unwrapped.
//!
//! Anything else is rejected with [`SearchError::Decode`], which the executor treats
//! like any other remote failure.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, SearchError};
use crate::types::Location;

#[derive(Deserialize)]
struct MarkerRecord {
    #[serde(alias = "locationId")]
    id: u64,
    name: String,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    tel: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lng: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NameValue {
    Plain(String),
    Wrapped {
        #[serde(rename = "locationName")]
        location_name: String,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberValue {
    Plain(String),
    Wrapped {
        #[serde(rename = "locationNumber")]
        location_number: Option<String>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AddressValue {
    Plain(String),
    Wrapped { address: String },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LatitudeValue {
    Plain(f64),
    Wrapped { latitude: f64 },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LongitudeValue {
    Plain(f64),
    Wrapped { longitude: f64 },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityRecord {
    #[serde(alias = "locationId")]
    id: u64,
    location_name: NameValue,
    #[serde(default)]
    location_number: Option<NumberValue>,
    #[serde(default)]
    location_address: Option<AddressValue>,
    #[serde(default)]
    latitude: Option<LatitudeValue>,
    #[serde(default)]
    longitude: Option<LongitudeValue>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLocation {
    Marker(MarkerRecord),
    Entity(EntityRecord),
}

impl From<RawLocation> for Location {
    fn from(raw: RawLocation) -> Self {
        match raw {
            RawLocation::Marker(m) => Location {
                id: m.id,
                name: m.name,
                address: m.address.unwrap_or_default(),
                tel: m.tel.filter(|t| !t.is_empty()),
                lat: m.lat,
                lng: m.lng,
            },
            RawLocation::Entity(e) => Location {
                id: e.id,
                name: match e.location_name {
                    NameValue::Plain(s) => s,
                    NameValue::Wrapped { location_name } => location_name,
                },
                address: match e.location_address {
                    Some(AddressValue::Plain(s)) => s,
                    Some(AddressValue::Wrapped { address }) => address,
                    None => String::new(),
                },
                tel: match e.location_number {
                    Some(NumberValue::Plain(s)) => Some(s),
                    Some(NumberValue::Wrapped { location_number }) => location_number,
                    None => None,
                }
                .filter(|t| !t.is_empty()),
                lat: e.latitude.map(|v| match v {
                    LatitudeValue::Plain(x) => x,
                    LatitudeValue::Wrapped { latitude } => latitude,
                }),
                lng: e.longitude.map(|v| match v {
                    LongitudeValue::Plain(x) => x,
                    LongitudeValue::Wrapped { longitude } => longitude,
                }),
            },
        }
    }
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decode a single location-like JSON value.
pub fn decode_location(value: Value) -> Result<Location> {
    let shape = shape_name(&value);
    serde_json::from_value::<RawLocation>(value)
        .map(Location::from)
        .map_err(|_| SearchError::Decode(format!("{shape} matches no known location schema")))
}

/// Decode a response body. The body must be a JSON array of location records.
pub fn decode_locations(body: &[u8]) -> Result<Vec<Location>> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| SearchError::Decode(format!("invalid JSON: {e}")))?;
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(SearchError::Decode(format!(
                "expected a JSON array, got {}",
                shape_name(&other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            decode_location(item).map_err(|e| match e {
                SearchError::Decode(msg) => SearchError::Decode(format!("item {i}: {msg}")),
                other => other,
            })
        })
        .collect()
}

/// Load a pre-exported location list (either schema) from a JSON file.
pub fn load_locations_file(path: &Path) -> Result<Vec<Location>> {
    let body = std::fs::read(path)
        .map_err(|e| SearchError::Dataset(format!("{}: {e}", path.display())))?;
    decode_locations(&body).map_err(|e| SearchError::Dataset(format!("{}: {e}", path.display())))
}
