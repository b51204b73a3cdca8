//! Local capabilities the model may ask to call.
//!
//! A [`Capability`] declares itself to the model and handles a typed argument
//! struct. The registry stores capabilities behind the object-safe [`Handler`]
//! trait, which owns payload decoding so a capability body never sees a
//! malformed payload.

mod builtin;
pub mod registry;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};

pub use builtin::{GetTime, GetWeather, UNKNOWN_CITY_TIME, UNKNOWN_CITY_WEATHER};
pub use registry::{CapabilityRegistry, RegistryError};

/// What the model is told about a capability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilityDeclaration {
    pub name: String,
    pub description: String,
    #[serde(rename = "parameters")]
    pub parameter_schema: Value,
}

pub trait Capability: Send + Sync {
    type Args: DeserializeOwned;

    fn declaration(&self) -> CapabilityDeclaration;

    /// Capabilities are total: every decoded argument set yields an answer.
    fn call(&self, args: Self::Args) -> String;
}

pub trait Handler: Send + Sync {
    fn declaration(&self) -> CapabilityDeclaration;
    fn invoke(&self, arguments: &str) -> serde_json::Result<String>;
}

impl<C: Capability> Handler for C {
    fn declaration(&self) -> CapabilityDeclaration {
        Capability::declaration(self)
    }

    fn invoke(&self, arguments: &str) -> serde_json::Result<String> {
        let args = decode_arguments::<C::Args>(arguments)?;
        Ok(self.call(args))
    }
}

/// Decodes an argument payload, which must be a JSON object.
pub fn decode_arguments<T: DeserializeOwned>(raw: &str) -> serde_json::Result<T> {
    let object: Map<String, Value> = serde_json::from_str(raw)?;
    T::deserialize(Value::Object(object))
}

/// Arguments shared by the city lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CityArgs {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub city: String,
}

// Models occasionally send `null` or a number here; those read as no city.
fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(city) => city,
        _ => String::new(),
    })
}

pub(crate) fn city_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "city": { "type": "string" }
        },
        "required": ["city"]
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{CityArgs, decode_arguments};

    #[test]
    fn decode_arguments_reads_city() {
        let args: CityArgs = decode_arguments(r#"{"city":"Tokyo"}"#).expect("should decode");
        assert_eq!(args.city, "Tokyo");
    }

    #[test]
    fn decode_arguments_ignores_extra_fields() {
        let args: CityArgs =
            decode_arguments(r#"{"city":"Tokyo","unit":"celsius"}"#).expect("should decode");
        assert_eq!(args.city, "Tokyo");
    }

    #[test]
    fn missing_or_mistyped_city_reads_as_empty() {
        for raw in [r#"{}"#, r#"{"city":42}"#, r#"{"city":null}"#, r#"{"city":["Tokyo"]}"#] {
            let args: CityArgs = decode_arguments(raw).expect("object payload should decode");
            assert_eq!(args, CityArgs::default(), "payload: {raw}");
        }
    }

    #[test]
    fn decode_arguments_rejects_malformed_json() {
        assert!(decode_arguments::<CityArgs>(r#"{"city":"#).is_err());
        assert!(decode_arguments::<CityArgs>("").is_err());
    }

    #[test]
    fn decode_arguments_rejects_non_objects() {
        assert!(decode_arguments::<CityArgs>(r#"["Tokyo"]"#).is_err());
        assert!(decode_arguments::<CityArgs>(r#""Tokyo""#).is_err());
        assert!(decode_arguments::<CityArgs>("null").is_err());
    }

    #[test]
    fn city_schema_requires_a_string_city() {
        assert_eq!(
            super::city_schema(),
            json!({
                "type": "object",
                "properties": { "city": { "type": "string" } },
                "required": ["city"]
            })
        );
    }
}
