use tracing::debug;

use super::{Capability, CapabilityDeclaration, CityArgs, city_schema};

pub const UNKNOWN_CITY_WEATHER: &str = "未知城市的天气";
pub const UNKNOWN_CITY_TIME: &str = "未知城市的时间";

const WEATHER_BY_CITY: &[(&str, &str)] = &[
    ("New York", "Sunny, 25°C"),
    ("Tokyo", "Cloudy, 22°C"),
    ("San Francisco", "Foggy, 18°C"),
];

const TIME_BY_CITY: &[(&str, &str)] = &[
    ("New York", "14:30 PM"),
    ("Tokyo", "03:30 AM"),
    ("San Francisco", "11:30 AM"),
];

fn lookup(table: &[(&str, &'static str)], city: &str, fallback: &'static str) -> &'static str {
    table
        .iter()
        .find(|(key, _)| *key == city)
        .map(|(_, value)| *value)
        .unwrap_or(fallback)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GetWeather;

impl Capability for GetWeather {
    type Args = CityArgs;

    fn declaration(&self) -> CapabilityDeclaration {
        CapabilityDeclaration {
            name: "getWeather".to_string(),
            description: "Get weather for a given city".to_string(),
            parameter_schema: city_schema(),
        }
    }

    fn call(&self, args: CityArgs) -> String {
        debug!(city = %args.city, "looking up weather");
        lookup(WEATHER_BY_CITY, &args.city, UNKNOWN_CITY_WEATHER).to_string()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GetTime;

impl Capability for GetTime {
    type Args = CityArgs;

    fn declaration(&self) -> CapabilityDeclaration {
        CapabilityDeclaration {
            name: "getTime".to_string(),
            description: "Get current time for a given city".to_string(),
            parameter_schema: city_schema(),
        }
    }

    fn call(&self, args: CityArgs) -> String {
        debug!(city = %args.city, "looking up time");
        lookup(TIME_BY_CITY, &args.city, UNKNOWN_CITY_TIME).to_string()
    }
}
