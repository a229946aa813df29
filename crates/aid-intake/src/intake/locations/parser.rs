use serde_json::{Map, Value};
use tracing::warn;

use super::normalizer::{explicit_code, explicit_id, synthesize_code};
use super::{City, Country, LoadError, State};

const UNKNOWN_NAME: &str = "Unknown";

const TOP_LEVEL_KEYS: &[&str] = &["countries"];

const COUNTRY_NAME_KEYS: &[&str] = &["name", "country", "country_name"];
const COUNTRY_CODE_KEYS: &[&str] = &["iso2", "iso3", "code"];
const COUNTRY_STATE_KEYS: &[&str] = &["states", "statesProvinces"];

const STATE_NAME_KEYS: &[&str] = &["name", "state", "state_name"];
const STATE_CODE_KEYS: &[&str] = &["state_code", "code", "iso2"];
const STATE_CITY_KEYS: &[&str] = &["cities", "city"];

const CITY_NAME_KEYS: &[&str] = &["name", "city"];
const CITY_CODE_KEYS: &[&str] = &["id", "geonameid", "code"];

const ID_KEYS: &[&str] = &["id"];

/// Parse the dataset document into countries.
pub(crate) fn parse_countries(document: &Value) -> Result<Vec<Country>, LoadError> {
    let entries = match document {
        Value::Array(entries) => entries,
        Value::Object(object) => first_array(object, TOP_LEVEL_KEYS).ok_or(LoadError::Shape)?,
        _ => return Err(LoadError::Shape),
    };

    Ok(objects(entries, "country").map(parse_country).collect())
}

fn parse_country(object: &Map<String, Value>) -> Country {
    let name = first_name(object, COUNTRY_NAME_KEYS);
    let code = first_code(object, COUNTRY_CODE_KEYS).unwrap_or_else(|| synthesize_code(&name));
    let states = first_array(object, COUNTRY_STATE_KEYS)
        .map(|entries| objects(entries, "state").map(parse_state).collect())
        .unwrap_or_default();

    Country {
        id: first_id(object),
        code,
        name,
        states,
    }
}

fn parse_state(object: &Map<String, Value>) -> State {
    let name = first_name(object, STATE_NAME_KEYS);
    let code = first_code(object, STATE_CODE_KEYS).unwrap_or_else(|| synthesize_code(&name));
    let cities = first_array(object, STATE_CITY_KEYS)
        .map(|entries| objects(entries, "city").map(parse_city).collect())
        .unwrap_or_default();

    State {
        id: first_id(object),
        code,
        name,
        cities,
    }
}

fn parse_city(object: &Map<String, Value>) -> City {
    let name = first_name(object, CITY_NAME_KEYS);
    let code = first_code(object, CITY_CODE_KEYS).unwrap_or_else(|| synthesize_code(&name));

    City {
        id: first_id(object),
        code,
        name,
    }
}

fn objects<'a>(
    entries: &'a [Value],
    level: &'static str,
) -> impl Iterator<Item = &'a Map<String, Value>> + 'a {
    entries.iter().enumerate().filter_map(move |(index, entry)| {
        let object = entry.as_object();
        if object.is_none() {
            warn!(kind = level, index, "skipping non-object location entry");
        }
        object
    })
}

fn first_name(object: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| object.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_NAME)
        .to_string()
}

fn first_code(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(explicit_code)
}

fn first_array<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Vec<Value>> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(Value::as_array)
}

/// Missing or unparsable ids become `0`, which lookups never match.
fn first_id(object: &Map<String, Value>) -> u64 {
    ID_KEYS
        .iter()
        .filter_map(|key| object.get(*key))
        .find_map(explicit_id)
        .unwrap_or(0)
}
