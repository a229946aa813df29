//! Country → state → city catalog backing the cascading selects on the
//! personal details step.

mod normalizer;
mod parser;

use std::io::Read;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::domain::{CityChoice, LocationId};

const BUNDLED_DATASET: &str = include_str!("../../../data/locations.json");

/// Label of the sentinel option offered for states without cities.
pub const NO_CITIES_LABEL: &str = "No cities available";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct City {
    pub id: LocationId,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct State {
    pub id: LocationId,
    pub code: String,
    pub name: String,
    pub cities: Vec<City>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Country {
    pub id: LocationId,
    pub code: String,
    pub name: String,
    pub states: Vec<State>,
}

/// Errors raised while reading the location dataset.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read location dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("location dataset is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("location dataset must be an array of countries or an object with a `countries` array")]
    Shape,
}

/// Select entry for countries and states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationOption {
    pub id: LocationId,
    pub label: String,
}

/// Select entry for cities, including the sentinel for states with none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CityOption {
    City { id: LocationId, label: String },
    NoneAvailable { label: &'static str },
}

impl CityOption {
    pub fn choice(&self) -> CityChoice {
        match self {
            Self::City { id, .. } => CityChoice::City(*id),
            Self::NoneAvailable { .. } => CityChoice::NoneAvailable,
        }
    }
}

/// Loaded dataset. Lookups are linear scans; id `0` never matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationCatalog {
    countries: Vec<Country>,
}

impl LocationCatalog {
    pub fn new(countries: Vec<Country>) -> Self {
        Self { countries }
    }

    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        let catalog = Self::from_json_str(&raw)?;
        info!(
            path = %path.display(),
            countries = catalog.countries.len(),
            "location catalog loaded"
        );
        Ok(catalog)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let document: Value = serde_json::from_reader(reader)?;
        Ok(Self::new(parser::parse_countries(&document)?))
    }

    pub fn from_json_str(raw: &str) -> Result<Self, LoadError> {
        let document: Value = serde_json::from_str(raw)?;
        Ok(Self::new(parser::parse_countries(&document)?))
    }

    /// Small dataset compiled into the crate, used when no path is configured.
    pub fn bundled() -> Result<Self, LoadError> {
        Self::from_json_str(BUNDLED_DATASET)
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn find_country(&self, country_id: LocationId) -> Option<&Country> {
        if country_id == 0 {
            return None;
        }
        self.countries.iter().find(|country| country.id == country_id)
    }

    pub fn find_state(&self, country_id: LocationId, state_id: LocationId) -> Option<&State> {
        if state_id == 0 {
            return None;
        }
        self.find_country(country_id)?
            .states
            .iter()
            .find(|state| state.id == state_id)
    }

    pub fn find_cities(&self, country_id: LocationId, state_id: LocationId) -> Option<&[City]> {
        self.find_state(country_id, state_id)
            .map(|state| state.cities.as_slice())
    }

    pub fn find_city(
        &self,
        country_id: LocationId,
        state_id: LocationId,
        city_id: LocationId,
    ) -> Option<&City> {
        if city_id == 0 {
            return None;
        }
        self.find_cities(country_id, state_id)?
            .iter()
            .find(|city| city.id == city_id)
    }

    pub fn country_options(&self) -> Vec<LocationOption> {
        self.countries
            .iter()
            .filter(|country| country.id != 0)
            .map(|country| LocationOption {
                id: country.id,
                label: country.name.clone(),
            })
            .collect()
    }

    pub fn state_options(&self, country_id: LocationId) -> Vec<LocationOption> {
        self.find_country(country_id)
            .map(|country| {
                country
                    .states
                    .iter()
                    .filter(|state| state.id != 0)
                    .map(|state| LocationOption {
                        id: state.id,
                        label: state.name.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Cities for the selected state. A state without cities yields exactly
    /// the sentinel option; an unknown state yields nothing.
    pub fn city_options(&self, country_id: LocationId, state_id: LocationId) -> Vec<CityOption> {
        let Some(cities) = self.find_cities(country_id, state_id) else {
            return Vec::new();
        };

        if cities.is_empty() {
            return vec![CityOption::NoneAvailable {
                label: NO_CITIES_LABEL,
            }];
        }

        cities
            .iter()
            .filter(|city| city.id != 0)
            .map(|city| CityOption::City {
                id: city.id,
                label: city.name.clone(),
            })
            .collect()
    }
}
