use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

use crate::classify::MunicipalityType;

/// Age band label to head count (or share), in source order.
pub type AgeDistribution = IndexMap<String, Number>;

/// A JSON `null` in place of a mapping counts the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

fn object_or_empty<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .filter(|v| !v.is_null())
        .unwrap_or_else(empty_object))
}

// ---- japan_area_codes.json ----

#[derive(Debug, Default, Deserialize)]
pub struct AreaCodes {
    #[serde(default, deserialize_with = "null_as_default")]
    pub prefectures: IndexMap<String, CatalogPrefecture>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogPrefecture {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    /// Municipality code to municipality name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cities: IndexMap<String, String>,
}

// ---- japan_regions.json ----

#[derive(Debug, Deserialize)]
pub struct RegionsDocument {
    #[serde(default = "empty_object", deserialize_with = "object_or_empty")]
    pub medical_demand_patterns: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub prefectures: IndexMap<String, RegionStats>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegionStats {
    #[serde(default)]
    pub population: Option<i64>,
    #[serde(default)]
    pub age_distribution: Option<AgeDistribution>,
    #[serde(default)]
    pub medical_facilities: Option<i64>,
    #[serde(default)]
    pub facilities_per_10000: Option<Number>,
    /// Keys are arbitrary; entries are matched by `name`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub major_cities: IndexMap<String, CityDetail>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CityDetail {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub population: Option<i64>,
    #[serde(default)]
    pub age_distribution: Option<AgeDistribution>,
    #[serde(default)]
    pub medical_facilities: Option<i64>,
    #[serde(default)]
    pub facilities_per_10000: Option<Number>,
}

// ---- estat_api_params.json ----

#[derive(Debug, Deserialize)]
pub struct EstatParams {
    #[serde(default = "empty_object", deserialize_with = "object_or_empty")]
    pub api_endpoints: Value,
    #[serde(default = "empty_object", deserialize_with = "object_or_empty")]
    pub stats_tables: Value,
    #[serde(default = "empty_object", deserialize_with = "object_or_empty")]
    pub cache_settings: Value,
}

impl Default for RegionsDocument {
    fn default() -> Self {
        Self {
            medical_demand_patterns: empty_object(),
            prefectures: IndexMap::new(),
        }
    }
}

impl Default for EstatParams {
    fn default() -> Self {
        Self {
            api_endpoints: empty_object(),
            stats_tables: empty_object(),
            cache_settings: empty_object(),
        }
    }
}

// ---- japan_regional_master.json ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    pub population: i64,
    pub age_distribution: AgeDistribution,
    pub medical_facilities: i64,
    pub facilities_per_10000: Number,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MunicipalityEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MunicipalityType,
    pub fallback_data: Demographics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefectureEntry {
    pub name: String,
    pub code: String,
    pub fallback_data: Demographics,
    pub cities: IndexMap<String, MunicipalityEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub endpoints: Value,
    pub stats_tables: Value,
    pub cache_settings: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_prefectures: usize,
    pub total_cities: usize,
    pub data_sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Master {
    pub description: String,
    pub version: String,
    pub updated: String,
    pub api_config: ApiConfig,
    pub medical_demand_patterns: Value,
    pub regions: IndexMap<String, PrefectureEntry>,
    pub statistics: Statistics,
}
