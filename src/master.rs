use indexmap::IndexMap;
use serde_json::Number;

use crate::classify::classify;
use crate::error::{Error, Result};
use crate::fallback::{find_detail, resolve_municipality, resolve_prefecture};
use crate::schema::{
    ApiConfig, Demographics, Master, MunicipalityEntry, PrefectureEntry, Statistics,
};
use crate::source::Sources;

pub const DESCRIPTION: &str = "日本全国地域マスターデータ（e-Stat API連携・統合版）";
pub const VERSION: &str = "3.0.0";
pub const UPDATED: &str = "2024-01";
pub const ESTAT_BASE_URL: &str = "http://api.e-stat.go.jp/rest/3.0/app/json";
pub const DATA_SOURCES: [&str; 3] = [
    "総務省 全国地方公共団体コード",
    "e-Stat 政府統計の総合窓口",
    "2024年推計値",
];

/// Walks the catalog in its own order and assembles the master tree.
pub fn build_master(sources: &Sources) -> Master {
    let mut regions = IndexMap::with_capacity(sources.area_codes.prefectures.len());

    for (pref_code, catalog) in &sources.area_codes.prefectures {
        let stats = sources.regions.prefectures.get(pref_code);
        let mut cities = IndexMap::with_capacity(catalog.cities.len());

        for (mun_code, mun_name) in &catalog.cities {
            let classification = classify(pref_code, mun_code);
            let detail = find_detail(stats, mun_name);
            cities.insert(
                mun_code.clone(),
                MunicipalityEntry {
                    name: mun_name.clone(),
                    kind: classification.kind,
                    fallback_data: resolve_municipality(&classification, detail, stats),
                },
            );
        }
        tracing::debug!(
            prefecture = %pref_code,
            cities = cities.len(),
            with_stats = stats.is_some(),
            "assembled prefecture"
        );

        let code = catalog
            .code
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| pref_code.clone());
        regions.insert(
            pref_code.clone(),
            PrefectureEntry {
                name: catalog.name.clone(),
                code,
                fallback_data: resolve_prefecture(stats),
                cities,
            },
        );
    }

    let statistics = Statistics {
        total_prefectures: regions.len(),
        total_cities: regions.values().map(|p| p.cities.len()).sum(),
        data_sources: DATA_SOURCES.iter().map(|s| s.to_string()).collect(),
    };

    Master {
        description: DESCRIPTION.to_string(),
        version: VERSION.to_string(),
        updated: UPDATED.to_string(),
        api_config: ApiConfig {
            base_url: ESTAT_BASE_URL.to_string(),
            endpoints: sources.estat.api_endpoints.clone(),
            stats_tables: sources.estat.stats_tables.clone(),
            cache_settings: sources.estat.cache_settings.clone(),
        },
        medical_demand_patterns: sources.regions.medical_demand_patterns.clone(),
        regions,
        statistics,
    }
}

fn is_negative(n: &Number) -> bool {
    n.as_f64().map_or(false, |v| v < 0.0)
}

fn check_demographics(owner: &str, d: &Demographics) -> Result<()> {
    if d.population < 0 {
        return Err(Error::invariant(format!(
            "{owner}: negative population {}",
            d.population
        )));
    }
    if d.medical_facilities < 0 {
        return Err(Error::invariant(format!(
            "{owner}: negative medical_facilities {}",
            d.medical_facilities
        )));
    }
    if is_negative(&d.facilities_per_10000) {
        return Err(Error::invariant(format!(
            "{owner}: negative facilities_per_10000 {}",
            d.facilities_per_10000
        )));
    }
    if let Some((band, value)) = d.age_distribution.iter().find(|(_, v)| is_negative(v)) {
        return Err(Error::invariant(format!(
            "{owner}: negative age_distribution[{band}] {value}"
        )));
    }
    Ok(())
}

/// Post-build consistency check over the finished tree.
///
/// Prefecture keys are unique by construction of the map, so this covers
/// code nesting, non-negativity and the two counts.
pub fn check_invariants(master: &Master) -> Result<()> {
    for (pref_code, prefecture) in &master.regions {
        check_demographics(&format!("prefecture {pref_code}"), &prefecture.fallback_data)?;
        for (mun_code, municipality) in &prefecture.cities {
            if mun_code.get(0..2) != Some(pref_code.as_str()) {
                return Err(Error::invariant(format!(
                    "municipality {mun_code} is not nested in prefecture {pref_code}"
                )));
            }
            check_demographics(&format!("municipality {mun_code}"), &municipality.fallback_data)?;
        }
    }

    let total_prefectures = master.regions.len();
    if master.statistics.total_prefectures != total_prefectures {
        return Err(Error::invariant(format!(
            "statistics.total_prefectures is {} but regions holds {}",
            master.statistics.total_prefectures, total_prefectures
        )));
    }
    let total_cities: usize = master.regions.values().map(|p| p.cities.len()).sum();
    if master.statistics.total_cities != total_cities {
        return Err(Error::invariant(format!(
            "statistics.total_cities is {} but regions holds {}",
            master.statistics.total_cities, total_cities
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn sources(area: serde_json::Value, regions: serde_json::Value) -> Sources {
        Sources {
            area_codes: serde_json::from_value(area).unwrap(),
            regions: serde_json::from_value(regions).unwrap(),
            estat: Default::default(),
        }
    }

    #[test]
    fn misplaced_municipality_is_rejected() {
        let master = build_master(&sources(
            json!({"prefectures": {"13": {"name": "東京都", "code": "13", "cities": {"14100": "横浜市"}}}}),
            json!({}),
        ));
        let err = check_invariants(&master).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        assert!(err.message().contains("14100"));
    }

    #[test]
    fn negative_detail_is_rejected() {
        let master = build_master(&sources(
            json!({"prefectures": {"14": {"name": "神奈川県", "code": "14", "cities": {"14130": "川崎市"}}}}),
            json!({"prefectures": {"14": {"major_cities": {"k": {"name": "川崎市", "population": -5}}}}}),
        ));
        let err = check_invariants(&master).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        assert!(err.message().contains("municipality 14130"));
    }

    #[test]
    fn tampered_counts_are_rejected() {
        let mut master = build_master(&sources(
            json!({"prefectures": {"01": {"name": "北海道", "code": "01", "cities": {"01100": "札幌市"}}}}),
            json!({}),
        ));
        assert!(check_invariants(&master).is_ok());
        master.statistics.total_cities = 7;
        assert!(check_invariants(&master).is_err());
    }

    #[test]
    fn prefecture_code_falls_back_to_key() {
        let master = build_master(&sources(
            json!({"prefectures": {"02": {"name": "青森県", "cities": {}}}}),
            json!({}),
        ));
        assert_eq!(master.regions["02"].code, "02");
        assert_eq!(master.api_config.endpoints, json!({}));
        assert_eq!(master.medical_demand_patterns, json!({}));
    }
}
