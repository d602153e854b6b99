use std::collections::BTreeMap;

use proptest::prelude::*;
use regional_master::classify::MunicipalityType;
use regional_master::master::{build_master, check_invariants};
use regional_master::source::Sources;
use regional_master::writer::render_master;
use serde_json::{json, Map, Value};

type Catalog = BTreeMap<u8, Vec<(u16, String)>>;

fn catalog_strategy() -> impl Strategy<Value = Catalog> {
    prop::collection::btree_map(
        1u8..=47,
        prop::collection::vec((0u16..1000, "[a-z]{1,4}"), 0..6),
        1..6,
    )
}

fn sources_for(catalog: &Catalog, with_details: bool) -> Sources {
    let mut area = Map::new();
    let mut regions = Map::new();
    for (pref, cities) in catalog {
        let pref_code = format!("{pref:02}");
        let mut city_map = Map::new();
        let mut details = Map::new();
        for (idx, (suffix, name)) in cities.iter().enumerate() {
            city_map.insert(format!("{pref_code}{suffix:03}"), json!(name));
            if with_details && idx % 2 == 0 {
                details.insert(
                    format!("d{idx}"),
                    json!({"name": name, "population": 1000 + idx, "medical_facilities": idx}),
                );
            }
        }
        area.insert(
            pref_code.clone(),
            json!({"name": format!("pref-{pref_code}"), "code": pref_code, "cities": city_map}),
        );
        regions.insert(
            pref_code,
            json!({"population": 10000, "age_distribution": {"0-14": 12, "65+": 30.5}, "major_cities": details}),
        );
    }
    Sources {
        area_codes: serde_json::from_value(json!({"prefectures": area})).expect("area"),
        regions: serde_json::from_value(json!({
            "medical_demand_patterns": {"pediatrics": {"weight": 0.8}},
            "prefectures": regions
        }))
        .expect("regions"),
        estat: serde_json::from_value(json!({
            "api_endpoints": {"getStatsData": "/getStatsData"},
            "stats_tables": {"population": "0003448237"},
            "cache_settings": {"ttl_hours": 24}
        }))
        .expect("estat"),
    }
}

fn all_demographic_numbers(value: &Value) -> Vec<f64> {
    let mut out = Vec::new();
    let d = &value["fallback_data"];
    for key in ["population", "medical_facilities", "facilities_per_10000"] {
        out.push(d[key].as_f64().expect("number"));
    }
    if let Some(bands) = d["age_distribution"].as_object() {
        out.extend(bands.values().filter_map(Value::as_f64));
    }
    out
}

proptest! {
    #[test]
    fn built_master_holds_invariants(catalog in catalog_strategy(), with_details in any::<bool>()) {
        let sources = sources_for(&catalog, with_details);
        let master = build_master(&sources);
        prop_assert!(check_invariants(&master).is_ok());

        // counts
        prop_assert_eq!(master.statistics.total_prefectures, master.regions.len());
        let cities: usize = master.regions.values().map(|p| p.cities.len()).sum();
        prop_assert_eq!(master.statistics.total_cities, cities);

        let value = serde_json::to_value(&master).expect("value");
        for (pref_code, prefecture) in value["regions"].as_object().expect("regions") {
            for n in all_demographic_numbers(prefecture) {
                prop_assert!(n >= 0.0);
            }
            for (mun_code, city) in prefecture["cities"].as_object().expect("cities") {
                prop_assert_eq!(&mun_code[0..2], pref_code.as_str());
                for n in all_demographic_numbers(city) {
                    prop_assert!(n >= 0.0);
                }
                let kind: MunicipalityType =
                    serde_json::from_value(city["type"].clone()).expect("known type");
                prop_assert!(matches!(
                    kind,
                    MunicipalityType::SpecialWard
                        | MunicipalityType::DesignatedCity
                        | MunicipalityType::Ward
                        | MunicipalityType::City
                ));
            }
        }

        // pass-through blocks
        prop_assert_eq!(&master.api_config.endpoints, &sources.estat.api_endpoints);
        prop_assert_eq!(&master.api_config.stats_tables, &sources.estat.stats_tables);
        prop_assert_eq!(&master.api_config.cache_settings, &sources.estat.cache_settings);
        prop_assert_eq!(&master.medical_demand_patterns, &sources.regions.medical_demand_patterns);
    }

    #[test]
    fn rendering_is_deterministic(catalog in catalog_strategy()) {
        let first = render_master(&build_master(&sources_for(&catalog, true))).expect("first");
        let second = render_master(&build_master(&sources_for(&catalog, true))).expect("second");
        prop_assert_eq!(first, second);
    }
}
