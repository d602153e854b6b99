use std::fs;
use std::path::Path;

use regional_master::{run_merge, ErrorKind, MergePaths};
use serde_json::{json, Value};
use tempfile::tempdir;

fn write_inputs(dir: &Path, area: &Value, regions: &Value, estat: &Value) -> MergePaths {
    let paths = MergePaths::in_dir(dir);
    fs::write(&paths.area_codes, serde_json::to_vec(area).expect("area json")).expect("area");
    fs::write(&paths.regions, serde_json::to_vec(regions).expect("regions json")).expect("regions");
    fs::write(&paths.estat_params, serde_json::to_vec(estat).expect("estat json")).expect("estat");
    paths
}

fn read_output(paths: &MergePaths) -> Value {
    let bytes = fs::read(&paths.output).expect("output written");
    serde_json::from_slice(&bytes).expect("output parses")
}

fn estat() -> Value {
    json!({
        "api_endpoints": {"getStatsData": "/getStatsData", "getMetaInfo": "/getMetaInfo"},
        "stats_tables": {"population": {"statsDataId": "0003448237", "cdCat01": "A1101"}},
        "cache_settings": {"ttl_hours": 24, "enabled": true}
    })
}

#[test]
fn shibuya_uses_exact_ward_default() {
    let dir = tempdir().expect("dir");
    let paths = write_inputs(
        dir.path(),
        &json!({"prefectures": {"13": {"name": "東京都", "code": "13", "cities": {"13113": "渋谷区"}}}}),
        &json!({"prefectures": {"13": {"population": 14000000, "major_cities": {}}}}),
        &estat(),
    );
    run_merge(&paths).expect("merge");
    let out = read_output(&paths);
    assert_eq!(
        out["regions"]["13"]["cities"]["13113"],
        json!({
            "name": "渋谷区",
            "type": "special_ward",
            "fallback_data": {
                "population": 247820,
                "age_distribution": {},
                "medical_facilities": 0,
                "facilities_per_10000": 0
            }
        })
    );
}

#[test]
fn prefecture_age_bands_flow_down() {
    let dir = tempdir().expect("dir");
    let paths = write_inputs(
        dir.path(),
        &json!({"prefectures": {"01": {"name": "北海道", "code": "01", "cities": {"01100": "札幌市"}}}}),
        &json!({"prefectures": {"01": {"age_distribution": {"young": 100, "old": 200}, "medical_facilities": 3000}}}),
        &estat(),
    );
    run_merge(&paths).expect("merge");
    let out = read_output(&paths);
    let city = &out["regions"]["01"]["cities"]["01100"]["fallback_data"];
    assert_eq!(city["age_distribution"], json!({"young": 100, "old": 200}));
    assert_eq!(city["medical_facilities"], json!(0));
    assert_eq!(out["regions"]["01"]["fallback_data"]["medical_facilities"], json!(3000));
}

#[test]
fn designated_city_and_detail_override() {
    let dir = tempdir().expect("dir");
    let paths = write_inputs(
        dir.path(),
        &json!({"prefectures": {"14": {"name": "神奈川県", "code": "14", "cities": {
            "14100": "横浜市",
            "14130": "川崎市"
        }}}}),
        &json!({"prefectures": {"14": {"major_cities": {
            "kawasaki": {"name": "川崎市", "population": 1000000, "medical_facilities": 1100, "facilities_per_10000": 7.5}
        }}}}),
        &estat(),
    );
    run_merge(&paths).expect("merge");
    let out = read_output(&paths);
    let cities = &out["regions"]["14"]["cities"];
    assert_eq!(cities["14100"]["type"], json!("designated_city"));
    assert_eq!(cities["14100"]["fallback_data"]["population"], json!(500000));
    assert_eq!(cities["14130"]["type"], json!("ward"));
    assert_eq!(cities["14130"]["fallback_data"]["population"], json!(1000000));
    assert_eq!(cities["14130"]["fallback_data"]["facilities_per_10000"], json!(7.5));
}

#[test]
fn counts_and_literals() {
    let dir = tempdir().expect("dir");
    let paths = write_inputs(
        dir.path(),
        &json!({"prefectures": {
            "27": {"name": "大阪府", "code": "27", "cities": {"27100": "大阪市", "27140": "堺市", "27203": "豊中市"}},
            "40": {"name": "福岡県", "code": "40", "cities": {
                "40100": "北九州市", "40130": "福岡市", "40202": "大牟田市", "40203": "久留米市", "40204": "直方市"
            }}
        }}),
        &json!({"medical_demand_patterns": {"elderly": {"internal_medicine": 1.4}}}),
        &estat(),
    );
    let master = run_merge(&paths).expect("merge");
    assert_eq!(master.statistics.total_prefectures, 2);
    assert_eq!(master.statistics.total_cities, 8);

    let out = read_output(&paths);
    assert_eq!(out["statistics"]["total_prefectures"], json!(2));
    assert_eq!(out["statistics"]["total_cities"], json!(8));
    assert_eq!(out["description"], json!("日本全国地域マスターデータ（e-Stat API連携・統合版）"));
    assert_eq!(out["version"], json!("3.0.0"));
    assert_eq!(out["updated"], json!("2024-01"));
    assert_eq!(out["api_config"]["base_url"], json!("http://api.e-stat.go.jp/rest/3.0/app/json"));
    assert_eq!(
        out["statistics"]["data_sources"],
        json!(["総務省 全国地方公共団体コード", "e-Stat 政府統計の総合窓口", "2024年推計値"])
    );
    assert_eq!(out["medical_demand_patterns"], json!({"elderly": {"internal_medicine": 1.4}}));
    assert_eq!(out["api_config"]["cache_settings"], estat()["cache_settings"]);
}

#[test]
fn output_is_pretty_utf8_in_catalog_order() {
    let dir = tempdir().expect("dir");
    let paths = write_inputs(
        dir.path(),
        &json!({"prefectures": {
            "47": {"name": "沖縄県", "code": "47", "cities": {"47205": "宜野湾市", "47201": "那覇市"}},
            "01": {"name": "北海道", "code": "01", "cities": {}}
        }}),
        &json!({}),
        &estat(),
    );
    run_merge(&paths).expect("merge");
    let text = fs::read_to_string(&paths.output).expect("utf8 output");
    assert!(text.starts_with("{\n  \"description\": \"日本全国地域マスターデータ"));
    assert!(!text.contains("\\u"));
    let okinawa = text.find("\"47\": {").expect("47");
    let hokkaido = text.find("\"01\": {").expect("01");
    assert!(okinawa < hokkaido);
    assert!(text.find("\"47205\"").expect("47205") < text.find("\"47201\"").expect("47201"));
}

#[test]
fn rebuild_is_byte_identical() {
    let dir = tempdir().expect("dir");
    let paths = write_inputs(
        dir.path(),
        &json!({"prefectures": {"13": {"name": "東京都", "code": "13", "cities": {"13104": "新宿区", "13201": "八王子市"}}}}),
        &json!({"prefectures": {"13": {"age_distribution": {"0-14": 11.2, "15-64": 66.1, "65+": 22.7}}}}),
        &estat(),
    );
    run_merge(&paths).expect("first");
    let first = fs::read(&paths.output).expect("first output");
    run_merge(&paths).expect("second");
    let second = fs::read(&paths.output).expect("second output");
    assert_eq!(first, second);
}

#[test]
fn missing_input_aborts_without_output() {
    let dir = tempdir().expect("dir");
    let paths = write_inputs(dir.path(), &json!({}), &json!({}), &estat());
    fs::remove_file(&paths.regions).expect("remove");
    let err = run_merge(&paths).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InputMissing);
    assert!(err.to_string().contains("japan_regions.json"));
    assert!(!paths.output.exists());
}

#[test]
fn malformed_input_aborts() {
    let dir = tempdir().expect("dir");
    let paths = write_inputs(dir.path(), &json!({}), &json!({}), &estat());
    fs::write(&paths.estat_params, "{ not json").expect("corrupt");
    let err = run_merge(&paths).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InputMalformed);
    assert!(err.to_string().starts_with("InputMalformed: "));
    assert!(!paths.output.exists());
}

#[test]
fn broken_nesting_is_an_invariant_violation() {
    let dir = tempdir().expect("dir");
    let paths = write_inputs(
        dir.path(),
        &json!({"prefectures": {"13": {"name": "東京都", "code": "13", "cities": {"27100": "大阪市"}}}}),
        &json!({}),
        &estat(),
    );
    let err = run_merge(&paths).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvariantViolation);
    assert!(!paths.output.exists());
}

#[test]
fn unwritable_output_is_reported() {
    let dir = tempdir().expect("dir");
    let mut paths = write_inputs(dir.path(), &json!({}), &json!({}), &estat());
    paths.output = dir.path().join("missing-dir").join("japan_regional_master.json");
    let err = run_merge(&paths).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutputUnwritable);
}
