//! Attribute selection for prefectures and municipalities.
//!
//! Municipality fields come from the first present source in:
//! detail entry, then prefecture level (age bands only), then defaults.
//! Medical-facility figures are never inherited from the prefecture.

use serde_json::Number;

use crate::classify::Classification;
use crate::schema::{AgeDistribution, CityDetail, Demographics, RegionStats};

/// First `major_cities` entry of one prefecture whose name matches.
///
/// The lookup stays scoped to the prefecture; names repeat across the
/// country.
pub fn find_detail<'a>(stats: Option<&'a RegionStats>, name: &str) -> Option<&'a CityDetail> {
    stats?
        .major_cities
        .values()
        .find(|detail| detail.name.as_deref() == Some(name))
}

pub fn resolve_prefecture(stats: Option<&RegionStats>) -> Demographics {
    Demographics {
        population: stats.and_then(|s| s.population).unwrap_or(0),
        age_distribution: stats
            .and_then(|s| s.age_distribution.clone())
            .unwrap_or_default(),
        medical_facilities: stats.and_then(|s| s.medical_facilities).unwrap_or(0),
        facilities_per_10000: stats
            .and_then(|s| s.facilities_per_10000.clone())
            .unwrap_or_else(|| Number::from(0)),
    }
}

pub fn resolve_municipality(
    classification: &Classification,
    detail: Option<&CityDetail>,
    prefecture: Option<&RegionStats>,
) -> Demographics {
    let age_distribution: AgeDistribution = detail
        .and_then(|d| d.age_distribution.clone())
        .or_else(|| prefecture.and_then(|p| p.age_distribution.clone()))
        .unwrap_or_default();

    Demographics {
        population: detail
            .and_then(|d| d.population)
            .unwrap_or(classification.default_population),
        age_distribution,
        medical_facilities: detail.and_then(|d| d.medical_facilities).unwrap_or(0),
        facilities_per_10000: detail
            .and_then(|d| d.facilities_per_10000.clone())
            .unwrap_or_else(|| Number::from(0)),
    }
}
