//! Administrative type of a municipality, derived from its code alone.

use serde::{Deserialize, Serialize};

const TOKYO_PREF_CODE: &str = "13";
const SPECIAL_WARD_PREFIX: &str = "131";
const MUNICIPALITY_CODE_LEN: usize = 5;

/// Population used for Tokyo wards that have no population of their own.
const SPECIAL_WARD_POPULATIONS: [(&str, i64); 3] = [
    ("13113", 247820), // Shibuya
    ("13104", 351711), // Shinjuku
    ("13103", 265191), // Minato
];
const SPECIAL_WARD_DEFAULT: i64 = 200000;
const DESIGNATED_CITY_DEFAULT: i64 = 500000;
const WARD_DEFAULT: i64 = 100000;
const CITY_DEFAULT: i64 = 50000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MunicipalityType {
    SpecialWard,
    DesignatedCity,
    Ward,
    City,
}

impl MunicipalityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MunicipalityType::SpecialWard => "special_ward",
            MunicipalityType::DesignatedCity => "designated_city",
            MunicipalityType::Ward => "ward",
            MunicipalityType::City => "city",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: MunicipalityType,
    pub default_population: i64,
}

/// Classifies a municipality; the first matching rule wins.
///
/// The special-ward rule is checked before the generic `..00` rule, so
/// `13100` is a designated city: it does not start with `131`.
pub fn classify(pref_code: &str, mun_code: &str) -> Classification {
    let five_digits = mun_code.chars().count() == MUNICIPALITY_CODE_LEN;

    if pref_code == TOKYO_PREF_CODE && mun_code.starts_with(SPECIAL_WARD_PREFIX) && five_digits {
        let default_population = SPECIAL_WARD_POPULATIONS
            .iter()
            .find(|(code, _)| *code == mun_code)
            .map(|(_, population)| *population)
            .unwrap_or(SPECIAL_WARD_DEFAULT);
        return Classification {
            kind: MunicipalityType::SpecialWard,
            default_population,
        };
    }
    if five_digits && mun_code.ends_with("00") {
        return Classification {
            kind: MunicipalityType::DesignatedCity,
            default_population: DESIGNATED_CITY_DEFAULT,
        };
    }
    if five_digits {
        return Classification {
            kind: MunicipalityType::Ward,
            default_population: WARD_DEFAULT,
        };
    }
    Classification {
        kind: MunicipalityType::City,
        default_population: CITY_DEFAULT,
    }
}
