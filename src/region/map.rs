// src/region/map.rs

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;

/// Canadian provinces and territories, per ISO 3166-2:CA.
///
/// Variants are declared in code order so the derived `Ord` keeps every
/// downstream table sorted by code without extra work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Province {
    Alberta,
    BritishColumbia,
    Manitoba,
    NewBrunswick,
    NewfoundlandAndLabrador,
    NovaScotia,
    NorthwestTerritories,
    Nunavut,
    Ontario,
    PrinceEdwardIsland,
    Quebec,
    Saskatchewan,
    Yukon,
}

impl Province {
    /// Every province and territory, in code order.
    pub const ALL: [Province; 13] = [
        Province::Alberta,
        Province::BritishColumbia,
        Province::Manitoba,
        Province::NewBrunswick,
        Province::NewfoundlandAndLabrador,
        Province::NovaScotia,
        Province::NorthwestTerritories,
        Province::Nunavut,
        Province::Ontario,
        Province::PrinceEdwardIsland,
        Province::Quebec,
        Province::Saskatchewan,
        Province::Yukon,
    ];

    /// Full ISO 3166-2 code, e.g. `CA-ON`. This is both the grouping key
    /// for aggregation and the join key into the boundary GeoJSON.
    pub fn code(self) -> &'static str {
        match self {
            Province::Alberta => "CA-AB",
            Province::BritishColumbia => "CA-BC",
            Province::Manitoba => "CA-MB",
            Province::NewBrunswick => "CA-NB",
            Province::NewfoundlandAndLabrador => "CA-NL",
            Province::NovaScotia => "CA-NS",
            Province::NorthwestTerritories => "CA-NT",
            Province::Nunavut => "CA-NU",
            Province::Ontario => "CA-ON",
            Province::PrinceEdwardIsland => "CA-PE",
            Province::Quebec => "CA-QC",
            Province::Saskatchewan => "CA-SK",
            Province::Yukon => "CA-YT",
        }
    }

    /// Bare two-letter abbreviation, e.g. `ON`. Source rows use these.
    pub fn abbreviation(self) -> &'static str {
        // code() is always "CA-" + abbreviation.
        &self.code()[3..]
    }
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl serde::Serialize for Province {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.code())
    }
}

/// Whitelist mapping raw `Provinces` tokens to canonical provinces.
///
/// Lookup is exact after trimming: no fuzzy matching, no case folding. A
/// token outside this table is treated as a data error, never silently
/// guessed. The misspelled `Prairies` keys appear verbatim in real source
/// rows and all resolve to the same three provinces.
pub static REGION_MAP: Lazy<BTreeMap<&'static str, Vec<Province>>> = Lazy::new(|| {
    use Province::*;

    const MARITIMES: [Province; 3] = [NewBrunswick, NovaScotia, PrinceEdwardIsland];
    const PRAIRIES: [Province; 3] = [Alberta, Saskatchewan, Manitoba];

    let mut map: BTreeMap<&'static str, Vec<Province>> = BTreeMap::new();
    for province in Province::ALL {
        map.insert(province.abbreviation(), vec![province]);
    }
    map.insert("Maritimes", MARITIMES.to_vec());
    for key in ["Prairies", "Priaries", "Priaires", "Praries", "Praires"] {
        map.insert(key, PRAIRIES.to_vec());
    }
    map
});

/// Display names keyed by province. Resolution treats a missing entry as
/// a hard error rather than inventing a name.
pub static PROVINCE_NAMES: Lazy<BTreeMap<Province, &'static str>> = Lazy::new(|| {
    use Province::*;

    BTreeMap::from([
        (Alberta, "Alberta"),
        (BritishColumbia, "British Columbia"),
        (Manitoba, "Manitoba"),
        (NewBrunswick, "New Brunswick"),
        (NewfoundlandAndLabrador, "Newfoundland and Labrador"),
        (NovaScotia, "Nova Scotia"),
        (NorthwestTerritories, "Northwest Territories"),
        (Nunavut, "Nunavut"),
        (Ontario, "Ontario"),
        (PrinceEdwardIsland, "Prince Edward Island"),
        (Quebec, "Quebec"),
        (Saskatchewan, "Saskatchewan"),
        (Yukon, "Yukon"),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_sorted_by_code() {
        assert!(Province::ALL.windows(2).all(|w| w[0] < w[1]));
        assert!(Province::ALL
            .windows(2)
            .all(|w| w[0].code() < w[1].code()));
    }

    #[test]
    fn every_abbreviation_resolves_to_itself() {
        for province in Province::ALL {
            let mapped = REGION_MAP
                .get(province.abbreviation())
                .unwrap_or_else(|| panic!("{} missing from REGION_MAP", province));
            assert_eq!(mapped.as_slice(), &[province]);
        }
    }

    #[test]
    fn maritimes_is_exactly_three_provinces() {
        use Province::*;
        let mapped = REGION_MAP.get("Maritimes").unwrap();
        assert_eq!(
            mapped.as_slice(),
            &[NewBrunswick, NovaScotia, PrinceEdwardIsland]
        );
    }

    #[test]
    fn prairie_spellings_all_resolve_identically() {
        let canonical = REGION_MAP.get("Prairies").unwrap();
        for key in ["Priaries", "Priaires", "Praries", "Praires"] {
            assert_eq!(REGION_MAP.get(key), Some(canonical), "key {key}");
        }
    }

    #[test]
    fn whitelist_codomain_covers_every_province() {
        let mapped: std::collections::BTreeSet<Province> =
            REGION_MAP.values().flatten().copied().collect();
        assert_eq!(mapped.len(), Province::ALL.len());
        assert!(Province::ALL.iter().all(|p| mapped.contains(p)));
    }

    #[test]
    fn every_province_has_a_display_name() {
        for province in Province::ALL {
            assert!(
                PROVINCE_NAMES.contains_key(&province),
                "{} has no display name",
                province
            );
        }
        assert_eq!(PROVINCE_NAMES.len(), Province::ALL.len());
    }

    #[test]
    fn codes_follow_iso_shape() {
        for province in Province::ALL {
            let code = province.code();
            assert!(code.starts_with("CA-"), "{code}");
            assert_eq!(code.len(), 5, "{code}");
            assert_eq!(province.abbreviation(), &code[3..]);
        }
    }

    #[test]
    fn lookup_is_exact_no_case_folding() {
        assert!(REGION_MAP.get("on").is_none());
        assert!(REGION_MAP.get("ontario").is_none());
        assert!(REGION_MAP.get("maritimes").is_none());
        assert!(REGION_MAP.get(" ON").is_none());
    }
}
