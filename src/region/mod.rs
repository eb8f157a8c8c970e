// src/region/mod.rs

pub mod map;

use std::collections::BTreeMap;

use tracing::warn;

pub use map::{Province, PROVINCE_NAMES, REGION_MAP};

use crate::error::{Error, Result};
use crate::process::load::RawRecord;

/// What to do with a row whose `Provinces` field contains a token outside
/// the whitelist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownRegionPolicy {
    /// Abort the run on the first unknown token. No partial output is
    /// produced.
    #[default]
    Fail,
    /// Drop the offending row and keep going. Opt-in; every dropped row is
    /// logged.
    Skip,
}

/// One (source row, resolved province) pair.
///
/// Year and loss carry over from the source row unchanged. A row naming
/// overlapping regions yields one record per mention, so a loss can count
/// toward the same province more than once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpandedRecord {
    pub code: Province,
    pub year: Option<i32>,
    pub loss: f64,
}

/// Split a raw `Provinces` field into canonical provinces.
///
/// The field may name several regions separated by commas. Each token is
/// trimmed and looked up exactly in `REGION_MAP`; grouped tokens fan out to
/// several provinces. Duplicates across tokens are kept in order.
pub fn split_to_codes(field: &str) -> Result<Vec<Province>> {
    let mut codes = Vec::new();
    for token in field.split(',') {
        let token = token.trim();
        match REGION_MAP.get(token) {
            Some(provinces) => codes.extend_from_slice(provinces),
            None => {
                return Err(Error::UnknownRegion {
                    token: token.to_string(),
                })
            }
        }
    }
    Ok(codes)
}

/// Fan every record out across the provinces its `Provinces` field names.
///
/// With `UnknownRegionPolicy::Fail` the first unknown token aborts the whole
/// expansion; with `Skip` only the offending row is dropped.
pub fn expand_records(
    records: &[RawRecord],
    policy: UnknownRegionPolicy,
) -> Result<Vec<ExpandedRecord>> {
    let mut expanded = Vec::with_capacity(records.len());
    for record in records {
        let codes = match split_to_codes(&record.provinces) {
            Ok(codes) => codes,
            Err(Error::UnknownRegion { token }) if policy == UnknownRegionPolicy::Skip => {
                warn!(%token, provinces = %record.provinces, "skipping row with unknown region");
                continue;
            }
            Err(err) => return Err(err),
        };
        for code in codes {
            expanded.push(ExpandedRecord {
                code,
                year: record.year,
                loss: record.loss,
            });
        }
    }
    Ok(expanded)
}

/// Resolve display names for a set of provinces, in input order.
///
/// Collects every code without a table entry and reports them together, so
/// a drifted name table names the whole gap at once instead of failing one
/// code at a time.
pub fn display_names(codes: &[Province]) -> Result<Vec<&'static str>> {
    display_names_in(codes, &PROVINCE_NAMES)
}

fn display_names_in(
    codes: &[Province],
    table: &BTreeMap<Province, &'static str>,
) -> Result<Vec<&'static str>> {
    let mut names = Vec::with_capacity(codes.len());
    let mut missing = Vec::new();
    for &code in codes {
        match table.get(&code) {
            Some(name) => names.push(*name),
            None => missing.push(code.code().to_string()),
        }
    }
    if missing.is_empty() {
        Ok(names)
    } else {
        Err(Error::UnmappedCode { codes: missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(provinces: &str, year: Option<i32>, loss: f64) -> RawRecord {
        RawRecord {
            provinces: provinces.to_string(),
            year,
            loss,
        }
    }

    #[test]
    fn splits_and_trims_comma_lists() {
        let codes = split_to_codes(" ON , QC ").unwrap();
        assert_eq!(codes, vec![Province::Ontario, Province::Quebec]);
    }

    #[test]
    fn grouped_token_fans_out_with_loss_preserved() {
        let rows = vec![record("Maritimes", Some(2020), 1.25)];
        let expanded = expand_records(&rows, UnknownRegionPolicy::Fail).unwrap();
        assert_eq!(expanded.len(), 3);
        let codes: Vec<Province> = expanded.iter().map(|r| r.code).collect();
        assert_eq!(
            codes,
            vec![
                Province::NewBrunswick,
                Province::NovaScotia,
                Province::PrinceEdwardIsland
            ]
        );
        assert!(expanded
            .iter()
            .all(|r| r.loss == 1.25 && r.year == Some(2020)));
    }

    #[test]
    fn overlapping_mentions_are_kept() {
        let codes = split_to_codes("Prairies,AB").unwrap();
        assert_eq!(
            codes,
            vec![
                Province::Alberta,
                Province::Saskatchewan,
                Province::Manitoba,
                Province::Alberta
            ]
        );
    }

    #[test]
    fn unknown_token_fails_fast() {
        let err = split_to_codes("ON,XX").unwrap_err();
        match err {
            Error::UnknownRegion { token } => assert_eq!(token, "XX"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_field_is_an_unknown_token() {
        let err = split_to_codes("").unwrap_err();
        match err {
            Error::UnknownRegion { token } => assert_eq!(token, ""),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn fail_policy_aborts_whole_expansion() {
        let rows = vec![
            record("ON", Some(2020), 1.0),
            record("XX", Some(2020), 2.0),
            record("QC", Some(2020), 3.0),
        ];
        assert!(expand_records(&rows, UnknownRegionPolicy::Fail).is_err());
    }

    #[test]
    fn skip_policy_drops_only_offending_rows() {
        let rows = vec![
            record("ON", Some(2020), 1.0),
            record("XX", Some(2020), 2.0),
            record("QC", Some(2020), 3.0),
        ];
        let expanded = expand_records(&rows, UnknownRegionPolicy::Skip).unwrap();
        assert_eq!(expanded.len(), 2);
        assert_eq!(expanded[0].code, Province::Ontario);
        assert_eq!(expanded[1].code, Province::Quebec);
    }

    #[test]
    fn all_names_resolve_with_shipped_table() {
        let names = display_names(&Province::ALL).unwrap();
        assert_eq!(names.len(), 13);
        assert_eq!(names[0], "Alberta");
        assert_eq!(names[12], "Yukon");
    }

    #[test]
    fn missing_name_entries_are_all_reported() {
        let mut table = PROVINCE_NAMES.clone();
        table.remove(&Province::Yukon);
        table.remove(&Province::Nunavut);
        let err = display_names_in(
            &[Province::Yukon, Province::Ontario, Province::Nunavut],
            &table,
        )
        .unwrap_err();
        match err {
            Error::UnmappedCode { codes } => {
                assert_eq!(codes, vec!["CA-YT".to_string(), "CA-NU".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
