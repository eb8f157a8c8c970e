use canloss::region::{PROVINCE_NAMES, REGION_MAP};
use serde::Serialize;
use std::collections::BTreeMap;

/// What each whitelisted token expands to.
#[derive(Serialize)]
struct RegionEntry {
    codes: Vec<&'static str>,
    names: Vec<&'static str>,
}

/// Emit the region whitelist as JSON, for UI layers that build their
/// selectors from it.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut entries: BTreeMap<&'static str, RegionEntry> = BTreeMap::new();
    for (&token, provinces) in REGION_MAP.iter() {
        entries.insert(
            token,
            RegionEntry {
                codes: provinces.iter().map(|p| p.code()).collect(),
                names: provinces
                    .iter()
                    .filter_map(|p| PROVINCE_NAMES.get(p).copied())
                    .collect(),
            },
        );
    }

    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}
