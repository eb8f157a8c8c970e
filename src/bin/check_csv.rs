use canloss::process::{Dataset, REQUIRED_COLUMNS};
use std::env;
use std::path::Path;

/// Probe case CSVs for the required columns before handing them to a run.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let paths: Vec<String> = env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("Usage: check_csv <CSV_PATH>...");
        std::process::exit(2);
    }

    let mut failures = 0;
    for arg in &paths {
        let dataset = Dataset::from_csv_path(Path::new(arg))?;
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|&column| !dataset.headers.iter().any(|h| h.as_str() == column))
            .collect();

        if missing.is_empty() {
            println!("→ {}: ok ({} rows)", dataset.name, dataset.rows.len());
        } else {
            println!("→ {}: missing {}", dataset.name, missing.join(", "));
            failures += 1;
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}
