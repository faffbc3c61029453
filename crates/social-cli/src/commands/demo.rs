//! Demo command
//!
//! Usage: social demo
//!
//! Drops and recreates every table, then runs the example scenarios and
//! prints one line per check. Exits non-zero if any check fails.

use social_core::social_core_types::RequestContext;
use social_engine::commands::demo::run_demo;
use social_store::StoreConfig;

use super::CliResult;

pub fn execute(store: &StoreConfig) -> CliResult {
    let mut repo = store.open()?;
    let report = run_demo(&mut repo, &RequestContext::new())?;

    for check in &report.checks {
        let mark = if check.passed { "✓" } else { "✗" };
        println!("{} {} ({})", mark, check.name, check.detail);
    }

    if report.all_passed() {
        println!("All {} checks passed", report.checks.len());
        Ok(())
    } else {
        Err("demo checks failed".into())
    }
}
