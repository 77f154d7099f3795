//! `payrollctl validate` - data quality checks after a load

use anyhow::{bail, Result};
use clap::Parser;
use payrollctl_core::PayrollConfig;
use payrollctl_etl::{all_passed, run_validations, CheckOutcome};

use crate::ui;

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Year for the department check (default: newest loaded year)
    #[arg(long)]
    pub year: Option<i32>,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

pub async fn run_validate(args: ValidateArgs) -> Result<()> {
    let config = PayrollConfig::load()?;
    let pool = super::connect(args.database_url, &config).await?;

    let pb = ui::spinner("Running validation checks");
    let outcomes = run_validations(&pool, args.year).await;
    ui::finish_success(pb, format!("{} checks run", outcomes.len()));
    pool.close().await;

    for outcome in &outcomes {
        println!("{}\n", outcome.report);
    }
    println!("{}", summary(&outcomes));

    if !all_passed(&outcomes) {
        bail!("Validation failed");
    }
    Ok(())
}

fn summary(outcomes: &[CheckOutcome]) -> String {
    let mut lines = vec!["Summary".to_string()];
    for outcome in outcomes {
        let mark = if outcome.passed { "PASS" } else { "FAIL" };
        lines.push(format!("  [{}] {}", mark, outcome.name));
    }
    let passed = outcomes.iter().filter(|o| o.passed).count();
    lines.push(format!("{}/{} checks passed", passed, outcomes.len()));
    lines.join("\n")
}
