//! `payrollctl config` - where the config lives and what it resolves to

use anyhow::Result;
use clap::{Parser, Subcommand};
use payrollctl_core::PayrollConfig;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the config file path
    Path,
    /// Print the effective config (file + environment), password masked
    Show,
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Path => {
            let path = PayrollConfig::config_path();
            let note = if path.exists() { "" } else { " (not created)" };
            println!("{}{}", path.display(), note);
        }
        ConfigCommands::Show => {
            let config = PayrollConfig::load()?;
            print!("{}", config.to_display_toml()?);
        }
    }
    Ok(())
}
