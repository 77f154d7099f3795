//! payrollctl CLI - Boston municipal payroll API and data jobs
//!
//! Entry point for the `payrollctl` tool, which provides:
//! - The read-only HTTP API (`serve`)
//! - Schema creation (`schema`)
//! - Loading yearly earnings files from the open data portal (`load`)
//! - Per-year CSV snapshots of the table (`archive`)
//! - Post-load data quality checks (`validate`)
//! - Copying the table between databases (`migrate`)

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod env;
mod tracing_setup;
mod ui;

#[derive(Parser, Debug)]
#[command(
    name = "payrollctl",
    author,
    version,
    about = "Serve and maintain the City of Boston employee earnings database",
    long_about = "Load the city's yearly employee earnings reports into PostgreSQL, keep them \
                  validated and archived, and serve them over a read-only JSON/CSV API."
)]
struct Cli {
    /// Suppress progress spinners (for cron jobs and scripts)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Enable debug logging (RUST_LOG still wins when set)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (requires the `telemetry` feature)
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create the payroll table and its indexes (idempotent)
    Schema(commands::schema::SchemaArgs),
    /// Download and load yearly earnings files
    Load(commands::load::LoadArgs),
    /// Write per-year CSV snapshots of the table
    Archive(commands::archive::ArchiveArgs),
    /// Run data quality checks against the loaded table
    Validate(commands::validate::ValidateArgs),
    /// Copy every row from one database to another
    Migrate(commands::migrate::MigrateArgs),
    /// Show the effective configuration
    Config(commands::config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_sources = env::load_dotenv();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })
    .ok();
    for source in &env_sources {
        tracing::debug!(source = %source, "loaded environment");
    }

    // Initialize UI quiet mode from flag, env var, and TTY detection
    ui::init_quiet_mode(cli.quiet);

    let result = match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await,
        Commands::Schema(args) => commands::run_schema(args).await,
        Commands::Load(args) => commands::run_load(args).await,
        Commands::Archive(args) => commands::run_archive(args).await,
        Commands::Validate(args) => commands::run_validate(args).await,
        Commands::Migrate(args) => commands::run_migrate(args).await,
        Commands::Config(args) => commands::run_config(args),
        Commands::Completions(args) => run_completions(args),
    };

    tracing_setup::shutdown_otel();
    result
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
