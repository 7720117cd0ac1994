//! aggrectl CLI - schema bootstrap for the news aggregator database
//!
//! Subcommands:
//! - `init`: drop and recreate the tables in one transaction
//! - `plan`: print the SQL `init` would run, without connecting
//! - `verify`: compare the live schema with the table catalog
//! - `tables`: list the table catalog
//! - `completions`: shell completion scripts

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod connection;
mod tracing_setup;

use tracing_setup::{init_tracing, TracingConfig};

#[derive(Parser, Debug)]
#[command(
    name = "aggrectl",
    author,
    version,
    about = "Reset and verify the news aggregator database schema",
    long_about = "Drops and recreates the news aggregator tables inside a single transaction. \
                  Connection settings come from flags, AGGRE_DB_* environment variables, \
                  .env files, ./aggrectl.toml and ~/.aggrectl/config.toml."
)]
struct Cli {
    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Drop and recreate tables (all of them unless --table is given)
    Init(commands::init::InitArgs),
    /// Print the reset script without connecting
    Plan(commands::plan::PlanArgs),
    /// Check the live schema against the table definitions
    Verify(commands::verify::VerifyArgs),
    /// List known tables and their columns
    Tables(commands::tables::TablesArgs),
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
    // .env values must be in the environment before clap reads `env = ...` args
    let dotenv = aggrectl_core::config::load_dotenv();
    let cli = Cli::parse();
    init_tracing(&TracingConfig { quiet: cli.quiet }).ok();
    dotenv.log();

    match cli.command {
        Commands::Init(args) => commands::run_init(args).await?,
        Commands::Plan(args) => commands::run_plan(args)?,
        Commands::Verify(args) => commands::run_verify(args).await?,
        Commands::Tables(args) => commands::run_tables(args)?,
        Commands::Completions(args) => run_completions(args)?,
    }
    Ok(())
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
