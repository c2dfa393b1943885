//! product-runtime: temporal product index and structural delta tool
//!
//! Loads product data tables of contents, resolves product generations in
//! time and compares two releases structurally.

#![allow(clippy::needless_pass_by_value)]

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use chrono::{DateTime, Utc};
use product_runtime::{
    cli::{self, exit_codes, ProductSelector},
    config::{self, AppConfig, ConfigPreset, OutputFormat, Validatable},
    delta::ComputationMethod,
    toc::parse_instant,
};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build long version string with format support info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nTable of contents format:",
        "\n  ProductDataToc XML (ProductComponent, TableContents, TestCase,",
        "\n  PolicyType, ProductType, EnumContent, EnumXmlAdapter, extension tags)",
        "\n\nOutput Formats:",
        "\n  text, json"
    )
}

#[derive(Parser)]
#[command(name = "product-runtime")]
#[command(version, long_version = build_long_version())]
#[command(about = "Temporal product index and structural delta tool", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success / no changes detected
    1  Changes detected (diff --fail-on-change)
    3  Error occurred

EXAMPLES:
    # Summarise a table of contents
    product-runtime inspect toc.xml

    # Which generation of a product is in force on a given day
    product-runtime resolve toc.xml --kind motor --version 2024 --at 2024-08-15

    # CI/CD check between two releases
    product-runtime diff old/toc.xml new/toc.xml --fail-on-change -o json")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Configuration preset layered over the config file (default, ci-cd, positional, shallow)
    #[arg(long, global = true, value_parser = parse_preset)]
    preset: Option<ConfigPreset>,

    /// Additional element tag to load as a custom entry. Can be specified multiple times.
    #[arg(long = "extension-tag", value_name = "TAG", global = true)]
    extension_tags: Vec<String>,

    /// Version substituted for `${packaging.version}`
    #[arg(long, global = true, env = "PRODUCT_RUNTIME_PACKAGING_VERSION")]
    packaging_version: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn parse_preset(name: &str) -> Result<ConfigPreset, String> {
    ConfigPreset::from_name(name).ok_or_else(|| {
        let known: Vec<&str> = ConfigPreset::all().iter().map(ConfigPreset::name).collect();
        format!("unknown preset '{name}' (expected one of: {})", known.join(", "))
    })
}

// ============================================================================
// Command argument structs
// ============================================================================

/// Arguments for the `inspect` subcommand
#[derive(Parser)]
struct InspectArgs {
    /// Path to the table of contents
    toc: PathBuf,

    /// Output format
    #[arg(short, long, visible_alias = "format", value_enum)]
    output: Option<OutputFormat>,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,
}

/// Arguments for the `resolve` subcommand
#[derive(Parser)]
struct ResolveArgs {
    /// Path to the table of contents
    toc: PathBuf,

    /// Product kind id (requires --version)
    #[arg(long)]
    kind: Option<String>,

    /// Product version id
    #[arg(long)]
    version: Option<String>,

    /// Product entry id
    #[arg(long)]
    id: Option<String>,

    /// Product qualified name
    #[arg(long)]
    name: Option<String>,

    /// Instant to resolve at (RFC 3339, YYYY-MM-DDTHH:MM:SS or YYYY-MM-DD); defaults to now
    #[arg(long, value_parser = parse_instant)]
    at: Option<DateTime<Utc>>,

    /// Output format
    #[arg(short, long, visible_alias = "format", value_enum)]
    output: Option<OutputFormat>,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,
}

/// Arguments for the `normalize` subcommand
#[derive(Parser)]
struct NormalizeArgs {
    /// Path to the table of contents
    toc: PathBuf,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,
}

/// Arguments for the `diff` subcommand
#[derive(Parser)]
struct DiffArgs {
    /// Path to the old/baseline table of contents
    old: PathBuf,

    /// Path to the new table of contents
    new: PathBuf,

    /// Output format
    #[arg(short, long, visible_alias = "format", value_enum)]
    output: Option<OutputFormat>,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// Exit with code 1 if any changes detected
    #[arg(long)]
    fail_on_change: bool,

    /// Pair children by position instead of by identity
    #[arg(long)]
    by_position: bool,

    /// Property to leave out of the comparison, as Type.property. Can be specified multiple times.
    #[arg(long = "ignore", value_name = "TYPE.PROPERTY")]
    ignore: Vec<String>,

    /// Compare only the indexes' own properties
    #[arg(long)]
    shallow: bool,

    /// Expand added and removed entries into their generations
    #[arg(long)]
    subtree: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a table of contents and summarise its entries
    Inspect(InspectArgs),

    /// Resolve the generations of one product around an instant
    Resolve(ResolveArgs),

    /// Load a table of contents and write it back in canonical form
    Normalize(NormalizeArgs),

    /// Compare two tables of contents structurally
    Diff(DiffArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print the JSON Schema of the configuration file
    ConfigSchema {
        /// Write the schema to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inspect or create configuration files
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Show where configuration files are searched for
    Path,
    /// Write a commented example configuration to the current directory
    Init,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(io::stderr))
        .init();

    match run(cli) {
        Ok(exit_code) => {
            if exit_code != exit_codes::SUCCESS {
                std::process::exit(exit_code);
            }
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(exit_codes::ERROR);
        }
    }
}

/// Layer preset, config file and command-line flags into one configuration.
fn effective_config(cli: &Cli, overrides: AppConfig) -> Result<AppConfig> {
    let mut cli_layer = overrides;
    cli_layer.toc.extension_tags.extend(cli.extension_tags.iter().cloned());
    if cli.packaging_version.is_some() {
        cli_layer.toc.packaging_version.clone_from(&cli.packaging_version);
    }
    cli_layer.behavior.quiet |= cli.quiet;

    let (mut config, loaded_from) = config::load_or_default(cli.config.as_deref());
    if let Some(preset) = cli.preset {
        config.merge(&AppConfig::from_preset(preset));
    }
    config.merge(&cli_layer);
    if let Some(path) = &loaded_from {
        tracing::debug!("Loaded config from {}", path.display());
    }

    let errors = config.validate();
    if !errors.is_empty() {
        let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!("invalid configuration:\n  {}", details.join("\n  "));
    }
    Ok(config)
}

fn output_overrides(output: Option<OutputFormat>, output_file: Option<PathBuf>) -> AppConfig {
    let builder = AppConfig::builder().output_file(output_file);
    match output {
        Some(format) => builder.output_format(format).build(),
        None => builder.build(),
    }
}

fn run(cli: Cli) -> Result<i32> {
    // Dispatch to command handlers
    match &cli.command {
        Commands::Inspect(args) => {
            let config = effective_config(&cli, output_overrides(args.output, args.output_file.clone()))?;
            cli::run_inspect(&args.toc, &config)?;
            Ok(exit_codes::SUCCESS)
        }

        Commands::Resolve(args) => {
            let selector = ProductSelector::from_options(
                args.kind.clone(),
                args.version.clone(),
                args.id.clone(),
                args.name.clone(),
            )?;
            let config = effective_config(&cli, output_overrides(args.output, args.output_file.clone()))?;
            cli::run_resolve(&args.toc, &selector, args.at, &config)?;
            Ok(exit_codes::SUCCESS)
        }

        Commands::Normalize(args) => {
            let config = effective_config(&cli, output_overrides(None, args.output_file.clone()))?;
            cli::run_normalize(&args.toc, &config)?;
            Ok(exit_codes::SUCCESS)
        }

        Commands::Diff(args) => {
            let mut overrides = output_overrides(args.output, args.output_file.clone());
            overrides.behavior.fail_on_change = args.fail_on_change;
            if args.by_position {
                overrides.delta.default_method = ComputationMethod::ByPosition;
            }
            overrides.delta.ignored_properties.clone_from(&args.ignore);
            overrides.delta.ignore_associations = args.shallow;
            overrides.delta.create_subtree_delta = args.subtree;

            let config = effective_config(&cli, overrides)?;
            cli::run_diff(&args.old, &args.new, &config)
        }

        Commands::Completions { shell } => {
            generate(*shell, &mut Cli::command(), "product-runtime", &mut io::stdout());
            Ok(exit_codes::SUCCESS)
        }

        Commands::ConfigSchema { output } => {
            let schema = config::generate_json_schema();
            match output {
                Some(path) => {
                    std::fs::write(path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => {
                    println!("{schema}");
                }
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Config { action } => {
            match action {
                ConfigAction::Show => {
                    let (config, loaded_from) = config::load_or_default(cli.config.as_deref());
                    if let Some(path) = &loaded_from {
                        eprintln!("# Loaded from: {}", path.display());
                    } else {
                        eprintln!("# No config file found; showing defaults");
                    }
                    let yaml = serde_yaml::to_string(&config).context("failed to serialize config")?;
                    print!("{yaml}");
                }
                ConfigAction::Path => {
                    let search_paths: [Option<String>; 3] = [
                        std::env::current_dir().ok().map(|p| p.display().to_string()),
                        config::user_config_dir().map(|p| p.display().to_string()),
                        dirs::home_dir().map(|p| p.display().to_string()),
                    ];
                    eprintln!("Config file search paths (in order):");
                    for path in search_paths.into_iter().flatten() {
                        eprintln!("  {path}");
                    }
                    eprintln!();
                    eprintln!("Recognized file names:");
                    for name in &[".product-runtime.yaml", ".product-runtime.yml", "product-runtime.yaml"] {
                        eprintln!("  {name}");
                    }
                    eprintln!();
                    match config::discover_config_file(cli.config.as_deref()) {
                        Some(path) => eprintln!("Active config file: {}", path.display()),
                        None => eprintln!("No config file found."),
                    }
                }
                ConfigAction::Init => {
                    let target = std::env::current_dir()
                        .context("cannot determine current directory")?
                        .join(".product-runtime.yaml");
                    if target.exists() {
                        bail!(
                            "{} already exists. Remove it first to re-initialize.",
                            target.display()
                        );
                    }
                    let content = config::generate_full_example_config();
                    std::fs::write(&target, content)
                        .with_context(|| format!("failed to write {}", target.display()))?;
                    eprintln!("Created {}", target.display());
                }
            }
            Ok(exit_codes::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_resolve_args() {
        let cli = Cli::try_parse_from([
            "product-runtime",
            "resolve",
            "toc.xml",
            "--kind",
            "motor",
            "--version",
            "2024",
            "--at",
            "2024-08-15",
            "-o",
            "json",
        ])
        .unwrap();
        let Commands::Resolve(args) = cli.command else {
            panic!("expected resolve");
        };
        assert_eq!(args.kind.as_deref(), Some("motor"));
        assert_eq!(args.at, Some(parse_instant("2024-08-15").unwrap()));
        assert_eq!(args.output, Some(OutputFormat::Json));
    }

    #[test]
    fn test_invalid_instant_is_rejected() {
        assert!(Cli::try_parse_from(["product-runtime", "resolve", "toc.xml", "--at", "soon"]).is_err());
    }

    #[test]
    fn test_preset_parser() {
        assert_eq!(parse_preset("ci"), Ok(ConfigPreset::CiCd));
        assert!(parse_preset("bogus").unwrap_err().contains("positional"));
    }
}
