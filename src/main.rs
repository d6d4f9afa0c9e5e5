use clap::{Parser, Subcommand};
use sitesmith::catalog::Catalog;
use sitesmith::generate::{GenerateOptions, GenerationError, GenerationResult, Generator};
use sitesmith::materialize::{self, MaterializeError, WalkOptions};
use sitesmith::tokens::TokenMapBuilder;
use sitesmith::{assets, business, config, output};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(clap::Args, Clone)]
struct AssetArgs {
    /// Service image directory (default: `assets.dir` under the template root)
    #[arg(long)]
    assets: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "sitesmith")]
#[command(version)]
#[command(about = "Generate small-business marketing sites from a canonical template")]
#[command(long_about = "\
Generate small-business marketing sites from a canonical template

A business config (JSON) is flattened into placeholder values, every
{{PLACEHOLDER}} in the template's text files is replaced, binary files are
copied verbatim, and the result is written to a fresh directory.

Template structure:

  template/
  ├── sitesmith.toml               # Generator settings (optional, never copied)
  ├── package.json                 # Text files: placeholders substituted
  ├── src/config/site.ts           # e.g. const services = {{SERVICES}};
  └── public/
      └── images/services/
          └── hvac-ac-repair.png   # One image per catalog service

Run 'sitesmith gen-config' to print a documented sitesmith.toml.
Logs go to stderr; set RUST_LOG to adjust verbosity.")]
struct Cli {
    /// Template root directory
    #[arg(long, default_value = "template", global = true)]
    template: PathBuf,

    /// Industry catalog TOML file (default: built-in catalog)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a site from a business config
    Generate {
        /// Business config JSON file
        config: PathBuf,
        /// Destination directory (must be absent or empty)
        #[arg(long, short)]
        output: PathBuf,
        #[command(flatten)]
        assets: AssetArgs,
        /// Fail when a required service image is missing
        #[arg(long, conflicts_with = "no_asset_check")]
        strict_assets: bool,
        /// Skip the service image check
        #[arg(long)]
        no_asset_check: bool,
        /// Print the generation result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Report which catalog service images exist
    CheckAssets(AssetArgs),
    /// Print the placeholder values for a business config
    Tokens {
        /// Business config JSON file
        config: PathBuf,
        /// List template placeholders with no value
        #[arg(long)]
        check: bool,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List catalog industries and their default services
    Presets {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock sitesmith.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match &cli.command {
        Command::Generate {
            config: config_path,
            output: dest,
            assets,
            strict_assets,
            no_asset_check,
            json,
        } => {
            let generator = match prepare_generator(&cli, assets, *strict_assets, *no_asset_check) {
                Ok(generator) => generator,
                Err(error) => {
                    let result = GenerationResult::failed(dest, error);
                    report_generation(&result, *json)?;
                    return Ok(exit_code(false));
                }
            };

            let result = if *json {
                generator.generate(config_path, &cli.template, dest)
            } else {
                let (tx, rx) = std::sync::mpsc::channel();
                let printer = std::thread::spawn(move || {
                    for event in rx {
                        for line in output::format_materialize_event(&event) {
                            println!("{}", line);
                        }
                    }
                });
                let generator = generator.with_progress(tx);
                let result = generator.generate(config_path, &cli.template, dest);
                drop(generator);
                printer
                    .join()
                    .map_err(|_| "progress printer panicked")?;
                result
            };

            report_generation(&result, *json)?;
            Ok(exit_code(result.success))
        }
        Command::CheckAssets(args) => {
            let settings = config::load_settings(&cli.template)?;
            let catalog = load_catalog(cli.catalog.as_deref())?;
            let dir = match &args.assets {
                Some(dir) => dir.clone(),
                None => cli.template.join(&settings.assets.dir),
            };
            let report = assets::validate(&catalog, &dir);
            output::print_asset_report(&report, &dir);
            Ok(exit_code(report.required_missing().is_empty()))
        }
        Command::Tokens {
            config: config_path,
            check,
            json,
        } => {
            let settings = config::load_settings(&cli.template)?;
            let catalog = load_catalog(cli.catalog.as_deref())?;
            let business = business::load_business_config(config_path)?;
            let tokens = TokenMapBuilder::new(&catalog)
                .asset_url_prefix(settings.assets.url_prefix.clone())
                .build(&business);

            let gaps = if *check {
                let walk = WalkOptions::from_settings(&settings.template);
                let referenced = materialize::scan_template(&cli.template, &walk)?;
                Some(tokens.gaps(&referenced))
            } else {
                None
            };

            if *json {
                let value = match &gaps {
                    Some(gaps) => serde_json::json!({ "tokens": tokens, "gaps": gaps }),
                    None => serde_json::to_value(&tokens)?,
                };
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                output::print_token_map(&tokens);
                if let Some(gaps) = &gaps {
                    println!();
                    output::print_vocabulary_gaps(gaps);
                }
            }
            Ok(exit_code(gaps.is_none_or(|g| g.is_empty())))
        }
        Command::Presets { json } => {
            let catalog = load_catalog(cli.catalog.as_deref())?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&catalog)?);
            } else {
                output::print_presets(&catalog);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::GenConfig => {
            print!("{}", config::stock_settings_toml());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Settings, catalog and CLI overrides for a `generate` run.
fn prepare_generator(
    cli: &Cli,
    assets: &AssetArgs,
    strict_assets: bool,
    no_asset_check: bool,
) -> Result<Generator, GenerationError> {
    let settings = config::load_settings(&cli.template)?;
    init_thread_pool(&settings.processing);
    let mut options = GenerateOptions::from_settings(&settings);
    if let Some(dir) = &assets.assets {
        options.asset_dir = std::path::absolute(dir).map_err(|source| MaterializeError::Io {
            path: dir.clone(),
            source,
        })?;
    }
    if strict_assets {
        options.strict_assets = true;
    }
    if no_asset_check {
        options.check_assets = false;
    }
    Ok(Generator::new(load_catalog(cli.catalog.as_deref())?, options))
}

fn report_generation(result: &GenerationResult, json: bool) -> serde_json::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        output::print_generation_result(result);
    }
    Ok(())
}

/// Structured logs on stderr, filtered by `RUST_LOG` (default `sitesmith=info`).
fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sitesmith=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores: settings can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog, sitesmith::catalog::CatalogError> {
    match path {
        Some(path) => Catalog::load(path),
        None => Ok(Catalog::builtin()),
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
