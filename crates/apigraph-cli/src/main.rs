use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::Serialize;

use apigraph_core::config::{self, ApiGraphConfig, CONFIG_FILE_NAME, OutputFormat};
use apigraph_core::ir::Client;
use apigraph_core::parse;
use apigraph_core::transform::{self, ResolveOptions};

#[derive(Parser)]
#[command(
    name = "apigraph",
    about = "Resolve OpenAPI 2.0/3.0/3.1 documents into a type graph",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a document and print the client model
    Resolve {
        /// Path to the OpenAPI document (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output format
        #[arg(long)]
        format: Option<FormatArg>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate that a document resolves
    Validate {
        /// Path to the OpenAPI document
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print one operation together with every model it needs
    Extract {
        /// Path to the OpenAPI document
        #[arg(short, long)]
        input: PathBuf,

        /// Operation id (`operationId`, or `method:path` when absent)
        #[arg(long)]
        operation: String,

        /// Output format
        #[arg(long)]
        format: Option<FormatArg>,
    },

    /// Initialize a new apigraph configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Yaml,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Yaml => OutputFormat::Yaml,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            input,
            format,
            output,
        } => cmd_resolve(input, format, output),

        Commands::Validate { input } => cmd_validate(input),

        Commands::Extract {
            input,
            operation,
            format,
        } => cmd_extract(input, operation, format),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "apigraph", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<ApiGraphConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

fn load_client(path: &Path, options: &ResolveOptions) -> Result<Client> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let parsed = match ext {
        "json" => parse::from_json(&content)?,
        _ => parse::from_yaml(&content)?,
    };
    log::debug!("parsed {} with {} paths", path.display(), parsed.paths.len());

    let client = transform::resolve_with_options(&parsed, options)
        .with_context(|| format!("failed to resolve {}", path.display()))?;
    Ok(client)
}

fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    let text = match format {
        OutputFormat::Yaml => serde_yaml_ng::to_string(value)?,
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(value)?;
            json.push('\n');
            json
        }
    };
    Ok(text)
}

fn cmd_resolve(
    input: Option<PathBuf>,
    format: Option<FormatArg>,
    output: Option<PathBuf>,
) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let format = format.map(OutputFormat::from).unwrap_or(cfg.format);

    let client = load_client(&input, &ResolveOptions::from(&cfg.resolve))?;
    let text = render(&client, format)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create directory {}", parent.display()))?;
            }
            fs::write(&path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("  wrote {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn cmd_validate(input: PathBuf) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let client = load_client(&input, &ResolveOptions::from(&cfg.resolve))?;

    eprintln!("Valid document: {}", input.display());
    eprintln!("  Version: {}", client.version);
    eprintln!("  Models: {}", client.models.len());
    eprintln!("  Services: {}", client.services.len());
    eprintln!("  Operations: {}", client.operations().count());

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_extract(input: PathBuf, operation: String, format: Option<FormatArg>) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let format = format.map(OutputFormat::from).unwrap_or(cfg.format);
    let client = load_client(&input, &ResolveOptions::from(&cfg.resolve))?;

    let fragment = transform::extract_operation(&client, &operation)
        .with_context(|| format!("no operation with id {operation}"))?;
    print!("{}", render(&fragment, format)?);
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
