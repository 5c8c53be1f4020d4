//! rpcgen command-line interface.

mod config;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use config::RpcgenConfig;
use rpcgen::{BackendCategory, GenerateOptions, Schema};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "rpcgen",
    version,
    about = "Generate types, validators and clients from RPC schemas"
)]
struct Cli {
    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate code from a schema document
    Generate(GenerateArgs),

    /// List available backends
    Backends,
}

#[derive(Args, Debug, Default)]
struct GenerateArgs {
    /// Backend name (see `rpcgen backends`)
    backend: String,

    /// Schema document ("-" reads stdin)
    #[arg(short, long, default_value = "schema.json")]
    schema: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file (default: ./rpcgen.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Go package name
    #[arg(long)]
    package: Option<String>,

    /// Module imported as `fetch` by the TypeScript client ("" for the global fetch)
    #[arg(long)]
    fetch_library: Option<String>,

    /// Ruby module name
    #[arg(long)]
    module: Option<String>,

    /// Ruby client class name
    #[arg(long)]
    class: Option<String>,

    /// Go struct tag (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Do not generate validation code
    #[arg(long)]
    no_validate: bool,
}

impl GenerateArgs {
    /// Apply the flags on top of configured options.
    fn options(&self, mut options: GenerateOptions) -> GenerateOptions {
        if let Some(package) = &self.package {
            options.package = Some(package.clone());
        }
        if let Some(library) = &self.fetch_library {
            options.fetch_library = library.clone();
        }
        if let Some(module) = &self.module {
            options.module = module.clone();
        }
        if let Some(class) = &self.class {
            options.class = class.clone();
        }
        if !self.tags.is_empty() {
            options.tags = self.tags.clone();
        }
        if self.no_validate {
            options.validate = false;
        }
        options
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `-v` flags take precedence over `RUST_LOG`.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Generate(args) => generate(&args),
        Command::Backends => {
            let mut stdout = io::stdout().lock();
            for backend in rpcgen::backends() {
                let category = match backend.category() {
                    BackendCategory::Types => "types",
                    BackendCategory::Client => "client",
                };
                writeln!(
                    stdout,
                    "{:<20} {:<12} {:<8} .{}",
                    backend.name(),
                    backend.language(),
                    category,
                    backend.extension()
                )?;
            }
            Ok(())
        }
    }
}

fn generate(args: &GenerateArgs) -> Result<()> {
    let Some(backend) = rpcgen::get_backend(&args.backend) else {
        bail!(
            "unknown backend `{}` (available: {})",
            args.backend,
            rpcgen::backend_names().join(", ")
        );
    };

    let config = RpcgenConfig::load(args.config.as_deref())?;
    let options = args.options(config.generate);
    let schema = load_schema(&args.schema)?;

    let output = backend
        .generate(&schema, &options)
        .with_context(|| format!("failed to generate {} code from {}", backend.name(), args.schema.display()))?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote output");
        }
        None => io::stdout().lock().write_all(output.as_bytes())?,
    }
    Ok(())
}

fn load_schema(path: &Path) -> Result<Schema> {
    if path == Path::new("-") {
        return Schema::from_reader(io::stdin().lock()).context("failed to load schema from stdin");
    }
    let file = File::open(path).with_context(|| format!("failed to open schema {}", path.display()))?;
    Schema::from_reader(file).with_context(|| format!("failed to load schema {}", path.display()))
}
