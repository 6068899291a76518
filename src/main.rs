//! openapi CLI entrypoint
//! Parses command-line arguments and dispatches to the read and info use cases.
#![deny(unsafe_code)]

// Internal imports (std, crate)
use openapicmd::{
    application::{InfoRequest, InfoSections, InfoUseCase, ReadRequest, ReadUseCase},
    core::config::{DEFINITION_ENV, DirectoryWalkLocator, OpenApiConfig, resolve_definition},
    core::utils::parse_header_flag,
    transform::{ArrayMergePolicy, OutputFormat, StripOverrides, TransformOptions},
};
use std::sync::Arc;

// External imports (alphabetized)
use anyhow::{Context, bail};
use clap::{Args, Parser};
use tracing::{Level, debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "openapi")]
#[command(author, version, about = "Read and transform OpenAPI definitions", long_about = None)]
struct Cli {
    /// Log every pipeline stage
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Read and manipulate definition files
    Read {
        #[command(flatten)]
        parse: ParseArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Display API information
    Info {
        #[command(flatten)]
        parse: ParseArgs,
        /// List operations in document
        #[arg(long)]
        operations: bool,
        /// List schemas in document
        #[arg(long)]
        schemas: bool,
        /// List security schemes in document
        #[arg(long)]
        security: bool,
    },
}

/// Flags shared by every command that loads a definition
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Input definition file, URL or `-` for stdin
    definition: Option<String>,
    /// Resolve $ref pointers
    #[arg(short = 'D', long)]
    dereference: bool,
    /// Resolve remote $ref pointers
    #[arg(short = 'B', long)]
    bundle: bool,
    /// Validate against openapi schema
    #[arg(short = 'V', long)]
    validate: bool,
    /// Add request headers when calling remote urls
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
    headers: Vec<String>,
    /// Override api root path (e.g. /v2)
    #[arg(short = 'R', long)]
    root: Option<String>,
    /// Override servers definition
    #[arg(short = 'S', long = "server")]
    servers: Vec<String>,
    /// Inject JSON to definition with deep merge
    #[arg(short = 'I', long = "inject", value_name = "JSON")]
    inject: Vec<String>,
    /// How arrays combine when injecting
    #[arg(long, default_value_t = ArrayMergePolicy::Concat)]
    array_merge: ArrayMergePolicy,
    /// Specify an openapi extension to exclude parts of the spec
    #[arg(short = 'E', long = "exclude-ext", value_name = "EXTENSION")]
    exclude_ext: Option<String>,
    /// Remove unreferenced components
    #[arg(short = 'U', long)]
    remove_unreferenced: bool,
    /// Strip optional metadata such as examples and descriptions
    #[arg(short = 'C', long, value_name = "PRESET")]
    strip: Option<String>,
    /// Strip toggles as JSON, e.g. '{"removeServers":false}'
    #[arg(long, value_name = "JSON")]
    strip_options: Option<String>,
    /// Derive a server from the definition url
    #[arg(long)]
    induce_servers: bool,
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Output format [default: yaml]
    #[arg(short, long, conflicts_with_all = ["json", "yaml"])]
    format: Option<OutputFormat>,
    /// Format as json (short for -f json)
    #[arg(long, conflicts_with = "yaml")]
    json: bool,
    /// Format as yaml (short for -f yaml)
    #[arg(long)]
    yaml: bool,
}

impl OutputArgs {
    fn format(&self) -> OutputFormat {
        match (self.format, self.json) {
            (Some(format), _) => format,
            (None, true) => OutputFormat::Json,
            (None, false) => OutputFormat::Yaml,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr so stdout only carries the document
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    match &cli.command {
        Commands::Read { parse, output } => {
            let options = build_transform_options(parse)?;
            let loader = Arc::new(options.loader()?);
            let text = ReadUseCase::new(loader)
                .execute(ReadRequest {
                    options,
                    format: output.format(),
                })
                .await?;
            println!("{text}");
        }
        Commands::Info {
            parse,
            operations,
            schemas,
            security,
        } => {
            let options = build_transform_options(parse)?;
            let loader = Arc::new(options.loader()?);
            let text = InfoUseCase::new(loader)
                .execute(InfoRequest {
                    options,
                    sections: InfoSections {
                        operations: *operations,
                        schemas: *schemas,
                        security: *security,
                    },
                })
                .await?;
            print!("{text}");
        }
    }
    Ok(())
}

/// Turns CLI flags plus environment and config fallbacks into pipeline options
fn build_transform_options(args: &ParseArgs) -> anyhow::Result<TransformOptions> {
    let config = load_config();
    let env = std::env::var(DEFINITION_ENV).ok();
    let Some(source) = resolve_definition(
        args.definition.as_deref(),
        env.as_deref(),
        config.as_ref(),
    ) else {
        bail!("Please load a definition file");
    };
    debug!(source = %source, "Resolved definition source");

    let strip_overrides = match args.strip_options.as_deref() {
        Some(json) => serde_json::from_str::<StripOverrides>(json)
            .with_context(|| format!("Invalid --strip-options: {json}"))?,
        None => StripOverrides::default(),
    };

    Ok(TransformOptions {
        source,
        dereference: args.dereference,
        bundle: args.bundle,
        validate: args.validate,
        inject_fragments: args.inject.clone(),
        array_merge: args.array_merge,
        exclude_extension: args.exclude_ext.clone(),
        remove_unreferenced: args.remove_unreferenced,
        strip_preset: args.strip.clone(),
        strip_overrides,
        add_servers: args.servers.clone(),
        api_root: args.root.clone(),
        induce_server_from_source: args.induce_servers,
        request_headers: parse_header_flag(&args.headers),
    })
}

/// A broken config file is reported but never blocks a command
fn load_config() -> Option<OpenApiConfig> {
    let cwd = std::env::current_dir().ok()?;
    match OpenApiConfig::discover(&DirectoryWalkLocator::new(), &cwd) {
        Ok(config) => config,
        Err(e) => {
            warn!("Ignoring unreadable config: {e}");
            None
        }
    }
}
