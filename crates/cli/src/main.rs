mod echo;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use owo_colors::OwoColorize;
use synopsis_core::{
    ContentExtractor, FetchConfig, HttpFetcher, Model, PageExtractor, Pipeline, RawDocument, Summarizer,
    SynopsisConfig, SynopsisError, fetch_file, fetch_stdin, validate_url,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use url::Url;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Summarize web pages with a language model
#[derive(Parser, Debug)]
#[command(name = "synopsis")]
#[command(author = "Synopsis Contributors")]
#[command(version)]
#[command(about = "Summarize web pages with a language model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging and step output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a page, extract its main text and summarize it
    Summarize(SummarizeArgs),
    /// Fetch a page and print its main text without summarizing
    Extract(ExtractArgs),
    /// List the supported models
    Models,
}

#[derive(Args, Debug)]
struct SummarizeArgs {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Model to use (default: AI_MODEL or gpt-4o)
    #[arg(short, long, value_name = "MODEL")]
    model: Option<String>,

    /// Maximum number of characters sent to the model
    #[arg(long, value_name = "CHARS", value_parser = clap::value_parser!(u64).range(1..))]
    max_length: Option<u64>,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "10", value_name = "SECS")]
    timeout: u64,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "10", value_name = "SECS")]
    timeout: u64,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

/// Where the HTML comes from
#[derive(Debug)]
enum Input {
    Stdin,
    File(PathBuf),
    Url(Url),
}

impl Input {
    /// `-` is stdin, an existing path is a file, anything else must be a URL.
    fn parse(raw: &str) -> Result<Self, SynopsisError> {
        if raw == "-" {
            Ok(Input::Stdin)
        } else if Path::new(raw).is_file() {
            Ok(Input::File(PathBuf::from(raw)))
        } else {
            validate_url(raw).map(Input::Url)
        }
    }

    fn describe(&self) -> String {
        match self {
            Input::Stdin => "Reading from stdin".to_string(),
            Input::File(path) => format!("Reading from file {}", path.display().bright_white()),
            Input::Url(url) => format!("Fetching from {}", url.as_str().bright_white().underline()),
        }
    }

    /// Reads a local input. URLs are left to the pipeline and yield `None`.
    fn read_local(&self) -> Result<Option<RawDocument>, SynopsisError> {
        let document = match self {
            Input::Stdin => fetch_stdin()?,
            Input::File(path) => fetch_file(path)?,
            Input::Url(_) => return Ok(None),
        };

        debug!(bytes = document.body.len(), "read local document");
        Ok(Some(document))
    }
}

fn http_fetcher(timeout: u64) -> Result<HttpFetcher, SynopsisError> {
    Ok(HttpFetcher::new(FetchConfig { timeout, ..Default::default() })?)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "synopsis=debug,synopsis_core=debug,warn" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
    }

    let result = match &cli.command {
        Command::Summarize(args) => summarize(args, cli.verbose).await,
        Command::Extract(args) => extract(args, cli.verbose).await,
        Command::Models => models(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let stage = err
                .chain()
                .find_map(|cause| cause.downcast_ref::<SynopsisError>())
                .map_or("cli", SynopsisError::stage);
            echo::print_error(stage, &format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

async fn summarize(args: &SummarizeArgs, verbose: bool) -> anyhow::Result<()> {
    let started = Instant::now();
    let input = Input::parse(&args.input)?;

    let mut config = SynopsisConfig::from_env().context("Failed to load configuration")?;
    if let Some(max_length) = args.max_length {
        config.max_text_length = usize::try_from(max_length).context("--max-length is too large")?;
    }

    let summarizer = Summarizer::new(config.provider()?, config.summarizer_config());
    let pipeline = Pipeline::new(http_fetcher(args.timeout)?, ContentExtractor::new(), summarizer);
    let model = args.model.as_deref();

    debug!(input = ?input, timeout = args.timeout, "summarizing input");
    if verbose {
        echo::print_step(1, 2, &input.describe());
    }

    let local = input.read_local().context("Failed to load document")?;
    if verbose {
        print_document_size(local.as_ref());
    }

    let summary = match local {
        Some(document) => pipeline.summarize_document(&document, model).await,
        None => pipeline.summarize_url(&args.input, model).await,
    }
    .context("Failed to summarize page")?;

    if verbose {
        echo::print_summary_details(&summary);
        echo::print_step(2, 2, "Writing output");
    }

    write_output(args.output.as_deref(), &summary.text)?;

    if verbose {
        echo::print_field("Total", &format!("{:.2}s", started.elapsed().as_secs_f64()));
    }

    Ok(())
}

async fn extract(args: &ExtractArgs, verbose: bool) -> anyhow::Result<()> {
    let input = Input::parse(&args.input)?;
    let pages = PageExtractor::new(http_fetcher(args.timeout)?, ContentExtractor::new());

    debug!(input = ?input, timeout = args.timeout, "extracting input");
    if verbose {
        echo::print_step(1, 2, &input.describe());
    }

    let local = input.read_local().context("Failed to load document")?;
    if verbose {
        print_document_size(local.as_ref());
        echo::print_info("Extracting main content");
    }

    let text = match local {
        Some(document) => pages.extract_document(&document),
        None => pages.extract_url(&args.input).await,
    }
    .context("Failed to extract content")?;

    if verbose {
        echo::print_extraction_details(&text);
        echo::print_step(2, 2, "Writing output");
    }

    write_output(args.output.as_deref(), text.as_str())
}

fn print_document_size(document: Option<&RawDocument>) {
    if let Some(document) = document {
        echo::print_field("Size", &echo::format_size(document.body.len()));
    }
}

fn write_output(path: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, format!("{}\n", text))
                .with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => println!("{}", text),
    }

    Ok(())
}

/// Lists supported models, marking the one `AI_MODEL` selects.
fn models() -> anyhow::Result<()> {
    let configured = SynopsisConfig::model_from_env().context("Failed to load configuration")?;

    for model in Model::SUPPORTED {
        if model == configured {
            println!("{} {}", model, "(default)".dimmed());
        } else {
            println!("{}", model);
        }
    }

    Ok(())
}
