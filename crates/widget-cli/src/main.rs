use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use markup::{LineEnding, MarkupNode, serialize_with};
use widget::{
    HttpValidationService, ServiceTransport, ValidationResult, ValidationService, WidgetConfig,
};

mod config_file;

use config_file::load_config_file;

/// Serializes ASCIIMath expression trees and checks them against an up-conversion service
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML file with widget settings; command line flags take precedence
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Use CRLF line breaks in the serialized markup
    #[arg(long, global = true)]
    crlf: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prints the MathML for a JSON-encoded expression tree
    Serialize {
        /// The JSON file to read; reads stdin if omitted or "-"
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
    /// Sends the MathML for a JSON-encoded expression tree to the validation service
    Validate {
        /// The JSON file to read; reads stdin if omitted or "-"
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Absolute URL of the validation service
        #[arg(long, value_name = "URL")]
        url: Option<String>,

        /// Send the markup as a query parameter instead of the request body
        #[arg(long)]
        get: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let mut config = match args.config {
        Some(ref path) => load_config_file(path)
            .unwrap_or_else(|e| exit_config_error(e, path))
            .widget,
        None => WidgetConfig::default(),
    };
    if args.crlf {
        config.line_ending = LineEnding::CrLf;
    }

    match args.command {
        Command::Serialize { file } => {
            let tree = read_tree(file.as_deref());
            println!("{}", serialize_with(&tree, config.line_ending));
        }
        Command::Validate { file, url, get } => {
            if let Some(url) = url {
                config.service_url = url;
            }
            if get {
                config.transport = ServiceTransport::Get;
            }
            let tree = read_tree(file.as_deref());
            std::process::exit(validate(&config, &tree).await);
        }
    }
}

/// Returns the process exit code: 0 for valid input, 3 when the service rejects it and 4 for
/// responses that fit neither case.
async fn validate(config: &WidgetConfig, tree: &MarkupNode) -> i32 {
    let service = HttpValidationService::from_config(config, None).unwrap_or_else(|e| {
        eprintln!("Invalid service URL '{}': {}", config.service_url, e);
        std::process::exit(1);
    });
    let markup = serialize_with(tree, config.line_ending);
    debug!(url = %service.url(), "validating markup");
    let response = match service.validate(markup).await {
        Ok(response) => response,
        Err(e) => {
            eprintln!("Validation service error: {}", e);
            std::process::exit(2);
        }
    };
    match ValidationResult::from(response) {
        ValidationResult::Success {
            validated_markup,
            display_source,
        } => {
            println!("{}", validated_markup);
            if !display_source.is_empty() {
                println!();
                println!("{}", display_source);
            }
            0
        }
        ValidationResult::Failure { reason } => {
            eprintln!("Rejected by the validation service: {}", reason);
            3
        }
        ValidationResult::Unexpected => {
            eprintln!("Unexpected response from the validation service");
            4
        }
    }
}

fn read_tree(file: Option<&Path>) -> MarkupNode {
    let input = match file {
        Some(path) if path != Path::new("-") => {
            fs::read_to_string(path).unwrap_or_else(|e| exit_io_error(e))
        }
        _ => read_stdin(),
    };
    parse_tree(&input).unwrap_or_else(|e| {
        eprintln!("Invalid expression tree: {}", e);
        std::process::exit(2);
    })
}

#[inline]
fn parse_tree(input: &str) -> Result<MarkupNode, serde_json::Error> {
    serde_json::from_str(input)
}

fn read_stdin() -> String {
    let mut buffer = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut buffer) {
        exit_io_error(e);
    }
    buffer
}

fn exit_config_error(e: config_file::ConfigError, path: &Path) -> ! {
    eprintln!("Could not load config '{}': {}", path.display(), e);
    std::process::exit(1);
}

fn exit_io_error(e: std::io::Error) -> ! {
    eprintln!("IO Error: {}", e);
    std::process::exit(1);
}
