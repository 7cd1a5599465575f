//! JSON:API Schema CLI
//!
//! Command-line interface for serializing JSON objects with a declarative
//! schema definition and for checking definitions.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use jsonapi_schema::{check_definition, load_json, load_json_auto, LoadError, SchemaSerializer};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jsonapi-schema")]
#[command(about = "Serialize JSON objects into JSON:API documents")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serialize an object or array of objects with a schema definition
    Serialize {
        /// Input file holding one object or an array of objects
        input: PathBuf,

        /// Schema definition source: file path or URL (http:// or https://)
        #[arg(long, short)]
        schema: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Strict mode: fail on missing type, ids or attribute fields (default: false)
        #[arg(long, default_value_t = false, action = ArgAction::Set)]
        strict: bool,
    },

    /// Check a schema definition for errors
    Check {
        /// Schema definition source: file path or URL
        schema: String,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Serialize {
            input,
            schema,
            output,
            pretty,
            strict,
        } => run_serialize(&input, &schema, output, pretty, strict),
        Commands::Check { schema, json } => run_check(&schema, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,jsonapi_schema={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_serialize(
    input_path: &Path,
    schema_source: &str,
    output: Option<PathBuf>,
    pretty: bool,
    strict: bool,
) -> Result<(), u8> {
    let definition = load_json_auto(schema_source).map_err(|e| {
        eprintln!("Error loading schema: {}", e);
        e.exit_code() as u8
    })?;

    let serializer = SchemaSerializer::from_json(&definition)
        .map_err(|e| {
            report_load_error(&e);
            e.exit_code() as u8
        })?
        .strict(strict);

    let input = load_json(input_path).map_err(|e| {
        eprintln!("Error loading input: {}", e);
        e.exit_code() as u8
    })?;

    let document = serializer.try_serialize(&input).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let json_output = if pretty {
        serde_json::to_string_pretty(&document)
    } else {
        serde_json::to_string(&document)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_check(schema_source: &str, json_output: bool) -> Result<(), u8> {
    let definition = load_json_auto(schema_source).map_err(|e| {
        report_error(json_output, &format!("loading schema: {}", e));
        e.exit_code() as u8
    })?;

    match check_definition(&definition) {
        Ok(()) => {
            if json_output {
                println!(r#"{{"valid":true}}"#);
            } else {
                println!("Valid");
            }
            Ok(())
        }
        Err(LoadError::InvalidDefinition { issues }) => {
            if json_output {
                let output = serde_json::json!({
                    "valid": false,
                    "issues": issues
                });
                println!("{}", output);
            } else {
                eprintln!("Invalid schema definition:");
                for issue in issues {
                    eprintln!("  {}", issue);
                }
            }
            Err(1)
        }
        Err(e) => {
            report_error(json_output, &e.to_string());
            Err(e.exit_code() as u8)
        }
    }
}

fn report_load_error(e: &LoadError) {
    eprintln!("Error: {}", e);
    if let LoadError::InvalidDefinition { issues } = e {
        for issue in issues {
            eprintln!("  {}", issue);
        }
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}
