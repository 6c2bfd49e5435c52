use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use canvas_expr::{merge, parse_expression, Context, JsonProcessor, MapContext, Template};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value as Json;
use tracing::{debug, Level};

/// Evaluate condition expressions and render `${path}` templates against a
/// JSON context.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Log verbosity: -v for debug, -vv for trace (logs go to stderr)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a `{...}` expression and print true or false
    Eval {
        /// Expression, e.g. '{a > 5}'
        expr: String,
        /// Print the parsed grouping before the result
        #[arg(long)]
        explain: bool,
        #[command(flatten)]
        context: ContextArgs,
    },
    /// Render a template containing `${path}` placeholders
    Render {
        template: String,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
        #[command(flatten)]
        context: ContextArgs,
    },
}

#[derive(clap::Args, Debug)]
struct ContextArgs {
    /// Context as a JSON object; repeatable, later values win
    #[arg(short, long = "context", value_name = "JSON")]
    context: Vec<String>,
    /// JSON object file; repeatable, merged before inline contexts
    #[arg(long = "context-file", value_name = "PATH")]
    context_file: Vec<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Text,
    Json,
}

fn main() -> ExitCode {
    // Parse CLI arguments.
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Eval {
            expr,
            explain,
            context,
        } => {
            let ctx = load_context(&context)?;
            let parsed = parse_expression(&expr)?;
            if explain {
                println!("{parsed}");
            }
            println!("{}", parsed.evaluate(&ctx)?);
        }
        Command::Render {
            template,
            format,
            context,
        } => {
            let ctx = load_context(&context)?;
            let template = Template::new(template);
            match format {
                Format::Text => println!("{}", template.process(&ctx)?),
                Format::Json => {
                    let out = template.process_with(&JsonProcessor, &ctx)?;
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
            }
        }
    }
    Ok(())
}

/// Merge every context source in order: files first, then inline JSON.
fn load_context(args: &ContextArgs) -> Result<MapContext, Box<dyn Error>> {
    let mut layers = Vec::new();
    for path in &args.context_file {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        layers.push(parse_layer(&raw)?);
    }
    for raw in &args.context {
        layers.push(parse_layer(raw)?);
    }
    let refs: Vec<&dyn Context> = layers.iter().map(|c| c as &dyn Context).collect();
    let merged = merge(&refs);
    debug!(layers = layers.len(), context = ?merged, "loaded context");
    Ok(merged)
}

fn parse_layer(raw: &str) -> Result<MapContext, Box<dyn Error>> {
    let json: Json = serde_json::from_str(raw).map_err(|e| format!("invalid JSON context: {e}"))?;
    Ok(MapContext::from_json(&json)?)
}
