//! letterpress CLI
//!
//! Usage:
//!   letterpress render <TEMPLATE> [--layout <LAYOUT>] [--data <FILE>] [--json]
//!   letterpress send <TO> <TEMPLATE> [--subject <SUBJECT>] [--layout <LAYOUT>] [--data <FILE>]
//!
//! Template data is a JSON object read from `--data`, or from stdin when the
//! path is `-`. Settings come from `config/` files and `LETTERPRESS__*`
//! environment variables.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use letterpress::config::Settings;
use letterpress::email::LogSender;
use letterpress::error::AppError;
use letterpress::metrics::encode_metrics;
use letterpress::telemetry::init_telemetry;
use letterpress::{Mailer, Renderer, TemplateEmail};

#[derive(Parser)]
#[command(name = "letterpress")]
#[command(about = "Compose transactional email from markdown templates")]
struct Cli {
    /// Settings file, used instead of the config/ directory and environment
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print Prometheus metrics to stderr before exiting
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a template and print the result
    Render {
        #[command(flatten)]
        template: TemplateArgs,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a template and hand it to the log transport
    Send {
        /// Recipient address
        to: String,

        #[command(flatten)]
        template: TemplateArgs,

        /// Subject line; overrides the template's frontmatter
        #[arg(short, long)]
        subject: Option<String>,
    },
}

#[derive(Args)]
struct TemplateArgs {
    /// Template name, relative to the template root
    template: String,

    /// Layout name, relative to the layout root
    #[arg(short, long)]
    layout: Option<String>,

    /// JSON data file (`-` reads stdin)
    #[arg(short, long)]
    data: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::from_file(&path.to_string_lossy()),
        None => Settings::new(),
    }
    .context("Failed to load configuration")?;

    let telemetry = init_telemetry(&settings.otel)?;
    tracing::debug!(?settings, "Configuration loaded");

    let outcome = run(cli, settings).await;

    // Export buffered spans before the process exits
    if let Err(e) = telemetry.shutdown() {
        tracing::warn!(error = %e, "Failed to flush telemetry");
    }

    outcome
}

async fn run(cli: Cli, settings: Settings) -> Result<()> {
    let renderer = Arc::new(Renderer::from_settings(&settings.templates));

    match cli.command {
        Command::Render { template, json } => {
            let data = read_data(template.data.as_ref()).context("Failed to load template data")?;
            let layout = template
                .layout
                .unwrap_or_else(|| settings.mailer.default_layout.clone());

            let result = renderer.render(&layout, &template.template, &data)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.text);
                println!();
                println!("{}", result.html);
            }
        }
        Command::Send {
            to,
            template,
            subject,
        } => {
            let data = read_data(template.data.as_ref()).context("Failed to load template data")?;
            let mut message = TemplateEmail::new(to, template.template, data);
            if let Some(subject) = subject {
                message = message.subject(subject);
            }
            if let Some(layout) = template.layout {
                message = message.layout(layout);
            }

            let mailer = Mailer::new(renderer, Arc::new(LogSender::new()), settings.mailer.clone());

            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if signal::ctrl_c().await.is_ok() {
                    tracing::info!("Received Ctrl+C, cancelling send");
                    on_signal.cancel();
                }
            });

            mailer.send(message, &cancel).await?;
        }
    }

    if cli.metrics {
        eprintln!("{}", encode_metrics()?);
    }

    Ok(())
}

/// Read template data from a file or stdin; no path means an empty object
fn read_data(path: Option<&PathBuf>) -> Result<Value, AppError> {
    let raw = match path {
        None => return Ok(Value::Object(Default::default())),
        Some(path) if path.as_os_str() == "-" => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
        Some(path) => fs::read_to_string(path)?,
    };

    let data: Value = serde_json::from_str(&raw)?;
    if !data.is_object() {
        return Err(AppError::DataNotObject);
    }
    Ok(data)
}
