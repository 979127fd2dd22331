//! Logger service testing console.
//!
//! ```text
//!   banner
//!     → structured backend (bundled config): info → console + udp targets
//!     → retarget "udp" to --udp-address
//!     → basic backend: info → stdout
//!     → wait for Enter (or EOF)
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;

use logger_service::config::DEFAULT_RESOURCE;
use logger_service::observability::{diagnostics_filter, init_logging};
use logger_service::{BasicLoggingService, LoggingService, NetworkTarget, StructuredLoggingService};

const BANNER: &str = "Logger service testing console";
const MESSAGE: &str = "This is an info message.";

#[derive(Parser)]
#[command(name = "logger-service")]
#[command(about = "Exercises the structured and basic logging backends", long_about = None)]
struct Cli {
    /// Load logging configuration from a TOML file instead of the bundled resource
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reload the --config file when it changes
    #[arg(short, long, requires = "config")]
    watch: bool,

    /// Bundled configuration resource to load
    #[arg(short, long, default_value = DEFAULT_RESOURCE)]
    resource: String,

    /// Address the "udp" target is switched to after the first message
    #[arg(long, default_value = "udp4://10.0.0.2:9999")]
    udp_address: String,

    /// Exit without waiting for Enter
    #[arg(long)]
    no_wait: bool,

    /// Level for the service's own diagnostics (overrides the configuration)
    #[arg(long, value_parser = parse_log_level)]
    log_level: Option<String>,
}

fn parse_log_level(level: &str) -> Result<String, String> {
    diagnostics_filter(level)
        .map(|_| level.to_string())
        .map_err(|e| e.to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    println!("{}", BANNER);
    io::stdout().flush()?;

    let structured = match &cli.config {
        Some(path) => StructuredLoggingService::from_file(path)?,
        None => StructuredLoggingService::from_resource(&cli.resource)?,
    };

    let diagnostics_level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| structured.configuration().internal_log_level().to_string());
    init_logging(&diagnostics_level)?;

    let _watcher = match (&cli.config, cli.watch) {
        (Some(path), true) => Some(structured.watch(path)?),
        _ => None,
    };

    structured.info(MESSAGE)?;

    structured
        .configuration()
        .require_target::<NetworkTarget>("udp")?
        .set_address(&cli.udp_address)?;

    let basic = BasicLoggingService::stdout();
    basic.info(MESSAGE)?;

    if !cli.no_wait {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
    }

    structured.flush()?;
    Ok(())
}
