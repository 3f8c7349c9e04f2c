//! Entry point: loads configuration, fetches (or reads) the stats page and
//! prints the extracted metrics.

use std::fs;

use anyhow::{bail, Context, Result};

use modemstat::{parse_stats, Config, Fetcher};

struct CliArgs {
    config: String,
    debug: bool,
    json: bool,
    parse: Option<String>,
    help: bool,
}

fn parse_args() -> Result<CliArgs> {
    let mut args = CliArgs {
        config: "modemstat.toml".to_string(),
        debug: false,
        json: false,
        parse: None,
        help: false,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                args.config = iter.next().context("--config requires a path")?;
            }
            "--debug" | "-d" => args.debug = true,
            "--json" => args.json = true,
            "--parse" => {
                args.parse = Some(iter.next().context("--parse requires a file")?);
            }
            "--help" | "-h" => args.help = true,
            other => bail!("Unknown argument: {}", other),
        }
    }
    Ok(args)
}

fn print_help() {
    eprintln!(
        r#"modemstat - line statistics from a Technicolor TGiiNet-1 modem

USAGE:
    modemstat [OPTIONS]

OPTIONS:
    -c, --config <path>    Config file (default: modemstat.toml)
    -d, --debug            Debug logging, including handshake wire values
        --json             JSON output
        --parse <file>     Parse a saved stats page instead of fetching
    -h, --help             Print this help

ENVIRONMENT VARIABLES:
    RUST_LOG               Log filter (overrides --debug)

The config file holds the modem address and login:

    address = "10.1.1.1"
    username = "admin"
    password = "..."
"#
    );
}

fn main() -> Result<()> {
    let args = parse_args()?;

    if args.help {
        print_help();
        return Ok(());
    }

    let default_filter = if args.debug {
        "modemstat=debug"
    } else {
        "modemstat=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load_from_file(&args.config)?;

    let stats_page = match &args.parse {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?
        }
        None => {
            let mut fetcher = Fetcher::new(&config)?;
            let page = fetcher.fetch()?;
            tracing::debug!("{}", page);
            page
        }
    };

    let stats = parse_stats(&stats_page)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", stats.to_plain());
    }

    Ok(())
}
