use std::path::PathBuf;
use std::process;

use anyhow::Context;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Evaluation of checks against a parsed document
mod check;
/// Parsing of HTML to DOM
mod html;
/// Parsing and matching of DOM selectors
mod selector;
/// Fetching of resources from the web
mod web;

const CHECKS_DEFAULT: &str = "checks.json";

struct Args {
    pub checks: PathBuf,
    pub file: Option<PathBuf>,
    pub url: Option<String>,
    pub trace: bool,
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            println!("Could not parse arguments: {}. Exiting.", e);
            process::exit(1);
        }
    };
    if args.trace {
        tracing_subscriber::fmt::fmt()
            .with_span_events(FmtSpan::ACTIVE)
            .with_max_level(Level::DEBUG)
            .with_env_filter(EnvFilter::from_default_env())
            .finish()
            .init();
        info!("Logger initialized");
    }
    if let Err(msg) = validate_args(&args) {
        println!("{}", msg);
        process::exit(1);
    }
    if let Err(e) = run(&args) {
        println!("{:#}. Exiting.", e);
        process::exit(1);
    }
}

fn parse_args() -> Result<Args, pico_args::Error> {
    let mut pargs = pico_args::Arguments::from_env();
    let args = Args {
        checks: pargs
            .opt_value_from_str(["-c", "--checks"])?
            .unwrap_or_else(|| PathBuf::from(CHECKS_DEFAULT)),
        file: pargs.opt_value_from_str(["-f", "--file"])?,
        url: pargs.opt_value_from_str(["-u", "--url"])?,
        trace: pargs.contains(["-t", "--trace"]),
    };
    Ok(args)
}

/// Validate arguments after parsing completes, before anything is read
fn validate_args(args: &Args) -> Result<(), String> {
    if args.file.is_none() && args.url.is_none() {
        return Err("Need to use either --file or --url. Exiting.".into());
    }
    if args.file.is_some() && args.url.is_some() {
        return Err("Use either --file or --url, not both. Exiting.".into());
    }
    if !args.checks.is_file() {
        return Err(format!("{} does not exist. Exiting.", args.checks.display()));
    }
    if let Some(file) = &args.file {
        if !file.is_file() {
            return Err(format!("{} does not exist. Exiting.", file.display()));
        }
    }
    Ok(())
}

/// Load the HTML, run the checks, print the result map as JSON
fn run(args: &Args) -> anyhow::Result<()> {
    let html_path = match (&args.file, &args.url) {
        (Some(file), None) => file.clone(),
        // The fetched body is persisted to a transient file and re-read
        // through the same path as --file
        (None, Some(url)) => web::fetch_to_file(url)?,
        _ => unreachable!("argument validation enforces exactly one input"),
    };
    let html_text = std::fs::read_to_string(&html_path)
        .with_context(|| format!("could not read {}", html_path.display()))?;
    let results = check::check_document(&html_text, &args.checks)?;
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

#[cfg(test)]
fn test_args(file: Option<&str>, url: Option<&str>) -> Args {
    Args {
        checks: PathBuf::from(CHECKS_DEFAULT),
        file: file.map(PathBuf::from),
        url: url.map(str::to_string),
        trace: false,
    }
}

#[cfg(test)]
#[test]
fn test_validate_requires_one_input() {
    let args = test_args(None, None);
    assert!(validate_args(&args).unwrap_err().contains("either"));

    let args = test_args(Some("index.html"), Some("http://example.com"));
    assert!(validate_args(&args).unwrap_err().contains("not both"));
}

#[cfg(test)]
#[test]
fn test_validate_missing_paths() {
    let mut args = test_args(Some("/nonexistent/index.html"), None);
    args.checks = std::env::temp_dir().join("gradah-test-validate.json");
    std::fs::write(&args.checks, "[]").unwrap();
    // Checks file exists but the HTML file does not
    let msg = validate_args(&args).unwrap_err();
    assert!(msg.contains("/nonexistent/index.html does not exist"));

    args.checks = PathBuf::from("/nonexistent/checks.json");
    let msg = validate_args(&args).unwrap_err();
    assert!(msg.contains("/nonexistent/checks.json does not exist"));
}
