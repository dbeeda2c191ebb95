use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{span, Level};
use url::Url;

/// Fetched pages are parked here before checking; the file is left behind
/// after the run.
pub const TEMP_FILE: &str = "temp.tmp";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetch `url` with a single GET and persist the body to [`TEMP_FILE`],
/// returning the path to the written file. Any transport error, timeout or
/// non-success status is an error; nothing is written in that case.
pub fn fetch_to_file(url: &str) -> Result<PathBuf> {
    let url = Url::parse(url).with_context(|| format!("could not parse URL {:?}", url))?;
    let span = span!(Level::DEBUG, "Fetching resource", "{}", &url);
    let _enter = span.enter();
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .context("could not build HTTP client")?;
    let body = client
        .get(url.as_str())
        .send()
        .and_then(|resp| resp.error_for_status())
        .with_context(|| format!("could not fetch {}", url))?
        .text()
        .context("could not decode response body")?;
    fs::write(TEMP_FILE, body).with_context(|| format!("could not write {}", TEMP_FILE))?;
    Ok(PathBuf::from(TEMP_FILE))
}
