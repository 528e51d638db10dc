use std::time::Duration;

use url::Url;

/// Result of fetching a URL
#[derive(Clone)]
pub struct FetchResult {
    pub body: Vec<u8>,
}

impl FetchResult {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Error during fetch
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("client error: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("failed to read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Whether `location` names an http(s) resource rather than a local path.
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Fetch a URL and return its body (blocking).
///
/// Non-success statuses are reported as errors.
pub fn fetch_url(url_str: &str, timeout: Duration) -> Result<FetchResult, FetchError> {
    let parsed = Url::parse(url_str).map_err(|source| FetchError::InvalidUrl {
        url: url_str.to_string(),
        source,
    })?;

    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("catalog-page/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(FetchError::Client)?;

    let response = client
        .get(parsed.as_str())
        .send()
        .map_err(|source| FetchError::Request {
            url: url_str.to_string(),
            source,
        })?;

    if !response.status().is_success() {
        return Err(FetchError::Status {
            url: url_str.to_string(),
            status: response.status().as_u16(),
        });
    }

    let final_url = response.url().to_string();
    log::debug!("Fetched {} ({})", final_url, response.status());

    let body = response.bytes().map_err(|source| FetchError::Body {
        url: final_url,
        source,
    })?;

    Ok(FetchResult {
        body: body.to_vec(),
    })
}
