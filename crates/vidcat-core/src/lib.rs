mod error;
mod input;

pub use error::{Field, RecordError, Rejected, VidcatError, VidcatResult};
pub use input::NewVideo;

use url::Url;

/// Parses an absolute `http`/`https` URL.
pub fn parse_http_url(input: &str) -> Result<Url, Rejected> {
    let url = Url::parse(input.trim()).map_err(|err| Rejected::Malformed(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Rejected::Malformed(format!("unsupported scheme: {other}"))),
    }
}
