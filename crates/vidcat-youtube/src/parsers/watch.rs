use url::Url;
use vidcat_core::{Rejected, parse_http_url};

pub(crate) const WATCH_HOST: &str = "www.youtube.com";
const WATCH_PATH: &str = "/watch";
const VIDEO_PARAM: &str = "v";

/// Checks that `input` is a YouTube watch-page URL and returns its video id.
///
/// Host, then path, then query are checked in that order, so a URL with the
/// wrong path is reported as such even when it carries a `v` parameter. The
/// id is the first non-empty `v` value, query-unescaped and otherwise verbatim.
/// An explicit port or any userinfo counts as a wrong host.
pub fn validate_and_extract(input: &str) -> Result<String, Rejected> {
    let url = parse_http_url(input)?;

    let host = url.host_str().unwrap_or_default();
    if host != WATCH_HOST {
        return Err(Rejected::WrongHost(host.to_string()));
    }
    if url.port().is_some() || !url.username().is_empty() || url.password().is_some() {
        return Err(Rejected::WrongHost(authority(&url)));
    }

    if url.path() != WATCH_PATH {
        return Err(Rejected::WrongPath(url.path().to_string()));
    }

    url.query_pairs()
        .filter(|(key, _)| key == VIDEO_PARAM)
        .map(|(_, value)| value.into_owned())
        .find(|value| !value.is_empty())
        .ok_or(Rejected::MissingVideoId)
}

fn authority(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    let user = match (url.username(), url.password()) {
        ("", None) => String::new(),
        (name, _) => format!("{name}@"),
    };
    match url.port() {
        Some(port) => format!("{user}{host}:{port}"),
        None => format!("{user}{host}"),
    }
}
