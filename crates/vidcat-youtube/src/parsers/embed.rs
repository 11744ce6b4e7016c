use url::form_urlencoded::byte_serialize;

use super::watch::WATCH_HOST;

/// Player URL used to embed a video in a page.
pub fn embed_url(video_id: &str) -> String {
    let id: String = byte_serialize(video_id.as_bytes()).collect();
    format!("https://{WATCH_HOST}/embed/{id}")
}
