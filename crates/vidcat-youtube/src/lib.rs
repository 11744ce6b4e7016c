mod parsers;

pub use parsers::embed::embed_url;
pub use parsers::watch::validate_and_extract;
