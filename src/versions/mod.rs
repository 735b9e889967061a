//! Bible translations: metadata, catalog and downloads

mod catalog;
mod fetch;
mod version;

pub use catalog::Catalog;
pub use fetch::{Fetch, FetchSink, HttpClient};
pub use version::{SOURCE_URL_BASE, Version};
