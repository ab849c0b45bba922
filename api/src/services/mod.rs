pub mod error;
pub mod image_url;
pub mod media_downloader;
pub mod sanity;
