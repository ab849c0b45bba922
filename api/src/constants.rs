//! Application constants

/// Sub-directory of the public assets root that holds per-account downloads
pub const DOWNLOADS_DIR: &str = "downloads";

/// Default upper bound on a single downloader run (5 minutes)
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 5 * 60;

/// Default downloader executable, resolved through PATH
pub const DEFAULT_DOWNLOADER_BIN: &str = "twmd";

/// File extensions counted as downloaded images (compared case-insensitively)
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Where to send people when the downloader binary is missing
pub const DOWNLOADER_INSTALL_URL: &str = "https://github.com/mmpx12/twitter-media-downloader";

/// Profile URL pattern for `socialLinks.twitter`
pub const TWITTER_PROFILE_URL_BASE: &str = "https://twitter.com";

/// Image CDN host for asset URLs
pub const SANITY_IMAGE_CDN: &str = "https://cdn.sanity.io/images";

/// Document type written by the profile persister
pub const COSPLAYER_DOC_TYPE: &str = "cosplayer";

/// Avatar edge length used for cosplayer cards
pub const AVATAR_SIZE_PX: u32 = 60;

/// Cover image size used for cosplayer cards
pub const COVER_WIDTH_PX: u32 = 400;
pub const COVER_HEIGHT_PX: u32 = 225;
