//! Media downloader - runs the external twitter-media-downloader (`twmd`) for one
//! account and reports which images landed in the account's download directory.
//!
//! One blocking run per call, bounded by the configured timeout. No retries.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{info, warn};

use crate::config::DownloaderConfig;
use crate::constants::{DOWNLOADS_DIR, IMAGE_EXTENSIONS};

/// Error types for downloader runs
#[derive(Debug)]
pub enum DownloadError {
    Validation(String),
    ToolNotInstalled { program: String },
    ToolFailed {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    TimedOut(Duration),
    Io(std::io::Error),
}

impl std::fmt::Display for DownloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DownloadError::Validation(s) => write!(f, "{}", s),
            DownloadError::ToolNotInstalled { program } => {
                write!(f, "downloader executable not found: {}", program)
            }
            DownloadError::ToolFailed {
                code,
                stdout,
                stderr,
            } => {
                match code {
                    Some(code) => write!(f, "downloader exited with status {}: {}", code, stderr.trim())?,
                    None => write!(f, "downloader terminated by signal: {}", stderr.trim())?,
                }
                if !stdout.trim().is_empty() {
                    write!(f, "\nstdout: {}", stdout.trim())?;
                }
                Ok(())
            }
            DownloadError::TimedOut(limit) => {
                write!(f, "downloader timed out after {}s", limit.as_secs_f64())
            }
            DownloadError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for DownloadError {}

impl From<std::io::Error> for DownloadError {
    fn from(e: std::io::Error) -> Self {
        DownloadError::Io(e)
    }
}

/// Download switches sent by the client
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DownloadOptions {
    /// Passed to the tool as-is, negative values included
    pub image_count: i64,
    pub include_retweets: bool,
    pub only_media: bool,
    /// Accepted for client compatibility; the tool has no matching switch
    #[serde(rename = "includeNSFW")]
    pub include_nsfw: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            image_count: 100,
            include_retweets: false,
            only_media: true,
            include_nsfw: true,
        }
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResult {
    pub success: bool,
    pub downloaded_count: usize,
    pub files: Vec<String>,
    /// Public URL path of the download directory
    pub directory: String,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone)]
pub struct MediaDownloader {
    config: DownloaderConfig,
}

impl MediaDownloader {
    pub fn new(config: DownloaderConfig) -> Self {
        Self { config }
    }

    /// `<public_dir>/downloads`, served statically under `/downloads`
    pub fn downloads_root(&self) -> PathBuf {
        self.config.public_dir.join(DOWNLOADS_DIR)
    }

    /// Run the downloader once for `account`.
    pub async fn download(
        &self,
        account: &str,
        options: &DownloadOptions,
    ) -> Result<DownloadResult, DownloadError> {
        let account = normalize_account(account)?;
        let output_dir = self.downloads_root().join(account);
        tokio::fs::create_dir_all(&output_dir).await?;

        let args = build_args(account, &output_dir, options);
        info!(
            "[downloads] Running {} for @{} (count={}, retweets={}, media_only={}, nsfw={})",
            self.config.program,
            account,
            options.image_count,
            options.include_retweets,
            options.only_media,
            options.include_nsfw
        );

        let child = Command::new(&self.config.program)
            .args(&self.config.leading_args)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => DownloadError::ToolNotInstalled {
                    program: self.config.program.clone(),
                },
                _ => DownloadError::Io(e),
            })?;

        // Dropping the wait on timeout kills the child (kill_on_drop)
        let output = match tokio::time::timeout(self.config.timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                warn!("[downloads] @{} timed out after {:?}", account, self.config.timeout);
                return Err(DownloadError::TimedOut(self.config.timeout));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            warn!(
                "[downloads] @{} failed with {:?}: {}",
                account,
                output.status.code(),
                stderr.trim()
            );
            return Err(DownloadError::ToolFailed {
                code: output.status.code(),
                stdout,
                stderr,
            });
        }

        // The directory listing is authoritative, not the tool's own report
        let files = list_images(&output_dir).await?;
        info!("[downloads] @{} has {} images on disk", account, files.len());

        Ok(DownloadResult {
            success: true,
            downloaded_count: files.len(),
            files,
            directory: format!("/{}/{}", DOWNLOADS_DIR, account),
            stdout,
            stderr,
        })
    }
}

/// Trim, drop one leading `@`, and allow only `[A-Za-z0-9_]` so the handle is
/// safe both as a path segment and as a process argument.
pub fn normalize_account(raw: &str) -> Result<&str, DownloadError> {
    let trimmed = raw.trim();
    let account = trimmed.strip_prefix('@').unwrap_or(trimmed);

    if account.is_empty() {
        return Err(DownloadError::Validation("Username is required".into()));
    }
    if !account.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return Err(DownloadError::Validation(
            "Username may only contain letters, digits and underscores".into(),
        ));
    }

    Ok(account)
}

/// Argument vector: `-u <account> -o <dir> -a -n <count> -B [-r] [-M]`
pub fn build_args(account: &str, output_dir: &Path, options: &DownloadOptions) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-u".into(),
        account.into(),
        "-o".into(),
        output_dir.as_os_str().to_owned(),
        // images and videos
        "-a".into(),
        "-n".into(),
        options.image_count.to_string().into(),
        // no banner
        "-B".into(),
    ];

    if options.include_retweets {
        args.push("-r".into());
    }
    if options.only_media {
        args.push("-M".into());
    }

    args
}

/// Image file names in `dir`, sorted. Extensions compare case-insensitively.
pub async fn list_images(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_image_name(&name) {
            files.push(name);
        }
    }

    files.sort();
    Ok(files)
}

fn is_image_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}
