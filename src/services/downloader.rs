//! Media download service
//!
//! Delegates extraction to the yt-dlp subprocess. A URL must pass the
//! platform allowlist before any process is spawned; concurrency is
//! bounded by a semaphore and every run is wrapped in a timeout. Each
//! download gets its own directory under the configured temp path so
//! cleanup is a single directory removal.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{info, warn, debug};
use url::Url;
use uuid::Uuid;

use crate::config::DownloadConfig;
use crate::utils::errors::{DownloadError, DownloadResult};
use crate::utils::helpers::strip_www;

/// A successfully extracted media file
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub path: PathBuf,
    pub file_name: String,
}

/// yt-dlp backed download service
#[derive(Debug, Clone)]
pub struct DownloadService {
    config: DownloadConfig,
    semaphore: Arc<Semaphore>,
}

impl DownloadService {
    pub fn new(config: DownloadConfig) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent));
        Self { config, semaphore }
    }

    /// Check a URL host against the platform allowlist.
    ///
    /// A leading `www.` is stripped; a host matches when it equals an
    /// allowlisted domain or is a subdomain of one.
    pub fn is_supported_platform(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = strip_www(host);

        self.config.supported_platforms.iter().any(|platform| {
            host == platform || host.ends_with(&format!(".{}", platform))
        })
    }

    /// Download the media behind a URL into a fresh temp directory
    pub async fn download(&self, url: &Url) -> DownloadResult<DownloadedFile> {
        if !self.is_supported_platform(url) {
            return Err(DownloadError::UnsupportedPlatform(
                url.host_str().unwrap_or("unknown").to_string(),
            ));
        }

        // Bounds the number of concurrent extractor processes.
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| DownloadError::ExtractorFailed(e.to_string()))?;

        let work_dir = PathBuf::from(&self.config.temp_path).join(Uuid::new_v4().to_string());
        tokio::fs::create_dir_all(&work_dir)
            .await
            .map_err(|e| DownloadError::ExtractorFailed(e.to_string()))?;

        debug!(url = %url, dir = %work_dir.display(), "Starting extraction");

        let result = tokio::time::timeout(
            Duration::from_secs(self.config.timeout_seconds),
            self.run_extractor(url, &work_dir),
        )
        .await;

        match result {
            Ok(Ok(file)) => {
                info!(url = %url, file = %file.file_name, "Extraction finished");
                Ok(file)
            }
            Ok(Err(e)) => {
                self.cleanup(&work_dir).await;
                Err(e)
            }
            Err(_) => {
                self.cleanup(&work_dir).await;
                Err(DownloadError::Timeout)
            }
        }
    }

    async fn run_extractor(&self, url: &Url, work_dir: &PathBuf) -> DownloadResult<DownloadedFile> {
        let output_template = work_dir.join("%(title).80s.%(ext)s");

        let output = Command::new("yt-dlp")
            .arg("--no-playlist")
            .arg("--max-filesize")
            .arg(self.config.max_size_bytes.to_string())
            .arg("-f")
            .arg("best")
            .arg("-o")
            .arg(&output_template)
            .arg(url.as_str())
            .output()
            .await
            .map_err(|e| DownloadError::ExtractorFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("max-filesize") {
                return Err(DownloadError::TooLarge {
                    limit_bytes: self.config.max_size_bytes,
                });
            }
            return Err(DownloadError::ExtractorFailed(
                stderr.lines().last().unwrap_or("unknown failure").to_string(),
            ));
        }

        self.find_result_file(work_dir).await
    }

    /// Locate the single file the extractor wrote into the work dir
    async fn find_result_file(&self, work_dir: &PathBuf) -> DownloadResult<DownloadedFile> {
        let mut entries = tokio::fs::read_dir(work_dir)
            .await
            .map_err(|e| DownloadError::ExtractorFailed(e.to_string()))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DownloadError::ExtractorFailed(e.to_string()))?
        {
            let path = entry.path();
            if path.is_file() {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| "download".to_string());
                return Ok(DownloadedFile { path, file_name });
            }
        }

        // yt-dlp skips the download entirely when it exceeds max-filesize.
        Err(DownloadError::TooLarge {
            limit_bytes: self.config.max_size_bytes,
        })
    }

    /// Remove a download's work directory; failures are logged, not raised
    pub async fn cleanup(&self, work_dir: &PathBuf) {
        if let Err(e) = tokio::fs::remove_dir_all(work_dir).await {
            warn!(dir = %work_dir.display(), error = %e, "Failed to clean up download directory");
        }
    }

    /// Remove the parent directory of a downloaded file
    pub async fn cleanup_file(&self, file: &DownloadedFile) {
        if let Some(parent) = file.path.parent() {
            self.cleanup(&parent.to_path_buf()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> DownloadService {
        let mut config = DownloadConfig {
            max_size_bytes: 1024,
            max_concurrent: 2,
            timeout_seconds: 30,
            temp_path: "downloads".to_string(),
            supported_platforms: vec![],
        };
        config.supported_platforms = vec![
            "youtube.com".to_string(),
            "youtu.be".to_string(),
            "tiktok.com".to_string(),
        ];
        DownloadService::new(config)
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_allowlisted_hosts_accepted() {
        let service = test_service();
        assert!(service.is_supported_platform(&url("https://youtube.com/watch?v=x")));
        assert!(service.is_supported_platform(&url("https://youtu.be/x")));
        assert!(service.is_supported_platform(&url("https://www.tiktok.com/@someone/video/1")));
    }

    #[test]
    fn test_subdomains_accepted() {
        let service = test_service();
        assert!(service.is_supported_platform(&url("https://m.youtube.com/watch?v=x")));
        assert!(service.is_supported_platform(&url("https://vm.tiktok.com/abc")));
    }

    #[test]
    fn test_unknown_hosts_rejected() {
        let service = test_service();
        assert!(!service.is_supported_platform(&url("https://example.com/video")));
        // Suffix tricks must not pass the allowlist.
        assert!(!service.is_supported_platform(&url("https://notyoutube.com/watch")));
        assert!(!service.is_supported_platform(&url("https://youtube.com.evil.net/x")));
    }
}
