use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default chunk size used when copying record bytes out of a source file.
pub const DEFAULT_EXTRACT_CHUNK_BYTES: usize = 4 * 1024 * 1024;

/// Global configuration loaded from `~/.config/seqpeel/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeelConfig {
    /// Maximum number of candidate commands running at once.
    pub max_concurrent_jobs: usize,
    /// Delay between two scheduler polls when nothing progressed.
    pub poll_interval_ms: u64,
    /// Optional per-job wall-clock limit; an expired job counts as "behaviour absent".
    #[serde(default)]
    pub job_timeout_secs: Option<u64>,
    /// Shell used to run the command line (`<shell> -c <command>`).
    pub shell: String,
    /// Read buffer size when extracting record bytes into sandbox files.
    pub extract_chunk_bytes: usize,
}

impl Default for PeelConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 1,
            poll_interval_ms: 10,
            job_timeout_secs: None,
            shell: "sh".to_string(),
            extract_chunk_bytes: DEFAULT_EXTRACT_CHUNK_BYTES,
        }
    }
}

impl PeelConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn job_timeout(&self) -> Option<Duration> {
        self.job_timeout_secs.map(Duration::from_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("seqpeel")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PeelConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PeelConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}

/// Load configuration from an explicit file (no default is written).
pub fn load_from_path(path: &Path) -> Result<PeelConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: PeelConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
