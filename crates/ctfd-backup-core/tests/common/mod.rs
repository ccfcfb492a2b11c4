#![allow(dead_code)]

pub mod mock_api;

use ctfd_backup_core::config::Settings;
use ctfd_backup_core::BackupConfig;
use std::path::Path;

/// Config pointing at `url` with default tunables and short timeouts.
pub fn config(url: &str, output_dir: &Path) -> BackupConfig {
    let settings = Settings {
        api_timeout_secs: 5,
        file_timeout_secs: 5,
        ..Settings::default()
    };
    let mut cfg = BackupConfig::new(url, output_dir, &settings);
    cfg.ctf_name = Some("test".to_string());
    cfg
}
