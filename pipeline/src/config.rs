//! Staging layout and stage settings.
//!
//! Every stage receives a [`PipelineConfig`] explicitly; nothing is read from
//! process-wide state.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};
use crate::models::Source;

/// Raw downloads, relative to the base directory.
pub const RAW_DIR: &str = "downloaded_csv_files";

/// Reshaped per-source files, relative to the base directory.
pub const RESHAPED_DIR: &str = "reshaped_csv_files";

/// Combined workbook, relative to the base directory.
pub const COMBINED_DIR: &str = "combined_files";

pub const COMBINED_FILE_NAME: &str = "Combined_Financial_Data.xlsx";

pub const COMBINED_SHEET_NAME: &str = "Combined Data";

/// Bytes inspected when detecting the charset of a raw file.
pub const DEFAULT_ENCODING_SAMPLE_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub raw_dir: PathBuf,
    pub reshaped_dir: PathBuf,
    pub combined_dir: PathBuf,

    /// Leading bytes fed to charset detection.
    pub encoding_sample_bytes: usize,

    /// Skip TLS certificate verification when downloading.
    pub accept_invalid_certs: bool,
}

impl PipelineConfig {
    /// Standard layout under `base`.
    pub fn from_base(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            raw_dir: base.join(RAW_DIR),
            reshaped_dir: base.join(RESHAPED_DIR),
            combined_dir: base.join(COMBINED_DIR),
            encoding_sample_bytes: DEFAULT_ENCODING_SAMPLE_BYTES,
            accept_invalid_certs: false,
        }
    }

    pub fn with_insecure_tls(mut self, insecure: bool) -> Self {
        self.accept_invalid_certs = insecure;
        self
    }

    pub fn raw_path(&self, source: Source) -> PathBuf {
        self.raw_dir.join(source.raw_file_name())
    }

    pub fn reshaped_path(&self, source: Source) -> PathBuf {
        self.reshaped_dir.join(source.reshaped_file_name())
    }

    pub fn combined_path(&self) -> PathBuf {
        self.combined_dir.join(COMBINED_FILE_NAME)
    }

    /// Create the three staging directories if they don't exist.
    pub fn ensure_dirs(&self) -> PipelineResult<()> {
        for dir in [&self.raw_dir, &self.reshaped_dir, &self.combined_dir] {
            fs::create_dir_all(dir).map_err(|error| PipelineError::Setup {
                path: dir.clone(),
                error,
            })?;
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_base(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_layout_under_base() {
        let config = PipelineConfig::from_base("/data");
        assert_eq!(
            config.raw_path(Source::FailedBank),
            PathBuf::from("/data/downloaded_csv_files/FDIC_Failed_Bank_List.csv")
        );
        assert_eq!(
            config.reshaped_path(Source::OfficeLocation),
            PathBuf::from("/data/reshaped_csv_files/Financial_Institution_Office_Locations_Reshaped.csv")
        );
        assert_eq!(
            config.combined_path(),
            PathBuf::from("/data/combined_files/Combined_Financial_Data.xlsx")
        );
        assert!(!config.accept_invalid_certs);
    }

    #[test]
    fn test_ensure_dirs_creates_staging() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig::from_base(dir.path());
        config.ensure_dirs().unwrap();

        assert!(config.raw_dir.is_dir());
        assert!(config.reshaped_dir.is_dir());
        assert!(config.combined_dir.is_dir());
    }
}
