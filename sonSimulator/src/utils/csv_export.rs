use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;

use crate::ai::stats::GenerationRecord;
use crate::core::episode::EpisodeSummary;
use crate::utils::logging::{self, FileIOType, OperationCategory};

/// Writes training history into a timestamped directory.
pub struct CsvExporter {
    output_dir: PathBuf,
    timestamp: String,
}

impl CsvExporter {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let full_path = output_dir.as_ref().join(&timestamp);
        fs::create_dir_all(&full_path)
            .with_context(|| format!("Failed to create output directory {}", full_path.display()))?;

        Ok(Self {
            output_dir: full_path,
            timestamp,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Best and mean fitness per generation.
    pub fn export_generation_history(&self, records: &[GenerationRecord]) -> Result<PathBuf> {
        let _timing = logging::start_timing(
            "export_generation_history",
            OperationCategory::FileIO { subcategory: FileIOType::HistoryExport },
        );
        let path = self.output_dir.join("generation_history.csv");
        write_records(&path, records)?;
        info!(path = %path.display(), rows = records.len(), "Exported generation history");
        Ok(path)
    }

    /// One row per evaluated episode.
    pub fn export_episode_scores(&self, summaries: &[EpisodeSummary]) -> Result<PathBuf> {
        let _timing = logging::start_timing(
            "export_episode_scores",
            OperationCategory::FileIO { subcategory: FileIOType::HistoryExport },
        );
        let path = self.output_dir.join("episode_scores.csv");
        write_records(&path, summaries)?;
        Ok(path)
    }
}

fn write_records<T: serde::Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
