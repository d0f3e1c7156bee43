use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::core::network::NetworkSnapshot;
use crate::utils::logging::{self, FileIOType, OperationCategory};

/// Writes `snapshot` as pretty-printed JSON, replacing any existing file.
pub fn write_snapshot(path: impl AsRef<Path>, snapshot: &NetworkSnapshot) -> Result<()> {
    let _timing = logging::start_timing(
        "write_snapshot",
        OperationCategory::FileIO { subcategory: FileIOType::SnapshotSave },
    );
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json).with_context(|| format!("Failed to write snapshot to {}", path.display()))?;
    info!(path = %path.display(), tick = snapshot.tick, "Wrote network snapshot");
    Ok(())
}
