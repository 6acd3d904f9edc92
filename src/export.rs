use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::BufWriter,
    path::Path,
};

use crate::record::IcdCodeRecord;

/// Write the full record set as a pretty-printed JSON array, for offline
/// backup independent of the remote store.
pub fn export_json(records: &[IcdCodeRecord], output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed creating {}", parent.display()))?;
    }

    let file = File::create(output_path)
        .with_context(|| format!("Failed creating {}", output_path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), records)
        .with_context(|| format!("Failed writing JSON export {}", output_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_writes_a_json_array_that_round_trips() {
        let records = vec![
            IcdCodeRecord::build("A00", "Cholera", "Infectious", 1),
            IcdCodeRecord::build("A00.0", "Cholera due to Vibrio cholerae", "Infectious", 1),
        ];

        let dir = tempfile::tempdir().unwrap();
        let output_path = dir.path().join("icd10_export.json");
        export_json(&records, &output_path).unwrap();

        let raw = fs::read_to_string(&output_path).unwrap();
        let restored: Vec<IcdCodeRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(restored, records);
    }

    #[test]
    fn export_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let output_path = dir.path().join("nested").join("export.json");
        export_json(&[], &output_path).unwrap();
        assert!(output_path.exists());
    }
}
