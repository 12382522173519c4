use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ilfunc_core::Splice;
use serde::{Deserialize, Serialize};

/// YAML summary of one run, written with `--report`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub input: PathBuf,
    pub output: PathBuf,
    pub splices: Vec<SpliceEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpliceEntry {
    pub index: usize,
    /// Byte offset of the marker attribute in the disassembly.
    pub marker_offset: usize,
    pub removed_bytes: usize,
    pub inserted_lines: usize,
    pub body: String,
}

impl From<&Splice> for SpliceEntry {
    fn from(splice: &Splice) -> Self {
        Self {
            index: splice.index,
            marker_offset: splice.marker.start,
            removed_bytes: splice.marker.len() + splice.body.len(),
            inserted_lines: splice.replacement.lines().count(),
            body: splice.replacement.clone(),
        }
    }
}

impl Report {
    pub fn new(input: &Path, output: &Path, splices: &[Splice]) -> Self {
        Self {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            splices: splices.iter().map(SpliceEntry::from).collect(),
        }
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let writer = std::fs::File::create(path)
            .with_context(|| format!("creating report: {}", path.display()))?;
        serde_yaml::to_writer(writer, self)
            .with_context(|| format!("writing report: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_round_trips_through_yaml() {
        let splice = Splice {
            index: 0,
            marker: 10..60,
            body: 80..120,
            replacement: "ldc.i4.1\r\nret".to_string(),
        };
        let report = Report::new(Path::new("App.exe"), Path::new("App.exe"), &[splice]);
        assert_eq!(report.splices[0].removed_bytes, 90);
        assert_eq!(report.splices[0].inserted_lines, 2);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.yaml");
        report.write(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let back: Report = serde_yaml::from_str(&text).unwrap();
        assert_eq!(back, report);
    }
}
