//! Durable correction record backed by a YAML file.
//!
//! The file holds `{gate_name: {descriptor: [sample_id, ...]}}`. Every
//! operation re-reads the file, so the file is the single source of truth and
//! no in-memory copy can drift from it between actions. Writes go through a
//! temp file + fsync + rename so readers never observe a partial record.
//!
//! A missing or empty file is an empty record. Anything else that fails to
//! parse is [`ReviewError::CorruptStore`] and is never rewritten.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, ReviewError};

/// Gate name reserved for permanently excluded samples.
pub const DISCARD_GATE: &str = "DISCARD";

/// Descriptor used under [`DISCARD_GATE`].
pub const DISCARD_DESCRIPTOR: &str = "DISCARD";

/// Descriptor written by mark-not-applicable.
pub const NA_DESCRIPTOR: &str = "NA";

/// descriptor -> members
pub type GateRecord = BTreeMap<String, BTreeSet<String>>;

/// gate -> descriptor -> members
pub type CorrectionRecord = BTreeMap<String, GateRecord>;

/// Handle to a correction file on disk.
#[derive(Debug, Clone)]
pub struct CorrectionStore {
    path: PathBuf,
}

impl CorrectionStore {
    /// Open a store, creating the parent directory and an empty file if the
    /// file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ReviewError::io(parent, e))?;
        }
        if !path.exists() {
            std::fs::File::create(&path).map_err(|e| ReviewError::io(&path, e))?;
            tracing::info!("Created empty correction store at {}", path.display());
        }
        Ok(Self { path })
    }

    /// Wrap a path without touching the filesystem.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole record from disk.
    pub fn load(&self) -> Result<CorrectionRecord> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(CorrectionRecord::new());
            }
            Err(e) => return Err(ReviewError::io(&self.path, e)),
        };
        if content.trim().is_empty() {
            return Ok(CorrectionRecord::new());
        }
        let record: Option<BTreeMap<String, Option<BTreeMap<String, Option<BTreeSet<String>>>>>> =
            serde_yaml::from_str(&content).map_err(|e| ReviewError::CorruptStore {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        Ok(record
            .unwrap_or_default()
            .into_iter()
            .map(|(gate, descriptors)| {
                let descriptors = descriptors
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(descriptor, members)| (descriptor, members.unwrap_or_default()))
                    .collect();
                (gate, descriptors)
            })
            .collect())
    }

    fn save(&self, record: &CorrectionRecord) -> Result<()> {
        let yaml = serde_yaml::to_string(record)?;
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "correction.yaml".to_string());
        let temp_path = dir.join(format!(".{file_name}.tmp"));

        let mut file =
            std::fs::File::create(&temp_path).map_err(|e| ReviewError::io(&temp_path, e))?;
        file.write_all(yaml.as_bytes())
            .map_err(|e| ReviewError::io(&temp_path, e))?;
        file.sync_all().map_err(|e| ReviewError::io(&temp_path, e))?;
        std::fs::rename(&temp_path, &self.path).map_err(|e| ReviewError::io(&self.path, e))?;
        Ok(())
    }

    /// Whether `sample_id` appears under any descriptor of `gate_name`.
    pub fn contains(&self, sample_id: &str, gate_name: &str) -> Result<bool> {
        let record = self.load()?;
        Ok(record
            .get(gate_name)
            .is_some_and(|gate| gate.values().any(|members| members.contains(sample_id))))
    }

    pub fn is_discarded(&self, sample_id: &str) -> Result<bool> {
        self.contains(sample_id, DISCARD_GATE)
    }

    /// Insert `sample_id` under each descriptor of `gate_name`.
    ///
    /// Idempotent: a sample already present under a descriptor stays present
    /// exactly once. An empty descriptor list writes nothing.
    pub fn add<S: AsRef<str>>(
        &self,
        gate_name: &str,
        descriptors: &[S],
        sample_id: &str,
    ) -> Result<()> {
        if descriptors.is_empty() {
            return Ok(());
        }
        let mut record = self.load()?;
        let gate = record.entry(gate_name.to_string()).or_default();
        for descriptor in descriptors {
            gate.entry(descriptor.as_ref().to_string())
                .or_default()
                .insert(sample_id.to_string());
        }
        self.save(&record)?;
        tracing::debug!(
            gate = gate_name,
            sample = sample_id,
            count = descriptors.len(),
            "Recorded descriptors"
        );
        Ok(())
    }

    /// Remove `sample_id` from every descriptor of `gate_name`.
    ///
    /// Descriptor buckets left empty are pruned, and so is the gate if it
    /// ends up with no descriptors. Removing an absent sample does not write.
    pub fn remove(&self, sample_id: &str, gate_name: &str) -> Result<()> {
        let mut record = self.load()?;
        let Some(gate) = record.get_mut(gate_name) else {
            return Ok(());
        };
        let mut changed = false;
        for members in gate.values_mut() {
            changed |= members.remove(sample_id);
        }
        if !changed {
            return Ok(());
        }
        gate.retain(|_, members| !members.is_empty());
        if gate.is_empty() {
            record.remove(gate_name);
        }
        self.save(&record)?;
        tracing::debug!(gate = gate_name, sample = sample_id, "Removed sample record");
        Ok(())
    }

    /// Every `(gate, descriptor)` pair that lists `sample_id`, discard
    /// excluded, in sorted order.
    pub fn entries_for(&self, sample_id: &str) -> Result<Vec<(String, String)>> {
        let record = self.load()?;
        Ok(record
            .iter()
            .filter(|(gate, _)| gate.as_str() != DISCARD_GATE)
            .flat_map(|(gate, descriptors)| {
                descriptors
                    .iter()
                    .filter(|(_, members)| members.contains(sample_id))
                    .map(move |(descriptor, _)| (gate.clone(), descriptor.clone()))
            })
            .collect())
    }

    /// Human-readable listing of where `sample_id` is recorded.
    ///
    /// `Discard` comes first when the sample is discarded, followed by one
    /// `gate: descriptor` line per entry with gates sorted by name.
    pub fn summarize(&self, sample_id: &str) -> Result<String> {
        let mut lines = Vec::new();
        if self.is_discarded(sample_id)? {
            lines.push("Discard".to_string());
        }
        for (gate, descriptor) in self.entries_for(sample_id)? {
            lines.push(format!("{gate}: {descriptor}"));
        }
        Ok(lines.join("\n"))
    }
}
