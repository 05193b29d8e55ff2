//! Ordered list of samples discovered in an input folder.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, ReviewError};
use crate::store::CorrectionStore;

/// One document under review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// File stem, the key records are addressed by.
    pub id: String,
    pub path: PathBuf,
}

/// Samples in lexicographic file-name order, fixed for the session.
#[derive(Debug, Clone)]
pub struct SampleList {
    folder: PathBuf,
    samples: Vec<Sample>,
}

impl SampleList {
    /// Scan `folder` (non-recursively) for files ending in `.{extension}`.
    ///
    /// The extension match is case-insensitive. An empty result is
    /// [`ReviewError::EmptySampleList`].
    pub fn scan(folder: impl AsRef<Path>, extension: &str) -> Result<Self> {
        let folder = folder.as_ref();
        let extension = extension.trim_start_matches('.');
        let mut samples = Vec::new();

        for entry in WalkDir::new(folder)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(folder).to_path_buf();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                ReviewError::io(path, source)
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let matches = path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension));
            if !matches {
                continue;
            }
            let Some(stem) = path.file_stem() else {
                continue;
            };
            samples.push(Sample {
                id: stem.to_string_lossy().into_owned(),
                path: path.to_path_buf(),
            });
        }

        if samples.is_empty() {
            return Err(ReviewError::EmptySampleList {
                folder: folder.to_path_buf(),
                extension: extension.to_string(),
            });
        }
        tracing::info!(
            "Found {} samples in {}",
            samples.len(),
            folder.display()
        );
        Ok(Self {
            folder: folder.to_path_buf(),
            samples,
        })
    }

    /// Build a list from explicit ids, keeping the given order.
    pub fn from_ids<I, S>(folder: impl Into<PathBuf>, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let folder = folder.into();
        let samples = ids
            .into_iter()
            .map(|id| {
                let id = id.into();
                Sample {
                    path: folder.join(&id),
                    id,
                }
            })
            .collect();
        Self { folder, samples }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn size(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Sample> {
        self.samples.get(index).ok_or(ReviewError::IndexOutOfRange {
            index,
            size: self.samples.len(),
        })
    }

    pub fn sample_at(&self, index: usize) -> Result<&str> {
        self.get(index).map(|s| s.id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Whether the sample at `index` is discarded.
    ///
    /// Out-of-range indices are never discarded, so forward skipping can
    /// probe past the end and stop.
    pub fn is_discarded(&self, index: usize, store: &CorrectionStore) -> Result<bool> {
        match self.samples.get(index) {
            Some(sample) => store.is_discarded(&sample.id),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DISCARD_DESCRIPTOR, DISCARD_GATE};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn scan_is_sorted_and_filtered() {
        let dir = TempDir::new().expect("temp dir");
        for name in ["b.pdf", "a.PDF", "c.txt", "d.pdf"] {
            std::fs::write(dir.path().join(name), b"").expect("write");
        }
        std::fs::create_dir(dir.path().join("nested.pdf")).expect("mkdir");
        std::fs::write(dir.path().join("nested.pdf").join("e.pdf"), b"").expect("write");

        let list = SampleList::scan(dir.path(), "pdf").expect("scan");
        let ids: Vec<&str> = list.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "d"]);
    }

    #[test]
    fn empty_folder_is_an_error() {
        let dir = TempDir::new().expect("temp dir");
        let err = SampleList::scan(dir.path(), ".pdf").unwrap_err();
        assert!(
            matches!(err, ReviewError::EmptySampleList { ref extension, .. } if extension == "pdf")
        );
    }

    #[test]
    fn sample_at_bounds() {
        let list = SampleList::from_ids("/tmp", ["A", "B"]);
        assert_eq!(list.sample_at(1).expect("in range"), "B");
        assert!(matches!(
            list.sample_at(2),
            Err(ReviewError::IndexOutOfRange { index: 2, size: 2 })
        ));
    }

    #[test]
    fn out_of_range_is_not_discarded() {
        let dir = TempDir::new().expect("temp dir");
        let store = CorrectionStore::open(dir.path().join("c.yaml")).expect("store");
        store
            .add(DISCARD_GATE, &[DISCARD_DESCRIPTOR], "B")
            .expect("discard");
        let list = SampleList::from_ids(dir.path(), ["A", "B"]);
        assert!(!list.is_discarded(0, &store).expect("A"));
        assert!(list.is_discarded(1, &store).expect("B"));
        assert!(!list.is_discarded(7, &store).expect("past end"));
    }
}
