//! Review layout files: the serialized source of a taxonomy.
//!
//! A layout names the gate being reviewed, how many page renders to show per
//! sample and from which pages, and the trigger-to-descriptor bindings.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, ReviewError};
use crate::store::DISCARD_GATE;
use crate::taxonomy::Taxonomy;
use crate::trigger::is_context_token;

/// Largest number of page renders a layout may request.
pub const MAX_IMAGES: i64 = 3;

/// Example layout printed by `gatereview layout template`.
pub const LAYOUT_TEMPLATE: &str = r#"# Review layout.
#
# gate_name        names this review pass; records from different passes
#                  over the same samples never collide.
# number_of_images how many page renders to show per sample (1-3).
# page_indices     zero-based page(s) to render, a number or a list.
# triggers         button label -> descriptor written to the correction file.
#
# The text before the first "_" of a descriptor is its category. Only one
# descriptor per category can be selected for a sample, except CUSTOM.
# "Custom 1".."Custom 3" are free-text slots filled in during review.
gate_name: "singlet & pbmc"
number_of_images: 3
page_indices: [0, 1, 2]
triggers:
  "SINGLET bad -> review": SINGLET_bad_review
  "PBMC-FSC 70k": PBMC-FSC_70k
  "PBMC-FSC 80k": PBMC-FSC_80k
  "PBMC-FSC 90k": PBMC-FSC_90k
  "PBMC-FSC 100k": PBMC-FSC_100k
  "PBMC too large": PBMC_remove_more_debris
  "PBMC bad monocyte cluster": PBMC_remove_less_debris
  "PBMC total failure": PBMC_total_failure
  "PBMC other -> review": PBMC_other_review
  "Custom 1": CUSTOM_my_first_button
  "Custom 2": CUSTOM_my_second_button
  "Custom 3": CUSTOM_my_third_button
"#;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PageIndices {
    Single(i64),
    Many(Vec<i64>),
}

impl Default for PageIndices {
    fn default() -> Self {
        PageIndices::Single(0)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutFile {
    gate_name: String,
    number_of_images: i64,
    #[serde(default)]
    page_indices: PageIndices,
    triggers: serde_yaml::Mapping,
}

/// A validated layout.
#[derive(Debug, Clone)]
pub struct Layout {
    pub gate_name: String,
    pub number_of_images: usize,
    pub page_indices: Vec<usize>,
    pub taxonomy: Taxonomy,
}

impl Layout {
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ReviewError::io(path, e))?;
        Self::parse(&content, path)
    }

    /// Parse layout YAML. `origin` is only used in error messages.
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        let invalid = |reason: String| ReviewError::InvalidLayout {
            path: PathBuf::from(origin),
            reason,
        };

        let raw: LayoutFile =
            serde_yaml::from_str(content).map_err(|e| invalid(e.to_string()))?;

        let gate_name = raw.gate_name.trim().to_string();
        if gate_name.is_empty() {
            return Err(invalid("gate_name must not be empty".into()));
        }
        if gate_name == DISCARD_GATE {
            return Err(invalid(format!("gate_name {DISCARD_GATE} is reserved")));
        }

        if !(1..=MAX_IMAGES).contains(&raw.number_of_images) {
            return Err(invalid(format!(
                "number_of_images must be between 1 and {MAX_IMAGES}, found {}",
                raw.number_of_images
            )));
        }

        let pages = match raw.page_indices {
            PageIndices::Single(page) => vec![page],
            PageIndices::Many(pages) => pages,
        };
        if pages.is_empty() {
            return Err(invalid("page_indices must not be empty".into()));
        }
        let page_indices = pages
            .into_iter()
            .map(|p| {
                usize::try_from(p).map_err(|_| invalid(format!("negative page index {p}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut bindings = Vec::with_capacity(raw.triggers.len());
        for (key, value) in &raw.triggers {
            let Some(key) = key.as_str() else {
                return Err(invalid(format!("trigger key {key:?} is not a string")));
            };
            let Some(descriptor) = value.as_str() else {
                return Err(invalid(format!("descriptor for {key:?} is not a string")));
            };
            if is_context_token(key) {
                return Err(invalid(format!(
                    "trigger {key:?} collides with a built-in action"
                )));
            }
            if descriptor.trim().is_empty() {
                return Err(invalid(format!("descriptor for {key:?} is empty")));
            }
            bindings.push((key.to_string(), descriptor.to_string()));
        }

        Ok(Self {
            gate_name,
            // range-checked above
            number_of_images: raw.number_of_images as usize,
            page_indices,
            taxonomy: Taxonomy::new(bindings),
        })
    }

    /// One page index per rendered image.
    ///
    /// Short `page_indices` lists repeat their last entry; extra entries are
    /// ignored.
    pub fn pages_to_display(&self) -> Vec<usize> {
        let last = self.page_indices.last().copied().unwrap_or(0);
        (0..self.number_of_images)
            .map(|i| self.page_indices.get(i).copied().unwrap_or(last))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(yaml: &str) -> Result<Layout> {
        Layout::parse(yaml, Path::new("test.yaml"))
    }

    #[test]
    fn template_is_valid() {
        let layout = parse(LAYOUT_TEMPLATE).expect("template parses");
        assert_eq!(layout.gate_name, "singlet & pbmc");
        assert_eq!(layout.number_of_images, 3);
        assert_eq!(layout.pages_to_display(), vec![0, 1, 2]);
        assert_eq!(layout.taxonomy.bindings()[0].key, "SINGLET bad -> review");
        assert_eq!(
            layout.taxonomy.resolve("PBMC-FSC 90k").expect("bound"),
            "PBMC-FSC_90k"
        );
    }

    #[test]
    fn scalar_page_index_is_repeated() {
        let layout = parse(
            "gate_name: g\nnumber_of_images: 2\npage_indices: 4\ntriggers:\n  x: CAT_x\n",
        )
        .expect("parses");
        assert_eq!(layout.pages_to_display(), vec![4, 4]);
    }

    #[test]
    fn page_indices_default_to_first_page() {
        let layout =
            parse("gate_name: g\nnumber_of_images: 1\ntriggers: {}\n").expect("parses");
        assert_eq!(layout.pages_to_display(), vec![0]);
    }

    #[test]
    fn image_count_out_of_range_is_fatal() {
        for count in [0, 4, -1] {
            let yaml = format!("gate_name: g\nnumber_of_images: {count}\ntriggers: {{}}\n");
            let err = parse(&yaml).unwrap_err();
            assert!(
                err.to_string().contains("number_of_images"),
                "unexpected error: {err}"
            );
        }
    }

    #[test]
    fn reserved_gate_is_rejected() {
        let err = parse("gate_name: DISCARD\nnumber_of_images: 1\ntriggers: {}\n").unwrap_err();
        assert!(matches!(err, ReviewError::InvalidLayout { .. }));
    }

    #[test]
    fn context_token_as_trigger_is_rejected() {
        let err = parse(
            "gate_name: g\nnumber_of_images: 1\ntriggers:\n  \"DISCARD\": CAT_x\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("built-in"));
    }

    #[test]
    fn negative_page_is_rejected() {
        let err = parse(
            "gate_name: g\nnumber_of_images: 1\npage_indices: [-2]\ntriggers: {}\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("negative page index"));
    }
}
