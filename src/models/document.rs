use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

pub const DOCUMENT_VERSION: u32 = 1;

/// The whole persisted tag document. Serialized layout keeps the original
/// `fileTags.json` shape: `tagColors` holds the palette, every other
/// top-level key is an absolute file path mapping to its tag list. The
/// `version` field is new; legacy files without it still load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagDocument {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default, rename = "tagColors")]
    pub tag_colors: IndexMap<String, String>,

    /// Insertion order is preserved so tag queries report files in the
    /// order they were first tagged.
    #[serde(flatten)]
    pub files: IndexMap<String, IndexSet<String>>,
}

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

impl Default for TagDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            tag_colors: IndexMap::new(),
            files: IndexMap::new(),
        }
    }
}

impl TagDocument {
    /// Union of every tag across every recorded file, first-seen order.
    pub fn all_tags(&self) -> IndexSet<String> {
        let mut tags = IndexSet::new();
        for file_tags in self.files.values() {
            for tag in file_tags {
                tags.insert(tag.clone());
            }
        }
        tags
    }

    pub fn files_with_tag(&self, tag: &str) -> Vec<String> {
        self.files
            .iter()
            .filter(|(_, tags)| tags.contains(tag))
            .map(|(path, _)| path.clone())
            .collect()
    }
}
