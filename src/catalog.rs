use serde::{Deserialize, Serialize};

/// Fallback duration for items whose catalog entry carries no default.
pub const DEFAULT_ITEM_DURATION_SECONDS: u32 = 30;

/// Read-only snapshot of a catalog pose. The catalog itself is external
/// static content; the builder only copies these fields onto items at the
/// moment they are added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub default_duration_seconds: Option<u32>,
    #[serde(default)]
    pub sided: bool,
}

impl CatalogEntry {
    pub fn starting_duration_seconds(&self) -> u32 {
        self.default_duration_seconds
            .filter(|seconds| *seconds > 0)
            .unwrap_or(DEFAULT_ITEM_DURATION_SECONDS)
    }
}
