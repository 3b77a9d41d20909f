use ahash::AHashMap as HashMap;
use std::collections::BTreeMap;

/// Parsed labels for one aggregated row.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RowLabels {
    pub pairs: BTreeMap<String, String>,
    /// The pairs rendered as `"key=value"`, in key order.
    pub labels: Vec<String>,
}

/// One selectable label filter option.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct LabelOption {
    pub label: String,
    pub value: String,
}

/// Label index across all aggregated rows. Rebuilt alongside the table on
/// every pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LabelData {
    /// Deduplicated filter options, sorted by label then value.
    pub options: Vec<LabelOption>,
    /// Per-row parsed labels, keyed by row id.
    pub rows: HashMap<String, RowLabels>,
}
