use hub_policy_aggregator_core::{
    parse_string_map, DiscoveredPolicyTableItem, LabelData, LabelOption, RowLabels,
};
use std::collections::{BTreeMap, BTreeSet};

/// Builds the label filter index across all aggregated rows.
///
/// Each row's pairs are the union over its member occurrences. The option
/// list is deduplicated across rows and sorted by label then value so filter
/// ordering is stable between passes.
pub fn index_labels(rows: &[DiscoveredPolicyTableItem]) -> LabelData {
    let mut options = BTreeSet::new();
    let mut data = LabelData::default();

    for row in rows {
        let mut pairs = BTreeMap::new();
        for policy in &row.policies {
            if let Some(raw) = policy.label.as_deref() {
                pairs.extend(parse_string_map(raw));
            }
        }

        for (label, value) in &pairs {
            options.insert(LabelOption {
                label: label.clone(),
                value: value.clone(),
            });
        }

        let labels = pairs.iter().map(|(k, v)| format!("{k}={v}")).collect();
        data.rows.insert(row.id.clone(), RowLabels { pairs, labels });
    }

    data.options = options.into_iter().collect();
    data
}
