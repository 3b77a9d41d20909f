use std::collections::BTreeMap;

/// Parses the search index's flattened `"key=value; key=value"` encoding of
/// label and annotation maps.
///
/// Segments without a `=`, or with an empty key, are skipped.
pub fn parse_string_map(raw: &str) -> BTreeMap<String, String> {
    raw.split(';')
        .filter_map(|segment| {
            let (k, v) = segment.split_once('=')?;
            let k = k.trim();
            if k.is_empty() {
                return None;
            }
            Some((k.to_string(), v.trim().to_string()))
        })
        .collect()
}
