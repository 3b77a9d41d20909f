use std::fmt;

/// Severity of a discovered policy.
///
/// Variants are ordered by criticality so a group's rollup severity is the
/// maximum over its members. Values the collector reports but we do not
/// recognize sort lowest.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Unknown,
    Low,
    Medium,
    High,
    Critical,
}

// === impl Severity ===

impl Severity {
    /// Parses a severity, case-insensitively. Blank values are absent;
    /// unrecognized values are `Unknown` rather than dropped.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        Some(match s.to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            "critical" => Self::Critical,
            _ => Self::Unknown,
        })
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => "unknown".fmt(f),
            Self::Low => "low".fmt(f),
            Self::Medium => "medium".fmt(f),
            Self::High => "high".fmt(f),
            Self::Critical => "critical".fmt(f),
        }
    }
}
