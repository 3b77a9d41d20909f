use crate::ObjectRef;
use std::fmt;

/// The deployment mechanism a discovered policy was traced back to.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum SourceKind {
    /// Replicated by a hub policy.
    Policy,
    /// Subscribed from a Git channel.
    Git,
    /// Installed by a Helm release.
    Helm,
    /// Subscribed from a channel of another type.
    Subscription,
    /// Occurrences of the same policy disagree.
    Multiple,
}

/// Resolved provenance of a discovered policy. Computed per aggregation
/// pass, never persisted.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct PolicySource {
    pub kind: SourceKind,
    pub parent_ns: String,
    pub parent_name: String,
}

// === impl PolicySource ===

impl PolicySource {
    pub fn new(kind: SourceKind, parent: ObjectRef) -> Self {
        Self {
            kind,
            parent_ns: parent.namespace,
            parent_name: parent.name,
        }
    }

    /// The rollup source for a group whose members resolved differently.
    /// There is no single parent to point at.
    pub fn multiple() -> Self {
        Self {
            kind: SourceKind::Multiple,
            parent_ns: String::new(),
            parent_name: String::new(),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Policy => "Policy".fmt(f),
            Self::Git => "Git".fmt(f),
            Self::Helm => "Helm".fmt(f),
            Self::Subscription => "Subscription".fmt(f),
            Self::Multiple => "Multiple".fmt(f),
        }
    }
}
