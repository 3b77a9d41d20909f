use std::fmt;

/// Identifies a namespaced resource.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ObjectRef {
    pub namespace: String,
    pub name: String,
}

// === impl ObjectRef ===

impl ObjectRef {
    pub fn new(namespace: impl ToString, name: impl ToString) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    /// Parses the `"namespace/name"` form used by app-lifecycle annotations.
    pub fn parse_slashed(s: &str) -> Option<Self> {
        let (namespace, name) = s.trim().split_once('/')?;
        if namespace.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(namespace, name))
    }

    /// Parses the `"namespace.name"` form used by the parent policy label.
    pub fn parse_dotted(s: &str) -> Option<Self> {
        let (namespace, name) = s.trim().split_once('.')?;
        if namespace.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(namespace, name))
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::ObjectRef;

    #[test]
    fn parses_slashed() {
        assert_eq!(
            ObjectRef::parse_slashed("gitops/app-sub"),
            Some(ObjectRef::new("gitops", "app-sub"))
        );
        assert_eq!(ObjectRef::parse_slashed("no-namespace"), None);
        assert_eq!(ObjectRef::parse_slashed("/name"), None);
        assert_eq!(ObjectRef::parse_slashed("ns/"), None);
    }

    #[test]
    fn parses_dotted() {
        assert_eq!(
            ObjectRef::parse_dotted("policies.require-labels"),
            Some(ObjectRef::new("policies", "require-labels"))
        );
        assert_eq!(ObjectRef::parse_dotted("flat"), None);
    }
}
