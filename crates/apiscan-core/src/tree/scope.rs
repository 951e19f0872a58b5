//! Scope analyzer payload
//!
//! The scope analyzer runs before extraction and contributes two mappings of
//! cross-unit symbol references. Their values are opaque to this crate and
//! pass straight through into the exported `uses` attribute.

use std::collections::BTreeMap;

/// Cross-unit usage data for one compilation unit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeInfo {
    /// Symbols shared with other units
    pub shared: BTreeMap<String, serde_json::Value>,
    /// Package-level references
    pub packages: BTreeMap<String, serde_json::Value>,
}

impl ScopeInfo {
    /// Merge both mappings into the exported `uses` form.
    ///
    /// On a key clash the package entry wins.
    #[must_use]
    pub fn uses(&self) -> BTreeMap<String, serde_json::Value> {
        let mut merged = self.shared.clone();
        for (key, value) in &self.packages {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_uses_merges_with_package_precedence() {
        let mut scope = ScopeInfo::default();
        scope.shared.insert("core.Module".to_string(), json!(2));
        scope.shared.insert("core.util".to_string(), json!(1));
        scope.packages.insert("core.util".to_string(), json!(5));

        let uses = scope.uses();
        assert_eq!(uses.get("core.Module"), Some(&json!(2)));
        assert_eq!(uses.get("core.util"), Some(&json!(5)));
    }
}
