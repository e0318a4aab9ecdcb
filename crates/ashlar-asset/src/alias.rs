//! Alias-to-path resolution for logical asset names

use std::collections::BTreeMap;
use std::path::{PathBuf, MAIN_SEPARATOR};

/// Table of alias prefixes mapped to filesystem base paths.
///
/// Base paths are normalized on construction so every stored path ends
/// with exactly one trailing platform separator. No other validation is
/// performed; a path that does not exist is simply never resolvable.
#[derive(Debug, Clone, Default)]
pub struct AliasPathStack {
    aliases: BTreeMap<String, String>,
}

impl AliasPathStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a stack from configured aliases, normalizing each base path
    pub fn from_aliases(aliases: BTreeMap<String, String>) -> Self {
        let aliases = aliases
            .into_iter()
            .map(|(alias, path)| {
                let mut normalized = path.trim_end_matches(MAIN_SEPARATOR).to_string();
                normalized.push(MAIN_SEPARATOR);
                (alias, normalized)
            })
            .collect();

        Self { aliases }
    }

    /// The normalized alias table
    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    /// Resolve a logical asset name against the alias table.
    ///
    /// The first alias that prefixes `name` wins; the remainder of the
    /// name is joined onto that alias's base path.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        for (alias, path) in &self.aliases {
            if let Some(rest) = name.strip_prefix(alias.as_str()) {
                log::trace!("alias `{}` matched asset name `{}`", alias, name);
                return Some(PathBuf::from(path).join(rest));
            }
        }

        None
    }

    /// Get the number of configured aliases
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Check if the stack has no aliases
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn stack(entries: &[(&str, &str)]) -> AliasPathStack {
        let map = entries
            .iter()
            .map(|(a, p)| (a.to_string(), p.to_string()))
            .collect();
        AliasPathStack::from_aliases(map)
    }

    #[test]
    fn test_trailing_separator_appended() {
        let stack = stack(&[("alias1/", "path1"), ("alias2/", "path2")]);

        assert_eq!(
            stack.aliases().get("alias1/").unwrap(),
            &format!("path1{}", MAIN_SEPARATOR)
        );
        assert_eq!(
            stack.aliases().get("alias2/").unwrap(),
            &format!("path2{}", MAIN_SEPARATOR)
        );
    }

    #[test]
    fn test_normalization_idempotent() {
        let pre_suffixed = format!("path1{}", MAIN_SEPARATOR);
        let stack = stack(&[("alias1/", pre_suffixed.as_str())]);

        // Exactly one separator, not two
        assert_eq!(stack.aliases().get("alias1/").unwrap(), &pre_suffixed);
    }

    #[test]
    fn test_empty_config_yields_empty_table() {
        let stack = AliasPathStack::from_aliases(BTreeMap::new());
        assert!(stack.is_empty());
        assert_eq!(stack.len(), 0);
    }

    #[test]
    fn test_resolve_joins_remainder() {
        let stack = stack(&[("alias1/", "base")]);

        let resolved = stack.resolve("alias1/css/site.css").unwrap();
        assert_eq!(resolved, Path::new("base").join("css").join("site.css"));
    }

    #[test]
    fn test_resolve_no_matching_alias() {
        let stack = stack(&[("alias1/", "base")]);
        assert!(stack.resolve("other/site.css").is_none());
    }
}
