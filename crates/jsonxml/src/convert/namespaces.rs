//! Prefix to namespace URI mapping for the JSON reader

use indexmap::IndexMap;
use tracing::debug;

use crate::xml::model::split_qualified;
use crate::xml::{QName, XMLNS_NAMESPACE, XML_NAMESPACE};

/// What to do with a prefix that has no `@xmlns:` declaration in scope
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnresolvedPrefix {
    /// Keep only the local part, outside any namespace
    #[default]
    DropPrefix,
    /// Keep the prefix and bind it to `http://unknown-prefixes/{prefix}`
    Placeholder,
}

/// Prefix map for one read call
///
/// Declarations are never removed: a prefix declared anywhere stays visible
/// to everything read after it.
#[derive(Clone, Debug)]
pub struct Namespaces {
    prefixes: IndexMap<String, String>,
    policy: UnresolvedPrefix,
}

impl Default for Namespaces {
    fn default() -> Self {
        Self::new(UnresolvedPrefix::default())
    }
}

impl Namespaces {
    pub fn new(policy: UnresolvedPrefix) -> Self {
        let mut prefixes = IndexMap::new();
        prefixes.insert("xml".to_string(), XML_NAMESPACE.to_string());
        prefixes.insert("xmlns".to_string(), XMLNS_NAMESPACE.to_string());
        Self { prefixes, policy }
    }

    pub fn declare(&mut self, prefix: &str, uri: &str) {
        debug!(prefix, uri, "declared namespace prefix");
        self.prefixes.insert(prefix.to_string(), uri.to_string());
    }

    pub fn lookup(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// Build a name from `prefix:local`, resolving the prefix
    pub fn resolve(&self, qualified: &str) -> QName {
        let (Some(prefix), local) = split_qualified(qualified) else {
            return QName::local(qualified);
        };

        if let Some(uri) = self.lookup(prefix) {
            return QName::new(Some(prefix.to_string()), local, Some(uri.to_string()));
        }

        debug!(prefix, name = qualified, policy = ?self.policy, "unresolved namespace prefix");
        match self.policy {
            UnresolvedPrefix::DropPrefix => QName::local(local),
            UnresolvedPrefix::Placeholder => QName::new(
                Some(prefix.to_string()),
                local,
                Some(format!("http://unknown-prefixes/{prefix}")),
            ),
        }
    }
}
