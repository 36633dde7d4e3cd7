//! Case- and accent-insensitive header lookup.

use leadpulse_core::fold_label;

#[derive(Debug, Clone)]
pub(crate) struct HeaderIndex {
    folded: Vec<String>,
}

impl HeaderIndex {
    pub(crate) fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        Self {
            folded: headers.iter().map(|h| fold_label(h.as_ref())).collect(),
        }
    }

    /// Index of the first header equal to any alias.
    pub(crate) fn find(&self, aliases: &[&str]) -> Option<usize> {
        let aliases: Vec<String> = aliases.iter().map(|a| fold_label(a)).collect();
        self.folded
            .iter()
            .position(|h| aliases.iter().any(|a| a == h))
    }

    pub(crate) fn contains_any(&self, aliases: &[&str]) -> bool {
        self.find(aliases).is_some()
    }

    pub(crate) fn folded(&self) -> &[String] {
        &self.folded
    }
}
