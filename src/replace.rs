use log::{debug, warn};

use crate::config::Replacement;

/// Result of applying a replacement table to a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replaced {
    pub original: String,
    pub updated: String,
    /// Tokens that were absent when their turn came, in table order
    pub missing: Vec<String>,
}

impl Replaced {
    pub fn changed(&self) -> bool {
        self.updated != self.original
    }
}

/// Apply every replacement in table order.
///
/// Each token is looked up in the text as modified by the entries before it.
/// A missing token is logged and skipped; it never aborts the run.
pub fn apply_replacements(content: &str, replacements: &[Replacement]) -> Replaced {
    let mut updated = content.to_string();
    let mut missing = Vec::new();

    for replacement in replacements {
        let count = updated.matches(replacement.from.as_str()).count();
        if count == 0 {
            warn!("Token not found in template: {}", replacement.from);
            missing.push(replacement.from.clone());
            continue;
        }

        debug!("Replacing {} occurrence(s) of {} with {}", count, replacement.from, replacement.to);
        updated = updated.replace(&replacement.from, &replacement.to);
    }

    Replaced {
        original: content.to_string(),
        updated,
        missing,
    }
}
