//! Stop-condition matching.

/// Case-insensitive substring stop condition.
///
/// Absent or empty configured text never matches. No regex or fuzzy
/// semantics - exact case-folded containment only. Pure: identical inputs
/// always yield identical results.
#[derive(Debug, Clone, Default)]
pub struct StopCondition {
    needle: Option<String>,
}

impl StopCondition {
    pub fn new(text: Option<String>) -> Self {
        Self {
            needle: text.filter(|t| !t.is_empty()).map(|t| t.to_lowercase()),
        }
    }

    /// Whether the configured text appears in `output`
    pub fn matches(&self, output: &str) -> bool {
        match &self.needle {
            Some(needle) => output.to_lowercase().contains(needle),
            None => false,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.needle.is_some()
    }
}
