//! Application Configuration

/// Reaction engine settings
#[derive(Debug, Clone)]
pub struct ReactionConfig {
    /// Extra attempts after a primary-key conflict
    pub max_conflict_retries: u32,
}

impl Default for ReactionConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: 1,
        }
    }
}
