// Engine configuration

use std::time::Duration;

use crate::application::constants::{DEFAULT_POP_MAX_ATTEMPTS, DEFAULT_REPOST_THRESHOLD};

/// Tunables for the queue engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Entries admitted longer ago than this are pruned. `None` disables pruning.
    pub max_age: Option<Duration>,

    /// Number of newer visible messages tolerated below a view before it is
    /// reposted. Negative disables reposting.
    pub repost_threshold: i64,

    /// Upper bound on head-read/conditional-remove rounds in `pop_front`
    pub pop_max_attempts: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_age: None,
            repost_threshold: DEFAULT_REPOST_THRESHOLD,
            pop_max_attempts: DEFAULT_POP_MAX_ATTEMPTS,
        }
    }
}

impl EngineConfig {
    /// Build from raw seconds, where `<= 0` means "never prune"
    pub fn with_max_age_secs(mut self, secs: i64) -> Self {
        self.max_age = if secs > 0 {
            Some(Duration::from_secs(secs as u64))
        } else {
            None
        };
        self
    }

    pub fn with_repost_threshold(mut self, threshold: i64) -> Self {
        self.repost_threshold = threshold;
        self
    }

    pub fn with_pop_max_attempts(mut self, attempts: usize) -> Self {
        self.pop_max_attempts = attempts.max(1);
        self
    }

    /// `None` when reposting is disabled
    pub fn repost_after(&self) -> Option<usize> {
        usize::try_from(self.repost_threshold).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_positive_max_age_disables_pruning() {
        assert!(EngineConfig::default().with_max_age_secs(0).max_age.is_none());
        assert!(EngineConfig::default().with_max_age_secs(-5).max_age.is_none());
        assert_eq!(
            EngineConfig::default().with_max_age_secs(60).max_age,
            Some(Duration::from_secs(60))
        );
    }

    #[test]
    fn test_negative_threshold_disables_repost() {
        assert_eq!(
            EngineConfig::default().with_repost_threshold(-1).repost_after(),
            None
        );
        assert_eq!(
            EngineConfig::default().with_repost_threshold(0).repost_after(),
            Some(0)
        );
    }

    #[test]
    fn test_pop_attempts_floor() {
        assert_eq!(
            EngineConfig::default().with_pop_max_attempts(0).pop_max_attempts,
            1
        );
    }
}
