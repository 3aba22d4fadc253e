// Queue Store - race-safe membership operations on top of QueueRepository

use crate::config::EngineConfig;
use crate::domain::{JoinOutcome, LeaveOutcome, MemberId, QueueKey};
use crate::error::{AppError, Result};
use crate::port::{QueueRepository, TimeProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Queue operations with lazy pruning and bounded optimistic pop.
///
/// Holds no membership state of its own: every call re-reads the store.
#[derive(Clone)]
pub struct QueueStore {
    repo: Arc<dyn QueueRepository>,
    time_provider: Arc<dyn TimeProvider>,
    max_age: Option<Duration>,
    pop_max_attempts: usize,
}

impl QueueStore {
    pub fn new(
        repo: Arc<dyn QueueRepository>,
        time_provider: Arc<dyn TimeProvider>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            repo,
            time_provider,
            max_age: config.max_age,
            pop_max_attempts: config.pop_max_attempts.max(1),
        }
    }

    /// Drop entries admitted longer than `max_age` ago. No-op when pruning is disabled.
    ///
    /// # Returns
    /// Number of expired entries removed
    pub async fn prune(&self, key: &QueueKey) -> Result<u64> {
        let Some(max_age) = self.max_age else {
            return Ok(0);
        };
        let max_age_ms = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
        let cutoff = self.time_provider.now_millis().saturating_sub(max_age_ms);

        let removed = self.repo.remove_ranked_below(key, cutoff).await?;
        if removed > 0 {
            info!(
                team_id = %key.team_id,
                channel_id = %key.channel_id,
                removed,
                "Pruned expired queue entries"
            );
        }
        Ok(removed)
    }

    /// Add a member to the back of the queue. Re-joining is a no-op.
    pub async fn join(&self, key: &QueueKey, member_id: &str) -> Result<JoinOutcome> {
        self.prune(key).await?;

        let now = self.time_provider.now_millis();
        if self.repo.insert_if_absent(key, member_id, now).await? {
            debug!(queue = %key, member_id, "Member joined");
            Ok(JoinOutcome::Admitted)
        } else {
            debug!(queue = %key, member_id, "Member already queued");
            Ok(JoinOutcome::AlreadyQueued)
        }
    }

    pub async fn leave(&self, key: &QueueKey, member_id: &str) -> Result<LeaveOutcome> {
        self.prune(key).await?;

        if self.repo.remove(key, member_id).await? {
            debug!(queue = %key, member_id, "Member left");
            Ok(LeaveOutcome::Removed)
        } else {
            Ok(LeaveOutcome::NotInQueue)
        }
    }

    /// Members in admission order
    pub async fn list(&self, key: &QueueKey) -> Result<Vec<MemberId>> {
        self.prune(key).await?;

        let entries = self.repo.range(key).await?;
        Ok(entries.into_iter().map(|e| e.member_id).collect())
    }

    /// Remove and return the current head.
    ///
    /// Reads the head, then removes it only if that same entry (member and
    /// rank) is still present. Losing that race to another pop or a leave
    /// means someone else took it, so the next head is tried. Gives up after
    /// `pop_max_attempts` rounds.
    pub async fn pop_front(&self, key: &QueueKey) -> Result<Option<MemberId>> {
        self.prune(key).await?;

        for attempt in 1..=self.pop_max_attempts {
            let Some(head) = self.repo.head(key).await? else {
                return Ok(None);
            };

            if self.repo.remove_entry(key, &head).await? {
                debug!(queue = %key, member_id = %head.member_id, attempt, "Popped head");
                return Ok(Some(head.member_id));
            }

            debug!(
                queue = %key,
                member_id = %head.member_id,
                attempt,
                "Head removed concurrently, retrying pop"
            );
        }

        warn!(
            queue = %key,
            attempts = self.pop_max_attempts,
            "Pop did not settle within retry budget"
        );
        Err(AppError::StoreUnavailable(format!(
            "pop on {} lost {} consecutive races",
            key, self.pop_max_attempts
        )))
    }

    /// Administrative reset of the whole queue
    pub async fn clear(&self, key: &QueueKey) -> Result<u64> {
        let removed = self.repo.clear(key).await?;
        info!(queue = %key, removed, "Queue cleared");
        Ok(removed)
    }
}
