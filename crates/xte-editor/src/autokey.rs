//! Auto-key refresher
//!
//! Auto-key modules render system-generated key fields whose references
//! depend on the rest of the form. After any structural change the number
//! of such fields is compared to the last observed count; on a change, the
//! server is asked which fields moved and each one is re-fetched.
//!
//! The per-field fetches are awaited sequentially, in the order the server
//! listed them: a refreshed fragment can itself shift the key references of
//! the fields after it.

use xte_net::KeyService;

use crate::{EditorError, EditorSession};

/// Refresher lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshState {
    /// No refresh in progress
    #[default]
    Idle,
    /// Sequential per-field refresh in progress
    Refreshing,
}

/// Last-observed auto-key field count and lifecycle state
#[derive(Debug, Default)]
pub struct AutoKeyRefresher {
    last_count: usize,
    state: RefreshState,
}

impl AutoKeyRefresher {
    /// Current lifecycle state
    pub fn state(&self) -> RefreshState {
        self.state
    }

    /// Auto-key field count at the last refresh decision
    pub fn last_count(&self) -> usize {
        self.last_count
    }
}

impl<S: KeyService> EditorSession<S> {
    /// React to pending structure events.
    ///
    /// No-op when no events are pending or the auto-key field count is
    /// unchanged. Otherwise remembers the new count and refreshes every
    /// field the server reports as changed.
    pub async fn refresh_auto_keys(&mut self) -> Result<(), EditorError> {
        let events = self.log.drain();
        if events.is_empty() {
            return Ok(());
        }

        let count = self.tree.count_auto_keys();
        if count == self.refresher.last_count {
            tracing::trace!("auto-key count unchanged at {}", count);
            return Ok(());
        }
        tracing::info!(
            "auto-key count changed: {} -> {}",
            self.refresher.last_count,
            count
        );
        self.refresher.last_count = count;

        self.refresher.state = RefreshState::Refreshing;
        let outcome = self.refresh_changed_fields().await;
        self.refresher.state = RefreshState::Idle;
        outcome
    }

    async fn refresh_changed_fields(&mut self) -> Result<(), EditorError> {
        let ids = self.services.changed_keys().await?;
        for id in ids {
            // Sequential on purpose: each replaced fragment may shift the
            // key references computed for the fields after it.
            match self.services.keyref_fragment(&id).await {
                Ok(markup) => match self.tree.find_by_id(&id) {
                    Some(node) => {
                        self.tree.set_markup(node, markup)?;
                        tracing::debug!("refreshed key reference {}", id);
                    }
                    None => tracing::warn!("changed key {} not present in tree", id),
                },
                // A failed field is skipped; the rest of the queue proceeds
                Err(err) => tracing::warn!("keyref fetch for {} failed: {}", id, err),
            }
        }
        Ok(())
    }
}
