mod model;

pub use model::ConversationState;

use dashmap::DashMap;
use std::sync::Arc;
use teloxide::types::UserId;

/// Per-user conversation state, held in process memory only.
///
/// Each user's slot sits behind its own shard lock, so concurrent events for different
/// users never contend. A restart drops every in-flight conversation. Running several
/// workers needs this moved to a shared store with the same per-key semantics.
#[derive(Clone, Debug, Default)]
pub struct ConversationStore {
    states: Arc<DashMap<UserId, ConversationState>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: UserId) -> Option<ConversationState> {
        self.states.get(&user_id).map(|state| state.value().clone())
    }

    /// Overwrites whatever flow the user was in.
    pub fn set(&self, user_id: UserId, state: ConversationState) -> Option<ConversationState> {
        let previous = self.states.insert(user_id, state);
        if let Some(previous) = &previous {
            debug!("User {} left step {} without finishing", user_id, previous.step());
        }
        previous
    }

    pub fn take(&self, user_id: UserId) -> Option<ConversationState> {
        self.states.remove(&user_id).map(|(_, state)| state)
    }

    pub fn clear(&self, user_id: UserId) {
        self.states.remove(&user_id);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.states.len()
    }
}
