//! In-memory session store
//!
//! Production deployments can put a persistent store behind the same trait;
//! the console binary and tests use this map.

use dashmap::DashMap;

use dealer_agent_core::{SessionRecord, SessionStore};

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<u64, SessionRecord>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, user_id: u64) -> Option<SessionRecord> {
        self.sessions.get(&user_id).map(|r| r.clone())
    }

    fn put(&self, user_id: u64, record: SessionRecord) {
        self.sessions.insert(user_id, record);
    }

    fn delete(&self, user_id: u64) {
        self.sessions.remove(&user_id);
    }
}
