//! Per-user session records and the session store seam
//!
//! Session state used to live in ad hoc per-handler maps with runtime shape
//! checks for legacy entries. Here the record carries an explicit schema
//! version and a migration function, behind a get/put/delete store trait
//! keyed by a stable user id.

use serde::{Deserialize, Serialize};

use crate::booking::BookingRecord;
use crate::conversation::ConversationWindow;

/// Current session schema version
pub const SESSION_SCHEMA_VERSION: u32 = 2;

/// In-progress booking attached to a session
///
/// Created when booking intent is first detected; dropped when the record
/// completes (flushed by the caller) or the customer abandons it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingSession {
    pub record: BookingRecord,
    pub transcript: ConversationWindow,
}

/// One customer's conversation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Schema version this record was written with
    pub schema_version: u32,
    /// Manual namespace of the selected vehicle
    pub namespace: Option<String>,
    /// Vehicle-history namespace, when a report has been ingested
    pub history_namespace: Option<String>,
    /// Human-readable vehicle label ("2025 Honda Civic")
    pub vehicle_label: Option<String>,
    pub vin: Option<String>,
    pub customer_name: Option<String>,
    pub phone: Option<String>,
    /// ISO language code for replies
    pub language: String,
    /// Recent tech Q&A turns fed to the query contextualizer
    pub history: ConversationWindow,
    /// Set after the agent offers a visit; an affirmative next message starts a booking
    pub pending_booking: bool,
    /// Active booking conversation, if any
    pub booking: Option<BookingSession>,
}

impl SessionRecord {
    /// Fresh session with the given tech history capacity
    pub fn new(history_capacity: usize) -> Self {
        Self {
            schema_version: SESSION_SCHEMA_VERSION,
            namespace: None,
            history_namespace: None,
            vehicle_label: None,
            vin: None,
            customer_name: None,
            phone: None,
            language: "en".to_string(),
            history: ConversationWindow::new(history_capacity),
            pending_booking: false,
            booking: None,
        }
    }

    /// Migrate a stored value of any known prior shape to the current schema.
    ///
    /// v1 stored the session as a bare namespace string. Anything
    /// unrecognizable becomes a fresh record rather than an error: a lost
    /// session is recoverable, a crashed handler is not.
    pub fn migrate(stored: serde_json::Value, history_capacity: usize) -> Self {
        if let serde_json::Value::String(namespace) = &stored {
            let mut record = Self::new(history_capacity);
            record.namespace = Some(namespace.clone());
            return record;
        }

        match serde_json::from_value::<SessionRecord>(stored) {
            Ok(mut record) => {
                record.schema_version = SESSION_SCHEMA_VERSION;
                record
            }
            Err(e) => {
                tracing::warn!(error = %e, "Unrecognized session shape, starting fresh");
                Self::new(history_capacity)
            }
        }
    }
}

/// Store seam for session records, keyed by stable user id
pub trait SessionStore: Send + Sync {
    fn get(&self, user_id: u64) -> Option<SessionRecord>;
    fn put(&self, user_id: u64, record: SessionRecord);
    fn delete(&self, user_id: u64);
}
