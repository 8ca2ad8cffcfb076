//! Booking record accumulator
//!
//! A booking is not a state machine over named states; it is a single record
//! with six optional fields filled incrementally by the extraction loop. A
//! field that is already set is never clobbered by a later null.

use serde::{Deserialize, Serialize};

/// The six required booking fields, as extracted from one LLM turn
///
/// This is the payload of the `[BOOKING_DATA]` block. All fields are optional
/// because the model emits `null` for anything it has not learned yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingFields {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub vehicle: Option<String>,
    pub service_type: Option<String>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    /// The model's own claim that every field is filled. Advisory only: the
    /// host recomputes completion from the record (see `BookingRecord::is_complete`).
    #[serde(default)]
    pub complete: bool,
}

/// Mutable accumulator for an in-progress booking
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub vehicle: Option<String>,
    pub service_type: Option<String>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
}

impl BookingRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one turn's extraction into the record.
    ///
    /// A field is only overwritten when the new value is non-null and not the
    /// literal "null" placeholder some models emit as a string. Known values
    /// survive later nulls.
    pub fn merge(&mut self, fields: &BookingFields) {
        merge_field(&mut self.name, &fields.name);
        merge_field(&mut self.phone, &fields.phone);
        merge_field(&mut self.vehicle, &fields.vehicle);
        merge_field(&mut self.service_type, &fields.service_type);
        merge_field(&mut self.preferred_date, &fields.preferred_date);
        merge_field(&mut self.preferred_time, &fields.preferred_time);
    }

    /// True iff all six required fields are non-null
    pub fn is_complete(&self) -> bool {
        self.name.is_some()
            && self.phone.is_some()
            && self.vehicle.is_some()
            && self.service_type.is_some()
            && self.preferred_date.is_some()
            && self.preferred_time.is_some()
    }

    /// Names of the fields still missing, for logging and prompts
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push("name");
        }
        if self.phone.is_none() {
            missing.push("phone");
        }
        if self.vehicle.is_none() {
            missing.push("vehicle");
        }
        if self.service_type.is_none() {
            missing.push("service_type");
        }
        if self.preferred_date.is_none() {
            missing.push("preferred_date");
        }
        if self.preferred_time.is_none() {
            missing.push("preferred_time");
        }
        missing
    }
}

fn merge_field(current: &mut Option<String>, incoming: &Option<String>) {
    if let Some(value) = incoming {
        let trimmed = value.trim();
        if !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case("null") {
            *current = Some(trimmed.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_fills_empty_fields() {
        let mut record = BookingRecord::new();
        record.merge(&BookingFields {
            service_type: Some("oil change".to_string()),
            preferred_date: Some("2026-08-27".to_string()),
            preferred_time: Some("morning".to_string()),
            ..Default::default()
        });

        assert_eq!(record.service_type.as_deref(), Some("oil change"));
        assert!(record.name.is_none());
        assert!(!record.is_complete());
    }

    #[test]
    fn test_all_null_merge_is_identity() {
        let mut record = BookingRecord {
            name: Some("Maria".to_string()),
            phone: Some("(954) 243-1238".to_string()),
            ..Default::default()
        };
        let before = record.clone();

        record.merge(&BookingFields::default());
        assert_eq!(record, before);
    }

    #[test]
    fn test_null_never_clobbers_known_value() {
        let mut record = BookingRecord {
            vehicle: Some("2025 Honda Civic".to_string()),
            ..Default::default()
        };

        record.merge(&BookingFields {
            vehicle: None,
            ..Default::default()
        });
        assert_eq!(record.vehicle.as_deref(), Some("2025 Honda Civic"));

        // The literal "null" placeholder is treated the same as absence
        record.merge(&BookingFields {
            vehicle: Some("null".to_string()),
            ..Default::default()
        });
        assert_eq!(record.vehicle.as_deref(), Some("2025 Honda Civic"));
    }

    #[test]
    fn test_explicit_replacement_wins() {
        let mut record = BookingRecord {
            preferred_time: Some("morning".to_string()),
            ..Default::default()
        };

        record.merge(&BookingFields {
            preferred_time: Some("2:30 PM".to_string()),
            ..Default::default()
        });
        assert_eq!(record.preferred_time.as_deref(), Some("2:30 PM"));
    }

    #[test]
    fn test_completion_requires_all_six() {
        let mut record = BookingRecord {
            name: Some("Maria".to_string()),
            phone: Some("(954) 243-1238".to_string()),
            vehicle: Some("Civic".to_string()),
            service_type: Some("oil change".to_string()),
            preferred_date: Some("2026-08-27".to_string()),
            preferred_time: None,
        };
        assert!(!record.is_complete());
        assert_eq!(record.missing_fields(), vec!["preferred_time"]);

        record.preferred_time = Some("9 AM".to_string());
        assert!(record.is_complete());
        assert!(record.missing_fields().is_empty());
    }
}
