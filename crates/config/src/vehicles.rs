//! Vehicle vocabulary and namespace mapping
//!
//! The catalog maps model keywords ("civic") to manual namespaces
//! ("civic-2025") and drives both the classifier fast path and vehicle
//! substring detection. Defaults cover the current lineup; a deployment can
//! load its own catalog.

use serde::{Deserialize, Serialize};

/// One vehicle the dealership supports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleEntry {
    /// Lowercase keyword customers use ("civic")
    pub keyword: String,
    /// Manual namespace in the vector index ("civic-2025")
    pub namespace: String,
}

/// Known vehicle lineup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleCatalog {
    entries: Vec<VehicleEntry>,
}

impl Default for VehicleCatalog {
    fn default() -> Self {
        Self {
            entries: vec![
                VehicleEntry {
                    keyword: "civic".to_string(),
                    namespace: "civic-2025".to_string(),
                },
                VehicleEntry {
                    keyword: "ridgeline".to_string(),
                    namespace: "ridgeline-2025".to_string(),
                },
                VehicleEntry {
                    keyword: "passport".to_string(),
                    namespace: "passport-2026".to_string(),
                },
            ],
        }
    }
}

impl VehicleCatalog {
    pub fn new(entries: Vec<VehicleEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[VehicleEntry] {
        &self.entries
    }

    /// Exact match: the whole message is just a vehicle name
    pub fn exact_match(&self, text: &str) -> Option<&str> {
        let lowered = text.trim().to_lowercase();
        self.entries
            .iter()
            .find(|e| e.keyword == lowered)
            .map(|e| e.namespace.as_str())
    }

    /// Substring match: a vehicle name appears somewhere in the message
    pub fn detect(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.entries
            .iter()
            .find(|e| lowered.contains(&e.keyword))
            .map(|e| e.namespace.as_str())
    }

    /// True iff `namespace` is one of the known manual namespaces
    pub fn is_known_namespace(&self, namespace: &str) -> bool {
        self.entries.iter().any(|e| e.namespace == namespace)
    }

    /// Short display name derived from a namespace ("civic-2025" -> "Civic")
    pub fn display_name(namespace: &str) -> String {
        let model = namespace.split('-').next().unwrap_or(namespace);
        let mut chars = model.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    }

    /// Vehicle-history namespace for a VIN
    pub fn history_namespace(vin: &str) -> String {
        format!("history-{vin}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_only_vehicle_name() {
        let catalog = VehicleCatalog::default();
        assert_eq!(catalog.exact_match("Civic"), Some("civic-2025"));
        assert_eq!(catalog.exact_match("  passport "), Some("passport-2026"));
        assert_eq!(catalog.exact_match("my civic"), None);
    }

    #[test]
    fn test_substring_detection() {
        let catalog = VehicleCatalog::default();
        assert_eq!(
            catalog.detect("how do I pair bluetooth in my Ridgeline?"),
            Some("ridgeline-2025")
        );
        assert_eq!(catalog.detect("oil change please"), None);
    }

    #[test]
    fn test_known_namespace() {
        let catalog = VehicleCatalog::default();
        assert!(catalog.is_known_namespace("civic-2025"));
        assert!(!catalog.is_known_namespace("accord-2024"));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(VehicleCatalog::display_name("civic-2025"), "Civic");
        assert_eq!(VehicleCatalog::display_name("passport-2026"), "Passport");
    }

    #[test]
    fn test_history_namespace() {
        assert_eq!(
            VehicleCatalog::history_namespace("1HGFE2F52RL000000"),
            "history-1HGFE2F52RL000000"
        );
    }
}
