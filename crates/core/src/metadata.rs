//! Descriptive legal-status metadata attached to run outputs

use serde::{Deserialize, Serialize};

/// Legal standing of the competing definitions at the time of a run.
///
/// Purely descriptive: it never influences computation and is passed by
/// value into output metadata assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalStatus {
    pub new_definition_status: String,
    pub abeyance_date: String,
    pub abeyance_order: String,
    pub operative_definition: String,
    pub new_definition_source: String,
}

impl Default for LegalStatus {
    fn default() -> Self {
        Self {
            new_definition_status: "IN_ABEYANCE".to_string(),
            abeyance_date: "2025-12-29".to_string(),
            abeyance_order: "SC Order dated 29-Dec-2025".to_string(),
            operative_definition: "FSI-2010".to_string(),
            new_definition_source: "SC Judgment dated 20-Nov-2025".to_string(),
        }
    }
}

impl LegalStatus {
    /// Whether the NEW definition is currently suspended
    pub fn new_definition_in_abeyance(&self) -> bool {
        self.new_definition_status == "IN_ABEYANCE"
    }

    /// One-line disclaimer for report headers
    pub fn disclaimer(&self) -> String {
        format!(
            "NEW definition ({}) status: {} since {} ({}); operative definition: {}",
            self.new_definition_source,
            self.new_definition_status,
            self.abeyance_date,
            self.abeyance_order,
            self.operative_definition,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status() {
        let status = LegalStatus::default();
        assert!(status.new_definition_in_abeyance());
        assert_eq!(status.operative_definition, "FSI-2010");
        assert!(status.disclaimer().contains("2025-12-29"));
    }
}
