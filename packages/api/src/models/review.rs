//! Moderation state shared by car listings and rider applications.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a submission stands in the admin review queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&ReviewStatus::Approved).unwrap(), r#""approved""#);
        let status: ReviewStatus = serde_json::from_str(r#""rejected""#).unwrap();
        assert_eq!(status, ReviewStatus::Rejected);
        assert_eq!(ReviewStatus::default().to_string(), "pending");
    }
}
