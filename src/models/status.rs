//! Status badges for the various status enumerations.
//!
//! Lookups never fail: a status outside the known table renders with the
//! default badge.

use serde::Serialize;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Leave,
    Payslip,
    PayrollBatch,
    ServiceRequest,
    Invitation,
    /// Tax-authority e-invoice synchronization.
    EtaSync,
}

impl StatusKind {
    pub fn parse(kind: &str) -> Result<Self, AppError> {
        match kind {
            "leave" => Ok(Self::Leave),
            "payslip" => Ok(Self::Payslip),
            "payroll-batch" => Ok(Self::PayrollBatch),
            "service-request" => Ok(Self::ServiceRequest),
            "invitation" => Ok(Self::Invitation),
            "eta-sync" => Ok(Self::EtaSync),
            other => Err(AppError::validation(format!(
                "Unknown status kind '{}'",
                other
            ))),
        }
    }

    fn table(&self) -> &'static [(&'static str, &'static str, &'static str)] {
        match self {
            Self::Leave => &[
                ("pending", "Pending", "yellow"),
                ("approved", "Approved", "green"),
                ("rejected", "Rejected", "red"),
                ("cancelled", "Cancelled", "gray"),
            ],
            Self::Payslip => &[
                ("draft", "Draft", "gray"),
                ("issued", "Issued", "blue"),
                ("paid", "Paid", "green"),
                ("cancelled", "Cancelled", "red"),
            ],
            Self::PayrollBatch => &[
                ("draft", "Draft", "gray"),
                ("processing", "Processing", "yellow"),
                ("approved", "Approved", "blue"),
                ("paid", "Paid", "green"),
                ("cancelled", "Cancelled", "red"),
            ],
            Self::ServiceRequest => &[
                ("open", "Open", "blue"),
                ("in_progress", "In progress", "yellow"),
                ("completed", "Completed", "green"),
                ("rejected", "Rejected", "red"),
            ],
            Self::Invitation => &[
                ("pending", "Pending", "yellow"),
                ("valid", "Valid", "blue"),
                ("expired", "Expired", "gray"),
                ("accepted", "Accepted", "green"),
                ("revoked", "Revoked", "red"),
            ],
            Self::EtaSync => &[
                ("pending", "Pending", "yellow"),
                ("submitted", "Submitted", "blue"),
                ("valid", "Valid", "green"),
                ("invalid", "Invalid", "red"),
                ("rejected", "Rejected", "red"),
                ("cancelled", "Cancelled", "gray"),
            ],
        }
    }
}

pub const DEFAULT_BADGE_COLOR: &str = "gray";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: String,
    pub color: &'static str,
    pub recognized: bool,
}

/// Badge for a raw status string, falling back to the default badge.
pub fn status_badge(kind: StatusKind, status: &str) -> StatusBadge {
    let normalized = status.trim().to_lowercase();
    match kind.table().iter().find(|(key, _, _)| *key == normalized) {
        Some(&(_, label, color)) => StatusBadge {
            label: label.to_string(),
            color,
            recognized: true,
        },
        None => StatusBadge {
            label: if status.trim().is_empty() {
                "Unknown".to_string()
            } else {
                status.to_string()
            },
            color: DEFAULT_BADGE_COLOR,
            recognized: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_status() {
        let badge = status_badge(StatusKind::Leave, "Approved");
        assert_eq!(badge.label, "Approved");
        assert_eq!(badge.color, "green");
        assert!(badge.recognized);
    }

    #[test]
    fn test_unknown_status_falls_back() {
        let badge = status_badge(StatusKind::Payslip, "on_hold");
        assert_eq!(badge.label, "on_hold");
        assert_eq!(badge.color, DEFAULT_BADGE_COLOR);
        assert!(!badge.recognized);

        let empty = status_badge(StatusKind::EtaSync, "  ");
        assert_eq!(empty.label, "Unknown");
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!(StatusKind::parse("eta-sync").unwrap(), StatusKind::EtaSync);
        assert!(StatusKind::parse("weather").is_err());
    }
}
