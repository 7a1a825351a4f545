//! Employee self-service requests (certificates, letters, IT tickets).

use serde::{Deserialize, Serialize};

use super::{require_non_empty, Resource};
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ServiceRequestStatus {
    Open,
    InProgress,
    Completed,
    Rejected,
}

impl Default for ServiceRequestStatus {
    fn default() -> Self {
        Self::Open
    }
}

impl ServiceRequestStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open | Self::InProgress)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub employee_id: String,
    /// e.g. `salary_certificate`, `experience_letter`.
    pub request_type: String,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: ServiceRequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

impl Resource for ServiceRequest {
    const COLLECTION: &'static str = "service_requests";
    const ID_PREFIX: &'static str = "SR";
    const LABEL: &'static str = "Service request";
    const FILTER_FIELDS: &'static [&'static str] = &["employeeId", "requestType", "status"];

    fn validate(&self) -> Result<(), AppError> {
        require_non_empty(&self.employee_id, "Employee")?;
        require_non_empty(&self.request_type, "Request type")?;
        require_non_empty(&self.subject, "Subject")?;
        if self.status == ServiceRequestStatus::Rejected
            && self.resolution.as_deref().is_none_or(|r| r.trim().is_empty())
        {
            return Err(AppError::validation(
                "A rejected service request needs a resolution",
            ));
        }
        Ok(())
    }
}
