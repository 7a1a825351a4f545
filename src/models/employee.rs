//! Employee model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{require_email, require_non_empty, require_non_negative, Resource};
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Intern,
}

impl Default for EmploymentType {
    fn default() -> Self {
        Self::FullTime
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

/// An employee of the tenant's organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name_ar: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub department_id: String,
    pub position: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
    pub hire_date: NaiveDate,
    #[serde(default)]
    pub employment_type: EmploymentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    /// Monthly basic salary.
    pub basic_salary: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

pub(crate) fn default_currency() -> String {
    "EGP".to_string()
}

impl Employee {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Resource for Employee {
    const COLLECTION: &'static str = "employees";
    const ID_PREFIX: &'static str = "EMP";
    const LABEL: &'static str = "Employee";
    const FILTER_FIELDS: &'static [&'static str] = &[
        "departmentId",
        "managerId",
        "position",
        "employmentType",
        "gender",
    ];

    fn validate(&self) -> Result<(), AppError> {
        require_non_empty(&self.first_name, "First name")?;
        require_non_empty(&self.last_name, "Last name")?;
        require_email(&self.email, "Email")?;
        require_non_empty(&self.department_id, "Department")?;
        require_non_empty(&self.position, "Position")?;
        require_non_negative(self.basic_salary, "Basic salary")?;
        if let Some(national_id) = &self.national_id {
            // Egyptian national IDs are 14 digits
            if national_id.len() != 14 || !national_id.chars().all(|c| c.is_ascii_digit()) {
                return Err(AppError::validation("National ID must be 14 digits"));
            }
        }
        Ok(())
    }
}
