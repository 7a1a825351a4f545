//! Department model.

use serde::{Deserialize, Serialize};

use super::{require_non_empty, require_non_negative, Resource};
use crate::errors::AppError;

/// An organizational unit; departments nest through `parent_department_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_ar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_department_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
}

impl Resource for Department {
    const COLLECTION: &'static str = "departments";
    const ID_PREFIX: &'static str = "DEP";
    const LABEL: &'static str = "Department";
    const FILTER_FIELDS: &'static [&'static str] = &["parentDepartmentId", "managerId", "location"];

    fn validate(&self) -> Result<(), AppError> {
        require_non_empty(&self.name, "Department name")?;
        if let Some(budget) = self.budget {
            require_non_negative(budget, "Budget")?;
        }
        Ok(())
    }
}
