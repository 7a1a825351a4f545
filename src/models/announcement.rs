//! Announcements shown on the employee portal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_non_empty, Resource};
use crate::errors::AppError;

/// Audience value addressing every employee.
pub const AUDIENCE_ALL: &str = "all";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementPriority {
    Low,
    Normal,
    High,
    Urgent,
}

impl Default for AnnouncementPriority {
    fn default() -> Self {
        Self::Normal
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub priority: AnnouncementPriority,
    /// `all` or a department ID.
    #[serde(default = "default_audience")]
    pub audience: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_audience() -> String {
    AUDIENCE_ALL.to_string()
}

impl Announcement {
    /// Whether an employee of `department_id` should see this at `now`.
    pub fn visible_to(&self, department_id: &str, now: DateTime<Utc>) -> bool {
        let addressed = self.audience == AUDIENCE_ALL || self.audience == department_id;
        let published = self.published_at.is_none_or(|p| p <= now);
        let live = self.expires_at.is_none_or(|e| e > now);
        addressed && published && live
    }
}

impl Resource for Announcement {
    const COLLECTION: &'static str = "announcements";
    const ID_PREFIX: &'static str = "ANN";
    const LABEL: &'static str = "Announcement";
    const FILTER_FIELDS: &'static [&'static str] = &["priority", "audience"];

    fn validate(&self) -> Result<(), AppError> {
        require_non_empty(&self.title, "Title")?;
        require_non_empty(&self.body, "Body")?;
        require_non_empty(&self.audience, "Audience")?;
        if let (Some(p), Some(e)) = (self.published_at, self.expires_at) {
            if e <= p {
                return Err(AppError::validation("Expiry must be after publication"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn announcement(audience: &str) -> Announcement {
        Announcement {
            title: "Ramadan hours".to_string(),
            body: "Office hours are 9 to 3.".to_string(),
            priority: AnnouncementPriority::High,
            audience: audience.to_string(),
            published_at: None,
            expires_at: None,
        }
    }

    #[test]
    fn test_visibility_by_audience() {
        let now = Utc::now();
        assert!(announcement("all").visible_to("DEP002", now));
        assert!(announcement("DEP002").visible_to("DEP002", now));
        assert!(!announcement("DEP003").visible_to("DEP002", now));
    }

    #[test]
    fn test_visibility_window() {
        let now = Utc::now();
        let mut a = announcement("all");
        a.expires_at = Some(now - Duration::hours(1));
        assert!(!a.visible_to("DEP001", now));

        let mut b = announcement("all");
        b.published_at = Some(now + Duration::hours(1));
        assert!(!b.visible_to("DEP001", now));
    }
}
