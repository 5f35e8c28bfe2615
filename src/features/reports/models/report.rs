use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Moderation status of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Pending,
    Complete,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Complete => "complete",
        }
    }

    /// Map a submitted or stored value onto a status; anything unrecognized
    /// is `Pending`
    pub fn coerce(value: &str) -> Self {
        match value {
            "complete" => ReportStatus::Complete,
            _ => ReportStatus::Pending,
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database model for a row of `posts`
#[derive(Debug, Clone, FromRow)]
pub struct Report {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub caption: Option<String>,
    pub town: Option<String>,
    pub area: Option<String>,
    pub state: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub photo: Option<String>,
    pub status: Option<String>,
    pub ai_description: Option<String>,
}

impl Report {
    pub fn status(&self) -> ReportStatus {
        self.status
            .as_deref()
            .map(ReportStatus::coerce)
            .unwrap_or_default()
    }
}

/// Data for inserting a report; `id` is assigned by the store
#[derive(Debug, Clone, Default)]
pub struct NewReport {
    pub name: Option<String>,
    pub email: Option<String>,
    pub caption: Option<String>,
    pub town: Option<String>,
    pub area: Option<String>,
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub photo: Option<String>,
    pub status: ReportStatus,
    pub ai_description: String,
}
