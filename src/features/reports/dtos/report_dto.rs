use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::reports::models::{NewReport, Report, ReportStatus};
use crate::shared::constants::UPLOADS_ROUTE;

/// Upload report request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadReportDto {
    pub name: Option<String>,
    pub email: Option<String>,
    pub caption: Option<String>,
    pub town: Option<String>,
    pub area: Option<String>,
    pub state: Option<String>,
    /// Latitude; 0.0 when missing or not a number
    #[schema(example = "-6.2088")]
    pub lat: Option<String>,
    /// Longitude; 0.0 when missing or not a number
    #[schema(example = "106.8456")]
    pub lon: Option<String>,
    /// Photo file; repeat the part to submit several, each becomes its own report
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub photos: String,
}

/// Text fields of an upload form, shared by every photo in the submission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub caption: Option<String>,
    pub town: Option<String>,
    pub area: Option<String>,
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl ReportForm {
    /// Record a text field; returns false for names the form does not know
    pub fn set_field(&mut self, name: &str, value: String) -> bool {
        match name {
            "name" => self.name = Some(value),
            "email" => self.email = Some(value),
            "caption" => self.caption = Some(value),
            "town" => self.town = Some(value),
            "area" => self.area = Some(value),
            "state" => self.state = Some(value),
            "lat" => self.lat = parse_coordinate(&value),
            "lon" => self.lon = parse_coordinate(&value),
            _ => return false,
        }
        true
    }

    /// Build the row for one photo of this submission
    pub fn to_new_report(&self, photo: String, ai_description: String) -> NewReport {
        NewReport {
            name: self.name.clone(),
            email: self.email.clone(),
            caption: self.caption.clone(),
            town: self.town.clone(),
            area: self.area.clone(),
            state: self.state.clone(),
            lat: self.lat,
            lon: self.lon,
            photo: Some(photo),
            status: ReportStatus::Pending,
            ai_description,
        }
    }
}

/// Parse a coordinate, falling back to 0.0 for anything that is not a
/// finite number
pub fn parse_coordinate(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// A photo part read from the upload form
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub original_filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Outcome for one uploaded photo
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResultDto {
    /// Name under which the photo is stored and served
    pub filename: String,
    pub ai_description: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponseDto {
    pub message: String,
    pub results: Vec<UploadResultDto>,
}

/// Response DTO for a report: every column plus a URL for its photo
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
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
    pub status: ReportStatus,
    pub ai_description: Option<String>,
    pub photo_url: Option<String>,
}

impl ReportResponseDto {
    pub fn from_report(r: Report, base_url: &str) -> Self {
        let status = r.status();
        let photo_url = r
            .photo
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}{}/{}", base_url, UPLOADS_ROUTE, urlencoding::encode(p)));

        Self {
            id: r.id,
            name: r.name,
            email: r.email,
            caption: r.caption,
            town: r.town,
            area: r.area,
            state: r.state,
            lat: r.lat,
            lon: r.lon,
            photo: r.photo,
            status,
            ai_description: r.ai_description,
            photo_url,
        }
    }
}

/// Request DTO for updating report status.
/// Any value other than "complete" (including a missing or non-string one)
/// is stored as "pending".
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateReportStatusDto {
    #[schema(value_type = Option<String>, example = "complete")]
    pub status: Option<serde_json::Value>,
}

impl UpdateReportStatusDto {
    pub fn resolved_status(&self) -> ReportStatus {
        self.status
            .as_ref()
            .and_then(|v| v.as_str())
            .map(ReportStatus::coerce)
            .unwrap_or_default()
    }
}
