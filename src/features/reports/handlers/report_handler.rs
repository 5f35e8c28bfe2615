use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap},
    Json,
};
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::reports::dtos::{
    PhotoUpload, ReportForm, ReportResponseDto, UpdateReportStatusDto, UploadReportDto,
    UploadResponseDto,
};
use crate::features::reports::services::ReportService;
use crate::shared::constants::{DELETE_SUCCESS_MESSAGE, UPLOAD_SUCCESS_MESSAGE};
use crate::shared::types::{ErrorResponse, MessageResponse};

/// Multipart field carrying photo files
const PHOTOS_FIELD: &str = "photos";

/// State for report handlers
#[derive(Clone)]
pub struct ReportState {
    pub report_service: Arc<ReportService>,
    /// Configured public base URL for photo links, if any
    pub public_base_url: Option<String>,
    /// Used when neither a configured base URL nor a Host header is available
    pub fallback_base_url: String,
}

/// Submit a waste report
///
/// Accepts multipart/form-data with the report fields and one or more
/// `photos` files. Each photo is stored, described and saved as its own report.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "reports",
    request_body(
        content = UploadReportDto,
        content_type = "multipart/form-data",
        description = "Report fields plus one or more photos",
    ),
    responses(
        (status = 200, description = "Reports created", body = UploadResponseDto),
        (status = 500, description = "Unreadable multipart body, storage or database failure", body = ErrorResponse)
    )
)]
pub async fn upload_report(
    State(state): State<ReportState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponseDto>> {
    let mut form = ReportForm::default();
    let mut photos: Vec<PhotoUpload> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::Internal(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == PHOTOS_FIELD {
            if let Some(file_name) = field.file_name().map(|s| s.to_string()) {
                let content_type = field.content_type().map(|s| s.to_string());
                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read photo bytes: {}", e);
                    AppError::Internal(format!("Failed to read photo data: {}", e))
                })?;

                // Browsers send an empty, unnamed part when no file was chosen
                if file_name.is_empty() && data.is_empty() {
                    continue;
                }

                photos.push(PhotoUpload {
                    original_filename: file_name,
                    content_type,
                    data: data.to_vec(),
                });
                continue;
            }
        }

        let text = field.text().await.map_err(|e| {
            AppError::Internal(format!("Failed to read {} field: {}", field_name, e))
        })?;
        if !form.set_field(&field_name, text) {
            debug!("Ignoring unknown field: {}", field_name);
        }
    }

    let results = state
        .report_service
        .create_from_upload(&form, photos)
        .await?;

    Ok(Json(UploadResponseDto {
        message: UPLOAD_SUCCESS_MESSAGE.to_string(),
        results,
    }))
}

/// List all reports, newest first
#[utoipa::path(
    get,
    path = "/posts",
    tag = "reports",
    responses(
        (status = 200, description = "All reports", body = Vec<ReportResponseDto>),
        (status = 500, description = "Database failure", body = ErrorResponse)
    )
)]
pub async fn list_reports(
    State(state): State<ReportState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ReportResponseDto>>> {
    let base_url = resolve_base_url(
        state.public_base_url.as_deref(),
        &headers,
        &state.fallback_base_url,
    );

    let reports = state.report_service.list_all().await?;
    let dtos = reports
        .into_iter()
        .map(|r| ReportResponseDto::from_report(r, &base_url))
        .collect();

    Ok(Json(dtos))
}

/// Update report status
///
/// Values other than "complete" are stored as "pending". Unknown ids are
/// accepted and change nothing.
#[utoipa::path(
    post,
    path = "/update_status/{id}",
    tag = "reports",
    params(
        ("id" = i64, Path, description = "Report ID")
    ),
    request_body = UpdateReportStatusDto,
    responses(
        (status = 200, description = "Status updated", body = MessageResponse),
        (status = 400, description = "Invalid JSON body", body = ErrorResponse),
        (status = 500, description = "Database failure", body = ErrorResponse)
    )
)]
pub async fn update_report_status(
    State(state): State<ReportState>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateReportStatusDto>,
) -> Result<Json<MessageResponse>> {
    let status = dto.resolved_status();
    state.report_service.update_status(id, status).await?;

    Ok(Json(MessageResponse::new(format!(
        "Status updated to {}",
        status
    ))))
}

/// Delete a report and its photo
///
/// Unknown ids are accepted and change nothing.
#[utoipa::path(
    delete,
    path = "/delete_post/{id}",
    tag = "reports",
    params(
        ("id" = i64, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report deleted", body = MessageResponse),
        (status = 500, description = "Storage or database failure", body = ErrorResponse)
    )
)]
pub async fn delete_report(
    State(state): State<ReportState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    state.report_service.delete(id).await?;
    Ok(Json(MessageResponse::new(DELETE_SUCCESS_MESSAGE)))
}

/// Base URL for photo links: configured value, else the request's Host
/// (honoring an http or https X-Forwarded-Proto), else the server address
fn resolve_base_url(configured: Option<&str>, headers: &HeaderMap, fallback: &str) -> String {
    if let Some(base) = configured {
        return base.trim_end_matches('/').to_string();
    }

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty());

    match host {
        Some(host) => {
            let scheme = headers
                .get("x-forwarded-proto")
                .and_then(|v| v.to_str().ok())
                .map(|proto| proto.trim().to_ascii_lowercase())
                .filter(|proto| proto == "http" || proto == "https")
                .unwrap_or_else(|| "http".to_string());
            format!("{}://{}", scheme, host)
        }
        None => fallback.trim_end_matches('/').to_string(),
    }
}
