use utoipa::{Modify, OpenApi};

use crate::features::reports::{dtos as reports_dtos, handlers as reports_handlers, models};
use crate::shared::types::{ErrorResponse, MessageResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        reports_handlers::upload_report,
        reports_handlers::list_reports,
        reports_handlers::update_report_status,
        reports_handlers::delete_report,
    ),
    components(
        schemas(
            // Shared
            MessageResponse,
            ErrorResponse,
            // Reports
            models::ReportStatus,
            reports_dtos::UploadReportDto,
            reports_dtos::UploadResultDto,
            reports_dtos::UploadResponseDto,
            reports_dtos::ReportResponseDto,
            reports_dtos::UpdateReportStatusDto,
        )
    ),
    tags(
        (name = "reports", description = "Community waste reports and moderation"),
    ),
    info(
        title = "GeoClean API",
        version = "0.1.0",
        description = "Community waste reporting API",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
