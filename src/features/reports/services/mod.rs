mod description_service;
mod report_service;

pub use description_service::DescriptionService;
pub use report_service::ReportService;
