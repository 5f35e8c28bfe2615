pub mod files;
pub mod reports;
