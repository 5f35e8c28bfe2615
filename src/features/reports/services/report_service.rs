use std::sync::Arc;

use sqlx::SqlitePool;

use crate::core::error::{AppError, Result};
use crate::features::reports::dtos::{PhotoUpload, ReportForm, UploadResultDto};
use crate::features::reports::models::{NewReport, Report, ReportStatus};
use crate::features::reports::services::DescriptionService;
use crate::modules::storage::LocalMediaStore;

const LIST_REPORTS_SQL: &str = r#"
    SELECT id, name, email, caption, town, area, state, lat, lon, photo, status, ai_description
    FROM posts
    ORDER BY id DESC
"#;

/// Service for report operations
pub struct ReportService {
    pool: SqlitePool,
    media: Arc<LocalMediaStore>,
    descriptions: Arc<DescriptionService>,
}

impl ReportService {
    pub fn new(
        pool: SqlitePool,
        media: Arc<LocalMediaStore>,
        descriptions: Arc<DescriptionService>,
    ) -> Self {
        Self {
            pool,
            media,
            descriptions,
        }
    }

    /// Store each photo, describe it and insert one report per photo.
    ///
    /// Photos are processed in submission order. Work already done for
    /// earlier photos is kept if a later one fails.
    pub async fn create_from_upload(
        &self,
        form: &ReportForm,
        photos: Vec<PhotoUpload>,
    ) -> Result<Vec<UploadResultDto>> {
        let mut results = Vec::with_capacity(photos.len());

        for photo in photos {
            let filename = self.media.storage_name(&photo.original_filename);
            self.media.save(&filename, &photo.data).await?;

            let ai_description = self
                .descriptions
                .describe_or_fallback(&photo.data, photo.content_type.as_deref())
                .await;

            let id = self
                .insert(&form.to_new_report(filename.clone(), ai_description.clone()))
                .await?;

            tracing::info!(
                "Created report {} with photo {} ({} bytes)",
                id,
                filename,
                photo.data.len()
            );

            results.push(UploadResultDto {
                filename,
                ai_description,
            });
        }

        Ok(results)
    }

    /// Insert a report and return its id
    pub async fn insert(&self, data: &NewReport) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO posts (name, email, caption, town, area, state, lat, lon, photo, status, ai_description)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.caption)
        .bind(&data.town)
        .bind(&data.area)
        .bind(&data.state)
        .bind(data.lat)
        .bind(data.lon)
        .bind(&data.photo)
        .bind(data.status.as_str())
        .bind(&data.ai_description)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert report: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(result.last_insert_rowid())
    }

    /// All reports, most recent first
    pub async fn list_all(&self) -> Result<Vec<Report>> {
        let reports = sqlx::query_as::<_, Report>(LIST_REPORTS_SQL)
            .fetch_all(&self.pool)
            .await?;

        Ok(reports)
    }

    /// Set the status of a report. Returns the number of affected rows;
    /// an unknown id is not an error.
    pub async fn update_status(&self, id: i64, status: ReportStatus) -> Result<u64> {
        let result = sqlx::query("UPDATE posts SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        tracing::info!(
            "Updated report {} status to {} (rows affected: {})",
            id,
            status,
            result.rows_affected()
        );

        Ok(result.rows_affected())
    }

    /// Photo filename of a report, if the report exists and has one
    #[cfg(test)]
    pub async fn find_photo(&self, id: i64) -> Result<Option<String>> {
        let photo: Option<Option<String>> =
            sqlx::query_scalar("SELECT photo FROM posts WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(photo.flatten())
    }

    /// Delete a report together with its photo.
    ///
    /// Row removal and file removal share one transaction: if the file
    /// cannot be removed the row is kept. The transaction opens with the
    /// write itself, so concurrent writers wait on the busy timeout.
    /// An unknown id is not an error.
    pub async fn delete(&self, id: i64) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let deleted: Option<Option<String>> =
            sqlx::query_scalar("DELETE FROM posts WHERE id = ? RETURNING photo")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let rows_affected = u64::from(deleted.is_some());

        if let Some(photo) = deleted.flatten().filter(|p| !p.is_empty()) {
            let removed = self.media.delete(&photo).await?;
            if !removed {
                tracing::debug!("Photo {} of report {} was already gone", photo, id);
            }
        }

        tx.commit().await?;

        tracing::info!(
            "Deleted report {} (rows affected: {})",
            id,
            rows_affected
        );

        Ok(rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::FilenamePolicy;
    use crate::shared::test_helpers::{test_pool, test_store, StubProvider};

    async fn service(dir: &std::path::Path) -> (ReportService, Arc<LocalMediaStore>) {
        let pool = test_pool(dir).await;
        let media = Arc::new(test_store(dir, FilenamePolicy::Preserve).await);
        let descriptions = Arc::new(DescriptionService::new(Arc::new(StubProvider::new(
            "Waste detected",
        ))));
        (
            ReportService::new(pool, Arc::clone(&media), descriptions),
            media,
        )
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = service(dir.path()).await;

        let first = service.insert(&NewReport::default()).await.unwrap();
        let second = service.insert(&NewReport::default()).await.unwrap();

        assert!(second > first);
    }

    #[tokio::test]
    async fn test_list_all_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = service(dir.path()).await;

        let r1 = service
            .insert(&NewReport {
                caption: Some("first".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        let r2 = service
            .insert(&NewReport {
                caption: Some("second".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let ids: Vec<i64> = service
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![r2, r1]);
    }

    #[tokio::test]
    async fn test_update_status_unknown_id_affects_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = service(dir.path()).await;

        let affected = service
            .update_status(999, ReportStatus::Complete)
            .await
            .unwrap();
        assert_eq!(affected, 0);
    }

    #[tokio::test]
    async fn test_delete_without_photo() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = service(dir.path()).await;

        let id = service.insert(&NewReport::default()).await.unwrap();
        assert_eq!(service.find_photo(id).await.unwrap(), None);

        assert_eq!(service.delete(id).await.unwrap(), 1);
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_photo_file() {
        let dir = tempfile::tempdir().unwrap();
        let (service, media) = service(dir.path()).await;

        let results = service
            .create_from_upload(
                &ReportForm::default(),
                vec![PhotoUpload {
                    original_filename: "pile.jpg".to_string(),
                    content_type: Some("image/jpeg".to_string()),
                    data: b"jpeg".to_vec(),
                }],
            )
            .await
            .unwrap();
        assert_eq!(results[0].filename, "pile.jpg");
        assert_eq!(results[0].ai_description, "Waste detected");

        let id = service.list_all().await.unwrap()[0].id;
        assert_eq!(
            service.find_photo(id).await.unwrap().as_deref(),
            Some("pile.jpg")
        );

        service.delete(id).await.unwrap();
        assert_eq!(media.read("pile.jpg").await.unwrap(), None);
        assert_eq!(service.find_photo(id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_when_file_already_gone() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = service(dir.path()).await;

        let id = service
            .insert(&NewReport {
                photo: Some("vanished.jpg".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(service.delete(id).await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_delete_alongside_concurrent_inserts() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = service(dir.path()).await;
        let service = Arc::new(service);

        let mut ids = Vec::new();
        for _ in 0..50 {
            ids.push(service.insert(&NewReport::default()).await.unwrap());
        }

        let mut tasks = Vec::new();
        for id in ids {
            let deleter = Arc::clone(&service);
            tasks.push(tokio::spawn(async move {
                deleter.delete(id).await.map(|_| ())
            }));
            let inserter = Arc::clone(&service);
            tasks.push(tokio::spawn(async move {
                inserter.insert(&NewReport::default()).await.map(|_| ())
            }));
        }

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(service.list_all().await.unwrap().len(), 50);
    }
}
