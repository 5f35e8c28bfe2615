#[cfg(test)]
use std::path::Path;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};
#[cfg(test)]
use std::sync::{Arc, Mutex};

#[cfg(test)]
use async_trait::async_trait;
#[cfg(test)]
use axum::Router;
#[cfg(test)]
use axum_test::TestServer;
#[cfg(test)]
use sqlx::SqlitePool;

#[cfg(test)]
use crate::core::config::{DatabaseConfig, FilenamePolicy, MediaConfig};
#[cfg(test)]
use crate::core::database;
#[cfg(test)]
use crate::features::files::routes as files_routes;
#[cfg(test)]
use crate::features::reports::{
    routes as reports_routes, DescriptionService, ReportService, ReportState,
};
#[cfg(test)]
use crate::modules::storage::LocalMediaStore;
#[cfg(test)]
use crate::modules::vision::{DescriptionProvider, ProviderError};

/// Provider that always answers with a fixed description
#[cfg(test)]
pub struct StubProvider {
    description: String,
    calls: AtomicUsize,
    last_mime_type: Mutex<Option<String>>,
}

#[cfg(test)]
impl StubProvider {
    pub fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            calls: AtomicUsize::new(0),
            last_mime_type: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_mime_type(&self) -> Option<String> {
        self.last_mime_type.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl DescriptionProvider for StubProvider {
    async fn describe(&self, _image: &[u8], mime_type: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_mime_type.lock().unwrap() = Some(mime_type.to_string());
        Ok(self.description.clone())
    }
}

/// Provider that always fails, as if the upstream service were down
#[cfg(test)]
pub struct FailingProvider;

#[cfg(test)]
#[async_trait]
impl DescriptionProvider for FailingProvider {
    async fn describe(&self, _image: &[u8], _mime_type: &str) -> Result<String, ProviderError> {
        Err(ProviderError::Status {
            status: 503,
            body: "quota exceeded".to_string(),
        })
    }
}

/// Migrated SQLite database in a file under `dir`
#[cfg(test)]
pub async fn test_pool(dir: &Path) -> SqlitePool {
    let config = DatabaseConfig {
        url: format!("sqlite://{}", dir.join("test.db").display()),
        max_connections: 8,
        min_connections: 1,
        acquire_timeout_secs: 5,
        idle_timeout_secs: 600,
        max_lifetime_secs: 1800,
        busy_timeout_secs: 5,
    };

    let pool = database::create_pool(&config).await.unwrap();
    database::run_migrations(&pool).await.unwrap();
    pool
}

/// Media store rooted at `dir/uploads`
#[cfg(test)]
pub async fn test_store(dir: &Path, filename_policy: FilenamePolicy) -> LocalMediaStore {
    let store = LocalMediaStore::new(&MediaConfig {
        upload_dir: dir.join("uploads"),
        filename_policy,
    });
    store.ensure_root().await.unwrap();
    store
}

/// Full HTTP app backed by temporary storage
#[cfg(test)]
pub struct TestApp {
    pub server: TestServer,
    pub pool: SqlitePool,
    pub media: Arc<LocalMediaStore>,
    _dir: tempfile::TempDir,
}

#[cfg(test)]
pub async fn spawn_app(
    provider: Arc<dyn DescriptionProvider>,
    filename_policy: FilenamePolicy,
) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let pool = test_pool(dir.path()).await;
    let media = Arc::new(test_store(dir.path(), filename_policy).await);

    let report_service = Arc::new(ReportService::new(
        pool.clone(),
        Arc::clone(&media),
        Arc::new(DescriptionService::new(provider)),
    ));
    let state = ReportState {
        report_service,
        public_base_url: None,
        fallback_base_url: "http://127.0.0.1:5000".to_string(),
    };

    let router = Router::new()
        .merge(reports_routes::routes(state, 10 * 1024 * 1024))
        .merge(files_routes::routes(&media));

    TestApp {
        server: TestServer::new(router).unwrap(),
        pool,
        media,
        _dir: dir,
    }
}
