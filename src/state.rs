// src/state.rs

use std::sync::Arc;
use std::time::Duration as StdDuration;

use axum::extract::FromRef;
use chrono::Duration;

use crate::{
    config::Config,
    engine::DashboardCache,
    error::AppError,
    services::QuestionCatalog,
    source::RecordSource,
    utils::{hash::AdminCredentials, session::SessionStore},
};

/// Everything a request handler can reach. Built once at startup and cloned
/// into each request; the session table and dashboard cache are shared.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn RecordSource>,
    pub config: Config,
    pub credentials: AdminCredentials,
    pub sessions: SessionStore,
    pub dashboard: DashboardCache,
    pub catalog: QuestionCatalog,
}

impl AppState {
    pub fn new(mut config: Config, source: Arc<dyn RecordSource>) -> Result<Self, AppError> {
        let password = std::mem::take(&mut config.admin_password);
        let credentials = AdminCredentials::new(&config.admin_username, &password)?;
        drop(password);

        let sessions = SessionStore::new(Duration::seconds(config.session_ttl_secs));
        let dashboard = DashboardCache::new(
            StdDuration::from_secs(config.dashboard_cache_ttl_secs),
            config.dashboard_cache_max_entries,
        );
        let catalog = QuestionCatalog::new(Arc::clone(&source), config.exam_edit_lock);

        Ok(Self {
            source,
            config,
            credentials,
            sessions,
            dashboard,
            catalog,
        })
    }
}

impl FromRef<AppState> for SessionStore {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for QuestionCatalog {
    fn from_ref(state: &AppState) -> Self {
        state.catalog.clone()
    }
}
