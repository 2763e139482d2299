use std::sync::Arc;
use std::time::Duration;

use budgetbook_core::{
    budgets::{BudgetService, BudgetServiceTrait},
    preferences::PreferenceService,
};
use budgetbook_storage_sqlite::{
    budgets::BudgetRepository, db, preferences::PreferenceRepository,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    config::Config,
    session::{spawn_session_sweeper, SessionStore},
    views::{TeraViewRenderer, ViewRenderer},
};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub struct AppState {
    pub budget_service: Arc<dyn BudgetServiceTrait>,
    pub sessions: SessionStore,
    pub views: Arc<dyn ViewRenderer>,
    pub user_id: i32,
}

pub fn init_tracing() {
    let log_format = std::env::var("BB_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer(Arc::clone(&pool));

    let preference_repository = Arc::new(PreferenceRepository::new(pool.clone(), writer.clone()));
    let preference_service = Arc::new(PreferenceService::new(preference_repository));

    let budget_repository = Arc::new(BudgetRepository::new(pool.clone(), writer));
    let budget_service = Arc::new(BudgetService::new(budget_repository, preference_service));

    let views = Arc::new(TeraViewRenderer::new()?);

    let sessions = SessionStore::new(config.session_idle_timeout);
    spawn_session_sweeper(sessions.clone(), SESSION_SWEEP_INTERVAL);

    Ok(Arc::new(AppState {
        budget_service,
        sessions,
        views,
        user_id: config.user_id,
    }))
}
