use std::sync::Arc;

use crate::auth::SessionStore;
use crate::config::AppConfig;
use crate::covers::CoverProvider;
use crate::store::GameStore;

#[derive(Clone)]
pub struct AppState {
    pub store: GameStore,
    pub config: Arc<AppConfig>,
    pub sessions: Arc<SessionStore>,
    pub covers: Arc<dyn CoverProvider>,
}
