use std::sync::Arc;

use crate::config::Settings;
use crate::store::NotificationStore;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Arc<dyn NotificationStore>,
}

impl AppState {
    pub fn new(settings: Settings, store: Arc<dyn NotificationStore>) -> Self {
        Self {
            settings: Arc::new(settings),
            store,
        }
    }
}
