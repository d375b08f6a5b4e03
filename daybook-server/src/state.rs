use anyhow::Result;
use daybook_core::{Daybook, DaybookConfig};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    daybook: Daybook,
}

impl AppState {
    pub fn new(daybook: Daybook) -> Self {
        AppState { daybook }
    }

    /// Open the configured database and build the service on top of it.
    pub fn from_config(config: &DaybookConfig) -> Result<Self> {
        let store = config.open_store()?;
        Ok(AppState::new(Daybook::new(store, config.pagination)))
    }

    pub fn daybook(&self) -> &Daybook {
        &self.daybook
    }
}
