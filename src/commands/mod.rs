pub mod calendar;
pub mod config;
pub mod schedule;
pub mod user;

use anyhow::Result;
use daybook_core::{Daybook, DaybookConfig};
use serde::Serialize;

/// Service handle plus output settings, shared by every command.
pub struct Context {
    pub daybook: Daybook,
    pub json: bool,
}

impl Context {
    pub fn new(daybook: Daybook, json: bool) -> Self {
        Context { daybook, json }
    }

    /// Open the configured database.
    pub fn open(config: &DaybookConfig, json: bool) -> Result<Self> {
        let store = config.open_store()?;
        Ok(Context::new(Daybook::new(store, config.pagination), json))
    }

    /// Print `value` as pretty JSON in `--json` mode, otherwise the text from `text`.
    pub fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        println!("{}", self.format(value, text)?);
        Ok(())
    }

    fn format<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<String> {
        if self.json {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(text())
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use daybook_core::{Daybook, MemoryStore, PaginationConfig, UserId};

    use super::Context;

    pub fn context(json: bool) -> (Context, UserId) {
        let daybook = Daybook::new(Arc::new(MemoryStore::new()), PaginationConfig::default());
        let user = daybook.create_user("tester@test.com", Some("tester")).unwrap().id;
        (Context::new(daybook, json), user)
    }
}
