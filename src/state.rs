use std::sync::Arc;

use crate::accounts::AccountService;
use crate::config::Config;
use crate::db::AccountStore;
use crate::email::Mailer;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub accounts: AccountService,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn AccountStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Result<SharedState, String> {
        let accounts = AccountService::new(&config, store, mailer)?;
        Ok(Arc::new(Self { config, accounts }))
    }
}
