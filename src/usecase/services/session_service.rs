use std::sync::Arc;

use anyhow::Result;

use crate::domain::entities::session::Session;
use crate::usecase::ports::session_store::SessionStore;

pub struct SessionService {
    store: Arc<dyn SessionStore>,
}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Loads the persisted session once at start-up.
    pub fn hydrate(&self) -> Result<Option<Arc<Session>>> {
        Ok(self.store.hydrate()?.map(Arc::new))
    }

    pub fn login(&self, session: Session) -> Result<Arc<Session>> {
        self.store.save(&session)?;
        Ok(Arc::new(session))
    }

    pub fn logout(&self) -> Result<()> {
        self.store.clear()
    }
}
