use anyhow::Result;

use crate::domain::entities::session::Session;

/// Persisted login state. Hydrated once at start, cleared on logout.
pub trait SessionStore: Send + Sync {
    fn hydrate(&self) -> Result<Option<Session>>;
    fn save(&self, session: &Session) -> Result<()>;
    fn clear(&self) -> Result<()>;
}
