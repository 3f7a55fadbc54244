use std::path::PathBuf;

use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};
use tracing::{info, warn};

use crate::domain::entities::session::{Role, Session};
use crate::infra::sqlite::schema::{init_db, open_connection};
use crate::usecase::ports::session_store::SessionStore;

/// Single-row session table in the app's local database.
pub struct SqliteSessionStore {
    pub db_path: PathBuf,
}

impl SqliteSessionStore {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        init_db(&db_path)?;
        Ok(Self { db_path })
    }
}

impl SessionStore for SqliteSessionStore {
    fn hydrate(&self) -> Result<Option<Session>> {
        let conn = open_connection(&self.db_path)?;
        let row = conn
            .query_row(
                "SELECT token, email, role FROM session WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()
            .context("failed to read session")?;

        let Some((token, email, role)) = row else {
            return Ok(None);
        };
        match role.parse::<Role>() {
            Ok(role) => {
                info!(%email, role = role.as_str(), "session restored");
                Ok(Some(Session { token, email, role }))
            }
            Err(err) => {
                warn!(%email, %err, "ignoring stored session with unknown role");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        let conn = open_connection(&self.db_path)?;
        conn.execute(
            "INSERT INTO session(id, token, email, role) VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                token = excluded.token,
                email = excluded.email,
                role = excluded.role,
                saved_at = CURRENT_TIMESTAMP",
            params![session.token, session.email, session.role.as_str()],
        )
        .context("failed to save session")?;
        info!(email = %session.email, "session saved");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let conn = open_connection(&self.db_path)?;
        conn.execute("DELETE FROM session", [])
            .context("failed to clear session")?;
        info!("session cleared");
        Ok(())
    }
}
