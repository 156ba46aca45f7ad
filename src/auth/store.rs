// Credential storage

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use super::types::{CredentialPair, ACCESS_KEY, REFRESH_KEY};
use crate::error::{ApiError, Result};

/// Key/value storage for the credential pair.
///
/// Reads and writes are synchronous, like the browser storage the tokens
/// live in on the web front-end.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    fn access_token(&self) -> Result<Option<String>> {
        self.get(ACCESS_KEY)
    }

    fn refresh_token(&self) -> Result<Option<String>> {
        self.get(REFRESH_KEY)
    }

    /// Replace only the access token (after a refresh)
    fn set_access_token(&self, token: &str) -> Result<()> {
        self.set(ACCESS_KEY, token)
    }

    /// Store both tokens (after a login)
    fn store_pair(&self, pair: &CredentialPair) -> Result<()> {
        self.set(ACCESS_KEY, &pair.access_token)?;
        self.set(REFRESH_KEY, &pair.refresh_token)
    }

    /// Remove both tokens
    fn clear(&self) -> Result<()> {
        self.remove(ACCESS_KEY)?;
        self.remove(REFRESH_KEY)
    }
}

fn poisoned() -> ApiError {
    ApiError::Store("credential store lock poisoned".to_string())
}

/// Process-local store, used by tests and one-shot sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a credential pair
    pub fn with_pair(access_token: &str, refresh_token: &str) -> Self {
        let store = Self::new();
        if let Ok(mut values) = store.values.lock() {
            values.insert(ACCESS_KEY.to_string(), access_token.to_string());
            values.insert(REFRESH_KEY.to_string(), refresh_token.to_string());
        }
        store
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().map_err(|_| poisoned())?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| poisoned())?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| poisoned())?;
        values.remove(key);
        Ok(())
    }
}

/// SQLite-backed store persisting tokens across CLI invocations.
///
/// Tokens live in an `auth_kv(key, value)` table keyed `"access"` / `"refresh"`.
pub struct SqliteStore {
    conn: Mutex<rusqlite::Connection>,
}

impl SqliteStore {
    /// Open (or create) the token database
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ApiError::Store(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        let conn = rusqlite::Connection::open(path).map_err(|e| {
            ApiError::Store(format!("Failed to open SQLite database {}: {}", path.display(), e))
        })?;
        Self::init(conn)
    }

    /// In-memory database, for tests
    pub fn open_in_memory() -> Result<Self> {
        Self::init(rusqlite::Connection::open_in_memory()?)
    }

    fn init(conn: rusqlite::Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS auth_kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl CredentialStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().map_err(|_| poisoned())?;
        let value = conn.query_row("SELECT value FROM auth_kv WHERE key = ?", [key], |row| {
            row.get::<_, String>(0)
        });

        match value {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| poisoned())?;
        conn.execute(
            "INSERT INTO auth_kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| poisoned())?;
        conn.execute("DELETE FROM auth_kv WHERE key = ?", [key])?;
        Ok(())
    }

    fn store_pair(&self, pair: &CredentialPair) -> Result<()> {
        let mut conn = self.conn.lock().map_err(|_| poisoned())?;
        let tx = conn.transaction()?;
        for (key, value) in [
            (ACCESS_KEY, pair.access_token.as_str()),
            (REFRESH_KEY, pair.refresh_token.as_str()),
        ] {
            tx.execute(
                "INSERT INTO auth_kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                [key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| poisoned())?;
        conn.execute(
            "DELETE FROM auth_kv WHERE key IN (?1, ?2)",
            [ACCESS_KEY, REFRESH_KEY],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> CredentialPair {
        CredentialPair {
            access_token: "A1".to_string(),
            refresh_token: "R1".to_string(),
        }
    }

    #[test]
    fn test_memory_store_pair_lifecycle() {
        let store = MemoryStore::new();
        assert_eq!(store.access_token().unwrap(), None);

        store.store_pair(&pair()).unwrap();
        assert_eq!(store.access_token().unwrap().as_deref(), Some("A1"));
        assert_eq!(store.refresh_token().unwrap().as_deref(), Some("R1"));

        store.set_access_token("A2").unwrap();
        assert_eq!(store.access_token().unwrap().as_deref(), Some("A2"));
        assert_eq!(store.refresh_token().unwrap().as_deref(), Some("R1"));

        store.clear().unwrap();
        assert_eq!(store.access_token().unwrap(), None);
        assert_eq!(store.refresh_token().unwrap(), None);
    }

    #[test]
    fn test_sqlite_store_pair_lifecycle() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.refresh_token().unwrap(), None);

        store.store_pair(&pair()).unwrap();
        store.set_access_token("A2").unwrap();
        assert_eq!(store.access_token().unwrap().as_deref(), Some("A2"));
        assert_eq!(store.refresh_token().unwrap().as_deref(), Some("R1"));

        store.clear().unwrap();
        assert_eq!(store.access_token().unwrap(), None);
        assert_eq!(store.refresh_token().unwrap(), None);
    }

    #[test]
    fn test_sqlite_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tokens.sqlite3");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.store_pair(&pair()).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.access_token().unwrap().as_deref(), Some("A1"));
        assert_eq!(store.refresh_token().unwrap().as_deref(), Some("R1"));
    }
}
