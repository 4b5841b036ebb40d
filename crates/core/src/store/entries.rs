//! Store handles and entry CRUD operations.
//!
//! A [`Store`] is a named partition of the cache bound to one generation.
//! Policies receive store handles explicitly rather than looking caches up
//! by ambient name, so tests can point them at in-memory databases.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A cached response at the time it was stored.
///
/// Full response shape (status, headers, body) keyed by request identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredResponse {
    pub key: String,
    pub method: String,
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub stored_at: String,
}

/// Handle to one named store.
///
/// Cloneable; clones share the underlying connection. Store names embed the
/// cache generation, so a handle can never read another generation's rows.
#[derive(Debug, Clone)]
pub struct Store {
    db: CacheDb,
    name: String,
}

impl Store {
    /// Bind a handle to a named store. Does not touch the database.
    pub fn new(db: CacheDb, name: impl Into<String>) -> Self {
        Self { db, name: name.into() }
    }

    /// The store's full name, generation suffix included.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register the store, creating its row if this is the first run.
    pub async fn ensure(&self) -> Result<(), Error> {
        let name = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO stores (name, created_at) VALUES (?1, ?2)",
                    params![name, chrono::Utc::now().to_rfc3339()],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace a cache entry.
    ///
    /// Writes are idempotent replacements keyed by request identity, so
    /// concurrent writers converge (last write wins).
    pub async fn put(&self, entry: &StoredResponse) -> Result<(), Error> {
        let name = self.name.clone();
        let entry = entry.clone();
        let headers_json = serde_json::to_string(&entry.headers).unwrap_or_else(|_| "[]".to_string());
        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO entries (store_name, key, method, url, status, headers_json, body, stored_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                     ON CONFLICT(store_name, key) DO UPDATE SET
                        method = excluded.method,
                        url = excluded.url,
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        name,
                        entry.key,
                        entry.method,
                        entry.url,
                        entry.status as i64,
                        headers_json,
                        entry.body,
                        entry.stored_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Insert a batch of entries in a single transaction.
    ///
    /// Either every entry lands or none does; warm-up relies on this to
    /// keep the shell cache all-or-nothing.
    pub async fn put_many(&self, entries: Vec<StoredResponse>) -> Result<(), Error> {
        let name = self.name.clone();
        let rows: Vec<(StoredResponse, String)> = entries
            .into_iter()
            .map(|entry| {
                let headers_json = serde_json::to_string(&entry.headers).unwrap_or_else(|_| "[]".to_string());
                (entry, headers_json)
            })
            .collect();
        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                for (entry, headers_json) in &rows {
                    tx.execute(
                        "INSERT INTO entries (store_name, key, method, url, status, headers_json, body, stored_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                         ON CONFLICT(store_name, key) DO UPDATE SET
                            method = excluded.method,
                            url = excluded.url,
                            status = excluded.status,
                            headers_json = excluded.headers_json,
                            body = excluded.body,
                            stored_at = excluded.stored_at",
                        params![
                            name,
                            entry.key,
                            entry.method,
                            entry.url,
                            entry.status as i64,
                            headers_json,
                            entry.body,
                            entry.stored_at,
                        ],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up an entry by key.
    ///
    /// Returns None if the key is not present in this store.
    pub async fn get(&self, key: &str) -> Result<Option<StoredResponse>, Error> {
        let name = self.name.clone();
        let key = key.to_string();
        self.db
            .conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT key, method, url, status, headers_json, body, stored_at
                     FROM entries WHERE store_name = ?1 AND key = ?2",
                )?;

                let result = stmt.query_row(params![name, key], |row| {
                    let headers_json: String = row.get(4)?;
                    let headers: Vec<(String, String)> = serde_json::from_str(&headers_json).unwrap_or_default();
                    Ok(StoredResponse {
                        key: row.get(0)?,
                        method: row.get(1)?,
                        url: row.get(2)?,
                        status: row.get::<_, i64>(3)? as u16,
                        headers,
                        body: row.get(5)?,
                        stored_at: row.get(6)?,
                    })
                });

                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Check whether an entry exists without reading its body.
    pub async fn contains(&self, key: &str) -> Result<bool, Error> {
        let name = self.name.clone();
        let key = key.to_string();
        self.db
            .conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn
                    .query_row(
                        "SELECT EXISTS(SELECT 1 FROM entries WHERE store_name = ?1 AND key = ?2)",
                        params![name, key],
                        |row| row.get(0),
                    )
                    .map_err(Error::from)?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in this store.
    pub async fn count(&self) -> Result<u64, Error> {
        let name = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE store_name = ?1",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

impl CacheDb {
    /// Enumerate every store name present in the database.
    pub async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM stores ORDER BY name")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a store and, via cascade, every entry it holds.
    pub async fn delete_store(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute("DELETE FROM stores WHERE name = ?1", params![name])?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::key::entry_key;

    fn make_entry(url: &str, status: u16) -> StoredResponse {
        StoredResponse {
            key: entry_key("GET", url),
            method: "GET".to_string(),
            url: url.to_string(),
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: b"{\"posts\":[]}".to_vec(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    async fn open_store(name: &str) -> (CacheDb, Store) {
        let db = CacheDb::open_in_memory().await.unwrap();
        let store = Store::new(db.clone(), name);
        store.ensure().await.unwrap();
        (db, store)
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let (_db, store) = open_store("inkgate-primary-v1").await;
        let entry = make_entry("http://localhost:4173/api/posts?page=1", 200);

        store.put(&entry).await.unwrap();

        let got = store.get(&entry.key).await.unwrap().unwrap();
        assert_eq!(got.url, entry.url);
        assert_eq!(got.status, 200);
        assert_eq!(got.headers, entry.headers);
        assert_eq!(got.body, entry.body);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let (_db, store) = open_store("inkgate-primary-v1").await;
        let got = store.get("nonexistent").await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn test_put_replaces_same_key() {
        let (_db, store) = open_store("inkgate-primary-v1").await;
        let mut entry = make_entry("http://localhost:4173/api/posts", 200);
        store.put(&entry).await.unwrap();

        entry.body = b"{\"posts\":[1]}".to_vec();
        store.put(&entry).await.unwrap();

        let got = store.get(&entry.key).await.unwrap().unwrap();
        assert_eq!(got.body, b"{\"posts\":[1]}");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_put_many_is_transactional() {
        let (_db, store) = open_store("inkgate-primary-v1").await;
        let entries = vec![
            make_entry("http://localhost:4173/", 200),
            make_entry("http://localhost:4173/offline.html", 200),
        ];
        store.put_many(entries).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_stores_are_isolated() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let v1 = Store::new(db.clone(), "inkgate-primary-v1");
        let v2 = Store::new(db.clone(), "inkgate-primary-v2");
        v1.ensure().await.unwrap();
        v2.ensure().await.unwrap();

        let entry = make_entry("http://localhost:4173/api/posts", 200);
        v1.put(&entry).await.unwrap();

        assert!(v1.get(&entry.key).await.unwrap().is_some());
        assert!(v2.get(&entry.key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_store_cascades() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let store = Store::new(db.clone(), "inkgate-primary-v1");
        store.ensure().await.unwrap();
        store
            .put(&make_entry("http://localhost:4173/api/posts", 200))
            .await
            .unwrap();

        db.delete_store("inkgate-primary-v1").await.unwrap();

        assert!(db.store_names().await.unwrap().is_empty());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_store_names_enumerates() {
        let db = CacheDb::open_in_memory().await.unwrap();
        for name in ["inkgate-primary-v1", "inkgate-media-v1"] {
            Store::new(db.clone(), name).ensure().await.unwrap();
        }
        let names = db.store_names().await.unwrap();
        assert_eq!(names, vec!["inkgate-media-v1", "inkgate-primary-v1"]);
    }

    #[tokio::test]
    async fn test_ensure_is_idempotent() {
        let (db, store) = open_store("inkgate-primary-v1").await;
        store.ensure().await.unwrap();
        assert_eq!(db.store_names().await.unwrap().len(), 1);
    }
}
