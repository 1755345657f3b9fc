//! Revision ledger backed by the `precache_revisions` table.

use async_trait::async_trait;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

use super::connection::CacheDb;
use crate::Error;
use crate::store::RevisionLedger;

#[async_trait]
impl RevisionLedger for CacheDb {
    async fn get_revision(&self, url: &str) -> Result<Option<String>, Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let result = conn.query_row(
                    "SELECT revision FROM precache_revisions WHERE url = ?1",
                    params![url],
                    |row| row.get(0),
                );

                match result {
                    Ok(revision) => Ok(Some(revision)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Uses UPSERT semantics; the last writer wins.
    async fn set_revision(&self, url: &str, revision: &str) -> Result<(), Error> {
        let url = url.to_string();
        let revision = revision.to_string();
        let installed_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO precache_revisions (url, revision, installed_at)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT(url) DO UPDATE SET
                        revision = excluded.revision,
                        installed_at = excluded.installed_at",
                    params![url, revision, installed_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn delete_revision(&self, url: &str) -> Result<(), Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute("DELETE FROM precache_revisions WHERE url = ?1", params![url])?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn revision_urls(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT url FROM precache_revisions ORDER BY url")?;
                let urls = stmt.query_map([], |row| row.get(0))?.collect::<Result<Vec<String>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get_revision() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.set_revision("https://example.com/a.js", "1").await.unwrap();

        let revision = db.get_revision("https://example.com/a.js").await.unwrap();
        assert_eq!(revision.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_get_missing_revision() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.get_revision("https://example.com/none.js").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_revision_overwrites() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.set_revision("https://example.com/a.js", "1").await.unwrap();
        db.set_revision("https://example.com/a.js", "2").await.unwrap();

        assert_eq!(db.get_revision("https://example.com/a.js").await.unwrap().as_deref(), Some("2"));
        assert_eq!(db.revision_urls().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_revision() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.set_revision("https://example.com/a.js", "1").await.unwrap();
        db.set_revision("https://example.com/b.js", "1").await.unwrap();

        db.delete_revision("https://example.com/a.js").await.unwrap();
        db.delete_revision("https://example.com/missing.js").await.unwrap();

        assert_eq!(db.revision_urls().await.unwrap(), vec!["https://example.com/b.js".to_string()]);
    }

    #[tokio::test]
    async fn test_clones_share_ledger() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let other = db.clone();
        db.set_revision("https://example.com/a.js", "1").await.unwrap();
        assert_eq!(other.get_revision("https://example.com/a.js").await.unwrap().as_deref(), Some("1"));
    }
}
