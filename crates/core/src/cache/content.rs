//! Content store backed by the `precache_content` table.

use async_trait::async_trait;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

use super::connection::CacheDb;
use crate::Error;
use crate::store::{ContentStore, StoredResponse};

#[async_trait]
impl ContentStore for CacheDb {
    /// Insert or replace a stored response.
    ///
    /// Uses UPSERT semantics: inserts if the URL doesn't exist,
    /// updates all fields if it does.
    async fn put_response(&self, response: &StoredResponse) -> Result<(), Error> {
        let response = response.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO precache_content (
                        url, status_code, content_type, headers_json, body, digest, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    ON CONFLICT(url) DO UPDATE SET
                        status_code = excluded.status_code,
                        content_type = excluded.content_type,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        digest = excluded.digest,
                        stored_at = excluded.stored_at",
                    params![
                        &response.url,
                        i64::from(response.status_code),
                        &response.content_type,
                        &response.headers_json,
                        &response.body,
                        &response.digest,
                        &response.stored_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn get_response(&self, url: &str) -> Result<Option<StoredResponse>, Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url, status_code, content_type, headers_json, body, digest, stored_at
                    FROM precache_content WHERE url = ?1",
                )?;

                let result = stmt.query_row(params![url], |row| {
                    Ok(StoredResponse {
                        url: row.get(0)?,
                        status_code: row.get(1)?,
                        content_type: row.get(2)?,
                        headers_json: row.get(3)?,
                        body: row.get(4)?,
                        digest: row.get(5)?,
                        stored_at: row.get(6)?,
                    })
                });

                match result {
                    Ok(response) => Ok(Some(response)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn delete_response(&self, url: &str) -> Result<(), Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute("DELETE FROM precache_content WHERE url = ?1", params![url])?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn response_urls(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT url FROM precache_content ORDER BY url")?;
                let urls = stmt.query_map([], |row| row.get(0))?.collect::<Result<Vec<String>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }
}
