use chrono::Utc;
use serde_json::Value;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use super::SqliteDocumentStore;
use crate::document::{Document, merge_patch};
use crate::repository::{DocumentStore, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn conn(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn parse_body(raw: &str) -> Result<Document, StorageError> {
    match serde_json::from_str::<Value>(raw).map_err(ser)? {
        Value::Object(map) => Ok(map),
        other => Err(StorageError::Serialization(format!(
            "stored body is not an object: {other}"
        ))),
    }
}

fn encode_body(document: &Document) -> Result<String, StorageError> {
    serde_json::to_string(document).map_err(ser)
}

async fn merge_into(
    connection: &mut SqliteConnection,
    collection: &str,
    id: &str,
    patch: Document,
) -> Result<(), StorageError> {
    let existing = sqlx::query(
        r"
            SELECT body
            FROM documents
            WHERE collection = ?1 AND id = ?2
        ",
    )
    .bind(collection)
    .bind(id)
    .fetch_optional(&mut *connection)
    .await
    .map_err(conn)?;

    let mut document = match existing {
        Some(row) => parse_body(&row.try_get::<String, _>("body").map_err(ser)?)?,
        None => Document::new(),
    };
    merge_patch(&mut document, patch);
    let now = Utc::now();

    sqlx::query(
        r"
            INSERT INTO documents (collection, id, body, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT(collection, id) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at
        ",
    )
    .bind(collection)
    .bind(id)
    .bind(encode_body(&document)?)
    .bind(now)
    .execute(&mut *connection)
    .await
    .map_err(conn)?;
    Ok(())
}

#[async_trait::async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT body
                FROM documents
                WHERE collection = ?1 AND id = ?2
            ",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.map(|row| parse_body(&row.try_get::<String, _>("body").map_err(ser)?))
            .transpose()
    }

    async fn list_documents(
        &self,
        collection: &str,
    ) -> Result<Vec<(String, Document)>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, body
                FROM documents
                WHERE collection = ?1
                ORDER BY id ASC
            ",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter()
            .map(|row| {
                let id: String = row.try_get("id").map_err(ser)?;
                let body: String = row.try_get("body").map_err(ser)?;
                Ok((id, parse_body(&body)?))
            })
            .collect()
    }

    async fn upsert_document(
        &self,
        collection: &str,
        id: &str,
        patch: Document,
    ) -> Result<(), StorageError> {
        // BEGIN IMMEDIATE takes the write lock before the read, so a
        // concurrent patch waits on busy_timeout instead of failing the
        // deferred lock upgrade.
        let mut connection = self.pool.acquire().await.map_err(conn)?;
        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *connection)
            .await
            .map_err(conn)?;

        match merge_into(&mut *connection, collection, id, patch).await {
            Ok(()) => {
                sqlx::query("COMMIT")
                    .execute(&mut *connection)
                    .await
                    .map_err(conn)?;
                Ok(())
            }
            Err(error) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *connection).await;
                Err(error)
            }
        }
    }

    async fn add_document(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<String, StorageError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let res = sqlx::query(
            r"
                INSERT INTO documents (collection, id, body, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?4)
                ON CONFLICT(collection, id) DO NOTHING
            ",
        )
        .bind(collection)
        .bind(&id)
        .bind(encode_body(&document)?)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::Conflict);
        }
        Ok(id)
    }
}
