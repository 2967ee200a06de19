use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::db::ItemStore;
use crate::error::AppError;
use crate::models::{Item, ItemKind, Repeat};

/// SQLite-backed item collection. `save_all` replaces the table inside one transaction.
#[derive(Clone)]
pub struct SqliteItemStore {
    db: SqlitePool,
}

#[derive(Debug, FromRow)]
struct ItemRow {
    id: String,
    title: String,
    content: String,
    images: String,
    kind: String,
    remind_at: Option<String>,
    repeat_rule: String,
    last_reminded_at: Option<String>,
    created_at: String,
    updated_at: String,
    completed: bool,
}

impl TryFrom<ItemRow> for Item {
    type Error = AppError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        Ok(Item {
            images: serde_json::from_str(&row.images)?,
            kind: ItemKind::from_str(&row.kind)?,
            remind_at: row.remind_at.as_deref().map(parse_timestamp).transpose()?,
            repeat: Repeat::from_str(&row.repeat_rule)?,
            last_reminded_at: row.last_reminded_at.as_deref().map(parse_timestamp).transpose()?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            id: row.id,
            title: row.title,
            content: row.content,
            completed: row.completed,
        })
    }
}

impl SqliteItemStore {
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    /// Wraps an existing pool and brings its schema up to date.
    pub async fn with_pool(db: SqlitePool) -> Result<Self, AppError> {
        sqlx::migrate!("./migrations").run(&db).await?;
        Ok(Self { db })
    }
}

#[async_trait]
impl ItemStore for SqliteItemStore {
    async fn load_all(&self) -> Result<Vec<Item>, AppError> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, title, content, images, kind, remind_at, repeat_rule,
                last_reminded_at, created_at, updated_at, completed
            FROM items
            ORDER BY position ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Item::try_from).collect()
    }

    async fn save_all(&self, items: &[Item]) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM items").execute(&mut *tx).await?;

        for (position, item) in items.iter().enumerate() {
            let images = serde_json::to_string(&item.images)?;
            sqlx::query(
                r#"
                INSERT INTO items
                    (id, position, title, content, images, kind, remind_at, repeat_rule,
                    last_reminded_at, created_at, updated_at, completed)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                "#,
            )
            .bind(&item.id)
            .bind(position as i64)
            .bind(&item.title)
            .bind(&item.content)
            .bind(images)
            .bind(item.kind.as_str())
            .bind(item.remind_at.map(|t| t.to_rfc3339()))
            .bind(item.repeat.as_str())
            .bind(item.last_reminded_at.map(|t| t.to_rfc3339()))
            .bind(item.created_at.to_rfc3339())
            .bind(item.updated_at.to_rfc3339())
            .bind(item.completed)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("saved {} items to sqlite", items.len());
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("select 1").execute(&self.db).await?;
        Ok(())
    }
}

fn parse_timestamp(ts: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Validation(format!("invalid timestamp {ts}: {e}")))
}
