use async_trait::async_trait;
use uuid::Uuid;

use crate::Result;

use super::PostgresRepo;

/// Per-post view tracking. Deduplication is this collaborator's concern:
/// a `(post_id, visitor_key)` pair counts once no matter how often it is
/// recorded.
#[async_trait]
pub trait HitsRepository: Send + Sync {
    async fn record_view(&self, post_id: Uuid, visitor_key: &str) -> Result<()>;
    async fn count_hits(&self, post_id: Uuid) -> Result<i64>;
}

#[async_trait]
impl HitsRepository for PostgresRepo {
    async fn record_view(&self, post_id: Uuid, visitor_key: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO post_hits (id, post_id, visitor_key)
            VALUES ($1, $2, $3)
            ON CONFLICT (post_id, visitor_key) DO NOTHING
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(post_id)
        .bind(visitor_key)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count_hits(&self, post_id: Uuid) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM post_hits WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
