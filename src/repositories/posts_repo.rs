use async_trait::async_trait;
use uuid::Uuid;

use crate::{models::posts::Post, Error, Result};

use super::PostgresRepo;

#[async_trait]
pub trait PostsRepository: Send + Sync {
    async fn list_posts(&self, limit: i64, offset: i64) -> Result<Vec<Post>>;
    async fn list_posts_by_author(
        &self,
        author_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>>;
    async fn count_posts(&self) -> Result<i64>;
    async fn count_posts_by_author(&self, author_id: Uuid) -> Result<i64>;
    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>>;
    async fn create_post(&self, author_id: Uuid, title: &str, content: &str) -> Result<Post>;
    async fn update_post(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Post>;
    async fn delete_post(&self, post_id: Uuid) -> Result<()>;
}

#[async_trait]
impl PostsRepository for PostgresRepo {
    async fn list_posts(&self, limit: i64, offset: i64) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.author_id, u.username AS author_name, p.title, p.content, p.created_at
            FROM posts p
            JOIN users u ON u.id = p.author_id
            ORDER BY p.created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn list_posts_by_author(
        &self,
        author_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.author_id, u.username AS author_name, p.title, p.content, p.created_at
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.author_id = $1
            ORDER BY p.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn count_posts(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_posts_by_author(&self, author_id: Uuid) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.author_id, u.username AS author_name, p.title, p.content, p.created_at
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn create_post(&self, author_id: Uuid, title: &str, content: &str) -> Result<Post> {
        let id = Uuid::now_v7();

        sqlx::query(
            r#"
            INSERT INTO posts (id, author_id, title, content)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id)
        .bind(author_id)
        .bind(title)
        .bind(content)
        .execute(&self.pool)
        .await?;

        self.find_post(id).await?.ok_or(Error::InternalServerError)
    }

    async fn update_post(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Post> {
        sqlx::query(
            r#"
            UPDATE posts
            SET title = COALESCE($3, title),
                content = COALESCE($4, content),
                author_id = $2
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(title)
        .bind(content)
        .execute(&self.pool)
        .await?;

        self.find_post(post_id)
            .await?
            .ok_or(Error::InternalServerError)
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
