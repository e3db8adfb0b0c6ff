use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    models::{posts::Post, users::User},
    Error, Result,
};

use super::{hits_repo::HitsRepository, posts_repo::PostsRepository, user_repo::UserRepository};

/// In-memory stand-ins for the Postgres repositories, close enough to their
/// semantics to drive the service-level tests.
#[derive(Default)]
pub struct InMemoryRepo {
    posts: Mutex<Vec<Post>>,
    users: Mutex<Vec<User>>,
    hits: Mutex<HashSet<(Uuid, String)>>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    pub fn add_post(&self, post: Post) {
        self.posts.lock().unwrap().push(post);
    }
}

#[async_trait]
impl PostsRepository for InMemoryRepo {
    async fn list_posts(&self, limit: i64, offset: i64) -> Result<Vec<Post>> {
        let mut posts = self.posts.lock().unwrap().clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(posts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn list_posts_by_author(
        &self,
        author_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|post| post.author_id == author_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(posts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_posts(&self) -> Result<i64> {
        Ok(self.posts.lock().unwrap().len() as i64)
    }

    async fn count_posts_by_author(&self, author_id: Uuid) -> Result<i64> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|post| post.author_id == author_id)
            .count() as i64)
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|post| post.id == post_id)
            .cloned())
    }

    async fn create_post(&self, author_id: Uuid, title: &str, content: &str) -> Result<Post> {
        let author_name = self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.id == author_id)
            .map(|user| user.username.clone())
            .ok_or(Error::InternalServerError)?;

        let post = Post {
            id: Uuid::now_v7(),
            author_id,
            author_name,
            title: title.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.posts.lock().unwrap().push(post.clone());

        Ok(post)
    }

    async fn update_post(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Post> {
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .iter_mut()
            .find(|post| post.id == post_id)
            .ok_or(Error::InternalServerError)?;

        if let Some(title) = title {
            post.title = title.to_string();
        }
        if let Some(content) = content {
            post.content = content.to_string();
        }
        post.author_id = author_id;

        Ok(post.clone())
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<()> {
        self.posts.lock().unwrap().retain(|post| post.id != post_id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryRepo {
    async fn create_user(&self, username: &str, email: &str, password_hash: &str) -> Result<User> {
        let user = User {
            id: Uuid::now_v7(),
            username: username.to_string(),
            email: email.to_string(),
            password: password_hash.to_string(),
            created_at: Utc::now(),
        };
        self.users.lock().unwrap().push(user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.id == user_id)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.email == email)
            .cloned())
    }
}

#[async_trait]
impl HitsRepository for InMemoryRepo {
    async fn record_view(&self, post_id: Uuid, visitor_key: &str) -> Result<()> {
        self.hits
            .lock()
            .unwrap()
            .insert((post_id, visitor_key.to_string()));

        Ok(())
    }

    async fn count_hits(&self, post_id: Uuid) -> Result<i64> {
        Ok(self
            .hits
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == post_id)
            .count() as i64)
    }
}
