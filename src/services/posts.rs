use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::{
    models::{
        posts::{CreatePostDto, Post, PostDetail, PostPage, UpdatePostDto},
        users::User,
    },
    repositories::{
        hits_repo::HitsRepository, posts_repo::PostsRepository, user_repo::UserRepository,
    },
    Error, Result,
};

/// Posts are listed in fixed windows of five, newest first.
pub const POSTS_PER_PAGE: i64 = 5;
/// How many of the newest posts ride along with a post detail.
const RECENT_POSTS: i64 = 5;

/// Decides whether `actor` may modify `post`. Anonymous actors are sent to
/// login; authenticated actors other than the post's author are refused.
pub fn authorize_author<'a>(actor: Option<&'a User>, post: &Post) -> Result<&'a User> {
    let actor = actor.ok_or(Error::AuthenticationRequired)?;
    if actor.id != post.author_id {
        return Err(Error::Forbidden);
    }
    Ok(actor)
}

#[derive(Clone)]
pub struct PostsService {
    posts: Arc<dyn PostsRepository>,
    users: Arc<dyn UserRepository>,
    hits: Arc<dyn HitsRepository>,
}

impl PostsService {
    pub fn new(
        posts: Arc<dyn PostsRepository>,
        users: Arc<dyn UserRepository>,
        hits: Arc<dyn HitsRepository>,
    ) -> Self {
        Self { posts, users, hits }
    }

    pub async fn list_posts(&self, page: i64) -> Result<PostPage> {
        let total_posts = self.posts.count_posts().await?;
        let (offset, total_pages) = page_window(page, total_posts)?;

        let posts = self.posts.list_posts(POSTS_PER_PAGE, offset).await?;

        Ok(PostPage {
            posts,
            page,
            total_pages,
            total_posts,
        })
    }

    pub async fn list_posts_by_author(&self, username: &str, page: i64) -> Result<PostPage> {
        let author = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(Error::NotFound)?;

        let total_posts = self.posts.count_posts_by_author(author.id).await?;
        let (offset, total_pages) = page_window(page, total_posts)?;

        let posts = self
            .posts
            .list_posts_by_author(author.id, POSTS_PER_PAGE, offset)
            .await?;

        Ok(PostPage {
            posts,
            page,
            total_pages,
            total_posts,
        })
    }

    /// Fetches one post and records the visit. A failed recording is logged
    /// and swallowed; the read itself must not suffer for it.
    pub async fn get_post(&self, post_id: Uuid, visitor_key: Option<&str>) -> Result<PostDetail> {
        let post = self.posts.find_post(post_id).await?.ok_or(Error::NotFound)?;

        if let Some(key) = visitor_key {
            if let Err(err) = self.hits.record_view(post.id, key).await {
                debug!(%post_id, "failed to record view: {:?}", err);
            }
        }

        let hits = self.hits.count_hits(post.id).await?;
        let recent_posts = self.posts.list_posts(RECENT_POSTS, 0).await?;

        Ok(PostDetail {
            post,
            hits,
            recent_posts,
        })
    }

    pub async fn create_post(&self, actor: Option<&User>, new_post: CreatePostDto) -> Result<Post> {
        let actor = actor.ok_or(Error::AuthenticationRequired)?;

        self.posts
            .create_post(actor.id, &new_post.title, &new_post.content)
            .await
    }

    pub async fn update_post(
        &self,
        actor: Option<&User>,
        post_id: Uuid,
        update: UpdatePostDto,
    ) -> Result<Post> {
        let post = self.posts.find_post(post_id).await?.ok_or(Error::NotFound)?;
        let actor = authorize_author(actor, &post)?;

        self.posts
            .update_post(
                post.id,
                actor.id,
                update.title.as_deref(),
                update.content.as_deref(),
            )
            .await
    }

    pub async fn delete_post(&self, actor: Option<&User>, post_id: Uuid) -> Result<()> {
        let post = self.posts.find_post(post_id).await?.ok_or(Error::NotFound)?;
        authorize_author(actor, &post)?;

        self.posts.delete_post(post.id).await
    }
}

/// Maps a 1-based page onto an offset, with the paginator's rules: page 1 is
/// always addressable, anything past the last page is a miss.
fn page_window(page: i64, total: i64) -> Result<(i64, i64)> {
    let total_pages = ((total + POSTS_PER_PAGE - 1) / POSTS_PER_PAGE).max(1);
    if page < 1 || page > total_pages {
        return Err(Error::NotFound);
    }

    Ok(((page - 1) * POSTS_PER_PAGE, total_pages))
}
