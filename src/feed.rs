//! In-memory timeline: posts, likes and comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::account::{Profile, ProfileId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("Post not found: {0}")]
    PostNotFound(String),
    #[error("A post needs text or an image.")]
    EmptyPost,
    #[error("A comment cannot be empty.")]
    EmptyComment,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub user_id: ProfileId,
    pub user_name: String,
    pub user_avatar: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub user_id: ProfileId,
    pub user_name: String,
    pub user_handle: String,
    pub user_avatar: String,
    pub content: String,
    pub image: Option<String>,
    pub likes: u64,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub is_liked: bool,
}

/// Posts, newest first
#[derive(Default)]
pub struct Feed {
    posts: Vec<Post>,
}

impl Feed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_post(
        &mut self,
        author: &Profile,
        content: &str,
        image: Option<String>,
    ) -> Result<Post, FeedError> {
        let content = content.trim();
        if content.is_empty() && image.is_none() {
            return Err(FeedError::EmptyPost);
        }

        let post = Post {
            id: Uuid::new_v4().to_string(),
            user_id: author.id.clone(),
            user_name: author.display_name.clone(),
            user_handle: author.handle.clone(),
            user_avatar: author.avatar_url.clone(),
            content: content.to_string(),
            image,
            likes: 0,
            comments: Vec::new(),
            created_at: Utc::now(),
            is_liked: false,
        };
        debug!("{} posted {}", author.handle, post.id);
        self.posts.insert(0, post.clone());
        Ok(post)
    }

    /// Flip the viewer's like on a post
    pub fn toggle_like(&mut self, post_id: &str) -> Result<&Post, FeedError> {
        let post = self.post_mut(post_id)?;
        if post.is_liked {
            post.likes = post.likes.saturating_sub(1);
        } else {
            post.likes += 1;
        }
        post.is_liked = !post.is_liked;
        Ok(&*post)
    }

    pub fn add_comment(
        &mut self,
        post_id: &str,
        author: &Profile,
        text: &str,
    ) -> Result<Comment, FeedError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(FeedError::EmptyComment);
        }
        let post = self.post_mut(post_id)?;

        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            user_id: author.id.clone(),
            user_name: author.display_name.clone(),
            user_avatar: author.avatar_url.clone(),
            text: text.to_string(),
            created_at: Utc::now(),
        };
        post.comments.push(comment.clone());
        Ok(comment)
    }

    pub fn get(&self, post_id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == post_id)
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    fn post_mut(&mut self, post_id: &str) -> Result<&mut Post, FeedError> {
        self.posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| FeedError::PostNotFound(post_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author() -> Profile {
        Profile {
            id: "author-1".to_string(),
            display_name: "Ann".to_string(),
            handle: "@ann".to_string(),
            avatar_url: "https://picsum.photos/seed/ann/200/200".to_string(),
            cover_image_url: String::new(),
            bio: String::new(),
            follower_count: 0,
            following_count: 0,
        }
    }

    #[test]
    fn test_new_posts_go_first() {
        let mut feed = Feed::new();
        let first = feed.create_post(&author(), "first", None).unwrap();
        let second = feed.create_post(&author(), "  second  ", None).unwrap();

        assert_eq!(second.content, "second");
        assert_eq!(second.user_handle, "@ann");
        let ids: Vec<_> = feed.posts().iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_empty_post_rejected_unless_it_has_an_image() {
        let mut feed = Feed::new();
        assert_eq!(feed.create_post(&author(), "   ", None), Err(FeedError::EmptyPost));
        assert!(feed
            .create_post(&author(), "", Some("data:image/png;base64,AAAA".to_string()))
            .is_ok());
    }

    #[test]
    fn test_toggle_like() {
        let mut feed = Feed::new();
        let post = feed.create_post(&author(), "hello", None).unwrap();

        let liked = feed.toggle_like(&post.id).unwrap();
        assert!(liked.is_liked);
        assert_eq!(liked.likes, 1);

        let unliked = feed.toggle_like(&post.id).unwrap();
        assert!(!unliked.is_liked);
        assert_eq!(unliked.likes, 0);

        assert_eq!(
            feed.toggle_like("missing").unwrap_err(),
            FeedError::PostNotFound("missing".to_string())
        );
    }

    #[test]
    fn test_comments_append_in_order() {
        let mut feed = Feed::new();
        let post = feed.create_post(&author(), "hello", None).unwrap();

        feed.add_comment(&post.id, &author(), "one").unwrap();
        feed.add_comment(&post.id, &author(), "two").unwrap();
        assert_eq!(feed.add_comment(&post.id, &author(), " "), Err(FeedError::EmptyComment));

        let texts: Vec<_> = feed.get(&post.id).unwrap().comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);
    }
}
