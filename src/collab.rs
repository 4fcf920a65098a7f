//! Interfaces to the hosted generative services the app leans on.
//!
//! No client ships here. The helpers wrap a collaborator with the fallbacks
//! the UI relies on, so a failed call degrades to a fixed string or nothing.
//! None of these calls touch the account store or session.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub const EMPTY_TEXT_FALLBACK: &str = "Could not generate content at this time.";
pub const FAILED_TEXT_FALLBACK: &str = "Error generating post content.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollabError {
    #[error("collaborator request failed: {0}")]
    Request(String),
    #[error("collaborator returned an unusable response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, topic: &str) -> Result<String, CollabError>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Encoded image bytes, or `None` when the model produced no image
    async fn generate(&self, prompt: &str) -> Result<Option<Vec<u8>>, CollabError>;
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SourceLink {
    pub uri: String,
    pub title: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub text: String,
    pub links: Vec<SourceLink>,
}

#[async_trait]
pub trait SearchGrounding: Send + Sync {
    async fn search(&self, query: &str) -> Result<Option<SearchResult>, CollabError>;
}

/// Post text for `topic`, never failing
pub async fn post_text_or_fallback(generator: &dyn TextGenerator, topic: &str) -> String {
    match generator.generate(topic).await {
        Ok(text) if text.trim().is_empty() => EMPTY_TEXT_FALLBACK.to_string(),
        Ok(text) => text,
        Err(e) => {
            warn!("Text generation failed: {}", e);
            FAILED_TEXT_FALLBACK.to_string()
        }
    }
}

pub async fn image_or_none(generator: &dyn ImageGenerator, prompt: &str) -> Option<Vec<u8>> {
    match generator.generate(prompt).await {
        Ok(image) => image,
        Err(e) => {
            warn!("Image generation failed: {}", e);
            None
        }
    }
}

/// Blank queries are never sent
pub async fn search_or_none(search: &dyn SearchGrounding, query: &str) -> Option<SearchResult> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    match search.search(query).await {
        Ok(result) => result,
        Err(e) => {
            warn!("Search grounding failed: {}", e);
            None
        }
    }
}

/// Three stylistically different thumbnails for a search, requested concurrently.
/// Failed or empty generations are skipped.
pub async fn search_thumbnails(generator: &dyn ImageGenerator, query: &str) -> Vec<Vec<u8>> {
    let minimal = format!("A clean, minimalist thumbnail representing {}, cinematic style.", query);
    let close_up = format!("A detailed close-up conceptual photography related to {}.", query);
    let artistic = format!("An artistic, modern digital illustration of {}.", query);

    let (a, b, c) = tokio::join!(
        image_or_none(generator, &minimal),
        image_or_none(generator, &close_up),
        image_or_none(generator, &artistic),
    );
    [a, b, c].into_iter().flatten().collect()
}
