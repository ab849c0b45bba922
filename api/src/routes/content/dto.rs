//! API response DTOs for store content

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::constants::{AVATAR_SIZE_PX, COVER_HEIGHT_PX, COVER_WIDTH_PX};
use crate::domain::cosplayers::{Cosplayer, SocialLinks};
use crate::domain::posts::{Author, Post};
use crate::services::image_url::ImageUrlBuilder;

/// Cosplayer card, image refs resolved to CDN URLs
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CosplayerResponse {
    pub id: String,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub twitter_username: Option<String>,
    /// Uploaded avatar when present, otherwise the external URL saved at creation
    pub avatar_url: Option<String>,
    pub cover_url: Option<String>,
    pub bio: Option<String>,
    pub tags: Vec<String>,
    pub followers_count: u64,
    pub following_count: u64,
    pub social_links: Option<SocialLinks>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl CosplayerResponse {
    pub fn new(c: Cosplayer, images: &ImageUrlBuilder) -> Self {
        let avatar_url = c
            .profile_image
            .as_ref()
            .and_then(|img| images.url_for(img, Some(AVATAR_SIZE_PX), Some(AVATAR_SIZE_PX)))
            .or(c.profile_image_url);
        let cover_url = c
            .cover_image
            .as_ref()
            .and_then(|img| images.url_for(img, Some(COVER_WIDTH_PX), Some(COVER_HEIGHT_PX)));

        Self {
            id: c.id,
            name: c.name,
            slug: c.slug.map(|s| s.current),
            twitter_username: c.twitter_username,
            avatar_url,
            cover_url,
            bio: c.bio,
            tags: c.tags.unwrap_or_default(),
            followers_count: whole_count(c.followers_count),
            following_count: whole_count(c.following_count),
            social_links: c.social_links,
            last_updated: c.last_updated,
        }
    }
}

/// Counts are free-form numbers in the store: floor them, negatives become 0
fn whole_count(value: Option<f64>) -> u64 {
    value
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v.floor() as u64)
        .unwrap_or(0)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    pub name: Option<String>,
    pub image_url: Option<String>,
}

impl AuthorResponse {
    fn new(a: Author, images: &ImageUrlBuilder) -> Self {
        Self {
            name: a.name,
            image_url: a.image.as_ref().and_then(|img| images.url_for(img, None, None)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub title: Option<String>,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub excerpt: Option<String>,
    pub cover_url: Option<String>,
    /// Only present on single-post reads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    pub author: Option<AuthorResponse>,
}

impl PostResponse {
    pub fn new(p: Post, images: &ImageUrlBuilder) -> Self {
        Self {
            id: p.id,
            title: p.title,
            slug: p.slug.current,
            created_at: p.created_at,
            excerpt: p.excerpt,
            cover_url: p
                .cover_image
                .as_ref()
                .and_then(|img| images.url_for(img, Some(COVER_WIDTH_PX), Some(COVER_HEIGHT_PX))),
            body: p.body,
            author: p.author.map(|a| AuthorResponse::new(a, images)),
        }
    }
}
