//! Blog post domain - read-only queries

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::documents::Slug;
use crate::services::image_url::ImageField;
use crate::services::sanity::{self, ContentStore, SanityError};

pub const POSTS_QUERY: &str = r#"*[_type == "post" && defined(slug.current)] | order(_createdAt desc) {
  _id,
  title,
  slug,
  _createdAt,
  excerpt,
  coverImage,
  "author": author->{name, image}
}"#;

pub const POST_QUERY: &str = r#"*[_type == "post" && slug.current == $slug][0] {
  _id,
  title,
  slug,
  _createdAt,
  body,
  excerpt,
  coverImage,
  "author": author->{name, image}
}"#;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: Option<String>,
    pub slug: Slug,
    #[serde(rename = "_createdAt")]
    pub created_at: DateTime<Utc>,
    pub excerpt: Option<String>,
    pub cover_image: Option<ImageField>,
    /// Portable text blocks, passed through untouched
    #[serde(default)]
    pub body: Option<Value>,
    pub author: Option<Author>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Author {
    pub name: Option<String>,
    pub image: Option<ImageField>,
}

/// List published posts, newest first
pub async fn list_posts(store: &dyn ContentStore) -> Result<Vec<Post>, SanityError> {
    let result = store.fetch(POSTS_QUERY, &[]).await?;
    if result.is_null() {
        return Ok(Vec::new());
    }
    sanity::decode(result)
}

/// Get one post (with body) by slug
pub async fn get_post_by_slug(
    store: &dyn ContentStore,
    slug: &str,
) -> Result<Option<Post>, SanityError> {
    let result = store.fetch(POST_QUERY, &[("slug", Value::from(slug))]).await?;
    sanity::decode(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::sanity::testing::FakeStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_posts_decodes_projection() {
        let store = FakeStore::returning(json!([
            {
                "_id": "p1",
                "title": "Comiket report",
                "slug": { "_type": "slug", "current": "comiket-report" },
                "_createdAt": "2025-01-02T03:04:05Z",
                "excerpt": null,
                "coverImage": { "_type": "image", "asset": { "_ref": "image-abc-10x20-png", "_type": "reference" } },
                "author": { "name": "Editor", "image": null }
            }
        ]));

        let posts = list_posts(&store).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug.current, "comiket-report");
        assert!(posts[0].body.is_none());
        assert_eq!(
            posts[0].author.as_ref().and_then(|a| a.name.as_deref()),
            Some("Editor")
        );
        assert_eq!(store.fetch_calls()[0].0, POSTS_QUERY);
    }

    #[tokio::test]
    async fn test_get_post_missing() {
        let store = FakeStore::returning(Value::Null);
        assert!(get_post_by_slug(&store, "nope").await.unwrap().is_none());
    }
}
