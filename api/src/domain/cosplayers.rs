//! Cosplayer domain - queries and document creation against the content store
//!
//! Read functions run fixed GROQ projections; `create_cosplayer` builds one
//! `cosplayer` document from a client draft and submits it exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use super::documents::Slug;
use crate::constants::{COSPLAYER_DOC_TYPE, TWITTER_PROFILE_URL_BASE};
use crate::services::image_url::ImageField;
use crate::services::sanity::{self, ContentStore, SanityError};

pub const COSPLAYERS_QUERY: &str = r#"*[_type == "cosplayer" && isActive != false] | order(_createdAt desc) {
  _id,
  name,
  slug,
  twitterUsername,
  profileImage,
  profileImageUrl,
  coverImage,
  bio,
  tags,
  followersCount,
  followingCount,
  socialLinks,
  lastUpdated
}"#;

pub const COSPLAYER_BY_SLUG_QUERY: &str = r#"*[_type == "cosplayer" && slug.current == $slug][0] {
  _id,
  name,
  slug,
  twitterUsername,
  profileImage,
  profileImageUrl,
  coverImage,
  bio,
  tags,
  followersCount,
  followingCount,
  socialLinks,
  lastUpdated
}"#;

/// Missing fields come back as `null` from projections, hence the Options.
/// Required-ness is only enforced by the editing studio, so documents created
/// over the API may lack a name, and count fields are plain JSON numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cosplayer {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: Option<String>,
    pub slug: Option<Slug>,
    pub twitter_username: Option<String>,
    pub profile_image: Option<ImageField>,
    pub profile_image_url: Option<String>,
    pub cover_image: Option<ImageField>,
    pub bio: Option<String>,
    pub tags: Option<Vec<String>>,
    pub followers_count: Option<f64>,
    pub following_count: Option<f64>,
    pub social_links: Option<SocialLinks>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialLinks {
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// List active cosplayers, newest first
pub async fn list_cosplayers(store: &dyn ContentStore) -> Result<Vec<Cosplayer>, SanityError> {
    let result = store.fetch(COSPLAYERS_QUERY, &[]).await?;
    if result.is_null() {
        return Ok(Vec::new());
    }
    sanity::decode(result)
}

/// Get one cosplayer by slug
pub async fn get_cosplayer_by_slug(
    store: &dyn ContentStore,
    slug: &str,
) -> Result<Option<Cosplayer>, SanityError> {
    let result = store
        .fetch(COSPLAYER_BY_SLUG_QUERY, &[("slug", Value::from(slug))])
        .await?;
    sanity::decode(result)
}

// ============================================================================
// Profile creation
// ============================================================================

/// Profile fields collected by the client before submission
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileDraft {
    pub name: Option<String>,
    pub twitter_username: Option<String>,
    pub bio: Option<String>,
    pub followers_count: Option<u64>,
    pub following_count: Option<u64>,
    pub profile_image_url: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// The document written to the store
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CosplayerDocument {
    #[serde(rename = "_type")]
    pub doc_type: &'static str,
    pub name: String,
    pub slug: Slug,
    pub twitter_username: String,
    pub bio: String,
    pub followers_count: u64,
    pub following_count: u64,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub last_updated: DateTime<Utc>,
    pub social_links: SocialLinks,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

#[derive(Debug)]
pub enum PersistError {
    Validation(String),
    /// The store rejected the document as a uniqueness violation
    Duplicate(SanityError),
    Store(SanityError),
    Encode(serde_json::Error),
}

impl std::fmt::Display for PersistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistError::Validation(s) => write!(f, "{}", s),
            PersistError::Duplicate(e) => write!(f, "Duplicate cosplayer: {}", e),
            PersistError::Store(e) => write!(f, "{}", e),
            PersistError::Encode(e) => write!(f, "Failed to encode document: {}", e),
        }
    }
}

impl std::error::Error for PersistError {}

/// Build the document for a draft. The slug is derived here, once, from the name.
/// Only a blank name or username is rejected.
pub fn build_document(draft: ProfileDraft, now: DateTime<Utc>) -> Result<CosplayerDocument, PersistError> {
    let name = non_empty(draft.name);
    let twitter_username = non_empty(draft.twitter_username);
    let (Some(name), Some(twitter_username)) = (name, twitter_username) else {
        return Err(PersistError::Validation(
            "Name and Twitter username are required".into(),
        ));
    };

    // Transliterates non-ASCII names (ゆき -> yuki)
    let slug = slug::slugify(&name);

    let twitter_url = format!("{}/{}", TWITTER_PROFILE_URL_BASE, twitter_username);

    Ok(CosplayerDocument {
        doc_type: COSPLAYER_DOC_TYPE,
        name,
        slug: Slug::new(slug),
        twitter_username,
        bio: draft.bio.unwrap_or_default(),
        followers_count: draft.followers_count.unwrap_or(0),
        following_count: draft.following_count.unwrap_or(0),
        tags: dedup_tags(draft.tags.unwrap_or_default()),
        is_active: true,
        last_updated: now,
        social_links: SocialLinks {
            twitter: Some(twitter_url),
            ..Default::default()
        },
        profile_image_url: non_empty(draft.profile_image_url),
    })
}

/// Create one cosplayer document. No existence check, no retry: submitting the
/// same draft twice creates two documents unless the store refuses.
pub async fn create_cosplayer(
    store: &dyn ContentStore,
    draft: ProfileDraft,
    now: DateTime<Utc>,
) -> Result<Value, PersistError> {
    let document = build_document(draft, now)?;
    let payload = serde_json::to_value(&document).map_err(PersistError::Encode)?;

    store.create(payload).await.map_err(|e| {
        if e.to_string().contains("unique") {
            PersistError::Duplicate(e)
        } else {
            PersistError::Store(e)
        }
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trimmed, non-empty, first occurrence wins
fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::sanity::testing::FakeStore;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn draft(name: &str, username: &str) -> ProfileDraft {
        ProfileDraft {
            name: Some(name.into()),
            twitter_username: Some(username.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_document_defaults() {
        let doc = build_document(draft("Yuki Tanaka", "yuki_cos"), now()).unwrap();
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(
            value,
            json!({
                "_type": "cosplayer",
                "name": "Yuki Tanaka",
                "slug": { "_type": "slug", "current": "yuki-tanaka" },
                "twitterUsername": "yuki_cos",
                "bio": "",
                "followersCount": 0,
                "followingCount": 0,
                "tags": [],
                "isActive": true,
                "lastUpdated": "2025-03-01T12:00:00Z",
                "socialLinks": { "twitter": "https://twitter.com/yuki_cos" }
            })
        );
    }

    #[test]
    fn test_build_document_full_draft() {
        let draft = ProfileDraft {
            name: Some("Rin".into()),
            twitter_username: Some("rin".into()),
            bio: Some("Cosplay from Osaka".into()),
            followers_count: Some(12_000),
            following_count: Some(300),
            profile_image_url: Some("https://unavatar.io/twitter/rin".into()),
            tags: Some(vec!["anime".into(), " cosplay ".into(), "anime".into(), "".into()]),
        };
        let doc = build_document(draft, now()).unwrap();

        assert_eq!(doc.followers_count, 12_000);
        assert_eq!(doc.following_count, 300);
        assert_eq!(doc.tags, ["anime", "cosplay"]);
        assert_eq!(doc.profile_image_url.as_deref(), Some("https://unavatar.io/twitter/rin"));
    }

    #[test]
    fn test_required_fields() {
        for d in [
            draft("", "yuki"),
            draft("Yuki", ""),
            draft("   ", "yuki"),
            ProfileDraft::default(),
        ] {
            assert!(matches!(build_document(d, now()), Err(PersistError::Validation(_))));
        }
    }

    #[test]
    fn test_slug_transliterates() {
        let doc = build_document(draft("Café Élodie", "elodie"), now()).unwrap();
        assert_eq!(doc.slug.current, "cafe-elodie");

        let doc = build_document(draft("  --Hello,   World!!  ", "hw"), now()).unwrap();
        assert_eq!(doc.slug.current, "hello-world");
    }

    #[test]
    fn test_kana_name_gets_ascii_slug() {
        let doc = build_document(draft("ゆき", "yuki"), now()).unwrap();
        assert_eq!(doc.name, "ゆき");
        assert!(!doc.slug.current.is_empty());
        assert!(
            doc.slug
                .current
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-'),
            "{}",
            doc.slug.current
        );
    }

    #[test]
    fn test_draft_accepts_nulls() {
        let d: ProfileDraft = serde_json::from_value(json!({
            "name": "Yuki",
            "twitterUsername": "yuki",
            "bio": null,
            "profileImageUrl": null,
            "tags": null
        }))
        .unwrap();
        let doc = build_document(d, now()).unwrap();
        assert!(doc.profile_image_url.is_none());
        assert!(doc.tags.is_empty());
    }

    #[tokio::test]
    async fn test_create_submits_once_and_returns_store_document() {
        let store = FakeStore::default();
        let created = create_cosplayer(&store, draft("Yuki Tanaka", "yuki"), now())
            .await
            .unwrap();

        let calls = store.create_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0]["slug"]["current"], "yuki-tanaka");
        assert!(store.fetch_calls().is_empty(), "no read-before-write");
        assert_eq!(created["_id"], "doc-1");
    }

    #[tokio::test]
    async fn test_same_draft_twice_creates_twice() {
        let store = FakeStore::default();
        create_cosplayer(&store, draft("Yuki", "yuki"), now()).await.unwrap();
        create_cosplayer(&store, draft("Yuki", "yuki"), now()).await.unwrap();
        assert_eq!(store.create_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_unique_error_is_duplicate() {
        let store = FakeStore::failing_create(409, "Document slug must be unique");
        let err = create_cosplayer(&store, draft("Yuki", "yuki"), now())
            .await
            .unwrap_err();
        assert!(matches!(err, PersistError::Duplicate(_)));

        let store = FakeStore::failing_create(500, "internal failure");
        let err = create_cosplayer(&store, draft("Yuki", "yuki"), now())
            .await
            .unwrap_err();
        assert!(matches!(err, PersistError::Store(_)));
    }

    #[tokio::test]
    async fn test_validation_skips_store() {
        let store = FakeStore::default();
        let err = create_cosplayer(&store, draft("", "yuki"), now()).await.unwrap_err();
        assert!(matches!(err, PersistError::Validation(_)));
        assert!(store.create_calls().is_empty());
    }

    #[tokio::test]
    async fn test_get_by_slug_binds_param() {
        let store = FakeStore::returning(json!({
            "_id": "c1",
            "name": "Yuki",
            "slug": { "_type": "slug", "current": "yuki" },
            "twitterUsername": "yuki",
            "profileImage": null,
            "profileImageUrl": null,
            "coverImage": null,
            "bio": null,
            "tags": null,
            "followersCount": 10,
            "followingCount": null,
            "socialLinks": null,
            "lastUpdated": "2025-03-01T12:00:00.000Z"
        }));

        let cosplayer = get_cosplayer_by_slug(&store, "yuki").await.unwrap().unwrap();
        assert_eq!(cosplayer.name.as_deref(), Some("Yuki"));
        assert_eq!(cosplayer.followers_count, Some(10.0));

        let calls = store.fetch_calls();
        assert_eq!(calls[0].0, COSPLAYER_BY_SLUG_QUERY);
        assert_eq!(calls[0].1, [("slug".to_string(), json!("yuki"))]);
    }

    #[tokio::test]
    async fn test_non_ascii_name_is_submitted() {
        let store = FakeStore::default();
        create_cosplayer(&store, draft("ゆき", "yuki"), now()).await.unwrap();

        let calls = store.create_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0]["name"], "ゆき");
    }

    #[tokio::test]
    async fn test_list_tolerates_loose_documents() {
        let store = FakeStore::returning(json!([
            {
                "_id": "a",
                "name": "Yuki",
                "slug": { "_type": "slug", "current": "yuki" },
                "followersCount": 10,
                "followingCount": 2
            },
            {
                "_id": "b",
                "name": null,
                "slug": null,
                "twitterUsername": null,
                "followersCount": 12.5,
                "followingCount": -3,
                "tags": null,
                "socialLinks": null,
                "lastUpdated": null
            }
        ]));

        let list = list_cosplayers(&store).await.unwrap();
        assert_eq!(list.len(), 2);
        assert!(list[1].name.is_none());
        assert_eq!(list[1].followers_count, Some(12.5));
        assert_eq!(list[1].following_count, Some(-3.0));
    }

    #[tokio::test]
    async fn test_missing_slug_is_none() {
        let store = FakeStore::returning(Value::Null);
        assert!(get_cosplayer_by_slug(&store, "nobody").await.unwrap().is_none());
        assert!(list_cosplayers(&store).await.unwrap().is_empty());
    }
}
