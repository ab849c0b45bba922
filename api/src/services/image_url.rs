//! CDN URLs for image assets stored in the content store.

use serde::{Deserialize, Serialize};

use crate::constants::SANITY_IMAGE_CDN;

/// An `image` field as returned by a query: `{ asset: { _ref: "image-..." } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageField {
    pub asset: Option<AssetRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRef {
    #[serde(rename = "_ref")]
    pub reference: String,
}

#[derive(Debug, Clone)]
pub struct ImageUrlBuilder {
    project_id: String,
    dataset: String,
}

impl ImageUrlBuilder {
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
        }
    }

    /// CDN URL for an image field, optionally resized. `None` for missing or malformed refs.
    pub fn url_for(&self, image: &ImageField, width: Option<u32>, height: Option<u32>) -> Option<String> {
        let reference = &image.asset.as_ref()?.reference;
        let mut url = format!(
            "{}/{}/{}/{}",
            SANITY_IMAGE_CDN,
            self.project_id,
            self.dataset,
            asset_file_name(reference)?
        );

        let params: Vec<String> = [("w", width), ("h", height)]
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| format!("{}={}", key, v)))
            .collect();
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }

        Some(url)
    }
}

/// "image-<id>-<w>x<h>-<format>" -> "<id>-<w>x<h>.<format>"
fn asset_file_name(reference: &str) -> Option<String> {
    let rest = reference.strip_prefix("image-")?;
    let (rest, format) = rest.rsplit_once('-')?;
    let (id, dimensions) = rest.rsplit_once('-')?;

    let (w, h) = dimensions.split_once('x')?;
    let valid_dims = [w, h]
        .iter()
        .all(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()));
    if id.is_empty() || format.is_empty() || !valid_dims {
        return None;
    }

    Some(format!("{}-{}.{}", id, dimensions, format))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(reference: &str) -> ImageField {
        ImageField {
            asset: Some(AssetRef {
                reference: reference.to_string(),
            }),
        }
    }

    #[test]
    fn test_url_with_size() {
        let builder = ImageUrlBuilder::new("abc123", "production");
        assert_eq!(
            builder
                .url_for(&image("image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg"), Some(60), Some(60))
                .as_deref(),
            Some("https://cdn.sanity.io/images/abc123/production/Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000.jpg?w=60&h=60")
        );
    }

    #[test]
    fn test_url_without_size() {
        let builder = ImageUrlBuilder::new("abc123", "production");
        assert_eq!(
            builder.url_for(&image("image-abc-10x20-png"), None, None).as_deref(),
            Some("https://cdn.sanity.io/images/abc123/production/abc-10x20.png")
        );
        assert_eq!(
            builder.url_for(&image("image-abc-10x20-png"), Some(400), None).as_deref(),
            Some("https://cdn.sanity.io/images/abc123/production/abc-10x20.png?w=400")
        );
    }

    #[test]
    fn test_malformed_refs() {
        let builder = ImageUrlBuilder::new("abc123", "production");
        for reference in ["file-abc-pdf", "image-abc-jpg", "image-abc-10xY-jpg", "image--10x20-jpg"] {
            assert!(builder.url_for(&image(reference), None, None).is_none(), "{}", reference);
        }
        assert!(builder.url_for(&ImageField { asset: None }, None, None).is_none());
    }
}
