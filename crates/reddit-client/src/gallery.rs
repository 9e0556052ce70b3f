//! Image URL extraction from post metadata
//!
//! Gallery posts carry a `media_metadata` map of item id to renditions
//! (`p`, smallest first). Single-image posts just link the image in `url`.

use serde::Deserialize;
use tracing::warn;

use crate::constants::IMAGE_SUFFIXES;
use crate::post::PostData;

#[derive(Debug, Deserialize)]
struct MediaEntry {
    #[serde(default)]
    p: Vec<Rendition>,
}

#[derive(Debug, Deserialize)]
struct Rendition {
    u: String,
}

/// List the image URLs a post points at.
///
/// Gallery entries yield their last (largest) rendition with HTML entities
/// decoded (the API escapes `&` in query strings as `&amp;`). Entries
/// without renditions are skipped.
pub fn extract_image_urls(post: &PostData) -> Vec<String> {
    if let Some(media) = &post.media_metadata {
        return media
            .iter()
            .filter_map(|(media_id, value)| {
                let entry = match MediaEntry::deserialize(value) {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(media_id, error = %e, "skipping malformed gallery entry");
                        return None;
                    }
                };
                match entry.p.last() {
                    Some(rendition) => {
                        Some(html_escape::decode_html_entities(&rendition.u).into_owned())
                    }
                    None => {
                        warn!(media_id, "skipping gallery entry without renditions");
                        None
                    }
                }
            })
            .collect();
    }

    match &post.url {
        Some(url) if IMAGE_SUFFIXES.iter().any(|suffix| url.ends_with(suffix)) => {
            vec![url.clone()]
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_from(json: serde_json::Value) -> PostData {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn gallery_takes_last_rendition_of_each_entry_unescaped() {
        let post = post_from(serde_json::json!({
            "url": "https://www.reddit.com/gallery/abc123",
            "media_metadata": {
                "zz1": {"status": "valid", "e": "Image", "p": [
                    {"x": 108, "u": "https://preview.redd.it/zz1.jpg?width=108&amp;s=a"},
                    {"x": 640, "u": "https://preview.redd.it/zz1.jpg?width=640&amp;s=b"}
                ]},
                "aa2": {"status": "valid", "e": "Image", "p": [{
                    "x": 1080,
                    "u": "https://preview.redd.it/aa2.png?width=1080&amp;format=png&amp;s=c"
                }]}
            }
        }));

        let urls = extract_image_urls(&post);

        // Upstream document order, not key order
        assert_eq!(
            urls,
            vec![
                "https://preview.redd.it/zz1.jpg?width=640&s=b",
                "https://preview.redd.it/aa2.png?width=1080&format=png&s=c",
            ]
        );
    }

    #[test]
    fn gallery_wins_over_image_url() {
        let post = post_from(serde_json::json!({
            "url": "https://i.redd.it/cover.jpg",
            "media_metadata": {
                "m1": {"p": [{"u": "https://preview.redd.it/m1.jpg"}]}
            }
        }));
        assert_eq!(extract_image_urls(&post), vec!["https://preview.redd.it/m1.jpg"]);
    }

    #[test]
    fn gallery_entry_without_renditions_is_skipped() {
        let post = post_from(serde_json::json!({
            "media_metadata": {
                "bad": {"status": "failed"},
                "ok": {"p": [{"u": "https://preview.redd.it/ok.jpg"}]}
            }
        }));
        assert_eq!(extract_image_urls(&post), vec!["https://preview.redd.it/ok.jpg"]);
    }

    #[test]
    fn null_media_metadata_falls_back_to_url() {
        let post = post_from(serde_json::json!({
            "url": "https://i.redd.it/solo.jpeg",
            "media_metadata": null
        }));
        assert_eq!(extract_image_urls(&post), vec!["https://i.redd.it/solo.jpeg"]);
    }

    #[test]
    fn single_image_suffixes_are_accepted() {
        for url in [
            "https://i.redd.it/a.png",
            "https://i.redd.it/b.jpg",
            "https://i.redd.it/c.jpeg",
        ] {
            let post = post_from(serde_json::json!({ "url": url }));
            assert_eq!(extract_image_urls(&post), vec![url.to_string()], "url: {url}");
        }
    }

    #[test]
    fn other_suffixes_yield_nothing() {
        for url in [
            "https://i.redd.it/a.gif",
            "https://i.redd.it/b.JPG",
            "https://i.redd.it/c.png?width=640",
            "https://v.redd.it/clip",
        ] {
            let post = post_from(serde_json::json!({ "url": url }));
            assert!(extract_image_urls(&post).is_empty(), "url: {url}");
        }
    }

    #[test]
    fn post_without_url_yields_nothing() {
        assert!(extract_image_urls(&PostData::default()).is_empty());
    }
}
