//! Post URL resolution and metadata lookup

use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use crate::constants::{COMMENTS_PATH, POST_MARKER};
use crate::error::{Error, Result};
use crate::token::Endpoints;

/// The subset of a post's `data` object the extractor reads.
///
/// `media_metadata` is kept as a raw JSON map so entry order matches the
/// upstream document (serde_json is built with `preserve_order`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub media_metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
struct Thing {
    data: PostData,
}

/// Extract the post id from a permalink such as
/// `https://www.reddit.com/r/pics/comments/abc123/some_title/`.
///
/// Inputs that are not absolute URLs are treated as a bare path.
pub fn parse_post_id(post_url: &str) -> Result<String> {
    let path = match Url::parse(post_url) {
        Ok(url) => url.path().to_owned(),
        Err(_) => post_url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_owned(),
    };

    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    let marker = segments
        .iter()
        .position(|segment| *segment == POST_MARKER)
        .ok_or_else(|| Error::InvalidUrl(post_url.to_owned()))?;

    match segments.get(marker + 1) {
        Some(id) if !id.is_empty() => Ok((*id).to_owned()),
        _ => Err(Error::MissingPostId(post_url.to_owned())),
    }
}

/// Fetch a post's metadata from the comments endpoint.
///
/// The endpoint returns `[post_listing, comment_listing]`; only the first
/// child of the first listing is read.
#[instrument(skip(client, endpoints, token))]
pub async fn fetch_post(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    token: &str,
    post_id: &str,
) -> Result<PostData> {
    let api_url = format!(
        "{}{COMMENTS_PATH}/{post_id}",
        endpoints.api_url.trim_end_matches('/')
    );

    let response = client
        .get(&api_url)
        .bearer_auth(token)
        .header(reqwest::header::USER_AGENT, &endpoints.user_agent)
        .send()
        .await
        .map_err(|e| Error::Fetch(format!("request to {api_url} failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Fetch(format!("{api_url} returned {status}")));
    }

    let listings: Vec<serde_json::Value> = response
        .json()
        .await
        .map_err(|e| Error::Fetch(format!("invalid post response: {e}")))?;

    let first = listings
        .into_iter()
        .next()
        .ok_or_else(|| Error::Fetch("post response is an empty array".into()))?;
    let listing: Listing = serde_json::from_value(first)
        .map_err(|e| Error::Fetch(format!("unexpected post listing shape: {e}")))?;
    let post = listing
        .data
        .children
        .into_iter()
        .next()
        .map(|thing| thing.data)
        .ok_or_else(|| Error::Fetch(format!("post {post_id} not found in listing")))?;

    debug!(
        id = post.id.as_deref().unwrap_or_default(),
        title = post.title.as_deref().unwrap_or_default(),
        gallery = post.media_metadata.is_some(),
        "post metadata fetched"
    );
    Ok(post)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use tokio::net::TcpListener;

    async fn start_mock(app: axum::Router) -> Endpoints {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Endpoints {
            auth_url: format!("http://{addr}"),
            api_url: format!("http://{addr}"),
            user_agent: "test-agent/1.0".into(),
        }
    }

    #[test]
    fn extracts_id_following_comments_segment() {
        let id = parse_post_id("https://example.com/r/test/comments/abc123/title").unwrap();
        assert_eq!(id, "abc123");
    }

    #[test]
    fn ignores_query_and_trailing_slash() {
        let id =
            parse_post_id("https://www.reddit.com/r/pics/comments/xyz789/?utm_source=share")
                .unwrap();
        assert_eq!(id, "xyz789");
    }

    #[test]
    fn accepts_bare_path() {
        let id = parse_post_id("/r/pics/comments/def456/a_title#top").unwrap();
        assert_eq!(id, "def456");
    }

    #[test]
    fn rejects_url_without_comments_segment() {
        let err = parse_post_id("https://example.com/r/test/hot").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)), "got: {err:?}");
    }

    #[test]
    fn marker_must_be_whole_segment() {
        let err = parse_post_id("https://example.com/r/commentsfans/abc").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)), "got: {err:?}");
    }

    #[test]
    fn truncated_url_is_missing_post_id() {
        let err = parse_post_id("https://example.com/r/test/comments/").unwrap_err();
        assert!(matches!(err, Error::MissingPostId(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn fetch_post_reads_first_child_of_first_listing() {
        let app = axum::Router::new().route(
            "/comments/{id}",
            get(|Path(id): Path<String>, headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                axum::Json(serde_json::json!([
                    {"kind": "Listing", "data": {"children": [
                        {"kind": "t3", "data": {
                            "id": id,
                            "title": auth,
                            "url": "https://i.redd.it/one.png"
                        }}
                    ]}},
                    {"kind": "Listing", "data": {"children": [
                        {"kind": "more", "data": {"count": 3}}
                    ]}}
                ]))
            }),
        );
        let endpoints = start_mock(app).await;

        let post = fetch_post(&reqwest::Client::new(), &endpoints, "tok-1", "abc123")
            .await
            .unwrap();

        assert_eq!(post.id.as_deref(), Some("abc123"));
        assert_eq!(post.title.as_deref(), Some("Bearer tok-1"));
        assert_eq!(post.url.as_deref(), Some("https://i.redd.it/one.png"));
        assert!(post.media_metadata.is_none());
    }

    #[tokio::test]
    async fn fetch_post_maps_upstream_error_status() {
        let app = axum::Router::new().route(
            "/comments/{id}",
            get(|| async { StatusCode::FORBIDDEN }),
        );
        let endpoints = start_mock(app).await;

        let err = fetch_post(&reqwest::Client::new(), &endpoints, "tok", "abc")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Fetch(_)));
        assert!(err.to_string().contains("403"), "got: {err}");
    }

    #[tokio::test]
    async fn fetch_post_rejects_empty_listing() {
        let app = axum::Router::new().route(
            "/comments/{id}",
            get(|| async {
                axum::Json(serde_json::json!([{"kind": "Listing", "data": {"children": []}}]))
            }),
        );
        let endpoints = start_mock(app).await;

        let err = fetch_post(&reqwest::Client::new(), &endpoints, "tok", "gone")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "fetch");
    }
}
