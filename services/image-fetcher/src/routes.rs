//! Request handlers for the browser-facing API
//!
//! `/auth` -> token, `/fetch-images` -> resolve + extract + download,
//! `/images/{filename}` -> stored file, `/download-images` -> ZIP + purge.

use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use image_store::ImageStore;
use reddit_client::{Credentials, Endpoints};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::metrics;

const INDEX_HTML: &str = include_str!("../static/index.html");
const INDEX_JS: &str = include_str!("../static/index.js");

/// Shared state for the API handlers
#[derive(Clone)]
pub struct ApiState {
    pub client: reqwest::Client,
    pub endpoints: Arc<Endpoints>,
    pub credentials: Arc<Credentials>,
    pub store: ImageStore,
    pub archive_name: Arc<str>,
    pub download_concurrency: usize,
}

#[derive(Debug, Deserialize)]
pub struct FetchRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FetchResponse {
    pub images: Vec<String>,
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn index_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        INDEX_JS,
    )
}

/// POST /auth: password grant with the server's configured credentials.
pub async fn authenticate(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let token =
        reddit_client::fetch_token(&state.client, &state.endpoints, &state.credentials).await?;
    Ok(Json(serde_json::json!({ "token": token })))
}

/// POST /fetch-images: resolve the post, download its images, list their paths.
#[instrument(skip_all)]
pub async fn fetch_images(
    State(state): State<ApiState>,
    body: Result<Json<FetchRequest>, JsonRejection>,
) -> Result<Json<FetchResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let post_url = request
        .url
        .ok_or_else(|| ApiError::BadRequest("missing field `url`".into()))?;

    let post_id = reddit_client::parse_post_id(&post_url)?;
    let post =
        reddit_client::fetch_post(&state.client, &state.endpoints, &request.token, &post_id)
            .await?;
    let image_urls = reddit_client::extract_image_urls(&post);
    info!(post_id, found = image_urls.len(), "resolved post images");

    let images = image_store::download_all(
        &state.client,
        &state.store,
        &image_urls,
        state.download_concurrency,
    )
    .await?;
    metrics::record_images_downloaded(images.len());

    Ok(Json(FetchResponse { images }))
}

/// GET /images/{filename}: stream one stored file.
pub async fn serve_image(
    State(state): State<ApiState>,
    Path(file_name): Path<String>,
) -> Result<Response, ApiError> {
    let Some(path) = state.store.resolve(&file_name) else {
        return Ok(not_found());
    };

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(not_found()),
        Err(e) => return Err(image_store::Error::Io(e).into()),
    };
    if !file.metadata().await.map_err(image_store::Error::Io)?.is_file() {
        return Ok(not_found());
    }

    let content_type = mime_guess::from_path(&path)
        .first_or_octet_stream()
        .to_string();
    let body = Body::from_stream(ReaderStream::new(file));

    Ok(([(header::CONTENT_TYPE, content_type)], body).into_response())
}

/// POST /download-images: ZIP everything stored, then empty the directory.
pub async fn download_images(State(state): State<ApiState>) -> Result<Response, ApiError> {
    let archive = image_store::take_archive(&state.store).await?;
    let disposition = format!("attachment; filename=\"{}\"", state.archive_name);

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        archive.bytes,
    )
        .into_response())
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}
