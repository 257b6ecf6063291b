//! Request handlers for the single page and its download endpoint.

use axum::body::Body;
use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::encoder;

use super::page;

/// Query parameters shared by the page and download endpoints.
#[derive(Debug, Deserialize)]
pub struct QrQuery {
    pub url: Option<String>,
}

impl QrQuery {
    /// The trimmed payload, or `None` when absent or empty after trimming.
    fn payload(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// GET /
///
/// The single page. Without a `url` parameter it renders the bare form.
/// With an empty one it warns and skips encoding; the encoder is never
/// invoked with an empty payload. Otherwise it encodes and embeds the
/// preview inline as a data URL.
pub async fn index(Query(query): Query<QrQuery>) -> Response {
    let Some(raw) = query.url.as_deref() else {
        return Html(page::render_landing()).into_response();
    };

    let Some(payload) = query.payload() else {
        tracing::warn!("Empty payload submitted, skipping encode");
        return Html(page::render_warning(raw)).into_response();
    };

    match encoder::encode(payload) {
        Ok(png) => {
            tracing::info!(len = png.len(), "Encoded payload to PNG");
            let data_url = format!("data:image/png;base64,{}", BASE64.encode(&png));
            Html(page::render_result(payload, &data_url)).into_response()
        }
        Err(e) => {
            tracing::warn!("Encode failed: {e}");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(page::render_error(payload, &e.to_string())),
            )
                .into_response()
        }
    }
}

/// GET /download?url=...
///
/// Serves the same PNG bytes as the preview, as a file attachment named
/// `qrcode.png`.
pub async fn download(
    Query(query): Query<QrQuery>,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let payload = query
        .payload()
        .ok_or_else(|| err_json(400, "Missing url parameter"))?;

    let png = encoder::encode(payload).map_err(|e| err_json(422, &e.to_string()))?;

    let resp = Response::builder()
        .header(header::CONTENT_TYPE, "image/png")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"qrcode.png\"",
        )
        .body(Body::from(png))
        .map_err(|e| err_json(500, &e.to_string()))?;
    Ok(resp)
}

/// GET /status
pub async fn status() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Standard error response.
pub fn err_json(status: u16, message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({ "status": "error", "error": message })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(url: Option<&str>) -> Query<QrQuery> {
        Query(QrQuery {
            url: url.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn index_without_input_renders_form() {
        let resp = index(query(None)).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn index_with_blank_input_warns_and_skips() {
        let resp = index(query(Some("   "))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("Please enter a valid URL."));
        assert!(!html.contains("data:image/png"));
    }

    #[tokio::test]
    async fn index_with_url_embeds_preview() {
        let resp = index(query(Some("https://example.com"))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("data:image/png;base64,"));
        assert!(html.contains("/download?url="));
    }

    #[tokio::test]
    async fn index_with_oversized_payload_reports_error() {
        let payload = "a".repeat(3000);
        let resp = index(query(Some(payload.as_str()))).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn download_serves_png_attachment() {
        let resp = download(query(Some("https://example.com"))).await.unwrap();
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/png"
        );
        assert_eq!(
            resp.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"qrcode.png\""
        );
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert!(body.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[tokio::test]
    async fn download_without_url_is_rejected() {
        let (status, _) = download(query(None)).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = download(query(Some(""))).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
