use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path},
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::info;

const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// One part as seen by the server's multipart parser.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReceivedPart {
    pub name: Option<String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl ReceivedPart {
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

/// What `POST /upload` echoes back: the request's headers of interest and
/// every part in arrival order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadReceipt {
    pub user_agent: Option<String>,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub parts: Vec<ReceivedPart>,
}

pub fn app() -> Router {
    Router::new()
        .route("/upload", post(upload))
        .route("/status/{code}", post(reply_with_status))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn upload(
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadReceipt>, MultipartError> {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?.to_vec();
        parts.push(ReceivedPart {
            name,
            file_name,
            content_type,
            data,
        });
    }

    let receipt = UploadReceipt {
        user_agent: header_str(&headers, header::USER_AGENT),
        content_type: header_str(&headers, header::CONTENT_TYPE),
        content_length: header_str(&headers, header::CONTENT_LENGTH)
            .and_then(|value| value.parse().ok()),
        parts,
    };
    info!(parts = receipt.parts.len(), "upload received");
    Ok(Json(receipt))
}

async fn reply_with_status(Path(code): Path<u16>, body: Bytes) -> (StatusCode, String) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    info!(%status, bytes = body.len(), "status reply");
    (status, format!("received {} bytes", body.len()))
}
