//! Web server for the image steganography API
//!
//! ## Endpoints
//!
//! | Method | Path | Multipart fields |
//! |---|---|---|
//! | GET | `/api/health` | |
//! | POST | `/api/encode` | `image`, `message`, `bits` |
//! | POST | `/api/decode` | `image`, `bits` |
//! | POST | `/api/info` | `image`, `bits` |
//! | POST | `/api/compare` | `original`, `modified` |
//!
//! `bits` defaults to 1. Encoded images come back as base64 PNG.

use axum::{
    extract::multipart::Multipart,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose, Engine as _};
use clap::Parser;
use log::{error, info};
use serde::Serialize;
use std::collections::HashMap;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use pixel_stego::processing::{self, BitWidth, CapacityReport, FidelityReport, StegoError};
use pixel_stego::utils::init_logger;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Directory of static front-end files served at `/`
    #[arg(long)]
    static_dir: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct EncodeResponse {
    success: bool,
    message: String,
    carrier_image_base64: String,
    capacity: CapacityReport,
    fidelity: FidelityReport,
}

#[derive(Serialize)]
struct DecodeResponse {
    success: bool,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

impl From<StegoError> for ErrorResponse {
    fn from(e: StegoError) -> Self {
        ErrorResponse {
            error: e.to_string(),
        }
    }
}

fn stego_error(e: StegoError) -> ApiError {
    let status = match &e {
        StegoError::ImageIo(_) | StegoError::InvalidShape(_) => StatusCode::BAD_REQUEST,
        StegoError::InvalidBitWidth(_)
        | StegoError::CapacityExceeded { .. }
        | StegoError::ShapeMismatch { .. }
        | StegoError::UnsupportedCharacter { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    };
    error!("❌ Request failed: {}", e);
    (status, Json(ErrorResponse::from(e)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);

    info!("🚀 Initializing web server...");

    let mut app = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/encode", post(encode_handler))
        .route("/api/decode", post(decode_handler))
        .route("/api/info", post(info_handler))
        .route("/api/compare", post(compare_handler));

    if let Some(dir) = &args.static_dir {
        info!("📁 Serving static files from {}", dir);
        app = app.fallback_service(ServeDir::new(dir));
    }

    let app = app.layer(CorsLayer::permissive());

    info!("🌐 Web server running on http://{}", args.addr);

    let listener = tokio::net::TcpListener::bind(&args.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "steganography-api",
        "bit_widths": [1, 2, 3, 4],
    }))
}

/// Multipart form contents: file parts and text parts by field name.
#[derive(Default)]
struct Form {
    files: HashMap<String, Vec<u8>>,
    fields: HashMap<String, String>,
}

impl Form {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Form::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("Failed to read multipart data: {}", e),
            )
        })? {
            let name = field.name().unwrap_or("").to_string();
            let is_file = field.file_name().is_some();
            let data = field.bytes().await.map_err(|e| {
                api_error(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read field '{}': {}", name, e),
                )
            })?;

            if is_file || matches!(name.as_str(), "image" | "original" | "modified") {
                form.files.insert(name, data.to_vec());
            } else {
                let text = String::from_utf8(data.to_vec()).map_err(|_| {
                    api_error(
                        StatusCode::BAD_REQUEST,
                        format!("Field '{}' is not valid UTF-8", name),
                    )
                })?;
                form.fields.insert(name, text);
            }
        }

        Ok(form)
    }

    fn file(&mut self, name: &str) -> Result<Vec<u8>, ApiError> {
        self.files
            .remove(name)
            .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, format!("No {} provided", name)))
    }

    fn text(&mut self, name: &str) -> Result<String, ApiError> {
        self.fields
            .remove(name)
            .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, format!("No {} provided", name)))
    }

    fn bit_width(&self) -> Result<BitWidth, ApiError> {
        match self.fields.get("bits") {
            None => Ok(BitWidth::default()),
            Some(raw) => {
                let bits: u8 = raw.trim().parse().map_err(|_| {
                    api_error(
                        StatusCode::BAD_REQUEST,
                        format!("bits must be a number, got '{}'", raw),
                    )
                })?;
                BitWidth::new(bits).map_err(stego_error)
            }
        }
    }
}

/// Run CPU-bound codec work off the async executor.
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, StegoError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| {
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Processing task panicked: {}", e),
            )
        })?
        .map_err(stego_error)
}

async fn encode_handler(multipart: Multipart) -> Result<impl IntoResponse, ApiError> {
    let mut form = Form::read(multipart).await?;
    let image = form.file("image")?;
    let message = form.text("message")?;
    let width = form.bit_width()?;

    info!(
        "📤 Encode request: {} byte image, {} character message, {} bit(s)",
        image.len(),
        message.chars().count(),
        width
    );

    let (carrier, capacity, fidelity) = blocking(move || {
        let carrier = processing::embed_text_bytes(&image, &message, width)?;
        let capacity = processing::info_bytes(&image, width)?;
        let fidelity = processing::compare_bytes(&image, &carrier)?;
        Ok((carrier, capacity, fidelity))
    })
    .await?;

    info!("✅ Encoding complete! Carrier size: {} bytes", carrier.len());

    Ok((
        StatusCode::OK,
        Json(EncodeResponse {
            success: true,
            message: "Message encoded successfully".to_string(),
            carrier_image_base64: general_purpose::STANDARD.encode(&carrier),
            capacity,
            fidelity,
        }),
    ))
}

async fn decode_handler(multipart: Multipart) -> Result<impl IntoResponse, ApiError> {
    let mut form = Form::read(multipart).await?;
    let image = form.file("image")?;
    let width = form.bit_width()?;

    let message = blocking(move || processing::extract_text_bytes(&image, width)).await?;
    info!("📥 Decoded {} character(s) at {} bit(s)", message.chars().count(), width);

    Ok(Json(DecodeResponse {
        success: true,
        message,
    }))
}

async fn info_handler(multipart: Multipart) -> Result<impl IntoResponse, ApiError> {
    let mut form = Form::read(multipart).await?;
    let image = form.file("image")?;
    let width = form.bit_width()?;

    let report = blocking(move || processing::info_bytes(&image, width)).await?;
    Ok(Json(report))
}

async fn compare_handler(multipart: Multipart) -> Result<impl IntoResponse, ApiError> {
    let mut form = Form::read(multipart).await?;
    let original = form.file("original")?;
    let modified = form.file("modified")?;

    let report = blocking(move || processing::compare_bytes(&original, &modified)).await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixel_stego::processing::GridShape;

    fn form_with_bits(bits: Option<&str>) -> Form {
        let mut form = Form::default();
        if let Some(bits) = bits {
            form.fields.insert("bits".to_string(), bits.to_string());
        }
        form
    }

    fn status_of(e: StegoError) -> StatusCode {
        stego_error(e).0
    }

    #[test]
    fn test_bits_default_to_one() {
        assert_eq!(form_with_bits(None).bit_width().unwrap().get(), 1);
    }

    #[test]
    fn test_bits_parsed_and_trimmed() {
        assert_eq!(form_with_bits(Some(" 3 ")).bit_width().unwrap().get(), 3);
    }

    #[test]
    fn test_non_numeric_bits_is_bad_request() {
        let (status, Json(body)) = form_with_bits(Some("two")).bit_width().unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.contains("two"));
    }

    #[test]
    fn test_out_of_range_bits_is_unprocessable() {
        for raw in ["0", "5", "7"] {
            let (status, Json(body)) = form_with_bits(Some(raw)).bit_width().unwrap_err();
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "bits = {}", raw);
            assert!(body.error.contains("between 1 and 4"));
        }
    }

    #[test]
    fn test_validation_errors_are_unprocessable() {
        assert_eq!(status_of(StegoError::InvalidBitWidth(9)), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            status_of(StegoError::CapacityExceeded {
                required_bits: 16,
                available_bits: 12,
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(StegoError::ShapeMismatch {
                original: GridShape::new(2, 2, 3),
                modified: GridShape::new(3, 3, 3),
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(StegoError::UnsupportedCharacter {
                character: '€',
                position: 0,
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_image_errors_are_bad_request() {
        let err = processing::extract_text_bytes(b"not an image", BitWidth::default()).unwrap_err();
        assert!(matches!(err, StegoError::ImageIo(_)));
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(StegoError::InvalidShape("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_error_body_carries_message() {
        let (_, Json(body)) = stego_error(StegoError::CapacityExceeded {
            required_bits: 16,
            available_bits: 12,
        });
        assert_eq!(body.error, "message too large: needs 16 bits, max capacity is 12 bits");
    }

    #[test]
    fn test_missing_form_parts() {
        let mut form = Form::default();
        let (status, Json(body)) = form.file("image").unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "No image provided");
        assert_eq!(form.text("message").unwrap_err().0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_blocking_maps_codec_errors() {
        let result = blocking(|| processing::info_bytes(b"junk", BitWidth::default())).await;
        assert_eq!(result.unwrap_err().0, StatusCode::BAD_REQUEST);
    }
}
