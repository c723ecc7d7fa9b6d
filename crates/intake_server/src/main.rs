use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use shared::{
    domain::CalculatorId,
    error::{ApiError, ErrorCode, IntakeRejection},
    protocol::{
        ComputeRequest, UploadPdfResponse, CSRF_COOKIE_NAME, CSRF_HEADER_NAME,
        UPLOAD_FIELD_CALCULATOR_ID, UPLOAD_FIELD_PDF,
    },
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, warn};
use uuid::Uuid;

mod config;
mod pages;
mod store;

use config::{load_settings, Settings};
use store::CalculatorStore;

/// Room for multipart boundaries and the text fields around the PDF.
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

struct AppState {
    store: CalculatorStore,
    settings: Settings,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let addr: SocketAddr = settings.server_bind.parse()?;
    let state = AppState {
        store: CalculatorStore::default(),
        settings,
    };
    let app = build_router(Arc::new(state));

    info!(%addr, "intake server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = (state.settings.max_upload_bytes + MULTIPART_OVERHEAD_BYTES) as usize;
    Router::new()
        .route("/healthz", get(healthz))
        .route("/calculator/", get(intake_page))
        .route("/calculator/upload-pdf/", post(upload_pdf))
        .route("/calculator/results/", post(calculate_results))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn intake_page(headers: HeaderMap) -> Response {
    let page = Html(pages::intake_page());
    if csrf_cookie(&headers).is_some() {
        return page.into_response();
    }

    let token = Uuid::new_v4().simple().to_string();
    let cookie = format!("{CSRF_COOKIE_NAME}={token}; Path=/; SameSite=Lax");
    match HeaderValue::from_str(&cookie) {
        Ok(value) => ([(header::SET_COOKIE, value)], page).into_response(),
        Err(_) => page.into_response(),
    }
}

async fn upload_pdf(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadPdfResponse>> {
    verify_csrf(&headers)?;

    let mut pdf: Option<(String, usize)> = None;
    let mut calculator_id: Option<CalculatorId> = None;
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(UPLOAD_FIELD_PDF) => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(malformed)?;
                pdf = Some((filename, data.len()));
            }
            Some(UPLOAD_FIELD_CALCULATOR_ID) => {
                let text = field.text().await.map_err(malformed)?;
                let text = text.trim();
                if !text.is_empty() {
                    calculator_id = Some(CalculatorId::new(text));
                }
            }
            _ => {}
        }
    }

    let (filename, size_bytes) = pdf.ok_or_else(|| reject(ErrorCode::MissingPdf.into()))?;
    if !filename.ends_with(".pdf") {
        return Err(reject(ErrorCode::InvalidPdf.into()));
    }
    if size_bytes as u64 > state.settings.max_upload_bytes {
        return Err(reject(IntakeRejection::with_message(
            ErrorCode::PdfTooLarge,
            format!("pdf exceeds {} bytes", state.settings.max_upload_bytes),
        )));
    }

    let calculator_id = state
        .store
        .attach_pdf(calculator_id.as_ref(), &filename, size_bytes)
        .await
        .map_err(reject)?;
    info!(%calculator_id, %filename, size_bytes, "pdf uploaded");

    Ok(Json(UploadPdfResponse {
        message: Some("PDF uploaded successfully".to_string()),
        calculator_id: Some(calculator_id),
    }))
}

async fn calculate_results(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<ComputeRequest>,
) -> ApiResult<Html<String>> {
    verify_csrf(&headers)?;

    let calculator = state
        .store
        .mark_calculated(&request.calculator_id)
        .await
        .map_err(reject)?;
    info!(
        calculator_id = %calculator.id,
        files = calculator.pdfs.len(),
        "rendering results"
    );
    Ok(Html(pages::results_page(&calculator)))
}

fn csrf_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(CSRF_COOKIE_NAME)?.strip_prefix('='))
}

fn verify_csrf(headers: &HeaderMap) -> ApiResult<()> {
    let cookie = csrf_cookie(headers);
    let header = headers
        .get(CSRF_HEADER_NAME)
        .and_then(|value| value.to_str().ok());
    match (cookie, header) {
        (Some(cookie), Some(header)) if !cookie.is_empty() && cookie == header => Ok(()),
        _ => {
            warn!(
                has_cookie = cookie.is_some(),
                has_header = header.is_some(),
                "csrf verification failed"
            );
            Err(reject(ErrorCode::CsrfFailed.into()))
        }
    }
}

fn reject(rejection: IntakeRejection) -> (StatusCode, Json<ApiError>) {
    let status = StatusCode::from_u16(rejection.code.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiError::from(rejection)))
}

fn malformed(err: MultipartError) -> (StatusCode, Json<ApiError>) {
    warn!(%err, "unreadable multipart body");
    // Body limit breaches surface as multipart read errors.
    let code = if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ErrorCode::PdfTooLarge
    } else {
        ErrorCode::MalformedRequest
    };
    reject(IntakeRejection::with_message(code, err.body_text()))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
