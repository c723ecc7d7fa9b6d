//! HTTP plumbing for the two intake endpoints.

use std::{
    borrow::Cow,
    sync::{Arc, RwLock},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{
    cookie::{CookieStore, Jar},
    multipart::{Form, Part},
    Client, RequestBuilder, Response,
};
use shared::{
    domain::CalculatorId,
    error::ApiError,
    protocol::{
        ComputeRequest, UploadPdfResponse, COMPUTE_RESULTS_PATH, CSRF_COOKIE_NAME,
        CSRF_HEADER_NAME, UPLOAD_FIELD_CALCULATOR_ID, UPLOAD_FIELD_PDF, UPLOAD_PDF_PATH,
    },
};
use tracing::{debug, warn};
use url::Url;

use crate::validator::CandidateFile;

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file: CandidateFile,
    /// Identifier held when the upload was issued; omitted on the first
    /// upload of a session.
    pub calculator_id: Option<CalculatorId>,
}

#[async_trait]
pub trait IntakeTransport: Send + Sync {
    async fn upload_pdf(&self, request: UploadRequest) -> Result<UploadPdfResponse>;
    /// Returns the server-rendered document on success.
    async fn compute(&self, calculator_id: &CalculatorId) -> Result<String>;
}

/// Supplies the CSRF token; implementations must re-read it on every call so
/// a rotated cookie is picked up.
pub trait CsrfSource: Send + Sync {
    fn csrf_token(&self) -> Option<String>;
}

/// Reads `csrftoken` from the cookie jar shared with the HTTP client.
pub struct CookieJarCsrf {
    jar: Arc<Jar>,
    page_url: Url,
}

impl CookieJarCsrf {
    pub fn new(jar: Arc<Jar>, page_url: Url) -> Self {
        Self { jar, page_url }
    }
}

impl CsrfSource for CookieJarCsrf {
    fn csrf_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.page_url)?;
        read_cookie(header.to_str().ok()?, CSRF_COOKIE_NAME)
    }
}

/// Reads `csrftoken` from a `Cookie`-header style string owned by the host.
#[derive(Default)]
pub struct CookieHeaderCsrf {
    cookie_header: RwLock<String>,
}

impl CookieHeaderCsrf {
    pub fn new(cookie_header: impl Into<String>) -> Self {
        Self {
            cookie_header: RwLock::new(cookie_header.into()),
        }
    }

    pub fn set_cookie_header(&self, cookie_header: impl Into<String>) {
        if let Ok(mut guard) = self.cookie_header.write() {
            *guard = cookie_header.into();
        }
    }
}

impl CsrfSource for CookieHeaderCsrf {
    fn csrf_token(&self) -> Option<String> {
        let guard = self.cookie_header.read().ok()?;
        read_cookie(&guard, CSRF_COOKIE_NAME)
    }
}

/// Finds `name` in a `a=b; c=d` cookie string and percent-decodes its value.
/// A value that does not decode is treated as absent.
pub fn read_cookie(cookie_header: &str, name: &str) -> Option<String> {
    cookie_header
        .split(';')
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(name)?.strip_prefix('='))
        .and_then(|raw| urlencoding::decode(raw).ok().map(Cow::into_owned))
}

#[derive(Debug, Clone)]
pub struct IntakeEndpoints {
    pub page_url: Url,
    pub upload_url: Url,
    pub compute_url: Url,
}

impl IntakeEndpoints {
    /// Resolves both endpoint paths against the intake page, the way a
    /// browser resolves them relative to the document URL.
    pub fn resolve(page_url: &str, upload_path: &str, compute_path: &str) -> Result<Self> {
        let page_url =
            Url::parse(page_url).with_context(|| format!("invalid intake page url '{page_url}'"))?;
        let upload_url = page_url
            .join(upload_path)
            .with_context(|| format!("invalid upload path '{upload_path}'"))?;
        let compute_url = page_url
            .join(compute_path)
            .with_context(|| format!("invalid compute path '{compute_path}'"))?;
        Ok(Self {
            page_url,
            upload_url,
            compute_url,
        })
    }

    pub fn from_page_url(page_url: &str) -> Result<Self> {
        Self::resolve(page_url, UPLOAD_PDF_PATH, COMPUTE_RESULTS_PATH)
    }
}

pub struct HttpIntakeTransport {
    http: Client,
    endpoints: IntakeEndpoints,
    csrf: Arc<dyn CsrfSource>,
}

impl HttpIntakeTransport {
    /// Client with its own cookie jar; the CSRF token is read from that jar.
    pub fn new(endpoints: IntakeEndpoints, timeout: Duration) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let http = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        let csrf = Arc::new(CookieJarCsrf::new(jar, endpoints.page_url.clone()));
        Ok(Self::with_csrf_source(http, endpoints, csrf))
    }

    pub fn with_csrf_source(
        http: Client,
        endpoints: IntakeEndpoints,
        csrf: Arc<dyn CsrfSource>,
    ) -> Self {
        Self {
            http,
            endpoints,
            csrf,
        }
    }

    pub fn endpoints(&self) -> &IntakeEndpoints {
        &self.endpoints
    }

    /// Fetches the intake page so the server can set the CSRF cookie.
    pub async fn load_page(&self) -> Result<()> {
        self.http
            .get(self.endpoints.page_url.clone())
            .send()
            .await
            .with_context(|| format!("failed to load {}", self.endpoints.page_url))?
            .error_for_status()?;
        if self.csrf.csrf_token().is_none() {
            warn!(page = %self.endpoints.page_url, "intake page did not set a {CSRF_COOKIE_NAME} cookie");
        }
        Ok(())
    }

    fn with_csrf(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.csrf.csrf_token() {
            Some(token) => builder.header(CSRF_HEADER_NAME, token),
            None => {
                warn!("no {CSRF_COOKIE_NAME} cookie available; sending request without csrf header");
                builder
            }
        }
    }
}

#[async_trait]
impl IntakeTransport for HttpIntakeTransport {
    async fn upload_pdf(&self, request: UploadRequest) -> Result<UploadPdfResponse> {
        let UploadRequest {
            file,
            calculator_id,
        } = request;
        let part = Part::bytes(file.content)
            .file_name(file.name.clone())
            .mime_str(&file.media_type)
            .with_context(|| format!("invalid media type '{}'", file.media_type))?;
        let mut form = Form::new().part(UPLOAD_FIELD_PDF, part);
        if let Some(calculator_id) = calculator_id {
            form = form.text(UPLOAD_FIELD_CALCULATOR_ID, calculator_id.0);
        }

        debug!(url = %self.endpoints.upload_url, file = %file.name, "posting pdf");
        let response = self
            .with_csrf(self.http.post(self.endpoints.upload_url.clone()))
            .multipart(form)
            .send()
            .await
            .context("upload request failed")?;
        let response = ensure_success(response, "upload").await?;

        response
            .json()
            .await
            .context("upload response was not valid json")
    }

    async fn compute(&self, calculator_id: &CalculatorId) -> Result<String> {
        debug!(url = %self.endpoints.compute_url, %calculator_id, "requesting computation");
        let response = self
            .with_csrf(self.http.post(self.endpoints.compute_url.clone()))
            .json(&ComputeRequest {
                calculator_id: calculator_id.clone(),
            })
            .send()
            .await
            .context("compute request failed")?;
        let response = ensure_success(response, "compute").await?;

        response
            .text()
            .await
            .context("failed to read compute response body")
    }
}

/// Turns a non-success status into an error carrying the server's reason
/// when the body is an [`ApiError`].
async fn ensure_success(response: Response, action: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match response.json::<ApiError>().await {
        Ok(reason) => bail!("{action} rejected with {status}: {}", reason.message),
        Err(_) => bail!("{action} rejected with {status}"),
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
