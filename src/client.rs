use std::env;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, header};
use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};
use crate::observability;
use crate::types::{
    ChatReply, ChatRequest, ConversationSummary, HistoryEntry, HistoryPair, Identity, Message,
    RegisterParams, validate_password,
};

/// Base URL used when neither the caller nor `DOCQA_URL` supplies one.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// The remote operations the chat client depends on.
///
/// Modeled as an injected interface so the session layer can be driven by
/// a test double. Each operation is a single round trip: no retry, no
/// backoff, no caching.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Authenticate with email and password.
    async fn login(&self, email: &str, password: &str) -> Result<Identity>;

    /// Register a new account.
    async fn register(&self, params: RegisterParams) -> Result<Identity>;

    /// Best-effort server-side logout; the response body is ignored.
    async fn logout(&self) -> Result<()>;

    /// Send a question and get the assistant's reply.
    async fn send_chat(&self, request: ChatRequest) -> Result<ChatReply>;

    /// Upload documents for context. An empty list is a local no-op.
    async fn upload_documents(&self, paths: &[PathBuf]) -> Result<Vec<String>>;

    /// Fetch the current conversation's history.
    async fn fetch_history(&self) -> Result<Vec<Message>>;

    /// Archive the current server-side conversation.
    async fn start_new_chat(&self) -> Result<()>;

    /// Fetch preview metadata for archived conversations.
    async fn fetch_conversation_list(&self) -> Result<Vec<ConversationSummary>>;

    /// Fetch the full history of the archived conversation at `idx`.
    async fn fetch_conversation(&self, idx: usize) -> Result<Vec<Message>>;

    /// Fetch the names of uploaded documents.
    async fn fetch_documents(&self) -> Result<Vec<String>>;
}

/// Client for the DocQA service.
///
/// The session credential is a cookie; the underlying HTTP client carries
/// a cookie store so every request after login is authenticated
/// automatically.
#[derive(Debug, Clone)]
pub struct DocQa {
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
}

impl DocQa {
    /// Create a new DocQA client.
    ///
    /// The base URL can be provided directly or read from the DOCQA_URL
    /// environment variable; it defaults to the local development server.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        Self::with_options(base_url, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url
            .or_else(|| env::var("DOCQA_URL").ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let base_url = Url::parse(&base_url)?;

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Returns the base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(path)?;
        Ok(self
            .client
            .request(method, url)
            .headers(self.default_headers()))
    }

    /// Issue a request and map transport and status failures into the
    /// error taxonomy.
    async fn execute(&self, builder: RequestBuilder) -> Result<Response> {
        observability::CLIENT_REQUESTS.click();
        let start = Instant::now();
        let outcome = builder.send().await;
        observability::CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        let response = outcome.map_err(|e| {
            observability::CLIENT_REQUEST_ERRORS.click();
            if e.is_timeout() {
                Error::timeout(
                    format!("Request timed out: {}", e),
                    Some(self.timeout.as_secs_f64()),
                )
            } else if e.is_connect() {
                Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
            } else {
                Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
            }
        })?;

        if !response.status().is_success() {
            observability::CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        Ok(response)
    }

    /// Process API response errors and convert to our Error type.
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        // Error bodies are flat JSON: {"error": "..."}. The string is
        // surfaced verbatim when present.
        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        let error_message = serde_json::from_str::<ErrorResponse>(&error_body)
            .ok()
            .and_then(|e| e.error)
            .unwrap_or_else(|| error_body.clone());

        Self::classify_status(status_code, error_message)
    }

    /// Map a non-2xx status and its error string into the taxonomy.
    fn classify_status(status_code: u16, message: String) -> Error {
        match status_code {
            400 => Error::bad_request(message, None),
            401 => Error::authentication(message),
            404 => Error::not_found(message, None, None),
            408 => Error::timeout(message, None),
            500 => Error::internal_server(message),
            502..=504 => Error::service_unavailable(message),
            _ => Error::api(status_code, message),
        }
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }
}

#[derive(Deserialize)]
struct AuthResponse {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    uploaded: Vec<String>,
}

#[derive(Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    history: Vec<HistoryPair>,
}

#[derive(Deserialize)]
struct ConversationListResponse {
    #[serde(default)]
    chats_history: Vec<ConversationSummary>,
}

#[derive(Deserialize)]
struct ConversationResponse {
    #[serde(default)]
    history: Vec<HistoryEntry>,
}

#[derive(Deserialize)]
struct FilesResponse {
    #[serde(default)]
    files: Vec<String>,
}

#[async_trait::async_trait]
impl Backend for DocQa {
    async fn login(&self, email: &str, password: &str) -> Result<Identity> {
        if email.trim().is_empty() {
            return Err(Error::validation(
                "email must not be empty",
                Some("email".to_string()),
            ));
        }

        let body = serde_json::json!({
            "email": email,
            "password": password,
        });
        let response = self
            .execute(self.request(Method::POST, "api/login")?.json(&body))
            .await?;
        let auth: AuthResponse = Self::parse(response).await?;
        Ok(Identity::new(email, auth.name.unwrap_or_default()))
    }

    async fn register(&self, params: RegisterParams) -> Result<Identity> {
        if params.email.trim().is_empty() {
            return Err(Error::validation(
                "email must not be empty",
                Some("email".to_string()),
            ));
        }
        validate_password(&params.password)?;

        let response = self
            .execute(self.request(Method::POST, "api/register")?.json(&params))
            .await?;
        let auth: AuthResponse = Self::parse(response).await?;
        Ok(Identity::new(
            params.email,
            auth.name.unwrap_or(params.name),
        ))
    }

    async fn logout(&self) -> Result<()> {
        self.execute(self.request(Method::POST, "api/logout")?)
            .await?;
        Ok(())
    }

    async fn send_chat(&self, request: ChatRequest) -> Result<ChatReply> {
        let response = self
            .execute(self.request(Method::POST, "api/chat")?.json(&request))
            .await?;
        Self::parse(response).await
    }

    async fn upload_documents(&self, paths: &[PathBuf]) -> Result<Vec<String>> {
        if paths.is_empty() {
            return Ok(Vec::new());
        }
        observability::UPLOADS.click();

        let mut form = Form::new();
        for path in paths {
            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(String::from)
                .ok_or_else(|| {
                    Error::validation(
                        format!("not a file path: {}", path.display()),
                        Some("files".to_string()),
                    )
                })?;
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|err| Error::io(format!("failed to read {}", path.display()), err))?;
            form = form.part("files", Part::bytes(bytes).file_name(file_name));
        }

        let response = self
            .execute(self.request(Method::POST, "api/upload")?.multipart(form))
            .await?;
        let upload: UploadResponse = Self::parse(response).await?;
        for _ in &upload.uploaded {
            observability::UPLOADED_FILES.click();
        }
        Ok(upload.uploaded)
    }

    async fn fetch_history(&self) -> Result<Vec<Message>> {
        let response = self
            .execute(self.request(Method::GET, "api/history")?)
            .await?;
        let history: HistoryResponse = Self::parse(response).await?;
        Ok(HistoryPair::flatten(history.history))
    }

    async fn start_new_chat(&self) -> Result<()> {
        self.execute(self.request(Method::POST, "api/new_chat")?)
            .await?;
        Ok(())
    }

    async fn fetch_conversation_list(&self) -> Result<Vec<ConversationSummary>> {
        let response = self
            .execute(self.request(Method::GET, "api/chats_history")?)
            .await?;
        let list: ConversationListResponse = Self::parse(response).await?;
        Ok(list.chats_history)
    }

    async fn fetch_conversation(&self, idx: usize) -> Result<Vec<Message>> {
        let response = self
            .execute(self.request(Method::GET, &format!("api/chats_history/{idx}"))?)
            .await?;
        let conversation: ConversationResponse = Self::parse(response).await?;
        Ok(conversation
            .history
            .into_iter()
            .map(Message::from)
            .collect())
    }

    async fn fetch_documents(&self) -> Result<Vec<String>> {
        let response = self
            .execute(self.request(Method::GET, "api/files")?)
            .await?;
        let files: FilesResponse = Self::parse(response).await?;
        Ok(files.files)
    }
}
