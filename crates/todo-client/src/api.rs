//! Async HTTP client for the todo API.

use crate::error::ClientError;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use todo_core::{NewTodo, Todo, TodoId, TodoPatch, User};
use url::Url;

/// Typed client for every server route.
///
/// Holds an optional bearer token, attached to each request once set.
#[derive(Debug, Clone)]
pub struct TodoApi {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl TodoApi {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self::with_client(reqwest::Client::new(), base_url)?)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, url::ParseError> {
        // Keep a trailing slash so `join` appends instead of replacing.
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Where the browser is sent to start a Google login.
    pub fn login_url(&self) -> Result<Url, ClientError> {
        Ok(self.base_url.join("api/auth/google")?)
    }

    pub async fn list_todos(&self) -> Result<Vec<Todo>, ClientError> {
        self.json(self.request(Method::GET, "api/todos")?).await
    }

    pub async fn create_todo(&self, input: &NewTodo) -> Result<Todo, ClientError> {
        self.json(self.request(Method::POST, "api/todos")?.json(input)).await
    }

    pub async fn get_todo(&self, id: TodoId) -> Result<Todo, ClientError> {
        self.json(self.request(Method::GET, &format!("api/todos/{id}"))?)
            .await
    }

    pub async fn update_todo(&self, id: TodoId, patch: &TodoPatch) -> Result<Todo, ClientError> {
        self.json(
            self.request(Method::PUT, &format!("api/todos/{id}"))?
                .json(patch),
        )
        .await
    }

    pub async fn delete_todo(&self, id: TodoId) -> Result<(), ClientError> {
        self.empty(self.request(Method::DELETE, &format!("api/todos/{id}"))?)
            .await
    }

    pub async fn me(&self) -> Result<User, ClientError> {
        self.json(self.request(Method::GET, "api/auth/me")?).await
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        self.empty(self.request(Method::POST, "api/auth/logout")?)
            .await
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self.base_url.join(path)?;
        let builder = self.http.request(method, url);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = check_status(req.send().await?).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn empty(&self, req: RequestBuilder) -> Result<(), ClientError> {
        check_status(req.send().await?).await?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Turn a non-2xx response into [`ClientError::Status`], keeping the server's
/// `detail` message when the body has one.
async fn check_status(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        detail: detail_from_body(status, &text),
    })
}

fn detail_from_body(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.detail,
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
        Err(_) => body.trim().to_string(),
    }
}
