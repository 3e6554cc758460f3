use std::error::Error;
use std::fmt;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tracing::debug;

use crate::config::RemoteSettings;
use crate::models::{Book, NewReview, ReadingList, ReadingListUpdate, Review, Session};
use crate::repo::{Backend, CatalogRepo, SessionSource};

const API_KEY_HEADER: &str = "apikey";

#[derive(Debug)]
pub enum RemoteError {
    RequestError(reqwest::Error),
    StatusError { status: StatusCode, body: String },
}

impl From<reqwest::Error> for RemoteError {
    fn from(error: reqwest::Error) -> Self {
        RemoteError::RequestError(error)
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::RequestError(e) => {
                write!(f, "problem talking to the backend: {e}")
            }
            RemoteError::StatusError { status, body } => {
                write!(f, "backend responded with {status}: {body}")
            }
        }
    }
}

impl Error for RemoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RemoteError::RequestError(e) => Some(e),
            RemoteError::StatusError { .. } => None,
        }
    }
}

/// Connection details shared by every request, cheap to clone.
#[derive(Clone)]
pub struct RemoteBackend {
    client: Client,
    data_url: String,
    auth_url: String,
    api_key: Option<String>,
}

impl RemoteBackend {
    pub fn new(settings: &RemoteSettings) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()?;

        Ok(RemoteBackend {
            client,
            data_url: settings.data_url.trim_end_matches('/').to_string(),
            auth_url: settings.auth_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    fn endpoint(&self, base_url: &str, access_token: Option<String>) -> Endpoint {
        Endpoint {
            client: self.client.clone(),
            base_url: base_url.to_string(),
            api_key: self.api_key.clone(),
            access_token,
        }
    }
}

impl Backend<RemoteError> for RemoteBackend {
    type Repo = RemoteCatalogRepo;
    type Sessions = RemoteSessionSource;

    fn bind(&self, access_token: Option<String>) -> (Self::Repo, Self::Sessions) {
        let repo = RemoteCatalogRepo {
            endpoint: self.endpoint(&self.data_url, access_token.clone()),
        };
        let sessions = RemoteSessionSource {
            endpoint: self.endpoint(&self.auth_url, access_token),
        };
        (repo, sessions)
    }
}

#[derive(Clone)]
struct Endpoint {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    access_token: Option<String>,
}

impl Endpoint {
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let mut builder = self.client.request(method, url);
        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        if let Some(token) = &self.access_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }
}

async fn check_status(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(RemoteError::StatusError { status, body })
}

#[derive(Clone)]
pub struct RemoteCatalogRepo {
    endpoint: Endpoint,
}

impl CatalogRepo<RemoteError> for RemoteCatalogRepo {
    async fn get_books(&self) -> Result<Vec<Book>, RemoteError> {
        let response = self.endpoint.request(Method::GET, "/books").send().await?;

        let books = check_status(response).await?.json::<Vec<Book>>().await?;

        Ok(books)
    }

    async fn get_book(&self, id: &str) -> Result<Option<Book>, RemoteError> {
        let response = self
            .endpoint
            .request(Method::GET, &format!("/books/{id}"))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let book = check_status(response).await?.json::<Book>().await?;

        Ok(Some(book))
    }

    async fn get_reading_lists(&self) -> Result<Vec<ReadingList>, RemoteError> {
        // Lists are per user; an anonymous caller has none.
        if self.endpoint.access_token.is_none() {
            return Ok(Vec::new());
        }

        let response = self
            .endpoint
            .request(Method::GET, "/reading-lists")
            .send()
            .await?;

        let lists = check_status(response)
            .await?
            .json::<Vec<ReadingList>>()
            .await?;

        Ok(lists)
    }

    async fn update_reading_list(
        &self,
        id: &str,
        update: ReadingListUpdate,
    ) -> Result<(), RemoteError> {
        let response = self
            .endpoint
            .request(Method::PUT, &format!("/reading-lists/{id}"))
            .json(&update)
            .send()
            .await?;

        check_status(response).await?;

        Ok(())
    }

    async fn get_reviews(&self, book_id: &str) -> Result<Vec<Review>, RemoteError> {
        let response = self
            .endpoint
            .request(Method::GET, "/reviews")
            .query(&[("bookId", book_id)])
            .send()
            .await?;

        let reviews = check_status(response).await?.json::<Vec<Review>>().await?;

        Ok(reviews)
    }

    async fn create_review(&self, review: NewReview) -> Result<(), RemoteError> {
        let response = self
            .endpoint
            .request(Method::POST, "/reviews")
            .json(&review)
            .send()
            .await?;

        check_status(response).await?;

        Ok(())
    }
}

#[derive(Clone)]
pub struct RemoteSessionSource {
    endpoint: Endpoint,
}

impl SessionSource<RemoteError> for RemoteSessionSource {
    async fn current_session(&self) -> Result<Option<Session>, RemoteError> {
        if self.endpoint.access_token.is_none() {
            return Ok(None);
        }

        let response = self.endpoint.request(Method::GET, "/session").send().await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }

        let session = check_status(response).await?.json::<Session>().await?;

        Ok(Some(session))
    }
}
