//! `/articles` request handlers.
//!
//! # Responsibility
//! - Deserialize request bodies and serialize response bodies as JSON.
//! - Map `ArticleServiceError` to status codes.
//!
//! # Invariants
//! - Handlers never panic; every path returns an `ApiResponse`.
//! - Backend error detail is logged by the service, never echoed to callers.
//!
//! | Handler   | Route                   | Success | Failure            |
//! |-----------|-------------------------|---------|--------------------|
//! | `list`    | `GET /articles?tag=`    | 200     | 500                |
//! | `get`     | `GET /articles/{id}`    | 200     | 404, 500           |
//! | `create`  | `POST /articles`        | 201     | 400, 409, 500      |
//! | `replace` | `PUT /articles/{id}`    | 204     | 400, 404, 500      |
//! | `delete`  | `DELETE /articles/{id}` | 204     | 404, 500           |

use log::{debug, error};
use rusqlite::Connection;
use serde::Serialize;
use shop_core::{
    Article, ArticleId, ArticleService, ArticleServiceError, RepoResult, SqliteArticleRepository,
};

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_NO_CONTENT: u16 = 204;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_CONFLICT: u16 = 409;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

const NOT_FOUND_MESSAGE: &str = "article not found";
const CONFLICT_MESSAGE: &str = "article already exists";
const BACKEND_MESSAGE: &str = "internal storage error";

/// Response envelope: status code plus JSON body (empty for 201/204).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    fn json(status: u16, value: &impl Serialize) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self { status, body },
            Err(err) => {
                error!("event=api_encode module=api status=error error={err}");
                Self::message(STATUS_INTERNAL_ERROR, BACKEND_MESSAGE)
            }
        }
    }

    fn empty(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }

    fn message(status: u16, message: impl Into<String>) -> Self {
        let body = serde_json::json!({ "message": message.into() }).to_string();
        Self { status, body }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<ArticleServiceError> for ApiResponse {
    fn from(value: ArticleServiceError) -> Self {
        match value {
            ArticleServiceError::NotFound(_) => Self::message(STATUS_NOT_FOUND, NOT_FOUND_MESSAGE),
            ArticleServiceError::Conflict(_) => Self::message(STATUS_CONFLICT, CONFLICT_MESSAGE),
            ArticleServiceError::Repo(_) => Self::message(STATUS_INTERNAL_ERROR, BACKEND_MESSAGE),
        }
    }
}

/// Handlers bound to one injected catalog connection.
pub struct ArticleApi<'conn> {
    service: ArticleService<SqliteArticleRepository<'conn>>,
}

impl<'conn> ArticleApi<'conn> {
    /// Binds handlers to a connection opened through `shop_core::db`.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        let repo = SqliteArticleRepository::try_new(conn)?;
        Ok(Self {
            service: ArticleService::new(repo),
        })
    }

    /// `GET /articles?tag=`; the tag filter is matched verbatim.
    pub fn list(&self, tag: Option<&str>) -> ApiResponse {
        match self.service.list(tag) {
            Ok(articles) => ApiResponse::json(STATUS_OK, &articles),
            Err(err) => err.into(),
        }
    }

    /// `GET /articles/{id}`
    pub fn get(&self, id: ArticleId) -> ApiResponse {
        match self.service.get_by_id(id) {
            Ok(article) => ApiResponse::json(STATUS_OK, &article),
            Err(err) => err.into(),
        }
    }

    /// `POST /articles` with an Article JSON body.
    pub fn create(&mut self, body: &str) -> ApiResponse {
        let article = match parse_article(body) {
            Ok(article) => article,
            Err(response) => return response,
        };
        match self.service.create(&article) {
            Ok(()) => ApiResponse::empty(STATUS_CREATED),
            Err(err) => err.into(),
        }
    }

    /// `PUT /articles/{id}` with an Article JSON body.
    ///
    /// The body id must match the path id; a mismatch is a 400 rather than
    /// silently trusting the body id and ignoring the path.
    pub fn replace(&mut self, id: ArticleId, body: &str) -> ApiResponse {
        let article = match parse_article(body) {
            Ok(article) => article,
            Err(response) => return response,
        };
        if article.id != id {
            debug!(
                "event=api_replace module=api status=rejected path_id={id} body_id={}",
                article.id
            );
            return ApiResponse::message(
                STATUS_BAD_REQUEST,
                format!("body id {} does not match path id {id}", article.id),
            );
        }
        match self.service.replace(&article) {
            Ok(()) => ApiResponse::empty(STATUS_NO_CONTENT),
            Err(err) => err.into(),
        }
    }

    /// `DELETE /articles/{id}`
    pub fn delete(&mut self, id: ArticleId) -> ApiResponse {
        match self.service.remove(id) {
            Ok(()) => ApiResponse::empty(STATUS_NO_CONTENT),
            Err(err) => err.into(),
        }
    }
}

fn parse_article(body: &str) -> Result<Article, ApiResponse> {
    serde_json::from_str(body).map_err(|err| {
        debug!("event=api_decode module=api status=rejected error={err}");
        ApiResponse::message(STATUS_BAD_REQUEST, format!("malformed article body: {err}"))
    })
}
