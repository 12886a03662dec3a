//! Article use-case service.
//!
//! # Responsibility
//! - Expose list/get/create/replace/remove to the request layer.
//! - Turn store sentinels into `NotFound`/`Conflict` outcomes.
//!
//! # Invariants
//! - The service never touches SQL; it only calls `ArticleRepository`.
//! - Log lines carry ids and outcomes only, never names, prices or tags.

use crate::model::article::{Article, ArticleId};
use crate::repo::article_repo::{ArticleRepository, RepoError};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ArticleServiceError>;

/// Service error for article use-cases.
#[derive(Debug)]
pub enum ArticleServiceError {
    /// No article with this id exists.
    NotFound(ArticleId),
    /// An article with this id already exists.
    Conflict(ArticleId),
    /// Backend failure; detail is for logs, not callers.
    Repo(RepoError),
}

impl Display for ArticleServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "article not found: {id}"),
            Self::Conflict(id) => write!(f, "article already exists: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ArticleServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ArticleServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Facade over an article store.
pub struct ArticleService<R: ArticleRepository> {
    repo: R,
}

impl<R: ArticleRepository> ArticleService<R> {
    /// Creates a service using the provided store.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists all articles, or only those tagged `tag` when a filter is given.
    pub fn list(&self, tag: Option<&str>) -> ServiceResult<Vec<Article>> {
        let filtered = tag.is_some();
        let result = match tag {
            Some(tag) => self.repo.list_by_tag(tag),
            None => self.repo.list_all(),
        };
        match result {
            Ok(articles) => {
                debug!(
                    "event=article_list module=service status=ok filtered={filtered} count={}",
                    articles.len()
                );
                Ok(articles)
            }
            Err(err) => Err(backend_failure("article_list", None, err)),
        }
    }

    /// Gets one article by id.
    pub fn get_by_id(&self, id: ArticleId) -> ServiceResult<Article> {
        match self.repo.get(id) {
            Ok(Some(article)) => Ok(article),
            Ok(None) => {
                debug!("event=article_get module=service status=not_found article_id={id}");
                Err(ArticleServiceError::NotFound(id))
            }
            Err(err) => Err(backend_failure("article_get", Some(id), err)),
        }
    }

    /// Creates an article. `Conflict` when the id is already taken.
    pub fn create(&mut self, article: &Article) -> ServiceResult<()> {
        match self.repo.insert(article) {
            Ok(true) => {
                info!(
                    "event=article_create module=service status=ok article_id={} tag_count={}",
                    article.id,
                    article.tags.len()
                );
                Ok(())
            }
            Ok(false) => {
                warn!(
                    "event=article_create module=service status=conflict article_id={}",
                    article.id
                );
                Err(ArticleServiceError::Conflict(article.id))
            }
            Err(err) => Err(backend_failure("article_create", Some(article.id), err)),
        }
    }

    /// Replaces name, price and tag set of an existing article.
    pub fn replace(&mut self, article: &Article) -> ServiceResult<()> {
        match self.repo.update(article) {
            Ok(true) => {
                info!(
                    "event=article_replace module=service status=ok article_id={} tag_count={}",
                    article.id,
                    article.tags.len()
                );
                Ok(())
            }
            Ok(false) => {
                warn!(
                    "event=article_replace module=service status=not_found article_id={}",
                    article.id
                );
                Err(ArticleServiceError::NotFound(article.id))
            }
            Err(err) => Err(backend_failure("article_replace", Some(article.id), err)),
        }
    }

    /// Removes an article and its tags.
    pub fn remove(&mut self, id: ArticleId) -> ServiceResult<()> {
        match self.repo.delete(id) {
            Ok(true) => {
                info!("event=article_remove module=service status=ok article_id={id}");
                Ok(())
            }
            Ok(false) => {
                warn!("event=article_remove module=service status=not_found article_id={id}");
                Err(ArticleServiceError::NotFound(id))
            }
            Err(err) => Err(backend_failure("article_remove", Some(id), err)),
        }
    }
}

fn backend_failure(event: &str, id: Option<ArticleId>, err: RepoError) -> ArticleServiceError {
    match id {
        Some(id) => error!(
            "event={event} module=service status=error article_id={id} error_code=backend_failure error={err}"
        ),
        None => error!("event={event} module=service status=error error_code=backend_failure error={err}"),
    }
    ArticleServiceError::Repo(err)
}

#[cfg(test)]
mod tests {
    use super::{ArticleService, ArticleServiceError};
    use crate::model::article::{Article, ArticleId};
    use crate::repo::article_repo::{ArticleRepository, RepoError, RepoResult};
    use std::collections::BTreeMap;

    /// In-memory store that can be told to fail every call.
    #[derive(Default)]
    struct FakeRepo {
        rows: BTreeMap<ArticleId, Article>,
        broken: bool,
    }

    impl FakeRepo {
        fn check(&self) -> RepoResult<()> {
            if self.broken {
                Err(RepoError::InvalidData("broken fake".to_string()))
            } else {
                Ok(())
            }
        }
    }

    impl ArticleRepository for FakeRepo {
        fn list_all(&self) -> RepoResult<Vec<Article>> {
            self.check()?;
            Ok(self.rows.values().cloned().collect())
        }

        fn list_by_tag(&self, tag: &str) -> RepoResult<Vec<Article>> {
            self.check()?;
            Ok(self
                .rows
                .values()
                .filter(|article| article.has_tag(tag))
                .cloned()
                .collect())
        }

        fn get(&self, id: ArticleId) -> RepoResult<Option<Article>> {
            self.check()?;
            Ok(self.rows.get(&id).cloned())
        }

        fn insert(&mut self, article: &Article) -> RepoResult<bool> {
            self.check()?;
            if self.rows.contains_key(&article.id) {
                return Ok(false);
            }
            self.rows.insert(article.id, article.clone());
            Ok(true)
        }

        fn update(&mut self, article: &Article) -> RepoResult<bool> {
            self.check()?;
            match self.rows.get_mut(&article.id) {
                Some(slot) => {
                    *slot = article.clone();
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        fn delete(&mut self, id: ArticleId) -> RepoResult<bool> {
            self.check()?;
            Ok(self.rows.remove(&id).is_some())
        }
    }

    #[test]
    fn list_dispatches_on_tag_filter() {
        let mut service = ArticleService::new(FakeRepo::default());
        service
            .create(&Article::new(1, "Widget", 9.99).with_tags(["sale"]))
            .unwrap();
        service.create(&Article::new(2, "Gadget", 19.99)).unwrap();

        assert_eq!(service.list(None).unwrap().len(), 2);
        let sale = service.list(Some("sale")).unwrap();
        assert_eq!(sale.len(), 1);
        assert_eq!(sale[0].id, 1);
    }

    #[test]
    fn sentinels_map_to_named_outcomes() {
        let mut service = ArticleService::new(FakeRepo::default());
        let article = Article::new(5, "Bolt", 0.1);
        service.create(&article).unwrap();

        assert!(matches!(
            service.create(&article),
            Err(ArticleServiceError::Conflict(5))
        ));
        assert!(matches!(
            service.get_by_id(6),
            Err(ArticleServiceError::NotFound(6))
        ));
        assert!(matches!(
            service.replace(&Article::new(6, "Nut", 0.2)),
            Err(ArticleServiceError::NotFound(6))
        ));
        assert!(matches!(
            service.remove(6),
            Err(ArticleServiceError::NotFound(6))
        ));
    }

    #[test]
    fn backend_failures_surface_as_repo_errors() {
        let repo = FakeRepo {
            broken: true,
            ..FakeRepo::default()
        };
        let mut service = ArticleService::new(repo);

        assert!(matches!(service.list(None), Err(ArticleServiceError::Repo(_))));
        assert!(matches!(
            service.create(&Article::new(1, "Widget", 1.0)),
            Err(ArticleServiceError::Repo(_))
        ));
    }
}
