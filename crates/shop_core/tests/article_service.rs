use shop_core::db::open_db_in_memory;
use shop_core::{Article, ArticleService, ArticleServiceError, SqliteArticleRepository};
use std::collections::BTreeSet;

fn seeded_service(conn: &mut rusqlite::Connection) -> ArticleService<SqliteArticleRepository<'_>> {
    let repo = SqliteArticleRepository::try_new(conn).unwrap();
    let mut service = ArticleService::new(repo);
    service
        .create(&Article::new(1, "Widget", 9.99).with_tags(["sale", "new"]))
        .unwrap();
    service
        .create(&Article::new(2, "Gadget", 19.99).with_tags(["new"]))
        .unwrap();
    service
}

fn ids(articles: &[Article]) -> BTreeSet<i64> {
    articles.iter().map(|article| article.id).collect()
}

#[test]
fn catalog_example_lookups() {
    let mut conn = open_db_in_memory().unwrap();
    let service = seeded_service(&mut conn);

    assert_eq!(ids(&service.list(Some("new")).unwrap()), BTreeSet::from([1, 2]));
    assert_eq!(ids(&service.list(Some("sale")).unwrap()), BTreeSet::from([1]));
    assert_eq!(ids(&service.list(None).unwrap()), BTreeSet::from([1, 2]));
    assert!(matches!(
        service.get_by_id(3),
        Err(ArticleServiceError::NotFound(3))
    ));
}

#[test]
fn create_with_taken_id_is_conflict() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = seeded_service(&mut conn);

    let err = service.create(&Article::new(2, "Other", 1.0)).unwrap_err();
    assert!(matches!(err, ArticleServiceError::Conflict(2)));
    assert_eq!(service.get_by_id(2).unwrap().name, "Gadget");
}

#[test]
fn replace_then_get_returns_replacement() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = seeded_service(&mut conn);

    let revised = Article::new(2, "Gadget II", 24.0).with_tags(["refurbished"]);
    service.replace(&revised).unwrap();
    assert_eq!(service.get_by_id(2).unwrap(), revised);
    assert_eq!(ids(&service.list(Some("new")).unwrap()), BTreeSet::from([1]));

    let err = service.replace(&Article::new(5, "Nope", 1.0)).unwrap_err();
    assert!(matches!(err, ArticleServiceError::NotFound(5)));
}

#[test]
fn remove_then_get_is_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = seeded_service(&mut conn);

    service.remove(1).unwrap();
    assert!(matches!(
        service.get_by_id(1),
        Err(ArticleServiceError::NotFound(1))
    ));
    assert!(matches!(
        service.remove(1),
        Err(ArticleServiceError::NotFound(1))
    ));
    assert!(service.list(Some("sale")).unwrap().is_empty());
}
