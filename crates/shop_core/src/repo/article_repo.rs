//! Article store contract and SQLite implementation.
//!
//! # Responsibility
//! - Map `Article`/`Tag` rows to the `Article` aggregate and back.
//! - Own tag fan-out writes and wholesale tag replacement.
//!
//! # Invariants
//! - Every read path builds aggregates through `parse_article_row`.
//! - Write paths check existence inside the same `IMMEDIATE` transaction as
//!   their mutations; a rejected write leaves no rows changed.
//! - Deleting an article removes its `Tag` rows too.
//! - Writes reject non-finite prices before touching any row.
//! - "Not found" and "already exists" are reported as `None`/`false`, never
//!   as `Err`. `Err` always means the backend failed.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::article::{Article, ArticleId};
use rusqlite::{params, Connection, Row, TransactionBehavior};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const ARTICLE_SELECT_SQL: &str = "SELECT id, name, price FROM Article";

pub type RepoResult<T> = Result<T, RepoError>;

/// Store-level failure. Semantic outcomes (missing, duplicate) are not here.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted article data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for catalog articles.
pub trait ArticleRepository {
    /// Returns every article with its tag set, in backend order.
    fn list_all(&self) -> RepoResult<Vec<Article>>;
    /// Returns every article whose tag set contains `tag` (exact match).
    fn list_by_tag(&self, tag: &str) -> RepoResult<Vec<Article>>;
    /// Looks up one article by id. `None` when absent.
    fn get(&self, id: ArticleId) -> RepoResult<Option<Article>>;
    /// Writes a new article and its tags. `false` when the id is taken.
    fn insert(&mut self, article: &Article) -> RepoResult<bool>;
    /// Overwrites name/price and replaces the tag set. `false` when absent.
    fn update(&mut self, article: &Article) -> RepoResult<bool>;
    /// Removes an article and its tags. `false` when absent.
    fn delete(&mut self, id: ArticleId) -> RepoResult<bool>;
}

/// SQLite-backed article store over an injected connection.
pub struct SqliteArticleRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteArticleRepository<'conn> {
    /// Wraps a connection prepared by `db::open_db`/`db::open_db_in_memory`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema is not
    ///   the catalog schema.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ArticleRepository for SqliteArticleRepository<'_> {
    fn list_all(&self) -> RepoResult<Vec<Article>> {
        let mut stmt = self.conn.prepare(&format!("{ARTICLE_SELECT_SQL};"))?;
        let mut rows = stmt.query([])?;
        let mut articles = Vec::new();
        while let Some(row) = rows.next()? {
            articles.push(parse_article_row(self.conn, row)?);
        }
        Ok(articles)
    }

    fn list_by_tag(&self, tag: &str) -> RepoResult<Vec<Article>> {
        let ids = load_article_ids_for_tag(self.conn, tag)?;
        let mut articles = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(article) = fetch_article(self.conn, id)? {
                articles.push(article);
            }
        }
        Ok(articles)
    }

    fn get(&self, id: ArticleId) -> RepoResult<Option<Article>> {
        fetch_article(self.conn, id)
    }

    fn insert(&mut self, article: &Article) -> RepoResult<bool> {
        ensure_finite_price(article.id, article.price)?;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if article_exists(&tx, article.id)? {
            return Ok(false);
        }

        let inserted = tx.execute(
            "INSERT INTO Article (id, name, price) VALUES (?1, ?2, ?3);",
            params![article.id, article.name.as_str(), article.price],
        );
        match inserted {
            Ok(_) => {}
            Err(err) if is_primary_key_violation(&err) => return Ok(false),
            Err(err) => return Err(err.into()),
        }

        insert_tags(&tx, article.id, &article.tags)?;
        tx.commit()?;
        Ok(true)
    }

    fn update(&mut self, article: &Article) -> RepoResult<bool> {
        ensure_finite_price(article.id, article.price)?;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !article_exists(&tx, article.id)? {
            return Ok(false);
        }

        tx.execute(
            "UPDATE Article SET name = ?2, price = ?3 WHERE id = ?1;",
            params![article.id, article.name.as_str(), article.price],
        )?;
        tx.execute("DELETE FROM Tag WHERE article_id = ?1;", [article.id])?;
        insert_tags(&tx, article.id, &article.tags)?;

        tx.commit()?;
        Ok(true)
    }

    fn delete(&mut self, id: ArticleId) -> RepoResult<bool> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM Tag WHERE article_id = ?1;", [id])?;
        let changed = tx.execute("DELETE FROM Article WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Ok(false);
        }

        tx.commit()?;
        Ok(true)
    }
}

/// Builds one aggregate from an `Article` row plus its `Tag` rows.
fn parse_article_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Article> {
    let id: ArticleId = row.get("id")?;
    let price: f64 = row.get("price")?;
    ensure_finite_price(id, price)?;

    Ok(Article {
        id,
        name: row.get("name")?,
        price,
        tags: load_tags(conn, id)?,
    })
}

/// Rejects `inf` and `NaN`; only finite prices round-trip through `Article`.
fn ensure_finite_price(id: ArticleId, price: f64) -> RepoResult<()> {
    if price.is_finite() {
        Ok(())
    } else {
        Err(RepoError::InvalidData(format!(
            "non-finite price `{price}` for article id {id}"
        )))
    }
}

fn fetch_article(conn: &Connection, id: ArticleId) -> RepoResult<Option<Article>> {
    let mut stmt = conn.prepare(&format!("{ARTICLE_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_article_row(conn, row)?)),
        None => Ok(None),
    }
}

fn load_tags(conn: &Connection, article_id: ArticleId) -> RepoResult<BTreeSet<String>> {
    let mut stmt = conn.prepare("SELECT name FROM Tag WHERE article_id = ?1;")?;
    let mut rows = stmt.query([article_id])?;
    let mut tags = BTreeSet::new();
    while let Some(row) = rows.next()? {
        tags.insert(row.get::<_, String>(0)?);
    }
    Ok(tags)
}

fn load_article_ids_for_tag(conn: &Connection, tag: &str) -> RepoResult<Vec<ArticleId>> {
    let mut stmt = conn.prepare("SELECT article_id FROM Tag WHERE name = ?1;")?;
    let mut rows = stmt.query([tag])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        ids.push(row.get(0)?);
    }
    Ok(ids)
}

fn insert_tags(conn: &Connection, article_id: ArticleId, tags: &BTreeSet<String>) -> RepoResult<()> {
    let mut stmt = conn.prepare("INSERT INTO Tag (article_id, name) VALUES (?1, ?2);")?;
    for tag in tags {
        stmt.execute(params![article_id, tag.as_str()])?;
    }
    Ok(())
}

fn article_exists(conn: &Connection, id: ArticleId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM Article WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn is_primary_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let required: [(&'static str, &[&'static str]); 2] = [
        ("Article", &["id", "name", "price"]),
        ("Tag", &["article_id", "name"]),
    ];
    for (table, columns) in required {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
