use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::{define_sql_function, SqliteConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::fmt;
use std::time::Duration;

pub mod auth;
pub mod edge;
pub mod friend;
pub mod recipe;
pub mod user;

pub type DbThreadPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

define_sql_function! {
    fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

#[derive(Debug)]
struct SqlitePragmas {
    busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis(),
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn create_db_thread_pool(
    database_path: &str,
    max_db_connections: u32,
    idle_timeout: Duration,
    busy_timeout: Duration,
) -> Result<DbThreadPool, r2d2::Error> {
    Pool::builder()
        .max_size(max_db_connections)
        .idle_timeout(Some(idle_timeout))
        .connection_customizer(Box::new(SqlitePragmas { busy_timeout }))
        .build(ConnectionManager::<SqliteConnection>::new(database_path))
}

pub fn run_migrations(db_thread_pool: &DbThreadPool) -> Result<(), DaoError> {
    let mut db_connection = db_thread_pool.get()?;
    let applied = db_connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DaoError::MigrationFailure(e.to_string()))?;

    for version in applied {
        log::info!("Applied migration {version}");
    }

    Ok(())
}

/// Drops every table and recreates the schema from scratch.
pub fn reset_database(db_thread_pool: &DbThreadPool) -> Result<(), DaoError> {
    let mut db_connection = db_thread_pool.get()?;
    db_connection
        .revert_all_migrations(MIGRATIONS)
        .map_err(|e| DaoError::MigrationFailure(e.to_string()))?;

    drop(db_connection);
    run_migrations(db_thread_pool)
}

/// Builds a `LIKE` pattern that matches `term` anywhere in a column passed
/// through SQLite's `lower()`. Only ASCII letters are folded, the same as
/// `lower()` and `LIKE` do. `%`, `_` and `\` in the term are matched
/// literally; the pattern must be used with `escape('\\')`.
pub(crate) fn substring_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');

    for c in term.to_ascii_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }

        pattern.push(c);
    }

    pattern.push('%');
    pattern
}

#[derive(Debug)]
pub enum DaoError {
    DbThreadPoolFailure(r2d2::Error),
    QueryFailure(diesel::result::Error),
    MigrationFailure(String),
    AlreadyExists(&'static str),
    CannotRunQuery(&'static str),
}

impl std::error::Error for DaoError {}

impl fmt::Display for DaoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaoError::DbThreadPoolFailure(e) => {
                write!(f, "DaoError: Failed to obtain DB connection: {e}")
            }
            DaoError::QueryFailure(e) => {
                write!(f, "DaoError: Query failed: {e}")
            }
            DaoError::MigrationFailure(e) => {
                write!(f, "DaoError: Migration failed: {e}")
            }
            DaoError::AlreadyExists(field) => {
                write!(f, "DaoError: A row with the same {field} already exists")
            }
            DaoError::CannotRunQuery(msg) => {
                write!(f, "DaoError: Cannot run query: {msg}")
            }
        }
    }
}

impl From<r2d2::Error> for DaoError {
    fn from(error: r2d2::Error) -> Self {
        DaoError::DbThreadPoolFailure(error)
    }
}

impl From<diesel::result::Error> for DaoError {
    fn from(error: diesel::result::Error) -> Self {
        DaoError::QueryFailure(error)
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils {
    use tempfile::TempDir;

    use super::*;
    use crate::models::recipe::Recipe;
    use crate::models::user::User;

    /// A freshly migrated database that lives as long as this value.
    pub struct TestDb {
        pub pool: DbThreadPool,
        _dir: TempDir,
    }

    impl TestDb {
        pub fn new() -> Self {
            let dir = tempfile::tempdir().expect("Failed to create temp dir for test DB");
            let path = dir.path().join("potluck-test.db");

            let pool = create_db_thread_pool(
                path.to_str().expect("Temp path should be valid UTF-8"),
                4,
                Duration::from_secs(30),
                Duration::from_secs(5),
            )
            .expect("Failed to create test DB pool");

            run_migrations(&pool).expect("Failed to migrate test DB");

            TestDb { pool, _dir: dir }
        }

        pub fn create_user(&self, name: &str) -> User {
            user::Dao::new(&self.pool)
                .create_user(name, &format!("{name}@example.com"), "not-a-real-hash")
                .expect("Failed to create test user")
        }

        pub fn create_recipe(&self, author: &User, name: &str) -> Recipe {
            recipe::Dao::new(&self.pool)
                .create_recipe(author, name, "[]", "[]", "")
                .expect("Failed to create test recipe")
        }
    }
}
