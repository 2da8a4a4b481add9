use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tokio::sync::OnceCell;

use crate::error::StoreError;
use crate::model::{Comment, MrtCarriage, MrtStream, Post, User};
use crate::repository::Repository;

/// Handle to the backing database.
///
/// A `Store` starts out unconnected; [`Store::init`] opens the pool and
/// applies the schema. Until then every repository call fails with
/// [`StoreError::NotInitialized`]. Clones share the same pool.
#[derive(Clone)]
pub struct Store {
    url: Arc<str>,
    conn: Arc<OnceCell<DatabaseConnection>>,
}

impl Store {
    pub fn new(url: impl Into<String>) -> Self {
        let url: String = url.into();
        Self {
            url: Arc::from(url),
            conn: Arc::new(OnceCell::new()),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Connects and creates missing tables. Safe to call more than once.
    pub async fn init(&self) -> Result<&DatabaseConnection, StoreError> {
        self.conn
            .get_or_try_init(|| async {
                ensure_sqlite_path(&self.url)?;
                let mut opts = ConnectOptions::new(self.url.to_string());
                if self.url.contains(":memory:") {
                    // every pooled connection would otherwise see its own empty database
                    opts.max_connections(1).min_connections(1);
                }
                let db = Database::connect(opts).await?;
                init_schema(&db).await?;
                info!("store connected: {}", self.url);
                Ok::<_, StoreError>(db)
            })
            .await
    }

    pub fn conn(&self) -> Result<&DatabaseConnection, StoreError> {
        self.conn.get().ok_or(StoreError::NotInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.conn.initialized()
    }

    pub fn users(&self) -> Repository<User> {
        Repository::new(self.clone())
    }

    pub fn posts(&self) -> Repository<Post> {
        Repository::new(self.clone())
    }

    pub fn comments(&self) -> Repository<Comment> {
        Repository::new(self.clone())
    }

    pub fn mrt_carriages(&self) -> Repository<MrtCarriage> {
        Repository::new(self.clone())
    }

    pub fn mrt_streams(&self) -> Repository<MrtStream> {
        Repository::new(self.clone())
    }
}

fn ensure_sqlite_path(url: &str) -> Result<(), StoreError> {
    let Some(raw) = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
    else {
        return Ok(());
    };
    let path = raw.split('?').next().unwrap_or(raw);
    if path.is_empty() || path.contains(":memory:") {
        return Ok(());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)?;
    Ok(())
}

async fn init_schema(db: &DatabaseConnection) -> Result<(), StoreError> {
    let backend = db.get_database_backend();
    let sql = include_str!("../schema-sqlite.sql");
    for stmt in split_sql(sql) {
        debug!("schema: {}", stmt.lines().next().unwrap_or_default());
        db.execute(Statement::from_string(backend, stmt)).await?;
    }
    Ok(())
}

fn split_sql(input: &str) -> Vec<String> {
    let mut buf = String::new();
    for line in input.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("--") || trimmed.is_empty() {
            continue;
        }
        buf.push_str(line);
        buf.push('\n');
    }
    buf.split(';')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// In-memory store for tests.
#[cfg(test)]
pub(crate) async fn memory_store() -> Store {
    let store = Store::new("sqlite::memory:");
    store.init().await.expect("in-memory store");
    store
}
