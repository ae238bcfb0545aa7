//! For interacting with the database.
//!
//! Every request opens its own connection through [`Database::with_connection`]
//! and closes it again before responding.

use super::config::DatabaseConfig;
use futures::future::BoxFuture;
use sqlx::{
    mysql::{MySqlConnectOptions, MySqlConnection, MySqlPool},
    ConnectOptions, Connection, Executor,
};
use tracing::{instrument, log::LevelFilter};

/// A common database connection type.
pub type DbConnection = MySqlConnection;

/// Creates the item table if it is missing.
const CREATE_ITEMS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS items (
        id INT AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        quantity INT NOT NULL,
        description TEXT
    )
"#;

/// Knows how to reach the database, but holds no connections.
#[derive(Clone, Debug)]
pub struct Database {
    server: MySqlConnectOptions,
    name: String,
}

impl Database {
    /// Constructs a database handle from configuration.
    pub fn new(config: &DatabaseConfig) -> Self {
        let server = MySqlConnectOptions::new()
            .username(&config.username)
            .password(&config.password)
            .host(&config.host)
            .port(config.port)
            .log_statements(LevelFilter::Debug);
        Self::with_options(server, &config.database_name)
    }

    /// Constructs a database handle from server options and a database name.
    pub fn with_options(server: MySqlConnectOptions, name: &str) -> Self {
        Self {
            server,
            name: name.to_string(),
        }
    }

    /// Constructs a database handle that reaches the same database as `pool`.
    pub async fn from_pool(pool: &MySqlPool) -> Result<Self, sqlx::Error> {
        let name: Option<String> = sqlx::query_scalar("SELECT DATABASE()")
            .fetch_one(pool)
            .await?;
        let name = name.ok_or_else(|| {
            sqlx::Error::Configuration("pool is not connected to a database".into())
        })?;
        Ok(Self::with_options((*pool.connect_options()).clone(), &name))
    }

    /// The name of the application database.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Opens a new connection to the application database.
    #[instrument(skip(self), fields(database = %self.name))]
    pub async fn connect(&self) -> Result<DbConnection, sqlx::Error> {
        self.server.clone().database(&self.name).connect().await
    }

    /// Runs `f` on a fresh connection, which is released afterwards whether `f` succeeded or not.
    pub async fn with_connection<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: for<'c> FnOnce(&'c mut DbConnection) -> BoxFuture<'c, Result<R, E>> + Send,
        R: Send,
        E: From<sqlx::Error> + Send,
    {
        let mut conn = self.connect().await?;
        let result = f(&mut conn).await;
        release(conn).await;
        result
    }

    /// Ensures the application database and the item table exist.
    ///
    /// Safe to run any number of times.
    #[instrument(skip(self), fields(database = %self.name))]
    pub async fn bootstrap(&self) -> Result<(), sqlx::Error> {
        let mut conn = self.server.connect().await?;
        let result = provision(&mut conn, &self.name).await;
        release(conn).await;
        result?;
        tracing::info!("Database and table ensured");
        Ok(())
    }
}

/// Creates the database, switches to it and creates the table.
async fn provision(conn: &mut DbConnection, name: &str) -> Result<(), sqlx::Error> {
    let name = quote_identifier(name);
    // Plain strings go through the text protocol, which is required for `USE`.
    conn.execute(format!("CREATE DATABASE IF NOT EXISTS {name}").as_str())
        .await?;
    conn.execute(format!("USE {name}").as_str()).await?;
    conn.execute(CREATE_ITEMS_TABLE).await?;
    Ok(())
}

/// Closes a connection, logging rather than returning a failure to do so.
pub async fn release(conn: DbConnection) {
    if let Err(e) = conn.close().await {
        tracing::warn!("Failed to close database connection: {}", e);
    }
}

/// Quotes a MySQL identifier so it can be interpolated into a statement.
fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}
