use crate::{Result, TestInfraError};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;
use std::time::Duration;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::ImageExt;
use testcontainers::{ContainerAsync, GenericImage};
use tracing::debug;
use typed_builder::TypedBuilder;

const MYSQL_PORT: u16 = 3306;

#[derive(Debug, Clone, TypedBuilder)]
pub struct MysqlConfig {
    #[builder(default = "8.4".to_string())]
    tag: String,
    #[builder(default = "snaplink".to_string())]
    database: String,
    #[builder(default = "snaplink".to_string())]
    username: String,
    #[builder(default = "snaplink".to_string())]
    password: String,
    /// Connection attempts made by [`MySqlServer::connect_pool`].
    #[builder(default = 20)]
    ready_attempts: u32,
    #[builder(default = Duration::from_millis(500))]
    ready_interval: Duration,
}

/// Disposable MySQL server for the storage integration tests.
///
/// The official image logs "ready for connections" once for its temporary
/// init server and again for the real one, so the log wait alone can return
/// before the database accepts clients. [`MySqlServer::connect_pool`] keeps
/// retrying until a query goes through. The container is removed on drop.
pub struct MySqlServer {
    container: ContainerAsync<GenericImage>,
    config: MysqlConfig,
}

impl MySqlServer {
    pub async fn new(config: MysqlConfig) -> Result<Self> {
        let container = GenericImage::new("mysql", config.tag.as_str())
            .with_exposed_port(MYSQL_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stderr("ready for connections"))
            .with_env_var("MYSQL_DATABASE", config.database.as_str())
            .with_env_var("MYSQL_USER", config.username.as_str())
            .with_env_var("MYSQL_PASSWORD", config.password.as_str())
            .with_env_var("MYSQL_ROOT_PASSWORD", "root")
            .start()
            .await?;

        Ok(Self { container, config })
    }

    /// Connection string for the test database, usable as a sqlx DSN.
    pub async fn database_url(&self) -> Result<String> {
        let host = self.container.get_host().await?;
        let port = self.container.get_host_port_ipv4(MYSQL_PORT).await?;
        Ok(format!(
            "mysql://{}:{}@{}:{}/{}",
            self.config.username, self.config.password, host, port, self.config.database
        ))
    }

    /// Opens a pool once the server answers `SELECT 1`.
    pub async fn connect_pool(&self, max_connections: u32) -> Result<MySqlPool> {
        let url = self.database_url().await?;
        let mut last_error = None;

        for attempt in 1..=self.config.ready_attempts {
            match Self::try_connect(&url, max_connections).await {
                Ok(pool) => return Ok(pool),
                Err(err) => {
                    debug!(attempt, error = %err, "mysql not ready yet");
                    last_error = Some(err);
                    tokio::time::sleep(self.config.ready_interval).await;
                }
            }
        }

        Err(TestInfraError::NotReady {
            attempts: self.config.ready_attempts,
            last_error: last_error.map(|err| err.to_string()).unwrap_or_default(),
        })
    }

    async fn try_connect(url: &str, max_connections: u32) -> sqlx::Result<MySqlPool> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = MysqlConfig::builder().build();
        assert_eq!(config.tag, "8.4");
        assert_eq!(config.database, "snaplink");
        assert_eq!(config.ready_attempts, 20);
        assert_eq!(config.ready_interval, Duration::from_millis(500));
    }

    #[test]
    fn not_ready_reports_attempts() {
        let err = TestInfraError::NotReady {
            attempts: 3,
            last_error: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "MySQL not ready after 3 attempts: connection refused"
        );
    }
}
