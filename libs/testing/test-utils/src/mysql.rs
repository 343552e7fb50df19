//! MySQL test infrastructure
//!
//! Provides a `TestMySql` helper that starts a throwaway MySQL container.
//! Tables are created by each test with `execute`.

use sqlx::mysql::MySqlPool;
use testcontainers::ContainerAsync;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::mysql::Mysql;

/// Test database wrapper that ensures proper cleanup
///
/// The container is automatically stopped and removed when this struct is dropped.
pub struct TestMySql {
    #[allow(dead_code)]
    container: ContainerAsync<Mysql>,
    pub pool: MySqlPool,
    pub connection_string: String,
}

impl TestMySql {
    /// Start MySQL with an empty `test` database, connected as passwordless root
    pub async fn new() -> Self {
        let container = Mysql::default()
            .start()
            .await
            .expect("Failed to start MySQL container");

        let host_port = container
            .get_host_port_ipv4(3306)
            .await
            .expect("Failed to get host port");

        let connection_string = format!("mysql://root@127.0.0.1:{}/test", host_port);

        let pool = MySqlPool::connect(&connection_string)
            .await
            .expect("Failed to connect to test database");

        tracing::info!(port = host_port, "Test database ready (MySQL)");

        Self {
            container,
            pool,
            connection_string,
        }
    }

    /// Get a cloned pool (useful for passing to record sources)
    pub fn pool(&self) -> MySqlPool {
        self.pool.clone()
    }

    /// Run a single statement, panicking on failure
    pub async fn execute(&self, sql: &str) {
        sqlx::query(sql)
            .execute(&self.pool)
            .await
            .unwrap_or_else(|e| panic!("Failed to execute {:?}: {}", sql, e));
    }
}

// Container is automatically cleaned up when TestMySql is dropped
impl Drop for TestMySql {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test database container");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_database_creation() {
        let db = TestMySql::new().await;
        assert!(db.connection_string.starts_with("mysql://"));

        let (one,): (i64,) = sqlx::query_as("SELECT 1").fetch_one(&db.pool).await.unwrap();
        assert_eq!(one, 1);
    }
}
