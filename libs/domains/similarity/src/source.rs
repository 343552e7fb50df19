use async_trait::async_trait;
use core_config::mysql::MySqlConfig;
use sqlx::FromRow;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};

use crate::domain::Domain;
use crate::error::ServiceResult;
use crate::models::Record;

/// Read-only export of every indexable record of one domain.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_records(&self) -> ServiceResult<Vec<Record>>;
}

// Published problems with a title and a description.
const AUTOINSIDER_QUERY: &str = r#"
SELECT CAST(p.id AS CHAR) AS id,
       p.title AS title,
       CONCAT(p.title, ' ', p.description) AS context
FROM problems p
WHERE p.title IS NOT NULL
  AND p.description IS NOT NULL
  AND p.description <> ''
  AND p.status = 1
ORDER BY p.id
"#;

// Active places with a name and a description.
const ERG_QUERY: &str = r#"
SELECT CAST(pl.id AS CHAR) AS id,
       pl.name AS title,
       CONCAT(pl.name, ' ', pl.description) AS context
FROM places pl
WHERE pl.name IS NOT NULL
  AND pl.description IS NOT NULL
  AND pl.description <> ''
  AND pl.active = 1
ORDER BY pl.id
"#;

#[derive(Debug, FromRow)]
struct SourceRow {
    id: String,
    title: String,
    context: String,
}

impl From<SourceRow> for Record {
    fn from(row: SourceRow) -> Self {
        Record {
            id: row.id,
            title: row.title,
            context: row.context,
        }
    }
}

/// MySQL-backed source with a fixed query per domain.
pub struct MySqlRecordSource {
    pool: MySqlPool,
    domain: Domain,
}

impl MySqlRecordSource {
    pub async fn connect(config: &MySqlConfig, domain: Domain) -> ServiceResult<Self> {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        let pool = MySqlPoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await?;

        tracing::info!(
            host = %config.host,
            database = %config.database,
            domain = %domain,
            "Connected to MySQL"
        );
        Ok(Self::from_pool(pool, domain))
    }

    pub fn from_pool(pool: MySqlPool, domain: Domain) -> Self {
        Self { pool, domain }
    }

    pub fn query_for(domain: Domain) -> &'static str {
        match domain {
            Domain::AutoInsider => AUTOINSIDER_QUERY,
            Domain::EuropeanRailGuide => ERG_QUERY,
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl RecordSource for MySqlRecordSource {
    async fn fetch_records(&self) -> ServiceResult<Vec<Record>> {
        let rows: Vec<SourceRow> = sqlx::query_as(Self::query_for(self.domain))
            .fetch_all(&self.pool)
            .await?;

        tracing::info!(domain = %self.domain, rows = rows.len(), "Fetched records");
        Ok(rows.into_iter().map(Record::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries_select_record_columns() {
        for domain in Domain::ALL {
            let query = MySqlRecordSource::query_for(domain);
            for column in ["AS id", "AS title", "AS context"] {
                assert!(query.contains(column), "{domain}: missing {column}");
            }
        }
    }

    #[test]
    fn test_queries_apply_domain_filters() {
        assert!(MySqlRecordSource::query_for(Domain::AutoInsider).contains("p.status = 1"));
        assert!(MySqlRecordSource::query_for(Domain::EuropeanRailGuide).contains("pl.active = 1"));
    }

    // CONCAT yields NULL when the title is NULL, which cannot decode into a String.
    #[test]
    fn test_queries_skip_rows_without_title() {
        assert!(MySqlRecordSource::query_for(Domain::AutoInsider).contains("p.title IS NOT NULL"));
        assert!(MySqlRecordSource::query_for(Domain::EuropeanRailGuide).contains("pl.name IS NOT NULL"));
    }

    #[test]
    fn test_row_into_record() {
        let record = Record::from(SourceRow {
            id: "5".into(),
            title: "Rome".into(),
            context: "Rome Eternal city".into(),
        });
        assert_eq!(record, Record::new("5", "Rome", "Rome Eternal city"));
    }
}
