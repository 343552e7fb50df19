//! Integration tests for the MySQL record sources
//!
//! These tests use real MySQL via testcontainers to ensure:
//! - Each domain query keeps only publishable rows
//! - Rows with a NULL title or description are skipped instead of failing the load
//! - The bulk loader indexes exactly what the source returns

use std::sync::Arc;

use domain_similarity::*;
use test_utils::TestMySql;

const PROBLEMS_TABLE: &str = "CREATE TABLE problems (
    id INT PRIMARY KEY,
    title VARCHAR(255) NULL,
    description TEXT NULL,
    status TINYINT NOT NULL
)";

const PLACES_TABLE: &str = "CREATE TABLE places (
    id INT PRIMARY KEY,
    name VARCHAR(255) NULL,
    description TEXT NULL,
    active TINYINT NOT NULL
)";

async fn seeded_problems() -> TestMySql {
    let db = TestMySql::new().await;
    db.execute(PROBLEMS_TABLE).await;
    db.execute(
        "INSERT INTO problems (id, title, description, status) VALUES
            (1, 'Brake noise', 'Squeal when stopping', 1),
            (2, 'Battery', 'Drains overnight', 0),
            (3, NULL, 'Orphan description', 1),
            (4, 'Clutch', '', 1),
            (5, 'Gearbox', NULL, 1),
            (6, 'Wipers', 'Streak in rain', 1)",
    )
    .await;
    db
}

async fn seeded_places() -> TestMySql {
    let db = TestMySql::new().await;
    db.execute(PLACES_TABLE).await;
    db.execute(
        "INSERT INTO places (id, name, description, active) VALUES
            (10, 'Colosseum', 'Ancient amphitheatre', 1),
            (11, NULL, 'Nameless square', 1),
            (12, 'Closed museum', 'Shut for renovation', 0),
            (13, 'Trevi Fountain', '', 1),
            (14, 'Pantheon', NULL, 1),
            (15, 'Vatican Museums', 'Sistine Chapel', 1)",
    )
    .await;
    db
}

// ============================================================================
// Record Source Tests
// ============================================================================

#[tokio::test]
async fn test_autoinsider_source_returns_only_publishable_problems() {
    let db = seeded_problems().await;
    let source = MySqlRecordSource::from_pool(db.pool(), Domain::AutoInsider);

    let records = source.fetch_records().await.unwrap();

    assert_eq!(
        records,
        vec![
            Record::new("1", "Brake noise", "Brake noise Squeal when stopping"),
            Record::new("6", "Wipers", "Wipers Streak in rain"),
        ]
    );
}

#[tokio::test]
async fn test_erg_source_returns_only_active_places() {
    let db = seeded_places().await;
    let source = MySqlRecordSource::from_pool(db.pool(), Domain::EuropeanRailGuide);

    let records = source.fetch_records().await.unwrap();

    assert_eq!(
        records,
        vec![
            Record::new("10", "Colosseum", "Colosseum Ancient amphitheatre"),
            Record::new("15", "Vatican Museums", "Vatican Museums Sistine Chapel"),
        ]
    );
}

#[tokio::test]
async fn test_source_with_only_untitled_rows_returns_nothing() {
    let db = TestMySql::new().await;
    db.execute(PROBLEMS_TABLE).await;
    db.execute(
        "INSERT INTO problems (id, title, description, status) VALUES
            (1, NULL, 'First orphan', 1),
            (2, NULL, 'Second orphan', 1)",
    )
    .await;

    let source = MySqlRecordSource::from_pool(db.pool(), Domain::AutoInsider);

    assert_eq!(source.fetch_records().await.unwrap(), Vec::<Record>::new());
}

#[tokio::test]
async fn test_source_reports_missing_table_as_source_error() {
    let db = TestMySql::new().await;
    let source = MySqlRecordSource::from_pool(db.pool(), Domain::EuropeanRailGuide);

    let err = source.fetch_records().await.unwrap_err();
    assert!(matches!(err, SimilarityError::Source(_)), "{err:?}");
}

// ============================================================================
// Bulk Load Tests
// ============================================================================

#[tokio::test]
async fn test_bulk_load_skips_untitled_rows() {
    let db = seeded_problems().await;
    let service = Arc::new(ContentService::new(
        Domain::AutoInsider,
        InMemoryIndex::new(),
        Arc::new(HashingEmbedder),
    ));

    let loader = BulkLoader::new(
        MySqlRecordSource::from_pool(db.pool(), Domain::AutoInsider),
        service.clone(),
    );
    let report = loader.run(LoadOptions { rebuild: true }).await.unwrap();

    assert_eq!(
        report,
        LoadReport {
            fetched: 2,
            indexed: 2,
            pages: 1
        }
    );
    assert_eq!(service.index_info().await.unwrap().unwrap().points, 2);

    let matches = service.get_similar_for("wipers streak in rain", 1).await.unwrap();
    assert_eq!(matches[0].id, "6");
}
