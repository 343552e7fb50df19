//! Shared test utilities for the similarity workspace
//!
//! - `TestMySql`: MySQL container with automatic cleanup (feature: "mysql")
//! - `in_memory_state`: both domains over one in-memory index and the
//!   hashing embedder (feature: "similarity")
//!
//! # Features
//!
//! - `mysql` (default): Enables MySQL test infrastructure
//! - `similarity` (default): Enables in-process domain wiring
//!
//! # Usage
//!
//! ```rust,no_run
//! use test_utils::TestMySql;
//!
//! #[tokio::test]
//! async fn my_mysql_test() {
//!     let db = TestMySql::new().await;
//!     db.execute("CREATE TABLE t (id INT PRIMARY KEY)").await;
//! }
//! ```

#[cfg(feature = "mysql")]
mod mysql;

#[cfg(feature = "similarity")]
mod similarity;

#[cfg(feature = "mysql")]
pub use mysql::TestMySql;

#[cfg(feature = "similarity")]
pub use similarity::{TestState, in_memory_state};
