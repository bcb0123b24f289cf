//! SolrPool - concurrent Solr client with a health-gated worker pool
//!
//! This library submits search-engine jobs (queries, updates, deletes) to one
//! or more remote Solr-compatible HTTP servers and delivers their responses
//! back to the submitters. A fixed-size pool of workers, each bound to a
//! single upstream endpoint, drains a shared job queue; a worker that detects
//! a transport fault removes itself from the dispatch set and periodically
//! probes its endpoint until it recovers, at which point it rejoins.
//!
//! # High-Level API
//!
//! ```ignore
//! use solrpool::client::HttpSolrClient;
//! use solrpool::pool::{Pool, PoolConfig};
//! use solrpool::query::SolrQuery;
//! use std::sync::Arc;
//!
//! let client = Arc::new(HttpSolrClient::new("http://localhost:8983", "products")?);
//! let pool = Pool::new(vec![client], PoolConfig::default());
//!
//! let pool_death = pool.run()?;
//!
//! let query = Arc::new(SolrQuery::new("name:chair", 0, 10, "select"));
//! pool.submit(query.clone()).await?;
//! let response = query.wait().await;
//!
//! pool.stop();
//! pool_death.await.ok();
//! ```

pub mod client;
pub mod error;
pub mod job;
pub mod logging;
pub mod pool;
pub mod query;
pub mod response;

/// Version of the SolrPool library.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
