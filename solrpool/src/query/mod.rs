//! Query builders implementing [`SolrJob`].
//!
//! [`SolrQuery`] covers the JSON request API's search envelope:
//!
//! ```text
//! {"query": S, ["sort": S,] ["filter": S,] ["facet": S,]
//!  "params": {"wt": "json", "start": N, "rows": N, ...}}
//! ```
//!
//! Update and delete builders live in [`update`].

mod update;

pub use update::{
    SolrBatchDeleteQuery, SolrBatchUpdateQuery, SolrDeleteQuery, SolrUpdateQuery,
};

use crate::job::{ResponseSender, ResponseSlot, SolrJob};
use crate::response::SolrResponse;
use serde_json::{json, Map, Value};
use tracing::error;

/// A search request against a named handler.
///
/// `filter`, `facet` and `sort` are transmitted as raw strings in the
/// envelope; the server parses them, this library does not.
pub struct SolrQuery {
    /// Main query string, e.g. `name:chair`.
    pub query: String,

    /// Pagination offset.
    pub start: usize,

    /// Pagination page size.
    pub rows: usize,

    /// Raw JSON filter query.
    pub filter: Option<String>,

    /// Raw JSON facet query.
    pub facet: Option<String>,

    /// Field ordering expression.
    pub sort: Option<String>,

    /// Extra entries for the envelope's `params` object. `wt` is preset to
    /// `json`; `start` and `rows` are filled in at serialization time.
    pub params: Map<String, Value>,

    handler: String,
    slot: ResponseSlot,
}

impl SolrQuery {
    /// Creates a query for the given handler (usually `select`).
    pub fn new(query: impl Into<String>, start: usize, rows: usize, handler: impl Into<String>) -> Self {
        let mut params = Map::new();
        params.insert("wt".into(), json!("json"));

        Self {
            query: query.into(),
            start,
            rows,
            filter: None,
            facet: None,
            sort: None,
            params,
            handler: handler.into(),
            slot: ResponseSlot::new(),
        }
    }

    /// Creates a spatial query, presetting the `fq`, `pt` and `d` params
    /// for the given spatial filter type and field.
    #[allow(clippy::too_many_arguments)]
    pub fn spatial(
        query: impl Into<String>,
        spatial_type: &str,
        spatial_field: &str,
        lat: f64,
        lon: f64,
        distance: f64,
        start: usize,
        rows: usize,
        handler: impl Into<String>,
    ) -> Self {
        let mut q = Self::new(query, start, rows, handler);
        q.params.insert(
            "fq".into(),
            json!(format!("{{!{} sfield={}}}", spatial_type, spatial_field)),
        );
        q.params.insert("pt".into(), json!(format!("{:.6},{:.6}", lat, lon)));
        q.params.insert("d".into(), json!(format!("{:.6}", distance)));
        q
    }

    /// Sets a raw JSON filter query.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Sets a raw JSON facet query.
    pub fn with_facet(mut self, facet: impl Into<String>) -> Self {
        self.facet = Some(facet.into());
        self
    }

    /// Sets the sort expression.
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Adds an arbitrary entry to the envelope's `params` object.
    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Blocks until this query's response arrives.
    pub async fn wait(&self) -> Option<SolrResponse> {
        self.slot.wait().await
    }
}

impl SolrJob for SolrQuery {
    fn handler(&self) -> &str {
        &self.handler
    }

    fn bytes(&self) -> Vec<u8> {
        let mut envelope = Map::new();
        envelope.insert("query".into(), json!(self.query));

        if let Some(sort) = &self.sort {
            envelope.insert("sort".into(), json!(sort));
        }
        if let Some(filter) = &self.filter {
            envelope.insert("filter".into(), json!(filter));
        }
        if let Some(facet) = &self.facet {
            envelope.insert("facet".into(), json!(facet));
        }

        let mut params = self.params.clone();
        params.insert("start".into(), json!(self.start));
        params.insert("rows".into(), json!(self.rows));
        envelope.insert("params".into(), Value::Object(params));

        serialize_envelope(&Value::Object(envelope))
    }

    fn result_ch(&self) -> ResponseSender {
        self.slot.sender()
    }

    fn start(&self) -> usize {
        self.start
    }

    fn rows(&self) -> usize {
        self.rows
    }
}

/// Serializes an envelope, logging instead of propagating the (practically
/// unreachable) failure so `bytes()` stays infallible for the client.
pub(crate) fn serialize_envelope(envelope: &Value) -> Vec<u8> {
    match serde_json::to_vec(envelope) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(error = %e, "failed to serialize query envelope");
            Vec::new()
        }
    }
}
