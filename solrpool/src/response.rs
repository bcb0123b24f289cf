//! Solr response envelope and its decoder.
//!
//! The server replies with a JSON envelope:
//!
//! ```text
//! {"responseHeader": {"status": N, "QTime": N, ...},
//!  "response"?: {"numFound": N, "start": N, "docs": [doc...]},
//!  "facets"?: {...}}
//! ```
//!
//! Only `responseHeader` is required. If a `response` element is present it
//! must contain `docs`, even when empty. Documents are kept as opaque JSON
//! objects; interpreting them is the caller's business.

use crate::error::SolrError;
use serde_json::{Map, Value};

/// One opaque Solr document.
pub type Document = Map<String, Value>;

/// The documents of a response plus the server's result-set metrics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentCollection {
    /// Documents actually returned in this page.
    pub docs: Vec<Document>,

    /// Total matches irrespective of pagination.
    pub num_found: u64,

    /// Offset of this page within the full result set.
    pub start: u64,
}

/// A decoded Solr response.
///
/// Invariant: when `error` is set the remaining fields may be zero-valued;
/// when it is unset, `status` and `qtime` reflect the server's header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolrResponse {
    /// Server-reported status from `responseHeader.status`.
    pub status: i64,

    /// Server-side query time in milliseconds, from `responseHeader.QTime`.
    pub qtime: i64,

    /// Result documents, when the envelope carried a `response` element.
    pub docs: Option<DocumentCollection>,

    /// Raw facet data, when the envelope carried a `facets` element.
    pub facets: Option<Map<String, Value>>,

    /// Why this response does not reflect a server reply.
    pub error: Option<SolrError>,
}

impl SolrResponse {
    /// A response that carries nothing but an error.
    pub fn from_error(error: SolrError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    /// Decodes a raw HTTP body into a response.
    pub fn from_bytes(body: &[u8]) -> Result<Self, SolrError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| SolrError::Malformed(e.to_string()))?;
        Self::from_json(&value)
    }

    /// Builds a response from an already-parsed JSON envelope.
    pub fn from_json(value: &Value) -> Result<Self, SolrError> {
        let root = value
            .as_object()
            .ok_or_else(|| SolrError::Malformed("envelope is not a JSON object".into()))?;

        let header = root
            .get("responseHeader")
            .and_then(Value::as_object)
            .ok_or(SolrError::MissingResponseHeader)?;

        let status = header
            .get("status")
            .and_then(Value::as_i64)
            .ok_or(SolrError::InvalidHeader)?;
        let qtime = header
            .get("QTime")
            .and_then(Value::as_i64)
            .ok_or(SolrError::InvalidHeader)?;

        let docs = match root.get("response") {
            Some(response) => Some(decode_collection(response)?),
            None => None,
        };

        let facets = root.get("facets").and_then(Value::as_object).cloned();

        Ok(Self {
            status,
            qtime,
            docs,
            facets,
            error: None,
        })
    }
}

fn decode_collection(response: &Value) -> Result<DocumentCollection, SolrError> {
    let map = response
        .as_object()
        .ok_or(SolrError::UnexpectedResponseType)?;

    let docs_value = map.get("docs").ok_or(SolrError::MissingDocs)?;
    let entries = docs_value
        .as_array()
        .ok_or(SolrError::UnexpectedDocsType)?;

    // Total matches irrespective of what this page returned. Absent in some
    // pre-4.x servers, in which case it defaults to zero.
    let num_found = map.get("numFound").and_then(Value::as_u64).unwrap_or(0);
    let start = map.get("start").and_then(Value::as_u64).unwrap_or(0);

    let docs = entries
        .iter()
        .filter_map(Value::as_object)
        .cloned()
        .collect();

    Ok(DocumentCollection {
        docs,
        num_found,
        start,
    })
}
