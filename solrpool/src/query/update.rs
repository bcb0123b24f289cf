//! Update and delete builders.
//!
//! Solr's JSON update format allows repeated `"add"` keys in one envelope,
//! which no JSON map type can express. The batch builders therefore assemble
//! their envelopes by hand, the individual documents still going through
//! serde.

use crate::job::{ResponseSender, ResponseSlot, SolrJob};
use crate::response::{Document, SolrResponse};
use serde_json::Value;
use tracing::error;

const UPDATE_HANDLER: &str = "update";

fn document_json(doc: &Document) -> String {
    match serde_json::to_string(&Value::Object(doc.clone())) {
        Ok(json) => json,
        Err(e) => {
            error!(error = %e, "failed to serialize update document");
            String::from("{}")
        }
    }
}

/// Creates or replaces a single document, committing immediately.
pub struct SolrUpdateQuery {
    /// The document to add.
    pub document: Document,

    slot: ResponseSlot,
}

impl SolrUpdateQuery {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            slot: ResponseSlot::new(),
        }
    }

    /// Blocks until this update's response arrives.
    pub async fn wait(&self) -> Option<SolrResponse> {
        self.slot.wait().await
    }
}

impl SolrJob for SolrUpdateQuery {
    fn handler(&self) -> &str {
        UPDATE_HANDLER
    }

    fn bytes(&self) -> Vec<u8> {
        format!(
            "{{\"add\":{{\"doc\":{}}}, \"commit\": {{}}}}",
            document_json(&self.document)
        )
        .into_bytes()
    }

    fn result_ch(&self) -> ResponseSender {
        self.slot.sender()
    }
}

/// Creates or replaces several documents in one request.
///
/// Without a `commitWithin` bound the envelope carries an explicit commit;
/// with one, the commit is left to the server's deadline.
pub struct SolrBatchUpdateQuery {
    /// The documents to add.
    pub documents: Vec<Document>,

    /// Soft-commit deadline in milliseconds, when set.
    pub commit_within: Option<u64>,

    slot: ResponseSlot,
}

impl SolrBatchUpdateQuery {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            commit_within: None,
            slot: ResponseSlot::new(),
        }
    }

    /// Like [`new`](Self::new), but lets the server commit within the given
    /// number of milliseconds instead of forcing one per batch.
    pub fn commit_within(documents: Vec<Document>, millis: u64) -> Self {
        let mut q = Self::new(documents);
        q.commit_within = Some(millis);
        q
    }

    /// Blocks until this update's response arrives.
    pub async fn wait(&self) -> Option<SolrResponse> {
        self.slot.wait().await
    }
}

impl SolrJob for SolrBatchUpdateQuery {
    fn handler(&self) -> &str {
        UPDATE_HANDLER
    }

    fn bytes(&self) -> Vec<u8> {
        let adds: Vec<String> = self
            .documents
            .iter()
            .map(|doc| match self.commit_within {
                Some(millis) => format!(
                    "\"add\":{{\"doc\":{},\"commitWithin\":{}}}",
                    document_json(doc),
                    millis
                ),
                None => format!("\"add\":{{\"doc\":{}}}", document_json(doc)),
            })
            .collect();

        let joined = adds.join(",");
        let envelope = match self.commit_within {
            Some(_) => format!("{{{}}}", joined),
            None => format!("{{{}, \"commit\": {{}}}}", joined),
        };

        envelope.into_bytes()
    }

    fn result_ch(&self) -> ResponseSender {
        self.slot.sender()
    }
}

/// Removes every document matching a query, committing immediately.
pub struct SolrDeleteQuery {
    match_query: String,
    slot: ResponseSlot,
}

impl SolrDeleteQuery {
    pub fn new(match_query: impl Into<String>) -> Self {
        Self {
            match_query: match_query.into(),
            slot: ResponseSlot::new(),
        }
    }

    /// Blocks until this delete's response arrives.
    pub async fn wait(&self) -> Option<SolrResponse> {
        self.slot.wait().await
    }
}

impl SolrJob for SolrDeleteQuery {
    fn handler(&self) -> &str {
        UPDATE_HANDLER
    }

    fn bytes(&self) -> Vec<u8> {
        let quoted = serde_json::to_string(&self.match_query)
            .unwrap_or_else(|_| String::from("\"\""));
        format!("{{\"delete\":{{\"query\":{}}}, \"commit\": {{}}}}", quoted).into_bytes()
    }

    fn result_ch(&self) -> ResponseSender {
        self.slot.sender()
    }
}

/// Removes documents by id, committing immediately.
pub struct SolrBatchDeleteQuery {
    /// Ids of the documents to remove.
    pub ids: Vec<String>,

    slot: ResponseSlot,
}

impl SolrBatchDeleteQuery {
    pub fn new(ids: Vec<String>) -> Self {
        Self {
            ids,
            slot: ResponseSlot::new(),
        }
    }

    /// Blocks until this delete's response arrives.
    pub async fn wait(&self) -> Option<SolrResponse> {
        self.slot.wait().await
    }
}

impl SolrJob for SolrBatchDeleteQuery {
    fn handler(&self) -> &str {
        UPDATE_HANDLER
    }

    fn bytes(&self) -> Vec<u8> {
        let ids = serde_json::to_string(&self.ids).unwrap_or_else(|_| String::from("[]"));
        format!("{{\"delete\":{}, \"commit\": {{}}}}", ids).into_bytes()
    }

    fn result_ch(&self) -> ResponseSender {
        self.slot.sender()
    }
}
