//! Link-driven pagination.
//!
//! Search responses carry an optional `next` link in the collection's link
//! list. A [`RecordPage`] holds one decoded page plus the capability to
//! follow that link lazily; a page without a `next` link is the terminal
//! signal.

use std::sync::Arc;

use url::Url;

use crate::client::executor::RequestExecutor;
use crate::envelope::{decode_collection, extract_link, Envelope, Record};
use crate::errors::{EnvelopeError, TeamSnapResult};

/// One page of search results.
pub struct RecordPage {
    records: Vec<Record>,
    next: Option<Url>,
    executor: Arc<RequestExecutor>,
}

impl RecordPage {
    pub(crate) fn from_envelope(
        envelope: &Envelope,
        executor: Arc<RequestExecutor>,
    ) -> TeamSnapResult<Self> {
        let records = decode_collection(envelope)?;
        let next = match extract_link(&envelope.collection.links, "next") {
            Some(href) => Some(Url::parse(href).map_err(|_| EnvelopeError::InvalidLink {
                rel: "next".to_string(),
                href: href.to_string(),
            })?),
            None => None,
        };
        Ok(Self {
            records,
            next,
            executor,
        })
    }

    /// The records on this page, in response order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consumes the page, returning its records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Iterates the records on this page.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Number of records on this page.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if this page has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns true if a further page exists.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Fetches the next page lazily. `Ok(None)` signals the end of
    /// pagination.
    pub async fn next(&self) -> TeamSnapResult<Option<RecordPage>> {
        match &self.next {
            None => Ok(None),
            Some(url) => {
                let envelope = self.executor.get_envelope_at(url.clone()).await?;
                Ok(Some(Self::from_envelope(&envelope, self.executor.clone())?))
            }
        }
    }

    /// Follows `next` links to exhaustion and returns every record.
    pub async fn collect_all(self) -> TeamSnapResult<Vec<Record>> {
        let mut all = Vec::new();
        let mut current = self;
        loop {
            let following = current.next().await?;
            all.append(&mut current.records);
            match following {
                Some(page) => current = page,
                None => break,
            }
        }
        Ok(all)
    }
}

impl std::fmt::Debug for RecordPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordPage")
            .field("records", &self.records.len())
            .field("next", &self.next.as_ref().map(Url::as_str))
            .finish()
    }
}
