//! Ledger capability consumed by the transport session.
//!
//! The chain itself is an opaque collaborator: the helper only reads the
//! advertised reference map and submits one atomic reference-update
//! transaction per push batch.

mod node;

use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::repository::RepositoryCoordinate;

pub use node::NodeClient;

/// Reference advertisement returned by a ledger query.
///
/// An empty map is a valid answer: the repository has not been created yet
/// and the first push will create it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvertisedRefs {
    /// Reference name to object id. BTreeMap keeps listing output stable.
    #[serde(default)]
    pub references: BTreeMap<String, String>,
    /// Capability strings advertised by the module.
    #[serde(default)]
    pub capabilities: Vec<String>,
}

/// Query and submission interface against the chain.
///
/// Calls are synchronous and blocking from the caller's perspective; the
/// loop does not read the next command until they return.
pub trait Ledger {
    /// Reference map of the addressed repository. Empty when the repository
    /// does not exist yet; a read failure is fatal to the current command.
    fn query_advertised_references(&self, repo: &RepositoryCoordinate) -> Result<AdvertisedRefs>;

    /// Plain reference-name listing, used by the standalone list-refs
    /// command rather than the interactive loop.
    fn query_list_refs(&self, uri: &str) -> Result<Vec<String>>;

    /// Submit one reference-update transaction carrying the ordered refspecs
    /// and the packfile bytes, tagged with the submitting identity, and wait
    /// for its outcome. The transaction is atomic: one pass/fail signal for
    /// the whole batch.
    fn submit_reference_update(
        &self,
        repo: &RepositoryCoordinate,
        refspecs: &[String],
        packfile: &[u8],
    ) -> Result<()>;
}
