//! Transport session: turns a flushed push batch into one ledger
//! transaction and ledger outcomes back into a report-status value.

use anyhow::Result;

use crate::error::Error;
use crate::ledger::{AdvertisedRefs, Ledger};
use crate::pack::PackStream;
use crate::report::{ReportStatus, SubmitOutcome};
use crate::repository::RepositoryCoordinate;

/// One raw `src:dst` token from a `push` command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushCommand {
    refspec: String,
}

impl PushCommand {
    pub fn new(refspec: impl Into<String>) -> Self {
        Self {
            refspec: refspec.into(),
        }
    }

    pub fn refspec(&self) -> &str {
        &self.refspec
    }

    /// Source half of the refspec. Empty for deletion refspecs.
    pub fn source(&self) -> &str {
        match self.refspec.split_once(':') {
            Some((src, _)) => src,
            None => &self.refspec,
        }
    }

    /// Destination reference the status lines are keyed on.
    pub fn destination(&self) -> &str {
        match self.refspec.split_once(':') {
            Some((_, dst)) => dst,
            None => &self.refspec,
        }
    }
}

/// One flushed push batch: the ordered commands plus the opaque packfile
/// stream. Ownership moves into the session for the duration of one
/// receive-pack call.
pub struct ReferenceUpdateRequest {
    pub commands: Vec<PushCommand>,
    pub packfile: Box<dyn PackStream>,
}

/// Reference advertisement plus receive-pack, over some backend.
///
/// `receive_pack` is infallible by construction: every failure mode is
/// absorbed into the returned report so the git client hears about it over
/// the normal protocol channel.
pub trait TransportSession {
    fn advertised_references(&mut self) -> Result<AdvertisedRefs>;
    fn receive_pack(&mut self, request: ReferenceUpdateRequest) -> ReportStatus;
}

/// Ledger-backed transport session.
pub struct LedgerSession<L: Ledger> {
    ledger: L,
    repo: RepositoryCoordinate,
}

impl<L: Ledger> LedgerSession<L> {
    pub fn new(ledger: L, repo: RepositoryCoordinate) -> Self {
        Self { ledger, repo }
    }
}

impl<L: Ledger> TransportSession for LedgerSession<L> {
    fn advertised_references(&mut self) -> Result<AdvertisedRefs> {
        tracing::debug!(repo = %self.repo, "querying advertised references");
        self.ledger.query_advertised_references(&self.repo)
    }

    fn receive_pack(&mut self, mut request: ReferenceUpdateRequest) -> ReportStatus {
        let pack = match drain_packfile(request.packfile.as_mut()) {
            Ok(bytes) => bytes,
            Err(e) => {
                // The ledger was never reached, so no per-reference data
                // exists; the unpack line carries the whole story.
                return ReportStatus::unpack_failure(e.to_string());
            }
        };

        let refspecs: Vec<String> = request
            .commands
            .iter()
            .map(|c| c.refspec().to_string())
            .collect();
        let destinations: Vec<String> = request
            .commands
            .iter()
            .map(|c| c.destination().to_string())
            .collect();

        tracing::debug!(
            repo = %self.repo,
            commands = refspecs.len(),
            pack_bytes = pack.len(),
            "submitting push batch"
        );

        // The transaction is atomic: one signal for the whole batch, so a
        // failure is broadcast identically to every reference.
        let outcome = match self
            .ledger
            .submit_reference_update(&self.repo, &refspecs, &pack)
        {
            Ok(()) => SubmitOutcome::AllOk,
            Err(e) => SubmitOutcome::AllFailed(e.to_string()),
        };

        ReportStatus::from_outcome(outcome, &destinations)
    }
}

/// Fully drain the packfile stream, closing it on every path. A read
/// failure is an encode error and takes precedence over a close failure.
fn drain_packfile(pack: &mut dyn PackStream) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    let read_result = pack.read_to_end(&mut buf);
    let close_result = pack.close();

    match (read_result, close_result) {
        (Err(e), _) => Err(Error::Encode(e.to_string())),
        (Ok(_), Err(e)) => Err(Error::Close(e.to_string())),
        (Ok(_), Ok(())) => Ok(buf),
    }
}
