//! Flush one accumulated push batch through the transport session.

use std::io::Write;

use anyhow::Result;

use crate::pack::PackSource;
use crate::report::ReportStatus;
use crate::transport::{PushCommand, ReferenceUpdateRequest, TransportSession};

/// Build the reference-update request for a flushed batch, hand it to the
/// session, and write the resulting report-status block.
///
/// Every failure past this point is absorbed into the report: the protocol,
/// not the exit code, is the client's success signal for a push.
pub fn handle<S: TransportSession, W: Write>(
    session: &mut S,
    output: &mut W,
    batch: Vec<PushCommand>,
    pack_source: &mut dyn PackSource,
) -> Result<()> {
    let sources: Vec<String> = batch.iter().map(|c| c.source().to_string()).collect();

    let report = match pack_source.open_pack(&sources) {
        Ok(packfile) => session.receive_pack(ReferenceUpdateRequest {
            commands: batch,
            packfile,
        }),
        // Could not even produce a pack stream; report it as the unpack
        // outcome rather than killing the helper.
        Err(e) => ReportStatus::unpack_failure(e.to_string()),
    };

    report.encode(output)?;
    Ok(())
}
