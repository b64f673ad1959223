use std::io::Write;

use anyhow::Result;

use crate::transport::TransportSession;

/// Handle the list / list for-push command.
///
/// One `<objectId> <name>` line per advertised reference, blank-line
/// terminated. An empty advertisement is a valid answer (the repository has
/// not been created yet), so a brand-new remote lists cleanly.
pub fn handle<S: TransportSession, W: Write>(session: &mut S, output: &mut W) -> Result<()> {
    let advertised = session.advertised_references()?;

    for (name, object_id) in &advertised.references {
        writeln!(output, "{} {}", object_id, name)?;
    }

    writeln!(output)?; // Empty line signals completion

    Ok(())
}
