//! Standalone `list-refs` subcommand: print the reference names of a
//! repository without entering the interactive helper loop.

use std::io::Write;

use anyhow::Result;

use crate::ledger::Ledger;

pub fn handle<L: Ledger, W: Write>(ledger: &L, uri: &str, output: &mut W) -> Result<()> {
    tracing::debug!(uri, "listing references");

    let refs = ledger.query_list_refs(uri)?;
    for name in &refs {
        writeln!(output, "{}", name)?;
    }

    Ok(())
}
