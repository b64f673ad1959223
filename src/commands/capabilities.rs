use std::io::Write;

use anyhow::Result;

/// Handle the capabilities command.
///
/// The advertisement is static: this helper only knows how to push.
pub fn handle<W: Write>(output: &mut W) -> Result<()> {
    writeln!(output, "push")?;
    writeln!(output)?; // Empty line signals completion

    Ok(())
}
