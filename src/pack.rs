//! Packfile acquisition for push batches.
//!
//! The pack is an opaque byte stream here; its internal layout is git's
//! business. The helper only needs to produce one stream per batch, drain
//! it, and close it.

use std::io::{self, Read, Write};
use std::process::{Child, ChildStdout, Command, Stdio};

use anyhow::{Context, Result};

/// Opaque packfile byte stream, a scoped resource: it must be fully drained
/// and closed on every exit path of receive-pack.
pub trait PackStream: Read {
    /// Release the underlying resource. A read error takes precedence over a
    /// close error at the call site.
    fn close(&mut self) -> io::Result<()>;
}

/// Produces one pack stream per flushed push batch.
///
/// `sources` are the source halves of the batch's refspecs, in batch order.
pub trait PackSource {
    fn open_pack(&mut self, sources: &[String]) -> Result<Box<dyn PackStream>>;
}

/// Production pack source: spawns `git pack-objects --revs --stdout` in the
/// local repository and streams the packfile from the child's stdout.
pub struct GitPackSource;

impl PackSource for GitPackSource {
    fn open_pack(&mut self, sources: &[String]) -> Result<Box<dyn PackStream>> {
        let mut child = Command::new("git")
            .arg("pack-objects")
            .arg("--revs")
            .arg("--stdout")
            .arg("--thin")
            .arg("--delta-base-offset")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .context("Failed to spawn git pack-objects")?;

        // git pack-objects reads revs from stdin, one per line. Deletion
        // refspecs have no source and contribute no objects.
        {
            let stdin = child.stdin.as_mut().unwrap();
            for src in sources {
                if !src.is_empty() {
                    writeln!(stdin, "{}", src)
                        .context("Failed to write rev to git pack-objects")?;
                }
            }
        }
        drop(child.stdin.take());

        let stdout = child.stdout.take().unwrap();
        Ok(Box::new(GitPackStream { child, stdout }))
    }
}

struct GitPackStream {
    child: Child,
    stdout: ChildStdout,
}

impl Read for GitPackStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stdout.read(buf)
    }
}

impl PackStream for GitPackStream {
    fn close(&mut self) -> io::Result<()> {
        let status = self.child.wait()?;
        if !status.success() {
            return Err(io::Error::other(format!(
                "git pack-objects exited with {}",
                status
            )));
        }
        Ok(())
    }
}
