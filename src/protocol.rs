//! Remote-helper command loop.
//!
//! Reads one command per line from git, dispatches it, and writes responses.
//! `push` lines accumulate into a batch; a blank line flushes the batch as a
//! single receive-pack call. The loop is single-threaded and does not read
//! the next line until the current handler, ledger calls included, returns.

use std::io::{BufRead, Write};

use anyhow::Result;

use crate::commands;
use crate::error::Error;
use crate::pack::PackSource;
use crate::transport::{PushCommand, TransportSession};

pub fn run<S, P, R, W>(session: &mut S, pack_source: &mut P, input: R, mut output: W) -> Result<()>
where
    S: TransportSession,
    P: PackSource,
    R: BufRead,
    W: Write,
{
    let mut batch: Vec<PushCommand> = Vec::new();

    for line in input.lines() {
        let line = line?;
        let line = line.trim();

        tracing::debug!(command = line, "received command");

        if line.is_empty() {
            // Batch terminator. A blank line with nothing queued is a no-op.
            if !batch.is_empty() {
                let flushed = std::mem::take(&mut batch);
                commands::push::handle(session, &mut output, flushed, pack_source)?;
            }
            output.flush()?;
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "capabilities" => {
                commands::capabilities::handle(&mut output)?;
            }
            "list" => {
                match (parts.get(1), parts.len()) {
                    (None, _) => {}
                    // for-push needs no special handling here, the
                    // advertisement is the same either way
                    (Some(&"for-push"), 2) => {}
                    _ => {
                        return Err(
                            Error::Protocol(format!("bad list request: '{}'", line)).into()
                        );
                    }
                }
                commands::list::handle(session, &mut output)?;
            }
            "push" => match parts.get(1) {
                Some(refspec) if !refspec.is_empty() => {
                    batch.push(PushCommand::new(*refspec));
                }
                _ => {
                    return Err(Error::Protocol("push requires a refspec".to_string()).into());
                }
            },
            cmd => {
                return Err(Error::Protocol(format!("unknown command '{}'", cmd)).into());
            }
        }

        output.flush()?;
    }

    if !batch.is_empty() {
        // Input closed before the batch terminator arrived. A half-stated
        // batch is never submitted; the caller owed us a blank line.
        eprintln!(
            "git-remote-joystream: input closed with {} unterminated push command(s), dropping batch",
            batch.len()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::io::Read;

    use super::*;
    use crate::ledger::AdvertisedRefs;
    use crate::pack::testing::MemoryPackSource;
    use crate::report::{ReportStatus, SubmitOutcome};
    use crate::transport::ReferenceUpdateRequest;

    struct MockSession {
        refs: BTreeMap<String, String>,
        outcome: SubmitOutcome,
        received: Vec<Vec<String>>,
    }

    impl MockSession {
        fn ok() -> Self {
            Self {
                refs: BTreeMap::new(),
                outcome: SubmitOutcome::AllOk,
                received: Vec::new(),
            }
        }
    }

    impl TransportSession for MockSession {
        fn advertised_references(&mut self) -> Result<AdvertisedRefs> {
            Ok(AdvertisedRefs {
                references: self.refs.clone(),
                capabilities: Vec::new(),
            })
        }

        fn receive_pack(&mut self, mut request: ReferenceUpdateRequest) -> ReportStatus {
            let mut drained = Vec::new();
            request.packfile.read_to_end(&mut drained).unwrap();
            request.packfile.close().unwrap();

            self.received.push(
                request
                    .commands
                    .iter()
                    .map(|c| c.refspec().to_string())
                    .collect(),
            );
            let destinations: Vec<String> = request
                .commands
                .iter()
                .map(|c| c.destination().to_string())
                .collect();
            ReportStatus::from_outcome(self.outcome.clone(), &destinations)
        }
    }

    fn run_session(session: &mut MockSession, input: &str) -> Result<String> {
        let mut pack_source = MemoryPackSource::new(b"PACK".to_vec());
        let mut output = Vec::new();
        let result = run(session, &mut pack_source, input.as_bytes(), &mut output);
        result.map(|_| String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_capabilities_scenario() {
        let mut session = MockSession::ok();
        let output = run_session(&mut session, "capabilities\n\n").unwrap();
        assert_eq!(output, "push\n\n");
    }

    #[test]
    fn test_list_empty_repository() {
        let mut session = MockSession::ok();
        let output = run_session(&mut session, "list\n\n").unwrap();
        assert_eq!(output, "\n");
    }

    #[test]
    fn test_list_for_push_prints_refs() {
        let mut session = MockSession::ok();
        session
            .refs
            .insert("refs/heads/master".to_string(), "a".repeat(40));
        let output = run_session(&mut session, "list for-push\n\n").unwrap();
        assert_eq!(output, format!("{} refs/heads/master\n\n", "a".repeat(40)));
    }

    #[test]
    fn test_list_with_bad_argument_is_protocol_error() {
        let mut session = MockSession::ok();
        let err = run_session(&mut session, "list sideways\n").unwrap_err();
        assert!(err.to_string().contains("bad list request"));
    }

    #[test]
    fn test_single_push_scenario() {
        let mut session = MockSession::ok();
        let output =
            run_session(&mut session, "push refs/heads/master:refs/heads/master\n\n").unwrap();
        assert_eq!(output, "unpack ok\nok refs/heads/master\n\n");
    }

    #[test]
    fn test_two_pushes_one_blank_line_one_submission() {
        let mut session = MockSession::ok();
        let input = "push refs/heads/a:refs/heads/a\npush refs/heads/b:refs/heads/b\n\n";
        let output = run_session(&mut session, input).unwrap();

        assert_eq!(session.received.len(), 1);
        assert_eq!(
            session.received[0],
            vec!["refs/heads/a:refs/heads/a", "refs/heads/b:refs/heads/b"]
        );
        assert_eq!(output, "unpack ok\nok refs/heads/a\nok refs/heads/b\n\n");
    }

    #[test]
    fn test_duplicate_destinations_both_reported() {
        let mut session = MockSession::ok();
        let input = "push refs/heads/a:refs/heads/x\npush refs/heads/b:refs/heads/x\n\n";
        let output = run_session(&mut session, input).unwrap();

        // Both commands go to the ledger in order; last wins there, but each
        // submitted command gets its own status line.
        assert_eq!(session.received.len(), 1);
        assert_eq!(session.received[0].len(), 2);
        assert_eq!(output, "unpack ok\nok refs/heads/x\nok refs/heads/x\n\n");
    }

    #[test]
    fn test_failed_submission_reports_every_ref() {
        let mut session = MockSession::ok();
        session.outcome = SubmitOutcome::AllFailed("rejected".to_string());
        let input = "push refs/heads/a:refs/heads/a\npush refs/heads/b:refs/heads/b\n\n";
        let output = run_session(&mut session, input).unwrap();
        assert_eq!(
            output,
            "unpack rejected\nng refs/heads/a rejected\nng refs/heads/b rejected\n\n"
        );
    }

    #[test]
    fn test_blank_line_with_empty_batch_is_noop() {
        let mut session = MockSession::ok();
        let output = run_session(&mut session, "\n\n\n").unwrap();
        assert_eq!(output, "");
        assert!(session.received.is_empty());
    }

    #[test]
    fn test_eof_with_pending_batch_drops_it() {
        let mut session = MockSession::ok();
        let output = run_session(&mut session, "push refs/heads/a:refs/heads/a\n").unwrap();
        assert_eq!(output, "");
        assert!(session.received.is_empty());
    }

    #[test]
    fn test_push_without_refspec_is_protocol_error() {
        let mut session = MockSession::ok();
        assert!(run_session(&mut session, "push\n").is_err());
    }

    #[test]
    fn test_unknown_command_is_protocol_error() {
        let mut session = MockSession::ok();
        let err = run_session(&mut session, "fetch deadbeef refs/heads/a\n").unwrap_err();
        assert!(err.to_string().contains("unknown command"));
    }

    #[test]
    fn test_two_batches_two_submissions() {
        let mut session = MockSession::ok();
        let mut pack_source = MemoryPackSource::new(b"PACK".to_vec());
        let input = "push refs/heads/a:refs/heads/a\n\npush refs/heads/b:refs/heads/b\n\n";
        let mut output = Vec::new();
        run(&mut session, &mut pack_source, input.as_bytes(), &mut output).unwrap();

        assert_eq!(session.received.len(), 2);
        // One pack stream per flushed batch.
        assert_eq!(pack_source.opened, 2);
    }
}
