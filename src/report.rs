//! Report-status block written back to git after a push.

use std::io::Write;

use anyhow::Result;

/// Outcome of one atomic ledger submission.
///
/// The ledger gives a single pass/fail signal for the whole transaction, so
/// there is nothing finer-grained to model: either every reference landed or
/// none did, with one shared reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    AllOk,
    AllFailed(String),
}

/// Status of one requested reference update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandStatus {
    pub reference: String,
    pub outcome: Result<(), String>,
}

impl CommandStatus {
    pub fn ok(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            outcome: Ok(()),
        }
    }

    pub fn error(reference: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            outcome: Err(message.into()),
        }
    }
}

/// The helper's sole output contract for a push: an unpack outcome plus one
/// status per requested reference, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportStatus {
    pub unpack: Result<(), String>,
    pub statuses: Vec<CommandStatus>,
}

impl ReportStatus {
    /// Report for a submission outcome: on success every reference is ok, on
    /// failure every reference carries the identical reason and the unpack
    /// line carries it too.
    pub fn from_outcome(outcome: SubmitOutcome, references: &[String]) -> Self {
        match outcome {
            SubmitOutcome::AllOk => Self {
                unpack: Ok(()),
                statuses: references
                    .iter()
                    .map(|r| CommandStatus::ok(r.as_str()))
                    .collect(),
            },
            SubmitOutcome::AllFailed(reason) => Self {
                unpack: Err(reason.clone()),
                statuses: references
                    .iter()
                    .map(|r| CommandStatus::error(r.as_str(), reason.clone()))
                    .collect(),
            },
        }
    }

    /// Report for a failure before any ledger call was made (packfile drain
    /// or close). No per-reference data exists at that point.
    pub fn unpack_failure(message: impl Into<String>) -> Self {
        Self {
            unpack: Err(message.into()),
            statuses: Vec::new(),
        }
    }

    /// Render the wire form: unpack line, one line per reference status,
    /// blank-line terminator.
    pub fn encode<W: Write>(&self, output: &mut W) -> Result<()> {
        match &self.unpack {
            Ok(()) => writeln!(output, "unpack ok")?,
            Err(msg) => writeln!(output, "unpack {}", msg)?,
        }

        for status in &self.statuses {
            match &status.outcome {
                Ok(()) => writeln!(output, "ok {}", status.reference)?,
                Err(msg) => writeln!(output, "ng {} {}", status.reference, msg)?,
            }
        }

        writeln!(output)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(report: &ReportStatus) -> String {
        let mut buf = Vec::new();
        report.encode(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_encode_all_ok() {
        let refs = vec![
            "refs/heads/master".to_string(),
            "refs/heads/dev".to_string(),
        ];
        let report = ReportStatus::from_outcome(SubmitOutcome::AllOk, &refs);
        assert_eq!(
            render(&report),
            "unpack ok\nok refs/heads/master\nok refs/heads/dev\n\n"
        );
    }

    #[test]
    fn test_encode_all_failed_broadcasts_same_reason() {
        let refs = vec!["refs/heads/a".to_string(), "refs/heads/b".to_string()];
        let report =
            ReportStatus::from_outcome(SubmitOutcome::AllFailed("tx rejected".to_string()), &refs);
        assert_eq!(
            render(&report),
            "unpack tx rejected\nng refs/heads/a tx rejected\nng refs/heads/b tx rejected\n\n"
        );
    }

    #[test]
    fn test_encode_unpack_failure_only() {
        let report = ReportStatus::unpack_failure("short read");
        assert_eq!(render(&report), "unpack short read\n\n");
    }

    #[test]
    fn test_statuses_match_request_order() {
        let refs: Vec<String> = (0..5).map(|i| format!("refs/heads/b{}", i)).collect();
        let report = ReportStatus::from_outcome(SubmitOutcome::AllOk, &refs);
        assert_eq!(report.statuses.len(), 5);
        for (status, name) in report.statuses.iter().zip(&refs) {
            assert_eq!(&status.reference, name);
            assert!(status.outcome.is_ok());
        }
    }
}
