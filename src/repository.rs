use std::fmt;

use crate::error::Error;

/// Identity of a ledger-hosted repository, parsed once from the URL git
/// hands the helper: `joystream://<chain>/<owner>/<name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryCoordinate {
    pub chain_id: String,
    pub owner: String,
    pub name: String,
}

impl RepositoryCoordinate {
    /// Parse a `joystream://<chain>/<owner>/<name>` URL.
    ///
    /// Git may strip the scheme before invoking the helper, so a bare
    /// `<chain>/<owner>/<name>` is accepted too. Anything other than exactly
    /// three non-empty path segments is a format error.
    pub fn parse(url: &str) -> Result<Self, Error> {
        let path = url.strip_prefix("joystream://").unwrap_or(url);

        let segments: Vec<&str> = path.split('/').collect();
        if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
            return Err(Error::Format(format!("'{}'", url)));
        }

        Ok(Self {
            chain_id: segments[0].to_string(),
            owner: segments[1].to_string(),
            name: segments[2].to_string(),
        })
    }

    /// Path form used in ledger query routes: `<chain>/<owner>/<name>`.
    pub fn uri(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RepositoryCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.chain_id, self.owner, self.name)
    }
}
