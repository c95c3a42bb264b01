/*
 * Responsibility
 * - 受け入れ可能な credential の集合 (起動時に一度だけ構築, 以後 immutable)
 * - ValidationMode (allowlist / allow-if-present) の定義
 * - Authorization ヘッダからの credential 抽出
 */
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

const AUTHORIZATION: &str = "authorization";
const BEARER_PREFIX: &str = "Bearer ";

/// Closed set of credential strings considered valid.
///
/// - Members are compared with exact string equality.
/// - An empty set validates nothing.
/// - `Debug` prints only the count so the set can sit in state that gets logged.
#[derive(Clone, Default)]
pub struct AcceptedCredentials {
    values: HashSet<String>,
}

impl AcceptedCredentials {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, candidate: &str) -> bool {
        self.values.contains(candidate)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for AcceptedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcceptedCredentials")
            .field("len", &self.values.len())
            .finish()
    }
}

/// How a present credential is validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Credential must be a member of [`AcceptedCredentials`].
    #[default]
    Allowlist,
    /// Any non-empty credential is accepted. Migration path only.
    AllowIfPresent,
}

impl ValidationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allowlist => "allowlist",
            Self::AllowIfPresent => "allow-if-present",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown validation mode: {0}")]
pub struct UnknownValidationMode(pub String);

impl FromStr for ValidationMode {
    type Err = UnknownValidationMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allowlist" => Ok(Self::Allowlist),
            "allow-if-present" | "allow_if_present" => Ok(Self::AllowIfPresent),
            other => Err(UnknownValidationMode(other.to_string())),
        }
    }
}

/// Finds the `authorization` header value, ignoring name casing.
///
/// An exact lowercase key wins; otherwise the first case-insensitive match in
/// key order. Empty values count as absent.
pub fn extract_credential(headers: &BTreeMap<String, String>) -> Option<&str> {
    let value = match headers.get(AUTHORIZATION) {
        Some(v) => Some(v.as_str()),
        None => headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(AUTHORIZATION))
            .map(|(_, v)| v.as_str()),
    };

    value.filter(|v| !v.is_empty())
}

/// Strips the literal `"Bearer "` prefix once. Case-sensitive.
pub fn strip_bearer(raw: &str) -> &str {
    raw.strip_prefix(BEARER_PREFIX).unwrap_or(raw)
}
