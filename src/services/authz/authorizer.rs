//! Authorization decision.
//!
//! `decide` is a pure function of the envelope and the injected configuration.
//! `authorize_raw` and `decide_guarded` are the boundaries used by the HTTP
//! handlers: they never fail and never panic outward; every fault becomes a
//! denial plus a diagnostic that carries no request content.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use serde_json::error::Category;
use thiserror::Error;
use uuid::Uuid;

use super::credentials::{AcceptedCredentials, ValidationMode, extract_credential, strip_bearer};
use super::types::{Decision, RequestEnvelope};

thread_local! {
    static GUARDED: Cell<bool> = const { Cell::new(false) };
}

/// True while the current thread is inside the fail-closed boundary.
///
/// The panic hook uses this to let the unwind reach `catch_unwind`.
pub fn in_guarded_evaluation() -> bool {
    GUARDED.with(Cell::get)
}

/// Internal faults of the decision path. Never surfaced to the caller.
///
/// `MalformedEnvelope` keeps only the position and category of the parse
/// error; serde's message quotes the offending value, which may be a credential.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthzError {
    #[error("malformed request envelope ({category} error at line {line} column {column})")]
    MalformedEnvelope {
        category: &'static str,
        line: usize,
        column: usize,
    },
    #[error("panic during evaluation")]
    Panicked,
}

impl From<serde_json::Error> for AuthzError {
    fn from(err: serde_json::Error) -> Self {
        let category = match err.classify() {
            Category::Io => "io",
            Category::Syntax => "syntax",
            Category::Data => "data",
            Category::Eof => "eof",
        };
        Self::MalformedEnvelope {
            category,
            line: err.line(),
            column: err.column(),
        }
    }
}

/// Advisory fields attached to a successful decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessContext {
    pub principal_id: String,
    pub username: String,
}

impl Default for SuccessContext {
    fn default() -> Self {
        Self {
            principal_id: "user".to_string(),
            username: "authenticated-user".to_string(),
        }
    }
}

impl SuccessContext {
    fn to_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("principalId".to_string(), self.principal_id.clone()),
            ("username".to_string(), self.username.clone()),
        ])
    }
}

#[derive(Debug, Clone, Default)]
pub struct Authorizer {
    credentials: AcceptedCredentials,
    mode: ValidationMode,
    success: SuccessContext,
}

impl Authorizer {
    pub fn new(
        credentials: AcceptedCredentials,
        mode: ValidationMode,
        success: SuccessContext,
    ) -> Self {
        Self {
            credentials,
            mode,
            success,
        }
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Evaluates one envelope and emits the decision log record.
    pub fn decide(&self, envelope: &RequestEnvelope) -> Decision {
        let (credential_present, decision) = self.evaluate(envelope);
        self.log_decision(envelope, credential_present, &decision);
        decision
    }

    /// `decide` behind the fail-closed boundary.
    pub fn decide_guarded(&self, envelope: &RequestEnvelope) -> Decision {
        self.guarded(|| self.decide(envelope))
            .unwrap_or_else(|err| deny_on_fault(&err))
    }

    /// Fail-closed boundary over a raw invocation record.
    pub fn authorize_raw(&self, body: &[u8]) -> Decision {
        match serde_json::from_slice::<RequestEnvelope>(body) {
            Ok(envelope) => self.decide_guarded(&envelope),
            Err(err) => deny_on_fault(&AuthzError::from(err)),
        }
    }

    fn guarded(&self, f: impl FnOnce() -> Decision) -> Result<Decision, AuthzError> {
        let prev = GUARDED.replace(true);
        let result = panic::catch_unwind(AssertUnwindSafe(f));
        GUARDED.set(prev);
        result.map_err(|_| AuthzError::Panicked)
    }

    fn evaluate(&self, envelope: &RequestEnvelope) -> (bool, Decision) {
        let Some(raw) = envelope.headers.as_ref().and_then(extract_credential) else {
            return (false, Decision::deny());
        };

        let candidate = strip_bearer(raw);
        let valid = match self.mode {
            ValidationMode::Allowlist => self.credentials.contains(candidate),
            ValidationMode::AllowIfPresent => true,
        };

        let decision = if valid {
            Decision::allow(self.success.to_map())
        } else {
            Decision::deny()
        };
        (true, decision)
    }

    fn log_decision(
        &self,
        envelope: &RequestEnvelope,
        credential_present: bool,
        decision: &Decision,
    ) {
        let request_id = envelope
            .request_id()
            .map(str::to_owned)
            .unwrap_or_else(|| format!("local-{}", Uuid::new_v4()));

        tracing::info!(
            request_id = %request_id,
            path = envelope.path().unwrap_or("-"),
            credential_present,
            authorized = decision.is_authorized,
            mode = self.mode.as_str(),
            "authorization decision"
        );
    }
}

fn deny_on_fault(err: &AuthzError) -> Decision {
    tracing::warn!(error = %err, "authorization fault; denying");
    Decision::deny()
}
