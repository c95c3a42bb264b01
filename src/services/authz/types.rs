/*
 * Responsibility
 * - gateway から渡される invocation record と、返却する Decision の型
 * - field 名は gateway の契約どおり (camelCase) に固定する
 */
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Inbound invocation record.
///
/// Unknown fields are ignored; gateways send far more than we read.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub request_context: Option<RequestContext>,
}

impl RequestEnvelope {
    #[cfg(test)]
    pub fn with_headers<I, K, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            headers: Some(
                headers
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            request_context: None,
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_context
            .as_ref()
            .and_then(|c| c.request_id.as_deref())
    }

    pub fn path(&self) -> Option<&str> {
        self.request_context
            .as_ref()
            .and_then(|c| c.http.as_ref())
            .and_then(|h| h.path.as_deref())
    }
}

/// Observability-only metadata. Never consulted for the decision.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub http: Option<HttpContext>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpContext {
    #[serde(default)]
    pub path: Option<String>,
}

/// Authorization outcome returned to the gateway.
///
/// `context` is advisory and only present on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub is_authorized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl Decision {
    pub fn allow(context: BTreeMap<String, String>) -> Self {
        Self {
            is_authorized: true,
            context: Some(context),
        }
    }

    pub fn deny() -> Self {
        Self {
            is_authorized: false,
            context: None,
        }
    }

    pub fn principal_id(&self) -> Option<&str> {
        self.context
            .as_ref()
            .and_then(|c| c.get("principalId"))
            .map(String::as_str)
    }
}
