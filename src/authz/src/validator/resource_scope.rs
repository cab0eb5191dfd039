//! Resource id / scope validator

use tracing::debug;

use super::AttributeValidator;
use crate::claims::ClaimsBag;
use crate::types::{Decision, RequestContext};

/// Allows the request if its resource id is one of the principal's scopes
///
/// The resource id is the last segment of the request path, so
/// `/resource/abc-123` requires `abc-123` in the scope claim.
#[derive(Debug, Clone)]
pub struct ResourceIdScopeValidator {
    claim: String,
}

impl ResourceIdScopeValidator {
    /// Registry id of the built-in instance
    pub const ID: &'static str = "resource-id-scope";

    /// Default scope claim name
    pub const SCOPES_CLAIM: &'static str = "scp";

    /// Validator reading scopes from a custom claim
    pub fn with_claim(claim: impl Into<String>) -> Self {
        Self {
            claim: claim.into(),
        }
    }
}

impl Default for ResourceIdScopeValidator {
    fn default() -> Self {
        Self::with_claim(Self::SCOPES_CLAIM)
    }
}

impl AttributeValidator for ResourceIdScopeValidator {
    fn validate(&self, request: &RequestContext, claims: &ClaimsBag) -> Decision {
        let resource_id = request.resource_id();
        let scopes = claims.values(&self.claim);
        debug!(resource_id, claim = %self.claim, ?scopes, "Checking resource id against scopes");
        Decision::from_pass(scopes.iter().any(|scope| scope == resource_id))
    }
}
