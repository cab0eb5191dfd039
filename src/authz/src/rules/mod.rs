//! Security rules wired into a host
//!
//! The host routes a request to a protected operation, extracts the claims,
//! and asks a [`RuleChain`] for a decision. [`SecuredAttributesRule`] is the
//! rule that applies the per-operation attribute constraints.

mod chain;

pub use chain::{Outcome, RuleChain};

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::claims::ClaimsBag;
use crate::engine::AttributeRuleEvaluator;
use crate::error::Result;
use crate::types::{AttributeConstraint, Decision, OperationId, RequestContext};

/// Order of the generic secured-annotation rule
pub const SECURED_ANNOTATION_ORDER: i32 = 0;

/// A security rule consulted by the host for every request
pub trait SecurityRule: Send + Sync {
    /// Rules with a lower order run first
    fn order(&self) -> i32 {
        0
    }

    /// Decide on the request; `Unknown` defers to the next rule
    fn check(&self, request: &RequestContext, claims: Option<&ClaimsBag>) -> Result<Decision>;
}

/// Constraint lists attached to protected operations
///
/// Built once at startup, read-only afterwards. Declaration order of each
/// list is preserved.
#[derive(Debug, Clone, Default)]
pub struct OperationRules {
    operations: HashMap<OperationId, Arc<[AttributeConstraint]>>,
}

impl OperationRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach constraints to an operation, replacing any previous list
    pub fn secure(
        &mut self,
        operation: impl Into<OperationId>,
        constraints: Vec<AttributeConstraint>,
    ) -> &mut Self {
        self.operations.insert(operation.into(), constraints.into());
        self
    }

    /// Builder-style secure
    pub fn with_operation(
        mut self,
        operation: impl Into<OperationId>,
        constraints: Vec<AttributeConstraint>,
    ) -> Self {
        self.secure(operation, constraints);
        self
    }

    /// Constraints of an operation, empty if it declares none
    pub fn constraints(&self, operation: &str) -> &[AttributeConstraint] {
        self.operations.get(operation).map(|c| &c[..]).unwrap_or(&[])
    }

    pub fn contains(&self, operation: &str) -> bool {
        self.operations.contains_key(operation)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Applies the attribute constraints of the routed operation
#[derive(Debug, Clone)]
pub struct SecuredAttributesRule {
    operations: Arc<OperationRules>,
    evaluator: AttributeRuleEvaluator,
}

impl SecuredAttributesRule {
    /// Runs before the generic secured-annotation rule
    pub const ORDER: i32 = SECURED_ANNOTATION_ORDER - 100;

    pub fn new(operations: OperationRules, evaluator: AttributeRuleEvaluator) -> Self {
        Self {
            operations: Arc::new(operations),
            evaluator,
        }
    }

    pub fn operations(&self) -> &OperationRules {
        &self.operations
    }

    pub fn evaluator(&self) -> &AttributeRuleEvaluator {
        &self.evaluator
    }
}

impl SecurityRule for SecuredAttributesRule {
    fn order(&self) -> i32 {
        Self::ORDER
    }

    fn check(&self, request: &RequestContext, claims: Option<&ClaimsBag>) -> Result<Decision> {
        let Some(operation) = request.operation.as_deref() else {
            debug!(path = %request.path, "No routed operation, secured attributes rule abstains");
            return Ok(Decision::Unknown);
        };

        let constraints = self.operations.constraints(operation);
        if constraints.is_empty() {
            return Ok(Decision::Unknown);
        }

        debug!(operation, method = ?request.method, "Applying secured attributes");
        let empty = ClaimsBag::new();
        self.evaluator
            .evaluate(request, claims.unwrap_or(&empty), constraints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PatternCache;
    use crate::validator::ValidatorRegistry;

    fn rule() -> SecuredAttributesRule {
        let operations = OperationRules::new().with_operation(
            "GET /",
            vec![
                AttributeConstraint::contains("iss", ["myapp"]),
                AttributeConstraint::contains("sub", ["user"]),
            ],
        );
        let evaluator = AttributeRuleEvaluator::new(
            Arc::new(PatternCache::new()),
            Arc::new(ValidatorRegistry::with_defaults()),
        );
        SecuredAttributesRule::new(operations, evaluator)
    }

    #[test]
    fn test_no_operation_unknown() {
        let decision = rule().check(&RequestContext::new("/"), None).unwrap();
        assert_eq!(decision, Decision::Unknown);
    }

    #[test]
    fn test_undeclared_operation_unknown() {
        let request = RequestContext::new("/other").with_operation("GET /other");
        let claims = ClaimsBag::new().with_claim("iss", "myapp");
        assert_eq!(rule().check(&request, Some(&claims)).unwrap(), Decision::Unknown);
    }

    #[test]
    fn test_absent_claims_rejected() {
        let request = RequestContext::new("/").with_operation("GET /");
        assert_eq!(rule().check(&request, None).unwrap(), Decision::Rejected);
    }

    #[test]
    fn test_all_constraints_pass() {
        let request = RequestContext::new("/").with_operation("GET /");
        let claims = ClaimsBag::new()
            .with_claim("iss", "myapp")
            .with_claim("sub", "user");
        assert_eq!(rule().check(&request, Some(&claims)).unwrap(), Decision::Allowed);

        let claims = ClaimsBag::new()
            .with_claim("iss", "myapp")
            .with_claim("sub", "unknown-user");
        assert_eq!(rule().check(&request, Some(&claims)).unwrap(), Decision::Rejected);
    }

    #[test]
    fn test_order_precedes_secured_annotation() {
        assert!(rule().order() < SECURED_ANNOTATION_ORDER);
        assert_eq!(SecuredAttributesRule::ORDER, -100);
    }

    #[test]
    fn test_operation_rules_preserve_order() {
        let rules = rule();
        let constraints = rules.operations().constraints("GET /");
        assert_eq!(constraints.len(), 2);
        assert_eq!(constraints[0].name, "iss");
        assert_eq!(constraints[1].name, "sub");
        assert!(rules.operations().constraints("missing").is_empty());
    }
}
