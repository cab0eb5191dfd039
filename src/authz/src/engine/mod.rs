//! Attribute rule evaluation
//!
//! Constraints form a conjunction evaluated left to right. The first
//! `Rejected` step decides the request and the remaining constraints are
//! never touched, so later patterns are not compiled and later validators
//! are not invoked.

pub mod metrics;

pub use metrics::{EvaluatorMetrics, MetricsCollector};

use std::sync::Arc;
use tracing::{debug, warn};

use crate::claims::ClaimsBag;
use crate::error::Result;
use crate::pattern::PatternCache;
use crate::types::{AttributeConstraint, ConstraintStrategy, Decision, RequestContext};
use crate::validator::ValidatorRegistry;

/// Evaluates ordered constraint lists against a claims bag
///
/// Holds no per-call state; one instance is shared by all requests.
///
/// ```text
/// constraints ─► strategy ─► Membership ─► ClaimsBag::values ∩ contains
///                         ├─► Pattern ────► PatternCache ─► full match
///                         └─► Custom ─────► ValidatorRegistry ─► validate
/// ```
#[derive(Debug, Clone)]
pub struct AttributeRuleEvaluator {
    /// Compiled pattern cache
    patterns: Arc<PatternCache>,

    /// Custom validators
    validators: Arc<ValidatorRegistry>,

    /// Evaluation counters
    metrics: Arc<MetricsCollector>,
}

impl AttributeRuleEvaluator {
    /// Create an evaluator over the given cache and registry
    pub fn new(patterns: Arc<PatternCache>, validators: Arc<ValidatorRegistry>) -> Self {
        Self {
            patterns,
            validators,
            metrics: Arc::new(MetricsCollector::new()),
        }
    }

    /// Evaluator over the process-wide pattern cache
    pub fn with_registry(validators: ValidatorRegistry) -> Self {
        Self::new(PatternCache::shared(), Arc::new(validators))
    }

    /// Decide on a request
    ///
    /// Returns `Unknown` for an empty constraint list. Otherwise returns
    /// `Rejected` as soon as one constraint rejects, or the result of the
    /// last constraint. A custom validator's result, including `Unknown`, is
    /// taken verbatim.
    ///
    /// # Errors
    ///
    /// A malformed pattern or an unresolvable validator aborts evaluation.
    /// These are never turned into `Rejected`.
    pub fn evaluate(
        &self,
        request: &RequestContext,
        claims: &ClaimsBag,
        constraints: &[AttributeConstraint],
    ) -> Result<Decision> {
        if constraints.is_empty() {
            return Ok(Decision::Unknown);
        }

        debug!(path = %request.path, constraints = constraints.len(), "Checking secured attributes");

        let mut result = Decision::Unknown;
        for (index, constraint) in constraints.iter().enumerate() {
            result = match self.evaluate_constraint(request, claims, constraint) {
                Ok(decision) => decision,
                Err(e) => {
                    warn!(name = %constraint.name, error = %e, "Misconfigured attribute constraint");
                    self.metrics.record_error();
                    return Err(e);
                }
            };

            if result == Decision::Rejected {
                if index + 1 < constraints.len() {
                    self.metrics.record_short_circuit();
                }
                break;
            }
        }

        debug!(%result, "Security attributes rule result");
        self.metrics.record_decision(result);
        Ok(result)
    }

    /// Evaluate a single constraint with its selected strategy
    pub fn evaluate_constraint(
        &self,
        request: &RequestContext,
        claims: &ClaimsBag,
        constraint: &AttributeConstraint,
    ) -> Result<Decision> {
        match constraint.strategy() {
            ConstraintStrategy::Membership(expected) => {
                debug!(name = %constraint.name, contains = ?expected, "Checking attribute contains");
                let actual = claims.values(&constraint.name);
                Ok(Decision::from_pass(
                    actual.iter().any(|value| expected.contains(value)),
                ))
            }
            ConstraintStrategy::Pattern(source) => {
                debug!(name = %constraint.name, matches = source, "Checking attribute matches");
                let actual = claims.values(&constraint.name);
                let pattern = self.patterns.compiled(source)?;
                Ok(Decision::from_pass(
                    actual.iter().any(|value| pattern.is_match(value)),
                ))
            }
            ConstraintStrategy::Custom(id) => {
                debug!(validator = ?id, "Checking attribute using validator");
                let validator = self.validators.resolve(id)?;
                Ok(validator.validate(request, claims))
            }
        }
    }

    /// Compiled pattern cache in use
    pub fn patterns(&self) -> &Arc<PatternCache> {
        &self.patterns
    }

    /// Validator registry in use
    pub fn validators(&self) -> &Arc<ValidatorRegistry> {
        &self.validators
    }

    /// Current evaluation counters
    pub fn metrics(&self) -> EvaluatorMetrics {
        self.metrics.snapshot()
    }
}
