//! Ordered combination of security rules

use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::SecurityRule;
use crate::claims::ClaimsBag;
use crate::error::Result;
use crate::types::{Decision, RequestContext};

/// What the host does with a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Let the request through
    Permit,
    /// Refuse with an access-denied response
    Deny,
    /// No rule had an opinion; defer to another authorization mechanism
    Defer,
}

impl From<Decision> for Outcome {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Allowed => Outcome::Permit,
            Decision::Rejected => Outcome::Deny,
            Decision::Unknown => Outcome::Defer,
        }
    }
}

/// Rules consulted in ascending order until one has an opinion
#[derive(Clone, Default)]
pub struct RuleChain {
    rules: Vec<Arc<dyn SecurityRule>>,
}

impl RuleChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, keeping the chain sorted by order
    ///
    /// Rules with equal order keep their insertion order.
    pub fn push(&mut self, rule: Arc<dyn SecurityRule>) -> &mut Self {
        self.rules.push(rule);
        self.rules.sort_by_key(|rule| rule.order());
        self
    }

    /// Builder-style push
    pub fn with_rule<R: SecurityRule + 'static>(mut self, rule: R) -> Self {
        self.push(Arc::new(rule));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First non-`Unknown` decision, or `Unknown` if every rule abstains
    ///
    /// # Errors
    ///
    /// The first rule error aborts the chain.
    pub fn check(&self, request: &RequestContext, claims: Option<&ClaimsBag>) -> Result<Decision> {
        for rule in &self.rules {
            let decision = rule.check(request, claims)?;
            if !decision.is_unknown() {
                debug!(order = rule.order(), %decision, "Security rule decided");
                return Ok(decision);
            }
        }
        Ok(Decision::Unknown)
    }

    /// Decision mapped to a host outcome
    pub fn authorize(&self, request: &RequestContext, claims: Option<&ClaimsBag>) -> Result<Outcome> {
        self.check(request, claims).map(Outcome::from)
    }
}

impl fmt::Debug for RuleChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let orders: Vec<i32> = self.rules.iter().map(|rule| rule.order()).collect();
        f.debug_struct("RuleChain").field("orders", &orders).finish()
    }
}
