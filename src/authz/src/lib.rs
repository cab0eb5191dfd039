//! # Secured Attributes
//!
//! Declarative claim constraints for protected operations.
//!
//! Each protected operation carries an ordered list of
//! [`AttributeConstraint`]s. For every request the host extracts the
//! authenticated claims into a [`ClaimsBag`] and asks the
//! [`AttributeRuleEvaluator`] for a tri-state [`Decision`]:
//!
//! - **Membership**: a claim value must be one of the listed literals
//! - **Pattern**: a claim value must fully match a regular expression
//! - **Custom**: a registered [`AttributeValidator`] decides
//!
//! All constraints must pass; the first rejection stops evaluation.
//! `Unknown` means no opinion and must never be treated as a pass.
//!
//! ## Example
//!
//! ```rust
//! use secured_attrs::{
//!     AttributeConstraint, AttributeRuleEvaluator, ClaimsBag, Decision,
//!     RequestContext, ResourceIdScopeValidator, ValidatorRegistry,
//! };
//!
//! let evaluator = AttributeRuleEvaluator::with_registry(ValidatorRegistry::with_defaults());
//!
//! let constraints = vec![
//!     AttributeConstraint::contains("iss", ["myapp"]),
//!     AttributeConstraint::validator(ResourceIdScopeValidator::ID),
//! ];
//!
//! let claims = ClaimsBag::new()
//!     .with_claim("iss", "myapp")
//!     .with_claim("scp", "abc-123");
//!
//! let request = RequestContext::new("/resource/abc-123");
//! let decision = evaluator.evaluate(&request, &claims, &constraints)?;
//! assert_eq!(decision, Decision::Allowed);
//! # Ok::<(), secured_attrs::AttrsError>(())
//! ```

pub mod claims;
pub mod config;
pub mod engine;
pub mod error;
pub mod pattern;
pub mod rules;
pub mod types;
pub mod validator;

// Re-export commonly used types
pub use claims::ClaimsBag;
pub use config::{OperationConfig, RulesConfig};
pub use engine::{AttributeRuleEvaluator, EvaluatorMetrics};
pub use error::{AttrsError, PatternError, Result, ValidatorResolutionError};
pub use pattern::{CacheStats, PatternCache};
pub use rules::{OperationRules, Outcome, RuleChain, SecuredAttributesRule, SecurityRule};
pub use types::{
    AttributeConstraint, ConstraintStrategy, Decision, OperationId, RequestContext, ValidatorId,
};
pub use validator::{AttributeValidator, ResourceIdScopeValidator, ValidatorRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
