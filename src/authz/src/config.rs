//! Rules configuration
//!
//! Constraint lists are declared per operation in a JSON document:
//!
//! ```json
//! {
//!   "operations": [
//!     {
//!       "id": "GET /resource/{id}",
//!       "constraints": [
//!         { "name": "iss", "contains": ["myapp"] },
//!         { "name": "sub", "matches": "[a-z]+" },
//!         { "validator": "resource-id-scope" }
//!       ]
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

use crate::error::{AttrsError, Result};
use crate::pattern::PatternCache;
use crate::rules::OperationRules;
use crate::types::{AttributeConstraint, ConstraintStrategy, OperationId};
use crate::validator::ValidatorRegistry;

/// Constraints declared for one protected operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationConfig {
    /// Operation id the host routes requests to
    pub id: OperationId,

    /// Ordered constraints; all must pass
    #[serde(default)]
    pub constraints: Vec<AttributeConstraint>,
}

/// All secured operations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default)]
    pub operations: Vec<OperationConfig>,
}

impl RulesConfig {
    /// Parse a JSON rules document
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| AttrsError::Config(e.to_string()))
    }

    /// Load a JSON rules document from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        info!(path = %path.display(), operations = config.operations.len(), "Loaded rules configuration");
        Ok(config)
    }

    /// Check every declared constraint up front
    ///
    /// Precompiles all patterns into `patterns` and resolves every custom
    /// validator, so configuration defects surface at startup instead of on
    /// the first matching request.
    pub fn validate(&self, patterns: &PatternCache, validators: &ValidatorRegistry) -> Result<()> {
        let mut seen = HashSet::new();
        for operation in &self.operations {
            if !seen.insert(operation.id.as_str()) {
                return Err(AttrsError::Config(format!(
                    "Duplicate operation id: {}",
                    operation.id
                )));
            }

            for constraint in &operation.constraints {
                match constraint.strategy() {
                    ConstraintStrategy::Membership(_) => {}
                    ConstraintStrategy::Pattern(source) => {
                        patterns.compiled(source)?;
                    }
                    ConstraintStrategy::Custom(id) => {
                        validators.resolve(id)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Operation table for [`SecuredAttributesRule`](crate::rules::SecuredAttributesRule)
    pub fn into_operation_rules(self) -> OperationRules {
        self.operations
            .into_iter()
            .fold(OperationRules::new(), |rules, op| {
                rules.with_operation(op.id, op.constraints)
            })
    }
}
