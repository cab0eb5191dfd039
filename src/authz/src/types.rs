//! Core constraint and decision types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Stable identifier of a registered custom validator
pub type ValidatorId = String;

/// Identifier of a protected operation (e.g. `"GET /resource/{id}"`)
pub type OperationId = String;

/// Tri-state authorization decision
///
/// `Unknown` means the evaluator expresses no opinion. It is never a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// No applicable constraints
    #[default]
    Unknown,

    /// Every evaluated constraint passed
    Allowed,

    /// A constraint failed
    Rejected,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allowed
    }

    pub fn is_rejected(self) -> bool {
        self == Decision::Rejected
    }

    pub fn is_unknown(self) -> bool {
        self == Decision::Unknown
    }

    pub(crate) fn from_pass(passed: bool) -> Self {
        if passed {
            Decision::Allowed
        } else {
            Decision::Rejected
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Decision::Unknown => "UNKNOWN",
            Decision::Allowed => "ALLOWED",
            Decision::Rejected => "REJECTED",
        };
        f.write_str(s)
    }
}

/// One declared requirement on a claim
///
/// Exactly one strategy runs per constraint, chosen by priority:
/// membership (`contains` non-empty), then pattern (`matches` non-empty),
/// then the custom validator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttributeConstraint {
    /// Claim name to inspect; may be empty for custom validators
    #[serde(default)]
    pub name: String,

    /// Acceptable literal values (membership strategy)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contains: Vec<String>,

    /// Regular expression every candidate value is fully matched against
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub matches: String,

    /// Custom validator reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<ValidatorId>,
}

impl AttributeConstraint {
    /// Membership constraint: passes if any claim value is in `values`
    pub fn contains<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            contains: values.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Pattern constraint: passes if any claim value fully matches `regex`
    pub fn matches(name: impl Into<String>, regex: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            matches: regex.into(),
            ..Default::default()
        }
    }

    /// Custom constraint delegated to a registered validator
    pub fn validator(id: impl Into<ValidatorId>) -> Self {
        Self {
            validator: Some(id.into()),
            ..Default::default()
        }
    }

    /// Set the claim name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Strategy selected for this constraint
    pub fn strategy(&self) -> ConstraintStrategy<'_> {
        if !self.contains.is_empty() {
            ConstraintStrategy::Membership(&self.contains)
        } else if !self.matches.is_empty() {
            ConstraintStrategy::Pattern(&self.matches)
        } else {
            ConstraintStrategy::Custom(self.validator.as_ref())
        }
    }
}

/// Evaluation strategy of a single constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintStrategy<'a> {
    Membership(&'a [String]),
    Pattern(&'a str),
    Custom(Option<&'a ValidatorId>),
}

/// Request metadata handed to the evaluator and custom validators
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Original request path
    pub path: String,

    /// HTTP method or equivalent verb
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Protected operation the host routed this request to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<OperationId>,

    /// Additional request attributes (client IP, tenant, etc.)
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl RequestContext {
    /// Create a context for the given request path
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_operation(mut self, operation: impl Into<OperationId>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Last path segment, e.g. `abc-123` for `/resource/abc-123?x=1`
    pub fn resource_id(&self) -> &str {
        let path = self.path.split(['?', '#']).next().unwrap_or_default();
        path.rsplit('/').next().unwrap_or_default()
    }
}
