//! Pluggable custom validators
//!
//! A constraint that sets neither `contains` nor `matches` delegates to a
//! validator looked up by id in a [`ValidatorRegistry`]. The registry is
//! assembled once at startup and only read afterwards.

mod resource_scope;

pub use resource_scope::ResourceIdScopeValidator;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::claims::ClaimsBag;
use crate::error::ValidatorResolutionError;
use crate::types::{Decision, RequestContext, ValidatorId};

/// Custom claim validation logic
///
/// Implementations must not assume exclusive access: the same instance is
/// invoked concurrently for independent requests.
pub trait AttributeValidator: Send + Sync {
    /// Decide on the request; `Unknown` is passed through to the caller
    fn validate(&self, request: &RequestContext, claims: &ClaimsBag) -> Decision;
}

impl<F> AttributeValidator for F
where
    F: Fn(&RequestContext, &ClaimsBag) -> Decision + Send + Sync,
{
    fn validate(&self, request: &RequestContext, claims: &ClaimsBag) -> Decision {
        self(request, claims)
    }
}

/// Maps validator ids to instances
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: HashMap<ValidatorId, Arc<dyn AttributeValidator>>,
}

impl ValidatorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in validators
    pub fn with_defaults() -> Self {
        Self::new().with_validator(
            ResourceIdScopeValidator::ID,
            ResourceIdScopeValidator::default(),
        )
    }

    /// Register a validator, replacing any previous one with the same id
    pub fn register<V>(&mut self, id: impl Into<ValidatorId>, validator: V) -> &mut Self
    where
        V: AttributeValidator + 'static,
    {
        self.validators.insert(id.into(), Arc::new(validator));
        self
    }

    /// Register an already shared validator instance
    pub fn register_shared(
        &mut self,
        id: impl Into<ValidatorId>,
        validator: Arc<dyn AttributeValidator>,
    ) -> &mut Self {
        self.validators.insert(id.into(), validator);
        self
    }

    /// Builder-style register
    pub fn with_validator<V>(mut self, id: impl Into<ValidatorId>, validator: V) -> Self
    where
        V: AttributeValidator + 'static,
    {
        self.register(id, validator);
        self
    }

    /// Resolve a constraint's validator reference
    ///
    /// # Errors
    ///
    /// [`ValidatorResolutionError::Missing`] when no reference is given,
    /// [`ValidatorResolutionError::Unregistered`] when the id is unknown
    pub fn resolve(
        &self,
        id: Option<&ValidatorId>,
    ) -> Result<Arc<dyn AttributeValidator>, ValidatorResolutionError> {
        let id = id.ok_or(ValidatorResolutionError::Missing)?;
        self.validators
            .get(id)
            .cloned()
            .ok_or_else(|| ValidatorResolutionError::Unregistered(id.clone()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.validators.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Registered ids, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("validators", &self.ids())
            .finish()
    }
}
