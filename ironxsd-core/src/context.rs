//! Per-read configuration handed to every [`crate::XmlSerializable`].

use crate::codec::{DecodePolicy, XmlScalar};
use crate::error::{Error, Result};
use crate::reader::StartTag;
use crate::registry::TypeRegistry;
use tracing::warn;

/// Registry and decoding policy in effect for one document read.
#[derive(Debug, Clone, Copy)]
pub struct ReadContext<'r> {
    registry: &'r TypeRegistry,
    policy: DecodePolicy,
}

impl<'r> ReadContext<'r> {
    /// Creates a context with the lenient decode policy.
    #[must_use]
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            policy: DecodePolicy::default(),
        }
    }

    /// Sets the decode policy.
    #[must_use]
    pub fn with_policy(mut self, policy: DecodePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the registry used for polymorphic construction.
    #[must_use]
    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// Returns the decode policy.
    #[must_use]
    pub fn policy(&self) -> DecodePolicy {
        self.policy
    }

    /// Decodes scalar text according to the policy.
    ///
    /// # Errors
    /// Returns [`Error::ScalarDecode`] for malformed text under
    /// [`DecodePolicy::Strict`].
    pub fn decode<T: XmlScalar>(&self, name: &str, text: &str) -> Result<T> {
        if let Some(value) = T::decode(text) {
            return Ok(value);
        }
        match self.policy {
            DecodePolicy::Lenient => {
                warn!(
                    element = name,
                    value = text,
                    expected = T::KIND,
                    "malformed scalar, using default"
                );
                Ok(T::default())
            }
            DecodePolicy::Strict => Err(Error::scalar(name, text, T::KIND)),
        }
    }

    /// Decodes an optional attribute of `tag`.
    ///
    /// # Errors
    /// Same as [`ReadContext::decode`].
    pub fn attribute<T: XmlScalar>(&self, tag: &StartTag, name: &str) -> Result<Option<T>> {
        tag.attribute(name)
            .map(|value| self.decode(name, value))
            .transpose()
    }
}
