//! Schema capability lookup.
//!
//! The write path asks the schema one question per edge: does this edge type
//! keep every version, or a single slot that later writes replace?

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use edgekv_core::{EdgeType, SpaceId};
use thiserror::Error;

/// Errors reported by a schema lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The space is not known to the schema.
    #[error("space not found: {0}")]
    SpaceNotFound(SpaceId),

    /// The edge type is not defined in the space.
    #[error("edge type {edge_type} not found in space {space}")]
    EdgeTypeNotFound {
        /// The space that was searched.
        space: SpaceId,
        /// The missing edge type.
        edge_type: EdgeType,
    },
}

/// Answers whether an edge type in a space is versioned.
pub trait SchemaCapability: Send + Sync {
    /// Whether writes to `edge_type` in `space` keep every version.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the space or edge type is unknown.
    fn is_versioned(&self, space: SpaceId, edge_type: EdgeType) -> Result<bool, SchemaError>;
}

impl<C: SchemaCapability + ?Sized> SchemaCapability for Arc<C> {
    fn is_versioned(&self, space: SpaceId, edge_type: EdgeType) -> Result<bool, SchemaError> {
        (**self).is_versioned(space, edge_type)
    }
}

#[derive(Debug, Clone, Default)]
struct SpaceSchema {
    versioned: bool,
    strict: bool,
    edge_types: HashMap<EdgeType, bool>,
}

/// A schema held in memory and edited at runtime.
///
/// Each registered space has a default versioned flag. Individual edge types
/// may override it. A strict space rejects edge types it has no entry for.
///
/// # Example
///
/// ```
/// use edgekv::{AdHocSchema, SchemaCapability};
/// use edgekv_core::{EdgeType, SpaceId};
///
/// let schema = AdHocSchema::new();
/// schema.set_space_versioned(SpaceId::new(1), true);
/// assert!(schema.is_versioned(SpaceId::new(1), EdgeType::new(5)).unwrap());
/// assert!(schema.is_versioned(SpaceId::new(2), EdgeType::new(5)).is_err());
/// ```
#[derive(Debug, Default)]
pub struct AdHocSchema {
    spaces: RwLock<HashMap<SpaceId, SpaceSchema>>,
}

impl AdHocSchema {
    /// Create a schema with no spaces.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `space` if needed and set its default versioned flag.
    pub fn set_space_versioned(&self, space: SpaceId, versioned: bool) {
        self.spaces.write().unwrap_or_else(PoisonError::into_inner).entry(space).or_default().versioned =
            versioned;
    }

    /// Register `edge_type` in `space` with an explicit versioned flag.
    ///
    /// The space is registered as non-versioned if it was unknown.
    pub fn set_edge_type_versioned(&self, space: SpaceId, edge_type: EdgeType, versioned: bool) {
        self.spaces
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(space)
            .or_default()
            .edge_types
            .insert(edge_type, versioned);
    }

    /// When strict, edge types without an explicit entry are reported as not found.
    pub fn set_strict_edge_types(&self, space: SpaceId, strict: bool) {
        self.spaces.write().unwrap_or_else(PoisonError::into_inner).entry(space).or_default().strict =
            strict;
    }

    /// Forget a space and all of its edge types.
    pub fn remove_space(&self, space: SpaceId) -> bool {
        self.spaces.write().unwrap_or_else(PoisonError::into_inner).remove(&space).is_some()
    }
}

impl SchemaCapability for AdHocSchema {
    fn is_versioned(&self, space: SpaceId, edge_type: EdgeType) -> Result<bool, SchemaError> {
        let spaces = self.spaces.read().unwrap_or_else(PoisonError::into_inner);
        let schema = spaces.get(&space).ok_or(SchemaError::SpaceNotFound(space))?;

        match schema.edge_types.get(&edge_type) {
            Some(&versioned) => Ok(versioned),
            None if schema.strict => Err(SchemaError::EdgeTypeNotFound { space, edge_type }),
            None => Ok(schema.versioned),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SPACE: SpaceId = SpaceId::new(0);

    #[test]
    fn unknown_space() {
        let schema = AdHocSchema::new();
        assert_eq!(schema.is_versioned(SPACE, EdgeType::new(1)), Err(SchemaError::SpaceNotFound(SPACE)));
    }

    #[test]
    fn space_default_applies_to_unlisted_types() {
        let schema = AdHocSchema::new();
        schema.set_space_versioned(SPACE, true);
        assert!(schema.is_versioned(SPACE, EdgeType::new(1)).unwrap());

        schema.set_space_versioned(SPACE, false);
        assert!(!schema.is_versioned(SPACE, EdgeType::new(1)).unwrap());
    }

    #[test]
    fn edge_type_overrides_space() {
        let schema = AdHocSchema::new();
        schema.set_space_versioned(SPACE, true);
        schema.set_edge_type_versioned(SPACE, EdgeType::new(7), false);

        assert!(!schema.is_versioned(SPACE, EdgeType::new(7)).unwrap());
        assert!(schema.is_versioned(SPACE, EdgeType::new(8)).unwrap());
    }

    #[test]
    fn strict_space_rejects_unlisted_types() {
        let schema = AdHocSchema::new();
        schema.set_edge_type_versioned(SPACE, EdgeType::new(7), true);
        schema.set_strict_edge_types(SPACE, true);

        assert!(schema.is_versioned(SPACE, EdgeType::new(7)).unwrap());
        assert_eq!(
            schema.is_versioned(SPACE, EdgeType::new(8)),
            Err(SchemaError::EdgeTypeNotFound { space: SPACE, edge_type: EdgeType::new(8) })
        );
    }

    #[test]
    fn remove_space() {
        let schema = AdHocSchema::new();
        schema.set_space_versioned(SPACE, true);
        assert!(schema.remove_space(SPACE));
        assert!(!schema.remove_space(SPACE));
        assert!(schema.is_versioned(SPACE, EdgeType::new(1)).is_err());
    }

    #[test]
    fn shared_through_arc() {
        let schema = Arc::new(AdHocSchema::new());
        schema.set_space_versioned(SPACE, true);
        let dynamic: Arc<dyn SchemaCapability> = schema;
        assert!(dynamic.is_versioned(SPACE, EdgeType::new(1)).unwrap());
    }
}
