//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use crate::{ShapeError, TypeData, TypeId, TypeUniverse};

impl TypeUniverse {
    pub(crate) fn ensure_type(&self, id: TypeId) -> &TypeData {
        self.get(id).unwrap_or_else(|| {
            panic!(
                "TypeUniverse: type id {} not found \
                 (ids must come from the universe that issued them)",
                id.as_u32()
            )
        })
    }
}

/// Containers have a fixed arity, so closing one with the right argument
/// count cannot fail.
pub(crate) fn ensure_closed(result: Result<TypeId, ShapeError>) -> TypeId {
    result.unwrap_or_else(|err| panic!("TypeUniverse: container instantiation failed: {err}"))
}
