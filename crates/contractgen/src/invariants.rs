//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use crate::syntax::UnitId;

/// Unit ids are only issued by the registry they index.
pub(crate) fn unit_not_found(id: UnitId) -> ! {
    panic!(
        "TypeUnits: unit id {} not found (ids must come from the registry that issued them)",
        id.index()
    )
}
