#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for contractgen type descriptors.
//!
//! Two layers:
//! - **Deserialization layer**: JSON documents describing a type graph (`json`)
//! - **Descriptor layer**: an arena of types interned by stable key, queried
//!   through the read-only [`TypeInfo`] view
//!
//! Descriptors never expose how the source ecosystem reflects its types.
//! Two descriptors with the same key are the same type.

mod info;
mod invariants;
mod json;
mod typeref;
mod universe;
pub mod utils;

#[cfg(test)]
mod json_tests;

pub use info::{ShapeError, TypeInfo};
pub use json::LoadError;
pub use typeref::{ParseError, TypeRef};
pub use universe::{
    Annotation, Annotations, Builtin, Container, EnumMember, Member, TypeData, TypeId, TypeKind,
    TypeUniverse,
};
