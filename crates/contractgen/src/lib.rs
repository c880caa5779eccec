//! contractgen: TypeScript and Flow declarations from a type descriptor graph.
//!
//! The pipeline:
//! - `options` - generation options and their validation
//! - `nullability` - mapping of nullability signals to optional/nullable output
//! - `generator` - resolution engine and building-context strategies
//! - `custom` - extension point for locations, redirects and custom builders
//! - `syntax` - declaration nodes, output units and dialect rendering

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod custom;
pub mod generator;
mod invariants;
pub mod nullability;
pub mod options;
pub mod syntax;

#[cfg(test)]
mod nullability_tests;
#[cfg(test)]
pub mod test_utils;

pub use contractgen_core::{ShapeError, TypeId, TypeInfo, TypeUniverse};
pub use custom::{
    CustomContext, CustomRules, CustomTypeGenerator, NullCustomTypeGenerator, TypeBuildingContext,
};
pub use generator::{BuildingContext, RootTypesProvider, Strategy, TypeGenerator};
pub use nullability::AttributeContext;
pub use options::{
    EnumGenerationMode, GenerationOptions, JavaScriptTypeChecker, LinterDisableMode,
    NullabilityMode, Pluralize,
};
pub use syntax::{
    Declaration, Import, ImportSource, MemberDeclaration, RenderedUnit, TypeExpr, TypeUnits, Unit,
    UnitId,
};

/// Errors that abort a generation run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Invalid or incompatible options, detected before any resolution.
    #[error("misconfiguration: {0}")]
    Misconfiguration(String),

    #[error(transparent)]
    InvalidShape(#[from] ShapeError),

    /// More than one custom rule applies to a type.
    #[error("ambiguous override for `{key}`: {}", .rules.join(", "))]
    AmbiguousOverride { key: String, rules: Vec<String> },

    #[error("type `{type_name}` declares member `{member}` more than once")]
    DuplicateMember { type_name: String, member: String },

    /// Two distinct names meet in one unit: a second declaration, or an
    /// import clashing with a declaration or another import.
    #[error("unit `{unit}` already declares or imports `{name}`")]
    DuplicateDeclaration { unit: String, name: String },
}

/// Result type for generation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Resolve and render every unit reachable from `roots` in one call.
pub fn generate(
    universe: &TypeUniverse,
    roots: &impl RootTypesProvider,
    options: GenerationOptions,
    custom: &dyn CustomTypeGenerator,
) -> Result<Vec<RenderedUnit>> {
    let units = TypeGenerator::new(universe, options.clone(), custom, roots).generate()?;
    Ok(units.render(&options))
}
