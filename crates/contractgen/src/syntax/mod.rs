//! Dialect-independent declaration nodes.
//!
//! Strategies produce [`TypeExpr`] references and [`Declaration`]s placed in
//! output [`Unit`]s. The `render` module serializes units per dialect.

mod render;
mod units;

#[cfg(test)]
mod units_tests;

pub use render::RenderedUnit;
pub use units::{Import, ImportSource, TypeUnits, Unit, UnitId};

/// Type expression at a use site.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// Bare name: a primitive, a declared type, or a type parameter.
    Reference(String),
    /// `Base<A, B>`
    Generic {
        base: Box<TypeExpr>,
        arguments: Vec<TypeExpr>,
    },
    /// `T[]`
    Array(Box<TypeExpr>),
    /// `null | T`
    OrNull(Box<TypeExpr>),
    /// Global nullable: `Nullable<T>` or `?T`.
    Nullable(Box<TypeExpr>),
    /// `{ [key: K]: V }`
    Dictionary {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    /// `(A | B)`
    Union(Vec<TypeExpr>),
    /// `'value'`
    StringLiteral(String),
}

impl TypeExpr {
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Reference(name.into())
    }

    /// Whether this expression already encodes nullability.
    pub fn is_nullability_wrapper(&self) -> bool {
        matches!(self, Self::OrNull(_) | Self::Nullable(_))
    }
}

/// A member of an object declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberDeclaration {
    pub name: String,
    pub optional: bool,
    pub ty: TypeExpr,
}

impl MemberDeclaration {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            optional: false,
            ty,
        }
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }
}

/// A named declaration in a unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Declaration {
    /// `export type Name<T> = { ... };`
    Object {
        name: String,
        parameters: Vec<String>,
        members: Vec<MemberDeclaration>,
    },
    /// `export enum Name { ... }`
    Enum { name: String, values: Vec<String> },
    /// `export type Name = 'A' | 'B';` plus a lookup constant.
    FixedStrings {
        name: String,
        values: Vec<String>,
        lookup: String,
    },
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Self::Object { name, .. } | Self::Enum { name, .. } | Self::FixedStrings { name, .. } => {
                name
            }
        }
    }
}
