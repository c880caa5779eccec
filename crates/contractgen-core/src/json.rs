//! JSON deserialization for serialized type graphs.
//!
//! A document lists declared types and the roots to generate:
//!
//! ```json
//! {
//!   "types": [
//!     { "kind": "object", "name": "Acme.User",
//!       "members": [{ "name": "Id", "type": "int" }] },
//!     { "kind": "enum", "name": "Acme.Role", "values": ["Admin", "Guest"] }
//!   ],
//!   "roots": ["Acme.User"]
//! }
//! ```
//!
//! Member types use the notation described in [`crate::TypeRef`].

use serde::Deserialize;

use crate::info::ShapeError;
use crate::typeref::{ParseError, TypeRef};
use crate::universe::{Annotation, Annotations, Builtin, Container, Member, TypeId, TypeUniverse};

/// Error while loading a serialized type graph.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid type reference `{reference}`: {source}")]
    TypeRef {
        reference: String,
        #[source]
        source: ParseError,
    },

    #[error("unknown type `{0}`")]
    UnknownType(String),

    #[error("type `{0}` is declared more than once")]
    DuplicateType(String),

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    types: Vec<RawType>,
    #[serde(default)]
    roots: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
enum RawType {
    Object {
        name: String,
        #[serde(default)]
        parameters: Vec<String>,
        #[serde(default)]
        members: Vec<RawMember>,
        #[serde(default)]
        nullable_context: Option<u8>,
    },
    Struct {
        name: String,
        #[serde(default)]
        members: Vec<RawMember>,
        #[serde(default)]
        nullable_context: Option<u8>,
    },
    Enum {
        name: String,
        values: Vec<String>,
    },
}

#[derive(Debug, Deserialize)]
struct RawMember {
    name: String,
    #[serde(rename = "type")]
    type_ref: String,
    #[serde(default)]
    annotations: Vec<Annotation>,
    #[serde(default)]
    nullable_flags: Option<Vec<u8>>,
    #[serde(default)]
    nullable_context: Option<u8>,
}

impl RawMember {
    fn annotations(&self) -> Annotations {
        let mut annotations = self
            .annotations
            .iter()
            .fold(Annotations::new(), |acc, &a| acc.with(a));
        if let Some(flags) = &self.nullable_flags {
            annotations = annotations.with_nullable_flags(flags.clone());
        }
        if let Some(flag) = self.nullable_context {
            annotations = annotations.with_nullable_context(flag);
        }
        annotations
    }
}

impl TypeUniverse {
    /// Build a universe from a JSON document, returning it with its roots.
    pub fn from_json(json: &str) -> Result<(Self, Vec<TypeId>), LoadError> {
        let mut universe = Self::new();
        let roots = universe.load_json(json)?;
        Ok((universe, roots))
    }

    /// Add the types of a JSON document to this universe.
    pub fn load_json(&mut self, json: &str) -> Result<Vec<TypeId>, LoadError> {
        let raw: RawDocument = serde_json::from_str(json)?;

        // Declare every type first so members may reference later ones.
        let mut declared = Vec::with_capacity(raw.types.len());
        for raw_type in &raw.types {
            let id = self.declare_raw(raw_type)?;
            declared.push(id);
        }

        for (raw_type, &owner) in raw.types.iter().zip(&declared) {
            let (members, nullable_context) = match raw_type {
                RawType::Object {
                    members,
                    nullable_context,
                    ..
                }
                | RawType::Struct {
                    members,
                    nullable_context,
                    ..
                } => (members, *nullable_context),
                RawType::Enum { .. } => continue,
            };

            let scope = self.parameters(owner).to_vec();
            for raw_member in members {
                let ty = self.resolve_in_scope(&raw_member.type_ref, &scope)?;
                let member =
                    Member::new(raw_member.name.clone(), ty).with_annotations(raw_member.annotations());
                self.add_member(owner, member);
            }
            if let Some(flag) = nullable_context {
                self.set_nullable_context(owner, flag);
            }
        }

        raw.roots
            .iter()
            .map(|root| self.resolve_type_ref(root))
            .collect()
    }

    fn declare_raw(&mut self, raw_type: &RawType) -> Result<TypeId, LoadError> {
        let (name, arity) = match raw_type {
            RawType::Object {
                name, parameters, ..
            } => (name, parameters.len()),
            RawType::Struct { name, .. } | RawType::Enum { name, .. } => (name, 0),
        };
        if self.lookup_declared(name, arity).is_some() {
            return Err(LoadError::DuplicateType(name.clone()));
        }

        let id = match raw_type {
            RawType::Object {
                name, parameters, ..
            } if !parameters.is_empty() => {
                let parameters: Vec<&str> = parameters.iter().map(String::as_str).collect();
                self.generic_object(name, &parameters)
            }
            RawType::Object { name, .. } => self.object(name),
            RawType::Struct { name, .. } => self.value_object(name),
            RawType::Enum { name, values } => {
                self.enumeration(name, values.iter().map(String::as_str))
            }
        };
        Ok(id)
    }

    /// Resolve a type reference such as `List<Acme.User>` against this universe.
    pub fn resolve_type_ref(&mut self, reference: &str) -> Result<TypeId, LoadError> {
        self.resolve_in_scope(reference, &[])
    }

    fn resolve_in_scope(&mut self, reference: &str, scope: &[TypeId]) -> Result<TypeId, LoadError> {
        let parsed = TypeRef::parse(reference).map_err(|source| LoadError::TypeRef {
            reference: reference.to_string(),
            source,
        })?;
        self.resolve_ref(&parsed, scope)
    }

    fn resolve_ref(&mut self, reference: &TypeRef, scope: &[TypeId]) -> Result<TypeId, LoadError> {
        match reference {
            TypeRef::Array(element) => {
                let element = self.resolve_ref(element, scope)?;
                Ok(self.array_of(element))
            }
            TypeRef::Nullable(underlying) => {
                let underlying = self.resolve_ref(underlying, scope)?;
                Ok(self.nullable_of(underlying))
            }
            TypeRef::Named { name, arguments } if arguments.is_empty() => {
                if let Some(&param) = scope.iter().find(|&&p| self.info(p).name() == name.as_str()) {
                    return Ok(param);
                }
                if let Some(builtin) = Builtin::from_name(name) {
                    return Ok(self.builtin(builtin));
                }
                self.lookup_declared(name, 0)
                    .ok_or_else(|| LoadError::UnknownType(name.clone()))
            }
            TypeRef::Named { name, arguments } => {
                let definition = match Container::from_name(name) {
                    Some(container) => self.container(container),
                    None => self
                        .lookup_declared(name, arguments.len())
                        .ok_or_else(|| LoadError::UnknownType(name.clone()))?,
                };
                let arguments = arguments
                    .iter()
                    .map(|argument| self.resolve_ref(argument, scope))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.instance(definition, arguments)?)
            }
        }
    }

    fn lookup_declared(&self, name: &str, arity: usize) -> Option<TypeId> {
        if arity == 0 {
            self.lookup(name)
        } else {
            self.lookup(&format!("{name}`{arity}"))
        }
    }
}
