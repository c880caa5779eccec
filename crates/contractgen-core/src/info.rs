//! Read-only structural view over a descriptor.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::universe::{
    Builtin, Container, EnumMember, Member, TypeData, TypeId, TypeKind, TypeUniverse,
};

/// A structural assumption violated by a descriptor.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("type `{0}` has no element type (neither an array nor a single-argument generic)")]
    NoElementType(String),

    #[error("type `{key}` takes {expected} generic argument(s), got {actual}")]
    ArgumentCountMismatch {
        key: String,
        expected: usize,
        actual: usize,
    },

    #[error("type `{0}` is not a generic type definition")]
    NotGenericDefinition(String),

    #[error("open container `{0}` cannot be declared")]
    OpenContainer(String),
}

/// Handle pairing a [`TypeId`] with the universe that owns it.
///
/// Equality and hashing use identity (the id), never structure.
#[derive(Clone, Copy)]
pub struct TypeInfo<'u> {
    universe: &'u TypeUniverse,
    id: TypeId,
}

impl<'u> TypeInfo<'u> {
    pub(crate) fn new(universe: &'u TypeUniverse, id: TypeId) -> Self {
        Self { universe, id }
    }

    #[inline]
    pub fn id(self) -> TypeId {
        self.id
    }

    pub fn universe(self) -> &'u TypeUniverse {
        self.universe
    }

    pub fn data(self) -> &'u TypeData {
        self.universe.data(self.id)
    }

    pub fn key(self) -> &'u str {
        &self.data().key
    }

    pub fn name(self) -> &'u str {
        &self.data().name
    }

    pub fn namespace(self) -> &'u str {
        &self.data().namespace
    }

    pub fn kind(self) -> &'u TypeKind {
        &self.data().kind
    }

    fn view(self, id: TypeId) -> TypeInfo<'u> {
        self.universe.info(id)
    }

    pub fn builtin(self) -> Option<Builtin> {
        match self.kind() {
            TypeKind::Builtin(builtin) => Some(*builtin),
            _ => None,
        }
    }

    /// The container this type is, or instantiates.
    pub fn container(self) -> Option<Container> {
        match self.kind() {
            TypeKind::Container(container) => Some(*container),
            TypeKind::Instance { definition, .. } => self.view(*definition).container(),
            _ => None,
        }
    }

    pub fn is_array(self) -> bool {
        matches!(self.kind(), TypeKind::Array(_))
    }

    /// Closed instantiation or open definition.
    pub fn is_generic(self) -> bool {
        matches!(self.kind(), TypeKind::Instance { .. }) || self.is_generic_type_definition()
    }

    pub fn is_generic_type_definition(self) -> bool {
        match self.kind() {
            TypeKind::Container(_) => true,
            TypeKind::Object { parameters } => !parameters.is_empty(),
            _ => false,
        }
    }

    pub fn is_generic_parameter(self) -> bool {
        matches!(self.kind(), TypeKind::Parameter { .. })
    }

    pub fn is_enum(self) -> bool {
        matches!(self.kind(), TypeKind::Enum(_))
    }

    pub fn is_value_type(self) -> bool {
        self.data().value_type
    }

    /// Whether this is a closed instantiation of `container`.
    pub fn is_instance_of(self, container: Container) -> bool {
        matches!(self.kind(), TypeKind::Instance { .. }) && self.container() == Some(container)
    }

    /// Open definition of a generic type. A definition returns itself.
    pub fn generic_type_definition(self) -> Option<TypeInfo<'u>> {
        match self.kind() {
            TypeKind::Instance { definition, .. } => Some(self.view(*definition)),
            _ if self.is_generic_type_definition() => Some(self),
            _ => None,
        }
    }

    /// Arguments of an instantiation, or parameters of a definition.
    pub fn generic_arguments(self) -> Vec<TypeInfo<'u>> {
        match self.kind() {
            TypeKind::Instance { arguments, .. } => {
                arguments.iter().map(|&arg| self.view(arg)).collect()
            }
            TypeKind::Object { parameters } => {
                parameters.iter().map(|&param| self.view(param)).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Element of an array or of a single-argument generic container.
    pub fn element_type(self) -> Result<TypeInfo<'u>, ShapeError> {
        match self.kind() {
            TypeKind::Array(element) => Ok(self.view(*element)),
            TypeKind::Instance { arguments, .. } if arguments.len() == 1 => {
                Ok(self.view(arguments[0]))
            }
            _ => Err(ShapeError::NoElementType(self.key().to_string())),
        }
    }

    pub fn members(self) -> impl Iterator<Item = &'u Member> + 'u {
        self.data().members.iter()
    }

    pub fn member_type(self, member: &Member) -> TypeInfo<'u> {
        self.view(member.ty)
    }

    pub fn enum_members(self) -> &'u [EnumMember] {
        match self.kind() {
            TypeKind::Enum(members) => members,
            _ => &[],
        }
    }

    pub fn nullable_context(self) -> Option<u8> {
        self.data().nullable_context
    }
}

impl PartialEq for TypeInfo<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.universe, other.universe)
    }
}

impl Eq for TypeInfo<'_> {}

impl Hash for TypeInfo<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeInfo").field(&self.key()).finish()
    }
}

impl fmt::Display for TypeInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
