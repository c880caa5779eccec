//! Type arena: descriptors interned by stable key.
//!
//! Every descriptor lives in a [`TypeUniverse`] and is addressed by [`TypeId`].
//! References between descriptors (element types, generic arguments, member
//! types) are ids, so a type may refer to itself directly or through a cycle.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::info::{ShapeError, TypeInfo};

/// Handle to a descriptor stored in a [`TypeUniverse`].
///
/// Ids are assigned in interning order. Equal ids always mean equal keys.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TypeId(u32);

impl TypeId {
    #[inline]
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Built-in source types with a fixed target mapping.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Builtin {
    Bool,
    Byte,
    SByte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
    Char,
    String,
    Guid,
    DateTime,
    DateTimeOffset,
    TimeSpan,
    Object,
    Void,
}

impl Builtin {
    pub const ALL: [Builtin; 20] = [
        Self::Bool,
        Self::Byte,
        Self::SByte,
        Self::Int16,
        Self::UInt16,
        Self::Int32,
        Self::UInt32,
        Self::Int64,
        Self::UInt64,
        Self::Single,
        Self::Double,
        Self::Decimal,
        Self::Char,
        Self::String,
        Self::Guid,
        Self::DateTime,
        Self::DateTimeOffset,
        Self::TimeSpan,
        Self::Object,
        Self::Void,
    ];

    /// Stable key of the built-in.
    pub fn full_name(self) -> &'static str {
        match self {
            Self::Bool => "System.Boolean",
            Self::Byte => "System.Byte",
            Self::SByte => "System.SByte",
            Self::Int16 => "System.Int16",
            Self::UInt16 => "System.UInt16",
            Self::Int32 => "System.Int32",
            Self::UInt32 => "System.UInt32",
            Self::Int64 => "System.Int64",
            Self::UInt64 => "System.UInt64",
            Self::Single => "System.Single",
            Self::Double => "System.Double",
            Self::Decimal => "System.Decimal",
            Self::Char => "System.Char",
            Self::String => "System.String",
            Self::Guid => "System.Guid",
            Self::DateTime => "System.DateTime",
            Self::DateTimeOffset => "System.DateTimeOffset",
            Self::TimeSpan => "System.TimeSpan",
            Self::Object => "System.Object",
            Self::Void => "System.Void",
        }
    }

    /// Short keyword used in type references (`int`, `string`, ...).
    pub fn alias(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::SByte => "sbyte",
            Self::Int16 => "short",
            Self::UInt16 => "ushort",
            Self::Int32 => "int",
            Self::UInt32 => "uint",
            Self::Int64 => "long",
            Self::UInt64 => "ulong",
            Self::Single => "float",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::Char => "char",
            Self::String => "string",
            Self::Guid => "Guid",
            Self::DateTime => "DateTime",
            Self::DateTimeOffset => "DateTimeOffset",
            Self::TimeSpan => "TimeSpan",
            Self::Object => "object",
            Self::Void => "void",
        }
    }

    /// Look up a built-in by alias or full name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|b| b.alias() == name || b.full_name() == name)
    }

    /// Whether values of this type can never be null.
    pub fn is_value_type(self) -> bool {
        !matches!(self, Self::String | Self::Object)
    }
}

/// Open generic definitions the generator treats structurally.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Container {
    /// `List<T>`, rendered as an array.
    List,
    /// `Dictionary<K, V>`, rendered as an index signature.
    Dictionary,
    /// `Nullable<T>`, a value type that may be null.
    Nullable,
}

impl Container {
    pub fn full_name(self) -> &'static str {
        match self {
            Self::List => "System.Collections.Generic.List`1",
            Self::Dictionary => "System.Collections.Generic.Dictionary`2",
            Self::Nullable => "System.Nullable`1",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::List => "List",
            Self::Dictionary => "Dictionary",
            Self::Nullable => "Nullable",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Self::List | Self::Nullable => 1,
            Self::Dictionary => 2,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [Self::List, Self::Dictionary, Self::Nullable]
            .into_iter()
            .find(|c| c.name() == name || c.full_name() == name)
    }
}

/// Structural shape of a descriptor.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TypeKind {
    Builtin(Builtin),
    /// Open container definition (`List<>`, `Dictionary<,>`, `Nullable<>`).
    Container(Container),
    /// `T[]`
    Array(TypeId),
    /// Closed generic instantiation of a container or generic object.
    Instance {
        definition: TypeId,
        arguments: Vec<TypeId>,
    },
    /// Type parameter of a generic object definition.
    Parameter { owner: TypeId, position: usize },
    Enum(Vec<EnumMember>),
    /// User-defined class or struct. Non-empty `parameters` make it a
    /// generic type definition.
    Object { parameters: Vec<TypeId> },
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
}

/// Marker annotations attached to members.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Annotation {
    NotNull,
    CanBeNull,
    ItemNotNull,
    ItemCanBeNull,
    Required,
    Ignore,
}

/// Annotation set of a member: markers plus nullable-reference metadata.
///
/// `nullable_flags` holds one flag per type position (0 = oblivious,
/// 1 = not null, 2 = nullable). `nullable_context` is the default flag
/// used when no per-position flags exist.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Annotations {
    markers: BTreeSet<Annotation>,
    nullable_flags: Option<Vec<u8>>,
    nullable_context: Option<u8>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, annotation: Annotation) -> Self {
        self.markers.insert(annotation);
        self
    }

    pub fn with_nullable_flags(mut self, flags: impl Into<Vec<u8>>) -> Self {
        self.nullable_flags = Some(flags.into());
        self
    }

    pub fn with_nullable_context(mut self, flag: u8) -> Self {
        self.nullable_context = Some(flag);
        self
    }

    #[inline]
    pub fn has(&self, annotation: Annotation) -> bool {
        self.markers.contains(&annotation)
    }

    pub fn nullable_flags(&self) -> Option<&[u8]> {
        self.nullable_flags.as_deref()
    }

    pub fn nullable_context(&self) -> Option<u8> {
        self.nullable_context
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty() && self.nullable_flags.is_none() && self.nullable_context.is_none()
    }
}

/// A declared member (property or field) of an object type.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Member {
    pub name: String,
    pub ty: TypeId,
    pub annotations: Annotations,
}

impl Member {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            annotations: Annotations::default(),
        }
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations = self.annotations.with(annotation);
        self
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }
}

/// Stored descriptor.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TypeData {
    /// Stable identity.
    pub key: String,
    /// Simple name without namespace or generic arity.
    pub name: String,
    pub namespace: String,
    pub kind: TypeKind,
    pub value_type: bool,
    pub members: Vec<Member>,
    /// Type-level nullable-reference default for its members.
    pub nullable_context: Option<u8>,
}

impl TypeData {
    fn new(key: String, name: String, namespace: String, kind: TypeKind, value_type: bool) -> Self {
        Self {
            key,
            name,
            namespace,
            kind,
            value_type,
            members: Vec::new(),
            nullable_context: None,
        }
    }
}

/// Arena of descriptors, deduplicated by key.
#[derive(Clone, Debug, Default)]
pub struct TypeUniverse {
    /// Key -> descriptor; the insertion index is the [`TypeId`]
    types: IndexMap<String, TypeData>,
}

impl TypeUniverse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a descriptor. Returns the existing id if the key is known.
    pub fn intern(&mut self, data: TypeData) -> TypeId {
        let entry = self.types.entry(data.key.clone());
        let id = TypeId(entry.index() as u32);
        entry.or_insert(data);
        id
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeData> {
        self.types.get_index(id.index()).map(|(_, data)| data)
    }

    pub fn lookup(&self, key: &str) -> Option<TypeId> {
        self.types.get_index_of(key).map(|index| TypeId(index as u32))
    }

    /// Read-only structural view of a descriptor.
    pub fn info(&self, id: TypeId) -> TypeInfo<'_> {
        self.ensure_type(id);
        TypeInfo::new(self, id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeData)> {
        self.types
            .values()
            .enumerate()
            .map(|(i, data)| (TypeId(i as u32), data))
    }

    // ========== Builders ==========

    pub fn builtin(&mut self, builtin: Builtin) -> TypeId {
        let (namespace, name) = split_full_name(builtin.full_name());
        self.intern(TypeData::new(
            builtin.full_name().to_string(),
            name,
            namespace,
            TypeKind::Builtin(builtin),
            builtin.is_value_type(),
        ))
    }

    pub fn container(&mut self, container: Container) -> TypeId {
        let (namespace, _) = split_full_name(container.full_name());
        self.intern(TypeData::new(
            container.full_name().to_string(),
            container.name().to_string(),
            namespace,
            TypeKind::Container(container),
            container == Container::Nullable,
        ))
    }

    pub fn array_of(&mut self, element: TypeId) -> TypeId {
        let element_data = self.data(element);
        let key = format!("{}[]", element_data.key);
        let name = format!("{}[]", element_data.name);
        let namespace = element_data.namespace.clone();
        self.intern(TypeData::new(
            key,
            name,
            namespace,
            TypeKind::Array(element),
            false,
        ))
    }

    /// Close a generic definition over `arguments`.
    pub fn instance(
        &mut self,
        definition: TypeId,
        arguments: Vec<TypeId>,
    ) -> Result<TypeId, ShapeError> {
        let def = self.data(definition);
        let (expected, value_type) = match &def.kind {
            TypeKind::Container(container) => {
                (container.arity(), *container == Container::Nullable)
            }
            TypeKind::Object { parameters } if !parameters.is_empty() => {
                (parameters.len(), def.value_type)
            }
            _ => return Err(ShapeError::NotGenericDefinition(def.key.clone())),
        };
        if arguments.len() != expected {
            return Err(ShapeError::ArgumentCountMismatch {
                key: def.key.clone(),
                expected,
                actual: arguments.len(),
            });
        }

        let argument_keys: Vec<&str> = arguments
            .iter()
            .map(|&arg| self.data(arg).key.as_str())
            .collect();
        let key = format!("{}<{}>", def.key, argument_keys.join(", "));
        let name = def.name.clone();
        let namespace = def.namespace.clone();
        Ok(self.intern(TypeData::new(
            key,
            name,
            namespace,
            TypeKind::Instance {
                definition,
                arguments,
            },
            value_type,
        )))
    }

    pub fn list_of(&mut self, element: TypeId) -> TypeId {
        let list = self.container(Container::List);
        self.close_container(list, vec![element])
    }

    pub fn dictionary_of(&mut self, key: TypeId, value: TypeId) -> TypeId {
        let dictionary = self.container(Container::Dictionary);
        self.close_container(dictionary, vec![key, value])
    }

    pub fn nullable_of(&mut self, underlying: TypeId) -> TypeId {
        let nullable = self.container(Container::Nullable);
        self.close_container(nullable, vec![underlying])
    }

    fn close_container(&mut self, container: TypeId, arguments: Vec<TypeId>) -> TypeId {
        let closed = self.instance(container, arguments);
        crate::invariants::ensure_closed(closed)
    }

    /// Declare a reference-type object (class). Members are added later.
    pub fn object(&mut self, full_name: &str) -> TypeId {
        self.declare_object(full_name, false)
    }

    /// Declare a value-type object (struct).
    pub fn value_object(&mut self, full_name: &str) -> TypeId {
        self.declare_object(full_name, true)
    }

    fn declare_object(&mut self, full_name: &str, value_type: bool) -> TypeId {
        let (namespace, name) = split_full_name(full_name);
        self.intern(TypeData::new(
            full_name.to_string(),
            name,
            namespace,
            TypeKind::Object {
                parameters: Vec::new(),
            },
            value_type,
        ))
    }

    /// Declare a generic object definition with named type parameters.
    pub fn generic_object(&mut self, full_name: &str, parameters: &[&str]) -> TypeId {
        let key = format!("{full_name}`{}", parameters.len());
        if let Some(id) = self.lookup(&key) {
            return id;
        }

        let (namespace, name) = split_full_name(full_name);
        let owner = self.intern(TypeData::new(
            key.clone(),
            name,
            namespace.clone(),
            TypeKind::Object {
                parameters: Vec::new(),
            },
            false,
        ));

        let parameter_ids: Vec<TypeId> = parameters
            .iter()
            .enumerate()
            .map(|(position, &parameter)| {
                self.intern(TypeData::new(
                    format!("{key}:{parameter}"),
                    parameter.to_string(),
                    namespace.clone(),
                    TypeKind::Parameter { owner, position },
                    false,
                ))
            })
            .collect();

        self.data_mut(owner).kind = TypeKind::Object {
            parameters: parameter_ids,
        };
        owner
    }

    /// Declare an enum whose members take their declaration position as value.
    pub fn enumeration<'a>(
        &mut self,
        full_name: &str,
        members: impl IntoIterator<Item = &'a str>,
    ) -> TypeId {
        let members = members
            .into_iter()
            .enumerate()
            .map(|(i, name)| EnumMember {
                name: name.to_string(),
                value: i as i64,
            })
            .collect();
        let (namespace, name) = split_full_name(full_name);
        self.intern(TypeData::new(
            full_name.to_string(),
            name,
            namespace,
            TypeKind::Enum(members),
            true,
        ))
    }

    /// Type parameters of a generic object definition.
    pub fn parameters(&self, owner: TypeId) -> &[TypeId] {
        match &self.data(owner).kind {
            TypeKind::Object { parameters } => parameters,
            _ => &[],
        }
    }

    pub fn add_member(&mut self, owner: TypeId, member: Member) {
        self.data_mut(owner).members.push(member);
    }

    pub fn set_nullable_context(&mut self, owner: TypeId, flag: u8) {
        self.data_mut(owner).nullable_context = Some(flag);
    }

    pub(crate) fn data(&self, id: TypeId) -> &TypeData {
        self.ensure_type(id)
    }

    fn data_mut(&mut self, id: TypeId) -> &mut TypeData {
        self.ensure_type(id);
        &mut self.types[id.index()]
    }
}

/// Split `Acme.Models.User` into (`Acme.Models`, `User`).
fn split_full_name(full_name: &str) -> (String, String) {
    let base = full_name.split('`').next().unwrap_or(full_name);
    match base.rsplit_once('.') {
        Some((namespace, name)) => (namespace.to_string(), name.to_string()),
        None => (String::new(), base.to_string()),
    }
}
