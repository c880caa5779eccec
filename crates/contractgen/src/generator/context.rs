//! Building contexts and default strategy selection.

use std::fmt;
use std::rc::Rc;

use contractgen_core::{Builtin, Container, ShapeError, TypeId, TypeInfo};

use crate::custom::TypeBuildingContext;
use crate::options::EnumGenerationMode;
use crate::syntax::{Declaration, UnitId};
use crate::Result;

use super::TypeGenerator;

/// How a type is declared and referenced.
///
/// Variants without a unit never declare anything; their references are
/// built structurally at each use site.
#[derive(Clone)]
pub enum Strategy {
    /// Fixed primitive mapping.
    Builtin,
    /// `T[]` and `List<T>`.
    Array,
    /// `Dictionary<K, V>`.
    Dictionary,
    /// Native `enum` declaration.
    NativeEnum { unit: UnitId, name: String },
    /// String-literal union plus lookup constant.
    FixedStrings { unit: UnitId, name: String },
    /// `Nullable<T>` kept nullable at every use site.
    Nullable,
    /// `Nullable<T>` treated as its underlying type.
    Unwrapped { underlying: TypeId },
    /// Closed generic object.
    GenericInstance,
    GenericParameter,
    /// Class, struct or generic definition declared in a unit.
    Object {
        unit: UnitId,
        name: String,
        /// Index of the declaration in its unit
        declaration: usize,
    },
    /// Declared elsewhere; references import `name` from `location`.
    Redirect { name: String, location: String },
    Custom(Rc<dyn TypeBuildingContext>),
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Builtin => "builtin",
            Self::Array => "array",
            Self::Dictionary => "dictionary",
            Self::NativeEnum { .. } => "native-enum",
            Self::FixedStrings { .. } => "fixed-strings",
            Self::Nullable => "nullable",
            Self::Unwrapped { .. } => "unwrapped-nullable",
            Self::GenericInstance => "generic-instance",
            Self::GenericParameter => "generic-parameter",
            Self::Object { .. } => "object",
            Self::Redirect { .. } => "redirect",
            Self::Custom(_) => "custom",
        }
    }

    /// The unit owning this type's declaration.
    pub fn unit(&self) -> Option<UnitId> {
        match self {
            Self::NativeEnum { unit, .. }
            | Self::FixedStrings { unit, .. }
            | Self::Object { unit, .. } => Some(*unit),
            _ => None,
        }
    }

    /// Whether the build loop still has work to do after creation.
    fn needs_build(&self) -> bool {
        matches!(self, Self::Object { .. } | Self::Custom(_))
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit() {
            Some(unit) => write!(f, "{}({unit:?})", self.name()),
            None => f.write_str(self.name()),
        }
    }
}

/// Per-type state owned by the engine.
#[derive(Clone, Debug)]
pub struct BuildingContext {
    ty: TypeId,
    strategy: Strategy,
    built: bool,
}

impl BuildingContext {
    pub(super) fn new(ty: TypeId, strategy: Strategy) -> Self {
        let built = !strategy.needs_build();
        Self {
            ty,
            strategy,
            built,
        }
    }

    pub fn ty(&self) -> TypeId {
        self.ty
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn unit(&self) -> Option<UnitId> {
        self.strategy.unit()
    }

    pub fn is_definition_built(&self) -> bool {
        self.built
    }

    pub(super) fn mark_built(&mut self) {
        self.built = true;
    }
}

/// `byte[]` is a base64 string, not an array.
fn is_byte_array(info: TypeInfo<'_>) -> bool {
    info.is_array()
        && info
            .element_type()
            .is_ok_and(|element| element.builtin() == Some(Builtin::Byte))
}

impl<'a> TypeGenerator<'a> {
    /// Pick the default strategy, first match wins.
    pub(super) fn select_strategy(&mut self, location: &str, info: TypeInfo<'a>) -> Result<Strategy> {
        if info.builtin().is_some() || is_byte_array(info) {
            return Ok(Strategy::Builtin);
        }
        if info.is_array() || info.is_instance_of(Container::List) {
            return Ok(Strategy::Array);
        }
        if info.is_instance_of(Container::Dictionary) {
            return Ok(Strategy::Dictionary);
        }
        if info.is_enum() {
            return self.declare_enum(location, info);
        }
        if info.is_instance_of(Container::Nullable) {
            if self.options.enable_explicit_nullability {
                return Ok(Strategy::Nullable);
            }
            let underlying = info.element_type()?.id();
            return Ok(Strategy::Unwrapped { underlying });
        }
        if info.is_generic() && !info.is_generic_type_definition() {
            return Ok(Strategy::GenericInstance);
        }
        if info.is_generic_parameter() {
            return Ok(Strategy::GenericParameter);
        }
        if info.container().is_some() {
            return Err(ShapeError::OpenContainer(info.key().to_string()).into());
        }
        self.declare_object(location, info)
    }

    fn declare_enum(&mut self, location: &str, info: TypeInfo<'a>) -> Result<Strategy> {
        let unit = self.units.get_or_create(location);
        let name = info.name().to_string();
        let values: Vec<String> = info.enum_members().iter().map(|m| m.name.clone()).collect();

        match self.options.enum_generation_mode {
            EnumGenerationMode::TypeScriptEnum => {
                self.units.declare(
                    unit,
                    Declaration::Enum {
                        name: name.clone(),
                        values,
                    },
                )?;
                Ok(Strategy::NativeEnum { unit, name })
            }
            EnumGenerationMode::FixedStringsAndDictionary => {
                let lookup = self.options.plural_of(&name);
                self.units.declare(
                    unit,
                    Declaration::FixedStrings {
                        name: name.clone(),
                        values,
                        lookup,
                    },
                )?;
                Ok(Strategy::FixedStrings { unit, name })
            }
        }
    }

    /// Declare an empty object shape; members are filled by the build loop.
    fn declare_object(&mut self, location: &str, info: TypeInfo<'a>) -> Result<Strategy> {
        let unit = self.units.get_or_create(location);
        let name = info.name().to_string();
        let parameters = info
            .generic_arguments()
            .into_iter()
            .map(|parameter| parameter.name().to_string())
            .collect();
        let declaration = self.units.declare(
            unit,
            Declaration::Object {
                name: name.clone(),
                parameters,
                members: Vec::new(),
            },
        )?;
        Ok(Strategy::Object {
            unit,
            name,
            declaration,
        })
    }
}
