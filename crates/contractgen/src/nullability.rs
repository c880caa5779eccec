//! Nullability policy.
//!
//! Pure functions deciding whether a use site is nullable, whether a member
//! is optional, and how a nullable type expression is wrapped.

use contractgen_core::{Annotation, Annotations, Container, Member, TypeInfo};

use crate::options::{GenerationOptions, NullabilityMode};
use crate::syntax::TypeExpr;

/// Nullable-reference flag meaning "may be null".
const NULLABLE_FLAG: u8 = 2;

/// Annotations in effect at a use site, with the type that declares them.
#[derive(Clone, Copy, Debug)]
pub struct AttributeContext<'u> {
    annotations: &'u Annotations,
    declaring_type: Option<TypeInfo<'u>>,
}

impl<'u> AttributeContext<'u> {
    pub fn new(annotations: &'u Annotations) -> Self {
        Self {
            annotations,
            declaring_type: None,
        }
    }

    /// Context of `member` declared on `owner`.
    pub fn member(owner: TypeInfo<'u>, member: &'u Member) -> Self {
        Self {
            annotations: &member.annotations,
            declaring_type: Some(owner),
        }
    }

    pub fn annotations(self) -> &'u Annotations {
        self.annotations
    }

    pub fn declaring_type(self) -> Option<TypeInfo<'u>> {
        self.declaring_type
    }

    pub fn has(self, annotation: Annotation) -> bool {
        self.annotations.has(annotation)
    }

    /// Flag used when no per-position flags exist: member context, then the
    /// declaring type's context, then oblivious.
    fn context_flag(self) -> u8 {
        self.annotations
            .nullable_context()
            .or_else(|| self.declaring_type.and_then(|t| t.nullable_context()))
            .unwrap_or(0)
    }
}

/// Split a member type into (is nullable, type to emit).
///
/// `Nullable<T>` unwraps to `T`. Other types consult the annotations under
/// the active mode; without annotations nothing but `Nullable<T>` is nullable.
pub fn process_nullable<'u>(
    attrs: Option<AttributeContext<'u>>,
    ty: TypeInfo<'u>,
    mode: NullabilityMode,
) -> (bool, TypeInfo<'u>) {
    if ty.is_instance_of(Container::Nullable)
        && let Ok(underlying) = ty.element_type()
    {
        return (mode != NullabilityMode::None, underlying);
    }

    let Some(attrs) = attrs else {
        return (false, ty);
    };
    if ty.is_value_type() {
        return (false, ty);
    }

    let nullable = match mode {
        NullabilityMode::None => false,
        NullabilityMode::Pessimistic => {
            !attrs.has(Annotation::NotNull) && !attrs.has(Annotation::Required)
        }
        NullabilityMode::OptIn => attrs.has(Annotation::CanBeNull),
        NullabilityMode::NullableReference => nullable_reference_can_be_null(attrs, ty, 0),
    };
    (nullable, ty)
}

/// Whether the nullable-reference flag at `index` marks `ty` nullable.
///
/// A single flag applies to every position.
pub fn nullable_reference_can_be_null(
    attrs: AttributeContext<'_>,
    ty: TypeInfo<'_>,
    index: usize,
) -> bool {
    let fallback;
    let flags: &[u8] = match attrs.annotations.nullable_flags() {
        Some(flags) => flags,
        None => {
            fallback = [attrs.context_flag()];
            &fallback
        }
    };

    let nullable = (flags.len() == 1 && flags[0] == NULLABLE_FLAG)
        || flags.get(index) == Some(&NULLABLE_FLAG);
    nullable && !ty.is_value_type()
}

/// Whether array or list items may be null.
pub fn can_item_be_null(
    element: TypeInfo<'_>,
    mode: NullabilityMode,
    attrs: Option<AttributeContext<'_>>,
) -> bool {
    can_position_be_null(element, mode, attrs, 1)
}

/// Whether dictionary values may be null. Value flags follow the key's.
pub fn can_value_be_null(
    key: TypeInfo<'_>,
    value: TypeInfo<'_>,
    mode: NullabilityMode,
    attrs: Option<AttributeContext<'_>>,
) -> bool {
    can_position_be_null(value, mode, attrs, 1 + generic_arguments_to_skip(key))
}

/// Whether the generic argument at `position` may be null.
///
/// Only nullable-reference flags reach generic arguments. Argument flags
/// start at index 1 and follow the positions of the preceding arguments.
pub fn can_argument_be_null(
    arguments: &[TypeInfo<'_>],
    position: usize,
    mode: NullabilityMode,
    attrs: Option<AttributeContext<'_>>,
) -> bool {
    let (Some(attrs), Some(&argument)) = (attrs, arguments.get(position)) else {
        return false;
    };
    if mode != NullabilityMode::NullableReference || argument.is_enum() {
        return false;
    }

    let index = 1 + arguments[..position]
        .iter()
        .map(|&a| generic_arguments_to_skip(a))
        .sum::<usize>();
    nullable_reference_can_be_null(attrs, argument, index)
}

fn can_position_be_null(
    item: TypeInfo<'_>,
    mode: NullabilityMode,
    attrs: Option<AttributeContext<'_>>,
    index: usize,
) -> bool {
    let Some(attrs) = attrs else {
        return false;
    };
    if item.is_value_type() || item.is_enum() {
        return false;
    }

    match mode {
        NullabilityMode::NullableReference => nullable_reference_can_be_null(attrs, item, index),
        NullabilityMode::Pessimistic => !attrs.has(Annotation::ItemNotNull),
        NullabilityMode::OptIn | NullabilityMode::None => attrs.has(Annotation::ItemCanBeNull),
    }
}

/// Number of nullable-reference flag positions `ty` occupies.
pub fn generic_arguments_to_skip(ty: TypeInfo<'_>) -> usize {
    if ty.is_array() {
        return 1 + ty.element_type().map_or(0, generic_arguments_to_skip);
    }
    if ty.is_instance_of(Container::Nullable) {
        return 0;
    }
    if !ty.is_generic() {
        return usize::from(!ty.is_value_type());
    }

    1 + ty
        .generic_arguments()
        .into_iter()
        .map(generic_arguments_to_skip)
        .sum::<usize>()
}

/// Wrap `inner` as nullable when the policy asks for it.
///
/// Already wrapped expressions are returned unchanged.
pub fn build_target_nullable(
    inner: TypeExpr,
    is_nullable: bool,
    options: &GenerationOptions,
) -> TypeExpr {
    if !is_nullable
        || inner.is_nullability_wrapper()
        || options.nullability_mode == NullabilityMode::None
    {
        return inner;
    }

    if options.use_global_nullable {
        TypeExpr::Nullable(Box::new(inner))
    } else {
        TypeExpr::OrNull(Box::new(inner))
    }
}

/// A nullable member is optional only when optional properties are enabled.
pub fn is_optional(is_nullable: bool, options: &GenerationOptions) -> bool {
    is_nullable && options.enable_optional_properties
}
