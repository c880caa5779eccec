//! Reference and definition builders of the default strategies.

use contractgen_core::{Builtin, ShapeError, TypeInfo};

use crate::nullability::{self, AttributeContext};
use crate::syntax::{Declaration, ImportSource, MemberDeclaration, TypeExpr, UnitId};
use crate::{Error, Result};

use super::TypeGenerator;
use super::context::{BuildingContext, Strategy};

impl<'a> TypeGenerator<'a> {
    pub(super) fn reference_from(
        &mut self,
        context: &BuildingContext,
        unit: UnitId,
        attrs: Option<AttributeContext<'a>>,
    ) -> Result<TypeExpr> {
        let info = self.universe.info(context.ty());
        match context.strategy() {
            Strategy::Builtin => Ok(builtin_reference(info)),
            Strategy::Array => self.reference_array(info, unit, attrs),
            Strategy::Dictionary => self.reference_dictionary(info, unit, attrs),
            Strategy::NativeEnum { unit: owner, name }
            | Strategy::FixedStrings { unit: owner, name }
            | Strategy::Object {
                unit: owner, name, ..
            } => {
                self.units
                    .add_import(unit, name, ImportSource::Unit(*owner))?;
                Ok(TypeExpr::reference(name))
            }
            Strategy::Nullable => {
                let underlying = info.element_type()?;
                let inner = self.reference_type(unit, underlying.id(), None)?;
                Ok(nullability::build_target_nullable(
                    inner,
                    true,
                    &self.options,
                ))
            }
            Strategy::Unwrapped { underlying } => self.reference_type(unit, *underlying, attrs),
            Strategy::GenericInstance => self.reference_generic(info, unit, attrs),
            Strategy::GenericParameter => Ok(TypeExpr::reference(info.name())),
            Strategy::Redirect { name, location } => {
                self.units
                    .add_import(unit, name, ImportSource::External(location.clone()))?;
                Ok(TypeExpr::reference(name))
            }
            Strategy::Custom(custom) => custom.reference_from(info, unit, self, attrs),
        }
    }

    fn reference_array(
        &mut self,
        info: TypeInfo<'a>,
        unit: UnitId,
        attrs: Option<AttributeContext<'a>>,
    ) -> Result<TypeExpr> {
        let element = info.element_type()?;
        let item = self.reference_type(unit, element.id(), None)?;
        let nullable = nullability::can_item_be_null(element, self.options.nullability_mode, attrs);
        let item = nullability::build_target_nullable(item, nullable, &self.options);
        Ok(TypeExpr::Array(Box::new(item)))
    }

    fn reference_dictionary(
        &mut self,
        info: TypeInfo<'a>,
        unit: UnitId,
        attrs: Option<AttributeContext<'a>>,
    ) -> Result<TypeExpr> {
        let arguments = info.generic_arguments();
        let &[key, value] = arguments.as_slice() else {
            return Err(ShapeError::ArgumentCountMismatch {
                key: info.key().to_string(),
                expected: 2,
                actual: arguments.len(),
            }
            .into());
        };

        let key_expr = self.reference_type(unit, key.id(), None)?;
        let value_expr = self.reference_type(unit, value.id(), None)?;
        let nullable =
            nullability::can_value_be_null(key, value, self.options.nullability_mode, attrs);
        Ok(TypeExpr::Dictionary {
            key: Box::new(key_expr),
            value: Box::new(nullability::build_target_nullable(
                value_expr,
                nullable,
                &self.options,
            )),
        })
    }

    fn reference_generic(
        &mut self,
        info: TypeInfo<'a>,
        unit: UnitId,
        attrs: Option<AttributeContext<'a>>,
    ) -> Result<TypeExpr> {
        let definition = info
            .generic_type_definition()
            .ok_or_else(|| ShapeError::NotGenericDefinition(info.key().to_string()))?;
        let base = self.reference_type(unit, definition.id(), None)?;

        let arguments = info.generic_arguments();
        let mut expressions = Vec::with_capacity(arguments.len());
        for (position, argument) in arguments.iter().enumerate() {
            let argument = self.reference_type(unit, argument.id(), None)?;
            let nullable = nullability::can_argument_be_null(
                &arguments,
                position,
                self.options.nullability_mode,
                attrs,
            );
            expressions.push(nullability::build_target_nullable(
                argument,
                nullable,
                &self.options,
            ));
        }
        Ok(TypeExpr::Generic {
            base: Box::new(base),
            arguments: expressions,
        })
    }

    /// Fill the members of an object declared by [`Strategy::Object`].
    pub(super) fn build_object(
        &mut self,
        info: TypeInfo<'a>,
        unit: UnitId,
        declaration: usize,
    ) -> Result<()> {
        let mut members: Vec<MemberDeclaration> = Vec::new();
        for member in info.members() {
            let Some(resolved) = self.resolve_member(unit, info, member)? else {
                continue;
            };
            if members.iter().any(|m| m.name == resolved.name) {
                return Err(Error::DuplicateMember {
                    type_name: info.key().to_string(),
                    member: resolved.name,
                });
            }
            members.push(resolved);
        }

        if let Declaration::Object { members: slot, .. } =
            self.units.declaration_mut(unit, declaration)
        {
            *slot = members;
        }
        Ok(())
    }
}

fn builtin_reference(info: TypeInfo<'_>) -> TypeExpr {
    let Some(builtin) = info.builtin() else {
        // byte[] travels as base64
        return TypeExpr::reference("string");
    };

    match builtin {
        Builtin::Bool => TypeExpr::reference("boolean"),
        Builtin::Byte
        | Builtin::SByte
        | Builtin::Int16
        | Builtin::UInt16
        | Builtin::Int32
        | Builtin::UInt32
        | Builtin::Single
        | Builtin::Double
        | Builtin::Decimal => TypeExpr::reference("number"),
        Builtin::Int64
        | Builtin::UInt64
        | Builtin::Char
        | Builtin::String
        | Builtin::Guid => TypeExpr::reference("string"),
        Builtin::DateTime | Builtin::DateTimeOffset => TypeExpr::Union(vec![
            TypeExpr::reference("Date"),
            TypeExpr::reference("string"),
        ]),
        Builtin::TimeSpan => TypeExpr::Union(vec![
            TypeExpr::reference("number"),
            TypeExpr::reference("string"),
        ]),
        Builtin::Object => TypeExpr::reference("any"),
        Builtin::Void => TypeExpr::reference("void"),
    }
}
