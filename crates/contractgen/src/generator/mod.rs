//! Resolution engine.
//!
//! One [`TypeGenerator`] owns a run: the identity map from type to building
//! context and the unit registry. Contexts are created on first resolution
//! and inserted before they initialize, so a type reached again through a
//! cycle finds its context already present. The build loop then completes
//! contexts until a full pass finds none incomplete.

mod context;
mod strategies;


use contractgen_core::utils::to_lower_camel_case;
use contractgen_core::{Annotation, Member, TypeId, TypeInfo, TypeUniverse};
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::custom::{CustomContext, CustomTypeGenerator};
use crate::nullability::{self, AttributeContext};
use crate::options::GenerationOptions;
use crate::syntax::{MemberDeclaration, TypeExpr, TypeUnits, UnitId};
use crate::Result;

pub use context::{BuildingContext, Strategy};

/// Supplies the types a run starts from.
pub trait RootTypesProvider {
    fn root_types(&self) -> Vec<TypeId>;
}

impl RootTypesProvider for [TypeId] {
    fn root_types(&self) -> Vec<TypeId> {
        self.to_vec()
    }
}

impl<const N: usize> RootTypesProvider for [TypeId; N] {
    fn root_types(&self) -> Vec<TypeId> {
        self.to_vec()
    }
}

impl RootTypesProvider for Vec<TypeId> {
    fn root_types(&self) -> Vec<TypeId> {
        self.clone()
    }
}

/// Resolution engine for one generation run.
pub struct TypeGenerator<'a> {
    universe: &'a TypeUniverse,
    options: GenerationOptions,
    custom: &'a dyn CustomTypeGenerator,
    roots: Vec<TypeId>,
    /// Type -> building context, in creation order
    contexts: IndexMap<TypeId, BuildingContext>,
    units: TypeUnits,
}

impl<'a> TypeGenerator<'a> {
    pub fn new(
        universe: &'a TypeUniverse,
        options: GenerationOptions,
        custom: &'a dyn CustomTypeGenerator,
        roots: &(impl RootTypesProvider + ?Sized),
    ) -> Self {
        Self {
            universe,
            options,
            custom,
            roots: roots.root_types(),
            contexts: IndexMap::new(),
            units: TypeUnits::new(),
        }
    }

    /// Build every definition reachable from the roots and hand over the units.
    pub fn generate(mut self) -> Result<TypeUnits> {
        self.build_all()?;
        Ok(self.units)
    }

    /// Validate options, resolve the roots, then build until the fixpoint.
    pub fn build_all(&mut self) -> Result<()> {
        self.options.validate()?;

        for root in self.roots.clone() {
            self.resolve_index(root)?;
        }

        let mut pass = 0usize;
        while self.contexts.values().any(|c| !c.is_definition_built()) {
            pass += 1;
            let scanned = self.contexts.len();
            let mut built = 0usize;
            for index in 0..scanned {
                if !self.contexts[index].is_definition_built() {
                    self.build_definition(index)?;
                    built += 1;
                }
            }
            trace!(pass, scanned, built, "build pass");
        }
        Ok(())
    }

    /// The memoized context for `ty`, created on first request.
    pub fn resolve(&mut self, ty: TypeId) -> Result<&BuildingContext> {
        let index = self.resolve_index(ty)?;
        Ok(&self.contexts[index])
    }

    fn resolve_index(&mut self, ty: TypeId) -> Result<usize> {
        if let Some(index) = self.contexts.get_index_of(&ty) {
            return Ok(index);
        }

        let info = self.universe.info(ty);
        let custom = self.custom;
        let location = custom.type_location(info)?;
        if !location.is_empty() {
            debug!(key = info.key(), %location, "type location override");
        }

        let strategy = match custom.resolve_type(&location, info, &mut self.units)? {
            Some(CustomContext::Redirect { name, location }) => {
                debug!(key = info.key(), %name, %location, "type redirected");
                Strategy::Redirect { name, location }
            }
            Some(CustomContext::Custom(context)) => {
                debug!(key = info.key(), "custom building context");
                Strategy::Custom(context)
            }
            None => self.select_strategy(&location, info)?,
        };

        debug!(
            key = info.key(),
            strategy = strategy.name(),
            unit = ?strategy.unit(),
            "building context created"
        );
        let (index, _) = self
            .contexts
            .insert_full(ty, BuildingContext::new(ty, strategy));
        self.initialize(index)?;
        Ok(index)
    }

    /// Discover the types a structural context is composed of.
    fn initialize(&mut self, index: usize) -> Result<()> {
        let context = self.contexts[index].clone();
        let info = self.universe.info(context.ty());
        match context.strategy() {
            Strategy::Array | Strategy::Nullable => {
                self.resolve_index(info.element_type()?.id())?;
            }
            Strategy::Unwrapped { underlying } => {
                self.resolve_index(*underlying)?;
            }
            Strategy::Dictionary => {
                for argument in info.generic_arguments() {
                    self.resolve_index(argument.id())?;
                }
            }
            Strategy::GenericInstance => {
                if let Some(definition) = info.generic_type_definition() {
                    self.resolve_index(definition.id())?;
                }
                for argument in info.generic_arguments() {
                    self.resolve_index(argument.id())?;
                }
            }
            Strategy::Custom(custom) => custom.initialize(info, self)?,
            _ => {}
        }
        Ok(())
    }

    fn build_definition(&mut self, index: usize) -> Result<()> {
        let context = self.contexts[index].clone();
        if context.is_definition_built() {
            return Ok(());
        }

        let info = self.universe.info(context.ty());
        match context.strategy() {
            Strategy::Object {
                unit, declaration, ..
            } => self.build_object(info, *unit, *declaration)?,
            Strategy::Custom(custom) => custom.build_definition(info, self)?,
            _ => {}
        }
        self.contexts[index].mark_built();
        Ok(())
    }

    /// Reference to `ty` usable from `unit`, importing its declaration if needed.
    pub fn reference_type(
        &mut self,
        unit: UnitId,
        ty: TypeId,
        attrs: Option<AttributeContext<'a>>,
    ) -> Result<TypeExpr> {
        let index = self.resolve_index(ty)?;
        let context = self.contexts[index].clone();
        self.reference_from(&context, unit, attrs)
    }

    /// Like [`reference_type`](Self::reference_type), applying the
    /// nullability policy for the use site first.
    pub fn build_and_import_type(
        &mut self,
        unit: UnitId,
        attrs: Option<AttributeContext<'a>>,
        ty: TypeId,
    ) -> Result<TypeExpr> {
        let info = self.universe.info(ty);
        let (is_nullable, inner) =
            nullability::process_nullable(attrs, info, self.options.nullability_mode);
        let expr = self.reference_type(unit, inner.id(), attrs)?;
        Ok(nullability::build_target_nullable(
            expr,
            is_nullable,
            &self.options,
        ))
    }

    /// Declaration of `member` of `owner`, or `None` if it is skipped.
    pub fn resolve_member(
        &mut self,
        unit: UnitId,
        owner: TypeInfo<'a>,
        member: &'a Member,
    ) -> Result<Option<MemberDeclaration>> {
        let custom = self.custom;
        if let Some(declaration) = custom.resolve_member(unit, self, owner, member)? {
            debug!(owner = owner.key(), member = %member.name, "member override");
            return Ok(Some(declaration));
        }

        if member.annotations.has(Annotation::Ignore) {
            return Ok(None);
        }

        let attrs = AttributeContext::member(owner, member);
        let (is_nullable, ty) = nullability::process_nullable(
            Some(attrs),
            owner.member_type(member),
            self.options.nullability_mode,
        );
        let ty = self.build_and_import_type(unit, Some(attrs), ty.id())?;

        Ok(Some(MemberDeclaration {
            name: to_lower_camel_case(&member.name),
            optional: nullability::is_optional(is_nullable, &self.options),
            ty: nullability::build_target_nullable(ty, is_nullable, &self.options),
        }))
    }

    pub fn context(&self, ty: TypeId) -> Option<&BuildingContext> {
        self.contexts.get(&ty)
    }

    /// Every context, in creation order.
    pub fn contexts(&self) -> impl Iterator<Item = &BuildingContext> {
        self.contexts.values()
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    pub fn universe(&self) -> &'a TypeUniverse {
        self.universe
    }

    pub fn units(&self) -> &TypeUnits {
        &self.units
    }

    pub fn units_mut(&mut self) -> &mut TypeUnits {
        &mut self.units
    }
}
