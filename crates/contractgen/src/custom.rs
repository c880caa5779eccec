//! Extension point: consumer overrides consulted before default strategies.
//!
//! Precedence is fixed: type location, then a full custom context (redirect
//! or consumer-built), then per-member overrides while building objects,
//! then the default strategies. Two rules competing for the same slot are an
//! [`Error::AmbiguousOverride`], never silently ordered.

use std::collections::HashMap;
use std::rc::Rc;

use contractgen_core::{Member, TypeInfo};

use crate::generator::TypeGenerator;
use crate::nullability::AttributeContext;
use crate::syntax::{MemberDeclaration, TypeExpr, TypeUnits, UnitId};
use crate::{Error, Result};

/// A consumer-supplied building strategy.
///
/// The engine inserts the context before calling [`initialize`], calls
/// [`build_definition`] once from the build loop, and asks it for a reference
/// at every use site.
///
/// [`initialize`]: TypeBuildingContext::initialize
/// [`build_definition`]: TypeBuildingContext::build_definition
pub trait TypeBuildingContext {
    fn initialize<'u>(&self, _ty: TypeInfo<'u>, _generator: &mut TypeGenerator<'u>) -> Result<()> {
        Ok(())
    }

    fn build_definition<'u>(
        &self,
        _ty: TypeInfo<'u>,
        _generator: &mut TypeGenerator<'u>,
    ) -> Result<()> {
        Ok(())
    }

    fn reference_from<'u>(
        &self,
        ty: TypeInfo<'u>,
        unit: UnitId,
        generator: &mut TypeGenerator<'u>,
        attrs: Option<AttributeContext<'u>>,
    ) -> Result<TypeExpr>;
}

/// Full override of a type's building context.
#[derive(Clone)]
pub enum CustomContext {
    /// References point at `name` imported from `location`; nothing is declared.
    Redirect { name: String, location: String },
    Custom(Rc<dyn TypeBuildingContext>),
}

/// Hooks consulted by the engine before default strategy selection.
pub trait CustomTypeGenerator {
    /// Location of the unit declaring `ty`. Empty means the shared root unit.
    fn type_location(&self, _ty: TypeInfo<'_>) -> Result<String> {
        Ok(String::new())
    }

    fn resolve_type(
        &self,
        _location: &str,
        _ty: TypeInfo<'_>,
        _units: &mut TypeUnits,
    ) -> Result<Option<CustomContext>> {
        Ok(None)
    }

    fn resolve_member<'u>(
        &self,
        _unit: UnitId,
        _generator: &mut TypeGenerator<'u>,
        _owner: TypeInfo<'u>,
        _member: &'u Member,
    ) -> Result<Option<MemberDeclaration>> {
        Ok(None)
    }
}

/// Overrides nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullCustomTypeGenerator;

impl CustomTypeGenerator for NullCustomTypeGenerator {}

type LocationRule = Box<dyn Fn(TypeInfo<'_>) -> String>;
type ContextRule = Box<dyn Fn(TypeInfo<'_>) -> Rc<dyn TypeBuildingContext>>;
type MemberRule = Box<
    dyn for<'u> Fn(&mut TypeGenerator<'u>, UnitId, TypeInfo<'u>, &'u Member) -> Result<MemberDeclaration>,
>;

/// Rule-based [`CustomTypeGenerator`] keyed by type key.
#[derive(Default)]
pub struct CustomRules {
    locations: HashMap<String, Vec<LocationRule>>,
    redirects: HashMap<String, Vec<(String, String)>>,
    contexts: HashMap<String, Vec<ContextRule>>,
    members: HashMap<(String, String), Vec<MemberRule>>,
}

impl CustomRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place the type with key `key` in the unit returned by `location`.
    pub fn with_type_location(
        mut self,
        key: impl Into<String>,
        location: impl Fn(TypeInfo<'_>) -> String + 'static,
    ) -> Self {
        self.locations
            .entry(key.into())
            .or_default()
            .push(Box::new(location));
        self
    }

    /// Route every reference to `key` to `name` imported from `location`.
    pub fn with_type_redirect(
        mut self,
        key: impl Into<String>,
        name: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        self.redirects
            .entry(key.into())
            .or_default()
            .push((name.into(), location.into()));
        self
    }

    pub fn with_type_building_context<C>(
        mut self,
        key: impl Into<String>,
        create: impl Fn(TypeInfo<'_>) -> C + 'static,
    ) -> Self
    where
        C: TypeBuildingContext + 'static,
    {
        self.contexts
            .entry(key.into())
            .or_default()
            .push(Box::new(move |ty: TypeInfo<'_>| -> Rc<dyn TypeBuildingContext> {
                Rc::new(create(ty))
            }));
        self
    }

    /// Replace the declaration of member `member` of the type `key`.
    pub fn with_member_override<F>(
        mut self,
        key: impl Into<String>,
        member: impl Into<String>,
        declare: F,
    ) -> Self
    where
        F: for<'u> Fn(&mut TypeGenerator<'u>, UnitId, TypeInfo<'u>, &'u Member) -> Result<MemberDeclaration>
            + 'static,
    {
        self.members
            .entry((key.into(), member.into()))
            .or_default()
            .push(Box::new(declare));
        self
    }
}

fn ambiguous(key: impl Into<String>, rules: Vec<&str>) -> Error {
    Error::AmbiguousOverride {
        key: key.into(),
        rules: rules.into_iter().map(str::to_string).collect(),
    }
}

impl CustomTypeGenerator for CustomRules {
    fn type_location(&self, ty: TypeInfo<'_>) -> Result<String> {
        match self.locations.get(ty.key()).map(Vec::as_slice) {
            None | Some([]) => Ok(String::new()),
            Some([location]) => Ok(location(ty)),
            Some(rules) => Err(ambiguous(ty.key(), vec!["type location"; rules.len()])),
        }
    }

    fn resolve_type(
        &self,
        _location: &str,
        ty: TypeInfo<'_>,
        _units: &mut TypeUnits,
    ) -> Result<Option<CustomContext>> {
        let redirects = self.redirects.get(ty.key()).map_or(&[][..], Vec::as_slice);
        let contexts = self.contexts.get(ty.key()).map_or(&[][..], Vec::as_slice);

        if redirects.len() + contexts.len() > 1 {
            let mut rules = vec!["type redirect"; redirects.len()];
            rules.extend(vec!["type building context"; contexts.len()]);
            return Err(ambiguous(ty.key(), rules));
        }

        if let [(name, location)] = redirects {
            return Ok(Some(CustomContext::Redirect {
                name: name.clone(),
                location: location.clone(),
            }));
        }
        if let [create] = contexts {
            return Ok(Some(CustomContext::Custom(create(ty))));
        }
        Ok(None)
    }

    fn resolve_member<'u>(
        &self,
        unit: UnitId,
        generator: &mut TypeGenerator<'u>,
        owner: TypeInfo<'u>,
        member: &'u Member,
    ) -> Result<Option<MemberDeclaration>> {
        let key = (owner.key().to_string(), member.name.clone());
        match self.members.get(&key).map(Vec::as_slice) {
            None | Some([]) => Ok(None),
            Some([declare]) => declare(generator, unit, owner, member).map(Some),
            Some(rules) => Err(ambiguous(
                format!("{}.{}", key.0, key.1),
                vec!["member override"; rules.len()],
            )),
        }
    }
}
