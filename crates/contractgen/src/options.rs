//! Options for one generation run.

use std::fmt;
use std::sync::Arc;

use contractgen_core::utils;

use crate::{Error, Result};

/// How source nullability signals map to nullable output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NullabilityMode {
    /// Nothing is nullable.
    None,
    /// Reference types are nullable unless marked not-null.
    #[default]
    Pessimistic,
    /// Reference types are nullable only when marked nullable.
    OptIn,
    /// Nullable exactly where nullable-reference flags say so.
    NullableReference,
}

/// How enums are declared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnumGenerationMode {
    /// A string-literal union plus a lookup constant.
    #[default]
    FixedStringsAndDictionary,
    /// A native `enum` declaration (TypeScript only).
    TypeScriptEnum,
}

/// Linter suppression comment at the top of every unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LinterDisableMode {
    #[default]
    TsLint,
    EsLint,
    None,
}

/// Target dialect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JavaScriptTypeChecker {
    #[default]
    TypeScript,
    Flow,
}

/// Pluralization function used to name enum lookup constants.
#[derive(Clone)]
pub struct Pluralize(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl Pluralize {
    pub fn new(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn apply(&self, word: &str) -> String {
        (self.0)(word)
    }
}

impl Default for Pluralize {
    fn default() -> Self {
        Self::new(utils::pluralize)
    }
}

impl fmt::Debug for Pluralize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pluralize(..)")
    }
}

/// Options for one generation run. Immutable once the run starts.
#[derive(Clone, Debug)]
pub struct GenerationOptions {
    pub(crate) nullability_mode: NullabilityMode,
    pub(crate) enum_generation_mode: EnumGenerationMode,
    /// Nullable members are emitted as `name?:`
    pub(crate) enable_optional_properties: bool,
    /// `Nullable<T>` outside member position stays nullable
    pub(crate) enable_explicit_nullability: bool,
    /// Wrap with the global `Nullable<T>` instead of `null | T`
    pub(crate) use_global_nullable: bool,
    pub(crate) linter_disable_mode: LinterDisableMode,
    pub(crate) type_checker: JavaScriptTypeChecker,
    pub(crate) pluralize: Option<Pluralize>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            nullability_mode: NullabilityMode::default(),
            enum_generation_mode: EnumGenerationMode::default(),
            enable_optional_properties: true,
            enable_explicit_nullability: true,
            use_global_nullable: false,
            linter_disable_mode: LinterDisableMode::default(),
            type_checker: JavaScriptTypeChecker::default(),
            pluralize: Some(Pluralize::default()),
        }
    }
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nullability_mode(mut self, value: NullabilityMode) -> Self {
        self.nullability_mode = value;
        self
    }

    pub fn enum_generation_mode(mut self, value: EnumGenerationMode) -> Self {
        self.enum_generation_mode = value;
        self
    }

    pub fn enable_optional_properties(mut self, value: bool) -> Self {
        self.enable_optional_properties = value;
        self
    }

    pub fn enable_explicit_nullability(mut self, value: bool) -> Self {
        self.enable_explicit_nullability = value;
        self
    }

    pub fn use_global_nullable(mut self, value: bool) -> Self {
        self.use_global_nullable = value;
        self
    }

    pub fn linter_disable_mode(mut self, value: LinterDisableMode) -> Self {
        self.linter_disable_mode = value;
        self
    }

    pub fn type_checker(mut self, value: JavaScriptTypeChecker) -> Self {
        self.type_checker = value;
        self
    }

    /// Set the pluralization function.
    pub fn pluralize(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.pluralize = Some(Pluralize::new(f));
        self
    }

    /// Remove the pluralization function. Validation rejects this.
    pub fn without_pluralize(mut self) -> Self {
        self.pluralize = None;
        self
    }

    pub fn mode(&self) -> NullabilityMode {
        self.nullability_mode
    }

    pub fn checker(&self) -> JavaScriptTypeChecker {
        self.type_checker
    }

    /// Reject option combinations no run can honor.
    pub fn validate(&self) -> Result<()> {
        if self.type_checker == JavaScriptTypeChecker::Flow
            && self.enum_generation_mode == EnumGenerationMode::TypeScriptEnum
        {
            return Err(Error::Misconfiguration(
                "Flow is not compatible with TypeScript enums".to_string(),
            ));
        }

        const PROBE: &str = "Enum";
        let valid = self
            .pluralize
            .as_ref()
            .map(|p| p.apply(PROBE))
            .is_some_and(|plural| !plural.is_empty() && plural != PROBE);
        if !valid {
            return Err(Error::Misconfiguration(
                "invalid pluralize function: it must exist and return a non-empty, changed word"
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Plural form of a declared name. Falls back to English rules when unset.
    pub(crate) fn plural_of(&self, name: &str) -> String {
        match &self.pluralize {
            Some(p) => p.apply(name),
            None => utils::pluralize(name),
        }
    }
}
