//! Serialization of units into TypeScript or Flow source.

use crate::options::{GenerationOptions, JavaScriptTypeChecker, LinterDisableMode};

use super::units::{TypeUnits, Unit, UnitId};
use super::{Declaration, MemberDeclaration, TypeExpr};

const GENERATED_MARKER: &str = "// contractgen generated content";

/// Source text of one unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedUnit {
    /// `<location>.ts` or `<location>.js`
    pub path: String,
    pub code: String,
}

/// The points where the two dialects differ.
#[derive(Clone, Copy, Debug)]
struct Dialect(JavaScriptTypeChecker);

impl Dialect {
    fn extension(self) -> &'static str {
        match self.0 {
            JavaScriptTypeChecker::TypeScript => "ts",
            JavaScriptTypeChecker::Flow => "js",
        }
    }

    fn pragma(self) -> Option<&'static str> {
        match self.0 {
            JavaScriptTypeChecker::TypeScript => None,
            JavaScriptTypeChecker::Flow => Some("// @flow"),
        }
    }

    fn global_nullable(self, inner: &str) -> String {
        match self.0 {
            JavaScriptTypeChecker::TypeScript => format!("Nullable<{inner}>"),
            JavaScriptTypeChecker::Flow => format!("?{inner}"),
        }
    }

    /// Whether the global nullable form needs parentheses as an array element.
    fn global_nullable_is_compound(self) -> bool {
        self.0 == JavaScriptTypeChecker::Flow
    }

    fn typed_literal(self, literal: &str, type_name: &str) -> String {
        match self.0 {
            JavaScriptTypeChecker::TypeScript => format!("({literal}) as {type_name}"),
            JavaScriptTypeChecker::Flow => format!("({literal}: {type_name})"),
        }
    }
}

impl TypeUnits {
    /// Render every unit in creation order.
    pub fn render(&self, options: &GenerationOptions) -> Vec<RenderedUnit> {
        let dialect = Dialect(options.type_checker);
        self.iter()
            .map(|(id, unit)| {
                let mut renderer = Renderer::new(self, dialect, options.linter_disable_mode);
                renderer.render_unit(id, unit);
                RenderedUnit {
                    path: format!("{}.{}", unit.stem(), dialect.extension()),
                    code: renderer.finish(),
                }
            })
            .collect()
    }
}

struct Renderer<'a> {
    units: &'a TypeUnits,
    dialect: Dialect,
    linter: LinterDisableMode,
    /// Output buffer
    output: String,
}

impl<'a> Renderer<'a> {
    fn new(units: &'a TypeUnits, dialect: Dialect, linter: LinterDisableMode) -> Self {
        Self {
            units,
            dialect,
            linter,
            output: String::new(),
        }
    }

    fn render_unit(&mut self, id: UnitId, unit: &Unit) {
        self.render_header();

        let mut imports = unit.imports().peekable();
        if imports.peek().is_some() {
            self.output.push('\n');
            for import in imports {
                let specifier = self.units.specifier(id, &import.source);
                self.output.push_str(&format!(
                    "import {{ {} }} from '{specifier}';\n",
                    import.name
                ));
            }
        }

        for declaration in unit.declarations() {
            self.output.push('\n');
            self.render_declaration(declaration);
        }
    }

    fn render_header(&mut self) {
        if let Some(pragma) = self.dialect.pragma() {
            self.output.push_str(pragma);
            self.output.push('\n');
        }
        match self.linter {
            LinterDisableMode::TsLint => self.output.push_str("// tslint:disable\n"),
            LinterDisableMode::EsLint => self.output.push_str("/* eslint-disable */\n"),
            LinterDisableMode::None => {}
        }
        self.output.push_str(GENERATED_MARKER);
        self.output.push('\n');
    }

    fn render_declaration(&mut self, declaration: &Declaration) {
        match declaration {
            Declaration::Object {
                name,
                parameters,
                members,
            } => self.render_object(name, parameters, members),
            Declaration::Enum { name, values } => self.render_enum(name, values),
            Declaration::FixedStrings {
                name,
                values,
                lookup,
            } => self.render_fixed_strings(name, values, lookup),
        }
    }

    fn render_object(&mut self, name: &str, parameters: &[String], members: &[MemberDeclaration]) {
        let generics = if parameters.is_empty() {
            String::new()
        } else {
            format!("<{}>", parameters.join(", "))
        };
        self.output
            .push_str(&format!("export type {name}{generics} = {{\n"));
        for member in members {
            let optional = if member.optional { "?" } else { "" };
            let ty = self.render_type(&member.ty);
            self.output
                .push_str(&format!("    {}{optional}: {ty};\n", member.name));
        }
        self.output.push_str("};\n");
    }

    fn render_enum(&mut self, name: &str, values: &[String]) {
        self.output.push_str(&format!("export enum {name} {{\n"));
        for value in values {
            self.output.push_str(&format!("    {value} = '{value}',\n"));
        }
        self.output.push_str("}\n");
    }

    fn render_fixed_strings(&mut self, name: &str, values: &[String], lookup: &str) {
        let literals: Vec<String> = values
            .iter()
            .map(|value| self.render_type(&TypeExpr::StringLiteral(value.clone())))
            .collect();
        let union = if literals.is_empty() {
            "never".to_string()
        } else {
            literals.join(" | ")
        };
        self.output
            .push_str(&format!("export type {name} = {union};\n"));

        self.output
            .push_str(&format!("export const {lookup} = {{\n"));
        for literal in &literals {
            let typed = self.dialect.typed_literal(literal, name);
            self.output
                .push_str(&format!("    [{literal}]: {typed},\n"));
        }
        self.output.push_str("};\n");
    }

    fn render_type(&self, ty: &TypeExpr) -> String {
        match ty {
            TypeExpr::Reference(name) => name.clone(),
            TypeExpr::Generic { base, arguments } => {
                let arguments: Vec<String> = arguments.iter().map(|a| self.render_type(a)).collect();
                format!("{}<{}>", self.render_type(base), arguments.join(", "))
            }
            TypeExpr::Array(element) => {
                let inner = self.render_type(element);
                if self.is_compound(element) {
                    format!("({inner})[]")
                } else {
                    format!("{inner}[]")
                }
            }
            TypeExpr::OrNull(inner) => format!("null | {}", self.render_type(inner)),
            TypeExpr::Nullable(inner) => self.dialect.global_nullable(&self.render_type(inner)),
            TypeExpr::Dictionary { key, value } => format!(
                "{{ [key: {}]: {} }}",
                self.render_type(key),
                self.render_type(value)
            ),
            TypeExpr::Union(items) => {
                let items: Vec<String> = items.iter().map(|i| self.render_type(i)).collect();
                format!("({})", items.join(" | "))
            }
            TypeExpr::StringLiteral(value) => {
                format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
            }
        }
    }

    /// Whether `ty` needs parentheses before an array suffix.
    fn is_compound(&self, ty: &TypeExpr) -> bool {
        match ty {
            TypeExpr::OrNull(_) => true,
            TypeExpr::Nullable(_) => self.dialect.global_nullable_is_compound(),
            _ => false,
        }
    }

    fn finish(mut self) -> String {
        // Ensure exactly one trailing newline
        self.output.truncate(self.output.trim_end().len());
        self.output.push('\n');
        self.output
    }
}
