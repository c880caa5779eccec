//! Test utilities: fixture loading and unit rendering.

use contractgen_core::TypeUniverse;

use crate::{
    CustomTypeGenerator, GenerationOptions, NullCustomTypeGenerator, RenderedUnit, Result,
};

/// Load a JSON fixture and render every generated unit.
pub fn try_generate(
    json: &str,
    options: GenerationOptions,
    custom: &dyn CustomTypeGenerator,
) -> Result<Vec<RenderedUnit>> {
    let (universe, roots) = TypeUniverse::from_json(json).expect("fixture must load");
    crate::generate(&universe, &roots, options, custom)
}

/// Rendered units concatenated, each under a `=== path` line.
pub fn generate_with(
    json: &str,
    options: GenerationOptions,
    custom: &dyn CustomTypeGenerator,
) -> String {
    let units = try_generate(json, options, custom).expect("generation must succeed");
    format_units(&units)
}

pub fn generate_code(json: &str, options: GenerationOptions) -> String {
    generate_with(json, options, &NullCustomTypeGenerator)
}

pub fn format_units(units: &[RenderedUnit]) -> String {
    units
        .iter()
        .map(|unit| format!("=== {}\n{}", unit.path, unit.code))
        .collect::<Vec<_>>()
        .join("\n")
}

pub const USER: &str = r#"{
  "types": [
    {
      "kind": "object",
      "name": "Acme.User",
      "members": [
        { "name": "Id", "type": "Guid" },
        { "name": "Name", "type": "string", "annotations": ["not-null"] },
        { "name": "Email", "type": "string", "annotations": ["can-be-null"] },
        { "name": "Age", "type": "int?" },
        { "name": "Tags", "type": "List<string>" },
        { "name": "CreatedAt", "type": "DateTime" },
        { "name": "Secret", "type": "string", "annotations": ["ignore"] }
      ]
    }
  ],
  "roots": ["Acme.User"]
}"#;

pub const ACCOUNT: &str = r#"{
  "types": [
    { "kind": "enum", "name": "Acme.Role", "values": ["Admin", "Guest"] },
    {
      "kind": "object",
      "name": "Acme.Account",
      "members": [
        { "name": "Role", "type": "Acme.Role" },
        { "name": "Previous", "type": "Acme.Role?" }
      ]
    }
  ],
  "roots": ["Acme.Account"]
}"#;
