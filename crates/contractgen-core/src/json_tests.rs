use indoc::indoc;

use super::universe::{Annotation, Builtin, Container, TypeKind, TypeUniverse};
use super::LoadError;

#[test]
fn load_object_with_members() {
    let json = indoc! {r#"
        {
          "types": [
            {
              "kind": "object",
              "name": "Acme.User",
              "members": [
                { "name": "Id", "type": "int" },
                { "name": "Email", "type": "string", "annotations": ["not-null"] },
                { "name": "Role", "type": "Acme.Role" }
              ]
            },
            { "kind": "enum", "name": "Acme.Role", "values": ["Admin", "Guest"] }
          ],
          "roots": ["Acme.User"]
        }
    "#};

    let (universe, roots) = TypeUniverse::from_json(json).unwrap();

    assert_eq!(roots.len(), 1);
    let user = universe.info(roots[0]);
    assert_eq!(user.key(), "Acme.User");

    let members: Vec<_> = user.members().collect();
    assert_eq!(members.len(), 3);
    assert_eq!(user.member_type(members[0]).builtin(), Some(Builtin::Int32));
    assert!(members[1].annotations.has(Annotation::NotNull));
    assert!(user.member_type(members[2]).is_enum());
}

#[test]
fn load_generic_object_resolves_parameters() {
    let json = indoc! {r#"
        {
          "types": [
            {
              "kind": "object",
              "name": "Acme.Page",
              "parameters": ["T"],
              "members": [{ "name": "Items", "type": "List<T>" }]
            },
            { "kind": "object", "name": "Acme.User" }
          ],
          "roots": ["Acme.Page<Acme.User>"]
        }
    "#};

    let (universe, roots) = TypeUniverse::from_json(json).unwrap();

    let closed = universe.info(roots[0]);
    assert_eq!(closed.key(), "Acme.Page`1<Acme.User>");

    let page = closed.generic_type_definition().unwrap();
    let items = page.members().next().unwrap();
    let items_type = page.member_type(items);
    assert!(items_type.is_instance_of(Container::List));
    assert!(items_type.element_type().unwrap().is_generic_parameter());
}

#[test]
fn load_struct_with_nullable_context() {
    let json = indoc! {r#"
        {
          "types": [
            {
              "kind": "struct",
              "name": "Acme.Point",
              "nullable_context": 1,
              "members": [
                { "name": "Label", "type": "string", "nullable_flags": [2] },
                { "name": "Tags", "type": "string[]", "nullable_context": 2 }
              ]
            }
          ]
        }
    "#};

    let (universe, roots) = TypeUniverse::from_json(json).unwrap();
    assert!(roots.is_empty());

    let point = universe.info(universe.lookup("Acme.Point").unwrap());
    assert!(point.is_value_type());
    assert_eq!(point.nullable_context(), Some(1));

    let members: Vec<_> = point.members().collect();
    assert_eq!(members[0].annotations.nullable_flags(), Some(&[2u8][..]));
    assert_eq!(members[1].annotations.nullable_context(), Some(2));
}

#[test]
fn load_nullable_and_array_suffixes() {
    let json = indoc! {r#"
        { "roots": ["int?[]", "Dictionary<string, Guid?>"] }
    "#};

    let (universe, roots) = TypeUniverse::from_json(json).unwrap();

    let array = universe.info(roots[0]);
    let element = array.element_type().unwrap();
    assert!(element.is_instance_of(Container::Nullable));

    let dictionary = universe.info(roots[1]);
    assert!(dictionary.is_instance_of(Container::Dictionary));
    assert!(matches!(dictionary.kind(), TypeKind::Instance { arguments, .. } if arguments.len() == 2));
}

#[test]
fn unknown_type_is_rejected() {
    let json = r#"{ "roots": ["Acme.Missing"] }"#;

    let err = TypeUniverse::from_json(json).unwrap_err();

    assert!(matches!(err, LoadError::UnknownType(ref name) if name == "Acme.Missing"));
    assert_eq!(err.to_string(), "unknown type `Acme.Missing`");
}

#[test]
fn duplicate_type_is_rejected() {
    let json = indoc! {r#"
        {
          "types": [
            { "kind": "object", "name": "Acme.User" },
            { "kind": "struct", "name": "Acme.User" }
          ]
        }
    "#};

    let err = TypeUniverse::from_json(json).unwrap_err();

    assert!(matches!(err, LoadError::DuplicateType(ref name) if name == "Acme.User"));
}

#[test]
fn malformed_reference_is_rejected() {
    let json = r#"{ "roots": ["List<int"] }"#;

    let err = TypeUniverse::from_json(json).unwrap_err();

    assert!(matches!(err, LoadError::TypeRef { ref reference, .. } if reference == "List<int"));
}

#[test]
fn wrong_arity_is_a_shape_error() {
    let json = r#"{ "roots": ["List<int, string>"] }"#;

    let err = TypeUniverse::from_json(json).unwrap_err();

    assert!(matches!(err, LoadError::Shape(_)));
}

#[test]
fn invalid_json_is_rejected() {
    let err = TypeUniverse::from_json("{ not json").unwrap_err();

    assert!(matches!(err, LoadError::Json(_)));
}

#[test]
fn resolve_type_ref_reuses_interned_types() {
    let mut universe = TypeUniverse::new();
    let first = universe.resolve_type_ref("List<string>").unwrap();
    let len = universe.len();

    assert_eq!(universe.resolve_type_ref("List< string >").unwrap(), first);
    assert_eq!(universe.len(), len);
}
