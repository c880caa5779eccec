use super::units::{external_specifier, relative_specifier};
use crate::{Declaration, Error, ImportSource, TypeUnits};

fn empty_object(name: &str) -> Declaration {
    Declaration::Object {
        name: name.to_string(),
        parameters: Vec::new(),
        members: Vec::new(),
    }
}

#[test]
fn specifier_same_directory() {
    assert_eq!(relative_specifier("models/user", "models/address"), "./address");
    assert_eq!(relative_specifier("index", "user"), "./user");
}

#[test]
fn specifier_descends() {
    assert_eq!(relative_specifier("index", "models/user"), "./models/user");
    assert_eq!(relative_specifier("api/client", "api/models/user"), "./models/user");
}

#[test]
fn specifier_ascends() {
    assert_eq!(relative_specifier("orders/order", "customers/customer"), "../customers/customer");
    assert_eq!(relative_specifier("a/b/c", "index"), "../../index");
    assert_eq!(relative_specifier("a/b/c", "a/d"), "../d");
}

#[test]
fn get_or_create_is_stable() {
    let mut units = TypeUnits::new();

    let first = units.get_or_create("models/user");
    let shared = units.get_or_create("");
    let again = units.get_or_create("models/user");

    assert_eq!(first, again);
    assert_ne!(first, shared);
    assert_eq!(units.len(), 2);
    assert_eq!(units.get(shared).unwrap().stem(), "index");
    assert_eq!(units.find("models/user").unwrap().location(), "models/user");
}

#[test]
fn imports_are_deduplicated() {
    let mut units = TypeUnits::new();
    let user = units.get_or_create("user");
    let address = units.get_or_create("address");

    units.add_import(user, "Address", ImportSource::Unit(address)).unwrap();
    units.add_import(user, "Address", ImportSource::Unit(address)).unwrap();
    units.add_import(user, "Big", ImportSource::External("big.js".to_string())).unwrap();
    units.add_import(user, "User", ImportSource::Unit(user)).unwrap();

    let names: Vec<&str> = units
        .get(user)
        .unwrap()
        .imports()
        .map(|i| i.name.as_str())
        .collect();
    assert_eq!(names, ["Address", "Big"]);
}

#[test]
fn specifier_for_sources() {
    let mut units = TypeUnits::new();
    let order = units.get_or_create("orders/order");
    let customer = units.get_or_create("customers/customer");
    let shared = units.get_or_create("");

    assert_eq!(
        units.specifier(order, &ImportSource::Unit(customer)),
        "../customers/customer"
    );
    assert_eq!(units.specifier(order, &ImportSource::Unit(shared)), "../index");
    assert_eq!(units.specifier(shared, &ImportSource::Unit(order)), "./orders/order");
    assert_eq!(
        units.specifier(order, &ImportSource::External("./vendor/big".to_string())),
        "../vendor/big"
    );
    assert_eq!(
        units.specifier(shared, &ImportSource::External("./vendor/big".to_string())),
        "./vendor/big"
    );
}

#[test]
fn declarations_keep_order() {
    let mut units = TypeUnits::new();
    let shared = units.get_or_create("");

    assert_eq!(units.declare(shared, empty_object("B")), Ok(0));
    assert_eq!(units.declare(shared, empty_object("A")), Ok(1));

    let names: Vec<&str> = units
        .get(shared)
        .unwrap()
        .declarations()
        .iter()
        .map(Declaration::name)
        .collect();
    assert_eq!(names, ["B", "A"]);
}

#[test]
fn external_specifier_is_root_relative() {
    assert_eq!(external_specifier("index", "./external/foo"), "./external/foo");
    assert_eq!(external_specifier("billing/invoice", "./external/foo"), "../external/foo");
    assert_eq!(external_specifier("a/b/c", "./a/x"), "../x");
    assert_eq!(external_specifier("index", "../shared/money"), "../shared/money");
    assert_eq!(external_specifier("billing/invoice", "../shared/money"), "../../shared/money");
}

#[test]
fn external_package_specifier_is_verbatim() {
    assert_eq!(external_specifier("billing/invoice", "big.js"), "big.js");
    assert_eq!(external_specifier("a/b/c", "@acme/money"), "@acme/money");
}

#[test]
fn second_declaration_of_a_name_fails() {
    let mut units = TypeUnits::new();
    let shared = units.get_or_create("");
    units.declare(shared, empty_object("User")).unwrap();

    let err = units.declare(shared, empty_object("User")).unwrap_err();

    assert_eq!(
        err,
        Error::DuplicateDeclaration {
            unit: "index".to_string(),
            name: "User".to_string(),
        }
    );
    assert_eq!(units.get(shared).unwrap().declarations().len(), 1);
}

#[test]
fn import_clashing_with_declaration_fails() {
    let mut units = TypeUnits::new();
    let shared = units.get_or_create("");
    let other = units.get_or_create("other/user");
    units.declare(shared, empty_object("User")).unwrap();

    let err = units
        .add_import(shared, "User", ImportSource::Unit(other))
        .unwrap_err();

    assert!(matches!(err, Error::DuplicateDeclaration { ref name, .. } if name == "User"));
}

#[test]
fn same_name_from_two_sources_fails() {
    let mut units = TypeUnits::new();
    let shared = units.get_or_create("");
    let a = units.get_or_create("a/user");
    let b = units.get_or_create("b/user");
    units.add_import(shared, "User", ImportSource::Unit(a)).unwrap();

    let err = units
        .add_import(shared, "User", ImportSource::Unit(b))
        .unwrap_err();
    let declared = units.declare(shared, empty_object("User")).unwrap_err();

    assert_eq!(err.to_string(), "unit `index` already declares or imports `User`");
    assert_eq!(declared, err);
}
