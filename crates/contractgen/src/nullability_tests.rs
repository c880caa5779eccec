use contractgen_core::{Annotation, Annotations, Builtin, Member, TypeUniverse};

use crate::nullability::{
    AttributeContext, build_target_nullable, can_argument_be_null, can_item_be_null,
    can_value_be_null,
    generic_arguments_to_skip, is_optional, nullable_reference_can_be_null, process_nullable,
};
use crate::{GenerationOptions, NullabilityMode, TypeExpr};

fn string_member_nullable(mode: NullabilityMode, annotations: Annotations) -> bool {
    let mut universe = TypeUniverse::new();
    let string = universe.builtin(Builtin::String);
    let attrs = AttributeContext::new(&annotations);

    process_nullable(Some(attrs), universe.info(string), mode).0
}

#[test]
fn nullability_matrix() {
    let none = Annotations::new;
    let not_null = || Annotations::new().with(Annotation::NotNull);
    let can_be_null = || Annotations::new().with(Annotation::CanBeNull);

    let cases = [
        (NullabilityMode::None, [false, false, false]),
        (NullabilityMode::Pessimistic, [true, false, true]),
        (NullabilityMode::OptIn, [false, false, true]),
        (NullabilityMode::NullableReference, [false, false, false]),
    ];

    for (mode, expected) in cases {
        let actual = [
            string_member_nullable(mode, none()),
            string_member_nullable(mode, not_null()),
            string_member_nullable(mode, can_be_null()),
        ];
        assert_eq!(actual, expected, "{mode:?}");
    }
}

#[test]
fn required_counts_as_not_null() {
    let annotations = Annotations::new().with(Annotation::Required);

    assert!(!string_member_nullable(NullabilityMode::Pessimistic, annotations));
}

#[test]
fn nullable_reference_flags() {
    let flagged = Annotations::new().with_nullable_flags([2]);
    let not_null = Annotations::new().with_nullable_flags([1]);

    assert!(string_member_nullable(NullabilityMode::NullableReference, flagged));
    assert!(!string_member_nullable(NullabilityMode::NullableReference, not_null));
}

#[test]
fn nullable_reference_context_fallback() {
    let mut universe = TypeUniverse::new();
    let string = universe.builtin(Builtin::String);
    let owner = universe.object("Acme.Owner");
    universe.set_nullable_context(owner, 2);
    universe.add_member(owner, Member::new("Inherited", string));
    let overriding = Member::new("Overriding", string)
        .with_annotations(Annotations::new().with_nullable_context(1));
    universe.add_member(owner, overriding);

    let owner = universe.info(owner);
    let members: Vec<&Member> = owner.members().collect();
    let string = universe.info(string);

    let inherited = AttributeContext::member(owner, members[0]);
    let overriding = AttributeContext::member(owner, members[1]);
    assert!(nullable_reference_can_be_null(inherited, string, 0));
    assert!(!nullable_reference_can_be_null(overriding, string, 0));
}

#[test]
fn nullable_reference_never_marks_value_types() {
    let mut universe = TypeUniverse::new();
    let int = universe.builtin(Builtin::Int32);
    let annotations = Annotations::new().with_nullable_flags([2]);

    assert!(!nullable_reference_can_be_null(
        AttributeContext::new(&annotations),
        universe.info(int),
        0
    ));
}

#[test]
fn nullable_wrapper_unwraps() {
    let mut universe = TypeUniverse::new();
    let int = universe.builtin(Builtin::Int32);
    let nullable = universe.nullable_of(int);
    let info = universe.info(nullable);

    let (is_nullable, underlying) = process_nullable(None, info, NullabilityMode::OptIn);
    assert!(is_nullable);
    assert_eq!(underlying.id(), int);

    let (is_nullable, underlying) = process_nullable(None, info, NullabilityMode::None);
    assert!(!is_nullable);
    assert_eq!(underlying.id(), int);
}

#[test]
fn value_types_are_never_nullable_by_annotation() {
    let mut universe = TypeUniverse::new();
    let guid = universe.builtin(Builtin::Guid);
    let annotations = Annotations::new().with(Annotation::CanBeNull);

    let (is_nullable, _) = process_nullable(
        Some(AttributeContext::new(&annotations)),
        universe.info(guid),
        NullabilityMode::OptIn,
    );

    assert!(!is_nullable);
}

#[test]
fn items_follow_item_annotations() {
    let mut universe = TypeUniverse::new();
    let string = universe.builtin(Builtin::String);
    let int = universe.builtin(Builtin::Int32);
    let string = universe.info(string);
    let int = universe.info(int);
    let plain = Annotations::new();
    let item_not_null = Annotations::new().with(Annotation::ItemNotNull);
    let item_can_be_null = Annotations::new().with(Annotation::ItemCanBeNull);
    let ctx = AttributeContext::new;

    assert!(can_item_be_null(string, NullabilityMode::Pessimistic, Some(ctx(&plain))));
    assert!(!can_item_be_null(string, NullabilityMode::Pessimistic, Some(ctx(&item_not_null))));
    assert!(!can_item_be_null(string, NullabilityMode::OptIn, Some(ctx(&plain))));
    assert!(can_item_be_null(string, NullabilityMode::OptIn, Some(ctx(&item_can_be_null))));
    assert!(!can_item_be_null(int, NullabilityMode::Pessimistic, Some(ctx(&plain))));
    assert!(!can_item_be_null(string, NullabilityMode::Pessimistic, None));
}

#[test]
fn dictionary_value_flag_follows_key() {
    let mut universe = TypeUniverse::new();
    let string = universe.builtin(Builtin::String);
    let int = universe.builtin(Builtin::Int32);
    let string = universe.info(string);
    let int = universe.info(int);
    // member, key, value
    let with_reference_key = Annotations::new().with_nullable_flags([1, 1, 2]);
    // member, value (value-type keys take no position)
    let with_value_key = Annotations::new().with_nullable_flags([1, 2]);
    let mode = NullabilityMode::NullableReference;

    assert!(can_value_be_null(string, string, mode, Some(AttributeContext::new(&with_reference_key))));
    assert!(can_value_be_null(int, string, mode, Some(AttributeContext::new(&with_value_key))));
    assert!(!can_value_be_null(string, string, mode, Some(AttributeContext::new(&with_value_key))));
}

#[test]
fn generic_argument_flags_follow_preceding_arguments() {
    let mut universe = TypeUniverse::new();
    let string = universe.builtin(Builtin::String);
    let int = universe.builtin(Builtin::Int32);
    let strings = universe.list_of(string);
    let string = universe.info(string);
    let int = universe.info(int);
    let strings = universe.info(strings);
    // member, List, List item, value
    let after_list = Annotations::new().with_nullable_flags([1, 1, 1, 2]);
    let after_int = Annotations::new().with_nullable_flags([1, 2]);
    let mode = NullabilityMode::NullableReference;
    let ctx = AttributeContext::new;

    assert!(can_argument_be_null(&[strings, string], 1, mode, Some(ctx(&after_list))));
    assert!(!can_argument_be_null(&[strings, string], 0, mode, Some(ctx(&after_list))));
    assert!(can_argument_be_null(&[int, string], 1, mode, Some(ctx(&after_int))));
    assert!(!can_argument_be_null(&[int, string], 0, mode, Some(ctx(&after_int))));
    assert!(!can_argument_be_null(&[int, string], 2, mode, Some(ctx(&after_int))));
    assert!(!can_argument_be_null(&[int, string], 1, mode, None));
    assert!(!can_argument_be_null(
        &[int, string],
        1,
        NullabilityMode::Pessimistic,
        Some(ctx(&after_int))
    ));
}

#[test]
fn generic_arguments_to_skip_counts_positions() {
    let mut universe = TypeUniverse::new();
    let string = universe.builtin(Builtin::String);
    let int = universe.builtin(Builtin::Int32);
    let nullable_int = universe.nullable_of(int);
    let strings = universe.array_of(string);
    let ints = universe.array_of(int);
    let list = universe.list_of(string);
    let nested = universe.dictionary_of(string, list);

    let skip = |id| generic_arguments_to_skip(universe.info(id));
    assert_eq!(skip(string), 1);
    assert_eq!(skip(int), 0);
    assert_eq!(skip(nullable_int), 0);
    assert_eq!(skip(strings), 2);
    assert_eq!(skip(ints), 1);
    assert_eq!(skip(list), 2);
    assert_eq!(skip(nested), 4);
}

#[test]
fn target_nullable_wrapping() {
    let string = || TypeExpr::reference("string");
    let local = GenerationOptions::new();
    let global = GenerationOptions::new().use_global_nullable(true);
    let off = GenerationOptions::new().nullability_mode(NullabilityMode::None);

    assert_eq!(
        build_target_nullable(string(), true, &local),
        TypeExpr::OrNull(Box::new(string()))
    );
    assert_eq!(
        build_target_nullable(string(), true, &global),
        TypeExpr::Nullable(Box::new(string()))
    );
    assert_eq!(build_target_nullable(string(), false, &local), string());
    assert_eq!(build_target_nullable(string(), true, &off), string());

    let wrapped = TypeExpr::OrNull(Box::new(string()));
    assert_eq!(build_target_nullable(wrapped.clone(), true, &global), wrapped);
}

#[test]
fn optional_requires_toggle() {
    let enabled = GenerationOptions::new();
    let disabled = GenerationOptions::new().enable_optional_properties(false);

    assert!(is_optional(true, &enabled));
    assert!(!is_optional(false, &enabled));
    assert!(!is_optional(true, &disabled));
}
