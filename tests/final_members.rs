// ABOUTME: Integration tests for final-member enforcement across hierarchies.
// ABOUTME: Covers every member shape, attribution, pairing, and policy variants.

mod support;

use telos::{
    ClassBuilder, DefineError, Member, QualName, RedeclarationPolicy, TypeRegistry, Value,
};

fn final_member(registry: &TypeRegistry, member: Member) -> Member {
    registry
        .mark_final(member.into())
        .unwrap()
        .into_member()
        .unwrap()
}

#[test]
fn final_method_blocks_direct_override() {
    support::init_tracing();
    let registry = TypeRegistry::new();
    let edit = final_member(&registry, support::const_method("edit", 1));
    let base = registry
        .define(ClassBuilder::new("app", "Base").member("edit", edit))
        .unwrap();

    let err = registry
        .define(
            ClassBuilder::new("app", "Derived")
                .base(&base)
                .member("edit", support::const_method("edit", 2)),
        )
        .unwrap_err();

    match err {
        DefineError::FinalOverride {
            name,
            declared_in,
            attempted_in,
        } => {
            assert_eq!(name.as_str(), "edit");
            assert_eq!(declared_in.as_str(), "app.Base");
            assert_eq!(attempted_in.as_str(), "app.Derived");
        }
        other => panic!("expected FinalOverride, got {other:?}"),
    }
}

#[test]
fn violation_is_attributed_to_the_finalizing_ancestor() {
    // Base finalizes `edit`; Mid is silent; Leaf redeclares it. The error
    // must name Base, not Mid.
    let registry = TypeRegistry::new();
    let edit = final_member(&registry, support::const_method("edit", 1));
    let base = registry
        .define(ClassBuilder::new("app", "Base").member("edit", edit))
        .unwrap();
    let mid = registry
        .define(ClassBuilder::new("app", "Mid").base(&base))
        .unwrap();

    let err = registry
        .define(
            ClassBuilder::new("app", "Leaf")
                .base(&mid)
                .member("edit", support::const_method("edit", 2)),
        )
        .unwrap_err();

    match err {
        DefineError::FinalOverride { declared_in, .. } => {
            assert_eq!(declared_in.as_str(), "app.Base");
        }
        other => panic!("expected FinalOverride, got {other:?}"),
    }
}

#[test]
fn every_member_shape_is_blocked() {
    let registry = TypeRegistry::new();
    let base = registry
        .define(
            ClassBuilder::new("app", "Base")
                .member("method", final_member(&registry, support::const_method("method", 1)))
                .member(
                    "type_method",
                    final_member(
                        &registry,
                        Member::type_method("type_method", |_| Value::Int(1)),
                    ),
                )
                .member(
                    "static_method",
                    final_member(
                        &registry,
                        Member::static_method("static_method", |_| Value::Int(1)),
                    ),
                )
                .member(
                    "prop",
                    final_member(&registry, support::field_getter("prop", "raw")),
                ),
        )
        .unwrap();

    let attempts: Vec<(&str, Member)> = vec![
        ("method", support::const_method("method", 2)),
        ("type_method", support::const_method("type_method", 2)),
        (
            "static_method",
            Member::static_method("static_method", |_| Value::Int(2)),
        ),
        ("prop", support::field_getter("prop", "other")),
        // Shape changes do not matter: redeclaring a final method as an
        // accessor is still an override of the name.
        ("method", support::field_getter("method", "raw")),
    ];

    for (name, member) in attempts {
        let err = registry
            .define(
                ClassBuilder::new("app", "Derived")
                    .base(&base)
                    .member(name, member),
            )
            .unwrap_err();
        assert!(
            matches!(err, DefineError::FinalOverride { .. }),
            "shape {name} was not blocked: {err:?}"
        );
    }
}

#[test]
fn final_constructor_blocks_redeclaration() {
    let registry = TypeRegistry::new();
    let init = final_member(
        &registry,
        Member::method("init", |args| {
            if let Some(obj) = args[0].as_object() {
                obj.set_field("a", args[1].clone());
            }
            Value::None
        }),
    );
    let base = registry
        .define(ClassBuilder::new("app", "Base").member("init", init))
        .unwrap();

    // The base constructor still works.
    let instance = base.instantiate(&[Value::Int(5)]).unwrap();
    assert_eq!(instance.field("a"), Some(Value::Int(5)));

    // A subclass may exist but cannot redeclare init.
    let child = registry
        .define(ClassBuilder::new("app", "Child").base(&base))
        .unwrap();
    let inherited = child.instantiate(&[Value::Int(7)]).unwrap();
    assert_eq!(inherited.field("a"), Some(Value::Int(7)));

    let err = registry
        .define(
            ClassBuilder::new("app", "Bad")
                .base(&base)
                .method("init", |_| Value::None),
        )
        .unwrap_err();
    assert!(matches!(err, DefineError::FinalOverride { .. }));
}

#[test]
fn final_statics_stay_callable_on_legal_subclasses() {
    let registry = TypeRegistry::new();
    let base = registry
        .define(
            ClassBuilder::new("app", "Base")
                .member(
                    "answer",
                    final_member(&registry, Member::static_method("answer", |_| Value::Int(42))),
                )
                .member(
                    "whoami",
                    final_member(
                        &registry,
                        Member::type_method("whoami", |args| {
                            match args[0].as_class() {
                                Some(class) => Value::Str(class.name().to_string()),
                                None => Value::None,
                            }
                        }),
                    ),
                ),
        )
        .unwrap();
    let child = registry
        .define(ClassBuilder::new("app", "Child").base(&base))
        .unwrap();

    assert_eq!(child.call("answer", &[]).unwrap(), Value::Int(42));
    // Type methods receive the dynamic class, as on the base.
    assert_eq!(
        child.call("whoami", &[]).unwrap(),
        Value::Str("Child".to_string())
    );
    assert_eq!(
        base.call("whoami", &[]).unwrap(),
        Value::Str("Base".to_string())
    );
}

#[test]
fn redeclaration_marked_final_is_still_blocked() {
    let registry = TypeRegistry::new();
    let edit = final_member(&registry, support::const_method("edit", 1));
    let base = registry
        .define(ClassBuilder::new("app", "Base").member("edit", edit))
        .unwrap();

    let rival = final_member(&registry, support::const_method("edit", 2));
    let err = registry
        .define(
            ClassBuilder::new("app", "Derived")
                .base(&base)
                .member("edit", rival),
        )
        .unwrap_err();
    assert!(matches!(err, DefineError::FinalOverride { .. }));
}

#[test]
fn accessor_pair_in_one_body_is_legal() {
    // Scenario C: a final getter paired with its final setter inside the
    // same class body registers once, without conflict.
    let registry = TypeRegistry::new();
    let get = final_member(&registry, support::field_getter("value", "raw"));
    let set = final_member(&registry, support::field_setter("value", "raw"));
    let base = registry
        .define(
            ClassBuilder::new("app", "Base")
                .member("value", get)
                .member("value", set),
        )
        .unwrap();

    let instance = base.instantiate(&[]).unwrap();
    instance.set("value", Value::Int(10)).unwrap();
    assert_eq!(instance.get("value").unwrap(), Value::Int(10));

    // Any later redeclaration, in any shape, is blocked.
    for member in [
        support::field_getter("value", "raw"),
        support::field_setter("value", "raw"),
        support::const_method("value", 0),
    ] {
        let err = registry
            .define(
                ClassBuilder::new("app", "Derived")
                    .base(&base)
                    .member("value", member),
            )
            .unwrap_err();
        assert!(matches!(err, DefineError::FinalOverride { .. }));
    }
}

#[test]
fn final_setter_under_a_plain_getter_finalizes_the_name() {
    // Only the setter half carries the marker; the name still registers.
    let registry = TypeRegistry::new();
    let set = final_member(&registry, support::field_setter("value", "raw"));
    let base = registry
        .define(
            ClassBuilder::new("app", "Base")
                .member("value", support::field_getter("value", "raw"))
                .member("value", set),
        )
        .unwrap();

    let err = registry
        .define(
            ClassBuilder::new("app", "Derived")
                .base(&base)
                .member("value", support::field_getter("value", "raw")),
        )
        .unwrap_err();
    assert!(matches!(err, DefineError::FinalOverride { .. }));
}

#[test]
fn non_final_members_override_freely() {
    let registry = TypeRegistry::new();
    let base = registry
        .define(ClassBuilder::new("app", "Base").member("work", support::const_method("work", 1)))
        .unwrap();
    let mid = registry
        .define(
            ClassBuilder::new("app", "Mid")
                .base(&base)
                .member("work", support::const_method("work", 2)),
        )
        .unwrap();
    let leaf = registry
        .define(
            ClassBuilder::new("app", "Leaf")
                .base(&mid)
                .member("work", support::const_method("work", 3)),
        )
        .unwrap();

    assert_eq!(
        leaf.instantiate(&[]).unwrap().call("work", &[]).unwrap(),
        Value::Int(3)
    );
    assert_eq!(
        mid.instantiate(&[]).unwrap().call("work", &[]).unwrap(),
        Value::Int(2)
    );
}

#[test]
fn an_override_can_be_finalized_midway() {
    // Mid finalizes its own override of a previously free member; deeper
    // descendants are then blocked, attributed to Mid.
    let registry = TypeRegistry::new();
    let base = registry
        .define(ClassBuilder::new("app", "Base").member("work", support::const_method("work", 1)))
        .unwrap();
    let work = final_member(&registry, support::const_method("work", 2));
    let mid = registry
        .define(ClassBuilder::new("app", "Mid").base(&base).member("work", work))
        .unwrap();

    let err = registry
        .define(
            ClassBuilder::new("app", "Leaf")
                .base(&mid)
                .member("work", support::const_method("work", 3)),
        )
        .unwrap_err();
    match err {
        DefineError::FinalOverride { declared_in, .. } => {
            assert_eq!(declared_in.as_str(), "app.Mid");
        }
        other => panic!("expected FinalOverride, got {other:?}"),
    }
}

#[test]
fn subclass_not_touching_final_names_is_legal() {
    let registry = TypeRegistry::new();
    let edit = final_member(&registry, support::const_method("edit", 1));
    let base = registry
        .define(
            ClassBuilder::new("app", "Base")
                .member("edit", edit)
                .member("view", support::const_method("view", 1)),
        )
        .unwrap();

    let child = registry
        .define(
            ClassBuilder::new("app", "Child")
                .base(&base)
                .member("view", support::const_method("view", 2))
                .member("extra", support::const_method("extra", 9)),
        )
        .unwrap();

    let instance = child.instantiate(&[]).unwrap();
    assert_eq!(instance.call("edit", &[]).unwrap(), Value::Int(1));
    assert_eq!(instance.call("view", &[]).unwrap(), Value::Int(2));
    assert_eq!(instance.call("extra", &[]).unwrap(), Value::Int(9));
}

#[test]
fn diamond_inherits_finals_from_both_sides() {
    let registry = TypeRegistry::new();
    let left_only = final_member(&registry, support::const_method("left_op", 1));
    let right_only = final_member(&registry, support::const_method("right_op", 1));

    let root = registry.define(ClassBuilder::new("app", "Root")).unwrap();
    let left = registry
        .define(
            ClassBuilder::new("app", "Left")
                .base(&root)
                .member("left_op", left_only),
        )
        .unwrap();
    let right = registry
        .define(
            ClassBuilder::new("app", "Right")
                .base(&root)
                .member("right_op", right_only),
        )
        .unwrap();

    for name in ["left_op", "right_op"] {
        let err = registry
            .define(
                ClassBuilder::new("app", "Leaf")
                    .base(&left)
                    .base(&right)
                    .member(name, support::const_method(name, 2)),
            )
            .unwrap_err();
        assert!(matches!(err, DefineError::FinalOverride { .. }));
    }

    // Not touching either name is fine.
    assert!(
        registry
            .define(ClassBuilder::new("app", "Leaf").base(&left).base(&right))
            .is_ok()
    );
}

#[test]
fn strict_policy_refuses_same_body_redeclaration() {
    let registry = TypeRegistry::with_policy(RedeclarationPolicy::Forbid);
    let get = final_member(&registry, support::field_getter("value", "raw"));
    let set = final_member(&registry, support::field_setter("value", "raw"));

    let err = registry
        .define(
            ClassBuilder::new("app", "Base")
                .member("value", get)
                .member("value", set),
        )
        .unwrap_err();
    assert!(matches!(err, DefineError::FinalRedeclaration { .. }));
}

#[test]
fn strict_policy_still_allows_plain_accessor_pairs() {
    let registry = TypeRegistry::with_policy(RedeclarationPolicy::Forbid);
    assert!(
        registry
            .define(
                ClassBuilder::new("app", "Box")
                    .member("value", support::field_getter("value", "raw"))
                    .member("value", support::field_setter("value", "raw")),
            )
            .is_ok()
    );
}

#[test]
fn conflicting_declaring_types_are_refused() {
    let registry = TypeRegistry::new();
    let base = registry.define(ClassBuilder::new("app", "Base")).unwrap();

    let name = telos::MemberName::new("edit").unwrap();
    registry
        .mark_member_final(&base, &name, &QualName::new("app.Base").unwrap())
        .unwrap();
    // Same triple again: idempotent.
    registry
        .mark_member_final(&base, &name, &QualName::new("app.Base").unwrap())
        .unwrap();
    // Different declaring type: double-patch guard fires.
    let err = registry
        .mark_member_final(&base, &name, &QualName::new("other.Patch").unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        telos::FinalsError::ConflictingDeclaration { .. }
    ));
}
