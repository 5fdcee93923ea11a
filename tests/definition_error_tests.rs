mod common;

use common::{init_tracing, returns};
use typecraft::prelude::*;

#[test]
fn test_redeclaring_inherited_members() {
    init_tracing();
    let engine = Engine::new();
    let base = engine
        .template()
        .def([
            ("foo", MemberSpec::from(returns("foo"))),
            ("$shout", returns("shout").into()),
            ("$baz", Value::Null.into()),
            ("__hidden", returns("hidden").into()),
        ])
        .unwrap();

    let err = engine
        .template()
        .extend(&base)
        .unwrap()
        .member("_$shout", returns("shout"))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot change access modifier of member 'shout' from public to protected"
    );

    let err = engine
        .template()
        .extend(&base)
        .unwrap()
        .member("$baz", returns("baz"))
        .unwrap_err();
    assert!(matches!(err, DefinitionError::KindChange { .. }));

    // Non-virtual public members cannot be redeclared.
    let err = engine
        .template()
        .extend(&base)
        .unwrap()
        .member("foo", returns("again"))
        .unwrap_err();
    assert!(matches!(err, DefinitionError::DuplicateMember { .. }));

    // A private ancestor member leaves the name free.
    let derived = engine
        .template()
        .extend(&base)
        .unwrap()
        .member("hidden", Value::from("visible"))
        .unwrap();
    assert_eq!(
        derived.construct(&[]).unwrap().get("hidden").unwrap(),
        Value::from("visible")
    );
}

#[test]
fn test_duplicate_names_within_one_type() {
    let engine = Engine::new();
    let err = engine
        .template()
        .def([("foo", Value::Null), ("$foo", Value::Null)])
        .unwrap_err();
    assert!(matches!(err, DefinitionError::DuplicateMember { .. }));

    let err = engine
        .template()
        .events(["changed"])
        .unwrap()
        .member("changed", Value::Null)
        .unwrap_err();
    assert!(matches!(err, DefinitionError::DuplicateMember { .. }));
}

#[test]
fn test_property_shape_errors() {
    let engine = Engine::new();

    let err = engine
        .template()
        .member(
            "foo",
            Property::new()
                .accessor("_get", Accessor::auto())
                .accessor("__set", Accessor::auto()),
        )
        .unwrap_err();
    assert!(matches!(err, DefinitionError::BothAccessorsModified { .. }));

    let err = engine
        .template()
        .member("foo", Property::new().accessor("$get", Accessor::auto()))
        .unwrap_err();
    assert!(matches!(err, DefinitionError::VirtualAccessor { .. }));

    let err = engine
        .template()
        .member(
            "foo",
            Property::new().get(Accessor::setter(|_, _| Ok(()))),
        )
        .unwrap_err();
    assert!(matches!(err, DefinitionError::AccessorBodyMismatch { .. }));

    let base = engine
        .template()
        .member("$foo", Property::new().get(Accessor::auto()))
        .unwrap();
    let err = engine
        .template()
        .extend(&base)
        .unwrap()
        .member("$foo", Value::Null)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot change read/write definition of property 'foo'"
    );
}

#[test]
fn test_event_and_constructor_naming() {
    let engine = Engine::new();
    let err = engine.template().events(["$changed"]).unwrap_err();
    assert!(matches!(err, DefinitionError::VirtualEvent { .. }));

    let err = engine.template().events(["ctor"]).unwrap_err();
    assert!(matches!(err, DefinitionError::ReservedCtorName { .. }));

    let err = engine.template().member("ctor", Value::Int(1)).unwrap_err();
    assert!(matches!(err, DefinitionError::ReservedCtorName { .. }));

    let err = engine.template().member("__", Value::Null).unwrap_err();
    assert!(matches!(err, DefinitionError::EmptyName { .. }));
}

#[test]
fn test_hierarchy_errors() {
    let engine = Engine::new();
    let a = engine.named("A");
    let b = engine.named("B").extend(&a).unwrap();

    let err = a.clone().extend(&b).unwrap_err();
    assert_eq!(err.to_string(), "'A' cannot inherit from a derived type");
    let err = a.clone().extend(&a).unwrap_err();
    assert_eq!(err.to_string(), "'A' cannot inherit from self");

    let late = engine.template().member("x", Value::Null).unwrap();
    let err = late.extend(&a).unwrap_err();
    assert!(matches!(err, DefinitionError::BaseAfterMembers { .. }));

    let foreign = Engine::new().template();
    let err = engine.template().extend(&foreign).unwrap_err();
    assert!(matches!(err, DefinitionError::ForeignTemplate { .. }));
}

#[test]
fn test_composition_cycles_are_rejected() {
    let engine = Engine::new();

    let a = engine.named("A");
    let m = engine.named("M").extend(&a).unwrap();
    let err = a.clone().include([&m]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "'A' cannot include 'M' because it includes 'A'"
    );
    assert!(a.construct(&[]).is_ok());

    let x = engine.named("X");
    let y = engine.named("Y").include([&x]).unwrap();
    let err = x.clone().extend(&y).unwrap_err();
    assert_eq!(err.to_string(), "'X' cannot inherit from a derived type");
    assert!(y.construct(&[]).is_ok());
}

#[test]
fn test_inherited_params_need_a_parent_with_dependencies() {
    let engine = Engine::new();
    let err = engine
        .template()
        .member("ctor", Method::new(|_, _| Ok(Value::Null)).params(["..."]))
        .unwrap_err();
    assert!(matches!(err, DefinitionError::NoInheritedDependencies));
}

#[test]
fn test_parent_constructor_must_be_called() {
    let engine = Engine::new();
    let base = engine
        .named("Base")
        .member("ctor", Method::new(|_, _| Ok(Value::Null)).params(["dep"]))
        .unwrap();

    let silent = engine.named("Silent").extend(&base).unwrap();
    let err = silent.construct(&[]).unwrap_err();
    assert_eq!(
        err,
        DefinitionError::ParentCtorNotCalled {
            template: "Silent".into()
        }
        .into()
    );
    // A refused construction does not seal the type.
    assert!(!silent.is_sealed());

    let forwarding = engine
        .template()
        .extend(&base)
        .unwrap()
        .member(
            "ctor",
            Method::new(|this, args| this.call_super(args))
                .params(["..."])
                .calls_super(),
        )
        .unwrap();
    assert!(forwarding.construct(&[1.into()]).is_ok());
}

#[test]
fn test_constructor_runs_only_once() {
    let engine = Engine::new();
    let base = engine
        .template()
        .member("ctor", Method::new(|_, _| Ok(Value::Null)).params(["dep"]))
        .unwrap();
    let twice = engine
        .template()
        .extend(&base)
        .unwrap()
        .member(
            "ctor",
            Method::new(|this, args| {
                this.call_super(args)?;
                this.call_super(args)
            })
            .params(["..."])
            .calls_super(),
        )
        .unwrap();

    let err = twice.construct(&[Value::Null]).unwrap_err();
    assert!(matches!(
        err,
        Error::Access(AccessError::AlreadyConstructed { .. })
    ));
}
