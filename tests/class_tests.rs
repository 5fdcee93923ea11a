mod common;

use common::{Log, init_tracing, returns};
use typecraft::prelude::*;

fn concat(this: &This, args: &[Value], suffix: &str) -> Result<Value> {
    let base = this.call_super(args)?;
    Ok(format!("{}{}", base.as_str()?, suffix).into())
}

#[test]
fn test_instances_are_distinct() {
    init_tracing();
    let engine = Engine::new();
    let counter = engine
        .template()
        .def([
            ("__count", MemberSpec::from(Value::Int(0))),
            (
                "bump",
                Method::new(|this, _| {
                    let next = this.get("count")?.as_int()? + 1;
                    this.set("count", next)?;
                    Ok(Value::Int(next))
                })
                .into(),
            ),
        ])
        .unwrap();

    let a = counter.construct(&[]).unwrap();
    let b = counter.construct(&[]).unwrap();
    assert!(!a.ptr_eq(&b));
    assert_ne!(Value::Object(a.clone()), Value::Object(b.clone()));

    a.call("bump", &[]).unwrap();
    a.call("bump", &[]).unwrap();
    assert_eq!(a.call("bump", &[]).unwrap(), Value::Int(3));
    assert_eq!(b.call("bump", &[]).unwrap(), Value::Int(1));
}

#[test]
fn test_private_base_method_reaches_derived_override() {
    init_tracing();
    let engine = Engine::new();
    let base = engine
        .template()
        .def([
            ("$name", returns("base")),
            ("__render", Method::new(|this, _| this.call("name", &[]))),
            ("show", Method::new(|this, _| this.call("render", &[]))),
        ])
        .unwrap();
    let derived = engine
        .template()
        .extend(&base)
        .unwrap()
        .member("$name", returns("derived"))
        .unwrap();

    let instance = derived.construct(&[]).unwrap();
    assert_eq!(instance.call("show", &[]).unwrap(), Value::from("derived"));
    assert_eq!(instance.call("name", &[]).unwrap(), Value::from("derived"));

    let plain = base.construct(&[]).unwrap();
    assert_eq!(plain.call("show", &[]).unwrap(), Value::from("base"));
}

#[test]
fn test_override_reaches_every_older_generation() {
    let engine = Engine::new();
    let a = engine
        .template()
        .def([
            ("$name", returns("a")),
            ("fromA", Method::new(|this, _| this.call("name", &[]))),
        ])
        .unwrap();
    let b = engine
        .template()
        .extend(&a)
        .unwrap()
        .member("fromB", Method::new(|this, _| this.call("name", &[])))
        .unwrap();
    let c = engine
        .template()
        .extend(&b)
        .unwrap()
        .member("$name", returns("c"))
        .unwrap();

    let instance = c.construct(&[]).unwrap();
    assert_eq!(instance.call("fromA", &[]).unwrap(), Value::from("c"));
    assert_eq!(instance.call("fromB", &[]).unwrap(), Value::from("c"));
}

#[test]
fn test_super_chain_concatenates_base_to_derived() {
    init_tracing();
    let engine = Engine::new();
    let a = engine.template().member("$foo", returns("a")).unwrap();
    let b = engine
        .template()
        .extend(&a)
        .unwrap()
        .member(
            "$foo",
            Method::new(|this, args| concat(this, args, "b")).calls_super(),
        )
        .unwrap();
    let c = engine
        .template()
        .extend(&b)
        .unwrap()
        .member(
            "$foo",
            Method::new(|this, args| concat(this, args, "c")).calls_super(),
        )
        .unwrap();

    let instance = c.construct(&[]).unwrap();
    assert_eq!(instance.call("foo", &[]).unwrap(), Value::from("abc"));
}

#[test]
fn test_super_skips_a_private_shadow_in_between() {
    let engine = Engine::new();
    let a = engine.template().member("$foo", returns("a")).unwrap();
    let b = engine
        .template()
        .extend(&a)
        .unwrap()
        .def([
            ("__foo", returns("b")),
            ("own_foo", Method::new(|this, _| this.call("foo", &[]))),
        ])
        .unwrap();
    let c = engine
        .template()
        .extend(&b)
        .unwrap()
        .member(
            "$foo",
            Method::new(|this, args| concat(this, args, "c")).calls_super(),
        )
        .unwrap();

    let instance = c.construct(&[]).unwrap();
    assert_eq!(instance.call("foo", &[]).unwrap(), Value::from("ac"));
    // The shadowing level still sees its own private member.
    assert_eq!(instance.call("own_foo", &[]).unwrap(), Value::from("b"));
}

#[test]
fn test_super_passes_arguments() {
    let engine = Engine::new();
    let a = engine
        .template()
        .member(
            "$greet",
            Method::new(|_, args| Ok(format!("{} world", args[0].as_str()?).into())),
        )
        .unwrap();
    let b = engine
        .template()
        .extend(&a)
        .unwrap()
        .member(
            "$greet",
            Method::new(|this, args| {
                let base = this.call_super(args)?;
                Ok(format!("{}!", base.as_str()?).into())
            })
            .calls_super(),
        )
        .unwrap();

    let instance = b.construct(&[]).unwrap();
    assert_eq!(
        instance.call("greet", &["hello".into()]).unwrap(),
        Value::from("hello world!")
    );
}

#[test]
fn test_constructors_run_base_first() {
    let log = Log::default();
    let engine = Engine::new();
    let a = engine
        .template()
        .member(
            "ctor",
            Method::new({
                let log = log.clone();
                move |_, _| {
                    log.push("a");
                    Ok(Value::Null)
                }
            }),
        )
        .unwrap();
    let b = engine
        .template()
        .extend(&a)
        .unwrap()
        .member(
            "ctor",
            Method::new({
                let log = log.clone();
                move |_, _| {
                    log.push("b");
                    Ok(Value::Null)
                }
            }),
        )
        .unwrap();

    b.construct(&[]).unwrap();
    assert_eq!(log.entries(), vec!["a", "b"]);
}

#[test]
fn test_parent_constructor_with_params_is_called_explicitly() {
    let engine = Engine::new();
    let a = engine
        .template()
        .def([
            (
                "ctor",
                Method::new(|this, args| {
                    this.set("text", args[0].clone())?;
                    Ok(Value::Null)
                })
                .params(["label"]),
            ),
            ("label", Method::new(|this, _| this.get("text"))),
        ])
        .unwrap();
    let b = engine
        .template()
        .extend(&a)
        .unwrap()
        .member(
            "ctor",
            Method::new(|this, args| {
                let label = format!("{}!", args[0].as_str()?);
                this.call_super(&[label.into()])
            })
            .params(["...", "extra"])
            .calls_super(),
        )
        .unwrap();

    assert_eq!(b.dependencies(), vec!["label", "extra"]);
    let instance = b.construct(&["hi".into()]).unwrap();
    assert_eq!(instance.call("label", &[]).unwrap(), Value::from("hi!"));
}

#[test]
fn test_public_returns_the_most_derived_interface() {
    let engine = Engine::new();
    let a = engine
        .template()
        .member(
            "me",
            Method::new(|this, _| Ok(Value::Object(this.public()))),
        )
        .unwrap();
    let b = engine.template().extend(&a).unwrap();

    let instance = b.construct(&[]).unwrap();
    let me = instance.call("me", &[]).unwrap();
    assert!(me.as_object().unwrap().ptr_eq(&instance));
}

#[test]
fn test_instance_of_and_template() {
    let engine = Engine::new();
    let animal = engine.named("Animal");
    let dog = engine.named("Dog").extend_named("Animal").unwrap();
    let instance = dog.construct(&[]).unwrap();

    assert!(instance.is_instance_of(&animal));
    assert!(instance.is_instance_of(&dog));
    assert!(instance.template().ptr_eq(&dog));
    assert_eq!(instance.template().name(), Some("Dog"));
}

#[test]
fn test_templates_are_sealed_after_first_instance() {
    let engine = Engine::new();
    let base = engine.template().member("a", returns("a")).unwrap();
    let derived = engine.template().extend(&base).unwrap();
    derived.construct(&[]).unwrap();

    let err = base.clone().member("b", returns("b")).unwrap_err();
    assert!(matches!(err, DefinitionError::Sealed { .. }));
    // Instances keep working after sealing.
    assert_eq!(
        base.construct(&[]).unwrap().call("a", &[]).unwrap(),
        Value::from("a")
    );
}

#[test]
fn test_types_are_callable_values() {
    let engine = Engine::new();
    let t = engine
        .template()
        .member(
            "ctor",
            Method::new(|this, args| {
                this.set("v", args[0].clone())?;
                Ok(Value::Null)
            })
            .params(["v"]),
        )
        .unwrap()
        .member("value", Method::new(|this, _| this.get("v")))
        .unwrap();

    let factory = Value::Type(t.clone());
    assert!(factory.is_callable());
    assert_eq!(factory.dependencies(), vec!["v"]);
    let built = factory.call(&[5.into()]).unwrap();
    assert_eq!(
        built.as_object().unwrap().call("value", &[]).unwrap(),
        Value::Int(5)
    );
}
