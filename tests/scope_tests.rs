mod common;

use common::{init_tracing, returns};
use typecraft::prelude::*;

#[test]
fn test_pry_reaches_private_state_of_same_type() {
    init_tracing();
    let engine = Engine::new();
    let account = engine
        .template()
        .def([
            (
                "ctor",
                MemberSpec::from(
                    Method::new(|this, _| {
                        this.set("balance", this.arg(0)?.clone())?;
                        Ok(Value::Null)
                    })
                    .params(["balance"]),
                ),
            ),
            ("__balance", Value::Int(0).into()),
            (
                "richer_than",
                Method::new(|this, args| {
                    let other = this.pry(&args[0]);
                    let theirs = other.as_scope()?.get("balance")?.as_int()?;
                    let mine = this.get("balance")?.as_int()?;
                    Ok(Value::Bool(mine > theirs))
                })
                .into(),
            ),
        ])
        .unwrap();

    let rich = account.construct(&[100.into()]).unwrap();
    let poor = account.construct(&[5.into()]).unwrap();
    assert_eq!(
        rich.call("richer_than", &[poor.clone().into()]).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        poor.call("richer_than", &[rich.into()]).unwrap(),
        Value::Bool(false)
    );
}

#[test]
fn test_pry_returns_input_for_other_types() {
    let engine = Engine::new();
    let probe = engine
        .template()
        .member(
            "probe",
            Method::new(|this, args| Ok(this.pry(&args[0]))),
        )
        .unwrap();
    let stranger = engine.template().construct(&[]).unwrap();
    let instance = probe.construct(&[]).unwrap();

    let result = instance
        .call("probe", &[stranger.clone().into()])
        .unwrap();
    assert!(result.as_object().unwrap().ptr_eq(&stranger));

    let result = instance.call("probe", &["text".into()]).unwrap();
    assert_eq!(result, Value::from("text"));

    let result = instance.call("probe", &[instance.clone().into()]).unwrap();
    assert!(result.as_scope().is_ok());
}

#[test]
fn test_pry_as_opens_ancestor_levels_only() {
    let engine = Engine::new();
    let base = engine
        .template()
        .member("__secret", Value::from("base"))
        .unwrap();
    let unrelated = engine.template();
    let derived = engine
        .template()
        .extend(&base)
        .unwrap()
        .def([
            (
                "peek",
                Method::new({
                    let base = base.clone();
                    move |this, args| {
                        let opened = this.pry_as(&args[0], &base);
                        opened.as_scope()?.get("secret")
                    }
                }),
            ),
            (
                "peek_unrelated",
                Method::new({
                    let unrelated = unrelated.clone();
                    move |this, args| Ok(this.pry_as(&args[0], &unrelated))
                }),
            ),
        ])
        .unwrap();

    let instance = derived.construct(&[]).unwrap();
    let other = derived.construct(&[]).unwrap();
    assert_eq!(
        instance.call("peek", &[other.clone().into()]).unwrap(),
        Value::from("base")
    );
    let refused = instance.call("peek_unrelated", &[other.clone().into()]).unwrap();
    assert!(refused.as_object().unwrap().ptr_eq(&other));
}

#[test]
fn test_spawn_returns_private_scope_of_new_instance() {
    let engine = Engine::new();
    let node = engine
        .template()
        .def([
            ("__tag", MemberSpec::from(Value::from("root"))),
            (
                "child",
                Method::new(|this, _| {
                    let child = this.spawn(&[])?;
                    child.set("tag", "child")?;
                    Ok(Value::Object(child.public()))
                })
                .into(),
            ),
            ("tag_of", Method::new(|this, _| this.get("tag")).into()),
        ])
        .unwrap();

    let root = node.construct(&[]).unwrap();
    let child = root.call("child", &[]).unwrap();
    let child = child.as_object().unwrap();
    assert!(!child.ptr_eq(&root));
    assert!(child.is_instance_of(&node));
    assert_eq!(root.call("tag_of", &[]).unwrap(), Value::from("root"));
    assert_eq!(child.call("tag_of", &[]).unwrap(), Value::from("child"));
}

#[test]
fn test_fields_are_private_to_their_level() {
    let engine = Engine::new();
    let base = engine
        .template()
        .def([
            (
                "remember_base",
                Method::new(|this, args| {
                    this.set("note", args[0].clone())?;
                    Ok(Value::Null)
                }),
            ),
            ("recall_base", Method::new(|this, _| this.get("note"))),
        ])
        .unwrap();
    let derived = engine
        .template()
        .extend(&base)
        .unwrap()
        .member("recall_derived", Method::new(|this, _| this.get("note")))
        .unwrap();

    let instance = derived.construct(&[]).unwrap();
    assert_eq!(instance.call("recall_base", &[]).unwrap(), Value::Null);
    instance.call("remember_base", &["kept".into()]).unwrap();
    assert_eq!(instance.call("recall_base", &[]).unwrap(), Value::from("kept"));
    assert_eq!(instance.call("recall_derived", &[]).unwrap(), Value::Null);
}

#[test]
fn test_scope_sees_protected_members_public_does_not() {
    let engine = Engine::new();
    let base = engine
        .template()
        .def([
            ("_hidden", returns("protected")),
            ("__mine", returns("private")),
        ])
        .unwrap();
    let derived = engine
        .template()
        .extend(&base)
        .unwrap()
        .def([
            ("reach", Method::new(|this, _| this.call("hidden", &[]))),
            ("reach_private", Method::new(|this, _| this.call("mine", &[]))),
        ])
        .unwrap();

    let instance = derived.construct(&[]).unwrap();
    assert_eq!(instance.call("reach", &[]).unwrap(), Value::from("protected"));
    let err = instance.call("reach_private", &[]).unwrap_err();
    assert_eq!(
        err,
        AccessError::UnknownMember {
            name: "mine".into()
        }
        .into()
    );
    assert!(!instance.has_member("hidden"));
    assert!(instance.call("hidden", &[]).is_err());
}

#[test]
fn test_arguments_are_bounds_checked() {
    let engine = Engine::new();
    let t = engine
        .template()
        .member("first", Method::new(|this, _| this.arg(0).cloned().map_err(Into::into)))
        .unwrap();
    let instance = t.construct(&[]).unwrap();
    assert_eq!(instance.call("first", &[7.into()]).unwrap(), Value::Int(7));
    let err = instance.call("first", &[]).unwrap_err();
    assert_eq!(
        err,
        AccessError::ArgumentOutOfBounds { index: 0, count: 0 }.into()
    );
}
