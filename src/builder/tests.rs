use super::*;
use crate::config::{coerce, RawConfig};
use crate::error::ErrorCode;
use crate::template::{CompiledTemplate, EngineOptions, InlineTemplate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StubConfigData {
    foo: String,
    #[serde(deserialize_with = "coerce::string_from_scalar")]
    bar: String,
}

fn stub_config() -> Config<StubConfigData> {
    Config::from_value(json!({"foo": "FOO", "bar": 5})).unwrap()
}

fn lines(rendered: &str) -> anyhow::Result<Vec<String>> {
    Ok(rendered.lines().map(str::to_string).collect())
}

fn joined(processed: Vec<String>) -> anyhow::Result<String> {
    Ok(processed.join("|"))
}

fn line_builder(source: &str) -> Builder<Vec<String>, String, StubConfigData> {
    Builder::from_fns(stub_config(), InlineTemplate::new(source), lines, joined)
}

#[test]
fn test_new_builder() {
    let mut builder = line_builder("{{ foo }}");

    let target = builder.init_builder_target();
    assert_eq!(target.stage(), Stage::Initialized);
    assert_eq!(target.builder_id(), builder.id());
    assert_eq!(builder.stage(), Stage::Initialized);
    assert!(!builder.config().is_loaded());

    let context = builder.fetch_render_context(&target).unwrap();
    assert_eq!(context["foo"], json!("FOO"));
    assert_eq!(context["bar"], json!("5"));
    assert!(builder.config().is_loaded());
}

#[test]
fn test_template_getter_accessor() {
    let builder = line_builder("{{ foo }}-{{ bar }}");
    let template = builder.template_getter().get_template().unwrap();
    assert_eq!(template.name(), "template");
}

#[test]
fn test_process_then_build() {
    let mut builder = line_builder("{{ foo }}\n{{ bar }}");

    let initialized = builder.init_builder_target();
    let processed = builder.process_template(initialized).unwrap();
    assert_eq!(builder.stage(), Stage::Processed);
    assert_eq!(
        builder.fetch_processed(&processed).unwrap(),
        &vec!["FOO".to_string(), "5".to_string()]
    );
    assert_eq!(builder.fetch_rendered(&processed).unwrap(), "FOO\n5");

    let built = builder.build(processed).unwrap();
    assert_eq!(builder.stage(), Stage::Built);
    assert_eq!(builder.fetch_built(&built).unwrap(), "FOO|5");
    assert_eq!(builder.fetch_processed(&built).unwrap().len(), 2);
}

#[test]
fn test_into_built_returns_artifact() {
    let mut builder = line_builder("{{ foo }}");

    let initialized = builder.init_builder_target();
    let processed = builder.process_template(initialized).unwrap();
    let built = builder.build(processed).unwrap();

    assert_eq!(builder.into_built(built).unwrap(), "FOO");
}

#[test]
fn test_not_same_builder_instance() {
    let mut builder = line_builder("{{ foo }}");
    let mut another = builder.clone();
    assert_ne!(builder.id(), another.id());

    let target = builder.init_builder_target();
    let another_target = another.init_builder_target();

    let err = another.fetch_render_context(&target).unwrap_err();
    assert!(matches!(err, TemplaError::NotSameBuilderInstance { .. }));

    let err = another
        .process_template(builder.init_builder_target())
        .unwrap_err();
    assert!(matches!(
        err,
        TemplaError::NotSameBuilderInstance { expected, found }
            if expected == another.id() && found == builder.id()
    ));
    assert_eq!(another.stage(), Stage::Initialized);

    let processed = builder.process_template(target).unwrap();
    let another_processed = another.process_template(another_target).unwrap();

    let err = another.fetch_processed(&processed).unwrap_err();
    assert_eq!(err.code(), ErrorCode::BUILDER_NOT_SAME_INSTANCE);
    assert!(another.fetch_rendered(&processed).is_err());

    let built = builder.build(processed).unwrap();
    let another_built = another.build(another_processed).unwrap();

    assert!(matches!(
        another.fetch_built(&built),
        Err(TemplaError::NotSameBuilderInstance { .. })
    ));
    assert_eq!(another.fetch_built(&another_built).unwrap(), "FOO");
    assert!(another.into_built(built).is_err());
}

#[test]
fn test_build_rejects_target_of_another_builder() {
    let mut builder = line_builder("{{ foo }}");
    let mut other = line_builder("{{ bar }}");

    let processed = builder
        .process_template(builder.init_builder_target())
        .unwrap();
    other
        .process_template(other.init_builder_target())
        .unwrap();

    let err = other.build(processed).unwrap_err();
    assert!(matches!(err, TemplaError::NotSameBuilderInstance { .. }));
    assert_eq!(other.stage(), Stage::Processed);
}

#[test]
fn test_process_template_twice_is_rejected() {
    let mut builder = line_builder("{{ foo }}");

    builder
        .process_template(builder.init_builder_target())
        .unwrap();
    let err = builder
        .process_template(builder.init_builder_target())
        .unwrap_err();

    assert!(matches!(
        err,
        TemplaError::StageViolation {
            current: Stage::Processed,
            operation: "process_template",
        }
    ));
}

#[test]
fn test_process_template_after_build_is_rejected() {
    let mut builder = line_builder("{{ foo }}");

    let processed = builder
        .process_template(builder.init_builder_target())
        .unwrap();
    builder.build(processed).unwrap();

    let err = builder
        .process_template(builder.init_builder_target())
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::BUILDER_STAGE_VIOLATION);
    assert_eq!(builder.stage(), Stage::Built);
}

#[test]
fn test_cloned_builder_keeps_progress_under_new_identity() {
    let mut builder = line_builder("{{ foo }}");
    let processed = builder
        .process_template(builder.init_builder_target())
        .unwrap();

    let mut copy = builder.clone();
    assert_eq!(copy.stage(), Stage::Processed);

    // The copy has no processed target of its own and cannot get one.
    let err = copy
        .process_template(copy.init_builder_target())
        .unwrap_err();
    assert!(matches!(err, TemplaError::StageViolation { .. }));
    assert!(copy.build(processed).is_err());
}

#[test]
fn test_build_receives_a_copy_of_processed() {
    let mut builder = Builder::from_fns(
        stub_config(),
        InlineTemplate::new("{{ foo }}\n{{ bar }}\n"),
        lines,
        |mut processed: Vec<String>| {
            processed[1] = "updated".to_string();
            Ok(processed.join(","))
        },
    );

    let processed = builder
        .process_template(builder.init_builder_target())
        .unwrap();
    let built = builder.build(processed).unwrap();

    assert_eq!(builder.fetch_built(&built).unwrap(), "FOO,updated");
    assert_eq!(
        builder.fetch_processed(&built).unwrap(),
        &vec!["FOO".to_string(), "5".to_string()]
    );
}

#[test]
fn test_config_errors_propagate_from_process_template() {
    let config = Config::<StubConfigData>::from_value(json!({"foo": "FOO"})).unwrap();
    let mut builder = Builder::from_fns(config, InlineTemplate::new("{{ foo }}"), lines, joined);

    let err = builder
        .process_template(builder.init_builder_target())
        .unwrap_err();
    assert!(matches!(err, TemplaError::ConfigData(_)));
    assert!(err.to_string().contains("missing field `bar`"));
    assert_eq!(builder.stage(), Stage::Initialized);
}

#[derive(Debug, PartialEq)]
struct ParseFailure(&'static str);

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot parse: {}", self.0)
    }
}

impl std::error::Error for ParseFailure {}

#[test]
fn test_parse_errors_propagate_unchanged() {
    let mut builder = Builder::from_fns(
        stub_config(),
        InlineTemplate::new("{{ foo }}"),
        |_: &str| -> anyhow::Result<Vec<String>> { Err(ParseFailure("bad input").into()) },
        joined,
    );

    let err = builder
        .process_template(builder.init_builder_target())
        .unwrap_err();

    assert!(matches!(err, TemplaError::Parse(_)));
    assert_eq!(err.to_string(), "cannot parse: bad input");
    assert_eq!(
        err.step_error()
            .and_then(|e| e.downcast_ref::<ParseFailure>()),
        Some(&ParseFailure("bad input"))
    );

    // Nothing was stored; a retry with a fresh target is allowed.
    assert_eq!(builder.stage(), Stage::Initialized);
}

#[test]
fn test_build_errors_propagate_unchanged() {
    let mut builder = Builder::from_fns(
        stub_config(),
        InlineTemplate::new("{{ foo }}"),
        lines,
        |_: Vec<String>| -> anyhow::Result<String> { anyhow::bail!("disk full") },
    );

    let processed = builder
        .process_template(builder.init_builder_target())
        .unwrap();
    let err = builder.build(processed).unwrap_err();

    assert!(matches!(err, TemplaError::Build(_)));
    assert_eq!(err.to_string(), "disk full");
    assert_eq!(builder.stage(), Stage::Processed);
}

#[test]
fn test_template_errors_propagate() {
    let mut builder = line_builder("{{ foo | no_such_filter }}");

    let err = builder
        .process_template(builder.init_builder_target())
        .unwrap_err();
    assert!(matches!(err, TemplaError::Template(_)));
    assert_eq!(builder.stage(), Stage::Initialized);
}

#[test]
fn test_undefined_variable_renders_empty() {
    let mut builder = line_builder("{{ foo }}\n[{{ zoo }}]");

    let processed = builder
        .process_template(builder.init_builder_target())
        .unwrap();
    assert_eq!(builder.fetch_rendered(&processed).unwrap(), "FOO\n[]");
}

struct ZooSteps {
    extended: Rc<Cell<usize>>,
}

impl BuildSteps<Vec<String>, String> for ZooSteps {
    fn extend_render_context(&self, context: &mut RenderContext) -> anyhow::Result<()> {
        self.extended.set(self.extended.get() + 1);
        context.insert("zoo".to_string(), Value::String("ZOO".to_string()));
        Ok(())
    }

    fn parse_rendered_template(&self, rendered: &str) -> anyhow::Result<Vec<String>> {
        lines(rendered)
    }

    fn build_processed(&self, processed: Vec<String>) -> anyhow::Result<String> {
        joined(processed)
    }
}

#[test]
fn test_extend_render_context_hook() {
    let extended = Rc::new(Cell::new(0));
    let mut builder = Builder::new(
        stub_config(),
        InlineTemplate::new("{{ foo }}\n{{ zoo }}"),
        ZooSteps {
            extended: Rc::clone(&extended),
        },
    );

    let initialized = builder.init_builder_target();
    let processed = builder.process_template(initialized).unwrap();
    assert_eq!(
        builder.fetch_processed(&processed).unwrap(),
        &vec!["FOO".to_string(), "ZOO".to_string()]
    );
    assert_eq!(extended.get(), 1);

    // The hook works on a copy; the config's context is untouched.
    let context = builder.fetch_render_context(&processed).unwrap();
    assert!(!context.contains_key("zoo"));
}

#[test]
fn test_steps_run_exactly_once_in_order() {
    let calls = Rc::new(std::cell::RefCell::new(Vec::new()));
    let parse_calls = Rc::clone(&calls);
    let build_calls = Rc::clone(&calls);

    let mut builder = Builder::from_fns(
        stub_config(),
        InlineTemplate::new("{{ foo }}"),
        move |rendered: &str| {
            parse_calls.borrow_mut().push("parse");
            lines(rendered)
        },
        move |processed: Vec<String>| {
            build_calls.borrow_mut().push("build");
            joined(processed)
        },
    );

    let processed = builder
        .process_template(builder.init_builder_target())
        .unwrap();
    let built = builder.build(processed).unwrap();
    builder.fetch_built(&built).unwrap();
    builder.fetch_processed(&built).unwrap();

    assert_eq!(*calls.borrow(), vec!["parse", "build"]);
}

#[test]
fn test_closure_template_getter() {
    let getter = || CompiledTemplate::from_source("custom", "{{ bar }}", &EngineOptions::default());
    let mut builder = Builder::from_fns(stub_config(), getter, lines, joined);

    let template = builder.template_getter().get_template().unwrap();
    assert_eq!(template.name(), "custom");

    let processed = builder
        .process_template(builder.init_builder_target())
        .unwrap();
    assert_eq!(builder.fetch_rendered(&processed).unwrap(), "5");
}

#[test]
fn test_empty_config_renders_static_template() {
    let config = Config::<crate::config::EmptyConfigData>::new(RawConfig::new());
    let mut builder = Builder::from_fns(config, InlineTemplate::new("static"), lines, joined);

    let processed = builder
        .process_template(builder.init_builder_target())
        .unwrap();
    let built = builder.build(processed).unwrap();
    assert_eq!(builder.fetch_built(&built).unwrap(), "static");
}
