//! Bring-up and teardown of single endpoints.

use std::sync::Arc;

use serde_json::json;

use endpoint_host::config::schema::PortDeployment;
use endpoint_host::config::SettingsSnapshot;
use endpoint_host::descriptor::{ConfigKey, LayerPriority};
use endpoint_host::injection::{InjectionError, InjectionPoint, InstanceState, ServiceClass};
use endpoint_host::lifecycle::endpoint::InvocationError;
use endpoint_host::lifecycle::{EndpointError, EndpointLifecycle, EndpointState, TeardownStep};
use endpoint_host::naming::InMemoryContext;

mod common;

use common::{CallLog, Faults, RecordingHandlers, RecordingTransport};

fn lifecycle(
    class: ServiceClass,
    deployment: PortDeployment,
    naming: InMemoryContext,
    handlers: RecordingHandlers,
    transport: RecordingTransport,
) -> EndpointLifecycle {
    EndpointLifecycle::new(
        Arc::new(class),
        deployment,
        common::environment(naming),
        Box::new(handlers),
        Box::new(transport),
    )
}

fn simple(class: ServiceClass, deployment: PortDeployment, naming: InMemoryContext, log: &CallLog) -> EndpointLifecycle {
    lifecycle(
        class,
        deployment,
        naming,
        RecordingHandlers::new(log),
        RecordingTransport::new(log),
    )
}

#[test]
fn test_override_binding_without_naming_entry() {
    let log = CallLog::new();
    let class = common::recording_class("com.example.Foo", &["res"], &log, Faults::default());
    let mut deployment = PortDeployment::new("foo", "com.example.Foo");
    deployment.bindings.insert("res".into(), json!(42));

    let mut endpoint = simple(class, deployment, InMemoryContext::new(), &log);
    endpoint.start(&SettingsSnapshot::default()).unwrap();

    assert_eq!(endpoint.state(), EndpointState::Active);
    let instance = endpoint.instance().unwrap();
    assert_eq!(instance.state(), InstanceState::Active);
    assert_eq!(instance.plan().get("res"), Some(&json!(42)));
    assert_eq!(log.count("post_construct"), 1);
    assert_eq!(endpoint.invoke("values", json!(null)).unwrap(), json!({"res": 42}));
}

#[test]
fn test_unresolvable_point_fails_before_post_construct() {
    let log = CallLog::new();
    let class = common::recording_class("com.example.Foo", &["res", "missing"], &log, Faults::default());
    let mut deployment = PortDeployment::new("foo", "com.example.Foo");
    deployment.bindings.insert("res".into(), json!(42));

    let mut endpoint = simple(class, deployment, InMemoryContext::new(), &log);
    let err = endpoint.start(&SettingsSnapshot::default()).unwrap_err();

    match err {
        EndpointError::EndpointInitialization { port_id, source } => {
            assert_eq!(port_id, "foo");
            assert!(matches!(source, InjectionError::Unresolved { ref point, .. } if point == "missing"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(endpoint.state(), EndpointState::Failed);
    assert!(endpoint.instance().is_none());
    assert_eq!(log.count("post_construct"), 0);
    assert_eq!(log.count("pre_destroy"), 0);
    assert_eq!(log.count("handlers_initialize"), 0);
}

#[test]
fn test_naming_lookup_supplies_unbound_points() {
    let log = CallLog::new();
    let class = common::recording_class("com.example.Foo", &["greeting"], &log, Faults::default())
        .with_injection(InjectionPoint::new("limit").with_lookup("app/limits/max"));
    let mut naming = InMemoryContext::new();
    naming.bind("env/greeting", "hello").unwrap();
    naming.bind("app/limits/max", 7).unwrap();

    let mut endpoint = simple(class, PortDeployment::new("foo", "com.example.Foo"), naming, &log);
    endpoint.start(&SettingsSnapshot::default()).unwrap();

    assert_eq!(
        endpoint.invoke("values", json!(null)).unwrap(),
        json!({"greeting": "hello", "limit": 7})
    );
}

#[test]
fn test_caller_configuration_shadows_class_metadata() {
    let log = CallLog::new();
    let class = common::recording_class("com.example.Foo", &[], &log, Faults::default())
        .with_annotation(ConfigKey::ServiceName, "ReflectedService")
        .with_annotation(ConfigKey::PortName, "ReflectedPort");
    let mut deployment = PortDeployment::new("foo", "com.example.Foo");
    deployment.service_name = Some("OverrideService".into());

    let mut endpoint = simple(class, deployment, InMemoryContext::new(), &log);
    endpoint.start(&SettingsSnapshot::default()).unwrap();

    let description = endpoint.description().unwrap();
    assert_eq!(description.service_name, "OverrideService");
    assert_eq!(description.port_name, "ReflectedPort");
    assert_eq!(description.target_namespace, "http://example.com/");

    let layers = description.configurations.layers();
    assert_eq!(layers[0].priority, LayerPriority::Override);
    assert_eq!(layers[0].source, "port:foo");
    assert_eq!(description.configurations.source_of(ConfigKey::ServiceName), Some("port:foo"));
}

#[test]
fn test_malformed_binding_fails_before_instantiation() {
    let log = CallLog::new();
    let class = common::recording_class("com.example.Foo", &[], &log, Faults::default());
    let mut deployment = PortDeployment::new("foo", "com.example.Foo");
    deployment.binding_id = Some("not a binding".into());

    let mut endpoint = simple(class, deployment, InMemoryContext::new(), &log);
    let err = endpoint.start(&SettingsSnapshot::default()).unwrap_err();

    assert!(matches!(err, EndpointError::DescriptorBuild { .. }));
    assert!(log.calls().is_empty());
}

#[test]
fn test_explicit_mode_reads_class_properties() {
    let log = CallLog::new();
    let class = common::recording_class("com.example.Foo", &[], &log, Faults::default());
    let settings = SettingsSnapshot::from_pairs([
        ("endpoint.read-class-properties", "true"),
        ("endpoint.config.com.example.Foo.x", "1"),
        ("endpoint.config.other.y", "2"),
        ("com.example.Foo.endpoint.features", "logging"),
    ]);

    let mut endpoint = simple(class, PortDeployment::new("foo", "com.example.Foo"), InMemoryContext::new(), &log);
    endpoint.start(&settings).unwrap();

    let properties = endpoint.endpoint_properties().unwrap();
    assert_eq!(properties.len(), 1);
    assert_eq!(properties.get("x").map(String::as_str), Some("1"));
    // Explicit mode suppresses the feature view entirely.
    assert!(endpoint.features().is_empty());
}

#[test]
fn test_feature_mode_reads_global_features() {
    let log = CallLog::new();
    let class = common::recording_class("com.example.Foo", &[], &log, Faults::default());
    let settings = SettingsSnapshot::from_pairs([
        ("com.example.Foo.endpoint.features", "logging, gzip"),
        ("endpoint.config.com.example.Foo.x", "1"),
    ]);

    let mut endpoint = simple(class, PortDeployment::new("foo", "com.example.Foo"), InMemoryContext::new(), &log);
    endpoint.start(&settings).unwrap();

    assert_eq!(endpoint.features(), ["logging".to_string(), "gzip".to_string()]);
    assert!(endpoint.endpoint_properties().is_none());
}

#[test]
fn test_stop_is_idempotent() {
    let log = CallLog::new();
    let class = common::recording_class("com.example.Foo", &[], &log, Faults::default());
    let mut endpoint = simple(class, PortDeployment::new("foo", "com.example.Foo"), InMemoryContext::new(), &log);
    endpoint.start(&SettingsSnapshot::default()).unwrap();

    assert!(endpoint.stop().is_clean());
    let after_first = log.calls();
    assert!(endpoint.stop().is_clean());

    assert_eq!(log.calls(), after_first);
    assert_eq!(endpoint.state(), EndpointState::Stopped);
    assert_eq!(log.count("handlers_destroy"), 1);
    assert_eq!(log.count("pre_destroy"), 1);
    assert_eq!(log.count("transport_stop"), 1);
}

#[test]
fn test_stop_before_start_is_a_no_op() {
    let log = CallLog::new();
    let class = common::recording_class("com.example.Foo", &[], &log, Faults::default());
    let mut endpoint = simple(class, PortDeployment::new("foo", "com.example.Foo"), InMemoryContext::new(), &log);

    let report = endpoint.stop();

    assert!(report.is_clean());
    assert!(log.calls().is_empty());
    assert_eq!(endpoint.state(), EndpointState::Deployed);

    // Still startable afterwards.
    endpoint.start(&SettingsSnapshot::default()).unwrap();
    assert_eq!(endpoint.state(), EndpointState::Active);
}

#[test]
fn test_teardown_order() {
    let log = CallLog::new();
    let class = common::recording_class("com.example.Foo", &[], &log, Faults::default());
    let mut endpoint = simple(class, PortDeployment::new("foo", "com.example.Foo"), InMemoryContext::new(), &log);
    endpoint.start(&SettingsSnapshot::default()).unwrap();
    endpoint.stop();

    assert_eq!(
        log.calls(),
        [
            "instantiate",
            "post_construct",
            "handlers_initialize",
            "handlers_destroy",
            "pre_destroy",
            "transport_stop",
        ]
    );
}

#[test]
fn test_handler_failure_rolls_back_instance() {
    let log = CallLog::new();
    let class = common::recording_class("com.example.Foo", &[], &log, Faults::default());
    let mut handlers = RecordingHandlers::new(&log);
    handlers.fail_initialize = true;

    let mut endpoint = lifecycle(
        class,
        PortDeployment::new("foo", "com.example.Foo"),
        InMemoryContext::new(),
        handlers,
        RecordingTransport::new(&log),
    );
    let err = endpoint.start(&SettingsSnapshot::default()).unwrap_err();

    assert!(matches!(err, EndpointError::HandlerInitialization { .. }));
    assert_eq!(
        log.calls(),
        ["instantiate", "post_construct", "handlers_initialize", "pre_destroy"]
    );
    assert_eq!(endpoint.state(), EndpointState::Failed);
    assert!(endpoint.instance().is_none());

    // Nothing left to tear down.
    assert!(endpoint.stop().is_clean());
    assert_eq!(log.count("pre_destroy"), 1);
}

#[test]
fn test_teardown_faults_do_not_block_later_steps() {
    let log = CallLog::new();
    let faults = Faults {
        pre_destroy: true,
        ..Faults::default()
    };
    let class = common::recording_class("com.example.Foo", &[], &log, faults);
    let mut handlers = RecordingHandlers::new(&log);
    handlers.fail_destroy = true;
    let mut transport = RecordingTransport::new(&log);
    transport.fail_stop = true;

    let mut endpoint = lifecycle(
        class,
        PortDeployment::new("foo", "com.example.Foo"),
        InMemoryContext::new(),
        handlers,
        transport,
    );
    endpoint.start(&SettingsSnapshot::default()).unwrap();
    let report = endpoint.stop();

    let steps: Vec<TeardownStep> = report.faults().iter().map(|f| f.step).collect();
    assert_eq!(
        steps,
        [TeardownStep::HandlerDestroy, TeardownStep::PreDestroy, TeardownStep::TransportStop]
    );
    assert_eq!(log.count("transport_stop"), 1);
    assert_eq!(endpoint.state(), EndpointState::Stopped);
}

#[test]
fn test_post_construct_failure_is_initialization_error() {
    let log = CallLog::new();
    let faults = Faults {
        post_construct: true,
        ..Faults::default()
    };
    let class = common::recording_class("com.example.Foo", &[], &log, faults);
    let mut endpoint = simple(class, PortDeployment::new("foo", "com.example.Foo"), InMemoryContext::new(), &log);

    let err = endpoint.start(&SettingsSnapshot::default()).unwrap_err();
    assert!(matches!(
        err,
        EndpointError::EndpointInitialization {
            source: InjectionError::PostConstruct(_),
            ..
        }
    ));
    assert_eq!(log.count("pre_destroy"), 0);
    assert_eq!(log.count("handlers_initialize"), 0);
}

#[test]
fn test_start_twice_is_rejected() {
    let log = CallLog::new();
    let class = common::recording_class("com.example.Foo", &[], &log, Faults::default());
    let mut endpoint = simple(class, PortDeployment::new("foo", "com.example.Foo"), InMemoryContext::new(), &log);
    endpoint.start(&SettingsSnapshot::default()).unwrap();

    let err = endpoint.start(&SettingsSnapshot::default()).unwrap_err();
    assert!(matches!(err, EndpointError::InvalidState { state: EndpointState::Active, .. }));
    assert_eq!(log.count("instantiate"), 1);
}

#[test]
fn test_invocation_context_tracks_current_call() {
    let log = CallLog::new();
    let faults = Faults {
        wants_context: true,
        ..Faults::default()
    };
    let class = common::recording_class("com.example.Foo", &[], &log, faults);
    let mut endpoint = simple(class, PortDeployment::new("foo", "com.example.Foo"), InMemoryContext::new(), &log);
    endpoint.start(&SettingsSnapshot::default()).unwrap();

    // Framework injection happens after post-construct.
    assert_eq!(&log.calls()[..3], &["instantiate", "post_construct", "framework:context"]);
    assert_eq!(
        endpoint.invoke("current", json!(null)).unwrap(),
        json!({"operation": "current", "port_id": "foo"})
    );
}

#[test]
fn test_invoke_errors() {
    let log = CallLog::new();
    let class = common::recording_class("com.example.Foo", &[], &log, Faults::default());
    let mut endpoint = simple(class, PortDeployment::new("foo", "com.example.Foo"), InMemoryContext::new(), &log);

    assert!(matches!(
        endpoint.invoke("values", json!(null)),
        Err(InvocationError::NotActive { state: EndpointState::Deployed, .. })
    ));

    endpoint.start(&SettingsSnapshot::default()).unwrap();
    assert!(matches!(
        endpoint.invoke("nope", json!(null)),
        Err(InvocationError::UnknownOperation { .. })
    ));
    assert!(matches!(
        endpoint.invoke("fail", json!(1)),
        Err(InvocationError::Failed { .. })
    ));

    endpoint.stop();
    assert!(matches!(
        endpoint.invoke("values", json!(null)),
        Err(InvocationError::NotActive { state: EndpointState::Stopped, .. })
    ));
}
