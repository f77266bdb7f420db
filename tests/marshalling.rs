// Boundary behaviour as the host observes it: fixed returns, identity
// passthroughs and the void completion.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use node_api::{ops, BindingConfig, Error, Exports, HostLoop, Variant, WorkerConfig};
use serde_json::json;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn host(value: serde_json::Value) -> Variant {
    Variant::from(value)
}

#[test]
fn test_returns_fixed_values() {
    init_logging();

    assert_eq!(ops::returns_objects(), host(json!({"foo": "hello", "bar": 42})));
    assert_eq!(ops::returns_strings(), host(json!("returned_string")));
    assert_eq!(ops::returns_numbers(), host(json!(42)));
    assert_eq!(ops::returns_booleans(), host(json!(true)));
    assert_eq!(ops::returns_arrays(), host(json!(["one", "two", "three"])));
}

#[test]
fn test_returned_object_round_trips() {
    let original = ops::returns_objects();
    let back = ops::receives_objects(original.clone()).unwrap();
    assert_eq!(back, original);
}

#[test]
fn test_passthrough_scenarios() {
    init_logging();

    assert_eq!(ops::receives_i64(host(json!(-42))).unwrap(), host(json!(-42)));
    assert_eq!(ops::receives_u64(host(json!(123))).unwrap(), host(json!(123)));
    assert_eq!(
        ops::receives_arrays(host(json!(["one", "two", "three"]))).unwrap(),
        host(json!(["one", "two", "three"]))
    );
    assert_eq!(
        ops::receives_strings(host(json!("hello world!"))).unwrap(),
        host(json!("hello world!"))
    );
    assert_eq!(ops::receives_booleans(host(json!(true))).unwrap(), host(json!(true)));

    let object = host(json!({"foo": "hello", "bar": 42, "nested": {"list": [1, 2.5, null]}}));
    assert_eq!(ops::receives_objects(object.clone()).unwrap(), object);
}

#[test]
fn test_f64_round_trip_is_bit_exact() {
    for n in [0.0, -0.0, 1.1, f64::MIN_POSITIVE, f64::MAX, f64::MIN, f64::EPSILON] {
        match ops::receives_f64(Variant::Float64(n)).unwrap() {
            Variant::Float64(back) => assert_eq!(back.to_bits(), n.to_bits(), "{}", n),
            other => panic!("expected a float, got {:?}", other),
        }
    }
}

#[test]
fn test_containers_keep_negative_zero_and_undefined() {
    let object = Variant::object([
        ("a", Variant::Undefined),
        ("b", Variant::Null),
        ("c", Variant::Array(vec![Variant::Float64(1.5), Variant::Float64(-0.0)])),
    ]);
    let back = ops::receives_objects(object.clone()).unwrap();
    assert_eq!(back, object);
    assert!(matches!(back.get("a"), Some(Variant::Undefined)));
    assert_ne!(back.get("c"), Some(&Variant::Array(vec![Variant::Float64(1.5), Variant::UInt64(0)])));

    let array = ops::receives_arrays(Variant::Array(vec![Variant::Float64(-0.0)])).unwrap();
    assert_ne!(array, host(json!([0])));
    match array.as_array() {
        Some([Variant::Float64(z)]) => assert!(*z == 0.0 && z.is_sign_negative()),
        other => panic!("expected [-0], got {:?}", other),
    }
}

#[test]
fn test_integer_extremes_round_trip() {
    for n in [0, -1, i64::MIN, i64::MAX] {
        assert_eq!(ops::receives_i64(Variant::Int64(n)).unwrap(), Variant::Int64(n));
    }
    for n in [0, 1, u64::MAX] {
        assert_eq!(ops::receives_u64(Variant::UInt64(n)).unwrap(), Variant::UInt64(n));
    }
}

#[test]
fn test_incompatible_inputs_fail_explicitly() {
    assert!(matches!(
        ops::receives_i64(Variant::UInt64(u64::MAX)),
        Err(Error::OutOfRange { .. })
    ));
    assert!(matches!(ops::receives_u64(host(json!(-1))), Err(Error::OutOfRange { .. })));
    assert!(matches!(ops::receives_i64(host(json!(1.5))), Err(Error::OutOfRange { .. })));
    assert!(matches!(ops::receives_f64(host(json!("1.1"))), Err(Error::TypeMismatch { .. })));
    assert!(matches!(ops::receives_arrays(host(json!({}))), Err(Error::TypeMismatch { .. })));
}

#[test]
fn test_array_order_is_preserved() {
    let arr = host(json!(["three", "two", "one"]));
    let back = ops::receives_arrays(arr).unwrap();
    assert_ne!(back, host(json!(["one", "two", "three"])));
    assert_eq!(back, host(json!(["three", "two", "one"])));
}

#[tokio::test]
async fn test_promise_resolves_within_bounded_time() {
    let completion = ops::returns_promises(&WorkerConfig::default());
    let result = tokio::time::timeout(Duration::from_secs(5), completion)
        .await
        .expect("completion did not settle in time");
    assert!(result.is_ok());
}

#[test]
fn test_promise_continuation_runs_once_on_host() {
    let (mut host_loop, handle) = HostLoop::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let host_thread = std::thread::current().id();

    let completion = ops::returns_promises(&WorkerConfig::default());
    {
        let calls = calls.clone();
        completion.then(&handle, move |result| {
            assert!(result.is_ok());
            assert_eq!(std::thread::current().id(), host_thread);
            calls.fetch_add(1, Ordering::SeqCst);
        });
    }

    let deadline = Instant::now() + Duration::from_secs(5);
    while calls.load(Ordering::SeqCst) == 0 {
        assert!(Instant::now() < deadline, "continuation never ran");
        host_loop.run_pending();
        std::thread::sleep(Duration::from_millis(1));
    }
    host_loop.run_pending();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_dynamic_dispatch_matches_direct_calls() {
    let exports = Exports::standard(&BindingConfig::default());

    for name in ["returns_objects", "returns_strings", "returns_numbers", "returns_booleans", "returns_arrays"] {
        let value = exports.call(name, vec![]).await.unwrap();
        assert!(!value.is_undefined(), "{} returned undefined", name);
    }

    let object = exports.call("returns_objects", vec![]).await.unwrap();
    let echoed = exports.call("receives_objects", vec![object.clone()]).await.unwrap();
    assert_eq!(echoed, object);
}
