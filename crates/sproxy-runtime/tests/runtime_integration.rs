//! Construct, dispatch, translate and release through the runtime

use parking_lot::Mutex;
use rand::Rng;
use sproxy_model::{ClassSpec, ClassSpecBuilder, ConstructorDecl, MethodDecl};
use sproxy_runtime::translate::{CLASS_CAST, DYNAMIC_EXCEPTION, FATAL, ILLEGAL_STATE, NULL_POINTER, UNDECLARED_THROWABLE};
use sproxy_runtime::*;
use sproxy_types::{ImportTable, StandardHierarchy, TypeCatalogue};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Weak};
use std::thread;
use std::time::Duration;

const ADDER: &str = "chaquopy.test.Adder";

fn catalogue() -> TypeCatalogue {
    TypeCatalogue::new(
        ImportTable::new()
            .with("String", "java.lang.String")
            .with("Class1", "com.example.Class1")
            .with("Class2", "com.example.Class2"),
    )
}

fn adder_spec() -> ClassSpec {
    let catalogue = catalogue();
    let mut b = ClassSpecBuilder::new(&catalogue, "chaquopy.test", "Adder").unwrap();
    b.constructor(ConstructorDecl::new().arg("int")).unwrap();
    b.method("add", MethodDecl::new("int").arg("int")).unwrap();
    b.method("echo", MethodDecl::new("String").arg("String")).unwrap();
    b.method("scale", MethodDecl::new("double").arg("int")).unwrap();
    b.method("wrong", MethodDecl::new("int")).unwrap();
    b.method("nothing", MethodDecl::new("int")).unwrap();
    b.method("fail", MethodDecl::new("void").arg("String").throws("Class1").throws("Class2"))
        .unwrap();
    b.method("count", MethodDecl::new("int").modifiers("public static"))
        .unwrap();
    b.build().unwrap()
}

struct Adder {
    base: Mutex<i32>,
}

impl DynamicObject for Adder {
    fn call(&self, member: &str, args: &[Value]) -> DynResult<Value> {
        match (member, args) {
            ("__init__", [Value::Int(base)]) if *base < 0 => Err(DynError::new("ValueError", "negative base")),
            ("__init__", [Value::Int(base)]) => {
                *self.base.lock() = *base;
                Ok(Value::Null)
            }
            ("add", [Value::Int(x)]) => Ok(Value::Int(*self.base.lock() + x)),
            ("echo", [value]) => Ok(value.clone()),
            ("scale", [Value::Int(x)]) => Ok(Value::Int(x * 2)),
            ("wrong", []) => Ok(Value::from("x")),
            ("nothing", []) => Ok(Value::Null),
            ("fail", [Value::Str(kind)]) => Err(match kind.as_str() {
                "type" => DynError::new("TypeError", "te"),
                "io" => DynError::vm("java.io.IOException", "io"),
                class => DynError::vm(class, "raised"),
            }),
            _ => Err(DynError::new("AttributeError", member)),
        }
    }
}

struct AdderClass {
    created: AtomicUsize,
}

impl DynamicClass for AdderClass {
    fn allocate(&self) -> DynResult<Arc<dyn DynamicObject>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(Adder { base: Mutex::new(0) }))
    }

    fn call_static(&self, member: &str, _args: &[Value]) -> DynResult<Value> {
        match member {
            "count" => Ok(Value::Int(self.created.load(Ordering::SeqCst) as i32)),
            other => Err(DynError::new("AttributeError", other)),
        }
    }
}

fn runtime() -> ProxyRuntime {
    let hierarchy = StandardHierarchy::new()
        .with_class("com.example.Class1", "java.lang.Exception")
        .with_class("com.example.Class2", "java.lang.Exception");
    let runtime = ProxyRuntime::with_hierarchy(RuntimeConfig::default(), Arc::new(hierarchy));
    runtime
        .register_class(adder_spec(), Arc::new(AdderClass { created: AtomicUsize::new(0) }))
        .unwrap();
    runtime
}

fn construct(runtime: &ProxyRuntime, raw: u64, base: i32) -> ObjectId {
    let id = ObjectId::new(raw);
    let outcome = runtime.construct(id, ADDER, "<init>(I)V", &[Value::Int(base)]);
    assert_eq!(outcome, Outcome::Return(Value::Null));
    id
}

#[test]
fn test_construct_then_call() {
    let runtime = runtime();
    let id = construct(&runtime, 1, 5);
    assert!(runtime.instances().is_bound(id));
    assert_eq!(
        runtime.call(id, ADDER, "add(I)I", &[Value::Int(3)]),
        Outcome::Return(Value::Int(8))
    );
    assert_eq!(
        runtime.call(id, ADDER, "echo(Ljava/lang/String;)Ljava/lang/String;", &[Value::from("hi")]),
        Outcome::Return(Value::from("hi"))
    );
    assert_eq!(
        runtime.call(id, ADDER, "scale(I)D", &[Value::Int(2)]),
        Outcome::Return(Value::Double(4.0))
    );
    assert_eq!(
        runtime.call_static(ADDER, "count()I", &[]),
        Outcome::Return(Value::Int(1))
    );

    runtime.release(id);
    assert!(!runtime.instances().is_bound(id));
    let thrown = runtime.call(id, ADDER, "add(I)I", &[Value::Int(1)]).into_result().unwrap_err();
    assert!(thrown.is(ILLEGAL_STATE));
}

#[test]
fn test_failed_constructor_unbinds() {
    let runtime = runtime();
    let id = ObjectId::new(7);
    let thrown = runtime
        .construct(id, ADDER, "<init>(I)V", &[Value::Int(-1)])
        .into_result()
        .unwrap_err();
    assert!(thrown.is(DYNAMIC_EXCEPTION));
    assert_eq!(thrown.message.as_deref(), Some("ValueError: negative base"));
    assert!(!runtime.instances().is_bound(id));

    let thrown = runtime.construct(id, ADDER, "add(I)I", &[Value::Int(1)]).into_result().unwrap_err();
    assert!(thrown.is(ILLEGAL_STATE));
}

#[test]
fn test_wrong_kind_keys_rejected() {
    let runtime = runtime();
    let id = construct(&runtime, 3, 5);

    let thrown = runtime.call(id, ADDER, "<init>(I)V", &[Value::Int(9)]).into_result().unwrap_err();
    assert!(thrown.is(ILLEGAL_STATE));
    let thrown = runtime.call(id, ADDER, "count()I", &[]).into_result().unwrap_err();
    assert!(thrown.is(ILLEGAL_STATE));
    let thrown = runtime.call_static(ADDER, "add(I)I", &[Value::Int(1)]).into_result().unwrap_err();
    assert!(thrown.is(ILLEGAL_STATE));

    assert_eq!(
        runtime.call(id, ADDER, "add(I)I", &[Value::Int(0)]),
        Outcome::Return(Value::Int(5))
    );
    assert!(runtime.instances().is_bound(id));
}

#[test]
fn test_construct_twice_is_fatal() {
    let runtime = runtime();
    let id = construct(&runtime, 2, 1);
    let thrown = runtime
        .construct(id, ADDER, "<init>(I)V", &[Value::Int(1)])
        .into_result()
        .unwrap_err();
    assert!(thrown.is(FATAL));
}

#[test]
fn test_exception_translation() {
    let runtime = runtime();
    let id = construct(&runtime, 3, 0);
    let fail = |kind: &str| {
        runtime
            .call(id, ADDER, "fail(Ljava/lang/String;)V", &[Value::from(kind)])
            .into_result()
            .unwrap_err()
    };

    assert!(fail("com.example.Class2").is("com.example.Class2"));
    assert!(fail("com.example.Class1").is("com.example.Class1"));
    assert!(fail(NULL_POINTER).is(NULL_POINTER));

    let wrapped = fail("io");
    assert!(wrapped.is(UNDECLARED_THROWABLE));
    assert!(wrapped.cause.unwrap().is("java.io.IOException"));

    let dynamic = fail("type");
    assert!(dynamic.is(DYNAMIC_EXCEPTION));
    assert_eq!(dynamic.message.as_deref(), Some("TypeError: te"));
}

#[test]
fn test_return_coercion_failures() {
    let runtime = runtime();
    let id = construct(&runtime, 4, 0);

    let thrown = runtime.call(id, ADDER, "wrong()I", &[]).into_result().unwrap_err();
    assert!(thrown.is(CLASS_CAST));
    assert_eq!(
        thrown.message.as_deref(),
        Some("Cannot convert str object to java.lang.Integer")
    );

    let thrown = runtime.call(id, ADDER, "nothing()I", &[]).into_result().unwrap_err();
    assert!(thrown.is(NULL_POINTER));
}

#[test]
fn test_unknown_class_and_member() {
    let runtime = runtime();
    let thrown = runtime
        .call_static("pkg.Missing", "count()I", &[])
        .into_result()
        .unwrap_err();
    assert!(thrown.is(ILLEGAL_STATE));
    assert_eq!(
        thrown.message.as_deref(),
        Some("static proxy class pkg.Missing loaded before its dynamic counterpart")
    );

    let thrown = runtime.call_static(ADDER, "missing()V", &[]).into_result().unwrap_err();
    assert!(thrown.is(ILLEGAL_STATE));
}

#[test]
fn test_duplicate_policy() {
    let runtime = runtime();
    let again = runtime.register_class(adder_spec(), Arc::new(AdderClass { created: AtomicUsize::new(0) }));
    assert!(matches!(again, Err(RegistryError::DuplicateClass(_))));

    let config = RuntimeConfig {
        duplicate_policy: DuplicateClassPolicy::Replace,
        ..RuntimeConfig::default()
    };
    let replacing = ProxyRuntime::new(config);
    for _ in 0..2 {
        replacing
            .register_class(adder_spec(), Arc::new(AdderClass { created: AtomicUsize::new(0) }))
            .unwrap();
    }
    assert_eq!(replacing.classes().len(), 1);
}

#[test]
fn test_verify_loaded() {
    let runtime = runtime();
    let bytes = sproxy_codegen::emit_bytes(&adder_spec()).unwrap();
    runtime.verify_loaded(ADDER, &bytes).unwrap();

    let catalogue = catalogue();
    let mut b = ClassSpecBuilder::new(&catalogue, "chaquopy.test", "Adder").unwrap();
    b.extends("Class1").unwrap();
    let other = sproxy_codegen::emit_bytes(&b.build().unwrap()).unwrap();
    let err = runtime.verify_loaded(ADDER, &other).unwrap_err();
    assert_eq!(
        err.to_string(),
        "chaquopy.test.Adder: expected extends java.lang.Object, but VM class actually extends com.example.Class1"
    );

    assert!(matches!(
        runtime.verify_loaded(ADDER, &bytes[..10]),
        Err(RegistryError::InvalidClassFile { .. })
    ));
}

#[test]
fn test_concurrent_disjoint_identities() {
    let runtime = Arc::new(runtime());
    let handles: Vec<_> = (0..8u64)
        .map(|t| {
            let runtime = runtime.clone();
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                let mut bound = [false; 16];
                for _ in 0..500 {
                    let slot = rng.gen_range(0..bound.len());
                    let id = ObjectId::new(t * 1000 + slot as u64);
                    match rng.gen_range(0..3) {
                        0 if !bound[slot] => {
                            construct(&runtime, id.raw(), slot as i32);
                            bound[slot] = true;
                        }
                        1 if bound[slot] => {
                            runtime.release(id);
                            bound[slot] = false;
                        }
                        _ => {
                            let outcome = runtime.call(id, ADDER, "add(I)I", &[Value::Int(1)]);
                            if bound[slot] {
                                assert_eq!(outcome, Outcome::Return(Value::Int(slot as i32 + 1)));
                            } else {
                                assert!(outcome.thrown().is_some());
                            }
                        }
                    }
                }
                bound.iter().filter(|b| **b).count()
            })
        })
        .collect();

    let live: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(runtime.instances().len(), live);
}

struct SlowDrop {
    dropped: Arc<AtomicBool>,
}

impl DynamicObject for SlowDrop {
    fn call(&self, _member: &str, _args: &[Value]) -> DynResult<Value> {
        Ok(Value::Null)
    }
}

impl Drop for SlowDrop {
    fn drop(&mut self) {
        thread::sleep(Duration::from_millis(50));
        self.dropped.store(true, Ordering::SeqCst);
    }
}

#[test]
fn test_rebind_waits_for_unbind() {
    let registry = Arc::new(InstanceRegistry::new());
    let dropped = Arc::new(AtomicBool::new(false));
    let id = ObjectId::new(42);
    registry
        .bind(id, Arc::new(SlowDrop { dropped: dropped.clone() }))
        .unwrap();

    let unbinder = {
        let registry = registry.clone();
        thread::spawn(move || registry.unbind(id))
    };
    thread::sleep(Duration::from_millis(10));
    registry
        .bind(id, Arc::new(SlowDrop { dropped: Arc::new(AtomicBool::new(false)) }))
        .unwrap();
    assert!(dropped.load(Ordering::SeqCst));
    assert!(unbinder.join().unwrap());
    assert!(registry.is_bound(id));
}

struct Keyed;

impl DynamicObject for Keyed {
    fn call(&self, member: &str, args: &[Value]) -> DynResult<Value> {
        match member {
            "size" => Ok(Value::Int(args.len() as i32)),
            _ => Err(DynError::new("KeyError", member)),
        }
    }
}

#[test]
fn test_keyed_creates_once() {
    let runtime = Arc::new(ProxyRuntime::default());
    let created = Arc::new(AtomicUsize::new(0));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let runtime = runtime.clone();
            let created = created.clone();
            thread::spawn(move || {
                let args = [Value::from("a"), Value::Int(1)];
                let key = DispatchKey::from_call("java.util.function.Supplier", &args);
                runtime.call_keyed(key, "size", &args, || {
                    created.fetch_add(1, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(10));
                    Ok(Arc::new(Keyed) as Arc<dyn DynamicObject>)
                })
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Outcome::Return(Value::Int(2)));
    }
    assert_eq!(created.load(Ordering::SeqCst), 1);
    assert_eq!(runtime.keyed().len(), 1);

    let key = DispatchKey::from_call("java.util.function.Supplier", &[]);
    let thrown = runtime
        .call_keyed(key, "missing", &[], || Ok(Arc::new(Keyed) as Arc<dyn DynamicObject>))
        .into_result()
        .unwrap_err();
    assert_eq!(thrown.message.as_deref(), Some("KeyError: missing"));
}

#[test]
fn test_install_once() {
    let first = install(ProxyRuntime::default());
    let second = install(ProxyRuntime::default());
    assert!(first.is_ok());
    assert!(matches!(second, Err(RegistryError::AlreadyInstalled)));
    assert!(installed().is_some());
}

const TRACKED: &str = "chaquopy.test.Tracked";

fn tracked_spec() -> ClassSpec {
    let catalogue = catalogue();
    let mut b = ClassSpecBuilder::new(&catalogue, "chaquopy.test", "Tracked").unwrap();
    b.constructor(ConstructorDecl::new()).unwrap();
    b.method("close", MethodDecl::new("void")).unwrap();
    b.method("finalize", MethodDecl::new("void").modifiers("protected"))
        .unwrap();
    b.build().unwrap()
}

/// Records, for each dropped instance, whether the interpreter lock was held
struct Tracked {
    runtime: Weak<ProxyRuntime>,
    drops: Arc<Mutex<Vec<bool>>>,
    fail_finalize: Arc<AtomicBool>,
}

impl DynamicObject for Tracked {
    fn call(&self, member: &str, _args: &[Value]) -> DynResult<Value> {
        match member {
            "__init__" | "close" => Ok(Value::Null),
            "finalize" if self.fail_finalize.load(Ordering::SeqCst) => {
                Err(DynError::new("RuntimeError", "finalize failed"))
            }
            "finalize" => Ok(Value::Null),
            other => Err(DynError::new("AttributeError", other)),
        }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        let locked = self
            .runtime
            .upgrade()
            .map(|runtime| runtime.interpreter_lock().is_locked())
            .unwrap_or(false);
        self.drops.lock().push(locked);
    }
}

struct TrackedClass {
    runtime: Weak<ProxyRuntime>,
    drops: Arc<Mutex<Vec<bool>>>,
    fail_finalize: Arc<AtomicBool>,
}

impl DynamicClass for TrackedClass {
    fn allocate(&self) -> DynResult<Arc<dyn DynamicObject>> {
        Ok(Arc::new(Tracked {
            runtime: self.runtime.clone(),
            drops: self.drops.clone(),
            fail_finalize: self.fail_finalize.clone(),
        }))
    }
}

fn tracked_runtime() -> (Arc<ProxyRuntime>, Arc<Mutex<Vec<bool>>>, Arc<AtomicBool>) {
    let runtime = Arc::new(ProxyRuntime::default());
    let drops = Arc::new(Mutex::new(Vec::new()));
    let fail_finalize = Arc::new(AtomicBool::new(false));
    let dynamic = TrackedClass {
        runtime: Arc::downgrade(&runtime),
        drops: drops.clone(),
        fail_finalize: fail_finalize.clone(),
    };
    runtime.register_class(tracked_spec(), Arc::new(dynamic)).unwrap();
    (runtime, drops, fail_finalize)
}

fn construct_tracked(runtime: &ProxyRuntime, raw: u64) -> ObjectId {
    let id = ObjectId::new(raw);
    assert_eq!(runtime.construct(id, TRACKED, "<init>()V", &[]), Outcome::Return(Value::Null));
    id
}

#[test]
fn test_declared_finalize_releases_binding() {
    let (runtime, drops, fail_finalize) = tracked_runtime();

    let id = construct_tracked(&runtime, 1);
    assert_eq!(runtime.call(id, TRACKED, "close()V", &[]), Outcome::Return(Value::Null));
    assert!(runtime.instances().is_bound(id));
    assert_eq!(runtime.call(id, TRACKED, "finalize()V", &[]), Outcome::Return(Value::Null));
    assert!(!runtime.instances().is_bound(id));
    assert_eq!(*drops.lock(), vec![true]);

    fail_finalize.store(true, Ordering::SeqCst);
    let id = construct_tracked(&runtime, 2);
    let thrown = runtime.call(id, TRACKED, "finalize()V", &[]).into_result().unwrap_err();
    assert!(thrown.is(DYNAMIC_EXCEPTION));
    assert!(!runtime.instances().is_bound(id));
    assert!(runtime.instances().is_empty());
    assert_eq!(drops.lock().len(), 2);
}

#[test]
fn test_teardown_runs_under_interpreter_lock() {
    let (runtime, drops, _) = tracked_runtime();

    let id = construct_tracked(&runtime, 1);
    assert_eq!(runtime.call(id, TRACKED, "close()V", &[]), Outcome::Return(Value::Null));
    runtime.release(id);
    assert_eq!(*drops.lock(), vec![true]);

    construct_tracked(&runtime, 2);
    construct_tracked(&runtime, 3);
    runtime.clear();
    assert!(runtime.instances().is_empty());
    assert_eq!(*drops.lock(), vec![true, true, true]);
    assert!(!runtime.interpreter_lock().is_locked());
}

/// Calls back into the runtime for another key after a delay
struct Relay {
    runtime: Weak<ProxyRuntime>,
    target: DispatchKey,
}

impl DynamicObject for Relay {
    fn call(&self, member: &str, _args: &[Value]) -> DynResult<Value> {
        if member != "relay" {
            return Err(DynError::new("AttributeError", member));
        }
        thread::sleep(Duration::from_millis(300));
        let runtime = self
            .runtime
            .upgrade()
            .ok_or_else(|| DynError::new("RuntimeError", "runtime gone"))?;
        let outcome = runtime.call_keyed(self.target.clone(), "size", &[], || {
            Ok(Arc::new(Keyed) as Arc<dyn DynamicObject>)
        });
        outcome
            .into_result()
            .map_err(|_| DynError::new("RuntimeError", "nested call failed"))
    }
}

#[test]
fn test_nested_keyed_call_during_creation() {
    let runtime = Arc::new(ProxyRuntime::default());
    let shared = DispatchKey::from_call("test.Shared", &[]);
    let outer = DispatchKey::from_call("test.Outer", &[]);
    let (sender, receiver) = mpsc::channel();

    {
        let runtime = runtime.clone();
        let sender = sender.clone();
        let shared = shared.clone();
        thread::spawn(move || {
            let weak = Arc::downgrade(&runtime);
            let outcome = runtime.call_keyed(outer, "relay", &[], move || {
                Ok(Arc::new(Relay { runtime: weak, target: shared }) as Arc<dyn DynamicObject>)
            });
            let _ = sender.send(outcome);
        });
    }
    {
        let runtime = runtime.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            let outcome = runtime.call_keyed(shared, "size", &[], || {
                thread::sleep(Duration::from_millis(50));
                Ok(Arc::new(Keyed) as Arc<dyn DynamicObject>)
            });
            let _ = sender.send(outcome);
        });
    }

    for _ in 0..2 {
        let outcome = receiver
            .recv_timeout(Duration::from_secs(5))
            .expect("keyed calls deadlocked");
        assert_eq!(outcome, Outcome::Return(Value::Int(0)));
    }
    assert_eq!(runtime.keyed().len(), 2);
}
