//! Concurrent access tests for `hot_persist_runtime`.
//!
//! Call indices are tracked per handle in a process-wide registry, so modules
//! driven from different threads must not see each other's positions.

use std::sync::{Arc, Barrier};
use std::thread;

use hot_persist_core::{
    BuildMode, CallCounters, DataBag, HotApi, HotHandle, PersistConfig, Persistor, persist,
};
use hot_persist_runtime::{HotModule, HotRuntime};

fn position(hot: &HotHandle) -> usize {
    CallCounters::global().peek(hot)
}

fn dev(persistor: Persistor) -> Persistor {
    persistor.with_config(PersistConfig::fixed(BuildMode::Development))
}

/// Each thread owns one module and runs its own edit cycles.
#[test]
fn modules_on_separate_threads_keep_their_own_indices() {
    const THREADS: usize = 4;
    const CALLS: usize = 5;
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let module = Arc::new(HotModule::new(format!("worker-{t}")));
                let persistor = dev(persist(module.handle()));
                barrier.wait();

                for cycle in 0..3 {
                    let values: Vec<Arc<usize>> = (0..CALLS)
                        .map(|i| persistor.get(|| Arc::new(t * 100 + i)))
                        .collect();
                    assert_eq!(position(&module.handle()), CALLS);

                    for (i, value) in values.iter().enumerate() {
                        assert_eq!(**value, t * 100 + i, "thread {t} cycle {cycle}");
                    }
                    module.reload().expect("reload");
                    assert_eq!(position(&module.handle()), 0);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }
}

/// Many threads persisting through the same module share one index sequence.
#[test]
fn shared_module_hands_out_unique_indices() {
    const THREADS: usize = 8;
    const CALLS: usize = 25;

    let runtime = HotRuntime::new();
    let module = runtime.register("shared").expect("register");
    let persistor = Arc::new(dev(persist(runtime.provider("shared"))));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let persistor = Arc::clone(&persistor);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..CALLS {
                    let _ = persistor.get(|| Arc::new(0_u8));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(position(&module.handle()), THREADS * CALLS);
    assert_eq!(module.pending_dispose_count(), THREADS * CALLS);

    let carried = runtime.reload("shared").expect("reload");
    assert_eq!(carried, THREADS * CALLS);
    assert_eq!(position(&module.handle()), 0);
    assert_eq!(
        module.data().as_ref().map(DataBag::len),
        Some(THREADS * CALLS),
        "every index got its own slot"
    );
}

/// Reloading one module while another thread keeps using a different module.
#[test]
fn reload_does_not_disturb_other_modules() {
    let runtime = HotRuntime::new();
    let busy = runtime.register("busy").expect("register");
    runtime.register("idle").expect("register");

    let persistor = dev(persist(runtime.provider("busy")));
    let first = persistor.get(|| Arc::new(String::from("kept")));

    let reloader = {
        let runtime = runtime.clone();
        thread::spawn(move || {
            for _ in 0..10 {
                runtime.reload("idle").expect("reload idle");
            }
        })
    };
    reloader.join().expect("Thread panicked");

    assert_eq!(position(&busy.handle()), 1);
    busy.reload().expect("reload busy");
    let second = persistor.get(|| Arc::new(String::from("fresh")));
    assert!(Arc::ptr_eq(&first, &second));
}
