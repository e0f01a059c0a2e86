//! Stress tests for events and managed threads

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use veda_sync::prelude::*;

#[test]
#[ignore] // Run with --ignored flag
fn stress_test_auto_reset_never_double_releases() {
    const WAITERS: usize = 8;
    const SIGNALS: usize = 2_000;

    let event = Arc::new(Event::new(true));
    let released = Arc::new(AtomicUsize::new(0));
    let ack = Arc::new(Event::new(true));

    let mut handles = Vec::new();
    for _ in 0..WAITERS {
        let (event, released, ack) = (event.clone(), released.clone(), ack.clone());
        let mut handle = ThreadHandle::new();
        handle
            .start(move || loop {
                event.wait();
                if released.fetch_add(1, Ordering::SeqCst) >= SIGNALS {
                    ack.set();
                    break;
                }
                ack.set();
            })
            .unwrap();
        handles.push(handle);
    }

    for i in 0..SIGNALS {
        event.set();
        ack.wait();
        assert_eq!(released.load(Ordering::SeqCst), i + 1);
    }

    // one more signal per waiter to let them exit
    for _ in 0..WAITERS {
        event.set();
        ack.wait();
    }
    for handle in &handles {
        handle.join().unwrap();
    }
}

#[test]
#[ignore]
fn stress_test_many_short_threads() {
    let counter = Arc::new(Mutex::new(0));

    for _ in 0..50 {
        let mut handles: Vec<ThreadHandle> = (0..20)
            .map(|_| ThreadHandle::new())
            .collect();

        for handle in &mut handles {
            let counter = counter.clone();
            handle
                .start(move || {
                    *counter.lock() += 1;
                })
                .unwrap();
        }

        for handle in &handles {
            handle.join().unwrap();
            assert!(!handle.is_running());
        }
    }

    assert_eq!(*counter.lock(), 1_000);
}

#[test]
#[ignore]
fn stress_test_concurrent_joiners() {
    for _ in 0..100 {
        let mut handle = ThreadHandle::new();
        handle.start(|| sleep(1)).unwrap();

        let joiners: Vec<_> = (0..4)
            .map(|_| {
                let h = handle.clone();
                std::thread::spawn(move || h.join())
            })
            .collect();

        for j in joiners {
            assert!(j.join().unwrap().is_ok());
        }
        assert!(!handle.is_running());
    }
}

#[test]
#[ignore]
fn stress_test_restart_cycles() {
    let mut handle = ThreadHandle::new();
    let runs = Arc::new(AtomicUsize::new(0));

    for _ in 0..500 {
        let runs = runs.clone();
        handle
            .start(move || {
                runs.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        handle.join().unwrap();
    }

    assert_eq!(runs.load(Ordering::Relaxed), 500);
}
