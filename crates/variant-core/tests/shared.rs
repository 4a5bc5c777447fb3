//! 共享句柄：单写者更新、多读者并发读取。

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use variant_core::{ChangeNotification, ConfigurableValue, ConfigurationId, SharedConfigurable};

#[test]
fn readers_never_observe_undefined_values() {
    let shared = SharedConfigurable::new(ConfigurableValue::new(0_u64));
    let target = ConfigurationId::new("flight-1");

    let writer = {
        let shared = shared.clone();
        let target = target.clone();
        thread::spawn(move || {
            for round in 1..=200_u64 {
                shared.update(|value| {
                    if round % 2 == 0 {
                        value.reset(&target);
                    } else {
                        value.set(target.clone(), round).expect("set override");
                    }
                });
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            let target = target.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    let guard = shared.read();
                    let observed = *guard.get(&target);
                    // 覆盖项只会是奇数轮次；没有覆盖项时必须读到默认值 0。
                    if guard.is_default(&target) {
                        assert_eq!(observed, 0);
                    } else {
                        assert_eq!(observed % 2, 1);
                    }
                }
            })
        })
        .collect();

    writer.join().expect("writer thread must not panic");
    for reader in readers {
        reader.join().expect("reader thread must not panic");
    }

    assert!(shared.read().is_default(&target));
    assert_eq!(shared.get(&target), 0);
    assert_eq!(shared.read().change_sequence(), 200);
}

#[test]
fn listeners_read_source_inside_update() {
    let shared = SharedConfigurable::new(ConfigurableValue::new("A"));
    let hits = Arc::new(AtomicU64::new(0));
    let observed: Arc<Mutex<Option<&'static str>>> = Arc::default();
    let counter = Arc::clone(&hits);
    let sink = Arc::clone(&observed);
    shared.update(|value| {
        value.subscribe(
            move |source: &ConfigurableValue<&'static str>,
                  notification: &ChangeNotification<&'static str>| {
                counter.store(notification.sequence, Ordering::SeqCst);
                let current = *source.get(&ConfigurationId::new("x"));
                *sink.lock().expect("observed lock") = Some(current);
            },
        )
    });

    shared
        .update(|value| value.set(ConfigurationId::new("x"), "B"))
        .expect("set override");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(*observed.lock().expect("observed lock"), Some("B"));

    let snapshot = shared.snapshot();
    assert_eq!(snapshot.overrides, vec![(ConfigurationId::new("x"), "B")]);
}
