#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use zreg_core::compression::{CompressionError, DecoderLimits, QuickPool, Registry};

    const THREADS: usize = 100;

    fn payload(id: usize) -> Vec<u8> {
        format!("thread {id} writes a line that repeats. ").repeat(40).into_bytes()
    }

    fn gone(err: &CompressionError) -> bool {
        matches!(err, CompressionError::NotFound { .. } | CompressionError::ClosedInstance { .. })
    }

    #[test]
    fn close_races_compress_and_decompress() {
        let registry = Arc::new(Registry::default());
        registry.create("shared", 3, 22).unwrap();

        let checker = Arc::new(QuickPool::new(8, DecoderLimits::default()));
        let sealed: Arc<Vec<(Vec<u8>, Vec<u8>)>> = Arc::new(
            (0..THREADS)
                .map(|id| {
                    let data = payload(id);
                    let compressed = checker.quick_compress(&data, 3).unwrap();
                    (data, compressed)
                })
                .collect(),
        );
        let barrier = Arc::new(Barrier::new(THREADS + 1));

        let mut workers = Vec::with_capacity(THREADS);
        for id in 0..THREADS {
            let registry = Arc::clone(&registry);
            let checker = Arc::clone(&checker);
            let sealed = Arc::clone(&sealed);
            let barrier = Arc::clone(&barrier);
            workers.push(thread::spawn(move || {
                barrier.wait();
                for round in 0..5 {
                    let (data, compressed) = &sealed[id];
                    let handle = match registry.get("shared") {
                        Ok(handle) => handle,
                        Err(e) => {
                            assert!(gone(&e), "unexpected lookup error {e:?}");
                            return;
                        }
                    };
                    if (id + round) % 2 == 0 {
                        match handle.compress(data) {
                            Ok(out) => assert_eq!(&checker.quick_decompress(&out).unwrap(), data),
                            Err(e) => assert!(gone(&e), "unexpected compress error {e:?}"),
                        }
                    } else {
                        match handle.decompress(compressed) {
                            Ok(out) => assert_eq!(&out, data),
                            Err(e) => assert!(gone(&e), "unexpected decompress error {e:?}"),
                        }
                    }
                }
            }));
        }

        let closer = {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                thread::yield_now();
                registry.close("shared")
            })
        };

        for worker in workers {
            worker.join().expect("worker panicked");
        }
        closer.join().expect("closer panicked").expect("close succeeds exactly once");
        assert!(registry.is_empty());
    }

    #[test]
    fn distinct_names_do_not_interfere() {
        let registry = Arc::new(Registry::default());
        let workers: Vec<_> = (0..16)
            .map(|id| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let name = format!("worker-{id}");
                    registry.create(&name, 1 + (id % 22) as i32, 18).unwrap();
                    let handle = registry.get(&name).unwrap();
                    let data = payload(id);
                    for _ in 0..10 {
                        let out = handle.compress(&data).unwrap();
                        assert_eq!(handle.decompress(&out).unwrap(), data);
                    }
                    registry.close(&name).unwrap();
                })
            })
            .collect();

        for worker in workers {
            worker.join().expect("worker panicked");
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn racing_creates_leave_one_entry() {
        let registry = Arc::new(Registry::default());
        let barrier = Arc::new(Barrier::new(32));
        let workers: Vec<_> = (0..32)
            .map(|i| {
                let registry = Arc::clone(&registry);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    registry.create("contended", 1 + (i % 22), 20)
                })
            })
            .collect();

        for worker in workers {
            worker.join().expect("worker panicked").expect("create is idempotent");
        }
        assert_eq!(registry.names(), vec!["contended"]);
    }
}
