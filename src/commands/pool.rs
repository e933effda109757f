//! Scoped worker pool for per-trace and per-batch work.
//!
//! Workers claim items through a shared atomic counter until none remain.
//! Results come back in input order regardless of which worker ran them.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Run `work` over every item on up to `workers` threads
///
/// A panicking item is re-raised on the calling thread.
pub fn run_parallel<T, R, F>(items: &[T], workers: usize, work: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    if items.is_empty() {
        return Vec::new();
    }

    let workers = workers.clamp(1, items.len());
    let next_item = AtomicUsize::new(0);

    let mut done: Vec<(usize, R)> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let next_item = &next_item;
                let work = &work;

                s.spawn(move || {
                    let mut done = Vec::new();
                    loop {
                        let i = next_item.fetch_add(1, Ordering::Relaxed);
                        if i >= items.len() {
                            break;
                        }
                        done.push((i, work(&items[i])));
                    }
                    done
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| match h.join() {
                Ok(done) => done,
                Err(e) => std::panic::resume_unwind(e),
            })
            .collect()
    });

    done.sort_unstable_by_key(|(i, _)| *i);
    done.into_iter().map(|(_, result)| result).collect()
}
