//! Fixed-size worker pool over a crossbeam work queue.
//!
//! Items are queued up front; each worker pulls one item, runs the work
//! closure (one collaborator call plus one store write) and sends the
//! outcome back on a result channel. The caller's thread drains that
//! channel, so progress callbacks never run concurrently.
//!
//! The first error flips a shared cancel flag: workers stop pulling new
//! items, in-flight items finish, and the first error is returned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::unbounded;
use nl2graph_core::errors::PipelineError;

#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self, PipelineError> {
        if workers == 0 {
            return Err(PipelineError::InvalidWorkers(workers));
        }
        Ok(Self { workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `work` over every item. Outputs come back in completion order.
    pub fn run<T, O, F, P>(&self, items: Vec<T>, work: F, mut on_done: P) -> Result<Vec<O>, PipelineError>
    where
        T: Send,
        O: Send,
        F: Fn(T) -> Result<O, PipelineError> + Sync,
        P: FnMut(&O),
    {
        if self.workers == 1 || items.len() <= 1 {
            let mut outputs = Vec::with_capacity(items.len());
            for item in items {
                let output = work(item)?;
                on_done(&output);
                outputs.push(output);
            }
            return Ok(outputs);
        }

        let total = items.len();
        let (work_tx, work_rx) = unbounded::<T>();
        for item in items {
            // The receiver is alive in this scope, so send cannot fail.
            let _ = work_tx.send(item);
        }
        drop(work_tx);

        let (result_tx, result_rx) = unbounded::<Result<O, PipelineError>>();
        let cancelled = AtomicBool::new(false);
        let threads = self.workers.min(total);

        thread::scope(|scope| {
            let mut first_error: Option<PipelineError> = None;
            let mut handles = Vec::with_capacity(threads);

            for idx in 0..threads {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                let cancelled = &cancelled;
                let work = &work;
                let spawned = thread::Builder::new()
                    .name(format!("nl2graph-worker-{idx}"))
                    .spawn_scoped(scope, move || {
                        while !cancelled.load(Ordering::Relaxed) {
                            let Ok(item) = work_rx.recv() else { break };
                            let outcome = work(item);
                            if outcome.is_err() {
                                cancelled.store(true, Ordering::Relaxed);
                            }
                            if result_tx.send(outcome).is_err() {
                                break;
                            }
                        }
                    });
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        cancelled.store(true, Ordering::Relaxed);
                        first_error = Some(PipelineError::WorkerSpawn(e.to_string()));
                        break;
                    }
                }
            }
            drop(result_tx);

            let mut outputs = Vec::with_capacity(total);
            for outcome in result_rx {
                match outcome {
                    Ok(output) => {
                        on_done(&output);
                        outputs.push(output);
                    }
                    Err(e) => {
                        first_error.get_or_insert(e);
                    }
                }
            }
            for handle in handles {
                if handle.join().is_err() {
                    first_error.get_or_insert(PipelineError::WorkerPanicked);
                }
            }

            match first_error {
                Some(e) => Err(e),
                None => Ok(outputs),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn zero_workers_is_rejected() {
        assert!(matches!(WorkerPool::new(0), Err(PipelineError::InvalidWorkers(0))));
    }

    #[test]
    fn every_item_is_processed_once() {
        for workers in [1, 4, 16] {
            let pool = WorkerPool::new(workers).unwrap();
            let mut seen = 0;
            let mut out = pool
                .run((0..100).collect(), |i: u32| Ok(i * 2), |_| seen += 1)
                .unwrap();
            out.sort_unstable();
            assert_eq!(out, (0..100).map(|i| i * 2).collect::<Vec<_>>());
            assert_eq!(seen, 100);
        }
    }

    #[test]
    fn sequential_pool_stops_at_first_error() {
        let pool = WorkerPool::new(1).unwrap();
        let calls = AtomicUsize::new(0);
        let result = pool.run(
            vec![1, 2, 3, 4],
            |i: u32| {
                calls.fetch_add(1, Ordering::SeqCst);
                if i == 2 {
                    Err(PipelineError::Generation {
                        record_id: i.to_string(),
                        message: "boom".into(),
                    })
                } else {
                    Ok(i)
                }
            },
            |_| {},
        );
        assert!(matches!(result, Err(PipelineError::Generation { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn parallel_pool_returns_error_and_stops_pulling() {
        let pool = WorkerPool::new(4).unwrap();
        let calls = AtomicUsize::new(0);
        let result = pool.run(
            (0..1_000).collect(),
            |i: u32| {
                calls.fetch_add(1, Ordering::SeqCst);
                if i == 0 {
                    Err(PipelineError::Generation {
                        record_id: "0".into(),
                        message: "boom".into(),
                    })
                } else {
                    std::thread::sleep(std::time::Duration::from_millis(1));
                    Ok(i)
                }
            },
            |_| {},
        );
        assert!(result.is_err());
        assert!(calls.load(Ordering::SeqCst) < 1_000);
    }
}
