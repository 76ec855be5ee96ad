//! Thread-pool strategy
//!
//! A bounded set of scoped OS threads pulls URLs off a shared cursor. All
//! workers share one blocking HTTP client and release the CPU while they wait
//! on the network.

use crate::fetcher::{FetchRecord, HttpFetcher, Recorder};
use crate::strategy::{Strategy, StrategyKind};
use crate::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

/// Runs each unit of work on a pool of worker threads
pub struct ThreadPool<'a> {
    fetcher: &'a HttpFetcher,
    recorder: Recorder,
    workers: usize,
}

impl<'a> ThreadPool<'a> {
    pub fn new(fetcher: &'a HttpFetcher, recorder: Recorder, workers: usize) -> Self {
        Self {
            fetcher,
            recorder,
            workers,
        }
    }
}

impl Strategy for ThreadPool<'_> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ThreadPool
    }

    fn run(&self, urls: &[String]) -> Result<Vec<FetchRecord>> {
        Ok(run_pooled(
            urls,
            self.workers,
            self.recorder,
            "fetch-thread",
            |url| self.recorder.record(url, || self.fetcher.fetch_blocking(url)),
        ))
    }
}

/// Runs `unit` for every URL on at most `workers` threads
///
/// Each record is slotted by its submission index, so the returned vector is in
/// input order whatever order the units complete in. A unit whose worker died
/// before reporting is recorded as a failure.
pub(crate) fn run_pooled<F>(
    urls: &[String],
    workers: usize,
    recorder: Recorder,
    label: &str,
    unit: F,
) -> Vec<FetchRecord>
where
    F: Fn(&str) -> FetchRecord + Sync,
{
    if urls.is_empty() {
        return Vec::new();
    }

    let workers = workers.clamp(1, urls.len());
    let cursor = AtomicUsize::new(0);
    let mut slots: Vec<Option<FetchRecord>> = vec![None; urls.len()];
    let (tx, rx) = mpsc::channel::<(usize, FetchRecord)>();

    tracing::debug!("Starting {} {} workers for {} URLs", workers, label, urls.len());

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);

        for id in 0..workers {
            let tx = tx.clone();
            let cursor = &cursor;
            let unit = &unit;

            let spawned = thread::Builder::new()
                .name(format!("{}-{}", label, id))
                .spawn_scoped(scope, move || loop {
                    let index = cursor.fetch_add(1, Ordering::Relaxed);
                    let Some(url) = urls.get(index) else {
                        break;
                    };
                    if tx.send((index, unit(url.as_str()))).is_err() {
                        break;
                    }
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => tracing::error!("Failed to spawn {} worker {}: {}", label, id, e),
            }
        }

        // Workers hold the only remaining senders
        drop(tx);

        for (index, record) in rx {
            slots[index] = Some(record);
        }

        for handle in handles {
            if handle.join().is_err() {
                tracing::error!("A {} worker panicked", label);
            }
        }
    });

    urls.iter()
        .zip(slots)
        .map(|(url, slot)| {
            slot.unwrap_or_else(|| {
                recorder.lost(url, "unit of work did not complete: worker exited early")
            })
        })
        .collect()
}
