//! Event-loop strategy
//!
//! All units run as tasks on a single-threaded tokio runtime. Every task is
//! spawned before any is awaited, so the whole batch is in flight at once;
//! tasks only yield while waiting on the network or the file write.
//!
//! A server that never answers stalls its task forever, and the loop with it,
//! because nothing preempts a pending await.

use crate::fetcher::{FetchRecord, HttpFetcher, Recorder};
use crate::strategy::{Strategy, StrategyKind};
use crate::{DispatchError, Result};
use std::sync::Arc;

/// Runs each unit of work as a cooperative task on one thread
pub struct EventLoop<'a> {
    fetcher: &'a HttpFetcher,
    recorder: Recorder,
}

impl<'a> EventLoop<'a> {
    pub fn new(fetcher: &'a HttpFetcher, recorder: Recorder) -> Self {
        Self { fetcher, recorder }
    }
}

impl Strategy for EventLoop<'_> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::EventLoop
    }

    fn run(&self, urls: &[String]) -> Result<Vec<FetchRecord>> {
        if urls.is_empty() {
            return Ok(Vec::new());
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(DispatchError::Runtime)?;

        let recorder = self.recorder;

        runtime.block_on(async {
            let fetcher = Arc::new(self.fetcher.to_async()?);

            let handles: Vec<_> = urls
                .iter()
                .map(|url| {
                    let fetcher = Arc::clone(&fetcher);
                    let url = url.clone();
                    tokio::spawn(async move {
                        recorder.record_async(&url, fetcher.fetch(&url)).await
                    })
                })
                .collect();

            tracing::debug!("Spawned {} fetch tasks", handles.len());

            let mut results = Vec::with_capacity(handles.len());
            for (url, handle) in urls.iter().zip(handles) {
                match handle.await {
                    Ok(record) => results.push(record),
                    Err(e) => {
                        tracing::error!("Task join error: {}", e);
                        results.push(recorder.lost(url, &format!("fetch task aborted: {}", e)));
                    }
                }
            }

            Ok::<_, DispatchError>(results)
        })
    }
}
