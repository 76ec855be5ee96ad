//! Batch dispatch behavior across all three strategies

use crate::support::{test_config, test_dispatcher, StubServer};
use batch_fetch::config::TimingPolicy;
use batch_fetch::fetcher::{completion_timestamp, FetchOutcome};
use batch_fetch::{ConfigError, DispatchError, Dispatcher, StrategyKind};
use std::time::Duration;
use tempfile::tempdir;

fn urls(server: &StubServer, routes: &[&str]) -> Vec<String> {
    routes.iter().map(|route| server.url(route)).collect()
}

/// A URL on a port nothing listens on
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}/gone.jpg", port)
}

#[test]
fn test_mixed_batch_every_strategy() {
    let server = StubServer::start();
    server.serve("/a.jpg", b"image-a");
    server.serve_status("/missing.jpg", 404);
    server.serve("/b.jpg", b"image-b");

    let batch = urls(&server, &["/a.jpg", "/missing.jpg", "/b.jpg"]);

    for kind in StrategyKind::ALL {
        let dir = tempdir().unwrap();
        let dispatcher = test_dispatcher(dir.path());

        let report = dispatcher.dispatch(&batch, kind).expect("Dispatch failed");

        assert_eq!(report.strategy, kind);
        assert_eq!(report.results.len(), 3, "{}", kind);
        assert_eq!(
            report.results[0].outcome,
            FetchOutcome::Success {
                filename: "a.jpg".to_string()
            },
            "{}",
            kind
        );
        match &report.results[1].outcome {
            FetchOutcome::Failure { message } => {
                assert!(message.starts_with("HTTP 404"), "{}: {}", kind, message)
            }
            other => panic!("{}: expected failure, got {:?}", kind, other),
        }
        assert_eq!(
            report.results[2].outcome,
            FetchOutcome::Success {
                filename: "b.jpg".to_string()
            },
            "{}",
            kind
        );

        assert_eq!(std::fs::read(dir.path().join("a.jpg")).unwrap(), b"image-a");
        assert_eq!(std::fs::read(dir.path().join("b.jpg")).unwrap(), b"image-b");
        assert!(!dir.path().join("missing.jpg").exists());
    }
}

#[test]
fn test_order_preserved_when_completion_order_is_reversed() {
    let server = StubServer::start();
    let routes: Vec<String> = (0..6).map(|i| format!("/{}.bin", i)).collect();
    for (i, route) in routes.iter().enumerate() {
        // Earlier URLs answer later
        let delay = Duration::from_millis(40 * (6 - i as u64));
        server.serve_delayed(route, route.as_bytes(), delay);
    }
    let batch: Vec<String> = routes.iter().map(|r| server.url(r)).collect();

    for kind in StrategyKind::ALL {
        let dir = tempdir().unwrap();
        let report = test_dispatcher(dir.path()).dispatch(&batch, kind).unwrap();

        assert_eq!(report.results.len(), batch.len());
        for (i, (url, record)) in batch.iter().zip(&report.results).enumerate() {
            assert_eq!(&record.url, url, "{}", kind);
            assert_eq!(record.outcome.label(), format!("{}.bin", i), "{}", kind);
        }
    }
}

#[test]
fn test_strategies_agree_on_outcomes() {
    let server = StubServer::start();
    server.serve("/one.txt", b"1");
    server.serve_status("/teapot.txt", 418);
    server.serve_status("/broken.txt", 500);
    server.serve("/two.txt", b"2");

    let mut batch = urls(&server, &["/one.txt", "/teapot.txt", "/broken.txt", "/two.txt"]);
    batch.push("not a url".to_string());
    batch.push(server.url("/"));

    let dir = tempdir().unwrap();
    let reports = test_dispatcher(dir.path()).compare(&batch).unwrap();

    assert_eq!(reports.len(), 3);
    let baseline = reports[0].outcomes();
    for report in &reports[1..] {
        assert_eq!(report.outcomes(), baseline, "{} disagrees", report.strategy);
    }
    assert_eq!(reports[0].successes(), 2);
    assert_eq!(reports[0].failures(), 4);
}

#[test]
fn test_single_failure_is_isolated() {
    let server = StubServer::start();
    let routes = ["/p1.png", "/p2.png", "/p3.png", "/p4.png"];
    for route in routes {
        server.serve(route, route.as_bytes());
    }

    let mut batch = urls(&server, &routes);
    batch.insert(2, closed_port_url());

    for kind in StrategyKind::ALL {
        let dir = tempdir().unwrap();
        let report = test_dispatcher(dir.path()).dispatch(&batch, kind).unwrap();

        assert_eq!(report.results.len(), 5, "{}", kind);
        assert_eq!(report.failures(), 1, "{}", kind);
        assert_eq!(report.successes(), 4, "{}", kind);
        assert!(!report.results[2].is_success(), "{}", kind);
        assert!(
            report.results[2]
                .outcome
                .label()
                .starts_with("Request to http://127.0.0.1"),
            "{}: {}",
            kind,
            report.results[2].outcome.label()
        );
    }
}

#[test]
fn test_empty_batch_makes_no_requests() {
    let server = StubServer::start();
    let dir = tempdir().unwrap();
    let dispatcher = test_dispatcher(dir.path());

    for kind in StrategyKind::ALL {
        let report = dispatcher.dispatch(&[], kind).unwrap();
        assert!(report.results.is_empty());
        assert!(report.total_time >= 0.0);
    }
    assert_eq!(server.request_count(), 0);
}

#[test]
fn test_unknown_strategy_fails_before_any_request() {
    let server = StubServer::start();
    server.serve("/a.jpg", b"a");
    let batch = urls(&server, &["/a.jpg"]);

    let dir = tempdir().unwrap();
    let result = test_dispatcher(dir.path()).dispatch_named(&batch, "fibers");

    assert!(matches!(
        result,
        Err(DispatchError::Config(ConfigError::UnknownStrategy(_)))
    ));
    assert_eq!(server.request_count(), 0);
    assert!(!dir.path().join("a.jpg").exists());
}

#[test]
fn test_compare_missing_worker_fails_before_any_request() {
    let server = StubServer::start();
    server.serve("/a.jpg", b"a");
    let batch = urls(&server, &["/a.jpg"]);

    let dir = tempdir().unwrap();
    let mut config = test_config(dir.path(), TimingPolicy::Elapsed);
    config.pool.worker_program = Some("/nonexistent/batch-fetch-worker".into());
    let dispatcher = Dispatcher::new(config).unwrap();

    let result = dispatcher.compare(&batch);

    assert!(matches!(
        result,
        Err(DispatchError::Config(ConfigError::MissingWorker(_)))
    ));
    assert_eq!(server.request_count(), 0);
    assert!(!dir.path().join("a.jpg").exists());
}

#[test]
fn test_dispatch_named_accepts_cli_names() {
    let server = StubServer::start();
    server.serve("/a.jpg", b"a");
    let batch = urls(&server, &["/a.jpg"]);
    let dir = tempdir().unwrap();
    let dispatcher = test_dispatcher(dir.path());

    for name in ["threading", "multiprocessing", "asyncio"] {
        let report = dispatcher.dispatch_named(&batch, name).unwrap();
        assert_eq!(report.strategy.cli_name(), name);
        assert_eq!(report.successes(), 1);
    }
    assert_eq!(server.request_count(), 3);
}

#[test]
fn test_rerun_overwrites_files() {
    let server = StubServer::start();
    server.serve("/data.csv", b"a,b\n1,2\n");
    let batch = urls(&server, &["/data.csv"]);

    for kind in StrategyKind::ALL {
        let dir = tempdir().unwrap();
        let target = dir.path().join("data.csv");
        std::fs::write(&target, b"stale content that is longer than the body").unwrap();

        let dispatcher = test_dispatcher(dir.path());
        for _ in 0..2 {
            let report = dispatcher.dispatch(&batch, kind).unwrap();
            assert_eq!(report.successes(), 1, "{}", kind);
            assert_eq!(std::fs::read(&target).unwrap(), b"a,b\n1,2\n", "{}", kind);
        }
    }
}

#[test]
fn test_basename_collision_last_write_wins() {
    let server = StubServer::start();
    server.serve("/x/pic.jpg", b"from-x");
    server.serve("/y/pic.jpg", b"from-y");
    let batch = urls(&server, &["/x/pic.jpg", "/y/pic.jpg"]);

    for kind in StrategyKind::ALL {
        let dir = tempdir().unwrap();
        let report = test_dispatcher(dir.path()).dispatch(&batch, kind).unwrap();

        assert_eq!(report.successes(), 2, "{}", kind);
        assert!(report.results.iter().all(|r| r.outcome.label() == "pic.jpg"));

        let content = std::fs::read(dir.path().join("pic.jpg")).unwrap();
        assert!(
            content == b"from-x" || content == b"from-y",
            "{}: unexpected content {:?}",
            kind,
            content
        );
    }
}

#[test]
fn test_total_time_covers_slowest_item() {
    let server = StubServer::start();
    server.serve_delayed("/slow.dat", b"slow", Duration::from_millis(250));
    server.serve_delayed("/medium.dat", b"medium", Duration::from_millis(100));
    server.serve("/fast.dat", b"fast");
    let batch = urls(&server, &["/slow.dat", "/medium.dat", "/fast.dat"]);

    for kind in [StrategyKind::ThreadPool, StrategyKind::EventLoop] {
        let dir = tempdir().unwrap();
        let report = test_dispatcher(dir.path()).dispatch(&batch, kind).unwrap();

        let slowest = report
            .results
            .iter()
            .map(|r| r.timing)
            .fold(0.0_f64, f64::max);
        assert!(slowest >= 0.25, "{}: slowest item took {}", kind, slowest);
        assert!(
            report.total_time >= slowest,
            "{}: total {} < slowest {}",
            kind,
            report.total_time,
            slowest
        );
    }
}

#[test]
fn test_event_loop_overlaps_waits() {
    let server = StubServer::start();
    let routes: Vec<String> = (0..8).map(|i| format!("/wait{}.bin", i)).collect();
    for route in &routes {
        server.serve_delayed(route, b"x", Duration::from_millis(300));
    }
    let batch: Vec<String> = routes.iter().map(|r| server.url(r)).collect();

    let dir = tempdir().unwrap();
    let report = test_dispatcher(dir.path())
        .dispatch(&batch, StrategyKind::EventLoop)
        .unwrap();

    assert_eq!(report.successes(), 8);
    // Sequential would take 2.4s
    assert!(report.total_time < 1.5, "took {}", report.total_time);
}

#[test]
fn test_completed_at_timing_every_strategy() {
    let server = StubServer::start();
    server.serve("/a.jpg", b"a");
    server.serve_status("/nope.jpg", 404);
    let batch = urls(&server, &["/a.jpg", "/nope.jpg"]);

    for kind in StrategyKind::ALL {
        let dir = tempdir().unwrap();
        let dispatcher =
            Dispatcher::new(test_config(dir.path(), TimingPolicy::CompletedAt)).unwrap();

        let before = completion_timestamp();
        let report = dispatcher.dispatch(&batch, kind).unwrap();
        let after = completion_timestamp();

        for record in &report.results {
            assert!(
                record.timing >= before && record.timing <= after,
                "{}: {} not within [{}, {}]",
                kind,
                record.timing,
                before,
                after
            );
        }
        // Batch total stays a duration
        assert!(report.total_time < after - before + 1.0);
    }
}

#[test]
fn test_write_failure_is_a_per_item_failure() {
    let server = StubServer::start();
    server.serve("/a.jpg", b"a");
    server.serve("/b.jpg", b"b");
    let batch = urls(&server, &["/a.jpg", "/b.jpg"]);

    let dir = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");

    for kind in StrategyKind::ALL {
        let dispatcher = test_dispatcher(&missing);
        let report = dispatcher.dispatch(&batch, kind).unwrap();

        assert_eq!(report.results.len(), 2);
        for record in &report.results {
            assert!(
                record.outcome.label().starts_with("Failed to write"),
                "{}: {}",
                kind,
                record.outcome.label()
            );
        }
    }
}

/// No timeout is applied: a slow server holds its unit (and the batch) until it answers.
/// A server that never answers would block dispatch forever.
#[test]
fn test_slow_response_is_awaited_without_timeout() {
    let server = StubServer::start();
    server.serve_delayed("/late.jpg", b"late", Duration::from_millis(600));
    let batch = urls(&server, &["/late.jpg"]);

    for kind in StrategyKind::ALL {
        let dir = tempdir().unwrap();
        let report = test_dispatcher(dir.path()).dispatch(&batch, kind).unwrap();

        assert_eq!(report.successes(), 1, "{}", kind);
        assert!(report.total_time >= 0.6, "{}: {}", kind, report.total_time);
    }
}
