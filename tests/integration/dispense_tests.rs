//! Integration tests for the token → send → poll → outcome pipeline.
//!
//! Run on the host against the fake bus in `mock_bus`; no I2C hardware
//! required.

use std::sync::Arc;
use std::time::Duration;

use sweetrivia_dispenser::adapters::time::TokioDelay;
use sweetrivia_dispenser::app::events::DispenseEvent;
use sweetrivia_dispenser::app::service::{AttemptPhase, Delivery, DispenseOutcome, DispenseService};
use sweetrivia_dispenser::config::DispenserConfig;
use sweetrivia_dispenser::error::TransportFault;
use sweetrivia_dispenser::protocol::CandySelection;
use sweetrivia_dispenser::retry::RetryPolicy;

use super::mock_bus::{Call, FakeDelay, FakeTransport, RecordingSink, SharedLog, new_log};

const POLL: Duration = Duration::from_millis(100);

fn service(
    transport: FakeTransport,
    log: &SharedLog,
) -> (DispenseService<FakeTransport, FakeDelay>, RecordingSink) {
    let sink = RecordingSink::new();
    let svc = DispenseService::new(
        transport,
        FakeDelay::new(log),
        DispenserConfig::default().retry_policy(),
        Box::new(sink.clone()),
    );
    (svc, sink)
}

// ── Token mapping ─────────────────────────────────────────────

#[tokio::test]
async fn each_valid_token_sends_its_code_once() {
    for (token, code) in [("circle", 1), ("triangle", 2), ("square", 3), ("star", 4)] {
        let log = new_log();
        let (svc, _) = service(FakeTransport::new(&log).answering([0xAA]), &log);

        let outcome = svc.dispense(token).await;

        assert!(outcome.is_acknowledged(), "{token}: {outcome:?}");
        assert_eq!(
            log.lock().unwrap().calls,
            vec![
                Call::Acquire,
                Call::Send(code),
                Call::Delay(POLL),
                Call::Poll,
                Call::Release
            ],
            "{token}"
        );
    }
}

#[tokio::test]
async fn unmapped_token_never_touches_the_bus() {
    for token in ["hexagon", "", "STAR", "star ", "4"] {
        let log = new_log();
        let (svc, sink) = service(FakeTransport::new(&log).answering([0xAA]), &log);

        let outcome = svc.dispense(token).await;

        assert_eq!(
            outcome,
            DispenseOutcome::InvalidSelection {
                token: token.to_string()
            }
        );
        assert_eq!(outcome.delivery(), Delivery::NotDispensed);
        assert!(log.lock().unwrap().calls.is_empty(), "{token}");
        assert_eq!(
            sink.snapshot().first(),
            Some(&DispenseEvent::Rejected {
                token: token.to_string()
            })
        );
    }
}

// ── Poll loop ─────────────────────────────────────────────────

#[tokio::test]
async fn ack_on_nth_poll_stops_after_exactly_n_polls() {
    for n in 1..=20usize {
        let log = new_log();
        let mut script = vec![0x00; n - 1];
        script.push(0xAA);
        let (svc, _) = service(FakeTransport::new(&log).answering(script), &log);

        let outcome = svc.dispense("circle").await;

        assert_eq!(
            outcome,
            DispenseOutcome::Acknowledged {
                selection: CandySelection::Circle,
                polls: n as u32
            }
        );
        let log = log.lock().unwrap();
        assert_eq!(log.polls(), n);
        // every poll is immediately preceded by one poll-interval delay
        let between: Vec<_> = log.calls[2..log.calls.len() - 1].to_vec();
        for pair in between.chunks(2) {
            assert_eq!(pair, [Call::Delay(POLL), Call::Poll]);
        }
    }
}

#[tokio::test]
async fn never_acked_times_out_after_exactly_twenty_polls() {
    let log = new_log();
    let (svc, _) = service(FakeTransport::new(&log), &log);

    let outcome = svc.dispense("triangle").await;

    assert_eq!(
        outcome,
        DispenseOutcome::TimedOut {
            selection: CandySelection::Triangle,
            polls: 20
        }
    );
    assert_eq!(outcome.delivery(), Delivery::Uncertain);
    let log = log.lock().unwrap();
    assert_eq!(log.polls(), 20);
    assert_eq!(log.releases(), 1);
    assert_eq!(log.calls.last(), Some(&Call::Release));
}

#[tokio::test]
async fn echoed_code_and_garbage_do_not_end_the_loop() {
    let log = new_log();
    let mut script = vec![0x04, 0x04, 0xFF, 0x55, 0xAB, 0xA9];
    script.resize(20, 0x04);
    let (svc, _) = service(FakeTransport::new(&log).answering(script), &log);

    let outcome = svc.dispense("star").await;

    assert!(matches!(outcome, DispenseOutcome::TimedOut { polls: 20, .. }));
}

#[tokio::test]
async fn star_round_trip_acknowledges_on_third_poll() {
    let log = new_log();
    let (svc, sink) = service(
        FakeTransport::new(&log).answering([0x00, 0x00, 0xAA]),
        &log,
    );

    let outcome = svc.dispense("star").await;

    assert_eq!(
        outcome,
        DispenseOutcome::Acknowledged {
            selection: CandySelection::Star,
            polls: 3
        }
    );
    let log = log.lock().unwrap();
    assert_eq!(log.sends(), vec![4]);
    assert_eq!(log.polls(), 3);
    assert_eq!(log.count(|c| matches!(c, Call::Delay(_))), 3);

    let events = sink.snapshot();
    let phases: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            DispenseEvent::PhaseChanged { to, .. } => Some(*to),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            AttemptPhase::Sending,
            AttemptPhase::Polling,
            AttemptPhase::Acknowledged
        ]
    );
    assert_eq!(events.last(), Some(&DispenseEvent::Finished(outcome)));
}

#[tokio::test(start_paused = true)]
async fn star_round_trip_takes_three_poll_intervals_of_simulated_time() {
    let log = new_log();
    let svc = DispenseService::new(
        FakeTransport::new(&log).answering([0x00, 0x00, 0xAA]),
        TokioDelay,
        DispenserConfig::default().retry_policy(),
        Box::new(RecordingSink::new()),
    );
    let start = tokio::time::Instant::now();

    let outcome = svc.dispense("star").await;

    assert!(outcome.is_acknowledged());
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(300), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(400), "{elapsed:?}");
}

#[tokio::test]
async fn custom_budget_is_honoured() {
    let log = new_log();
    let svc = DispenseService::new(
        FakeTransport::new(&log),
        FakeDelay::new(&log),
        RetryPolicy::new(5, Duration::from_millis(10)),
        Box::new(RecordingSink::new()),
    );

    assert_eq!(svc.policy().budget(), Duration::from_millis(50));

    let outcome = svc.dispense("square").await;

    assert!(matches!(outcome, DispenseOutcome::TimedOut { polls: 5, .. }));
    let log = log.lock().unwrap();
    assert_eq!(log.polls(), 5);
    assert!(log.calls.contains(&Call::Delay(Duration::from_millis(10))));
}

// ── Faults & release discipline ───────────────────────────────

#[tokio::test]
async fn unavailable_bus_sends_nothing() {
    let log = new_log();
    let (svc, _) = service(FakeTransport::new(&log).failing_acquire(), &log);

    let outcome = svc.dispense("circle").await;

    assert!(matches!(
        outcome,
        DispenseOutcome::TransportUnavailable {
            selection: CandySelection::Circle,
            ..
        }
    ));
    assert_eq!(outcome.delivery(), Delivery::NotDispensed);
    assert!(log.lock().unwrap().calls.is_empty());
}

#[tokio::test]
async fn write_failure_aborts_and_releases_once() {
    let log = new_log();
    let (svc, sink) = service(FakeTransport::new(&log).failing_send(), &log);

    let outcome = svc.dispense("square").await;

    assert!(matches!(outcome, DispenseOutcome::TransportError { .. }));
    assert_eq!(outcome.delivery(), Delivery::Uncertain);
    assert_eq!(
        log.lock().unwrap().calls,
        vec![Call::Acquire, Call::Send(3), Call::Release]
    );
    assert!(sink.snapshot().contains(&DispenseEvent::PhaseChanged {
        from: AttemptPhase::Sending,
        to: AttemptPhase::Faulted
    }));
}

#[tokio::test]
async fn read_faults_count_as_not_ready() {
    let log = new_log();
    let (svc, sink) = service(
        FakeTransport::new(&log).answering_results(vec![
            Err(TransportFault::Read("Bus".into())),
            Err(TransportFault::Read("Bus".into())),
            Ok(0xAA),
        ]),
        &log,
    );

    let outcome = svc.dispense("triangle").await;

    assert!(matches!(outcome, DispenseOutcome::Acknowledged { polls: 3, .. }));
    assert_eq!(log.lock().unwrap().releases(), 1);
    let failed = sink
        .snapshot()
        .iter()
        .filter(|e| matches!(e, DispenseEvent::PollFailed { .. }))
        .count();
    assert_eq!(failed, 2);
}

#[tokio::test]
async fn persistent_read_faults_time_out() {
    let log = new_log();
    let faults = (0..20)
        .map(|_| Err(TransportFault::Read("ArbitrationLoss".into())))
        .collect();
    let (svc, _) = service(FakeTransport::new(&log).answering_results(faults), &log);

    let outcome = svc.dispense("circle").await;

    assert!(matches!(outcome, DispenseOutcome::TimedOut { polls: 20, .. }));
    let log = log.lock().unwrap();
    assert_eq!(log.polls(), 20);
    assert_eq!(log.releases(), 1);
}

#[tokio::test]
async fn panic_mid_poll_still_releases_the_bus() {
    let log = new_log();
    let (svc, _) = service(FakeTransport::new(&log).panicking_on_poll(2), &log);
    let svc = Arc::new(svc);

    let task = {
        let svc = Arc::clone(&svc);
        tokio::spawn(async move { svc.dispense("star").await })
    };
    assert!(task.await.is_err(), "injected panic should surface as JoinError");

    let log_guard = log.lock().unwrap();
    assert_eq!(log_guard.acquires(), 1);
    assert_eq!(log_guard.releases(), 1);
    drop(log_guard);

    // The lock was released on unwind: the next request goes through.
    assert!(!svc.is_busy());
}

#[tokio::test]
async fn release_exactly_once_per_successful_acquire() {
    let cases: [fn(&SharedLog) -> FakeTransport; 4] = [
        |log| FakeTransport::new(log).answering([0xAA]),
        |log| FakeTransport::new(log),
        |log| FakeTransport::new(log).failing_send(),
        |log| {
            FakeTransport::new(log).answering_results(vec![Err(TransportFault::Read("x".into()))])
        },
    ];
    for build in cases {
        let log = new_log();
        let (svc, _) = service(build(&log), &log);
        svc.dispense("circle").await;
        let log = log.lock().unwrap();
        assert_eq!(log.acquires(), 1);
        assert_eq!(log.releases(), 1);
    }
}

// ── Serialization ─────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_dispenses_never_overlap_on_the_bus() {
    let log = new_log();
    let svc = Arc::new(DispenseService::new(
        FakeTransport::new(&log).answering([0x00, 0x00, 0xAA]),
        FakeDelay::yielding(&log),
        DispenserConfig::default().retry_policy(),
        Box::new(RecordingSink::new()),
    ));

    let tokens = ["circle", "triangle", "square", "star"];
    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let svc = Arc::clone(&svc);
            let token = tokens[i % tokens.len()];
            tokio::spawn(async move { svc.dispense(token).await })
        })
        .collect();

    for task in tasks {
        assert!(task.await.unwrap().is_acknowledged());
    }

    let log = log.lock().unwrap();
    assert_eq!(log.overlaps, 0);
    assert_eq!(log.acquires(), 16);
    assert_eq!(log.releases(), 16);

    // acquire/release strictly alternate
    let spans: Vec<_> = log
        .calls
        .iter()
        .filter(|c| matches!(c, Call::Acquire | Call::Release))
        .collect();
    for pair in spans.chunks(2) {
        assert_eq!(pair, [&Call::Acquire, &Call::Release]);
    }
}
