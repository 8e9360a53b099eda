//! Unit tests for the polling loop and its terminal outcomes.

use std::time::Duration;

use rstest::{fixture, rstest};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use super::*;
use crate::domain::State;
use crate::test_support::{ScriptedError, ScriptedFetch, ScriptedSource};

const TARGET: &str = "dc-1/vol-1";

fn present(state: State) -> ScriptedFetch<State> {
    Ok(Observation::Present(state))
}

fn transient() -> ScriptedFetch<State> {
    Err(FetchError::Transient(ScriptedError(String::from("connection reset"))))
}

fn is_available(observation: &Observation<State>) -> bool {
    observation.present() == Some(&State::Available)
}

fn config(timeout_secs: u64, poll_secs: u64) -> WaitConfig {
    WaitConfig::new(
        Duration::from_secs(timeout_secs),
        Duration::from_secs(poll_secs),
    )
    .unwrap_or_else(|err| panic!("test config should be valid: {err}"))
}

#[fixture]
fn target() -> String {
    String::from(TARGET)
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn satisfied_on_first_fetch_without_sleeping(target: String) {
    let source = ScriptedSource::new([present(State::Available)]);

    let outcome = Waiter::new(config(30, 5))
        .wait_until(&source, &target, is_available)
        .await;

    let WaitOutcome::Satisfied(report) = outcome else {
        panic!("expected Satisfied, got {outcome:?}");
    };
    assert_eq!(report.attempts, 1);
    assert_eq!(report.elapsed, Duration::ZERO);
    assert_eq!(source.fetches(), 1);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn busy_twice_then_available_is_satisfied_at_ten_seconds(target: String) {
    let source = ScriptedSource::new([
        present(State::Busy),
        present(State::Busy),
        present(State::Available),
    ]);

    let outcome = Waiter::new(config(30, 5))
        .wait_until(&source, &target, is_available)
        .await;

    let WaitOutcome::Satisfied(report) = outcome else {
        panic!("expected Satisfied, got {outcome:?}");
    };
    assert_eq!(report.attempts, 3);
    assert!(
        report.elapsed >= Duration::from_secs(10) && report.elapsed < Duration::from_secs(11),
        "expected ~10s, got {:?}",
        report.elapsed
    );
}

#[rstest]
#[case(30, 5)]
#[case(30, 7)]
#[case(10, 3)]
#[case(1, 1)]
#[tokio::test(start_paused = true)]
async fn never_satisfied_times_out_within_one_interval_of_deadline(
    target: String,
    #[case] timeout_secs: u64,
    #[case] poll_secs: u64,
) {
    let source = ScriptedSource::new([present(State::Busy)]);
    let timeout = Duration::from_secs(timeout_secs);
    let poll = Duration::from_secs(poll_secs);

    let outcome = Waiter::new(config(timeout_secs, poll_secs))
        .wait_until(&source, &target, is_available)
        .await;

    let WaitOutcome::TimedOut(report) = outcome else {
        panic!("expected TimedOut, got {outcome:?}");
    };
    assert!(
        report.elapsed >= timeout && report.elapsed < timeout + poll,
        "elapsed {:?} outside [{timeout:?}, {:?})",
        report.elapsed,
        timeout + poll
    );
    assert_eq!(report.attempts, source.fetches());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn zero_timeout_fetches_exactly_once(target: String) {
    let source = ScriptedSource::new([present(State::Busy)]);

    let outcome = Waiter::new(config(0, 5))
        .wait_until(&source, &target, is_available)
        .await;

    assert!(matches!(outcome, WaitOutcome::TimedOut(_)), "got {outcome:?}");
    assert_eq!(source.fetches(), 1);
    assert_eq!(outcome.report().elapsed, Duration::ZERO);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn zero_timeout_still_reports_success(target: String) {
    let source = ScriptedSource::new([present(State::Available)]);

    let outcome = Waiter::new(config(0, 5))
        .wait_until(&source, &target, is_available)
        .await;

    assert!(outcome.is_satisfied(), "got {outcome:?}");
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn poll_interval_beyond_timeout_degenerates_to_single_attempt(target: String) {
    let source = ScriptedSource::new([present(State::Busy)]);

    let outcome = Waiter::new(config(5, 10))
        .wait_until(&source, &target, is_available)
        .await;

    assert!(matches!(outcome, WaitOutcome::TimedOut(_)), "got {outcome:?}");
    assert_eq!(source.fetches(), 1);
    assert!(outcome.report().elapsed < Duration::from_secs(10));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn cancelled_before_first_fetch_performs_no_fetch(target: String) {
    let source = ScriptedSource::new([present(State::Available)]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = Waiter::new(config(30, 5))
        .with_cancellation(cancel)
        .wait_until(&source, &target, is_available)
        .await;

    assert_eq!(
        outcome,
        WaitOutcome::Cancelled(WaitReport {
            attempts: 0,
            elapsed: Duration::ZERO,
        })
    );
    assert_eq!(source.fetches(), 0);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_sleep_promptly(target: String) {
    let source = ScriptedSource::new([present(State::Busy)]);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        sleep(Duration::from_secs(2)).await;
        trigger.cancel();
    });

    let outcome = Waiter::new(config(600, 60))
        .with_cancellation(cancel)
        .wait_until(&source, &target, is_available)
        .await;

    let WaitOutcome::Cancelled(report) = outcome else {
        panic!("expected Cancelled, got {outcome:?}");
    };
    assert_eq!(report.attempts, 1);
    assert!(
        report.elapsed < Duration::from_secs(60),
        "cancellation should not wait for the full interval: {:?}",
        report.elapsed
    );
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn token_cancelled_during_attempt_wins_over_sleep(target: String) {
    let source = ScriptedSource::new([present(State::Busy)]);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();

    let outcome = Waiter::new(config(30, 5))
        .with_cancellation(cancel)
        .wait_until(&source, &target, |observation| {
            trigger.cancel();
            is_available(observation)
        })
        .await;

    assert_eq!(
        outcome,
        WaitOutcome::Cancelled(WaitReport {
            attempts: 1,
            elapsed: Duration::ZERO,
        })
    );
    assert_eq!(source.fetches(), 1);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn overflowing_timeout_polls_without_deadline(target: String) {
    let source = ScriptedSource::new([
        present(State::Busy),
        present(State::Busy),
        present(State::Busy),
        present(State::Available),
    ]);
    let unbounded = WaitConfig::new(Duration::MAX, Duration::from_secs(5))
        .unwrap_or_else(|err| panic!("test config should be valid: {err}"));

    let outcome = Waiter::new(unbounded)
        .wait_until(&source, &target, is_available)
        .await;

    let WaitOutcome::Satisfied(report) = outcome else {
        panic!("expected Satisfied, got {outcome:?}");
    };
    assert_eq!(report.attempts, 4);
    assert!(
        report.elapsed >= Duration::from_secs(15) && report.elapsed < Duration::from_secs(16),
        "expected ~15s, got {:?}",
        report.elapsed
    );
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn absent_resource_satisfies_deletion_predicate(target: String) {
    let source = ScriptedSource::<State>::new([
        present(State::Busy),
        Ok(Observation::Absent),
    ]);

    let outcome = Waiter::new(config(30, 5))
        .wait_until(&source, &target, Observation::is_absent)
        .await;

    let WaitOutcome::Satisfied(report) = outcome else {
        panic!("expected Satisfied, got {outcome:?}");
    };
    assert_eq!(report.attempts, 2);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn permanent_fetch_error_fails_immediately(target: String) {
    let source = ScriptedSource::new([Err(FetchError::Permanent(ScriptedError(String::from(
        "unknown resource type",
    ))))]);

    let outcome = Waiter::new(config(300, 5))
        .wait_until(&source, &target, is_available)
        .await;

    let WaitOutcome::FetchFailed { error, report } = outcome else {
        panic!("expected FetchFailed, got {outcome:?}");
    };
    assert_eq!(error, ScriptedError(String::from("unknown resource type")));
    assert_eq!(report.attempts, 1);
    assert_eq!(report.elapsed, Duration::ZERO);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn transient_errors_within_bound_are_retried(target: String) {
    let source = ScriptedSource::new([transient(), transient(), present(State::Available)]);

    let outcome = Waiter::new(config(300, 5).with_max_fetch_retries(2))
        .wait_until(&source, &target, is_available)
        .await;

    let WaitOutcome::Satisfied(report) = outcome else {
        panic!("expected Satisfied, got {outcome:?}");
    };
    assert_eq!(report.attempts, 3);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn transient_errors_beyond_bound_escalate_to_fetch_failed(target: String) {
    let source = ScriptedSource::new([transient()]);

    let outcome = Waiter::new(config(300, 5).with_max_fetch_retries(2))
        .wait_until(&source, &target, is_available)
        .await;

    let WaitOutcome::FetchFailed { report, .. } = outcome else {
        panic!("expected FetchFailed, got {outcome:?}");
    };
    assert_eq!(report.attempts, 3);
    assert!(
        report.elapsed >= Duration::from_secs(10) && report.elapsed < Duration::from_secs(15),
        "expected two sleeps before giving up, got {:?}",
        report.elapsed
    );
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn successful_fetch_resets_transient_counter(target: String) {
    let source = ScriptedSource::new([
        transient(),
        present(State::Busy),
        transient(),
        present(State::Available),
    ]);

    let outcome = Waiter::new(config(300, 5).with_max_fetch_retries(1))
        .wait_until(&source, &target, is_available)
        .await;

    let WaitOutcome::Satisfied(report) = outcome else {
        panic!("expected Satisfied, got {outcome:?}");
    };
    assert_eq!(report.attempts, 4);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn predicate_error_propagates_to_caller(target: String) {
    let source = ScriptedSource::new([present(State::Unrecognized)]);

    let result = Waiter::new(config(30, 5))
        .wait(&source, &target, |observation| match observation.present() {
            Some(State::Unrecognized) => Err("unexpected state"),
            _ => Ok(false),
        })
        .await;

    assert_eq!(result, Err("unexpected state"));
    assert_eq!(source.fetches(), 1);
}

#[rstest]
fn into_result_names_action_and_target() {
    let timed_out: WaitOutcome<ScriptedError> = WaitOutcome::TimedOut(WaitReport {
        attempts: 7,
        elapsed: Duration::from_secs(30),
    });

    let err = timed_out
        .into_result("volume available", TARGET)
        .expect_err("timeout is an error");

    assert_eq!(
        err,
        WaitError::Timeout {
            action: String::from("volume available"),
            target: String::from(TARGET),
            attempts: 7,
        }
    );
    assert_eq!(
        err.to_string(),
        "timeout waiting for volume available on dc-1/vol-1 after 7 attempts"
    );
}

#[rstest]
fn into_result_keeps_fetch_failure_distinct_from_timeout() {
    let failed = WaitOutcome::FetchFailed {
        error: ScriptedError(String::from("bad request")),
        report: WaitReport {
            attempts: 1,
            elapsed: Duration::ZERO,
        },
    };

    let err = failed
        .into_result("snapshot removed", TARGET)
        .expect_err("fetch failure is an error");

    let WaitError::FetchFailed { message, .. } = err else {
        panic!("expected a fetch failure, got {err:?}");
    };
    assert!(message.contains("bad request"), "got {message}");
}

#[rstest]
fn zero_poll_interval_is_rejected() {
    let err = WaitConfig::new(Duration::from_secs(30), Duration::ZERO)
        .expect_err("zero poll interval must be rejected");
    assert_eq!(err, WaitConfigError::ZeroPollInterval);
    assert!(err.to_string().contains("SETTLE_POLL_INTERVAL_MS"));
}

#[rstest]
fn default_config_uses_documented_constants() {
    let config = WaitConfig::default();
    assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
    assert_eq!(config.poll_interval(), DEFAULT_POLL_INTERVAL);
    assert_eq!(config.max_fetch_retries(), DEFAULT_MAX_FETCH_RETRIES);
}

#[rstest]
#[case(0, 5_000, 3, true)]
#[case(30_000, 5_000, 0, true)]
#[case(30_000, 0, 3, false)]
fn settings_convert_to_wait_config(
    #[case] timeout_ms: u64,
    #[case] poll_interval_ms: u64,
    #[case] max_fetch_retries: u32,
    #[case] valid: bool,
) {
    let settings = WaitSettings {
        timeout_ms,
        poll_interval_ms,
        max_fetch_retries,
    };

    let result = settings.to_wait_config();

    assert_eq!(result.is_ok(), valid, "unexpected result: {result:?}");
    if let Ok(config) = result {
        assert_eq!(config.timeout(), Duration::from_millis(timeout_ms));
        assert_eq!(config.poll_interval(), Duration::from_millis(poll_interval_ms));
        assert_eq!(config.max_fetch_retries(), max_fetch_retries);
    }
}
