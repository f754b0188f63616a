use super::*;
use std::time::Duration;

#[tokio::test]
async fn alive_reports_the_current_process_as_alive() {
    let pid = std::process::id() as i32;
    assert!(alive(pid).await.is_ok());
}

#[tokio::test]
async fn alive_reports_a_pid_not_in_use_as_dead() {
    // A PID this high is exceedingly unlikely to be in use; null-signal
    // liveness is documented to accept the recycled-PID false positive,
    // not the "no such process" case this test covers.
    let improbable_pid = i32::MAX - 1;
    assert!(matches!(alive(improbable_pid).await, Err(ProbeError::NotAlive(_))));
}

#[tokio::test]
async fn tcp_listening_times_out_against_an_unroutable_address() {
    // TEST-NET-3, RFC 5737: guaranteed non-routable, connect will hang
    // rather than refuse, so the timeout path is what actually fires.
    let result = tcp_listening("203.0.113.1:81", Duration::from_millis(50)).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn tcp_listening_succeeds_against_a_local_listener() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = listener.accept().await;
    });
    let result = tcp_listening(&addr.to_string(), Duration::from_millis(500)).await;
    assert!(result.is_ok());
}

#[test]
fn uptime_at_least_fails_before_minimum_elapsed() {
    let start = Instant::now();
    let now = start + Duration::from_secs(1);
    let result = uptime_at_least(start, now, Duration::from_secs(10));
    assert!(matches!(result, Err(ProbeError::UptimeTooLow { .. })));
}

#[test]
fn uptime_at_least_passes_once_minimum_elapsed() {
    let start = Instant::now();
    let now = start + Duration::from_secs(11);
    assert!(uptime_at_least(start, now, Duration::from_secs(10)).is_ok());
}

proptest::proptest! {
    /// For any elapsed/minimum pair, the check passes iff elapsed is at
    /// least the minimum.
    #[test]
    fn uptime_at_least_matches_elapsed_geq_min_for_arbitrary_durations(
        elapsed_ms in 0u64..1_000_000,
        min_ms in 0u64..1_000_000,
    ) {
        let start = Instant::now();
        let now = start + Duration::from_millis(elapsed_ms);
        let min = Duration::from_millis(min_ms);
        proptest::prop_assert_eq!(uptime_at_least(start, now, min).is_ok(), elapsed_ms >= min_ms);
    }
}

#[yare::parameterized(
    well_short = { Duration::from_secs(1), Duration::from_secs(10), false },
    exactly_at_minimum = { Duration::from_secs(10), Duration::from_secs(10), true },
    well_past = { Duration::from_secs(30), Duration::from_secs(10), true },
    zero_minimum_always_passes = { Duration::from_secs(0), Duration::from_secs(0), true },
)]
fn uptime_at_least_matches_the_elapsed_vs_minimum_boundary(elapsed: Duration, min: Duration, expected_ok: bool) {
    let start = Instant::now();
    let now = start + elapsed;
    assert_eq!(uptime_at_least(start, now, min).is_ok(), expected_ok);
}

#[tokio::test]
async fn all_short_circuits_on_first_failure() {
    let checks: Vec<ProbeFuture<'_>> = vec![
        Box::pin(async { Ok(()) }),
        Box::pin(async { Err(ProbeError::NotAlive(1)) }),
        Box::pin(async {
            panic!("must not run: `all` should short-circuit before this check")
        }),
    ];
    let result = all(checks).await;
    assert!(matches!(result, Err(ProbeError::NotAlive(1))));
}

#[tokio::test]
async fn all_passes_when_every_check_passes() {
    let checks: Vec<ProbeFuture<'_>> = vec![Box::pin(async { Ok(()) }), Box::pin(async { Ok(()) })];
    assert!(all(checks).await.is_ok());
}
