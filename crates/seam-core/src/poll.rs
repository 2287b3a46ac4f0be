//! Polling helpers that turn eventually-consistent backend state into a
//! bounded wait.
//!
//! [`ActionAttemptPoller`] drives an action attempt to a terminal status.
//! [`ConditionalValuePoller`] waits for a field on an already-created
//! resource to be populated. Both poll on a fixed cadence, sleep on the tokio
//! timer between polls, and never retry or reinterpret errors coming from the
//! fetch capability.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::PollConfig;
use crate::error::{Error, Result};
use crate::ids::ActionAttemptId;
use crate::types::{ActionAttempt, ActionAttemptStatus, ResourceError};

/// Default delay between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Default upper bound on the total wait.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(300);

/// Capability to load the latest snapshot of an action attempt.
///
/// The poller owns no transport; implementations perform the actual request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActionAttemptFetcher: Send + Sync {
    /// Fetch the current state of the action attempt `id`.
    ///
    /// # Errors
    ///
    /// Returns the transport error unchanged; the poller propagates it as-is.
    async fn fetch_action_attempt(&self, id: &ActionAttemptId) -> Result<ActionAttempt>;
}

/// Adapter turning a closure into an [`ActionAttemptFetcher`].
pub struct FetchFn<F>(pub F);

#[async_trait]
impl<F, Fut> ActionAttemptFetcher for FetchFn<F>
where
    F: Fn(ActionAttemptId) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ActionAttempt>> + Send + 'static,
{
    async fn fetch_action_attempt(&self, id: &ActionAttemptId) -> Result<ActionAttempt> {
        (self.0)(id.clone()).await
    }
}

/// Options for a single [`ActionAttemptPoller`] run.
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Fixed delay between polls
    pub interval: Duration,
    /// Upper bound on total wait
    pub timeout: Duration,
    /// Raise [`Error::ActionAttemptFailed`] on a terminal error instead of returning the attempt
    pub should_raise: bool,
    /// Treat the `failed` status literal as an alias of `error`
    pub treat_failed_as_error: bool,
    /// Optional cancellation signal checked between polls
    pub cancellation: Option<CancellationToken>,
}

impl PollOptions {
    /// Create options with the default cadence.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
            should_raise: true,
            treat_failed_as_error: true,
            cancellation: None,
        }
    }

    /// Set the delay between polls.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the upper bound on total wait.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Choose whether a terminal error raises.
    #[must_use]
    pub const fn with_should_raise(mut self, should_raise: bool) -> Self {
        self.should_raise = should_raise;
        self
    }

    /// Choose whether `failed` counts as `error`.
    #[must_use]
    pub const fn with_failed_as_error(mut self, enabled: bool) -> Self {
        self.treat_failed_as_error = enabled;
        self
    }

    /// Attach a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&PollConfig> for PollOptions {
    fn from(config: &PollConfig) -> Self {
        Self::new()
            .with_interval(config.interval())
            .with_timeout(config.action_attempt_timeout())
    }
}

enum Outcome {
    Pending,
    Success,
    Failure,
    Unrecognized,
}

/// Polls an action attempt until it resolves.
pub struct ActionAttemptPoller<'a, F: ActionAttemptFetcher + ?Sized> {
    fetcher: &'a F,
    options: PollOptions,
}

impl<'a, F: ActionAttemptFetcher + ?Sized> ActionAttemptPoller<'a, F> {
    /// Create a poller over `fetcher`.
    #[must_use]
    pub fn new(fetcher: &'a F, options: PollOptions) -> Self {
        Self { fetcher, options }
    }

    /// Return the options in use.
    #[must_use]
    pub const fn options(&self) -> &PollOptions {
        &self.options
    }

    fn classify(&self, status: &ActionAttemptStatus) -> Outcome {
        match status {
            ActionAttemptStatus::Pending => Outcome::Pending,
            ActionAttemptStatus::Success => Outcome::Success,
            ActionAttemptStatus::Error => Outcome::Failure,
            ActionAttemptStatus::Failed if self.options.treat_failed_as_error => Outcome::Failure,
            ActionAttemptStatus::Failed | ActionAttemptStatus::Other(_) => Outcome::Unrecognized,
        }
    }

    /// Poll `id` until it leaves `pending`.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] if the attempt is still pending once `timeout` has elapsed
    /// - [`Error::ActionAttemptFailed`] on a terminal error when `should_raise` is set
    /// - [`Error::Cancelled`] if the cancellation token fires
    /// - [`Error::ParseError`] for a status literal that is neither pending nor terminal
    /// - any error returned by the fetcher, unchanged
    pub async fn poll_until_ready(&self, id: &ActionAttemptId) -> Result<ActionAttempt> {
        let started = Instant::now();
        let mut polls: u32 = 0;

        loop {
            ensure_not_cancelled(self.options.cancellation.as_ref(), id.as_str())?;

            let attempt = self.fetcher.fetch_action_attempt(id).await?;
            polls += 1;
            let elapsed = started.elapsed();
            debug!(
                action_attempt_id = %id,
                status = %attempt.status,
                polls,
                elapsed_ms = elapsed.as_millis() as u64,
                "Polled action attempt"
            );

            match self.classify(&attempt.status) {
                Outcome::Pending => {
                    if elapsed >= self.options.timeout {
                        warn!(action_attempt_id = %id, polls, "Action attempt polling timed out");
                        return Err(Error::Timeout {
                            resource_id: id.to_string(),
                            last_status: attempt.status,
                            elapsed,
                            timeout: self.options.timeout,
                        });
                    }
                    pause(
                        self.options.interval,
                        self.options.cancellation.as_ref(),
                        id.as_str(),
                    )
                    .await?;
                }
                Outcome::Success => return Ok(attempt),
                Outcome::Failure => {
                    if self.options.should_raise {
                        return Err(attempt.to_failure());
                    }
                    return Ok(attempt);
                }
                Outcome::Unrecognized => {
                    return Err(Error::ParseError(format!(
                        "Unexpected status `{}` for action attempt {id}",
                        attempt.status
                    )));
                }
            }
        }
    }
}

/// A resource with a field that the backend populates asynchronously.
pub trait Watchable {
    /// Identifier used in error reports.
    fn watch_id(&self) -> &str;

    /// True once the watched field is populated.
    fn has_watched_value(&self) -> bool;

    /// True when the backend marks the resource with the `unknown` status.
    fn is_status_unknown(&self) -> bool;

    /// Error records currently attached to the resource.
    fn watch_errors(&self) -> &[ResourceError];
}

/// Waits for a watched field to become non-empty.
#[derive(Debug, Clone)]
pub struct ConditionalValuePoller {
    interval: Duration,
    timeout: Duration,
    cancellation: Option<CancellationToken>,
}

impl ConditionalValuePoller {
    /// Create a poller with the default cadence.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
            cancellation: None,
        }
    }

    /// Set the delay between refetches.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the upper bound on total wait.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attach a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Wait until `initial` (or a refetched snapshot) carries its watched value.
    ///
    /// Returns immediately, without refetching, when the value is already present.
    ///
    /// # Errors
    ///
    /// - [`Error::ConditionalWaitFailed`] on an `unknown` status, on error records, or on timeout
    /// - [`Error::Cancelled`] if the cancellation token fires
    /// - any error returned by `refetch`, unchanged
    pub async fn wait_for<E, F, Fut>(&self, initial: E, mut refetch: F) -> Result<E>
    where
        E: Watchable,
        F: FnMut(&E) -> Fut,
        Fut: Future<Output = Result<E>>,
    {
        let started = Instant::now();
        let mut current = initial;

        loop {
            if current.has_watched_value() {
                return Ok(current);
            }

            if current.is_status_unknown() {
                return Err(Error::ConditionalWaitFailed {
                    resource_id: current.watch_id().to_string(),
                    reason: "status unknown".to_string(),
                    errors: current.watch_errors().to_vec(),
                });
            }

            let errors = current.watch_errors();
            if !errors.is_empty() {
                return Err(Error::ConditionalWaitFailed {
                    resource_id: current.watch_id().to_string(),
                    reason: format!("resource reported {} error(s)", errors.len()),
                    errors: errors.to_vec(),
                });
            }

            pause(
                self.interval,
                self.cancellation.as_ref(),
                current.watch_id(),
            )
            .await?;

            if started.elapsed() > self.timeout {
                warn!(resource_id = %current.watch_id(), "Gave up waiting for value");
                return Err(Error::ConditionalWaitFailed {
                    resource_id: current.watch_id().to_string(),
                    reason: format!("timed out after {} seconds", self.timeout.as_secs_f64()),
                    errors: current.watch_errors().to_vec(),
                });
            }

            debug!(resource_id = %current.watch_id(), "Refetching watched resource");
            current = refetch(&current).await?;
        }
    }
}

impl Default for ConditionalValuePoller {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&PollConfig> for ConditionalValuePoller {
    fn from(config: &PollConfig) -> Self {
        Self::new()
            .with_interval(config.interval())
            .with_timeout(config.wait_for_code_timeout())
    }
}

fn ensure_not_cancelled(token: Option<&CancellationToken>, resource_id: &str) -> Result<()> {
    match token {
        Some(token) if token.is_cancelled() => Err(Error::Cancelled {
            resource_id: resource_id.to_string(),
        }),
        _ => Ok(()),
    }
}

async fn pause(
    interval: Duration,
    token: Option<&CancellationToken>,
    resource_id: &str,
) -> Result<()> {
    match token {
        Some(token) => {
            tokio::select! {
                biased;
                () = token.cancelled() => Err(Error::Cancelled {
                    resource_id: resource_id.to_string(),
                }),
                () = sleep(interval) => Ok(()),
            }
        }
        None => {
            sleep(interval).await;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::Sequence;
    use serde_json::{json, Map, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio_test::{assert_err, assert_ok};

    const INTERVAL: Duration = Duration::from_millis(250);

    fn scripted(responses: Vec<Result<ActionAttempt>>) -> MockActionAttemptFetcher {
        let mut mock = MockActionAttemptFetcher::new();
        let mut seq = Sequence::new();
        for response in responses {
            mock.expect_fetch_action_attempt()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_| response.clone());
        }
        mock
    }

    fn result_map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn id() -> ActionAttemptId {
        ActionAttemptId::new("aa_1")
    }

    #[tokio::test(start_paused = true)]
    async fn pending_then_success_returns_after_one_sleep() {
        let fetcher = scripted(vec![
            Ok(ActionAttempt::pending("aa_1", "LOCK_DOOR")),
            Ok(ActionAttempt::succeeded("aa_1", "LOCK_DOOR", Map::new())),
        ]);
        let poller = ActionAttemptPoller::new(&fetcher, PollOptions::new().with_interval(INTERVAL));

        let started = Instant::now();
        let attempt = assert_ok!(poller.poll_until_ready(&id()).await);

        assert_eq!(attempt.status, ActionAttemptStatus::Success);
        assert_eq!(started.elapsed(), INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_error_raises_by_default() {
        let fetcher = scripted(vec![Ok(ActionAttempt::failed(
            "aa_1",
            "UNLOCK_DOOR",
            "device_offline",
            "Device is offline",
        ))]);
        let poller = ActionAttemptPoller::new(&fetcher, PollOptions::default());

        let err = poller.poll_until_ready(&id()).await.unwrap_err();
        match err {
            Error::ActionAttemptFailed {
                action_attempt_id,
                action_type,
                error_type,
                message,
            } => {
                assert_eq!(action_attempt_id, "aa_1");
                assert_eq!(action_type, "UNLOCK_DOOR");
                assert_eq!(error_type.as_deref(), Some("device_offline"));
                assert_eq!(message.as_deref(), Some("Device is offline"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_error_returned_as_data_when_not_raising() {
        let fetcher = scripted(vec![Ok(ActionAttempt::failed(
            "aa_1",
            "UNLOCK_DOOR",
            "device_offline",
            "Device is offline",
        ))]);
        let poller =
            ActionAttemptPoller::new(&fetcher, PollOptions::new().with_should_raise(false));

        let attempt = poller.poll_until_ready(&id()).await.unwrap();
        assert_eq!(attempt.status, ActionAttemptStatus::Error);
        assert_eq!(attempt.error.unwrap().error_type, "device_offline");
    }

    #[tokio::test(start_paused = true)]
    async fn always_pending_times_out() {
        let mut fetcher = MockActionAttemptFetcher::new();
        fetcher
            .expect_fetch_action_attempt()
            .times(5)
            .returning(|id| Ok(ActionAttempt::pending(id.clone(), "LOCK_DOOR")));

        let options = PollOptions::new()
            .with_interval(INTERVAL)
            .with_timeout(Duration::from_secs(1));
        let poller = ActionAttemptPoller::new(&fetcher, options);

        let err = poller.poll_until_ready(&id()).await.unwrap_err();
        match err {
            Error::Timeout {
                resource_id,
                last_status,
                elapsed,
                timeout,
            } => {
                assert_eq!(resource_id, "aa_1");
                assert_eq!(last_status, ActionAttemptStatus::Pending);
                assert!(elapsed >= timeout);
                assert_eq!(timeout, Duration::from_secs(1));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failed_literal_is_an_error_alias() {
        let mut attempt = ActionAttempt::failed("aa_1", "LOCK_DOOR", "lock_jammed", "Jammed");
        attempt.status = ActionAttemptStatus::Failed;

        let fetcher = scripted(vec![Ok(attempt.clone())]);
        let poller = ActionAttemptPoller::new(&fetcher, PollOptions::default());
        let err = poller.poll_until_ready(&id()).await.unwrap_err();
        assert!(matches!(err, Error::ActionAttemptFailed { .. }));

        let fetcher = scripted(vec![Ok(attempt)]);
        let poller =
            ActionAttemptPoller::new(&fetcher, PollOptions::new().with_failed_as_error(false));
        let err = poller.poll_until_ready(&id()).await.unwrap_err();
        assert!(matches!(err, Error::ParseError(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_errors_propagate_unchanged() {
        let fetcher = scripted(vec![
            Ok(ActionAttempt::pending("aa_1", "LOCK_DOOR")),
            Err(Error::Api {
                status: 404,
                request_id: Some("req-1".to_string()),
                error_type: "action_attempt_not_found".to_string(),
                message: "Not found".to_string(),
            }),
        ]);
        let poller = ActionAttemptPoller::new(&fetcher, PollOptions::default());

        let err = poller.poll_until_ready(&id()).await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 404, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_polling() {
        let mut fetcher = MockActionAttemptFetcher::new();
        fetcher
            .expect_fetch_action_attempt()
            .returning(|id| Ok(ActionAttempt::pending(id.clone(), "LOCK_DOOR")));

        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(600)).await;
            trigger.cancel();
        });

        let options = PollOptions::new()
            .with_interval(INTERVAL)
            .with_cancellation(token);
        let poller = ActionAttemptPoller::new(&fetcher, options);

        let err = poller.poll_until_ready(&id()).await.unwrap_err();
        assert_eq!(
            err,
            Error::Cancelled {
                resource_id: "aa_1".to_string()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn already_cancelled_token_skips_fetch() {
        let fetcher = MockActionAttemptFetcher::new();
        let token = CancellationToken::new();
        token.cancel();

        let poller =
            ActionAttemptPoller::new(&fetcher, PollOptions::new().with_cancellation(token));
        let err = poller.poll_until_ready(&id()).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled { .. }));
    }

    #[tokio::test]
    async fn closure_fetcher_end_to_end() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let fetcher = FetchFn(move |id: ActionAttemptId| {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if call < 2 {
                    Ok::<_, Error>(ActionAttempt::pending(id, "LOCK_DOOR"))
                } else {
                    Ok(ActionAttempt::succeeded(
                        id,
                        "LOCK_DOOR",
                        result_map(json!({"foo": "bar"})),
                    ))
                }
            }
        });

        let options = PollOptions::new()
            .with_interval(Duration::from_millis(10))
            .with_timeout(Duration::from_millis(1000));
        let poller = ActionAttemptPoller::new(&fetcher, options);

        let started = std::time::Instant::now();
        let attempt = poller
            .poll_until_ready(&ActionAttemptId::new("job-1"))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(attempt.status, ActionAttemptStatus::Success);
        assert_eq!(attempt.result.unwrap()["foo"], "bar");
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn poll_options_from_config() {
        let config = PollConfig::new()
            .with_interval_ms(400)
            .with_action_attempt_timeout(20);
        let options = PollOptions::from(&config);
        assert_eq!(options.interval, Duration::from_millis(400));
        assert_eq!(options.timeout, Duration::from_secs(20));
        assert!(options.should_raise);
        assert!(options.treat_failed_as_error);
    }

    #[derive(Debug, Clone)]
    struct Code {
        id: String,
        code: Option<String>,
        status: String,
        errors: Vec<ResourceError>,
    }

    impl Code {
        fn setting() -> Self {
            Self {
                id: "ac_1".to_string(),
                code: None,
                status: "setting".to_string(),
                errors: Vec::new(),
            }
        }
    }

    impl Watchable for Code {
        fn watch_id(&self) -> &str {
            &self.id
        }

        fn has_watched_value(&self) -> bool {
            self.code.as_deref().is_some_and(|c| !c.is_empty())
        }

        fn is_status_unknown(&self) -> bool {
            self.status == "unknown"
        }

        fn watch_errors(&self) -> &[ResourceError] {
            &self.errors
        }
    }

    fn scripted_refetch(
        responses: Vec<Code>,
    ) -> (
        Arc<AtomicUsize>,
        impl FnMut(&Code) -> std::future::Ready<Result<Code>>,
    ) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let refetch = move |_: &Code| {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(responses[call.min(responses.len() - 1)].clone()))
        };
        (calls, refetch)
    }

    #[tokio::test(start_paused = true)]
    async fn present_value_returns_without_refetch() {
        let mut code = Code::setting();
        code.code = Some("4444".to_string());
        let (calls, refetch) = scripted_refetch(vec![Code::setting()]);

        let started = Instant::now();
        let result = ConditionalValuePoller::new()
            .wait_for(code, refetch)
            .await
            .unwrap();

        assert_eq!(result.code.as_deref(), Some("4444"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn value_populated_after_refetch() {
        let mut ready = Code::setting();
        ready.code = Some("1234".to_string());
        let (calls, refetch) = scripted_refetch(vec![Code::setting(), ready]);

        let result = ConditionalValuePoller::new()
            .with_interval(INTERVAL)
            .wait_for(Code::setting(), refetch)
            .await
            .unwrap();

        assert_eq!(result.code.as_deref(), Some("1234"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_status_aborts_without_waiting() {
        let mut unknown = Code::setting();
        unknown.status = "unknown".to_string();
        let (calls, refetch) = scripted_refetch(vec![unknown]);

        let started = Instant::now();
        let err = ConditionalValuePoller::new()
            .with_interval(INTERVAL)
            .wait_for(Code::setting(), refetch)
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // one sleep before the refetch, none after it
        assert_eq!(started.elapsed(), INTERVAL);
        match err {
            Error::ConditionalWaitFailed {
                resource_id,
                reason,
                ..
            } => {
                assert_eq!(resource_id, "ac_1");
                assert_eq!(reason, "status unknown");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn error_records_abort_and_are_carried() {
        let mut broken = Code::setting();
        broken.errors.push(ResourceError {
            error_code: "failed_to_set_on_device".to_string(),
            message: "Lock rejected the code".to_string(),
        });
        let (calls, refetch) = scripted_refetch(vec![broken]);

        let err = ConditionalValuePoller::new()
            .with_interval(INTERVAL)
            .with_timeout(Duration::from_secs(60))
            .wait_for(Code::setting(), refetch)
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        match err {
            Error::ConditionalWaitFailed { errors, .. } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].error_code, "failed_to_set_on_device");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn never_populated_times_out() {
        let (calls, refetch) = scripted_refetch(vec![Code::setting()]);

        let err = ConditionalValuePoller::new()
            .with_interval(INTERVAL)
            .with_timeout(Duration::from_secs(1))
            .wait_for(Code::setting(), refetch)
            .await
            .unwrap_err();

        // sleeps at 250, 500, 750, 1000 refetch; the fifth sleep crosses the bound
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        match err {
            Error::ConditionalWaitFailed { reason, errors, .. } => {
                assert_eq!(reason, "timed out after 1 seconds");
                assert!(errors.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn wait_for_code_cancelled_mid_sleep() {
        let (calls, refetch) = scripted_refetch(vec![Code::setting()]);
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(600)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let err = ConditionalValuePoller::new()
            .with_interval(INTERVAL)
            .with_cancellation(token)
            .wait_for(Code::setting(), refetch)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            Error::Cancelled {
                resource_id: "ac_1".to_string()
            }
        );
        // refetched at 250 and 500, cancelled during the third sleep
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(started.elapsed(), Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn refetch_errors_propagate_unchanged() {
        let refetch = |_: &Code| {
            std::future::ready(Err::<Code, _>(Error::ServiceUnavailable(
                "maintenance".to_string(),
            )))
        };

        let err = assert_err!(
            ConditionalValuePoller::new()
                .wait_for(Code::setting(), refetch)
                .await
        );
        assert!(matches!(err, Error::ServiceUnavailable(_)));
    }

    #[test]
    fn conditional_poller_from_config() {
        let config = PollConfig::new()
            .with_interval_ms(100)
            .with_wait_for_code_timeout(30);
        let poller = ConditionalValuePoller::from(&config);
        assert_eq!(poller.interval, Duration::from_millis(100));
        assert_eq!(poller.timeout, Duration::from_secs(30));
    }
}
