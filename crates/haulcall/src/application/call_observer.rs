//! Call Lifecycle Controller
//!
//! Fetches a call and keeps re-fetching it while its status is not
//! terminal. An observation is a lazy, pull-based sequence of snapshots:
//! nothing is requested until [`CallObservation::next`] is awaited, the
//! next fetch is only timed once the previous one resolved, and `&mut self`
//! keeps a second fetch from ever starting while one is in flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::application::errors::ViewError;
use crate::domain::Call;
use crate::ports::CallsApi;

/// Delay between call status fetches
pub const CALL_STATUS_POLL_INTERVAL: Duration = Duration::from_millis(3000);

const FETCH_FAILED: &str = "Failed to fetch call";

/// Observer configuration
#[derive(Debug, Clone)]
pub struct ObserverConfig {
    /// Delay after a resolved fetch before the next one
    pub poll_interval: Duration,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            poll_interval: CALL_STATUS_POLL_INTERVAL,
        }
    }
}

/// Starts observations of individual calls
pub struct CallObserver<A: CallsApi + ?Sized> {
    api: Arc<A>,
    config: ObserverConfig,
}

impl<A: CallsApi + ?Sized> CallObserver<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self::with_config(api, ObserverConfig::default())
    }

    pub fn with_config(api: Arc<A>, config: ObserverConfig) -> Self {
        Self { api, config }
    }

    /// Begin a fresh observation of `call_id`
    pub fn observe(&self, call_id: impl Into<String>) -> CallObservation<A> {
        CallObservation {
            api: Arc::clone(&self.api),
            call_id: call_id.into(),
            poll_interval: self.config.poll_interval,
            phase: Phase::Fresh,
            cancel: CancellationToken::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Nothing fetched yet
    Fresh,
    /// Last snapshot was non-terminal
    Polling { resolved_at: Instant },
    /// Terminal snapshot, fetch error or cancellation
    Finished,
}

/// Snapshot sequence for one call
///
/// Dropping the observation cancels it.
pub struct CallObservation<A: CallsApi + ?Sized> {
    api: Arc<A>,
    call_id: String,
    poll_interval: Duration,
    phase: Phase,
    cancel: CancellationToken,
}

impl<A: CallsApi + ?Sized> CallObservation<A> {
    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    /// Token that cancels this observation from elsewhere (e.g. on teardown)
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// No further snapshot will be produced
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished || self.cancel.is_cancelled()
    }

    /// Next full call snapshot
    ///
    /// The first call fetches immediately. Later calls wait until the poll
    /// interval has elapsed since the previous fetch resolved. Returns
    /// `None` once a terminal status was delivered, after a fetch error, or
    /// when cancelled; a fetch in flight at cancellation is discarded.
    pub async fn next(&mut self) -> Option<Result<Call, ViewError>> {
        if self.cancel.is_cancelled() {
            self.phase = Phase::Finished;
        }

        match self.phase {
            Phase::Finished => return None,
            Phase::Fresh => {}
            Phase::Polling { resolved_at } => {
                let due = resolved_at + self.poll_interval;
                let waited = tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => false,
                    _ = tokio::time::sleep_until(due) => true,
                };
                if !waited {
                    return self.finish_cancelled();
                }
            }
        }

        tracing::debug!(call_id = %self.call_id, "Fetching call status");
        let fetched = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            result = self.api.get_call(&self.call_id) => Some(result),
        };

        let result = match fetched {
            Some(result) if !self.cancel.is_cancelled() => result,
            _ => return self.finish_cancelled(),
        };

        match result {
            Ok(call) => {
                self.phase = if call.call_status.is_terminal() {
                    tracing::info!(
                        call_id = %self.call_id,
                        status = %call.call_status,
                        "Call reached terminal status"
                    );
                    Phase::Finished
                } else {
                    Phase::Polling {
                        resolved_at: Instant::now(),
                    }
                };
                Some(Ok(call))
            }
            Err(e) => {
                tracing::warn!(call_id = %self.call_id, error = %e, "Failed to fetch call");
                self.phase = Phase::Finished;
                Some(Err(ViewError::fetch(&e, FETCH_FAILED)))
            }
        }
    }

    fn finish_cancelled(&mut self) -> Option<Result<Call, ViewError>> {
        tracing::debug!(call_id = %self.call_id, "Call observation cancelled");
        self.phase = Phase::Finished;
        None
    }
}

impl<A: CallsApi + ?Sized> Drop for CallObservation<A> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        CallStatus, DomainError, PhoneCallInitiated, PhoneCallRequest, ScenarioType, SortOrder,
        WebCallInitiated, WebCallRequest,
    };
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Answers `get_call` from a script, after a fixed latency
    struct ScriptedCalls {
        responses: Mutex<VecDeque<Result<Call, DomainError>>>,
        latency: Duration,
        started: Mutex<Vec<Instant>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedCalls {
        fn new(responses: Vec<Result<Call, DomainError>>, latency: Duration) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                latency,
                started: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            })
        }

        fn fetches(&self) -> usize {
            self.started.lock().unwrap().len()
        }

        fn gaps(&self) -> Vec<Duration> {
            let started = self.started.lock().unwrap();
            started.windows(2).map(|w| w[1] - w[0]).collect()
        }
    }

    #[async_trait]
    impl CallsApi for ScriptedCalls {
        async fn initiate_web_call(
            &self,
            _request: &WebCallRequest,
        ) -> Result<WebCallInitiated, DomainError> {
            unimplemented!("not used by the observer")
        }

        async fn initiate_phone_call(
            &self,
            _request: &PhoneCallRequest,
        ) -> Result<PhoneCallInitiated, DomainError> {
            unimplemented!("not used by the observer")
        }

        async fn get_call(&self, _call_id: &str) -> Result<Call, DomainError> {
            self.started.lock().unwrap().push(Instant::now());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(DomainError::Transport("script exhausted".to_string())))
        }

        async fn list_calls(&self, _order: SortOrder) -> Result<Vec<Call>, DomainError> {
            unimplemented!("not used by the observer")
        }
    }

    fn call(status: CallStatus, transcript: Option<&str>) -> Result<Call, DomainError> {
        Ok(Call {
            id: "call-1".to_string(),
            driver_name: "Anna".to_string(),
            driver_phone: Some("web-call".to_string()),
            load_number: "LOAD-1".to_string(),
            scenario_type: ScenarioType::Checkin,
            call_status: status,
            retell_call_id: Some("call_abc".to_string()),
            raw_transcript: transcript.map(str::to_string),
            structured_data: None,
            created_at: Utc::now(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_initiated_then_completed_delivers_two_snapshots() {
        let api = ScriptedCalls::new(
            vec![
                call(CallStatus::Initiated, None),
                call(CallStatus::Completed, Some("Agent: Hello Anna...")),
            ],
            Duration::ZERO,
        );
        let observer = CallObserver::new(api.clone());
        let mut observation = observer.observe("call-1");

        let first = observation.next().await.unwrap().unwrap();
        assert_eq!(first.call_status, CallStatus::Initiated);

        let second = observation.next().await.unwrap().unwrap();
        assert_eq!(second.call_status, CallStatus::Completed);
        assert_eq!(second.raw_transcript.as_deref(), Some("Agent: Hello Anna..."));

        assert!(observation.next().await.is_none());
        assert!(observation.is_finished());
        assert_eq!(api.fetches(), 2);
        assert_eq!(api.gaps(), vec![CALL_STATUS_POLL_INTERVAL]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_status_stops_polling() {
        let api = ScriptedCalls::new(vec![call(CallStatus::Failed, None)], Duration::ZERO);
        let mut observation = CallObserver::new(api.clone()).observe("call-1");

        let snapshot = observation.next().await.unwrap().unwrap();
        assert_eq!(snapshot.call_status, CallStatus::Failed);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(observation.next().await.is_none());
        assert_eq!(api.fetches(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_fetch_waits_for_previous_to_resolve() {
        let latency = Duration::from_millis(500);
        let api = ScriptedCalls::new(
            vec![
                call(CallStatus::Initiated, None),
                call(CallStatus::InProgress, None),
                call(CallStatus::Completed, None),
            ],
            latency,
        );
        let mut observation = CallObserver::new(api.clone()).observe("call-1");

        let mut statuses = Vec::new();
        while let Some(snapshot) = observation.next().await {
            statuses.push(snapshot.unwrap().call_status);
        }

        assert_eq!(
            statuses,
            vec![CallStatus::Initiated, CallStatus::InProgress, CallStatus::Completed]
        );
        assert_eq!(
            api.gaps(),
            vec![latency + CALL_STATUS_POLL_INTERVAL, latency + CALL_STATUS_POLL_INTERVAL]
        );
        assert_eq!(api.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_discards_in_flight_fetch() {
        let api = ScriptedCalls::new(
            vec![call(CallStatus::Completed, Some("done"))],
            Duration::from_secs(1),
        );
        let mut observation = CallObserver::new(api.clone()).observe("call-1");
        let token = observation.cancel_token();

        let pending = tokio::spawn(async move { observation.next().await });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(api.fetches(), 1);
        token.cancel();

        let delivered = pending.await.unwrap();
        assert!(delivered.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_clears_scheduled_fetch() {
        let api = ScriptedCalls::new(
            vec![call(CallStatus::InProgress, None), call(CallStatus::Completed, None)],
            Duration::ZERO,
        );
        let mut observation = CallObserver::new(api.clone()).observe("call-1");

        observation.next().await.unwrap().unwrap();
        observation.cancel();

        assert!(observation.next().await.is_none());
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(api.fetches(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_failure_schedules_nothing() {
        let api = ScriptedCalls::new(
            vec![Err(DomainError::Transport("connection refused".to_string()))],
            Duration::ZERO,
        );
        let mut observation = CallObserver::new(api.clone()).observe("call-1");

        let err = observation.next().await.unwrap().unwrap_err();
        assert_eq!(err, ViewError::Fetch(FETCH_FAILED.to_string()));

        assert!(observation.next().await.is_none());
        assert_eq!(api.fetches(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_follows_backend_until_results_arrive() {
        use crate::adapters::InMemoryBackend;
        use crate::domain::{ConfigurationDraft, FieldValue};
        use crate::ports::ConfigurationsApi;
        use std::collections::BTreeMap;

        let backend = Arc::new(InMemoryBackend::new());
        let mut draft = ConfigurationDraft::defaults(ScenarioType::Checkin);
        draft.system_prompt = "Ask the driver for location and ETA.".to_string();
        backend.save_configuration(&draft).await.unwrap();

        let created = backend
            .initiate_web_call(&WebCallRequest {
                driver_name: "Anna".to_string(),
                load_number: "LOAD-1".to_string(),
                scenario_type: ScenarioType::Checkin,
            })
            .await
            .unwrap();
        let mut observation = CallObserver::new(backend.clone()).observe(created.call_id.clone());

        let first = observation.next().await.unwrap().unwrap();
        assert_eq!(first.call_status, CallStatus::Initiated);
        assert!(!first.has_results());

        backend
            .advance_call(&created.call_id, CallStatus::InProgress, None, None)
            .await
            .unwrap();
        let second = observation.next().await.unwrap().unwrap();
        assert_eq!(second.call_status, CallStatus::InProgress);

        let mut data = BTreeMap::new();
        data.insert(
            "driver_status".to_string(),
            FieldValue::Text("Driving".to_string()),
        );
        backend
            .advance_call(
                &created.call_id,
                CallStatus::Completed,
                Some("Agent: Hi Anna, how is the drive?".to_string()),
                Some(data),
            )
            .await
            .unwrap();
        let third = observation.next().await.unwrap().unwrap();
        assert_eq!(third.call_status, CallStatus::Completed);
        assert!(third.has_results());

        assert!(observation.next().await.is_none());
        assert_eq!(backend.call_fetches(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_observation_starts_fresh() {
        let api = ScriptedCalls::new(
            vec![call(CallStatus::Completed, None), call(CallStatus::Completed, None)],
            Duration::ZERO,
        );
        let observer = CallObserver::new(api.clone());

        let mut first = observer.observe("call-1");
        first.next().await.unwrap().unwrap();
        assert!(first.next().await.is_none());

        let started = Instant::now();
        let mut second = observer.observe("call-1");
        second.next().await.unwrap().unwrap();
        assert_eq!(Instant::now(), started);
        assert_eq!(api.fetches(), 2);
    }
}
