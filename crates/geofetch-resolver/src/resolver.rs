//! Device-vs-IP location race with timer-based fallback.
//!
//! One call to [`LocationResolver::resolve`] is one resolution attempt:
//!
//! 1. `FETCHING_LOCATION` is emitted and the device attempt starts, with the
//!    fallback timer armed at `GEOLOCATION_TIMEOUT + 1000ms`. When the stored
//!    fetch type is `IpInfo` or `CachedAddress` the device is skipped and the
//!    IP lookup starts at once.
//! 2. If the device answers first with a usable fix, it wins.
//! 3. If the device fails first, the IP lookup starts at once and the timer
//!    goes inert.
//! 4. If the timer fires first, the IP lookup starts while the device keeps
//!    running; whichever of the two concludes first wins.
//!
//! The winner is forwarded to the [`IssueFetcher`] and every other branch is
//! dropped. Starting a new attempt cancels the previous one's token, after
//! which that attempt emits nothing further, even if its external calls
//! later complete.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use geofetch_core::{
    AppConfig, DeviceGeolocation, IntentSink, IpGeolocation, IssueService, LocationFetchType,
    LocationUiState, StateIntent, StateReader,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::ResolveError;
use crate::fetcher::{FetchStatus, IssueFetcher};
use crate::guard::{needs_fetch, FetchRequest};
use crate::source::LocationSource;

/// Timing knobs for the race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// How long the device gets before the IP lookup joins the race.
    pub fallback_delay: Duration,
}

impl From<&AppConfig> for ResolverConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            fallback_delay: config.fallback_delay(),
        }
    }
}

/// How one call to [`LocationResolver::resolve`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// A source produced a location and it was forwarded to the fetcher.
    Resolved {
        fetch_type: LocationFetchType,
        location: String,
        fetch: FetchStatus,
    },
    /// Every source failed; the empty location was forwarded so the fetcher
    /// reports `LOCATION_ERROR`.
    Unresolved { fetch: FetchStatus },
    /// Issues were already cached, so the winning location was not fetched.
    /// The ui state still settles: `LOCATION_ERROR` for the empty location,
    /// `LOCATION_FOUND` otherwise.
    AlreadyCached { location: String },
    /// A newer attempt started before this one finished.
    Superseded,
}

enum Winner {
    Device(String),
    Ip(Result<String, ResolveError>),
}

enum Branch {
    Device(Result<String, ResolveError>),
    TimerFired,
    Ip(Result<String, ResolveError>),
}

/// One in-flight race. Only the attempt whose token is uncancelled may emit.
struct ResolutionAttempt {
    id: u64,
    token: CancellationToken,
    started_at: Instant,
}

impl ResolutionAttempt {
    fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    fn elapsed_ms(&self) -> u128 {
        self.started_at.elapsed().as_millis()
    }
}

pub struct LocationResolver<D, I, S> {
    source: LocationSource<D, I>,
    fetcher: IssueFetcher<S>,
    sink: Arc<dyn IntentSink>,
    reader: Arc<dyn StateReader>,
    config: ResolverConfig,
    next_id: AtomicU64,
    active: Mutex<Option<(u64, CancellationToken)>>,
}

impl<D, I, S> LocationResolver<D, I, S>
where
    D: DeviceGeolocation,
    I: IpGeolocation,
    S: IssueService,
{
    pub fn new(
        source: LocationSource<D, I>,
        fetcher: IssueFetcher<S>,
        sink: Arc<dyn IntentSink>,
        reader: Arc<dyn StateReader>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            source,
            fetcher,
            sink,
            reader,
            config,
            next_id: AtomicU64::new(1),
            active: Mutex::new(None),
        }
    }

    pub fn fetcher(&self) -> &IssueFetcher<S> {
        &self.fetcher
    }

    pub(crate) fn sink(&self) -> &dyn IntentSink {
        self.sink.as_ref()
    }

    pub(crate) fn reader(&self) -> &dyn StateReader {
        self.reader.as_ref()
    }

    /// Resolves a location and forwards it to the fetcher.
    ///
    /// Callers are expected to have checked that no address is cached.
    /// Emits at most one downstream fetch per call, and nothing at all once
    /// a newer call has started.
    pub async fn resolve(&self) -> ResolutionOutcome {
        let attempt = self.begin();
        tracing::debug!(attempt = attempt.id, "location resolution started");
        self.emit(
            &attempt,
            StateIntent::SetUiState(LocationUiState::FetchingLocation),
        );

        let outcome = match self.race(&attempt).await {
            Some(winner) => self.dispatch(&attempt, winner).await,
            None => ResolutionOutcome::Superseded,
        };

        if outcome == ResolutionOutcome::Superseded {
            tracing::debug!(
                attempt = attempt.id,
                elapsed_ms = attempt.elapsed_ms(),
                "resolution superseded by a newer attempt"
            );
        }
        self.finish(&attempt);
        outcome
    }

    /// Registers a new attempt, cancelling whichever one was active.
    fn begin(&self) -> ResolutionAttempt {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let previous = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace((id, token.clone()));
        if let Some((previous_id, previous_token)) = previous {
            tracing::debug!(attempt = id, previous = previous_id, "superseding attempt");
            previous_token.cancel();
        }
        ResolutionAttempt {
            id,
            token,
            started_at: Instant::now(),
        }
    }

    /// Retires `attempt`. Its token is cancelled so nothing it left behind can act.
    fn finish(&self, attempt: &ResolutionAttempt) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if active.as_ref().is_some_and(|(id, _)| *id == attempt.id) {
            *active = None;
        }
        drop(active);
        attempt.token.cancel();
    }

    fn emit(&self, attempt: &ResolutionAttempt, intent: StateIntent) {
        if attempt.is_active() {
            self.sink.apply(intent);
        } else {
            tracing::debug!(
                attempt = attempt.id,
                intent = intent.kind(),
                "dropping intent from inactive attempt"
            );
        }
    }

    /// Runs the device/timer/IP race until one branch concludes the attempt.
    /// Returns `None` when the attempt is cancelled first.
    async fn race(&self, attempt: &ResolutionAttempt) -> Option<Winner> {
        // Both futures are lazy: the IP lookup is not issued until its branch
        // is enabled and polled.
        let device = self.source.device_attempt();
        let ip = self.source.ip_attempt();
        let timer = tokio::time::sleep(self.config.fallback_delay);
        tokio::pin!(device, ip, timer);

        // Once a location came from IP or a stored address, the device is
        // not asked again.
        let prior = self.reader.location_fetch_type();
        let ask_device = matches!(
            prior,
            LocationFetchType::None | LocationFetchType::BrowserGeolocation
        );
        if !ask_device {
            tracing::debug!(
                attempt = attempt.id,
                prior = ?prior,
                "skipping device geolocation"
            );
        }

        let mut device_live = ask_device;
        let mut timer_live = ask_device;
        let mut ip_live = !ask_device;

        loop {
            let branch = tokio::select! {
                biased;
                () = attempt.token.cancelled() => return None,
                result = &mut device, if device_live => Branch::Device(result),
                () = &mut timer, if timer_live => Branch::TimerFired,
                result = &mut ip, if ip_live => Branch::Ip(result),
            };

            match branch {
                Branch::Device(Ok(location)) => {
                    tracing::info!(
                        attempt = attempt.id,
                        elapsed_ms = attempt.elapsed_ms(),
                        "device geolocation won"
                    );
                    return Some(Winner::Device(location));
                }
                Branch::Device(Err(err)) => {
                    err.log("device geolocation");
                    device_live = false;
                    timer_live = false;
                    ip_live = true;
                }
                Branch::TimerFired => {
                    tracing::info!(
                        attempt = attempt.id,
                        elapsed_ms = attempt.elapsed_ms(),
                        "fallback timer fired; starting IP lookup alongside device"
                    );
                    timer_live = false;
                    ip_live = true;
                }
                Branch::Ip(result) => {
                    tracing::info!(
                        attempt = attempt.id,
                        elapsed_ms = attempt.elapsed_ms(),
                        succeeded = result.is_ok(),
                        "IP lookup concluded the race"
                    );
                    return Some(Winner::Ip(result));
                }
            }
        }
    }

    async fn dispatch(&self, attempt: &ResolutionAttempt, winner: Winner) -> ResolutionOutcome {
        match winner {
            Winner::Device(location) => {
                self.emit(
                    attempt,
                    StateIntent::SetLocationFetchType(LocationFetchType::BrowserGeolocation),
                );
                self.forward(attempt, location, LocationFetchType::BrowserGeolocation)
                    .await
            }
            Winner::Ip(Ok(location)) => {
                self.emit(
                    attempt,
                    StateIntent::SetLocationFetchType(LocationFetchType::IpInfo),
                );
                let outcome = self
                    .forward(attempt, location, LocationFetchType::IpInfo)
                    .await;
                if matches!(
                    outcome,
                    ResolutionOutcome::Resolved {
                        fetch: FetchStatus::Completed,
                        ..
                    }
                ) {
                    self.emit(
                        attempt,
                        StateIntent::SetUiState(LocationUiState::LocationFound),
                    );
                }
                outcome
            }
            Winner::Ip(Err(err)) => {
                err.log("ip lookup");
                match self
                    .forward(attempt, String::new(), LocationFetchType::None)
                    .await
                {
                    ResolutionOutcome::Resolved { fetch, .. } => {
                        ResolutionOutcome::Unresolved { fetch }
                    }
                    other => other,
                }
            }
        }
    }

    /// Hands `location` to the fetcher through the fetch guard, applying the
    /// resulting intents only if the attempt is still active afterwards.
    async fn forward(
        &self,
        attempt: &ResolutionAttempt,
        location: String,
        fetch_type: LocationFetchType,
    ) -> ResolutionOutcome {
        if !attempt.is_active() {
            return ResolutionOutcome::Superseded;
        }

        // The winning location, the empty sentinel included, is always an
        // available address here; only already-cached issues can veto.
        let snapshot = self.reader.remote_snapshot();
        if !needs_fetch(
            &snapshot,
            &FetchRequest::AllIssues {
                address_available: true,
            },
        ) {
            tracing::debug!(attempt = attempt.id, "issues already cached; skipping fetch");
            let ui = if location.is_empty() {
                LocationUiState::LocationError
            } else {
                LocationUiState::LocationFound
            };
            self.emit(attempt, StateIntent::SetUiState(ui));
            return ResolutionOutcome::AlreadyCached { location };
        }

        let outcome = self.fetcher.fetch_for_address(&location).await;
        if !attempt.is_active() {
            tracing::debug!(
                attempt = attempt.id,
                "discarding fetch result of superseded attempt"
            );
            return ResolutionOutcome::Superseded;
        }
        self.sink.apply_all(outcome.intents);

        ResolutionOutcome::Resolved {
            fetch_type,
            location,
            fetch: outcome.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_app_config_adds_grace_period() {
        let app = AppConfig {
            env: geofetch_core::Environment::Test,
            log_level: "debug".to_owned(),
            api_base_url: "http://localhost/v1".to_owned(),
            ipinfo_url: "http://localhost/json".to_owned(),
            geolocation_timeout_ms: 3000,
            request_timeout_secs: 5,
            user_agent: "test".to_owned(),
        };
        assert_eq!(
            ResolverConfig::from(&app).fallback_delay,
            Duration::from_millis(4000)
        );
    }
}
