//! Scripted collaborators driven by tokio's clock, for paused-time tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use geofetch_core::{
    CallCount, Coordinates, DeviceGeolocation, IntentSink, IpGeolocation, IpInfo, Issue,
    IssueService, IssuesResponse, SourceError, StateIntent, StateReader,
};
use geofetch_resolver::{
    IssueFetcher, LocationResolver, LocationSource, MemoryStore, ResolverConfig,
};

pub const FALLBACK_MS: u64 = 6_000;

#[derive(Debug, Clone, Copy)]
pub enum DeviceScript {
    Fix {
        after_ms: u64,
        latitude: f64,
        longitude: f64,
    },
    Fail {
        after_ms: u64,
    },
    Deny,
    Never,
}

#[derive(Debug, Clone, Copy)]
pub enum IpScript {
    Loc { after_ms: u64, loc: &'static str },
    Fail { after_ms: u64 },
    Never,
}

#[derive(Debug, Clone, Copy)]
pub enum ServiceScript {
    Ok { after_ms: u64 },
    Invalid,
    Fail,
}

/// Call counters shared by every fake in one test.
#[derive(Debug, Default)]
pub struct Probe {
    pub device_calls: AtomicUsize,
    pub ip_calls: AtomicUsize,
    pub fetches: Mutex<Vec<String>>,
    pub group_fetches: Mutex<Vec<(String, String)>>,
}

impl Probe {
    pub fn device_calls(&self) -> usize {
        self.device_calls.load(Ordering::SeqCst)
    }

    pub fn ip_calls(&self) -> usize {
        self.ip_calls.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn group_fetches(&self) -> Vec<(String, String)> {
        self.group_fetches.lock().unwrap().clone()
    }
}

pub struct FakeDevice {
    script: DeviceScript,
    probe: Arc<Probe>,
}

impl DeviceGeolocation for FakeDevice {
    async fn current_position(&self) -> Result<Coordinates, SourceError> {
        self.probe.device_calls.fetch_add(1, Ordering::SeqCst);
        match self.script {
            DeviceScript::Fix {
                after_ms,
                latitude,
                longitude,
            } => {
                tokio::time::sleep(Duration::from_millis(after_ms)).await;
                Ok(Coordinates {
                    latitude,
                    longitude,
                })
            }
            DeviceScript::Fail { after_ms } => {
                tokio::time::sleep(Duration::from_millis(after_ms)).await;
                Err(SourceError::Request("position unavailable".to_owned()))
            }
            DeviceScript::Deny => Err(SourceError::Denied),
            DeviceScript::Never => std::future::pending().await,
        }
    }
}

pub struct FakeIp {
    script: IpScript,
    probe: Arc<Probe>,
}

impl IpGeolocation for FakeIp {
    async fn lookup(&self) -> Result<IpInfo, SourceError> {
        self.probe.ip_calls.fetch_add(1, Ordering::SeqCst);
        match self.script {
            IpScript::Loc { after_ms, loc } => {
                tokio::time::sleep(Duration::from_millis(after_ms)).await;
                Ok(IpInfo {
                    loc: loc.to_owned(),
                })
            }
            IpScript::Fail { after_ms } => {
                tokio::time::sleep(Duration::from_millis(after_ms)).await;
                Err(SourceError::Request("429 Too Many Requests".to_owned()))
            }
            IpScript::Never => std::future::pending().await,
        }
    }
}

pub struct FakeService {
    script: ServiceScript,
    probe: Arc<Probe>,
}

impl FakeService {
    async fn respond(&self) -> Result<IssuesResponse, SourceError> {
        match self.script {
            ServiceScript::Ok { after_ms } => {
                tokio::time::sleep(Duration::from_millis(after_ms)).await;
                Ok(IssuesResponse {
                    invalid_address: false,
                    normalized_location: "Boulder".to_owned(),
                    split_district: false,
                    issues: vec![issue("rec1"), issue("rec2")],
                })
            }
            ServiceScript::Invalid => Ok(IssuesResponse {
                invalid_address: true,
                normalized_location: String::new(),
                split_district: false,
                issues: Vec::new(),
            }),
            ServiceScript::Fail => Err(SourceError::Request("503 Service Unavailable".to_owned())),
        }
    }
}

impl IssueService for FakeService {
    async fn issues_by_address(&self, address: &str) -> Result<IssuesResponse, SourceError> {
        self.probe.fetches.lock().unwrap().push(address.to_owned());
        self.respond().await
    }

    async fn group_issues(
        &self,
        group_id: &str,
        address: &str,
    ) -> Result<IssuesResponse, SourceError> {
        self.probe
            .group_fetches
            .lock()
            .unwrap()
            .push((group_id.to_owned(), address.to_owned()));
        self.respond().await
    }

    async fn call_count(&self) -> Result<CallCount, SourceError> {
        match self.script {
            ServiceScript::Fail => Err(SourceError::Request("503 Service Unavailable".to_owned())),
            ServiceScript::Ok { .. } | ServiceScript::Invalid => Ok(CallCount { count: 42 }),
        }
    }
}

pub type TestResolver = LocationResolver<FakeDevice, FakeIp, FakeService>;

pub fn issue(id: &str) -> Issue {
    Issue {
        id: id.to_owned(),
        name: format!("issue {id}"),
        reason: None,
        extra: serde_json::Map::new(),
    }
}

pub fn fetcher(service: ServiceScript, probe: &Arc<Probe>) -> IssueFetcher<FakeService> {
    IssueFetcher::new(FakeService {
        script: service,
        probe: Arc::clone(probe),
    })
}

pub fn resolver(
    device: DeviceScript,
    ip: IpScript,
    service: ServiceScript,
    store: &Arc<MemoryStore>,
) -> (TestResolver, Arc<Probe>) {
    let probe = Arc::new(Probe::default());
    let source = LocationSource::new(
        FakeDevice {
            script: device,
            probe: Arc::clone(&probe),
        },
        FakeIp {
            script: ip,
            probe: Arc::clone(&probe),
        },
    );
    let sink: Arc<dyn IntentSink> = store.clone();
    let reader: Arc<dyn StateReader> = store.clone();
    let resolver = LocationResolver::new(
        source,
        fetcher(service, &probe),
        sink,
        reader,
        ResolverConfig {
            fallback_delay: Duration::from_millis(FALLBACK_MS),
        },
    );
    (resolver, probe)
}

pub fn count(journal: &[StateIntent], wanted: &StateIntent) -> usize {
    journal.iter().filter(|intent| *intent == wanted).count()
}

pub fn count_kind(journal: &[StateIntent], kind: &str) -> usize {
    journal.iter().filter(|intent| intent.kind() == kind).count()
}
