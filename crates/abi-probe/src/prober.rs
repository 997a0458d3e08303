//! Conformance probing.
//!
//! A check runs as an explicit state machine:
//!
//! ```text
//! Start -> QueryPhase -> SendPhase -> Done(Implemented)
//!                    \-> Done(NotImplemented)
//! ```
//!
//! Query probes are authoritative: they run in declared order and the first
//! failure ends the check. Send probes run only after every query passed,
//! each in its own failure scope, and never change the verdict. A target
//! with no probes at all ends as `Inconclusive`.

use futures::future::join_all;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::address::Address;
use crate::registry::BindingRegistry;
use crate::runtime::ContractRuntime;
use crate::target::ConformanceTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Implemented,
    NotImplemented,
    /// Nothing to probe; never selected by detection.
    Inconclusive,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Implemented => "implemented",
            Verdict::NotImplemented => "not implemented",
            Verdict::Inconclusive => "inconclusive",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum ProbeOutcome {
    Passed,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeRecord {
    pub name: String,
    pub outcome: ProbeOutcome,
}

impl ProbeRecord {
    pub fn passed(&self) -> bool {
        self.outcome == ProbeOutcome::Passed
    }
}

/// Result of checking one address against one interface.
#[derive(Debug, Clone, Serialize)]
pub struct ConformanceReport {
    pub interface: String,
    pub address: Address,
    pub verdict: Verdict,
    /// Query probes that actually ran; probes after a failure are absent.
    pub queries: Vec<ProbeRecord>,
    pub sends: Vec<ProbeRecord>,
    /// The query failure that decided a `NotImplemented` verdict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl ConformanceReport {
    pub fn is_implemented(&self) -> bool {
        self.verdict == Verdict::Implemented
    }
}

/// A successful detection: the report plus a binding ready for use.
pub struct Detection {
    pub report: ConformanceReport,
    pub binding: Box<dyn ConformanceTarget>,
}

impl fmt::Debug for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Detection")
            .field("report", &self.report)
            .field("binding", &self.binding.interface_name())
            .finish()
    }
}

enum State {
    Start,
    QueryPhase,
    SendPhase,
    Done(Verdict),
}

/// Check a single target.
pub async fn probe(target: &dyn ConformanceTarget) -> ConformanceReport {
    let mut report = ConformanceReport {
        interface: target.interface_name().to_string(),
        address: *target.address(),
        verdict: Verdict::Inconclusive,
        queries: Vec::new(),
        sends: Vec::new(),
        failure: None,
    };

    let mut state = State::Start;
    loop {
        state = match state {
            State::Start => {
                if target.query_probes().is_empty() && target.send_probes().is_empty() {
                    State::Done(Verdict::Inconclusive)
                } else {
                    State::QueryPhase
                }
            }
            State::QueryPhase => run_query_phase(target, &mut report).await,
            State::SendPhase => {
                run_send_phase(target, &mut report).await;
                State::Done(Verdict::Implemented)
            }
            State::Done(verdict) => {
                report.verdict = verdict;
                break;
            }
        };
    }

    debug!(
        interface = %report.interface,
        address = %report.address,
        verdict = %report.verdict,
        "conformance check finished"
    );
    report
}

async fn run_query_phase(target: &dyn ConformanceTarget, report: &mut ConformanceReport) -> State {
    for method in target.query_probes() {
        match target.run_query_probe(method).await {
            Ok(()) => report.queries.push(ProbeRecord {
                name: method.to_string(),
                outcome: ProbeOutcome::Passed,
            }),
            Err(e) => {
                debug!(interface = %report.interface, method, error = %e, "query probe failed");
                report.queries.push(ProbeRecord {
                    name: method.to_string(),
                    outcome: ProbeOutcome::Failed(e.to_string()),
                });
                report.failure = Some(e.to_string());
                return State::Done(Verdict::NotImplemented);
            }
        }
    }
    State::SendPhase
}

async fn run_send_phase(target: &dyn ConformanceTarget, report: &mut ConformanceReport) {
    for message in target.send_probes() {
        let outcome = match target.run_send_probe(message).await {
            Ok(()) => ProbeOutcome::Passed,
            Err(e) => {
                warn!(
                    interface = %report.interface,
                    message,
                    error = %e,
                    "send probe failed (advisory)"
                );
                ProbeOutcome::Failed(e.to_string())
            }
        };
        report.sends.push(ProbeRecord {
            name: message.to_string(),
            outcome,
        });
    }
}

/// Finds which registered interface an address implements.
pub struct Prober {
    registry: BindingRegistry,
    runtime: Arc<dyn ContractRuntime>,
}

impl Prober {
    pub fn new(registry: BindingRegistry, runtime: Arc<dyn ContractRuntime>) -> Self {
        Self { registry, runtime }
    }

    pub fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    /// Check one registered interface. `None` if the name is not registered.
    pub async fn check(&self, address: Address, interface: &str) -> Option<ConformanceReport> {
        let target = self
            .registry
            .create(interface, address, self.runtime.clone())?;
        Some(probe(target.as_ref()).await)
    }

    /// Try interfaces in registry order and stop at the first implemented
    /// one.
    pub async fn detect(&self, address: Address) -> Option<Detection> {
        for interface in self.registry.interfaces() {
            let Some(target) = self
                .registry
                .create(interface, address, self.runtime.clone())
            else {
                continue;
            };
            let report = probe(target.as_ref()).await;
            if report.is_implemented() {
                info!(%address, interface, "detected interface");
                return Some(Detection {
                    report,
                    binding: target,
                });
            }
        }
        info!(%address, "no registered interface matched");
        None
    }

    /// Check every registered interface, in registry order.
    pub async fn survey(&self, address: Address) -> Vec<ConformanceReport> {
        let mut reports = Vec::with_capacity(self.registry.len());
        for interface in self.registry.interfaces() {
            if let Some(report) = self.check(address, interface).await {
                reports.push(report);
            }
        }
        reports
    }

    /// Like [`detect`](Self::detect), but checks all interfaces at once. The
    /// winner is still the first implemented one in registry order, not the
    /// first to finish.
    pub async fn detect_concurrent(&self, address: Address) -> Option<Detection> {
        let targets: Vec<Box<dyn ConformanceTarget>> = self
            .registry
            .interfaces()
            .filter_map(|interface| {
                self.registry
                    .create(interface, address, self.runtime.clone())
            })
            .collect();

        let reports = join_all(targets.iter().map(|t| probe(t.as_ref()))).await;

        let detection = targets
            .into_iter()
            .zip(reports)
            .find(|(_, report)| report.is_implemented())
            .map(|(binding, report)| Detection { report, binding });
        match &detection {
            Some(d) => info!(%address, interface = %d.report.interface, "detected interface"),
            None => info!(%address, "no registered interface matched"),
        }
        detection
    }
}

impl fmt::Debug for Prober {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prober")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
