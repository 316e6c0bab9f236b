//! Audit trail of GitHub exchanges.
//!
//! Exactly one [`AuditEvent`] is recorded per attempted exchange:
//! `RequestCompleted` when a complete response arrived (whatever its status),
//! `RequestFailed` otherwise. Events never carry the bearer token or the
//! bytes of an uploaded artifact.

use super::failure::{ExchangeError, Headers};
use reqwest::StatusCode;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use url::Url;

/// Record of one attempted exchange
#[derive(Debug, Clone)]
pub enum AuditEvent {
    /// A complete response was received
    RequestCompleted {
        /// Request URI
        uri: Url,
        /// Response status
        status_code: StatusCode,
        /// Response headers
        headers: Headers,
        /// Response body
        response_body: String,
    },
    /// The exchange ended without a complete response
    RequestFailed {
        /// Request URI
        uri: Url,
        /// Why it ended
        cause: Arc<ExchangeError>,
    },
}

impl AuditEvent {
    /// URI of the audited request
    pub fn uri(&self) -> &Url {
        match self {
            AuditEvent::RequestCompleted { uri, .. } | AuditEvent::RequestFailed { uri, .. } => {
                uri
            }
        }
    }
}

/// Observer of exchanges.
///
/// Implementations may be called from several exchanges at once. A panic
/// inside `record` is contained by the client and never changes the result of
/// the exchange being recorded.
pub trait Auditor: Send + Sync {
    /// Observe one exchange
    fn record(&self, event: &AuditEvent);
}

impl<F> Auditor for F
where
    F: Fn(&AuditEvent) + Send + Sync,
{
    fn record(&self, event: &AuditEvent) {
        self(event)
    }
}

/// Auditor that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuditor;

impl Auditor for NoopAuditor {
    fn record(&self, _event: &AuditEvent) {}
}

/// Auditor writing events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingAuditor;

impl Auditor for LoggingAuditor {
    fn record(&self, event: &AuditEvent) {
        match event {
            AuditEvent::RequestCompleted {
                uri,
                status_code,
                headers,
                response_body,
            } => {
                log::info!("{} responded {}", uri, status_code);
                log::debug!("Response headers from {}: {:?}", uri, headers);
                log::debug!("Response body from {}: {}", uri, response_body);
            }
            AuditEvent::RequestFailed { uri, cause } => {
                log::warn!("Request to {} failed: {}", uri, cause);
            }
        }
    }
}

/// Auditor keeping every event in memory, in the order recorded
#[derive(Debug, Default)]
pub struct RecordingAuditor {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAuditor {
    /// Create an empty recording auditor
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Auditor for RecordingAuditor {
    fn record(&self, event: &AuditEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

/// Hand an event to the auditor, containing any panic it raises.
pub(crate) fn dispatch(auditor: &dyn Auditor, event: &AuditEvent) {
    if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(|| auditor.record(event))) {
        log::warn!(
            "Auditor panicked while recording exchange with {}: {}",
            event.uri(),
            panic_message(panic.as_ref())
        );
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
