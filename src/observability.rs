use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("chatbot.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("chatbot.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("chatbot.client.request_duration_seconds");

pub(crate) static GATEWAY_COMPLETIONS: Counter = Counter::new("chatbot.gateway.completions");
pub(crate) static GATEWAY_FAILURES: Counter = Counter::new("chatbot.gateway.failures");
pub(crate) static GATEWAY_RETRIES: Counter = Counter::new("chatbot.gateway.retries");
pub(crate) static GATEWAY_RETRY_BACKOFF: Moments =
    Moments::new("chatbot.gateway.retry_backoff_seconds");

pub(crate) static SESSION_SUBMISSIONS: Counter = Counter::new("chatbot.session.submissions");
pub(crate) static SESSION_REJECTED: Counter = Counter::new("chatbot.session.rejected");
pub(crate) static SESSION_COMMITTED: Counter = Counter::new("chatbot.session.committed");
pub(crate) static SESSION_STOPPED: Counter = Counter::new("chatbot.session.stopped");
pub(crate) static SESSION_FAILED: Counter = Counter::new("chatbot.session.failed");
pub(crate) static SESSION_DISCARDED: Counter = Counter::new("chatbot.session.discarded");
pub(crate) static SESSION_CLEARS: Counter = Counter::new("chatbot.session.clears");
pub(crate) static SESSION_TURN_DURATION: Moments =
    Moments::new("chatbot.session.turn_duration_seconds");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&GATEWAY_COMPLETIONS);
    collector.register_counter(&GATEWAY_FAILURES);
    collector.register_counter(&GATEWAY_RETRIES);
    collector.register_moments(&GATEWAY_RETRY_BACKOFF);

    collector.register_counter(&SESSION_SUBMISSIONS);
    collector.register_counter(&SESSION_REJECTED);
    collector.register_counter(&SESSION_COMMITTED);
    collector.register_counter(&SESSION_STOPPED);
    collector.register_counter(&SESSION_FAILED);
    collector.register_counter(&SESSION_DISCARDED);
    collector.register_counter(&SESSION_CLEARS);
    collector.register_moments(&SESSION_TURN_DURATION);
}
