use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::application::contact::{METRIC_EMAIL_FAILED, METRIC_EMAIL_SENT};
use crate::application::content::{METRIC_CONTENT_FETCH, METRIC_CONTENT_FETCH_FAILED};
use crate::cache::{METRIC_CACHE_HIT, METRIC_CACHE_JOIN, METRIC_CACHE_MISS, METRIC_CACHE_STALE};
use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_CACHE_HIT,
            Unit::Count,
            "Query cache lookups answered by a fresh entry."
        );
        describe_counter!(
            METRIC_CACHE_MISS,
            Unit::Count,
            "Query cache lookups that started a fetch."
        );
        describe_counter!(
            METRIC_CACHE_JOIN,
            Unit::Count,
            "Query cache lookups that joined a fetch already in flight."
        );
        describe_counter!(
            METRIC_CACHE_STALE,
            Unit::Count,
            "Stale entries served while a background refresh ran."
        );
        describe_counter!(
            METRIC_CONTENT_FETCH,
            Unit::Count,
            "Calls made to the configured content source."
        );
        describe_counter!(
            METRIC_CONTENT_FETCH_FAILED,
            Unit::Count,
            "Content source calls that returned an error."
        );
        describe_counter!(METRIC_EMAIL_SENT, Unit::Count, "Emails accepted by the provider.");
        describe_counter!(
            METRIC_EMAIL_FAILED,
            Unit::Count,
            "Emails the provider rejected or that never reached it."
        );
    });
}
