use tracing::{subscriber::set_global_default, Subscriber};
use tracing_subscriber::{fmt, fmt::MakeWriter, layer::SubscriberExt, EnvFilter, Registry};

use crate::{Error, Result};

// env_filter = trace|debug|info|warn|error|off, overridden by RUST_LOG
pub fn get_subscriber<Sink>(env_filter: &str, sink: Sink) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    Registry::default()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter)))
        .with(fmt::layer().with_target(true).with_writer(sink))
}

pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> Result<()> {
    set_global_default(subscriber).map_err(|err| Error::Logging(err.to_string()))
}

/// Log to stderr. Fails if a global subscriber is already installed.
pub fn init(env_filter: &str) -> Result<()> {
    init_subscriber(get_subscriber(env_filter, std::io::stderr))
}
