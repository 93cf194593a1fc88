use thiserror::Error;

/// Errors raised while assembling a [TrafficManager](crate::TrafficManager).
///
/// A vehicle that cannot be inserted is not an error; it simply stays queued.
#[derive(Error, Debug)]
pub enum Error {
    #[error("no scheduler was provided")]
    MissingScheduler,
    #[error("no command interface was provided")]
    MissingCommandInterface,
    #[error("invalid update interval: {0} s")]
    InvalidUpdateInterval(f64),
    #[cfg(feature = "serde")]
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}
