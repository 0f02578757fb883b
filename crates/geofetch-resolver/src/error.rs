use geofetch_core::SourceError;
use thiserror::Error;

/// Every way a resolution or fetch can go wrong.
///
/// None of these ever crosses the crate boundary as an `Err`; each is
/// classified by [`ResolveError::disposition`] and ends in a log line, a
/// ui-state emission, or both.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Device geolocation is absent, denied, or errored.
    #[error("device geolocation failed")]
    Device(#[source] SourceError),

    /// Device geolocation answered with coordinates that cannot be used.
    #[error("device returned unusable coordinates ({latitude}, {longitude})")]
    UnusableCoordinates { latitude: f64, longitude: f64 },

    #[error("IP lookup failed")]
    IpLookup(#[source] SourceError),

    #[error("IP lookup returned an empty location")]
    EmptyIpLocation,

    /// The issues service answered with `invalidAddress`.
    #[error("issue service rejected the address")]
    InvalidAddress,

    /// The issues service could not be reached or answered garbage.
    #[error("issue service request failed")]
    Transport(#[source] SourceError),
}

/// What happens after an error is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Recoverable: move on to the next location source.
    Fallback,
    /// Already turned into a `LOCATION_ERROR` ui-state emission.
    Handled,
    /// Logged and swallowed; no further state change.
    Terminal,
}

impl ResolveError {
    #[must_use]
    pub fn disposition(&self) -> Disposition {
        match self {
            ResolveError::Device(_) | ResolveError::UnusableCoordinates { .. } => {
                Disposition::Fallback
            }
            ResolveError::IpLookup(_)
            | ResolveError::EmptyIpLocation
            | ResolveError::InvalidAddress => Disposition::Handled,
            ResolveError::Transport(_) => Disposition::Terminal,
        }
    }

    /// Logs the error at the level its disposition calls for.
    pub(crate) fn log(&self, context: &'static str) {
        let cause = std::error::Error::source(self).map(ToString::to_string);
        match self.disposition() {
            Disposition::Fallback => {
                tracing::warn!(context, error = %self, cause = ?cause, "falling back");
            }
            Disposition::Handled => {
                tracing::warn!(context, error = %self, cause = ?cause, "reporting location error");
            }
            Disposition::Terminal => {
                tracing::error!(context, error = %self, cause = ?cause, "giving up");
            }
        }
    }
}
