//! Device position source for the command line, where the "device" is
//! whatever the operator passes as flags.

use std::time::Duration;

use geofetch_core::{Coordinates, DeviceGeolocation, SourceError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum CliDevice {
    /// Reports `coordinates` after `delay`, standing in for a slow fix.
    Fixed {
        coordinates: Coordinates,
        delay: Duration,
    },
    /// No position flags were given.
    Unavailable,
    /// The operator asked for a permission denial.
    Denied,
}

impl CliDevice {
    pub(crate) fn from_args(
        latitude: Option<f64>,
        longitude: Option<f64>,
        deny: bool,
        delay: Duration,
    ) -> Self {
        if deny {
            return Self::Denied;
        }
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Self::Fixed {
                coordinates: Coordinates {
                    latitude,
                    longitude,
                },
                delay,
            },
            _ => Self::Unavailable,
        }
    }
}

impl DeviceGeolocation for CliDevice {
    async fn current_position(&self) -> Result<Coordinates, SourceError> {
        match *self {
            Self::Fixed { coordinates, delay } => {
                tokio::time::sleep(delay).await;
                Ok(coordinates)
            }
            Self::Unavailable => Err(SourceError::Unavailable(
                "no --lat/--lon given".to_owned(),
            )),
            Self::Denied => Err(SourceError::Denied),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deny_wins_over_coordinates() {
        let device = CliDevice::from_args(Some(40.0), Some(-105.0), true, Duration::ZERO);
        assert_eq!(device, CliDevice::Denied);
    }

    #[test]
    fn missing_component_means_unavailable() {
        let device = CliDevice::from_args(Some(40.0), None, false, Duration::ZERO);
        assert_eq!(device, CliDevice::Unavailable);
    }

    #[tokio::test]
    async fn fixed_device_reports_its_coordinates() {
        let device = CliDevice::from_args(Some(40.0), Some(-105.0), false, Duration::ZERO);
        let fix = device.current_position().await.unwrap();
        assert_eq!(fix.to_location_string(), "40 -105");
    }

    #[tokio::test]
    async fn unavailable_device_errors() {
        let err = CliDevice::Unavailable.current_position().await.unwrap_err();
        assert!(matches!(err, SourceError::Unavailable(_)));
    }
}
