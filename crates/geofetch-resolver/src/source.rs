//! Uniform "attempt" wrappers over the two location capabilities.

use geofetch_core::{DeviceGeolocation, IpGeolocation};

use crate::error::ResolveError;

/// Adapts device and IP geolocation into attempts that each produce a
/// location string or a [`ResolveError`].
///
/// Attempts are lazy: nothing is requested from a capability until the
/// returned future is first polled.
pub struct LocationSource<D, I> {
    device: D,
    ip: I,
}

impl<D, I> LocationSource<D, I>
where
    D: DeviceGeolocation,
    I: IpGeolocation,
{
    pub fn new(device: D, ip: I) -> Self {
        Self { device, ip }
    }

    /// Asks the device for a fix and formats it as `"lat lon"`.
    ///
    /// # Errors
    ///
    /// [`ResolveError::Device`] when the capability is absent, denied, or
    /// fails; [`ResolveError::UnusableCoordinates`] for a zero/NaN/out-of-range fix.
    pub async fn device_attempt(&self) -> Result<String, ResolveError> {
        let coords = self
            .device
            .current_position()
            .await
            .map_err(ResolveError::Device)?;
        if !coords.is_usable() {
            return Err(ResolveError::UnusableCoordinates {
                latitude: coords.latitude,
                longitude: coords.longitude,
            });
        }
        Ok(coords.to_location_string())
    }

    /// Looks up the location by IP. The service's `loc` string is passed
    /// through as-is apart from surrounding whitespace.
    ///
    /// # Errors
    ///
    /// [`ResolveError::IpLookup`] when the lookup fails;
    /// [`ResolveError::EmptyIpLocation`] when it succeeds without a location.
    pub async fn ip_attempt(&self) -> Result<String, ResolveError> {
        let info = self.ip.lookup().await.map_err(ResolveError::IpLookup)?;
        let loc = info.loc.trim();
        if loc.is_empty() {
            return Err(ResolveError::EmptyIpLocation);
        }
        Ok(loc.to_owned())
    }
}
