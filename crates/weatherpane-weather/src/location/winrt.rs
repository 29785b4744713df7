//! Windows.Devices.Geolocation client.

use weatherpane_core::LocationError;
use windows::Devices::Geolocation::{GeolocationAccessStatus, Geolocator};

use crate::types::Coordinates;

fn unavailable(err: windows::core::Error) -> LocationError {
    tracing::debug!("Windows geolocation failed: {}", err);
    LocationError::ServiceUnavailable
}

fn locate_blocking() -> Result<Coordinates, LocationError> {
    let access = Geolocator::RequestAccessAsync()
        .and_then(|op| op.get())
        .map_err(unavailable)?;

    if access != GeolocationAccessStatus::Allowed {
        tracing::warn!("Windows denied location access: {:?}", access);
        return Err(LocationError::PermissionDenied);
    }

    let locator = Geolocator::new().map_err(unavailable)?;
    let position = locator
        .GetGeopositionAsync()
        .and_then(|op| op.get())
        .map_err(unavailable)?;
    let point = position
        .Coordinate()
        .and_then(|c| c.Point())
        .and_then(|p| p.Position())
        .map_err(unavailable)?;

    Ok(Coordinates::new(point.Latitude, point.Longitude))
}

/// Ask the WinRT geolocator for one position.
///
/// The WinRT calls block, so they run on the blocking pool.
pub async fn locate() -> Result<Coordinates, LocationError> {
    tokio::task::spawn_blocking(locate_blocking)
        .await
        .map_err(|e| LocationError::InvalidResponse(e.to_string()))?
}
