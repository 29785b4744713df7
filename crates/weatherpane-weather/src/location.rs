//! Location resolution.
//!
//! Two interchangeable providers sit behind [`LocationProvider`]: the
//! platform's native geolocation service and an IP-geolocation HTTP lookup.
//! Both return [`Coordinates`], so callers never see provider-specific shapes.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;
use weatherpane_core::{LocationConfig, LocationError, LocationStrategy, NetworkError, ReqwestErrorExt};

use crate::types::Coordinates;

#[cfg(target_os = "linux")]
mod geoclue;
#[cfg(windows)]
mod winrt;

const IP_LOOKUP_TIMEOUT_SECS: u64 = 10;

/// A source of the user's current position.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Whether this provider can be asked at all on this machine
    async fn is_available(&self) -> bool;

    /// Request the current position once
    async fn locate(&self) -> Result<Coordinates, LocationError>;
}

/// Platform geolocation: GeoClue2 on Linux, the WinRT geolocator on Windows.
#[derive(Debug, Clone)]
pub struct NativeLocationProvider {
    timeout: Duration,
}

impl NativeLocationProvider {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl LocationProvider for NativeLocationProvider {
    fn name(&self) -> &'static str {
        "native"
    }

    async fn is_available(&self) -> bool {
        #[cfg(target_os = "linux")]
        {
            geoclue::is_available().await
        }
        #[cfg(windows)]
        {
            true
        }
        #[cfg(not(any(target_os = "linux", windows)))]
        {
            false
        }
    }

    async fn locate(&self) -> Result<Coordinates, LocationError> {
        #[cfg(target_os = "linux")]
        let request = geoclue::locate();
        #[cfg(windows)]
        let request = winrt::locate();
        #[cfg(not(any(target_os = "linux", windows)))]
        let request = async { Err::<Coordinates, _>(LocationError::ServiceUnavailable) };

        bounded(self.timeout, request).await
    }
}

/// Give up on `request` after `limit`, reporting [`LocationError::Timeout`]
async fn bounded<F>(limit: Duration, request: F) -> Result<Coordinates, LocationError>
where
    F: Future<Output = Result<Coordinates, LocationError>>,
{
    match tokio::time::timeout(limit, request).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("Native location did not answer within {:?}", limit);
            Err(LocationError::Timeout)
        }
    }
}

/// Body returned by the IP-geolocation endpoint.
///
/// Only the coordinates are used; services add many more fields.
#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

/// Approximate position from the caller's public IP address.
#[derive(Debug, Clone)]
pub struct IpLocationProvider {
    client: Client,
    url: String,
}

impl IpLocationProvider {
    pub fn new(url: impl Into<String>) -> Result<Self, LocationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(IP_LOOKUP_TIMEOUT_SECS))
            .build()
            .map_err(|e| e.into_network_error())?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl LocationProvider for IpLocationProvider {
    fn name(&self) -> &'static str {
        "ip"
    }

    async fn is_available(&self) -> bool {
        true
    }

    #[instrument(skip(self), fields(url = %self.url), level = "debug")]
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| e.into_network_error())?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message: format!("IP lookup failed with status {status}"),
            }
            .into());
        }

        let body: IpLookupResponse = response
            .json()
            .await
            .map_err(|e| LocationError::InvalidResponse(e.to_string()))?;

        if body.error {
            return Err(LocationError::InvalidResponse(
                body.reason.unwrap_or_else(|| "lookup service reported an error".to_string()),
            ));
        }

        match (body.latitude, body.longitude) {
            (Some(latitude), Some(longitude)) => Ok(Coordinates::new(latitude, longitude)),
            _ => Err(LocationError::InvalidResponse(
                "response has no latitude/longitude".to_string(),
            )),
        }
    }
}

/// Pick a provider according to `strategy` and ask it once.
///
/// With [`LocationStrategy::Auto`] the native provider is used whenever it is
/// available. A native denial or timeout is returned as-is rather than
/// retried through the IP lookup.
pub async fn resolve_with(
    strategy: LocationStrategy,
    native: &dyn LocationProvider,
    fallback: &dyn LocationProvider,
) -> Result<Coordinates, LocationError> {
    let provider = match strategy {
        LocationStrategy::Native => native,
        LocationStrategy::Ip => fallback,
        LocationStrategy::Auto => {
            if native.is_available().await {
                native
            } else {
                tracing::info!("Native location unavailable, using {} lookup", fallback.name());
                fallback
            }
        }
    };

    tracing::debug!("Resolving location with {} provider", provider.name());
    let coords = provider.locate().await?;
    tracing::info!(
        "Got location from {}: {}, {}",
        provider.name(),
        coords.latitude,
        coords.longitude
    );
    Ok(coords)
}

/// Resolve the current position using the configured providers
pub async fn resolve_location(config: &LocationConfig) -> Result<Coordinates, LocationError> {
    let native = NativeLocationProvider::new(config.native_timeout());
    let fallback = IpLocationProvider::new(config.ip_lookup_url.clone())?;
    resolve_with(config.strategy, &native, &fallback).await
}
