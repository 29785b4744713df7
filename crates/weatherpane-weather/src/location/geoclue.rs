//! GeoClue2 client over the system D-Bus.

use futures::StreamExt;
use weatherpane_core::LocationError;
use zbus::zvariant::{ObjectPath, OwnedObjectPath};
use zbus::{proxy, Connection};

use crate::types::Coordinates;

const GEOCLUE_SERVICE: &str = "org.freedesktop.GeoClue2";
const DESKTOP_ID: &str = "weatherpane";
/// GCLUE_ACCURACY_LEVEL_CITY
const ACCURACY_LEVEL_CITY: u32 = 4;

#[proxy(
    interface = "org.freedesktop.GeoClue2.Manager",
    default_service = "org.freedesktop.GeoClue2",
    default_path = "/org/freedesktop/GeoClue2/Manager",
    gen_blocking = false
)]
trait Manager {
    fn get_client(&self) -> zbus::Result<OwnedObjectPath>;
}

#[proxy(
    interface = "org.freedesktop.GeoClue2.Client",
    default_service = "org.freedesktop.GeoClue2",
    gen_blocking = false
)]
trait Client {
    fn start(&self) -> zbus::Result<()>;

    fn stop(&self) -> zbus::Result<()>;

    #[zbus(property)]
    fn set_desktop_id(&self, id: &str) -> zbus::Result<()>;

    #[zbus(property)]
    fn set_requested_accuracy_level(&self, level: u32) -> zbus::Result<()>;

    #[zbus(signal)]
    fn location_updated(&self, old: ObjectPath<'_>, new: ObjectPath<'_>) -> zbus::Result<()>;
}

#[proxy(
    interface = "org.freedesktop.GeoClue2.Location",
    default_service = "org.freedesktop.GeoClue2",
    gen_blocking = false
)]
trait Location {
    #[zbus(property)]
    fn latitude(&self) -> zbus::Result<f64>;

    #[zbus(property)]
    fn longitude(&self) -> zbus::Result<f64>;
}

/// Map a D-Bus failure onto a location error.
fn classify(err: zbus::Error) -> LocationError {
    let text = err.to_string();
    if text.contains("AccessDenied") {
        tracing::warn!("GeoClue denied location access: {}", text);
        LocationError::PermissionDenied
    } else {
        tracing::debug!("GeoClue request failed: {}", text);
        LocationError::ServiceUnavailable
    }
}

/// True when GeoClue is running or can be activated on the system bus
pub async fn is_available() -> bool {
    let conn = match Connection::system().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::debug!("No system bus: {}", e);
            return false;
        }
    };

    let dbus = match zbus::fdo::DBusProxy::new(&conn).await {
        Ok(proxy) => proxy,
        Err(e) => {
            tracing::debug!("Failed to create D-Bus proxy: {}", e);
            return false;
        }
    };

    let has_name = |names: Vec<zbus::names::OwnedBusName>| {
        names.iter().any(|name| name.as_str() == GEOCLUE_SERVICE)
    };

    if dbus.list_names().await.map(has_name).unwrap_or(false) {
        return true;
    }
    dbus.list_activatable_names()
        .await
        .map(has_name)
        .unwrap_or(false)
}

/// A started GeoClue client, stopped again when dropped.
///
/// Covers early returns and a caller's timeout dropping the request.
struct RunningClient(ClientProxy<'static>);

impl Drop for RunningClient {
    fn drop(&mut self) {
        let client = self.0.clone();
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                if let Err(e) = client.stop().await {
                    tracing::debug!("Failed to stop GeoClue client: {}", e);
                }
            });
        }
    }
}

/// Ask GeoClue for one position update.
///
/// Waits for the first `LocationUpdated` signal; the caller bounds the wait.
pub async fn locate() -> Result<Coordinates, LocationError> {
    let conn = Connection::system().await.map_err(classify)?;

    let manager = ManagerProxy::new(&conn).await.map_err(classify)?;
    let client_path = manager.get_client().await.map_err(classify)?;

    let client: ClientProxy<'static> = ClientProxy::builder(&conn)
        .path(client_path)
        .map_err(classify)?
        .build()
        .await
        .map_err(classify)?;

    client.set_desktop_id(DESKTOP_ID).await.map_err(classify)?;
    client
        .set_requested_accuracy_level(ACCURACY_LEVEL_CITY)
        .await
        .map_err(classify)?;

    // Subscribe before starting so the first update is not missed
    let mut updates = client.receive_location_updated().await.map_err(classify)?;
    client.start().await.map_err(classify)?;
    let _running = RunningClient(client.clone());

    let signal = updates
        .next()
        .await
        .ok_or_else(|| LocationError::InvalidResponse("GeoClue update stream ended".into()))?;
    let args = signal.args().map_err(classify)?;

    let location = LocationProxy::builder(&conn)
        .path(args.new().to_owned())
        .map_err(classify)?
        .build()
        .await
        .map_err(classify)?;

    let latitude = location.latitude().await.map_err(classify)?;
    let longitude = location.longitude().await.map_err(classify)?;

    Ok(Coordinates::new(latitude, longitude))
}
