use crate::error::Error;
use log::debug;
use serde::Serialize;
use serde_json::Value;

/// The channel every network stubbing event is sent on.
pub const NET_EVENT_CHANNEL: &str = "net:event";

/// A connection to the test driver.
///
/// Messages are fire-and-forget: no acknowledgment is awaited.
/// Closures with a compatible signature implement `DriverSocket` out of the box.
pub trait DriverSocket: Send + Sync {
    fn to_driver(&self, channel: &str, event_name: &str, payload: Value);
}

impl<F> DriverSocket for F
where
    F: Fn(&str, &str, Value),
    F: Send + Sync,
{
    fn to_driver(&self, channel: &str, event_name: &str, payload: Value) {
        self(channel, event_name, payload)
    }
}

/// Send the `event_name` event, carrying `data`, to the test driver.
///
/// It fails only if `data` cannot be represented as JSON, in which case nothing is sent.
pub fn emit<S, T>(socket: &S, event_name: &str, data: &T) -> Result<(), Error>
where
    S: DriverSocket + ?Sized,
    T: Serialize + ?Sized,
{
    let payload = serde_json::to_value(data)?;
    debug!("Sending event to driver: {} {}", event_name, payload);
    socket.to_driver(NET_EVENT_CHANNEL, event_name, payload);
    Ok(())
}
