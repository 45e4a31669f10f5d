use bytes::Bytes;
use orgb_frame::{Command, WireReader};
use orgb_model::{
    decode_profile_list, Color, ControllerDataRequest, Device, Empty, Mode, NulString, Plugin,
    PluginSpecificArgs, ProtocolVersion, ResizeZoneArgs, UpdateLedsArgs, UpdateModeArgs,
    UpdateSingleLedArgs, UpdateZoneLedsArgs,
};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::ClientConfig;
use crate::connection::{Connection, ConnectionState, DeviceListUpdated};
use crate::error::{ClientError, Result};

/// Named SDK operations on top of a [`Connection`].
///
/// Operations that need a newer protocol than the negotiated one fail with
/// [`ClientError::NotSupported`] before anything is sent.
#[derive(Debug)]
pub struct OrgbClient {
    conn: Connection,
}

impl OrgbClient {
    /// Connect to `endpoint` and negotiate.
    pub async fn connect(endpoint: &str, config: ClientConfig) -> Result<Self> {
        Ok(Self {
            conn: Connection::open(endpoint, config).await?,
        })
    }

    /// Wrap an already connected [`Connection`].
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn protocol_version(&self) -> ProtocolVersion {
        self.conn.version()
    }

    pub fn state(&self) -> ConnectionState {
        self.conn.state()
    }

    fn require(&self, command: Command) -> Result<()> {
        let required = command.min_protocol_version();
        let negotiated = self.conn.version().number();
        if negotiated < required {
            return Err(ClientError::NotSupported {
                operation: command.name(),
                required,
                negotiated,
            });
        }
        Ok(())
    }

    /// Number of controllers the server exposes.
    pub async fn controller_count(&self) -> Result<u32> {
        self.conn
            .request(Command::RequestControllerCount, 0, &Empty, |reply, _, _| {
                Ok(WireReader::new(reply).get_u32()?)
            })
            .await
    }

    /// Fetch controller `index`, checked against a fresh controller count.
    pub async fn controller_data(&self, index: u32) -> Result<Device> {
        let count = self.controller_count().await?;
        if index >= count {
            return Err(ClientError::Argument(format!(
                "controller index {index} out of range (server has {count})"
            )));
        }
        self.fetch_controller(index).await
    }

    /// Fetch every controller in index order.
    pub async fn all_controllers(&self) -> Result<Vec<Device>> {
        let count = self.controller_count().await?;
        debug!(count, "fetching all controllers");
        let mut devices = Vec::with_capacity(count as usize);
        for index in 0..count {
            devices.push(self.fetch_controller(index).await?);
        }
        Ok(devices)
    }

    async fn fetch_controller(&self, index: u32) -> Result<Device> {
        let request = ControllerDataRequest(self.conn.version());
        self.conn
            .request(Command::RequestControllerData, index, &request, Device::from_payload)
            .await
    }

    /// Set every LED of a device, in LED order.
    pub async fn update_leds(&self, device: u32, colors: &[Color]) -> Result<()> {
        self.conn
            .send(Command::UpdateLeds, device, &UpdateLedsArgs { colors })
            .await
    }

    /// Set the LEDs of one zone.
    pub async fn update_zone_leds(&self, device: u32, zone: u32, colors: &[Color]) -> Result<()> {
        self.conn
            .send(Command::UpdateZoneLeds, device, &UpdateZoneLedsArgs { zone, colors })
            .await
    }

    pub async fn update_single_led(&self, device: u32, led: i32, color: Color) -> Result<()> {
        self.conn
            .send(Command::UpdateSingleLed, device, &UpdateSingleLedArgs { led, color })
            .await
    }

    /// Change the LED count of a resizable zone.
    pub async fn resize_zone(&self, device: u32, zone: i32, size: i32) -> Result<()> {
        if size < 0 {
            return Err(ClientError::Argument(format!("zone size {size} is negative")));
        }
        self.conn
            .send(Command::ResizeZone, device, &ResizeZoneArgs { zone, size })
            .await
    }

    /// Switch a device to its direct-control mode.
    pub async fn set_custom_mode(&self, device: u32) -> Result<()> {
        self.conn.send(Command::SetCustomMode, device, &Empty).await
    }

    /// Make `mode` the device's active mode with the mode's current settings.
    pub async fn update_mode(&self, device: u32, mode: &Mode) -> Result<()> {
        let args = UpdateModeArgs {
            mode,
            version: self.conn.version(),
        };
        self.conn.send(Command::UpdateMode, device, &args).await
    }

    /// Like [`update_mode`](Self::update_mode), and persist it on the device.
    pub async fn save_mode(&self, device: u32, mode: &Mode) -> Result<()> {
        self.require(Command::SaveMode)?;
        let args = UpdateModeArgs {
            mode,
            version: self.conn.version(),
        };
        self.conn.send(Command::SaveMode, device, &args).await
    }

    /// Names of the profiles saved on the server.
    pub async fn profiles(&self) -> Result<Vec<String>> {
        self.require(Command::RequestProfiles)?;
        self.conn
            .request(Command::RequestProfiles, 0, &Empty, |reply, _, _| {
                decode_profile_list(reply)
            })
            .await
    }

    pub async fn save_profile(&self, name: &str) -> Result<()> {
        self.profile_command(Command::SaveProfile, name).await
    }

    pub async fn load_profile(&self, name: &str) -> Result<()> {
        self.profile_command(Command::LoadProfile, name).await
    }

    pub async fn delete_profile(&self, name: &str) -> Result<()> {
        self.profile_command(Command::DeleteProfile, name).await
    }

    async fn profile_command(&self, command: Command, name: &str) -> Result<()> {
        self.require(command)?;
        if name.is_empty() {
            return Err(ClientError::Argument("profile name is empty".to_string()));
        }
        self.conn.send(command, 0, &NulString(name)).await
    }

    /// Plugins loaded by the server.
    pub async fn plugins(&self) -> Result<Vec<Plugin>> {
        self.require(Command::RequestPlugins)?;
        self.conn
            .request(Command::RequestPlugins, 0, &Empty, |reply, _, _| {
                Plugin::decode_list(reply)
            })
            .await
    }

    /// Send a plugin-defined packet to plugin `plugin` and return its raw reply.
    pub async fn plugin_specific(&self, plugin: u32, packet_type: u32, data: &[u8]) -> Result<Bytes> {
        self.require(Command::PluginSpecific)?;
        self.conn
            .request_raw(
                Command::PluginSpecific,
                plugin,
                &PluginSpecificArgs { packet_type, data },
            )
            .await
    }

    pub fn subscribe_device_list_updates(&self) -> broadcast::Receiver<DeviceListUpdated> {
        self.conn.subscribe_device_list_updates()
    }

    pub fn on_device_list_updated<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: Fn() + Send + 'static,
    {
        self.conn.on_device_list_updated(callback)
    }

    pub async fn dispose(&self) {
        self.conn.dispose().await;
    }
}
