//! Command ids.
//!
//! The protocol has no request ids: a response carries the same command id as
//! its request, and that id is the only correlation key available.

use std::fmt;

/// Well-known command ids of the SDK protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Command {
    RequestControllerCount = 0,
    RequestControllerData = 1,
    RequestProtocolVersion = 40,
    SetClientName = 50,
    DeviceListUpdated = 100,
    RequestProfiles = 150,
    SaveProfile = 151,
    LoadProfile = 152,
    DeleteProfile = 153,
    RequestPlugins = 200,
    PluginSpecific = 201,
    ResizeZone = 1000,
    UpdateLeds = 1050,
    UpdateZoneLeds = 1051,
    UpdateSingleLed = 1052,
    SetCustomMode = 1100,
    UpdateMode = 1101,
    SaveMode = 1102,
}

impl Command {
    pub const ALL: [Command; 18] = [
        Command::RequestControllerCount,
        Command::RequestControllerData,
        Command::RequestProtocolVersion,
        Command::SetClientName,
        Command::DeviceListUpdated,
        Command::RequestProfiles,
        Command::SaveProfile,
        Command::LoadProfile,
        Command::DeleteProfile,
        Command::RequestPlugins,
        Command::PluginSpecific,
        Command::ResizeZone,
        Command::UpdateLeds,
        Command::UpdateZoneLeds,
        Command::UpdateSingleLed,
        Command::SetCustomMode,
        Command::UpdateMode,
        Command::SaveMode,
    ];

    /// Wire value of this command.
    pub const fn id(self) -> u32 {
        self as u32
    }

    /// Look up a known command by wire value.
    pub fn from_u32(id: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|cmd| cmd.id() == id)
    }

    /// Lowest negotiated protocol version at which the server understands this command.
    pub const fn min_protocol_version(self) -> u32 {
        match self {
            Command::RequestProfiles
            | Command::SaveProfile
            | Command::LoadProfile
            | Command::DeleteProfile => 2,
            Command::SaveMode => 3,
            Command::RequestPlugins | Command::PluginSpecific => 4,
            _ => 0,
        }
    }

    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Command::RequestControllerCount => "REQUEST_CONTROLLER_COUNT",
            Command::RequestControllerData => "REQUEST_CONTROLLER_DATA",
            Command::RequestProtocolVersion => "REQUEST_PROTOCOL_VERSION",
            Command::SetClientName => "SET_CLIENT_NAME",
            Command::DeviceListUpdated => "DEVICE_LIST_UPDATED",
            Command::RequestProfiles => "REQUEST_PROFILE_LIST",
            Command::SaveProfile => "REQUEST_SAVE_PROFILE",
            Command::LoadProfile => "REQUEST_LOAD_PROFILE",
            Command::DeleteProfile => "REQUEST_DELETE_PROFILE",
            Command::RequestPlugins => "REQUEST_PLUGIN_LIST",
            Command::PluginSpecific => "PLUGIN_SPECIFIC",
            Command::ResizeZone => "RGBCONTROLLER_RESIZEZONE",
            Command::UpdateLeds => "RGBCONTROLLER_UPDATELEDS",
            Command::UpdateZoneLeds => "RGBCONTROLLER_UPDATEZONELEDS",
            Command::UpdateSingleLed => "RGBCONTROLLER_UPDATESINGLELED",
            Command::SetCustomMode => "RGBCONTROLLER_SETCUSTOMMODE",
            Command::UpdateMode => "RGBCONTROLLER_UPDATEMODE",
            Command::SaveMode => "RGBCONTROLLER_SAVEMODE",
        }
    }
}

impl From<Command> for u32 {
    fn from(cmd: Command) -> Self {
        cmd.id()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.id())
    }
}

/// Returns a human-readable name for a raw command id.
pub fn command_name(id: u32) -> &'static str {
    Command::from_u32(id).map_or("UNKNOWN", Command::name)
}

/// Returns true if the id is the asynchronous device-list notification.
pub fn is_notification(id: u32) -> bool {
    id == Command::DeviceListUpdated.id()
}
