use serde::{Deserialize, Serialize};

/// Body the control server answers `/ping` with when it is alive.
pub const PING_REPLY: &str = "pong";

/// Host/port pair of the mpv control server.  Read fresh on every tick.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Absolute URL for `path` (which must start with `/`).
    pub fn url(&self, path: &str) -> String {
        format!("http://{}:{}{}", self.host, self.port, path)
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// One entry of the player's subtitle track list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    pub id: i64,
    pub title: String,
}

/// Snapshot served by `GET /mpv/status`.
///
/// Deserialization is the schema check: every field is required and typed,
/// so a payload either decodes whole or not at all.  Unknown fields are
/// ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatus {
    pub volume: f64,
    pub paused: bool,
    /// Seconds.
    pub length: f64,
    /// Seconds.
    pub position: f64,
    pub title: String,
    pub file: String,
    /// Active subtitle id as mpv reports it: `"2"`, or `"false"` / `""`
    /// when subtitles are off.
    #[serde(rename = "subtitle")]
    pub subtitle_id: String,
    #[serde(rename = "subtitles")]
    pub subtitle_tracks: Vec<SubtitleTrack>,
}

impl PlayerStatus {
    /// Decode and validate a raw response body.
    pub fn from_json(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }

    /// Title without the JSON quoting mpv leaves around string properties.
    pub fn display_title(&self) -> String {
        self.title.replace('"', "")
    }
}

/// Connectivity signal from the `/ping` monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Not checked yet against the current endpoint.
    #[default]
    Pending,
    Connected,
    Disconnected,
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Pending => "Checking...",
            ConnectionState::Connected => "Connected",
            ConnectionState::Disconnected => "Disconnected",
        }
    }
}

/// Human-readable view of the active subtitle track.  Always derived from a
/// `PlayerStatus`, never set directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleSelection {
    pub label: String,
    pub track_id: String,
}

impl SubtitleSelection {
    pub const NONE_LABEL: &'static str = "None";

    pub fn none() -> Self {
        Self {
            label: Self::NONE_LABEL.to_string(),
            track_id: String::new(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.track_id.is_empty()
    }
}

impl Default for SubtitleSelection {
    fn default() -> Self {
        Self::none()
    }
}

/// Control requests understood by the server under `/mpv/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    TogglePause,
    VolumeUp,
    VolumeDown,
    SetVolume { volume: i16 },
    SkipForward,
    SkipBackward,
    Subtitle { id: String },
}

impl Command {
    /// Path segment after `/mpv/`.
    pub fn name(&self) -> &'static str {
        match self {
            Command::TogglePause => "pause",
            Command::VolumeUp => "volume-up",
            Command::VolumeDown => "volume-down",
            Command::SetVolume { .. } => "set-volume",
            Command::SkipForward => "skip-forward",
            Command::SkipBackward => "skip-backward",
            Command::Subtitle { .. } => "subtitle",
        }
    }

    pub fn path(&self) -> String {
        format!("/mpv/{}", self.name())
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Command::SetVolume { volume } => vec![("volume", volume.to_string())],
            Command::Subtitle { id } => vec![("id", id.clone())],
            _ => Vec::new(),
        }
    }
}

/// `m:ss`, or `h:mm:ss` from one hour up.  `-` when the value is unknown.
pub fn format_time(seconds: Option<f64>) -> String {
    let Some(time) = seconds else {
        return "-".to_string();
    };
    let total = time.max(0.0).floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
