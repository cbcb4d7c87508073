//! One-line rendering of `RemoteState` for the terminal.
use remote_proto::protocol::format_time;
use remote_sync::RemoteState;

pub fn render(state: &RemoteState) -> String {
    let connection = state.connection.label();
    let Some(status) = &state.status else {
        return format!("[{}] no status", connection);
    };

    let icon = if status.paused { "||" } else { ">" };
    format!(
        "[{}] {} {}  {}/{}  vol {}  sub {}",
        connection,
        icon,
        status.display_title(),
        format_time(Some(status.position)),
        format_time(Some(status.length)),
        status.volume.round(),
        state.subtitle.label,
    )
}
