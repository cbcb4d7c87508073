//! Everything a line of user input can ask for.

use remote_proto::protocol::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ── Playback ─────────────────────────────────────────────────────────────
    SendCommand(Command),
    Refresh,

    // ── Settings ─────────────────────────────────────────────────────────────
    Set { key: String, value: String },

    // ── Session ──────────────────────────────────────────────────────────────
    /// Consumer visible again: resume polling.
    Focus,
    /// Consumer hidden: stop polling.
    Blur,

    // ── System ───────────────────────────────────────────────────────────────
    Help,
    Quit,
    Noop,
}

pub const HELP: &str = "\
commands:
  pause | p            toggle pause
  up | +               volume up
  down | -             volume down
  vol <n>              set volume
  fwd | back           skip 10s forward / backward
  sub <id>             select subtitle track
  refresh | r          poll status now
  set address <host>   change the server address
  set port <port>      change the server port
  focus | blur         resume / suspend polling
  help | ?             this text
  quit | q             exit";

impl Action {
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(Action::Noop);
        };
        let arg = words.next();

        let action = match (verb, arg) {
            ("pause" | "p", None) => Action::SendCommand(Command::TogglePause),
            ("up" | "+", None) => Action::SendCommand(Command::VolumeUp),
            ("down" | "-", None) => Action::SendCommand(Command::VolumeDown),
            ("fwd", None) => Action::SendCommand(Command::SkipForward),
            ("back", None) => Action::SendCommand(Command::SkipBackward),
            ("vol", Some(n)) => {
                let volume = n
                    .parse::<i16>()
                    .map_err(|_| format!("not a volume: {}", n))?;
                Action::SendCommand(Command::SetVolume { volume })
            }
            ("sub", Some(id)) => Action::SendCommand(Command::Subtitle { id: id.to_string() }),
            ("refresh" | "r", None) => Action::Refresh,
            ("set", Some(key)) => {
                let value = words.collect::<Vec<_>>().join(" ");
                if value.is_empty() {
                    return Err(format!("usage: set {} <value>", key));
                }
                return Ok(Action::Set {
                    key: key.to_string(),
                    value,
                });
            }
            ("focus", None) => Action::Focus,
            ("blur", None) => Action::Blur,
            ("help" | "?", None) => Action::Help,
            ("quit" | "q" | "exit", None) => Action::Quit,
            _ => return Err(format!("unknown command: {} (try help)", line.trim())),
        };

        if words.next().is_some() {
            return Err(format!("too many arguments: {}", line.trim()));
        }
        Ok(action)
    }
}
