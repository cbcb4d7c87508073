use std::sync::{Mutex, MutexGuard};

use remote_proto::protocol::{ConnectionState, PlayerStatus, SubtitleSelection};
use tokio::sync::watch;

use crate::reconcile;

/// Everything the rendering layer reads.  `rev` increases on every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteState {
    pub rev: u64,
    /// Latest validated status, `None` when the last poll failed.
    pub status: Option<PlayerStatus>,
    /// Always `reconcile::resolve_opt(status)`.
    pub subtitle: SubtitleSelection,
    pub connection: ConnectionState,
}

/// Captured at the start of a tick; a result is only applied if the epoch
/// it was captured under is still current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Epoch {
    session: u64,
    health: u64,
}

#[derive(Debug, Default)]
struct Epochs {
    running: bool,
    session: u64,
    health: u64,
}

/// Single owner of `RemoteState`.  Writers are the poller and the health
/// monitor; readers subscribe to the watch channel.
pub struct StateManager {
    tx: watch::Sender<RemoteState>,
    epochs: Mutex<Epochs>,
}

impl StateManager {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(RemoteState::default());
        Self {
            tx,
            epochs: Mutex::new(Epochs::default()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<RemoteState> {
        self.tx.subscribe()
    }

    pub fn get_state(&self) -> RemoteState {
        self.tx.borrow().clone()
    }

    fn epochs(&self) -> MutexGuard<'_, Epochs> {
        self.epochs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// `None` while no session is running.
    pub fn epoch(&self) -> Option<Epoch> {
        let epochs = self.epochs();
        epochs.running.then_some(Epoch {
            session: epochs.session,
            health: epochs.health,
        })
    }

    pub fn is_running(&self) -> bool {
        self.epochs().running
    }

    /// Open a new session: older in-flight results become stale and the
    /// connection goes back to `Pending`.
    pub fn begin_session(&self) {
        let mut epochs = self.epochs();
        epochs.running = true;
        epochs.session += 1;
        epochs.health += 1;
        self.tx.send_if_modified(|state| {
            if state.connection == ConnectionState::Pending {
                return false;
            }
            state.connection = ConnectionState::Pending;
            state.rev += 1;
            true
        });
    }

    /// After this returns nothing captured under an earlier epoch is applied.
    pub fn end_session(&self) {
        let mut epochs = self.epochs();
        epochs.running = false;
        epochs.session += 1;
    }

    /// Endpoint changed: forget the health signal and reject pings that were
    /// started against the old endpoint.  Status is left alone.
    pub fn reset_health(&self) {
        let mut epochs = self.epochs();
        epochs.health += 1;
        self.tx.send_if_modified(|state| {
            if state.connection == ConnectionState::Pending {
                return false;
            }
            state.connection = ConnectionState::Pending;
            state.rev += 1;
            true
        });
    }

    /// Replace (or clear) the status and re-derive the subtitle selection in
    /// the same update.  Returns `false` if `epoch` is stale.
    pub fn apply_status(&self, epoch: Epoch, status: Option<PlayerStatus>) -> bool {
        let epochs = self.epochs();
        if !epochs.running || epochs.session != epoch.session {
            return false;
        }
        self.tx.send_if_modified(|state| {
            if state.status == status {
                return false;
            }
            state.subtitle = reconcile::resolve_opt(status.as_ref());
            state.status = status;
            state.rev += 1;
            true
        });
        true
    }

    /// Returns `false` if `epoch` is stale (session ended or health reset).
    pub fn apply_connection(&self, epoch: Epoch, connection: ConnectionState) -> bool {
        let epochs = self.epochs();
        if !epochs.running || epochs.session != epoch.session || epochs.health != epoch.health {
            return false;
        }
        self.tx.send_if_modified(|state| {
            if state.connection == connection {
                return false;
            }
            state.connection = connection;
            state.rev += 1;
            true
        });
        true
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remote_proto::protocol::SubtitleTrack;

    fn sample() -> PlayerStatus {
        PlayerStatus {
            volume: 50.0,
            paused: false,
            length: 120.0,
            position: 30.0,
            title: "movie.mkv".into(),
            file: "/x".into(),
            subtitle_id: "2".into(),
            subtitle_tracks: vec![SubtitleTrack {
                id: 2,
                title: "English".into(),
            }],
        }
    }

    #[test]
    fn test_no_epoch_before_session() {
        let sm = StateManager::new();
        assert!(sm.epoch().is_none());
        assert_eq!(sm.get_state().connection, ConnectionState::Pending);
        assert!(sm.get_state().status.is_none());
    }

    #[test]
    fn test_apply_status_derives_subtitle() {
        let sm = StateManager::new();
        sm.begin_session();
        let epoch = sm.epoch().unwrap();

        assert!(sm.apply_status(epoch, Some(sample())));
        let state = sm.get_state();
        assert_eq!(state.status, Some(sample()));
        assert_eq!(state.subtitle.label, "English");
        assert_eq!(state.subtitle.track_id, "2");

        assert!(sm.apply_status(epoch, None));
        let state = sm.get_state();
        assert!(state.status.is_none());
        assert_eq!(state.subtitle, SubtitleSelection::none());
    }

    #[test]
    fn test_results_after_end_session_are_discarded() {
        let sm = StateManager::new();
        sm.begin_session();
        let epoch = sm.epoch().unwrap();
        sm.end_session();

        assert!(!sm.apply_status(epoch, Some(sample())));
        assert!(!sm.apply_connection(epoch, ConnectionState::Connected));
        assert!(sm.get_state().status.is_none());
        assert_eq!(sm.get_state().connection, ConnectionState::Pending);
    }

    #[test]
    fn test_restarted_session_rejects_old_epoch() {
        let sm = StateManager::new();
        sm.begin_session();
        let old = sm.epoch().unwrap();
        sm.begin_session();

        assert!(!sm.apply_status(old, Some(sample())));
        assert!(sm.apply_status(sm.epoch().unwrap(), Some(sample())));
    }

    #[test]
    fn test_reset_health_keeps_status() {
        let sm = StateManager::new();
        sm.begin_session();
        let epoch = sm.epoch().unwrap();
        sm.apply_status(epoch, Some(sample()));
        sm.apply_connection(epoch, ConnectionState::Connected);

        sm.reset_health();
        let state = sm.get_state();
        assert_eq!(state.connection, ConnectionState::Pending);
        assert_eq!(state.status, Some(sample()));

        // ping started before the reset
        assert!(!sm.apply_connection(epoch, ConnectionState::Disconnected));
        assert_eq!(sm.get_state().connection, ConnectionState::Pending);
        // status is not tied to the health epoch
        assert!(sm.apply_status(epoch, None));
    }

    #[test]
    fn test_rev_only_moves_on_change() {
        let sm = StateManager::new();
        sm.begin_session();
        let epoch = sm.epoch().unwrap();
        sm.apply_status(epoch, Some(sample()));
        let rev = sm.get_state().rev;
        sm.apply_status(epoch, Some(sample()));
        assert_eq!(sm.get_state().rev, rev);
        sm.apply_connection(epoch, ConnectionState::Connected);
        assert_eq!(sm.get_state().rev, rev + 1);
    }
}
