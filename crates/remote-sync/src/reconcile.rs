//! Derived, UI-facing projections of a `PlayerStatus`.
use remote_proto::protocol::{PlayerStatus, SubtitleSelection};

/// Resolve the active subtitle id against the track list.
///
/// The id arrives as text (`"2"`, or `"false"` when subtitles are off) while
/// track ids are integers, so both sides are compared as integers.
pub fn resolve(status: &PlayerStatus) -> SubtitleSelection {
    let id = status.subtitle_id.trim();
    let Ok(wanted) = id.parse::<i64>() else {
        return SubtitleSelection::none();
    };

    status
        .subtitle_tracks
        .iter()
        .find(|track| track.id == wanted)
        .map(|track| SubtitleSelection {
            label: track.title.clone(),
            track_id: id.to_string(),
        })
        .unwrap_or_else(SubtitleSelection::none)
}

/// `resolve` over "maybe no data".
pub fn resolve_opt(status: Option<&PlayerStatus>) -> SubtitleSelection {
    status.map(resolve).unwrap_or_else(SubtitleSelection::none)
}
