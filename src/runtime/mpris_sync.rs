use std::time::Duration;

use crate::mpris::MprisHandle;
use crate::player::PlayerSnapshot;

/// Mirror the engine into the MPRIS state. Unchanged values are not re-signalled.
pub fn update_mpris(mpris: &MprisHandle, snapshot: &PlayerSnapshot) {
    let length = (snapshot.duration_seconds > 0.0)
        .then(|| Duration::from_secs_f64(snapshot.duration_seconds));
    mpris.set_track_metadata(snapshot.current_track.as_ref(), length);
    mpris.set_playback(snapshot.transport);
}
