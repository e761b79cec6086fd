//! Queue randomization
//!
//! Pure random (Fisher-Yates): every permutation is equally likely.

use encore_core::TrackRef;
use rand::seq::SliceRandom;
use rand::Rng;

/// Shuffle tracks in place
pub(crate) fn shuffle_tracks<R: Rng + ?Sized>(tracks: &mut [TrackRef], rng: &mut R) {
    if tracks.len() <= 1 {
        return;
    }
    tracks.shuffle(rng);
}
