//! Property-based tests for playback state
//!
//! Uses proptest to verify invariants across many random inputs.

use encore_core::TrackRef;
use encore_playback::{
    History, LoopMode, PlaybackConfig, PlaybackState, Queue, Transition, Trigger, Volume,
};
use proptest::prelude::*;
use std::collections::HashMap;

// ===== Helpers =====

fn arbitrary_track() -> impl Strategy<Value = TrackRef> {
    (
        "[a-z0-9]{1,10}",                        // id
        "[A-Za-z ]{1,30}",                       // title
        proptest::option::of("[A-Za-z ]{1,20}"), // author
        0u64..600_000,                           // duration (ms)
    )
        .prop_map(|(id, title, author, duration_ms)| {
            let track = TrackRef::new(title, duration_ms).with_id(id);
            match author {
                Some(author) => track.with_author(author),
                None => track,
            }
        })
}

fn arbitrary_tracks(max: usize) -> impl Strategy<Value = Vec<TrackRef>> {
    prop::collection::vec(arbitrary_track(), 0..max)
}

fn id_counts(tracks: impl IntoIterator<Item = TrackRef>) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for track in tracks {
        *counts.entry(track.id.to_string()).or_insert(0) += 1;
    }
    counts
}

// ===== Property Tests =====

proptest! {
    /// Property: dequeue order equals enqueue order
    #[test]
    fn queue_is_fifo(tracks in arbitrary_tracks(50)) {
        let mut queue = Queue::new();
        for track in &tracks {
            queue.enqueue(track.clone());
        }

        let mut dequeued = Vec::new();
        while let Ok(track) = queue.dequeue_front() {
            dequeued.push(track);
        }

        prop_assert_eq!(dequeued, tracks);
    }

    /// Property: history never exceeds its cap and keeps the newest entries
    #[test]
    fn history_never_exceeds_max_size(
        max_size in 1usize..20,
        tracks in arbitrary_tracks(60)
    ) {
        let mut history = History::new(max_size);
        for track in &tracks {
            history.push(track.clone());
            prop_assert!(history.len() <= max_size);
        }

        let kept: Vec<TrackRef> = history.get_all().into_iter().cloned().collect();
        let skip = tracks.len().saturating_sub(max_size);
        prop_assert_eq!(kept, tracks[skip..].to_vec());
    }

    /// Property: shuffle is a permutation
    #[test]
    fn shuffle_preserves_multiset(tracks in arbitrary_tracks(40)) {
        let mut queue = Queue::new();
        for track in &tracks {
            queue.enqueue(track.clone());
        }

        queue.shuffle();

        prop_assert_eq!(queue.len(), tracks.len());
        prop_assert_eq!(id_counts(queue.snapshot()), id_counts(tracks.clone()));
        if tracks.len() <= 1 {
            prop_assert_eq!(queue.snapshot(), tracks);
        }
    }

    /// Property: volume always stays within bounds
    #[test]
    fn volume_stays_in_range(
        start in 0u16..=1000,
        deltas in prop::collection::vec(-2000i32..2000, 1..30)
    ) {
        let mut volume = Volume::new(start, 1000);
        for delta in deltas {
            let before = i32::from(volume.level());
            let after = volume.adjust(delta);
            prop_assert!(after <= 1000);
            prop_assert_eq!(i32::from(after), (before + delta).clamp(0, 1000));
        }
    }

    /// Property: random operation sequences keep session invariants
    ///
    /// - history holds at most 10 entries
    /// - an idle session has nothing queued
    /// - a finish outside song loop promotes exactly the old queue head
    /// - tracks are never invented
    #[test]
    fn session_invariants_hold(
        tracks in arbitrary_tracks(30),
        operations in prop::collection::vec(0u8..7, 1..60)
    ) {
        let mut state = PlaybackState::new(PlaybackConfig::default());
        let mut pending = tracks.into_iter();
        let mut fed = 0usize;

        for op in operations {
            match op {
                0 | 1 => {
                    if let Some(track) = pending.next() {
                        state.request_play(track);
                        fed += 1;
                    }
                }
                2 => {
                    let expected = state.queue().front().cloned();
                    let song_loop = state.loop_mode() == LoopMode::Song && state.current().is_some();
                    let transition = state.advance(Trigger::TrackFinished);
                    if !song_loop {
                        if let Some(expected) = expected {
                            prop_assert_eq!(transition, Transition::Play(expected));
                        }
                    }
                }
                3 => {
                    let queue_was_empty = state.queue().is_empty();
                    let transition = state.advance(Trigger::TrackStopped);
                    if queue_was_empty {
                        prop_assert_eq!(transition, Transition::Disconnect);
                    }
                }
                4 => {
                    let history_before = state.history().len();
                    if state.previous().is_ok() {
                        prop_assert_eq!(state.history().len(), history_before - 1);
                    }
                }
                5 => {
                    state.cycle_loop_mode();
                }
                _ => {
                    state.shuffle();
                }
            }

            prop_assert!(state.history().len() <= 10);
            if state.current().is_none() {
                prop_assert!(state.queue().is_empty());
            }
            let held = usize::from(state.current().is_some())
                + state.queue().len()
                + state.history().len();
            prop_assert!(held <= fed);
        }
    }
}
