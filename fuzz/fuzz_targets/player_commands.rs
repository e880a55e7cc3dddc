#![no_main]

use libfuzzer_sys::fuzz_target;
use songdeck::core::DeckCore;
use songdeck::model::{PersistedState, Song};

fuzz_target!(|data: &[u8]| {
    let mut core = DeckCore::from_persisted(PersistedState::default());
    let len = (data.len() % 16).max(2);
    for idx in 0..len {
        let id = format!("S{idx}");
        let song = Song::new(
            id.clone(),
            format!("Track {idx}"),
            "Artist",
            "Pop",
            "Album",
            2000 + idx as i32,
        );
        let _ = core.add_song(song);
        if idx % 2 == 0 {
            let _ = core.create_playlist("mix");
            let _ = core.add_to_playlist("mix", &id);
        }
    }

    for byte in data {
        let id = format!("S{}", byte % 16);
        match byte % 8 {
            0 => {
                let _ = core.play_song(&id);
            }
            1 => {
                let _ = core.play_playlist("mix", None);
            }
            2 => {
                let _ = core.next_song();
            }
            3 => {
                let _ = core.prev_song();
            }
            4 => {
                let _ = core.stop();
            }
            5 => {
                let _ = core.delete_song(&id);
            }
            6 => {
                let _ = core.remove_from_playlist("mix", &id);
            }
            _ => {
                let _ = core.play_similar();
            }
        }

        // Whatever the command mix, a non-idle cursor must resolve, and a
        // playlist-scoped cursor must still be a member of its playlist.
        if let Some(current) = core.player.current() {
            assert!(core.current_song().is_some(), "dangling cursor {current}");
            if let songdeck::player::PlayerState::Playlist { name, cursor } = core.player.state() {
                assert!(
                    core.playlists
                        .get(name)
                        .is_some_and(|playlist| playlist.contains(cursor)),
                    "cursor {cursor} left playlist {name}"
                );
            }
        }
    }
});
