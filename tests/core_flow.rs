use songdeck::core::DeckCore;
use songdeck::error::DeckError;
use songdeck::model::{PersistedState, Song};
use songdeck::player::PlayerState;

fn core_with_songs(ids: &[&str]) -> DeckCore {
    let mut core = DeckCore::from_persisted(PersistedState::default());
    for id in ids {
        let song = Song::new(
            *id,
            format!("Title {id}"),
            "Artist",
            "Pop",
            "Album",
            2020,
        );
        core.add_song(song).expect("add");
    }
    core
}

#[test]
fn prev_walks_back_through_play_history() {
    let mut core = core_with_songs(&["A", "B", "C"]);

    core.play_song("A").expect("play A");
    core.play_song("B").expect("play B");
    core.play_song("C").expect("play C");

    assert_eq!(core.prev_song().expect("first prev"), "B");
    assert_eq!(core.prev_song().expect("second prev"), "A");
    assert_eq!(core.prev_song(), Err(DeckError::NoPreviousTrack));
    assert_eq!(core.player.current(), Some("A"));
}

#[test]
fn duplicate_titles_share_one_index_bucket() {
    let mut core = DeckCore::from_persisted(PersistedState::default());
    core.add_song(Song::new("S1", "Song One", "First", "Pop", "A", 2001))
        .expect("add S1");
    core.add_song(Song::new("S2", "Song One", "Second", "Rock", "B", 2002))
        .expect("add S2");

    let ids = core.catalog.search_title("song one").expect("bucket");
    assert_eq!(ids, ["S1", "S2"]);
}

#[test]
fn playlist_playback_walks_members_then_ends() {
    let mut core = core_with_songs(&["S1", "S2", "S3"]);
    core.create_playlist("mix").expect("create");
    for id in ["S1", "S2", "S3"] {
        core.add_to_playlist("mix", id).expect("member");
    }

    assert_eq!(core.play_playlist("mix", None).expect("start"), "S1");
    assert_eq!(core.next_song().expect("first next"), "S2");
    assert_eq!(core.next_song().expect("second next"), "S3");
    assert_eq!(core.next_song(), Err(DeckError::EndOfSequence));
    // The cursor stays on the last member after the sequence ends.
    assert_eq!(core.player.current(), Some("S3"));
}

#[test]
fn playlist_membership_is_not_repeatable() {
    let mut core = core_with_songs(&["S1"]);
    core.create_playlist("mix").expect("create");
    core.add_to_playlist("mix", "S1").expect("first add");

    assert_eq!(
        core.add_to_playlist("mix", "S1"),
        Err(DeckError::AlreadyMember {
            playlist: String::from("mix"),
            song: String::from("S1"),
        })
    );
    assert_eq!(core.playlists["mix"].len(), 1);
}

#[test]
fn deleting_the_playing_song_cascades_everywhere() {
    let mut core = core_with_songs(&["S1", "S2"]);
    core.create_playlist("mix").expect("create");
    core.add_to_playlist("mix", "S1").expect("member");
    core.play_song("S2").expect("play S2");
    core.play_song("S1").expect("play S1");

    let was_current = core.delete_song("S1").expect("delete");

    assert!(was_current);
    assert!(core.catalog.lookup("S1").is_none());
    assert!(core.catalog.search_title("Title S1").is_none());
    assert!(!core.playlists["mix"].contains("S1"));
    assert_eq!(*core.player.state(), PlayerState::Idle);
    assert_eq!(core.player.history_len(), 0);
}

#[test]
fn catalog_edits_do_not_reach_playlist_snapshots() {
    let mut core = core_with_songs(&["S1"]);
    core.create_playlist("mix").expect("create");
    core.add_to_playlist("mix", "S1").expect("member");

    let edit = songdeck::model::SongEdit {
        title: Some(String::from("Renamed")),
        ..Default::default()
    };
    core.update_song("S1", &edit).expect("update");

    assert_eq!(core.catalog.lookup("S1").expect("song").title, "Renamed");
    let snapshot = core.playlists["mix"].get("S1").expect("snapshot");
    assert_eq!(snapshot.title, "Title S1");
}
