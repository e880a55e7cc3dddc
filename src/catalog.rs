use crate::error::{DeckError, Result};
use crate::model::{Song, SongEdit};
use crate::title_index::TitleIndex;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use std::collections::HashMap;

#[derive(Debug)]
struct Entry {
    song: Song,
    prev: Option<String>,
    next: Option<String>,
}

/// The master store of all songs: an id-addressed arena with
/// insertion-order links threaded through it, plus the title index.
/// Neighbor links carry ids only, so every secondary view (playlists,
/// player cursor, title buckets) survives arbitrary catalog mutation.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: HashMap<String, Entry>,
    head: Option<String>,
    tail: Option<String>,
    titles: TitleIndex,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Appends a song in insertion order and registers its title.
    pub fn insert(&mut self, song: Song) -> Result<()> {
        if self.entries.contains_key(&song.id) {
            return Err(DeckError::DuplicateId(song.id));
        }

        let id = song.id.clone();
        self.titles.insert(&song.title, &id);

        let prev = self.tail.replace(id.clone());
        match &prev {
            Some(prev_id) => {
                if let Some(tail) = self.entries.get_mut(prev_id) {
                    tail.next = Some(id.clone());
                }
            }
            None => self.head = Some(id.clone()),
        }

        self.entries.insert(id, Entry { song, prev, next: None });
        Ok(())
    }

    pub fn lookup(&self, id: &str) -> Option<&Song> {
        self.entries.get(id).map(|entry| &entry.song)
    }

    /// Songs in insertion order; also the traversal order for
    /// library-scoped playback.
    pub fn list(&self) -> Vec<&Song> {
        let mut out = Vec::with_capacity(self.entries.len());
        let mut cursor = self.head.as_deref();
        while let Some(id) = cursor {
            let Some(entry) = self.entries.get(id) else {
                break;
            };
            out.push(&entry.song);
            cursor = entry.next.as_deref();
        }
        out
    }

    /// Applies only the provided fields. A title change moves the id from
    /// the old title bucket to the new one in the same call.
    pub fn update(&mut self, id: &str, edit: &SongEdit) -> Result<()> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| DeckError::SongNotFound(id.to_string()))?;

        if let Some(title) = &edit.title
            && *title != entry.song.title
        {
            self.titles.remove(&entry.song.title, id);
            self.titles.insert(title, id);
            entry.song.title = title.clone();
        }
        if let Some(artist) = &edit.artist {
            entry.song.artist = artist.clone();
        }
        if let Some(genre) = &edit.genre {
            entry.song.genre = genre.clone();
        }
        if let Some(album) = &edit.album {
            entry.song.album = album.clone();
        }
        if let Some(year) = edit.year {
            entry.song.year = year;
        }
        Ok(())
    }

    /// Unlinks the song and clears its title registration. The caller owns
    /// the cascade into playlists and the player.
    pub fn delete(&mut self, id: &str) -> Result<Song> {
        let entry = self
            .entries
            .remove(id)
            .ok_or_else(|| DeckError::SongNotFound(id.to_string()))?;

        self.titles.remove(&entry.song.title, id);

        match entry.prev.as_deref() {
            Some(prev_id) => {
                if let Some(prev) = self.entries.get_mut(prev_id) {
                    prev.next = entry.next.clone();
                }
            }
            None => self.head = entry.next.clone(),
        }
        match entry.next.as_deref() {
            Some(next_id) => {
                if let Some(next) = self.entries.get_mut(next_id) {
                    next.prev = entry.prev.clone();
                }
            }
            None => self.tail = entry.prev.clone(),
        }

        Ok(entry.song)
    }

    pub fn first(&self) -> Option<&str> {
        self.head.as_deref()
    }

    pub fn successor(&self, id: &str) -> Option<&str> {
        self.entries.get(id)?.next.as_deref()
    }

    pub fn predecessor(&self, id: &str) -> Option<&str> {
        self.entries.get(id)?.prev.as_deref()
    }

    /// Exact lowercased-title lookup via the tree index.
    pub fn search_title(&self, title: &str) -> Option<&[String]> {
        self.titles.search(title)
    }

    /// Substring fallback the index cannot answer: linear scan over the
    /// catalog in insertion order.
    pub fn search_title_contains(&self, needle: &str) -> Vec<&Song> {
        let needle = needle.to_lowercase();
        self.list()
            .into_iter()
            .filter(|song| song.title.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn search_artist_contains(&self, needle: &str) -> Vec<&Song> {
        let needle = needle.to_lowercase();
        self.list()
            .into_iter()
            .filter(|song| song.artist.to_lowercase().contains(&needle))
            .collect()
    }

    /// Picks a random other song, preferring same artist, then same genre,
    /// then anything else.
    pub fn find_similar(&self, reference: &str, rng: &mut SmallRng) -> Option<&Song> {
        let reference = self.lookup(reference)?;
        let mut artist_matches = Vec::new();
        let mut genre_matches = Vec::new();
        let mut others = Vec::new();

        for song in self.list() {
            if song.id == reference.id {
                continue;
            }
            if song.artist.eq_ignore_ascii_case(&reference.artist) {
                artist_matches.push(song);
            } else if song.genre.eq_ignore_ascii_case(&reference.genre) {
                genre_matches.push(song);
            } else {
                others.push(song);
            }
        }

        for tier in [artist_matches, genre_matches, others] {
            if let Some(song) = tier.choose(rng) {
                return Some(*song);
            }
        }
        None
    }

    #[cfg(test)]
    fn titles_in_order(&self) -> Vec<(&str, &[String])> {
        self.titles.in_order()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn song(id: &str, title: &str, artist: &str, genre: &str, album: &str, year: i32) -> Song {
        Song::new(id, title, artist, genre, album, year)
    }

    fn seeded() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .insert(song("S1", "Song One", "Artist A", "Pop", "Album A", 2020))
            .expect("insert S1");
        catalog
            .insert(song("S2", "Song One", "Artist B", "Pop", "Album X", 2018))
            .expect("insert S2");
        catalog
            .insert(song("S3", "Other", "Artist C", "Jazz", "Album C", 2017))
            .expect("insert S3");
        catalog
    }

    fn ids(catalog: &Catalog) -> Vec<&str> {
        catalog.list().into_iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn insert_rejects_duplicate_id() {
        let mut catalog = seeded();
        let err = catalog
            .insert(song("S1", "Again", "X", "Pop", "A", 2000))
            .expect_err("duplicate");
        assert_eq!(err, DeckError::DuplicateId(String::from("S1")));
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn list_preserves_insertion_order() {
        let catalog = seeded();
        assert_eq!(ids(&catalog), vec!["S1", "S2", "S3"]);
        assert_eq!(catalog.first(), Some("S1"));
        assert_eq!(catalog.successor("S1"), Some("S2"));
        assert_eq!(catalog.successor("S3"), None);
        assert_eq!(catalog.predecessor("S2"), Some("S1"));
        assert_eq!(catalog.predecessor("S1"), None);
    }

    #[test]
    fn exact_title_search_covers_duplicate_titles() {
        let catalog = seeded();
        assert_eq!(
            catalog.search_title("song one"),
            Some(&[String::from("S1"), String::from("S2")][..])
        );
        assert_eq!(catalog.search_title("missing"), None);
    }

    #[test]
    fn update_applies_only_provided_fields() {
        let mut catalog = seeded();
        catalog
            .update(
                "S3",
                &SongEdit {
                    artist: Some(String::from("Artist Z")),
                    year: Some(2024),
                    ..SongEdit::default()
                },
            )
            .expect("update");

        let updated = catalog.lookup("S3").expect("S3");
        assert_eq!(updated.artist, "Artist Z");
        assert_eq!(updated.year, 2024);
        assert_eq!(updated.title, "Other");
        assert_eq!(updated.album, "Album C");
    }

    #[test]
    fn title_update_moves_the_index_bucket() {
        let mut catalog = seeded();
        catalog
            .update(
                "S1",
                &SongEdit {
                    title: Some(String::from("Renamed")),
                    ..SongEdit::default()
                },
            )
            .expect("update");

        assert_eq!(
            catalog.search_title("song one"),
            Some(&[String::from("S2")][..])
        );
        assert_eq!(
            catalog.search_title("renamed"),
            Some(&[String::from("S1")][..])
        );
    }

    #[test]
    fn update_missing_song_fails() {
        let mut catalog = seeded();
        let err = catalog
            .update("S9", &SongEdit::default())
            .expect_err("missing");
        assert_eq!(err, DeckError::SongNotFound(String::from("S9")));
    }

    #[test]
    fn delete_unlinks_middle_entry() {
        let mut catalog = seeded();
        let removed = catalog.delete("S2").expect("delete");
        assert_eq!(removed.id, "S2");
        assert_eq!(ids(&catalog), vec!["S1", "S3"]);
        assert_eq!(catalog.successor("S1"), Some("S3"));
        assert_eq!(catalog.predecessor("S3"), Some("S1"));
        assert_eq!(
            catalog.search_title("song one"),
            Some(&[String::from("S1")][..])
        );
    }

    #[test]
    fn delete_moves_head_and_tail() {
        let mut catalog = seeded();
        catalog.delete("S1").expect("delete head");
        assert_eq!(catalog.first(), Some("S2"));
        catalog.delete("S3").expect("delete tail");
        assert_eq!(ids(&catalog), vec!["S2"]);
        catalog.delete("S2").expect("delete last");
        assert!(catalog.is_empty());
        assert_eq!(catalog.first(), None);
    }

    #[test]
    fn substring_search_falls_back_to_linear_scan() {
        let catalog = seeded();
        let hits = catalog.search_title_contains("ONG");
        assert_eq!(hits.len(), 2);
        let artists = catalog.search_artist_contains("artist c");
        assert_eq!(artists.len(), 1);
        assert_eq!(artists[0].id, "S3");
    }

    #[test]
    fn find_similar_prefers_artist_then_genre() {
        let mut catalog = Catalog::new();
        catalog
            .insert(song("R", "Ref", "Shared Artist", "Pop", "A", 2020))
            .expect("insert");
        catalog
            .insert(song("A", "ArtistHit", "Shared Artist", "Rock", "B", 2021))
            .expect("insert");
        catalog
            .insert(song("G", "GenreHit", "Someone", "Pop", "C", 2022))
            .expect("insert");

        let mut rng = SmallRng::seed_from_u64(7);
        let pick = catalog.find_similar("R", &mut rng).expect("similar");
        assert_eq!(pick.id, "A");

        catalog.delete("A").expect("delete");
        let pick = catalog.find_similar("R", &mut rng).expect("similar");
        assert_eq!(pick.id, "G");

        catalog.delete("G").expect("delete");
        assert!(catalog.find_similar("R", &mut rng).is_none());
    }

    proptest::proptest! {
        #[test]
        fn membership_matches_lookup_after_random_ops(ops in proptest::collection::vec((0u8..2, 0u8..12), 1..120)) {
            let mut catalog = Catalog::new();
            let mut present = std::collections::HashSet::new();

            for (op, n) in ops {
                let id = format!("S{n}");
                match op {
                    0 => {
                        let outcome = catalog.insert(song(&id, &format!("Title {}", n % 4), "A", "Pop", "X", 2020));
                        if present.contains(&id) {
                            proptest::prop_assert!(outcome.is_err());
                        } else {
                            proptest::prop_assert!(outcome.is_ok());
                            present.insert(id.clone());
                        }
                    }
                    _ => {
                        let outcome = catalog.delete(&id);
                        proptest::prop_assert_eq!(outcome.is_ok(), present.remove(&id));
                    }
                }

                proptest::prop_assert_eq!(catalog.len(), present.len());
                proptest::prop_assert_eq!(catalog.list().len(), present.len());
                for id in &present {
                    let found = catalog.lookup(id).expect("present id resolves");
                    proptest::prop_assert_eq!(found.id.as_str(), id.as_str());
                }

                let indexed: usize = catalog.titles_in_order().iter().map(|(_, ids)| ids.len()).sum();
                proptest::prop_assert_eq!(indexed, present.len());
            }
        }
    }
}
