use crate::error::{DeckError, Result};
use crate::model::Song;
use std::collections::HashMap;

#[derive(Debug)]
struct Member {
    snapshot: Song,
    prev: Option<String>,
    next: Option<String>,
}

/// A named, ordered, duplicate-free subset of song references. Each member
/// keeps a snapshot of the song's descriptive fields taken at add time;
/// later catalog edits do not reach into playlists that already hold the
/// song. Membership itself is kept honest by the catalog's delete cascade.
#[derive(Debug)]
pub struct Playlist {
    name: String,
    members: HashMap<String, Member>,
    head: Option<String>,
    tail: Option<String>,
}

impl Playlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: HashMap::new(),
            head: None,
            tail: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains_key(id)
    }

    /// Appends a snapshot in insertion order.
    pub fn add(&mut self, snapshot: Song) -> Result<()> {
        if self.members.contains_key(&snapshot.id) {
            return Err(DeckError::AlreadyMember {
                playlist: self.name.clone(),
                song: snapshot.id,
            });
        }

        let id = snapshot.id.clone();
        let prev = self.tail.replace(id.clone());
        match &prev {
            Some(prev_id) => {
                if let Some(tail) = self.members.get_mut(prev_id) {
                    tail.next = Some(id.clone());
                }
            }
            None => self.head = Some(id.clone()),
        }

        self.members.insert(
            id,
            Member {
                snapshot,
                prev,
                next: None,
            },
        );
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<()> {
        if !self.unlink(id) {
            return Err(DeckError::NotMember {
                playlist: self.name.clone(),
                song: id.to_string(),
            });
        }
        Ok(())
    }

    /// Cascade hook invoked when the catalog deletes a song; no-op when
    /// the id is not a member.
    pub fn drop_song(&mut self, id: &str) -> bool {
        self.unlink(id)
    }

    /// Snapshots in insertion order.
    pub fn list(&self) -> Vec<&Song> {
        let mut out = Vec::with_capacity(self.members.len());
        let mut cursor = self.head.as_deref();
        while let Some(id) = cursor {
            let Some(member) = self.members.get(id) else {
                break;
            };
            out.push(&member.snapshot);
            cursor = member.next.as_deref();
        }
        out
    }

    pub fn get(&self, id: &str) -> Option<&Song> {
        self.members.get(id).map(|member| &member.snapshot)
    }

    pub fn first(&self) -> Option<&str> {
        self.head.as_deref()
    }

    pub fn successor(&self, id: &str) -> Option<&str> {
        self.members.get(id)?.next.as_deref()
    }

    fn unlink(&mut self, id: &str) -> bool {
        let Some(member) = self.members.remove(id) else {
            return false;
        };

        match member.prev.as_deref() {
            Some(prev_id) => {
                if let Some(prev) = self.members.get_mut(prev_id) {
                    prev.next = member.next.clone();
                }
            }
            None => self.head = member.next.clone(),
        }
        match member.next.as_deref() {
            Some(next_id) => {
                if let Some(next) = self.members.get_mut(next_id) {
                    next.prev = member.prev.clone();
                }
            }
            None => self.tail = member.prev.clone(),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: &str, title: &str) -> Song {
        Song::new(id, title, "Artist", "Pop", "Album", 2020)
    }

    fn mix() -> Playlist {
        let mut playlist = Playlist::new("mix");
        playlist.add(snapshot("S1", "One")).expect("add S1");
        playlist.add(snapshot("S2", "Two")).expect("add S2");
        playlist.add(snapshot("S3", "Three")).expect("add S3");
        playlist
    }

    fn ids(playlist: &Playlist) -> Vec<&str> {
        playlist.list().into_iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn add_preserves_insertion_order() {
        let playlist = mix();
        assert_eq!(ids(&playlist), vec!["S1", "S2", "S3"]);
        assert_eq!(playlist.first(), Some("S1"));
        assert_eq!(playlist.successor("S2"), Some("S3"));
        assert_eq!(playlist.successor("S3"), None);
    }

    #[test]
    fn duplicate_add_fails_and_leaves_length_unchanged() {
        let mut playlist = mix();
        let err = playlist.add(snapshot("S2", "Two again")).expect_err("dup");
        assert_eq!(
            err,
            DeckError::AlreadyMember {
                playlist: String::from("mix"),
                song: String::from("S2"),
            }
        );
        assert_eq!(playlist.len(), 3);
        assert_eq!(playlist.get("S2").expect("S2").title, "Two");
    }

    #[test]
    fn remove_relinks_neighbors() {
        let mut playlist = mix();
        playlist.remove("S2").expect("remove");
        assert_eq!(ids(&playlist), vec!["S1", "S3"]);
        assert_eq!(playlist.successor("S1"), Some("S3"));
    }

    #[test]
    fn remove_of_non_member_fails() {
        let mut playlist = mix();
        let err = playlist.remove("S9").expect_err("not member");
        assert_eq!(
            err,
            DeckError::NotMember {
                playlist: String::from("mix"),
                song: String::from("S9"),
            }
        );
    }

    #[test]
    fn cascade_drop_is_idempotent() {
        let mut playlist = mix();
        assert!(playlist.drop_song("S1"));
        assert!(!playlist.drop_song("S1"));
        assert_eq!(ids(&playlist), vec!["S2", "S3"]);
        assert_eq!(playlist.first(), Some("S2"));
    }

    #[test]
    fn snapshots_are_copies_not_references() {
        let mut playlist = Playlist::new("mix");
        let mut song = snapshot("S1", "Original");
        playlist.add(song.clone()).expect("add");
        song.title = String::from("Edited after add");
        assert_eq!(playlist.get("S1").expect("S1").title, "Original");
    }
}
