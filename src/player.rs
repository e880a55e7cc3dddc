use crate::catalog::Catalog;
use crate::error::{DeckError, Result};
use crate::playlist::Playlist;
use std::collections::HashMap;

/// Where the player currently sits. The cursor only exists when a scope
/// does, so "cursor is None iff idle" holds by construction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlayerState {
    #[default]
    Idle,
    Library {
        cursor: String,
    },
    Playlist {
        name: String,
        cursor: String,
    },
}

/// Navigation state machine over either catalog order or one playlist's
/// order. The player reads songs through the catalog and playlists passed
/// into each call and never mutates them; issuing audio commands for the
/// id returned from a successful transition is the caller's job.
#[derive(Debug, Default)]
pub struct Player {
    state: PlayerState,
    history: Vec<String>,
}

impl Player {
    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// Id of the current song, if any.
    pub fn current(&self) -> Option<&str> {
        match &self.state {
            PlayerState::Idle => None,
            PlayerState::Library { cursor } => Some(cursor),
            PlayerState::Playlist { cursor, .. } => Some(cursor),
        }
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Starts library-scoped playback of `id`. The previously current song,
    /// if any, goes onto the history stack.
    pub fn play(&mut self, catalog: &Catalog, id: &str) -> Result<String> {
        if !catalog.contains(id) {
            return Err(DeckError::SongNotFound(id.to_string()));
        }
        self.push_current();
        self.state = PlayerState::Library {
            cursor: id.to_string(),
        };
        Ok(id.to_string())
    }

    /// Starts playlist-scoped playback, at `id` when given, else at the
    /// playlist head.
    pub fn play_from_playlist(
        &mut self,
        playlists: &HashMap<String, Playlist>,
        name: &str,
        id: Option<&str>,
    ) -> Result<String> {
        let playlist = playlists
            .get(name)
            .ok_or_else(|| DeckError::PlaylistNotFound(name.to_string()))?;

        let cursor = match id {
            Some(id) => {
                if playlist.is_empty() {
                    return Err(DeckError::EmptyPlaylist(name.to_string()));
                }
                if !playlist.contains(id) {
                    return Err(DeckError::SongNotFound(id.to_string()));
                }
                id.to_string()
            }
            None => playlist
                .first()
                .map(str::to_string)
                .ok_or_else(|| DeckError::EmptyPlaylist(name.to_string()))?,
        };

        self.push_current();
        self.state = PlayerState::Playlist {
            name: name.to_string(),
            cursor: cursor.clone(),
        };
        Ok(cursor)
    }

    /// Advances to the successor in the current scope's order. At the end
    /// of the sequence the cursor stays put and `EndOfSequence` is
    /// reported.
    pub fn next(
        &mut self,
        catalog: &Catalog,
        playlists: &HashMap<String, Playlist>,
    ) -> Result<String> {
        let (previous, successor) = match &self.state {
            PlayerState::Idle => return Err(DeckError::NotPlaying),
            PlayerState::Library { cursor } => {
                let successor = catalog
                    .successor(cursor)
                    .ok_or(DeckError::EndOfSequence)?
                    .to_string();
                (cursor.clone(), successor)
            }
            PlayerState::Playlist { name, cursor } => {
                let playlist = playlists
                    .get(name)
                    .ok_or_else(|| DeckError::PlaylistNotFound(name.clone()))?;
                let successor = playlist
                    .successor(cursor)
                    .ok_or(DeckError::EndOfSequence)?
                    .to_string();
                (cursor.clone(), successor)
            }
        };

        self.history.push(previous);
        self.set_cursor(successor.clone());
        Ok(successor)
    }

    /// Pops the most recently current id and resumes it, library-scoped.
    /// Ids whose songs were deleted since are skipped; an exhausted stack
    /// is `NoPreviousTrack`.
    pub fn prev(&mut self, catalog: &Catalog) -> Result<String> {
        loop {
            let Some(id) = self.history.pop() else {
                return Err(DeckError::NoPreviousTrack);
            };
            if catalog.contains(&id) {
                self.state = PlayerState::Library { cursor: id.clone() };
                return Ok(id);
            }
        }
    }

    /// Halting the audio is the caller's job; cursor, scope, and history
    /// all survive a stop so the next navigation call resumes in place.
    pub fn stop(&mut self) -> Result<()> {
        if self.state == PlayerState::Idle {
            return Err(DeckError::NotPlaying);
        }
        Ok(())
    }

    /// Playlist-removal cascade: when the removed member was this
    /// playlist's cursor, move onto the member that followed it, or go
    /// idle when it was the last one. The song still exists in the
    /// catalog, so the history stays usable. Returns whether the cursor
    /// moved.
    pub fn handle_member_removed(
        &mut self,
        playlist: &str,
        id: &str,
        successor: Option<String>,
    ) -> bool {
        let PlayerState::Playlist { name, cursor } = &self.state else {
            return false;
        };
        if name != playlist || cursor != id {
            return false;
        }
        match successor {
            Some(next) => self.set_cursor(next),
            None => self.state = PlayerState::Idle,
        }
        true
    }

    /// Catalog-delete cascade: when the current song goes away the whole
    /// machine resets, history included. Returns whether a reset happened.
    pub fn handle_deleted(&mut self, id: &str) -> bool {
        if self.current() != Some(id) {
            return false;
        }
        self.state = PlayerState::Idle;
        self.history.clear();
        true
    }

    fn push_current(&mut self) {
        if let Some(current) = self.current() {
            let current = current.to_string();
            self.history.push(current);
        }
    }

    fn set_cursor(&mut self, id: String) {
        match &mut self.state {
            PlayerState::Idle => {}
            PlayerState::Library { cursor } => *cursor = id,
            PlayerState::Playlist { cursor, .. } => *cursor = id,
        }
    }
}
