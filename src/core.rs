use crate::catalog::Catalog;
use crate::config;
use crate::error::{DeckError, Result};
use crate::model::{PersistedState, Song, SongEdit};
use crate::player::{Player, PlayerState};
use crate::playlist::Playlist;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::collections::HashMap;

/// Which list the browser pane is showing. Independent of the player's
/// scope: you can browse a playlist while library-scoped playback runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMode {
    Library,
    Playlist(String),
}

/// The application core: owns the catalog, the playlists, and the player,
/// and is the single place where a catalog delete cascades into both.
#[derive(Debug)]
pub struct DeckCore {
    pub catalog: Catalog,
    pub playlists: HashMap<String, Playlist>,
    pub player: Player,
    pub view: ViewMode,
    pub selected: usize,
    pub dirty: bool,
    pub status: String,
    rng: SmallRng,
}

impl DeckCore {
    pub fn from_persisted(state: PersistedState) -> Self {
        let mut catalog = Catalog::new();
        for song in state.songs {
            // Stale duplicates in the state file lose to the first row.
            let _ = catalog.insert(song);
        }

        let mut playlists: HashMap<String, Playlist> = HashMap::new();
        for name in state.playlists {
            playlists
                .entry(name.clone())
                .or_insert_with(|| Playlist::new(name));
        }
        for (name, song_id) in state.memberships {
            let playlist = playlists
                .entry(name.clone())
                .or_insert_with(|| Playlist::new(name));
            if let Some(song) = catalog.lookup(&song_id) {
                let _ = playlist.add(song.clone());
            }
        }

        Self {
            catalog,
            playlists,
            player: Player::default(),
            view: ViewMode::Library,
            selected: 0,
            dirty: true,
            status: String::from("Ready"),
            rng: SmallRng::from_os_rng(),
        }
    }

    pub fn persisted_state(&self) -> PersistedState {
        let songs = self.catalog.list().into_iter().cloned().collect();

        let mut names: Vec<&String> = self.playlists.keys().collect();
        names.sort();

        let mut memberships = Vec::new();
        for name in &names {
            if let Some(playlist) = self.playlists.get(*name) {
                for song in playlist.list() {
                    memberships.push(((*name).clone(), song.id.clone()));
                }
            }
        }

        PersistedState {
            songs,
            playlists: names.into_iter().cloned().collect(),
            memberships,
        }
    }

    /// Best-effort persistence; the in-memory state stays authoritative
    /// whether or not the write lands.
    pub fn save(&self) -> anyhow::Result<()> {
        config::save_state(&self.persisted_state())
    }

    // --- catalog mutations ---

    pub fn add_song(&mut self, song: Song) -> Result<()> {
        self.catalog.insert(song)?;
        self.dirty = true;
        Ok(())
    }

    pub fn update_song(&mut self, id: &str, edit: &SongEdit) -> Result<()> {
        self.catalog.update(id, edit)?;
        self.dirty = true;
        Ok(())
    }

    /// Removes the song everywhere in one transition: catalog and title
    /// index, every playlist holding it, and the player if it was current
    /// (which also wipes the history). Returns whether playback was cut.
    pub fn delete_song(&mut self, id: &str) -> Result<bool> {
        self.catalog.delete(id)?;
        for playlist in self.playlists.values_mut() {
            playlist.drop_song(id);
        }
        let was_current = self.player.handle_deleted(id);
        self.clamp_selection();
        self.dirty = true;
        Ok(was_current)
    }

    // --- playlist management ---

    pub fn create_playlist(&mut self, name: &str) -> Result<()> {
        if self.playlists.contains_key(name) {
            return Err(DeckError::DuplicatePlaylist(name.to_string()));
        }
        self.playlists
            .insert(name.to_string(), Playlist::new(name));
        self.dirty = true;
        Ok(())
    }

    pub fn delete_playlist(&mut self, name: &str) -> Result<()> {
        if self.playlists.remove(name).is_none() {
            return Err(DeckError::PlaylistNotFound(name.to_string()));
        }
        if self.view == ViewMode::Playlist(name.to_string()) {
            self.view = ViewMode::Library;
            self.selected = 0;
        }
        self.dirty = true;
        Ok(())
    }

    /// Copies the song's current descriptive fields into the playlist.
    /// Later catalog edits will not touch this snapshot.
    pub fn add_to_playlist(&mut self, name: &str, song_id: &str) -> Result<()> {
        let snapshot = self
            .catalog
            .lookup(song_id)
            .cloned()
            .ok_or_else(|| DeckError::SongNotFound(song_id.to_string()))?;
        let playlist = self
            .playlists
            .get_mut(name)
            .ok_or_else(|| DeckError::PlaylistNotFound(name.to_string()))?;
        playlist.add(snapshot)?;
        self.dirty = true;
        Ok(())
    }

    /// Removal also keeps the player honest: a playlist-scoped cursor on
    /// the removed member advances to the member that followed it, or the
    /// player goes idle when it was the last one.
    pub fn remove_from_playlist(&mut self, name: &str, song_id: &str) -> Result<()> {
        let playlist = self
            .playlists
            .get_mut(name)
            .ok_or_else(|| DeckError::PlaylistNotFound(name.to_string()))?;
        let successor = playlist.successor(song_id).map(str::to_string);
        playlist.remove(song_id)?;
        self.player.handle_member_removed(name, song_id, successor);
        self.clamp_selection();
        self.dirty = true;
        Ok(())
    }

    pub fn playlist_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.playlists.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    // --- playback navigation ---

    pub fn play_song(&mut self, id: &str) -> Result<String> {
        let id = self.player.play(&self.catalog, id)?;
        self.dirty = true;
        Ok(id)
    }

    pub fn play_playlist(&mut self, name: &str, song_id: Option<&str>) -> Result<String> {
        let id = self
            .player
            .play_from_playlist(&self.playlists, name, song_id)?;
        self.dirty = true;
        Ok(id)
    }

    pub fn next_song(&mut self) -> Result<String> {
        let id = self.player.next(&self.catalog, &self.playlists)?;
        self.dirty = true;
        Ok(id)
    }

    pub fn prev_song(&mut self) -> Result<String> {
        let id = self.player.prev(&self.catalog)?;
        self.dirty = true;
        Ok(id)
    }

    pub fn stop(&mut self) -> Result<()> {
        self.player.stop()?;
        self.dirty = true;
        Ok(())
    }

    /// Random pick preferring same artist, then same genre. `Ok(None)`
    /// when the catalog has nothing else to offer.
    pub fn play_similar(&mut self) -> Result<Option<String>> {
        let current = self
            .player
            .current()
            .map(str::to_string)
            .ok_or(DeckError::NotPlaying)?;
        let Some(pick) = self
            .catalog
            .find_similar(&current, &mut self.rng)
            .map(|song| song.id.clone())
        else {
            return Ok(None);
        };
        let id = self.player.play(&self.catalog, &pick)?;
        self.dirty = true;
        Ok(Some(id))
    }

    pub fn current_song(&self) -> Option<&Song> {
        let id = self.player.current()?;
        match self.player.state() {
            // Playlist scope displays the snapshot the playlist holds.
            PlayerState::Playlist { name, .. } => self
                .playlists
                .get(name)
                .and_then(|playlist| playlist.get(id))
                .or_else(|| self.catalog.lookup(id)),
            _ => self.catalog.lookup(id),
        }
    }

    // --- demo data ---

    /// First-run convenience: a handful of songs so the views are not
    /// empty, including a duplicated title for the search index.
    pub fn seed_demo(&mut self) {
        if !self.catalog.is_empty() {
            return;
        }
        let demos = [
            Song::new("S001", "Little Star", "Nora Vale", "Pop", "First Light", 2020),
            Song::new("S002", "Blue Skies", "The Harbor", "Indie", "Driftwood", 2021),
            Song::new("S003", "Longing", "Nora Vale", "Pop", "First Light", 2019),
            Song::new("S004", "Longing", "The Harbor", "Pop", "Crossing", 2018),
            Song::new("S005", "Quiet Night", "Mil Trio", "Jazz", "Blue Hour", 2017),
        ];
        for song in demos {
            let _ = self.catalog.insert(song);
        }
        self.dirty = true;
    }

    // --- browser view ---

    /// Rows for the active view: the whole catalog in insertion order, or
    /// one playlist's snapshots in playlist order.
    pub fn visible(&self) -> Vec<&Song> {
        match &self.view {
            ViewMode::Library => self.catalog.list(),
            ViewMode::Playlist(name) => self
                .playlists
                .get(name)
                .map(|playlist| playlist.list())
                .unwrap_or_default(),
        }
    }

    pub fn open_playlist(&mut self, name: &str) -> Result<()> {
        if !self.playlists.contains_key(name) {
            return Err(DeckError::PlaylistNotFound(name.to_string()));
        }
        self.view = ViewMode::Playlist(name.to_string());
        self.selected = 0;
        self.dirty = true;
        Ok(())
    }

    pub fn back_to_library(&mut self) {
        self.view = ViewMode::Library;
        self.selected = 0;
        self.dirty = true;
    }

    pub fn select_next(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        self.selected = (self.selected + 1).min(len - 1);
        self.dirty = true;
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.dirty = true;
    }

    pub fn selected_song_id(&self) -> Option<String> {
        self.visible().get(self.selected).map(|song| song.id.clone())
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
        self.dirty = true;
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            self.selected = 0;
        } else {
            self.selected = self.selected.min(len - 1);
        }
    }
}
