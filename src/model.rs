use serde::{Deserialize, Serialize};

/// A catalog entry. `id` is the immutable identity; everything else is
/// descriptive and editable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub album: String,
    #[serde(default)]
    pub year: i32,
}

impl Song {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        genre: impl Into<String>,
        album: impl Into<String>,
        year: i32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            genre: genre.into(),
            album: album.into(),
            year,
        }
    }
}

/// Partial edit applied by `Catalog::update`. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongEdit {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub genre: Option<String>,
    pub album: Option<String>,
    pub year: Option<i32>,
}

impl SongEdit {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.genre.is_none()
            && self.album.is_none()
            && self.year.is_none()
    }
}

/// On-disk record schema: song rows, playlist names, and
/// `(playlist_name, song_id)` membership pairs, in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PersistedState {
    #[serde(default)]
    pub songs: Vec<Song>,
    #[serde(default)]
    pub playlists: Vec<String>,
    #[serde(default)]
    pub memberships: Vec<(String, String)>,
}
