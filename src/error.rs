use thiserror::Error;

pub type Result<T> = std::result::Result<T, DeckError>;

/// Recoverable outcomes of catalog, playlist, and player operations.
/// None of these is fatal; the driver decides whether to retry, prompt
/// again, or ignore.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeckError {
    #[error("song id already exists: {0}")]
    DuplicateId(String),

    #[error("song not found: {0}")]
    SongNotFound(String),

    #[error("playlist not found: {0}")]
    PlaylistNotFound(String),

    #[error("playlist already exists: {0}")]
    DuplicatePlaylist(String),

    #[error("song {song} is already in playlist {playlist}")]
    AlreadyMember { playlist: String, song: String },

    #[error("song {song} is not in playlist {playlist}")]
    NotMember { playlist: String, song: String },

    #[error("playlist is empty: {0}")]
    EmptyPlaylist(String),

    /// Non-fatal: the cursor stays where it was.
    #[error("already at the last song")]
    EndOfSequence,

    #[error("no previous song in history")]
    NoPreviousTrack,

    #[error("nothing is playing")]
    NotPlaying,

    /// The navigation transition still commits when this is reported.
    #[error("media file missing for song {0}")]
    MediaMissing(String),

    /// Storage I/O failed; in-memory state remains authoritative.
    #[error("failed to persist state: {0}")]
    Persistence(String),
}
