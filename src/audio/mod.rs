use anyhow::{Context, Result};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use std::fs::File;
use std::path::{Path, PathBuf};

/// External audio collaborator. `load` stages a resource and fails if it
/// is missing, `play` starts it, `stop` halts output. All three are
/// fire-and-forget: navigation state never waits on the backend.
pub trait AudioEngine {
    fn load(&mut self, path: &Path) -> Result<()>;
    fn play(&mut self);
    fn stop(&mut self);
    fn current_track(&self) -> Option<&Path>;
}

/// Resource key for a song, derived deterministically from its id.
pub fn resource_path(media_dir: &Path, song_id: &str) -> PathBuf {
    media_dir.join(format!("{song_id}.mp3"))
}

pub struct RodioAudioEngine {
    stream: OutputStream,
    sink: Sink,
    current: Option<PathBuf>,
}

impl RodioAudioEngine {
    pub fn new() -> Result<Self> {
        let mut stream = OutputStreamBuilder::from_default_device()
            .context("failed to open default system output stream")?
            .with_error_callback(|_| {})
            .open_stream_or_fallback()
            .context("failed to start default output stream")?;
        stream.log_on_drop(false);
        let sink = Sink::connect_new(stream.mixer());

        Ok(Self {
            stream,
            sink,
            current: None,
        })
    }
}

impl AudioEngine for RodioAudioEngine {
    fn load(&mut self, path: &Path) -> Result<()> {
        let file =
            File::open(path).with_context(|| format!("failed to open track {}", path.display()))?;
        let source = Decoder::try_from(file)
            .with_context(|| format!("failed to decode {}", path.display()))?;

        self.sink.stop();
        self.sink = Sink::connect_new(self.stream.mixer());
        self.sink.pause();
        self.sink.append(source);
        self.current = Some(path.to_path_buf());
        Ok(())
    }

    fn play(&mut self) {
        self.sink.play();
    }

    fn stop(&mut self) {
        self.sink.stop();
        self.current = None;
    }

    fn current_track(&self) -> Option<&Path> {
        self.current.as_deref()
    }
}

/// Silent fallback for headless environments and tests. `load` still
/// enforces the resource-exists contract so a missing media file is
/// reported the same way as with real output.
#[derive(Debug, Default)]
pub struct NullAudioEngine {
    current: Option<PathBuf>,
}

impl NullAudioEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioEngine for NullAudioEngine {
    fn load(&mut self, path: &Path) -> Result<()> {
        if !path.is_file() {
            anyhow::bail!("media file not found: {}", path.display());
        }
        self.current = Some(path.to_path_buf());
        Ok(())
    }

    fn play(&mut self) {}

    fn stop(&mut self) {
        self.current = None;
    }

    fn current_track(&self) -> Option<&Path> {
        self.current.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn resource_keys_derive_from_song_ids() {
        let key = resource_path(Path::new("/media"), "S001");
        assert_eq!(key, PathBuf::from("/media/S001.mp3"));
    }

    #[test]
    fn null_engine_rejects_missing_resources() {
        let dir = tempdir().expect("tempdir");
        let mut engine = NullAudioEngine::new();

        let missing = resource_path(dir.path(), "ghost");
        assert!(engine.load(&missing).is_err());
        assert_eq!(engine.current_track(), None);

        let present = resource_path(dir.path(), "S1");
        fs::write(&present, b"not really audio").expect("write");
        engine.load(&present).expect("load");
        assert_eq!(engine.current_track(), Some(present.as_path()));

        engine.stop();
        assert_eq!(engine.current_track(), None);
    }
}
