use crate::audio::{self, AudioEngine, NullAudioEngine, RodioAudioEngine};
use crate::config::{self, Settings};
use crate::core::{DeckCore, ViewMode};
use crate::error::DeckError;
use crate::model::{Song, SongEdit};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::stdout;
use std::time::{Duration, Instant};

const HELP_HINT: &str = "Commands: admin, lock, add, edit, del, plnew, pldel, pladd, plrm, open, lib, play, playpl, next, prev, stop, similar, search, find, artist, save";

pub fn run(settings: Settings) -> Result<()> {
    let state = config::load_state()?;
    let mut core = DeckCore::from_persisted(state);
    if core.catalog.is_empty() {
        core.seed_demo();
        persist(&mut core);
    }

    let mut audio: Box<dyn AudioEngine> = match RodioAudioEngine::new() {
        Ok(engine) => Box::new(engine),
        Err(_) => Box::new(NullAudioEngine::new()),
    };

    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut command_buffer: Option<String> = None;
    let mut admin_unlocked = false;
    let mut last_tick = Instant::now();

    let result: Result<()> = loop {
        if core.dirty || last_tick.elapsed() > Duration::from_millis(250) {
            terminal.draw(|frame| crate::ui::draw(frame, &core, command_buffer.as_deref()))?;
            core.dirty = false;
            last_tick = Instant::now();
        }

        if !event::poll(Duration::from_millis(33))? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if let Some(buffer) = command_buffer.as_mut() {
            match key.code {
                KeyCode::Esc => {
                    command_buffer = None;
                    core.dirty = true;
                }
                KeyCode::Enter => {
                    let line = std::mem::take(buffer);
                    command_buffer = None;
                    run_command(
                        &mut core,
                        &mut *audio,
                        &settings,
                        &mut admin_unlocked,
                        &line,
                    );
                }
                KeyCode::Backspace => {
                    buffer.pop();
                    core.dirty = true;
                }
                KeyCode::Char(ch) => {
                    buffer.push(ch);
                    core.dirty = true;
                }
                _ => {}
            }
            continue;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break Ok(()),
            KeyCode::Char('q') => break Ok(()),
            KeyCode::Down => core.select_next(),
            KeyCode::Up => core.select_prev(),
            KeyCode::Enter => play_selected(&mut core, &mut *audio, &settings),
            KeyCode::Char('p') => match core.view.clone() {
                ViewMode::Playlist(name) => {
                    let outcome = core.play_playlist(&name, None);
                    finish_navigation(&mut core, &mut *audio, &settings, outcome);
                }
                ViewMode::Library => {
                    core.set_status("Open a playlist first (:open <name>)");
                }
            },
            KeyCode::Char('n') => {
                let outcome = core.next_song();
                finish_navigation(&mut core, &mut *audio, &settings, outcome);
            }
            KeyCode::Char('b') => {
                let outcome = core.prev_song();
                finish_navigation(&mut core, &mut *audio, &settings, outcome);
            }
            KeyCode::Char('s') => match core.stop() {
                Ok(()) => {
                    audio.stop();
                    core.set_status("Stopped");
                }
                Err(err) => core.set_status(err.to_string()),
            },
            KeyCode::Backspace | KeyCode::Left => core.back_to_library(),
            KeyCode::Char(':') | KeyCode::Char('/') => {
                command_buffer = Some(String::new());
                core.dirty = true;
            }
            KeyCode::Char('?') => core.set_status(HELP_HINT),
            _ => {}
        }
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // One last best-effort save; its failure must not mask the loop result.
    let _ = core.save();
    result
}

fn play_selected(core: &mut DeckCore, audio: &mut dyn AudioEngine, settings: &Settings) {
    let Some(id) = core.selected_song_id() else {
        core.set_status("Nothing selected");
        return;
    };
    let outcome = match core.view.clone() {
        ViewMode::Library => core.play_song(&id),
        ViewMode::Playlist(name) => core.play_playlist(&name, Some(&id)),
    };
    finish_navigation(core, audio, settings, outcome);
}

/// The navigation transition has already committed (or failed) inside the
/// core; this only issues the fire-and-forget audio commands and renders
/// the outcome. A missing media file never rolls the cursor back.
fn finish_navigation(
    core: &mut DeckCore,
    audio: &mut dyn AudioEngine,
    settings: &Settings,
    outcome: crate::error::Result<String>,
) {
    match outcome {
        Ok(id) => {
            let line = now_playing_line(core, &id);
            let path = audio::resource_path(&settings.media_dir, &id);
            match audio.load(&path) {
                Ok(()) => {
                    audio.play();
                    core.set_status(line);
                }
                Err(_) => core.set_status(format!(
                    "{line} ({})",
                    DeckError::MediaMissing(id.clone())
                )),
            }
        }
        Err(err) => core.set_status(err.to_string()),
    }
}

fn now_playing_line(core: &DeckCore, id: &str) -> String {
    match core.catalog.lookup(id) {
        Some(song) => format!("Playing: {} - {}", song.title, song.artist),
        None => format!("Playing: {id}"),
    }
}

/// Best-effort save after a successful mutation; a storage failure is
/// reported and the in-memory state stays authoritative.
fn persist(core: &mut DeckCore) {
    if let Err(err) = core.save() {
        core.set_status(DeckError::Persistence(format!("{err:#}")).to_string());
    }
}

fn run_command(
    core: &mut DeckCore,
    audio: &mut dyn AudioEngine,
    settings: &Settings,
    admin_unlocked: &mut bool,
    line: &str,
) {
    let line = line.trim();
    if line.is_empty() {
        core.dirty = true;
        return;
    }
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match word {
        "help" => core.set_status(HELP_HINT),
        "admin" => match &settings.admin_secret {
            // The secret is injected at startup and compared in full.
            Some(secret) if secret == rest => {
                *admin_unlocked = true;
                core.set_status("Admin unlocked");
            }
            Some(_) => core.set_status("Wrong admin secret"),
            None => core.set_status("No admin secret configured"),
        },
        "lock" => {
            *admin_unlocked = false;
            core.set_status("Admin locked");
        }
        "add" | "edit" | "del" if !*admin_unlocked => {
            core.set_status("Admin commands are locked (:admin <secret>)");
        }
        "add" => match parse_song(rest) {
            Ok(song) => {
                let outcome = core_add(core, song);
                report_mutation(core, outcome);
            }
            Err(message) => core.set_status(message),
        },
        "edit" => {
            let mut parts = rest.split('|');
            let id = parts.next().unwrap_or("").trim().to_string();
            match parse_edit(parts) {
                Ok(edit) if edit.is_empty() => core.set_status("Nothing to change"),
                Ok(edit) => {
                    let outcome = core.update_song(&id, &edit).map(|()| String::from("Song updated"));
                    report_mutation(core, outcome);
                }
                Err(message) => core.set_status(message),
            }
        }
        "del" => {
            let outcome = core.delete_song(rest).map(|was_current| {
                if was_current {
                    audio.stop();
                    String::from("Song deleted; playback stopped")
                } else {
                    String::from("Song deleted")
                }
            });
            report_mutation(core, outcome);
        }
        "plnew" => {
            let outcome = core
                .create_playlist(rest)
                .map(|()| format!("Playlist '{rest}' created"));
            report_mutation(core, outcome);
        }
        "pldel" => {
            let outcome = core
                .delete_playlist(rest)
                .map(|()| format!("Playlist '{rest}' deleted"));
            report_mutation(core, outcome);
        }
        "pladd" => {
            let (name, id) = split_name_and_id(core, rest);
            let Some(id) = id else {
                core.set_status("No song selected");
                return;
            };
            let outcome = core
                .add_to_playlist(&name, &id)
                .map(|()| format!("Added {id} to '{name}'"));
            report_mutation(core, outcome);
        }
        "plrm" => {
            let (name, id) = split_name_and_id(core, rest);
            let Some(id) = id else {
                core.set_status("No song selected");
                return;
            };
            let outcome = core
                .remove_from_playlist(&name, &id)
                .map(|()| format!("Removed {id} from '{name}'"));
            report_mutation(core, outcome);
        }
        "open" => match core.open_playlist(rest) {
            Ok(()) => core.set_status(format!("Viewing playlist '{rest}'")),
            Err(err) => core.set_status(err.to_string()),
        },
        "lib" => core.back_to_library(),
        "play" => {
            let outcome = core.play_song(rest);
            finish_navigation(core, audio, settings, outcome);
        }
        "playpl" => {
            let (name, id) = match rest.split_once('|') {
                Some((name, id)) => (name.trim(), Some(id.trim())),
                None => (rest, None),
            };
            let outcome = core.play_playlist(name, id);
            finish_navigation(core, audio, settings, outcome);
        }
        "next" => {
            let outcome = core.next_song();
            finish_navigation(core, audio, settings, outcome);
        }
        "prev" => {
            let outcome = core.prev_song();
            finish_navigation(core, audio, settings, outcome);
        }
        "stop" => match core.stop() {
            Ok(()) => {
                audio.stop();
                core.set_status("Stopped");
            }
            Err(err) => core.set_status(err.to_string()),
        },
        "similar" => match core.play_similar() {
            Ok(Some(id)) => {
                finish_navigation(core, audio, settings, Ok(id));
            }
            Ok(None) => core.set_status("No similar song found"),
            Err(err) => core.set_status(err.to_string()),
        },
        "search" => {
            let message = match core.catalog.search_title(rest) {
                Some(ids) => format!("Exact title match: {}", ids.join(", ")),
                None => String::from("No exact title match"),
            };
            core.set_status(message);
        }
        "find" => {
            let message = summarize_hits("title", rest, &core.catalog.search_title_contains(rest));
            core.set_status(message);
        }
        "artist" => {
            let message = summarize_hits("artist", rest, &core.catalog.search_artist_contains(rest));
            core.set_status(message);
        }
        "save" => match core.save() {
            Ok(()) => core.set_status("State saved"),
            Err(err) => core.set_status(DeckError::Persistence(format!("{err:#}")).to_string()),
        },
        other => core.set_status(format!("Unknown command: {other}")),
    }
}

fn core_add(core: &mut DeckCore, song: Song) -> crate::error::Result<String> {
    let id = song.id.clone();
    core.add_song(song)?;
    Ok(format!("Song {id} added"))
}

/// Runs the save-after-mutation contract and renders the outcome.
fn report_mutation(core: &mut DeckCore, outcome: crate::error::Result<String>) {
    match outcome {
        Ok(message) => {
            core.set_status(message);
            persist(core);
        }
        Err(err) => core.set_status(err.to_string()),
    }
}

fn split_name_and_id(core: &DeckCore, rest: &str) -> (String, Option<String>) {
    match rest.split_once('|') {
        Some((name, id)) => (name.trim().to_string(), Some(id.trim().to_string())),
        None => (rest.to_string(), core.selected_song_id()),
    }
}

fn summarize_hits(kind: &str, needle: &str, hits: &[&Song]) -> String {
    if hits.is_empty() {
        return format!("No {kind} contains '{needle}'");
    }
    let ids: Vec<&str> = hits.iter().map(|song| song.id.as_str()).collect();
    format!("{} {kind} match(es): {}", hits.len(), ids.join(", "))
}

fn parse_song(rest: &str) -> std::result::Result<Song, String> {
    let fields: Vec<&str> = rest.split('|').map(str::trim).collect();
    let [id, title, artist, genre, album, year] = fields.as_slice() else {
        return Err(String::from("Usage: add id|title|artist|genre|album|year"));
    };
    if id.is_empty() || title.is_empty() {
        return Err(String::from("id and title must not be empty"));
    }
    let year: i32 = year
        .parse()
        .map_err(|_| String::from("year must be a number"))?;
    Ok(Song::new(*id, *title, *artist, *genre, *album, year))
}

fn parse_edit<'a>(parts: impl Iterator<Item = &'a str>) -> std::result::Result<SongEdit, String> {
    let mut edit = SongEdit::default();
    for part in parts {
        let Some((key, value)) = part.split_once('=') else {
            return Err(format!("expected field=value, got '{part}'"));
        };
        let value = value.trim();
        match key.trim() {
            "title" => edit.title = Some(value.to_string()),
            "artist" => edit.artist = Some(value.to_string()),
            "genre" => edit.genre = Some(value.to_string()),
            "album" => edit.album = Some(value.to_string()),
            "year" => {
                edit.year = Some(
                    value
                        .parse()
                        .map_err(|_| String::from("year must be a number"))?,
                )
            }
            other => return Err(format!("unknown field: {other}")),
        }
    }
    Ok(edit)
}
