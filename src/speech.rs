//! Spoken output. The app only ever talks to the [`SpeechEngine`] trait. On
//! Linux the production engine shells out to espeak; elsewhere it uses the
//! system synthesizer, with espeak as a fallback.

#[cfg(not(target_os = "linux"))]
mod system;

#[cfg(not(target_os = "linux"))]
pub use system::{TtsEngine, TtsVoices};

use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};

use itertools::Itertools;
use tracing::{debug, warn};

/// espeak's default speaking rate in words per minute
const NORMAL_RATE_WPM: u32 = 175;
/// Callouts are delivered at a sharp, athletic pace
const RATE_FACTOR: f64 = 1.25;
const PITCH: u32 = 50;
const AMPLITUDE: u32 = 100;

const ESPEAK_PROGRAMS: [&str; 2] = ["espeak-ng", "espeak"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Display name, also what settings refer to
    pub name: String,
    /// Language tag such as `en-us`
    pub lang: String,
    /// Identifier passed to the engine
    pub id: String,
}

impl Voice {
    pub fn is_english(&self) -> bool {
        self.lang.to_lowercase().starts_with("en")
    }
}

/// Pick the voice to use: the preferred one by name, else the first English
/// voice, else whatever comes first. None only when there are no voices.
pub fn resolve_voice<'a>(voices: &'a [Voice], preferred: Option<&str>) -> Option<&'a Voice> {
    preferred
        .and_then(|name| voices.iter().find(|v| v.name == name))
        .or_else(|| voices.iter().find(|v| v.is_english()))
        .or_else(|| voices.first())
}

pub trait SpeechEngine: Send {
    /// Cancel whatever is being said and start saying `text`
    fn speak(&mut self, text: &str, voice: Option<&Voice>);
    fn cancel(&mut self);
}

/// Source of available voices. Enumeration can be slow, so the app runs it
/// off the UI thread.
pub trait VoiceCatalog: Send + 'static {
    fn voices(&self) -> Vec<Voice>;
}

/// Speech through an `espeak-ng`/`espeak` child process
#[derive(Debug)]
pub struct EspeakEngine {
    program: String,
    current: Option<Child>,
}

impl EspeakEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            current: None,
        }
    }

    /// First espeak binary that answers `--version`
    pub fn detect() -> Option<Self> {
        find_program().map(Self::new)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn rate_wpm() -> u32 {
        (NORMAL_RATE_WPM as f64 * RATE_FACTOR).round() as u32
    }

    fn args(text: &str, voice: Option<&Voice>) -> Vec<String> {
        let mut args = vec![
            "-s".to_string(),
            Self::rate_wpm().to_string(),
            "-p".to_string(),
            PITCH.to_string(),
            "-a".to_string(),
            AMPLITUDE.to_string(),
        ];
        if let Some(v) = voice {
            args.push("-v".to_string());
            args.push(v.id.clone());
        }
        args.push("--".to_string());
        args.push(text.to_string());
        args
    }
}

impl SpeechEngine for EspeakEngine {
    fn speak(&mut self, text: &str, voice: Option<&Voice>) {
        self.cancel();

        let spawned = Command::new(&self.program)
            .args(Self::args(text, voice))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(child) => self.current = Some(child),
            Err(e) => warn!(program = %self.program, error = %e, "speech failed"),
        }
    }

    fn cancel(&mut self) {
        if let Some(mut child) = self.current.take() {
            if let Ok(None) = child.try_wait() {
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }
}

impl Drop for EspeakEngine {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug, Clone)]
pub struct EspeakVoices {
    program: String,
}

impl EspeakVoices {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl VoiceCatalog for EspeakVoices {
    fn voices(&self) -> Vec<Voice> {
        match Command::new(&self.program).arg("--voices").output() {
            Ok(out) if out.status.success() => {
                parse_espeak_voices(&String::from_utf8_lossy(&out.stdout))
            }
            Ok(out) => {
                warn!(status = %out.status, "voice listing failed");
                vec![]
            }
            Err(e) => {
                warn!(error = %e, "voice listing failed");
                vec![]
            }
        }
    }
}

/// Parse the table printed by `espeak --voices`. The File column is what
/// `-v` accepts, so it becomes the voice id:
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  af              --/M      Afrikaans          gmw/af
///  2  en-us           --/M      English_(America)  gmw/en-US            (en 3)
/// ```
pub fn parse_espeak_voices(table: &str) -> Vec<Voice> {
    table
        .lines()
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            match cols.as_slice() {
                [_pty, lang, _gender, name, file, ..] => Some(Voice {
                    name: name.replace('_', " "),
                    lang: lang.to_string(),
                    id: file.to_string(),
                }),
                _ => None,
            }
        })
        .unique_by(|v| v.name.clone())
        .collect()
}

fn find_program() -> Option<String> {
    ESPEAK_PROGRAMS
        .iter()
        .find(|p| {
            Command::new(p)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .map(|s| s.success())
                .unwrap_or(false)
        })
        .map(|p| p.to_string())
}

/// Used with `--mute` or when no engine is installed
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentEngine;

impl SpeechEngine for SilentEngine {
    fn speak(&mut self, text: &str, _voice: Option<&Voice>) {
        debug!(%text, "silent speech");
    }

    fn cancel(&mut self) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoVoices;

impl VoiceCatalog for NoVoices {
    fn voices(&self) -> Vec<Voice> {
        vec![]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpeechEvent {
    Spoke { text: String, voice: Option<String> },
    Cancelled,
}

/// Records every request; handy for headless runs and tests
#[derive(Debug, Default, Clone)]
pub struct RecordingEngine {
    log: Arc<Mutex<Vec<SpeechEvent>>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SpeechEvent> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Just the spoken texts, in order
    pub fn spoken(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SpeechEvent::Spoke { text, .. } => Some(text),
                SpeechEvent::Cancelled => None,
            })
            .collect()
    }

    fn push(&self, event: SpeechEvent) {
        if let Ok(mut log) = self.log.lock() {
            log.push(event);
        }
    }
}

impl SpeechEngine for RecordingEngine {
    fn speak(&mut self, text: &str, voice: Option<&Voice>) {
        self.push(SpeechEvent::Spoke {
            text: text.to_string(),
            voice: voice.map(|v| v.name.clone()),
        });
    }

    fn cancel(&mut self) {
        self.push(SpeechEvent::Cancelled);
    }
}

/// Fixed voice list for tests and demos
#[derive(Debug, Default, Clone)]
pub struct StaticVoices(pub Vec<Voice>);

impl VoiceCatalog for StaticVoices {
    fn voices(&self) -> Vec<Voice> {
        self.0.clone()
    }
}
