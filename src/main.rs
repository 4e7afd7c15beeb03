use std::{
    io::{self, stdin},
    path::PathBuf,
    thread,
};

use anyhow::Context;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    cursor::Show,
    event::{DisableFocusChange, EnableFocusChange},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::warn;

use shadowbox::{
    app::{self, App},
    callout::CalloutPack,
    config::{Config, ConfigStore, FileConfigStore},
    install::InstallPrompt,
    logging,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    settings::SettingsOverrides,
    speech::{EspeakEngine, EspeakVoices, NoVoices, SilentEngine, SpeechEngine, VoiceCatalog},
    wake_lock::InhibitWakeLock,
};

/// shadow-boxing interval timer with spoken combo callouts
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A shadow-boxing interval timer. Runs prepare/work/rest phases across rounds and calls out random combos from your command set at a jittered pace during work."
)]
pub struct Cli {
    /// number of rounds
    #[clap(short = 'n', long)]
    rounds: Option<u32>,

    /// length of a work round in seconds
    #[clap(short = 'r', long)]
    round_secs: Option<u32>,

    /// rest between rounds in seconds
    #[clap(short = 'b', long)]
    rest_secs: Option<u32>,

    /// countdown before the first round in seconds
    #[clap(short = 'p', long)]
    prep_secs: Option<u32>,

    /// average seconds between callouts
    #[clap(short = 'c', long)]
    callout_every: Option<f64>,

    /// width in seconds of the random spread around the callout interval
    #[clap(long)]
    randomness: Option<f64>,

    /// trainer voice name (see --list-voices)
    #[clap(short = 'v', long)]
    voice: Option<String>,

    /// built-in callout pack (see --list-packs)
    #[clap(short = 'k', long)]
    pack: Option<String>,

    /// read settings from this JSON file instead of the default location
    #[clap(long)]
    config: Option<PathBuf>,

    /// run without speech
    #[clap(long)]
    mute: bool,

    /// print available voices and exit
    #[clap(long)]
    list_voices: bool,

    /// print built-in callout packs and exit
    #[clap(long)]
    list_packs: bool,
}

impl Cli {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            round_count: self.rounds,
            round_duration: self.round_secs,
            rest_duration: self.rest_secs,
            prep_duration: self.prep_secs,
            callout_frequency: self.callout_every,
            callout_frequency_randomness: self.randomness,
            voice_name: self.voice.clone(),
        }
    }

    /// An explicit --config must load; the default location may be broken
    fn load_config(&self) -> anyhow::Result<Config> {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path)
                .load()
                .context("loading --config"),
            None => {
                let store = FileConfigStore::new();
                Ok(store.load().unwrap_or_else(|e| {
                    warn!(error = %e, "ignoring default config");
                    Config::default()
                }))
            }
        }
    }

    fn speech(&self) -> Speech {
        if self.mute {
            return (Box::new(SilentEngine), Box::new(NoVoices));
        }
        system_speech()
            .or_else(espeak_speech)
            .unwrap_or_else(|| {
                warn!("no speech engine found, running silent");
                (Box::new(SilentEngine), Box::new(NoVoices))
            })
    }
}

type Speech = (Box<dyn SpeechEngine>, Box<dyn VoiceCatalog>);

#[cfg(not(target_os = "linux"))]
fn system_speech() -> Option<Speech> {
    let engine = shadowbox::speech::TtsEngine::new()?;
    let voices = engine.voices();
    Some((Box::new(engine), Box::new(voices)))
}

#[cfg(target_os = "linux")]
fn system_speech() -> Option<Speech> {
    None
}

fn espeak_speech() -> Option<Speech> {
    let engine = EspeakEngine::detect()?;
    let voices = EspeakVoices::new(engine.program());
    Some((Box::new(engine), Box::new(voices)))
}

/// Run `body` inside the terminal session opened by `enter`. `leave` runs
/// even when `enter` fails partway, so raw mode never outlives the app. A
/// failure in `body` wins over one in `leave`.
fn in_terminal<T>(
    enter: impl FnOnce() -> io::Result<()>,
    body: impl FnOnce() -> io::Result<T>,
    leave: impl FnOnce() -> io::Result<()>,
) -> io::Result<T> {
    let result = enter().and_then(|()| body());
    let left = leave();
    let value = result?;
    left?;
    Ok(value)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.list_packs {
        for name in CalloutPack::available() {
            let pack = CalloutPack::load(&name)?;
            println!("{:<12} {}", name, pack.description);
        }
        return Ok(());
    }

    let _log_guard = logging::init();

    let (speech, catalog) = cli.speech();

    if cli.list_voices {
        for voice in catalog.voices() {
            println!("{:<32} {}", voice.name, voice.lang);
        }
        return Ok(());
    }

    let resolved = cli
        .load_config()?
        .resolve(&cli.overrides(), cli.pack.as_deref())?;

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = App::new(
        resolved.settings,
        resolved.callouts,
        speech,
        Box::new(InhibitWakeLock::for_platform()),
    )
    .with_install(InstallPrompt::detect())
    .with_pack_name(resolved.pack);

    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::seconds());

    // Voice enumeration can take a moment; the UI picks the list up when it lands
    let tx = runner.sender();
    thread::spawn(move || {
        let _ = tx.send(AppEvent::VoicesChanged(catalog.voices()));
    });

    in_terminal(
        || {
            enable_raw_mode()?;
            execute!(io::stdout(), EnterAlternateScreen, EnableFocusChange)
        },
        || {
            let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
            app::run(&mut terminal, &mut app, &runner)
        },
        || {
            disable_raw_mode()?;
            execute!(io::stdout(), DisableFocusChange, LeaveAlternateScreen, Show)
        },
    )
    .context("terminal error")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["shadowbox"]);
        assert_eq!(cli.overrides(), SettingsOverrides::default());
        assert_eq!(cli.pack, None);
        assert_eq!(cli.config, None);
        assert!(!cli.mute);
        assert!(!cli.list_voices);
        assert!(!cli.list_packs);
    }

    #[test]
    fn test_cli_short_and_long_flags() {
        let cli = Cli::parse_from([
            "shadowbox", "-n", "5", "-r", "120", "-b", "30", "-p", "3", "-c", "2.5",
        ]);
        let o = cli.overrides();
        assert_eq!(o.round_count, Some(5));
        assert_eq!(o.round_duration, Some(120));
        assert_eq!(o.rest_duration, Some(30));
        assert_eq!(o.prep_duration, Some(3));
        assert_eq!(o.callout_frequency, Some(2.5));

        let cli = Cli::parse_from([
            "shadowbox",
            "--randomness",
            "0",
            "--voice",
            "English (America)",
            "--pack",
            "boxing",
            "--mute",
        ]);
        assert_eq!(cli.overrides().callout_frequency_randomness, Some(0.0));
        assert_eq!(
            cli.overrides().voice_name.as_deref(),
            Some("English (America)")
        );
        assert_eq!(cli.pack.as_deref(), Some("boxing"));
        assert!(cli.mute);
    }

    #[test]
    fn test_cli_rejects_negative_rounds() {
        assert!(Cli::try_parse_from(["shadowbox", "-n", "-1"]).is_err());
    }

    #[test]
    fn test_explicit_config_must_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        let cli = Cli::parse_from(["shadowbox", "--config", path.to_str().unwrap()]);
        assert!(cli.load_config().is_err());
    }

    #[test]
    fn test_explicit_config_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("good.json");
        std::fs::write(&path, r#"{"round_count": 4, "pack": "boxing"}"#).unwrap();
        let cli = Cli::parse_from([
            "shadowbox",
            "--config",
            path.to_str().unwrap(),
            "-n",
            "6",
        ]);
        let resolved = cli
            .load_config()
            .unwrap()
            .resolve(&cli.overrides(), cli.pack.as_deref())
            .unwrap();
        assert_eq!(resolved.settings.round_count, 6);
        assert_eq!(resolved.pack, "boxing");
    }

    #[test]
    fn test_mute_uses_silent_engine() {
        let cli = Cli::parse_from(["shadowbox", "--mute"]);
        let (_engine, catalog) = cli.speech();
        assert!(catalog.voices().is_empty());
    }

    #[test]
    fn terminal_is_left_when_entering_fails() {
        use std::cell::Cell;

        let left = Cell::new(false);
        let ran = Cell::new(false);
        let result: io::Result<()> = in_terminal(
            || Err(io::Error::other("no alternate screen")),
            || {
                ran.set(true);
                Ok(())
            },
            || {
                left.set(true);
                Ok(())
            },
        );
        assert!(result.is_err());
        assert!(!ran.get());
        assert!(left.get());
    }

    #[test]
    fn body_error_wins_over_leave_error() {
        let result: io::Result<u8> = in_terminal(
            || Ok(()),
            || Err(io::Error::other("draw failed")),
            || Err(io::Error::other("restore failed")),
        );
        assert_eq!(result.unwrap_err().to_string(), "draw failed");

        let result = in_terminal(|| Ok(()), || Ok(7), || Ok(()));
        assert_eq!(result.unwrap(), 7);

        let result = in_terminal(|| Ok(()), || Ok(7), || Err(io::Error::other("restore failed")));
        assert!(result.is_err());
    }

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }
}
