use std::io;
use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{backend::Backend, Terminal};
use tracing::{debug, info, warn};

use crate::callout::{CalloutId, CalloutList};
use crate::install::{InstallOutcome, InstallPrompt};
use crate::runtime::{AppEvent, AppEventSource, Runner, Ticker};
use crate::settings::TrainingSettings;
use crate::settings_form::SettingsForm;
use crate::speech::{resolve_voice, SpeechEngine, Voice};
use crate::timer::{Cue, Phase, Session};
use crate::wake_lock::{WakeLock, WakeLockGuard};

/// What the keyboard is currently talking to
#[derive(Debug, Clone)]
pub enum Mode {
    Timer,
    Settings(SettingsForm),
    AddCallout(String),
    ConfirmInstall,
}

pub struct App {
    pub session: Session,
    pub callouts: CalloutList,
    pub voices: Vec<Voice>,
    pub mode: Mode,
    /// Index into the callout list for toggle/delete
    pub cursor: usize,
    /// Last thing said, shown under the clock
    pub last_spoken: Option<String>,
    pub status: Option<String>,
    pub install: InstallPrompt,
    pub pack_name: String,
    pub should_quit: bool,
    calling_ticks: u8,
    speech: Box<dyn SpeechEngine>,
    wake_lock: WakeLockGuard,
    rng: StdRng,
}

impl App {
    pub fn new(
        settings: TrainingSettings,
        callouts: CalloutList,
        speech: Box<dyn SpeechEngine>,
        wake_lock: Box<dyn WakeLock>,
    ) -> Self {
        Self {
            session: Session::new(settings),
            callouts,
            voices: vec![],
            mode: Mode::Timer,
            cursor: 0,
            last_spoken: None,
            status: None,
            install: InstallPrompt::new(PathBuf::new(), None),
            pack_name: String::new(),
            should_quit: false,
            calling_ticks: 0,
            speech,
            wake_lock: WakeLockGuard::new(wake_lock),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_install(mut self, install: InstallPrompt) -> Self {
        self.install = install;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_pack_name(mut self, name: impl Into<String>) -> Self {
        self.pack_name = name.into();
        self
    }

    pub fn settings(&self) -> &TrainingSettings {
        self.session.settings()
    }

    /// True for about a second after anything is spoken
    pub fn is_calling(&self) -> bool {
        self.calling_ticks > 0
    }

    pub fn wake_lock_held(&self) -> bool {
        self.wake_lock.is_held()
    }

    pub fn selected_callout(&self) -> Option<CalloutId> {
        self.callouts.iter().nth(self.cursor).map(|c| c.id)
    }

    pub fn on_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Tick => self.on_tick(),
            AppEvent::Key(key) => self.on_key(key),
            AppEvent::FocusGained => {
                if self.session.is_running() {
                    self.wake_lock.acquire();
                }
            }
            AppEvent::FocusLost | AppEvent::Resize => {}
            AppEvent::VoicesChanged(voices) => {
                info!(count = voices.len(), "voices loaded");
                if let Some(name) = &self.settings().voice_name {
                    if !voices.iter().any(|v| &v.name == name) {
                        warn!(voice = %name, "preferred voice not available, using fallback");
                    }
                }
                self.voices = voices;
            }
        }
    }

    pub fn on_tick(&mut self) {
        self.calling_ticks = self.calling_ticks.saturating_sub(1);
        let cues = self.session.tick(&self.callouts, &mut self.rng);
        self.dispatch(cues);
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return;
        }

        match std::mem::replace(&mut self.mode, Mode::Timer) {
            Mode::Timer => self.on_timer_key(key),
            Mode::Settings(form) => self.on_settings_key(form, key),
            Mode::AddCallout(text) => self.on_add_callout_key(text, key),
            Mode::ConfirmInstall => self.on_install_key(key),
        }
    }

    pub fn quit(&mut self) {
        let cues = self.session.stop();
        self.dispatch(cues);
        self.should_quit = true;
    }

    fn on_timer_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.quit(),
            KeyCode::Char(' ') | KeyCode::Enter => {
                let cues = self.session.toggle();
                self.dispatch(cues);
            }
            KeyCode::Char('s') => {
                let cues = self.session.stop();
                self.dispatch(cues);
            }
            KeyCode::Char('r') => {
                if self.session.is_running() {
                    let cues = self.session.restart();
                    self.dispatch(cues);
                }
            }
            KeyCode::Char('o') => {
                if self.session.is_running() {
                    self.status = Some("Stop the workout to change settings".into());
                } else {
                    self.mode = Mode::Settings(SettingsForm::new(self.settings()));
                }
            }
            KeyCode::Char('a') => self.mode = Mode::AddCallout(String::new()),
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < self.callouts.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Char('t') => {
                if let Some(id) = self.selected_callout() {
                    self.callouts.toggle(id);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_callout() {
                    self.callouts.remove(id);
                    self.cursor = self.cursor.min(self.callouts.len().saturating_sub(1));
                }
            }
            KeyCode::Char('i') => {
                if self.install.prompt() {
                    self.mode = Mode::ConfirmInstall;
                }
            }
            _ => {}
        }
    }

    fn on_settings_key(&mut self, mut form: SettingsForm, key: KeyEvent) {
        match key.code {
            KeyCode::Up => form.select_prev(),
            KeyCode::Down | KeyCode::Tab => form.select_next(),
            KeyCode::Left => form.nudge(false, &self.voices),
            KeyCode::Right => form.nudge(true, &self.voices),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) => form.push_char(c),
            KeyCode::Enter => {
                if form.buffer().is_none() {
                    let settings = form.finish();
                    info!(?settings, "settings saved");
                    self.session.set_settings(settings);
                    return;
                }
                form.commit();
            }
            KeyCode::Esc => {
                if !form.discard() {
                    return;
                }
            }
            _ => {}
        }
        self.mode = Mode::Settings(form);
    }

    fn on_add_callout_key(&mut self, mut text: String, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                if self.callouts.add(&text).is_some() {
                    self.cursor = self.callouts.len() - 1;
                }
                return;
            }
            KeyCode::Esc => return,
            KeyCode::Backspace => {
                text.pop();
            }
            KeyCode::Char(c) => text.push(c),
            _ => {}
        }
        self.mode = Mode::AddCallout(text);
    }

    fn on_install_key(&mut self, key: KeyEvent) {
        let outcome = match key.code {
            KeyCode::Char('y') | KeyCode::Enter => InstallOutcome::Accepted,
            KeyCode::Char('n') | KeyCode::Esc => InstallOutcome::Dismissed,
            _ => {
                self.mode = Mode::ConfirmInstall;
                return;
            }
        };

        match self.install.resolve(outcome) {
            Ok(Some(path)) => self.status = Some(format!("Installed to {}", path.display())),
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "install failed");
                self.status = Some(e.to_string());
            }
        }
    }

    fn dispatch(&mut self, cues: Vec<Cue>) {
        for cue in cues {
            match cue {
                Cue::Speak(text) => {
                    let voice = resolve_voice(&self.voices, self.settings().voice_name.as_deref());
                    debug!(%text, voice = ?voice.map(|v| &v.name), "speak");
                    self.speech.speak(&text, voice);
                    self.last_spoken = Some(text);
                    self.calling_ticks = 1;
                }
                Cue::CancelSpeech => self.speech.cancel(),
                Cue::AcquireWakeLock => self.wake_lock.acquire(),
                Cue::ReleaseWakeLock => self.wake_lock.release(),
            }
        }
        if self.session.phase() == Phase::Idle {
            self.last_spoken = None;
        }
    }
}

/// Drive the app until the user quits. Every event is followed by a redraw.
pub fn run<B, E, T>(terminal: &mut Terminal<B>, app: &mut App, runner: &Runner<E, T>) -> io::Result<()>
where
    B: Backend,
    E: AppEventSource,
    T: Ticker,
{
    terminal.draw(|f| crate::ui::draw(app, f))?;

    while !app.should_quit {
        let event = runner.step();
        let was_ticking = app.session.is_ticking();
        app.on_event(event);
        if !was_ticking && app.session.is_ticking() {
            runner.reset_clock();
        }
        terminal.draw(|f| crate::ui::draw(app, f))?;
    }

    Ok(())
}
