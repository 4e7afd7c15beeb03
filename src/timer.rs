use rand::Rng;
use tracing::{debug, info};

use crate::callout::CalloutList;
use crate::scheduler::CalloutScheduler;
use crate::settings::TrainingSettings;

pub const FIGHT: &str = "Fight!";
pub const REST: &str = "Rest";
pub const WORKOUT_COMPLETE: &str = "Workout Complete";

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Phase {
    Idle,
    Prepare,
    Work,
    Rest,
    Finished,
}

impl Phase {
    /// Phases with a running countdown
    pub fn is_active(&self) -> bool {
        matches!(self, Phase::Prepare | Phase::Work | Phase::Rest)
    }
}

/// Side effect requested by the session, executed by the app shell
#[derive(Debug, Clone, PartialEq)]
pub enum Cue {
    Speak(String),
    CancelSpeech,
    AcquireWakeLock,
    ReleaseWakeLock,
}

/// One workout: phase, round and countdown, advanced once per second.
#[derive(Debug, Clone)]
pub struct Session {
    settings: TrainingSettings,
    phase: Phase,
    paused: bool,
    current_round: u32,
    time_left: u32,
    scheduler: CalloutScheduler,
}

impl Session {
    pub fn new(settings: TrainingSettings) -> Self {
        let settings = settings.coerced();
        let scheduler = CalloutScheduler::new(
            settings.callout_frequency,
            settings.callout_frequency_randomness,
        );
        Self {
            phase: Phase::Idle,
            paused: false,
            current_round: 1,
            time_left: settings.prep_duration,
            scheduler,
            settings,
        }
    }

    pub fn settings(&self) -> &TrainingSettings {
        &self.settings
    }

    /// Swap the settings snapshot. Ignored while a session is running.
    pub fn set_settings(&mut self, settings: TrainingSettings) -> bool {
        if self.is_running() {
            return false;
        }
        let phase = self.phase;
        *self = Self::new(settings);
        if phase == Phase::Finished {
            self.phase = Phase::Finished;
            self.time_left = 0;
        }
        true
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Prepare/Work/Rest, paused or not
    pub fn is_running(&self) -> bool {
        self.phase.is_active()
    }

    pub fn is_ticking(&self) -> bool {
        self.phase.is_active() && !self.paused
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn next_callout_threshold(&self) -> Option<f64> {
        (self.phase == Phase::Work).then(|| self.scheduler.threshold())
    }

    /// Configured length of the current phase
    pub fn phase_duration(&self) -> u32 {
        match self.phase {
            Phase::Idle | Phase::Prepare => self.settings.prep_duration,
            Phase::Work => self.settings.round_duration,
            Phase::Rest => self.settings.rest_duration,
            Phase::Finished => 0,
        }
    }

    /// Fraction of the current phase still to go, for progress bars
    pub fn remaining_ratio(&self) -> f64 {
        match self.phase_duration() {
            0 => 0.0,
            d => (self.time_left as f64 / d as f64).clamp(0.0, 1.0),
        }
    }

    pub fn start(&mut self) -> Vec<Cue> {
        self.phase = Phase::Prepare;
        self.paused = false;
        self.time_left = self.settings.prep_duration;
        self.current_round = 1;
        info!(
            rounds = self.settings.round_count,
            round_secs = self.settings.round_duration,
            "session started"
        );
        vec![Cue::Speak(FIGHT.to_string()), Cue::AcquireWakeLock]
    }

    pub fn pause(&mut self) -> Vec<Cue> {
        if !self.is_ticking() {
            return vec![];
        }
        self.paused = true;
        info!(phase = %self.phase, time_left = self.time_left, "paused");
        vec![Cue::CancelSpeech]
    }

    pub fn resume(&mut self) -> Vec<Cue> {
        if !self.paused {
            return vec![];
        }
        self.paused = false;
        info!(phase = %self.phase, time_left = self.time_left, "resumed");
        vec![Cue::AcquireWakeLock]
    }

    /// Back to idle from anywhere. Safe to call repeatedly.
    pub fn stop(&mut self) -> Vec<Cue> {
        if self.phase != Phase::Idle {
            info!(phase = %self.phase, "stopped");
        }
        self.phase = Phase::Idle;
        self.paused = false;
        self.current_round = 1;
        self.time_left = self.settings.prep_duration;
        vec![Cue::CancelSpeech, Cue::ReleaseWakeLock]
    }

    pub fn restart(&mut self) -> Vec<Cue> {
        let mut cues = self.stop();
        cues.extend(self.start());
        cues
    }

    /// Single "go" command: start when idle, otherwise pause or resume
    pub fn toggle(&mut self) -> Vec<Cue> {
        if !self.is_running() {
            self.start()
        } else if self.paused {
            self.resume()
        } else {
            self.pause()
        }
    }

    /// Advance one second. Phase boundaries are taken on the tick that would
    /// bring `time_left` from 1 to 0, so an active phase never shows 0.
    pub fn tick<R: Rng>(&mut self, callouts: &CalloutList, rng: &mut R) -> Vec<Cue> {
        if !self.is_ticking() {
            return vec![];
        }

        if self.time_left <= 1 {
            return self.advance_phase();
        }

        self.time_left -= 1;

        if self.phase != Phase::Work {
            return vec![];
        }

        let elapsed = (self.settings.round_duration - self.time_left) as f64;
        match self.scheduler.on_work_tick(elapsed, callouts, rng) {
            Some(text) => {
                debug!(%text, elapsed, "callout");
                vec![Cue::Speak(text)]
            }
            None => vec![],
        }
    }

    fn advance_phase(&mut self) -> Vec<Cue> {
        let cues = match self.phase {
            Phase::Prepare => {
                self.enter_work();
                vec![]
            }
            Phase::Work if self.current_round < self.settings.round_count => {
                self.phase = Phase::Rest;
                self.time_left = self.settings.rest_duration;
                vec![Cue::Speak(REST.to_string())]
            }
            Phase::Work => {
                self.phase = Phase::Finished;
                self.time_left = 0;
                vec![
                    Cue::Speak(WORKOUT_COMPLETE.to_string()),
                    Cue::ReleaseWakeLock,
                ]
            }
            Phase::Rest => {
                self.current_round += 1;
                self.enter_work();
                vec![Cue::Speak(format!("Round {}", self.current_round))]
            }
            Phase::Idle | Phase::Finished => vec![],
        };
        info!(phase = %self.phase, round = self.current_round, "phase change");
        cues
    }

    fn enter_work(&mut self) {
        self.phase = Phase::Work;
        self.time_left = self.settings.round_duration;
        self.scheduler.reset();
    }
}
