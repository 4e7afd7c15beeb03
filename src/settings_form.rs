use crate::settings::TrainingSettings;
use crate::speech::Voice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Field {
    #[strum(serialize = "Rounds")]
    Rounds,
    #[strum(serialize = "Round (sec)")]
    RoundDuration,
    #[strum(serialize = "Rest (sec)")]
    RestDuration,
    #[strum(serialize = "Prepare (sec)")]
    PrepDuration,
    #[strum(serialize = "Call Every (sec)")]
    CalloutFrequency,
    #[strum(serialize = "Randomness (sec)")]
    CalloutRandomness,
    #[strum(serialize = "Trainer Voice")]
    Voice,
}

pub const FIELDS: [Field; 7] = [
    Field::Rounds,
    Field::RoundDuration,
    Field::RestDuration,
    Field::PrepDuration,
    Field::CalloutFrequency,
    Field::CalloutRandomness,
    Field::Voice,
];

pub const SYSTEM_DEFAULT_VOICE: &str = "System Default";

impl Field {
    /// Amount Left/Right moves the value by
    fn step(&self) -> f64 {
        match self {
            Field::Rounds => 1.0,
            Field::RoundDuration => 10.0,
            Field::RestDuration | Field::PrepDuration => 5.0,
            Field::CalloutFrequency | Field::CalloutRandomness => 0.5,
            Field::Voice => 0.0,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Field::Voice)
    }
}

/// Modal editor over a draft copy of the settings
#[derive(Debug, Clone)]
pub struct SettingsForm {
    draft: TrainingSettings,
    selected: usize,
    buffer: Option<String>,
}

impl SettingsForm {
    pub fn new(settings: &TrainingSettings) -> Self {
        Self {
            draft: settings.clone(),
            selected: 0,
            buffer: None,
        }
    }

    pub fn draft(&self) -> &TrainingSettings {
        &self.draft
    }

    pub fn selected(&self) -> Field {
        FIELDS[self.selected]
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Text being typed into the selected field, if any
    pub fn buffer(&self) -> Option<&str> {
        self.buffer.as_deref()
    }

    pub fn select_next(&mut self) {
        self.commit();
        self.selected = (self.selected + 1) % FIELDS.len();
    }

    pub fn select_prev(&mut self) {
        self.commit();
        self.selected = (self.selected + FIELDS.len() - 1) % FIELDS.len();
    }

    /// Move the selected value one step up or down. On the voice row this
    /// cycles through "System Default" followed by every known voice.
    pub fn nudge(&mut self, up: bool, voices: &[Voice]) {
        self.commit();
        let field = self.selected();
        if field == Field::Voice {
            self.cycle_voice(up, voices);
            return;
        }

        let step = if up { field.step() } else { -field.step() };
        let value = self.numeric_value(field) + step;
        self.set_numeric(field, value);
    }

    pub fn push_char(&mut self, c: char) {
        if !self.selected().is_numeric() || !(c.is_ascii_digit() || c == '.') {
            return;
        }
        self.buffer.get_or_insert_with(String::new).push(c);
    }

    pub fn backspace(&mut self) {
        if let Some(buf) = self.buffer.as_mut() {
            buf.pop();
        }
    }

    /// Apply typed text to the selected field. Unparseable text is dropped.
    pub fn commit(&mut self) {
        let Some(text) = self.buffer.take() else {
            return;
        };
        if let Ok(value) = text.parse::<f64>() {
            self.set_numeric(self.selected(), value);
        }
    }

    /// Drop typed text. Returns false if there was none, meaning the caller
    /// should close the form instead.
    pub fn discard(&mut self) -> bool {
        self.buffer.take().is_some()
    }

    /// Final coerced settings
    pub fn finish(mut self) -> TrainingSettings {
        self.commit();
        self.draft.coerced()
    }

    pub fn value_label(&self, field: Field) -> String {
        let d = &self.draft;
        match field {
            Field::Rounds => d.round_count.to_string(),
            Field::RoundDuration => d.round_duration.to_string(),
            Field::RestDuration => d.rest_duration.to_string(),
            Field::PrepDuration => d.prep_duration.to_string(),
            Field::CalloutFrequency => format!("{}", d.callout_frequency),
            Field::CalloutRandomness => format!("{}", d.callout_frequency_randomness),
            Field::Voice => d
                .voice_name
                .clone()
                .unwrap_or_else(|| SYSTEM_DEFAULT_VOICE.to_string()),
        }
    }

    fn numeric_value(&self, field: Field) -> f64 {
        let d = &self.draft;
        match field {
            Field::Rounds => d.round_count as f64,
            Field::RoundDuration => d.round_duration as f64,
            Field::RestDuration => d.rest_duration as f64,
            Field::PrepDuration => d.prep_duration as f64,
            Field::CalloutFrequency => d.callout_frequency,
            Field::CalloutRandomness => d.callout_frequency_randomness,
            Field::Voice => 0.0,
        }
    }

    fn set_numeric(&mut self, field: Field, value: f64) {
        if !value.is_finite() {
            return;
        }
        let whole = value.round().max(0.0) as u32;
        let d = &mut self.draft;
        match field {
            Field::Rounds => d.round_count = whole,
            Field::RoundDuration => d.round_duration = whole,
            Field::RestDuration => d.rest_duration = whole,
            Field::PrepDuration => d.prep_duration = whole,
            Field::CalloutFrequency => d.callout_frequency = value,
            Field::CalloutRandomness => d.callout_frequency_randomness = value,
            Field::Voice => {}
        }
        self.draft = self.draft.clone().coerced();
    }

    fn cycle_voice(&mut self, forward: bool, voices: &[Voice]) {
        // Slot 0 is "System Default", slot i is voices[i - 1]
        let slots = voices.len() + 1;
        let current = self
            .draft
            .voice_name
            .as_ref()
            .and_then(|name| voices.iter().position(|v| &v.name == name))
            .map(|i| i + 1)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % slots
        } else {
            (current + slots - 1) % slots
        };
        self.draft.voice_name = next.checked_sub(1).map(|i| voices[i].name.clone());
    }
}
