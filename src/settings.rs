use serde::{Deserialize, Serialize};

pub const MAX_DURATION_SECS: u32 = 5999;
pub const MAX_ROUNDS: u32 = 99;
pub const MIN_CALLOUT_FREQUENCY: f64 = 0.5;
pub const MAX_CALLOUT_FREQUENCY: f64 = 600.0;

/// Snapshot of everything a training session needs. A running session keeps
/// its own copy, so edits only take effect on the next start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrainingSettings {
    pub round_count: u32,
    pub round_duration: u32,
    pub rest_duration: u32,
    pub prep_duration: u32,
    pub callout_frequency: f64,
    pub callout_frequency_randomness: f64,
    pub voice_name: Option<String>,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            round_count: 3,
            round_duration: 180,
            rest_duration: 60,
            prep_duration: 10,
            callout_frequency: 2.0,
            callout_frequency_randomness: 1.5,
            voice_name: None,
        }
    }
}

impl TrainingSettings {
    /// Clamp every field into its valid range. Bad input is coerced, never rejected.
    pub fn coerced(mut self) -> Self {
        let defaults = Self::default();

        self.round_count = self.round_count.clamp(1, MAX_ROUNDS);
        self.round_duration = coerce_duration(self.round_duration);
        self.rest_duration = coerce_duration(self.rest_duration);
        self.prep_duration = coerce_duration(self.prep_duration);

        if !self.callout_frequency.is_finite() {
            self.callout_frequency = defaults.callout_frequency;
        }
        self.callout_frequency = self
            .callout_frequency
            .clamp(MIN_CALLOUT_FREQUENCY, MAX_CALLOUT_FREQUENCY);

        if !self.callout_frequency_randomness.is_finite() {
            self.callout_frequency_randomness = defaults.callout_frequency_randomness;
        }
        self.callout_frequency_randomness = self
            .callout_frequency_randomness
            .clamp(0.0, self.callout_frequency * 2.0);

        self.voice_name = self
            .voice_name
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        self
    }

    /// Wall-clock length of a full session, prepare phase included
    pub fn total_duration(&self) -> u32 {
        self.prep_duration
            + self.round_duration * self.round_count
            + self.rest_duration * self.round_count.saturating_sub(1)
    }
}

fn coerce_duration(secs: u32) -> u32 {
    secs.clamp(1, MAX_DURATION_SECS)
}

/// Partial settings, as read from a config file or the command line
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SettingsOverrides {
    pub round_count: Option<u32>,
    pub round_duration: Option<u32>,
    pub rest_duration: Option<u32>,
    pub prep_duration: Option<u32>,
    pub callout_frequency: Option<f64>,
    pub callout_frequency_randomness: Option<f64>,
    pub voice_name: Option<String>,
}

impl SettingsOverrides {
    pub fn apply_to(&self, settings: &mut TrainingSettings) {
        if let Some(v) = self.round_count {
            settings.round_count = v;
        }
        if let Some(v) = self.round_duration {
            settings.round_duration = v;
        }
        if let Some(v) = self.rest_duration {
            settings.rest_duration = v;
        }
        if let Some(v) = self.prep_duration {
            settings.prep_duration = v;
        }
        if let Some(v) = self.callout_frequency {
            settings.callout_frequency = v;
        }
        if let Some(v) = self.callout_frequency_randomness {
            settings.callout_frequency_randomness = v;
        }
        if let Some(ref v) = self.voice_name {
            settings.voice_name = Some(v.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_three_round_workout() {
        let s = TrainingSettings::default();
        assert_eq!(s.round_count, 3);
        assert_eq!(s.round_duration, 180);
        assert_eq!(s.rest_duration, 60);
        assert_eq!(s.prep_duration, 10);
        assert_eq!(s.callout_frequency, 2.0);
        assert_eq!(s.callout_frequency_randomness, 1.5);
        assert_eq!(s.voice_name, None);
    }

    #[test]
    fn coerce_clamps_zero_and_huge_values() {
        let s = TrainingSettings {
            round_count: 0,
            round_duration: 0,
            rest_duration: 100_000,
            prep_duration: 0,
            callout_frequency: 0.0,
            callout_frequency_randomness: 50.0,
            voice_name: Some("   ".into()),
        }
        .coerced();

        assert_eq!(s.round_count, 1);
        assert_eq!(s.round_duration, 1);
        assert_eq!(s.rest_duration, MAX_DURATION_SECS);
        assert_eq!(s.prep_duration, 1);
        assert_eq!(s.callout_frequency, MIN_CALLOUT_FREQUENCY);
        assert_eq!(s.callout_frequency_randomness, 1.0);
        assert_eq!(s.voice_name, None);
    }

    #[test]
    fn coerce_replaces_non_finite_floats() {
        let s = TrainingSettings {
            callout_frequency: f64::NAN,
            callout_frequency_randomness: f64::INFINITY,
            ..TrainingSettings::default()
        }
        .coerced();

        assert_eq!(s.callout_frequency, 2.0);
        assert_eq!(s.callout_frequency_randomness, 1.5);
    }

    #[test]
    fn coerce_keeps_valid_settings_untouched() {
        let s = TrainingSettings::default();
        assert_eq!(s.clone().coerced(), s);
    }

    #[test]
    fn total_duration_counts_rests_between_rounds_only() {
        let s = TrainingSettings {
            round_count: 2,
            round_duration: 5,
            rest_duration: 3,
            prep_duration: 2,
            ..TrainingSettings::default()
        };
        assert_eq!(s.total_duration(), 2 + 5 + 3 + 5);
    }

    #[test]
    fn overrides_only_touch_present_fields() {
        let mut s = TrainingSettings::default();
        let o = SettingsOverrides {
            round_count: Some(5),
            voice_name: Some("en-us".into()),
            ..SettingsOverrides::default()
        };
        o.apply_to(&mut s);
        assert_eq!(s.round_count, 5);
        assert_eq!(s.round_duration, 180);
        assert_eq!(s.voice_name.as_deref(), Some("en-us"));
    }

    #[test]
    fn settings_deserialize_with_missing_fields() {
        let s: TrainingSettings = serde_json::from_str(r#"{"round_count": 6}"#).unwrap();
        assert_eq!(s.round_count, 6);
        assert_eq!(s.rest_duration, 60);
    }
}
