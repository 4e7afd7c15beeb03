//! Native speech on macOS and Windows through the `tts` crate.

use tracing::{debug, warn};

use super::{SpeechEngine, Voice, VoiceCatalog, RATE_FACTOR};

/// Platform speech synthesizer (AVFoundation, WinRT/SAPI)
pub struct TtsEngine {
    tts: tts::Tts,
    voice_id: Option<String>,
}

impl TtsEngine {
    /// None when the platform synthesizer can't be opened
    pub fn new() -> Option<Self> {
        let mut tts = match tts::Tts::default() {
            Ok(tts) => tts,
            Err(e) => {
                warn!(error = %e, "system speech unavailable");
                return None;
            }
        };

        let features = tts.supported_features();
        if features.rate {
            let rate = scaled_rate(tts.normal_rate(), tts.max_rate());
            let _ = tts.set_rate(rate);
        }
        if features.pitch {
            let _ = tts.set_pitch(tts.normal_pitch());
        }
        if features.volume {
            let _ = tts.set_volume(tts.max_volume());
        }

        Some(Self {
            tts,
            voice_id: None,
        })
    }

    pub fn voices(&self) -> TtsVoices {
        TtsVoices {
            tts: self.tts.clone(),
        }
    }

    fn select_voice(&mut self, voice: &Voice) {
        if self.voice_id.as_deref() == Some(voice.id.as_str()) {
            return;
        }
        let found = self
            .tts
            .voices()
            .ok()
            .and_then(|all| all.into_iter().find(|v| v.id() == voice.id));
        match found {
            Some(v) => match self.tts.set_voice(&v) {
                Ok(()) => self.voice_id = Some(voice.id.clone()),
                Err(e) => warn!(voice = %voice.name, error = %e, "can't select voice"),
            },
            None => debug!(voice = %voice.name, "voice not found, using default"),
        }
    }
}

impl SpeechEngine for TtsEngine {
    fn speak(&mut self, text: &str, voice: Option<&Voice>) {
        if let Some(v) = voice {
            if self.tts.supported_features().voice {
                self.select_voice(v);
            }
        }
        if let Err(e) = self.tts.speak(text, true) {
            warn!(error = %e, "speech failed");
        }
    }

    fn cancel(&mut self) {
        if let Err(e) = self.tts.stop() {
            debug!(error = %e, "speech stop failed");
        }
    }
}

#[derive(Clone)]
pub struct TtsVoices {
    tts: tts::Tts,
}

impl VoiceCatalog for TtsVoices {
    fn voices(&self) -> Vec<Voice> {
        match self.tts.voices() {
            Ok(voices) => voices
                .into_iter()
                .map(|v| Voice {
                    name: v.name(),
                    lang: v.language().to_string(),
                    id: v.id(),
                })
                .collect(),
            Err(e) => {
                warn!(error = %e, "voice listing failed");
                vec![]
            }
        }
    }
}

/// Normal rate sped up for callouts, capped at what the synthesizer allows
fn scaled_rate(normal: f32, max: f32) -> f32 {
    (normal * RATE_FACTOR as f32).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_is_sped_up_and_capped() {
        assert_eq!(scaled_rate(1.0, 2.0), 1.25);
        assert_eq!(scaled_rate(0.5, 0.6), 0.6);
    }
}
