use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::callout::{CalloutList, CalloutPack, DEFAULT_PACK};
use crate::error::{Error, Result};
use crate::settings::{SettingsOverrides, TrainingSettings};

/// Optional config file. The app only reads it; nothing is written back.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    #[serde(flatten)]
    pub settings: SettingsOverrides,
    pub pack: Option<String>,
    /// Replaces the pack entirely when present
    pub callouts: Option<Vec<String>>,
}

/// Everything a session starts from once CLI and file are merged
#[derive(Debug, Clone)]
pub struct Resolved {
    pub settings: TrainingSettings,
    pub callouts: CalloutList,
    /// Pack the callouts came from, empty for an explicit list
    pub pack: String,
}

impl Config {
    /// Merge with command line values. The command line wins over the file,
    /// the file over the defaults. An explicit callout list in the file is
    /// used unless the command line names a pack.
    pub fn resolve(&self, cli: &SettingsOverrides, cli_pack: Option<&str>) -> Result<Resolved> {
        let mut settings = TrainingSettings::default();
        self.settings.apply_to(&mut settings);
        cli.apply_to(&mut settings);

        let (callouts, pack) = match (cli_pack, &self.callouts) {
            (None, Some(texts)) => (CalloutList::from_texts(texts), String::new()),
            _ => {
                let name = cli_pack
                    .or(self.pack.as_deref())
                    .unwrap_or(DEFAULT_PACK);
                (CalloutPack::load(name)?.into_list(), name.to_string())
            }
        };

        Ok(Resolved {
            settings: settings.coerced(),
            callouts,
            pack,
        })
    }
}

pub trait ConfigStore {
    fn load(&self) -> Result<Config>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "shadowbox") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("shadowbox_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// A missing file is an empty config; unreadable or malformed files are errors
    fn load(&self) -> Result<Config> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Config::default()),
            Err(source) => {
                return Err(Error::ConfigRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_slice(&bytes).map_err(|source| Error::ConfigParse {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_default_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        assert_eq!(store.load().unwrap(), Config::default());
    }

    #[test]
    fn load_flat_settings_with_pack_and_callouts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "round_count": 12,
                "rest_duration": 30,
                "callout_frequency": 3.5,
                "voice_name": "English (America)",
                "pack": "boxing",
                "callouts": ["Jab", "Cross"]
            }"#,
        )
        .unwrap();

        let cfg = FileConfigStore::with_path(&path).load().unwrap();
        assert_eq!(cfg.settings.round_count, Some(12));
        assert_eq!(cfg.settings.rest_duration, Some(30));
        assert_eq!(cfg.settings.round_duration, None);
        assert_eq!(cfg.settings.callout_frequency, Some(3.5));
        assert_eq!(
            cfg.settings.voice_name.as_deref(),
            Some("English (America)")
        );
        assert_eq!(cfg.pack.as_deref(), Some("boxing"));
        assert_eq!(
            cfg.callouts,
            Some(vec!["Jab".to_string(), "Cross".to_string()])
        );
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ round_count: ").unwrap();

        let err = FileConfigStore::with_path(&path).load().unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn resolve_defaults_to_muay_thai_pack() {
        let r = Config::default()
            .resolve(&SettingsOverrides::default(), None)
            .unwrap();
        assert_eq!(r.settings, TrainingSettings::default());
        assert_eq!(r.pack, "muay_thai");
        assert_eq!(r.callouts.len(), 8);
    }

    #[test]
    fn resolve_cli_beats_file_beats_default() {
        let cfg = Config {
            settings: SettingsOverrides {
                round_count: Some(5),
                rest_duration: Some(20),
                ..SettingsOverrides::default()
            },
            pack: Some("boxing".into()),
            callouts: None,
        };
        let cli = SettingsOverrides {
            round_count: Some(8),
            ..SettingsOverrides::default()
        };
        let r = cfg.resolve(&cli, None).unwrap();
        assert_eq!(r.settings.round_count, 8);
        assert_eq!(r.settings.rest_duration, 20);
        assert_eq!(r.settings.round_duration, 180);
        assert_eq!(r.pack, "boxing");
    }

    #[test]
    fn resolve_prefers_file_callouts_unless_cli_names_a_pack() {
        let cfg = Config {
            callouts: Some(vec!["Jab".into(), " ".into(), "Hook".into()]),
            ..Config::default()
        };
        let r = cfg.resolve(&SettingsOverrides::default(), None).unwrap();
        assert_eq!(r.callouts.len(), 2);
        assert!(r.pack.is_empty());

        let r = cfg
            .resolve(&SettingsOverrides::default(), Some("kickboxing"))
            .unwrap();
        assert_eq!(r.pack, "kickboxing");
    }

    #[test]
    fn resolve_coerces_and_rejects_unknown_packs() {
        let cli = SettingsOverrides {
            round_duration: Some(0),
            ..SettingsOverrides::default()
        };
        let r = Config::default().resolve(&cli, None).unwrap();
        assert_eq!(r.settings.round_duration, 1);

        assert!(matches!(
            Config::default().resolve(&SettingsOverrides::default(), Some("nope")),
            Err(Error::UnknownPack(_))
        ));
    }

    #[test]
    fn default_path_ends_with_config_json() {
        let store = FileConfigStore::new();
        assert!(store.path().ends_with("config.json"));
    }
}
