use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

use crate::error::Error;

static PACK_DIR: Dir = include_dir!("src/packs");

pub const DEFAULT_PACK: &str = "muay_thai";

pub type CalloutId = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct Callout {
    pub id: CalloutId,
    pub text: String,
    pub active: bool,
}

/// User-curated set of spoken phrases. Order is display order only.
#[derive(Debug, Clone, Default)]
pub struct CalloutList {
    items: Vec<Callout>,
    next_id: CalloutId,
}

impl CalloutList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for text in texts {
            list.add(text.as_ref());
        }
        list
    }

    /// Append an active callout. Blank text is ignored.
    pub fn add(&mut self, text: &str) -> Option<CalloutId> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.next_id += 1;
        let id = self.next_id;
        self.items.push(Callout {
            id,
            text: text.to_string(),
            active: true,
        });
        Some(id)
    }

    pub fn remove(&mut self, id: CalloutId) -> Option<Callout> {
        let idx = self.items.iter().position(|c| c.id == id)?;
        Some(self.items.remove(idx))
    }

    /// Flip the active flag, returning the new value
    pub fn toggle(&mut self, id: CalloutId) -> Option<bool> {
        let callout = self.items.iter_mut().find(|c| c.id == id)?;
        callout.active = !callout.active;
        Some(callout.active)
    }

    pub fn get(&self, id: CalloutId) -> Option<&Callout> {
        self.items.iter().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Callout> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn active(&self) -> impl Iterator<Item = &Callout> {
        self.items.iter().filter(|c| c.active)
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// Uniform pick from the active subset, None when nothing is active
    pub fn pick_random<R: Rng>(&self, rng: &mut R) -> Option<&Callout> {
        let active: Vec<&Callout> = self.active().collect();
        active.choose(rng).copied()
    }
}

/// Embedded default callout set
#[derive(Deserialize, Clone, Debug)]
pub struct CalloutPack {
    pub name: String,
    pub description: String,
    pub callouts: Vec<String>,
}

impl CalloutPack {
    pub fn load(name: &str) -> Result<Self, Error> {
        let file = PACK_DIR
            .get_file(format!("{name}.json"))
            .ok_or_else(|| Error::UnknownPack(name.to_string()))?;

        let contents = file
            .contents_utf8()
            .ok_or_else(|| Error::UnknownPack(name.to_string()))?;

        Ok(serde_json::from_str(contents)?)
    }

    /// Names of all embedded packs, sorted
    pub fn available() -> Vec<String> {
        let mut names: Vec<String> = PACK_DIR
            .files()
            .filter_map(|f| f.path().file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn into_list(self) -> CalloutList {
        CalloutList::from_texts(self.callouts)
    }
}
