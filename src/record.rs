//! Stored extraction records and the consolidated output type.
//!
//! `EntryRecord` mirrors the JSON documents an extraction run persists
//! (field names follow the stored schema, hence the serde renames); the
//! [`RecordStore`] trait is the capability a consolidator queries them
//! through. `ConsolidatedEntry` is the publish-ready rendering.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One stored extraction entry, as produced by a page extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    /// Source dictionary identifier, e.g. `"english"`.
    #[serde(default)]
    pub dictionary: String,
    /// Headword title this entry was filed under.
    #[serde(default)]
    pub title: String,
    /// Entry element id from the source markup, e.g. `"cald4-1-1"`.
    #[serde(default)]
    pub cid: String,
    /// Part-of-speech labels; the first one is authoritative.
    #[serde(default)]
    pub pos: Vec<String>,
    #[serde(default, rename = "ipaUS")]
    pub ipa_us: Vec<String>,
    #[serde(default, rename = "ipaUK")]
    pub ipa_uk: Vec<String>,
    #[serde(default, rename = "posSense")]
    pub senses: Vec<SenseRecord>,
}

impl EntryRecord {
    /// First part-of-speech label, if any.
    #[must_use]
    pub fn primary_pos(&self) -> Option<&str> {
        self.pos.first().map(String::as_str)
    }

    /// The source id: the `cid` with its trailing `-` segment dropped.
    ///
    /// `"cald4-1-2"` identifies entry 2 of page 1 in source `"cald4"`.
    #[must_use]
    pub fn source(&self) -> String {
        match self.cid.rfind('-') {
            Some(cut) => self.cid[..cut].to_string(),
            None => String::new(),
        }
    }
}

/// One sense group within an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenseRecord {
    #[serde(default, rename = "guideWord")]
    pub guide_word: Vec<String>,
    /// Phrasal-verb or idiom title when the sense belongs to one.
    #[serde(default, rename = "pvTitle")]
    pub pv_title: Option<String>,
    #[serde(default, rename = "defBlock")]
    pub blocks: Vec<DefBlockRecord>,
}

/// One definition block: definition text, translation, examples.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefBlockRecord {
    #[serde(default, rename = "define")]
    pub definitions: Vec<String>,
    #[serde(default, rename = "trans")]
    pub translations: Vec<String>,
    #[serde(default, rename = "examp")]
    pub examples: Vec<String>,
}

impl DefBlockRecord {
    /// True when the block carries no definition, translation or example.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty() && self.translations.is_empty() && self.examples.is_empty()
    }
}

/// Query capability over persisted extraction records.
///
/// Implementations decide where records live; the consolidator only needs
/// these two lookups.
pub trait RecordStore {
    /// All records in `dictionary` whose title is one of `titles`.
    fn by_dictionary_titles(&self, dictionary: &str, titles: &[String])
        -> Result<Vec<EntryRecord>>;

    /// All records with exactly this title, across every dictionary.
    fn by_title(&self, title: &str) -> Result<Vec<EntryRecord>>;
}

/// A publish-ready dictionary entry after consolidation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsolidatedEntry {
    pub headword: String,
    /// Source id derived from the record's `cid` (trailing segment dropped).
    pub source: String,
    pub pos: Option<String>,
    pub ipa_us: Option<String>,
    pub ipa_uk: Option<String>,
    /// Every inflected form the headword should be findable under.
    pub inflections: Vec<String>,
    pub senses: Vec<SenseBlock>,
}

/// A rendered sense group; only groups with definition content survive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SenseBlock {
    pub guide_word: Option<String>,
    pub phrase_title: Option<String>,
    pub definitions: Vec<Definition>,
}

/// A rendered definition block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Definition {
    pub text: Option<String>,
    pub translation: Option<String>,
    pub examples: Vec<String>,
}
