//! Block consolidation: turn the stored records for a headword into a
//! deduplicated, publish-ready entry list.
//!
//! The consolidator owns no storage; it queries a [`RecordStore`] the
//! caller hands it and expands the headword through an [`InflectionLookup`]
//! so records filed under any inflected form are found. Records that render
//! to an empty body are skipped (with a debug event); every other failure
//! propagates.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::debug;

use crate::error::Result;
use crate::inflect::{phrase_inflections, InflectionLookup};
use crate::record::{ConsolidatedEntry, Definition, EntryRecord, RecordStore, SenseBlock};

/// Source id to rank. Lower rank wins when duplicate entries collide;
/// sources without an explicit rank get rank 1 (the highest).
#[derive(Debug, Clone, Default)]
pub struct SourcePriority {
    ranks: HashMap<String, u32>,
}

impl SourcePriority {
    #[must_use]
    pub fn new() -> Self {
        SourcePriority::default()
    }

    #[must_use]
    pub fn with_rank(mut self, source: &str, rank: u32) -> Self {
        self.ranks.insert(source.to_string(), rank);
        self
    }

    #[must_use]
    pub fn rank(&self, source: &str) -> u32 {
        self.ranks.get(source).copied().unwrap_or(1)
    }
}

/// Per-pos phonetic table for one title, in first-seen record order.
/// Each slot is `(ipa_us, ipa_uk)`.
type IpaTable = Vec<(Option<String>, (Option<String>, Option<String>))>;

/// Consolidates stored extraction records into publishable entries.
pub struct Consolidator<S, L> {
    store: S,
    lookup: L,
    priority: SourcePriority,
}

impl<S: RecordStore, L: InflectionLookup> Consolidator<S, L> {
    pub fn new(store: S, lookup: L) -> Self {
        Consolidator {
            store,
            lookup,
            priority: SourcePriority::default(),
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: SourcePriority) -> Self {
        self.priority = priority;
        self
    }

    /// Resolve `headword` in `dictionary` to its consolidated entries.
    ///
    /// Steps: inflection expansion, record fetch, phonetic backfill from
    /// every dictionary, rendering, duplicate removal. Survivors keep
    /// their discovery order. An empty result means the headword has no
    /// publishable content, not an error.
    pub fn resolve(&self, dictionary: &str, headword: &str) -> Result<Vec<ConsolidatedEntry>> {
        let titles = phrase_inflections(&self.lookup, headword);
        let records = self.store.by_dictionary_titles(dictionary, &titles)?;

        let mut ipa_cache: HashMap<String, IpaTable> = HashMap::new();

        let mut entries: Vec<Option<ConsolidatedEntry>> = Vec::new();
        let mut keys: Vec<DedupKey> = Vec::new();

        for record in &records {
            let table: &IpaTable = match ipa_cache.entry(record.title.clone()) {
                Entry::Occupied(slot) => slot.into_mut(),
                Entry::Vacant(slot) => slot.insert(self.ipa_table(&record.title)?),
            };

            let pos = record.primary_pos().map(ToString::to_string);
            let (ipa_us, ipa_uk) = pick_ipa(table, pos.as_deref());

            let Some(entry) = render_entry(record, pos.clone(), ipa_us, ipa_uk, &titles) else {
                debug!(title = %record.title, cid = %record.cid, "entry has no body, skipped");
                continue;
            };

            keys.push(DedupKey {
                title: record.title.clone(),
                pos,
                rank: self.priority.rank(&entry.source),
                index: entries.len(),
            });
            entries.push(Some(entry));
        }

        for index in duplicate_indices(keys) {
            entries[index] = None;
        }

        Ok(entries.into_iter().flatten().collect())
    }

    /// Phonetic data for `title` across every dictionary: the first seen
    /// US and UK transcription per pos, each missing side mirrored from
    /// the other.
    fn ipa_table(&self, title: &str) -> Result<IpaTable> {
        let mut table: IpaTable = Vec::new();

        for record in self.store.by_title(title)? {
            let pos = record.primary_pos().map(ToString::to_string);
            if !table.iter().any(|(p, _)| *p == pos) {
                table.push((pos.clone(), (None, None)));
            }
            if let Some((_, slot)) = table.iter_mut().find(|(p, _)| *p == pos) {
                if slot.0.is_none() {
                    slot.0 = record.ipa_us.first().cloned();
                }
                if slot.1.is_none() {
                    slot.1 = record.ipa_uk.first().cloned();
                }
            }
        }

        for (_, slot) in &mut table {
            if slot.0.is_none() {
                slot.0.clone_from(&slot.1);
            }
            if slot.1.is_none() {
                slot.1.clone_from(&slot.0);
            }
        }

        Ok(table)
    }
}

/// Choose the transcription pair for `pos`: the same-pos slot when it has
/// a US side, otherwise the first slot in the table.
fn pick_ipa(table: &IpaTable, pos: Option<&str>) -> (Option<String>, Option<String>) {
    let same_pos = table
        .iter()
        .find(|(p, _)| p.as_deref() == pos)
        .map(|(_, slot)| slot.clone())
        .unwrap_or((None, None));

    if same_pos.0.is_none() {
        if let Some((_, first)) = table.first() {
            return first.clone();
        }
    }
    same_pos
}

fn render_entry(
    record: &EntryRecord,
    pos: Option<String>,
    ipa_us: Option<String>,
    ipa_uk: Option<String>,
    inflections: &[String],
) -> Option<ConsolidatedEntry> {
    let mut senses = Vec::new();
    for sense in &record.senses {
        let definitions: Vec<Definition> = sense
            .blocks
            .iter()
            .filter(|block| !block.is_empty())
            .map(|block| Definition {
                text: join_nonempty(&block.definitions),
                translation: join_nonempty(&block.translations),
                examples: block.examples.clone(),
            })
            .collect();

        // A sense without definition content contributes nothing, even
        // when it carries a guide word or phrase title.
        if definitions.is_empty() {
            continue;
        }

        senses.push(SenseBlock {
            guide_word: join_nonempty(&sense.guide_word),
            phrase_title: sense
                .pv_title
                .as_deref()
                .filter(|t| !t.is_empty())
                .map(ToString::to_string),
            definitions,
        });
    }

    if senses.is_empty() {
        return None;
    }

    Some(ConsolidatedEntry {
        headword: record.title.clone(),
        source: record.source(),
        pos,
        ipa_us,
        ipa_uk,
        inflections: inflections.to_vec(),
        senses,
    })
}

fn join_nonempty(parts: &[String]) -> Option<String> {
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

struct DedupKey {
    title: String,
    pos: Option<String>,
    rank: u32,
    index: usize,
}

/// Indices of entries superseded by a better entry for the same title.
///
/// Keys are sorted by `(title, pos, rank)` with an absent pos ordered
/// last, then scanned once: an entry falls when it shares the last kept
/// entry's title and either repeats its pos or has no pos of its own.
fn duplicate_indices(mut keys: Vec<DedupKey>) -> Vec<usize> {
    keys.sort_by(|a, b| {
        (&a.title, a.pos.is_none(), &a.pos, a.rank).cmp(&(
            &b.title,
            b.pos.is_none(),
            &b.pos,
            b.rank,
        ))
    });

    let mut removed = Vec::new();
    let mut previous: Option<&DedupKey> = None;
    for key in &keys {
        match previous {
            None => previous = Some(key),
            Some(prev) if key.title != prev.title => previous = Some(key),
            Some(prev) if key.pos != prev.pos && key.pos.is_some() => previous = Some(key),
            Some(_) => removed.push(key.index),
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::record::{DefBlockRecord, SenseRecord};
    use std::collections::BTreeSet;

    struct MemoryStore {
        records: Vec<EntryRecord>,
    }

    impl RecordStore for MemoryStore {
        fn by_dictionary_titles(
            &self,
            dictionary: &str,
            titles: &[String],
        ) -> Result<Vec<EntryRecord>> {
            Ok(self
                .records
                .iter()
                .filter(|r| r.dictionary == dictionary && titles.contains(&r.title))
                .cloned()
                .collect())
        }

        fn by_title(&self, title: &str) -> Result<Vec<EntryRecord>> {
            Ok(self
                .records
                .iter()
                .filter(|r| r.title == title)
                .cloned()
                .collect())
        }
    }

    struct FailingStore;

    impl RecordStore for FailingStore {
        fn by_dictionary_titles(&self, _: &str, _: &[String]) -> Result<Vec<EntryRecord>> {
            Err(Error::store("connection lost"))
        }

        fn by_title(&self, _: &str) -> Result<Vec<EntryRecord>> {
            Err(Error::store("connection lost"))
        }
    }

    struct NoLexicon;

    impl InflectionLookup for NoLexicon {
        fn lookup(&self, _: &str) -> BTreeSet<String> {
            BTreeSet::new()
        }
    }

    fn record(dictionary: &str, title: &str, cid: &str, pos: &[&str]) -> EntryRecord {
        EntryRecord {
            dictionary: dictionary.to_string(),
            title: title.to_string(),
            cid: cid.to_string(),
            pos: pos.iter().map(ToString::to_string).collect(),
            senses: vec![SenseRecord {
                guide_word: vec![],
                pv_title: None,
                blocks: vec![DefBlockRecord {
                    definitions: vec![format!("meaning of {title}")],
                    translations: vec![],
                    examples: vec![],
                }],
            }],
            ..EntryRecord::default()
        }
    }

    #[test]
    fn test_resolve_renders_and_sources() {
        let store = MemoryStore {
            records: vec![record("english", "run", "cald4-3-1", &["verb"])],
        };
        let consolidator = Consolidator::new(store, NoLexicon);
        let entries = consolidator.resolve("english", "run").unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].headword, "run");
        assert_eq!(entries[0].source, "cald4-3");
        assert_eq!(entries[0].pos.as_deref(), Some("verb"));
        assert_eq!(entries[0].inflections, vec!["run"]);
    }

    #[test]
    fn test_empty_body_entries_are_skipped() {
        let mut empty = record("english", "run", "cald4-1-1", &["verb"]);
        empty.senses[0].blocks[0].definitions.clear();
        let store = MemoryStore {
            records: vec![empty, record("english", "run", "cbed-1-1", &["noun"])],
        };
        let consolidator = Consolidator::new(store, NoLexicon);
        let entries = consolidator.resolve("english", "run").unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].pos.as_deref(), Some("noun"));
    }

    #[test]
    fn test_guide_word_alone_does_not_make_a_body() {
        let mut rec = record("english", "run", "cald4-1-1", &["verb"]);
        rec.senses[0].guide_word = vec!["(MOVE)".to_string()];
        rec.senses[0].blocks[0].definitions.clear();
        let store = MemoryStore {
            records: vec![rec],
        };
        let consolidator = Consolidator::new(store, NoLexicon);
        assert!(consolidator.resolve("english", "run").unwrap().is_empty());
    }

    #[test]
    fn test_ipa_backfill_mirrors_missing_side() {
        let mut us_only = record("english", "colour", "cald4-1-1", &["noun"]);
        us_only.ipa_us = vec!["ˈkʌl.ɚ".to_string()];
        let mut other_dict = record("british", "colour", "cbed-1-1", &["noun"]);
        other_dict.ipa_uk = vec!["ˈkʌl.ər".to_string()];

        let store = MemoryStore {
            records: vec![us_only, other_dict],
        };
        let consolidator = Consolidator::new(store, NoLexicon);
        let entries = consolidator.resolve("english", "colour").unwrap();

        assert_eq!(entries[0].ipa_us.as_deref(), Some("ˈkʌl.ɚ"));
        assert_eq!(entries[0].ipa_uk.as_deref(), Some("ˈkʌl.ər"));
    }

    #[test]
    fn test_ipa_falls_back_to_first_pos_with_data() {
        let verb = record("english", "record", "cald4-1-1", &["verb"]);
        let mut noun = record("english", "record", "cald4-1-2", &["noun"]);
        noun.ipa_us = vec!["ˈrek.ɚd".to_string()];

        let store = MemoryStore {
            records: vec![noun, verb],
        };
        let consolidator = Consolidator::new(store, NoLexicon);
        let entries = consolidator.resolve("english", "record").unwrap();

        // The verb entry has no transcription of its own and borrows the
        // first pos slot that does.
        let verb_entry = entries
            .iter()
            .find(|e| e.pos.as_deref() == Some("verb"))
            .unwrap();
        assert_eq!(verb_entry.ipa_us.as_deref(), Some("ˈrek.ɚd"));
    }

    #[test]
    fn test_duplicate_same_pos_keeps_better_rank() {
        let store = MemoryStore {
            records: vec![
                record("english", "run", "cacd-1-1", &["verb"]),
                record("english", "run", "cald4-1-1", &["verb"]),
            ],
        };
        let priority = SourcePriority::new()
            .with_rank("cald4-1", 2)
            .with_rank("cacd-1", 4);
        let consolidator = Consolidator::new(store, NoLexicon).with_priority(priority);
        let entries = consolidator.resolve("english", "run").unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source, "cald4-1");
    }

    #[test]
    fn test_posless_duplicate_yields_to_concrete_pos() {
        let store = MemoryStore {
            records: vec![
                record("english", "run", "cald4-1-1", &[]),
                record("english", "run", "cbed-1-1", &["noun"]),
            ],
        };
        let consolidator = Consolidator::new(store, NoLexicon);
        let entries = consolidator.resolve("english", "run").unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].pos.as_deref(), Some("noun"));
    }

    #[test]
    fn test_distinct_pos_entries_both_survive() {
        let store = MemoryStore {
            records: vec![
                record("english", "run", "cald4-1-1", &["verb"]),
                record("english", "run", "cald4-1-2", &["noun"]),
            ],
        };
        let consolidator = Consolidator::new(store, NoLexicon);
        let entries = consolidator.resolve("english", "run").unwrap();

        assert_eq!(entries.len(), 2);
        // Discovery order, not sort order.
        assert_eq!(entries[0].pos.as_deref(), Some("verb"));
        assert_eq!(entries[1].pos.as_deref(), Some("noun"));
    }

    #[test]
    fn test_store_errors_propagate() {
        let consolidator = Consolidator::new(FailingStore, NoLexicon);
        let err = consolidator.resolve("english", "run").unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }

    #[test]
    fn test_unknown_word_resolves_to_empty() {
        let store = MemoryStore { records: vec![] };
        let consolidator = Consolidator::new(store, NoLexicon);
        assert!(consolidator.resolve("english", "zzzz").unwrap().is_empty());
    }
}
