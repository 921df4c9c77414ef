//! Inflection closure: the full set of morphological forms reachable from
//! a word by repeated lookups against an external lexicon.
//!
//! The lexicon is a capability the caller provides; this module only
//! guarantees termination (done-set plus an expansion cap) and the phrase
//! ordering contract: the unmodified original phrase is always the first
//! element of a phrase-inflection list, so callers may skip index 0 as
//! "self".

use std::collections::{BTreeSet, HashSet, VecDeque};

use tracing::warn;

/// Upper bound on the number of surface forms one closure may reach.
///
/// A natural paradigm stays far below this; the cap exists so a cyclic or
/// adversarial lookup oracle cannot loop the work-list forever.
pub const DEFAULT_CLOSURE_CAP: usize = 512;

/// External morphological lexicon.
pub trait InflectionLookup {
    /// All inflected forms of `word` known to the lexicon. May be empty.
    fn lookup(&self, word: &str) -> BTreeSet<String>;
}

impl<L: InflectionLookup + ?Sized> InflectionLookup for &L {
    fn lookup(&self, word: &str) -> BTreeSet<String> {
        (**self).lookup(word)
    }
}

/// Every form reachable from `word`, including `word` itself.
///
/// Work-list closure with a done-set; expansion stops (with a warning) at
/// [`DEFAULT_CLOSURE_CAP`] forms and returns the capped prefix.
pub fn word_closure<L: InflectionLookup>(lookup: &L, word: &str) -> BTreeSet<String> {
    word_closure_capped(lookup, word, DEFAULT_CLOSURE_CAP)
}

/// [`word_closure`] with an explicit expansion cap.
pub fn word_closure_capped<L: InflectionLookup>(
    lookup: &L,
    word: &str,
    cap: usize,
) -> BTreeSet<String> {
    let mut forms = BTreeSet::new();
    forms.insert(word.to_string());

    let mut done: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<String> = VecDeque::new();
    queue.push_back(word.to_string());

    while let Some(next) = queue.pop_front() {
        if !done.insert(next.clone()) {
            continue;
        }
        for form in lookup.lookup(&next) {
            if forms.len() >= cap {
                warn!(word, cap, "inflection closure hit expansion cap");
                return forms;
            }
            if forms.insert(form.clone()) {
                queue.push_back(form);
            }
        }
    }

    forms
}

/// All inflected renderings of a whitespace-delimited phrase.
///
/// The word-by-word Cartesian product of each word's closure, space-joined
/// and deduplicated, with the unmodified original phrase forced to the
/// front even when it also occurs inside the product.
pub fn phrase_inflections<L: InflectionLookup>(lookup: &L, phrase: &str) -> Vec<String> {
    let closures: Vec<Vec<String>> = phrase
        .split_whitespace()
        .map(|word| word_closure(lookup, word).into_iter().collect())
        .collect();

    let mut combinations: Vec<String> = vec![String::new()];
    for word_forms in &closures {
        let mut next = Vec::with_capacity(combinations.len() * word_forms.len());
        for prefix in &combinations {
            for form in word_forms {
                if prefix.is_empty() {
                    next.push(form.clone());
                } else {
                    next.push(format!("{prefix} {form}"));
                }
            }
        }
        combinations = next;
    }

    let mut result = Vec::with_capacity(combinations.len() + 1);
    let mut seen: HashSet<&str> = HashSet::new();
    result.push(phrase.to_string());
    seen.insert(phrase);
    for rendering in &combinations {
        if seen.insert(rendering) {
            result.push(rendering.clone());
        }
    }
    result
}

/// The titles that are not an inflected form of any other title.
///
/// Used to reduce a dictionary's full title list to original headwords:
/// a title is kept unless it appears in some other title's phrase
/// inflections.
pub fn base_words<L: InflectionLookup>(lookup: &L, titles: &[String]) -> Vec<String> {
    let mut inflected: HashSet<String> = HashSet::new();
    for title in titles {
        // Index 0 is the title itself; only the derived forms count.
        for form in phrase_inflections(lookup, title).into_iter().skip(1) {
            if form != *title {
                inflected.insert(form);
            }
        }
    }

    let mut words: Vec<String> = titles
        .iter()
        .filter(|title| !inflected.contains(*title))
        .cloned()
        .collect();
    words.sort();
    words.dedup();
    words
}
