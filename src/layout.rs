//! The layout model: a declarative description of how a dictionary page is
//! shaped, loaded once per run and shared read-only by all extractions.
//!
//! A layout names the categories a page may belong to (each with its own
//! `entry` selector and selector overrides), the nested field tree to carve
//! out, per-field arity constraints, the "undefined word" markers, the
//! elements to discard as noise, and the boundary selector marking the
//! legitimate content subtree.
//!
//! Layouts are validated up front so a malformed document fails at load
//! time with a clear message instead of deep inside the extraction
//! recursion.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};

/// Field name of the per-category entry root.
pub const ENTRY_FIELD: &str = "entry";

/// One selector or an ordered list of selectors for a field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Selector {
    One(String),
    Many(Vec<String>),
}

impl Selector {
    /// Iterate the selector strings in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        match self {
            Selector::One(s) => std::slice::from_ref(s).iter().map(String::as_str),
            Selector::Many(list) => list[..].iter().map(String::as_str),
        }
    }
}

/// Declared match-count constraint for a field.
///
/// Written in layout documents as `"0+"`, `"1+"`, `"0,1"`, or `"1,1"`
/// (compact `"01"`/`"11"` also accepted). The default is `0+`: optional,
/// any number of matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Arity {
    /// Min-arity 1: at least one valid candidate must match.
    pub required: bool,
    /// Max-arity `+`: keep every valid candidate, in document order.
    pub multiple: bool,
}

impl Default for Arity {
    fn default() -> Self {
        Arity { required: false, multiple: true }
    }
}

impl std::str::FromStr for Arity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "0+" => Ok(Arity { required: false, multiple: true }),
            "1+" => Ok(Arity { required: true, multiple: true }),
            "0,1" | "01" => Ok(Arity { required: false, multiple: false }),
            "1,1" | "11" => Ok(Arity { required: true, multiple: false }),
            other => Err(Error::Layout(format!(
                "invalid arity {other:?}: expected one of \"0+\", \"1+\", \"0,1\", \"1,1\""
            ))),
        }
    }
}

impl TryFrom<String> for Arity {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// How a leaf field's content is read from its matched element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Flattened text of the element's subtree.
    Text,
    /// The element's own `id` attribute.
    Id,
}

/// One node of the extraction shape: either a leaf field with a content
/// kind, or a nested field tree to recurse into per matched candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Leaf(ContentKind),
    Nested(Vec<(String, Shape)>),
}

impl Shape {
    /// The nested fields, or an empty slice for a leaf.
    #[must_use]
    pub fn fields(&self) -> &[(String, Shape)] {
        match self {
            Shape::Nested(fields) => fields,
            Shape::Leaf(_) => &[],
        }
    }

    fn collect_field_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        for (name, sub) in self.fields() {
            out.push(name);
            sub.collect_field_names(out);
        }
    }
}

impl<'de> Deserialize<'de> for Shape {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ShapeVisitor;

        impl<'de> Visitor<'de> for ShapeVisitor {
            type Value = Shape;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("\"text\", \"id\", or a nested field object")
            }

            fn visit_str<E: serde::de::Error>(self, s: &str) -> std::result::Result<Shape, E> {
                match s {
                    "text" => Ok(Shape::Leaf(ContentKind::Text)),
                    "id" => Ok(Shape::Leaf(ContentKind::Id)),
                    other => Err(E::unknown_variant(other, &["text", "id"])),
                }
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Shape, A::Error> {
                let mut fields = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, shape)) = access.next_entry::<String, Shape>()? {
                    fields.push((name, shape));
                }
                Ok(Shape::Nested(fields))
            }
        }

        deserializer.deserialize_any(ShapeVisitor)
    }
}

/// Deserialize a JSON object into declaration-ordered entries.
///
/// Category order decides extraction order, so the usual `HashMap` target
/// would lose information.
fn ordered_entries<'de, D, V>(deserializer: D) -> std::result::Result<Vec<(String, V)>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct EntriesVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
        type Value = Vec<(String, V)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a JSON object")
        }

        fn visit_map<A: MapAccess<'de>>(
            self,
            mut access: A,
        ) -> std::result::Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((key, value)) = access.next_entry::<String, V>()? {
                entries.push((key, value));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor(PhantomData))
}

/// Per-category configuration: selector overrides (must include `entry`)
/// and an optional shape override.
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    /// Field selectors merged over the shared map for this category.
    #[serde(deserialize_with = "ordered_entries")]
    pub selectors: Vec<(String, Selector)>,

    /// Category-specific entry shape; falls back to the layout shape.
    #[serde(default)]
    pub shape: Option<Shape>,
}

impl Category {
    /// The category's entry selector, if declared.
    #[must_use]
    pub fn entry_selector(&self) -> Option<&Selector> {
        self.selectors
            .iter()
            .find(|(name, _)| name == ENTRY_FIELD)
            .map(|(_, sel)| sel)
    }
}

/// Immutable layout configuration for one dictionary source.
#[derive(Debug, Clone, Deserialize)]
pub struct Layout {
    /// Shared field → selector map, overridable per category.
    #[serde(default)]
    pub selectors: HashMap<String, Selector>,

    /// Categories in declaration order.
    #[serde(deserialize_with = "ordered_entries")]
    pub categories: Vec<(String, Category)>,

    /// The entry shape applied under each category's `entry` selector.
    pub shape: Shape,

    /// Per-field arity constraints; missing fields default to `0+`.
    #[serde(default)]
    pub size: HashMap<String, Arity>,

    /// Selectors marking "this word does not exist" pages.
    #[serde(default)]
    pub undefined: Vec<String>,

    /// Selectors stripped unconditionally before validation.
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Selector of the legitimate content root; everything outside it is
    /// noise during validation.
    pub boundary: String,
}

impl Layout {
    /// Load and validate a layout from a JSON document.
    pub fn from_json(json: &str) -> Result<Layout> {
        let layout: Layout = serde_json::from_str(json)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Load and validate a layout from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Layout> {
        let json = std::fs::read_to_string(path)?;
        Layout::from_json(&json)
    }

    /// The arity declared for a field (default `0+`).
    #[must_use]
    pub fn arity(&self, field: &str) -> Arity {
        self.size.get(field).copied().unwrap_or_default()
    }

    /// The entry shape driving extraction for a category.
    #[must_use]
    pub fn shape_for(&self, category: &str) -> &Shape {
        self.category(category)
            .and_then(|cat| cat.shape.as_ref())
            .unwrap_or(&self.shape)
    }

    /// Look up a category by name.
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|(cat_name, _)| cat_name == name)
            .map(|(_, cat)| cat)
    }

    /// A fresh merge of a category's selectors over the shared map.
    ///
    /// Built per category so one category's overrides never bleed into the
    /// next.
    #[must_use]
    pub fn merged_selectors<'a>(&'a self, category: &str) -> HashMap<&'a str, &'a Selector> {
        let mut merged: HashMap<&str, &Selector> = self
            .selectors
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        if let Some(cat) = self.category(category) {
            for (field, selector) in &cat.selectors {
                merged.insert(field.as_str(), selector);
            }
        }
        merged
    }

    /// Schema validation, run once at load.
    fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(Error::Layout("no categories declared".to_string()));
        }
        if self.boundary.trim().is_empty() {
            return Err(Error::Layout("boundary selector is empty".to_string()));
        }

        for (name, category) in &self.categories {
            if category.entry_selector().is_none() {
                return Err(Error::Layout(format!(
                    "category {name:?} has no entry selector"
                )));
            }

            // Every required field must resolve to a selector under this
            // category's merge; optional fields may be left selector-less
            // (they simply never match).
            let merged = self.merged_selectors(name);
            let shape = self.shape_for(name);
            let mut field_names = Vec::new();
            shape.collect_field_names(&mut field_names);
            for field in field_names {
                if self.arity(field).required && !merged.contains_key(field) {
                    return Err(Error::Layout(format!(
                        "required field {field:?} has no selector under category {name:?}"
                    )));
                }
            }
        }

        Ok(())
    }
}
