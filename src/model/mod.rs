//! # Result Tree Model
//!
//! The input representation for the report generator: diagnostic results
//! grouped type → section → subsection. The tree is produced by an external
//! processing pipeline, usually serialized as JSON, and is read-only here.
//!
//! Insertion order matters everywhere: it is the order things get rendered
//! in, so every map in this module is an [`OrderedMap`] rather than a hash
//! map. The decoder also tolerates the `[]` that many producers emit for an
//! empty map.

use std::fmt;
use std::marker::PhantomData;

use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::Result;

/// Key that marks an entry as needing a specific section renderer.
pub const SPECIFIC_SECTION_KEY: &str = "specificSections";

/// A string-keyed map that remembers insertion order.
#[derive(Debug, Clone)]
pub struct OrderedMap<T> {
    entries: IndexMap<String, T>,
}

// Two maps with the same entries in a different order render differently.
impl<T: PartialEq> PartialEq for OrderedMap<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entries.iter().eq(other.entries.iter())
    }
}

impl<T> OrderedMap<T> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Append an entry, replacing the value of an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for OrderedMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, T> FromIterator<(K, T)> for OrderedMap<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

struct OrderedMapVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<T> {
    type Value = OrderedMap<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map, or an empty array standing in for an empty map")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
        let mut entries = IndexMap::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, T>()? {
            entries.insert(key, value);
        }
        Ok(OrderedMap { entries })
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
        if seq.next_element::<de::IgnoredAny>()?.is_some() {
            return Err(de::Error::custom("expected a map, found a non-empty array"));
        }
        Ok(OrderedMap::new())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OrderedMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(OrderedMapVisitor(PhantomData))
    }
}

/// All results of a run: type name → sections.
pub type ResultTree = OrderedMap<TypeResults>;

/// One diagnostic type: section name → subsections.
pub type TypeResults = OrderedMap<SectionResults>;

/// One section: subsection name → result.
pub type SectionResults = OrderedMap<SubResult>;

/// Parse a result tree from JSON.
pub fn parse_result_tree(json: &str) -> Result<ResultTree> {
    Ok(serde_json::from_str(json)?)
}

/// The three kinds of finding lists a subsection can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Suggestion,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Error, Severity::Warning, Severity::Suggestion];

    /// The label drawn above the block of entries.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "Errors",
            Severity::Warning => "Warnings",
            Severity::Suggestion => "Suggestions",
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubResultFields {
    #[serde(default, deserialize_with = "truthy")]
    has_errors: bool,
    #[serde(default)]
    errors: OrderedMap<Entry>,
    #[serde(default)]
    warnings: OrderedMap<Entry>,
    #[serde(default)]
    suggestions: OrderedMap<Entry>,
}

/// The findings of one subsection.
///
/// `hasErrors` follows loose truthiness: `1`, `"yes"` or a non-empty list
/// count as set. A subsection whose value is not an object at all decodes
/// as an empty, quiet result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubResult {
    pub has_errors: bool,
    pub errors: OrderedMap<Entry>,
    pub warnings: OrderedMap<Entry>,
    pub suggestions: OrderedMap<Entry>,
}

impl From<SubResultFields> for SubResult {
    fn from(fields: SubResultFields) -> Self {
        Self {
            has_errors: fields.has_errors,
            errors: fields.errors,
            warnings: fields.warnings,
            suggestions: fields.suggestions,
        }
    }
}

impl<'de> Deserialize<'de> for SubResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            object @ Value::Object(_) => serde_json::from_value::<SubResultFields>(object)
                .map(SubResult::from)
                .map_err(de::Error::custom),
            _ => Ok(SubResult::default()),
        }
    }
}

fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    Ok(is_truthy(&Value::deserialize(deserializer)?))
}

/// `null`, `false`, zero, `""`, `"0"` and empty containers are false.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

impl SubResult {
    /// Whether anything at all gets emitted for this subsection.
    pub fn is_actionable(&self) -> bool {
        self.has_errors
    }

    pub fn entries(&self, severity: Severity) -> &OrderedMap<Entry> {
        match severity {
            Severity::Error => &self.errors,
            Severity::Warning => &self.warnings,
            Severity::Suggestion => &self.suggestions,
        }
    }
}

/// A single finding.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// Rendered by the generic file-list renderer.
    Generic(GenericEntry),
    /// Rendered by the specific section renderer registered for `tag`.
    Tagged(TaggedEntry),
}

impl Entry {
    pub fn intro(&self) -> Intro<'_> {
        match self {
            Entry::Generic(entry) => entry.intro(),
            Entry::Tagged(entry) => entry.intro(),
        }
    }

    /// Generic entries without files draw nothing; tagged entries always go
    /// to their renderer.
    pub fn is_renderable(&self) -> bool {
        match self {
            Entry::Generic(entry) => !entry.files.is_empty(),
            Entry::Tagged(_) => true,
        }
    }
}

impl<'de> Deserialize<'de> for Entry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mut data = Map::<String, Value>::deserialize(deserializer)?;
        match data.remove(SPECIFIC_SECTION_KEY) {
            Some(Value::String(tag)) => Ok(Entry::Tagged(TaggedEntry { tag, data })),
            Some(other) => Err(de::Error::custom(format!(
                "`{}` must be a string, found {}",
                SPECIFIC_SECTION_KEY, other
            ))),
            None => serde_json::from_value(Value::Object(data))
                .map(Entry::Generic)
                .map_err(de::Error::custom),
        }
    }
}

/// An entry with an intro and a list of offending files.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenericEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub caution: Option<String>,
    #[serde(default)]
    pub files: FileList,
}

impl GenericEntry {
    pub fn intro(&self) -> Intro<'_> {
        Intro {
            title: self.title.as_deref(),
            explanation: self.explanation.as_deref(),
            caution: self.caution.as_deref(),
        }
    }
}

/// An entry handed to a specific renderer, tag already stripped.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedEntry {
    pub tag: String,
    pub data: Map<String, Value>,
}

impl TaggedEntry {
    pub fn intro(&self) -> Intro<'_> {
        Intro::from_data(&self.data)
    }
}

/// The title/explanation/caution block that opens an entry. Every part is
/// optional.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Intro<'a> {
    pub title: Option<&'a str>,
    pub explanation: Option<&'a str>,
    pub caution: Option<&'a str>,
}

impl<'a> Intro<'a> {
    /// Read the intro fields out of free-form entry data. Non-string values
    /// are treated as absent.
    pub fn from_data(data: &'a Map<String, Value>) -> Self {
        Self {
            title: data.get("title").and_then(Value::as_str),
            explanation: data.get("explanation").and_then(Value::as_str),
            caution: data.get("caution").and_then(Value::as_str),
        }
    }
}

/// One line of a file listing: either a bare file, or a named group of files.
#[derive(Debug, Clone, PartialEq)]
pub enum FileItem {
    File(String),
    Group { name: String, files: Vec<String> },
}

/// The files attached to a generic entry, in input order.
///
/// Decodes from a flat array of file names, or from an object whose values
/// are either a file name or an array of file names (a group).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileList {
    pub items: Vec<FileItem>,
}

impl FileList {
    pub fn flat<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: files.into_iter().map(|f| FileItem::File(f.into())).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FileValue {
    One(String),
    Many(Vec<String>),
}

struct FileListVisitor;

impl<'de> Visitor<'de> for FileListVisitor {
    type Value = FileList;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of file names or an object of file groups")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<FileList, A::Error> {
        let mut items = Vec::new();
        while let Some(file) = seq.next_element::<String>()? {
            items.push(FileItem::File(file));
        }
        Ok(FileList { items })
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<FileList, A::Error> {
        let mut items = Vec::new();
        while let Some((name, value)) = access.next_entry::<String, FileValue>()? {
            items.push(match value {
                FileValue::One(file) => FileItem::File(file),
                FileValue::Many(files) => FileItem::Group { name, files },
            });
        }
        Ok(FileList { items })
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<FileList, E> {
        Ok(FileList::default())
    }
}

impl<'de> Deserialize<'de> for FileList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(FileListVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_insertion_order() {
        let tree = parse_result_tree(
            r#"{"php": {"zeta": {}, "alpha": {}, "mid": {}}}"#,
        )
        .unwrap();
        let sections: Vec<&str> = tree.get("php").unwrap().iter().map(|(k, _)| k).collect();
        assert_eq!(sections, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_empty_array_decodes_as_empty_map() {
        let sub: SubResult =
            serde_json::from_str(r#"{"hasErrors": true, "errors": [], "warnings": []}"#).unwrap();
        assert!(sub.has_errors);
        assert!(sub.errors.is_empty());
        assert!(sub.warnings.is_empty());
        assert!(sub.suggestions.is_empty());
    }

    #[test]
    fn test_missing_flag_is_not_actionable() {
        let sub: SubResult = serde_json::from_str("{}").unwrap();
        assert!(!sub.is_actionable());
    }

    #[test]
    fn test_has_errors_is_truthy() {
        let parsed = |flag: &str| -> bool {
            let json = format!(r#"{{"hasErrors": {}}}"#, flag);
            serde_json::from_str::<SubResult>(&json).unwrap().has_errors
        };
        assert!(parsed("1"));
        assert!(parsed("2.5"));
        assert!(parsed(r#""yes""#));
        assert!(parsed("[0]"));
        assert!(!parsed("0"));
        assert!(!parsed("0.0"));
        assert!(!parsed(r#""""#));
        assert!(!parsed(r#""0""#));
        assert!(!parsed("null"));
        assert!(!parsed("[]"));
    }

    #[test]
    fn test_integer_flag_in_tree_is_actionable() {
        let tree = parse_result_tree(r#"{"php": {"s": {"real": {"hasErrors": 1}}}}"#).unwrap();
        let sub = tree.get("php").unwrap().get("s").unwrap().get("real").unwrap();
        assert!(sub.is_actionable());
    }

    #[test]
    fn test_scalar_subsection_is_quiet() {
        let tree = parse_result_tree(
            r#"{"php": {"s": {"meta": "done", "count": 3, "none": null, "real": {"hasErrors": true}}}}"#,
        )
        .unwrap();
        let section = tree.get("php").unwrap().get("s").unwrap();
        let names: Vec<&str> = section.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["meta", "count", "none", "real"]);
        assert_eq!(section.get("meta"), Some(&SubResult::default()));
        assert!(!section.get("count").unwrap().is_actionable());
        assert!(!section.get("none").unwrap().is_actionable());
        assert!(section.get("real").unwrap().is_actionable());
    }

    #[test]
    fn test_tagged_entry_strips_tag() {
        let entry: Entry = serde_json::from_str(
            r#"{"specificSections": "manageBlockVMRatio", "title": "Ratio", "files": {"A_B": 0.7}}"#,
        )
        .unwrap();
        match entry {
            Entry::Tagged(tagged) => {
                assert_eq!(tagged.tag, "manageBlockVMRatio");
                assert!(!tagged.data.contains_key(SPECIFIC_SECTION_KEY));
                assert_eq!(tagged.intro().title, Some("Ratio"));
            }
            other => panic!("expected tagged entry, got {:?}", other),
        }
    }

    #[test]
    fn test_non_string_tag_is_rejected() {
        let result: std::result::Result<Entry, _> =
            serde_json::from_str(r#"{"specificSections": 3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_grouped_and_flat_files() {
        let entry: GenericEntry = serde_json::from_str(
            r#"{"title": "T", "files": {"Vendor_Module": ["a.php", "b.php"], "0": "c.php"}}"#,
        )
        .unwrap();
        assert_eq!(
            entry.files.items,
            vec![
                FileItem::Group {
                    name: "Vendor_Module".to_string(),
                    files: vec!["a.php".to_string(), "b.php".to_string()],
                },
                FileItem::File("c.php".to_string()),
            ]
        );

        let flat: GenericEntry = serde_json::from_str(r#"{"files": ["x", "y"]}"#).unwrap();
        assert_eq!(flat.files, FileList::flat(["x", "y"]));
    }

    #[test]
    fn test_missing_files_is_empty() {
        let entry: GenericEntry = serde_json::from_str(r#"{"title": "Only a title"}"#).unwrap();
        assert!(entry.files.is_empty());
        assert_eq!(entry.intro().explanation, None);
    }

    #[test]
    fn test_insert_replaces_existing_key_in_place() {
        let mut map: OrderedMap<u32> = [("a", 1), ("b", 2)].into_iter().collect();
        map.insert("a", 3);
        let items: Vec<(&str, &u32)> = map.iter().collect();
        assert_eq!(items, vec![("a", &3), ("b", &2)]);
    }

    #[test]
    fn test_equality_depends_on_order() {
        let ab: OrderedMap<u32> = [("a", 1), ("b", 2)].into_iter().collect();
        let ba: OrderedMap<u32> = [("b", 2), ("a", 1)].into_iter().collect();
        let same: OrderedMap<u32> = [("a", 1), ("b", 2)].into_iter().collect();
        assert_ne!(ab, ba);
        assert_eq!(ab, same);
    }
}
