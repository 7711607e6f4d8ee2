//! Expansion of the compact raw corpus into the flat, globally-addressable
//! record table the matcher runs over.
//!
//! Building happens once at startup and the result is immutable: records are
//! addressed by a globally increasing id that other structures (the alias
//! table, result candidates) reference for the lifetime of the index.

use crate::error::CorpusError;
use crate::search::corpus::{RawCorpus, RawLibraryUnit, RawSignature, RawType, RawTypeList};
use crate::types::ItemKind;
use ahash::{AHashMap, AHashSet};

/// A non-owning reference to a named path-table entry (an item's parent, or
/// a concrete type in a signature).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRef {
    pub kind: ItemKind,
    pub name: String,
}

/// One (possibly generic) type reference within a signature.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeNode {
    /// `None` marks an anonymous generic-position placeholder.
    pub name: Option<String>,
    pub kind: Option<ItemKind>,
    /// Generic arguments, recursively. Unbounded depth, shallow in practice.
    pub generics: Vec<TypeNode>,
}

/// The input/output type shape of a function-like symbol.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeSignature {
    pub inputs: Vec<TypeNode>,
    /// Usually zero or one node; tuple-like returns may carry more.
    pub output: Vec<TypeNode>,
}

/// One indexed, searchable documented item.
#[derive(Debug, Clone)]
pub struct Record {
    /// Global id, equal to this record's position in the record table.
    pub id: usize,
    /// Index into the owning library unit's slot in [`SearchIndex::units`].
    pub unit: usize,
    pub kind: ItemKind,
    pub name: String,
    /// Lower-cased name with `_` separators stripped.
    pub normalized_name: String,
    /// `::`-separated module path, resolved via "last path wins".
    pub path: String,
    pub desc: String,
    /// Owning type or trait, when any. Lookup-only back-reference.
    pub parent: Option<PathRef>,
    pub signature: Option<TypeSignature>,
    pub deprecated: bool,
}

/// The built, immutable search index: flat record table, the lower-cased
/// search words aligned with it, and the per-unit alias table.
#[derive(Debug)]
pub struct SearchIndex {
    pub(crate) records: Vec<Record>,
    /// Lower-cased name per record, aligned by id. The unit-root record's
    /// word is the unit name itself.
    pub(crate) search_words: Vec<String>,
    /// Library unit names, in corpus order.
    pub(crate) units: Vec<String>,
    /// unit name -> lower-cased alias -> global record ids.
    pub(crate) aliases: AHashMap<String, AHashMap<String, Vec<usize>>>,
    /// Prefix for generated hyperlinks, typically `"../"`.
    pub(crate) root_path: String,
}

impl SearchIndex {
    /// Build an index from a raw corpus, with the default `"../"` link root.
    pub fn build(corpus: &RawCorpus) -> Result<Self, CorpusError> {
        Self::build_with_root_path(corpus, "../")
    }

    /// Build an index, using `root_path` as the prefix of generated links.
    pub fn build_with_root_path(corpus: &RawCorpus, root_path: &str) -> Result<Self, CorpusError> {
        let start = std::time::Instant::now();
        let mut index = Self {
            records: Vec::new(),
            search_words: Vec::new(),
            units: Vec::new(),
            aliases: AHashMap::new(),
            root_path: root_path.to_owned(),
        };
        for (name, unit) in &corpus.0 {
            index.push_unit(name, unit)?;
        }
        tracing::debug!(
            units = index.units.len(),
            records = index.records.len(),
            elapsed = ?start.elapsed(),
            "built search index"
        );
        Ok(index)
    }

    /// Expand one library unit: its synthetic root record, every item in
    /// array order, and its alias entries re-based to global ids.
    fn push_unit(&mut self, name: &str, unit: &RawLibraryUnit) -> Result<(), CorpusError> {
        let unit_index = self.units.len();
        self.units.push(name.to_owned());

        // The unit itself is searchable by name.
        self.search_words.push(name.to_owned());
        self.records.push(Record {
            id: self.records.len(),
            unit: unit_index,
            kind: ItemKind::ExternCrate,
            name: name.to_owned(),
            normalized_name: normalize(name),
            path: String::new(),
            desc: unit.doc.clone(),
            parent: None,
            signature: None,
            deprecated: false,
        });

        let path_table = decode_path_table(name, unit)?;
        let sparse_paths: AHashMap<usize, &str> = unit
            .paths
            .iter()
            .map(|(i, path)| (*i, path.as_str()))
            .collect();
        let deprecated: AHashSet<usize> = unit.deprecated.iter().copied().collect();

        let items_start = self.records.len();
        let mut last_path = String::new();
        for (i, tag) in unit.kinds.chars().enumerate() {
            let kind = ItemKind::from_tag(tag).ok_or_else(|| CorpusError::UnknownKindTag {
                unit: name.to_owned(),
                item: i,
                tag,
            })?;
            let item_name = unit
                .names
                .get(i)
                .and_then(|n| n.clone())
                .unwrap_or_default();
            let word = item_name.to_lowercase();
            let path = sparse_paths
                .get(&i)
                .map_or_else(|| last_path.clone(), |p| (*p).to_owned());

            let parent_ref = unit.parents.get(i).copied().unwrap_or(0);
            let parent = if parent_ref > 0 {
                let entry = path_table.originals.get(parent_ref - 1).ok_or_else(|| {
                    CorpusError::ParentOutOfRange {
                        unit: name.to_owned(),
                        item: i,
                        reference: parent_ref,
                    }
                })?;
                Some(entry.clone())
            } else {
                None
            };

            let signature = match unit.signatures.get(i) {
                None | Some(RawSignature::Absent(_)) => None,
                Some(RawSignature::Declared(sides)) => {
                    Some(decode_signature(name, i, sides, &path_table.lowercased)?)
                }
            };

            self.search_words.push(word.clone());
            self.records.push(Record {
                id: self.records.len(),
                unit: unit_index,
                kind,
                name: item_name,
                normalized_name: normalize(&word),
                path: path.clone(),
                desc: unit.descs.get(i).cloned().unwrap_or_default(),
                parent,
                signature,
                deprecated: deprecated.contains(&i),
            });
            last_path = path;
        }

        let item_count = self.records.len() - items_start;
        if !unit.aliases.is_empty() {
            let unit_aliases = self.aliases.entry(name.to_owned()).or_default();
            for (alias, targets) in &unit.aliases {
                let resolved = unit_aliases.entry(alias.to_lowercase()).or_default();
                for &local in targets {
                    if local >= item_count {
                        return Err(CorpusError::AliasOutOfRange {
                            unit: name.to_owned(),
                            alias: alias.clone(),
                            target: local,
                        });
                    }
                    resolved.push(items_start + local);
                }
            }
        }
        Ok(())
    }

    /// All records, indexable by global id.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The lower-cased search word for a record id.
    pub fn search_word(&self, id: usize) -> &str {
        &self.search_words[id]
    }

    /// Name of the library unit owning `record`.
    pub fn unit_name(&self, record: &Record) -> &str {
        &self.units[record.unit]
    }
}

/// The per-unit path table, decoded once: original-case entries for parent
/// back-references, lower-cased ones for signature type nodes.
struct DecodedPaths {
    originals: Vec<PathRef>,
    lowercased: Vec<PathRef>,
}

fn decode_path_table(unit_name: &str, unit: &RawLibraryUnit) -> Result<DecodedPaths, CorpusError> {
    let mut originals = Vec::with_capacity(unit.path_table.len());
    let mut lowercased = Vec::with_capacity(unit.path_table.len());
    for (entry, (kind, name)) in unit.path_table.iter().enumerate() {
        let kind = ItemKind::from_index(*kind).ok_or_else(|| CorpusError::BadPathKind {
            unit: unit_name.to_owned(),
            entry,
            kind: *kind,
        })?;
        originals.push(PathRef {
            kind,
            name: name.clone(),
        });
        lowercased.push(PathRef {
            kind,
            name: name.to_lowercase(),
        });
    }
    Ok(DecodedPaths {
        originals,
        lowercased,
    })
}

fn decode_signature(
    unit: &str,
    item: usize,
    sides: &[RawTypeList],
    paths: &[PathRef],
) -> Result<TypeSignature, CorpusError> {
    let inputs = match sides.first() {
        Some(side) => decode_type_list(unit, item, side, paths)?,
        None => Vec::new(),
    };
    let output = match sides.get(1) {
        Some(side) => decode_type_list(unit, item, side, paths)?,
        None => Vec::new(),
    };
    Ok(TypeSignature { inputs, output })
}

fn decode_type_list(
    unit: &str,
    item: usize,
    side: &RawTypeList,
    paths: &[PathRef],
) -> Result<Vec<TypeNode>, CorpusError> {
    match side {
        RawTypeList::Single(id) => Ok(vec![decode_type_node(unit, item, *id, &[], paths)?]),
        RawTypeList::Many(entries) => entries
            .iter()
            .map(|entry| decode_type(unit, item, entry, paths))
            .collect(),
    }
}

fn decode_type(
    unit: &str,
    item: usize,
    raw: &RawType,
    paths: &[PathRef],
) -> Result<TypeNode, CorpusError> {
    match raw {
        RawType::Path(id) => decode_type_node(unit, item, *id, &[], paths),
        RawType::WithGenerics(id, generics) => decode_type_node(unit, item, *id, generics, paths),
    }
}

/// Resolve one path id into a type node: 0 is the anonymous placeholder,
/// anything else is 1-based into the lower-cased path table.
fn decode_type_node(
    unit: &str,
    item: usize,
    id: usize,
    generics: &[RawType],
    paths: &[PathRef],
) -> Result<TypeNode, CorpusError> {
    let (name, kind) = if id == 0 {
        (None, None)
    } else {
        let entry = paths
            .get(id - 1)
            .ok_or_else(|| CorpusError::TypePathOutOfRange {
                unit: unit.to_owned(),
                item,
                id,
            })?;
        (Some(entry.name.clone()), Some(entry.kind))
    };
    let generics = generics
        .iter()
        .map(|g| decode_type(unit, item, g, paths))
        .collect::<Result<_, _>>()?;
    Ok(TypeNode {
        name,
        kind,
        generics,
    })
}

/// Lower-cased name with `_` separators stripped, the form fuzzy matching
/// and substring scans run against.
fn normalize(word: &str) -> String {
    let word = word.to_lowercase();
    if word.contains('_') {
        word.replace('_', "")
    } else {
        word
    }
}
