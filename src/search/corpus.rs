//! The compact raw-corpus encoding produced by the documentation generator.
//!
//! Each library unit arrives as a set of parallel arrays: a string of
//! one-letter kind tags, optional item names, a sparse index-to-path list,
//! descriptions, 1-based parent references into the unit's path table,
//! encoded type signatures, deprecated item indices, the path table itself,
//! and an alias map. The corpus is an ordered list of units; the order fixes
//! global record id assignment in the built index.

use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;

/// An entire raw search corpus: `(unit name, unit data)` pairs in id order.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCorpus(pub Vec<(String, RawLibraryUnit)>);

/// One library unit in the compact parallel-array encoding.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLibraryUnit {
    /// Documentation summary for the unit itself.
    #[serde(default)]
    pub doc: String,
    /// One kind tag per item: `'A'` plus the kind discriminant.
    #[serde(rename = "t")]
    pub kinds: String,
    /// Item names; `null` means unnamed (e.g. an impl).
    #[serde(rename = "n")]
    pub names: Vec<Option<String>>,
    /// Sparse `(item index, path)` pairs. Items without an entry inherit the
    /// most recently emitted path ("last path wins").
    #[serde(rename = "q", default)]
    pub paths: Vec<(usize, String)>,
    /// Item descriptions, parallel to `names`.
    #[serde(rename = "d", default)]
    pub descs: Vec<String>,
    /// 1-based references into `path_table` (0 = no parent).
    #[serde(rename = "i", default)]
    pub parents: Vec<usize>,
    /// Encoded type signatures, parallel to `names`.
    #[serde(rename = "f", default)]
    pub signatures: Vec<RawSignature>,
    /// Indices of deprecated items.
    #[serde(rename = "c", default)]
    pub deprecated: Vec<usize>,
    /// `(kind discriminant, name)` pairs referenced by parents and signatures.
    #[serde(rename = "p", default)]
    pub path_table: Vec<(usize, String)>,
    /// Alias string to local item indices (relative to this unit's items).
    #[serde(rename = "a", default)]
    pub aliases: BTreeMap<String, Vec<usize>>,
}

/// An item's encoded signature: the literal `0` when the item has none,
/// otherwise `[inputs]` or `[inputs, output]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawSignature {
    Absent(u8),
    Declared(Vec<RawTypeList>),
}

/// One side of a signature: a lone path id, or a list of type entries.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTypeList {
    Single(usize),
    Many(Vec<RawType>),
}

/// One encoded type: a path id, or a path id with generic arguments.
/// Path id 0 is the anonymous generic-position placeholder; any other id is
/// 1-based into the unit's path table.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawType {
    Path(usize),
    WithGenerics(usize, Vec<RawType>),
}

/// Parse a JSON-encoded raw corpus.
///
/// The expected shape is an array of `[name, unit]` pairs, e.g.
/// `[["mylib", {"doc": "...", "t": "AF", ...}]]`.
pub fn parse_corpus(json: &str) -> crate::error::Result<RawCorpus> {
    serde_json::from_str(json).context("failed to parse raw search corpus")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn parses_minimal_unit() {
        let corpus = parse_corpus(
            r#"[["mylib", {
                "doc": "A library.",
                "t": "FD",
                "n": ["search", null],
                "q": [[0, "mylib"]],
                "d": ["Finds things.", ""],
                "i": [0, 1],
                "f": [[[1], 2], 0],
                "c": [1],
                "p": [[3, "Pattern"], [3, "Match"]],
                "a": {"find": [0]}
            }]]"#,
        )
        .unwrap();
        let (name, unit) = &corpus.0[0];
        check!(name == "mylib");
        check!(unit.kinds == "FD");
        check!(unit.names[1].is_none());
        check!(unit.paths == vec![(0, "mylib".to_string())]);
        check!(unit.deprecated == vec![1]);
        check!(unit.aliases.get("find") == Some(&vec![0]));
        check!(matches!(unit.signatures[1], RawSignature::Absent(0)));
        match &unit.signatures[0] {
            RawSignature::Declared(sides) => {
                check!(sides.len() == 2);
                check!(matches!(sides[0], RawTypeList::Many(_)));
                check!(matches!(sides[1], RawTypeList::Single(2)));
            }
            RawSignature::Absent(_) => panic!("expected a declared signature"),
        }
    }

    #[test]
    fn parses_nested_generics() {
        let corpus = parse_corpus(
            r#"[["g", {
                "t": "F",
                "n": ["map"],
                "q": [[0, "g"]],
                "d": [""],
                "i": [0],
                "f": [[[[1, [0, [2, [0]]]]]]],
                "p": [[3, "Vec"], [3, "Option"]]
            }]]"#,
        )
        .unwrap();
        let unit = &corpus.0[0].1;
        let RawSignature::Declared(sides) = &unit.signatures[0] else {
            panic!("expected a declared signature");
        };
        let RawTypeList::Many(inputs) = &sides[0] else {
            panic!("expected an input list");
        };
        let RawType::WithGenerics(id, generics) = &inputs[0] else {
            panic!("expected generics");
        };
        check!(*id == 1);
        check!(generics.len() == 2);
        check!(matches!(generics[0], RawType::Path(0)));
    }
}
