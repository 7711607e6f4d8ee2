//! The closed set of symbol kinds and the tables that drive kind dispatch.
//!
//! Kinds are a fixed enumeration: corpus encodings refer to them by a
//! one-letter tag (`'A'` plus the discriminant), user queries refer to them
//! by filter name (`fn:`, `struct:`, ...). Compatibility between a query
//! filter and an indexed kind is an explicit table, not name matching.

/// Kind of a documented symbol.
///
/// Discriminant order is part of the corpus encoding (tag letters) and of the
/// ranking order (ties break on kind), so variants must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ItemKind {
    Module = 0,
    ExternCrate,
    Import,
    Struct,
    Enum,
    Function,
    TypeAlias,
    Static,
    Trait,
    Impl,
    TyMethod,
    Method,
    StructField,
    Variant,
    Macro,
    Primitive,
    AssocType,
    Constant,
    AssocConst,
    Union,
    ForeignType,
    Keyword,
    Existential,
    Attr,
    Derive,
    TraitAlias,
}

/// All kinds in discriminant order. Indexed by corpus tag offset.
const ALL_KINDS: [ItemKind; 26] = [
    ItemKind::Module,
    ItemKind::ExternCrate,
    ItemKind::Import,
    ItemKind::Struct,
    ItemKind::Enum,
    ItemKind::Function,
    ItemKind::TypeAlias,
    ItemKind::Static,
    ItemKind::Trait,
    ItemKind::Impl,
    ItemKind::TyMethod,
    ItemKind::Method,
    ItemKind::StructField,
    ItemKind::Variant,
    ItemKind::Macro,
    ItemKind::Primitive,
    ItemKind::AssocType,
    ItemKind::Constant,
    ItemKind::AssocConst,
    ItemKind::Union,
    ItemKind::ForeignType,
    ItemKind::Keyword,
    ItemKind::Existential,
    ItemKind::Attr,
    ItemKind::Derive,
    ItemKind::TraitAlias,
];

impl ItemKind {
    /// Decode a corpus kind tag (`'A'` = `Module`, `'B'` = `ExternCrate`, ...).
    pub fn from_tag(tag: char) -> Option<Self> {
        let offset = (tag as u32).checked_sub('A' as u32)?;
        ALL_KINDS.get(offset as usize).copied()
    }

    /// Decode a numeric kind discriminant, as used in corpus path tables.
    pub fn from_index(index: usize) -> Option<Self> {
        ALL_KINDS.get(index).copied()
    }

    /// Resolve a user-facing type filter name (`fn:`, `const:`, ...).
    ///
    /// `"const"` is accepted as shorthand for `"constant"`. Unknown names
    /// return `None`; the query parser turns that into a parse error.
    pub fn from_filter_name(name: &str) -> Option<Self> {
        let name = if name == "const" { "constant" } else { name };
        ALL_KINDS.iter().copied().find(|k| k.tag_name() == name)
    }

    /// The canonical short name for this kind, as used in type filters,
    /// link fragments, and result display.
    pub fn tag_name(self) -> &'static str {
        match self {
            Self::Module => "mod",
            Self::ExternCrate => "externcrate",
            Self::Import => "import",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Function => "fn",
            Self::TypeAlias => "type",
            Self::Static => "static",
            Self::Trait => "trait",
            Self::Impl => "impl",
            Self::TyMethod => "tymethod",
            Self::Method => "method",
            Self::StructField => "structfield",
            Self::Variant => "variant",
            Self::Macro => "macro",
            Self::Primitive => "primitive",
            Self::AssocType => "associatedtype",
            Self::Constant => "constant",
            Self::AssocConst => "associatedconstant",
            Self::Union => "union",
            Self::ForeignType => "foreigntype",
            Self::Keyword => "keyword",
            Self::Existential => "existential",
            Self::Attr => "attr",
            Self::Derive => "derive",
            Self::TraitAlias => "traitalias",
        }
    }

    /// Primitive types and keywords rank ahead of other kinds on ties.
    pub fn is_primitive_or_keyword(self) -> bool {
        matches!(self, Self::Primitive | Self::Keyword)
    }
}

/// Whether an indexed kind is admissible under a query's type filter.
///
/// `None` means no filter. A few filters admit closely related kinds:
/// `constant` covers associated constants, `fn` covers trait methods,
/// `type` covers primitives and associated types, `trait` covers trait
/// aliases.
pub fn passes_filter(filter: Option<ItemKind>, kind: ItemKind) -> bool {
    let Some(filter) = filter else { return true };
    if filter == kind {
        return true;
    }
    match filter {
        ItemKind::Constant => kind == ItemKind::AssocConst,
        ItemKind::Function => matches!(kind, ItemKind::Method | ItemKind::TyMethod),
        ItemKind::TypeAlias => matches!(kind, ItemKind::Primitive | ItemKind::AssocType),
        ItemKind::Trait => kind == ItemKind::TraitAlias,
        _ => false,
    }
}
