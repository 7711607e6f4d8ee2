//! Recursive-descent parser turning free-text queries into structured,
//! possibly nested, query-element trees.
//!
//! Parse failures are recoverable data, not exceptions: the parser stores a
//! [`ParseError`] (alternating plain/code fragments, ready for safe styling
//! by a renderer) on the returned [`ParsedQuery`] and never panics or
//! propagates an error past this boundary.

use crate::types::ItemKind;

/// One styled piece of a parse-error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Plain(String),
    Code(String),
}

/// A structured, renderable parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub parts: Vec<Fragment>,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for part in &self.parts {
            match part {
                Fragment::Plain(text) => write!(f, "{text}")?,
                Fragment::Code(text) => write!(f, "`{text}`")?,
            }
        }
        Ok(())
    }
}

macro_rules! perr {
    ($($kind:ident($text:expr)),+ $(,)?) => {
        ParseError { parts: vec![ $(Fragment::$kind($text.into())),+ ] }
    };
}

/// One parsed subject or return-type term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryElement {
    /// The term as written, `::` separators included.
    pub name: String,
    pub full_path: Vec<String>,
    pub path_without_last: Vec<String>,
    pub path_last: String,
    /// Nested generic arguments, recursively.
    pub generics: Vec<QueryElement>,
    /// Resolved kind filter; `None` means no filter.
    pub type_filter: Option<ItemKind>,
}

/// A fully parsed query, error included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    /// The raw input, trimmed.
    pub original: String,
    /// Lower-cased form of `original`; what matching runs against.
    pub user_query: String,
    /// Subject terms.
    pub elems: Vec<QueryElement>,
    /// Terms after a `->`.
    pub returned: Vec<QueryElement>,
    /// Top-level term count (`elems` plus `returned`).
    pub found_elems: usize,
    /// Exact-match mode: entered by quoting, or forced by multi-term queries.
    pub literal_search: bool,
    pub error: Option<ParseError>,
}

/// Element as produced by the grammar pass, kind filter still unresolved.
struct RawElem {
    name: String,
    full_path: Vec<String>,
    path_without_last: Vec<String>,
    path_last: String,
    generics: Vec<RawElem>,
    filter: Option<String>,
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Whitespace that may separate elements (newlines may not).
fn is_separator_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t')
}

fn is_separator(c: char) -> bool {
    c == ',' || is_separator_whitespace(c)
}

fn is_end_char(c: char) -> bool {
    matches!(c, ',' | '>' | '-')
}

fn is_stop_char(c: char) -> bool {
    is_whitespace(c) || is_end_char(c)
}

fn is_error_char(c: char) -> bool {
    matches!(c, '(' | ')')
}

/// Characters opening a nested construct (generics list or quoted element).
fn is_special_start(c: char) -> bool {
    matches!(c, '<' | '"')
}

fn is_ident_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

struct Parser<'a> {
    chars: &'a [char],
    pos: usize,
    /// Elements created so far, nested generics included.
    total_elems: usize,
    /// How many of `total_elems` sit inside generics lists.
    generics_elems: usize,
    /// Pending `name:` kind filter, consumed by the next created element.
    type_filter: Option<String>,
    literal_search: bool,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn at_path_start(&self) -> bool {
        self.chars.get(self.pos) == Some(&':') && self.chars.get(self.pos + 1) == Some(&':')
    }

    fn at_return_arrow(&self) -> bool {
        self.chars.get(self.pos) == Some(&'-') && self.chars.get(self.pos + 1) == Some(&'>')
    }

    /// Scan an identifier (possibly a `::` path, possibly ending in a macro
    /// `!`) and return the exclusive end position of its name part.
    fn ident_end(&mut self) -> Result<usize, ParseError> {
        let start = self.pos;
        let mut end = self.pos;
        let mut exclamation: Option<usize> = None;
        while let Some(c) = self.peek() {
            if !is_ident_char(c) {
                if c == '!' {
                    if exclamation.is_some() {
                        return Err(perr!(
                            Plain("Cannot have more than one "),
                            Code("!"),
                            Plain(" in an ident"),
                        ));
                    }
                    if self
                        .chars
                        .get(self.pos + 1)
                        .is_some_and(|&next| is_ident_char(next))
                    {
                        return Err(perr!(
                            Plain("Unexpected "),
                            Code("!"),
                            Plain(": it can only be at the end of an ident"),
                        ));
                    }
                    exclamation = Some(self.pos);
                } else if is_error_char(c) {
                    return Err(perr!(Plain("Unexpected "), Code(c)));
                } else if is_stop_char(c) || is_special_start(c) || is_separator(c) {
                    break;
                } else if c == ':' {
                    if !self.at_path_start() {
                        break;
                    }
                    if exclamation.is_some() {
                        if end >= start + 2 {
                            return Err(perr!(Plain("Cannot have associated items in macros")));
                        }
                        exclamation = None;
                    }
                    self.pos += 1;
                } else {
                    return Err(perr!(Plain("Unexpected "), Code(c)));
                }
            }
            self.pos += 1;
            end = self.pos;
        }
        if let Some(mark) = exclamation
            && end >= start + 2
        {
            if self.type_filter.is_none() {
                self.type_filter = Some("macro".to_owned());
            } else if self.type_filter.as_deref() != Some("macro") {
                let other = self.type_filter.clone().unwrap_or_default();
                return Err(perr!(
                    Plain("Invalid search type: macro "),
                    Code("!"),
                    Plain(" and "),
                    Code(other),
                    Plain(" both specified"),
                ));
            }
            end = mark;
        }
        Ok(end)
    }

    /// Consume a quoted element's body, leaving `pos` just past the closing
    /// quote. The opening quote has not been consumed yet.
    fn string_elem(&mut self, in_generics: bool) -> Result<(), ParseError> {
        if in_generics {
            return Err(perr!(
                Plain("Unexpected "),
                Code("\""),
                Plain(" in generics"),
            ));
        }
        if self.literal_search {
            return Err(perr!(Plain("Cannot have more than one literal search element")));
        }
        if self.total_elems - self.generics_elems > 0 {
            return Err(perr!(Plain(
                "Cannot use literal search when there is more than one element"
            )));
        }
        self.pos += 1;
        let start = self.pos;
        let end = self.ident_end()?;
        if self.pos >= self.chars.len() {
            return Err(perr!(Plain("Unclosed "), Code("\"")));
        }
        if self.chars[end] != '"' {
            return Err(perr!(
                Plain("Unexpected "),
                Code(self.chars[end]),
                Plain(" in a string element"),
            ));
        }
        if start == end {
            return Err(perr!(Plain("Cannot have empty string element")));
        }
        self.pos += 1;
        self.literal_search = true;
        Ok(())
    }

    /// Turn a scanned name into an element, consuming any pending kind
    /// filter. The `*` wildcard and nameless, generic-less scans produce
    /// nothing.
    fn create_element(
        &mut self,
        name: String,
        generics: Vec<RawElem>,
        in_generics: bool,
    ) -> Result<Option<RawElem>, ParseError> {
        if name.is_empty() && generics.is_empty() {
            return Ok(None);
        }
        if self.literal_search && self.total_elems - self.generics_elems > 0 {
            return Err(perr!(Plain(
                "You cannot have more than one element if you use quotes"
            )));
        }
        let segments: Vec<String> = name.split("::").map(str::to_owned).collect();
        if segments.len() > 1 {
            for (i, segment) in segments.iter().enumerate() {
                if segment.is_empty() {
                    if i == 0 {
                        return Err(perr!(Plain("Paths cannot start with "), Code("::")));
                    }
                    if i + 1 == segments.len() {
                        return Err(perr!(Plain("Paths cannot end with "), Code("::")));
                    }
                    return Err(perr!(Plain("Unexpected "), Code("::::")));
                }
            }
        }
        if segments.is_empty() || (segments.len() == 1 && segments[0].is_empty()) {
            return Err(perr!(Plain("Found generics without a path")));
        }
        self.total_elems += 1;
        if in_generics {
            self.generics_elems += 1;
        }
        let path_last = segments[segments.len() - 1].clone();
        let path_without_last = segments[..segments.len() - 1].to_vec();
        Ok(Some(RawElem {
            name,
            full_path: segments,
            path_without_last,
            path_last,
            generics,
            filter: self.type_filter.take(),
        }))
    }

    /// Parse one element (quoted, or a path with optional generics) into
    /// `elems`.
    fn next_elem(&mut self, elems: &mut Vec<RawElem>, in_generics: bool) -> Result<(), ParseError> {
        // The `*` wildcard stands for "any type here" and is recorded
        // nowhere: matching treats an absent element the same way.
        if self.peek() == Some('*') {
            self.pos += 1;
            return Ok(());
        }
        let mut generics = Vec::new();
        let mut start = self.pos;
        let end;
        if self.peek() == Some('"') {
            start += 1;
            self.string_elem(in_generics)?;
            end = self.pos - 1;
        } else {
            end = self.ident_end()?;
        }
        if self.peek() == Some('<') {
            if in_generics {
                return Err(perr!(
                    Plain("Unexpected "),
                    Code("<"),
                    Plain(" after "),
                    Code("<"),
                ));
            }
            if start >= end {
                return Err(perr!(Plain("Found generics without a path")));
            }
            self.pos += 1;
            self.items_before(&mut generics, Some('>'))?;
        }
        if start >= end && generics.is_empty() {
            return Ok(());
        }
        let name: String = self.chars[start..end].iter().collect();
        if let Some(elem) = self.create_element(name, generics, in_generics)? {
            elems.push(elem);
        }
        Ok(())
    }

    /// Pop the just-parsed element off `elems` and stash its name as the
    /// pending kind filter. `start` is where that element began, for
    /// complaining about non-identifier characters inside the filter.
    fn take_type_filter(
        &mut self,
        elems: &mut Vec<RawElem>,
        start: usize,
    ) -> Result<(), ParseError> {
        if self.type_filter.is_some() {
            return Err(perr!(Plain("Unexpected "), Code(":")));
        }
        if elems.is_empty() {
            return Err(perr!(Plain("Expected type filter before "), Code(":")));
        }
        if self.literal_search {
            return Err(perr!(Plain("You cannot use quotes on type filter")));
        }
        for pos in start..self.pos {
            let c = self.chars[pos];
            if !is_ident_char(c) && !is_separator_whitespace(c) {
                return Err(perr!(
                    Plain("Unexpected "),
                    Code(c),
                    Plain(" in type filter"),
                ));
            }
        }
        let Some(filter_elem) = elems.pop() else {
            return Err(perr!(Plain("Expected type filter before "), Code(":")));
        };
        self.type_filter = Some(filter_elem.name);
        self.pos += 1;
        self.total_elems -= 1;
        Ok(())
    }

    /// Parse a separated element list up to `end_char` (`Some('>')` for a
    /// generics list, `None` for the terminal returned list).
    fn items_before(
        &mut self,
        elems: &mut Vec<RawElem>,
        end_char: Option<char>,
    ) -> Result<(), ParseError> {
        let mut found_stop = true;
        let mut start = self.pos;
        // A filter before the list does not apply inside it.
        let outer_filter = self.type_filter.take();
        while let Some(c) = self.peek() {
            if Some(c) == end_char {
                break;
            }
            if is_separator(c) {
                self.pos += 1;
                found_stop = true;
                continue;
            }
            if c == ':' && self.at_path_start() {
                return Err(perr!(
                    Plain("Unexpected "),
                    Code("::"),
                    Plain(": paths cannot start with "),
                    Code("::"),
                ));
            }
            if c == ':' {
                self.take_type_filter(elems, start)?;
                found_stop = true;
                continue;
            }
            if is_end_char(c) {
                let after = match end_char {
                    Some('>') => "<".to_owned(),
                    Some(other) => other.to_string(),
                    None => "->".to_owned(),
                };
                return Err(perr!(
                    Plain("Unexpected "),
                    Code(c),
                    Plain(" after "),
                    Code(after),
                ));
            }
            if !found_stop {
                return Err(match end_char {
                    Some(end) => perr!(
                        Plain("Expected "),
                        Code(","),
                        Plain(", "),
                        Code(" "),
                        Plain(" or "),
                        Code(end),
                        Plain(", found "),
                        Code(c),
                    ),
                    None => perr!(
                        Plain("Expected "),
                        Code(","),
                        Plain(" or "),
                        Code(" "),
                        Plain(", found "),
                        Code(c),
                    ),
                });
            }
            let pos_before = self.pos;
            start = self.pos;
            self.next_elem(elems, end_char == Some('>'))?;
            if end_char.is_some() && self.pos >= self.chars.len() {
                return Err(perr!(Plain("Unclosed "), Code("<")));
            }
            if pos_before == self.pos {
                self.pos += 1;
            }
            found_stop = false;
        }
        if self.pos >= self.chars.len() && end_char.is_some() {
            return Err(perr!(Plain("Unclosed "), Code("<")));
        }
        // Move past the end character.
        self.pos += 1;
        self.type_filter = outer_filter;
        Ok(())
    }

    /// The top level: subject elements, then an optional `->` returned list.
    fn parse_input(
        &mut self,
        elems: &mut Vec<RawElem>,
        returned: &mut Vec<RawElem>,
    ) -> Result<(), ParseError> {
        let mut found_stop = true;
        let mut start = self.pos;
        while let Some(c) = self.peek() {
            if is_stop_char(c) {
                found_stop = true;
                if is_separator(c) {
                    self.pos += 1;
                    continue;
                }
                if c == '-' || c == '>' {
                    if self.at_return_arrow() {
                        break;
                    }
                    return Err(perr!(
                        Plain("Unexpected "),
                        Code(c),
                        Plain(" (did you mean "),
                        Code("->"),
                        Plain("?)"),
                    ));
                }
                return Err(perr!(Plain("Unexpected "), Code(c)));
            }
            if c == ':' && !self.at_path_start() {
                self.take_type_filter(elems, start)?;
                found_stop = true;
                continue;
            }
            if !found_stop {
                return Err(if self.type_filter.is_some() {
                    perr!(
                        Plain("Expected "),
                        Code(","),
                        Plain(", "),
                        Code(" "),
                        Plain(" or "),
                        Code("->"),
                        Plain(", found "),
                        Code(c),
                    )
                } else {
                    perr!(
                        Plain("Expected "),
                        Code(","),
                        Plain(", "),
                        Code(" "),
                        Plain(", "),
                        Code(":"),
                        Plain(" or "),
                        Code("->"),
                        Plain(", found "),
                        Code(c),
                    )
                });
            }
            let before = elems.len();
            start = self.pos;
            self.next_elem(elems, false)?;
            if elems.len() == before {
                self.pos += 1;
            }
            found_stop = false;
        }
        if self.type_filter.is_some() {
            return Err(perr!(
                Plain("Unexpected "),
                Code(":"),
                Plain(" (expected path after type filter)"),
            ));
        }
        while self.pos < self.chars.len() {
            if self.at_return_arrow() {
                self.pos += 2;
                self.items_before(returned, None)?;
                if returned.is_empty() {
                    return Err(perr!(
                        Plain("Expected at least one item after "),
                        Code("->"),
                    ));
                }
                break;
            }
            self.pos += 1;
        }
        Ok(())
    }
}

/// Resolve one raw element's kind filter and recurse into its generics.
fn resolve_filters(raw: RawElem) -> Result<QueryElement, ParseError> {
    let type_filter = match raw.filter {
        None => None,
        Some(name) => Some(ItemKind::from_filter_name(&name).ok_or_else(
            || perr!(Plain("Unknown type filter "), Code(name.clone())),
        )?),
    };
    let generics = raw
        .generics
        .into_iter()
        .map(resolve_filters)
        .collect::<Result<_, _>>()?;
    Ok(QueryElement {
        name: raw.name,
        full_path: raw.full_path,
        path_without_last: raw.path_without_last,
        path_last: raw.path_last,
        generics,
        type_filter,
    })
}

fn resolve_all(raw: Vec<RawElem>, error: &mut Option<ParseError>) -> Vec<QueryElement> {
    raw.into_iter()
        .filter_map(|elem| match resolve_filters(elem) {
            Ok(elem) => Some(elem),
            Err(e) => {
                error.get_or_insert(e);
                None
            }
        })
        .collect()
}

/// Parse a raw query string. Never fails: malformed input yields a query
/// with best-effort partial elements and an attached [`ParseError`].
pub fn parse_query(input: &str) -> ParsedQuery {
    let original = input.trim().to_owned();
    let user_query = original.to_lowercase();
    let chars: Vec<char> = user_query.chars().collect();
    let mut parser = Parser {
        chars: &chars,
        pos: 0,
        total_elems: 0,
        generics_elems: 0,
        type_filter: None,
        literal_search: false,
    };
    let mut raw_elems = Vec::new();
    let mut raw_returned = Vec::new();
    let mut error = parser.parse_input(&mut raw_elems, &mut raw_returned).err();
    let elems = resolve_all(raw_elems, &mut error);
    let returned = resolve_all(raw_returned, &mut error);
    let mut literal_search = parser.literal_search;
    if error.is_none() && !literal_search {
        literal_search = parser.total_elems > 1;
    }
    let found_elems = elems.len() + returned.len();
    ParsedQuery {
        original,
        user_query,
        elems,
        returned,
        found_elems,
        literal_search,
        error,
    }
}
