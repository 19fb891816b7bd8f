//! Specification parser
//!
//! Parses the nested key/value specification syntax into the object type
//! tree. Leaf values are either type hints (`"int | 8080"`) or literals whose
//! type is inferred. A `#@envvar NAME` comment binds the leaf that follows it
//! to an environment variable.

use std::path::Path;

use tracing::{debug, trace};

use crate::error::{SchemaError, SchemaErrorKind, TscfgError, TscfgResult};
use crate::models::{
    Branch, DurationUnit, EnvBinding, Entry, Leaf, LeafType, ListElement, Node, ParsedSpec,
};

const ENVVAR_PRAGMA: &str = "envvar";

/// 1-based source position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Loc {
    line: usize,
    column: usize,
}

#[derive(Debug)]
struct PendingPragma {
    name: String,
    loc: Loc,
}

/// Parse specification text.
///
/// `file` is only used for error reporting.
pub fn parse_spec(source: &str, file: &Path) -> Result<ParsedSpec, SchemaError> {
    let mut parser = Parser::new(source, file);
    let root = parser.parse_document()?;
    let env_bindings = collect_env_bindings(&root);
    debug!(
        file = %file.display(),
        entries = root.len(),
        bindings = env_bindings.len(),
        "parsed specification"
    );
    Ok(ParsedSpec { root, env_bindings })
}

/// Read and parse a specification file
pub fn parse_file(path: &Path) -> TscfgResult<ParsedSpec> {
    let source = std::fs::read_to_string(path).map_err(|e| TscfgError::io(path, e))?;
    Ok(parse_spec(&source, path)?)
}

/// Environment bindings of a tree, in declaration order
pub fn collect_env_bindings(root: &Branch) -> Vec<EnvBinding> {
    fn walk(branch: &Branch, prefix: &str, out: &mut Vec<EnvBinding>) {
        for entry in branch.entries() {
            let path = if prefix.is_empty() {
                entry.key.clone()
            } else {
                format!("{}.{}", prefix, entry.key)
            };
            match &entry.node {
                Node::Leaf(leaf) => {
                    if let Some(name) = &leaf.env_var {
                        out.push(EnvBinding {
                            path,
                            name: name.clone(),
                        });
                    }
                }
                Node::Branch(child) => walk(child, &path, out),
            }
        }
    }

    let mut out = Vec::new();
    walk(root, "", &mut out);
    out
}

/// Resolve a type token such as `int`, `duration:s` or `string?`.
///
/// Returns the type and whether the token carried the `?` optional marker.
pub fn parse_type_token(token: &str) -> Option<(LeafType, bool)> {
    let (base, optional) = match token.strip_suffix('?') {
        Some(base) => (base, true),
        None => (token, false),
    };
    let (name, qualifier) = match base.split_once(':') {
        Some((name, qualifier)) => (name, Some(qualifier)),
        None => (base, None),
    };

    let ty = match (name, qualifier) {
        ("string", None) => LeafType::String,
        ("int" | "integer", None) => LeafType::Integer,
        ("long" | "number", None) => LeafType::Long,
        ("boolean" | "bool", None) => LeafType::Boolean,
        ("any", None) => LeafType::Any,
        ("duration", None) => LeafType::Duration { unit: None },
        ("duration", Some(unit)) => LeafType::Duration {
            unit: Some(DurationUnit::parse(unit)?),
        },
        _ => return None,
    };
    Some((ty, optional))
}

/// True for literals like `10s`, `250 ms` or `3 hours`
pub fn is_duration_literal(s: &str) -> bool {
    let s = s.trim();
    let digits = s.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return false;
    }
    let unit = s[digits..].trim_start();
    !unit.is_empty() && DurationUnit::parse(unit).is_some()
}

/// Type of an unquoted literal
fn infer_literal(literal: &str) -> Leaf {
    match literal {
        "true" | "false" => return Leaf::with_default(LeafType::Boolean, literal),
        "null" => {
            let mut leaf = Leaf::required(LeafType::Any);
            leaf.optional = true;
            return leaf;
        }
        _ => {}
    }
    if literal.parse::<i32>().is_ok() {
        Leaf::with_default(LeafType::Integer, literal)
    } else if literal.parse::<i64>().is_ok() {
        Leaf::with_default(LeafType::Long, literal)
    } else if is_duration_literal(literal) {
        Leaf::with_default(LeafType::Duration { unit: None }, literal)
    } else {
        Leaf::with_default(LeafType::String, literal)
    }
}

/// Identifier-like word that can only be meant as a type hint
fn looks_like_type_token(s: &str) -> bool {
    let s = s.strip_suffix('?').unwrap_or(s);
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// Interpret the content of a quoted value
fn interpret_quoted(content: &str) -> Result<Leaf, SchemaErrorKind> {
    let (head, default) = match content.split_once('|') {
        Some((head, default)) => (head.trim(), Some(default.trim())),
        None => (content.trim(), None),
    };

    if let Some((ty, optional_mark)) = parse_type_token(head) {
        let default = match default {
            Some("") if ty != LeafType::String => None,
            other => other.map(str::to_string),
        };
        let optional = optional_mark || default.is_some();
        return Ok(Leaf {
            ty,
            default,
            optional,
            env_var: None,
        });
    }

    // `"strng | x"` and `"strng?"` are misspelled hints, plain words are literals
    if looks_like_type_token(head) && (default.is_some() || head.ends_with('?')) {
        return Err(SchemaErrorKind::UnknownType(head.to_string()));
    }

    let ty = if is_duration_literal(content) {
        LeafType::Duration { unit: None }
    } else {
        LeafType::String
    };
    Ok(Leaf::with_default(ty, content))
}

/// Deepest nesting of objects, lists and dotted key segments
pub const MAX_DEPTH: usize = 128;

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    file: &'a Path,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &str, file: &'a Path) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            file,
            depth: 0,
        }
    }

    /// Enter `levels` of nesting opened at `loc`
    fn descend(&mut self, levels: usize, loc: Loc) -> Result<(), SchemaError> {
        self.depth += levels;
        if self.depth > MAX_DEPTH {
            return Err(self.error(SchemaErrorKind::NestingTooDeep(MAX_DEPTH), loc));
        }
        Ok(())
    }

    fn ascend(&mut self, levels: usize) {
        self.depth = self.depth.saturating_sub(levels);
    }

    fn loc(&self) -> Loc {
        Loc {
            line: self.line,
            column: self.column,
        }
    }

    fn error(&self, kind: SchemaErrorKind, loc: Loc) -> SchemaError {
        SchemaError {
            kind,
            file: self.file.to_path_buf(),
            line: loc.line,
            column: loc.column,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn at_comment(&self) -> bool {
        match self.peek() {
            Some('#') => true,
            Some('/') => self.peek_at(1) == Some('/'),
            _ => false,
        }
    }

    fn skip_inline_ws(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\r' | '\u{feff}')) {
            self.bump();
        }
    }

    /// Consume a comment up to (not including) the newline, returning its text
    fn read_comment(&mut self) -> String {
        if self.peek() == Some('#') {
            self.bump();
        } else {
            self.bump();
            self.bump();
        }
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.bump();
        }
        text.trim_end().to_string()
    }

    /// Skip whitespace, newlines and comments where no entry can follow.
    ///
    /// Any `#@envvar` found here has no leaf to bind.
    fn skip_trivia(&mut self) -> Result<(), SchemaError> {
        loop {
            self.skip_inline_ws();
            if self.peek() == Some('\n') {
                self.bump();
            } else if self.at_comment() {
                let loc = self.loc();
                let text = self.read_comment();
                if let Some(name) = envvar_name(&text) {
                    return Err(self.error(SchemaErrorKind::MisplacedPragma(name), loc));
                }
            } else {
                return Ok(());
            }
        }
    }

    fn parse_document(&mut self) -> Result<Branch, SchemaError> {
        if !self.document_is_braced() {
            return self.parse_members(None, false);
        }

        self.skip_trivia()?;
        let open = self.loc();
        self.bump();
        let root = self.parse_members(Some(open), false)?;
        self.skip_trivia()?;
        if let Some(c) = self.peek() {
            let loc = self.loc();
            return Err(self.error(
                SchemaErrorKind::UnexpectedToken(format!("'{}' after closing brace", c)),
                loc,
            ));
        }
        Ok(root)
    }

    /// Whether the first significant character is `{`
    fn document_is_braced(&self) -> bool {
        let mut i = self.pos;
        while let Some(&c) = self.chars.get(i) {
            let comment = c == '#' || (c == '/' && self.chars.get(i + 1) == Some(&'/'));
            if comment {
                while self.chars.get(i).is_some_and(|&c| c != '\n') {
                    i += 1;
                }
            } else if matches!(c, ' ' | '\t' | '\r' | '\n' | '\u{feff}') {
                i += 1;
            } else {
                return c == '{';
            }
        }
        false
    }

    /// Parse entries until the closing brace (or EOF for the root).
    ///
    /// `open` is the position of the opening brace, if any.
    fn parse_members(&mut self, open: Option<Loc>, in_list: bool) -> Result<Branch, SchemaError> {
        let mut branch = Branch::new();
        let mut doc: Vec<String> = Vec::new();
        let mut pragma: Option<PendingPragma> = None;
        let mut newlines = 0usize;

        loop {
            self.skip_inline_ws();
            match self.peek() {
                None => {
                    if let Some(p) = pragma.take() {
                        return Err(self.error(SchemaErrorKind::MisplacedPragma(p.name), p.loc));
                    }
                    return match open {
                        Some(loc) => Err(self.error(SchemaErrorKind::UnterminatedBlock, loc)),
                        None => Ok(branch),
                    };
                }
                Some('\n') => {
                    self.bump();
                    newlines += 1;
                    if newlines >= 2 {
                        doc.clear();
                        if let Some(p) = pragma.take() {
                            return Err(
                                self.error(SchemaErrorKind::MisplacedPragma(p.name), p.loc)
                            );
                        }
                    }
                }
                Some('}') => {
                    let loc = self.loc();
                    if let Some(p) = pragma.take() {
                        return Err(self.error(SchemaErrorKind::MisplacedPragma(p.name), p.loc));
                    }
                    if open.is_none() {
                        return Err(self.error(
                            SchemaErrorKind::UnexpectedToken("'}' without matching '{'".to_string()),
                            loc,
                        ));
                    }
                    self.bump();
                    return Ok(branch);
                }
                Some(',') => {
                    self.bump();
                    newlines = 0;
                }
                Some(_) if self.at_comment() => {
                    let loc = self.loc();
                    let text = self.read_comment();
                    newlines = 0;
                    if let Some(rest) = text.strip_prefix('@') {
                        self.handle_pragma(rest, loc, in_list, &mut pragma)?;
                    } else {
                        doc.push(text.strip_prefix(' ').unwrap_or(&text).to_string());
                    }
                }
                Some(_) => {
                    let entry = self.parse_entry(std::mem::take(&mut doc), pragma.take(), in_list)?;
                    branch.insert(entry);
                    newlines = 0;
                    self.expect_entry_end()?;
                }
            }
        }
    }

    fn handle_pragma(
        &mut self,
        text: &str,
        loc: Loc,
        in_list: bool,
        pending: &mut Option<PendingPragma>,
    ) -> Result<(), SchemaError> {
        let mut words = text.split_whitespace();
        if words.next() != Some(ENVVAR_PRAGMA) {
            trace!(line = loc.line, pragma = text, "ignoring unknown pragma");
            return Ok(());
        }

        let name = match (words.next(), words.next()) {
            (Some(name), None) if is_env_name(name) => name.to_string(),
            _ => {
                return Err(self.error(SchemaErrorKind::InvalidPragma(format!("#@{}", text)), loc))
            }
        };
        if in_list {
            return Err(self.error(
                SchemaErrorKind::InvalidPragma(format!("#@{} inside a list element", text)),
                loc,
            ));
        }
        if let Some(previous) = pending.take() {
            return Err(self.error(
                SchemaErrorKind::MisplacedPragma(previous.name),
                previous.loc,
            ));
        }
        *pending = Some(PendingPragma { name, loc });
        Ok(())
    }

    /// After a value only a separator, newline, comment or closing brace may follow
    fn expect_entry_end(&mut self) -> Result<(), SchemaError> {
        self.skip_inline_ws();
        match self.peek() {
            None | Some('\n' | ',' | '}') => Ok(()),
            Some(_) if self.at_comment() => {
                // trailing comments are not documentation for the next entry
                self.read_comment();
                Ok(())
            }
            Some(c) => {
                let loc = self.loc();
                Err(self.error(
                    SchemaErrorKind::UnexpectedToken(format!("'{}' after value", c)),
                    loc,
                ))
            }
        }
    }

    fn parse_entry(
        &mut self,
        doc: Vec<String>,
        pragma: Option<PendingPragma>,
        in_list: bool,
    ) -> Result<Entry, SchemaError> {
        let key_loc = self.loc();
        let path = self.parse_key_path()?;
        let extra = path.len().saturating_sub(1);
        self.descend(extra, key_loc)?;
        self.skip_inline_ws();

        match self.peek() {
            Some(':' | '=') => {
                self.bump();
                self.skip_inline_ws();
            }
            Some('{') => {}
            Some(c) => {
                let loc = self.loc();
                let what = if c == '\n' {
                    format!("end of line after key '{}'", path.join("."))
                } else {
                    format!("'{}' after key '{}'", c, path.join("."))
                };
                return Err(self.error(SchemaErrorKind::UnexpectedToken(what), loc));
            }
            None => {
                let loc = self.loc();
                return Err(self.error(
                    SchemaErrorKind::UnexpectedToken(format!(
                        "end of input after key '{}'",
                        path.join(".")
                    )),
                    loc,
                ));
            }
        }

        let mut node = self.parse_value(in_list)?;
        self.ascend(extra);

        if let Some(p) = pragma {
            match &mut node {
                Node::Leaf(leaf) => leaf.env_var = Some(p.name),
                Node::Branch(_) => {
                    return Err(self.error(SchemaErrorKind::MisplacedPragma(p.name), p.loc));
                }
            }
        }

        // `a.b.c = v` nests the value under intermediate branches
        let mut keys = path.into_iter().rev();
        let mut entry = Entry {
            key: keys.next().unwrap_or_default(),
            doc,
            node,
        };
        for key in keys {
            let mut parent = Branch::new();
            parent.insert(entry);
            entry = Entry {
                key,
                doc: Vec::new(),
                node: Node::Branch(parent),
            };
        }
        Ok(entry)
    }

    fn parse_key_path(&mut self) -> Result<Vec<String>, SchemaError> {
        let mut segments = Vec::new();
        loop {
            let loc = self.loc();
            let segment = match self.peek() {
                Some('"') => self.parse_quoted()?,
                _ => {
                    let mut key = String::new();
                    while let Some(c) = self.peek() {
                        if c.is_alphanumeric() || c == '_' || c == '-' {
                            key.push(c);
                            self.bump();
                        } else {
                            break;
                        }
                    }
                    key
                }
            };
            if segment.is_empty() {
                let what = match self.peek() {
                    Some(c) => format!("'{}', expected a key", c),
                    None => "end of input, expected a key".to_string(),
                };
                return Err(self.error(SchemaErrorKind::UnexpectedToken(what), loc));
            }
            segments.push(segment);

            if self.peek() == Some('.') {
                self.bump();
            } else {
                return Ok(segments);
            }
        }
    }

    fn parse_value(&mut self, in_list: bool) -> Result<Node, SchemaError> {
        let loc = self.loc();
        match self.peek() {
            Some('{') => {
                self.bump();
                self.descend(1, loc)?;
                let branch = self.parse_members(Some(loc), in_list)?;
                self.ascend(1);
                Ok(Node::Branch(branch))
            }
            Some('[') => {
                let ty = self.parse_list()?;
                Ok(Node::Leaf(Leaf::required(ty)))
            }
            Some('"') => {
                let content = self.parse_quoted()?;
                let leaf = interpret_quoted(&content).map_err(|kind| self.error(kind, loc))?;
                Ok(Node::Leaf(leaf))
            }
            _ => {
                let literal = self.read_unquoted();
                if literal.is_empty() {
                    return Err(self.error(
                        SchemaErrorKind::UnexpectedToken("missing value".to_string()),
                        loc,
                    ));
                }
                Ok(Node::Leaf(infer_literal(&literal)))
            }
        }
    }

    fn parse_list(&mut self) -> Result<LeafType, SchemaError> {
        let open = self.loc();
        self.bump();
        self.descend(1, open)?;

        let mut elements = Vec::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                None => return Err(self.error(SchemaErrorKind::UnterminatedBlock, open)),
                Some(']') => {
                    self.bump();
                    break;
                }
                Some(',') => {
                    self.bump();
                }
                Some(_) => elements.push(self.parse_list_element()?),
            }
        }
        self.ascend(1);

        match elements.len() {
            1 => Ok(LeafType::List {
                element: Box::new(elements.remove(0)),
            }),
            0 => Err(self.error(
                SchemaErrorKind::InvalidList("empty list, expected one element type".to_string()),
                open,
            )),
            n => Err(self.error(
                SchemaErrorKind::InvalidList(format!(
                    "{} elements, expected exactly one element type",
                    n
                )),
                open,
            )),
        }
    }

    fn parse_list_element(&mut self) -> Result<ListElement, SchemaError> {
        let loc = self.loc();
        match self.peek() {
            Some('{') => {
                self.bump();
                self.descend(1, loc)?;
                let object = self.parse_members(Some(loc), true)?;
                self.ascend(1);
                Ok(ListElement::Object(object))
            }
            Some('[') => Ok(ListElement::Scalar(self.parse_list()?)),
            Some('"') => {
                let content = self.parse_quoted()?;
                let leaf = interpret_quoted(&content).map_err(|kind| self.error(kind, loc))?;
                if leaf.default.is_some() {
                    debug!(line = loc.line, "ignoring default on list element type");
                }
                Ok(ListElement::Scalar(leaf.ty))
            }
            _ => {
                let literal = self.read_unquoted();
                if literal.is_empty() {
                    let c = self.peek().unwrap_or(' ');
                    return Err(self.error(
                        SchemaErrorKind::UnexpectedToken(format!("'{}' in list", c)),
                        loc,
                    ));
                }
                Ok(ListElement::Scalar(infer_literal(&literal).ty))
            }
        }
    }

    fn parse_quoted(&mut self) -> Result<String, SchemaError> {
        let open = self.loc();
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(self.error(SchemaErrorKind::UnterminatedString, open));
                }
                Some('"') => return Ok(out),
                Some('\\') => {
                    let esc = self.bump();
                    match esc {
                        Some('"') => out.push('"'),
                        Some('\\') => out.push('\\'),
                        Some('/') => out.push('/'),
                        Some('b') => out.push('\u{8}'),
                        Some('f') => out.push('\u{c}'),
                        Some('n') => out.push('\n'),
                        Some('r') => out.push('\r'),
                        Some('t') => out.push('\t'),
                        Some('u') => {
                            let hex: String = (0..4).filter_map(|_| self.bump()).collect();
                            match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                                Some(c) => out.push(c),
                                None => {
                                    return Err(self.error(
                                        SchemaErrorKind::UnexpectedToken(format!(
                                            "escape '\\u{}'",
                                            hex
                                        )),
                                        open,
                                    ))
                                }
                            }
                        }
                        Some(other) => {
                            return Err(self.error(
                                SchemaErrorKind::UnexpectedToken(format!("escape '\\{}'", other)),
                                open,
                            ))
                        }
                        None => return Err(self.error(SchemaErrorKind::UnterminatedString, open)),
                    }
                }
                Some(c) => out.push(c),
            }
        }
    }

    /// Unquoted literal up to a newline, separator, closing bracket or comment
    fn read_unquoted(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if matches!(c, '\n' | ',' | '}' | ']') || self.at_comment() {
                break;
            }
            out.push(c);
            self.bump();
        }
        out.trim_end().to_string()
    }
}

fn envvar_name(comment: &str) -> Option<String> {
    let rest = comment.strip_prefix('@')?;
    let mut words = rest.split_whitespace();
    if words.next() != Some(ENVVAR_PRAGMA) {
        return None;
    }
    Some(words.next().unwrap_or_default().to_string())
}

fn is_env_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
