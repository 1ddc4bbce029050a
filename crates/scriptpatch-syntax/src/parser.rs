//! Fragment parser for the build-script DSL subset
//!
//! This is not a general-purpose parser for the host language. It covers the
//! shapes structural editing and completion need to see: calls with argument
//! lists and trailing block arguments, named arguments, assignments, string
//! literals, imports, and opaque `val` declarations. Everything else in a
//! reference position (dotted paths, index access, chained calls) is folded
//! into reference text. The tree is lossless: every input byte lands in some
//! leaf, so `Document::full_text` reproduces the input exactly.
//!
//! Snippets are inserted by parsing them in isolation with
//! [`parse_expression_fragment`] or [`parse_declaration_fragment`] and
//! grafting the result into the target document, rather than by hand-building
//! nodes. A small parse per insertion is acceptable at human editing pace.

use crate::error::ParseError;
use crate::tree::{Document, NodeId, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokKind {
    Ident,
    Num,
    Str,
    Punct,
    Ws,
    Comment,
    Eof,
}

#[derive(Debug, Clone)]
struct Tok {
    kind: TokKind,
    text: String,
    start: usize,
}

fn lex(input: &str) -> Result<Vec<Tok>, ParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut toks = Vec::new();
    let mut i = 0;
    let mut offset = 0;
    while i < chars.len() {
        let start_offset = offset;
        let c = chars[i];
        if c.is_whitespace() {
            let mut text = String::new();
            while i < chars.len() && chars[i].is_whitespace() {
                text.push(chars[i]);
                i += 1;
            }
            offset += text.len();
            toks.push(Tok {
                kind: TokKind::Ws,
                text,
                start: start_offset,
            });
        } else if c == '/' && chars.get(i + 1) == Some(&'/') {
            let mut text = String::new();
            while i < chars.len() && chars[i] != '\n' {
                text.push(chars[i]);
                i += 1;
            }
            offset += text.len();
            toks.push(Tok {
                kind: TokKind::Comment,
                text,
                start: start_offset,
            });
        } else if c == '"' {
            let mut text = String::from('"');
            i += 1;
            loop {
                match chars.get(i) {
                    None => {
                        return Err(ParseError::UnterminatedString {
                            offset: start_offset,
                        })
                    }
                    Some('\\') => {
                        text.push('\\');
                        if let Some(&next) = chars.get(i + 1) {
                            text.push(next);
                        }
                        i += 2;
                    }
                    Some('"') => {
                        text.push('"');
                        i += 1;
                        break;
                    }
                    Some(&other) => {
                        text.push(other);
                        i += 1;
                    }
                }
            }
            offset += text.len();
            toks.push(Tok {
                kind: TokKind::Str,
                text,
                start: start_offset,
            });
        } else if c.is_alphabetic() || c == '_' {
            let mut text = String::new();
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                text.push(chars[i]);
                i += 1;
            }
            offset += text.len();
            toks.push(Tok {
                kind: TokKind::Ident,
                text,
                start: start_offset,
            });
        } else if c.is_ascii_digit() {
            let mut text = String::new();
            while i < chars.len() && chars[i].is_ascii_digit() {
                text.push(chars[i]);
                i += 1;
            }
            if chars.get(i) == Some(&'.') && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit()) {
                text.push('.');
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    text.push(chars[i]);
                    i += 1;
                }
            }
            offset += text.len();
            toks.push(Tok {
                kind: TokKind::Num,
                text,
                start: start_offset,
            });
        } else {
            let mut text = String::from(c);
            i += 1;
            if c == '=' && chars.get(i) == Some(&'=') {
                text.push('=');
                i += 1;
            }
            offset += text.len();
            toks.push(Tok {
                kind: TokKind::Punct,
                text,
                start: start_offset,
            });
        }
    }
    toks.push(Tok {
        kind: TokKind::Eof,
        text: String::new(),
        start: offset,
    });
    Ok(toks)
}

/// Parse a whole script document
pub fn parse(text: &str) -> Result<Document, ParseError> {
    let toks = lex(text)?;
    let mut parser = Parser {
        toks,
        pos: 0,
        doc: Document::with_root(NodeKind::Script),
    };
    let root = parser.doc.root();
    parser.parse_statements(root, false)?;
    Ok(parser.doc)
}

/// Parse a single expression in isolation; returns the fragment document and
/// the expression node inside it, ready for grafting
pub fn parse_expression_fragment(text: &str) -> Result<(Document, NodeId), ParseError> {
    fragment(text)
}

/// Parse a single top-level declaration (import, `val` declaration, or
/// expression statement) in isolation
pub fn parse_declaration_fragment(text: &str) -> Result<(Document, NodeId), ParseError> {
    fragment(text)
}

fn fragment(text: &str) -> Result<(Document, NodeId), ParseError> {
    let doc = parse(text)?;
    let node = doc
        .children(doc.root())
        .iter()
        .copied()
        .find(|&c| !doc.kind(c).is_trivia())
        .ok_or(ParseError::EmptyFragment)?;
    Ok((doc, node))
}

struct Parser {
    toks: Vec<Tok>,
    pos: usize,
    doc: Document,
}

impl Parser {
    fn tok(&self) -> &Tok {
        &self.toks[self.pos]
    }

    fn bump(&mut self) -> Tok {
        let tok = self.toks[self.pos].clone();
        if self.pos + 1 < self.toks.len() {
            self.pos += 1;
        }
        tok
    }

    fn is_punct(&self, text: &str) -> bool {
        self.tok().kind == TokKind::Punct && self.tok().text == text
    }

    fn punct_at(&self, index: usize, text: &str) -> bool {
        self.toks
            .get(index)
            .is_some_and(|t| t.kind == TokKind::Punct && t.text == text)
    }

    /// Index of the next non-trivia token at or after `pos`
    fn skip_ahead(&self) -> usize {
        let mut i = self.pos;
        while matches!(self.toks[i].kind, TokKind::Ws | TokKind::Comment) {
            i += 1;
        }
        i
    }

    fn newline_before(&self, upto: usize) -> bool {
        self.toks[self.pos..upto]
            .iter()
            .any(|t| t.kind == TokKind::Ws && t.text.contains('\n'))
    }

    fn take_trivia_into(&mut self, parent: NodeId) {
        loop {
            let kind = match self.tok().kind {
                TokKind::Ws => NodeKind::Whitespace,
                TokKind::Comment => NodeKind::Comment,
                _ => return,
            };
            let tok = self.bump();
            let leaf = self.doc.new_leaf(kind, tok.text);
            self.doc.attach(parent, leaf);
        }
    }

    fn leaf(&mut self, kind: NodeKind, parent: NodeId) {
        let tok = self.bump();
        let id = self.doc.new_leaf(kind, tok.text);
        self.doc.attach(parent, id);
    }

    fn parse_statements(&mut self, container: NodeId, inside_block: bool) -> Result<(), ParseError> {
        loop {
            self.take_trivia_into(container);
            let tok = self.tok().clone();
            match tok.kind {
                TokKind::Eof => return Ok(()),
                TokKind::Punct if tok.text == "}" => {
                    if inside_block {
                        return Ok(());
                    }
                    return Err(ParseError::UnexpectedToken {
                        found: tok.text,
                        offset: tok.start,
                    });
                }
                TokKind::Punct if tok.text == ";" => {
                    self.leaf(NodeKind::Token, container);
                }
                TokKind::Ident if tok.text == "import" => {
                    let import = self.parse_import()?;
                    self.doc.attach(container, import);
                }
                TokKind::Ident if tok.text == "val" => {
                    let property = self.parse_property();
                    self.doc.attach(container, property);
                }
                _ => {
                    let statement = self.parse_expression()?;
                    self.doc.attach(container, statement);
                }
            }
        }
    }

    fn parse_import(&mut self) -> Result<NodeId, ParseError> {
        let import = self.doc.new_node(NodeKind::Import);
        self.leaf(NodeKind::Token, import);
        if self.tok().kind == TokKind::Ws && !self.tok().text.contains('\n') {
            self.leaf(NodeKind::Whitespace, import);
        }
        let mut path = String::new();
        loop {
            let tok = self.tok();
            let extend = match tok.kind {
                TokKind::Ident => true,
                TokKind::Punct => tok.text == "." || tok.text == "*",
                _ => false,
            };
            if !extend {
                break;
            }
            path.push_str(&self.bump().text);
        }
        if path.is_empty() {
            let tok = self.tok();
            return Err(ParseError::UnexpectedToken {
                found: tok.text.clone(),
                offset: tok.start,
            });
        }
        let leaf = self.doc.new_leaf(NodeKind::Identifier, path);
        self.doc.attach(import, leaf);
        Ok(import)
    }

    /// `val` declarations are kept opaque: keyword, one space, rest of line.
    fn parse_property(&mut self) -> NodeId {
        let property = self.doc.new_node(NodeKind::Property);
        self.leaf(NodeKind::Token, property);
        if self.tok().kind == TokKind::Ws && !self.tok().text.contains('\n') {
            self.leaf(NodeKind::Whitespace, property);
        }
        let mut raw = String::new();
        loop {
            let tok = self.tok();
            match tok.kind {
                TokKind::Eof => break,
                TokKind::Ws if tok.text.contains('\n') => break,
                TokKind::Punct if tok.text == "}" => break,
                _ => raw.push_str(&self.bump().text),
            }
        }
        let leaf = self.doc.new_leaf(NodeKind::Identifier, raw);
        self.doc.attach(property, leaf);
        property
    }

    fn parse_expression(&mut self) -> Result<NodeId, ParseError> {
        let lhs = self.parse_postfix()?;
        let ahead = self.skip_ahead();
        if self.punct_at(ahead, "=") && !self.newline_before(ahead) {
            let assignment = self.doc.new_node(NodeKind::Assignment);
            self.doc.attach(assignment, lhs);
            self.take_trivia_into(assignment);
            self.leaf(NodeKind::Token, assignment);
            self.take_trivia_into(assignment);
            let rhs = self.parse_postfix()?;
            self.doc.attach(assignment, rhs);
            return Ok(assignment);
        }
        Ok(lhs)
    }

    fn parse_postfix(&mut self) -> Result<NodeId, ParseError> {
        let tok = self.tok().clone();
        let mut pending = match tok.kind {
            TokKind::Str => {
                let tok = self.bump();
                return Ok(self.doc.new_leaf(NodeKind::StringLiteral, tok.text));
            }
            TokKind::Ident | TokKind::Num => self.bump().text,
            _ => {
                return Err(ParseError::UnexpectedToken {
                    found: tok.text,
                    offset: tok.start,
                })
            }
        };
        let mut built: Option<NodeId> = None;
        loop {
            if self.is_punct(".")
                && matches!(
                    self.toks.get(self.pos + 1).map(|t| t.kind),
                    Some(TokKind::Ident) | Some(TokKind::Num)
                )
            {
                self.bump();
                pending.push('.');
                pending.push_str(&self.bump().text);
                continue;
            }
            if self.is_punct("[") {
                let raw = self.consume_balanced('[', ']')?;
                pending.push_str(&raw);
                continue;
            }
            if self.is_punct("(") {
                let name = self.make_name(built.take(), &mut pending);
                let call = self.doc.new_node(NodeKind::Call);
                self.doc.attach(call, name);
                let args = self.parse_argument_list()?;
                self.doc.attach(call, args);
                built = Some(call);
                continue;
            }
            // trailing block argument, only when the brace is on the same line
            let ahead = self.skip_ahead();
            if self.punct_at(ahead, "{") && !self.newline_before(ahead) {
                let call = match built.take() {
                    Some(existing)
                        if pending.is_empty()
                            && self.doc.child_of_kind(existing, NodeKind::Block).is_none() =>
                    {
                        existing
                    }
                    other => {
                        let name = self.make_name(other, &mut pending);
                        let call = self.doc.new_node(NodeKind::Call);
                        self.doc.attach(call, name);
                        call
                    }
                };
                self.take_trivia_into(call);
                let block = self.parse_block()?;
                self.doc.attach(call, block);
                built = Some(call);
                continue;
            }
            break;
        }
        match built {
            Some(call) if pending.is_empty() => Ok(call),
            Some(call) => {
                let name = self.doc.new_node(NodeKind::Name);
                self.doc.attach(name, call);
                let leaf = self.doc.new_leaf(NodeKind::Identifier, pending);
                self.doc.attach(name, leaf);
                Ok(name)
            }
            None => {
                let name = self.doc.new_node(NodeKind::Name);
                let leaf = self.doc.new_leaf(NodeKind::Identifier, pending);
                self.doc.attach(name, leaf);
                Ok(name)
            }
        }
    }

    fn make_name(&mut self, prefix: Option<NodeId>, pending: &mut String) -> NodeId {
        let name = self.doc.new_node(NodeKind::Name);
        if let Some(p) = prefix {
            self.doc.attach(name, p);
        }
        if !pending.is_empty() {
            let leaf = self
                .doc
                .new_leaf(NodeKind::Identifier, std::mem::take(pending));
            self.doc.attach(name, leaf);
        }
        name
    }

    /// Index access and similar bracketed trailers are folded into reference
    /// text verbatim; their inner structure is never queried.
    fn consume_balanced(&mut self, open: char, close: char) -> Result<String, ParseError> {
        let start = self.tok().start;
        let mut raw = String::new();
        let mut depth = 0usize;
        loop {
            let tok = self.tok().clone();
            match tok.kind {
                TokKind::Eof => {
                    return Err(ParseError::UnbalancedDelimiter {
                        expected: close,
                        offset: start,
                    })
                }
                TokKind::Punct if tok.text.chars().next() == Some(open) => depth += 1,
                TokKind::Punct if tok.text.chars().next() == Some(close) => depth -= 1,
                _ => {}
            }
            raw.push_str(&self.bump().text);
            if depth == 0 {
                return Ok(raw);
            }
        }
    }

    fn parse_argument_list(&mut self) -> Result<NodeId, ParseError> {
        let list = self.doc.new_node(NodeKind::ArgumentList);
        let start = self.tok().start;
        self.leaf(NodeKind::Token, list);
        loop {
            self.take_trivia_into(list);
            let tok = self.tok().clone();
            match tok.kind {
                TokKind::Eof => {
                    return Err(ParseError::UnbalancedDelimiter {
                        expected: ')',
                        offset: start,
                    })
                }
                TokKind::Punct if tok.text == ")" => {
                    self.leaf(NodeKind::Token, list);
                    return Ok(list);
                }
                TokKind::Punct if tok.text == "," => {
                    self.leaf(NodeKind::Token, list);
                }
                _ => {
                    let arg = self.parse_argument()?;
                    self.doc.attach(list, arg);
                }
            }
        }
    }

    fn parse_argument(&mut self) -> Result<NodeId, ParseError> {
        let argument = self.doc.new_node(NodeKind::Argument);
        let named = self.tok().kind == TokKind::Ident && {
            let mut i = self.pos + 1;
            while matches!(self.toks[i].kind, TokKind::Ws | TokKind::Comment) {
                i += 1;
            }
            self.punct_at(i, "=")
        };
        if named {
            let argument_name = self.doc.new_node(NodeKind::ArgumentName);
            let name = self.doc.new_node(NodeKind::Name);
            self.leaf(NodeKind::Identifier, name);
            self.doc.attach(argument_name, name);
            self.doc.attach(argument, argument_name);
            self.take_trivia_into(argument);
            self.leaf(NodeKind::Token, argument);
            self.take_trivia_into(argument);
            let value = self.parse_postfix()?;
            self.doc.attach(argument, value);
        } else {
            let value = self.parse_expression()?;
            self.doc.attach(argument, value);
        }
        Ok(argument)
    }

    fn parse_block(&mut self) -> Result<NodeId, ParseError> {
        let block = self.doc.new_node(NodeKind::Block);
        let start = self.tok().start;
        self.leaf(NodeKind::Token, block);
        self.parse_statements(block, true)?;
        if !self.is_punct("}") {
            return Err(ParseError::UnbalancedDelimiter {
                expected: '}',
                offset: start,
            });
        }
        self.leaf(NodeKind::Token, block);
        Ok(block)
    }
}
