//! Canonical text form of a graph.
//!
//! One entry per node, `ID: [EDGE, ...]`, where an edge is either a bare
//! target id (weight 1) or a `[TARGET, WEIGHT]` pair. Ids are bare tokens
//! or double-quoted strings; inside quotes `\"`, `\\`, `\n`, `\r` and `\t`
//! are escapes, and any id, including the empty one, can be written. An optional leading `@directed` / `@undirected`
//! directive sets the direction flag; `#` starts a comment. Entries may be
//! separated by commas and wrapped in braces, so JSON-shaped input such as
//! `{ "0": [["1", 5], "2"] }` parses as well.

use std::collections::HashMap;
use std::fmt::Write;

use indexmap::IndexMap;

use crate::{Edge, FormatError, FormatErrorKind, GraphModel, NodeId, DEFAULT_WEIGHT};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    LBrace,
    RBrace,
    Colon,
    Comma,
    Directive(String),
    Bare(String),
    Quoted(String),
}

impl Token {
    fn text(&self) -> String {
        match self {
            Token::Open => "[".into(),
            Token::Close => "]".into(),
            Token::LBrace => "{".into(),
            Token::RBrace => "}".into(),
            Token::Colon => ":".into(),
            Token::Comma => ",".into(),
            Token::Directive(d) => format!("@{d}"),
            Token::Bare(s) => s.clone(),
            Token::Quoted(s) => format!("\"{s}\""),
        }
    }
}

fn is_bare_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

fn tokenize(text: &str) -> Result<Vec<(Token, usize)>, FormatError> {
    let mut tokens = Vec::new();

    for (index, raw_line) in text.lines().enumerate() {
        let line = index + 1;
        let mut chars = raw_line.char_indices().peekable();

        while let Some((start, c)) = chars.next() {
            let token = match c {
                c if c.is_whitespace() => continue,
                '#' => break,
                '[' => Token::Open,
                ']' => Token::Close,
                '{' => Token::LBrace,
                '}' => Token::RBrace,
                ':' => Token::Colon,
                ',' => Token::Comma,
                '"' => {
                    let mut value = String::new();
                    let mut closed = false;
                    while let Some((_, c)) = chars.next() {
                        match c {
                            '"' => {
                                closed = true;
                                break;
                            }
                            '\\' => match chars.next() {
                                Some((_, 'n')) => value.push('\n'),
                                Some((_, 'r')) => value.push('\r'),
                                Some((_, 't')) => value.push('\t'),
                                Some((_, escaped)) => value.push(escaped),
                                None => break,
                            },
                            c => value.push(c),
                        }
                    }
                    if !closed {
                        return Err(FormatError::new(FormatErrorKind::UnexpectedEnd, &raw_line[start..], line));
                    }
                    Token::Quoted(value)
                }
                '@' => {
                    let mut end = start + 1;
                    while let Some(&(i, c)) = chars.peek() {
                        if !is_bare_char(c) {
                            break;
                        }
                        end = i + c.len_utf8();
                        chars.next();
                    }
                    Token::Directive(raw_line[start + 1..end].to_owned())
                }
                c if is_bare_char(c) => {
                    let mut end = start + c.len_utf8();
                    while let Some(&(i, c)) = chars.peek() {
                        if !is_bare_char(c) {
                            break;
                        }
                        end = i + c.len_utf8();
                        chars.next();
                    }
                    Token::Bare(raw_line[start..end].to_owned())
                }
                other => {
                    return Err(FormatError::new(FormatErrorKind::UnexpectedToken, other.to_string(), line));
                }
            };
            tokens.push((token, line));
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    last_line: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn next(&mut self) -> Result<(Token, usize), FormatError> {
        match self.tokens.get(self.pos) {
            Some((token, line)) => {
                self.pos += 1;
                Ok((token.clone(), *line))
            }
            None => Err(FormatError::new(FormatErrorKind::UnexpectedEnd, "", self.last_line)),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), FormatError> {
        let (token, line) = self.next()?;
        if token == expected {
            Ok(())
        } else {
            Err(FormatError::new(FormatErrorKind::UnexpectedToken, token.text(), line))
        }
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn id(&mut self) -> Result<(String, usize), FormatError> {
        match self.next()? {
            (Token::Bare(s), line) => Ok((s, line)),
            (Token::Quoted(s), line) => Ok((s, line)),
            (other, line) => Err(FormatError::new(FormatErrorKind::UnexpectedToken, other.text(), line)),
        }
    }

    fn weight(&mut self) -> Result<u32, FormatError> {
        match self.next()? {
            (Token::Bare(s), line) | (Token::Quoted(s), line) => s
                .parse::<u32>()
                .map_err(|_| FormatError::new(FormatErrorKind::InvalidWeight, s, line)),
            (other, line) => Err(FormatError::new(FormatErrorKind::InvalidWeight, other.text(), line)),
        }
    }

    /// `[` (EDGE (`,` EDGE)* `,`?)? `]`
    fn edges(&mut self) -> Result<Vec<(String, u32, usize)>, FormatError> {
        self.expect(Token::Open)?;
        let mut edges = Vec::new();

        loop {
            if self.eat(&Token::Close) {
                return Ok(edges);
            }
            if self.eat(&Token::Open) {
                let (target, line) = self.id()?;
                self.expect(Token::Comma)?;
                let weight = self.weight()?;
                self.expect(Token::Close)?;
                edges.push((target, weight, line));
            } else {
                let (target, line) = self.id()?;
                edges.push((target, DEFAULT_WEIGHT, line));
            }
            if !self.eat(&Token::Comma) {
                self.expect(Token::Close)?;
                return Ok(edges);
            }
        }
    }
}

/// Parse graph text into a validated model.
pub fn parse(text: &str) -> Result<GraphModel, FormatError> {
    let tokens = tokenize(text)?;
    let last_line = tokens.last().map_or(1, |(_, line)| *line);
    let mut parser = Parser {
        tokens,
        pos: 0,
        last_line,
    };

    let mut directed = true;
    if let Some(Token::Directive(directive)) = parser.peek().cloned() {
        let (_, line) = parser.next()?;
        directed = match directive.as_str() {
            "directed" => true,
            "undirected" => false,
            _ => {
                return Err(FormatError::new(
                    FormatErrorKind::UnexpectedToken,
                    format!("@{directive}"),
                    line,
                ))
            }
        };
    }

    let braced = parser.eat(&Token::LBrace);
    let mut adjacency: IndexMap<NodeId, Vec<Edge>> = IndexMap::new();
    let mut edge_lines: HashMap<(usize, usize), usize> = HashMap::new();

    loop {
        match parser.peek() {
            None if !braced => break,
            Some(Token::RBrace) if braced => {
                parser.next()?;
                break;
            }
            _ => {}
        }

        let (id, line) = parser.id()?;
        parser.expect(Token::Colon)?;
        let edges = parser.edges()?;

        let id = NodeId::from(id);
        if adjacency.contains_key(&id) {
            return Err(FormatError::new(FormatErrorKind::DuplicateNode, id.to_string(), line));
        }
        let node_index = adjacency.len();
        let edges = edges
            .into_iter()
            .enumerate()
            .map(|(edge_index, (target, weight, line))| {
                edge_lines.insert((node_index, edge_index), line);
                Edge {
                    target: target.into(),
                    weight,
                }
            })
            .collect();
        adjacency.insert(id, edges);

        parser.eat(&Token::Comma);
    }

    if parser.peek().is_some() {
        let (token, line) = parser.next()?;
        return Err(FormatError::new(FormatErrorKind::UnexpectedToken, token.text(), line));
    }

    if adjacency.is_empty() {
        return Err(FormatError::new(FormatErrorKind::EmptyGraph, "", last_line));
    }

    for (node_index, edges) in adjacency.values().enumerate() {
        for (edge_index, edge) in edges.iter().enumerate() {
            if !adjacency.contains_key(&edge.target) {
                let line = edge_lines.get(&(node_index, edge_index)).copied().unwrap_or(last_line);
                return Err(FormatError::new(
                    FormatErrorKind::UnknownTarget,
                    edge.target.to_string(),
                    line,
                ));
            }
        }
    }

    Ok(GraphModel::from_parts(directed, adjacency))
}

fn write_id(out: &mut String, id: &NodeId) {
    let raw = id.as_str();
    if !raw.is_empty() && raw.chars().all(is_bare_char) {
        out.push_str(raw);
    } else {
        out.push('"');
        // Quoted ids stay on one line.
        for c in raw.chars() {
            match c {
                '"' | '\\' => {
                    out.push('\\');
                    out.push(c);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c => out.push(c),
            }
        }
        out.push('"');
    }
}

/// Write the canonical text form of a graph.
pub fn serialize(graph: &GraphModel) -> String {
    let mut out = String::new();
    if !graph.is_directed() {
        out.push_str("@undirected\n");
    }

    for (id, edges) in graph.nodes() {
        write_id(&mut out, id);
        out.push_str(": [");
        for (i, edge) in edges.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if edge.weight == DEFAULT_WEIGHT {
                write_id(&mut out, &edge.target);
            } else {
                out.push('[');
                write_id(&mut out, &edge.target);
                let _ = write!(out, ", {}]", edge.weight);
            }
        }
        out.push_str("]\n");
    }

    out
}
