//! Minimal CSS selectors over [`Document`](super::html::Document).
//!
//! Supported grammar:
//!
//! ```text
//! selector  := chain ("," chain)*
//! chain     := compound (" " compound)*          descendant combinator only
//! compound  := tag? (".class" | "[attr]" | "[attr=v]" | "[attr*=v]" | ":not([...])")*
//! ```
//!
//! That is enough for the feed markup; anything else is a [`SelectorError`].

use super::html::ElementRef;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected `{found}` at offset {offset} in `{selector}`")]
    Unexpected {
        selector: String,
        offset: usize,
        found: char,
    },

    #[error("unterminated `{open}` in `{selector}`")]
    Unterminated { selector: String, open: char },

    #[error("unsupported pseudo-class `:{name}` in `{selector}`")]
    UnsupportedPseudo { selector: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Contains(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrCond {
    name: String,
    op: AttrOp,
}

impl AttrCond {
    fn matches(&self, el: &ElementRef<'_>) -> bool {
        match (el.attr(&self.name), &self.op) {
            (None, _) => false,
            (Some(_), AttrOp::Exists) => true,
            (Some(value), AttrOp::Equals(expected)) => value == expected,
            (Some(value), AttrOp::Contains(needle)) => value.contains(needle.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCond>,
    negated: Vec<AttrCond>,
}

impl Compound {
    fn matches(&self, el: &ElementRef<'_>) -> bool {
        self.tag.as_deref().is_none_or(|tag| el.name() == tag)
            && self.classes.iter().all(|c| el.has_class(c))
            && self.attrs.iter().all(|a| a.matches(el))
            && !self.negated.iter().any(|a| a.matches(el))
    }

    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && self.negated.is_empty()
    }
}

/// Compiled selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// Alternatives; each is a descendant chain, outermost first.
    chains: Vec<Vec<Compound>>,
}

impl Selector {
    pub fn parse(selector: &str) -> Result<Self, SelectorError> {
        let mut parser = Parser {
            source: selector,
            chars: selector.char_indices().collect(),
            pos: 0,
        };
        let chains = parser.parse_list()?;
        if chains.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Self { chains })
    }

    /// Whether `el` matches any alternative.
    pub fn matches(&self, el: &ElementRef<'_>) -> bool {
        self.chains.iter().any(|chain| chain_matches(chain, el))
    }
}

/// Right-to-left match: the last compound is the element itself, earlier ones
/// must match successive ancestors. Nearest-ancestor greedy matching is exact
/// for a descendant-only chain.
fn chain_matches(chain: &[Compound], el: &ElementRef<'_>) -> bool {
    let Some((last, ancestors)) = chain.split_last() else {
        return false;
    };
    if !last.matches(el) {
        return false;
    }

    let mut remaining = ancestors.iter().rev().peekable();
    let mut current = el.parent();
    while let Some(compound) = remaining.peek() {
        match current {
            Some(ancestor) => {
                if compound.matches(&ancestor) {
                    remaining.next();
                }
                current = ancestor.parent();
            }
            None => return false,
        }
    }
    true
}

// ============================================================================
// Parser
// ============================================================================

struct Parser<'a> {
    source: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map_or(self.source.len(), |&(offset, _)| offset)
    }

    fn unexpected(&self, found: char) -> SelectorError {
        SelectorError::Unexpected {
            selector: self.source.to_owned(),
            offset: self.offset(),
            found,
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn parse_list(&mut self) -> Result<Vec<Vec<Compound>>, SelectorError> {
        let mut chains = Vec::new();
        loop {
            self.skip_whitespace();
            let chain = self.parse_chain()?;
            if chain.is_empty() {
                return match self.peek() {
                    Some(c) => Err(self.unexpected(c)),
                    None if chains.is_empty() => Err(SelectorError::Empty),
                    None => Err(self.unexpected(',')),
                };
            }
            chains.push(chain);
            match self.bump() {
                Some(',') => continue,
                None => return Ok(chains),
                Some(c) => {
                    self.pos -= 1;
                    return Err(self.unexpected(c));
                }
            }
        }
    }

    fn parse_chain(&mut self) -> Result<Vec<Compound>, SelectorError> {
        let mut chain = Vec::new();
        loop {
            let compound = self.parse_compound()?;
            if compound.is_empty() {
                break;
            }
            chain.push(compound);
            self.skip_whitespace();
            if matches!(self.peek(), None | Some(',')) {
                break;
            }
        }
        Ok(chain)
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        if self.peek().is_some_and(is_ident_char) {
            compound.tag = Some(self.ident().to_ascii_lowercase());
        } else if self.peek() == Some('*') {
            self.bump();
        }

        loop {
            match self.peek() {
                Some('.') => {
                    self.bump();
                    let class = self.ident();
                    if class.is_empty() {
                        return Err(self.unexpected(self.peek().unwrap_or('.')));
                    }
                    compound.classes.push(class);
                }
                Some('[') => {
                    let cond = self.attr_cond()?;
                    compound.attrs.push(cond);
                }
                Some(':') => {
                    self.bump();
                    let name = self.ident();
                    if name != "not" {
                        return Err(SelectorError::UnsupportedPseudo {
                            selector: self.source.to_owned(),
                            name,
                        });
                    }
                    self.expect('(')?;
                    let cond = self.attr_cond()?;
                    self.expect(')')?;
                    compound.negated.push(cond);
                }
                _ => break,
            }
        }
        Ok(compound)
    }

    fn attr_cond(&mut self) -> Result<AttrCond, SelectorError> {
        self.expect('[')?;
        self.skip_whitespace();
        let name = self.ident().to_ascii_lowercase();
        if name.is_empty() {
            return Err(self.unexpected(self.peek().unwrap_or('[')));
        }
        self.skip_whitespace();

        let op = match self.bump() {
            Some(']') => return Ok(AttrCond { name, op: AttrOp::Exists }),
            Some('=') => AttrOp::Equals(self.value()?),
            Some('*') => {
                self.expect('=')?;
                AttrOp::Contains(self.value()?)
            }
            Some(c) => {
                self.pos -= 1;
                return Err(self.unexpected(c));
            }
            None => {
                return Err(SelectorError::Unterminated {
                    selector: self.source.to_owned(),
                    open: '[',
                });
            }
        };
        self.skip_whitespace();
        self.expect(']')?;
        Ok(AttrCond { name, op })
    }

    fn value(&mut self) -> Result<String, SelectorError> {
        self.skip_whitespace();
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let mut value = String::new();
                loop {
                    match self.bump() {
                        Some(c) if c == quote => return Ok(value),
                        Some(c) => value.push(c),
                        None => {
                            return Err(SelectorError::Unterminated {
                                selector: self.source.to_owned(),
                                open: quote,
                            });
                        }
                    }
                }
            }
            _ => Ok(self.ident()),
        }
    }

    fn ident(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek().filter(|&c| is_ident_char(c)) {
            out.push(c);
            self.pos += 1;
        }
        out
    }

    fn expect(&mut self, expected: char) -> Result<(), SelectorError> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => {
                self.pos -= 1;
                Err(self.unexpected(c))
            }
            None => Err(SelectorError::Unterminated {
                selector: self.source.to_owned(),
                open: expected,
            }),
        }
    }
}

#[inline]
fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}
