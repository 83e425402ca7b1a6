//! Selector parsing and matching
//!
//! Supports the subset of Selectors Level 3 that hiding rules are written in:
//!
//! ```text
//! list      := complex ( ',' complex )*
//! complex   := [ '::content' ] compound ( combinator compound )*
//! compound  := [ type | '*' ] ( '#id' | '.class' | '[attr op value]' | ':nth-of-type(n)' )*
//! ```
//!
//! Tokenizing is `cssparser`'s, so identifiers and strings decode CSS escapes
//! (`\:` and `\3A `) the way a browser does. Matching is right-to-left
//! against a `DomArena`.
//!
//! `::content` is the legacy shadow scoping marker: such a selector only
//! matches inside the shadow root whose sheet holds it, and its leftmost
//! compound must be a direct child of that shadow root.

use cssparser::{BasicParseError, ParseError, ParseErrorKind, Parser, ParserInput, Token};
use smallvec::SmallVec;

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId};

/// `::content`
const SCOPE_PSEUDO_ELEMENT: &str = "content";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    Exists,
    Equals,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Id(String),
    Class(String),
    Attr {
        name: String,
        op: AttrOp,
        value: String,
    },
    NthOfType(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    /// `None` is the universal selector
    pub tag: Option<String>,
    pub filters: SmallVec<[Filter; 2]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    pub scoped: bool,
    pub compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`
    pub combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(pub Vec<ComplexSelector>);

impl SelectorList {
    pub fn parse(text: &str) -> Result<Self> {
        let mut input = ParserInput::new(text);
        let mut parser = Parser::new(&mut input);
        parser
            .parse_comma_separated(parse_complex)
            .map(Self)
            .map_err(|err| syntax_error(text, err))
    }

    /// Does `node` match any selector of the list?
    ///
    /// `scope` is the shadow root the owning sheet lives in, `None` for
    /// document-level sheets.
    pub fn matches(&self, arena: &DomArena, node: NodeId, scope: Option<NodeId>) -> bool {
        self.0.iter().any(|sel| sel.matches(arena, node, scope))
    }
}

impl ComplexSelector {
    pub fn matches(&self, arena: &DomArena, node: NodeId, scope: Option<NodeId>) -> bool {
        if self.scoped && scope.is_none() {
            return false;
        }
        let last = self.compounds.len() - 1;
        self.match_at(arena, node, last, scope)
    }

    fn match_at(&self, arena: &DomArena, node: NodeId, idx: usize, scope: Option<NodeId>) -> bool {
        let Ok(dom_node) = arena.get(node) else {
            return false;
        };
        if !self.compounds[idx].matches(arena, dom_node) {
            return false;
        }

        if idx == 0 {
            return !self.scoped || dom_node.parent_id == scope;
        }

        match self.combinators[idx - 1] {
            Combinator::Child => match element_parent(arena, dom_node) {
                Some(parent) => self.match_at(arena, parent, idx - 1, scope),
                None => false,
            },
            Combinator::Descendant => {
                let mut current = element_parent(arena, dom_node);
                while let Some(ancestor) = current {
                    if self.match_at(arena, ancestor, idx - 1, scope) {
                        return true;
                    }
                    current = arena.get(ancestor).ok().and_then(|n| element_parent(arena, n));
                }
                false
            }
        }
    }
}

impl Compound {
    fn matches(&self, arena: &DomArena, node: &DomNode) -> bool {
        if !node.is_element() {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !tag.eq_ignore_ascii_case(&node.node_name) {
                return false;
            }
        }

        self.filters.iter().all(|filter| match filter {
            Filter::Id(id) => node.attr("id") == Some(id.as_str()),
            Filter::Class(class) => node
                .attr("class")
                .map(|c| c.split_ascii_whitespace().any(|c| c == class))
                .unwrap_or(false),
            Filter::Attr { name, op, value } => match node.attr(name) {
                None => false,
                Some(actual) => match op {
                    AttrOp::Exists => true,
                    AttrOp::Equals => actual == value,
                    AttrOp::Prefix => !value.is_empty() && actual.starts_with(value.as_str()),
                    AttrOp::Suffix => !value.is_empty() && actual.ends_with(value.as_str()),
                    AttrOp::Substring => !value.is_empty() && actual.contains(value.as_str()),
                },
            },
            Filter::NthOfType(n) => nth_of_type(arena, node) == *n,
        })
    }
}

/// Parent if it is an element (document and shadow roots stop the walk)
fn element_parent(arena: &DomArena, node: &DomNode) -> Option<NodeId> {
    let parent = node.parent_id?;
    arena
        .get(parent)
        .ok()
        .filter(|p| p.is_element())
        .map(|p| p.node_id)
}

/// 1-based position among siblings sharing the node name
fn nth_of_type(arena: &DomArena, node: &DomNode) -> usize {
    let Some(parent) = node.parent_id.and_then(|p| arena.get(p).ok()) else {
        return 1;
    };
    let mut position = 0;
    for &sibling_id in &parent.children_ids {
        let Ok(sibling) = arena.get(sibling_id) else {
            continue;
        };
        if sibling.node_name == node.node_name {
            position += 1;
        }
        if sibling_id == node.node_id {
            return position;
        }
    }
    position
}

type ParseResult<'i, T> = std::result::Result<T, ParseError<'i, String>>;

fn parse_complex<'i, 't>(input: &mut Parser<'i, 't>) -> ParseResult<'i, ComplexSelector> {
    input.skip_whitespace();
    let scoped = input.try_parse(scope_marker).is_ok();
    input.skip_whitespace();

    let mut compounds = vec![parse_compound(input)?];
    let mut combinators = Vec::new();

    loop {
        let mut had_ws = false;
        let mut child = false;
        let at_end = loop {
            let before = input.state();
            let token = match input.next_including_whitespace() {
                Ok(token) => token.clone(),
                Err(_) => break true,
            };
            match token {
                Token::WhiteSpace(_) => had_ws = true,
                Token::Delim('>') if !child => child = true,
                _ => {
                    input.reset(&before);
                    break false;
                }
            }
        };

        if at_end {
            if child {
                return Err(input.new_custom_error("dangling '>' combinator"));
            }
            break;
        }

        let combinator = if child {
            Combinator::Child
        } else if had_ws {
            Combinator::Descendant
        } else {
            let token = input.next_including_whitespace()?.clone();
            return Err(input.new_unexpected_token_error(token));
        };
        combinators.push(combinator);
        compounds.push(parse_compound(input)?);
    }

    Ok(ComplexSelector {
        scoped,
        compounds,
        combinators,
    })
}

fn scope_marker<'i, 't>(input: &mut Parser<'i, 't>) -> std::result::Result<(), BasicParseError<'i>> {
    input.expect_colon()?;
    input.expect_colon()?;
    input.expect_ident_matching(SCOPE_PSEUDO_ELEMENT)
}

fn parse_compound<'i, 't>(input: &mut Parser<'i, 't>) -> ParseResult<'i, Compound> {
    let mut compound = Compound::default();
    let mut empty = true;

    loop {
        let before = input.state();
        let token = match input.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        let filter = match token {
            Token::Ident(ref name) if empty => {
                compound.tag = Some(name.to_ascii_lowercase());
                empty = false;
                continue;
            }
            Token::Delim('*') if empty => {
                empty = false;
                continue;
            }
            Token::IDHash(ref id) => Filter::Id(id.to_string()),
            Token::Delim('.') => {
                let next = input.next_including_whitespace()?.clone();
                match next {
                    Token::Ident(ref class) => Filter::Class(class.to_string()),
                    other => return Err(input.new_unexpected_token_error(other)),
                }
            }
            Token::SquareBracketBlock => input.parse_nested_block(parse_attribute)?,
            Token::Colon => parse_pseudo_class(input)?,
            _ => {
                input.reset(&before);
                break;
            }
        };
        compound.filters.push(filter);
        empty = false;
    }

    if empty {
        return Err(input.new_custom_error("expected a selector"));
    }
    Ok(compound)
}

/// Contents of `[...]`, the bracket already consumed
fn parse_attribute<'i, 't>(input: &mut Parser<'i, 't>) -> ParseResult<'i, Filter> {
    let name = input.expect_ident()?.to_ascii_lowercase();

    let token = match input.next() {
        Ok(token) => token.clone(),
        Err(_) => {
            return Ok(Filter::Attr {
                name,
                op: AttrOp::Exists,
                value: String::new(),
            })
        }
    };
    let op = match token {
        Token::Delim('=') => AttrOp::Equals,
        Token::PrefixMatch => AttrOp::Prefix,
        Token::SuffixMatch => AttrOp::Suffix,
        Token::SubstringMatch => AttrOp::Substring,
        other => return Err(input.new_unexpected_token_error(other)),
    };
    let value = input.expect_ident_or_string()?.to_string();

    Ok(Filter::Attr { name, op, value })
}

/// Everything after a single `:`
fn parse_pseudo_class<'i, 't>(input: &mut Parser<'i, 't>) -> ParseResult<'i, Filter> {
    let token = input.next_including_whitespace()?.clone();
    match token {
        Token::Function(ref name) if name.eq_ignore_ascii_case("nth-of-type") => {
            let n = input.parse_nested_block(nth_argument)?;
            Ok(Filter::NthOfType(n))
        }
        Token::Colon => Err(input.new_custom_error("pseudo-elements are not supported")),
        Token::Ident(ref name) | Token::Function(ref name) => {
            let message = format!("unsupported pseudo-class ':{}'", name);
            Err(input.new_custom_error(message))
        }
        other => Err(input.new_unexpected_token_error(other)),
    }
}

fn nth_argument<'i, 't>(input: &mut Parser<'i, 't>) -> ParseResult<'i, usize> {
    let n = input.expect_integer()?;
    if n < 1 {
        return Err(input.new_custom_error("nth-of-type() takes a positive integer"));
    }
    Ok(n as usize)
}

fn syntax_error(text: &str, err: ParseError<'_, String>) -> DomError {
    let reason = match err.kind {
        ParseErrorKind::Custom(message) => message,
        ParseErrorKind::Basic(kind) => format!("{:?}", kind),
    };
    DomError::Syntax(format!(
        "{} at {}:{} in selector {:?}",
        reason, err.location.line, err.location.column, text
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_structural_path() {
        let list = SelectorList::parse("body > div:nth-of-type(2) > span").unwrap();
        let sel = &list.0[0];
        assert!(!sel.scoped);
        assert_eq!(sel.compounds.len(), 3);
        assert_eq!(sel.combinators, vec![Combinator::Child, Combinator::Child]);
        assert_eq!(sel.compounds[1].tag.as_deref(), Some("div"));
        assert_eq!(sel.compounds[1].filters[0], Filter::NthOfType(2));
    }

    #[test]
    fn test_parse_escaped_tag() {
        let list = SelectorList::parse(r"body > my\:widget > x\-y").unwrap();
        let sel = &list.0[0];
        assert_eq!(sel.compounds[1].tag.as_deref(), Some("my:widget"));
        assert_eq!(sel.compounds[2].tag.as_deref(), Some("x-y"));

        let hex = SelectorList::parse(r"my\3A widget").unwrap();
        assert_eq!(hex.0[0].compounds[0].tag.as_deref(), Some("my:widget"));
    }

    #[test]
    fn test_parse_scoped_and_attribute() {
        let list = SelectorList::parse(r#"::content img[src="a\"b.png"]"#).unwrap();
        let sel = &list.0[0];
        assert!(sel.scoped);
        assert_eq!(
            sel.compounds[0].filters[0],
            Filter::Attr {
                name: "src".to_string(),
                op: AttrOp::Equals,
                value: "a\"b.png".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_list_and_descendant() {
        let list = SelectorList::parse(".ad, #banner div[data-x]").unwrap();
        assert_eq!(list.0.len(), 2);
        assert_eq!(list.0[1].combinators, vec![Combinator::Descendant]);
    }

    #[test]
    fn test_parse_comments_quotes_and_open_blocks() {
        let list = SelectorList::parse(r"div /* ad slot */ > span[title='it\'s']").unwrap();
        let sel = &list.0[0];
        assert_eq!(sel.combinators, vec![Combinator::Child]);
        assert_eq!(
            sel.compounds[1].filters[0],
            Filter::Attr {
                name: "title".to_string(),
                op: AttrOp::Equals,
                value: "it's".to_string(),
            }
        );

        // Blocks and strings left open at end of input close implicitly
        let open = SelectorList::parse(r#"img[src^="http"#).unwrap();
        assert_eq!(
            open.0[0].compounds[0].filters[0],
            Filter::Attr {
                name: "src".to_string(),
                op: AttrOp::Prefix,
                value: "http".to_string(),
            }
        );
    }

    #[test]
    fn test_reject_malformed() {
        let malformed = [
            "",
            "div >",
            "> div",
            "div > > p",
            "div:hover",
            "div::before",
            "a:nth-of-type(x)",
            "a:nth-of-type(0)",
            "img[src=]",
            "img[src~=a]",
            ".",
            "div}",
            "div,,p",
        ];
        for bad in malformed {
            assert!(
                matches!(SelectorList::parse(bad), Err(DomError::Syntax(_))),
                "expected syntax error for {:?}",
                bad
            );
        }
    }
}
