//! Balanced delimiter tree over the token stream.
//!
//! Groups nest `()`, `[]` and `{}`; everything else stays a flat token.
//! Rendering concatenates token text, so an untouched tree reproduces the
//! source byte for byte.

use crate::error::{Error, Result};
use crate::lexer::{Token, TokenKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delim {
    Paren,
    Bracket,
    Brace,
}

impl Delim {
    pub fn open(self) -> char {
        match self {
            Self::Paren => '(',
            Self::Bracket => '[',
            Self::Brace => '{',
        }
    }

    pub fn close(self) -> char {
        match self {
            Self::Paren => ')',
            Self::Bracket => ']',
            Self::Brace => '}',
        }
    }

    fn from_open(text: &str) -> Option<Self> {
        match text {
            "(" => Some(Self::Paren),
            "[" => Some(Self::Bracket),
            "{" => Some(Self::Brace),
            _ => None,
        }
    }

    fn from_close(text: &str) -> Option<Self> {
        match text {
            ")" => Some(Self::Paren),
            "]" => Some(Self::Bracket),
            "}" => Some(Self::Brace),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub delim: Delim,
    pub children: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Token(Token),
    Group(Group),
}

impl Node {
    pub fn is_trivia(&self) -> bool {
        match self {
            Self::Token(t) => t.is_trivia(),
            Self::Group(_) => false,
        }
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Self::Token(t) if t.kind == TokenKind::Ident => Some(&t.text),
            _ => None,
        }
    }

    pub fn is_punct(&self, text: &str) -> bool {
        matches!(self, Self::Token(t) if t.kind == TokenKind::Punct && t.text == text)
    }

    pub fn as_group(&self, delim: Delim) -> Option<&Group> {
        match self {
            Self::Group(g) if g.delim == delim => Some(g),
            _ => None,
        }
    }
}

/// Nest a flat token stream into a delimiter tree.
pub fn build(tokens: Vec<Token>) -> Result<Vec<Node>> {
    let mut stack: Vec<(Delim, usize, Vec<Node>)> = Vec::new();
    let mut current: Vec<Node> = Vec::new();
    for token in tokens {
        if token.kind == TokenKind::Punct {
            if let Some(delim) = Delim::from_open(&token.text) {
                stack.push((delim, token.start, std::mem::take(&mut current)));
                continue;
            }
            if let Some(delim) = Delim::from_close(&token.text) {
                let Some((open, _, parent)) = stack.pop() else {
                    return Err(Error::Unbalanced {
                        found: delim.close(),
                        at: token.start,
                    });
                };
                if open != delim {
                    return Err(Error::Mismatched {
                        expected: open.close(),
                        found: delim.close(),
                        at: token.start,
                    });
                }
                let children = std::mem::replace(&mut current, parent);
                current.push(Node::Group(Group {
                    delim: open,
                    children,
                }));
                continue;
            }
        }
        current.push(Node::Token(token));
    }
    if let Some((open, at, _)) = stack.pop() {
        return Err(Error::Unclosed {
            open: open.open(),
            at,
        });
    }
    Ok(current)
}

/// Flatten a tree back into source text.
pub fn render(nodes: &[Node]) -> String {
    let mut out = String::new();
    render_into(nodes, &mut out);
    out
}

fn render_into(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Token(t) => out.push_str(&t.text),
            Node::Group(g) => {
                out.push(g.delim.open());
                render_into(&g.children, out);
                out.push(g.delim.close());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    #[test]
    fn build_and_render_round_trip() {
        let src = "spawn.sync('node', nodeArgs.concat([require.resolve('../s/' + x)]), { stdio: 'inherit' });";
        let nodes = build(tokenize(src).unwrap()).unwrap();
        assert_eq!(render(&nodes), src);
    }

    #[test]
    fn groups_nest() {
        let nodes = build(tokenize("a([b({c: 1})])").unwrap()).unwrap();
        let Node::Group(call) = &nodes[1] else {
            panic!("expected call group");
        };
        assert_eq!(call.delim, Delim::Paren);
        assert!(matches!(&call.children[0], Node::Group(g) if g.delim == Delim::Bracket));
    }

    #[test]
    fn unbalanced_close_is_an_error() {
        assert!(build(tokenize("a)").unwrap()).is_err());
    }

    #[test]
    fn mismatched_close_is_an_error() {
        assert!(build(tokenize("(]").unwrap()).is_err());
    }

    #[test]
    fn unclosed_open_is_an_error() {
        assert!(build(tokenize("f(x").unwrap()).is_err());
    }
}
