//! Declarative splice operations over the delimiter tree.
//!
//! An op names the call shape it operates inside (`spawn.sync`-style member
//! calls) and what to do there. Ops are plain data; the walker below is the
//! only traversal code.

use crate::lexer::{js_string, Token, TokenKind};
use crate::tree::{Delim, Node};

/// Shape of a member call, e.g. `spawn.sync(...)` or `require.resolve(...)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallShape {
    pub object: String,
    pub property: String,
}

impl CallShape {
    pub fn new(object: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            property: property.into(),
        }
    }
}

/// One structural edit applied to a module's tree.
#[derive(Clone, Debug)]
pub enum SpliceOp {
    /// Prepend string literals to every array literal nested inside a
    /// `within`-shaped call whose own top level contains a `containing`-shaped
    /// call. Existing elements keep their order behind the new ones.
    PrependToArray {
        within: CallShape,
        containing: CallShape,
        items: Vec<String>,
    },
    /// Replace string literals equal to `from` nested inside a
    /// `within`-shaped call. Identical literals elsewhere are untouched.
    ReplaceString {
        within: CallShape,
        from: String,
        to: String,
    },
}

impl SpliceOp {
    pub fn apply(&self, nodes: &mut Vec<Node>) {
        match self {
            Self::PrependToArray {
                within,
                containing,
                items,
            } => walk(nodes, within, false, &mut |node, inside| {
                if !inside {
                    return;
                }
                if let Node::Group(group) = node {
                    if group.delim == Delim::Bracket && contains_call(&group.children, containing)
                    {
                        let mut insert = Vec::with_capacity(items.len() * 3);
                        for item in items {
                            insert.push(Node::Token(Token::synthetic(
                                TokenKind::Str,
                                js_string(item),
                            )));
                            insert.push(Node::Token(Token::synthetic(TokenKind::Punct, ",")));
                            insert.push(Node::Token(Token::synthetic(TokenKind::Whitespace, " ")));
                        }
                        group.children.splice(0..0, insert);
                    }
                }
            }),
            Self::ReplaceString { within, from, to } => {
                walk(nodes, within, false, &mut |node, inside| {
                    if !inside {
                        return;
                    }
                    if let Node::Token(token) = node {
                        if token.kind == TokenKind::Str
                            && token.str_value().as_deref() == Some(from.as_str())
                        {
                            *token = Token::synthetic(TokenKind::Str, js_string(to));
                        }
                    }
                })
            }
        }
    }
}

/// Visit every node once; `inside` is true for nodes nested anywhere under
/// the argument group of a `shape`-matched call.
fn walk<F>(nodes: &mut Vec<Node>, shape: &CallShape, inside: bool, act: &mut F)
where
    F: FnMut(&mut Node, bool),
{
    let arg_groups = call_argument_groups(nodes, shape);
    for i in 0..nodes.len() {
        act(&mut nodes[i], inside);
        let child_inside = inside || arg_groups.contains(&i);
        if let Node::Group(group) = &mut nodes[i] {
            walk(&mut group.children, shape, child_inside, act);
        }
    }
}

/// Indices of paren groups that are the argument list of a `shape` call at
/// this nesting level.
fn call_argument_groups(nodes: &[Node], shape: &CallShape) -> Vec<usize> {
    let significant: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| !n.is_trivia())
        .map(|(i, _)| i)
        .collect();
    let mut out = Vec::new();
    for w in significant.windows(4) {
        if nodes[w[0]].as_ident() == Some(shape.object.as_str())
            && nodes[w[1]].is_punct(".")
            && nodes[w[2]].as_ident() == Some(shape.property.as_str())
            && nodes[w[3]].as_group(Delim::Paren).is_some()
        {
            out.push(w[3]);
        }
    }
    out
}

fn contains_call(nodes: &[Node], shape: &CallShape) -> bool {
    !call_argument_groups(nodes, shape).is_empty()
}
