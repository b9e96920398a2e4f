//! Composable token-pattern matcher.
//!
//! A [`Rule`] describes a small grammar over the token tree produced by
//! [`crate::lexer`]. Rules thread a context value `C` through every successful
//! step: each primitive may carry a handler that receives the context produced
//! by the previous step and returns the next one.
//!
//! # Matching contract
//!
//! - **Alternation** tries branches in declaration order on a clone of the
//!   context; the first branch that matches wins.
//! - **No backtracking past consumed tokens**: once an alternation has chosen a
//!   branch, a later failure in the enclosing sequence fails the whole sequence.
//!   Other branches are not retried.
//! - A failed rule never leaks context changes: callers only ever see the
//!   context of a successful match.
//! - **Subtree** rules step into a [`TokenKind::Group`]. Anchored subtrees must
//!   consume every child; searching subtrees apply their rule at every position
//!   and thread the context through all matches.
//!
//! # Example
//!
//! ```rust
//! use sbt_extract::lexer::tokenize;
//! use sbt_extract::matcher::{Query, Rule};
//!
//! fn count(n: usize, _token: &sbt_extract::lexer::Token) -> usize {
//!     n + 1
//! }
//!
//! let rule = Rule::sym("resolvers").op_then("+=").then(Rule::str_with(count));
//! let query = Query::new(rule, 32);
//! let tokens = tokenize(r#"resolvers += "a"; resolvers += "b""#).unwrap();
//! assert_eq!(query.run(&tokens, 0), 2);
//! ```

use crate::lexer::{Delimiter, Token, TokenKind};
use tracing::trace;

/// Handler applied to the context with the token a primitive just consumed.
pub type TokenHandler<C> = fn(C, &Token) -> C;

/// Handler applied to the context without consuming input.
pub type ContextHandler<C> = fn(C) -> C;

/// Which symbols a symbol rule accepts.
#[derive(Debug, Clone, Copy)]
pub enum SymbolPattern {
    /// Any symbol
    Any,
    /// Exactly this symbol
    Exact(&'static str),
    /// Any of these symbols
    OneOf(&'static [&'static str]),
}

impl SymbolPattern {
    fn matches(&self, name: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => name == *expected,
            Self::OneOf(candidates) => candidates.contains(&name),
        }
    }
}

/// A subtree rule: step into a bracketed group and match inside it.
#[derive(Clone)]
pub struct TreeRule<C> {
    delimiter: Option<Delimiter>,
    max_depth: usize,
    anchored: bool,
    search: Rule<C>,
}

impl<C> TreeRule<C> {
    /// The whole group content must match `rule` (begin-to-end).
    pub fn anchored(rule: Rule<C>) -> Self {
        Self {
            delimiter: None,
            max_depth: 1,
            anchored: true,
            search: rule,
        }
    }

    /// Apply `rule` at every position inside the group, descending into nested
    /// groups up to `max_depth` levels (1 = direct children only).
    pub fn searching(rule: Rule<C>, max_depth: usize) -> Self {
        Self {
            delimiter: None,
            max_depth,
            anchored: false,
            search: rule,
        }
    }

    /// Only match groups with this delimiter.
    #[must_use]
    pub fn delimited(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = Some(delimiter);
        self
    }
}

/// A matching rule over a token slice.
#[derive(Clone)]
pub enum Rule<C> {
    /// One symbol token
    Symbol {
        /// Accepted symbols
        pattern: SymbolPattern,
        /// Applied on match
        handler: Option<TokenHandler<C>>,
    },
    /// One operator token with this exact text
    Operator {
        /// Operator text
        op: &'static str,
        /// Applied on match
        handler: Option<TokenHandler<C>>,
    },
    /// One plain string literal token
    Str {
        /// Applied on match
        handler: Option<TokenHandler<C>>,
    },
    /// First matching branch wins
    Alt(Vec<Rule<C>>),
    /// Zero or one
    Opt(Box<Rule<C>>),
    /// Left-to-right join
    Seq(Vec<Rule<C>>),
    /// Context transformation that consumes nothing
    Handler(ContextHandler<C>),
    /// Nested group match
    Tree(Box<TreeRule<C>>),
}

impl<C> Rule<C> {
    /// Match exactly the symbol `name`.
    pub fn sym(name: &'static str) -> Self {
        Self::Symbol {
            pattern: SymbolPattern::Exact(name),
            handler: None,
        }
    }

    /// Match any one of `names`.
    pub fn sym_one_of(names: &'static [&'static str]) -> Self {
        Self::Symbol {
            pattern: SymbolPattern::OneOf(names),
            handler: None,
        }
    }

    /// Match any symbol.
    pub fn any_sym() -> Self {
        Self::Symbol {
            pattern: SymbolPattern::Any,
            handler: None,
        }
    }

    /// Match any symbol and pass it to `handler`.
    pub fn sym_with(handler: TokenHandler<C>) -> Self {
        Self::Symbol {
            pattern: SymbolPattern::Any,
            handler: Some(handler),
        }
    }

    /// Match the operator `op`.
    pub fn op(op: &'static str) -> Self {
        Self::Operator {
            op,
            handler: None,
        }
    }

    /// Match any plain string literal.
    pub fn str() -> Self {
        Self::Str {
            handler: None,
        }
    }

    /// Match any plain string literal and pass it to `handler`.
    pub fn str_with(handler: TokenHandler<C>) -> Self {
        Self::Str {
            handler: Some(handler),
        }
    }

    /// First of `branches` that matches.
    pub fn alt(branches: Vec<Self>) -> Self {
        Self::Alt(branches)
    }

    /// `rule` or nothing.
    pub fn opt(rule: Self) -> Self {
        Self::Opt(Box::new(rule))
    }

    /// Context-only step.
    pub fn handler(handler: ContextHandler<C>) -> Self {
        Self::Handler(handler)
    }

    /// Subtree step.
    pub fn tree(tree: TreeRule<C>) -> Self {
        Self::Tree(Box::new(tree))
    }

    /// Append `next` to this rule, flattening sequences.
    #[must_use]
    pub fn then(self, next: Self) -> Self {
        match self {
            Self::Seq(mut rules) => {
                rules.push(next);
                Self::Seq(rules)
            }
            other => Self::Seq(vec![other, next]),
        }
    }

    /// Append an operator step.
    #[must_use]
    pub fn op_then(self, op: &'static str) -> Self {
        self.then(Self::op(op))
    }

    /// Append a context-only step.
    #[must_use]
    pub fn then_handler(self, handler: ContextHandler<C>) -> Self {
        self.then(Self::handler(handler))
    }
}

impl<C: Clone> Rule<C> {
    /// Try to match at `pos`.
    ///
    /// Returns the position after the consumed tokens and the threaded context,
    /// or `None` when the rule does not match. A failed match drops whatever
    /// partial context it built.
    pub fn match_at(&self, tokens: &[Token], pos: usize, ctx: C) -> Option<(usize, C)> {
        match self {
            Self::Symbol {
                pattern,
                handler,
            } => {
                let token = tokens.get(pos)?;
                match &token.kind {
                    TokenKind::Symbol(name) if pattern.matches(name) => {
                        Some((pos + 1, apply(*handler, ctx, token)))
                    }
                    _ => None,
                }
            }
            Self::Operator {
                op,
                handler,
            } => {
                let token = tokens.get(pos)?;
                match &token.kind {
                    TokenKind::Operator(text) if text == op => Some((pos + 1, apply(*handler, ctx, token))),
                    _ => None,
                }
            }
            Self::Str {
                handler,
            } => {
                let token = tokens.get(pos)?;
                match &token.kind {
                    TokenKind::Str(_) => Some((pos + 1, apply(*handler, ctx, token))),
                    _ => None,
                }
            }
            Self::Alt(branches) => {
                branches.iter().find_map(|branch| branch.match_at(tokens, pos, ctx.clone()))
            }
            Self::Opt(rule) => match rule.match_at(tokens, pos, ctx.clone()) {
                Some(matched) => Some(matched),
                None => Some((pos, ctx)),
            },
            Self::Seq(rules) => {
                let mut pos = pos;
                let mut ctx = ctx;
                for rule in rules {
                    (pos, ctx) = rule.match_at(tokens, pos, ctx)?;
                }
                Some((pos, ctx))
            }
            Self::Handler(handler) => Some((pos, handler(ctx))),
            Self::Tree(tree) => {
                let token = tokens.get(pos)?;
                let TokenKind::Group {
                    delimiter,
                    children,
                } = &token.kind
                else {
                    return None;
                };
                if tree.delimiter.is_some_and(|expected| expected != *delimiter) {
                    return None;
                }

                let ctx = if tree.anchored {
                    let (end, ctx) = tree.search.match_at(children, 0, ctx)?;
                    if end != children.len() {
                        return None;
                    }
                    ctx
                } else {
                    search(&tree.search, children, ctx, tree.max_depth)
                };
                Some((pos + 1, ctx))
            }
        }
    }
}

fn apply<C>(handler: Option<TokenHandler<C>>, ctx: C, token: &Token) -> C {
    match handler {
        Some(handler) => handler(ctx, token),
        None => ctx,
    }
}

/// Apply `rule` at every position of `tokens`, left to right.
///
/// A match advances past its tokens; a miss advances by one, first descending
/// into the token if it is a group and the depth limit allows. Zero-width
/// matches are ignored so the scan always makes progress.
pub fn search<C: Clone>(rule: &Rule<C>, tokens: &[Token], ctx: C, max_depth: usize) -> C {
    scan(rule, tokens, ctx, 1, max_depth)
}

fn scan<C: Clone>(rule: &Rule<C>, tokens: &[Token], mut ctx: C, depth: usize, max_depth: usize) -> C {
    let mut pos = 0;
    while pos < tokens.len() {
        match rule.match_at(tokens, pos, ctx.clone()) {
            Some((next, matched)) if next > pos => {
                ctx = matched;
                pos = next;
                continue;
            }
            _ => {}
        }

        if let TokenKind::Group {
            children,
            ..
        } = &tokens[pos].kind
        {
            if depth < max_depth {
                ctx = scan(rule, children, ctx, depth + 1, max_depth);
            } else {
                trace!("Search depth limit {} reached at line {}", max_depth, tokens[pos].line);
            }
        }
        pos += 1;
    }
    ctx
}

/// A root search over a whole token tree with an optional post-pass hook.
#[derive(Clone)]
pub struct Query<C> {
    search: Rule<C>,
    max_depth: usize,
    post_handler: Option<ContextHandler<C>>,
}

impl<C: Clone> Query<C> {
    /// Search for `rule` everywhere in the tree, down to `max_depth` levels.
    pub fn new(search: Rule<C>, max_depth: usize) -> Self {
        Self {
            search,
            max_depth,
            post_handler: None,
        }
    }

    /// Run `handler` once over the final context.
    #[must_use]
    pub fn with_post_handler(mut self, handler: ContextHandler<C>) -> Self {
        self.post_handler = Some(handler);
        self
    }

    /// Run the query over `tokens`, threading `ctx` through every match.
    pub fn run(&self, tokens: &[Token], ctx: C) -> C {
        let ctx = search(&self.search, tokens, ctx, self.max_depth);
        match self.post_handler {
            Some(handler) => handler(ctx),
            None => ctx,
        }
    }
}
