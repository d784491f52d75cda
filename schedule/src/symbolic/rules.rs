//! Rewrite rules indexed by node kind.
//!
//! A [`RuleSet`] keeps its rules in a `HashMap` keyed by the node tag, so
//! rewriting a node only tries the rules registered for its kind. Rules
//! registered without a tag are wildcards and are tried after the indexed
//! ones, for every node.
//!
//! A rule is a closure that inspects a node with a native `match` and either
//! returns a replacement or [`RewriteResult::NoMatch`]. The first rule that
//! matches wins.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use weft_ir::{Expr, ExprTag, Result, Stmt, StmtTag};

/// Outcome of trying one rule or a whole [`RuleSet`].
#[derive(Debug, Clone)]
pub enum RewriteResult<N = Expr> {
    NoMatch,
    Rewritten(Arc<N>),
}

impl<N> RewriteResult<N> {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Rewritten(_))
    }
}

impl<N> From<Option<Arc<N>>> for RewriteResult<N> {
    fn from(value: Option<Arc<N>>) -> Self {
        value.map_or(Self::NoMatch, Self::Rewritten)
    }
}

/// Nodes whose kind can index a [`RuleSet`].
pub trait Tagged {
    type Tag: Copy + Eq + Hash + Debug;

    fn node_tag(&self) -> Self::Tag;
}

impl Tagged for Expr {
    type Tag = ExprTag;

    fn node_tag(&self) -> ExprTag {
        self.tag()
    }
}

impl Tagged for Stmt {
    type Tag = StmtTag;

    fn node_tag(&self) -> StmtTag {
        self.tag()
    }
}

pub type RuleFn<N> = dyn Fn(&Arc<N>) -> Result<RewriteResult<N>> + Send + Sync;

struct Rule<N> {
    name: &'static str,
    apply: Box<RuleFn<N>>,
}

/// Rules for one node family, dispatched on the node tag.
pub struct RuleSet<N: Tagged> {
    indexed: HashMap<N::Tag, Vec<Arc<Rule<N>>>>,
    wildcards: Vec<Arc<Rule<N>>>,
}

impl<N: Tagged> RuleSet<N> {
    pub fn new() -> Self {
        Self { indexed: HashMap::new(), wildcards: Vec::new() }
    }

    /// Register `rule` under every tag in `tags`, or as a wildcard when
    /// `tags` is empty.
    pub fn add<F>(&mut self, name: &'static str, tags: &[N::Tag], rule: F)
    where
        F: Fn(&Arc<N>) -> Result<RewriteResult<N>> + Send + Sync + 'static,
    {
        let rule = Arc::new(Rule { name, apply: Box::new(rule) });
        if tags.is_empty() {
            self.wildcards.push(rule);
            return;
        }
        for tag in tags {
            self.indexed.entry(*tag).or_default().push(rule.clone());
        }
    }

    pub fn add_wildcard<F>(&mut self, name: &'static str, rule: F)
    where
        F: Fn(&Arc<N>) -> Result<RewriteResult<N>> + Send + Sync + 'static,
    {
        self.add(name, &[], rule);
    }

    /// Number of registered rules. A rule indexed under several tags counts
    /// once per tag.
    pub fn len(&self) -> usize {
        self.indexed.values().map(Vec::len).sum::<usize>() + self.wildcards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexed.is_empty() && self.wildcards.is_empty()
    }

    /// Apply the first matching rule to `node`.
    pub fn rewrite(&self, node: &Arc<N>) -> Result<RewriteResult<N>> {
        let tag = node.node_tag();
        let indexed = self.indexed.get(&tag).map(Vec::as_slice).unwrap_or_default();

        for rule in indexed.iter().chain(&self.wildcards) {
            let result = (rule.apply)(node)?;
            if result.is_match() {
                tracing::trace!(node.kind = ?tag, rule = rule.name, "rule matched");
                return Ok(result);
            }
        }
        Ok(RewriteResult::NoMatch)
    }
}

impl<N: Tagged> Default for RuleSet<N> {
    fn default() -> Self {
        Self::new()
    }
}
