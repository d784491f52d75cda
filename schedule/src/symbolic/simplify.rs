//! The simplifier pass.
//!
//! [`Simplifier`] is an [`IrMutator`]: it simplifies the children of a node,
//! then tries the rules registered for the node's kind. Whenever a rule
//! fires, the replacement is simplified again, so the result of every visit
//! is a node on which no rule fires and whose children are themselves fully
//! simplified. That makes the pass idempotent.
//!
//! Re-simplification nests at most [`IrConfig::rewrite_depth_limit`] deep;
//! past that the node is returned as is and a warning is logged.

use std::sync::{Arc, LazyLock};

use weft_ir::mutator::{mutate_expr_children, mutate_stmt_children};
use weft_ir::{Expr, ExprTag, IrConfig, IrMutator, Stmt, StmtTag};

use super::rules::{RewriteResult, RuleSet};
use super::{algebra, fold, patterns, stmt, vector};
use crate::error::Result;

const BINARY: [ExprTag; 15] = [
    ExprTag::Add,
    ExprTag::Sub,
    ExprTag::Mul,
    ExprTag::Div,
    ExprTag::Mod,
    ExprTag::Min,
    ExprTag::Max,
    ExprTag::EQ,
    ExprTag::NE,
    ExprTag::LT,
    ExprTag::LE,
    ExprTag::GT,
    ExprTag::GE,
    ExprTag::And,
    ExprTag::Or,
];

const COMPARISON: [ExprTag; 6] = [ExprTag::EQ, ExprTag::NE, ExprTag::LT, ExprTag::LE, ExprTag::GT, ExprTag::GE];

static EXPR_RULES: LazyLock<RuleSet<Expr>> = LazyLock::new(expr_rules);
static STMT_RULES: LazyLock<RuleSet<Stmt>> = LazyLock::new(stmt_rules);

/// Expression rules, in the order they are tried for each kind.
pub fn expr_rules() -> RuleSet<Expr> {
    let mut rules = RuleSet::new();

    // ========== Constant folding ==========
    rules.add("fold binary", &BINARY, fold::fold_binary);
    rules.add("fold not", &[ExprTag::Not], fold::fold_not);
    rules.add("fold cast", &[ExprTag::Cast], fold::fold_cast);
    rules.add("fold select", &[ExprTag::Select], fold::fold_select);

    // ========== Canonical operand order ==========
    rules.add("constant to right", &BINARY, algebra::constant_to_right);

    // ========== Identities ==========
    rules.add("add", &[ExprTag::Add], algebra::add_rules);
    rules.add("sub", &[ExprTag::Sub], algebra::sub_rules);
    rules.add("mul", &[ExprTag::Mul], algebra::mul_rules);
    rules.add("div/mod", &[ExprTag::Div, ExprTag::Mod], algebra::div_mod_rules);
    rules.add("min/max", &[ExprTag::Min, ExprTag::Max], algebra::min_max_rules);
    rules.add("type bounds", &COMPARISON, algebra::comparison_rules);
    rules.add("and/or", &[ExprTag::And, ExprTag::Or], algebra::logical_rules);
    rules.add("not", &[ExprTag::Not], algebra::not_rules);
    rules.add("cast", &[ExprTag::Cast], algebra::cast_rules);
    rules.add("select", &[ExprTag::Select], algebra::select_rules);
    rules.add("let", &[ExprTag::Let], stmt::let_expr_rules);

    // ========== Vectors ==========
    rules.add("zero stride ramp", &[ExprTag::Ramp], vector::zero_stride_ramp);
    rules.add("broadcast binary", &BINARY, vector::broadcast_binary);
    rules.add("broadcast not", &[ExprTag::Not], vector::broadcast_not);
    rules.add("ramp arithmetic", &[ExprTag::Add, ExprTag::Sub, ExprTag::Mul], vector::ramp_arithmetic);

    // ========== Repeated subterms ==========
    rules.add("patterns", &BINARY, patterns::pattern_rules);

    rules
}

pub fn stmt_rules() -> RuleSet<Stmt> {
    let mut rules = RuleSet::new();
    rules.add("let", &[StmtTag::LetStmt], stmt::let_stmt_rules);
    rules.add("if", &[StmtTag::IfThenElse], stmt::if_rules);
    rules.add("assert", &[StmtTag::AssertStmt], stmt::assert_rules);
    rules.add("block", &[StmtTag::Block], stmt::block_rules);
    rules.add("for", &[StmtTag::For], stmt::for_rules);
    rules
}

/// Mutator applying the rule sets to a fixed point.
#[derive(Debug)]
pub struct Simplifier {
    depth: usize,
    depth_limit: usize,
    limit_hit: bool,
}

impl Default for Simplifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Simplifier {
    /// Simplifier bounded by the process-wide rewrite depth limit.
    pub fn new() -> Self {
        Self::with_depth_limit(IrConfig::global().rewrite_depth_limit)
    }

    pub fn with_depth_limit(depth_limit: usize) -> Self {
        Self { depth: 0, depth_limit, limit_hit: false }
    }

    /// Whether some rewrite was cut short by the depth limit.
    pub fn limit_hit(&self) -> bool {
        self.limit_hit
    }

    fn enter(&mut self, what: &dyn std::fmt::Display) -> bool {
        if self.depth < self.depth_limit {
            self.depth += 1;
            return true;
        }
        if !self.limit_hit {
            tracing::warn!(limit = self.depth_limit, node = %what, "rewrite depth limit reached");
        }
        self.limit_hit = true;
        false
    }
}

impl IrMutator for Simplifier {
    fn mutate_expr(&mut self, expr: &Arc<Expr>) -> weft_ir::Result<Arc<Expr>> {
        let expr = mutate_expr_children(self, expr)?;
        let RewriteResult::Rewritten(rewritten) = EXPR_RULES.rewrite(&expr)? else {
            return Ok(expr);
        };
        if !self.enter(&expr) {
            return Ok(rewritten);
        }
        let result = self.mutate_expr(&rewritten);
        self.depth -= 1;
        result
    }

    fn mutate_stmt(&mut self, stmt: &Arc<Stmt>) -> weft_ir::Result<Arc<Stmt>> {
        let stmt = mutate_stmt_children(self, stmt)?;
        let RewriteResult::Rewritten(rewritten) = STMT_RULES.rewrite(&stmt)? else {
            return Ok(stmt);
        };
        if !self.enter(&stmt.tag()) {
            return Ok(rewritten);
        }
        let result = self.mutate_stmt(&rewritten);
        self.depth -= 1;
        result
    }
}

/// Simplify an expression to normal form.
#[tracing::instrument(skip_all)]
pub fn simplify_expr(expr: &Arc<Expr>) -> Result<Arc<Expr>> {
    let out = Simplifier::new().mutate_expr(expr)?;
    if IrConfig::global().dump_trees() {
        tracing::debug!(before = %expr, after = %out, "simplified expression");
    }
    Ok(out)
}

/// Simplify every expression of a statement, then the statement itself.
#[tracing::instrument(skip_all)]
pub fn simplify_stmt(stmt: &Arc<Stmt>) -> Result<Arc<Stmt>> {
    let out = Simplifier::new().mutate_stmt(stmt)?;
    if IrConfig::global().dump_trees() {
        tracing::debug!(before = %stmt, after = %out, "simplified statement");
    } else {
        tracing::debug!(node.kind = %stmt.tag(), changed = !Arc::ptr_eq(stmt, &out), "simplified statement");
    }
    Ok(out)
}
