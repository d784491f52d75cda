//! Core node structs and fundamental accessors.
//!
//! This module contains the [`Expr`] and [`Stmt`] node definitions, the
//! identity-keyed map wrappers, and the child accessors every traversal is
//! built on.

use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;
use snafu::ensure;
use weft_device::Buffer;
use weft_dtype::Type;

use crate::error::{RangeTypeMismatchSnafu, Result};
use crate::parameter::Parameter;
use crate::reduction::ReductionDomain;
use crate::types::{BinaryOp, CallType, ConstValue, ForType};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(0);

/// Unique id for a freshly constructed node. Ids are never reused.
pub(crate) fn next_node_id() -> u64 {
    NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)
}

// =========================================================================
// Expressions
// =========================================================================

/// Expression node. Produces a value of type [`Expr::ty`].
///
/// Nodes are immutable. Build them with the constructors on `Expr`, share
/// them through `Arc<Expr>`.
#[derive(Debug)]
pub struct Expr {
    /// Unique stable ID for this node instance.
    pub id: u64,
    pub(crate) ty: Type,
    pub(crate) kind: ExprKind,
}

#[derive(Debug)]
pub enum ExprKind {
    /// Integer, unsigned or float constant; the payload matches the node type.
    Const(ConstValue),
    StringImm(String),
    /// Conversion of the operand to the node type.
    Cast(Arc<Expr>),
    Variable {
        name: String,
        /// Pipeline parameter this variable reads, if any.
        param: Option<Parameter>,
        /// Reduction domain this variable iterates over, if any.
        domain: Option<ReductionDomain>,
    },
    Binary(BinaryOp, Arc<Expr>, Arc<Expr>),
    Not(Arc<Expr>),
    Select {
        condition: Arc<Expr>,
        true_value: Arc<Expr>,
        false_value: Arc<Expr>,
    },
    /// Flat read from a named buffer.
    Load {
        name: String,
        index: Arc<Expr>,
        image: Option<Buffer>,
        param: Option<Parameter>,
    },
    /// Vector `base, base + stride, ..., base + (lanes - 1) * stride`.
    Ramp {
        base: Arc<Expr>,
        stride: Arc<Expr>,
        lanes: u16,
    },
    Broadcast {
        value: Arc<Expr>,
        lanes: u16,
    },
    Call {
        name: String,
        args: Vec<Arc<Expr>>,
        call_type: CallType,
        /// Which output of a multi-valued function is read.
        value_index: usize,
        image: Option<Buffer>,
        param: Option<Parameter>,
    },
    Let {
        name: String,
        value: Arc<Expr>,
        body: Arc<Expr>,
    },
}

/// Node kind discriminant, one entry per expression kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::EnumCount, strum::EnumIter, strum::Display)]
pub enum ExprTag {
    Const,
    StringImm,
    Cast,
    Variable,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Min,
    Max,
    EQ,
    NE,
    LT,
    LE,
    GT,
    GE,
    And,
    Or,
    Not,
    Select,
    Load,
    Ramp,
    Broadcast,
    Call,
    Let,
}

impl From<BinaryOp> for ExprTag {
    fn from(op: BinaryOp) -> Self {
        match op {
            BinaryOp::Add => Self::Add,
            BinaryOp::Sub => Self::Sub,
            BinaryOp::Mul => Self::Mul,
            BinaryOp::Div => Self::Div,
            BinaryOp::Mod => Self::Mod,
            BinaryOp::Min => Self::Min,
            BinaryOp::Max => Self::Max,
            BinaryOp::EQ => Self::EQ,
            BinaryOp::NE => Self::NE,
            BinaryOp::LT => Self::LT,
            BinaryOp::LE => Self::LE,
            BinaryOp::GT => Self::GT,
            BinaryOp::GE => Self::GE,
            BinaryOp::And => Self::And,
            BinaryOp::Or => Self::Or,
        }
    }
}

impl ExprKind {
    pub fn tag(&self) -> ExprTag {
        match self {
            Self::Const(_) => ExprTag::Const,
            Self::StringImm(_) => ExprTag::StringImm,
            Self::Cast(_) => ExprTag::Cast,
            Self::Variable { .. } => ExprTag::Variable,
            Self::Binary(op, ..) => ExprTag::from(*op),
            Self::Not(_) => ExprTag::Not,
            Self::Select { .. } => ExprTag::Select,
            Self::Load { .. } => ExprTag::Load,
            Self::Ramp { .. } => ExprTag::Ramp,
            Self::Broadcast { .. } => ExprTag::Broadcast,
            Self::Call { .. } => ExprTag::Call,
            Self::Let { .. } => ExprTag::Let,
        }
    }
}

impl Expr {
    /// Wrap an already validated kind. Constructors are the only callers.
    pub(crate) fn new(ty: Type, kind: ExprKind) -> Arc<Self> {
        Arc::new(Self { id: next_node_id(), ty, kind })
    }

    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    pub fn ty(&self) -> Type {
        self.ty
    }

    pub fn tag(&self) -> ExprTag {
        self.kind.tag()
    }

    /// Identity comparison: true only for the very same node.
    pub fn same_as(self: &Arc<Self>, other: &Arc<Self>) -> bool {
        Arc::ptr_eq(self, other)
    }

    /// Direct children in evaluation order.
    pub fn children(&self) -> SmallVec<[&Arc<Expr>; 3]> {
        let mut out = SmallVec::new();
        match &self.kind {
            ExprKind::Const(_) | ExprKind::StringImm(_) | ExprKind::Variable { .. } => {}
            ExprKind::Cast(v) | ExprKind::Not(v) => out.push(v),
            ExprKind::Binary(_, a, b) => out.extend([a, b]),
            ExprKind::Select { condition, true_value, false_value } => {
                out.extend([condition, true_value, false_value])
            }
            ExprKind::Load { index, .. } => out.push(index),
            ExprKind::Ramp { base, stride, .. } => out.extend([base, stride]),
            ExprKind::Broadcast { value, .. } => out.push(value),
            ExprKind::Call { args, .. } => out.extend(args.iter()),
            ExprKind::Let { value, body, .. } => out.extend([value, body]),
        }
        out
    }

    // =========================================================================
    // Inspection helpers
    // =========================================================================

    /// Constant payload of a scalar constant.
    pub fn as_const(&self) -> Option<ConstValue> {
        match self.kind {
            ExprKind::Const(c) => Some(c),
            _ => None,
        }
    }

    /// Value of an integer constant, signed or unsigned, if it fits an `i64`.
    pub fn as_int(&self) -> Option<i64> {
        match self.kind {
            ExprKind::Const(c @ (ConstValue::Int(_) | ConstValue::UInt(_))) if !self.ty.is_bool() => c.as_i64(),
            _ => None,
        }
    }

    /// Value of a boolean constant.
    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            ExprKind::Const(ConstValue::UInt(v)) if self.ty.is_bool() => Some(v != 0),
            _ => None,
        }
    }

    pub fn is_const(&self) -> bool {
        matches!(self.kind, ExprKind::Const(_))
    }

    /// Scalar constant, or a broadcast of one.
    pub fn as_const_or_broadcast(&self) -> Option<ConstValue> {
        match &self.kind {
            ExprKind::Const(c) => Some(*c),
            ExprKind::Broadcast { value, .. } => value.as_const(),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.as_const_or_broadcast().is_some_and(|c| c.is_zero())
    }

    pub fn is_one(&self) -> bool {
        self.as_const_or_broadcast().is_some_and(|c| c.is_one())
    }

    /// Constant (or broadcast) `true`.
    pub fn is_const_true(&self) -> bool {
        self.ty.is_bool() && self.is_one()
    }

    /// Constant (or broadcast) `false`.
    pub fn is_const_false(&self) -> bool {
        self.ty.is_bool() && self.is_zero()
    }

    /// Name of a variable node.
    pub fn var_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Variable { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Binary operator and operands.
    pub fn as_binary(&self) -> Option<(BinaryOp, &Arc<Expr>, &Arc<Expr>)> {
        match &self.kind {
            ExprKind::Binary(op, a, b) => Some((*op, a, b)),
            _ => None,
        }
    }
}

/// Wrapper for `Arc<Expr>` that implements Hash and Eq based on node identity.
#[derive(Clone)]
pub struct ExprKey(pub Arc<Expr>);

impl std::fmt::Debug for ExprKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ExprKey(id={})", self.0.id)
    }
}

impl PartialEq for ExprKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for ExprKey {}

impl Hash for ExprKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

// =========================================================================
// Statements
// =========================================================================

/// Statement node. Has an effect, produces no value.
#[derive(Debug)]
pub struct Stmt {
    pub id: u64,
    pub(crate) kind: StmtKind,
}

#[derive(Debug)]
pub enum StmtKind {
    LetStmt {
        name: String,
        value: Arc<Expr>,
        body: Arc<Stmt>,
    },
    AssertStmt {
        condition: Arc<Expr>,
        message: String,
    },
    /// Compute a function (`produce`, then `update`), then use it (`consume`).
    Pipeline {
        name: String,
        produce: Arc<Stmt>,
        update: Option<Arc<Stmt>>,
        consume: Arc<Stmt>,
    },
    For {
        name: String,
        min: Arc<Expr>,
        extent: Arc<Expr>,
        for_type: ForType,
        body: Arc<Stmt>,
    },
    /// Flat write into a named buffer.
    Store {
        name: String,
        value: Arc<Expr>,
        index: Arc<Expr>,
    },
    /// Multi-dimensional write of every output of a function.
    Provide {
        name: String,
        values: Vec<Arc<Expr>>,
        args: Vec<Arc<Expr>>,
    },
    /// Flat scratch buffer of `size` elements scoped to `body`.
    Allocate {
        name: String,
        ty: Type,
        size: Arc<Expr>,
        body: Arc<Stmt>,
    },
    Free {
        name: String,
    },
    /// Multi-dimensional storage for a function over `bounds`, scoped to `body`.
    Realize {
        name: String,
        types: Vec<Type>,
        bounds: Region,
        body: Arc<Stmt>,
    },
    Block {
        first: Arc<Stmt>,
        rest: Option<Arc<Stmt>>,
    },
    IfThenElse {
        condition: Arc<Expr>,
        then_case: Arc<Stmt>,
        else_case: Option<Arc<Stmt>>,
    },
    /// Evaluate an expression for its side effects.
    Evaluate(Arc<Expr>),
}

/// Statement kind discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::EnumCount, strum::EnumIter, strum::Display)]
pub enum StmtTag {
    LetStmt,
    AssertStmt,
    Pipeline,
    For,
    Store,
    Provide,
    Allocate,
    Free,
    Realize,
    Block,
    IfThenElse,
    Evaluate,
}

impl StmtKind {
    pub fn tag(&self) -> StmtTag {
        match self {
            Self::LetStmt { .. } => StmtTag::LetStmt,
            Self::AssertStmt { .. } => StmtTag::AssertStmt,
            Self::Pipeline { .. } => StmtTag::Pipeline,
            Self::For { .. } => StmtTag::For,
            Self::Store { .. } => StmtTag::Store,
            Self::Provide { .. } => StmtTag::Provide,
            Self::Allocate { .. } => StmtTag::Allocate,
            Self::Free { .. } => StmtTag::Free,
            Self::Realize { .. } => StmtTag::Realize,
            Self::Block { .. } => StmtTag::Block,
            Self::IfThenElse { .. } => StmtTag::IfThenElse,
            Self::Evaluate(_) => StmtTag::Evaluate,
        }
    }
}

impl Stmt {
    pub(crate) fn new(kind: StmtKind) -> Arc<Self> {
        Arc::new(Self { id: next_node_id(), kind })
    }

    pub fn kind(&self) -> &StmtKind {
        &self.kind
    }

    pub fn tag(&self) -> StmtTag {
        self.kind.tag()
    }

    pub fn same_as(self: &Arc<Self>, other: &Arc<Self>) -> bool {
        Arc::ptr_eq(self, other)
    }

    /// Expressions held directly by this statement, in source order.
    pub fn expr_children(&self) -> SmallVec<[&Arc<Expr>; 4]> {
        let mut out = SmallVec::new();
        match &self.kind {
            StmtKind::LetStmt { value, .. } => out.push(value),
            StmtKind::AssertStmt { condition, .. } => out.push(condition),
            StmtKind::For { min, extent, .. } => out.extend([min, extent]),
            StmtKind::Store { value, index, .. } => out.extend([value, index]),
            StmtKind::Provide { values, args, .. } => out.extend(values.iter().chain(args)),
            StmtKind::Allocate { size, .. } => out.push(size),
            StmtKind::Realize { bounds, .. } => {
                for r in bounds {
                    out.extend([&r.min, &r.extent]);
                }
            }
            StmtKind::IfThenElse { condition, .. } => out.push(condition),
            StmtKind::Evaluate(value) => out.push(value),
            StmtKind::Pipeline { .. } | StmtKind::Free { .. } | StmtKind::Block { .. } => {}
        }
        out
    }

    /// Nested statements, in source order.
    pub fn stmt_children(&self) -> SmallVec<[&Arc<Stmt>; 3]> {
        let mut out = SmallVec::new();
        match &self.kind {
            StmtKind::LetStmt { body, .. }
            | StmtKind::For { body, .. }
            | StmtKind::Allocate { body, .. }
            | StmtKind::Realize { body, .. } => out.push(body),
            StmtKind::Pipeline { produce, update, consume, .. } => {
                out.push(produce);
                out.extend(update.iter());
                out.push(consume);
            }
            StmtKind::Block { first, rest } => {
                out.push(first);
                out.extend(rest.iter());
            }
            StmtKind::IfThenElse { then_case, else_case, .. } => {
                out.push(then_case);
                out.extend(else_case.iter());
            }
            StmtKind::AssertStmt { .. }
            | StmtKind::Store { .. }
            | StmtKind::Provide { .. }
            | StmtKind::Free { .. }
            | StmtKind::Evaluate(_) => {}
        }
        out
    }

    /// `Evaluate` of a constant: a statement that does nothing.
    pub fn is_no_op(&self) -> bool {
        matches!(&self.kind, StmtKind::Evaluate(e) if e.is_const())
    }
}

/// Wrapper for `Arc<Stmt>` that implements Hash and Eq based on node identity.
#[derive(Clone)]
pub struct StmtKey(pub Arc<Stmt>);

impl std::fmt::Debug for StmtKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StmtKey(id={})", self.0.id)
    }
}

impl PartialEq for StmtKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for StmtKey {}

impl Hash for StmtKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

// =========================================================================
// Ranges
// =========================================================================

/// One dimension of a box: `[min, min + extent)`.
#[derive(Debug, Clone)]
pub struct Range {
    pub(crate) min: Arc<Expr>,
    pub(crate) extent: Arc<Expr>,
}

/// A multi-dimensional box, one range per dimension.
pub type Region = Vec<Range>;

impl Range {
    pub fn new(min: Arc<Expr>, extent: Arc<Expr>) -> Result<Self> {
        ensure!(min.ty() == extent.ty(), RangeTypeMismatchSnafu { min: min.ty(), extent: extent.ty() });
        Ok(Self { min, extent })
    }

    pub fn min(&self) -> &Arc<Expr> {
        &self.min
    }

    pub fn extent(&self) -> &Arc<Expr> {
        &self.extent
    }
}
