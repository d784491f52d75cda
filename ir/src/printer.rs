//! Text rendering of trees for diagnostics.
//!
//! Expressions print on one line with full parenthesization. Statements
//! print one per line, nested bodies indented by two spaces.

use std::fmt::{self, Display, Formatter, Write as _};
use std::sync::Arc;

use itertools::Itertools;
use weft_dtype::Type;

use crate::node::{Expr, ExprKind, Range, Stmt, StmtKind};
use crate::types::{BinaryOp, ConstValue};

fn write_const(f: &mut Formatter<'_>, ty: Type, c: ConstValue) -> fmt::Result {
    match c {
        ConstValue::UInt(v) if ty.is_bool() => write!(f, "{}", v != 0),
        ConstValue::Int(v) if ty == Type::Int32 => write!(f, "{v}"),
        ConstValue::Int(v) => write!(f, "({ty}){v}"),
        ConstValue::UInt(v) => write!(f, "({ty}){v}"),
        ConstValue::Float(v) if ty == Type::Float32 => write!(f, "{v:?}f"),
        ConstValue::Float(v) => write!(f, "({ty}){v:?}"),
    }
}

fn write_list(f: &mut Formatter<'_>, items: &[Arc<Expr>]) -> fmt::Result {
    write!(f, "{}", items.iter().format(", "))
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Const(c) => write_const(f, self.ty(), *c),
            ExprKind::StringImm(s) => write!(f, "{s:?}"),
            ExprKind::Cast(v) => write!(f, "{}({v})", self.ty()),
            ExprKind::Variable { name, .. } => f.write_str(name),
            ExprKind::Binary(op @ (BinaryOp::Min | BinaryOp::Max), a, b) => write!(f, "{}({a}, {b})", op.symbol()),
            ExprKind::Binary(op, a, b) => write!(f, "({a} {} {b})", op.symbol()),
            ExprKind::Not(v) => write!(f, "!{v}"),
            ExprKind::Select { condition, true_value, false_value } => {
                write!(f, "select({condition}, {true_value}, {false_value})")
            }
            ExprKind::Load { name, index, .. } => write!(f, "{name}[{index}]"),
            ExprKind::Ramp { base, stride, lanes } => write!(f, "ramp({base}, {stride}, {lanes})"),
            ExprKind::Broadcast { value, lanes } => write!(f, "x{lanes}({value})"),
            ExprKind::Call { name, args, value_index, .. } => {
                write!(f, "{name}(")?;
                write_list(f, args)?;
                f.write_char(')')?;
                if *value_index > 0 {
                    write!(f, ".{value_index}")?;
                }
                Ok(())
            }
            ExprKind::Let { name, value, body } => write!(f, "(let {name} = {value} in {body})"),
        }
    }
}

impl Display for Range {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min(), self.extent())
    }
}

struct Indented<'a> {
    stmt: &'a Stmt,
    depth: usize,
}

impl Indented<'_> {
    fn nested<'b>(&self, stmt: &'b Stmt) -> Indented<'b> {
        Indented { stmt, depth: self.depth + 1 }
    }

    fn pad(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:width$}", "", width = self.depth * 2)
    }
}

impl Display for Indented<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.stmt.kind() {
            StmtKind::LetStmt { name, value, body } => {
                self.pad(f)?;
                writeln!(f, "let {name} = {value}")?;
                write!(f, "{}", Indented { stmt: body, depth: self.depth })
            }
            StmtKind::AssertStmt { condition, message } => {
                self.pad(f)?;
                writeln!(f, "assert({condition}, {message:?})")
            }
            StmtKind::Pipeline { name, produce, update, consume } => {
                self.pad(f)?;
                writeln!(f, "produce {name} {{")?;
                write!(f, "{}", self.nested(produce))?;
                if let Some(update) = update {
                    self.pad(f)?;
                    writeln!(f, "}} update {name} {{")?;
                    write!(f, "{}", self.nested(update))?;
                }
                self.pad(f)?;
                writeln!(f, "}}")?;
                write!(f, "{}", Indented { stmt: consume, depth: self.depth })
            }
            StmtKind::For { name, min, extent, for_type, body } => {
                self.pad(f)?;
                writeln!(f, "for ({name}, {min}, {extent}) {for_type} {{")?;
                write!(f, "{}", self.nested(body))?;
                self.pad(f)?;
                writeln!(f, "}}")
            }
            StmtKind::Store { name, value, index } => {
                self.pad(f)?;
                writeln!(f, "{name}[{index}] = {value}")
            }
            StmtKind::Provide { name, values, args } => {
                self.pad(f)?;
                write!(f, "{name}(")?;
                write_list(f, args)?;
                f.write_str(") = ")?;
                if values.len() > 1 {
                    f.write_char('{')?;
                    write_list(f, values)?;
                    f.write_char('}')?;
                } else {
                    write_list(f, values)?;
                }
                writeln!(f)
            }
            StmtKind::Allocate { name, ty, size, body } => {
                self.pad(f)?;
                writeln!(f, "allocate {name}[{ty} * {size}]")?;
                write!(f, "{}", Indented { stmt: body, depth: self.depth })
            }
            StmtKind::Free { name } => {
                self.pad(f)?;
                writeln!(f, "free {name}")
            }
            StmtKind::Realize { name, types, bounds, body } => {
                self.pad(f)?;
                writeln!(f, "realize {name}({}) of {} {{", bounds.iter().format(", "), types.iter().format(", "))?;
                write!(f, "{}", self.nested(body))?;
                self.pad(f)?;
                writeln!(f, "}}")
            }
            StmtKind::Block { first, rest } => {
                write!(f, "{}", Indented { stmt: first, depth: self.depth })?;
                match rest {
                    Some(rest) => write!(f, "{}", Indented { stmt: rest, depth: self.depth }),
                    None => Ok(()),
                }
            }
            StmtKind::IfThenElse { condition, then_case, else_case } => {
                self.pad(f)?;
                writeln!(f, "if ({condition}) {{")?;
                write!(f, "{}", self.nested(then_case))?;
                if let Some(else_case) = else_case {
                    self.pad(f)?;
                    writeln!(f, "}} else {{")?;
                    write!(f, "{}", self.nested(else_case))?;
                }
                self.pad(f)?;
                writeln!(f, "}}")
            }
            StmtKind::Evaluate(value) => {
                self.pad(f)?;
                writeln!(f, "{value}")
            }
        }
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Indented { stmt: self, depth: 0 })
    }
}
