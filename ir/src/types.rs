//! Constant values and the small enums carried by IR nodes.

use weft_dtype::{Type, TypeKind};

/// Payload of a constant expression.
///
/// The node's [`Type`] decides width and signedness; the payload is kept at
/// 64 bits. Booleans are `UInt(0)` / `UInt(1)` with a one-bit type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstValue {
    Int(i64),
    UInt(u64),
    Float(f64),
}

/// Helper macro to cast to target width and back to storage type (for truncation and extension).
macro_rules! cast_via {
    ($v:expr, $target:ty, $storage:ty) => {
        ($v as $target) as $storage
    };
}

#[inline]
fn wrap_int(v: i64, bits: u8) -> i64 {
    match bits {
        8 => cast_via!(v, i8, i64),
        16 => cast_via!(v, i16, i64),
        32 => cast_via!(v, i32, i64),
        _ => v,
    }
}

#[inline]
fn wrap_uint(v: u64, bits: u8) -> u64 {
    match bits {
        1 => v & 1,
        8 => cast_via!(v, u8, u64),
        16 => cast_via!(v, u16, u64),
        32 => cast_via!(v, u32, u64),
        _ => v,
    }
}

impl ConstValue {
    pub const fn zero(ty: Type) -> Self {
        match ty.kind() {
            TypeKind::Int => Self::Int(0),
            TypeKind::Float => Self::Float(0.0),
            TypeKind::UInt | TypeKind::Handle => Self::UInt(0),
        }
    }

    pub const fn one(ty: Type) -> Self {
        match ty.kind() {
            TypeKind::Int => Self::Int(1),
            TypeKind::Float => Self::Float(1.0),
            TypeKind::UInt | TypeKind::Handle => Self::UInt(1),
        }
    }

    /// Whether this payload is the one the constructors store for a value of
    /// scalar type `ty`.
    pub fn fits(&self, ty: Type) -> bool {
        match (*self, ty.kind()) {
            (Self::Int(v), TypeKind::Int) => ty.can_represent_int(v),
            (Self::UInt(v), TypeKind::UInt) => ty.can_represent_uint(v),
            (Self::Float(_), TypeKind::Float) => true,
            _ => false,
        }
    }

    /// Numeric value as `i64` if it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int(v) => Some(v),
            Self::UInt(v) => i64::try_from(v).ok(),
            Self::Float(_) => None,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Int(v) => v as f64,
            Self::UInt(v) => v as f64,
            Self::Float(v) => v,
        }
    }

    pub fn is_zero(&self) -> bool {
        match *self {
            Self::Int(v) => v == 0,
            Self::UInt(v) => v == 0,
            Self::Float(v) => v == 0.0,
        }
    }

    pub fn is_one(&self) -> bool {
        match *self {
            Self::Int(v) => v == 1,
            Self::UInt(v) => v == 1,
            Self::Float(v) => v == 1.0,
        }
    }

    /// Convert to the payload of scalar type `to`, truncating or extending
    /// integers to the target width the way a machine cast does.
    ///
    /// Returns `None` for handles and half floats, which are not folded.
    pub fn cast(self, to: Type) -> Option<Self> {
        let bits = to.bits();
        Some(match (self, to.kind()) {
            (_, TypeKind::Handle) => return None,
            (_, TypeKind::Float) if bits == 16 => return None,
            (Self::Int(v), TypeKind::Int) => Self::Int(wrap_int(v, bits)),
            (Self::UInt(v), TypeKind::Int) => Self::Int(wrap_int(v as i64, bits)),
            (Self::Float(v), TypeKind::Int) => Self::Int(wrap_int(v as i64, bits)),
            (Self::Int(v), TypeKind::UInt) if bits == 1 => Self::UInt((v != 0) as u64),
            (Self::UInt(v), TypeKind::UInt) if bits == 1 => Self::UInt((v != 0) as u64),
            (Self::Float(v), TypeKind::UInt) if bits == 1 => Self::UInt((v != 0.0) as u64),
            (Self::Int(v), TypeKind::UInt) => Self::UInt(wrap_uint(v as u64, bits)),
            (Self::UInt(v), TypeKind::UInt) => Self::UInt(wrap_uint(v, bits)),
            // Float-to-unsigned: route through i64 first
            (Self::Float(v), TypeKind::UInt) => Self::UInt(wrap_uint(v as i64 as u64, bits)),
            (v, TypeKind::Float) if bits == 32 => Self::Float(v.as_f64() as f32 as f64),
            (v, TypeKind::Float) => Self::Float(v.as_f64()),
        })
    }
}

/// Binary operators. Comparisons produce booleans, `And`/`Or` take them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::EnumIter, strum::EnumCount, strum::VariantArray)]
pub enum BinaryOp {
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
}

impl BinaryOp {
    pub const fn is_arithmetic(self) -> bool {
        matches!(self, Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod | Self::Min | Self::Max)
    }

    pub const fn is_comparison(self) -> bool {
        matches!(self, Self::EQ | Self::NE | Self::LT | Self::LE | Self::GT | Self::GE)
    }

    pub const fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    /// `a op b == b op a` for every input.
    pub const fn is_commutative(self) -> bool {
        matches!(self, Self::Add | Self::Mul | Self::Min | Self::Max | Self::EQ | Self::NE | Self::And | Self::Or)
    }

    /// Result type for operands of type `operand`.
    pub fn result_type(self, operand: Type) -> Type {
        if self.is_comparison() { Type::Bool.vector_of(operand.lanes()) } else { operand }
    }

    /// Infix symbol, or the function name for `min`/`max`.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Min => "min",
            Self::Max => "max",
            Self::EQ => "==",
            Self::NE => "!=",
            Self::LT => "<",
            Self::LE => "<=",
            Self::GT => ">",
            Self::GE => ">=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

/// How a `For` loop is executed by generated code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::EnumIter, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ForType {
    #[default]
    Serial,
    Parallel,
    Vectorized,
    Unrolled,
}

/// Where the callee of a `Call` lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum CallType {
    /// Read from an input image.
    Image,
    /// Function provided by the host environment.
    Extern,
    /// Another function of the pipeline.
    Func,
    /// Operation with no IR node of its own, lowered by the code generator.
    Intrinsic,
}

/// Names of the intrinsic calls the code generator understands.
pub mod intrinsic {
    pub const DEBUG_TO_FILE: &str = "debug_to_file";
    pub const SHUFFLE_VECTOR: &str = "shuffle_vector";
    pub const INTERLEAVE_VECTORS: &str = "interleave_vectors";
    pub const REINTERPRET: &str = "reinterpret";
    pub const BITWISE_AND: &str = "bitwise_and";
    pub const BITWISE_NOT: &str = "bitwise_not";
    pub const BITWISE_XOR: &str = "bitwise_xor";
    pub const BITWISE_OR: &str = "bitwise_or";
    pub const SHIFT_LEFT: &str = "shift_left";
    pub const SHIFT_RIGHT: &str = "shift_right";
    pub const REWRITE_BUFFER: &str = "rewrite_buffer";
    pub const PROFILING_TIMER: &str = "profiling_timer";
    pub const LERP: &str = "lerp";
    pub const CREATE_BUFFER_T: &str = "create_buffer_t";
    pub const EXTRACT_BUFFER_MIN: &str = "extract_buffer_min";
    pub const EXTRACT_BUFFER_EXTENT: &str = "extract_buffer_extent";
    pub const TRACE: &str = "trace";
}
