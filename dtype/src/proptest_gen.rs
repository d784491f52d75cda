use crate::*;
use proptest::prelude::*;

#[rustfmt::skip]
impl Type {
    pub fn int_generator() -> impl Strategy<Value = Self> {
        prop_oneof![
            Just(Type::Int8), Just(Type::Int16), Just(Type::Int32), Just(Type::Int64),
            Just(Type::UInt8), Just(Type::UInt16), Just(Type::UInt32), Just(Type::UInt64),
        ]
    }

    pub fn float_generator() -> impl Strategy<Value = Self> {
        prop_oneof![Just(Type::Float16), Just(Type::Float32), Just(Type::Float64)]
    }

    pub fn scalar_generator() -> impl Strategy<Value = Self> {
        prop_oneof![
            Just(Type::Bool),
            Self::int_generator(),
            Self::float_generator(),
            Just(Type::Handle),
        ]
    }

    /// Any valid type, vectors included.
    pub fn generator() -> impl Strategy<Value = Self> {
        (Self::scalar_generator(), prop_oneof![Just(1u16), Just(2), Just(4), Just(8), 1u16..=16])
            .prop_map(|(t, lanes)| t.vector_of(lanes))
    }
}
