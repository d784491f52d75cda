//! Tests for simplification and scheduling.


mod unit;
