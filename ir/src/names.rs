//! Fresh names for generated variables, parameters and domains.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_NAME: AtomicU64 = AtomicU64::new(0);

/// A name no other call returns, made of `prefix` and a counter.
///
/// Conventional prefixes: `p` parameters, `b` buffers, `r` reduction
/// domains, `v` variables, `t` temporaries.
pub fn unique_name(prefix: char) -> String {
    format!("{prefix}{}", NEXT_NAME.fetch_add(1, Ordering::Relaxed))
}
