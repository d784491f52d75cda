//! Process-wide IR configuration.
//!
//! Read once, then shared read-only. Either build one explicitly and
//! [`install`](IrConfig::install) it at startup, or let the first call to
//! [`global`](IrConfig::global) read it from the environment.

use std::sync::OnceLock;

use bon::bon;

static GLOBAL: OnceLock<IrConfig> = OnceLock::new();

/// Settings consulted by IR passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrConfig {
    /// Diagnostic verbosity, 0 (quiet) to 3 (render whole trees into logs).
    pub debug_level: u8,
    /// Maximum nesting of re-simplification after a rewrite.
    pub rewrite_depth_limit: usize,
}

#[bon]
impl IrConfig {
    /// Create an IR configuration with builder pattern.
    #[builder(finish_fn = build)]
    pub fn builder(
        #[builder(default = 0)] debug_level: u8,
        #[builder(default = 256)] rewrite_depth_limit: usize,
    ) -> Self {
        Self { debug_level: debug_level.min(3), rewrite_depth_limit }
    }
}

impl Default for IrConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl IrConfig {
    /// Read configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `WEFT_DEBUG_CODEGEN=N` - diagnostic verbosity (0..=3)
    /// * `WEFT_REWRITE_DEPTH_LIMIT=N` - re-simplification depth limit
    pub fn from_env() -> Self {
        let debug_level = std::env::var("WEFT_DEBUG_CODEGEN").ok().and_then(|s| s.parse().ok()).unwrap_or(0);
        let rewrite_depth_limit =
            std::env::var("WEFT_REWRITE_DEPTH_LIMIT").ok().and_then(|s| s.parse().ok()).unwrap_or(256);

        Self::builder().debug_level(debug_level).rewrite_depth_limit(rewrite_depth_limit).build()
    }

    /// Make `self` the process-wide configuration.
    ///
    /// Fails, handing the configuration back, if one is already in place.
    pub fn install(self) -> Result<(), Self> {
        GLOBAL.set(self)
    }

    /// The process-wide configuration, read from the environment on first use
    /// unless one was installed.
    pub fn global() -> &'static IrConfig {
        GLOBAL.get_or_init(Self::from_env)
    }

    /// Whether whole trees should be rendered into debug events.
    pub fn dump_trees(&self) -> bool {
        self.debug_level >= 2
    }
}
