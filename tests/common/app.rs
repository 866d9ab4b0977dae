//! Initialized context wrapper for integration tests.

use std::ops::Deref;

use pixfish::{Context, EngineConfig};

/// A context that is initialized on creation and torn down on drop.
pub struct TestContext {
    ctx: Context,
}

impl TestContext {
    /// Empty registry with default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Registry pre-populated with the base set
    pub fn with_base_set() -> Self {
        Self::with_config(EngineConfig {
            base_set: true,
            ..EngineConfig::default()
        })
    }

    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self::with_config(EngineConfig {
            base_set: true,
            chunk_size,
            ..EngineConfig::default()
        })
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let ctx = Context::new(config);
        ctx.init().expect("Failed to initialize context");
        Self { ctx }
    }
}

impl Deref for TestContext {
    type Target = Context;

    fn deref(&self) -> &Context {
        &self.ctx
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        // Tests may already have torn the context down themselves
        let _ = self.ctx.exit();
    }
}
