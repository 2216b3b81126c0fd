//! Base plugin trait.

use crate::Result;

/// Lifecycle and metadata shared by extractors and recognition backends.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> String;

    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn description(&self) -> &str {
        ""
    }
}
