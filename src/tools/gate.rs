//! Chain-specific capability gating.
//!
//! [`EXTENSIONS`] maps chain-id predicates to extra tool sets. The table is
//! consulted once at startup; the result is never re-evaluated.

use crate::error::RegistryError;
use crate::tools::{zircuit, ToolDefinition, ToolRegistry};

/// An extension tool set tied to particular networks.
#[derive(Debug, Clone, Copy)]
pub struct ChainExtension {
    /// Name used in logs.
    pub name: &'static str,
    /// Returns `true` if the extension applies to this chain id.
    pub applies: fn(u64) -> bool,
    /// Produces the extension's tools.
    pub tools: fn() -> Vec<ToolDefinition>,
}

/// All known chain extensions.
pub static EXTENSIONS: &[ChainExtension] = &[ChainExtension {
    name: "zircuit",
    applies: zircuit::is_zircuit_chain,
    tools: zircuit::tools,
}];

/// Returns `true` if any extension applies to `chain_id`.
#[must_use]
pub fn is_extension_chain(chain_id: u64) -> bool {
    EXTENSIONS.iter().any(|ext| (ext.applies)(chain_id))
}

/// Registers the tools of every extension that applies to `chain_id`.
///
/// Returns the number of tools added.
///
/// # Errors
///
/// Returns [`RegistryError::DuplicateTool`] if an extension tool collides
/// with an existing one.
pub fn gate(chain_id: u64, registry: &mut ToolRegistry) -> Result<usize, RegistryError> {
    let mut added = 0;
    for ext in EXTENSIONS.iter().filter(|ext| (ext.applies)(chain_id)) {
        let count = registry.register_all((ext.tools)())?;
        tracing::info!(
            extension = ext.name,
            chain_id,
            tools = count,
            "Enabled chain extension"
        );
        added += count;
    }
    Ok(added)
}
