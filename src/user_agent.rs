//! Shared User-Agent string for catalog and index HTTP clients.

/// Default User-Agent for harvester requests (identifies the tool and version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("harvester/{version} (catalog-harvester)")
}
