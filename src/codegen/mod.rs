//! Script generation: finalized session -> Selenium Java source.
//!
//! Two-phase emitter: `plan` maps the action log onto an abstract
//! statement list, `JavaRenderer` renders that list to text in one pass.
//! Both phases are pure; identical input always yields byte-identical
//! output.

pub mod java;
pub mod statement;

pub use java::{EscapePolicy, JavaRenderer};
pub use statement::{plan, Statement};

use serde::Serialize;

use crate::models::Session;

/// Stateless derived artifact, fully recomputed from a session.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedScript {
    pub file_name: String,
    pub source: String,
}

/// Generate the replay script for a finalized session with the default
/// renderer settings.
pub fn generate(session: &Session) -> GeneratedScript {
    let renderer = JavaRenderer::new();
    let statements = plan(&session.actions);
    GeneratedScript {
        file_name: renderer.file_name(),
        source: renderer.render(&session.target_url, &statements),
    }
}
