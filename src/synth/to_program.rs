use serde_json::json;

use super::renderer;
use crate::errors::GenerationResult;
use crate::schema::{DbEngine, EntitySpec};

/// Application entry point: DbContext registration for the selected engine
/// plus typed repository/service registrations per entity.
pub fn render(
    project: &str,
    entities: &[EntitySpec],
    engine: DbEngine,
) -> GenerationResult<String> {
    let entities: Vec<serde_json::Value> =
        entities.iter().map(|e| json!({ "name": e.name })).collect();

    renderer::render_template(
        include_str!("program.hbs"),
        &json!({
            "project": project,
            "entities": entities,
            "use_expression": engine.use_expression(),
        }),
    )
}

/// Project file referencing EF Core and the engine's provider package.
pub fn render_csproj(project: &str, engine: DbEngine) -> GenerationResult<String> {
    renderer::render_template(
        include_str!("csproj.hbs"),
        &json!({
            "project": project,
            "provider_package": engine.provider_package(),
        }),
    )
}
