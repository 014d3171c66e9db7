use serde_json::json;

use super::renderer;
use crate::errors::GenerationResult;
use crate::schema::EntitySpec;

/// Project-wide schema registration: one DbSet per entity plus table-name
/// mapping.
pub fn render(project: &str, entities: &[EntitySpec]) -> GenerationResult<String> {
    let entities: Vec<serde_json::Value> = entities
        .iter()
        .map(|e| json!({ "name": e.name, "table": e.table_name }))
        .collect();

    renderer::render_template(
        get_template(),
        &json!({ "project": project, "entities": entities }),
    )
}

pub fn get_template() -> &'static str {
    include_str!("dbcontext.hbs")
}
