use serde_json::json;

use super::renderer;
use crate::errors::GenerationResult;
use crate::schema::EntitySpec;

/// Project-wide generic repository abstraction.
pub fn render_interface(project: &str) -> GenerationResult<String> {
    renderer::render_template(include_str!("irepository.hbs"), &json!({ "project": project }))
}

/// Project-wide generic repository implementation.
pub fn render_base(project: &str) -> GenerationResult<String> {
    renderer::render_template(
        include_str!("repository_base.hbs"),
        &json!({ "project": project }),
    )
}

/// Typed repository handle for one entity.
pub fn render_entity(project: &str, entity: &EntitySpec) -> GenerationResult<String> {
    renderer::render_template(
        include_str!("repository.hbs"),
        &super::entity_context(project, entity),
    )
}
