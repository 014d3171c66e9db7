use super::renderer;
use crate::errors::GenerationResult;
use crate::schema::EntitySpec;

/// Read/create/update record trio. Read and update carry the identity field;
/// create does not.
pub fn render(project: &str, entity: &EntitySpec) -> GenerationResult<String> {
    renderer::render_template(get_template(), &super::entity_context(project, entity))
}

pub fn get_template() -> &'static str {
    include_str!("dtos.hbs")
}
