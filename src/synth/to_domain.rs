use super::renderer;
use crate::errors::GenerationResult;
use crate::schema::EntitySpec;

/// Domain type: implicit Guid identity, one property per non-identity field,
/// audit stamps.
pub fn render(project: &str, entity: &EntitySpec) -> GenerationResult<String> {
    renderer::render_template(get_template(), &super::entity_context(project, entity))
}

pub fn get_template() -> &'static str {
    include_str!("domain.hbs")
}
