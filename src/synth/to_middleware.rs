use serde_json::json;

use super::renderer;
use crate::errors::GenerationResult;

/// Cross-cutting error translation: unhandled failures become structured JSON
/// instead of leaking stack traces.
pub fn render(project: &str) -> GenerationResult<String> {
    renderer::render_template(get_template(), &json!({ "project": project }))
}

pub fn get_template() -> &'static str {
    include_str!("middleware.hbs")
}
