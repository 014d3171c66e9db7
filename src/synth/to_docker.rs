use serde_json::json;

use super::renderer;
use crate::errors::GenerationResult;

pub const DOCKERIGNORE: &str = "bin/\nobj/\n*.user\n.git/\n";

/// Container build descriptor for the generated project.
pub fn render(project: &str) -> GenerationResult<String> {
    renderer::render_template(get_template(), &json!({ "project": project }))
}

pub fn get_template() -> &'static str {
    include_str!("dockerfile.hbs")
}
