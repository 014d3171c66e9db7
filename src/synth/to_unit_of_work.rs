use serde_json::json;

use super::renderer;
use crate::errors::GenerationResult;

pub fn render_interface(project: &str) -> GenerationResult<String> {
    renderer::render_template(include_str!("iunitofwork.hbs"), &json!({ "project": project }))
}

pub fn render_impl(project: &str) -> GenerationResult<String> {
    renderer::render_template(include_str!("unitofwork.hbs"), &json!({ "project": project }))
}
