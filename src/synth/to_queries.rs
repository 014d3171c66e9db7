use serde_json::json;

use super::renderer;
use crate::errors::GenerationResult;
use crate::schema::QuerySpec;

/// Declared custom queries as verbatim string constants.
pub fn render(project: &str, queries: &[QuerySpec]) -> GenerationResult<String> {
    let queries: Vec<serde_json::Value> = queries
        .iter()
        .map(|q| {
            json!({
                "name": q.name,
                // C# verbatim strings escape quotes by doubling them
                "sql": q.sql.replace('"', "\"\""),
            })
        })
        .collect();

    renderer::render_template(
        get_template(),
        &json!({ "project": project, "queries": queries }),
    )
}

pub fn get_template() -> &'static str {
    include_str!("queries.hbs")
}
