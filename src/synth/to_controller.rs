use super::renderer;
use crate::errors::GenerationResult;
use crate::schema::EntitySpec;

/// Five-operation controller with conventional status codes: 200 for reads,
/// 201 on create, 204 on update/delete, 404 when a read misses.
pub fn render(project: &str, entity: &EntitySpec) -> GenerationResult<String> {
    renderer::render_template(get_template(), &super::entity_context(project, entity))
}

pub fn get_template() -> &'static str {
    include_str!("controller.hbs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controller_exposes_all_five_operations() {
        let entity = EntitySpec {
            name: "Post".to_string(),
            table_name: "Post".to_string(),
            fields: vec![],
        };
        let out = render("Blog", &entity).unwrap();
        assert!(out.contains("public class PostController : ControllerBase"));
        for marker in [
            "[HttpGet]",
            "[HttpGet(\"{id}\")]",
            "[HttpPost]",
            "[HttpPut(\"{id}\")]",
            "[HttpDelete(\"{id}\")]",
        ] {
            assert!(out.contains(marker), "missing {}", marker);
        }
        assert!(out.contains("return CreatedAtAction(nameof(GetById)"));
        assert!(out.contains("return NoContent();"));
    }
}
