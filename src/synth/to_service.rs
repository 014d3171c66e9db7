use super::renderer;
use crate::errors::GenerationResult;
use crate::schema::EntitySpec;

/// Service interface and implementation: list/get/create/update/delete,
/// mapping between the domain type and its DTO trio.
pub fn render(project: &str, entity: &EntitySpec) -> GenerationResult<String> {
    renderer::render_template(get_template(), &super::entity_context(project, entity))
}

pub fn get_template() -> &'static str {
    include_str!("service.hbs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, FieldType};

    #[test]
    fn service_maps_each_field_both_ways() {
        let entity = EntitySpec {
            name: "Post".to_string(),
            table_name: "Post".to_string(),
            fields: vec![
                FieldSpec {
                    name: "Body".to_string(),
                    data_type: FieldType::String,
                    nullable: false,
                    primary_key: false,
                    max_length: None,
                },
                FieldSpec {
                    name: "Title".to_string(),
                    data_type: FieldType::String,
                    nullable: false,
                    primary_key: false,
                    max_length: None,
                },
            ],
        };
        let out = render("Blog", &entity).unwrap();
        assert!(out.contains("new(entity.Id, entity.Body, entity.Title);"));
        assert!(out.contains("new() { Body = dto.Body, Title = dto.Title };"));
        assert!(out.contains("entity.Body = dto.Body;"));
        assert!(out.contains("entity.Title = dto.Title;"));
    }
}
