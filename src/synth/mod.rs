//! Source-tree synthesis
//!
//! Pure, deterministic mapping from a validated project schema to a layered
//! backend source tree. Every generated construct has its own module pairing a
//! handlebars template with a small render function; `synthesize` assembles
//! the whole tree. Identical input yields byte-identical output: entities and
//! fields arrive pre-sorted and nothing here consults the clock or randomness.

pub mod to_controller;
pub mod to_dbcontext;
pub mod to_docker;
pub mod to_domain;
pub mod to_dtos;
pub mod to_middleware;
pub mod to_program;
pub mod to_queries;
pub mod to_repository;
pub mod to_service;
pub mod to_unit_of_work;

use std::collections::BTreeMap;

use crate::errors::{GenerationError, GenerationResult};
use crate::schema::{is_identifier, DbEngine, EntitySpec, QuerySpec};

/// Relative path -> file text. BTreeMap keeps iteration order stable for
/// packaging and comparison.
pub type SourceTree = BTreeMap<String, String>;

/// Common rendering function used by all construct modules.
pub mod renderer {
    use serde_json::Value;

    use crate::errors::GenerationResult;

    pub fn render_template(template: &str, context: &Value) -> GenerationResult<String> {
        let handlebars = crate::common::get_handlebars();
        Ok(handlebars.render_template(template, context)?)
    }
}

/// Context object shared by the per-entity templates.
pub(crate) fn entity_context(project: &str, entity: &EntitySpec) -> serde_json::Value {
    let fields: Vec<serde_json::Value> = entity
        .non_identity_fields()
        .map(|f| {
            serde_json::json!({
                "name": f.name,
                "decl": f.data_type.clr_declaration(f.nullable),
            })
        })
        .collect();

    serde_json::json!({
        "project": project,
        "entity": entity.name,
        "table": entity.table_name,
        "fields": fields,
    })
}

/// Synthesize the complete source tree for one project.
pub fn synthesize(
    project_name: &str,
    entities: &[EntitySpec],
    queries: &[QuerySpec],
    engine: DbEngine,
) -> GenerationResult<SourceTree> {
    if !is_identifier(project_name) {
        return Err(GenerationError::Validation(format!(
            "project name '{}' is not a valid identifier",
            project_name
        )));
    }

    let mut tree = SourceTree::new();

    tree.insert(
        format!("{}.csproj", project_name),
        to_program::render_csproj(project_name, engine)?,
    );
    tree.insert(
        "Program.cs".to_string(),
        to_program::render(project_name, entities, engine)?,
    );
    tree.insert(
        "Application/Interfaces/IRepository.cs".to_string(),
        to_repository::render_interface(project_name)?,
    );
    tree.insert(
        "Infrastructure/Repositories/Repository.cs".to_string(),
        to_repository::render_base(project_name)?,
    );
    tree.insert(
        "Application/Interfaces/IUnitOfWork.cs".to_string(),
        to_unit_of_work::render_interface(project_name)?,
    );
    tree.insert(
        "Infrastructure/Repositories/UnitOfWork.cs".to_string(),
        to_unit_of_work::render_impl(project_name)?,
    );
    tree.insert(
        "Infrastructure/Data/AppDbContext.cs".to_string(),
        to_dbcontext::render(project_name, entities)?,
    );
    tree.insert(
        "WebApi/Middleware/GlobalExceptionMiddleware.cs".to_string(),
        to_middleware::render(project_name)?,
    );
    tree.insert("Dockerfile".to_string(), to_docker::render(project_name)?);
    tree.insert(
        ".dockerignore".to_string(),
        to_docker::DOCKERIGNORE.to_string(),
    );

    if !queries.is_empty() {
        tree.insert(
            "Application/Queries/CustomQueries.cs".to_string(),
            to_queries::render(project_name, queries)?,
        );
    }

    for entity in entities {
        tree.insert(
            format!("Domain/Entities/{}.cs", entity.name),
            to_domain::render(project_name, entity)?,
        );
        tree.insert(
            format!("Application/DTOs/{}Dtos.cs", entity.name),
            to_dtos::render(project_name, entity)?,
        );
        tree.insert(
            format!("Application/Services/{}Service.cs", entity.name),
            to_service::render(project_name, entity)?,
        );
        tree.insert(
            format!("Infrastructure/Repositories/{}Repository.cs", entity.name),
            to_repository::render_entity(project_name, entity)?,
        );
        tree.insert(
            format!("WebApi/Controllers/{}Controller.cs", entity.name),
            to_controller::render(project_name, entity)?,
        );
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, FieldType};

    fn field(name: &str, data_type: FieldType) -> FieldSpec {
        FieldSpec {
            name: name.to_string(),
            data_type,
            nullable: false,
            primary_key: false,
            max_length: None,
        }
    }

    fn blog_entities() -> Vec<EntitySpec> {
        vec![
            EntitySpec {
                name: "Comment".to_string(),
                table_name: "Comment".to_string(),
                fields: vec![field("Text", FieldType::String)],
            },
            EntitySpec {
                name: "Post".to_string(),
                table_name: "Post".to_string(),
                fields: vec![field("Body", FieldType::String), field("Title", FieldType::String)],
            },
        ]
    }

    #[test]
    fn synthesis_is_deterministic() {
        let entities = blog_entities();
        let first = synthesize("Blog", &entities, &[], DbEngine::PostgreSql).unwrap();
        let second = synthesize("Blog", &entities, &[], DbEngine::PostgreSql).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn blog_example_produces_full_crud_surface() {
        let entities = blog_entities();
        let tree = synthesize("Blog", &entities, &[], DbEngine::PostgreSql).unwrap();

        for entity in ["Post", "Comment"] {
            assert!(tree.contains_key(&format!("Domain/Entities/{}.cs", entity)));
            assert!(tree.contains_key(&format!("Application/DTOs/{}Dtos.cs", entity)));
            assert!(tree.contains_key(&format!("Application/Services/{}Service.cs", entity)));
            assert!(tree.contains_key(&format!("Infrastructure/Repositories/{}Repository.cs", entity)));
            assert!(tree.contains_key(&format!("WebApi/Controllers/{}Controller.cs", entity)));
        }

        let dbcontext = &tree["Infrastructure/Data/AppDbContext.cs"];
        assert!(dbcontext.contains("DbSet<Post> Posts"));
        assert!(dbcontext.contains("DbSet<Comment> Comments"));

        assert!(tree.contains_key("Blog.csproj"));
        assert!(tree.contains_key("Program.cs"));
        assert!(tree.contains_key("Dockerfile"));
        assert!(tree.contains_key("WebApi/Middleware/GlobalExceptionMiddleware.cs"));
    }

    #[test]
    fn dto_trio_has_identity_only_on_read_and_update() {
        let entities = blog_entities();
        let tree = synthesize("Blog", &entities, &[], DbEngine::SqlServer).unwrap();
        let dtos = &tree["Application/DTOs/PostDtos.cs"];

        assert!(dtos.contains("public record PostDto(\n    Guid Id,"));
        assert!(dtos.contains("public record UpdatePostDto(\n    Guid Id,"));
        let create = dtos
            .split("public record CreatePostDto(")
            .nth(1)
            .and_then(|rest| rest.split(");").next())
            .unwrap();
        assert!(!create.contains("Guid Id"));
        assert!(create.contains("string Body"));
        assert!(create.contains("string Title"));
    }

    #[test]
    fn entity_with_only_identity_field_still_gets_crud_surface() {
        let entities = vec![EntitySpec {
            name: "Marker".to_string(),
            table_name: "Marker".to_string(),
            fields: vec![FieldSpec {
                name: "Id".to_string(),
                data_type: FieldType::Guid,
                nullable: false,
                primary_key: true,
                max_length: None,
            }],
        }];
        let tree = synthesize("Minimal", &entities, &[], DbEngine::Sqlite).unwrap();

        let dtos = &tree["Application/DTOs/MarkerDtos.cs"];
        assert!(dtos.contains("public record MarkerDto(\n    Guid Id\n);"));
        assert!(dtos.contains("public record CreateMarkerDto(\n);"));

        let service = &tree["Application/Services/MarkerService.cs"];
        assert!(service.contains("public async Task<Guid> CreateAsync(CreateMarkerDto dto)"));
        assert!(service.contains("new(entity.Id);"));
    }

    #[test]
    fn nullable_value_types_get_suffix_text_types_do_not() {
        let entities = vec![EntitySpec {
            name: "Doc".to_string(),
            table_name: "Doc".to_string(),
            fields: vec![
                FieldSpec {
                    name: "Notes".to_string(),
                    data_type: FieldType::String,
                    nullable: true,
                    primary_key: false,
                    max_length: None,
                },
                FieldSpec {
                    name: "Pages".to_string(),
                    data_type: FieldType::Integer,
                    nullable: true,
                    primary_key: false,
                    max_length: None,
                },
                FieldSpec {
                    name: "Raw".to_string(),
                    data_type: FieldType::Binary,
                    nullable: true,
                    primary_key: false,
                    max_length: None,
                },
            ],
        }];
        let tree = synthesize("Files", &entities, &[], DbEngine::SqlServer).unwrap();
        let domain = &tree["Domain/Entities/Doc.cs"];
        assert!(domain.contains("public string Notes"));
        assert!(domain.contains("public int? Pages"));
        assert!(domain.contains("public byte[] Raw"));
    }

    #[test]
    fn custom_queries_file_emitted_when_declared() {
        let queries = vec![QuerySpec {
            name: "TopPosts".to_string(),
            sql: "SELECT * FROM \"Post\" LIMIT 10".to_string(),
            result_schema: None,
        }];
        let tree = synthesize("Blog", &blog_entities(), &queries, DbEngine::PostgreSql).unwrap();
        let file = &tree["Application/Queries/CustomQueries.cs"];
        assert!(file.contains("public const string TopPosts"));
        // verbatim string doubling for embedded quotes
        assert!(file.contains(r#"SELECT * FROM ""Post"" LIMIT 10"#));

        let without = synthesize("Blog", &blog_entities(), &[], DbEngine::PostgreSql).unwrap();
        assert!(!without.contains_key("Application/Queries/CustomQueries.cs"));
    }

    #[test]
    fn engine_tag_selects_provider() {
        let tree = synthesize("Blog", &blog_entities(), &[], DbEngine::PostgreSql).unwrap();
        assert!(tree["Program.cs"].contains("UseNpgsql"));
        assert!(tree["Blog.csproj"].contains("Npgsql.EntityFrameworkCore.PostgreSQL"));

        let tree = synthesize("Blog", &blog_entities(), &[], DbEngine::MySql).unwrap();
        assert!(tree["Program.cs"].contains("UseMySql"));
    }

    #[test]
    fn invalid_project_name_is_rejected() {
        let err = synthesize("../evil", &[], &[], DbEngine::Sqlite).unwrap_err();
        assert!(matches!(err, GenerationError::Validation(_)));
    }
}
