//! Validated schema model loaded from the database
//!
//! The synthesizer never touches ORM rows directly: [`SchemaStore`] loads a
//! project's entities-with-fields, relations and custom queries, validates
//! them, and hands back plain specs in a deterministic order (entities by
//! name, fields by name). Malformed schemas are rejected here, before any
//! filesystem write.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::database::entities::{custom_queries, model_entities, model_fields, model_relations};
use crate::errors::{GenerationError, GenerationResult};

/// Closed set of semantic field data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Long,
    Decimal,
    Double,
    Boolean,
    DateTime,
    Date,
    Time,
    Guid,
    Json,
    Binary,
    Email,
    Phone,
    Url,
    Color,
    File,
    Image,
}

impl FieldType {
    pub fn parse(value: &str) -> GenerationResult<Self> {
        match value {
            "string" => Ok(FieldType::String),
            "integer" => Ok(FieldType::Integer),
            "long" => Ok(FieldType::Long),
            "decimal" => Ok(FieldType::Decimal),
            "double" => Ok(FieldType::Double),
            "boolean" => Ok(FieldType::Boolean),
            "datetime" => Ok(FieldType::DateTime),
            "date" => Ok(FieldType::Date),
            "time" => Ok(FieldType::Time),
            "guid" => Ok(FieldType::Guid),
            "json" => Ok(FieldType::Json),
            "binary" => Ok(FieldType::Binary),
            "email" => Ok(FieldType::Email),
            "phone" => Ok(FieldType::Phone),
            "url" => Ok(FieldType::Url),
            "color" => Ok(FieldType::Color),
            "file" => Ok(FieldType::File),
            "image" => Ok(FieldType::Image),
            other => Err(GenerationError::Validation(format!(
                "unknown field data type '{}'",
                other
            ))),
        }
    }

    /// The single CLR primitive this type maps to.
    pub fn clr_type(&self) -> &'static str {
        match self {
            FieldType::String
            | FieldType::Json
            | FieldType::Email
            | FieldType::Phone
            | FieldType::Url
            | FieldType::Color
            | FieldType::File
            | FieldType::Image => "string",
            FieldType::Integer => "int",
            FieldType::Long => "long",
            FieldType::Decimal => "decimal",
            FieldType::Double => "double",
            FieldType::Boolean => "bool",
            FieldType::DateTime | FieldType::Date => "DateTime",
            FieldType::Time => "TimeSpan",
            FieldType::Guid => "Guid",
            FieldType::Binary => "byte[]",
        }
    }

    /// Nullability applies only to value types; text-like and binary types
    /// never take the `?` suffix.
    pub fn is_value_type(&self) -> bool {
        !matches!(self.clr_type(), "string" | "byte[]")
    }

    /// Full CLR declaration for a field of this type.
    pub fn clr_declaration(&self, nullable: bool) -> String {
        let base = self.clr_type();
        if nullable && self.is_value_type() {
            format!("{}?", base)
        } else {
            base.to_string()
        }
    }
}

/// Target database engine tag for a generated project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbEngine {
    SqlServer,
    PostgreSql,
    MySql,
    Sqlite,
}

impl DbEngine {
    pub fn parse(value: &str) -> GenerationResult<Self> {
        match value {
            "sqlserver" => Ok(DbEngine::SqlServer),
            "postgresql" => Ok(DbEngine::PostgreSql),
            "mysql" => Ok(DbEngine::MySql),
            "sqlite" => Ok(DbEngine::Sqlite),
            other => Err(GenerationError::Validation(format!(
                "unknown database engine '{}'",
                other
            ))),
        }
    }

    /// EF Core provider package referenced from the generated csproj.
    pub fn provider_package(&self) -> &'static str {
        match self {
            DbEngine::SqlServer => "Microsoft.EntityFrameworkCore.SqlServer",
            DbEngine::PostgreSql => "Npgsql.EntityFrameworkCore.PostgreSQL",
            DbEngine::MySql => "Pomelo.EntityFrameworkCore.MySql",
            DbEngine::Sqlite => "Microsoft.EntityFrameworkCore.Sqlite",
        }
    }

    /// DbContext registration expression emitted into the generated Program.cs.
    pub fn use_expression(&self) -> &'static str {
        match self {
            DbEngine::SqlServer => "options.UseSqlServer(connectionString)",
            DbEngine::PostgreSql => "options.UseNpgsql(connectionString)",
            DbEngine::MySql => {
                "options.UseMySql(connectionString, ServerVersion.AutoDetect(connectionString))"
            }
            DbEngine::Sqlite => "options.UseSqlite(connectionString)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub data_type: FieldType,
    pub nullable: bool,
    pub primary_key: bool,
    pub max_length: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpec {
    pub name: String,
    pub table_name: String,
    pub fields: Vec<FieldSpec>,
}

impl EntitySpec {
    /// Fields that become generated properties. A field literally named after
    /// the identity column is dropped: identity is implicit, never duplicated.
    pub fn non_identity_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| !f.name.eq_ignore_ascii_case("id"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    OneToOne,
    OneToMany,
    ManyToMany,
}

impl RelationKind {
    pub fn parse(value: &str) -> GenerationResult<Self> {
        match value {
            "one_to_one" => Ok(RelationKind::OneToOne),
            "one_to_many" => Ok(RelationKind::OneToMany),
            "many_to_many" => Ok(RelationKind::ManyToMany),
            other => Err(GenerationError::Validation(format!(
                "unknown relation kind '{}'",
                other
            ))),
        }
    }
}

/// A declared relation between two entities, with both endpoints resolved to
/// entity names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationSpec {
    pub source_entity: String,
    pub target_entity: String,
    pub kind: RelationKind,
    pub foreign_key: String,
    pub navigation: String,
    pub join_table: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub name: String,
    pub sql: String,
    pub result_schema: Option<String>,
}

/// A project's full validated schema, in deterministic order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSchema {
    pub entities: Vec<EntitySpec>,
    pub relations: Vec<RelationSpec>,
    pub queries: Vec<QuerySpec>,
}

/// True for names usable as both identifiers and output path segments.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Loads entities-with-fields, relations and custom queries for a project.
pub struct SchemaStore {
    db: DatabaseConnection,
}

impl SchemaStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn load(&self, project_id: i32) -> GenerationResult<ProjectSchema> {
        let rows = model_entities::Entity::find()
            .filter(model_entities::Column::ProjectId.eq(project_id))
            .order_by_asc(model_entities::Column::Name)
            .find_with_related(model_fields::Entity)
            .all(&self.db)
            .await?;

        let mut entities = Vec::with_capacity(rows.len());
        let mut entity_names = std::collections::HashMap::new();
        for (entity, mut fields) in rows {
            entity_names.insert(entity.id, entity.name.clone());
            if !is_identifier(&entity.name) {
                return Err(GenerationError::Validation(format!(
                    "entity name '{}' is not a valid identifier",
                    entity.name
                )));
            }
            fields.sort_by(|a, b| a.name.cmp(&b.name));

            let mut specs = Vec::with_capacity(fields.len());
            for field in fields {
                if !is_identifier(&field.name) {
                    return Err(GenerationError::Validation(format!(
                        "field name '{}' on entity '{}' is not a valid identifier",
                        field.name, entity.name
                    )));
                }
                specs.push(FieldSpec {
                    name: field.name,
                    data_type: FieldType::parse(&field.data_type)?,
                    nullable: field.is_nullable,
                    primary_key: field.is_primary_key,
                    max_length: field.max_length,
                });
            }

            entities.push(EntitySpec {
                table_name: entity.actual_table_name(),
                name: entity.name,
                fields: specs,
            });
        }

        let relation_rows = model_relations::Entity::find()
            .filter(model_relations::Column::ProjectId.eq(project_id))
            .order_by_asc(model_relations::Column::Id)
            .all(&self.db)
            .await?;

        let mut relations = Vec::with_capacity(relation_rows.len());
        for row in relation_rows {
            let resolve = |id: i32| {
                entity_names.get(&id).cloned().ok_or_else(|| {
                    GenerationError::Validation(format!(
                        "relation references entity {} outside the project",
                        id
                    ))
                })
            };
            relations.push(RelationSpec {
                source_entity: resolve(row.source_entity_id)?,
                target_entity: resolve(row.target_entity_id)?,
                kind: RelationKind::parse(&row.kind)?,
                foreign_key: row.foreign_key,
                navigation: row.navigation,
                join_table: row.join_table,
            });
        }

        let queries = custom_queries::Entity::find()
            .filter(custom_queries::Column::ProjectId.eq(project_id))
            .order_by_asc(custom_queries::Column::Name)
            .all(&self.db)
            .await?;

        let mut query_specs = Vec::with_capacity(queries.len());
        for q in queries {
            if !is_identifier(&q.name) {
                return Err(GenerationError::Validation(format!(
                    "query name '{}' is not a valid identifier",
                    q.name
                )));
            }
            query_specs.push(QuerySpec {
                name: q.name,
                sql: q.sql,
                result_schema: q.result_schema,
            });
        }

        Ok(ProjectSchema {
            entities,
            relations,
            queries: query_specs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_maps_to_exactly_one_clr_primitive() {
        assert_eq!(FieldType::String.clr_type(), "string");
        assert_eq!(FieldType::Integer.clr_type(), "int");
        assert_eq!(FieldType::Long.clr_type(), "long");
        assert_eq!(FieldType::Decimal.clr_type(), "decimal");
        assert_eq!(FieldType::Double.clr_type(), "double");
        assert_eq!(FieldType::Boolean.clr_type(), "bool");
        assert_eq!(FieldType::DateTime.clr_type(), "DateTime");
        assert_eq!(FieldType::Date.clr_type(), "DateTime");
        assert_eq!(FieldType::Time.clr_type(), "TimeSpan");
        assert_eq!(FieldType::Guid.clr_type(), "Guid");
        assert_eq!(FieldType::Binary.clr_type(), "byte[]");
        for text_like in [
            FieldType::Json,
            FieldType::Email,
            FieldType::Phone,
            FieldType::Url,
            FieldType::Color,
            FieldType::File,
            FieldType::Image,
        ] {
            assert_eq!(text_like.clr_type(), "string");
        }
    }

    #[test]
    fn nullability_applies_only_to_value_types() {
        assert_eq!(FieldType::Integer.clr_declaration(true), "int?");
        assert_eq!(FieldType::Guid.clr_declaration(true), "Guid?");
        assert_eq!(FieldType::String.clr_declaration(true), "string");
        assert_eq!(FieldType::Binary.clr_declaration(true), "byte[]");
        assert_eq!(FieldType::Integer.clr_declaration(false), "int");
    }

    #[test]
    fn unknown_data_type_is_a_validation_failure() {
        let err = FieldType::parse("money").unwrap_err();
        assert!(matches!(err, GenerationError::Validation(_)));
    }

    #[test]
    fn relation_kind_parses_the_closed_set() {
        assert_eq!(RelationKind::parse("one_to_many").unwrap(), RelationKind::OneToMany);
        assert!(matches!(
            RelationKind::parse("sideways"),
            Err(GenerationError::Validation(_))
        ));
    }

    #[test]
    fn identifier_check_rejects_path_tricks() {
        assert!(is_identifier("Post"));
        assert!(is_identifier("_private2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2Fast"));
        assert!(!is_identifier("../escape"));
        assert!(!is_identifier("has space"));
    }

    #[test]
    fn identity_named_field_is_dropped_any_casing() {
        let entity = EntitySpec {
            name: "Post".to_string(),
            table_name: "Post".to_string(),
            fields: vec![
                FieldSpec {
                    name: "Id".to_string(),
                    data_type: FieldType::Guid,
                    nullable: false,
                    primary_key: true,
                    max_length: None,
                },
                FieldSpec {
                    name: "id".to_string(),
                    data_type: FieldType::Guid,
                    nullable: false,
                    primary_key: false,
                    max_length: None,
                },
                FieldSpec {
                    name: "Title".to_string(),
                    data_type: FieldType::String,
                    nullable: false,
                    primary_key: false,
                    max_length: Some(200),
                },
            ],
        };
        let names: Vec<_> = entity.non_identity_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Title"]);
    }
}
