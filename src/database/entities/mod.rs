pub mod custom_queries;
pub mod generation_jobs;
pub mod model_entities;
pub mod model_fields;
pub mod model_relations;
pub mod projects;
pub mod users;
