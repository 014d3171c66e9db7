//! Read-only browsing of a project's generated source tree.

use std::fs;
use std::path::{Path, PathBuf};

use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;

use crate::artifact::{self, ProjectPaths};
use crate::database::entities::{projects, users};
use crate::errors::{GenerationError, GenerationResult};

/// One node of the generated tree. Directories carry children, files do not.
#[derive(Debug, Clone, Serialize)]
pub struct FileNode {
    pub name: String,
    pub path: String,
    pub is_directory: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FileNode>,
}

#[derive(Clone)]
pub struct ViewerService {
    db: DatabaseConnection,
    root: PathBuf,
}

impl ViewerService {
    pub fn new(db: DatabaseConnection, root: PathBuf) -> Self {
        Self { db, root }
    }

    /// Recursive listing of the generated output, directories first, both
    /// groups sorted by name.
    pub async fn file_tree(&self, project_id: i32) -> GenerationResult<Vec<FileNode>> {
        let backend = self.backend_dir(project_id).await?;
        if !backend.is_dir() {
            return Err(GenerationError::NotFound(format!(
                "no generated output for project {}",
                project_id
            )));
        }
        list_dir(&backend, "")
    }

    /// Body of one generated file. The relative path is containment-checked
    /// against the project's output directory before it is followed.
    pub async fn file_content(&self, project_id: i32, relative: &str) -> GenerationResult<String> {
        let backend = self.backend_dir(project_id).await?;
        if !backend.is_dir() {
            return Err(GenerationError::NotFound(format!(
                "no generated output for project {}",
                project_id
            )));
        }
        let target = artifact::contained_path(&backend, relative)?;
        if !target.is_file() {
            return Err(GenerationError::NotFound(format!("file '{}'", relative)));
        }
        Ok(fs::read_to_string(target)?)
    }

    async fn backend_dir(&self, project_id: i32) -> GenerationResult<PathBuf> {
        let project = projects::Entity::find_by_id(project_id)
            .one(&self.db)
            .await?
            .ok_or(GenerationError::ProjectNotFound(project_id))?;
        let owner = users::Entity::find_by_id(project.owner_user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                GenerationError::NotFound(format!("user {}", project.owner_user_id))
            })?;
        Ok(ProjectPaths::new(&self.root, owner.id, &owner.folder_name(), &project.name).backend_dir)
    }
}

fn list_dir(dir: &Path, prefix: &str) -> GenerationResult<Vec<FileNode>> {
    let mut directories = Vec::new();
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", prefix, name)
        };
        if entry.path().is_dir() {
            let children = list_dir(&entry.path(), &path)?;
            directories.push(FileNode {
                name,
                path,
                is_directory: true,
                children,
            });
        } else {
            files.push(FileNode {
                name,
                path,
                is_directory: false,
                children: Vec::new(),
            });
        }
    }

    directories.sort_by(|a, b| a.name.cmp(&b.name));
    files.sort_by(|a, b| a.name.cmp(&b.name));
    directories.extend(files);
    Ok(directories)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_puts_directories_first_then_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("zeta.cs"), "z").unwrap();
        fs::write(dir.path().join("alpha.cs"), "a").unwrap();
        fs::create_dir(dir.path().join("Domain")).unwrap();
        fs::write(dir.path().join("Domain/Post.cs"), "p").unwrap();
        fs::create_dir(dir.path().join("Application")).unwrap();

        let nodes = list_dir(dir.path(), "").unwrap();
        let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Application", "Domain", "alpha.cs", "zeta.cs"]);

        let domain = &nodes[1];
        assert!(domain.is_directory);
        assert_eq!(domain.children[0].path, "Domain/Post.cs");
    }
}
