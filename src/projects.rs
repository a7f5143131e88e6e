use std::sync::Arc;

use crate::categories::CategoryService;
use crate::ids::generate_id;
use crate::models::Project;
use crate::store::{read_collection, write_collection, KeyValueStore, StoreError, PROJECTS_KEY};

#[derive(Debug)]
pub enum ProjectError {
    Store(StoreError),
    MissingCategory,
}

impl std::fmt::Display for ProjectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectError::Store(err) => write!(f, "store error: {err}"),
            ProjectError::MissingCategory => write!(f, "category not found"),
        }
    }
}

impl std::error::Error for ProjectError {}

impl From<StoreError> for ProjectError {
    fn from(value: StoreError) -> Self {
        ProjectError::Store(value)
    }
}

#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn KeyValueStore>,
    categories: CategoryService,
}

impl ProjectService {
    pub fn new(store: Arc<dyn KeyValueStore>, categories: CategoryService) -> Self {
        Self { store, categories }
    }

    pub fn get_all(&self) -> Vec<Project> {
        match read_collection(self.store.as_ref(), PROJECTS_KEY) {
            Ok(projects) => projects,
            Err(err) => {
                log::error!("projects: failed to read collection: {err}");
                Vec::new()
            }
        }
    }

    pub fn get_by_id(&self, id: &str) -> Option<Project> {
        self.get_all().into_iter().find(|project| project.id == id)
    }

    pub fn get_by_category(&self, category_id: &str) -> Vec<Project> {
        self.get_all()
            .into_iter()
            .filter(|project| project.category_id == category_id)
            .collect()
    }

    /// Creates a project under an existing category. The reference is
    /// validated here, at write time only; deleting the category later leaves
    /// the project orphaned on purpose.
    pub fn create(&self, name: &str, category_id: &str) -> Result<Project, ProjectError> {
        if self.categories.get_by_id(category_id).is_none() {
            return Err(ProjectError::MissingCategory);
        }

        let mut projects: Vec<Project> = read_collection(self.store.as_ref(), PROJECTS_KEY)?;
        let project = Project {
            id: generate_id("proj"),
            name: name.trim().to_string(),
            category_id: category_id.to_string(),
        };
        projects.push(project.clone());
        write_collection(self.store.as_ref(), PROJECTS_KEY, &projects)?;
        Ok(project)
    }

    /// Full-record replace. False when the id is unknown, the category
    /// reference does not resolve, or the store fails.
    pub fn update(&self, project: &Project) -> bool {
        match self.try_update(project) {
            Ok(updated) => updated,
            Err(err) => {
                log::error!("projects: failed to update id={}: {err}", project.id);
                false
            }
        }
    }

    fn try_update(&self, project: &Project) -> Result<bool, StoreError> {
        if self.categories.get_by_id(&project.category_id).is_none() {
            return Ok(false);
        }

        let mut projects: Vec<Project> = read_collection(self.store.as_ref(), PROJECTS_KEY)?;
        let Some(existing) = projects.iter_mut().find(|p| p.id == project.id) else {
            return Ok(false);
        };
        *existing = Project {
            id: project.id.clone(),
            name: project.name.trim().to_string(),
            category_id: project.category_id.clone(),
        };
        write_collection(self.store.as_ref(), PROJECTS_KEY, &projects)?;
        Ok(true)
    }

    /// Deletes by id. Tasks referencing the project are not cleaned up.
    pub fn delete(&self, id: &str) -> bool {
        match self.try_delete(id) {
            Ok(deleted) => deleted,
            Err(err) => {
                log::error!("projects: failed to delete id={id}: {err}");
                false
            }
        }
    }

    fn try_delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut projects: Vec<Project> = read_collection(self.store.as_ref(), PROJECTS_KEY)?;
        let before = projects.len();
        projects.retain(|project| project.id != id);
        if projects.len() == before {
            return Ok(false);
        }
        write_collection(self.store.as_ref(), PROJECTS_KEY, &projects)?;
        Ok(true)
    }

    /// Case-insensitive name check scoped to one category; the same name may
    /// exist under different categories.
    pub fn exists_by_name(&self, name: &str, category_id: &str, exclude_id: Option<&str>) -> bool {
        let normalized = name.trim().to_lowercase();
        self.get_all().iter().any(|project| {
            project.name.to_lowercase() == normalized
                && project.category_id == category_id
                && Some(project.id.as_str()) != exclude_id
        })
    }
}
