use std::sync::Arc;

use crate::ids::generate_id;
use crate::models::Category;
use crate::store::{read_collection, write_collection, KeyValueStore, StoreError, CATEGORIES_KEY};

/// Categories present after a first run with an empty store.
pub const DEFAULT_CATEGORY_NAMES: [&str; 3] = ["Escola", "Trabalho", "Pessoal"];

#[derive(Clone)]
pub struct CategoryService {
    store: Arc<dyn KeyValueStore>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Seeds the default categories when the store holds none yet.
    pub fn ensure_defaults(&self) -> Result<(), StoreError> {
        let existing: Vec<Category> = read_collection(self.store.as_ref(), CATEGORIES_KEY)?;
        if !existing.is_empty() {
            return Ok(());
        }
        let defaults: Vec<Category> = DEFAULT_CATEGORY_NAMES
            .iter()
            .map(|name| Category {
                id: generate_id("cat"),
                name: (*name).to_string(),
            })
            .collect();
        write_collection(self.store.as_ref(), CATEGORIES_KEY, &defaults)
    }

    pub fn get_all(&self) -> Vec<Category> {
        match read_collection(self.store.as_ref(), CATEGORIES_KEY) {
            Ok(categories) => categories,
            Err(err) => {
                log::error!("categories: failed to read collection: {err}");
                Vec::new()
            }
        }
    }

    pub fn get_by_id(&self, id: &str) -> Option<Category> {
        self.get_all().into_iter().find(|category| category.id == id)
    }

    pub fn create(&self, name: &str) -> Result<Category, StoreError> {
        let mut categories: Vec<Category> = read_collection(self.store.as_ref(), CATEGORIES_KEY)?;
        let category = Category {
            id: generate_id("cat"),
            name: name.trim().to_string(),
        };
        categories.push(category.clone());
        write_collection(self.store.as_ref(), CATEGORIES_KEY, &categories)?;
        Ok(category)
    }

    /// Full-record replace. Returns false when the id is unknown or the store
    /// fails; the caller surfaces that as a plain "did not happen".
    pub fn update(&self, category: &Category) -> bool {
        match self.try_update(category) {
            Ok(updated) => updated,
            Err(err) => {
                log::error!("categories: failed to update id={}: {err}", category.id);
                false
            }
        }
    }

    fn try_update(&self, category: &Category) -> Result<bool, StoreError> {
        let mut categories: Vec<Category> = read_collection(self.store.as_ref(), CATEGORIES_KEY)?;
        let Some(existing) = categories.iter_mut().find(|c| c.id == category.id) else {
            return Ok(false);
        };
        *existing = Category {
            id: category.id.clone(),
            name: category.name.trim().to_string(),
        };
        write_collection(self.store.as_ref(), CATEGORIES_KEY, &categories)?;
        Ok(true)
    }

    /// Deletes by id. Projects referencing the category are left untouched;
    /// orphaned references are accepted behavior here.
    pub fn delete(&self, id: &str) -> bool {
        match self.try_delete(id) {
            Ok(deleted) => deleted,
            Err(err) => {
                log::error!("categories: failed to delete id={id}: {err}");
                false
            }
        }
    }

    fn try_delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut categories: Vec<Category> = read_collection(self.store.as_ref(), CATEGORIES_KEY)?;
        let before = categories.len();
        categories.retain(|category| category.id != id);
        if categories.len() == before {
            return Ok(false);
        }
        write_collection(self.store.as_ref(), CATEGORIES_KEY, &categories)?;
        Ok(true)
    }

    /// Case-insensitive name check across all categories, optionally ignoring
    /// one id so edits do not collide with themselves.
    pub fn exists_by_name(&self, name: &str, exclude_id: Option<&str>) -> bool {
        let normalized = name.trim().to_lowercase();
        self.get_all().iter().any(|category| {
            category.name.to_lowercase() == normalized && Some(category.id.as_str()) != exclude_id
        })
    }
}
