use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::ids::generate_id;
use crate::models::{NewTask, Task};
use crate::projects::ProjectService;
use crate::store::{read_collection, write_collection, KeyValueStore, StoreError, TASKS_KEY};

#[derive(Debug)]
pub enum TaskError {
    Store(StoreError),
    MissingProject,
}

impl std::fmt::Display for TaskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskError::Store(err) => write!(f, "store error: {err}"),
            TaskError::MissingProject => write!(f, "project not found"),
        }
    }
}

impl std::error::Error for TaskError {}

impl From<StoreError> for TaskError {
    fn from(value: StoreError) -> Self {
        TaskError::Store(value)
    }
}

/// Date-only view of a stored due date. Accepts `YYYY-MM-DD` with or without
/// a trailing time part (the shell's date picker emits full ISO strings).
/// Anything unparseable yields None and the task is simply never overdue or
/// due soon.
pub fn due_date_only(raw: &str) -> Option<NaiveDate> {
    let head = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// A task is overdue when its due date (date-only) is strictly before today.
pub fn is_overdue(due_date: &str, today: NaiveDate) -> bool {
    match due_date_only(due_date) {
        Some(date) => date < today,
        None => false,
    }
}

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn KeyValueStore>,
    projects: ProjectService,
}

impl TaskService {
    pub fn new(store: Arc<dyn KeyValueStore>, projects: ProjectService) -> Self {
        Self { store, projects }
    }

    /// All tasks with `overdue` recomputed against the current date. The flag
    /// is never cached: "today" moves, so every read derives it again.
    pub fn get_all(&self) -> Vec<Task> {
        self.get_all_at(Local::now().date_naive())
    }

    fn get_all_at(&self, today: NaiveDate) -> Vec<Task> {
        let mut tasks: Vec<Task> = match read_collection(self.store.as_ref(), TASKS_KEY) {
            Ok(tasks) => tasks,
            Err(err) => {
                log::error!("tasks: failed to read collection: {err}");
                Vec::new()
            }
        };
        for task in &mut tasks {
            task.overdue = is_overdue(&task.due_date, today);
        }
        tasks
    }

    pub fn get_by_id(&self, id: &str) -> Option<Task> {
        self.get_all().into_iter().find(|task| task.id == id)
    }

    pub fn get_by_project(&self, project_id: &str) -> Vec<Task> {
        self.get_all()
            .into_iter()
            .filter(|task| task.project_id == project_id)
            .collect()
    }

    /// Creates a task under an existing project; the reference is validated
    /// at write time only.
    pub fn create(&self, fields: NewTask) -> Result<Task, TaskError> {
        self.create_at(fields, Local::now().date_naive())
    }

    fn create_at(&self, fields: NewTask, today: NaiveDate) -> Result<Task, TaskError> {
        if self.projects.get_by_id(&fields.project_id).is_none() {
            return Err(TaskError::MissingProject);
        }

        let mut tasks: Vec<Task> = read_collection(self.store.as_ref(), TASKS_KEY)?;
        let task = Task {
            id: generate_id("task"),
            title: fields.title.trim().to_string(),
            description: fields.description.trim().to_string(),
            overdue: is_overdue(&fields.due_date, today),
            due_date: fields.due_date,
            image: fields.image,
            project_id: fields.project_id,
        };
        tasks.push(task.clone());
        write_collection(self.store.as_ref(), TASKS_KEY, &tasks)?;
        Ok(task)
    }

    /// Full-record replace. False when the id is unknown, the project
    /// reference does not resolve, or the store fails.
    pub fn update(&self, task: &Task) -> bool {
        match self.try_update(task) {
            Ok(updated) => updated,
            Err(err) => {
                log::error!("tasks: failed to update id={}: {err}", task.id);
                false
            }
        }
    }

    fn try_update(&self, task: &Task) -> Result<bool, StoreError> {
        if self.projects.get_by_id(&task.project_id).is_none() {
            return Ok(false);
        }

        let mut tasks: Vec<Task> = read_collection(self.store.as_ref(), TASKS_KEY)?;
        let Some(existing) = tasks.iter_mut().find(|t| t.id == task.id) else {
            return Ok(false);
        };
        *existing = Task {
            id: task.id.clone(),
            title: task.title.trim().to_string(),
            description: task.description.trim().to_string(),
            due_date: task.due_date.clone(),
            image: task.image.clone(),
            project_id: task.project_id.clone(),
            overdue: false,
        };
        write_collection(self.store.as_ref(), TASKS_KEY, &tasks)?;
        Ok(true)
    }

    pub fn delete(&self, id: &str) -> bool {
        match self.try_delete(id) {
            Ok(deleted) => deleted,
            Err(err) => {
                log::error!("tasks: failed to delete id={id}: {err}");
                false
            }
        }
    }

    fn try_delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut tasks: Vec<Task> = read_collection(self.store.as_ref(), TASKS_KEY)?;
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        if tasks.len() == before {
            return Ok(false);
        }
        write_collection(self.store.as_ref(), TASKS_KEY, &tasks)?;
        Ok(true)
    }

    /// Case-insensitive title check scoped to one project.
    pub fn exists_by_title(&self, title: &str, project_id: &str, exclude_id: Option<&str>) -> bool {
        let normalized = title.trim().to_lowercase();
        self.get_all().iter().any(|task| {
            task.title.to_lowercase() == normalized
                && task.project_id == project_id
                && Some(task.id.as_str()) != exclude_id
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::CategoryService;
    use crate::store::MemoryStore;

    fn services() -> (CategoryService, ProjectService, TaskService) {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let categories = CategoryService::new(store.clone());
        let projects = ProjectService::new(store.clone(), categories.clone());
        let tasks = TaskService::new(store, projects.clone());
        categories.ensure_defaults().unwrap();
        (categories, projects, tasks)
    }

    fn fields(title: &str, due_date: &str, project_id: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: String::new(),
            due_date: due_date.to_string(),
            image: None,
            project_id: project_id.to_string(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn due_date_only_accepts_date_and_datetime_strings() {
        assert_eq!(due_date_only("2026-03-01"), Some(date(2026, 3, 1)));
        assert_eq!(
            due_date_only("2026-03-01T14:30:00.000Z"),
            Some(date(2026, 3, 1))
        );
        assert_eq!(due_date_only(" 2026-03-01T09:00:00 "), Some(date(2026, 3, 1)));
        assert_eq!(due_date_only("not a date"), None);
        assert_eq!(due_date_only(""), None);
    }

    #[test]
    fn overdue_is_strictly_before_today_date_only() {
        let today = date(2026, 3, 10);
        assert!(is_overdue("2026-03-09", today));
        // Same day, even with an earlier time-of-day, is not overdue.
        assert!(!is_overdue("2026-03-10T00:00:01", today));
        assert!(!is_overdue("2026-03-11", today));
        assert!(!is_overdue("garbage", today));
    }

    #[test]
    fn create_requires_an_existing_project() {
        let (categories, projects, tasks) = services();

        let err = tasks
            .create(fields("Estudar", "2026-03-01", "proj_0_missing"))
            .unwrap_err();
        assert!(matches!(err, TaskError::MissingProject));

        let category_id = categories.get_all()[0].id.clone();
        let project = projects.create("Tese", &category_id).unwrap();
        let created = tasks
            .create(fields("  Estudar  ", "2026-03-01", &project.id))
            .unwrap();
        assert_eq!(created.title, "Estudar");
        assert_eq!(tasks.get_by_id(&created.id).map(|t| t.title), Some("Estudar".into()));
    }

    #[test]
    fn overdue_recomputed_on_every_read() {
        let (categories, projects, tasks) = services();
        let category_id = categories.get_all()[0].id.clone();
        let project = projects.create("Tese", &category_id).unwrap();

        tasks
            .create(fields("Antiga", "2000-01-01", &project.id))
            .unwrap();
        tasks
            .create(fields("Futura", "2999-01-01", &project.id))
            .unwrap();

        let all = tasks.get_all_at(date(2026, 3, 10));
        let old = all.iter().find(|t| t.title == "Antiga").unwrap();
        let future = all.iter().find(|t| t.title == "Futura").unwrap();
        assert!(old.overdue);
        assert!(!future.overdue);

        // Same data, different "today": the flag flips without any write.
        let all = tasks.get_all_at(date(3000, 1, 2));
        assert!(all.iter().all(|t| t.overdue));
    }

    #[test]
    fn update_validates_id_and_project_reference() {
        let (categories, projects, tasks) = services();
        let category_id = categories.get_all()[0].id.clone();
        let project = projects.create("Tese", &category_id).unwrap();
        let created = tasks
            .create(fields("Estudar", "2026-03-01", &project.id))
            .unwrap();

        let edited = Task {
            title: " Rever capítulo ".to_string(),
            ..created.clone()
        };
        assert!(tasks.update(&edited));
        assert_eq!(
            tasks.get_by_id(&created.id).unwrap().title,
            "Rever capítulo"
        );

        let wrong_project = Task {
            project_id: "proj_0_missing".to_string(),
            ..created.clone()
        };
        assert!(!tasks.update(&wrong_project));

        let wrong_id = Task {
            id: "task_0_missing".to_string(),
            ..created
        };
        assert!(!tasks.update(&wrong_id));
    }

    #[test]
    fn delete_and_project_filter() {
        let (categories, projects, tasks) = services();
        let category_id = categories.get_all()[0].id.clone();
        let tese = projects.create("Tese", &category_id).unwrap();
        let outro = projects.create("Outro", &category_id).unwrap();

        let a = tasks.create(fields("A", "2026-03-01", &tese.id)).unwrap();
        tasks.create(fields("B", "2026-03-02", &outro.id)).unwrap();

        assert_eq!(tasks.get_by_project(&tese.id).len(), 1);
        assert!(tasks.delete(&a.id));
        assert!(!tasks.delete(&a.id));
        assert!(tasks.get_by_project(&tese.id).is_empty());
        assert_eq!(tasks.get_by_project(&outro.id).len(), 1);
    }

    #[test]
    fn exists_by_title_is_scoped_to_the_project() {
        let (categories, projects, tasks) = services();
        let category_id = categories.get_all()[0].id.clone();
        let tese = projects.create("Tese", &category_id).unwrap();
        let outro = projects.create("Outro", &category_id).unwrap();
        let created = tasks
            .create(fields("Estudar", "2026-03-01", &tese.id))
            .unwrap();

        assert!(tasks.exists_by_title("ESTUDAR", &tese.id, None));
        assert!(!tasks.exists_by_title("estudar", &outro.id, None));
        assert!(!tasks.exists_by_title("estudar", &tese.id, Some(&created.id)));
    }
}
