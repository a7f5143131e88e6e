use std::sync::Arc;

use chrono::Local;

use crate::calendar::{CalendarDay, CalendarView};
use crate::categories::CategoryService;
use crate::draft::image_too_large;
use crate::holidays::HolidayService;
use crate::i18n::{labels, Language};
use crate::models::{Category, NewTask, Project, Task};
use crate::projects::{ProjectError, ProjectService};
use crate::reminders::{NotificationBackend, ReminderScheduler};
use crate::store::KeyValueStore;
use crate::tasks::{due_date_only, TaskError, TaskService};

#[derive(Debug, serde::Serialize)]
pub struct CommandResult<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

fn ok<T>(data: T) -> CommandResult<T> {
    CommandResult {
        ok: true,
        data: Some(data),
        error: None,
    }
}

fn err<T>(message: &str) -> CommandResult<T> {
    CommandResult {
        ok: false,
        data: None,
        error: Some(message.to_string()),
    }
}

/// Everything the shell needs, wired once at startup: each service gets its
/// store handle through the constructor, nothing is ambient.
pub struct Services {
    pub categories: CategoryService,
    pub projects: ProjectService,
    pub tasks: TaskService,
    pub reminders: ReminderScheduler,
    language: Language,
}

impl Services {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        backend: Arc<dyn NotificationBackend>,
        language: Language,
    ) -> Self {
        let categories = CategoryService::new(store.clone());
        let projects = ProjectService::new(store.clone(), categories.clone());
        let tasks = TaskService::new(store, projects.clone());
        let reminders = ReminderScheduler::new(tasks.clone(), backend, language);
        Self {
            categories,
            projects,
            tasks,
            reminders,
            language,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// First-run setup: seed the default categories and align the
    /// notification schedule with whatever the store already holds.
    pub fn bootstrap(&self) {
        if let Err(error) = self.categories.ensure_defaults() {
            log::error!("commands: failed to seed default categories: {error}");
        }
        self.reminders.refresh();
    }
}

pub fn list_categories(services: &Services) -> CommandResult<Vec<Category>> {
    ok(services.categories.get_all())
}

pub fn create_category(services: &Services, name: &str) -> CommandResult<Category> {
    let labels = labels(services.language);
    let name = name.trim();
    if name.is_empty() {
        return err(labels.name_required);
    }
    if services.categories.exists_by_name(name, None) {
        return err(labels.duplicate_category);
    }
    match services.categories.create(name) {
        Ok(category) => ok(category),
        Err(error) => {
            log::error!("commands: create_category failed: {error}");
            err(labels.storage_failure)
        }
    }
}

pub fn update_category(services: &Services, category: &Category) -> CommandResult<Category> {
    let labels = labels(services.language);
    let name = category.name.trim();
    if name.is_empty() {
        return err(labels.name_required);
    }
    if services
        .categories
        .exists_by_name(name, Some(&category.id))
    {
        return err(labels.duplicate_category);
    }
    if !services.categories.update(category) {
        return err(labels.record_not_found);
    }
    ok(Category {
        id: category.id.clone(),
        name: name.to_string(),
    })
}

pub fn delete_category(services: &Services, id: &str) -> CommandResult<bool> {
    if !services.categories.delete(id) {
        return err(labels(services.language).record_not_found);
    }
    ok(true)
}

pub fn list_projects(services: &Services) -> CommandResult<Vec<Project>> {
    ok(services.projects.get_all())
}

pub fn projects_by_category(services: &Services, category_id: &str) -> CommandResult<Vec<Project>> {
    ok(services.projects.get_by_category(category_id))
}

pub fn create_project(
    services: &Services,
    name: &str,
    category_id: &str,
) -> CommandResult<Project> {
    let labels = labels(services.language);
    let name = name.trim();
    if name.is_empty() {
        return err(labels.name_required);
    }
    if services.projects.exists_by_name(name, category_id, None) {
        return err(labels.duplicate_project);
    }
    match services.projects.create(name, category_id) {
        Ok(project) => ok(project),
        Err(ProjectError::MissingCategory) => err(labels.category_not_found),
        Err(error) => {
            log::error!("commands: create_project failed: {error}");
            err(labels.storage_failure)
        }
    }
}

pub fn update_project(services: &Services, project: &Project) -> CommandResult<Project> {
    let labels = labels(services.language);
    let name = project.name.trim();
    if name.is_empty() {
        return err(labels.name_required);
    }
    if services
        .projects
        .exists_by_name(name, &project.category_id, Some(&project.id))
    {
        return err(labels.duplicate_project);
    }
    if !services.projects.update(project) {
        return err(labels.record_not_found);
    }
    ok(Project {
        id: project.id.clone(),
        name: name.to_string(),
        category_id: project.category_id.clone(),
    })
}

pub fn delete_project(services: &Services, id: &str) -> CommandResult<bool> {
    if !services.projects.delete(id) {
        return err(labels(services.language).record_not_found);
    }
    ok(true)
}

pub fn list_tasks(services: &Services) -> CommandResult<Vec<Task>> {
    ok(services.tasks.get_all())
}

pub fn tasks_by_project(services: &Services, project_id: &str) -> CommandResult<Vec<Task>> {
    ok(services.tasks.get_by_project(project_id))
}

/// Oversized attachments reaching this boundary directly (outside the draft
/// flow) are dropped, not fatal: the task itself is still worth keeping.
fn sanitized_image(image: Option<String>) -> Option<String> {
    let image = image?;
    if image_too_large(&image) {
        log::warn!("commands: dropping oversized task image");
        return None;
    }
    Some(image)
}

pub fn create_task(services: &Services, fields: NewTask) -> CommandResult<Task> {
    let labels = labels(services.language);
    if fields.title.trim().is_empty() {
        return err(labels.title_required);
    }
    if due_date_only(&fields.due_date).is_none() {
        return err(labels.invalid_due_date);
    }
    if services
        .tasks
        .exists_by_title(&fields.title, &fields.project_id, None)
    {
        return err(labels.duplicate_task);
    }

    let mut fields = fields;
    fields.image = sanitized_image(fields.image.take());
    match services.tasks.create(fields) {
        Ok(task) => {
            services.reminders.refresh();
            ok(task)
        }
        Err(TaskError::MissingProject) => err(labels.project_not_found),
        Err(error) => {
            log::error!("commands: create_task failed: {error}");
            err(labels.storage_failure)
        }
    }
}

pub fn update_task(services: &Services, task: &Task) -> CommandResult<Task> {
    let labels = labels(services.language);
    if task.title.trim().is_empty() {
        return err(labels.title_required);
    }
    if due_date_only(&task.due_date).is_none() {
        return err(labels.invalid_due_date);
    }
    if services
        .tasks
        .exists_by_title(&task.title, &task.project_id, Some(&task.id))
    {
        return err(labels.duplicate_task);
    }

    let mut task = task.clone();
    task.image = sanitized_image(task.image.take());
    if !services.tasks.update(&task) {
        return err(labels.record_not_found);
    }
    services.reminders.refresh();
    match services.tasks.get_by_id(&task.id) {
        Some(stored) => ok(stored),
        None => err(labels.record_not_found),
    }
}

pub fn delete_task(services: &Services, id: &str) -> CommandResult<bool> {
    if !services.tasks.delete(id) {
        return err(labels(services.language).record_not_found);
    }
    services.reminders.refresh();
    ok(true)
}

/// Opens the calendar on the current month with a fresh holiday map.
pub async fn open_calendar(
    services: &Services,
    holidays: &HolidayService,
) -> (CalendarView, Vec<Vec<CalendarDay>>) {
    let mut view = CalendarView::at_today();
    view.set_holidays(holidays.fetch_year_map(view.year()).await);
    let grid = view.grid(&services.tasks.get_all(), Local::now().date_naive());
    (view, grid)
}

/// Moves the calendar by whole months and rebuilds the grid; crossing a year
/// boundary refetches that year's holidays first.
pub async fn shift_calendar_month(
    services: &Services,
    holidays: &HolidayService,
    view: &mut CalendarView,
    delta: i32,
) -> Vec<Vec<CalendarDay>> {
    if view.shift_month(delta) {
        view.set_holidays(holidays.fetch_year_map(view.year()).await);
    }
    view.grid(&services.tasks.get_all(), Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::draft::MAX_IMAGE_BYTES;
    use crate::reminders::Notification;
    use crate::store::MemoryStore;

    #[derive(Default)]
    struct CountingBackend {
        refreshes: Mutex<usize>,
    }

    impl NotificationBackend for CountingBackend {
        fn available(&self) -> bool {
            true
        }

        fn request_permission(&self) -> bool {
            true
        }

        fn pending_ids(&self) -> Vec<i32> {
            *self.refreshes.lock().unwrap() += 1;
            Vec::new()
        }

        fn cancel(&self, _ids: &[i32]) {}

        fn schedule(&self, _batch: Vec<Notification>) {}
    }

    fn services() -> (Services, Arc<CountingBackend>) {
        let backend = Arc::new(CountingBackend::default());
        let services = Services::new(
            Arc::new(MemoryStore::new()),
            backend.clone(),
            Language::Pt,
        );
        services.bootstrap();
        (services, backend)
    }

    fn task_fields(title: &str, project_id: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: String::new(),
            due_date: "2026-03-01".to_string(),
            image: None,
            project_id: project_id.to_string(),
        }
    }

    #[test]
    fn bootstrap_seeds_defaults_and_refreshes_reminders() {
        let (services, backend) = services();
        let names: Vec<String> = services
            .categories
            .get_all()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Escola", "Trabalho", "Pessoal"]);
        assert_eq!(*backend.refreshes.lock().unwrap(), 1);
    }

    #[test]
    fn category_commands_validate_before_touching_storage() {
        let (services, _) = services();

        let result = create_category(&services, "   ");
        assert!(!result.ok);
        assert_eq!(result.error.as_deref(), Some("O nome é obrigatório."));

        let result = create_category(&services, "escola");
        assert_eq!(
            result.error.as_deref(),
            Some("Já existe uma categoria com esse nome.")
        );
        assert_eq!(services.categories.get_all().len(), 3);

        let created = create_category(&services, " Casa ").data.unwrap();
        assert_eq!(created.name, "Casa");

        let renamed = Category {
            id: created.id.clone(),
            name: "Trabalho".to_string(),
        };
        let result = update_category(&services, &renamed);
        assert_eq!(
            result.error.as_deref(),
            Some("Já existe uma categoria com esse nome.")
        );

        assert!(delete_category(&services, &created.id).ok);
        let result = delete_category(&services, &created.id);
        assert_eq!(result.error.as_deref(), Some("Registo não encontrado."));
    }

    #[test]
    fn project_commands_surface_missing_category() {
        let (services, _) = services();

        let result = create_project(&services, "Tese", "cat_0_missing");
        assert_eq!(result.error.as_deref(), Some("Categoria não encontrada."));

        let category_id = services.categories.get_all()[0].id.clone();
        let project = create_project(&services, "Tese", &category_id).data.unwrap();

        let duplicate = create_project(&services, " TESE ", &category_id);
        assert_eq!(
            duplicate.error.as_deref(),
            Some("Já existe um projeto com esse nome nesta categoria.")
        );

        let listed = projects_by_category(&services, &category_id).data.unwrap();
        assert_eq!(listed, vec![project]);
    }

    #[test]
    fn task_commands_validate_and_trigger_reminder_refresh() {
        let (services, backend) = services();
        let category_id = services.categories.get_all()[0].id.clone();
        let project = create_project(&services, "Tese", &category_id).data.unwrap();
        let refreshes_before = *backend.refreshes.lock().unwrap();

        let result = create_task(&services, task_fields("  ", &project.id));
        assert_eq!(result.error.as_deref(), Some("O título é obrigatório."));

        let mut bad_date = task_fields("Estudar", &project.id);
        bad_date.due_date = "amanhã".to_string();
        let result = create_task(&services, bad_date);
        assert_eq!(result.error.as_deref(), Some("Data limite inválida."));

        let result = create_task(&services, task_fields("Estudar", "proj_0_missing"));
        assert_eq!(result.error.as_deref(), Some("Projeto não encontrado."));

        // Failed commands must not reschedule anything.
        assert_eq!(*backend.refreshes.lock().unwrap(), refreshes_before);

        let created = create_task(&services, task_fields("Estudar", &project.id))
            .data
            .unwrap();
        assert_eq!(*backend.refreshes.lock().unwrap(), refreshes_before + 1);

        let duplicate = create_task(&services, task_fields("ESTUDAR", &project.id));
        assert_eq!(
            duplicate.error.as_deref(),
            Some("Já existe uma tarefa com esse título neste projeto.")
        );

        assert!(delete_task(&services, &created.id).ok);
        assert_eq!(*backend.refreshes.lock().unwrap(), refreshes_before + 2);
    }

    #[test]
    fn oversized_images_are_dropped_at_the_command_boundary() {
        let (services, _) = services();
        let category_id = services.categories.get_all()[0].id.clone();
        let project = create_project(&services, "Tese", &category_id).data.unwrap();

        let huge = format!(
            "data:image/png;base64,{}",
            "A".repeat(MAX_IMAGE_BYTES / 3 * 4 + 8)
        );
        let mut fields = task_fields("Com foto", &project.id);
        fields.image = Some(huge);

        let created = create_task(&services, fields).data.unwrap();
        assert_eq!(created.image, None);
    }

    #[test]
    fn update_task_returns_the_stored_record_with_fresh_overdue() {
        let (services, _) = services();
        let category_id = services.categories.get_all()[0].id.clone();
        let project = create_project(&services, "Tese", &category_id).data.unwrap();
        let created = create_task(&services, task_fields("Estudar", &project.id))
            .data
            .unwrap();

        let edited = Task {
            due_date: "2000-01-01".to_string(),
            ..created.clone()
        };
        let updated = update_task(&services, &edited).data.unwrap();
        assert!(updated.overdue);

        let ghost = Task {
            id: "task_0_missing".to_string(),
            title: "Fantasma".to_string(),
            ..created
        };
        let result = update_task(&services, &ghost);
        assert_eq!(result.error.as_deref(), Some("Registo não encontrado."));
    }
}
