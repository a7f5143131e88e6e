use chrono::NaiveDate;
use sys_locale::get_locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Pt,
    En,
}

/// Resolves an explicit preference ("pt"/"en") or falls back to the system
/// locale.
pub fn resolve_language(preference: &str) -> Language {
    let normalized = preference.trim().to_lowercase();
    match normalized.as_str() {
        "pt" => Language::Pt,
        "en" => Language::En,
        _ => detect_system_language(),
    }
}

pub fn detect_system_language() -> Language {
    let locale = get_locale().unwrap_or_default().to_lowercase();
    if locale.starts_with("pt") {
        Language::Pt
    } else {
        Language::En
    }
}

pub struct Labels {
    pub notification_title: &'static str,
    pub overdue_prefix: &'static str,
    pub reminder_prefix: &'static str,
    pub due_label: &'static str,
    pub name_required: &'static str,
    pub title_required: &'static str,
    pub invalid_due_date: &'static str,
    pub duplicate_category: &'static str,
    pub duplicate_project: &'static str,
    pub duplicate_task: &'static str,
    pub category_not_found: &'static str,
    pub project_not_found: &'static str,
    pub record_not_found: &'static str,
    pub image_too_large: &'static str,
    pub storage_failure: &'static str,
    pub months: [&'static str; 12],
    pub weekdays: [&'static str; 7],
}

pub fn labels(language: Language) -> Labels {
    match language {
        Language::Pt => Labels {
            notification_title: "Tarefa Próxima",
            overdue_prefix: "⚠️ Tarefa em atraso",
            reminder_prefix: "📋 Lembrete",
            due_label: "Data limite",
            name_required: "O nome é obrigatório.",
            title_required: "O título é obrigatório.",
            invalid_due_date: "Data limite inválida.",
            duplicate_category: "Já existe uma categoria com esse nome.",
            duplicate_project: "Já existe um projeto com esse nome nesta categoria.",
            duplicate_task: "Já existe uma tarefa com esse título neste projeto.",
            category_not_found: "Categoria não encontrada.",
            project_not_found: "Projeto não encontrado.",
            record_not_found: "Registo não encontrado.",
            image_too_large: "Imagem muito grande. Máximo 5MB.",
            storage_failure: "Não foi possível guardar os dados.",
            months: [
                "Janeiro",
                "Fevereiro",
                "Março",
                "Abril",
                "Maio",
                "Junho",
                "Julho",
                "Agosto",
                "Setembro",
                "Outubro",
                "Novembro",
                "Dezembro",
            ],
            weekdays: ["Dom", "Seg", "Ter", "Qua", "Qui", "Sex", "Sáb"],
        },
        Language::En => Labels {
            notification_title: "Task due soon",
            overdue_prefix: "⚠️ Task overdue",
            reminder_prefix: "📋 Reminder",
            due_label: "Due",
            name_required: "Name is required.",
            title_required: "Title is required.",
            invalid_due_date: "Invalid due date.",
            duplicate_category: "A category with that name already exists.",
            duplicate_project: "A project with that name already exists in this category.",
            duplicate_task: "A task with that title already exists in this project.",
            category_not_found: "Category not found.",
            project_not_found: "Project not found.",
            record_not_found: "Record not found.",
            image_too_large: "Image too large. Maximum 5MB.",
            storage_failure: "Could not save data.",
            months: [
                "January",
                "February",
                "March",
                "April",
                "May",
                "June",
                "July",
                "August",
                "September",
                "October",
                "November",
                "December",
            ],
            weekdays: ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
        },
    }
}

/// `dd/mm/yyyy`, the display format used in notification bodies and detail
/// views.
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Heading for the calendar, e.g. "Fevereiro 2024".
pub fn month_title(language: Language, year: i32, month0: i32) -> String {
    let index = month0.rem_euclid(12) as usize;
    format!("{} {year}", labels(language).months[index])
}
