use serde::{Deserialize, Serialize};

/// Top-level grouping label for projects (e.g. school, work).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// A named body of work under one category, containing tasks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub category_id: String,
}

/// A single actionable item with a due date, belonging to one project.
///
/// `due_date` is an ISO date string (`YYYY-MM-DD`, optionally with a time
/// part) as captured by the shell's date picker. `overdue` is derived from it
/// on every read and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub due_date: String,
    /// Optional attachment as a base64 data URI, capped at capture time.
    #[serde(default)]
    pub image: Option<String>,
    pub project_id: String,
    #[serde(skip)]
    pub overdue: bool,
}

/// Fields for a task that does not exist yet; the store generates the id and
/// computes the derived flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub due_date: String,
    #[serde(default)]
    pub image: Option<String>,
    pub project_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_deserializes_without_image_or_overdue() {
        let json = r#"
        {
          "id": "task_1_abc",
          "title": "hand in report",
          "description": "",
          "due_date": "2026-03-01",
          "project_id": "proj_1_abc"
        }
        "#;

        let task: Task = serde_json::from_str(json).expect("task should deserialize");
        assert_eq!(task.image, None);
        assert!(!task.overdue);
    }

    #[test]
    fn overdue_flag_is_never_serialized() {
        let task = Task {
            id: "task_1_abc".to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            due_date: "2020-01-01".to_string(),
            image: None,
            project_id: "proj_1_abc".to_string(),
            overdue: true,
        };

        let value = serde_json::to_value(&task).expect("serialize task");
        assert!(value.get("overdue").is_none());
    }

    #[test]
    fn stored_overdue_field_from_older_data_is_ignored() {
        // Earlier builds of the app persisted the derived flag; reads must
        // not trust it.
        let json = r#"
        {
          "id": "task_1_abc",
          "title": "t",
          "description": "",
          "due_date": "2999-01-01",
          "project_id": "proj_1_abc",
          "overdue": true
        }
        "#;

        let task: Task = serde_json::from_str(json).expect("task should deserialize");
        assert!(!task.overdue);
    }
}
