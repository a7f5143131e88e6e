use chrono::Utc;
use uuid::Uuid;

/// Opaque record id: creation instant in unix millis plus a random suffix.
/// Ids are generated once at create time and never reused.
pub fn generate_id(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let random = Uuid::new_v4().simple().to_string();
    format!("{prefix}_{millis}_{}", &random[..9])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_carry_the_prefix() {
        let id = generate_id("cat");
        assert!(id.starts_with("cat_"));
        assert_eq!(id.split('_').count(), 3);
    }

    #[test]
    fn ids_are_unique_across_calls() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            assert!(seen.insert(generate_id("task")));
        }
    }
}
