//! Search filtering over a project collection.

use crate::Project;

/// Case-insensitive substring match against the project's name or description.
///
/// An empty query matches everything.
#[must_use]
pub fn matches_query(project: &Project, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    project.name.to_lowercase().contains(&needle)
        || project.description.to_lowercase().contains(&needle)
}

/// Projects matching `query`, in collection order.
#[must_use]
pub fn filter_projects<'a>(projects: &'a [Project], query: &str) -> Vec<&'a Project> {
    projects
        .iter()
        .filter(|project| matches_query(project, query))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::ProjectId;

    fn project(id: &str, name: &str, description: &str) -> Project {
        Project {
            id: ProjectId::new(id),
            name: name.to_string(),
            description: description.to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            owner_id: "user_1".to_string(),
        }
    }

    fn sample() -> Vec<Project> {
        vec![
            project("p1", "Alpha", "Rocket telemetry"),
            project("p2", "Beta", "Weekly planning"),
            project("p3", "Gamma ray", ""),
        ]
    }

    fn ids(found: &[&Project]) -> Vec<String> {
        found.iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn empty_query_returns_everything_in_order() {
        let projects = sample();
        assert_eq!(ids(&filter_projects(&projects, "")), ["p1", "p2", "p3"]);
    }

    #[test]
    fn matches_name_case_insensitively() {
        let projects = sample();
        assert_eq!(ids(&filter_projects(&projects, "ALP")), ["p1"]);
    }

    #[test]
    fn matches_description() {
        let projects = sample();
        assert_eq!(ids(&filter_projects(&projects, "planning")), ["p2"]);
    }

    #[test]
    fn matches_either_field() {
        let projects = sample();
        assert_eq!(ids(&filter_projects(&projects, "ray")), ["p3"]);
        assert_eq!(ids(&filter_projects(&projects, "e")), ["p1", "p2"]);
    }

    #[test]
    fn no_match_is_empty() {
        let projects = sample();
        assert!(filter_projects(&projects, "zeta").is_empty());
    }

    #[test]
    fn filtering_is_repeatable() {
        let projects = sample();
        let first = ids(&filter_projects(&projects, "a"));
        let second = ids(&filter_projects(&projects, "a"));
        assert_eq!(first, second);
        assert_eq!(projects.len(), 3);
    }

    #[test]
    fn non_ascii_case_folding() {
        let projects = vec![project("p9", "Ärger", "")];
        assert_eq!(ids(&filter_projects(&projects, "äR")), ["p9"]);
    }
}
