//! Project list filter tests

use openapi_client::models::{DeploymentStatus, Project};
use serde_json::json;
use shipdeck::views::project_list::{filter, render, ListState, StatusFilter};

fn projects() -> Vec<Project> {
    serde_json::from_value(json!([
        {"id": 1, "name": "shop-api", "host": "10.0.0.5", "type": "nodejs",
         "branch": "main", "lastDeploymentStatus": "success"},
        {"id": 2, "name": "Blog", "host": "blog.example.com", "type": "php",
         "branch": "master", "lastDeploymentStatus": "failed", "status": "deploying"},
        {"id": 3, "name": "landing", "host": "10.0.0.9", "type": "static"}
    ]))
    .unwrap()
}

#[test]
fn test_no_match_shows_call_to_action_and_clear_restores() {
    let projects = projects();
    let mut state = ListState {
        query: "nothing-matches".to_string(),
        status: StatusFilter::All,
    };

    assert!(state.visible(&projects).is_empty());
    let page = render(&projects, &state);
    assert!(page.contains("No projects found."));
    assert!(page.contains("Create your first project"));

    state.clear();
    assert_eq!(state.visible(&projects).len(), projects.len());
    assert!(!render(&projects, &state).contains("No projects found."));
}

#[test]
fn test_search_is_case_insensitive_on_name_and_host() {
    let projects = projects();
    assert_eq!(filter(&projects, "blog", StatusFilter::All)[0].id, "2");
    assert_eq!(filter(&projects, "EXAMPLE.COM", StatusFilter::All)[0].id, "2");
    assert_eq!(filter(&projects, "10.0.0", StatusFilter::Active).len(), 1);
}

#[test]
fn test_status_filters() {
    let projects = projects();
    let active = filter(&projects, "", StatusFilter::Active);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].last_deployment_status, Some(DeploymentStatus::Success));
    assert_eq!(filter(&projects, "", StatusFilter::Failed)[0].name(), "Blog");
}

#[test]
fn test_render_shows_counts() {
    let page = render(&projects(), &ListState::default());
    assert!(page.contains("repositories"));
    assert!(page.contains("shop-api"));
    assert!(page.contains("Healthy"));
    assert!(page.contains("Never"));
}
