//! Listing, filtering and name lookup over the registry.

use std::path::Path;
use tracing::{debug, instrument};

use crate::context::ProjectContext;
use crate::error::{ProjectError, ProjectResult};
use crate::model::{sort_recent_first, Project, ProjectSummary};
use crate::registry::RegistryStore;
use crate::{LIST_LIMIT, NOT_CONFIGURED};

/// Registry contents, or the message to show instead.
#[derive(Debug)]
pub enum Listing {
    /// Nothing to query; the text explains why.
    Message(String),
    /// At least one project.
    Entries(Vec<Project>),
}

/// Load the registry for a read-only query.
///
/// Sidecar writes are atomic renames, so no lock is taken here.
pub fn load_listing(ctx: &ProjectContext) -> ProjectResult<Listing> {
    let Some(project_dir) = ctx.project_dir() else {
        return Ok(Listing::Message(NOT_CONFIGURED.to_string()));
    };
    let store = RegistryStore::new(project_dir);

    match store.load()? {
        None => Ok(Listing::Message(missing_registry_message(&store))),
        Some(projects) if projects.is_empty() => Ok(Listing::Message(format!(
            "No projects found in {}",
            store.path().display()
        ))),
        Some(projects) => Ok(Listing::Entries(projects)),
    }
}

/// Guidance shown when no sidecar exists yet.
pub fn missing_registry_message(store: &RegistryStore) -> String {
    format!(
        "No registry file found at {}. Run 'scan' operation first to generate the projects list.",
        store.path().display()
    )
}

fn most_recent(mut projects: Vec<Project>) -> Vec<ProjectSummary> {
    sort_recent_first(&mut projects);
    projects
        .iter()
        .take(LIST_LIMIT)
        .map(Project::summary)
        .collect()
}

/// The most recently modified projects as an indented JSON array.
#[instrument(skip_all, fields(op_id = %ctx.operation_id))]
pub fn list_projects(ctx: &ProjectContext) -> ProjectResult<String> {
    let projects = match load_listing(ctx)? {
        Listing::Message(msg) => return Ok(msg),
        Listing::Entries(projects) => projects,
    };

    let summaries = most_recent(projects);
    debug!(shown = summaries.len(), "Listing projects");
    Ok(serde_json::to_string_pretty(&summaries)?)
}

/// Criteria for [`filter_projects`]. All given criteria must hold.
///
/// Tempo values of zero or below count as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    /// Whole-number tempo.
    pub bpm: Option<f64>,
    /// Lowest tempo, inclusive.
    pub min_bpm: Option<f64>,
    /// Highest tempo, inclusive.
    pub max_bpm: Option<f64>,
}

impl FilterCriteria {
    /// Whether `project` satisfies every criterion.
    pub fn matches(&self, project: &Project) -> bool {
        let positive = |v: Option<f64>| v.filter(|v| *v > 0.0);

        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            if !project.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        if let Some(bpm) = positive(self.bpm) {
            if project.bpm.trunc() != bpm {
                return false;
            }
        }
        if let Some(min) = positive(self.min_bpm) {
            if project.bpm < min {
                return false;
            }
        }
        if let Some(max) = positive(self.max_bpm) {
            if project.bpm > max {
                return false;
            }
        }
        true
    }
}

/// Projects matching `criteria`, most recent first.
#[instrument(skip_all, fields(op_id = %ctx.operation_id, ?criteria))]
pub fn filter_projects(ctx: &ProjectContext, criteria: &FilterCriteria) -> ProjectResult<String> {
    let projects = match load_listing(ctx)? {
        Listing::Message(msg) => return Ok(msg),
        Listing::Entries(projects) => projects,
    };

    let matched: Vec<Project> = projects
        .into_iter()
        .filter(|p| criteria.matches(p))
        .collect();
    if matched.is_empty() {
        return Ok("No projects match the filter criteria".to_string());
    }

    let total = matched.len();
    let summaries = most_recent(matched);
    Ok(format!(
        "Found {} projects matching filters, showing {} most recent:\n{}",
        total,
        summaries.len(),
        serde_json::to_string_pretty(&summaries)?
    ))
}

fn describe(project: &Project) -> String {
    format!("{} ({})", project.name, project.path.display())
}

/// Find the index of the project called `query`.
///
/// An exact case-insensitive name match wins. Otherwise a single
/// case-insensitive substring match is accepted; several are ambiguous.
pub fn resolve_by_name(projects: &[Project], query: &str) -> ProjectResult<usize> {
    let needle = query.to_lowercase();

    let exact: Vec<usize> = projects
        .iter()
        .enumerate()
        .filter(|(_, p)| p.name.to_lowercase() == needle)
        .map(|(i, _)| i)
        .collect();
    let candidates = if exact.is_empty() {
        projects
            .iter()
            .enumerate()
            .filter(|(_, p)| p.name.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect()
    } else {
        exact
    };

    match candidates.as_slice() {
        [] => Err(ProjectError::NotFound {
            what: "project",
            query: query.to_string(),
        }),
        [index] => Ok(*index),
        many => Err(ProjectError::Ambiguous {
            query: query.to_string(),
            candidates: many.iter().map(|i| describe(&projects[*i])).collect(),
        }),
    }
}

/// Whether `path` names a project file.
pub fn is_project_file(path: &Path) -> bool {
    riff_common_fs::has_extension(path, riff_config::PROJECT_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use riff_config::Settings;
    use std::path::PathBuf;
    use tempfile::tempdir;
    use test_case::test_case;

    fn project(name: &str, bpm: f64, ts: i64) -> Project {
        Project {
            name: name.to_string(),
            path: PathBuf::from(format!("/p/{name}/{name}.RPP")),
            last_modified: Utc.timestamp_opt(ts, 0).unwrap(),
            size: 1,
            bpm,
        }
    }

    fn library() -> Vec<Project> {
        vec![
            project("Mash", 120.0, 10),
            project("mash up", 92.7, 20),
            project("Rich Daddy", 140.0, 30),
            project("China girl", 0.0, 40),
        ]
    }

    fn criteria(name: Option<&str>, bpm: f64, min: f64, max: f64) -> FilterCriteria {
        FilterCriteria {
            name: name.map(String::from),
            bpm: Some(bpm),
            min_bpm: Some(min),
            max_bpm: Some(max),
        }
    }

    #[test_case(criteria(Some("MASH"), 0.0, 0.0, 0.0), &["Mash", "mash up"] ; "name substring")]
    #[test_case(criteria(None, 92.0, 0.0, 0.0), &["mash up"] ; "bpm truncates")]
    #[test_case(criteria(None, 0.0, 100.0, 0.0), &["Mash", "Rich Daddy"] ; "min only")]
    #[test_case(criteria(None, 0.0, 0.0, 100.0), &["mash up", "China girl"] ; "max only")]
    #[test_case(criteria(Some("a"), 0.0, 100.0, 130.0), &["Mash"] ; "combined")]
    #[test_case(criteria(None, -5.0, -1.0, 0.0), &["Mash", "mash up", "Rich Daddy", "China girl"] ; "non positive ignored")]
    fn test_filter_criteria(criteria: FilterCriteria, expected: &[&str]) {
        let names: Vec<_> = library()
            .into_iter()
            .filter(|p| criteria.matches(p))
            .map(|p| p.name)
            .collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_resolve_prefers_exact_match() {
        assert_eq!(resolve_by_name(&library(), "mash").unwrap(), 0);
        assert_eq!(resolve_by_name(&library(), "rich").unwrap(), 2);
    }

    #[test]
    fn test_resolve_reports_ambiguity() {
        let err = resolve_by_name(&library(), "as").unwrap_err();
        match err {
            ProjectError::Ambiguous { candidates, .. } => {
                assert_eq!(candidates.len(), 2);
                assert!(candidates[0].starts_with("Mash ("));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_resolve_not_found() {
        let err = resolve_by_name(&library(), "zzz").unwrap_err();
        assert_eq!(err.to_string(), "project not found: zzz");
    }

    #[test]
    fn test_list_without_registry_mentions_scan() {
        let dir = tempdir().unwrap();
        let ctx = ProjectContext::new(Settings::configured(dir.path(), dir.path()));
        let msg = list_projects(&ctx).unwrap();
        assert!(msg.contains("Run 'scan'"));
    }

    #[test]
    fn test_list_unconfigured_is_guidance() {
        let ctx = ProjectContext::new(Settings::default());
        assert_eq!(list_projects(&ctx).unwrap(), NOT_CONFIGURED);
    }

    #[test]
    fn test_list_empty_registry() {
        let dir = tempdir().unwrap();
        RegistryStore::new(dir.path()).save(&[]).unwrap();
        let ctx = ProjectContext::new(Settings::configured(dir.path(), dir.path()));
        assert!(list_projects(&ctx).unwrap().starts_with("No projects found in "));
    }

    #[test]
    fn test_filter_output_header() {
        let dir = tempdir().unwrap();
        RegistryStore::new(dir.path()).save(&library()).unwrap();
        let ctx = ProjectContext::new(Settings::configured(dir.path(), dir.path()));

        let out = filter_projects(&ctx, &criteria(Some("mash"), 0.0, 0.0, 0.0)).unwrap();
        let (header, json) = out.split_once('\n').unwrap();
        assert_eq!(header, "Found 2 projects matching filters, showing 2 most recent:");
        let rows: Vec<ProjectSummary> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].name, "mash up");

        let none = filter_projects(&ctx, &criteria(Some("zzz-nonexistent"), 0.0, 0.0, 0.0)).unwrap();
        assert_eq!(none, "No projects match the filter criteria");
    }
}
