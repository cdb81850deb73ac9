//! Route-template resolution: mapping a concrete request path to a permission
//! catalog entry.
//!
//! Templates are compiled once per catalog load into a [`RouteTable`]:
//! an exact-match index over the literal template strings plus the compiled
//! templates in ascending-id (creation) order for the pattern phase. Matching
//! is first-match-wins over creation order; two overlapping templates resolve
//! to the older one.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use warden_core::PermissionId;

/// An active permission catalog record, as loaded for matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: PermissionId,
    pub name: String,
    pub url_template: String,
    /// Recorded for auditing; route matching is on path alone.
    pub http_method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A parsed URL template: an ordered list of literal and `:param` segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(raw: &str) -> Self {
        let segments = split_path(raw)
            .map(|seg| match seg.strip_prefix(':') {
                Some(name) if !name.is_empty() => Segment::Param(name.to_string()),
                _ => Segment::Literal(seg.to_string()),
            })
            .collect();

        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn has_params(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Param(_)))
    }

    /// Placeholder names in template order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Whether `path` matches this template start-to-end.
    ///
    /// A `:param` segment matches exactly one non-empty path segment.
    pub fn matches(&self, path: &str) -> bool {
        let mut segments = self.segments.iter();
        let mut parts = split_path(path);

        loop {
            match (segments.next(), parts.next()) {
                (None, None) => return true,
                (Some(Segment::Literal(lit)), Some(part)) if lit == part => continue,
                (Some(Segment::Param(_)), Some(part)) if !part.is_empty() => continue,
                _ => return false,
            }
        }
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    trimmed.split('/').filter(move |s| !(trimmed.is_empty() && s.is_empty()))
}

#[derive(Debug, Clone)]
struct CompiledRoute {
    entry: CatalogEntry,
    template: PathTemplate,
}

/// The compiled permission catalog, ready to resolve request paths.
///
/// Rebuilt whenever the catalog changes; resolution itself performs no IO.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    exact: HashMap<String, usize>,
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    /// Compile a table from the active catalog records.
    ///
    /// Entries are ordered by ascending id so overlapping templates keep the
    /// precedence of the oldest record.
    pub fn compile(mut entries: Vec<CatalogEntry>) -> Self {
        entries.sort_by_key(|e| e.id);

        let mut exact = HashMap::with_capacity(entries.len());
        let mut routes = Vec::with_capacity(entries.len());

        for entry in entries {
            let idx = routes.len();
            exact.entry(entry.url_template.clone()).or_insert(idx);
            routes.push(CompiledRoute {
                template: PathTemplate::parse(&entry.url_template),
                entry,
            });
        }

        Self { exact, routes }
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Resolve a request against the catalog.
    ///
    /// Candidates are tried in declared order (original path first, then
    /// normalized variants). The exact phase short-circuits the pattern
    /// phase; the pattern phase walks templates in catalog order and returns
    /// the first template/candidate pair that matches.
    ///
    /// `method` does not filter the match; it is only compared against the
    /// resolved record for trace-level diagnostics.
    pub fn resolve(&self, method: &str, candidates: &[&str]) -> Option<&CatalogEntry> {
        let hit = self.resolve_path(candidates);

        if let Some(entry) = hit {
            if let Some(expected) = &entry.http_method {
                if !expected.eq_ignore_ascii_case(method) {
                    tracing::trace!(
                        permission = %entry.id,
                        expected_method = %expected,
                        request_method = %method,
                        "resolved permission records a different method"
                    );
                }
            }
        }

        hit
    }

    fn resolve_path(&self, candidates: &[&str]) -> Option<&CatalogEntry> {
        for cand in candidates {
            if let Some(&idx) = self.exact.get(*cand) {
                return Some(&self.routes[idx].entry);
            }
        }

        for route in &self.routes {
            for cand in candidates {
                if route.template.matches(cand) {
                    return Some(&route.entry);
                }
            }
        }

        None
    }
}

/// Build the candidate set for a request path: the raw path first, then its
/// trailing-slash twin. Compensates for upstream ambiguity in how the path
/// was captured.
pub fn candidate_paths(path: &str) -> Vec<String> {
    let mut candidates = vec![path.to_string()];

    if path.len() > 1 {
        let twin = match path.strip_suffix('/') {
            Some(stripped) => stripped.to_string(),
            None => format!("{path}/"),
        };
        if twin != path {
            candidates.push(twin);
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, template: &str) -> CatalogEntry {
        CatalogEntry {
            id: PermissionId::new(id),
            name: format!("perm-{id}"),
            url_template: template.to_string(),
            http_method: None,
        }
    }

    fn resolve<'a>(table: &'a RouteTable, path: &str) -> Option<&'a CatalogEntry> {
        let candidates = candidate_paths(path);
        let refs: Vec<&str> = candidates.iter().map(String::as_str).collect();
        table.resolve("GET", &refs)
    }

    #[test]
    fn template_parses_params() {
        let t = PathTemplate::parse("/cid/districts/:id");
        assert!(t.has_params());
        assert!(t.matches("/cid/districts/42"));
        assert!(!t.matches("/cid/districts"));
        assert!(!t.matches("/cid/districts/42/edit"));
        assert!(!t.matches("/cid/districts/"));
    }

    #[test]
    fn literal_template_has_no_params() {
        let t = PathTemplate::parse("/menus");
        assert!(!t.has_params());
        assert!(t.matches("/menus"));
        assert!(!t.matches("/menus/1"));
    }

    #[test]
    fn exact_phase_short_circuits_pattern_phase() {
        // The pattern-capable record is older; an exact hit must still win.
        let table = RouteTable::compile(vec![
            entry(1, "/users/:id"),
            entry(2, "/users/profile"),
        ]);

        let hit = resolve(&table, "/users/profile").unwrap();
        assert_eq!(hit.id, PermissionId::new(2));
    }

    #[test]
    fn pattern_phase_is_first_match_in_creation_order() {
        let table = RouteTable::compile(vec![
            entry(9, "/users/:name"),
            entry(4, "/users/:id"),
        ]);

        // Both templates match; the lower id (older record) wins.
        let hit = resolve(&table, "/users/7").unwrap();
        assert_eq!(hit.id, PermissionId::new(4));
    }

    #[test]
    fn trailing_slash_variant_is_tried() {
        let table = RouteTable::compile(vec![entry(1, "/menus")]);
        assert_eq!(resolve(&table, "/menus/").unwrap().id, PermissionId::new(1));

        let table = RouteTable::compile(vec![entry(2, "/menus/")]);
        assert_eq!(resolve(&table, "/menus").unwrap().id, PermissionId::new(2));
    }

    #[test]
    fn district_scenario_resolves_parameterized_path() {
        let table = RouteTable::compile(vec![
            entry(3, "/cid/categories"),
            entry(7, "/cid/districts/:id"),
        ]);

        let hit = resolve(&table, "/cid/districts/42").unwrap();
        assert_eq!(hit.id, PermissionId::new(7));
    }

    #[test]
    fn unknown_path_returns_none() {
        let table = RouteTable::compile(vec![entry(1, "/menus")]);
        assert!(resolve(&table, "/dashboards").is_none());
    }

    #[test]
    fn resolution_is_deterministic() {
        let table = RouteTable::compile(vec![
            entry(2, "/a/:x"),
            entry(1, "/a/:y"),
            entry(3, "/a/b"),
        ]);

        let first = resolve(&table, "/a/z").map(|e| e.id);
        for _ in 0..10 {
            assert_eq!(resolve(&table, "/a/z").map(|e| e.id), first);
        }
        assert_eq!(first, Some(PermissionId::new(1)));
    }

    #[test]
    fn candidate_paths_orders_raw_first() {
        assert_eq!(candidate_paths("/a/b"), vec!["/a/b", "/a/b/"]);
        assert_eq!(candidate_paths("/a/b/"), vec!["/a/b/", "/a/b"]);
        assert_eq!(candidate_paths("/"), vec!["/"]);
    }

    #[test]
    fn duplicate_templates_prefer_lowest_id() {
        let table = RouteTable::compile(vec![
            entry(8, "/menus"),
            entry(2, "/menus"),
        ]);
        assert_eq!(resolve(&table, "/menus").unwrap().id, PermissionId::new(2));
    }
}
