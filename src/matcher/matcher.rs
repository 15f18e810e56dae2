//! Pattern matcher entry point
//!
//! `PathMatcher` validates and compiles a pattern up front, then hands out a
//! lazy `MatchIter`. Comma-separated path patterns are joined by a nested
//! loop: each result of one path pattern seeds the search of the next, so
//! shared variables are joined by element identity.

use crate::config::MatchConfig;
use crate::error::Result;
use crate::graph::{EdgeId, GraphStore, VertexId};
use crate::matcher::bindings::{Bindings, BoundElement, LocalBindings, PathBinding, Scope};
use crate::matcher::expr::holds;
use crate::matcher::program::Program;
use crate::matcher::vm::{PathSearch, RunContext};
use crate::query::{Expression, GraphPattern, MatchMode, PathPattern, PatternValidator};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// One match: ordered variable bindings plus the matched path of every
/// path pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub bindings: Bindings,
    pub paths: Vec<PathBinding>,
}

impl MatchResult {
    pub fn get(&self, name: &str) -> Option<&BoundElement> {
        self.bindings.get(name)
    }

    pub fn vertex(&self, name: &str) -> Option<VertexId> {
        self.get(name).and_then(BoundElement::as_vertex)
    }

    pub fn edge(&self, name: &str) -> Option<EdgeId> {
        self.get(name).and_then(BoundElement::as_edge)
    }

    /// Path matched by the first path pattern
    pub fn path(&self) -> Option<&PathBinding> {
        self.paths.first()
    }
}

/// Per-call search counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    /// Start vertices tried, over all path patterns and rounds
    pub starts_tried: u64,
    /// Candidate edges pulled from the store
    pub edges_expanded: u64,
    /// Branches rejected by a filter, mode or cap
    pub branches_pruned: u64,
    /// Results handed to the caller
    pub results_yielded: u64,
}

/// Pattern matcher over a graph store
pub struct PathMatcher<'a, G: ?Sized> {
    store: &'a G,
    config: MatchConfig,
}

impl<'a, G: GraphStore + ?Sized> PathMatcher<'a, G> {
    pub fn new(store: &'a G) -> Self {
        Self::with_config(store, MatchConfig::default())
    }

    pub fn with_config(store: &'a G, config: MatchConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Match a graph pattern. Validation errors are returned here, before
    /// any search work; the iterator itself never fails.
    pub fn match_pattern(
        &self,
        pattern: &'a GraphPattern,
        bindings_in: Bindings,
    ) -> Result<MatchIter<'a, G>> {
        self.validate(pattern, &bindings_in)?;
        debug!(pattern = %pattern, seeded = bindings_in.len(), "starting graph pattern match");

        let different_edges = pattern.match_mode == Some(MatchMode::DifferentEdges);
        Ok(self.build(
            pattern.paths.iter(),
            pattern.where_clause.as_ref(),
            different_edges,
            bindings_in,
        ))
    }

    /// Match a single path pattern
    pub fn match_path(&self, path: &'a PathPattern, bindings_in: Bindings) -> Result<MatchIter<'a, G>> {
        let wrapper = GraphPattern::new().with_path(path.clone());
        self.validate(&wrapper, &bindings_in)?;
        debug!(path = %path, seeded = bindings_in.len(), "starting path pattern match");
        Ok(self.build(std::iter::once(path), None, false, bindings_in))
    }

    fn validate(&self, pattern: &GraphPattern, bindings_in: &Bindings) -> Result<()> {
        let mut validator = PatternValidator::new(self.store, self.config.strict_catalog);
        for (name, bound) in bindings_in {
            if let Some(kind) = bound.kind() {
                validator = validator.with_bound(name, kind);
            }
        }
        validator.validate(pattern).map(|_| ())
    }

    fn build(
        &self,
        paths: impl Iterator<Item = &'a PathPattern>,
        where_clause: Option<&'a Expression>,
        different_edges: bool,
        seed: Bindings,
    ) -> MatchIter<'a, G> {
        let programs: Vec<Program<'a>> = paths
            .map(|path| {
                let program = Program::compile(path);
                debug!(
                    mode = %program.mode(),
                    search = %program.search(),
                    min_len = program.min_len,
                    max_len = ?program.max_len,
                    insts = program.insts.len(),
                    "compiled path pattern"
                );
                program
            })
            .collect();

        MatchIter {
            store: self.store,
            config: self.config.clone(),
            seed,
            finished: programs.is_empty(),
            programs,
            searches: Vec::new(),
            paths: Vec::new(),
            where_clause,
            different_edges,
            stats: MatchStats::default(),
            truncated: false,
            started: false,
        }
    }
}

/// Lazy sequence of match results.
///
/// Dropping the iterator abandons the search.
pub struct MatchIter<'a, G: ?Sized> {
    store: &'a G,
    config: MatchConfig,
    seed: Bindings,
    programs: Vec<Program<'a>>,
    /// One open search per joined path pattern
    searches: Vec<PathSearch<'a, G>>,
    /// Current path of every open search
    paths: Vec<PathBinding>,
    where_clause: Option<&'a Expression>,
    different_edges: bool,
    stats: MatchStats,
    truncated: bool,
    started: bool,
    finished: bool,
}

impl<'a, G: GraphStore + ?Sized> MatchIter<'a, G> {
    pub fn stats(&self) -> MatchStats {
        self.stats
    }

    /// Whether the depth or step cap cut the search short
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl<'a, G: GraphStore + ?Sized> Iterator for MatchIter<'a, G> {
    type Item = MatchResult;

    fn next(&mut self) -> Option<MatchResult> {
        let MatchIter {
            store,
            config,
            seed,
            programs,
            searches,
            paths,
            where_clause,
            different_edges,
            stats,
            truncated,
            started,
            finished,
        } = self;

        loop {
            let out_of_steps = config
                .max_steps
                .map_or(false, |max| *truncated && stats.edges_expanded >= max);
            if *finished || out_of_steps {
                *finished = true;
                return None;
            }
            let mut ctx = RunContext {
                config: &*config,
                seed: &*seed,
                stats: &mut *stats,
                truncated: &mut *truncated,
            };

            if searches.is_empty() {
                if *started {
                    *finished = true;
                    return None;
                }
                *started = true;
                searches.push(PathSearch::new(&programs[0], *store, LocalBindings::new(), &mut ctx));
            }

            let level = searches.len() - 1;
            match searches[level].next(&programs[level], &mut ctx) {
                None => {
                    searches.pop();
                    paths.truncate(level);
                }
                Some(solution) => {
                    paths.truncate(level);
                    paths.push(solution.path);
                    if level + 1 < programs.len() {
                        let next = PathSearch::new(&programs[level + 1], *store, solution.bindings, &mut ctx);
                        searches.push(next);
                        continue;
                    }

                    if let Some(expr) = *where_clause {
                        if !holds(expr, &Scope::new(&solution.bindings, &*seed), *store) {
                            stats.branches_pruned += 1;
                            continue;
                        }
                    }
                    if *different_edges && reuses_edge(paths) {
                        stats.branches_pruned += 1;
                        continue;
                    }

                    let mut bindings = seed.clone();
                    for (name, bound) in solution.bindings {
                        bindings.insert(name.to_string(), bound);
                    }
                    stats.results_yielded += 1;
                    return Some(MatchResult {
                        bindings,
                        paths: paths.clone(),
                    });
                }
            }
        }
    }
}

fn reuses_edge(paths: &[PathBinding]) -> bool {
    let mut seen = HashSet::new();
    paths.iter().flat_map(|p| &p.edges).any(|e| !seen.insert(*e))
}
