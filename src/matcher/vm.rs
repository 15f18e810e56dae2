//! Backtracking search engine
//!
//! Runs a compiled [`Program`] over a graph store. Every open alternative
//! (a union branch, one more loop iteration, the remaining neighbours of a
//! vertex) sits on an explicit choice stack, so the search suspends after
//! each yielded path and resumes where it stopped on the next pull.
//!
//! Shortest search prefixes run the same engine by iterative deepening:
//! round `L` only accepts paths of exactly `L` edges, and deepening stops
//! once the controller is satisfied or no thread tried to go past `L`.

use crate::config::{MatchConfig, SearchScope};
use crate::graph::{EdgeId, ElementId, GraphStore, VertexId};
use crate::matcher::bindings::{Bindings, BoundElement, LocalBindings, PathBinding, Scope};
use crate::matcher::expr::holds;
use crate::matcher::mode::{admissible, PartialPath};
use crate::matcher::program::{Inst, Program};
use crate::matcher::search::SearchController;
use crate::matcher::MatchStats;
use crate::query::{EdgePattern, Expression, LabelExpression, NodePattern, PathMode};
use crate::types::PropertyValue;
use smallvec::SmallVec;
use std::collections::HashMap;
use tracing::{trace, warn};

type Neighbors<'a> = Box<dyn Iterator<Item = (EdgeId, VertexId)> + 'a>;

#[derive(Debug, Clone, Copy)]
struct Counter {
    count: u64,
    /// Path length when the current iteration started
    edges_at_start: usize,
}

#[derive(Debug, Clone, Copy)]
struct GroupFrame {
    group: usize,
    vertex_start: usize,
    edge_start: usize,
}

/// Group variable bound during the iteration that is still open at `depth`
#[derive(Debug, Clone, Copy)]
struct IterationBinding<'a> {
    name: &'a str,
    element: ElementId,
    depth: usize,
}

#[derive(Debug, Clone)]
struct Thread<'a> {
    pc: usize,
    vertices: SmallVec<[VertexId; 8]>,
    edges: SmallVec<[EdgeId; 8]>,
    bindings: LocalBindings<'a>,
    counters: SmallVec<[Counter; 2]>,
    groups: SmallVec<[GroupFrame; 2]>,
    iteration: SmallVec<[IterationBinding<'a>; 4]>,
}

impl<'a> Thread<'a> {
    fn start(vertex: VertexId, bindings: LocalBindings<'a>) -> Self {
        let mut vertices = SmallVec::new();
        vertices.push(vertex);
        Self {
            pc: 0,
            vertices,
            edges: SmallVec::new(),
            bindings,
            counters: SmallVec::new(),
            groups: SmallVec::new(),
            iteration: SmallVec::new(),
        }
    }

    fn current(&self) -> VertexId {
        self.vertices[self.vertices.len() - 1]
    }

    /// Element a group variable already took in the current iteration
    fn iteration_element(&self, name: Option<&str>, grouped: bool) -> Option<ElementId> {
        let name = name.filter(|_| grouped)?;
        self.iteration
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.element)
    }

    /// Group variables get one element per iteration, however often they
    /// appear inside it
    fn bind(&mut self, name: &'a str, element: ElementId, grouped: bool) {
        if !grouped {
            self.bindings.entry(name).or_insert_with(|| element.into());
            return;
        }
        if self.iteration_element(Some(name), true).is_some() {
            return;
        }
        self.iteration.push(IterationBinding {
            name,
            element,
            depth: self.counters.len(),
        });
        if let BoundElement::Group(items) = self
            .bindings
            .entry(name)
            .or_insert_with(|| BoundElement::Group(Vec::new()))
        {
            items.push(element);
        }
    }

    /// Forget bindings of the iteration ending at the innermost loop
    fn end_iteration(&mut self) {
        let depth = self.counters.len();
        self.iteration.retain(|b| b.depth < depth);
    }
}

enum Choice<'a> {
    /// Continue a suspended thread
    Resume(Thread<'a>),
    /// Remaining neighbours for an edge step taken by `thread`
    Edges {
        thread: Thread<'a>,
        pattern: &'a EdgePattern,
        grouped: bool,
        candidates: Neighbors<'a>,
    },
}

/// State shared by every path search of one match call
pub(crate) struct RunContext<'c> {
    pub config: &'c MatchConfig,
    pub seed: &'c Bindings,
    pub stats: &'c mut MatchStats,
    pub truncated: &'c mut bool,
}

/// A path accepted by the search controller
#[derive(Debug, Clone)]
pub(crate) struct Solution<'a> {
    pub bindings: LocalBindings<'a>,
    pub path: PathBinding,
}

/// Element filler shared by node and edge patterns
struct Filler<'p> {
    variable: Option<&'p str>,
    label_expr: Option<&'p LabelExpression>,
    properties: &'p [(String, PropertyValue)],
    where_clause: Option<&'p Expression>,
}

impl<'p> Filler<'p> {
    fn node(pattern: &'p NodePattern) -> Self {
        Self {
            variable: pattern.variable.as_deref(),
            label_expr: pattern.label_expr.as_ref(),
            properties: &pattern.properties,
            where_clause: pattern.where_clause.as_deref(),
        }
    }

    fn edge(pattern: &'p EdgePattern) -> Self {
        Self {
            variable: pattern.variable.as_deref(),
            label_expr: pattern.label_expr.as_ref(),
            properties: &pattern.properties,
            where_clause: pattern.where_clause.as_deref(),
        }
    }

    fn matches<G: GraphStore + ?Sized>(
        &self,
        store: &G,
        element: ElementId,
        grouped: bool,
        earlier: Option<ElementId>,
        bindings: &LocalBindings<'_>,
        seed: &Bindings,
    ) -> bool {
        // A variable already bound must name the same element: singletons
        // across the whole match, group variables within one iteration
        if grouped {
            if earlier.map_or(false, |e| e != element) {
                return false;
            }
        } else if let Some(name) = self.variable {
            if let Some(bound) = bindings.get(name).or_else(|| seed.get(name)) {
                if *bound != BoundElement::from(element) {
                    return false;
                }
            }
        }

        if let Some(expr) = self.label_expr {
            match store.labels_of(element) {
                Some(labels) if expr.matches(labels) => {}
                _ => return false,
            }
        }

        if !self.properties.is_empty() {
            let Some(props) = store.properties_of(element) else {
                return false;
            };
            let all_equal = self.properties.iter().all(|(key, expected)| {
                !expected.is_null() && props.get(key).map_or(false, |v| v.loose_eq(expected))
            });
            if !all_equal {
                return false;
            }
        }

        match self.where_clause {
            Some(expr) => {
                let scope = Scope::new(bindings, seed)
                    .with_candidate(self.variable, element)
                    .latest(grouped);
                holds(expr, &scope, store)
            }
            None => true,
        }
    }
}

/// Bind a path variable; fails when it is already bound to another path
fn bind_path<'a>(
    bindings: &mut LocalBindings<'a>,
    seed: &Bindings,
    name: &'a str,
    path: PathBinding,
) -> bool {
    let bound = BoundElement::Path(path);
    match bindings.get(name).or_else(|| seed.get(name)) {
        Some(existing) => *existing == bound,
        None => {
            bindings.insert(name, bound);
            true
        }
    }
}

/// Vertices a search may start from
fn start_vertices<'a, G: GraphStore + ?Sized>(
    program: &Program<'a>,
    store: &'a G,
    base: &LocalBindings<'a>,
    seed: &Bindings,
) -> Box<dyn Iterator<Item = VertexId> + 'a> {
    if let Some(node) = program.leading_node() {
        if let Some(name) = node.variable.as_deref() {
            if let Some(bound) = base.get(name).or_else(|| seed.get(name)) {
                return match bound.as_vertex() {
                    Some(v) if store.contains_vertex(v) => Box::new(std::iter::once(v)),
                    _ => Box::new(std::iter::empty()),
                };
            }
        }
        if let Some(LabelExpression::Label(label)) = &node.label_expr {
            return store.vertices_with_label(label);
        }
    }
    store.vertices()
}

/// Lazy search for one path pattern, seeded with bindings from the
/// patterns joined before it
pub(crate) struct PathSearch<'a, G: ?Sized> {
    store: &'a G,
    base: LocalBindings<'a>,
    starts: Box<dyn Iterator<Item = VertexId> + 'a>,
    choices: Vec<Choice<'a>>,
    /// Edge cap for the current round
    limit: usize,
    /// Shortest prefixes only accept paths of exactly `limit` edges
    exact: bool,
    /// Some thread wanted an edge beyond `limit` this round
    blocked: bool,
    global: SearchController,
    per_endpoints: Option<HashMap<(VertexId, VertexId), SearchController>>,
    done: bool,
}

impl<'a, G: GraphStore + ?Sized> PathSearch<'a, G> {
    pub fn new(
        program: &Program<'a>,
        store: &'a G,
        base: LocalBindings<'a>,
        ctx: &mut RunContext<'_>,
    ) -> Self {
        let cap = ctx.config.max_path_length;
        let exact = program.search().is_shortest();
        let global = SearchController::new(program.search(), ctx.config.shortest_ties);
        let per_endpoints = match ctx.config.search_scope {
            SearchScope::Global => None,
            SearchScope::PerEndpoints => Some(HashMap::new()),
        };

        let mut done = global.is_terminated();
        let limit = if exact {
            let min = usize::try_from(program.min_len).unwrap_or(usize::MAX);
            if min > cap && !done {
                *ctx.truncated = true;
                warn!(min_len = min, max_path_length = cap, "pattern needs more edges than the length cap allows");
                done = true;
            }
            min.min(cap)
        } else {
            cap
        };

        let starts = start_vertices(program, store, &base, ctx.seed);
        Self {
            store,
            base,
            starts,
            choices: Vec::new(),
            limit,
            exact,
            blocked: false,
            global,
            per_endpoints,
            done,
        }
    }

    /// Next accepted path, or `None` once the search is exhausted
    pub fn next(&mut self, program: &Program<'a>, ctx: &mut RunContext<'_>) -> Option<Solution<'a>> {
        loop {
            if self.done {
                return None;
            }
            let thread = match self.choices.pop() {
                Some(Choice::Resume(thread)) => thread,
                Some(Choice::Edges {
                    thread,
                    pattern,
                    grouped,
                    mut candidates,
                }) => match self.advance(program, ctx, &thread, pattern, grouped, &mut candidates) {
                    Some(next) => {
                        self.choices.push(Choice::Edges {
                            thread,
                            pattern,
                            grouped,
                            candidates,
                        });
                        next
                    }
                    None => continue,
                },
                None => match self.starts.next() {
                    Some(start) => {
                        ctx.stats.starts_tried += 1;
                        Thread::start(start, self.base.clone())
                    }
                    None => {
                        self.next_round(program, ctx);
                        continue;
                    }
                },
            };
            if let Some(solution) = self.run(thread, program, ctx) {
                return Some(solution);
            }
        }
    }

    /// Pull candidates until one passes every check
    fn advance(
        &mut self,
        program: &Program<'a>,
        ctx: &mut RunContext<'_>,
        thread: &Thread<'a>,
        pattern: &'a EdgePattern,
        grouped: bool,
        candidates: &mut Neighbors<'a>,
    ) -> Option<Thread<'a>> {
        let filler = Filler::edge(pattern);
        for (edge, target) in candidates {
            if let Some(max_steps) = ctx.config.max_steps {
                if ctx.stats.edges_expanded >= max_steps {
                    *ctx.truncated = true;
                    warn!(max_steps, "path search truncated by the step cap");
                    self.done = true;
                    return None;
                }
            }
            ctx.stats.edges_expanded += 1;

            let earlier = thread.iteration_element(filler.variable, grouped);
            if !self.step_admissible(program, thread, edge, target)
                || !filler.matches(self.store, edge.into(), grouped, earlier, &thread.bindings, ctx.seed)
            {
                ctx.stats.branches_pruned += 1;
                continue;
            }

            let mut next = thread.clone();
            next.edges.push(edge);
            next.vertices.push(target);
            next.pc += 1;
            if let Some(name) = pattern.variable.as_deref() {
                next.bind(name, edge.into(), grouped);
            }
            return Some(next);
        }
        None
    }

    /// Path mode of the whole pattern and of every open sub-path
    fn step_admissible(&self, program: &Program<'a>, thread: &Thread<'a>, edge: EdgeId, target: VertexId) -> bool {
        let whole = PartialPath::new(&thread.vertices, &thread.edges);
        if !admissible(whole, program.mode(), edge, target) {
            return false;
        }
        thread.groups.iter().all(|frame| {
            let mode = program.groups[frame.group].mode();
            mode == PathMode::Walk
                || admissible(
                    PartialPath::new(
                        &thread.vertices[frame.vertex_start..],
                        &thread.edges[frame.edge_start..],
                    ),
                    mode,
                    edge,
                    target,
                )
        })
    }

    /// Execute until the thread fails, suspends on an edge step or matches
    fn run(
        &mut self,
        mut thread: Thread<'a>,
        program: &Program<'a>,
        ctx: &mut RunContext<'_>,
    ) -> Option<Solution<'a>> {
        loop {
            match &program.insts[thread.pc] {
                Inst::Node { pattern, grouped } => {
                    let pattern = *pattern;
                    let vertex = thread.current();
                    let filler = Filler::node(pattern);
                    let earlier = thread.iteration_element(filler.variable, *grouped);
                    if !filler.matches(self.store, vertex.into(), *grouped, earlier, &thread.bindings, ctx.seed) {
                        ctx.stats.branches_pruned += 1;
                        return None;
                    }
                    if let Some(name) = pattern.variable.as_deref() {
                        thread.bind(name, vertex.into(), *grouped);
                    }
                    thread.pc += 1;
                }
                Inst::Edge { pattern, grouped } => {
                    let pattern = *pattern;
                    if thread.edges.len() >= self.limit {
                        self.blocked = true;
                        ctx.stats.branches_pruned += 1;
                        return None;
                    }
                    let candidates = self.store.neighbors(thread.current(), pattern.direction);
                    self.choices.push(Choice::Edges {
                        thread,
                        pattern,
                        grouped: *grouped,
                        candidates,
                    });
                    return None;
                }
                Inst::Split(first, second) => {
                    let mut alternative = thread.clone();
                    alternative.pc = *second;
                    self.choices.push(Choice::Resume(alternative));
                    thread.pc = *first;
                }
                Inst::Jump(target) => thread.pc = *target,
                Inst::RepeatEnter => {
                    let edges_at_start = thread.edges.len();
                    thread.counters.push(Counter {
                        count: 0,
                        edges_at_start,
                    });
                    thread.pc += 1;
                }
                Inst::RepeatLoop {
                    min,
                    max,
                    body,
                    exit,
                } => {
                    let edges_at_start = thread.edges.len();
                    let counter = thread.counters.last_mut()?;
                    counter.edges_at_start = edges_at_start;
                    if counter.count < *min {
                        thread.pc = *body;
                    } else if *max == Some(counter.count) {
                        thread.pc = *exit;
                    } else {
                        // Fewer repetitions first: leave now, iterate again on backtrack
                        let mut again = thread.clone();
                        again.pc = *body;
                        self.choices.push(Choice::Resume(again));
                        thread.pc = *exit;
                    }
                }
                Inst::RepeatIter { head, min } => {
                    thread.end_iteration();
                    let edges = thread.edges.len();
                    let counter = thread.counters.last_mut()?;
                    counter.count += 1;
                    if counter.count > *min && edges == counter.edges_at_start {
                        ctx.stats.branches_pruned += 1;
                        return None;
                    }
                    thread.pc = *head;
                }
                Inst::RepeatExit => {
                    thread.counters.pop();
                    thread.pc += 1;
                }
                Inst::GroupEnter { group } => {
                    thread.groups.push(GroupFrame {
                        group: *group,
                        vertex_start: thread.vertices.len() - 1,
                        edge_start: thread.edges.len(),
                    });
                    thread.pc += 1;
                }
                Inst::GroupExit { group } => {
                    let frame = thread.groups.pop()?;
                    let group = &program.groups[*group];
                    if let Some(name) = group.pattern.subpath_variable.as_deref() {
                        let sub = PathBinding::new(
                            thread.vertices[frame.vertex_start..].to_vec(),
                            thread.edges[frame.edge_start..].to_vec(),
                        );
                        if !bind_path(&mut thread.bindings, ctx.seed, name, sub) {
                            ctx.stats.branches_pruned += 1;
                            return None;
                        }
                    }
                    if let Some(expr) = &group.pattern.where_clause {
                        let scope = Scope::new(&thread.bindings, ctx.seed).latest(group.grouped);
                        if !holds(expr, &scope, self.store) {
                            ctx.stats.branches_pruned += 1;
                            return None;
                        }
                    }
                    thread.pc += 1;
                }
                Inst::Match => return self.accept(thread, program, ctx),
            }
        }
    }

    fn accept(
        &mut self,
        thread: Thread<'a>,
        program: &Program<'a>,
        ctx: &mut RunContext<'_>,
    ) -> Option<Solution<'a>> {
        let len = thread.edges.len();
        // Shorter paths were yielded by an earlier round
        if self.exact && len != self.limit {
            return None;
        }

        let mut bindings = thread.bindings;
        for &(name, _) in &program.group_vars {
            bindings
                .entry(name)
                .or_insert_with(|| BoundElement::Group(Vec::new()));
            if let Some(seeded) = ctx.seed.get(name) {
                if bindings.get(name) != Some(seeded) {
                    ctx.stats.branches_pruned += 1;
                    return None;
                }
            }
        }

        let path = PathBinding::new(thread.vertices.to_vec(), thread.edges.to_vec());
        if let Some(name) = program.pattern.variable.as_deref() {
            if !bind_path(&mut bindings, ctx.seed, name, path.clone()) {
                ctx.stats.branches_pruned += 1;
                return None;
            }
        }

        let controller = match &mut self.per_endpoints {
            Some(controllers) => {
                let key = (thread.vertices[0], thread.vertices[len]);
                controllers
                    .entry(key)
                    .or_insert_with(|| SearchController::new(program.search(), ctx.config.shortest_ties))
            }
            None => &mut self.global,
        };
        if !controller.offer(len) {
            return None;
        }
        if self.global_done() {
            self.done = true;
        }
        Some(Solution { bindings, path })
    }

    /// Called when every thread of the current round is exhausted
    fn next_round(&mut self, program: &Program<'a>, ctx: &mut RunContext<'_>) {
        let cap = ctx.config.max_path_length;
        if !self.exact {
            if self.blocked {
                *ctx.truncated = true;
                warn!(max_path_length = cap, "path search truncated by the length cap");
            }
            self.done = true;
            return;
        }

        let explored = self.limit;
        self.global.end_length_class(explored);
        if let Some(controllers) = &mut self.per_endpoints {
            for controller in controllers.values_mut() {
                controller.end_length_class(explored);
            }
        }
        trace!(length = explored, blocked = self.blocked, "length class explored");

        if self.global_done() || self.every_pair_done(program, ctx) || !self.blocked {
            self.done = true;
            return;
        }
        if explored >= cap {
            *ctx.truncated = true;
            warn!(max_path_length = cap, "shortest path search truncated by the length cap");
            self.done = true;
            return;
        }

        self.limit = explored + 1;
        self.blocked = false;
        self.starts = start_vertices(program, self.store, &self.base, ctx.seed);
    }

    fn global_done(&self) -> bool {
        self.per_endpoints.is_none() && self.global.is_terminated()
    }

    /// Every (start, end) pair the pattern can produce already has a
    /// terminated controller, so deeper rounds cannot yield anything
    fn every_pair_done(&self, program: &Program<'a>, ctx: &RunContext<'_>) -> bool {
        let Some(controllers) = &self.per_endpoints else {
            return false;
        };
        if controllers.is_empty() || !controllers.values().all(SearchController::is_terminated) {
            return false;
        }
        let starts = start_vertices(program, self.store, &self.base, ctx.seed).count();
        let pairs = starts.saturating_mul(self.store.vertices().count());
        controllers.len() >= pairs
    }
}
