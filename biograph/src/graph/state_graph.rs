//! State graph: nodes + explicit edges, direct or conditional.
//!
//! Register nodes with `add_node`, pick the first node with `set_entry`, then wire
//! each node with exactly one `add_edge(from, to)` or `add_conditional_edges(from, ..)`.
//! `compile` validates the routing table and returns an immutable `CompiledStateGraph`.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::CompiledStateGraph;
use crate::graph::node::{GraphState, Node};
use crate::graph::{Branch, NodeId, Target};

type RouteFn<S> = dyn Fn(&S) -> Branch + Send + Sync;

/// Router for a conditional edge: the keys it may return plus the routing function.
pub(crate) struct Router<S> {
    pub(crate) keys: Vec<Branch>,
    pub(crate) route: Arc<RouteFn<S>>,
}

impl<S> Clone for Router<S> {
    fn clone(&self) -> Self {
        Self {
            keys: self.keys.clone(),
            route: Arc::clone(&self.route),
        }
    }
}

/// Outgoing edge of one node.
pub(crate) enum Edge<S> {
    Direct(Target),
    Conditional {
        router: Router<S>,
        branches: HashMap<Branch, Target>,
    },
}

impl<S> Clone for Edge<S> {
    fn clone(&self) -> Self {
        match self {
            Edge::Direct(t) => Edge::Direct(*t),
            Edge::Conditional { router, branches } => Edge::Conditional {
                router: router.clone(),
                branches: branches.clone(),
            },
        }
    }
}

impl<S> Edge<S> {
    fn targets(&self) -> Vec<Target> {
        match self {
            Edge::Direct(t) => vec![*t],
            Edge::Conditional { branches, .. } => branches.values().copied().collect(),
        }
    }
}

/// State graph builder, generic over the state type `S`.
///
/// **Interaction**: Accepts `Arc<dyn Node<S>>`; produces `CompiledStateGraph<S>`.
pub struct StateGraph<S> {
    nodes: HashMap<NodeId, Arc<dyn Node<S>>>,
    entry: Option<NodeId>,
    /// Edges in insertion order; duplicates are rejected at compile time.
    edges: Vec<(NodeId, Edge<S>)>,
}

impl<S> Default for StateGraph<S>
where
    S: GraphState,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: GraphState,
{
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            entry: None,
            edges: Vec::new(),
        }
    }

    /// Adds a node under its own id. Replaces an earlier node with the same id.
    pub fn add_node(&mut self, node: Arc<dyn Node<S>>) -> &mut Self {
        self.nodes.insert(node.id(), node);
        self
    }

    /// Sets the node every run starts from.
    pub fn set_entry(&mut self, id: NodeId) -> &mut Self {
        self.entry = Some(id);
        self
    }

    /// Adds an unconditional edge. Use [`END`](crate::graph::END) as `to` for a terminal node.
    pub fn add_edge(&mut self, from: NodeId, to: impl Into<Target>) -> &mut Self {
        self.edges.push((from, Edge::Direct(to.into())));
        self
    }

    /// Adds a conditional edge.
    ///
    /// `keys` is every key `route` can return; `branches` maps each key to its target.
    /// `compile` rejects a key in one set but not the other.
    pub fn add_conditional_edges<F, I, T>(
        &mut self,
        from: NodeId,
        keys: &[Branch],
        route: F,
        branches: I,
    ) -> &mut Self
    where
        F: Fn(&S) -> Branch + Send + Sync + 'static,
        I: IntoIterator<Item = (Branch, T)>,
        T: Into<Target>,
    {
        let branches = branches
            .into_iter()
            .map(|(b, t)| (b, t.into()))
            .collect::<HashMap<_, _>>();
        self.edges.push((
            from,
            Edge::Conditional {
                router: Router {
                    keys: keys.to_vec(),
                    route: Arc::new(route),
                },
                branches,
            },
        ));
        self
    }

    /// Builds the executable graph.
    ///
    /// Checks, in order: entry present and registered; every edge source and target
    /// registered; at most one edge per node; router keys and branch maps agree;
    /// every node has an edge; every node reachable from the entry; no cycles.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        let entry = self.entry.ok_or(CompilationError::MissingEntry)?;
        if !self.nodes.contains_key(&entry) {
            return Err(CompilationError::NodeNotFound(entry));
        }

        let mut edges: HashMap<NodeId, Edge<S>> = HashMap::new();
        for (from, edge) in self.edges {
            if !self.nodes.contains_key(&from) {
                return Err(CompilationError::NodeNotFound(from));
            }
            for target in edge.targets() {
                if let Target::Node(to) = target {
                    if !self.nodes.contains_key(&to) {
                        return Err(CompilationError::NodeNotFound(to));
                    }
                }
            }
            if let Edge::Conditional { router, branches } = &edge {
                for key in &router.keys {
                    if !branches.contains_key(key) {
                        return Err(CompilationError::UndeclaredBranch { from, branch: *key });
                    }
                }
                let mut mapped: Vec<Branch> = branches.keys().copied().collect();
                mapped.sort();
                for key in mapped {
                    if !router.keys.contains(&key) {
                        return Err(CompilationError::UnknownBranch { from, branch: key });
                    }
                }
            }
            if edges.insert(from, edge).is_some() {
                return Err(CompilationError::DuplicateEdge(from));
            }
        }

        let registered: BTreeSet<NodeId> = self.nodes.keys().copied().collect();
        for id in &registered {
            if !edges.contains_key(id) {
                return Err(CompilationError::MissingEdge(*id));
            }
        }

        check_acyclic(entry, &edges)?;

        let reachable = reachable_from(entry, &edges);
        for id in &registered {
            if !reachable.contains(id) {
                return Err(CompilationError::Unreachable(*id));
            }
        }

        Ok(CompiledStateGraph {
            nodes: self.nodes,
            entry,
            edges,
        })
    }
}

fn successors<S>(edges: &HashMap<NodeId, Edge<S>>, id: NodeId) -> Vec<NodeId> {
    let mut next: Vec<NodeId> = edges
        .get(&id)
        .map(|e| {
            e.targets()
                .into_iter()
                .filter_map(|t| match t {
                    Target::Node(n) => Some(n),
                    Target::End => None,
                })
                .collect()
        })
        .unwrap_or_default();
    next.sort();
    next.dedup();
    next
}

fn reachable_from<S>(entry: NodeId, edges: &HashMap<NodeId, Edge<S>>) -> HashSet<NodeId> {
    let mut seen = HashSet::new();
    let mut stack = vec![entry];
    while let Some(id) = stack.pop() {
        if seen.insert(id) {
            stack.extend(successors(edges, id));
        }
    }
    seen
}

/// Depth-first search with an explicit "on current path" set.
fn check_acyclic<S>(entry: NodeId, edges: &HashMap<NodeId, Edge<S>>) -> Result<(), CompilationError> {
    fn visit<S>(
        id: NodeId,
        edges: &HashMap<NodeId, Edge<S>>,
        on_path: &mut HashSet<NodeId>,
        done: &mut HashSet<NodeId>,
    ) -> Result<(), CompilationError> {
        if done.contains(&id) {
            return Ok(());
        }
        if !on_path.insert(id) {
            return Err(CompilationError::Cycle(id));
        }
        for next in successors(edges, id) {
            visit(next, edges, on_path, done)?;
        }
        on_path.remove(&id);
        done.insert(id);
        Ok(())
    }

    let mut on_path = HashSet::new();
    let mut done = HashSet::new();
    visit(entry, edges, &mut on_path, &mut done)
}
