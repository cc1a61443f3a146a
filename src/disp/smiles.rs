use crate::atom_info::{default_valence, is_organic};
use crate::molecule::Molecule;
use crate::structure::*;
use ahash::AHashMap;
use itertools::Itertools;
use petgraph::prelude::*;
use smallvec::SmallVec;
use std::fmt::Write;
use tracing::*;

fn bond2str(bond: Bond, aromatic_ends: bool) -> &'static str {
    match bond {
        Bond::Non => ".",
        Bond::Single if aromatic_ends => "-",
        Bond::Single => "",
        Bond::Double => "=",
        Bond::Triple => "#",
        Bond::Aromatic if aromatic_ends => "",
        Bond::Aromatic => ":",
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SmilesConfig {
    pub isotopes: bool,
    pub canon: bool,
}
impl SmilesConfig {
    /// Default config, gives canonical output
    pub const fn new() -> Self {
        Self {
            isotopes: true,
            canon: true,
        }
    }
    /// Walk atoms in insertion order instead of canonicalizing.
    pub const fn fast_roundtrip() -> Self {
        Self {
            isotopes: true,
            canon: false,
        }
    }
}
impl Default for SmilesConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Rank atoms so that equivalent atoms in equal molecules get equal positions.
///
/// Starts from per-atom invariants, refines by the sorted ranks of the neighbors until the
/// partition stops splitting, then breaks the first remaining tie and refines again.
pub fn canonical_ranks(graph: &MoleculeGraph) -> Vec<usize> {
    let n = graph.node_count();
    let invariants = graph
        .node_indices()
        .map(|i| {
            let atom = graph[i];
            (
                graph.edges(i).count(),
                atom.protons,
                atom.charge,
                graph.total_hydrogens(i),
                graph.is_aromatic_atom(i),
                atom.isotope,
                graph.bond_order_sum(i),
            )
        })
        .collect::<Vec<_>>();
    let mut ranks = dense_ranks(&invariants);
    loop {
        refine(graph, &mut ranks);
        let classes = ranks.iter().unique().count();
        if classes == n {
            break;
        }
        // break the lowest tie in favor of the first atom holding it
        let Some(tied) = ranks.iter().copied().duplicates().min() else {
            break;
        };
        let Some(first) = ranks.iter().position(|&r| r == tied) else {
            break;
        };
        trace!(tied, first, "breaking tie");
        for r in &mut ranks {
            *r = *r * 2 + 1;
        }
        ranks[first] -= 1;
        ranks = dense_ranks(&ranks);
    }
    ranks
}

fn dense_ranks<K: Ord>(keys: &[K]) -> Vec<usize> {
    let order = (0..keys.len())
        .sorted_by(|&a, &b| keys[a].cmp(&keys[b]))
        .collect::<Vec<_>>();
    let mut ranks = vec![0; keys.len()];
    let mut rank = 0;
    for (n, &i) in order.iter().enumerate() {
        if n > 0 && keys[order[n - 1]] != keys[i] {
            rank += 1;
        }
        ranks[i] = rank;
    }
    ranks
}

fn refine(graph: &MoleculeGraph, ranks: &mut Vec<usize>) {
    let mut classes = ranks.iter().unique().count();
    loop {
        let keys = graph
            .node_indices()
            .map(|i| {
                let mut around: SmallVec<(usize, u8), 4> = graph
                    .edges(i)
                    .map(|e| {
                        let other = if e.source() == i {
                            e.target()
                        } else {
                            e.source()
                        };
                        (ranks[other.index()], *e.weight() as u8)
                    })
                    .collect();
                around.sort_unstable();
                (ranks[i.index()], around)
            })
            .collect::<Vec<_>>();
        let next = dense_ranks(&keys);
        let next_classes = next.iter().unique().count();
        *ranks = next;
        if next_classes == classes {
            break;
        }
        classes = next_classes;
    }
}

#[derive(Debug, Clone, Copy)]
enum RingEvent {
    Open(EdgeIndex),
    Close(EdgeIndex, Bond),
}

/// Spanning-forest layout shared by both passes of the writer
struct Layout {
    children: Vec<SmallVec<(NodeIndex, Bond), 4>>,
    rings: Vec<SmallVec<RingEvent, 2>>,
    visited: Vec<bool>,
    closed: Vec<bool>,
}
impl Layout {
    fn explore(
        &mut self,
        graph: &MoleculeGraph,
        ranks: &[usize],
        node: NodeIndex,
        from: Option<EdgeIndex>,
    ) {
        self.visited[node.index()] = true;
        let neighbors = graph
            .edges(node)
            .map(|e| {
                let other = if e.source() == node {
                    e.target()
                } else {
                    e.source()
                };
                (other, e.id(), *e.weight())
            })
            .sorted_by_key(|(o, _, _)| ranks[o.index()])
            .collect::<SmallVec<_, 4>>();
        for (other, edge, bond) in neighbors {
            if Some(edge) == from {
                continue;
            }
            if self.visited[other.index()] {
                if !self.closed[edge.index()] {
                    self.closed[edge.index()] = true;
                    self.rings[other.index()].push(RingEvent::Open(edge));
                    self.rings[node.index()].push(RingEvent::Close(edge, bond));
                }
            } else {
                self.children[node.index()].push((other, bond));
                self.explore(graph, ranks, other, Some(edge));
            }
        }
    }
}

struct Emitter<'a> {
    graph: &'a MoleculeGraph,
    layout: &'a Layout,
    aromatic: Vec<bool>,
    cfg: SmilesConfig,
    digits: AHashMap<EdgeIndex, usize>,
    in_use: Vec<bool>,
    out: String,
}
impl Emitter<'_> {
    fn take_digit(&mut self) -> usize {
        let d = (1..self.in_use.len())
            .find(|&d| !self.in_use[d])
            .unwrap_or(self.in_use.len());
        if d == self.in_use.len() {
            self.in_use.push(false);
        }
        self.in_use[d] = true;
        d
    }
    fn push_digit(&mut self, d: usize) {
        if d < 10 {
            let _ = write!(self.out, "{d}");
        } else {
            let _ = write!(self.out, "%{d}");
        }
    }

    fn write_atom(&mut self, node: NodeIndex) {
        let atom = self.graph[node];
        let aromatic = self.aromatic[node.index()];
        let total_h = self.graph.total_hydrogens(node);
        let bare_h = default_valence(atom.protons, 0)
            .map_or(0, |v| v.saturating_sub(self.graph.bond_order_sum(node)));
        let bare = is_organic(atom.protons)
            && atom.charge == 0
            && (atom.isotope == 0 || !self.cfg.isotopes)
            && total_h == bare_h;
        let sym = atom.symbol();
        if bare {
            if aromatic {
                self.out.push_str(&sym.to_ascii_lowercase());
            } else {
                self.out.push_str(sym);
            }
            return;
        }
        self.out.push('[');
        if atom.isotope > 0 && self.cfg.isotopes {
            let _ = write!(self.out, "{}", atom.isotope);
        }
        if aromatic {
            self.out.push_str(&sym.to_ascii_lowercase());
        } else {
            self.out.push_str(sym);
        }
        match total_h {
            0 => {}
            1 => self.out.push('H'),
            h => {
                let _ = write!(self.out, "H{h}");
            }
        }
        match atom.charge {
            0 => {}
            1 => self.out.push('+'),
            -1 => self.out.push('-'),
            c => {
                let _ = write!(self.out, "{c:+}");
            }
        }
        self.out.push(']');
    }

    fn emit(&mut self, node: NodeIndex, prev: Option<(NodeIndex, Bond)>) {
        if let Some((from, bond)) = prev {
            let ends = self.aromatic[from.index()] && self.aromatic[node.index()];
            self.out.push_str(bond2str(bond, ends));
        }
        self.write_atom(node);
        let layout = self.layout;
        let events = &layout.rings[node.index()];
        // closing first frees digits for the openings that follow
        for ev in events.iter().filter(|e| matches!(e, RingEvent::Close(..))) {
            if let RingEvent::Close(edge, bond) = *ev {
                let Some(d) = self.digits.remove(&edge) else {
                    continue;
                };
                let (a, b) = self.graph.edge_endpoints(edge).unwrap_or((node, node));
                let ends = self.aromatic[a.index()] && self.aromatic[b.index()];
                self.out.push_str(bond2str(bond, ends));
                self.push_digit(d);
                self.in_use[d] = false;
            }
        }
        for ev in events.iter() {
            if let RingEvent::Open(edge) = *ev {
                let d = self.take_digit();
                self.digits.insert(edge, d);
                self.push_digit(d);
            }
        }
        let children = &layout.children[node.index()];
        let last = children.len().saturating_sub(1);
        for (i, &(child, bond)) in children.iter().enumerate() {
            if i < last {
                self.out.push('(');
                self.emit(child, Some((node, bond)));
                self.out.push(')');
            } else {
                self.emit(child, Some((node, bond)));
            }
        }
    }
}

/// Serialize a molecule graph as a SMILES string.
#[instrument(level = "debug", skip_all, fields(atoms = graph.node_count()))]
pub fn generate_smiles(graph: &MoleculeGraph, cfg: SmilesConfig) -> String {
    let n = graph.node_count();
    if n == 0 {
        return String::new();
    }
    let ranks = if cfg.canon {
        canonical_ranks(graph)
    } else {
        (0..n).collect()
    };
    let mut layout = Layout {
        children: vec![SmallVec::new(); n],
        rings: vec![SmallVec::new(); n],
        visited: vec![false; n],
        closed: vec![false; graph.edge_count()],
    };
    let mut roots = Vec::new();
    for node in graph.node_indices().sorted_by_key(|i| ranks[i.index()]) {
        if !layout.visited[node.index()] {
            layout.explore(graph, &ranks, node, None);
            roots.push(node);
        }
    }
    let mut emitter = Emitter {
        graph,
        layout: &layout,
        aromatic: graph
            .node_indices()
            .map(|i| graph.is_aromatic_atom(i))
            .collect(),
        cfg,
        digits: AHashMap::new(),
        in_use: vec![true],
        out: String::with_capacity(n * 2),
    };
    for (i, root) in roots.into_iter().enumerate() {
        if i > 0 {
            emitter.out.push('.');
        }
        emitter.emit(root, None);
    }
    trace!(smiles = %emitter.out, "generated SMILES");
    emitter.out
}
