use std::collections::HashMap;
use std::fmt;

use log::{debug, info, warn};
use phf::phf_map;

use crate::errors::*;
use crate::geometry::*;

//////////////////////////////////////////////////////////////////////
// some useful types for constructing Robinson triangles

// index of a triangle within P2::nodes
pub type NodeId = usize;

#[derive(Debug, PartialEq, PartialOrd, Eq, Ord, Clone, Copy, Hash)]
pub enum RobinsonType {
    HalfKite,
    HalfDart
}

// define a lookup table matching type names to enumeration
pub static ROBINSON_TYPES: phf::Map<&'static str, RobinsonType> = phf_map! {
    "halfkite" => RobinsonType::HalfKite,
    "halfdart" => RobinsonType::HalfDart,
};

// neighbor slots are indexed by edge type 1..=4, not by physical edge
pub const NUM_EDGE_TYPES: usize = 4;

// (edge type, sibling slot) pairs wired between children of the same
// parent, one list per child slot; slots are 1-based like identities
const HALF_DART_LINKS: [&[(usize, usize)]; 2] = [
    &[(1, 2)],
    &[(1, 1)],
];

const HALF_KITE_LINKS: [&[(usize, usize)]; 3] = [
    &[(3, 2)],
    &[(3, 1), (1, 3)],
    &[(1, 2)],
];

// one child produced by subdividing a parent
#[derive(Debug, PartialEq, Clone)]
pub struct ChildBlueprint {
    pub points: [Point2d; 3],
    pub ttype:  RobinsonType,
    pub links:  &'static [(usize, usize)],
}

impl RobinsonType {

    pub fn from_name(name: &str) -> Result<Self> {
        match ROBINSON_TYPES.get(name) {
            Some(&ttype) => Ok(ttype),
            None => Err(invalid(format!("unrecognized Robinson type '{}'", name)))
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RobinsonType::HalfKite => "halfkite",
            RobinsonType::HalfDart => "halfdart"
        }
    }

    pub fn child_count(self) -> usize {
        match self {
            RobinsonType::HalfKite => 3,
            RobinsonType::HalfDart => 2
        }
    }

    // edge type whose neighbor completes the rhombus
    pub fn mirror_edge(self) -> usize {
        match self {
            RobinsonType::HalfKite => 3,
            RobinsonType::HalfDart => 4
        }
    }

    pub fn reflection_ratio(self) -> f64 {
        match self {
            RobinsonType::HalfKite => HALF_KITE_REFLECTION_RATIO,
            RobinsonType::HalfDart => HALF_DART_REFLECTION_RATIO
        }
    }

    // the triangle on the other side of the mirror edge:
    // half-kite reflects B across CA, half-dart reflects A across CB
    pub fn reflected(self, a: &Point2d, b: &Point2d, c: &Point2d) -> [Point2d; 3] {

        let r = self.reflection_ratio();

        match self {
            RobinsonType::HalfKite => {
                let foot = c + r * (a - c);
                [*a, reflect_through(b, &foot), *c]
            }
            RobinsonType::HalfDart => {
                let foot = c + r * (b - c);
                [reflect_through(a, &foot), *b, *c]
            }
        }

    }

    pub fn links(self) -> &'static [&'static [(usize, usize)]] {
        match self {
            RobinsonType::HalfKite => &HALF_KITE_LINKS,
            RobinsonType::HalfDart => &HALF_DART_LINKS
        }
    }

    // subdivide triangle abc of this type
    pub fn children_blueprint(self, a: &Point2d, b: &Point2d, c: &Point2d) -> Vec<ChildBlueprint> {

        let links = self.links();

        match self {

            // A > B >>>> C >> A
            // AB : BC : CA = 1 : 1 : psi
            //
            // D on CA such that CD : DA = psi : 1
            RobinsonType::HalfDart => {

                let d = c + PSI_INV * (a - c);

                vec![
                    ChildBlueprint { points: [*b, d, *a], ttype: RobinsonType::HalfDart, links: links[0] },
                    ChildBlueprint { points: [*b, d, *c], ttype: RobinsonType::HalfKite, links: links[1] },
                ]

            }

            // A > B >> C >>> A
            // AB : BC : CA = 1 : psi : psi
            //
            // D on BC such that BD : DC = psi : 1
            // E on CA such that CE : EA = psi : 1
            RobinsonType::HalfKite => {

                let d = b + PSI_INV * (c - b);
                let e = c + PSI_INV * (a - c);

                vec![
                    ChildBlueprint { points: [e, *a, *b], ttype: RobinsonType::HalfKite, links: links[0] },
                    ChildBlueprint { points: [e, d, *b], ttype: RobinsonType::HalfKite, links: links[1] },
                    ChildBlueprint { points: [e, d, *c], ttype: RobinsonType::HalfDart, links: links[2] },
                ]

            }

        }

    }

}

impl fmt::Display for RobinsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//////////////////////////////////////////////////////////////////////
// superneighborhood rules: given a parent of type1 whose neighbor across
// edge is of type2, list (child slot, neighbor's child slot, child edge
// type) triples wiring the children across that edge

pub fn superneighborhood(type1: RobinsonType,
                         edge: usize,
                         type2: RobinsonType) -> Result<&'static [(usize, usize, usize)]> {

    use RobinsonType::*;

    if edge < 1 || edge > NUM_EDGE_TYPES {
        return Err(invalid(format!("invalid edge value {}", edge)));
    }

    let rules: &'static [(usize, usize, usize)] = match (type1, edge, type2) {

        (HalfKite, 1, _) => &[(1, 1, 2)],
        (HalfKite, 2, HalfKite) => &[(2, 2, 2), (3, 3, 4)],
        (HalfKite, 2, HalfDart) => &[(2, 2, 2), (3, 1, 4)],
        (HalfKite, 3, _) => &[(1, 1, 1), (3, 3, 2)],

        (HalfDart, 1, _) => &[(1, 1, 2)],
        (HalfDart, 2, HalfKite) => &[(1, 3, 4), (2, 2, 2)],
        (HalfDart, 2, HalfDart) => &[(1, 1, 4), (2, 2, 2)],
        (HalfDart, 4, _) => &[(2, 2, 3)],

        _ => bail!(ErrorKind::MissingRule(type1.name(), edge, type2.name()))

    };

    Ok(rules)

}

//////////////////////////////////////////////////////////////////////
// node of the substitution tree

#[derive(Debug, PartialEq, Clone)]
pub struct Robinson {

    pub a: Point2d,
    pub b: Point2d,
    pub c: Point2d,

    pub ttype:       RobinsonType,
    pub id:          String,                 // "0" for root, "P-i" for child i of P
    pub index:       usize,                  // 1-based slot within parent, 0 for root
    pub parent:      Option<NodeId>,         // parent index or None for root
    pub children:    Vec<Option<NodeId>>,    // empty while leaf, None where culled
    pub neighbors:   [Option<NodeId>; NUM_EDGE_TYPES],
    pub leaf:        bool,
    pub generation:  usize,                  // 0 = root, 1 = children of root, etc.
    pub skip_window: bool,                   // subtree lies wholly inside the window
    pub shade:       f64                     // set by P2::shade_from

}

impl Robinson {

    pub fn new(ttype: RobinsonType, a: Point2d, b: Point2d, c: Point2d) -> Self {
        Robinson {
            a: a,
            b: b,
            c: c,
            ttype: ttype,
            id: "0".to_string(),
            index: 0,
            parent: None,
            children: Vec::new(),
            neighbors: [None; NUM_EDGE_TYPES],
            leaf: true,
            generation: 0,
            skip_window: false,
            shade: 0.0
        }
    }

    pub fn points(&self) -> [Point2d; 3] {
        [self.a, self.b, self.c]
    }

    pub fn contains(&self, x: &Point2d) -> bool {
        point_in_triangle(&self.a, &self.b, &self.c, x)
    }

    pub fn centroid(&self) -> Point2d {
        centroid(&self.a, &self.b, &self.c)
    }

    pub fn is_ccw(&self) -> bool {
        ccw(&self.a, &self.b, &self.c)
    }

    // neighbor across the given edge type (1..=4)
    pub fn neighbor(&self, edge: usize) -> Result<Option<NodeId>> {
        if edge < 1 || edge > NUM_EDGE_TYPES {
            bail!(ErrorKind::InvalidArgument(format!("invalid edge value {}", edge)));
        }
        Ok(self.neighbors[edge - 1])
    }

    // the other half of this triangle's rhombus, if materialized
    pub fn mirror(&self) -> Option<NodeId> {
        self.neighbors[self.ttype.mirror_edge() - 1]
    }

    // child in 1-based slot, None if out of range, culled or leaf
    pub fn child(&self, slot: usize) -> Option<NodeId> {
        if slot == 0 {
            return None;
        }
        self.children.get(slot - 1).copied().flatten()
    }

    pub fn live_children<'a>(&'a self) -> impl DoubleEndedIterator<Item=NodeId> + 'a {
        self.children.iter().filter_map(|&c| c)
    }

}

//////////////////////////////////////////////////////////////////////
// P2 tiling data structure to hold all of the recursive subdivision
// info. every triangle lives in nodes; parent, child and neighbor
// relations are indices into it

#[derive(Debug)]
pub struct P2 {

    nodes:  Vec<Robinson>,             // all triangles, root at index 0
    lookup: HashMap<String, NodeId>,   // identity -> index
    window: Option<Window>,            // culling window, fixed for the build
    levels: usize                      // subdivision passes applied so far

}

impl P2 {

    pub const ROOT: NodeId = 0;

    // create a tree holding a single triangle of the given type
    pub fn from_triangle(ttype: RobinsonType,
                         a: Point2d, b: Point2d, c: Point2d) -> Self {

        let root = Robinson::new(ttype, a, b, c);

        let mut lookup = HashMap::new();
        lookup.insert(root.id.clone(), Self::ROOT);

        P2 {
            nodes: vec![root],
            lookup: lookup,
            window: None,
            levels: 0
        }

    }

    // the canonical half-kite the tiling grows from
    pub fn half_kite() -> Self {
        Self::from_triangle(RobinsonType::HalfKite,
                            Point2d::new(0.0, 0.0),
                            Point2d::new(0.0, 1.0),
                            Point2d::new(HALF_KITE_HEIGHT, 0.5))
    }

    // a half-dart with the same short edge, handy for testing
    pub fn half_dart() -> Self {
        Self::from_triangle(RobinsonType::HalfDart,
                            Point2d::new(0.0, -0.5 * PSI),
                            Point2d::new(HALF_DART_HEIGHT, 0.0),
                            Point2d::new(0.0, 0.5 * PSI))
    }

    // build the tiling: levels rounds of inflate + find_neighbors with
    // culling against window
    pub fn new(levels: usize, window: Option<Window>) -> Result<Self> {

        if levels == 0 {
            bail!(ErrorKind::InvalidArgument("recursion depth must be at least 1".to_string()));
        }

        let mut p2 = Self::half_kite();
        p2.window = window;

        for _ in 0..levels {
            p2.subdivide()?;
        }

        info!("built P2 tiling: {} triangles ({} leaves) after {} levels",
              p2.nodes.len(), p2.leaves().len(), p2.levels);

        Ok(p2)

    }

    pub fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, tidx: NodeId) -> &Robinson {
        &self.nodes[tidx]
    }

    pub fn nodes(&self) -> &[Robinson] {
        &self.nodes
    }

    pub fn root(&self) -> &Robinson {
        &self.nodes[Self::ROOT]
    }

    pub fn get_by_id(&self, id: &str) -> Option<NodeId> {
        self.lookup.get(id).copied()
    }

    //////////////////////////////////////////////////

    // one full level: inflate every leaf, then wire the new leaves
    pub fn subdivide(&mut self) -> Result<()> {

        let window = self.window;

        self.inflate(window.as_ref());
        self.find_neighbors()?;

        debug!("got {} triangles ({} leaves) at level {}",
               self.nodes.len(), self.leaves().len(), self.levels);

        Ok(())

    }

    // subdivide every current leaf by one level
    pub fn inflate(&mut self, window: Option<&Window>) {

        for tidx in self.leaves() {
            self.inflate_leaf(tidx, window);
        }

        self.levels += 1;

    }

    fn inflate_leaf(&mut self, tidx: NodeId, window: Option<&Window>) {

        let parent = &self.nodes[tidx];

        debug_assert!(parent.leaf);

        let blueprint = parent.ttype.children_blueprint(&parent.a, &parent.b, &parent.c);
        let parent_skip = parent.skip_window;

        let mut slots: Vec<Option<NodeId>> = vec![None; blueprint.len()];

        for (i, child) in blueprint.iter().enumerate() {

            let [a, b, c] = child.points;
            let mut skip = parent_skip;

            if let Some(window) = window {

                if !parent_skip {

                    match triangle_rectangle_position(&a, &b, &c, window) {

                        TriRectPosition::Within => {
                            skip = true;
                        }

                        TriRectPosition::Disjoint => {
                            // keep a child whose mirror still shows
                            let [ra, rb, rc] = child.ttype.reflected(&a, &b, &c);
                            let mirror_pos = triangle_rectangle_position(&ra, &rb, &rc, window);
                            if mirror_pos == TriRectPosition::Disjoint {
                                continue;
                            }
                        }

                        _ => {}

                    }

                }

            }

            slots[i] = Some(self.add_child(tidx, i + 1, child, skip));

        }

        for (i, child) in blueprint.iter().enumerate() {

            let cidx = match slots[i] {
                None => continue,
                Some(cidx) => cidx
            };

            for &(edge, sibling) in child.links {
                if let Some(sidx) = slots[sibling - 1] {
                    self.nodes[cidx].neighbors[edge - 1] = Some(sidx);
                }
            }

        }

        let parent = &mut self.nodes[tidx];
        parent.children = slots;
        parent.leaf = false;

    }

    fn add_child(&mut self, parent: NodeId, slot: usize,
                 child: &ChildBlueprint, skip_window: bool) -> NodeId {

        let tidx_new = self.nodes.len();
        let [a, b, c] = child.points;

        let mut tri = Robinson::new(child.ttype, a, b, c);

        tri.id = format!("{}-{}", self.nodes[parent].id, slot);
        tri.index = slot;
        tri.parent = Some(parent);
        tri.generation = self.nodes[parent].generation + 1;
        tri.skip_window = skip_window;

        debug_assert!(!self.lookup.contains_key(&tri.id));

        self.lookup.insert(tri.id.clone(), tidx_new);
        self.nodes.push(tri);

        tidx_new

    }

    //////////////////////////////////////////////////

    // derive each leaf's neighbors from its parent's neighbors
    pub fn find_neighbors(&mut self) -> Result<()> {

        let mut updates = Vec::new();

        for tidx in self.leaves() {

            let tri = &self.nodes[tidx];

            let parent = match tri.parent {
                None => continue,
                Some(parent) => &self.nodes[parent]
            };

            for (edge_index, super_neighbor) in parent.neighbors.iter().enumerate() {

                let super_neighbor = match super_neighbor {
                    None => continue,
                    Some(sn) => &self.nodes[*sn]
                };

                let rules = superneighborhood(parent.ttype, edge_index + 1, super_neighbor.ttype)
                    .map_err(|e| {
                        warn!("can't wire neighbors of triangle {}: {}", tri.id, e);
                        e
                    })?;

                for &(my_slot, their_slot, edge_type) in rules {

                    if my_slot != tri.index {
                        continue;
                    }

                    if let Some(nidx) = super_neighbor.child(their_slot) {
                        updates.push((tidx, edge_type, nidx));
                    }

                }

            }

        }

        for (tidx, edge_type, nidx) in updates {
            self.nodes[tidx].neighbors[edge_type - 1] = Some(nidx);
        }

        Ok(())

    }

    //////////////////////////////////////////////////

    // all leaves in depth-first slot order
    pub fn leaves(&self) -> Vec<NodeId> {

        let mut leaves = Vec::new();
        let mut stack = vec![Self::ROOT];

        while let Some(tidx) = stack.pop() {

            let tri = &self.nodes[tidx];

            if tri.leaf {
                leaves.push(tidx);
            } else {
                stack.extend(tri.live_children().rev());
            }

        }

        leaves

    }

    // smallest triangle containing x, or None outside the materialized
    // region (or on an edge)
    pub fn locate(&self, x: &Point2d) -> Option<NodeId> {
        self.locate_from(Self::ROOT, x)
    }

    pub fn locate_from(&self, start: NodeId, x: &Point2d) -> Option<NodeId> {

        let mut stack = vec![start];

        while let Some(tidx) = stack.pop() {

            let tri = &self.nodes[tidx];

            if !tri.contains(x) {
                continue;
            }

            if tri.leaf {
                return Some(tidx);
            }

            stack.extend(tri.live_children().rev());

        }

        None

    }

    //////////////////////////////////////////////////

    // breadth-first shading over the neighbor graph: the start gets 1.0,
    // each ring 0.9 of the previous, stopping below 0.03.
    // returns the number of triangles shaded
    pub fn shade_from(&mut self, start: NodeId) -> usize {

        let mut visited = vec![false; self.nodes.len()];
        let mut queue = vec![start];
        let mut shade = 1.0;
        let mut count = 0;

        visited[start] = true;

        while shade >= 0.03 && !queue.is_empty() {

            let mut next = Vec::new();

            for &tidx in &queue {

                self.nodes[tidx].shade = shade;
                count += 1;

                for &nidx in self.nodes[tidx].neighbors.iter().flatten() {
                    if !visited[nidx] {
                        visited[nidx] = true;
                        next.push(nidx);
                    }
                }

            }

            queue = next;
            shade *= 0.9;

        }

        count

    }

    pub fn clear_shade(&mut self) {
        for tri in &mut self.nodes {
            tri.shade = 0.0;
        }
    }

}

//////////////////////////////////////////////////////////////////////
