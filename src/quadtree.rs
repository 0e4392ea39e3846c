use crate::geometry::{Position, Rect};
use std::collections::{HashMap, HashSet};

/// Spatial index over grid cells. Items are agent indices into the
/// population; the tree only stores where each one currently stands.
pub struct Quadtree {
    leaf_capacity: usize,
    nodes: Vec<Node>,
    open_node_indices: Vec<usize>,
    positions: HashMap<usize, Position>,
    item_to_node: HashMap<usize, usize>,
}

impl Quadtree {
    pub fn new(bounds: Rect<i32>) -> Self {
        let mut new_quadtree = Self {
            leaf_capacity: 4,
            nodes: Vec::new(),
            open_node_indices: Vec::new(),
            positions: HashMap::new(),
            item_to_node: HashMap::new(),
        };

        new_quadtree.add_node(Node::new_leaf(None, bounds));

        new_quadtree
    }

    /// Indexes every position under its slice index. Positions outside the
    /// bounds are skipped.
    pub fn new_with_positions(bounds: Rect<i32>, positions: &[Position]) -> Self {
        let mut new_quadtree = Self::new(bounds);

        for (item, pos) in positions.iter().enumerate() {
            new_quadtree.insert(item, *pos);
        }

        new_quadtree
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get_pos(&self, item: usize) -> Option<Position> {
        self.positions.get(&item).copied()
    }

    fn iter_nodes(&self) -> impl Iterator<Item = &Node> {
        let open_node_indices = HashSet::<_>::from_iter(self.open_node_indices.iter());
        (0..self.nodes.len())
            .filter(move |i| !open_node_indices.contains(i))
            .map(|i| &self.nodes[i])
    }

    fn get(&self, id: usize) -> Option<&Node> {
        self.nodes.get(id)
    }

    fn get_leaf(&self, id: usize) -> Option<&Node> {
        self.get(id).filter(|node| node.is_leaf())
    }

    fn get_leaf_mut(&mut self, id: usize) -> Option<&mut Node> {
        self.nodes.get_mut(id).filter(|node| node.is_leaf())
    }

    /// Adds the node to the quadtree and returns the id of the node
    fn add_node(&mut self, node: Node) -> usize {
        match self.open_node_indices.pop() {
            Some(id) => {
                self.nodes[id] = node;
                id
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    /// Removes the node from the quadtree. The slot is only overwritten when
    /// the index is handed to another node.
    fn remove_node(&mut self, id: usize) {
        if id == self.nodes.len() - 1 {
            self.nodes.pop();
        } else {
            self.open_node_indices.push(id);
        }
    }

    /// Guaranteed to return a leaf node
    pub fn get_node_for_pos(&self, pos: Position) -> Option<usize> {
        let mut curr = 0;

        loop {
            let node = self.get(curr)?;
            if !node.bounds.contains(pos) {
                return None;
            }

            match node.typ {
                NodeType::Leaf => return Some(curr),
                NodeType::Root => curr = node.children[node.bounds.get_quadrant(pos)],
            }
        }
    }

    /// Indexes `item` at `pos` and returns the leaf holding it, or `None`
    /// when the position is outside the tree.
    pub fn insert(&mut self, item: usize, pos: Position) -> Option<usize> {
        let leaf_id = self.get_node_for_pos(pos)?;

        self.positions.insert(item, pos);
        self.item_to_node.insert(item, leaf_id);
        self.get_leaf_mut(leaf_id)?.children.push(item);

        self.check_capacity(leaf_id);
        self.item_to_node.get(&item).copied()
    }

    fn check_capacity(&mut self, leaf_id: usize) {
        let Some(leaf) = self.get_leaf(leaf_id) else {
            return;
        };

        if leaf.children.len() > self.leaf_capacity && leaf.bounds.can_quarter() {
            if let Some(children) = self.split(leaf_id) {
                for child in children {
                    self.check_capacity(child);
                }
            }
        }
    }

    /// Joins every root whose children are all leaves and together hold no
    /// more than one leaf's worth of items.
    pub fn clean_tree(&mut self) {
        let mut leaf_parents = HashSet::new();
        for leaf in self.iter_nodes().filter(|node| node.is_leaf()) {
            if let Some(parent) = leaf.parent {
                leaf_parents.insert(parent);
            }
        }

        for parent_id in leaf_parents {
            let joinable = match self.get(parent_id) {
                Some(parent) if !parent.is_leaf() => {
                    let leaves: Option<Vec<&Node>> =
                        parent.children.iter().map(|c| self.get_leaf(*c)).collect();
                    leaves.is_some_and(|leaves| {
                        leaves.iter().map(|leaf| leaf.children.len()).sum::<usize>()
                            <= self.leaf_capacity
                    })
                }
                _ => false,
            };

            if joinable {
                self.join(parent_id);
            }
        }
    }

    fn split(&mut self, id: usize) -> Option<[usize; 4]> {
        let node = self.get_leaf(id)?;
        let node_parent = node.parent;
        let node_bounds = node.bounds;
        let node_items = node.children.clone();

        let mut new_leaves = node_bounds
            .quarter()
            .map(|bound| Node::new_leaf(Some(id), bound));

        for item in node_items {
            let pos = self.get_pos(item)?;
            new_leaves[node_bounds.get_quadrant(pos)].children.push(item);
        }

        let children = new_leaves.map(|leaf| self.add_node(leaf));

        for child_id in children {
            let items = self.get_leaf(child_id)?.children.clone();
            for item in items {
                self.item_to_node.insert(item, child_id);
            }
        }

        self.nodes[id] = Node::new_root(node_parent, node_bounds, children.to_vec());

        Some(children)
    }

    /// Join a root node with leaves as children into a single leaf node
    fn join(&mut self, id: usize) -> Option<()> {
        let node = self.get(id)?;
        let node_parent = node.parent;
        let node_bounds = node.bounds;
        let node_children = node.children.clone();
        let mut node_items = Vec::new();
        for child in node_children.iter() {
            node_items.extend(self.get_leaf(*child)?.children.iter().copied());
        }

        for item in node_items.iter() {
            self.item_to_node.insert(*item, id);
        }

        for leaf_id in node_children {
            self.remove_node(leaf_id);
        }

        let mut new_leaf = Node::new_leaf(node_parent, node_bounds);
        new_leaf.children = node_items;
        self.nodes[id] = new_leaf;

        Some(())
    }

    /// Find every leaf node which has bounds that overlap with the given bounds
    fn find_leaves_in_bounds(&self, bounds: Rect<i32>) -> Vec<usize> {
        let mut leaves = Vec::new();
        let mut to_visit = vec![0];

        while let Some(curr) = to_visit.pop() {
            let Some(curr_node) = self.get(curr) else {
                continue;
            };

            if !curr_node.bounds.intersects(bounds) {
                continue;
            }

            match curr_node.typ {
                NodeType::Leaf => leaves.push(curr),
                NodeType::Root => to_visit.extend(curr_node.children.iter().copied()),
            }
        }

        leaves
    }

    /// Every item standing inside `bounds`, in ascending item order.
    pub fn find_in_bounds(&self, bounds: Rect<i32>) -> Vec<usize> {
        let mut items: Vec<usize> = self
            .find_leaves_in_bounds(bounds)
            .into_iter()
            .filter_map(|leaf| self.get_leaf(leaf))
            .flat_map(|leaf| leaf.children.iter().copied())
            .filter(|item| {
                self.positions
                    .get(item)
                    .is_some_and(|pos| bounds.contains(*pos))
            })
            .collect();
        items.sort_unstable();
        items
    }

    /// Moves an indexed item. Returns `None` if the item is unknown or the
    /// new position lies outside the tree.
    pub fn move_item(&mut self, item: usize, new_pos: Position) -> Option<()> {
        let node_id = *self.item_to_node.get(&item)?;
        let node_bounds = self.get_leaf(node_id)?.bounds;

        if !node_bounds.contains(new_pos) {
            let new_node_id = self.get_node_for_pos(new_pos)?;
            self.get_leaf_mut(new_node_id)?.children.push(item);
            self.item_to_node.insert(item, new_node_id);
            self.get_leaf_mut(node_id)?.children.retain(|&id| id != item);

            self.positions.insert(item, new_pos);
            self.check_capacity(new_node_id);
        } else {
            self.positions.insert(item, new_pos);
        }

        Some(())
    }
}

enum NodeType {
    Root,
    Leaf,
}

struct Node {
    typ: NodeType,
    parent: Option<usize>,
    /// Child node ids for a root, item ids for a leaf.
    children: Vec<usize>,
    bounds: Rect<i32>,
}

impl Node {
    fn new_root(parent: Option<usize>, bounds: Rect<i32>, children: Vec<usize>) -> Self {
        Self {
            typ: NodeType::Root,
            parent,
            bounds,
            children,
        }
    }

    fn new_leaf(parent: Option<usize>, bounds: Rect<i32>) -> Self {
        Self {
            typ: NodeType::Leaf,
            parent,
            bounds,
            children: Vec::new(),
        }
    }

    fn is_leaf(&self) -> bool {
        matches!(self.typ, NodeType::Leaf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn grid(size: i32) -> Rect<i32> {
        Rect::new(Position::new(1, 1), Position::new(size, size))
    }

    fn brute_force(positions: &[Position], bounds: Rect<i32>) -> Vec<usize> {
        (0..positions.len())
            .filter(|i| bounds.contains(positions[*i]))
            .collect()
    }

    #[test]
    fn test_rejects_positions_outside_bounds() {
        let mut tree = Quadtree::new(grid(5));
        assert!(tree.insert(0, Position::new(0, 3)).is_none());
        assert!(tree.insert(1, Position::new(6, 1)).is_none());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_many_items_on_one_cell() {
        let positions = vec![Position::new(3, 3); 20];
        let tree = Quadtree::new_with_positions(grid(8), &positions);
        assert_eq!(tree.len(), 20);
        assert_eq!(
            tree.find_in_bounds(Rect::new_centered(Position::new(3, 3), 0)),
            (0..20).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_queries_match_linear_scan() {
        let mut rng = StdRng::seed_from_u64(7);
        let size = 30;
        let mut positions: Vec<Position> = (0..200)
            .map(|_| Position::new(rng.gen_range(1..=size), rng.gen_range(1..=size)))
            .collect();
        let mut tree = Quadtree::new_with_positions(grid(size), &positions);

        for _ in 0..5 {
            for (item, pos) in positions.iter_mut().enumerate() {
                *pos = Position::new(rng.gen_range(1..=size), rng.gen_range(1..=size));
                tree.move_item(item, *pos).unwrap();
            }
            tree.clean_tree();

            for _ in 0..50 {
                let center = Position::new(rng.gen_range(1..=size), rng.gen_range(1..=size));
                let bounds = Rect::new_centered(center, 3);
                assert_eq!(tree.find_in_bounds(bounds), brute_force(&positions, bounds));
            }
        }
    }

    #[test]
    fn test_items_piled_on_one_cell_after_moves() {
        let positions: Vec<Position> = (1..=8).map(|i| Position::new(i, i)).collect();
        let mut tree = Quadtree::new_with_positions(grid(8), &positions);
        assert!(tree.iter_nodes().count() > 1);

        for item in 0..8 {
            tree.move_item(item, Position::new(1, 1)).unwrap();
        }
        // All items now share a single cell, so nothing can be merged away
        // below the cell-sized leaf, but the query still sees them all.
        tree.clean_tree();
        let bounds = Rect::new_centered(Position::new(1, 1), 0);
        assert_eq!(tree.find_in_bounds(bounds).len(), 8);
    }
}
