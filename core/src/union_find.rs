//! Disjoint-set forest used by Kruskal and Borůvka to detect cycles.
//!
//! Path compression in `find` plus union by rank gives amortized
//! `O(α(n))` per operation.

#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
    sets: usize,
}

impl DisjointSet {
    /// `n` singleton sets `{0}, {1}, .., {n-1}`.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
            sets: n,
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Number of disjoint sets remaining.
    pub fn set_count(&self) -> usize {
        self.sets
    }

    /// Representative of the set containing `node`. Every node on the walk is
    /// repointed directly at the root.
    pub fn find(&mut self, mut node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        while self.parent[node] != node {
            let parent = self.parent[node];
            self.parent[node] = root;
            node = parent;
        }

        root
    }

    /// Merge the sets containing `left` and `right`.
    ///
    /// Returns `false` when both were already in the same set. The root with
    /// the lower rank is attached below the other; on a tie `left`'s root
    /// wins and its rank grows.
    pub fn union(&mut self, left: usize, right: usize) -> bool {
        let left = self.find(left);
        let right = self.find(right);
        if left == right {
            return false;
        }

        match self.rank[left].cmp(&self.rank[right]) {
            std::cmp::Ordering::Less => self.parent[left] = right,
            std::cmp::Ordering::Greater => self.parent[right] = left,
            std::cmp::Ordering::Equal => {
                self.parent[right] = left;
                self.rank[left] = self.rank[left].saturating_add(1);
            }
        }
        self.sets -= 1;
        true
    }

    pub fn same_set(&mut self, left: usize, right: usize) -> bool {
        self.find(left) == self.find(right)
    }
}
