use crate::instance::RoutingInstance;
use crate::solution::Solution;

pub trait ConstructionHeuristic {
    fn construct(&self, instance: &RoutingInstance) -> Solution;
    fn name(&self) -> &str;
}

/// Path Cheapest Arc
///
/// Starts at the depot and repeatedly extends the open end of the path with the
/// unvisited node reached by the cheapest arc. Ties go to the lowest node index.
pub struct PathCheapestArcHeuristic;

impl PathCheapestArcHeuristic {
    pub fn new() -> Self {
        PathCheapestArcHeuristic
    }

    fn find_cheapest(&self, instance: &RoutingInstance, current: usize, visited: &[bool]) -> Option<usize> {
        (0..instance.dimension())
            .filter(|&n| !visited[n])
            .min_by_key(|&n| (instance.distance(current, n), n))
    }
}

impl Default for PathCheapestArcHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructionHeuristic for PathCheapestArcHeuristic {
    fn construct(&self, instance: &RoutingInstance) -> Solution {
        let start = std::time::Instant::now();
        let n = instance.dimension();
        if n == 0 {
            return Solution::from_tour(instance, Vec::new(), self.name());
        }

        let mut tour = Vec::with_capacity(n);
        let mut visited = vec![false; n];
        let mut current = instance.depot();
        tour.push(current);
        visited[current] = true;

        while let Some(next) = self.find_cheapest(instance, current, &visited) {
            tour.push(next);
            visited[next] = true;
            current = next;
        }

        let mut solution = Solution::from_tour(instance, tour, self.name());
        solution.computation_time = start.elapsed().as_secs_f64();
        solution
    }

    fn name(&self) -> &str {
        "PathCheapestArc"
    }
}

/// Cheapest Insertion Heuristic
///
/// Grows a closed cycle from the depot, each step inserting the unvisited node whose
/// best insertion position adds the least cost. The depot stays at position 0.
pub struct CheapestInsertionHeuristic;

impl CheapestInsertionHeuristic {
    pub fn new() -> Self {
        CheapestInsertionHeuristic
    }

    /// Cost of placing `node` between `tour[pos]` and its cyclic successor.
    fn insertion_cost(&self, instance: &RoutingInstance, tour: &[usize], node: usize, pos: usize) -> i64 {
        let prev = tour[pos];
        let next = tour[(pos + 1) % tour.len()];

        instance.distance(prev, node) as i64 + instance.distance(node, next) as i64
            - instance.distance(prev, next) as i64
    }

    fn find_best_insertion(&self, instance: &RoutingInstance, tour: &[usize], node: usize) -> (usize, i64) {
        let mut best_pos = 0;
        let mut best_cost = i64::MAX;

        for pos in 0..tour.len() {
            let cost = self.insertion_cost(instance, tour, node, pos);
            if cost < best_cost {
                best_cost = cost;
                best_pos = pos;
            }
        }

        (best_pos, best_cost)
    }
}

impl Default for CheapestInsertionHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructionHeuristic for CheapestInsertionHeuristic {
    fn construct(&self, instance: &RoutingInstance) -> Solution {
        let start = std::time::Instant::now();
        let n = instance.dimension();
        if n == 0 {
            return Solution::from_tour(instance, Vec::new(), self.name());
        }

        let mut tour = vec![instance.depot()];
        let mut unvisited: Vec<usize> = (1..n).collect();

        while !unvisited.is_empty() {
            let mut best: Option<(usize, usize, i64)> = None;

            for (idx, &node) in unvisited.iter().enumerate() {
                let (pos, cost) = self.find_best_insertion(instance, &tour, node);
                if best.map_or(true, |(_, _, c)| cost < c) {
                    best = Some((idx, pos, cost));
                }
            }

            if let Some((idx, pos, _)) = best {
                let node = unvisited.remove(idx);
                tour.insert(pos + 1, node);
            }
        }

        let mut solution = Solution::from_tour(instance, tour, self.name());
        solution.computation_time = start.elapsed().as_secs_f64();
        solution
    }

    fn name(&self) -> &str {
        "CheapestInsertion"
    }
}
