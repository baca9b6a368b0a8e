//! NSGA-II over test suites.
//!
//! Each generation executes the cases nobody has a verdict for yet, scores
//! every solution, breeds an offspring population by binary tournament,
//! single-point crossover and one-slot mutation, and keeps the best
//! `population_size` solutions by non-dominated rank and crowding distance.

use std::collections::HashSet;
use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use restgen_core::TestCase;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::executor::{BatchExecutor, ExecutionAdapter};
use crate::objective::Direction;
use crate::problem::Problem;
use crate::solution::Solution;

/// True when `a` is no worse than `b` on every objective and strictly
/// better on at least one.
pub fn dominates(a: &[f64], b: &[f64], directions: &[Direction]) -> bool {
    let mut strictly_better = false;
    for ((x, y), direction) in a.iter().zip(b).zip(directions) {
        if direction.better(*y, *x) {
            return false;
        }
        if direction.better(*x, *y) {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Partitions `solutions` into fronts of indices; front 0 is non-dominated.
pub fn non_dominated_sort(solutions: &[Solution], directions: &[Direction]) -> Vec<Vec<usize>> {
    let n = solutions.len();
    let mut dominated: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut domination_count = vec![0usize; n];
    let mut current = Vec::new();

    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let (a, b) = (solutions[i].objectives(), solutions[j].objectives());
            if dominates(a, b, directions) {
                dominated[i].push(j);
            } else if dominates(b, a, directions) {
                domination_count[i] += 1;
            }
        }
        if domination_count[i] == 0 {
            current.push(i);
        }
    }

    let mut fronts = Vec::new();
    while !current.is_empty() {
        let mut next = Vec::new();
        for &i in &current {
            for &j in &dominated[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    next.push(j);
                }
            }
        }
        fronts.push(current);
        current = next;
    }
    fronts
}

/// Crowding distance of each member of `front`, in `front` order.
/// Boundary solutions of every objective get infinity.
pub fn crowding_distance(solutions: &[Solution], front: &[usize]) -> Vec<f64> {
    let mut distance = vec![0.0; front.len()];
    if front.len() <= 2 {
        return vec![f64::INFINITY; front.len()];
    }
    let objectives = solutions[front[0]].objectives().len();
    for m in 0..objectives {
        let value = |pos: usize| solutions[front[pos]].objectives()[m];
        let mut order: Vec<usize> = (0..front.len()).collect();
        order.sort_by(|a, b| value(*a).total_cmp(&value(*b)));

        let (first, last) = (order[0], order[order.len() - 1]);
        distance[first] = f64::INFINITY;
        distance[last] = f64::INFINITY;
        let range = value(last) - value(first);
        if range <= 0.0 {
            continue;
        }
        for w in order.windows(3) {
            distance[w[1]] += (value(w[2]) - value(w[0])) / range;
        }
    }
    distance
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Generations,
    TimeLimit,
    ExecutionBudget,
}

#[derive(Debug)]
pub struct SearchResult {
    /// The non-dominated solutions of the final population.
    pub front: Vec<Solution>,
    pub generations: usize,
    /// Live executions over the whole run.
    pub executions: usize,
    pub stop: StopReason,
}

pub struct Optimizer<A> {
    problem: Problem,
    executor: BatchExecutor<A>,
    config: SearchConfig,
    rng: ChaCha8Rng,
}

impl<A: ExecutionAdapter> Optimizer<A> {
    pub fn new(problem: Problem, adapter: A, config: SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Optimizer {
            problem: problem.with_faulty_ratio(config.faulty_ratio),
            executor: BatchExecutor::new(adapter, config.max_concurrency),
            config,
            rng,
        })
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn executor(&self) -> &BatchExecutor<A> {
        &self.executor
    }

    pub async fn run(&mut self) -> Result<SearchResult, SearchError> {
        let started = Instant::now();
        info!(
            search_target = ?self.problem.target(),
            objectives = ?self.problem.objective_names(),
            variables = self.problem.number_of_variables(),
            population = self.config.population_size,
            "starting search"
        );

        let mut population: Vec<Solution> = (0..self.config.population_size)
            .map(|_| self.problem.create_solution(&mut self.rng))
            .collect();
        self.evaluate(&mut population).await;

        let mut generations = 0;
        let stop = loop {
            if let Some(reason) = self.exhausted(generations, started) {
                break reason;
            }
            let mut offspring = self.offspring(&population);
            self.evaluate(&mut offspring).await;
            population.extend(offspring);
            population = self.select(population);
            generations += 1;
            debug!(
                generation = generations,
                executions = self.executor.executions(),
                "generation finished"
            );
        };

        let directions = self.problem.directions();
        let first: HashSet<usize> = non_dominated_sort(&population, &directions)
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .collect();
        let front: Vec<Solution> = population
            .into_iter()
            .enumerate()
            .filter(|(i, _)| first.contains(i))
            .map(|(_, s)| s)
            .collect();

        let executions = self.executor.executions();
        info!(
            generations,
            executions,
            front = front.len(),
            stop = ?stop,
            "search finished"
        );
        Ok(SearchResult {
            front,
            generations,
            executions,
            stop,
        })
    }

    fn exhausted(&self, generations: usize, started: Instant) -> Option<StopReason> {
        if generations >= self.config.max_generations {
            return Some(StopReason::Generations);
        }
        if self.config.time_limit().is_some_and(|limit| started.elapsed() >= limit) {
            return Some(StopReason::TimeLimit);
        }
        if self
            .config
            .max_executions
            .is_some_and(|max| self.executor.executions() >= max)
        {
            return Some(StopReason::ExecutionBudget);
        }
        None
    }

    /// Executes every case without a verdict exactly once across the
    /// population, records the verdicts wherever the case sits, then scores
    /// the solutions whose objectives are stale.
    async fn evaluate(&self, population: &mut [Solution]) {
        let mut seen = HashSet::new();
        let pending: Vec<TestCase> = population
            .iter()
            .flat_map(|s| s.pending())
            .filter(|c| seen.insert(c.id))
            .cloned()
            .collect();

        let verdicts = self.executor.execute_all(pending).await;
        for (id, verdict) in verdicts {
            for solution in population.iter_mut() {
                solution.record(id, verdict.clone());
            }
        }
        for solution in population.iter_mut().filter(|s| !s.is_evaluated()) {
            self.problem.evaluate(solution);
        }
    }

    fn offspring(&mut self, population: &[Solution]) -> Vec<Solution> {
        let directions = self.problem.directions();
        let mut rank = vec![0usize; population.len()];
        let mut crowding = vec![0.0; population.len()];
        for (r, front) in non_dominated_sort(population, &directions).iter().enumerate() {
            for (&i, d) in front.iter().zip(crowding_distance(population, front)) {
                rank[i] = r;
                crowding[i] = d;
            }
        }

        let size = self.config.population_size;
        let slots = self.problem.number_of_variables();
        let mut children = Vec::with_capacity(size);
        while children.len() < size {
            let a = self.tournament(&rank, &crowding);
            let b = self.tournament(&rank, &crowding);
            let (mut x, mut y) = if slots > 1 && self.rng.gen_bool(self.config.crossover_probability) {
                let point = self.rng.gen_range(1..slots);
                Solution::crossover(&population[a], &population[b], point)
            } else {
                (population[a].clone(), population[b].clone())
            };
            self.mutate(&mut x);
            self.mutate(&mut y);
            children.push(x);
            if children.len() < size {
                children.push(y);
            }
        }
        children
    }

    /// Binary tournament: lower rank wins, then larger crowding distance.
    fn tournament(&mut self, rank: &[usize], crowding: &[f64]) -> usize {
        let i = self.rng.gen_range(0..rank.len());
        let j = self.rng.gen_range(0..rank.len());
        if rank[j] < rank[i] || (rank[j] == rank[i] && crowding[j] > crowding[i]) {
            j
        } else {
            i
        }
    }

    fn mutate(&mut self, solution: &mut Solution) {
        if solution.is_empty() || !self.rng.gen_bool(self.config.mutation_probability) {
            return;
        }
        let slot = self.rng.gen_range(0..solution.len());
        let case = self.problem.random_test_case(&mut self.rng);
        solution.set_variable(slot, case);
    }

    fn select(&self, population: Vec<Solution>) -> Vec<Solution> {
        let size = self.config.population_size;
        let directions = self.problem.directions();
        let mut keep: Vec<usize> = Vec::with_capacity(size);
        for front in non_dominated_sort(&population, &directions) {
            if keep.len() + front.len() <= size {
                keep.extend(front);
                continue;
            }
            let mut ranked: Vec<(usize, f64)> = front
                .iter()
                .copied()
                .zip(crowding_distance(&population, &front))
                .collect();
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
            keep.extend(ranked.into_iter().take(size - keep.len()).map(|(i, _)| i));
            break;
        }

        let mut slots: Vec<Option<Solution>> = population.into_iter().map(Some).collect();
        keep.into_iter().filter_map(|i| slots[i].take()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scored(objectives: &[f64]) -> Solution {
        let mut s = Solution::new(Vec::new());
        s.set_objectives(objectives.to_vec());
        s
    }

    const MAX_MIN: [Direction; 2] = [Direction::Maximize, Direction::Minimize];

    #[test]
    fn dominance_respects_direction() {
        assert!(dominates(&[2.0, 1.0], &[1.0, 1.0], &MAX_MIN));
        assert!(dominates(&[1.0, 0.0], &[1.0, 1.0], &MAX_MIN));
        assert!(!dominates(&[1.0, 1.0], &[1.0, 1.0], &MAX_MIN));
        assert!(!dominates(&[2.0, 2.0], &[1.0, 1.0], &MAX_MIN));
    }

    #[test]
    fn fronts_are_layered() {
        let pop = vec![
            scored(&[3.0, 1.0]),
            scored(&[1.0, 1.0]),
            scored(&[2.0, 0.0]),
            scored(&[0.0, 5.0]),
        ];
        let fronts = non_dominated_sort(&pop, &MAX_MIN);
        assert_eq!(fronts[0].iter().copied().collect::<HashSet<_>>(), HashSet::from([0, 2]));
        assert_eq!(fronts[1], vec![1]);
        assert_eq!(fronts[2], vec![3]);
    }

    #[test]
    fn crowding_marks_boundaries_infinite() {
        let pop = vec![
            scored(&[0.0, 4.0]),
            scored(&[1.0, 3.0]),
            scored(&[3.0, 1.0]),
            scored(&[4.0, 0.0]),
        ];
        let d = crowding_distance(&pop, &[0, 1, 2, 3]);
        assert!(d[0].is_infinite() && d[3].is_infinite());
        assert!((d[1] - 1.5).abs() < 1e-9);
        assert!((d[2] - 1.5).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn first_front_is_mutually_non_dominated(
            points in proptest::collection::vec((0u8..10, 0u8..10), 1..30)
        ) {
            let pop: Vec<Solution> = points
                .iter()
                .map(|(a, b)| scored(&[*a as f64, *b as f64]))
                .collect();
            let fronts = non_dominated_sort(&pop, &MAX_MIN);
            prop_assert_eq!(fronts.iter().map(Vec::len).sum::<usize>(), pop.len());
            for &i in &fronts[0] {
                for j in 0..pop.len() {
                    prop_assert!(!dominates(pop[j].objectives(), pop[i].objectives(), &MAX_MIN));
                }
            }
        }
    }
}
