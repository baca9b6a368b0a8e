//! Candidate test suites.
//!
//! A [`Solution`] is a fixed-length vector of test case slots plus a memo
//! of the verdicts obtained for them. The memo is keyed by test case id, so
//! a case that appears in several slots (or survives crossover into a child)
//! is executed once. The memo never holds verdicts for cases that are no
//! longer in any slot.

use std::collections::{HashMap, HashSet};

use restgen_core::{TestCase, TestCaseId, Verdict};

#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    variables: Vec<TestCase>,
    verdicts: HashMap<TestCaseId, Verdict>,
    objectives: Vec<f64>,
}

impl Solution {
    pub fn new(variables: Vec<TestCase>) -> Self {
        Solution {
            variables,
            verdicts: HashMap::new(),
            objectives: Vec::new(),
        }
    }

    pub fn variables(&self) -> &[TestCase] {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Replaces slot `index`, dropping the old case's verdict unless another
    /// slot still holds it. Objectives are cleared.
    pub fn set_variable(&mut self, index: usize, case: TestCase) {
        let Some(slot) = self.variables.get_mut(index) else {
            return;
        };
        let old = std::mem::replace(slot, case).id;
        if !self.variables.iter().any(|c| c.id == old) {
            self.verdicts.remove(&old);
        }
        self.objectives.clear();
    }

    pub fn verdict(&self, id: &TestCaseId) -> Option<&Verdict> {
        self.verdicts.get(id)
    }

    pub fn verdicts(&self) -> &HashMap<TestCaseId, Verdict> {
        &self.verdicts
    }

    /// Records the verdict for a case held in some slot. Verdicts for cases
    /// not in the solution, or already recorded, are ignored.
    pub fn record(&mut self, id: TestCaseId, verdict: Verdict) -> bool {
        if self.verdicts.contains_key(&id) || !self.variables.iter().any(|c| c.id == id) {
            return false;
        }
        self.verdicts.insert(id, verdict);
        true
    }

    /// Distinct cases that still need executing, in slot order.
    pub fn pending(&self) -> Vec<&TestCase> {
        let mut seen = HashSet::new();
        self.variables
            .iter()
            .filter(|c| !self.verdicts.contains_key(&c.id) && seen.insert(c.id))
            .collect()
    }

    pub fn is_executed(&self) -> bool {
        self.variables.iter().all(|c| self.verdicts.contains_key(&c.id))
    }

    /// Distinct test cases in the suite.
    pub fn distinct_cases(&self) -> usize {
        self.variables.iter().map(|c| c.id).collect::<HashSet<_>>().len()
    }

    /// Slots paired with their verdicts, skipping unexecuted ones.
    pub fn executed(&self) -> impl Iterator<Item = (&TestCase, &Verdict)> {
        self.variables
            .iter()
            .filter_map(|c| self.verdicts.get(&c.id).map(|v| (c, v)))
    }

    pub fn objectives(&self) -> &[f64] {
        &self.objectives
    }

    pub fn set_objectives(&mut self, objectives: Vec<f64>) {
        self.objectives = objectives;
    }

    pub fn is_evaluated(&self) -> bool {
        !self.objectives.is_empty()
    }

    /// Single-point crossover: the children swap every slot from `point`
    /// on. Verdicts travel with their slots.
    pub fn crossover(a: &Solution, b: &Solution, point: usize) -> (Solution, Solution) {
        let point = point.min(a.len()).min(b.len());
        let mut first: Vec<TestCase> = a.variables[..point].to_vec();
        first.extend_from_slice(&b.variables[point..]);
        let mut second: Vec<TestCase> = b.variables[..point].to_vec();
        second.extend_from_slice(&a.variables[point..]);
        (Self::inherit(first, a, b), Self::inherit(second, a, b))
    }

    fn inherit(variables: Vec<TestCase>, a: &Solution, b: &Solution) -> Solution {
        let verdicts = variables
            .iter()
            .filter_map(|c| {
                a.verdicts
                    .get(&c.id)
                    .or_else(|| b.verdicts.get(&c.id))
                    .map(|v| (c.id, v.clone()))
            })
            .collect();
        Solution {
            variables,
            verdicts,
            objectives: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restgen_core::{HttpMethod, Operation};

    fn case(byte: u8) -> TestCase {
        let op = Operation::new("listPets", "/pets", HttpMethod::Get);
        TestCase::template(TestCaseId::from_random_bytes([byte; 16]), &op)
    }

    fn executed(bytes: &[u8]) -> Solution {
        let mut s = Solution::new(bytes.iter().map(|b| case(*b)).collect());
        for b in bytes {
            s.record(case(*b).id, Verdict::success(200));
        }
        s
    }

    #[test]
    fn pending_lists_each_case_once() {
        let mut s = Solution::new(vec![case(1), case(2), case(1)]);
        assert_eq!(s.pending().len(), 2);
        assert!(s.record(case(1).id, Verdict::success(200)));
        assert!(!s.record(case(1).id, Verdict::error("again")));
        assert!(!s.record(case(9).id, Verdict::success(200)));
        assert_eq!(s.pending().len(), 1);
        assert_eq!(s.distinct_cases(), 2);
    }

    #[test]
    fn replacing_a_slot_drops_its_verdict() {
        let mut s = executed(&[1, 2, 3]);
        s.set_objectives(vec![1.0]);
        s.set_variable(1, case(4));
        assert!(s.verdict(&case(2).id).is_none());
        assert_eq!(s.pending().len(), 1);
        assert!(!s.is_evaluated());
    }

    #[test]
    fn shared_case_keeps_verdict_when_one_slot_changes() {
        let mut s = Solution::new(vec![case(1), case(1)]);
        s.record(case(1).id, Verdict::success(200));
        s.set_variable(0, case(2));
        assert!(s.verdict(&case(1).id).is_some());
    }

    #[test]
    fn crossover_carries_verdicts() {
        let a = executed(&[1, 2, 3, 4]);
        let b = executed(&[5, 6, 7, 8]);
        let (c, d) = Solution::crossover(&a, &b, 2);

        let ids: Vec<_> = c.variables().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![case(1).id, case(2).id, case(7).id, case(8).id]);
        assert!(c.is_executed());
        assert!(d.is_executed());
        assert_eq!(c.verdicts().len(), 4);
        assert!(!c.is_evaluated());
    }
}
