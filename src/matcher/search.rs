//! Search-strategy controller
//!
//! Decides, for every candidate path found by the engine, whether it is
//! yielded and whether the search may stop. Shortest variants must be fed
//! candidates in non-decreasing length order.

use crate::config::TiePolicy;
use crate::query::PathSearchPrefix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Searching,
    FoundCandidate,
    Terminated,
}

#[derive(Debug, Clone)]
pub struct SearchController {
    prefix: PathSearchPrefix,
    ties: TiePolicy,
    state: SearchState,
    accepted: u64,
    /// Number of distinct lengths accepted so far
    classes: u64,
    first_len: Option<usize>,
    last_len: Option<usize>,
}

impl SearchController {
    pub fn new(prefix: PathSearchPrefix, ties: TiePolicy) -> Self {
        let state = match prefix {
            PathSearchPrefix::AnyK(0)
            | PathSearchPrefix::ShortestK(0)
            | PathSearchPrefix::ShortestKGroups(0) => SearchState::Terminated,
            _ => SearchState::Searching,
        };
        Self {
            prefix,
            ties,
            state,
            accepted: 0,
            classes: 0,
            first_len: None,
            last_len: None,
        }
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state == SearchState::Terminated
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Offer a candidate of `len` edges. Returns whether it is yielded.
    pub fn offer(&mut self, len: usize) -> bool {
        if self.is_terminated() {
            return false;
        }
        self.state = SearchState::FoundCandidate;

        let (accept, terminate) = match self.prefix {
            PathSearchPrefix::All => (true, false),
            PathSearchPrefix::Any => (true, true),
            PathSearchPrefix::AnyK(k) => (true, self.accepted + 1 >= k),
            PathSearchPrefix::AnyShortest => (true, true),
            PathSearchPrefix::AllShortest => match self.first_len {
                Some(first) if len > first => (false, true),
                _ => (true, false),
            },
            PathSearchPrefix::ShortestK(k) => {
                if self.accepted < k {
                    let reached = self.accepted + 1 >= k;
                    (true, reached && self.ties == TiePolicy::Truncate)
                } else if self.last_len == Some(len) {
                    (true, false)
                } else {
                    (false, true)
                }
            }
            PathSearchPrefix::ShortestKGroups(k) => {
                if self.last_len == Some(len) || self.classes < k {
                    (true, false)
                } else {
                    (false, true)
                }
            }
        };

        if accept {
            if self.last_len != Some(len) {
                self.classes += 1;
            }
            self.accepted += 1;
            self.first_len.get_or_insert(len);
            self.last_len = Some(len);
        }
        self.state = if terminate {
            SearchState::Terminated
        } else {
            SearchState::Searching
        };
        accept
    }

    /// Called once every candidate of length `len` has been offered.
    /// Shortest variants that are already satisfied stop here instead of
    /// waiting for a longer candidate.
    pub fn end_length_class(&mut self, len: usize) {
        if self.is_terminated() || self.last_len != Some(len) {
            return;
        }
        let done = match self.prefix {
            PathSearchPrefix::AllShortest => true,
            PathSearchPrefix::ShortestK(k) => self.accepted >= k,
            PathSearchPrefix::ShortestKGroups(k) => self.classes >= k,
            _ => false,
        };
        if done {
            self.state = SearchState::Terminated;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(prefix: PathSearchPrefix, ties: TiePolicy, lens: &[usize]) -> Vec<usize> {
        let mut controller = SearchController::new(prefix, ties);
        let mut out = Vec::new();
        let mut prev = None;
        for &len in lens {
            if let Some(p) = prev {
                if p != len {
                    controller.end_length_class(p);
                }
            }
            if controller.is_terminated() {
                break;
            }
            if controller.offer(len) {
                out.push(len);
            }
            prev = Some(len);
        }
        out
    }

    const LENS: &[usize] = &[1, 1, 2, 2, 2, 3, 4];

    #[test]
    fn test_all_and_any() {
        assert_eq!(run(PathSearchPrefix::All, TiePolicy::IncludeAll, LENS), LENS);
        assert_eq!(run(PathSearchPrefix::Any, TiePolicy::IncludeAll, LENS), vec![1]);
        assert_eq!(run(PathSearchPrefix::AnyK(3), TiePolicy::IncludeAll, LENS), vec![1, 1, 2]);
        assert!(run(PathSearchPrefix::AnyK(0), TiePolicy::IncludeAll, LENS).is_empty());
    }

    #[test]
    fn test_shortest_variants() {
        assert_eq!(run(PathSearchPrefix::AnyShortest, TiePolicy::IncludeAll, LENS), vec![1]);
        assert_eq!(run(PathSearchPrefix::AllShortest, TiePolicy::IncludeAll, LENS), vec![1, 1]);
        assert_eq!(
            run(PathSearchPrefix::ShortestKGroups(2), TiePolicy::IncludeAll, LENS),
            vec![1, 1, 2, 2, 2]
        );
        assert!(run(PathSearchPrefix::ShortestKGroups(0), TiePolicy::IncludeAll, LENS).is_empty());
    }

    #[test]
    fn test_shortest_k_ties() {
        // k lands inside the length-2 class
        assert_eq!(
            run(PathSearchPrefix::ShortestK(3), TiePolicy::IncludeAll, LENS),
            vec![1, 1, 2, 2, 2]
        );
        assert_eq!(
            run(PathSearchPrefix::ShortestK(3), TiePolicy::Truncate, LENS),
            vec![1, 1, 2]
        );
        // k lands exactly on a class boundary
        assert_eq!(
            run(PathSearchPrefix::ShortestK(2), TiePolicy::IncludeAll, LENS),
            vec![1, 1]
        );
    }

    #[test]
    fn test_state_transitions() {
        let mut controller = SearchController::new(PathSearchPrefix::AnyK(2), TiePolicy::IncludeAll);
        assert_eq!(controller.state(), SearchState::Searching);
        assert!(controller.offer(3));
        assert_eq!(controller.state(), SearchState::Searching);
        assert!(controller.offer(1));
        assert_eq!(controller.state(), SearchState::Terminated);
        assert!(!controller.offer(1));
        assert_eq!(controller.accepted(), 2);
    }
}
