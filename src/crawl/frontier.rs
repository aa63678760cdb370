// src/crawl/frontier.rs
// =============================================================================
// The crawl frontier: which listing pages are waiting and which are done.
//
// How it works:
// 1. Pages wait in a FIFO queue (VecDeque), so pages discovered first are
//    fetched first (breadth-first)
// 2. A page is marked visited the moment it leaves the queue
// 3. A page is never queued twice and never queued once visited
// 4. The crawl stops when the queue is empty or max_pages pages have been
//    handed out, whichever comes first
//
// The visited set only ever grows, so even a pagination graph with cycles
// (page 2 linking back to page 1) terminates.
// =============================================================================

use std::collections::{HashSet, VecDeque};

// Represents a page in the crawl queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierItem {
    pub url: String,
    pub depth: usize, // 1 = the start page
}

#[derive(Debug)]
pub struct CrawlFrontier {
    queue: VecDeque<FrontierItem>,
    queued: HashSet<String>,
    visited: HashSet<String>,
    visit_order: Vec<String>,
    max_pages: usize,
    max_depth: Option<usize>,
}

impl CrawlFrontier {
    pub fn new(max_pages: usize, max_depth: Option<usize>) -> Self {
        Self {
            queue: VecDeque::new(),
            queued: HashSet::new(),
            visited: HashSet::new(),
            visit_order: Vec::new(),
            max_pages,
            max_depth,
        }
    }

    /// Appends `url` to the back of the queue.
    ///
    /// Returns false (and does nothing) if the page was already visited,
    /// is already waiting, or lies deeper than max_depth.
    pub fn enqueue(&mut self, url: impl Into<String>, depth: usize) -> bool {
        let url = url.into();
        if self.max_depth.is_some_and(|max| depth > max) {
            return false;
        }
        if self.visited.contains(&url) || self.queued.contains(&url) {
            return false;
        }

        self.queued.insert(url.clone());
        self.queue.push_back(FrontierItem { url, depth });
        true
    }

    /// Pops the next page to fetch and marks it visited.
    ///
    /// Returns None once the queue is drained or the page cap is hit.
    pub fn pop_next(&mut self) -> Option<FrontierItem> {
        while self.visit_order.len() < self.max_pages {
            let item = self.queue.pop_front()?;
            self.queued.remove(&item.url);

            // Skip if already visited
            if !self.visited.insert(item.url.clone()) {
                continue;
            }

            self.visit_order.push(item.url.clone());
            return Some(item);
        }
        None
    }

    /// True when pages are still waiting but the page cap stops the crawl.
    pub fn cap_reached(&self) -> bool {
        self.visit_order.len() >= self.max_pages && !self.queue.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn visited_count(&self) -> usize {
        self.visit_order.len()
    }

    /// Visited pages in the order they were handed out.
    pub fn into_visited(self) -> Vec<String> {
        self.visit_order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut frontier = CrawlFrontier::new(10, None);
        frontier.enqueue("a", 1);
        frontier.enqueue("b", 2);
        frontier.enqueue("c", 2);

        let order: Vec<_> = std::iter::from_fn(|| frontier.pop_next()).map(|i| i.url).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_no_duplicates_in_queue_or_after_visit() {
        let mut frontier = CrawlFrontier::new(10, None);
        assert!(frontier.enqueue("a", 1));
        assert!(!frontier.enqueue("a", 1));
        assert_eq!(frontier.pending(), 1);

        assert_eq!(frontier.pop_next().map(|i| i.url), Some("a".to_string()));
        assert!(!frontier.enqueue("a", 2));
        assert!(frontier.pop_next().is_none());
    }

    #[test]
    fn test_page_cap() {
        let mut frontier = CrawlFrontier::new(2, None);
        for url in ["a", "b", "c"] {
            frontier.enqueue(url, 1);
        }
        assert!(frontier.pop_next().is_some());
        assert!(frontier.pop_next().is_some());
        assert!(frontier.pop_next().is_none());
        assert!(frontier.cap_reached());
        assert_eq!(frontier.visited_count(), 2);
    }

    #[test]
    fn test_depth_cap() {
        let mut frontier = CrawlFrontier::new(10, Some(2));
        assert!(frontier.enqueue("a", 1));
        assert!(frontier.enqueue("b", 2));
        assert!(!frontier.enqueue("c", 3));
        assert_eq!(frontier.pending(), 2);
    }

    #[test]
    fn test_visited_only_grows() {
        let mut frontier = CrawlFrontier::new(10, None);
        frontier.enqueue("p1", 1);
        let mut last = 0;
        while let Some(item) = frontier.pop_next() {
            assert!(frontier.visited_count() > last);
            last = frontier.visited_count();
            // cyclic pagination: every page links to p1 and p2
            frontier.enqueue("p1", item.depth + 1);
            frontier.enqueue("p2", item.depth + 1);
        }
        assert_eq!(frontier.into_visited(), vec!["p1", "p2"]);
    }
}
