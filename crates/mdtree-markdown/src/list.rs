use mdtree_core::tree::NodeId;

/// Deepest list nesting that is tracked. Lists nested deeper render without their own
/// prefix or indent.
pub const MAX_LIST_DEPTH: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListContext {
    pub ordered: bool,
    pub tight: bool,
    /// Number shown by the next ordered item.
    pub counter: u64,
    /// Text block synthesized for the open item of a tight list.
    pub(crate) item_block: Option<NodeId>,
}

/// What a newly opened list item should look like.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemMarker {
    pub prefix: String,
    /// Nesting depth of the item's list, 1 for a top-level list.
    pub depth: usize,
    pub tight: bool,
}

/// Bounded stack of open lists.
#[derive(Clone, Debug, Default)]
pub struct ListStack {
    tracked: Vec<ListContext>,
    untracked: usize,
}

impl ListStack {
    pub fn new() -> Self {
        Self {
            tracked: Vec::with_capacity(MAX_LIST_DEPTH),
            untracked: 0,
        }
    }

    /// Open a list. Returns `false` when the depth cap is hit and the list is not tracked.
    pub fn push(&mut self, ordered: bool, tight: bool, start: u64) -> bool {
        if self.untracked > 0 || self.tracked.len() >= MAX_LIST_DEPTH {
            self.untracked += 1;
            return false;
        }
        self.tracked.push(ListContext {
            ordered,
            tight,
            counter: start,
            item_block: None,
        });
        true
    }

    pub fn pop(&mut self) -> Option<ListContext> {
        if self.untracked > 0 {
            self.untracked -= 1;
            return None;
        }
        self.tracked.pop()
    }

    /// The innermost list, unless it is nested beyond the cap.
    pub fn current(&self) -> Option<&ListContext> {
        if self.untracked > 0 {
            return None;
        }
        self.tracked.last()
    }

    pub(crate) fn current_mut(&mut self) -> Option<&mut ListContext> {
        if self.untracked > 0 {
            return None;
        }
        self.tracked.last_mut()
    }

    /// The deepest tracked list, even while untracked lists are open below it.
    pub(crate) fn deepest(&self) -> Option<&ListContext> {
        self.tracked.last()
    }

    pub(crate) fn deepest_mut(&mut self) -> Option<&mut ListContext> {
        self.tracked.last_mut()
    }

    /// Detach every open tight item block, outermost first.
    pub(crate) fn take_item_blocks(&mut self) -> Vec<NodeId> {
        self.tracked
            .iter_mut()
            .filter_map(|list| list.item_block.take())
            .collect()
    }

    /// Number of tracked lists.
    pub fn depth(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty() && self.untracked == 0
    }

    /// Marker for an item opening in the innermost list.
    pub fn open_item(&self, bullet: &str) -> Option<ItemMarker> {
        let list = self.current()?;
        let prefix = if list.ordered {
            format!("{}. ", list.counter)
        } else {
            format!("{bullet} ")
        };
        Some(ItemMarker {
            prefix,
            depth: self.depth(),
            tight: list.tight,
        })
    }

    /// Close an item of the innermost list, advancing an ordered counter.
    pub fn close_item(&mut self) {
        if let Some(list) = self.current_mut() {
            if list.ordered {
                list.counter = list.counter.saturating_add(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_counter_advances_on_close_only() {
        let mut lists = ListStack::new();
        assert!(lists.push(true, true, 1));

        let first = lists.open_item("•").unwrap();
        assert_eq!(first.prefix, "1. ");
        assert_eq!(lists.open_item("•").unwrap().prefix, "1. ");

        lists.close_item();
        assert_eq!(lists.open_item("•").unwrap().prefix, "2. ");
    }

    #[test]
    fn ordered_list_honours_start_number() {
        let mut lists = ListStack::new();
        lists.push(true, false, 7);
        let marker = lists.open_item("•").unwrap();
        assert_eq!(marker.prefix, "7. ");
        assert!(!marker.tight);
    }

    #[test]
    fn bullet_items_use_the_configured_glyph() {
        let mut lists = ListStack::new();
        lists.push(false, true, 1);
        lists.close_item();
        assert_eq!(lists.open_item("*").unwrap().prefix, "* ");
    }

    #[test]
    fn depth_tracks_nesting() {
        let mut lists = ListStack::new();
        assert!(lists.open_item("•").is_none());
        lists.push(false, true, 1);
        lists.push(true, true, 1);
        assert_eq!(lists.open_item("•").unwrap().depth, 2);
        lists.pop();
        assert_eq!(lists.open_item("•").unwrap().depth, 1);
        lists.pop();
        assert!(lists.is_empty());
    }

    #[test]
    fn push_beyond_cap_is_untracked_and_balanced() {
        let mut lists = ListStack::new();
        for _ in 0..MAX_LIST_DEPTH {
            assert!(lists.push(false, true, 1));
        }
        assert!(!lists.push(true, false, 1));
        assert!(!lists.push(true, false, 1));
        assert_eq!(lists.depth(), MAX_LIST_DEPTH);
        assert!(lists.open_item("•").is_none());

        assert_eq!(lists.pop(), None);
        assert_eq!(lists.pop(), None);
        assert_eq!(lists.open_item("•").unwrap().depth, MAX_LIST_DEPTH);

        for _ in 0..MAX_LIST_DEPTH {
            assert!(lists.pop().is_some());
        }
        assert!(lists.is_empty());
        assert_eq!(lists.pop(), None);
    }
}
