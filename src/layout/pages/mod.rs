//! Packing of measured blocks into pages.

use std::collections::VecDeque;
use std::ops::Range;

use crate::layout::measure::{Extent, Measure};
use crate::layout::{Grid, RenderedBlock};
use crate::units::Px;

/// A block, or the part of a block, that lands on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// The index of the block.
    pub block: usize,

    /// The tokens of the block that are in the fragment.
    pub tokens: Range<usize>,

    /// The measure of the fragment.
    pub extent: Extent,
}

/// Holds the fragments that go on a page of the document.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// The number of the page within the document, starting at 1.
    pub number: usize,

    /// The fragments, from top to bottom.
    pub fragments: Vec<Fragment>,

    /// The height taken by the fragments.
    pub height: Px,
}

impl Page {
    /// Returns a new empty page.
    pub fn new(number: usize) -> Page {
        Page {
            number,
            fragments: vec![],
            height: Px(0.0),
        }
    }

    /// Returns true if nothing was placed on the page yet.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Appends a fragment to the page.
    fn push(&mut self, fragment: Fragment) {
        self.height += fragment.extent.height;
        self.fragments.push(fragment);
    }
}

/// The pages being filled.
struct Packer<'a, M> {
    blocks: &'a [RenderedBlock],
    measurer: &'a M,
    capacity: Px,
    line_height: Px,
    pages: Vec<Page>,
    current: Page,
}

impl<'a, M: Measure> Packer<'a, M> {
    /// Closes the current page and starts a new one.
    fn flush(&mut self) {
        let next = Page::new(self.current.number + 1);
        let page = std::mem::replace(&mut self.current, next);
        self.pages.push(page);
    }

    fn fragment(&self, block: usize, tokens: Range<usize>) -> Fragment {
        let extent = self.measurer.measure(&self.blocks[block], tokens.clone());
        Fragment {
            block,
            tokens,
            extent,
        }
    }

    /// Finds the token at which a fragment that overflows the page should be split.
    fn split_index(&self, fragment: &Fragment) -> Option<usize> {
        let remaining = self.capacity - self.current.height;
        if remaining < self.line_height {
            return Some(0);
        }

        fragment
            .extent
            .boxes
            .iter()
            .position(|b| b.top + b.height > remaining)
    }

    /// Places one fragment, returning what must be placed next, if anything.
    fn place(&mut self, fragment: Fragment) -> Option<Fragment> {
        if self.current.height + fragment.extent.height <= self.capacity {
            self.current.push(fragment);
            return None;
        }

        let block = &self.blocks[fragment.block];
        let tokens = fragment.tokens.len();

        if block.is_wrappable(tokens) {
            if let Some(split) = self.split_index(&fragment).filter(|&s| s > 0 && s < tokens) {
                let at = fragment.tokens.start + split;
                let head = self.fragment(fragment.block, fragment.tokens.start..at);
                let tail = self.fragment(fragment.block, at..fragment.tokens.end);

                trace!(
                    "splitting block {} at token {} on page {}",
                    fragment.block,
                    at,
                    self.current.number
                );

                self.current.push(head);
                self.flush();
                return Some(tail);
            }
        }

        if !self.current.is_empty() {
            self.flush();
            return Some(fragment);
        }

        if fragment.extent.height > self.capacity {
            warn!(
                "block {} is taller than a page ({:?} > {:?}), it will overflow",
                fragment.block, fragment.extent.height, self.capacity
            );
        }

        self.current.push(fragment);
        None
    }
}

/// Packs blocks into pages.
///
/// Blocks are placed one after the other while they fit. A heading or a paragraph that doesn't
/// fit is split between two lines when at least one of its lines fits; anything else goes to the
/// next page. A block that doesn't even fit on an empty page is placed alone on its page anyway.
///
/// There is always at least one page.
pub fn paginate<M: Measure>(blocks: &[RenderedBlock], measurer: &M, grid: &Grid) -> Vec<Page> {
    let mut packer = Packer {
        blocks,
        measurer,
        capacity: grid.capacity(),
        line_height: grid.line_height,
        pages: vec![],
        current: Page::new(1),
    };

    let mut queue: VecDeque<Fragment> = (0..blocks.len())
        .map(|i| packer.fragment(i, 0..blocks[i].tokens.len()))
        .collect();

    while let Some(fragment) = queue.pop_front() {
        if let Some(next) = packer.place(fragment) {
            queue.push_front(next);
        }
    }

    if !packer.current.is_empty() || packer.pages.is_empty() {
        packer.flush();
    }

    packer.pages
}
