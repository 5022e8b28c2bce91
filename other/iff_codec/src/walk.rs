use crate::chunk::Chunk;

struct TraversalItem<'a> {
    depth: usize,
    index: usize,
    chunk: &'a Chunk,
}

pub struct IterationItem<'a> {
    pub depth: usize,
    /// Position among its siblings.
    pub index: usize,
    pub chunk: &'a Chunk,
}

/// Depth-first walk over a list of sibling chunks and everything below them.
pub struct ChunkTreeIterator<'a> {
    traversal_stack: Vec<TraversalItem<'a>>,
}

impl<'a> ChunkTreeIterator<'a> {
    pub fn new(roots: &'a [Chunk]) -> ChunkTreeIterator<'a> {
        let traversal_stack = roots.iter().enumerate().rev().map(|(index, chunk)| TraversalItem { depth: 0, index, chunk }).collect();

        Self { traversal_stack }
    }
}

impl<'a> std::iter::Iterator for ChunkTreeIterator<'a> {
    type Item = IterationItem<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current_item = self.traversal_stack.pop()?;

        for (index, child) in current_item.chunk.children().iter().enumerate().rev() {
            self.traversal_stack.push(TraversalItem {
                depth: current_item.depth + 1,
                index,
                chunk: child,
            });
        }

        Some(IterationItem {
            depth: current_item.depth,
            index: current_item.index,
            chunk: current_item.chunk,
        })
    }
}
