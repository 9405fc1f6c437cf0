use super::{Document, NodeId};

/// Depth-first iterator over the text nodes below a root, in document order.
///
/// Every text node is offered to `accept`; rejected nodes are not yielded. The
/// walker only borrows the document, so callers that want to mutate must
/// collect first.
pub struct TextWalker<'a, F> {
    doc: &'a Document,
    stack: Vec<NodeId>,
    accept: F,
}

impl<'a, F> TextWalker<'a, F>
where
    F: FnMut(&Document, NodeId) -> bool,
{
    pub fn new(doc: &'a Document, root: NodeId, accept: F) -> Self {
        Self {
            doc,
            stack: doc.children(root).iter().rev().copied().collect(),
            accept,
        }
    }
}

impl<F> Iterator for TextWalker<'_, F>
where
    F: FnMut(&Document, NodeId) -> bool,
{
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        while let Some(node) = self.stack.pop() {
            if self.doc.text(node).is_some() {
                if (self.accept)(self.doc, node) {
                    return Some(node);
                }
                continue;
            }
            self.stack
                .extend(self.doc.children(node).iter().rev().copied());
        }
        None
    }
}
