use termtree::Tree;
use tracing::instrument;

use crate::domain::{NodeId, TreeArena};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl<P> TreeNodeConvert for TreeArena<P> {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        if self.is_empty() {
            return Tree::new("Empty tree".to_string());
        }

        fn build_tree<P>(arena: &TreeArena<P>, id: NodeId) -> Option<Tree<String>> {
            let node = arena.get(id)?;
            let leaves: Vec<_> = node
                .children
                .iter()
                .filter_map(|&child| build_tree(arena, child))
                .collect();
            Some(Tree::new(format!("{} {}", node.label, node.id)).with_leaves(leaves))
        }

        let leaves: Vec<_> = self
            .roots()
            .iter()
            .filter_map(|&root| build_tree(self, root))
            .collect();
        Tree::new("(root)".to_string()).with_leaves(leaves)
    }
}
