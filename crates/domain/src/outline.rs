use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use quillform_core::{AppError, AppResult, ItemId};
use serde::{Deserialize, Serialize};

use crate::Item;

/// Direction for a builder move operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    /// Swap with the preceding sibling.
    Up,
    /// Swap with the following sibling.
    Down,
    /// Indent: become the last child of the preceding sibling.
    In,
    /// Outdent: move to the grandparent, directly after the former parent.
    Out,
}

impl MoveDirection {
    /// Returns a stable storage value for the direction.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl FromStr for MoveDirection {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            _ => Err(AppError::Validation(format!(
                "unknown move direction '{value}'"
            ))),
        }
    }
}

/// Result of a move operation.
///
/// Boundary moves (first sibling up, last sibling down, root out, first
/// sibling in) leave the tree unchanged; they are not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The tree changed.
    Moved,
    /// The move hit a tree boundary; nothing changed.
    Boundary,
}

/// One node of a built outline tree.
#[derive(Debug, Clone)]
pub struct OutlineNode {
    item_id: ItemId,
    depth: usize,
    outline: String,
    children: Vec<usize>,
}

impl OutlineNode {
    /// Returns the item this node represents.
    #[must_use]
    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    /// Returns the node depth (roots are 0).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the display outline number, e.g. `"1.2.3"`.
    #[must_use]
    pub fn outline(&self) -> &str {
        self.outline.as_str()
    }

    /// Returns arena indexes of the ordered children.
    #[must_use]
    pub fn children(&self) -> &[usize] {
        self.children.as_slice()
    }
}

/// A flattened outline entry in depth-first pre-order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    item_id: ItemId,
    depth: usize,
    outline: String,
}

impl OutlineEntry {
    /// Returns the item this entry represents.
    #[must_use]
    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    /// Returns the entry depth (roots are 0).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the display outline number.
    #[must_use]
    pub fn outline(&self) -> &str {
        self.outline.as_str()
    }
}

/// Hierarchical, ordered view over a flat item list.
///
/// Stored as an arena of nodes plus an id-to-index map. Sibling order is
/// ascending `(sort, id)`; depth and outline numbers are derived top-down on
/// every build, so a stored outline string is never authoritative.
///
/// Items whose parent id does not exist in the list are promoted to roots so a
/// stale reference never blocks rendering. A parent cycle fails validation.
#[derive(Debug, Clone)]
pub struct OutlineTree {
    nodes: Vec<OutlineNode>,
    index: HashMap<ItemId, usize>,
    roots: Vec<usize>,
}

impl OutlineTree {
    /// Builds the tree from a flat item list.
    pub fn build(items: &[Item]) -> AppResult<Self> {
        let mut known: HashSet<ItemId> = HashSet::with_capacity(items.len());
        for item in items {
            if !known.insert(item.id()) {
                return Err(AppError::Validation(format!(
                    "duplicate item id '{}' in questionnaire",
                    item.id()
                )));
            }
        }

        let mut children: HashMap<Option<ItemId>, Vec<&Item>> = HashMap::new();
        for item in items {
            children
                .entry(effective_parent(item, &known))
                .or_default()
                .push(item);
        }
        for group in children.values_mut() {
            group.sort_by_key(|item| (item.sort(), item.id()));
        }

        let mut tree = Self {
            nodes: Vec::with_capacity(items.len()),
            index: HashMap::with_capacity(items.len()),
            roots: Vec::new(),
        };

        let roots = children.remove(&None).unwrap_or_default();
        for (position, root) in roots.iter().enumerate() {
            let node_index = tree.push_subtree(root, 0, format!("{}", position + 1), &children);
            tree.roots.push(node_index);
        }

        if tree.nodes.len() != items.len() {
            return Err(AppError::Validation(
                "item parent references form a cycle".to_owned(),
            ));
        }

        Ok(tree)
    }

    fn push_subtree(
        &mut self,
        item: &Item,
        depth: usize,
        outline: String,
        children: &HashMap<Option<ItemId>, Vec<&Item>>,
    ) -> usize {
        let node_index = self.nodes.len();
        self.nodes.push(OutlineNode {
            item_id: item.id(),
            depth,
            outline: outline.clone(),
            children: Vec::new(),
        });
        self.index.insert(item.id(), node_index);

        if let Some(own_children) = children.get(&Some(item.id())) {
            for (position, child) in own_children.iter().enumerate() {
                let child_index = self.push_subtree(
                    child,
                    depth + 1,
                    format!("{}.{}", outline, position + 1),
                    children,
                );
                self.nodes[node_index].children.push(child_index);
            }
        }

        node_index
    }

    /// Returns the number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the tree is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node for an item, if present.
    #[must_use]
    pub fn node(&self, item_id: ItemId) -> Option<&OutlineNode> {
        self.index
            .get(&item_id)
            .and_then(|node_index| self.nodes.get(*node_index))
    }

    /// Returns the depth of an item, if present.
    #[must_use]
    pub fn depth_of(&self, item_id: ItemId) -> Option<usize> {
        self.node(item_id).map(OutlineNode::depth)
    }

    /// Returns the outline number of an item, if present.
    #[must_use]
    pub fn outline_of(&self, item_id: ItemId) -> Option<&str> {
        self.node(item_id).map(OutlineNode::outline)
    }

    /// Flattens the tree into depth-first pre-order entries.
    ///
    /// Drives both the builder canvas and the runner's scroll page plus side
    /// navigation.
    #[must_use]
    pub fn flatten(&self) -> Vec<OutlineEntry> {
        let mut entries = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            self.flatten_into(*root, &mut entries);
        }

        entries
    }

    fn flatten_into(&self, node_index: usize, entries: &mut Vec<OutlineEntry>) {
        let node = &self.nodes[node_index];
        entries.push(OutlineEntry {
            item_id: node.item_id,
            depth: node.depth,
            outline: node.outline.clone(),
        });
        for child_index in &node.children {
            self.flatten_into(*child_index, entries);
        }
    }
}

/// Applies a builder move to a flat item list.
///
/// Sibling sort values of every touched group are re-sequenced from zero
/// rather than nudged with large offsets, so repeated moves never overflow.
pub fn apply_move(
    items: &mut [Item],
    target_id: ItemId,
    direction: MoveDirection,
) -> AppResult<MoveOutcome> {
    OutlineTree::build(items)?;

    let known: HashSet<ItemId> = items.iter().map(Item::id).collect();
    if !known.contains(&target_id) {
        return Err(AppError::NotFound(format!(
            "item '{target_id}' does not exist in this questionnaire"
        )));
    }

    let target_parent = items
        .iter()
        .find(|item| item.id() == target_id)
        .map(|item| effective_parent(item, &known))
        .unwrap_or(None);
    let mut siblings = ordered_children(items, target_parent, &known);
    let position = siblings
        .iter()
        .position(|id| *id == target_id)
        .unwrap_or(0);

    match direction {
        MoveDirection::Up => {
            if position == 0 {
                return Ok(MoveOutcome::Boundary);
            }

            siblings.swap(position - 1, position);
            resequence(items, &siblings);
        }
        MoveDirection::Down => {
            if position + 1 >= siblings.len() {
                return Ok(MoveOutcome::Boundary);
            }

            siblings.swap(position, position + 1);
            resequence(items, &siblings);
        }
        MoveDirection::In => {
            let Some(new_parent) = position.checked_sub(1).map(|index| siblings[index]) else {
                return Ok(MoveOutcome::Boundary);
            };

            siblings.remove(position);
            let mut adopted = ordered_children(items, Some(new_parent), &known);
            adopted.push(target_id);
            reparent(items, target_id, Some(new_parent))?;
            resequence(items, &siblings);
            resequence(items, &adopted);
        }
        MoveDirection::Out => {
            let Some(parent_id) = target_parent else {
                return Ok(MoveOutcome::Boundary);
            };

            let grandparent = items
                .iter()
                .find(|item| item.id() == parent_id)
                .map(|item| effective_parent(item, &known))
                .unwrap_or(None);

            siblings.remove(position);
            let mut promoted = ordered_children(items, grandparent, &known);
            let parent_position = promoted
                .iter()
                .position(|id| *id == parent_id)
                .unwrap_or(promoted.len().saturating_sub(1));
            promoted.insert(parent_position + 1, target_id);
            reparent(items, target_id, grandparent)?;
            resequence(items, &siblings);
            resequence(items, &promoted);
        }
    }

    Ok(MoveOutcome::Moved)
}

fn effective_parent(item: &Item, known: &HashSet<ItemId>) -> Option<ItemId> {
    item.parent_id().filter(|parent_id| known.contains(parent_id))
}

fn ordered_children(
    items: &[Item],
    parent_id: Option<ItemId>,
    known: &HashSet<ItemId>,
) -> Vec<ItemId> {
    let mut children: Vec<&Item> = items
        .iter()
        .filter(|item| effective_parent(item, known) == parent_id && Some(item.id()) != parent_id)
        .collect();
    children.sort_by_key(|item| (item.sort(), item.id()));
    children.into_iter().map(Item::id).collect()
}

fn resequence(items: &mut [Item], ordered_ids: &[ItemId]) {
    for (position, ordered_id) in ordered_ids.iter().enumerate() {
        if let Some(item) = items.iter_mut().find(|item| item.id() == *ordered_id) {
            item.set_sort(position as i64);
        }
    }
}

fn reparent(items: &mut [Item], target_id: ItemId, parent_id: Option<ItemId>) -> AppResult<()> {
    match items.iter_mut().find(|item| item.id() == target_id) {
        Some(item) => item.set_parent(parent_id),
        None => Err(AppError::NotFound(format!(
            "item '{target_id}' does not exist in this questionnaire"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use proptest::collection::vec;
    use proptest::option;
    use proptest::prelude::*;
    use quillform_core::{ItemId, QuestionnaireId};

    use crate::{Item, ItemType};

    use super::{MoveDirection, MoveOutcome, OutlineTree, apply_move};

    fn item(
        id: ItemId,
        questionnaire_id: QuestionnaireId,
        parent_id: Option<ItemId>,
        sort: i64,
    ) -> Item {
        Item::new(
            id,
            questionnaire_id,
            parent_id,
            ItemType::Question,
            "Question",
            None,
            sort,
            false,
            None,
        )
        .unwrap_or_else(|_| unreachable!())
    }

    fn three_level_fixture() -> (Vec<Item>, ItemId, ItemId, ItemId) {
        let questionnaire_id = QuestionnaireId::new();
        let root = ItemId::new();
        let child = ItemId::new();
        let grandchild = ItemId::new();

        let items = vec![
            item(root, questionnaire_id, None, 0),
            item(child, questionnaire_id, Some(root), 0),
            item(grandchild, questionnaire_id, Some(child), 0),
        ];

        (items, root, child, grandchild)
    }

    #[test]
    fn build_computes_depth_and_outline() {
        let (items, root, child, grandchild) = three_level_fixture();
        let tree = OutlineTree::build(&items);
        assert!(tree.is_ok());
        let tree = tree.unwrap_or_else(|_| unreachable!());

        assert_eq!(tree.depth_of(root), Some(0));
        assert_eq!(tree.depth_of(child), Some(1));
        assert_eq!(tree.depth_of(grandchild), Some(2));
        assert_eq!(tree.outline_of(root), Some("1"));
        assert_eq!(tree.outline_of(child), Some("1.1"));
        assert_eq!(tree.outline_of(grandchild), Some("1.1.1"));
    }

    #[test]
    fn build_promotes_dangling_parent_to_root() {
        let questionnaire_id = QuestionnaireId::new();
        let orphan = item(ItemId::new(), questionnaire_id, Some(ItemId::new()), 0);
        let tree = OutlineTree::build(std::slice::from_ref(&orphan));
        assert!(tree.is_ok());
        assert_eq!(
            tree.unwrap_or_else(|_| unreachable!()).depth_of(orphan.id()),
            Some(0)
        );
    }

    #[test]
    fn build_rejects_parent_cycle() {
        let questionnaire_id = QuestionnaireId::new();
        let left = ItemId::new();
        let right = ItemId::new();
        let items = vec![
            item(left, questionnaire_id, Some(right), 0),
            item(right, questionnaire_id, Some(left), 1),
        ];

        assert!(OutlineTree::build(&items).is_err());
    }

    #[test]
    fn flatten_is_preorder() {
        let (items, root, child, grandchild) = three_level_fixture();
        let tree = OutlineTree::build(&items);
        assert!(tree.is_ok());

        let flattened: Vec<ItemId> = tree
            .unwrap_or_else(|_| unreachable!())
            .flatten()
            .iter()
            .map(super::OutlineEntry::item_id)
            .collect();
        assert_eq!(flattened, vec![root, child, grandchild]);
    }

    #[test]
    fn move_up_at_first_sibling_is_boundary() {
        let questionnaire_id = QuestionnaireId::new();
        let first = ItemId::new();
        let second = ItemId::new();
        let mut items = vec![
            item(first, questionnaire_id, None, 0),
            item(second, questionnaire_id, None, 1),
        ];
        let before = items.clone();

        let outcome = apply_move(&mut items, first, MoveDirection::Up);
        assert!(outcome.is_ok());
        assert_eq!(
            outcome.unwrap_or(MoveOutcome::Moved),
            MoveOutcome::Boundary
        );
        assert_eq!(items, before);
    }

    #[test]
    fn move_down_at_last_sibling_is_boundary() {
        let questionnaire_id = QuestionnaireId::new();
        let first = ItemId::new();
        let second = ItemId::new();
        let mut items = vec![
            item(first, questionnaire_id, None, 0),
            item(second, questionnaire_id, None, 1),
        ];
        let before = items.clone();

        let outcome = apply_move(&mut items, second, MoveDirection::Down);
        assert!(outcome.is_ok());
        assert_eq!(
            outcome.unwrap_or(MoveOutcome::Moved),
            MoveOutcome::Boundary
        );
        assert_eq!(items, before);
    }

    #[test]
    fn move_out_at_root_is_boundary() {
        let questionnaire_id = QuestionnaireId::new();
        let root = ItemId::new();
        let mut items = vec![item(root, questionnaire_id, None, 0)];
        let before = items.clone();

        let outcome = apply_move(&mut items, root, MoveDirection::Out);
        assert!(outcome.is_ok());
        assert_eq!(
            outcome.unwrap_or(MoveOutcome::Moved),
            MoveOutcome::Boundary
        );
        assert_eq!(items, before);
    }

    #[test]
    fn move_in_without_preceding_sibling_is_boundary() {
        let questionnaire_id = QuestionnaireId::new();
        let first = ItemId::new();
        let second = ItemId::new();
        let mut items = vec![
            item(first, questionnaire_id, None, 0),
            item(second, questionnaire_id, None, 1),
        ];
        let before = items.clone();

        let outcome = apply_move(&mut items, first, MoveDirection::In);
        assert!(outcome.is_ok());
        assert_eq!(
            outcome.unwrap_or(MoveOutcome::Moved),
            MoveOutcome::Boundary
        );
        assert_eq!(items, before);
    }

    #[test]
    fn move_up_swaps_siblings() {
        let questionnaire_id = QuestionnaireId::new();
        let first = ItemId::new();
        let second = ItemId::new();
        let mut items = vec![
            item(first, questionnaire_id, None, 0),
            item(second, questionnaire_id, None, 1),
        ];

        let outcome = apply_move(&mut items, second, MoveDirection::Up);
        assert!(outcome.is_ok());
        assert_eq!(outcome.unwrap_or(MoveOutcome::Boundary), MoveOutcome::Moved);

        let tree = OutlineTree::build(&items);
        assert!(tree.is_ok());
        let flattened: Vec<ItemId> = tree
            .unwrap_or_else(|_| unreachable!())
            .flatten()
            .iter()
            .map(super::OutlineEntry::item_id)
            .collect();
        assert_eq!(flattened, vec![second, first]);
    }

    #[test]
    fn move_in_adopts_as_last_child_of_preceding_sibling() {
        let questionnaire_id = QuestionnaireId::new();
        let first = ItemId::new();
        let existing_child = ItemId::new();
        let second = ItemId::new();
        let mut items = vec![
            item(first, questionnaire_id, None, 0),
            item(existing_child, questionnaire_id, Some(first), 0),
            item(second, questionnaire_id, None, 1),
        ];

        let outcome = apply_move(&mut items, second, MoveDirection::In);
        assert!(outcome.is_ok());
        assert_eq!(outcome.unwrap_or(MoveOutcome::Boundary), MoveOutcome::Moved);

        let tree = OutlineTree::build(&items);
        assert!(tree.is_ok());
        let tree = tree.unwrap_or_else(|_| unreachable!());
        assert_eq!(tree.depth_of(second), Some(1));
        assert_eq!(tree.outline_of(second), Some("1.2"));
    }

    #[test]
    fn move_out_places_item_directly_after_former_parent() {
        let (mut items, root, child, grandchild) = three_level_fixture();

        let outcome = apply_move(&mut items, grandchild, MoveDirection::Out);
        assert!(outcome.is_ok());
        assert_eq!(outcome.unwrap_or(MoveOutcome::Boundary), MoveOutcome::Moved);

        let tree = OutlineTree::build(&items);
        assert!(tree.is_ok());
        let tree = tree.unwrap_or_else(|_| unreachable!());
        assert_eq!(tree.depth_of(grandchild), Some(1));

        let flattened: Vec<ItemId> = tree
            .flatten()
            .iter()
            .map(super::OutlineEntry::item_id)
            .collect();
        assert_eq!(flattened, vec![root, child, grandchild]);
        assert_eq!(tree.outline_of(grandchild), Some("1.2"));
    }

    proptest! {
        #[test]
        fn build_terminates_and_links_depth_to_parent(
            parents in (1usize..16).prop_flat_map(|count| vec(option::of(0..count), count)),
            sorts in vec(0i64..4, 16),
        ) {
            let questionnaire_id = QuestionnaireId::new();
            let ids: Vec<ItemId> = parents.iter().map(|_| ItemId::new()).collect();
            let items: Vec<Item> = parents
                .iter()
                .enumerate()
                .map(|(index, parent)| {
                    item(
                        ids[index],
                        questionnaire_id,
                        parent
                            .filter(|parent_index| *parent_index != index)
                            .map(|parent_index| ids[parent_index]),
                        sorts[index % sorts.len()],
                    )
                })
                .collect();

            // Arbitrary parent links may form cycles; build must terminate
            // either way, and a successful build must satisfy the depth rule.
            if let Ok(tree) = OutlineTree::build(&items) {
                for built in &items {
                    let depth = tree.depth_of(built.id());
                    prop_assert!(depth.is_some());

                    let parent_depth = built
                        .parent_id()
                        .filter(|parent_id| items.iter().any(|other| other.id() == *parent_id))
                        .and_then(|parent_id| tree.depth_of(parent_id));
                    match parent_depth {
                        Some(parent_depth) => {
                            prop_assert_eq!(depth.unwrap_or_default(), parent_depth + 1);
                        }
                        None => prop_assert_eq!(depth.unwrap_or(1), 0),
                    }
                }
            }
        }

        #[test]
        fn sibling_order_is_deterministic_under_equal_sort(
            count in 2usize..12,
        ) {
            let questionnaire_id = QuestionnaireId::new();
            let items: Vec<Item> = (0..count)
                .map(|_| item(ItemId::new(), questionnaire_id, None, 7))
                .collect();

            let first = OutlineTree::build(&items);
            let second = OutlineTree::build(&items);
            prop_assert!(first.is_ok());
            prop_assert!(second.is_ok());

            let first_order: Vec<ItemId> = first
                .unwrap_or_else(|_| unreachable!())
                .flatten()
                .iter()
                .map(super::OutlineEntry::item_id)
                .collect();
            let second_order: Vec<ItemId> = second
                .unwrap_or_else(|_| unreachable!())
                .flatten()
                .iter()
                .map(super::OutlineEntry::item_id)
                .collect();

            let mut expected: Vec<ItemId> = items.iter().map(Item::id).collect();
            expected.sort();
            prop_assert_eq!(&first_order, &second_order);
            prop_assert_eq!(first_order, expected);
        }
    }
}
