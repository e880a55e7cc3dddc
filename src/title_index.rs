use std::cmp::Ordering;

/// Ordered-tree index from lowercased title to the ids of the songs
/// currently carrying that title. Exact-key lookup only; substring
/// matching is the catalog's linear-scan fallback, not this index's job.
///
/// Invariant: a key is present iff its id bucket is non-empty, and no two
/// nodes ever hold overlapping ids.
#[derive(Debug, Default)]
pub struct TitleIndex {
    root: Option<Box<Node>>,
}

#[derive(Debug)]
struct Node {
    key: String,
    ids: Vec<String>,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

impl TitleIndex {
    /// Registers `id` under the lowercased `title`. Idempotent for an id
    /// already in the bucket.
    pub fn insert(&mut self, title: &str, id: &str) {
        let key = title.to_lowercase();
        self.root = Some(insert_node(self.root.take(), key, id));
    }

    /// Exact-key lookup; ids are in the order they acquired the title.
    pub fn search(&self, title: &str) -> Option<&[String]> {
        let key = title.to_lowercase();
        let mut node = self.root.as_deref();
        while let Some(current) = node {
            node = match key.as_str().cmp(current.key.as_str()) {
                Ordering::Less => current.left.as_deref(),
                Ordering::Greater => current.right.as_deref(),
                Ordering::Equal => return Some(&current.ids),
            };
        }
        None
    }

    /// Removes `id` from the bucket for `title`, pruning the node when the
    /// bucket empties.
    pub fn remove(&mut self, title: &str, id: &str) {
        let key = title.to_lowercase();
        self.root = remove_id(self.root.take(), &key, id);
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Keys with their buckets, in ascending key order.
    pub fn in_order(&self) -> Vec<(&str, &[String])> {
        let mut out = Vec::new();
        collect(self.root.as_deref(), &mut out);
        out
    }
}

fn insert_node(node: Option<Box<Node>>, key: String, id: &str) -> Box<Node> {
    let Some(mut node) = node else {
        return Box::new(Node {
            key,
            ids: vec![id.to_string()],
            left: None,
            right: None,
        });
    };

    match key.cmp(&node.key) {
        Ordering::Less => node.left = Some(insert_node(node.left.take(), key, id)),
        Ordering::Greater => node.right = Some(insert_node(node.right.take(), key, id)),
        Ordering::Equal => {
            if !node.ids.iter().any(|existing| existing == id) {
                node.ids.push(id.to_string());
            }
        }
    }
    node
}

fn remove_id(node: Option<Box<Node>>, key: &str, id: &str) -> Option<Box<Node>> {
    let mut node = node?;
    match key.cmp(node.key.as_str()) {
        Ordering::Less => {
            node.left = remove_id(node.left.take(), key, id);
            Some(node)
        }
        Ordering::Greater => {
            node.right = remove_id(node.right.take(), key, id);
            Some(node)
        }
        Ordering::Equal => {
            node.ids.retain(|existing| existing != id);
            if node.ids.is_empty() {
                drop_node(node)
            } else {
                Some(node)
            }
        }
    }
}

/// Splices a node out of the tree. A two-children node takes over its
/// in-order successor's key and bucket, and the successor's original node
/// is then deleted wholesale so that no bucket ends up duplicated.
fn drop_node(mut node: Box<Node>) -> Option<Box<Node>> {
    match (node.left.take(), node.right.take()) {
        (None, None) => None,
        (Some(left), None) => Some(left),
        (None, Some(right)) => Some(right),
        (Some(left), Some(right)) => {
            let (succ_key, succ_ids) = min_bucket(&right);
            node.key = succ_key;
            node.ids = succ_ids;
            node.left = Some(left);
            node.right = remove_key(Some(right), &node.key);
            Some(node)
        }
    }
}

fn remove_key(node: Option<Box<Node>>, key: &str) -> Option<Box<Node>> {
    let mut node = node?;
    match key.cmp(node.key.as_str()) {
        Ordering::Less => {
            node.left = remove_key(node.left.take(), key);
            Some(node)
        }
        Ordering::Greater => {
            node.right = remove_key(node.right.take(), key);
            Some(node)
        }
        Ordering::Equal => drop_node(node),
    }
}

fn min_bucket(node: &Node) -> (String, Vec<String>) {
    let mut current = node;
    while let Some(left) = current.left.as_deref() {
        current = left;
    }
    (current.key.clone(), current.ids.clone())
}

fn collect<'a>(node: Option<&'a Node>, out: &mut Vec<(&'a str, &'a [String])>) {
    let Some(node) = node else {
        return;
    };
    collect(node.left.as_deref(), out);
    out.push((node.key.as_str(), node.ids.as_slice()));
    collect(node.right.as_deref(), out);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(entries: &[(&str, &str)]) -> TitleIndex {
        let mut index = TitleIndex::default();
        for (title, id) in entries {
            index.insert(title, id);
        }
        index
    }

    fn assert_no_overlap(index: &TitleIndex) {
        let mut seen = std::collections::HashSet::new();
        for (key, ids) in index.in_order() {
            assert!(!ids.is_empty(), "empty bucket left under key {key}");
            for id in ids {
                assert!(seen.insert(id.clone()), "id {id} appears in two buckets");
            }
        }
    }

    #[test]
    fn search_is_case_insensitive_and_exact() {
        let index = index_of(&[("Song One", "S1"), ("Song One", "S2"), ("Other", "S3")]);
        assert_eq!(
            index.search("song one"),
            Some(&[String::from("S1"), String::from("S2")][..])
        );
        assert_eq!(index.search("OTHER"), Some(&[String::from("S3")][..]));
        assert_eq!(index.search("song"), None);
        assert_eq!(index.search("missing"), None);
    }

    #[test]
    fn insert_is_idempotent_per_id() {
        let mut index = index_of(&[("Rindu", "S1")]);
        index.insert("Rindu", "S1");
        assert_eq!(index.search("rindu"), Some(&[String::from("S1")][..]));
    }

    #[test]
    fn removing_last_id_prunes_the_key() {
        let mut index = index_of(&[("Alpha", "S1"), ("Beta", "S2")]);
        index.remove("Alpha", "S1");
        assert_eq!(index.search("alpha"), None);
        assert_eq!(index.search("beta"), Some(&[String::from("S2")][..]));
        assert_no_overlap(&index);
    }

    #[test]
    fn removing_one_of_two_ids_keeps_the_key() {
        let mut index = index_of(&[("Rindu", "S1"), ("Rindu", "S2")]);
        index.remove("Rindu", "S1");
        assert_eq!(index.search("rindu"), Some(&[String::from("S2")][..]));
    }

    #[test]
    fn two_children_deletion_promotes_in_order_successor() {
        // "m" sits at the root with subtrees on both sides.
        let mut index = index_of(&[
            ("m", "M"),
            ("d", "D"),
            ("t", "T"),
            ("p", "P"),
            ("z", "Z"),
        ]);
        index.remove("m", "M");

        let keys: Vec<&str> = index.in_order().iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, vec!["d", "p", "t", "z"]);
        assert_eq!(index.search("p"), Some(&[String::from("P")][..]));
        assert_no_overlap(&index);
    }

    #[test]
    fn deleting_every_id_empties_the_tree() {
        let entries = [
            ("m", "M"),
            ("d", "D"),
            ("t", "T"),
            ("b", "B"),
            ("f", "F"),
            ("p", "P"),
            ("z", "Z"),
        ];
        let mut index = index_of(&entries);
        for (title, id) in entries {
            index.remove(title, id);
            assert_no_overlap(&index);
        }
        assert!(index.is_empty());
    }

    #[test]
    fn remove_of_absent_key_is_a_no_op() {
        let mut index = index_of(&[("Alpha", "S1")]);
        index.remove("missing", "S9");
        index.remove("Alpha", "S9");
        assert_eq!(index.search("alpha"), Some(&[String::from("S1")][..]));
    }
}
