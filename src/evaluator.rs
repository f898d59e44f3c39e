// Path evaluator: query, locate and mutate the nodes a path expression selects

use crate::ast::{Location, PathExpr, Segment, Step};
use crate::value::Document;

/// A matched node together with the concrete location it was found at.
#[derive(Debug, Clone)]
pub struct Node<'a> {
    pub location: Location,
    pub value: &'a Document,
}

/// Select every node `path` addresses in `root`, in document order.
pub fn select<'a>(path: &PathExpr, root: &'a Document) -> Vec<Node<'a>> {
    let mut current = vec![Node {
        location: Location::root(),
        value: root,
    }];

    for segment in &path.segments {
        let mut next = Vec::new();
        for node in &current {
            match segment {
                Segment::Child(key) => {
                    if let Some(value) = node.value.get(key) {
                        next.push(Node {
                            location: node.location.child(Step::Key(key.clone())),
                            value,
                        });
                    }
                }
                Segment::Index(idx) => {
                    if let Some(i) = resolve_index(node.value, *idx) {
                        if let Some(value) = node.value.get_index(i) {
                            next.push(Node {
                                location: node.location.child(Step::Index(i)),
                                value,
                            });
                        }
                    }
                }
                Segment::Slice { start, end, step } => {
                    if let Some(arr) = node.value.as_array() {
                        for i in slice_indices(arr.len(), *start, *end, *step) {
                            next.push(Node {
                                location: node.location.child(Step::Index(i)),
                                value: &arr[i],
                            });
                        }
                    }
                }
                Segment::Wildcard => children(node, &mut next),
                Segment::Descendant(key) => collect_descendants(node, Some(key), &mut next),
                Segment::DescendantWildcard => collect_descendants(node, None, &mut next),
            }
        }
        current = next;
    }

    current
}

/// Every value `path` matches, in order.
pub fn query<'a>(path: &PathExpr, root: &'a Document) -> Vec<&'a Document> {
    select(path, root).into_iter().map(|node| node.value).collect()
}

/// Every concrete location `path` matches, in order.
pub fn locate(path: &PathExpr, root: &Document) -> Vec<Location> {
    select(path, root)
        .into_iter()
        .map(|node| node.location)
        .collect()
}

/// Walk `root` down to `location`, copying shared containers on the way.
pub fn resolve_mut<'a>(root: &'a mut Document, location: &Location) -> Option<&'a mut Document> {
    let mut current = root;
    for step in &location.steps {
        current = match step {
            Step::Key(key) => current.get_mut(key)?,
            Step::Index(i) => current.get_index_mut(*i)?,
        };
    }
    Some(current)
}

/// Run `f` on every node `path` matches and return how many nodes were touched.
///
/// Deeper locations are visited first, so rewriting a node never invalidates a
/// location below it that is still pending.
pub fn apply<F>(path: &PathExpr, root: &mut Document, mut f: F) -> usize
where
    F: FnMut(&mut Document),
{
    let mut locations = locate(path, root);
    locations.sort_by(|a, b| b.depth().cmp(&a.depth()));

    let mut touched = 0;
    for location in &locations {
        if let Some(slot) = resolve_mut(root, location) {
            f(slot);
            touched += 1;
        }
    }
    touched
}

fn resolve_index(value: &Document, idx: i64) -> Option<usize> {
    let len = value.as_array()?.len();
    if idx < 0 {
        len.checked_sub(idx.unsigned_abs() as usize)
    } else {
        Some(idx as usize)
    }
}

fn slice_indices(len: usize, start: Option<i64>, end: Option<i64>, step: Option<i64>) -> Vec<usize> {
    let len = len as i64;
    let step = step.unwrap_or(1);
    if step == 0 || len == 0 {
        return Vec::new();
    }

    let normalize = |idx: i64| if idx < 0 { len + idx } else { idx };
    let mut indices = Vec::new();

    if step > 0 {
        let lower = normalize(start.unwrap_or(0)).clamp(0, len);
        let upper = normalize(end.unwrap_or(len)).clamp(0, len);
        let mut i = lower;
        while i < upper {
            indices.push(i as usize);
            let Some(next) = i.checked_add(step) else { break };
            i = next;
        }
    } else {
        let upper = normalize(start.unwrap_or(len - 1)).clamp(-1, len - 1);
        let lower = end.map(normalize).unwrap_or(-len - 1).clamp(-1, len - 1);
        let mut i = upper;
        while i > lower {
            indices.push(i as usize);
            let Some(next) = i.checked_add(step) else { break };
            i = next;
        }
    }

    indices
}

fn children<'a>(node: &Node<'a>, out: &mut Vec<Node<'a>>) {
    match node.value {
        Document::Object(map) => {
            for (key, value) in map.iter() {
                out.push(Node {
                    location: node.location.child(Step::Key(key.clone())),
                    value,
                });
            }
        }
        Document::Array(arr) => {
            for (i, value) in arr.iter().enumerate() {
                out.push(Node {
                    location: node.location.child(Step::Index(i)),
                    value,
                });
            }
        }
        _ => {}
    }
}

/// Descendants in pre-order. With a key, only members of that name are kept,
/// but the walk still descends through every child.
fn collect_descendants<'a>(node: &Node<'a>, key: Option<&String>, out: &mut Vec<Node<'a>>) {
    let mut direct = Vec::new();
    children(node, &mut direct);

    if let Some(key) = key {
        if let Some(value) = node.value.get(key) {
            out.push(Node {
                location: node.location.child(Step::Key(key.clone())),
                value,
            });
        }
    }

    for child in direct {
        if key.is_none() {
            out.push(child.clone());
        }
        collect_descendants(&child, key, out);
    }
}
