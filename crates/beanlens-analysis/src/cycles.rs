//! Cycle detection over the resolved wiring graph.

use std::collections::HashSet;

use crate::model::{Bean, Wiring};

/// Depth-first search rooted at every bean, in declaration order.
/// Null-target edges are excluded up front. When a neighbor already on the
/// traversal stack is met, the sub-path from its earliest occurrence through
/// the current node is recorded (the closing repeat is implicit).
///
/// Restarting from every root can record the same underlying loop more than
/// once under different rotations; with `dedupe` set, cycles are normalized
/// by rotating to their lexicographically smallest member and duplicates are
/// dropped, keeping discovery order.
pub fn detect_cycles(beans: &[Bean], wirings: &[Wiring], dedupe: bool) -> Vec<Vec<String>> {
    let names: Vec<&str> = beans.iter().map(|b| b.bean_name.as_str()).collect();
    let index_of = |name: &str| names.iter().position(|n| *n == name);

    let mut edges: Vec<Vec<usize>> = vec![Vec::new(); names.len()];
    for wiring in wirings {
        let Some(to) = wiring.to.as_deref() else {
            continue;
        };
        let (Some(from_idx), Some(to_idx)) = (index_of(&wiring.from), index_of(to)) else {
            continue;
        };
        edges[from_idx].push(to_idx);
    }

    fn dfs(
        node: usize,
        edges: &[Vec<usize>],
        stack: &mut Vec<usize>,
        on_stack: &mut Vec<bool>,
        visited: &mut Vec<bool>,
        out: &mut Vec<Vec<usize>>,
    ) {
        visited[node] = true;
        on_stack[node] = true;
        stack.push(node);

        for &next in &edges[node] {
            if !visited[next] {
                dfs(next, edges, stack, on_stack, visited, out);
            } else if on_stack[next] {
                if let Some(pos) = stack.iter().position(|&n| n == next) {
                    out.push(stack[pos..].to_vec());
                }
            }
        }

        stack.pop();
        on_stack[node] = false;
    }

    let mut visited = vec![false; names.len()];
    let mut on_stack = vec![false; names.len()];
    let mut stack = Vec::new();
    let mut found = Vec::new();

    for root in 0..names.len() {
        if !visited[root] {
            dfs(
                root,
                &edges,
                &mut stack,
                &mut on_stack,
                &mut visited,
                &mut found,
            );
        }
    }

    let cycles: Vec<Vec<String>> = found
        .into_iter()
        .map(|cycle| cycle.into_iter().map(|idx| names[idx].to_string()).collect())
        .collect();

    if !dedupe {
        return cycles;
    }

    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut out = Vec::new();
    for cycle in cycles {
        let normalized = normalize(&cycle);
        if seen.insert(normalized.clone()) {
            out.push(normalized);
        }
    }
    out
}

/// Rotate a cycle so its lexicographically smallest member comes first.
fn normalize(cycle: &[String]) -> Vec<String> {
    let Some(min_pos) = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, name)| name.as_str())
        .map(|(pos, _)| pos)
    else {
        return Vec::new();
    };
    let mut out = cycle.to_vec();
    out.rotate_left(min_pos);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BeanKind, Mechanism, WiringMetadata};
    use pretty_assertions::assert_eq;

    fn bean(name: &str) -> Bean {
        Bean {
            class_name: name.to_uppercase(),
            bean_name: name.to_string(),
            kind: BeanKind::Component,
        }
    }

    fn edge(from: &str, to: Option<&str>) -> Wiring {
        Wiring {
            from: from.to_string(),
            to: to.map(str::to_string),
            mechanism: Mechanism::Field,
            metadata: WiringMetadata::default(),
        }
    }

    #[test]
    fn two_cycle_is_found_once() {
        let beans = vec![bean("a"), bean("b")];
        let wirings = vec![edge("a", Some("b")), edge("b", Some("a"))];
        let cycles = detect_cycles(&beans, &wirings, true);
        assert_eq!(cycles, vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn self_loop_is_a_one_element_cycle() {
        let beans = vec![bean("a")];
        let wirings = vec![edge("a", Some("a"))];
        let cycles = detect_cycles(&beans, &wirings, true);
        assert_eq!(cycles, vec![vec!["a".to_string()]]);
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let beans = vec![bean("a"), bean("b"), bean("c")];
        let wirings = vec![edge("a", Some("b")), edge("b", Some("c"))];
        assert!(detect_cycles(&beans, &wirings, true).is_empty());
    }

    #[test]
    fn null_target_edges_are_excluded() {
        let beans = vec![bean("a"), bean("b")];
        let wirings = vec![edge("a", Some("b")), edge("b", None)];
        assert!(detect_cycles(&beans, &wirings, true).is_empty());
    }

    #[test]
    fn three_cycle_normalizes_to_smallest_rotation() {
        let beans = vec![bean("c"), bean("a"), bean("b")];
        let wirings = vec![
            edge("c", Some("a")),
            edge("a", Some("b")),
            edge("b", Some("c")),
        ];
        let cycles = detect_cycles(&beans, &wirings, true);
        assert_eq!(
            cycles,
            vec![vec!["a".to_string(), "b".to_string(), "c".to_string()]]
        );
    }

    #[test]
    fn raw_mode_keeps_at_least_as_many_cycles() {
        let beans = vec![bean("a"), bean("b")];
        let wirings = vec![edge("a", Some("b")), edge("b", Some("a"))];
        let raw = detect_cycles(&beans, &wirings, false);
        let deduped = detect_cycles(&beans, &wirings, true);
        assert!(raw.len() >= deduped.len());
        assert!(!raw.is_empty());
    }

    #[test]
    fn two_disjoint_cycles_are_both_found() {
        let beans = vec![bean("a"), bean("b"), bean("c"), bean("d")];
        let wirings = vec![
            edge("a", Some("b")),
            edge("b", Some("a")),
            edge("c", Some("d")),
            edge("d", Some("c")),
        ];
        let cycles = detect_cycles(&beans, &wirings, true);
        assert_eq!(cycles.len(), 2);
    }

    #[test]
    fn parallel_duplicate_edges_do_not_duplicate_cycles() {
        let beans = vec![bean("a"), bean("b")];
        let wirings = vec![
            edge("a", Some("b")),
            edge("a", Some("b")),
            edge("b", Some("a")),
        ];
        let cycles = detect_cycles(&beans, &wirings, true);
        assert_eq!(cycles.len(), 1);
    }
}
