//! Level assignment: an ordered partition of beans into rows for the
//! rendering layer. Explicitly not a topological sort: it terminates on any
//! graph, cycles included, and carries no dependency-order guarantee.

use std::collections::HashSet;

use crate::model::{Bean, Wiring};

/// Row 0 holds the beans with no incoming resolved edges. Each following row
/// holds the beans whose incoming edges all originate in prior rows (beans
/// with no incoming edges at all are swept in unconditionally, which is what
/// guarantees termination). Whatever never becomes placeable, i.e. pure
/// cycle participants, ends up in one final row.
pub fn bean_levels(beans: &[Bean], wirings: &[Wiring]) -> Vec<Vec<String>> {
    let resolved: Vec<(&str, &str)> = wirings.iter().filter_map(|w| w.resolved()).collect();

    let mut levels: Vec<Vec<String>> = Vec::new();
    let mut assigned: HashSet<&str> = HashSet::new();

    loop {
        let mut row: Vec<&str> = Vec::new();
        for bean in beans {
            let name = bean.bean_name.as_str();
            if assigned.contains(name) || row.contains(&name) {
                continue;
            }
            let placeable = resolved
                .iter()
                .filter(|(_, to)| *to == name)
                .all(|(from, _)| assigned.contains(from));
            if placeable {
                row.push(name);
            }
        }
        if row.is_empty() {
            break;
        }
        assigned.extend(row.iter().copied());
        levels.push(row.into_iter().map(str::to_string).collect());
    }

    let leftover: Vec<String> = beans
        .iter()
        .map(|b| b.bean_name.as_str())
        .filter(|name| !assigned.contains(name))
        .map(str::to_string)
        .collect();
    if !leftover.is_empty() {
        levels.push(leftover);
    }

    levels
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

    fn edge(from: &str, to: &str) -> Wiring {
        Wiring {
            from: from.to_string(),
            to: Some(to.to_string()),
            mechanism: Mechanism::Field,
            metadata: WiringMetadata::default(),
        }
    }

    fn rows(levels: &[Vec<String>]) -> Vec<Vec<&str>> {
        levels
            .iter()
            .map(|row| row.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn root_then_dependents() {
        let beans = vec![bean("root"), bean("dep1"), bean("dep2")];
        let wirings = vec![edge("root", "dep1"), edge("root", "dep2")];
        let levels = bean_levels(&beans, &wirings);
        assert_eq!(rows(&levels), vec![vec!["root"], vec!["dep1", "dep2"]]);
    }

    #[test]
    fn isolated_beans_all_land_in_row_zero() {
        let beans = vec![bean("a"), bean("b")];
        let levels = bean_levels(&beans, &[]);
        assert_eq!(rows(&levels), vec![vec!["a", "b"]]);
    }

    #[test]
    fn chain_produces_one_row_per_link() {
        let beans = vec![bean("a"), bean("b"), bean("c")];
        let wirings = vec![edge("a", "b"), edge("b", "c")];
        let levels = bean_levels(&beans, &wirings);
        assert_eq!(rows(&levels), vec![vec!["a"], vec!["b"], vec!["c"]]);
    }

    #[test]
    fn diamond_waits_for_all_sources() {
        let beans = vec![bean("a"), bean("b"), bean("c"), bean("d")];
        let wirings = vec![
            edge("a", "b"),
            edge("a", "c"),
            edge("b", "d"),
            edge("c", "d"),
        ];
        let levels = bean_levels(&beans, &wirings);
        assert_eq!(rows(&levels), vec![vec!["a"], vec!["b", "c"], vec!["d"]]);
    }

    #[test]
    fn pure_cycle_falls_into_a_final_row() {
        let beans = vec![bean("a"), bean("x"), bean("y")];
        let wirings = vec![edge("x", "y"), edge("y", "x")];
        let levels = bean_levels(&beans, &wirings);
        assert_eq!(rows(&levels), vec![vec!["a"], vec!["x", "y"]]);
    }

    #[test]
    fn null_target_edges_do_not_affect_placement() {
        let beans = vec![bean("a"), bean("b")];
        let wirings = vec![Wiring {
            from: "a".to_string(),
            to: None,
            mechanism: Mechanism::Method,
            metadata: WiringMetadata::default(),
        }];
        let levels = bean_levels(&beans, &wirings);
        assert_eq!(rows(&levels), vec![vec!["a", "b"]]);
    }

    #[test]
    fn no_beans_means_no_rows() {
        assert!(bean_levels(&[], &[]).is_empty());
    }
}
