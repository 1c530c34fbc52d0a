use std::collections::HashSet;
use std::hash::Hash;

/// Removes exact duplicates, keeping the first occurrence of each value
/// and the original order otherwise.
///
/// Sibling repositories under one parent each synthesize the same chain
/// of directory records; this collapses them.
pub fn dedup<T: Eq + Hash + Clone>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use griffin_core::{LocationKind, LocationRecord};

    #[test]
    fn test_keeps_first_seen_order() {
        assert_eq!(dedup(vec![3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(dedup(Vec::<u8>::new()).is_empty());
    }

    #[test]
    fn test_compares_every_field() {
        let team = LocationRecord::directory("/code", "team");
        let repo = LocationRecord::repository(
            "/code",
            "team",
            "https://github.com/o/team",
            LocationKind::Github,
        );

        let records = vec![team.clone(), repo.clone(), team.clone()];
        assert_eq!(dedup(records), vec![team, repo]);
    }
}
