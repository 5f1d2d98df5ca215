//! Read-only views over a collection.

use serde::{Deserialize, Serialize};

use crate::models::PatientRecord;

/// Summary figures shown above the patient table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStats {
    pub count: usize,
    /// Mean age rounded to the nearest year, halves rounding up. 0 when empty.
    pub average_age: i64,
}

/// Records whose name or disease contains `term`, ignoring case.
///
/// An empty term matches everything.
pub fn search(records: &[PatientRecord], term: &str) -> Vec<PatientRecord> {
    if term.is_empty() {
        return records.to_vec();
    }
    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|r| r.matches(&needle))
        .cloned()
        .collect()
}

/// Count and rounded average age of `records`.
pub fn stats(records: &[PatientRecord]) -> CollectionStats {
    if records.is_empty() {
        return CollectionStats::default();
    }
    let total: f64 = records.iter().map(|r| r.age as f64).sum();
    let mean = total / records.len() as f64;
    CollectionStats {
        count: records.len(),
        average_age: (mean + 0.5).floor() as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatientInput;
    use proptest::prelude::*;

    fn record(id: i64, name: &str, age: i64, disease: &str) -> PatientRecord {
        PatientRecord::new(id, &PatientInput::new(name, age, disease), "t".into())
    }

    fn ages(ages: &[i64]) -> Vec<PatientRecord> {
        ages.iter()
            .enumerate()
            .map(|(i, &age)| record(i as i64, "Jo", age, "flu"))
            .collect()
    }

    #[test]
    fn test_stats_empty() {
        assert_eq!(
            stats(&[]),
            CollectionStats {
                count: 0,
                average_age: 0
            }
        );
    }

    #[test]
    fn test_stats_rounding() {
        assert_eq!(
            stats(&ages(&[10, 20, 21])),
            CollectionStats {
                count: 3,
                average_age: 17
            }
        );
        // 10.5 rounds up
        assert_eq!(stats(&ages(&[10, 11])).average_age, 11);
        // 10.33 rounds down
        assert_eq!(stats(&ages(&[10, 10, 11])).average_age, 10);
    }

    #[test]
    fn test_search_empty_term_returns_all() {
        let records = vec![record(1, "Ann", 30, "cold"), record(2, "Bob", 40, "flu")];
        assert_eq!(search(&records, ""), records);
    }

    #[test]
    fn test_search_name_and_disease() {
        let records = vec![
            record(1, "Ann Malaria", 30, "cold"),
            record(2, "Bob", 40, "Malaria"),
            record(3, "Cy", 50, "flu"),
        ];
        let found = search(&records, "MALARIA");
        let ids: Vec<_> = found.iter().filter_map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_search_preserves_order() {
        let records = vec![
            record(3, "Flo", 30, "cold"),
            record(1, "Ann", 40, "flu"),
            record(2, "Bo", 50, "flu"),
        ];
        let ids: Vec<_> = search(&records, "fl").iter().filter_map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    proptest! {
        #[test]
        fn prop_search_is_exact_filter(
            names in prop::collection::vec("[a-zA-Z]{2,8}", 0..12),
            term in "[a-zA-Z]{0,3}",
        ) {
            let records: Vec<_> = names
                .iter()
                .enumerate()
                .map(|(i, n)| record(i as i64, n, 30, "checkup"))
                .collect();
            let found = search(&records, &term);
            let needle = term.to_lowercase();

            for r in &found {
                prop_assert!(term.is_empty() || r.matches(&needle));
            }
            let expected = records
                .iter()
                .filter(|r| term.is_empty() || r.matches(&needle))
                .count();
            prop_assert_eq!(found.len(), expected);
        }

        #[test]
        fn prop_average_within_bounds(values in prop::collection::vec(0i64..=120, 1..30)) {
            let s = stats(&ages(&values));
            let min = *values.iter().min().unwrap();
            let max = *values.iter().max().unwrap();
            prop_assert_eq!(s.count, values.len());
            prop_assert!(s.average_age >= min && s.average_age <= max);
        }
    }
}
