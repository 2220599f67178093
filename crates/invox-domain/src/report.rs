//! Aggregate reporting over persisted records.

use crate::invoice::InvoiceRecord;
use std::collections::BTreeMap;

/// Count and sum for one client group.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientGroup {
    /// Client name; `None` is its own group for records without one.
    pub client: Option<String>,
    /// Number of records in the group.
    pub count: usize,
    /// Sum of non-null amounts; `None` when every amount in the group is null.
    pub amount: Option<f64>,
}

/// Derived summary of the persisted record set. Recomputed on demand,
/// never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateReport {
    /// Total number of records.
    pub total_count: usize,
    /// Sum of all non-null amounts; `None` when there are none, matching
    /// SQL `SUM` over an empty or all-null column.
    pub total_amount: Option<f64>,
    /// Per-client breakdown, ordered lexicographically by client name with
    /// the null group last.
    pub clients: Vec<ClientGroup>,
}

/// Compute the aggregate report over a record set.
///
/// Pure function: reads the slice, produces the report, no side effects.
pub fn aggregate(records: &[InvoiceRecord]) -> AggregateReport {
    let mut named: BTreeMap<String, (usize, Option<f64>)> = BTreeMap::new();
    let mut unnamed: Option<(usize, Option<f64>)> = None;
    let mut total_amount: Option<f64> = None;

    for record in records {
        total_amount = add_nullable(total_amount, record.amount);

        match &record.client {
            Some(client) => {
                let entry = named.entry(client.clone()).or_insert((0, None));
                entry.0 += 1;
                entry.1 = add_nullable(entry.1, record.amount);
            }
            None => {
                let entry = unnamed.get_or_insert((0, None));
                entry.0 += 1;
                entry.1 = add_nullable(entry.1, record.amount);
            }
        }
    }

    let mut clients: Vec<ClientGroup> = named
        .into_iter()
        .map(|(client, (count, amount))| ClientGroup {
            client: Some(client),
            count,
            amount,
        })
        .collect();

    if let Some((count, amount)) = unnamed {
        clients.push(ClientGroup {
            client: None,
            count,
            amount,
        });
    }

    AggregateReport {
        total_count: records.len(),
        total_amount,
        clients,
    }
}

// SUM semantics: null operands do not contribute and do not zero the sum.
fn add_nullable(acc: Option<f64>, value: Option<f64>) -> Option<f64> {
    match (acc, value) {
        (acc, None) => acc,
        (None, Some(v)) => Some(v),
        (Some(a), Some(v)) => Some(a + v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(file: &str, client: Option<&str>, amount: Option<f64>) -> InvoiceRecord {
        InvoiceRecord {
            file: file.to_string(),
            client: client.map(String::from),
            amount,
            product: None,
        }
    }

    #[test]
    fn test_empty_set() {
        let report = aggregate(&[]);
        assert_eq!(report.total_count, 0);
        assert_eq!(report.total_amount, None);
        assert!(report.clients.is_empty());
    }

    #[test]
    fn test_single_record() {
        let report = aggregate(&[record("doc1.pdf", Some("Acme Corp"), Some(120.0))]);
        assert_eq!(report.total_count, 1);
        assert_eq!(report.total_amount, Some(120.0));
        assert_eq!(
            report.clients,
            vec![ClientGroup {
                client: Some("Acme Corp".to_string()),
                count: 1,
                amount: Some(120.0),
            }]
        );
    }

    #[test]
    fn test_all_null_amounts_sum_to_none() {
        let report = aggregate(&[
            record("a.pdf", Some("Acme"), None),
            record("b.pdf", Some("Acme"), None),
        ]);
        assert_eq!(report.total_count, 2);
        assert_eq!(report.total_amount, None);
        assert_eq!(report.clients[0].amount, None);
        assert_eq!(report.clients[0].count, 2);
    }

    #[test]
    fn test_null_amount_does_not_zero_sum() {
        let report = aggregate(&[
            record("a.pdf", Some("Acme"), Some(10.0)),
            record("b.pdf", Some("Acme"), None),
            record("c.pdf", Some("Acme"), Some(5.5)),
        ]);
        assert_eq!(report.total_amount, Some(15.5));
        assert_eq!(report.clients[0].amount, Some(15.5));
    }

    #[test]
    fn test_groups_ordered_with_null_client_last() {
        let report = aggregate(&[
            record("a.pdf", None, Some(1.0)),
            record("b.pdf", Some("Zeta"), Some(2.0)),
            record("c.pdf", Some("Acme"), Some(3.0)),
        ]);

        let order: Vec<Option<&str>> = report
            .clients
            .iter()
            .map(|g| g.client.as_deref())
            .collect();
        assert_eq!(order, vec![Some("Acme"), Some("Zeta"), None]);
    }

    #[test]
    fn test_deterministic_for_fixed_input() {
        let records = vec![
            record("a.pdf", Some("Beta"), Some(1.0)),
            record("b.pdf", None, None),
            record("c.pdf", Some("Alpha"), Some(2.0)),
        ];
        assert_eq!(aggregate(&records), aggregate(&records));
    }
}
