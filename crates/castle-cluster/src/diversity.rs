//! l-diversity bound over sensitive attributes.
//!
//! With one sensitive attribute the bound is the number of distinct values.
//! With several, records are peeled greedily: each round finds the single
//! most frequent (attribute, value) pair among the remaining records and
//! drops every record carrying it. The number of rounds needed to exhaust
//! the cluster is the bound.
//!
//! Ties are broken deterministically:
//! - within an attribute, the value first seen in stored record order wins;
//! - across attributes, the lowest attribute index wins.
//!
//! Cost is `O(rounds × n × |sensitive|)`, fine for clusters bounded by the
//! anonymity parameter.

use std::collections::{HashMap, HashSet, hash_map::Entry};

use castle_types::{Record, Value};

use crate::cluster::Cluster;
use crate::error::{ClusterError, ClusterResult};

impl Cluster {
    /// Diversity bound of the stored records over `sensitive` attributes.
    ///
    /// An empty attribute list yields 0 without looking at the records.
    ///
    /// # Errors
    ///
    /// - [`ClusterError::EmptyCluster`] if attributes are given but no record
    ///   is stored.
    /// - [`ClusterError::AttributeOutOfRange`] if a sensitive index is past
    ///   the end of a stored record.
    pub fn diversity(&self, sensitive: &[usize]) -> ClusterResult<usize> {
        if sensitive.is_empty() {
            return Ok(0);
        }
        self.ensure_populated("diversity")?;
        diversity_bound(&self.records, sensitive)
    }
}

/// Diversity bound of `records` over `sensitive` attributes.
///
/// Works on borrowed records; nothing is cloned or removed from `records`.
pub fn diversity_bound(records: &[Record], sensitive: &[usize]) -> ClusterResult<usize> {
    match sensitive {
        [] => Ok(0),
        [attribute] => {
            let mut distinct = HashSet::new();
            for record in records {
                distinct.insert(value_at(record, *attribute)?);
            }
            Ok(distinct.len())
        }
        _ => peel(records, sensitive),
    }
}

fn peel(records: &[Record], sensitive: &[usize]) -> ClusterResult<usize> {
    let mut remaining: Vec<&Record> = records.iter().collect();
    let mut rounds = 0;

    while !remaining.is_empty() {
        rounds += 1;

        let mut best: Option<TopValue<'_>> = None;
        for &attribute in sensitive {
            let Some(top) = most_common(&remaining, attribute)? else {
                continue;
            };
            let wins = best.as_ref().is_none_or(|b| {
                top.count > b.count || (top.count == b.count && top.attribute < b.attribute)
            });
            if wins {
                best = Some(top);
            }
        }

        // Non-empty `remaining` always yields a winner
        let Some(best) = best else { break };
        remaining.retain(|r| r.get(best.attribute) != Some(best.value));
    }

    Ok(rounds)
}

/// The most frequent value of one attribute.
#[derive(Debug, Clone, Copy)]
struct TopValue<'a> {
    attribute: usize,
    value: &'a Value,
    count: usize,
}

/// `None` only when `remaining` is empty.
fn most_common<'a>(
    remaining: &[&'a Record],
    attribute: usize,
) -> ClusterResult<Option<TopValue<'a>>> {
    let mut slots: HashMap<&'a Value, usize> = HashMap::new();
    let mut counts: Vec<(&'a Value, usize)> = Vec::new();

    for &record in remaining {
        let value = value_at(record, attribute)?;
        match slots.entry(value) {
            Entry::Occupied(slot) => counts[*slot.get()].1 += 1,
            Entry::Vacant(slot) => {
                slot.insert(counts.len());
                counts.push((value, 1));
            }
        }
    }

    // Strict comparison keeps the earliest value among equal counts
    let top = counts
        .into_iter()
        .reduce(|top, next| if next.1 > top.1 { next } else { top });

    Ok(top.map(|(value, count)| TopValue {
        attribute,
        value,
        count,
    }))
}

fn value_at(record: &Record, attribute: usize) -> ClusterResult<&Value> {
    record.get(attribute).ok_or(ClusterError::AttributeOutOfRange {
        attribute,
        arity: record.arity(),
    })
}
