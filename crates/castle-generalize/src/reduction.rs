//! Suppression of trailing characters.
//!
//! Values are rendered as text and cut back to their longest common prefix;
//! every suppressed position is replaced by `*`:
//!
//! ```text
//! 90210, 90211, 90299  ->  902**
//! ```

use std::collections::BTreeSet;

use castle_types::{ConfigError, Family, Record, RuleSet, Value};

use crate::{Generalization, Generalizer, ratio};

const SUPPRESSED: char = '*';

/// Reduces values to their shared prefix.
///
/// Holds no incremental state: the loss depends only on the records it is
/// evaluated against, so [`Generalizer::observe`] is a no-op.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReductionGeneralizer {
    attributes: BTreeSet<usize>,
}

impl ReductionGeneralizer {
    /// Takes every reduction-family attribute of `rules`.
    pub fn new(rules: &RuleSet) -> Self {
        Self {
            attributes: rules
                .attributes_of(Family::Reduction)
                .map(|(i, _)| i)
                .collect(),
        }
    }
}

fn text_at(record: &Record, attribute: usize) -> Option<String> {
    match record.get(attribute)? {
        Value::Null => None,
        Value::Text(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl Generalizer for ReductionGeneralizer {
    fn family(&self) -> Family {
        Family::Reduction
    }

    fn observe(&mut self, _record: &Record) {}

    fn evaluate(&self, records: &[&Record], attribute: usize) -> Result<Generalization, ConfigError> {
        if !self.attributes.contains(&attribute) {
            return Err(ConfigError::NotConfigured {
                attribute,
                family: Family::Reduction,
            });
        }

        let mut values = records.iter().filter_map(|r| text_at(r, attribute));
        let Some(first) = values.next() else {
            return Ok(Generalization::empty());
        };

        let mut prefix: Vec<char> = first.chars().collect();
        let mut longest = prefix.len();
        for value in values {
            let shared = value
                .chars()
                .zip(prefix.iter())
                .take_while(|(a, b)| a == *b)
                .count();
            prefix.truncate(shared);
            longest = longest.max(value.chars().count());
        }

        let suppressed = longest - prefix.len();
        let mut output: String = prefix.into_iter().collect();
        output.extend(std::iter::repeat_n(SUPPRESSED, suppressed));

        Ok(Generalization::new(
            Value::Text(output),
            ratio(suppressed, longest),
        ))
    }
}
