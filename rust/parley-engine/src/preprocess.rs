//! Fanning one utterance out into alternative readings.

use std::fmt;

use parley_lookup::{Gazetteer, Utterance};

use crate::error::EngineResult;

/// Turns one utterance into one or more readings.
pub trait UtteranceProcessor: Send + Sync + fmt::Debug {
    fn process(&self, utterance: &Utterance) -> EngineResult<Vec<Utterance>>;
}

/// Marks gazetteer terms as entities, yielding one reading per compatible
/// combination of occurrences.
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    alias: String,
    gazetteer: Gazetteer,
}

impl EntityExtractor {
    pub fn new(alias: impl Into<String>, gazetteer: Gazetteer) -> Self {
        EntityExtractor {
            alias: alias.into(),
            gazetteer,
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }
}

impl UtteranceProcessor for EntityExtractor {
    fn process(&self, utterance: &Utterance) -> EngineResult<Vec<Utterance>> {
        let readings = self.gazetteer.readings(utterance, &self.alias);
        tracing::trace!(alias = %self.alias, readings = readings.len(), "extracted entities");
        Ok(readings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn chained_extractors_multiply_readings() {
        let employees = EntityExtractor::new("EMP", Gazetteer::from_terms("matt\n"));
        let priorities = EntityExtractor::new("PRIO", Gazetteer::from_terms("blocker\n"));
        let input = Utterance::parse("assign matt a blocker ticket");

        let mut readings = Vec::new();
        for reading in employees.process(&input).unwrap() {
            readings.extend(priorities.process(&reading).unwrap());
        }
        let texts: Vec<String> = readings.iter().map(ToString::to_string).collect();
        assert_eq!(
            texts,
            vec![
                "assign matt a blocker ticket",
                "assign matt a [PRIO: blocker] ticket",
                "assign [EMP: matt] a blocker ticket",
                "assign [EMP: matt] a [PRIO: blocker] ticket",
            ]
        );
    }
}
