use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metrics::Sample;
use super::rules::{Metric, RuleMatch, RuleTable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: Metric,
    pub value: f64,
    pub rule_id: String,
}

impl Anomaly {
    pub fn from_match(sample: &Sample, hit: &RuleMatch<'_>) -> Self {
        Self {
            time: sample.time,
            kind: hit.rule.metric,
            value: hit.value,
            rule_id: hit.rule.id.clone(),
        }
    }
}

pub struct AnomalyDetector {
    rules: RuleTable,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(RuleTable::anomaly_defaults())
    }
}

impl AnomalyDetector {
    pub fn new(rules: RuleTable) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// At most one anomaly per sample; the first rule in table order wins.
    pub fn classify(&self, sample: &Sample) -> Option<Anomaly> {
        self.detect(sample).map(|hit| Anomaly::from_match(sample, &hit))
    }

    pub fn detect<'a>(&'a self, sample: &Sample) -> Option<RuleMatch<'a>> {
        self.rules.first_match(sample)
    }

    pub fn analyze(&self, samples: &[Sample]) -> Vec<Anomaly> {
        samples.iter().filter_map(|s| self.classify(s)).collect()
    }
}
