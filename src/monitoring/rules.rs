//! Threshold rules shared by the anomaly detector, the notification
//! dispatcher and the weak-signal watch.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ThresholdSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Download,
    Upload,
    Latency,
    Ping,
    SignalStrength,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Download => write!(f, "download"),
            Metric::Upload => write!(f, "upload"),
            Metric::Latency => write!(f, "latency"),
            Metric::Ping => write!(f, "ping"),
            Metric::SignalStrength => write!(f, "signal_strength"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Above,
    Below,
}

impl Comparison {
    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::Above => value > threshold,
            Comparison::Below => value < threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Success => write!(f, "success"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Anything that can report a value for a [`Metric`].
pub trait MetricSource {
    fn metric(&self, metric: Metric) -> Option<f64>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    pub id: String,
    pub metric: Metric,
    pub comparison: Comparison,
    pub threshold: f64,
    pub severity: Severity,
    pub title: String,
    /// `{value}` and `{threshold}` are substituted on render.
    pub message_template: String,
}

impl AlertRule {
    pub fn new(
        id: &str,
        metric: Metric,
        comparison: Comparison,
        threshold: f64,
        severity: Severity,
        title: &str,
        message_template: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            metric,
            comparison,
            threshold,
            severity,
            title: title.to_string(),
            message_template: message_template.to_string(),
        }
    }

    pub fn weak_signal(threshold: f64) -> Self {
        Self::new(
            "weak_signal",
            Metric::SignalStrength,
            Comparison::Below,
            threshold,
            Severity::Warning,
            "Weak signal",
            "Signal strength dropped to {value}% (below {threshold}%)",
        )
    }

    pub fn is_violated(&self, value: f64) -> bool {
        self.comparison.holds(value, self.threshold)
    }

    /// The metric value if this rule fires for `source`.
    pub fn evaluate<S: MetricSource + ?Sized>(&self, source: &S) -> Option<f64> {
        source
            .metric(self.metric)
            .filter(|value| self.is_violated(*value))
    }

    pub fn render(&self, value: f64) -> String {
        self.message_template
            .replace("{value}", &format!("{:.1}", value))
            .replace("{threshold}", &format!("{:.1}", self.threshold))
    }
}

/// A rule that fired, with the value that made it fire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleMatch<'a> {
    pub rule: &'a AlertRule,
    pub value: f64,
}

/// Ordered collection of rules. Order is priority for [`RuleTable::first_match`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    rules: Vec<AlertRule>,
}

impl RuleTable {
    pub fn new(rules: Vec<AlertRule>) -> Self {
        Self { rules }
    }

    /// Sample anomaly rules, in priority order.
    pub fn anomaly_defaults() -> Self {
        Self::anomaly_from_settings(&ThresholdSettings::default())
    }

    /// Snapshot notification rules, all independent.
    pub fn dispatch_defaults() -> Self {
        Self::dispatch_from_settings(&ThresholdSettings::default())
    }

    pub fn anomaly_from_settings(thresholds: &ThresholdSettings) -> Self {
        Self::new(vec![
            AlertRule::new(
                "latency_high",
                Metric::Latency,
                Comparison::Above,
                thresholds.latency_high,
                Severity::Warning,
                "Latency anomaly",
                "Latency at {value} ms exceeds {threshold} ms",
            ),
            AlertRule::new(
                "download_low",
                Metric::Download,
                Comparison::Below,
                thresholds.download_low,
                Severity::Warning,
                "Download anomaly",
                "Download at {value} Mbps is under {threshold} Mbps",
            ),
            AlertRule::new(
                "upload_low",
                Metric::Upload,
                Comparison::Below,
                thresholds.upload_low,
                Severity::Warning,
                "Upload anomaly",
                "Upload at {value} Mbps is under {threshold} Mbps",
            ),
        ])
    }

    pub fn dispatch_from_settings(thresholds: &ThresholdSettings) -> Self {
        Self::new(vec![
            AlertRule::new(
                "speed_low",
                Metric::Download,
                Comparison::Below,
                thresholds.speed_low,
                Severity::Warning,
                "Low speed",
                "Download speed is only {value} Mbps",
            ),
            AlertRule::new(
                "ping_high",
                Metric::Ping,
                Comparison::Above,
                thresholds.ping_high,
                Severity::Warning,
                "High ping",
                "Ping is {value} ms, above {threshold} ms",
            ),
            AlertRule::new(
                "speed_excellent",
                Metric::Download,
                Comparison::Above,
                thresholds.speed_excellent,
                Severity::Success,
                "Excellent speed",
                "Download speed reached {value} Mbps",
            ),
        ])
    }

    pub fn rules(&self) -> &[AlertRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn first_match<S: MetricSource + ?Sized>(&self, source: &S) -> Option<RuleMatch<'_>> {
        self.rules.iter().find_map(|rule| {
            rule.evaluate(source)
                .map(|value| RuleMatch { rule, value })
        })
    }

    pub fn matches<'a, S: MetricSource + ?Sized + 'a>(
        &'a self,
        source: &'a S,
    ) -> impl Iterator<Item = RuleMatch<'a>> + 'a {
        self.rules.iter().filter_map(move |rule| {
            rule.evaluate(source)
                .map(|value| RuleMatch { rule, value })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<(Metric, f64)>);

    impl MetricSource for Fixed {
        fn metric(&self, metric: Metric) -> Option<f64> {
            self.0.iter().find(|(m, _)| *m == metric).map(|(_, v)| *v)
        }
    }

    #[test]
    fn comparisons_are_strict() {
        assert!(!Comparison::Above.holds(25.0, 25.0));
        assert!(!Comparison::Below.holds(40.0, 40.0));
        assert!(Comparison::Above.holds(25.1, 25.0));
        assert!(Comparison::Below.holds(39.9, 40.0));
    }

    #[test]
    fn missing_metric_never_matches() {
        let table = RuleTable::dispatch_defaults();
        let source = Fixed(vec![(Metric::Latency, 500.0)]);
        assert!(table.first_match(&source).is_none());
        assert_eq!(table.matches(&source).count(), 0);
    }

    #[test]
    fn render_substitutes_placeholders() {
        let rule = AlertRule::weak_signal(30.0);
        assert_eq!(
            rule.render(12.0),
            "Signal strength dropped to 12.0% (below 30.0%)"
        );
    }

    #[test]
    fn thresholds_come_from_settings() {
        let thresholds = ThresholdSettings {
            ping_high: 50.0,
            ..ThresholdSettings::default()
        };
        let table = RuleTable::dispatch_from_settings(&thresholds);
        let source = Fixed(vec![(Metric::Ping, 60.0), (Metric::Download, 50.0)]);
        let fired: Vec<_> = table.matches(&source).map(|m| m.rule.id.as_str()).collect();
        assert_eq!(fired, vec!["ping_high"]);
    }
}
