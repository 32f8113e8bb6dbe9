use std::fmt::{self, Write};

/// The kind of metric being recorded.
///
/// Maps onto the DogStatsD type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

impl MetricKind {
    const fn type_code(self) -> &'static str {
        match self {
            Self::Counter => "c",
            Self::Gauge => "g",
            Self::Histogram => "h",
        }
    }
}

/// Different operations that can be performed on a metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricOperation {
    IncrementCounter(u64),
    SetCounter(u64),
    IncrementGauge(f64),
    DecrementGauge(f64),
    SetGauge(f64),
    RecordHistogram(f64),
}

impl MetricOperation {
    const fn kind(self) -> MetricKind {
        match self {
            Self::IncrementCounter(_) => MetricKind::Counter,
            // statsd counters have no absolute form, the closest is a gauge
            Self::SetCounter(_)
            | Self::IncrementGauge(_)
            | Self::DecrementGauge(_)
            | Self::SetGauge(_) => MetricKind::Gauge,
            Self::RecordHistogram(_) => MetricKind::Histogram,
        }
    }

    fn write_value(self, out: &mut String) -> fmt::Result {
        match self {
            Self::IncrementCounter(v) | Self::SetCounter(v) => write!(out, "{v}"),
            Self::IncrementGauge(v) => write!(out, "+{v}"),
            Self::DecrementGauge(v) => write!(out, "-{v}"),
            Self::SetGauge(v) | Self::RecordHistogram(v) => write!(out, "{v}"),
        }
    }
}

/// Data for a single metric emission.
///
/// `tags` are the metric's own labels, already rendered as `key:value`.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricData {
    pub name: String,
    pub tags: Vec<String>,
    pub operation: MetricOperation,
    pub sample_rate: f64,
}

impl MetricData {
    /// Renders the emission as a single DogStatsD line, without a trailing newline.
    ///
    /// `namespace` is prefixed verbatim and `constant_tags` are written before the metric's own tags.
    pub fn encode(&self, namespace: &str, constant_tags: &[String]) -> String {
        let mut line = String::with_capacity(namespace.len() + self.name.len() + 32);
        // writing into a String cannot fail
        let _ = self.write_line(&mut line, namespace, constant_tags);
        line
    }

    fn write_line(&self, out: &mut String, namespace: &str, constant_tags: &[String]) -> fmt::Result {
        write!(out, "{namespace}{}:", self.name)?;
        self.operation.write_value(out)?;
        write!(out, "|{}", self.operation.kind().type_code())?;
        if self.sample_rate < 1.0 {
            write!(out, "|@{}", self.sample_rate)?;
        }

        let mut tags = constant_tags.iter().chain(&self.tags).peekable();
        if tags.peek().is_some() {
            out.push_str("|#");
            for (i, tag) in tags.enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // a newline would end the line and start a forged one
                out.extend(tag.chars().filter(|&c| c != '\n'));
            }
        }
        Ok(())
    }
}
