//! Timing samples and the aggregated statistics report

use crate::error::{AppError, Result};
use crate::limits::MAX_SAMPLES;
use crate::stats::median_in_place;
use serde::{Deserialize, Serialize};

/// The four timing metrics read after every request execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Seconds from execution start until name resolution completed
    NameLookup,
    /// Seconds from execution start until the TCP connection was established
    Connect,
    /// Seconds from execution start until the first response byte
    StartTransfer,
    /// Seconds from execution start until the body was fully received
    Total,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::NameLookup,
        Metric::Connect,
        Metric::StartTransfer,
        Metric::Total,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::NameLookup => "name_lookup_time",
            Metric::Connect => "connect_time",
            Metric::StartTransfer => "start_transfer_time",
            Metric::Total => "total_time",
        }
    }
}

/// One value per metric, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimingSample {
    pub name_lookup: f64,
    pub connect: f64,
    pub start_transfer: f64,
    pub total: f64,
}

impl TimingSample {
    pub fn new(name_lookup: f64, connect: f64, start_transfer: f64, total: f64) -> Self {
        Self {
            name_lookup,
            connect,
            start_transfer,
            total,
        }
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::NameLookup => self.name_lookup,
            Metric::Connect => self.connect,
            Metric::StartTransfer => self.start_transfer,
            Metric::Total => self.total,
        }
    }
}

/// Per-metric sample buffers for one trigger, filled in request order.
///
/// Capacity is fixed at [`MAX_SAMPLES`]; the request validator guarantees a
/// trigger never performs more executions than that.
#[derive(Debug, Clone)]
pub struct SampleSet {
    name_lookup: [f64; MAX_SAMPLES],
    connect: [f64; MAX_SAMPLES],
    start_transfer: [f64; MAX_SAMPLES],
    total: [f64; MAX_SAMPLES],
    len: usize,
}

impl SampleSet {
    pub fn new() -> Self {
        Self {
            name_lookup: [0.0; MAX_SAMPLES],
            connect: [0.0; MAX_SAMPLES],
            start_transfer: [0.0; MAX_SAMPLES],
            total: [0.0; MAX_SAMPLES],
            len: 0,
        }
    }

    /// Append one execution's values; returns the index it was stored at
    pub fn push(&mut self, sample: TimingSample) -> Result<usize> {
        if self.len >= MAX_SAMPLES {
            return Err(AppError::internal(format!(
                "sample buffer full ({} samples)",
                MAX_SAMPLES
            )));
        }
        let index = self.len;
        self.name_lookup[index] = sample.name_lookup;
        self.connect[index] = sample.connect;
        self.start_transfer[index] = sample.start_transfer;
        self.total[index] = sample.total;
        self.len += 1;
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn capacity(&self) -> usize {
        MAX_SAMPLES
    }

    /// The collected values of one metric, in request order
    pub fn samples(&self, metric: Metric) -> &[f64] {
        let buffer = match metric {
            Metric::NameLookup => &self.name_lookup,
            Metric::Connect => &self.connect,
            Metric::StartTransfer => &self.start_transfer,
            Metric::Total => &self.total,
        };
        &buffer[..self.len]
    }

    /// All four values recorded for execution `index`
    pub fn sample(&self, index: usize) -> Option<TimingSample> {
        if index >= self.len {
            return None;
        }
        Some(TimingSample::new(
            self.name_lookup[index],
            self.connect[index],
            self.start_transfer[index],
            self.total[index],
        ))
    }

    /// Median of every metric; `None` when nothing was collected
    pub fn medians(&self) -> Option<TimingSample> {
        if self.is_empty() {
            return None;
        }
        let median_of = |metric: Metric| {
            let mut scratch = [0.0f64; MAX_SAMPLES];
            let values = self.samples(metric);
            scratch[..values.len()].copy_from_slice(values);
            median_in_place(&mut scratch[..values.len()])
        };
        Some(TimingSample::new(
            median_of(Metric::NameLookup),
            median_of(Metric::Connect),
            median_of(Metric::StartTransfer),
            median_of(Metric::Total),
        ))
    }
}

impl Default for SampleSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one successful trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    /// Address of the server the final execution talked to
    pub resolved_ip: String,
    /// HTTP status of the final execution
    pub status_code: u16,
    pub median_name_lookup: f64,
    pub median_connect: f64,
    pub median_start_transfer: f64,
    pub median_total: f64,
}

impl StatisticsReport {
    pub fn new(resolved_ip: String, status_code: u16, medians: TimingSample) -> Self {
        Self {
            resolved_ip,
            status_code,
            median_name_lookup: medians.name_lookup,
            median_connect: medians.connect,
            median_start_transfer: medians.start_transfer,
            median_total: medians.total,
        }
    }

    pub fn median(&self, metric: Metric) -> f64 {
        match metric {
            Metric::NameLookup => self.median_name_lookup,
            Metric::Connect => self.median_connect,
            Metric::StartTransfer => self.median_start_transfer,
            Metric::Total => self.median_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(base: f64) -> TimingSample {
        TimingSample::new(base, base * 2.0, base * 3.0, base * 4.0)
    }

    #[test]
    fn test_sample_set_push_in_order() {
        let mut set = SampleSet::new();
        assert!(set.is_empty());

        assert_eq!(set.push(sample(0.1)).unwrap(), 0);
        assert_eq!(set.push(sample(0.3)).unwrap(), 1);
        assert_eq!(set.push(sample(0.2)).unwrap(), 2);

        assert_eq!(set.len(), 3);
        assert_eq!(set.samples(Metric::NameLookup), &[0.1, 0.3, 0.2]);
        assert_eq!(set.samples(Metric::Total), &[0.4, 0.3 * 4.0, 0.2 * 4.0]);
        assert_eq!(set.sample(1), Some(sample(0.3)));
        assert_eq!(set.sample(3), None);
    }

    #[test]
    fn test_sample_set_rejects_overflow() {
        let mut set = SampleSet::new();
        for i in 0..MAX_SAMPLES {
            set.push(sample(i as f64)).unwrap();
        }
        assert_eq!(set.len(), set.capacity());
        assert!(matches!(set.push(sample(1.0)), Err(AppError::Internal(_))));
        assert_eq!(set.len(), MAX_SAMPLES);
    }

    #[test]
    fn test_medians_do_not_reorder_buffers() {
        let mut set = SampleSet::new();
        for value in [5.0, 1.0, 3.0] {
            set.push(TimingSample::new(value, value, value, value)).unwrap();
        }

        let medians = set.medians().unwrap();
        assert_eq!(medians, TimingSample::new(3.0, 3.0, 3.0, 3.0));
        assert_eq!(set.samples(Metric::Connect), &[5.0, 1.0, 3.0]);
    }

    #[test]
    fn test_medians_empty() {
        assert!(SampleSet::new().medians().is_none());
    }

    #[test]
    fn test_report_accessors() {
        let report = StatisticsReport::new(
            "10.0.0.1".to_string(),
            301,
            TimingSample::new(0.1, 0.2, 0.3, 0.4),
        );
        assert_eq!(report.median(Metric::NameLookup), 0.1);
        assert_eq!(report.median(Metric::Total), 0.4);
        assert_eq!(report.status_code, 301);
    }

    #[test]
    fn test_metric_names() {
        let names: Vec<&str> = Metric::ALL.iter().map(|m| m.as_str()).collect();
        assert_eq!(
            names,
            ["name_lookup_time", "connect_time", "start_transfer_time", "total_time"]
        );
    }
}
