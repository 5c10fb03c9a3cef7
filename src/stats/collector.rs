//! Collects the transfer info of each execution during one trigger

use crate::{
    client::TransferInfo,
    error::{AppError, Result},
    models::{SampleSet, StatisticsReport},
};

/// Accumulates timing samples in request order and remembers the last
/// execution's server address and status code.
#[derive(Debug, Default)]
pub struct SampleCollector {
    samples: SampleSet,
    last: Option<TransferInfo>,
}

impl SampleCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store one execution's transfer info; returns its zero-based index
    pub fn record(&mut self, info: TransferInfo) -> Result<usize> {
        let index = self.samples.push(info.timing)?;
        self.last = Some(info);
        Ok(index)
    }

    pub fn samples(&self) -> &SampleSet {
        &self.samples
    }

    pub fn last_transfer(&self) -> Option<&TransferInfo> {
        self.last.as_ref()
    }

    /// Reduce the collected samples into a report.
    ///
    /// IP and status come from the final execution.
    pub fn finish(self) -> Result<StatisticsReport> {
        let medians = self
            .samples
            .medians()
            .ok_or_else(|| AppError::internal("no samples were collected"))?;
        let last = self
            .last
            .ok_or_else(|| AppError::internal("no transfer info was recorded"))?;

        Ok(StatisticsReport::new(last.primary_ip, last.response_code, medians))
    }
}
