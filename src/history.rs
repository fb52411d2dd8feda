use std::collections::VecDeque;

use crate::constants::GRAPH_WIDTH;

/// Bytes moved in each direction during one sampling tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BandwidthSample {
    pub download_bytes: u64,
    pub upload_bytes: u64,
}

impl BandwidthSample {
    pub const fn new(download_bytes: u64, upload_bytes: u64) -> Self {
        Self {
            download_bytes,
            upload_bytes,
        }
    }
}

/// Rolling, newest-first buffer holding one sample per graph column.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: VecDeque<BandwidthSample>,
}

impl SampleWindow {
    pub const CAPACITY: usize = GRAPH_WIDTH;

    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(Self::CAPACITY + 1),
        }
    }

    /// Records the latest sample at index 0, evicting the oldest once full.
    pub fn push(&mut self, sample: BandwidthSample) {
        self.samples.push_front(sample);
        self.samples.truncate(Self::CAPACITY);
    }

    pub fn snapshot(&self) -> &VecDeque<BandwidthSample> {
        &self.samples
    }

    pub fn latest(&self) -> Option<&BandwidthSample> {
        self.samples.front()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn downloads(&self) -> impl Iterator<Item = u64> + '_ {
        self.samples.iter().map(|s| s.download_bytes)
    }

    pub fn uploads(&self) -> impl Iterator<Item = u64> + '_ {
        self.samples.iter().map(|s| s.upload_bytes)
    }
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let window = SampleWindow::new();
        assert!(window.is_empty());
        assert!(window.latest().is_none());
    }

    #[test]
    fn newest_sample_comes_first() {
        let mut window = SampleWindow::new();
        window.push(BandwidthSample::new(1, 10));
        window.push(BandwidthSample::new(2, 20));

        let snapshot: Vec<_> = window.snapshot().iter().copied().collect();
        assert_eq!(
            snapshot,
            vec![BandwidthSample::new(2, 20), BandwidthSample::new(1, 10)]
        );
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut window = SampleWindow::new();
        for i in 0..45u64 {
            window.push(BandwidthSample::new(i * 1024, 0));
        }

        assert_eq!(window.len(), SampleWindow::CAPACITY);
        assert_eq!(window.latest().unwrap().download_bytes, 45056);
        let oldest = window.snapshot().back().unwrap();
        assert_eq!(oldest.download_bytes, 5 * 1024);
    }

    #[test]
    fn accepts_zero_samples() {
        let mut window = SampleWindow::new();
        window.push(BandwidthSample::default());
        assert_eq!(window.len(), 1);
        assert_eq!(window.downloads().sum::<u64>(), 0);
    }
}
