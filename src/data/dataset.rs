use burn::data::dataset::Dataset;

use crate::domain::sample::TabSample;

pub struct TabDataset {
    samples: Vec<TabSample>,
}

impl TabDataset {
    pub fn new(samples: Vec<TabSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<TabSample> for TabDataset {
    fn get(&self, index: usize) -> Option<TabSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
