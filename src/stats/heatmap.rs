use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scoring::Dart;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeatmapEntry {
    pub count: u32,
    pub coordinates: Vec<BoardPoint>,
}

/// Per-player impact map keyed by "segment-multiplier"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Heatmap {
    pub segments: BTreeMap<String, HeatmapEntry>,
    pub total_darts: u32,
}

impl Heatmap {
    pub fn record(&mut self, dart: &Dart) {
        let entry = self.segments.entry(dart.heatmap_key()).or_default();
        entry.count += 1;
        if let (Some(x), Some(y)) = (dart.x, dart.y) {
            entry.coordinates.push(BoardPoint { x, y });
        }
        self.total_darts += 1;
    }

    pub fn record_all<'a, I>(&mut self, darts: I)
    where
        I: IntoIterator<Item = &'a Dart>,
    {
        for dart in darts {
            self.record(dart);
        }
    }

    pub fn count(&self, key: &str) -> u32 {
        self.segments.get(key).map_or(0, |e| e.count)
    }

    /// `total_darts` must equal the sum of the per-key counts
    pub fn is_consistent(&self) -> bool {
        self.segments.values().map(|e| e.count).sum::<u32>() == self.total_darts
    }
}
