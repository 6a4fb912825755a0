use crate::config::ParsingConfig;
use crate::types::*;
use std::collections::BTreeMap;

/// First-pass layout analysis: infers indentation levels and the page-top
/// header band from the raw text items.
pub struct SpatialStatisticsAnalyzer<'a> {
    config: &'a ParsingConfig,
}

impl<'a> SpatialStatisticsAnalyzer<'a> {
    pub fn new(config: &'a ParsingConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, texts: &[RawItem]) -> StructureProfile {
        let structure = &self.config.structure;
        let mut left_margins = Vec::new();
        let mut y_coords = Vec::new();

        for item in texts {
            // Front matter and running headers/footers would skew both statistics
            if item.page <= self.config.stream.front_matter_pages || item.label.is_page_furniture() {
                continue;
            }
            if item.bbox.left > 0.0 {
                left_margins.push(item.bbox.left);
            }
            if item.bbox.top > 0.0 {
                y_coords.push(item.bbox.top);
            }
        }

        let clusters = cluster_margins(
            &left_margins,
            structure.margin_bucket,
            structure.min_cluster_size,
        );
        let indentation_levels: Vec<f64> = clusters.iter().map(|c| c.center).collect();

        let header_y_threshold = header_band_threshold(&y_coords, structure.header_band_divisor)
            .unwrap_or(structure.default_header_y_threshold);

        let (base_margin, centered_threshold) =
            match (indentation_levels.first(), indentation_levels.last()) {
                (Some(&min), Some(&max)) => (min, (max + min) / 2.0),
                _ => (
                    structure.default_base_margin,
                    structure.default_centered_threshold,
                ),
            };

        if let Some(dominant) = dominant_cluster(&clusters) {
            log::debug!(
                "Body text margin {:.1} ({} of {} observations)",
                dominant.center,
                dominant.count,
                left_margins.len()
            );
        }
        log::info!(
            "Inferred structure: indentation levels {:?}, base margin {:.1}, header y threshold {:.1}",
            indentation_levels,
            base_margin,
            header_y_threshold
        );

        StructureProfile {
            indentation_levels,
            base_margin,
            header_y_threshold,
            centered_threshold,
        }
    }
}

/// Cluster margins by rounding each into a `bucket`-wide bin (half-to-even at
/// the midpoint) and keep bins with at least `min_count` members. Returned in
/// ascending order of center.
pub fn cluster_margins(values: &[f64], bucket: f64, min_count: usize) -> Vec<MarginCluster> {
    if bucket <= 0.0 {
        return Vec::new();
    }

    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for value in values {
        let bin = (value / bucket).round_ties_even() as i64;
        *counts.entry(bin).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .filter(|(_, count)| *count >= min_count)
        .map(|(bin, count)| MarginCluster {
            center: bin as f64 * bucket,
            count,
        })
        .collect()
}

/// Most populated cluster; the lowest center wins a tie
pub fn dominant_cluster(clusters: &[MarginCluster]) -> Option<&MarginCluster> {
    clusters.iter().fold(None, |best: Option<&MarginCluster>, cluster| match best {
        Some(b) if b.count >= cluster.count => Some(b),
        _ => Some(cluster),
    })
}

/// Lowest y-coordinate among the top `1 / divisor` of observations, or
/// `None` when that slice is empty (fewer than `divisor` observations)
pub fn header_band_threshold(y_coords: &[f64], divisor: usize) -> Option<f64> {
    if divisor == 0 {
        return None;
    }
    let mut sorted = y_coords.to_vec();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    let band = sorted.len() / divisor;
    sorted[..band].last().copied()
}
