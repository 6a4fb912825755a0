use crate::config::ParsingConfig;
use crate::tables::flatten_table;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How many items each filter removed from the merged stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamStats {
    pub merged: usize,
    pub table_items: usize,
    pub front_matter: usize,
    pub page_furniture: usize,
    pub empty: usize,
    pub title_banners: usize,
    pub retained: usize,
}

/// Merges texts and flattened tables into one reading-ordered stream and
/// drops everything that can never be provision content.
pub struct ItemStreamBuilder<'a> {
    config: &'a ParsingConfig,
    profile: &'a StructureProfile,
}

impl<'a> ItemStreamBuilder<'a> {
    pub fn new(config: &'a ParsingConfig, profile: &'a StructureProfile) -> Self {
        Self { config, profile }
    }

    pub fn build(&self, texts: &[RawItem], tables: &[RawTable]) -> (Vec<RawItem>, StreamStats) {
        let table_items = table_items(tables);
        let mut stats = StreamStats {
            merged: texts.len() + table_items.len(),
            table_items: table_items.len(),
            ..StreamStats::default()
        };

        // Texts first: the stable sort keeps that order for co-located items
        let mut items: Vec<RawItem> = texts.iter().cloned().chain(table_items).collect();
        sort_reading_order(&mut items);

        items.retain(|item| {
            if item.page <= self.config.stream.front_matter_pages {
                stats.front_matter += 1;
                false
            } else if item.label.is_page_furniture() {
                stats.page_furniture += 1;
                false
            } else if item.text.is_empty() {
                stats.empty += 1;
                false
            } else if self.is_title_banner(item) {
                stats.title_banners += 1;
                false
            } else {
                true
            }
        });
        stats.retained = items.len();

        log::debug!(
            "Item stream: {} merged ({} tables), dropped {} front matter, {} headers/footers, {} empty, {} banners; {} retained",
            stats.merged,
            stats.table_items,
            stats.front_matter,
            stats.page_furniture,
            stats.empty,
            stats.title_banners,
            stats.retained
        );

        (items, stats)
    }

    /// Page-top element that is either left-aligned with the body or centered
    pub fn is_title_banner(&self, item: &RawItem) -> bool {
        let left = item.bbox.left;
        let is_at_page_top = item.bbox.top > self.profile.header_y_threshold;
        let is_left_aligned = (left - self.profile.base_margin).abs()
            < self.config.stream.banner_margin_tolerance;
        let is_centered = left > self.profile.centered_threshold;

        is_at_page_top && (is_left_aligned || is_centered)
    }
}

/// One synthetic `Table` item per table that flattens to any text, placed
/// at the table's first provenance entry
pub fn table_items(tables: &[RawTable]) -> Vec<RawItem> {
    tables
        .iter()
        .filter_map(|table| {
            let markdown = flatten_table(&table.data).into_text();
            if markdown.is_empty() {
                return None;
            }
            Some(RawItem {
                text: markdown.trim().to_string(),
                label: ItemLabel::Table,
                page: table.page,
                bbox: table.bbox,
                source: ItemSource::Table(table.index),
            })
        })
        .collect()
}

/// Stable sort by page, then top-to-bottom, then left-to-right
pub fn sort_reading_order(items: &mut [RawItem]) {
    items.sort_by(|a, b| {
        a.page
            .cmp(&b.page)
            .then_with(|| b.bbox.top.partial_cmp(&a.bbox.top).unwrap_or(Ordering::Equal))
            .then_with(|| a.bbox.left.partial_cmp(&b.bbox.left).unwrap_or(Ordering::Equal))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile() -> StructureProfile {
        StructureProfile {
            indentation_levels: vec![70.0, 90.0, 110.0],
            base_margin: 70.0,
            header_y_threshold: 760.0,
            centered_threshold: 90.0,
        }
    }

    fn texts_of(items: &[RawItem]) -> Vec<&str> {
        items.iter().map(|i| i.text.as_str()).collect()
    }

    #[test]
    fn sorts_by_page_then_top_then_left() {
        let mut items = vec![
            RawItem::new("p4", ItemLabel::Other, 4, 70.0, 700.0),
            RawItem::new("p3 low", ItemLabel::Other, 3, 70.0, 200.0),
            RawItem::new("p3 high right", ItemLabel::Other, 3, 110.0, 650.0),
            RawItem::new("p3 high left", ItemLabel::Other, 3, 70.0, 650.0),
        ];
        sort_reading_order(&mut items);
        assert_eq!(texts_of(&items), vec!["p3 high left", "p3 high right", "p3 low", "p4"]);
    }

    #[test]
    fn identical_keys_keep_source_order() {
        let mut items = vec![
            RawItem::new("caption", ItemLabel::Other, 3, 70.0, 500.0),
            RawItem::new("| a |", ItemLabel::Table, 3, 70.0, 500.0),
            RawItem::new("after", ItemLabel::Other, 3, 70.0, 500.0),
        ];
        sort_reading_order(&mut items);
        assert_eq!(texts_of(&items), vec!["caption", "| a |", "after"]);
    }

    #[test]
    fn filters_noise_and_counts_it() {
        let config = ParsingConfig::default();
        let profile = profile();
        let texts = vec![
            RawItem::new("CONTENTS", ItemLabel::SectionHeader, 2, 70.0, 700.0),
            RawItem::new("Page 3", ItemLabel::PageFooter, 3, 300.0, 40.0),
            RawItem::new("   ", ItemLabel::Other, 3, 70.0, 600.0),
            RawItem::new("Cybersecurity (Amendment) Bill", ItemLabel::SectionHeader, 3, 72.0, 780.0),
            RawItem::new("No. 12 of 2025", ItemLabel::Other, 3, 250.0, 790.0),
            // At page top but indented: neither left-aligned nor centered
            RawItem::new("kept", ItemLabel::Other, 3, 85.0, 770.0),
            RawItem::new("body", ItemLabel::Other, 3, 90.0, 500.0),
        ];
        let (items, stats) = ItemStreamBuilder::new(&config, &profile).build(&texts, &[]);

        assert_eq!(texts_of(&items), vec!["kept", "body"]);
        assert_eq!(
            stats,
            StreamStats {
                merged: 7,
                table_items: 0,
                front_matter: 1,
                page_furniture: 1,
                empty: 1,
                title_banners: 2,
                retained: 2,
            }
        );
    }

    #[test]
    fn tables_join_the_stream_at_their_position() {
        let config = ParsingConfig::default();
        let profile = profile();
        let texts = vec![
            RawItem::new("before", ItemLabel::Other, 3, 70.0, 600.0),
            RawItem::new("after", ItemLabel::Other, 3, 70.0, 300.0),
        ];
        let tables = vec![
            RawTable {
                index: 0,
                page: 3,
                bbox: BoundingBox { left: 70.0, top: 450.0 },
                data: TableData {
                    table_cells: vec![json!({
                        "start_row_offset_idx": 0, "end_row_offset_idx": 1,
                        "start_col_offset_idx": 0, "end_col_offset_idx": 1,
                        "text": "Fee"
                    })],
                },
            },
            // No cells: contributes nothing
            RawTable {
                index: 1,
                page: 3,
                bbox: BoundingBox { left: 70.0, top: 400.0 },
                data: TableData::default(),
            },
        ];
        let (items, stats) = ItemStreamBuilder::new(&config, &profile).build(&texts, &tables);

        assert_eq!(texts_of(&items), vec!["before", "| Fee |\n| --- |", "after"]);
        assert_eq!(items[1].source, ItemSource::Table(0));
        assert_eq!(stats.table_items, 1);
    }
}
