use crate::types::*;
use serde::Serialize;
use std::collections::HashMap;

// SectionValidator - checks output invariants on the assembled sections.
// Pure validation: sections are never modified, issues are only reported.
pub struct SectionValidator {
    max_title_length: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
    pub quality_score: f32,
    pub total_sections: usize,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ValidationIssue {
    EmptyTitle {
        index: usize,
    },
    DuplicateId {
        id: String,
        first_index: usize,
        index: usize,
    },
    IndexOutOfOrder {
        position: usize,
        expected: usize,
        actual: usize,
    },
    IdPrefixMismatch {
        index: usize,
        id: String,
    },
    SuspiciousTitle {
        index: usize,
        text: String,
        reason: String,
    },
}

impl Default for SectionValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionValidator {
    pub fn new() -> Self {
        Self {
            max_title_length: 200,
        }
    }

    pub fn validate(&self, sections: &[Section]) -> ValidationReport {
        let mut issues = Vec::new();

        // 1. Indices are 1..=n in emission order and ids carry them
        self.validate_indices(sections, &mut issues);

        // 2. Ids are unique within the document
        self.validate_unique_ids(sections, &mut issues);

        // 3. Titles are present and plausibly short
        self.validate_titles(sections, &mut issues);

        // Quality score (1.0 = no issues, 0.0 = at least one issue per section)
        let quality_score = if sections.is_empty() {
            1.0
        } else {
            (1.0 - (issues.len() as f32 / sections.len() as f32)).max(0.0)
        };

        let report = ValidationReport {
            issues,
            quality_score,
            total_sections: sections.len(),
        };
        self.log_validation_report(&report);
        report
    }

    fn validate_indices(&self, sections: &[Section], issues: &mut Vec<ValidationIssue>) {
        for (position, section) in sections.iter().enumerate() {
            let expected = position + 1;
            if section.index != expected {
                issues.push(ValidationIssue::IndexOutOfOrder {
                    position,
                    expected,
                    actual: section.index,
                });
            }
            if !section.id.starts_with(&format!("{}-", section.index)) {
                issues.push(ValidationIssue::IdPrefixMismatch {
                    index: section.index,
                    id: section.id.clone(),
                });
            }
        }
    }

    fn validate_unique_ids(&self, sections: &[Section], issues: &mut Vec<ValidationIssue>) {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for section in sections {
            if let Some(&first_index) = seen.get(section.id.as_str()) {
                issues.push(ValidationIssue::DuplicateId {
                    id: section.id.clone(),
                    first_index,
                    index: section.index,
                });
            } else {
                seen.insert(&section.id, section.index);
            }
        }
    }

    fn validate_titles(&self, sections: &[Section], issues: &mut Vec<ValidationIssue>) {
        for section in sections {
            let title = section.title.trim();
            if title.is_empty() {
                issues.push(ValidationIssue::EmptyTitle {
                    index: section.index,
                });
            } else if title.chars().count() > self.max_title_length {
                // Probably a body paragraph mislabelled as a header upstream
                issues.push(ValidationIssue::SuspiciousTitle {
                    index: section.index,
                    text: title.chars().take(50).collect::<String>() + "...",
                    reason: format!("title longer than {} characters", self.max_title_length),
                });
            } else if section.id == format!("{}-", section.index) {
                issues.push(ValidationIssue::SuspiciousTitle {
                    index: section.index,
                    text: title.to_string(),
                    reason: "title has no characters usable in an id".to_string(),
                });
            }
        }
    }

    fn log_validation_report(&self, report: &ValidationReport) {
        if report.issues.is_empty() {
            log::debug!("Validated {} sections, no issues", report.total_sections);
            return;
        }

        log::warn!(
            "Validation found {} issues in {} sections (quality score {:.2})",
            report.issues.len(),
            report.total_sections,
            report.quality_score
        );
        for issue in &report.issues {
            match issue {
                ValidationIssue::EmptyTitle { index } => {
                    log::warn!("  section {index} has an empty title");
                }
                ValidationIssue::DuplicateId {
                    id,
                    first_index,
                    index,
                } => {
                    log::warn!("  duplicate id '{id}' at sections {first_index} and {index}");
                }
                ValidationIssue::IndexOutOfOrder {
                    position,
                    expected,
                    actual,
                } => {
                    log::warn!("  section at position {position}: expected index {expected}, got {actual}");
                }
                ValidationIssue::IdPrefixMismatch { index, id } => {
                    log::warn!("  section {index}: id '{id}' does not start with its index");
                }
                ValidationIssue::SuspiciousTitle {
                    index,
                    text,
                    reason,
                } => {
                    log::warn!("  section {index}: suspicious title \"{text}\" ({reason})");
                }
            }
        }
    }
}

pub fn validate_sections(sections: &[Section]) -> ValidationReport {
    SectionValidator::new().validate(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(index: usize, id: &str, title: &str) -> Section {
        Section {
            id: id.to_string(),
            index,
            title: title.to_string(),
            raw_text: String::new(),
        }
    }

    #[test]
    fn assembled_sections_are_clean() {
        let sections = vec![
            section(1, "1-short-title", "Short title"),
            section(2, "2-interpretation", "Interpretation"),
        ];
        let report = SectionValidator::new().validate(&sections);
        assert!(report.is_clean());
        assert_eq!(report.quality_score, 1.0);
    }

    #[test]
    fn reports_broken_invariants() {
        let sections = vec![
            section(1, "1-a", "A"),
            section(3, "1-a", ""),
        ];
        let report = SectionValidator::new().validate(&sections);

        assert!(report.issues.contains(&ValidationIssue::IndexOutOfOrder {
            position: 1,
            expected: 2,
            actual: 3
        }));
        assert!(report.issues.contains(&ValidationIssue::IdPrefixMismatch {
            index: 3,
            id: "1-a".to_string()
        }));
        assert!(report.issues.contains(&ValidationIssue::DuplicateId {
            id: "1-a".to_string(),
            first_index: 1,
            index: 3
        }));
        assert!(report.issues.contains(&ValidationIssue::EmptyTitle { index: 3 }));
        assert_eq!(report.quality_score, 0.0);
    }

    #[test]
    fn punctuation_only_title_is_suspicious() {
        let sections = vec![section(1, "1-", "§ ¶")];
        let report = SectionValidator::new().validate(&sections);
        assert_eq!(
            report.issues,
            vec![ValidationIssue::SuspiciousTitle {
                index: 1,
                text: "§ ¶".to_string(),
                reason: "title has no characters usable in an id".to_string(),
            }]
        );
    }
}
