use crate::types::{Provision, Section};

pub struct ProvisionAssembler;

impl Default for ProvisionAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl ProvisionAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Turn segmented provisions into indexed sections, in encounter order.
    /// The index prefix keeps ids unique when titles repeat.
    pub fn assemble(&self, provisions: Vec<Provision>) -> Vec<Section> {
        log::debug!("Assembling {} provisions into sections", provisions.len());

        provisions
            .into_iter()
            .enumerate()
            .map(|(i, provision)| {
                let index = i + 1;
                Section {
                    id: format!("{index}-{}", slugify(&provision.title)),
                    index,
                    raw_text: provision.content.join("\n\n").trim().to_string(),
                    title: provision.title,
                }
            })
            .collect()
    }
}

/// Lowercase, keep word characters, turn whitespace/hyphen runs into one hyphen
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;

    for ch in text.to_lowercase().chars() {
        if ch.is_whitespace() || ch == '-' {
            pending_separator = true;
        } else if ch.is_alphanumeric() || ch == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch);
        }
        // everything else is dropped without breaking the current word
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_legal_titles() {
        assert_eq!(slugify("Short title"), "short-title");
        assert_eq!(slugify("Amendment of section 5"), "amendment-of-section-5");
        assert_eq!(slugify("CYBERSECURITY (AMENDMENT) BILL, 2025"), "cybersecurity-amendment-bill-2025");
        assert_eq!(slugify("  New section 15A -- Powers of Commissioner "), "new-section-15a-powers-of-commissioner");
        assert_eq!(slugify("snake_case_name"), "snake_case_name");
        assert_eq!(slugify("§§"), "");
    }

    #[test]
    fn repeated_titles_get_distinct_ids() {
        let provisions = vec![
            Provision {
                title: "Amendment of section 2".to_string(),
                content: vec!["first".to_string(), "  second  ".to_string()],
            },
            Provision::new("Amendment of section 2".to_string()),
        ];
        let sections = ProvisionAssembler::new().assemble(provisions);

        assert_eq!(sections[0].id, "1-amendment-of-section-2");
        assert_eq!(sections[0].raw_text, "first\n\n  second");
        assert_eq!(sections[1].id, "2-amendment-of-section-2");
        assert_eq!(sections[1].index, 2);
        assert_eq!(sections[1].raw_text, "");
    }
}
