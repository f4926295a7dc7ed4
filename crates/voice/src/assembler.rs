//! Mechanical response assembly.
//!
//! Sections are concatenated in the skeleton's fixed order with a single
//! separating space.  No rewriting, no punctuation insertion, no reordering,
//! no omission.

use crate::error::AssemblyError;
use crate::selector::SelectedVariant;

/// Join selected sections into the final response text.  The caller passes
/// the sections in the skeleton's emission order.
pub fn assemble(sections: &[SelectedVariant]) -> Result<String, AssemblyError> {
    let mut parts = Vec::with_capacity(sections.len());
    for selected in sections {
        if selected.text.trim().is_empty() {
            return Err(AssemblyError::EmptySection(selected.section));
        }
        parts.push(selected.text.as_str());
    }

    let text = parts.join(" ");
    if text.is_empty() {
        return Err(AssemblyError::EmptyResponse);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use desi_contract::Section;

    fn selected(section: Section, text: &str) -> SelectedVariant {
        SelectedVariant {
            section,
            variant_id: 0,
            text: text.to_string(),
            exhausted: false,
        }
    }

    #[test]
    fn joins_with_single_spaces_in_given_order() {
        let sections = [
            selected(Section::Opener, "That sounds really heavy."),
            selected(Section::Validation, "It makes sense you feel this way."),
            selected(Section::Closure, "If you want, you can tell me more."),
        ];
        assert_eq!(
            assemble(&sections).unwrap(),
            "That sounds really heavy. It makes sense you feel this way. If you want, you can tell me more."
        );
    }

    #[test]
    fn empty_section_text_is_an_assembly_error() {
        let sections = [
            selected(Section::Opener, "Something."),
            selected(Section::Validation, "   "),
        ];
        assert!(matches!(
            assemble(&sections),
            Err(AssemblyError::EmptySection(Section::Validation))
        ));
    }

    #[test]
    fn no_sections_is_an_empty_response() {
        assert!(matches!(assemble(&[]), Err(AssemblyError::EmptyResponse)));
    }
}
