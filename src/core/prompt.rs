//! Prompt templates for the two service modes.
//!
//! Edit mode gets a terse instruction (DALL-E 2 caps edit prompts at 1000
//! characters); the generation fallback gets the full scene description since
//! it has no reference image to work from.

/// Dealership clause for the edit-mode prompt, empty when no name was given.
fn dealer_clause(dealership: Option<&str>) -> String {
    match dealership.map(str::trim) {
        Some(name) if !name.is_empty() => format!("This is for {} dealership. ", name),
        _ => String::new(),
    }
}

/// Build the edit-mode prompt: remove the trailer and composite the boat
/// into the target waterway.
pub fn edit_prompt(location: &str, dealership: Option<&str>) -> String {
    format!(
        "Remove trailer, place boat in {location} water with reflections. \
         Professional photography, boat fills 70-85% frame, telephoto lens look, \
         golden hour lighting, magazine quality {dealer}",
        location = location.trim(),
        dealer = dealer_clause(dealership),
    )
}

/// Build the generation-mode fallback prompt. Longer and more descriptive
/// than the edit prompt because the model synthesizes the scene from scratch.
pub fn generate_prompt(location: &str, dealership: Option<&str>) -> String {
    let location = location.trim();
    let dealer = match dealership.map(str::trim) {
        Some(name) if !name.is_empty() => format!("for {} dealership", name),
        _ => String::new(),
    };

    format!(
        "A professional, magazine-quality photograph of a luxury boat or yacht \
         floating in {location}. The boat is prominently featured filling 70-85% \
         of the frame, photographed with a telephoto lens (200-300mm look) for \
         professional compression and slight background blur. Beautiful {location} \
         waterway in the background with realistic water reflections. Golden hour \
         lighting, premium dealership photography style {dealer}. Ultra-detailed, \
         8K quality, professional marine photography."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_prompt_interpolates_location() {
        let prompt = edit_prompt("Miami Marina", None);
        assert!(prompt.contains("Miami Marina"));
    }

    #[test]
    fn edit_prompt_omits_dealership_clause_without_name() {
        let prompt = edit_prompt("Miami Marina", None);
        assert!(!prompt.contains("dealership"));
    }

    #[test]
    fn edit_prompt_names_the_dealership() {
        let prompt = edit_prompt("Miami Marina", Some("Sunset Yacht Sales"));
        assert!(prompt.contains("Sunset Yacht Sales dealership"));
    }

    #[test]
    fn edit_prompt_treats_blank_dealership_as_absent() {
        let prompt = edit_prompt("Miami Marina", Some("   "));
        assert!(!prompt.contains("dealership"));
    }

    #[test]
    fn generate_prompt_interpolates_location() {
        let prompt = generate_prompt("Lake Tahoe", None);
        assert!(prompt.contains("Lake Tahoe"));
        assert!(!prompt.contains("for  dealership"));
    }

    #[test]
    fn generate_prompt_names_the_dealership() {
        let prompt = generate_prompt("Lake Tahoe", Some("Sunset Yacht Sales"));
        assert!(prompt.contains("for Sunset Yacht Sales dealership"));
    }
}
