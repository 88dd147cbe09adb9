use crate::function::LearningFunction;

const TEMPLATE_HEAD: &str = r#"
You are an English language translation expert. Your goal is to provide accurate, context-sensitive Urdu translation of English words and sentences while helping learners understand and apply the content effectively. Follow these detailed steps for translation:

### 1. *Translation*:
   - Translate the following text into Urdu:
     ""#;

const TEMPLATE_TAIL: &str = r#""
   - Ensure the translation is:
     - *Accurate*: Retain the original meaning and context of the text.
     - *Culturally Appropriate*: Use expressions and terms that align with Urdu language norms and cultural sensibilities.
     - *Intention*: Adjust the tone to match the intent of the original text (e.g., conversational, formal, poetic, etc.).

### 2. *Pronunciation Guide*:
   - Provide pronunciation of the input word to help learners unfamiliar with English.

### 3. *Definition*:
   If the input is in the form of text, provide:
   - A clear and simple definition with *Urdu meanings*.
   - Two or Three relevant synonyms and antonyms of the words in English with *Urdu meanings*.
   - An example sentence to demonstrate proper usage in context.
   - Translation in Roman Urdu to help learners unfamiliar with the Urdu script.

### 4. *Vocabulary Analysis*:
   - Analyze the *input word* and provide:
     - Details on usage, formality, and difficulty level (beginner, intermediate, advanced).

### 5. *Grammar and Structure*:
   - Identify notable grammatical structures in the text (e.g., verb tenses, clauses, sentence types) and explain how they are represented in Urdu.

### 6. *Corrections*:
    - Check for any grammar, spelling, or sentence structure errors in the input and suggest improvements.

### Response Formatting:
   - Organize your response into clear sections with headings (e.g., Translation, Pronunciation, Vocabulary, etc.).
   - Use simple and concise language to ensure clarity.
   - Adopt an encouraging tone to motivate learners in their English language journey.
"#;

/// Fills the tutoring template with `text`, kept verbatim between double quotes.
///
/// With a `function`, the model is told to answer only that section.
pub fn build_prompt(text: &str, function: Option<LearningFunction>) -> String {
    let mut prompt = String::with_capacity(TEMPLATE_HEAD.len() + text.len() + TEMPLATE_TAIL.len() + 128);
    prompt.push_str(TEMPLATE_HEAD);
    prompt.push_str(text);
    prompt.push_str(TEMPLATE_TAIL);

    if let Some(function) = function {
        prompt.push_str(&format!(
            "\nIMPORTANT: Only provide the response for the selected function: {}. Do not include information for other functions.\n",
            function.label()
        ));
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::SECTION_DELIMITER;

    #[test]
    fn text_is_embedded_verbatim_in_quotes() {
        let prompt = build_prompt("She don't like\nice cream", None);
        assert!(prompt.contains("\"She don't like\nice cream\""));
    }

    #[test]
    fn selected_function_restricts_reply() {
        let prompt = build_prompt("good", Some(LearningFunction::GrammarAndStructure));
        assert!(prompt.trim_end().ends_with(
            "IMPORTANT: Only provide the response for the selected function: Grammar and Structure. Do not include information for other functions."
        ));
    }

    #[test]
    fn no_function_means_no_restriction() {
        let prompt = build_prompt("good", None);
        assert!(!prompt.contains("IMPORTANT"));
    }

    #[test]
    fn template_names_every_function_under_a_heading() {
        let prompt = build_prompt("good", None);
        for function in LearningFunction::ALL {
            let heading = prompt
                .split(SECTION_DELIMITER)
                .find(|segment| segment.lines().next().unwrap_or("").contains(function.label()));
            assert!(heading.is_some(), "missing heading for {function}");
        }
    }

    #[test]
    fn empty_text_still_builds() {
        let prompt = build_prompt("", Some(LearningFunction::Definition));
        assert!(prompt.contains("\"\""));
        assert!(prompt.contains("Definition"));
    }
}
