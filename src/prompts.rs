//! Prompt construction for move selection.

use crate::moves::MoveVocabulary;

/// Produces the text sent to the model.
pub trait PromptBuilder {
    /// Static instructions describing the task and the legal moves.
    fn system_prompt(&self) -> String;

    /// User prompt wrapping the situation description.
    ///
    /// # Arguments
    /// * `context` - caller-supplied description of the current situation
    /// * `wrong_answer` - the model's previous, invalid answer, if any
    ///
    /// # Returns
    /// The prompt text; with `wrong_answer` set it also tells the model that answer was
    /// not a legal move
    fn main_prompt(&self, context: &str, wrong_answer: Option<&str>) -> String;
}

/// Default template-based builder. The move list is rendered once at construction.
#[derive(Debug, Clone)]
pub struct TemplatePromptBuilder {
    move_list: String,
}

impl TemplatePromptBuilder {
    pub fn new(vocabulary: &MoveVocabulary) -> Self {
        let move_list = vocabulary
            .iter()
            .map(|(key, dir)| format!("- {key}: {dir}"))
            .collect::<Vec<_>>()
            .join("\n");
        Self { move_list }
    }
}

impl PromptBuilder for TemplatePromptBuilder {
    fn system_prompt(&self) -> String {
        format!(
            "You control a robot on a grid. Each turn you receive a description of the \
             situation and must pick exactly one move.\n\
             Legal moves:\n{}\n\
             Answer with the move identifier only, exactly as written above, with no other text.",
            self.move_list
        )
    }

    fn main_prompt(&self, context: &str, wrong_answer: Option<&str>) -> String {
        let mut prompt = format!("Situation:\n{context}\n\nWhich move do you choose?");
        if let Some(wrong) = wrong_answer {
            prompt.push_str(&format!(
                "\n\nYour previous answer \"{wrong}\" is not a legal move. \
                 Reply with one of the legal move identifiers only."
            ));
        }
        prompt
    }
}
