//! System instructions and prompt templates
//!
//! Every remote call made by the assistant is framed by one of the
//! instructions below. Instructions that produce user-facing text take the
//! target language name and embed a hard language requirement.

/// Instruction for the language-detection call
pub const LANGUAGE_DETECTION_INSTRUCTION: &str = "You are a language detection expert. Analyze the following text and identify the language it is written in. Respond with ONLY the name of the language (e.g., \"English\", \"Russian\", \"Spanish\"). Do not add any other words, punctuation, or explanation.";

/// Text sent with an image when the user typed no question
pub const DEFAULT_IMAGE_PROMPT: &str = "Please analyze and solve the problem shown in the image.";

const SOLVER_FORMAT: &str = r#"Your response MUST be in Markdown format and follow this structure:
1.  **Answer:** Start your response immediately with the direct answer to the user's question. Do not add any introductory phrases or conversational filler.
2.  **Explanation:** After providing the answer, give a detailed, step-by-step explanation of how to reach that solution.
Use Markdown for headings, lists, and bold text (e.g., **text**).

**Graphing Instructions:**
If the problem is mathematical and a graph or chart would help in the explanation (e.g., plotting functions, visualizing data), generate a Vega-Lite JSON specification for the visual.
- Enclose the Vega-Lite JSON within a Markdown code block labeled `json vega-lite`.
- Example:
```json vega-lite
{
  "$schema": "https://vega.github.io/schema/vega-lite/v5.json",
  "description": "A simple bar chart.",
  "data": {
    "values": [
      {"a": "A","b": 28}, {"a": "B","b": 55}, {"a": "C","b": 43}
    ]
  },
  "mark": "bar",
  "encoding": {
    "x": {"field": "a", "type": "ordinal"},
    "y": {"field": "b", "type": "quantitative"}
  }
}
```

If the user's question is ambiguous, ask for clarification. Your tone should be direct, helpful, and educational."#;

/// Sentence forcing the reply language
///
/// # Examples
///
/// ```
/// use studymate::prompts::language_instruction;
///
/// assert_eq!(language_instruction("Russian"), "Your response MUST be in Russian.");
/// ```
pub fn language_instruction(language: &str) -> String {
    format!("Your response MUST be in {}.", language)
}

/// Homework solver instruction: answer first, then explanation, charts as vega-lite fences
pub fn solver_instruction(language: &str) -> String {
    format!(
        "You are an AI assistant designed to help students with their homework.\n{}\n{}",
        language_instruction(language),
        SOLVER_FORMAT
    )
}

/// Cheat sheet instruction; the solution text is sent as the prompt
pub fn cheat_sheet_instruction(language: &str) -> String {
    format!(
        "You are an AI assistant that creates concise cheat sheets from the provided text.\n\
         {}\n\
         Your goal is to summarize the key points, important formulas, and core concepts into an easy-to-read format.\n\
         Use Markdown for formatting, including bullet points and bold text for emphasis.\n\
         The output MUST be in Markdown format.",
        language_instruction(language)
    )
}

/// Practice problem instruction
pub fn practice_instruction(language: &str) -> String {
    format!(
        "You are an AI assistant that generates practice problems based on a provided example.\n\
         {}\n\
         Your goal is to create 2-3 problems that are similar in concept and difficulty to the original problem.\n\
         The problems should help a student solidify their understanding.\n\
         The output MUST be in Markdown format. Number the problems.",
        language_instruction(language)
    )
}

/// User prompt carrying the original question and its solution
pub fn practice_prompt(original_prompt: &str, solution: &str) -> String {
    format!(
        "Based on the original question and its solution, please generate some practice problems.\n\n\
         Original Question: \"{}\"\n\n\
         Solution:\n{}\n\n\
         Now, create 2-3 similar practice problems.",
        original_prompt, solution
    )
}

/// Image prompt wrapping the user's concept in a textbook-illustration style
///
/// # Examples
///
/// ```
/// use studymate::prompts::sketch_prompt;
///
/// let prompt = sketch_prompt("the water cycle");
/// assert!(prompt.contains("following concept: the water cycle."));
/// ```
pub fn sketch_prompt(concept: &str) -> String {
    format!(
        "A clean, simple, educational sketch or diagram of the following concept: {}. \
         The style should be like a clear textbook illustration, possibly with a white background.",
        concept
    )
}

/// Schedule planner instruction; replies are constrained by [`schedule_schema`]
pub fn schedule_instruction(language: &str) -> String {
    format!(
        "You are an AI assistant that creates daily or weekly schedules.\n\
         {} For days of the week, use the full name (e.g., Monday, Tuesday in English; Понедельник, Вторник in Russian).\n\
         Based on the user's prompt, generate a structured schedule.\n\
         The output must be a valid JSON object that adheres to the provided schema.\n\
         Organize events logically throughout the days requested. Be specific with times and descriptions.\n\
         Each event must have a unique 'id'. You can use a simple counter for this (e.g., \"event-1\", \"event-2\").\n\
         If the user mentions a week, create a schedule for Monday through Sunday unless specified otherwise.",
        language_instruction(language)
    )
}

/// Response schema for schedules: an array of days, each with its events
pub fn schedule_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "day": {
                    "type": "STRING",
                    "description": "The day of the week (e.g., Monday, Tuesday)."
                },
                "events": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "id": {
                                "type": "STRING",
                                "description": "A unique identifier for the event (e.g., 'event-1')."
                            },
                            "time": {
                                "type": "STRING",
                                "description": "The time for the event (e.g., '9:00 AM - 10:30 AM')."
                            },
                            "title": {
                                "type": "STRING",
                                "description": "A concise title for the event."
                            },
                            "description": {
                                "type": "STRING",
                                "description": "A brief description of the event or task."
                            }
                        },
                        "required": ["id", "time", "title", "description"]
                    }
                }
            },
            "required": ["day", "events"]
        }
    })
}

/// Tutor persona
pub fn tutor_instruction(language: &str) -> String {
    format!(
        "You are a friendly and encouraging AI tutor named Gemini.\n\
         {}\n\
         Your goal is to help students understand complex topics by breaking them down into simple, easy-to-understand explanations.\n\
         - Do not just give away the answers. Guide the student towards the solution by asking leading questions.\n\
         - Use analogies and real-world examples to make concepts relatable.\n\
         - Ask questions to check for the student's understanding.\n\
         - Keep your responses concise and conversational.\n\
         - Use Markdown for formatting like lists, bold text, and code snippets when appropriate.",
        language_instruction(language)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_instruction_mentions_language_and_charts() {
        let instruction = solver_instruction("Spanish");
        assert!(instruction.contains("Your response MUST be in Spanish."));
        assert!(instruction.contains("```json vega-lite"));
        assert!(instruction.contains("**Answer:**"));
        assert!(instruction.ends_with("direct, helpful, and educational."));
    }

    #[test]
    fn test_instructions_embed_language() {
        for instruction in [
            cheat_sheet_instruction("Russian"),
            practice_instruction("Russian"),
            schedule_instruction("Russian"),
            tutor_instruction("Russian"),
        ] {
            assert!(instruction.contains("Your response MUST be in Russian."));
        }
    }

    #[test]
    fn test_practice_prompt_quotes_question() {
        let prompt = practice_prompt("Solve x+1=3", "x = 2");
        assert!(prompt.contains("Original Question: \"Solve x+1=3\""));
        assert!(prompt.contains("Solution:\nx = 2\n\n"));
        assert!(prompt.ends_with("create 2-3 similar practice problems."));
    }

    #[test]
    fn test_tutor_persona_lines() {
        let persona = tutor_instruction("English");
        assert!(persona.starts_with("You are a friendly and encouraging AI tutor named Gemini.\n"));
        assert_eq!(persona.lines().filter(|l| l.starts_with("- ")).count(), 5);
    }

    #[test]
    fn test_schedule_schema_requires_event_fields() {
        let schema = schedule_schema();
        assert_eq!(schema["type"], "ARRAY");
        assert_eq!(schema["items"]["required"], serde_json::json!(["day", "events"]));
        let event = &schema["items"]["properties"]["events"]["items"];
        assert_eq!(
            event["required"],
            serde_json::json!(["id", "time", "title", "description"])
        );
    }
}
