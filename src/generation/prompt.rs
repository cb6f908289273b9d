// src/generation/prompt.rs

use serde_json::{Value, json};

use crate::models::settings::{Difficulty, ExplanationDetail, GenerationSettings};

/// What gets sent to the model besides the document itself.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub instruction: String,
    pub schema: Value,
}

fn difficulty_paragraph(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => {
            "Generate questions at an EASY difficulty level. Focus on basic concepts, definitions, and straightforward applications. Questions should test fundamental understanding and recall."
        }
        Difficulty::Medium => {
            "Generate questions at a MEDIUM difficulty level. Include questions that require analysis, comparison, and application of concepts. Mix conceptual understanding with practical application."
        }
        Difficulty::Hard => {
            "Generate questions at a HARD difficulty level. Create challenging questions that require critical thinking, synthesis of multiple concepts, complex problem-solving, and deep analysis."
        }
        Difficulty::Mixed => {
            "Generate questions with MIXED difficulty levels, progressing from easy to hard. Start with basic recall questions, move to medium-level analysis questions, and end with challenging synthesis and application questions."
        }
    }
}

fn explanation_paragraph(detail: ExplanationDetail) -> &'static str {
    match detail {
        ExplanationDetail::Detailed => {
            "Include detailed, comprehensive explanations for the correct answer. Provide context, reasoning, and additional insights that help reinforce understanding. The explanation should be educational and thorough."
        }
        ExplanationDetail::Brief => {
            "Include brief, concise explanations for the correct answer. Keep explanations clear and to the point, focusing on the key reason why the answer is correct."
        }
    }
}

/// Builds the instruction text and the structured-output schema for `settings`.
pub fn build_prompt(settings: &GenerationSettings) -> Prompt {
    Prompt {
        instruction: build_instruction(settings),
        schema: questions_schema(),
    }
}

pub fn build_instruction(settings: &GenerationSettings) -> String {
    let count = settings.number_of_questions;
    let difficulty = settings.difficulty.as_str();
    let explanation = settings.explanation.as_str();

    format!(
        "Please analyze the content of this PDF document and generate exactly {count} multiple choice questions based on the material.

DIFFICULTY REQUIREMENTS:
{difficulty_text}

EXPLANATION REQUIREMENTS:
{explanation_text} The explanation shouldn't state any references to the original document.

For each question:
1. Create a clear, well-structured question appropriate for the specified difficulty level
2. Provide 4 answer options (A, B, C, D)
3. Indicate the correct answer
4. Include an explanation following the detail level specified above
5. If the content contains mathematical formulas, equations, or symbols, format them using LaTeX notation (enclosed in $ for inline math or $$ for display math)
6. Make sure all text is properly formatted for JSON
7. Generate exactly {count} questions
8. Follow the {difficulty} difficulty level requirement strictly
9. Provide {explanation} explanations as specified
10. Use proper LaTeX notation for all mathematical content
11. Focus on creating meaningful questions that test understanding

The response will be automatically formatted as JSON according to the specified schema.
",
        difficulty_text = difficulty_paragraph(settings.difficulty),
        explanation_text = explanation_paragraph(settings.explanation),
    )
}

/// Array-of-questions schema in the Gemini `responseSchema` dialect.
pub fn questions_schema() -> Value {
    let option = |letter: &str| {
        json!({
            "type": "STRING",
            "description": format!("Option {letter} text, can include LaTeX math notation"),
        })
    };

    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "id": {
                    "type": "INTEGER",
                    "description": "Unique identifier for the question"
                },
                "question": {
                    "type": "STRING",
                    "description": "The question text, can include LaTeX math notation"
                },
                "options": {
                    "type": "OBJECT",
                    "properties": {
                        "A": option("A"),
                        "B": option("B"),
                        "C": option("C"),
                        "D": option("D")
                    },
                    "required": ["A", "B", "C", "D"],
                    "propertyOrdering": ["A", "B", "C", "D"]
                },
                "correctAnswer": {
                    "type": "STRING",
                    "enum": ["A", "B", "C", "D"],
                    "description": "The correct answer option"
                },
                "explanation": {
                    "type": "STRING",
                    "description": "Explanation for why the correct answer is right, can include LaTeX math notation"
                }
            },
            "required": ["id", "question", "options", "correctAnswer", "explanation"],
            "propertyOrdering": ["id", "question", "options", "correctAnswer", "explanation"]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_embeds_count_and_paragraphs() {
        let settings = GenerationSettings {
            number_of_questions: 7,
            difficulty: Difficulty::Hard,
            explanation: ExplanationDetail::Detailed,
        };
        let text = build_instruction(&settings);

        assert!(text.contains("generate exactly 7 multiple choice questions"));
        assert!(text.contains("Generate exactly 7 questions"));
        assert!(text.contains("HARD difficulty level"));
        assert!(text.contains("detailed, comprehensive explanations"));
        assert!(text.contains("Follow the hard difficulty level"));
        assert!(text.contains("Provide detailed explanations"));
    }

    #[test]
    fn every_difficulty_has_its_own_paragraph() {
        let texts: Vec<&str> = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard, Difficulty::Mixed]
            .into_iter()
            .map(difficulty_paragraph)
            .collect();
        for (i, a) in texts.iter().enumerate() {
            for b in &texts[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn instruction_is_deterministic() {
        let settings = GenerationSettings::default();
        assert_eq!(build_instruction(&settings), build_instruction(&settings));
        assert!(build_instruction(&settings).contains("MIXED difficulty levels"));
        assert!(build_instruction(&settings).contains("brief, concise explanations"));
    }

    #[test]
    fn schema_declares_required_fields_in_order() {
        let schema = questions_schema();
        assert_eq!(schema["type"], "ARRAY");

        let item = &schema["items"];
        let order: Vec<&str> = item["propertyOrdering"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(order, ["id", "question", "options", "correctAnswer", "explanation"]);
        assert_eq!(item["required"], item["propertyOrdering"]);
        assert_eq!(item["properties"]["correctAnswer"]["enum"], json!(["A", "B", "C", "D"]));
        assert_eq!(item["properties"]["options"]["required"], json!(["A", "B", "C", "D"]));
    }
}
