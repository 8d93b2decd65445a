// src/generation/prompt.rs

/// System + user messages for one generation request. The user prompt pins
/// the exact reply shape the parser depends on, so changes here and in
/// `parser.rs` have to move together.
#[derive(Debug, Clone)]
pub struct ExercisePrompt {
    pub system: String,
    pub user: String,
}

impl ExercisePrompt {
    pub fn build(
        course_title: &str,
        lesson_title: &str,
        lesson_body: &str,
        question_count: u32,
    ) -> Self {
        let system = "You are Preppy, an excellent and critical engineering tutor tasked with \
            creating exercise questions based on the lesson provided. Do not mind whether the \
            student is a beginner or an expert; focus on questions that help the student \
            understand the lesson better, in varying difficulty."
            .to_string();

        let user = format!(
            "This course is mainly about {course_title}. Based on this lesson: \
            {lesson_title} - {lesson_body}\n\n\
            Please generate {question_count} multiple-choice questions of varying difficulty \
            for this lesson.\n\n\
            Format each question exactly like this, with one blank line between questions:\n\
            - The first line is the question and must end with a question mark.\n\
            - Then four choice lines, one per line, prefixed A. B. C. D.\n\
            - Then one line: Correct Answer: <the text of the correct choice>\n\
            Do not number the questions, do not label their difficulty, and do not add \
            any other text."
        );

        Self { system, user }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_pins_the_reply_shape() {
        let prompt = ExercisePrompt::build("Integral Calculus", "U-substitution", "Let u = g(x)...", 12);

        assert!(prompt.user.contains("Integral Calculus"));
        assert!(prompt.user.contains("U-substitution"));
        assert!(prompt.user.contains("generate 12 multiple-choice questions"));
        assert!(prompt.user.contains("question mark"));
        assert!(prompt.user.contains("A. B. C. D."));
        assert!(prompt.user.contains("Correct Answer:"));
        assert!(prompt.user.contains("Do not number"));
    }
}
