//! Per-category prompt directives, output schemas and fairness rationales

use crate::category::AccessibilityCategory;

pub(crate) fn prompt_directive(category: AccessibilityCategory) -> &'static str {
    match category {
        AccessibilityCategory::Adhd => ADHD_DIRECTIVE,
        AccessibilityCategory::Autism => AUTISM_DIRECTIVE,
        AccessibilityCategory::Dyslexia => DYSLEXIA_DIRECTIVE,
        AccessibilityCategory::Visual => VISUAL_DIRECTIVE,
        AccessibilityCategory::Hearing => HEARING_DIRECTIVE,
        AccessibilityCategory::Intellectual => INTELLECTUAL_DIRECTIVE,
        AccessibilityCategory::Speech => SPEECH_DIRECTIVE,
        AccessibilityCategory::Motor => MOTOR_DIRECTIVE,
        AccessibilityCategory::Aac => AAC_DIRECTIVE,
        AccessibilityCategory::General => GENERAL_DIRECTIVE,
    }
}

pub(crate) fn output_schema(category: AccessibilityCategory) -> &'static str {
    match category {
        AccessibilityCategory::Adhd => ADHD_SCHEMA,
        AccessibilityCategory::Autism => AUTISM_SCHEMA,
        AccessibilityCategory::Dyslexia => DYSLEXIA_SCHEMA,
        AccessibilityCategory::Visual => VISUAL_SCHEMA,
        AccessibilityCategory::Hearing => HEARING_SCHEMA,
        AccessibilityCategory::Intellectual => INTELLECTUAL_SCHEMA,
        AccessibilityCategory::Speech => SPEECH_SCHEMA,
        AccessibilityCategory::Motor => MOTOR_SCHEMA,
        AccessibilityCategory::Aac => AAC_SCHEMA,
        AccessibilityCategory::General => GENERAL_SCHEMA,
    }
}

pub(crate) fn fairness_rationale(category: AccessibilityCategory) -> &'static str {
    match category {
        AccessibilityCategory::Speech => {
            "The student stammers. Repetitions, prolongations, blocks and pauses are \
             features of their speech, not errors. Judge fluency on intelligibility and \
             content clarity only."
        }
        AccessibilityCategory::Aac => {
            "The student communicates through an AAC device or with device support. \
             Synthetic pacing, short phrases and device pauses must not lower fluency or \
             confidence."
        }
        AccessibilityCategory::Hearing => {
            "The student is deaf or hard of hearing. Pronunciation may differ from \
             hearing norms; weight intelligibility and content over accent-level accuracy."
        }
        AccessibilityCategory::Autism => {
            "The student is on the autism spectrum. Flat or unusual prosody and literal \
             phrasing are not signs of low confidence."
        }
        AccessibilityCategory::Adhd => {
            "The student has ADHD. Restarts and topic jumps reflect attention regulation; \
             judge the ideas that were expressed."
        }
        AccessibilityCategory::Intellectual => {
            "The student has an intellectual disability. Simple vocabulary and short \
             sentences are appropriate; reward correct meaning."
        }
        AccessibilityCategory::Dyslexia => {
            "The student has dyslexia. Decoding slowdowns while reading aloud should not be \
             treated as a fluency deficit in spoken language."
        }
        AccessibilityCategory::Visual => {
            "The student is blind or has low vision. Reading-aloud tasks may rely on \
             braille or memory; slower pacing is expected."
        }
        AccessibilityCategory::Motor => {
            "The student has a motor or physical disability that may affect breath support \
             and articulation. Judge content and intelligibility."
        }
        AccessibilityCategory::General => {
            "Apply standard, inclusive scoring with no additional allowances."
        }
    }
}

const ADHD_DIRECTIVE: &str = "ADHD DESIGN RULES:
1. Open with a one-sentence hook: something surprising about the topic.
2. Split all content into micro-chunks of 2-3 sentences, each with an emoji header.
3. After every two chunks add a one-question Quick Check.
4. Active voice only. Remove filler and tangents.
5. Bold the single most important keyword of each chunk.
6. Close with a three-bullet Level Complete summary and two harder Challenge Mode questions.
7. Keep the passage under 600 words.";

const AUTISM_DIRECTIVE: &str = "AUTISM SPECTRUM DESIGN RULES:
1. Use clear, literal, explicit language. No idioms, sarcasm or vague metaphors.
2. Use the same numbered headings every time: 1. What This Is, 2. How It Works, 3. Why It Matters, 4. Key Words to Remember, 5. Practice Questions.
3. Introduce every new concept with \"This means: <simple definition>.\"
4. Avoid sensory-overload wording unless it is educationally required.
5. Number every step of every process.
6. Provide a vocabulary glossary for every domain term used.
7. End with exactly three practice questions with unambiguous answers.
8. Keep the passage between 400 and 600 words.";

const DYSLEXIA_DIRECTIVE: &str = "DYSLEXIA DESIGN RULES:
1. Short subject-verb-object sentences, at most 12 words each.
2. Never use passive voice.
3. Define every complex domain word in parentheses right where it appears.
4. Leave a blank line after every 2-3 sentences.
5. Prefer numbered lists over paragraphs.
6. Give phonetic helpers for difficult words, e.g. Photosynthesis (FOH-toh-SIN-thuh-sis).
7. State each key concept, then restate it in different simple words.
8. Keep the passage between 300 and 500 words.";

const VISUAL_DIRECTIVE: &str = "VISUAL IMPAIRMENT DESIGN RULES:
1. The material will be read aloud by a screen reader or text-to-speech engine.
2. Never use visual references such as \"see\", \"look at\" or \"as shown\".
3. Describe anything normally shown in a diagram verbally and completely.
4. Spell out every abbreviation on first use.
5. Use spoken transitions so the listener can follow the structure.
6. Describe spatial relationships in words.
7. Provide an audio guide script: a conversational, listening-first version of the key points.
8. All questions must be answerable without visual aids.
9. Keep the passage between 400 and 700 words.";

const HEARING_DIRECTIVE: &str = "HEARING IMPAIRMENT DESIGN RULES:
1. The student cannot hear. All information must be visual.
2. Never reference sounds, audio or listening; replace sound analogies with visual or tactile ones.
3. Use rich visual imagery: colors, shapes, positions, movement.
4. Give a detailed diagram description for every major concept, at least three.
5. Give at least three specific image search queries a teacher could use.
6. Structure the content as a numbered visual storyboard.
7. Include a visual summary written as a flowchart description.
8. Keep the passage between 400 and 600 words.";

const INTELLECTUAL_DIRECTIVE: &str = "INTELLECTUAL DISABILITY DESIGN RULES:
1. Use only high-frequency everyday words; explain any domain term like talking to a friend.
2. Focus on one or two main takeaways and cut everything else.
3. Keep a warm, encouraging tone.
4. Use concrete examples from daily life: food, family, animals.
5. Restate the main idea at least three times in different words.
6. Provide a simple summary of exactly three easy sentences.
7. Questions are simple recall with clear right answers.
8. Keep the passage between 200 and 350 words.";

const SPEECH_DIRECTIVE: &str = "SPEECH AND STAMMERING DESIGN RULES:
1. The student may read this aloud; design sentence rhythm for smooth reading.
2. Keep sentences between 8 and 12 words with natural breathing points.
3. Avoid hard consonant clusters (st, str, sp, sk, cr, br, pr, tr) at sentence starts where possible.
4. Avoid tongue-twisters and alliteration.
5. Use commas generously to create pause points.
6. Provide a read-aloud script with [pause] markers and *emphasis* markers.
7. Keep the passage between 300 and 500 words.";

const MOTOR_DIRECTIVE: &str = "MOTOR AND PHYSICAL DISABILITY DESIGN RULES:
1. Never ask for physical actions such as drawing, writing by hand or standing up.
2. Focus on cognitive exploration: thinking, imagining, reasoning, discussing.
3. Use immersive narrative suitable for a student using adaptive technology.
4. Questions must be answerable by typing, clicking or selecting.
5. Replace hands-on activities with Think About It reflection prompts.
6. Keep the passage between 400 and 600 words.";

const AAC_DIRECTIVE: &str = "AAC DESIGN RULES:
1. The student communicates with an AAC device using symbols and short phrases.
2. Use core vocabulary and sentences of at most 8 words.
3. Every answer must be expressible as a short phrase or a choice between options.
4. Provide a list of core phrases the student can program into their device.
5. Write every question as a multiple-choice question with 2-4 short options.
6. Keep a calm, predictable structure and avoid time pressure wording.
7. Keep the passage between 200 and 400 words.";

const GENERAL_DIRECTIVE: &str = "GENERAL INCLUSIVE DESIGN RULES:
1. Clear formatting with headings and bullet points.
2. Active voice and a supportive, engaging tone.
3. Mix difficulty levels within the material.
4. Use inclusive, culturally neutral language.
5. Keep the passage between 400 and 600 words.";

const ADHD_SCHEMA: &str = r#"{
  "title": "<concise catchy title>",
  "hook": "<one surprising sentence>",
  "passage": "<micro-chunked passage with emoji headers and bold keywords>",
  "checkpoint_questions": ["<quick check 1>", "<quick check 2>", "<quick check 3>"],
  "key_concepts": ["<concept 1>", "<concept 2>", "<concept 3>"],
  "summary": "<three bullet summary>",
  "challenge_questions": ["<harder question 1>", "<harder question 2>"],
  "questions": ["<question 1>", "<question 2>", "<question 3>"]
}"#;

const AUTISM_SCHEMA: &str = r#"{
  "title": "<clear descriptive title>",
  "passage": "<structured passage with numbered headings>",
  "vocabulary_glossary": [{"term": "<word>", "definition": "<simple definition>"}],
  "key_concepts": ["<concept 1>", "<concept 2>", "<concept 3>"],
  "summary": "<clear two-sentence summary>",
  "questions": ["<question 1>", "<question 2>", "<question 3>"]
}"#;

const DYSLEXIA_SCHEMA: &str = r#"{
  "title": "<simple clear title>",
  "passage": "<passage with short sentences and spacing>",
  "phonetic_helpers": [{"word": "<difficult word>", "phonetic": "<pronunciation>", "meaning": "<simple definition>"}],
  "key_concepts": ["<concept 1>", "<concept 2>", "<concept 3>"],
  "summary": "<two-sentence summary in simple words>",
  "questions": ["<question 1>", "<question 2>", "<question 3>"]
}"#;

const VISUAL_SCHEMA: &str = r#"{
  "title": "<descriptive title>",
  "passage": "<screen-reader friendly passage with verbal descriptions>",
  "audio_guide_script": "<conversational 200-word listening script>",
  "key_concepts": ["<concept 1>", "<concept 2>", "<concept 3>"],
  "summary": "<two-sentence verbal summary>",
  "questions": ["<question 1>", "<question 2>", "<question 3>"]
}"#;

const HEARING_SCHEMA: &str = r#"{
  "title": "<clear visual title>",
  "passage": "<visually structured passage with no audio references>",
  "diagram_descriptions": [
    {"concept": "<concept>", "description": "<what the diagram shows, with labels, arrows and colors>"}
  ],
  "image_search_queries": ["<query 1>", "<query 2>", "<query 3>"],
  "visual_summary": "<flowchart-style visual summary>",
  "key_concepts": ["<concept 1>", "<concept 2>", "<concept 3>"],
  "summary": "<two-sentence summary>",
  "questions": ["<question 1>", "<question 2>", "<question 3>"]
}"#;

const INTELLECTUAL_SCHEMA: &str = r#"{
  "title": "<friendly simple title>",
  "passage": "<warm simple passage with everyday examples>",
  "simplified_summary": "<the lesson in three easy sentences>",
  "key_concepts": ["<concept 1>", "<concept 2>"],
  "summary": "<one-sentence summary>",
  "questions": ["<question 1>", "<question 2>", "<question 3>"]
}"#;

const SPEECH_SCHEMA: &str = r#"{
  "title": "<smooth flowing title>",
  "passage": "<rhythmic passage for comfortable reading aloud>",
  "read_aloud_script": "<same passage with [pause] and *emphasis* markers>",
  "key_concepts": ["<concept 1>", "<concept 2>", "<concept 3>"],
  "summary": "<two-sentence summary with short words>",
  "questions": ["<question 1>", "<question 2>", "<question 3>"]
}"#;

const MOTOR_SCHEMA: &str = r#"{
  "title": "<engaging title>",
  "passage": "<cognitively engaging passage with no physical actions>",
  "key_concepts": ["<concept 1>", "<concept 2>", "<concept 3>"],
  "summary": "<two-sentence summary>",
  "think_prompts": ["<reflection prompt 1>", "<reflection prompt 2>"],
  "questions": ["<question 1>", "<question 2>", "<question 3>"]
}"#;

const AAC_SCHEMA: &str = r#"{
  "title": "<short title>",
  "passage": "<short-sentence passage using core vocabulary>",
  "core_phrases": ["<phrase 1>", "<phrase 2>", "<phrase 3>"],
  "key_concepts": ["<concept 1>", "<concept 2>"],
  "summary": "<two short sentences>",
  "questions": ["<question with options A/B/C>", "<question 2>", "<question 3>"]
}"#;

const GENERAL_SCHEMA: &str = r#"{
  "title": "<clear title>",
  "passage": "<well-structured inclusive passage>",
  "key_concepts": ["<concept 1>", "<concept 2>", "<concept 3>"],
  "summary": "<two-sentence summary>",
  "questions": ["<question 1>", "<question 2>", "<question 3>"]
}"#;
