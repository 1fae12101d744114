// src/quiz/generator.rs

use std::{sync::Arc, time::Duration};

use serde_json::Value;

use crate::{
    config::{MAX_CUSTOM_QUESTIONS, MAX_PERSONALIZED_QUESTIONS},
    models::{learner::LearnerPreferences, question::Question, quiz::PersonalizedMode},
    provider::{GenerationError, GenerationRequest, TextGenerator, generate_within},
    quiz::{history::HistoryTracker, parser::parse_quiz_text},
    store::QuizStore,
};

/// Result of a personalized request. An empty `questions` list with a
/// `message` is a normal, user-visible outcome rather than an error.
#[derive(Debug, Clone, Default)]
pub struct PersonalizedQuiz {
    pub questions: Vec<Question>,
    pub weak_topics: Vec<String>,
    pub message: Option<String>,
}

/// Orchestrates quiz generation against the external text provider.
///
/// Holds no per-learner state; every call builds a fresh attempt.
#[derive(Clone)]
pub struct QuizGenerator {
    store: Arc<dyn QuizStore>,
    history: HistoryTracker,
    provider: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl QuizGenerator {
    pub fn new(
        store: Arc<dyn QuizStore>,
        provider: Arc<dyn TextGenerator>,
        timeout: Duration,
    ) -> Self {
        Self {
            history: HistoryTracker::new(store.clone()),
            store,
            provider,
            timeout,
        }
    }

    /// Topic-driven quiz. The provider must answer with a JSON array.
    pub async fn generate_custom(
        &self,
        email: &str,
        topic: &str,
        count: u32,
    ) -> Result<Vec<Question>, GenerationError> {
        let email = learner_key(email)?;
        let topic = topic.trim();
        let count = count.clamp(1, MAX_CUSTOM_QUESTIONS) as usize;
        let preferences = self.preferences(&email).await?;

        let prompt = custom_prompt(topic, count, preferences.experience());
        let raw = generate_within(
            self.provider.as_ref(),
            &GenerationRequest::new(prompt),
            self.timeout,
        )
        .await?;

        let values = extract_json_array(&raw)?;
        let mut questions = validate_generated(values, topic)?;
        questions.truncate(count);

        tracing::info!(
            "Generated {} custom questions on '{}' for {}",
            questions.len(),
            topic,
            email
        );
        Ok(self.without_seen(&email, questions).await)
    }

    /// Personalized quiz. Adaptive mode targets the learner's weak topics.
    pub async fn generate_personalized(
        &self,
        email: &str,
        mode: PersonalizedMode,
    ) -> Result<PersonalizedQuiz, GenerationError> {
        let email = learner_key(email)?;
        let preferences = self.preferences(&email).await?;

        let (topics, weak_topics, count) = match mode {
            PersonalizedMode::Adaptive => {
                let weak = self.history.weak_topics(&email).await?;
                if weak.is_empty() {
                    return Ok(PersonalizedQuiz {
                        message: Some("No weak topics found".to_string()),
                        ..Default::default()
                    });
                }
                let count = personalized_question_count(weak.len());
                (weak.clone(), weak, count)
            }
            PersonalizedMode::Refresher => {
                let language = preferences
                    .language_preference
                    .clone()
                    .filter(|l| !l.trim().is_empty())
                    .unwrap_or_else(|| "programming fundamentals".to_string());
                (vec![language], Vec::new(), MAX_PERSONALIZED_QUESTIONS)
            }
        };

        let prompt = personalized_prompt(&topics, count, preferences.experience());
        let raw = match generate_within(
            self.provider.as_ref(),
            &GenerationRequest::new(prompt),
            self.timeout,
        )
        .await
        {
            Ok(raw) => raw,
            Err(GenerationError::EmptyResponse) => String::new(),
            Err(e) => return Err(e),
        };

        // A prose preamble before "1." parses as a leading blank block.
        // Later degraded blocks are kept.
        let mut questions = parse_quiz_text(&raw);
        if questions.first().is_some_and(is_blank) {
            questions.remove(0);
        }

        if questions.is_empty() {
            tracing::warn!("Provider returned no usable quiz content for {}", email);
            return Ok(PersonalizedQuiz {
                weak_topics,
                message: Some(
                    "The quiz could not be generated right now. Please try again.".to_string(),
                ),
                ..Default::default()
            });
        }

        if let [only] = topics.as_slice() {
            for q in questions.iter_mut().filter(|q| q.topic.is_none()) {
                q.topic = Some(only.clone());
            }
        }

        tracing::info!(
            "Generated {} personalized questions ({:?}) for {}",
            questions.len(),
            mode,
            email
        );
        let questions = self.without_seen(&email, questions).await;
        Ok(PersonalizedQuiz {
            questions,
            weak_topics,
            message: None,
        })
    }

    async fn preferences(&self, email: &str) -> Result<LearnerPreferences, GenerationError> {
        Ok(self
            .store
            .learner_preferences(email)
            .await?
            .unwrap_or_default())
    }

    /// Best-effort repeat avoidance: drops questions the learner has already
    /// seen verbatim or as a template, unless that would leave nothing.
    async fn without_seen(&self, email: &str, questions: Vec<Question>) -> Vec<Question> {
        let mut fresh = Vec::with_capacity(questions.len());
        for q in &questions {
            let seen = match self.history.has_seen_question(email, &q.question).await {
                Ok(true) => true,
                Ok(false) => match self.history.has_seen_template(email, &q.question).await {
                    Ok(seen) => seen,
                    Err(e) => {
                        tracing::warn!("Template check failed, keeping question: {:?}", e);
                        false
                    }
                },
                Err(e) => {
                    tracing::warn!("Repeat check failed, keeping question: {:?}", e);
                    false
                }
            };
            if !seen {
                fresh.push(q.clone());
            }
        }

        if fresh.is_empty() {
            tracing::debug!("Every generated question was seen before; keeping all");
            return questions;
        }
        if fresh.len() < questions.len() {
            tracing::debug!(
                "Dropped {} previously seen questions",
                questions.len() - fresh.len()
            );
        }
        fresh
    }
}

fn is_blank(question: &Question) -> bool {
    question.question.is_empty() && question.options.iter().all(String::is_empty)
}

fn learner_key(email: &str) -> Result<String, GenerationError> {
    let key = email.trim().to_lowercase();
    if key.is_empty() {
        return Err(GenerationError::MissingLearner);
    }
    Ok(key)
}

/// Spreads a fixed budget of questions over the weak topics.
pub fn personalized_question_count(weak_topic_count: usize) -> usize {
    if weak_topic_count == 0 {
        return 0;
    }
    let per_topic = (MAX_PERSONALIZED_QUESTIONS / weak_topic_count).max(1);
    MAX_PERSONALIZED_QUESTIONS.min(per_topic * weak_topic_count)
}

fn custom_prompt(topic: &str, count: usize, experience: &str) -> String {
    format!(
        "Generate {count} {experience}-level multiple choice quiz questions about \"{topic}\".\n\
         Each question must have exactly 4 options.\n\
         Respond with only a JSON array, no other text, where each element is:\n\
         {{\"question\": \"...\", \"options\": [\"...\", \"...\", \"...\", \"...\"], \
         \"answer\": \"exact text of the correct option\", \
         \"explanation\": \"one or two sentences on why it is correct\"}}"
    )
}

fn personalized_prompt(topics: &[String], count: usize, experience: &str) -> String {
    let topic_list = topics.join(", ");
    format!(
        "Generate {count} {experience}-level multiple choice quiz questions with 4 options each, \
         based on the following topics: {topic_list}.\n\
         Format:\n\
         1. Question text\n\
         Topic: the topic from the list above this question covers\n\
         A. Option A\n\
         B. Option B\n\
         C. Option C\n\
         D. Option D\n\
         Answer: exact text of the correct option\n\
         Explanation: brief explanation why this is correct.\n\
         Do not write \"Answer: A\"; only write the option text after \"Answer:\".\n\
         (Repeat for all questions)"
    )
}

/// Finds the first well-formed JSON array of question objects in a provider response.
///
/// Prose or markdown fences around the array are tolerated. Candidates are
/// bracket-balanced spans starting at each `[`, tried in order. Arrays of
/// anything other than objects, such as `["A", "B"]` in a preamble, are
/// skipped. A bare `[]` is only returned when no object array follows.
pub fn extract_json_array(raw: &str) -> Result<Vec<Value>, GenerationError> {
    if raw.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let mut last_error = "no JSON array found".to_string();
    let mut saw_empty = false;
    for (start, _) in raw.match_indices('[') {
        let Some(end) = balanced_end(&raw[start..]) else {
            continue;
        };
        match serde_json::from_str::<Vec<Value>>(&raw[start..start + end]) {
            Ok(values) if values.is_empty() => saw_empty = true,
            Ok(values) if values.iter().all(Value::is_object) => return Ok(values),
            Ok(_) => last_error = "array does not hold question objects".to_string(),
            Err(e) => last_error = e.to_string(),
        }
    }

    if saw_empty {
        return Ok(Vec::new());
    }
    Err(GenerationError::MalformedJson(last_error))
}

/// Byte length of the bracket-balanced span at the start of `text`,
/// ignoring brackets inside JSON strings.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

/// Checks every generated element against the question schema.
///
/// One invalid element rejects the whole response.
pub fn validate_generated(values: Vec<Value>, topic: &str) -> Result<Vec<Question>, GenerationError> {
    if values.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| -> Result<Question, GenerationError> {
            let invalid = |reason: &str| GenerationError::InvalidQuestion {
                index,
                reason: reason.to_string(),
            };

            let obj = value.as_object().ok_or_else(|| invalid("not an object"))?;

            let question = obj
                .get("question")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .ok_or_else(|| invalid("missing question text"))?;

            let options = obj
                .get("options")
                .and_then(Value::as_array)
                .ok_or_else(|| invalid("missing options"))?;
            if options.is_empty() || options.len() > 4 {
                return Err(invalid("options must hold between 1 and 4 entries"));
            }
            let options = options
                .iter()
                .map(|o| o.as_str().map(|s| s.trim().to_string()))
                .collect::<Option<Vec<String>>>()
                .ok_or_else(|| invalid("options must be strings"))?;

            let answer = obj
                .get("answer")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid("missing answer"))?;

            let explanation = obj
                .get("explanation")
                .and_then(Value::as_str)
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty());

            Ok(Question {
                question: question.to_string(),
                options,
                answer: answer.trim().to_string(),
                explanation,
                topic: (!topic.is_empty()).then(|| topic.to_string()),
            })
        })
        .collect()
}
