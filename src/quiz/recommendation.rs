// src/quiz/recommendation.rs

use std::{collections::HashSet, sync::Arc, sync::LazyLock, time::Duration};

use regex::Regex;
use url::Url;

use crate::{
    error::AppError,
    models::recommendation::{Recommendation, RecommendationKind},
    provider::{GenerationError, GenerationRequest, TextGenerator, generate_within},
    store::QuizStore,
};

static TITLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(.+?)""#).expect("title regex is valid"));

static LINK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("link regex is valid"));

const VIDEO_MARKER: &str = "📺";
const ARTICLE_MARKER: &str = "📰";
const PLACEHOLDER_THUMBNAIL: &str = "https://via.placeholder.com/160x90?text=Resource";
const MAX_STORED_RECOMMENDATIONS: usize = 3;
const BASELINE_LANGUAGE: &str = "python";

/// Turns one free-text recommendation line into a structured entry.
pub fn parse_recommendation_line(line: &str) -> Recommendation {
    let title = TITLE_REGEX
        .captures(line)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| "Untitled".to_string());

    let link = LINK_REGEX
        .find(line)
        .map(|m| m.as_str().trim_end_matches([')', ',', '.', ']']).to_string());

    let is_video = line.contains(VIDEO_MARKER)
        || link
            .as_deref()
            .is_some_and(|l| l.contains("youtube.com/watch?v="));

    let kind = if is_video {
        RecommendationKind::Video
    } else {
        RecommendationKind::Article
    };

    let thumbnail = match (kind, link.as_deref()) {
        (RecommendationKind::Video, Some(l)) => match youtube_id(l) {
            Some(id) => youtube_thumbnail(&id),
            None => PLACEHOLDER_THUMBNAIL.to_string(),
        },
        (RecommendationKind::Article, Some(l)) => favicon_for(l),
        (_, None) => PLACEHOLDER_THUMBNAIL.to_string(),
    };

    Recommendation {
        kind,
        title,
        hostname: link.as_deref().map(hostname_of).unwrap_or_default(),
        link,
        thumbnail,
    }
}

fn youtube_id(link: &str) -> Option<String> {
    let (_, rest) = link.split_once("v=")?;
    let id = rest.split('&').next().unwrap_or_default();
    (!id.is_empty()).then(|| id.to_string())
}

fn youtube_thumbnail(id: &str) -> String {
    format!("https://img.youtube.com/vi/{}/hqdefault.jpg", id)
}

fn favicon_for(link: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(link.as_bytes()).collect();
    format!("https://www.google.com/s2/favicons?sz=128&domain_url={}", encoded)
}

/// Host of a link without a leading `www.`; empty when the link does not parse.
fn hostname_of(link: &str) -> String {
    Url::parse(link)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_default()
}

fn video(title: &str, id: &str) -> Recommendation {
    Recommendation {
        kind: RecommendationKind::Video,
        title: title.to_string(),
        link: Some(format!("https://www.youtube.com/watch?v={}", id)),
        hostname: "youtube.com".to_string(),
        thumbnail: youtube_thumbnail(id),
    }
}

fn article(title: &str, link: &str) -> Recommendation {
    let hostname = hostname_of(link);
    Recommendation {
        kind: RecommendationKind::Article,
        title: title.to_string(),
        link: Some(link.to_string()),
        thumbnail: format!("https://www.google.com/s2/favicons?sz=128&domain={}", hostname),
        hostname,
    }
}

/// Static video + article pair per language, used when nothing personal is stored.
///
/// Unknown or unset preferences fall back to the baseline language.
pub fn fallback_recommendations(language: Option<&str>) -> Vec<Recommendation> {
    let key = language.map(|l| l.trim().to_lowercase()).unwrap_or_default();
    let key = match key.as_str() {
        "c++" | "cpp" => "cplusplus",
        "js" => "javascript",
        other => other,
    };

    let pair = match key {
        "javascript" => [
            video("JavaScript Tutorial for Beginners", "W6NZfCO5SIk"),
            article(
                "JavaScript Guide",
                "https://developer.mozilla.org/en-US/docs/Web/JavaScript/Guide",
            ),
        ],
        "html" => [
            video("HTML Crash Course For Beginners", "UB1O30fR-EE"),
            article("HTML Beginner's Guide", "https://www.w3schools.com/html/"),
        ],
        "css" => [
            video("CSS Crash Course For Beginners", "yfoY53QXEnI"),
            article("CSS Tutorial for Beginners", "https://www.w3schools.com/css/"),
        ],
        "sql" => [
            video("SQL Tutorial - Full Database Course", "HXV3zeQKqGY"),
            article("Learn SQL Basics", "https://www.w3schools.com/sql/"),
        ],
        "java" => [
            video("Java Full Course for Beginners", "GoXwIVyNvX0"),
            article("Java Programming Basics", "https://www.geeksforgeeks.org/java/"),
        ],
        "cplusplus" => [
            video("C++ Tutorial for Beginners", "vLnPwxZdW4Y"),
            article("C++ Tutorial", "https://www.learncpp.com/"),
        ],
        "php" => [
            video("PHP Full Course for Beginners", "OK_JCtrrv-c"),
            article("PHP Tutorial", "https://www.w3schools.com/php/"),
        ],
        "dart" => [
            video("Dart Programming Full Course", "Ej_Pcr4uC2Q"),
            article("Learn Dart Basics", "https://dart.dev/guides"),
        ],
        _ => {
            if !key.is_empty() && key != BASELINE_LANGUAGE {
                tracing::debug!("No fallback resources for '{}', using {}", key, BASELINE_LANGUAGE);
            }
            [
                video("Python Tutorial for Beginners", "rfscVS0vtbw"),
                article("Python Programming Language - Official Docs", "https://www.python.org/"),
            ]
        }
    };

    pair.into()
}

/// Picks follow-up resources for a learner and writes new ones on request.
#[derive(Clone)]
pub struct RecommendationSelector {
    store: Arc<dyn QuizStore>,
    provider: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl RecommendationSelector {
    pub fn new(
        store: Arc<dyn QuizStore>,
        provider: Arc<dyn TextGenerator>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            provider,
            timeout,
        }
    }

    /// Latest stored batch if it has content, else the language fallback pair.
    pub async fn select(&self, email: &str) -> Result<Vec<Recommendation>, AppError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(AppError::AuthError("Learner identity is required".to_string()));
        }

        if let Some(batch) = self.store.latest_recommendations(&email).await? {
            let parsed = parse_batch(&batch.lines);
            if !parsed.is_empty() {
                return Ok(parsed);
            }
        }

        let preferences = self.store.learner_preferences(&email).await?.unwrap_or_default();
        Ok(fallback_recommendations(preferences.language_preference.as_deref()))
    }

    /// Asks the provider for follow-up resources after a course quiz and stores them.
    pub async fn generate(
        &self,
        email: &str,
        course_title: &str,
        score: i32,
        total: i32,
    ) -> Result<Vec<Recommendation>, GenerationError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(GenerationError::MissingLearner);
        }

        let prompt = format!(
            "A student completed a {course_title} quiz and scored {score}/{total}.\n\
             Recommend 3 helpful follow-up videos or articles for this student.\n\
             Write each recommendation on its own line in this form:\n\
             {VIDEO_MARKER} \"Title\" - https://link for videos, or {ARTICLE_MARKER} \"Title\" - https://link for articles.\n\
             Do not add any other text."
        );
        let raw = generate_within(
            self.provider.as_ref(),
            &GenerationRequest::new(prompt),
            self.timeout,
        )
        .await?;

        let lines: Vec<String> = raw
            .lines()
            .map(|l| l.trim().trim_start_matches(['-', '*', '•']).trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        if lines.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        self.store
            .save_recommendations(&email, course_title.trim(), &lines)
            .await?;
        tracing::info!("Stored {} recommendations for {}", lines.len(), email);

        Ok(parse_batch(&lines))
    }
}

/// Parses stored lines in order, skipping blanks and duplicates.
fn parse_batch(lines: &[String]) -> Vec<Recommendation> {
    let mut seen = HashSet::new();
    lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && seen.insert(*l))
        .take(MAX_STORED_RECOMMENDATIONS)
        .map(parse_recommendation_line)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::learner::LearnerPreferences, store::MemoryStore};

    struct NoProvider;

    #[async_trait::async_trait]
    impl TextGenerator for NoProvider {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
            Err(GenerationError::Unavailable("not configured".to_string()))
        }
    }

    fn selector(store: Arc<MemoryStore>) -> RecommendationSelector {
        RecommendationSelector::new(store, Arc::new(NoProvider), Duration::from_secs(1))
    }

    #[test]
    fn test_parse_video_line() {
        let rec = parse_recommendation_line(
            r#"📺 "Loops in Python" - https://www.youtube.com/watch?v=abc123&t=10s"#,
        );
        assert_eq!(rec.kind, RecommendationKind::Video);
        assert_eq!(rec.title, "Loops in Python");
        assert_eq!(rec.hostname, "youtube.com");
        assert_eq!(rec.thumbnail, "https://img.youtube.com/vi/abc123/hqdefault.jpg");
    }

    #[test]
    fn test_youtube_link_without_marker_is_video() {
        let rec = parse_recommendation_line("Watch https://youtube.com/watch?v=xyz");
        assert_eq!(rec.kind, RecommendationKind::Video);
        assert_eq!(rec.title, "Untitled");
    }

    #[test]
    fn test_parse_article_line() {
        let rec = parse_recommendation_line(
            r#"📰 Article: "For loops" https://www.w3schools.com/python/python_for_loops.asp"#,
        );
        assert_eq!(rec.kind, RecommendationKind::Article);
        assert_eq!(rec.hostname, "w3schools.com");
        assert!(rec.thumbnail.starts_with(
            "https://www.google.com/s2/favicons?sz=128&domain_url=https%3A%2F%2Fwww.w3schools.com"
        ));
    }

    #[test]
    fn test_line_without_link_gets_placeholder() {
        let rec = parse_recommendation_line(r#"Practice "nested loops" daily"#);
        assert_eq!(rec.kind, RecommendationKind::Article);
        assert_eq!(rec.link, None);
        assert_eq!(rec.hostname, "");
        assert_eq!(rec.thumbnail, PLACEHOLDER_THUMBNAIL);
    }

    #[test]
    fn test_fallback_for_javascript() {
        let recs = fallback_recommendations(Some("JavaScript"));
        assert_eq!(recs.len(), 2);
        assert_eq!(recs.iter().filter(|r| r.kind == RecommendationKind::Video).count(), 1);
        assert_eq!(recs.iter().filter(|r| r.kind == RecommendationKind::Article).count(), 1);
        assert!(recs.iter().all(|r| r.title.contains("JavaScript")));
    }

    #[test]
    fn test_fallback_defaults_to_python() {
        let unset = fallback_recommendations(None);
        let unknown = fallback_recommendations(Some("COBOL"));
        assert_eq!(unset, unknown);
        assert!(unset.iter().all(|r| r.title.contains("Python")));
        assert_eq!(fallback_recommendations(Some("c++"))[0].title, "C++ Tutorial for Beginners");
    }

    #[tokio::test]
    async fn test_select_prefers_latest_stored_batch() {
        let store = Arc::new(MemoryStore::new());
        store
            .save_recommendations("ada@example.com", "Python", &["📰 \"Old\" https://old.example.com".to_string()])
            .await
            .unwrap();
        let lines = vec![
            "📺 \"New video\" https://www.youtube.com/watch?v=n1".to_string(),
            "".to_string(),
            "📺 \"New video\" https://www.youtube.com/watch?v=n1".to_string(),
            "📰 \"New article\" https://docs.example.com/a".to_string(),
        ];
        store.save_recommendations("ada@example.com", "Python", &lines).await.unwrap();

        let recs = selector(store).select("ada@example.com").await.unwrap();
        let titles: Vec<&str> = recs.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["New video", "New article"]);
    }

    #[tokio::test]
    async fn test_select_falls_back_to_language() {
        let store = Arc::new(MemoryStore::new());
        store
            .set_preferences(
                "ada@example.com",
                LearnerPreferences {
                    experience_preference: None,
                    language_preference: Some("sql".to_string()),
                },
            )
            .await;

        let recs = selector(store).select("ada@example.com").await.unwrap();
        assert_eq!(recs, fallback_recommendations(Some("SQL")));
    }

    #[tokio::test]
    async fn test_generate_surfaces_provider_outage() {
        let result = selector(Arc::new(MemoryStore::new()))
            .generate("ada@example.com", "Python", 3, 15)
            .await;
        assert!(matches!(result, Err(GenerationError::Unavailable(_))));
    }
}
