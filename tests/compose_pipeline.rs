// tests/compose_pipeline.rs
// Composer invariants driven through a scripted mock generator: body
// safety, length budget, line counts, sensitive-mode override, fallbacks.

use std::sync::Arc;

use hinglish_news_bot::compose::sanitize::emoji_count;
use hinglish_news_bot::compose::templates::Mode;
use hinglish_news_bot::compose::{Composer, ComposerSettings, EMPTY_TOPIC_PLACEHOLDER};
use hinglish_news_bot::llm::{DisabledGenerator, MockGenerator, TextGenerator};

fn composer(generator: Arc<dyn TextGenerator>) -> Composer {
    Composer::new(generator, ComposerSettings::default())
}

/// Split a final post into (body lines, trailing zone lines). The trailing
/// zone is the link line and/or hashtag line at the end.
fn split_zones(text: &str) -> (Vec<&str>, Vec<&str>) {
    let lines: Vec<&str> = text.lines().collect();
    let body_end = lines
        .iter()
        .position(|l| l.starts_with('#') || l.starts_with("🔗"))
        .unwrap_or(lines.len());
    (lines[..body_end].to_vec(), lines[body_end..].to_vec())
}

#[tokio::test]
async fn end_to_end_scenario_with_link_and_hashtags() {
    let generator = Arc::new(MockGenerator::scripted([
        // translation of the topic
        "लोकल ट्रेन में भीड़ और bullet train का ऐलान",
        // generated body, deliberately dirty: hashtag, mention, link, emoji
        "लोकल ट्रेन में भीड़ 200% बढ़ी #trains\n\
         सरकार bullet train ला रही है, जनता लटक रही है 😭 @railmin\n\
         रोज़ 80 लाख लोग धक्के खा रहे हैं https://rail.example\n\
         पहले लोकल सुधारो फिर bullet चलाना!",
        // translation of the hashtag source
        "लोकल ट्रेन भीड़ bullet train का ऐलान",
    ]));
    let composer = composer(generator);

    let topic = "local train overcrowding despite new high-speed rail announcement";
    let post = composer
        .compose(topic, Some("https://news.example/rail"), None, Some(topic))
        .await;

    assert!(!post.sensitive);
    assert_eq!(post.mode, Mode::Upbeat);
    assert!(post.text.chars().count() <= 280, "over budget: {}", post.text);

    let (body, trailing) = split_zones(&post.text);
    assert!(
        (3..=4).contains(&body.len()),
        "body should keep 3-4 lines, got {}: {:?}",
        body.len(),
        body
    );
    for line in &body {
        assert!(!line.contains('#'), "hashtag left in body line: {line}");
        assert!(!line.contains('@'), "mention left in body line: {line}");
        assert!(!line.contains("http"), "link left in body line: {line}");
    }
    assert!(emoji_count(&body.join("\n")) <= 2);
    assert!(body[0].starts_with('"'), "body must open with a quote");

    assert!(
        trailing.iter().any(|l| l.starts_with("🔗 https://news.example/rail")),
        "link line missing: {trailing:?}"
    );
    assert!(
        trailing.iter().any(|l| l.starts_with('#')),
        "expected at least one hashtag line: {trailing:?}"
    );
}

#[tokio::test]
async fn sensitive_topic_forces_cautious_and_suppresses_hashtags() {
    let generator = Arc::new(MockGenerator::fixed(
        "रेल हादसे की जांच शुरू हुई\n\
         रेलवे बोले सब ठीक है, ज़मीन पर जवाब नहीं\n\
         किसकी जिम्मेदारी तय होगी?\n\
         जनता जवाब मांगती है",
    ));
    let composer = composer(generator);

    // Already ≥80% Devanagari, so no translation call happens.
    let topic = "रेल हादसा में कई लोग मारे गए";
    let post = composer.compose(topic, None, None, Some(topic)).await;

    assert!(post.sensitive);
    assert_eq!(post.mode, Mode::Cautious, "upbeat must be overridden");
    assert!(
        !post.text.contains('#'),
        "hashtags must be suppressed for sensitive topics: {}",
        post.text
    );
}

#[tokio::test]
async fn safety_flag_picks_neutral_when_critique_is_disallowed() {
    let generator = Arc::new(MockGenerator::fixed(
        "पहली बात\nदूसरी बात\nतीसरी बात",
    ));
    let composer = Composer::new(
        generator,
        ComposerSettings {
            critique_authorities: false,
            ..Default::default()
        },
    );

    let post = composer
        .compose("रेल हादसा में कई लोग मारे गए", None, None, None)
        .await;
    assert_eq!(post.mode, Mode::Neutral);
}

#[tokio::test]
async fn explicit_mode_request_passes_through() {
    let generator = Arc::new(MockGenerator::fixed("एक\nदो\nतीन"));
    let composer = composer(generator);

    let post = composer
        .compose("मानसून अपडेट आया", None, Some(Mode::Neutral), None)
        .await;
    assert_eq!(post.mode, Mode::Neutral);
    assert!(!post.sensitive);
}

#[tokio::test]
async fn generator_failure_falls_back_to_quoted_core() {
    let composer = composer(Arc::new(DisabledGenerator));

    let topic = "government announces new scheme";
    let post = composer.compose(topic, None, None, None).await;

    // Fallback single-line path: the raw topic, quoted.
    assert_eq!(post.text, format!("\"{topic}\""));
    assert_eq!(post.text.lines().count(), 1);
}

#[tokio::test]
async fn empty_topic_short_circuits_to_placeholder() {
    let composer = composer(Arc::new(DisabledGenerator));
    let post = composer.compose("   ", None, None, None).await;
    assert_eq!(post.text, EMPTY_TOPIC_PLACEHOLDER);
}

#[tokio::test]
async fn oversized_generation_is_clipped_to_budget() {
    let word = "अतिमहत्वाकांक्षी";
    let line = vec![word; 12].join(" ");
    let body = vec![line.clone(), line.clone(), line.clone(), line].join("\n");
    let composer = composer(Arc::new(MockGenerator::fixed(body)));

    let post = composer.compose("सरकारी घोषणा पर बहस", None, None, None).await;
    assert!(
        post.text.chars().count() <= 280,
        "budget exceeded: {} chars",
        post.text.chars().count()
    );
}

#[tokio::test]
async fn profanity_in_generated_body_is_masked() {
    let composer = composer(Arc::new(MockGenerator::fixed(
        "ये सिस्टम हरामी निकला\nजनता परेशान है\nकोई जवाब नहीं",
    )));

    let post = composer.compose("सरकारी दफ्तर की हालत", None, None, None).await;
    assert!(!post.text.contains("हरामी"), "slur must be masked: {}", post.text);
    assert!(post.text.contains("〔हटाया गया〕"));
}
