use recipe_discovery::config::LocaleConfig;
use recipe_discovery::overlay::TRANSLATING_PLACEHOLDER;
use recipe_discovery::{
    LocalePreferenceService, MemoryStore, MockMode, MockTranslator, TranslationOverlay,
    TranslationPhase,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

fn overlay(mode: MockMode) -> (Arc<MockTranslator>, TranslationOverlay) {
    let translator = Arc::new(MockTranslator::new(mode));
    let overlay = TranslationOverlay::new(translator.clone(), "en");
    (translator, overlay)
}

#[tokio::test]
async fn test_default_language_never_calls_translator() {
    let (translator, overlay) = overlay(MockMode::Suffix);

    let text = overlay.resolve("Boil the pasta", "en");
    let state = text.state();
    assert_eq!(state.phase, TranslationPhase::Resolved);
    assert_eq!(state.display_text(), "Boil the pasta");
    assert_eq!(translator.call_count(), 0);

    // Regional variants of the default language are the default language
    assert_eq!(overlay.translate_once("Boil the pasta", "en-US").await, "Boil the pasta");
    assert_eq!(translator.call_count(), 0);
}

#[tokio::test]
async fn test_translates_into_other_language() {
    let mut mappings = HashMap::new();
    mappings.insert(
        ("Boil the pasta".to_string(), "it".to_string()),
        "Cuocere la pasta".to_string(),
    );
    let (_, overlay) = overlay(MockMode::Mappings(mappings));

    let text = overlay.resolve("Boil the pasta", "it");
    assert!(text.state().is_translating());
    assert_eq!(text.state().display_text(), TRANSLATING_PLACEHOLDER);

    let state = text.resolved().await;
    assert_eq!(state.phase, TranslationPhase::Resolved);
    assert_eq!(state.display_text(), "Cuocere la pasta");
}

#[tokio::test]
async fn test_translator_failure_shows_source_text() {
    let (translator, overlay) = overlay(MockMode::Error("service down".to_string()));

    let state = overlay.resolve("Add salt", "fr").resolved().await;
    assert_eq!(state.phase, TranslationPhase::Resolved);
    assert_eq!(state.display_text(), "Add salt");
    assert_eq!(translator.call_count(), 1);
}

/// Switching language mid-flight: only the latest request may win.
#[tokio::test(start_paused = true)]
async fn test_superseded_translation_is_dropped() {
    let translator = Arc::new(MockTranslator::with_delay(
        MockMode::Suffix,
        Duration::from_millis(300),
    ));
    let overlay = TranslationOverlay::new(translator.clone(), "en");

    let text = overlay.resolve("Stir", "fr");
    sleep(Duration::from_millis(100)).await;
    text.set_language("de");

    let state = text.resolved().await;
    assert_eq!(state.display_text(), "Stir_de");

    // The French result arrives later and is ignored
    sleep(Duration::from_secs(1)).await;
    assert_eq!(text.state().display_text(), "Stir_de");
    assert_eq!(translator.call_count(), 2);
}

#[tokio::test]
async fn test_same_text_and_language_is_not_retranslated() {
    let (translator, overlay) = overlay(MockMode::Suffix);

    let text = overlay.resolve("Serve warm", "es");
    text.resolved().await;
    text.resolve("Serve warm", "es");
    text.resolved().await;
    assert_eq!(translator.call_count(), 1);

    // No cache: a second instance translates on its own
    overlay.resolve("Serve warm", "es").resolved().await;
    assert_eq!(translator.call_count(), 2);
}

#[tokio::test]
async fn test_following_the_selected_language() {
    let (_, overlay) = overlay(MockMode::Suffix);
    let locale = LocalePreferenceService::load(Arc::new(MemoryStore::new()), &LocaleConfig::default());

    let text = overlay.follow("Chop the onions", &locale);
    assert_eq!(text.resolved().await.display_text(), "Chop the onions");

    let mut rx = text.subscribe();
    locale.set_language("ja").unwrap();
    rx.wait_for(|state| state.language_code == "ja" && !state.is_translating())
        .await
        .unwrap();
    assert_eq!(text.state().display_text(), "Chop the onions_ja");

    locale.set_language("en").unwrap();
    rx.wait_for(|state| state.language_code == "en").await.unwrap();
    assert_eq!(text.state().display_text(), "Chop the onions");
}

#[tokio::test]
async fn test_empty_text_is_not_sent() {
    let (translator, overlay) = overlay(MockMode::Suffix);
    let state = overlay.resolve("", "ko").resolved().await;
    assert_eq!(state.display_text(), "");
    assert_eq!(translator.call_count(), 0);
}
