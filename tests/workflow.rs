//! End-to-end flow through the library: settings, cache refresh and the
//! Alfred XML produced for a tag query.

use chrono::{DateTime, Duration, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs;

use pinboard_tags::alfred::Workflow;
use pinboard_tags::commands::tags::{build_feedback, TagQuery};
use pinboard_tags::config::{Config, KEY_MAX_RESULTS};
use pinboard_tags::pinboard::api::parse_posts;
use pinboard_tags::pinboard::cache::refresh;
use pinboard_tags::pinboard::{BookmarkSource, PinboardResult, Post, RefreshOutcome, RefreshPolicy};

const POSTS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<posts user="alice">
  <post href="https://doc.rust-lang.org/book/" time="2024-01-01T00:00:00Z" description="The Book" extended="" tag="rust book" hash="h1" meta="m1" shared="yes" toread="no" />
  <post href="https://docs.rs/" time="2024-02-01T00:00:00Z" description="Docs.rs" extended="" tag="rust reference" hash="h2" meta="m2" shared="yes" toread="no" />
  <post href="https://www.alfredapp.com/" time="2024-03-01T00:00:00Z" description="Alfred" extended="" tag="mac productivity" hash="h3" meta="m3" shared="no" toread="yes" />
</posts>"#;

struct StaticSource;

impl BookmarkSource for StaticSource {
    fn last_update(&self) -> PinboardResult<String> {
        Ok("2024-03-01T00:00:00Z".to_string())
    }

    fn all_posts(&self) -> PinboardResult<Vec<Post>> {
        parse_posts(POSTS_XML)
    }
}

fn workflow(root: &std::path::Path) -> Workflow {
    Workflow::with_dirs(
        "com.example.pinboard-tags".to_string(),
        root.to_path_buf(),
        root.join("cache"),
        root.join("data"),
    )
    .unwrap()
}

fn item_titles(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut in_title = false;
    let mut titles = Vec::new();
    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) if e.name().as_ref() == b"title" => in_title = true,
            Event::Text(t) if in_title => titles.push(t.unescape().unwrap().into_owned()),
            Event::End(e) if e.name().as_ref() == b"title" => in_title = false,
            Event::Eof => break,
            _ => {}
        }
    }
    titles
}

#[test]
fn test_tag_suggestions_from_refreshed_cache() {
    let root = tempfile::tempdir().unwrap();
    let workflow = workflow(root.path());

    let mut settings = workflow.settings().unwrap();
    settings.set(KEY_MAX_RESULTS, "2").unwrap();
    let config = Config::resolve(&settings, None).unwrap();

    let policy = RefreshPolicy {
        max_age: config.max_age,
        force: false,
    };
    let now: DateTime<Utc> = Utc::now();
    let (cache, outcome) = refresh(&workflow.cache_path(), &StaticSource, policy, now).unwrap();
    assert_eq!(outcome, RefreshOutcome::Fetched { changed: true });
    assert_eq!(cache.tag_count("rust"), Some(2));

    let feedback = build_feedback(&cache.tags, &TagQuery::parse("book r"), config.max_results);
    let xml = feedback.to_xml().unwrap();

    assert!(xml.starts_with(r#"<?xml version="1.0"?>"#));
    assert_eq!(item_titles(&xml), vec!["book r", "rust", "reference"]);
    assert!(xml.contains(r#"autocomplete="book rust ""#));

    // A second run within max_age is served from disk
    let (_, outcome) = refresh(
        &workflow.cache_path(),
        &StaticSource,
        policy,
        now + Duration::minutes(1),
    )
    .unwrap();
    assert_eq!(outcome, RefreshOutcome::Fresh);
}

#[test]
fn test_cache_and_settings_live_in_separate_directories() {
    let root = tempfile::tempdir().unwrap();
    let workflow = workflow(root.path());

    workflow.settings().unwrap();
    let policy = RefreshPolicy {
        max_age: Duration::minutes(60),
        force: false,
    };
    refresh(&workflow.cache_path(), &StaticSource, policy, Utc::now()).unwrap();

    let cache_files: Vec<_> = fs::read_dir(root.path().join("cache"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    let data_files: Vec<_> = fs::read_dir(root.path().join("data"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();

    assert_eq!(cache_files, vec!["tags_cache.json"]);
    assert_eq!(data_files, vec!["settings.plist"]);
}
