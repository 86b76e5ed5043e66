mod common;

use std::sync::Arc;

use common::{artist, artists, tag, track, user, Reply, ScriptedClient};
use lastfm_suggest_core::{
    fetcher::CategoryOutcome, Category, IconRef, SuggestionAggregator, SuggestionCandidate,
};

fn aggregator(client: ScriptedClient) -> (SuggestionAggregator, Arc<ScriptedClient>) {
    let client = Arc::new(client);
    (SuggestionAggregator::builder(client.clone()).build(), client)
}

fn ids(candidates: &[SuggestionCandidate]) -> Vec<u64> {
    candidates.iter().map(|c| c.id).collect()
}

#[tokio::test]
async fn degenerate_queries_are_absent_and_do_no_work() {
    let (aggregator, client) = aggregator(ScriptedClient::default());
    assert!(aggregator.aggregate(None).await.is_none());
    assert!(aggregator.aggregate(Some("")).await.is_none());
    assert!(aggregator.aggregate(Some("  ")).await.is_none());
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn no_hits_is_present_but_empty() {
    let (aggregator, client) = aggregator(ScriptedClient::default());
    let result = aggregator.aggregate(Some("zzzz")).await;
    assert_eq!(result, Some(Vec::new()));
    assert_eq!(client.calls(), 4);
}

#[tokio::test]
async fn twelve_artists_cap_at_ten_with_sequential_ids() {
    let (aggregator, _) = aggregator(ScriptedClient {
        artists: Reply::ok(artists(12)),
        tracks: Reply::fail(),
        tags: Reply::fail(),
        user: Reply::fail(),
        ..ScriptedClient::default()
    });

    let result = aggregator.aggregate(Some("artist")).await.expect("present");
    assert_eq!(result.len(), 10);
    assert_eq!(ids(&result), (0..10).collect::<Vec<u64>>());
    assert!(result.iter().all(|c| c.category == Category::Artist));
    assert_eq!(result[0].primary_text, "Artist 0");
    assert_eq!(result[9].primary_text, "Artist 9");
}

#[tokio::test]
async fn metallica_scenario() {
    let (aggregator, _) = aggregator(ScriptedClient {
        artists: Reply::ok(vec![artist("Metallica")]),
        user: Reply::ok(Some(user("metallica"))),
        ..ScriptedClient::default()
    });

    let result = aggregator
        .aggregate(Some("metallica"))
        .await
        .expect("present");
    assert_eq!(result.len(), 2);

    assert_eq!(result[0].id, 0);
    assert_eq!(result[0].category, Category::Artist);
    assert_eq!(result[0].primary_text, "Metallica");
    assert_eq!(result[0].secondary_text, "View info");
    assert_eq!(
        result[0].action_target.as_str(),
        "http://last.fm/music/Metallica"
    );

    assert_eq!(result[1].id, 1);
    assert_eq!(result[1].category, Category::User);
    assert_eq!(result[1].primary_text, "metallica");
    assert_eq!(result[1].secondary_text, "View profile");
    assert_eq!(result[1].action_target.as_str(), "http://last.fm/user/metallica");
}

#[tokio::test]
async fn categories_merge_in_rank_order_with_remote_order_inside() {
    let (aggregator, _) = aggregator(ScriptedClient {
        artists: Reply::ok(vec![artist("Bob Dylan"), artist("Bob Marley")]),
        tracks: Reply::ok(vec![
            track("Bob Marley", "Jamming"),
            track("Bob Seger", "Turn the Page"),
        ]),
        tags: Reply::ok(vec![tag("bob", 150), tag("bobby", 12)]),
        user: Reply::ok(Some(user("Bob"))),
        ..ScriptedClient::default()
    });

    let result = aggregator.aggregate(Some("Bob")).await.expect("present");
    let order: Vec<(Category, &str)> = result
        .iter()
        .map(|c| (c.category, c.primary_text.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            (Category::Artist, "Bob Dylan"),
            (Category::Artist, "Bob Marley"),
            (Category::Track, "Bob Marley - Jamming"),
            (Category::Track, "Bob Seger - Turn the Page"),
            (Category::Tag, "bob Tag Radio"),
            (Category::User, "bob"),
        ]
    );
    assert_eq!(ids(&result), vec![0, 1, 2, 3, 4, 5]);

    let tag_item = &result[4];
    assert_eq!(tag_item.action_target.as_str(), "app://globaltags/bob");
    assert_eq!(tag_item.icon(), Some(IconRef::Radio));
    assert_eq!(tag_item.image_url(), None);
    assert_eq!(result[2].image_url(), Some("http://img/Jamming.png"));
    assert_eq!(result[2].icon(), None);
}

#[tokio::test]
async fn partial_username_does_not_match() {
    let (aggregator, _) = aggregator(ScriptedClient {
        user: Reply::ok(Some(user("bob"))),
        ..ScriptedClient::default()
    });
    let result = aggregator.aggregate(Some("Bo")).await.expect("present");
    assert!(result.is_empty());
}

#[tokio::test]
async fn low_count_tags_never_appear() {
    let (aggregator, _) = aggregator(ScriptedClient {
        tags: Reply::ok(vec![tag("a", 100), tag("b", 0), tag("c", 101)]),
        ..ScriptedClient::default()
    });
    let result = aggregator.aggregate(Some("x")).await.expect("present");
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].action_target.as_str(), "app://globaltags/c");
}

#[tokio::test]
async fn one_failing_category_leaves_the_others_intact() {
    let (aggregator, _) = aggregator(ScriptedClient {
        artists: Reply::ok(vec![artist("Low")]),
        tracks: Reply::fail(),
        tags: Reply::ok(vec![tag("low", 500)]),
        user: Reply::ok(Some(user("low"))),
        ..ScriptedClient::default()
    });

    let report = aggregator
        .aggregate_report(Some("low"))
        .await
        .expect("present");
    let categories: Vec<Category> = report.candidates.iter().map(|c| c.category).collect();
    assert_eq!(
        categories,
        vec![Category::Artist, Category::Tag, Category::User]
    );
    assert_eq!(ids(&report.candidates), vec![0, 1, 2]);
    assert!(matches!(
        report.categories[1].outcome,
        CategoryOutcome::Failed(_)
    ));
    assert_eq!(report.categories[0].outcome, CategoryOutcome::Completed);
}

#[tokio::test]
async fn every_category_failing_is_an_empty_result() {
    let (aggregator, _) = aggregator(ScriptedClient {
        artists: Reply::fail(),
        tracks: Reply::fail(),
        tags: Reply::fail(),
        user: Reply::fail(),
        ..ScriptedClient::default()
    });
    assert_eq!(aggregator.aggregate(Some("x")).await, Some(Vec::new()));
}
