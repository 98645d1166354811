use super::*;
use crate::config::ApiSettings;
use serde_json::json;

fn client(base: &str) -> ApiClient {
    ApiClient::new(&ApiSettings {
        base_url: base.to_string(),
        ..ApiSettings::default()
    })
}

#[test]
fn url_joins_without_double_slashes() {
    let c = client("http://guild.test/");
    assert_eq!(c.url("/api/posts/1"), "http://guild.test/api/posts/1");
    assert_eq!(c.url("api/posts/1"), "http://guild.test/api/posts/1");
}

#[test]
fn encode_escapes_path_segments() {
    assert_eq!(encode("abc-123"), "abc-123");
    assert_eq!(encode("a/b c"), "a%2Fb%20c");
}

#[test]
fn parse_post_reads_title_author_and_tracks() {
    let body = json!({
        "id": 12,
        "title": "  On Drafts ",
        "author": {"username": "quill"},
        "spotifyTracks": [{"id": "t1", "name": "One"}, {"id": "t2", "name": "Two"}]
    });
    let post = parse_post("12", &body);
    assert_eq!(post.title, "On Drafts");
    assert_eq!(post.author.as_deref(), Some("quill"));
    assert_eq!(post.tracks.len(), 2);
    assert_eq!(post.tracks[1].id, "t2");
}

#[test]
fn parse_post_falls_back_to_single_track_id() {
    let body = json!({"authorName": "ink", "spotifyTrackId": "abc"});
    let post = parse_post("7", &body);
    assert_eq!(post.title, "Post 7");
    assert_eq!(post.author.as_deref(), Some("ink"));
    assert_eq!(post.tracks.len(), 1);
    assert_eq!(post.tracks[0].id, "abc");
    assert_eq!(post.tracks[0].preview_url, None);
    assert_eq!(post.tracks[0].external_url, "https://open.spotify.com/track/abc");
}

#[test]
fn parse_post_prefers_embedded_track_over_bare_id() {
    let body = json!({
        "title": "t",
        "spotifyTrack": {"id": "abc", "name": "Full", "preview_url": "https://p/abc.mp3"},
        "spotifyTrackId": "abc"
    });
    let post = parse_post("1", &body);
    assert_eq!(post.tracks.len(), 1);
    assert_eq!(post.tracks[0].name, "Full");
    assert_eq!(post.tracks[0].preview_url.as_deref(), Some("https://p/abc.mp3"));
}

#[test]
fn parse_post_tolerates_non_object_bodies() {
    let post = parse_post("3", &json!(null));
    assert_eq!(post.title, "Post 3");
    assert!(post.tracks.is_empty());
}

#[test]
fn search_rejects_blank_queries_without_network() {
    let c = client("http://127.0.0.1:9");
    assert!(matches!(
        c.search_tracks("   "),
        Err(crate::error::GuildError::InvalidInput(_))
    ));
}
