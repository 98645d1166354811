use std::sync::mpsc::Sender;

use tracing::{info, warn};

use crate::api::{ApiClient, Post};
use crate::app::App;
use crate::config;
use crate::preview::Notice;

use super::workers::{self, UiEvent};

/// Fetch the post and start loading its comments.
///
/// A post that cannot be fetched still opens with a placeholder title and no
/// tracks, so comments can load independently.
pub fn open_post(
    client: &ApiClient,
    post_id: &str,
    settings: &config::Settings,
    events_tx: &Sender<UiEvent>,
) -> App {
    let post = match client.fetch_post(post_id) {
        Ok(post) => {
            info!("opened post {} with {} track(s)", post.id, post.tracks.len());
            Ok(post)
        }
        Err(e) => {
            warn!("fetching post {post_id} failed: {e}");
            Err(Notice::LoadFailed {
                what: format!("post {post_id}"),
                reason: e.to_string(),
            })
        }
    };

    let mut app = match post {
        Ok(post) => App::new(post, settings.comments.default_sort),
        Err(notice) => {
            let placeholder = Post {
                id: post_id.to_string(),
                title: format!("Post {post_id}"),
                ..Post::default()
            };
            let mut app = App::new(placeholder, settings.comments.default_sort);
            app.push_notice(notice.to_string());
            app
        }
    };

    let seq = app.begin_comments_load();
    workers::fetch_comments(client, post_id, seq, events_tx);
    app
}
