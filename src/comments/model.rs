use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A comment as returned by `GET /api/posts/{id}/comments`.
///
/// Every field is decoded leniently: a record with a missing or malformed
/// field still decodes, with the field defaulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// `None` when the record carries no usable id; such a record is never
    /// placed in a tree.
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub parent_id: Option<String>,
    /// Milliseconds since the Unix epoch; 0 when missing.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub likes_count: u64,
    #[serde(default, alias = "isLiked", deserialize_with = "lenient_bool")]
    pub liked: bool,
    #[serde(default, deserialize_with = "lenient_author")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub content: String,
}

/// A comment with its replies attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeComment {
    pub comment: Comment,
    /// Always present; ascending by `created_at`.
    pub replies: Vec<TreeComment>,
}

impl TreeComment {
    pub fn id(&self) -> Option<&str> {
        self.comment.id.as_deref()
    }
}

/// Decode a raw comments response body.
///
/// Anything that is not a JSON array yields an empty list, and array elements
/// that are not objects are skipped.
pub fn parse_comments(body: &Value) -> Vec<Comment> {
    let Some(items) = body.as_array() else {
        if !body.is_null() {
            tracing::warn!("comments payload is not an array; treating as empty");
        }
        return Vec::new();
    };

    items
        .iter()
        .filter(|item| item.is_object())
        .filter_map(|item| match Comment::deserialize(item) {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::debug!("skipping undecodable comment record: {e}");
                None
            }
        })
        .collect()
}

/// Parse a timestamp as sent by the API: RFC 3339, a bare
/// `YYYY-MM-DD HH:MM:SS[.fff]` (read as UTC), or integer milliseconds.
pub fn parse_timestamp_ms(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return dt.timestamp_millis();
            }
            for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
                if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                    return naive.and_utc().timestamp_millis();
                }
            }
            s.parse::<i64>().unwrap_or(0)
        }
        _ => 0,
    }
}

fn lenient_id<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_timestamp<'de, D>(d: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.as_ref().map(parse_timestamp_ms).unwrap_or(0))
}

fn lenient_count<'de, D>(d: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    })
}

fn lenient_bool<'de, D>(d: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(matches!(v, Some(Value::Bool(true))))
}

fn lenient_author<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::String(s)) => Some(s),
        Some(Value::Object(map)) => ["displayName", "name", "username"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    })
}

fn lenient_text<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}
