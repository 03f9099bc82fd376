use chrono::{DateTime, Utc};

/// Consider the local store stale after 1 hour.
/// The catalog changes rarely, so an hourly refresh hint is plenty.
pub const CACHE_STALE_MINUTES: i64 = 60;

pub fn age_minutes(synced_at: DateTime<Utc>) -> i64 {
    (Utc::now() - synced_at).num_minutes()
}

/// Human-readable age such as "just now", "5m ago", "2h ago", "3d ago".
pub fn age_display(synced_at: DateTime<Utc>) -> String {
    let minutes = age_minutes(synced_at);
    if minutes < 1 {
        // Also covers clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

/// Never-synced counts as stale.
pub fn is_stale(synced_at: Option<DateTime<Utc>>) -> bool {
    match synced_at {
        Some(at) => age_minutes(at) > CACHE_STALE_MINUTES,
        None => true,
    }
}
