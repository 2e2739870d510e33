//! Per-user dashboard state.
//!
//! A [`SessionState`] travels in the user's encrypted session cookie. It is
//! never shared between users, so every mutation is a plain `&mut self`
//! method. Defaults are fully deterministic: two fresh states serialise to
//! the same bytes.

use std::collections::{BTreeSet, VecDeque};

use chrono::NaiveDate;
use farm_data::FilterSettings;
use serde::{Deserialize, Serialize};

/// Most notifications kept per session.
pub const MAX_NOTIFICATIONS: usize = 5;

/// Message shown to a first-time visitor.
pub const WELCOME_MESSAGE: &str =
    "Welcome to the Farm-to-Table Ecosystem! Explore local producers and seasonal products.";

/// Message recorded whenever the filter form is submitted.
pub const FILTERS_APPLIED_MESSAGE: &str = "Filters applied";

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// Neutral information.
    Info,
    /// Confirmation of a completed action.
    Success,
}

/// A message shown in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Text.
    pub message: String,
}

impl Notification {
    /// Informational notification.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    /// Success notification.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }
}

/// Where the user is browsing from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    /// Display label.
    pub label: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Default for UserLocation {
    fn default() -> Self {
        Self {
            label: "San Francisco, CA".to_owned(),
            latitude: 37.7749,
            longitude: -122.4194,
        }
    }
}

/// A community event listed on the Community page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityEvent {
    /// Event identifier.
    pub id: u32,
    /// Title.
    pub title: String,
    /// Day of the event.
    pub date: NaiveDate,
    /// Venue.
    pub location: String,
    /// Short description.
    pub description: String,
}

const SEEDED_EVENTS: [(u32, &str, (i32, u32, u32), &str, &str); 4] = [
    (
        1,
        "Spring Farmers Market Opening",
        (2024, 4, 6),
        "Ferry Building Plaza",
        "Meet growers from across the region as the weekly market returns.",
    ),
    (
        2,
        "Regenerative Farming Workshop",
        (2024, 5, 18),
        "Green Valley Farm",
        "A hands-on morning on cover crops, composting and soil health.",
    ),
    (
        3,
        "Harvest Festival",
        (2024, 9, 21),
        "Golden Gate Park",
        "Tastings, cooking demonstrations and a produce swap.",
    ),
    (
        4,
        "Winter Preserving Class",
        (2024, 12, 7),
        "Mission Community Kitchen",
        "Learn to can, pickle and ferment the last of the season.",
    ),
];

/// The community events every new session starts with.
#[must_use]
pub fn seeded_events() -> Vec<CommunityEvent> {
    SEEDED_EVENTS
        .iter()
        .filter_map(|(id, title, (year, month, day), location, description)| {
            Some(CommunityEvent {
                id: *id,
                title: (*title).to_owned(),
                date: NaiveDate::from_ymd_opt(*year, *month, *day)?,
                location: (*location).to_owned(),
                description: (*description).to_owned(),
            })
        })
        .collect()
}

/// Everything the dashboard remembers about one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Current filter controls.
    pub filters: FilterSettings,
    /// Producer picked on the Producers page.
    pub selected_producer: Option<u32>,
    /// Product picked on the Products page.
    pub selected_product: Option<u32>,
    /// Favourite product ids.
    pub favorites: BTreeSet<u32>,
    /// Notifications, newest first.
    pub notifications: VecDeque<Notification>,
    /// User location.
    pub location: UserLocation,
    /// Community events.
    pub events: Vec<CommunityEvent>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            filters: FilterSettings::default(),
            selected_producer: None,
            selected_product: None,
            favorites: BTreeSet::new(),
            notifications: VecDeque::from([Notification::info(WELCOME_MESSAGE)]),
            location: UserLocation::default(),
            events: seeded_events(),
        }
    }
}

impl SessionState {
    /// Returns `existing` untouched, or the default state when there is none.
    ///
    /// # Examples
    /// ```
    /// use dashboard::domain::session::SessionState;
    ///
    /// let fresh = SessionState::initialize(None);
    /// let again = SessionState::initialize(Some(fresh.clone()));
    /// assert_eq!(fresh, again);
    /// ```
    #[must_use]
    pub fn initialize(existing: Option<Self>) -> Self {
        existing.unwrap_or_default()
    }

    /// Restores the default state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Adds a notification, dropping the oldest beyond [`MAX_NOTIFICATIONS`].
    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push_front(notification);
        self.notifications.truncate(MAX_NOTIFICATIONS);
    }

    /// Stores new filter settings and confirms them.
    pub fn apply_filters(&mut self, filters: FilterSettings) {
        self.filters = filters;
        self.notify(Notification::success(FILTERS_APPLIED_MESSAGE));
    }

    /// Flips a product's favourite flag; returns whether it is now a favourite.
    pub fn toggle_favorite(&mut self, product_id: u32) -> bool {
        if self.favorites.remove(&product_id) {
            false
        } else {
            self.favorites.insert(product_id);
            true
        }
    }

    /// Returns `true` when the product is a favourite.
    #[must_use]
    pub fn is_favorite(&self, product_id: u32) -> bool {
        self.favorites.contains(&product_id)
    }
}

#[cfg(test)]
mod tests {
    use farm_data::MaxDistance;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn defaults_match_first_visit() {
        let state = SessionState::initialize(None);
        assert_eq!(state.filters, FilterSettings::default());
        assert_eq!(state.filters.max_distance.miles(), 50);
        assert!(state.selected_producer.is_none());
        assert!(state.selected_product.is_none());
        assert!(state.favorites.is_empty());
        assert_eq!(state.notifications.len(), 1);
        assert_eq!(state.location.label, "San Francisco, CA");
        assert!((state.location.latitude - 37.7749).abs() < f64::EPSILON);
        assert!((state.location.longitude + 122.4194).abs() < f64::EPSILON);
        assert_eq!(state.events.len(), SEEDED_EVENTS.len());
    }

    #[rstest]
    fn initialize_is_idempotent_byte_for_byte() {
        let first = SessionState::initialize(None);
        let second = SessionState::initialize(Some(first.clone()));
        let third = SessionState::initialize(None);
        let encoded = serde_json::to_string(&first).expect("serialise");
        assert_eq!(encoded, serde_json::to_string(&second).expect("serialise"));
        assert_eq!(encoded, serde_json::to_string(&third).expect("serialise"));
    }

    #[rstest]
    fn initialize_keeps_existing_state() {
        let mut existing = SessionState::default();
        existing.toggle_favorite(7);
        existing.selected_producer = Some(3);
        let kept = SessionState::initialize(Some(existing.clone()));
        assert_eq!(kept, existing);
    }

    #[rstest]
    fn notifications_are_bounded_newest_first() {
        let mut state = SessionState::default();
        for n in 0..8 {
            state.notify(Notification::info(format!("note {n}")));
        }
        assert_eq!(state.notifications.len(), MAX_NOTIFICATIONS);
        assert_eq!(
            state.notifications.front().map(|n| n.message.as_str()),
            Some("note 7")
        );
        assert_eq!(
            state.notifications.back().map(|n| n.message.as_str()),
            Some("note 3")
        );
    }

    #[rstest]
    fn applying_filters_records_a_notification() {
        let mut state = SessionState::default();
        let filters = FilterSettings {
            sustainable_only: true,
            in_season_only: false,
            max_distance: MaxDistance::new(20).expect("valid distance"),
        };
        state.apply_filters(filters);
        assert_eq!(state.filters, filters);
        assert_eq!(
            state.notifications.front(),
            Some(&Notification::success(FILTERS_APPLIED_MESSAGE))
        );
    }

    #[rstest]
    fn toggling_twice_restores_favourites() {
        let mut state = SessionState::default();
        assert!(state.toggle_favorite(4));
        assert!(state.is_favorite(4));
        assert!(!state.toggle_favorite(4));
        assert!(!state.is_favorite(4));
    }

    #[rstest]
    fn reset_restores_defaults() {
        let mut state = SessionState::default();
        state.toggle_favorite(1);
        state.selected_product = Some(2);
        state.apply_filters(FilterSettings {
            sustainable_only: true,
            ..FilterSettings::default()
        });
        state.reset();
        assert_eq!(state, SessionState::default());
    }
}
