//! The closed set of API entities.
//!
//! Every resource path is derived from [`EntityKind`]; no service builds
//! endpoint strings ad hoc.

/// One TeamSnap entity type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A team.
    Team,
    /// A user account.
    User,
    /// A team member (roster entry).
    Member,
    /// A scheduled event (game, practice, other).
    Event,
    /// A member's availability response for an event.
    Availability,
    /// A task assigned to a member for an event.
    Assignment,
    /// A venue.
    Location,
    /// An opposing team.
    Opponent,
    /// A message-board topic.
    ForumTopic,
    /// A message-board post.
    ForumPost,
    /// A broadcast email sent to the team.
    BroadcastEmail,
    /// A direct message.
    Message,
}

impl EntityKind {
    /// Collection path segment under the API root.
    pub const fn collection(&self) -> &'static str {
        match self {
            EntityKind::Team => "teams",
            EntityKind::User => "users",
            EntityKind::Member => "members",
            EntityKind::Event => "events",
            EntityKind::Availability => "availabilities",
            EntityKind::Assignment => "assignments",
            EntityKind::Location => "locations",
            EntityKind::Opponent => "opponents",
            EntityKind::ForumTopic => "forum_topics",
            EntityKind::ForumPost => "forum_posts",
            EntityKind::BroadcastEmail => "broadcast_emails",
            EntityKind::Message => "messages",
        }
    }

    /// Path of the search endpoint.
    pub fn search_path(&self) -> String {
        format!("{}/search", self.collection())
    }

    /// Path of one item.
    pub fn item_path(&self, id: u64) -> String {
        format!("{}/{id}", self.collection())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_derived_from_collection() {
        assert_eq!(EntityKind::Team.collection(), "teams");
        assert_eq!(EntityKind::Member.search_path(), "members/search");
        assert_eq!(EntityKind::Event.item_path(42), "events/42");
        assert_eq!(EntityKind::ForumTopic.search_path(), "forum_topics/search");
    }
}
