//! Typed per-entity operations for the async client.

mod assignments;
mod availabilities;
mod events;
mod locations;
mod members;
mod messaging;
mod opponents;
mod teams;
mod users;

pub use assignments::{AssignmentSearchParams, AssignmentsService, CreateAssignmentRequest, UpdateAssignmentRequest};
pub use availabilities::{AvailabilitiesService, AvailabilitySearchParams, AvailabilityStatus};
pub use events::{CreateEventRequest, EventSearchParams, EventsService, UpdateEventRequest};
pub use locations::{CreateLocationRequest, LocationSearchParams, LocationsService, UpdateLocationRequest};
pub use members::{CreateMemberRequest, MemberSearchParams, MembersService, UpdateMemberRequest};
pub use messaging::{
    BroadcastEmailSearchParams, ForumPostSearchParams, ForumTopicSearchParams,
    MessageSearchParams, MessagingService,
};
pub use opponents::{OpponentSearchParams, OpponentsService};
pub use teams::{TeamSearchParams, TeamsService};
pub use users::UsersService;

use crate::envelope::{decode_collection, Envelope, Record};
use crate::errors::{EnvelopeError, TeamSnapResult};

/// Decodes the single item a get/create/update response must carry.
pub(crate) fn single_record(envelope: &Envelope) -> TeamSnapResult<Record> {
    let mut records = decode_collection(envelope)?;
    if records.is_empty() {
        return Err(EnvelopeError::MissingItem.into());
    }
    Ok(records.remove(0))
}
