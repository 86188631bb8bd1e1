use crate::server::response::ApiError;
use crate::types::CrewMemberPayload;

const MAX_NAME_LEN: usize = 100;
const MAX_SKILLS: usize = 50;
const MAX_NOTES_LEN: usize = 2000;

/// Request-size limits plus the record invariants.
pub fn validate_payload(payload: &CrewMemberPayload) -> Result<(), ApiError> {
    if payload.name.trim().chars().count() > MAX_NAME_LEN {
        return Err(ApiError::bad_request(format!(
            "name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    if payload.attributes.skills.len() > MAX_SKILLS {
        return Err(ApiError::bad_request(format!(
            "cannot have more than {MAX_SKILLS} skills"
        )));
    }
    if payload
        .attributes
        .notes
        .as_ref()
        .is_some_and(|n| n.chars().count() > MAX_NOTES_LEN)
    {
        return Err(ApiError::bad_request(format!(
            "notes cannot exceed {MAX_NOTES_LEN} characters"
        )));
    }
    payload
        .validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))
}
