use crate::types::{AppError, Principal, Result};

/// The reserved `:user` path segment for unowned entries.
pub const ANON_SEGMENT: &str = "anon";

/// Who a new entry will belong to, as decided by the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ownership {
    /// Created under the `anon` segment; the entry has no owner.
    Anonymous,
    /// Owned by the given user id.
    Owned(String),
}

impl Ownership {
    /// The owner id to persist, if any.
    pub fn owner_id(self) -> Option<String> {
        match self {
            Ownership::Anonymous => None,
            Ownership::Owned(id) => Some(id),
        }
    }
}

/// Decides whether a principal may create an entry under `:user`.
///
/// The `anon` segment is always permitted and always yields an unowned
/// entry, no matter what identity the request also carried. Any other
/// segment requires a registered principal whose username matches it.
pub fn authorize_create(principal: &Principal, user_segment: &str) -> Result<Ownership> {
    if user_segment == ANON_SEGMENT {
        return Ok(Ownership::Anonymous);
    }
    match principal {
        Principal::Registered { id, username } if username == user_segment => {
            Ok(Ownership::Owned(id.clone()))
        }
        _ => {
            tracing::debug!(user_segment, "entry creation denied");
            Err(AppError::Auth("Unauthorized".to_string()))
        }
    }
}

/// Decides whether a principal may update or delete entries under `:user`.
///
/// Requires a registered principal whose username matches the segment and
/// returns its id so persistence can stay scoped to the caller's own
/// entries. Anonymous principals are never permitted, which leaves entries
/// created under `anon` immutable and undeletable through this API.
pub fn authorize_mutation(principal: &Principal, user_segment: &str) -> Result<String> {
    match principal {
        Principal::Registered { id, username }
            if username == user_segment && user_segment != ANON_SEGMENT =>
        {
            Ok(id.clone())
        }
        _ => {
            tracing::debug!(user_segment, "entry mutation denied");
            Err(AppError::Auth("Unauthorized".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn alice() -> Principal {
        Principal::Registered {
            id: "u-alice".to_string(),
            username: "alice".to_string(),
        }
    }

    #[rstest]
    #[case::anon_segment_without_identity(Principal::Anonymous, "anon", Some(Ownership::Anonymous))]
    #[case::anon_segment_ignores_identity(alice(), "anon", Some(Ownership::Anonymous))]
    #[case::matching_owner(alice(), "alice", Some(Ownership::Owned("u-alice".to_string())))]
    #[case::mismatched_owner(alice(), "bob", None)]
    #[case::anonymous_under_named_user(Principal::Anonymous, "alice", None)]
    fn create_decisions(
        #[case] principal: Principal,
        #[case] segment: &str,
        #[case] expected: Option<Ownership>,
    ) {
        match expected {
            Some(ownership) => {
                assert_eq!(authorize_create(&principal, segment).unwrap(), ownership)
            }
            None => assert!(matches!(
                authorize_create(&principal, segment),
                Err(AppError::Auth(_))
            )),
        }
    }

    #[rstest]
    #[case::matching_owner(alice(), "alice", Some("u-alice"))]
    #[case::mismatched_owner(alice(), "bob", None)]
    #[case::anonymous_never_mutates(Principal::Anonymous, "alice", None)]
    #[case::anon_entries_are_immutable(Principal::Anonymous, "anon", None)]
    #[case::registered_cannot_claim_anon(alice(), "anon", None)]
    fn mutation_decisions(
        #[case] principal: Principal,
        #[case] segment: &str,
        #[case] expected: Option<&str>,
    ) {
        match expected {
            Some(owner) => assert_eq!(authorize_mutation(&principal, segment).unwrap(), owner),
            None => assert!(matches!(
                authorize_mutation(&principal, segment),
                Err(AppError::Auth(_))
            )),
        }
    }

    #[test]
    fn ownership_owner_id() {
        assert_eq!(Ownership::Anonymous.owner_id(), None);
        assert_eq!(
            Ownership::Owned("u-1".to_string()).owner_id(),
            Some("u-1".to_string())
        );
    }
}
