//! Access control rules binding a verified credential to exactly one tenant.
//!
//! Two independent rules, both pure functions over current state:
//!
//! 1. **User <-> Client membership**: a user may act on a client only while
//!    a `client_members` row links them. Callers fetch the membership set
//!    fresh on every request; the decision is never cached, so a
//!    revocation takes effect on the very next request.
//! 2. **API key <-> Client binding**: a key may only be used inside the URL
//!    namespace of the client that owns it. A syntactically valid, active,
//!    unexpired key presented against another client's namespace is a 403,
//!    not a 401: the credential is real, the tenant is wrong.

use uuid::Uuid;

use crate::error::AppError;

/// Whether `user_id` is currently a member of the client whose membership
/// set is `member_user_ids`.
pub fn is_client_member(member_user_ids: &[Uuid], user_id: Uuid) -> bool {
    member_user_ids.contains(&user_id)
}

/// Enforce rule 1. `Forbidden` when the user is not a current member.
pub fn ensure_client_member(member_user_ids: &[Uuid], user_id: Uuid) -> Result<(), AppError> {
    if !is_client_member(member_user_ids, user_id) {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Enforce rule 2. The owning client's name must equal the requested path
/// segment exactly; comparison is case-sensitive because client names are.
pub fn ensure_key_client_binding(
    owning_client_name: &str,
    requested_client_name: &str,
) -> Result<(), AppError> {
    if owning_client_name != requested_client_name {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_is_allowed() {
        let user = Uuid::new_v4();
        let members = vec![Uuid::new_v4(), user, Uuid::new_v4()];
        assert!(ensure_client_member(&members, user).is_ok());
    }

    #[test]
    fn non_member_is_forbidden() {
        let members = vec![Uuid::new_v4()];
        assert!(matches!(
            ensure_client_member(&members, Uuid::new_v4()),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn revocation_takes_effect_on_next_check() {
        let user = Uuid::new_v4();
        let mut members = vec![user];
        assert!(ensure_client_member(&members, user).is_ok());

        // Membership removed between two sequential requests: the second
        // check sees current state and denies.
        members.retain(|id| *id != user);
        assert!(matches!(
            ensure_client_member(&members, user),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn key_bound_to_its_own_client_is_allowed() {
        assert!(ensure_key_client_binding("acme", "acme").is_ok());
    }

    #[test]
    fn key_against_other_client_is_forbidden() {
        assert!(matches!(
            ensure_key_client_binding("acme", "other"),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn binding_is_case_sensitive() {
        assert!(matches!(
            ensure_key_client_binding("acme", "Acme"),
            Err(AppError::Forbidden)
        ));
    }
}
