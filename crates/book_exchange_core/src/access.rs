//! crates/book_exchange_core/src/access.rs
//!
//! Role and ownership gates applied on top of a resolved `Identity`.

use crate::domain::{Identity, Role};
use crate::ports::{PortError, PortResult};

/// Fails with `Forbidden` unless the identity holds `role`.
pub fn require_role(identity: &Identity, role: Role) -> PortResult<()> {
    if identity.role == role {
        Ok(())
    } else {
        Err(PortError::Forbidden(format!("{} access required", role)))
    }
}

/// Fails with `Forbidden` unless the identity is `owner_id`, whatever its role.
pub fn require_owner(identity: &Identity, owner_id: &str) -> PortResult<()> {
    if identity.user_id == owner_id {
        Ok(())
    } else {
        Err(PortError::Forbidden(
            "you can only modify your own records".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(id: &str, role: Role) -> Identity {
        Identity {
            user_id: id.to_string(),
            role,
        }
    }

    #[test]
    fn role_gate() {
        assert!(require_role(&identity("a", Role::Owner), Role::Owner).is_ok());
        assert!(matches!(
            require_role(&identity("a", Role::Seeker), Role::Owner),
            Err(PortError::Forbidden(_))
        ));
    }

    #[test]
    fn ownership_gate_ignores_role() {
        assert!(require_owner(&identity("a", Role::Seeker), "a").is_ok());
        assert!(matches!(
            require_owner(&identity("b", Role::Owner), "a"),
            Err(PortError::Forbidden(_))
        ));
    }
}
