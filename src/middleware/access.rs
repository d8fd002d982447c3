//! Правила доступа: роль вызывающего x тип действия.

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Anonymous,
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    /// Изменение каталога: фильмы, залы, сеансы
    Write,
}

/// anonymous -> 401 на всё, user -> только чтение, admin -> всё.
pub fn authorize(role: Role, action: Action) -> Result<(), ApiError> {
    match (role, action) {
        (Role::Anonymous, _) => Err(ApiError::Unauthorized),
        (Role::User, Action::Write) => Err(ApiError::Forbidden(
            "You do not have permission to perform this action".to_string(),
        )),
        (Role::User, Action::Read) | (Role::Admin, _) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_is_unauthorized_for_everything() {
        assert!(matches!(authorize(Role::Anonymous, Action::Read), Err(ApiError::Unauthorized)));
        assert!(matches!(authorize(Role::Anonymous, Action::Write), Err(ApiError::Unauthorized)));
    }

    #[test]
    fn regular_user_reads_but_cannot_write() {
        assert!(authorize(Role::User, Action::Read).is_ok());
        assert!(matches!(authorize(Role::User, Action::Write), Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn admin_is_allowed_everything() {
        assert!(authorize(Role::Admin, Action::Read).is_ok());
        assert!(authorize(Role::Admin, Action::Write).is_ok());
    }
}
