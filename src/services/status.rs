use crate::error::{AppError, AppResult};

/// Enabled/disabled flag stored as 0/1 on roles, menus and accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Disabled = 0,
    Enabled = 1,
}

impl Status {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Status::Disabled),
            1 => Some(Status::Enabled),
            _ => None,
        }
    }

    pub fn parse(value: i32) -> AppResult<Self> {
        Self::from_i32(value).ok_or_else(|| AppError::bad_input("status must be 0 or 1"))
    }
}

/// Menu node kind: navigable page or action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuKind {
    #[default]
    Page = 1,
    Action = 2,
}

impl MenuKind {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn parse(value: i32) -> AppResult<Self> {
        match value {
            1 => Ok(MenuKind::Page),
            2 => Ok(MenuKind::Action),
            _ => Err(AppError::bad_input("type must be 1 (page) or 2 (action)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArticleStatus {
    #[default]
    Draft = 0,
    Published = 1,
}

impl ArticleStatus {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn parse(value: i32) -> AppResult<Self> {
        match value {
            0 => Ok(ArticleStatus::Draft),
            1 => Ok(ArticleStatus::Published),
            _ => Err(AppError::bad_input("status must be 0 (draft) or 1 (published)")),
        }
    }
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::bad_input(format!("{field} is required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_accepts_only_zero_and_one() {
        assert_eq!(Status::parse(1).unwrap(), Status::Enabled);
        assert_eq!(Status::parse(0).unwrap(), Status::Disabled);
        assert!(matches!(Status::parse(2), Err(AppError::BadInput(_))));
        assert!(matches!(Status::parse(-1), Err(AppError::BadInput(_))));
    }

    #[test]
    fn menu_kind_defaults_to_page() {
        assert_eq!(MenuKind::default(), MenuKind::Page);
        assert_eq!(MenuKind::parse(2).unwrap().as_i32(), 2);
        assert!(MenuKind::parse(3).is_err());
    }
}
