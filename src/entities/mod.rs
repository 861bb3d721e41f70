//! `SeaORM` entities

pub mod prelude;

pub mod article;
pub mod backend_user;
pub mod column;
pub mod menu;
pub mod mp_user;
pub mod role;
pub mod role_menu;
