pub use super::article::Entity as Article;
pub use super::backend_user::Entity as BackendUser;
pub use super::column::Entity as ContentColumn;
pub use super::menu::Entity as Menu;
pub use super::mp_user::Entity as MpUser;
pub use super::role::Entity as Role;
pub use super::role_menu::Entity as RoleMenu;
