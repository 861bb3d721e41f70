pub mod article;
pub mod backend_user;
pub mod column;
pub mod menu;
pub mod menu_tree;
pub mod mp_user;
pub mod permission;
pub mod role;
pub mod status;
pub mod upload;
pub mod wechat;

pub use article::*;
pub use backend_user::*;
pub use column::*;
pub use menu::*;
pub use menu_tree::*;
pub use mp_user::*;
pub use permission::*;
pub use role::*;
pub use status::*;
pub use upload::*;
pub use wechat::*;

/// Wall-clock UTC timestamp as stored in the naive timestamp columns.
pub(crate) fn now() -> chrono::NaiveDateTime {
    chrono::Utc::now().naive_utc()
}
