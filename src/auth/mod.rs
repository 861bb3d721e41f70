pub mod jwt;
pub mod middleware;
pub mod password;
pub mod types;

pub use jwt::*;
pub use middleware::*;
pub use password::*;
pub use types::*;
