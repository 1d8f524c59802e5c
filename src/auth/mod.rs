// Authentication module
// Password hashing, bearer tokens, the auth gate and the registration/login flow

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use handlers::{login_handler, me_handler, register_handler};
pub use middleware::{authenticate, AuthenticatedUser, RequireRole};
pub use models::{
    AuthResponse, CurrentUserResponse, LoginRequest, NewUser, RegisterRequest, User, UserResponse,
};
pub use password::{PasswordConfig, PasswordService};
pub use repository::{PgUserRepository, UserRepository};
pub use service::AuthService;
pub use token::{Claims, TokenService};
