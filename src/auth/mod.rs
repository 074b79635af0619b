//! 演示用的令牌认证：模型负责签发与校验，控制器面向调用方

pub mod controller;
pub mod model;

pub use controller::{AuthController, LoginRequest, TokenResponse, UserResponse};
pub use model::AuthModel;
