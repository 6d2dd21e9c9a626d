//! Route paths.

pub const GET_API_HEALTH: &str = "/api/health";
pub const POST_API_OTP_GENERATE: &str = "/api/otp/generate";
pub const POST_API_USERS_CREATE_USER: &str = "/api/users/createUser";
pub const GET_API_USERS_CHECK_EMAIL: &str = "/api/users/checkEmail";
pub const POST_API_USERS_GET_USER_INFO: &str = "/api/users/getUserInfo";
pub const GET_API_USERS_ME: &str = "/api/users/me";
pub const POST_API_SESSIONS_GET_REFRESH_TOKEN: &str = "/api/sessions/getRefreshToken";
pub const POST_API_SESSIONS_LOGIN: &str = "/api/sessions/login";
