pub mod endpoints {
    pub const AUTH_PREFIX: &str = "/auth/";
    pub const AUTH_REGISTER: &str = "/auth/register";
    pub const AUTH_LOGIN: &str = "/auth/login";
    pub const AUTH_REFRESH: &str = "/auth/refresh";
    pub const AUTH_LOGOUT: &str = "/auth/logout";

    pub const USERS_ME: &str = "/users/me";
    pub const VACANCIES: &str = "/vacancies";
    pub const VACANCY_PROGRESS: &str = "/vacancy-progress";
    pub const EMPLOYERS: &str = "/employers";
}

pub mod storage_keys {
    /// Well-known key of the persisted access token.
    pub const ACCESS_TOKEN: &str = "accessToken";
    /// Well-known key of the persisted refresh token.
    pub const REFRESH_TOKEN: &str = "refreshToken";
}
