use secrecy::SecretString;

/// Basic-auth credentials for a Device42 appliance.
///
/// Sent with every request as `Authorization: Basic base64(user:pass)`.
/// Device42 has no login endpoint; the session cookie it hands back is
/// carried forward by the client but never required.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}
