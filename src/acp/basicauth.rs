//! Basic authentication config

use crate::models::hub;

/// Runtime configuration of the basic auth handler
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub users: Vec<String>,
    pub realm: String,
    pub strip_authorization_header: bool,
    pub forward_username_header: String,
}

impl From<&hub::AccessControlPolicyBasicAuth> for Config {
    fn from(basic: &hub::AccessControlPolicyBasicAuth) -> Self {
        Self {
            users: split_users(&basic.users),
            realm: basic.realm.clone(),
            strip_authorization_header: basic.strip_authorization_header,
            forward_username_header: basic.forward_username_header.clone(),
        }
    }
}

/// Split a comma separated user list, dropping blank entries
pub(crate) fn split_users(users: &str) -> Vec<String> {
    users
        .split(',')
        .map(str::trim)
        .filter(|user| !user.is_empty())
        .map(str::to_string)
        .collect()
}
