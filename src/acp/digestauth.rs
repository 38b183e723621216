//! Digest authentication config

use super::basicauth::split_users;
use crate::models::hub;

/// Runtime configuration of the digest auth handler
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Users in htdigest format
    pub users: Vec<String>,
    pub realm: String,
    pub strip_authorization_header: bool,
    pub forward_username_header: String,
}

impl From<&hub::AccessControlPolicyDigestAuth> for Config {
    fn from(digest: &hub::AccessControlPolicyDigestAuth) -> Self {
        Self {
            users: split_users(&digest.users),
            realm: digest.realm.clone(),
            strip_authorization_header: digest.strip_authorization_header,
            forward_username_header: digest.forward_username_header.clone(),
        }
    }
}
