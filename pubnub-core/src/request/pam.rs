use super::{finish, QueryParams, Scratch, SigningContext};
use crate::error::PubNubError;
use alloc::string::String;

/// `POST /v3/pam/{sk}/grant`. The grant request body (permissions JSON) is
/// sent separately; this only builds the path.
pub fn build_grant_token(
    scratch: &mut Scratch<'_>,
    subscribe_key: &str,
    signing: Option<&SigningContext<'_>>,
) -> Result<(), PubNubError> {
    let mut path = String::new();
    path.push_str("/v3/pam/");
    path.push_str(subscribe_key);
    path.push_str("/grant");
    finish(scratch, &path, QueryParams::new(), signing)
}

/// `DELETE /v3/pam/{sk}/grant/{token}`.
pub fn build_revoke_token(
    scratch: &mut Scratch<'_>,
    subscribe_key: &str,
    token: &str,
    signing: Option<&SigningContext<'_>>,
) -> Result<(), PubNubError> {
    let mut path = String::new();
    path.push_str("/v3/pam/");
    path.push_str(subscribe_key);
    path.push_str("/grant/");
    path.push_str(&crate::percent::encode(token));
    finish(scratch, &path, QueryParams::new(), signing)
}
