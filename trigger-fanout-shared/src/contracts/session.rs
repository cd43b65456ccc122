use async_trait::async_trait;

use crate::error::CoreError;
use crate::response::RpcResponse;

/// External session/authorization service. Out of scope to implement: this
/// crate only needs the contract, the same way the original's
/// `External.Auth`/`External.GetSessionUserName` function pointers stood in
/// for a whole separate microservice.
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Validates `session_token` against the required privilege list. The
    /// response is pre-shaped as an `RpcResponse` because a failed auth
    /// check is returned to the caller verbatim, not wrapped further.
    async fn authorize(
        &self,
        session_token: &str,
        privileges: &[&str],
        oem_privileges: &[&str],
    ) -> Result<(), RpcResponse>;

    async fn get_session_user_name(&self, session_token: &str) -> Result<String, CoreError>;
}
