//! Access-token encoding/validation and refresh-secret generation.

pub mod claims;
pub mod codec;
pub mod refresh;

pub use claims::AccessClaims;
pub use codec::{IssuedAccessToken, TokenCodec};
pub use refresh::{IssuedRefreshSecret, RefreshTokenGenerator};
