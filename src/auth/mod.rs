mod session;
mod store;
mod token;

pub use self::session::{Session, SessionError, SessionState};
pub use self::store::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, StoreError, TOKEN_KEY,
};
pub use self::token::{decode_token, Identity, InvalidToken, TokenStatus};
