pub mod firebase;
pub mod firestore;
pub mod identity_toolkit;
pub mod session_api;

pub use firebase::FirebaseClient;
pub use firestore::FirestoreLiveQuery;
pub use identity_toolkit::IdentityToolkitAdapter;
pub use session_api::HttpSessionApi;
