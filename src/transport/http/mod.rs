pub mod router;
pub mod types;
pub mod handlers {
    pub mod health;
    pub mod profiles;
    pub mod users;
    pub mod waves;
}

pub use router::{create_router, ApiDoc};
pub use types::AppState;
