pub mod extract;
pub mod router;
pub mod routes;

pub use router::{DmrState, dmr_router};
