mod group;
mod router;

pub use group::GroupRouter;
pub use router::{BoxedHandler, RouteBuilder, Router};
