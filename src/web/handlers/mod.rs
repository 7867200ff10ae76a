pub mod analysis_handlers;
pub mod cv_handlers;
pub mod job_description_handlers;
pub mod session_handlers;
pub mod system_handlers;

pub use analysis_handlers::*;
pub use cv_handlers::*;
pub use job_description_handlers::*;
pub use session_handlers::*;
pub use system_handlers::*;
