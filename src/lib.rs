mod analysis;
mod clock;
mod error;
mod exporter;
mod model;
mod resolver;
mod session;

pub use analysis::*;
pub use clock::*;
pub use error::*;
pub use exporter::*;
pub use model::config::*;
pub use model::pitch::*;
pub use model::settings::*;
pub use model::song::*;
pub use resolver::*;
pub use session::*;
