mod decision;
mod equipment;
mod equipment_status;
mod equipment_type;
mod measurement;
mod parameter_kind;
mod parameter_status;
mod room;
mod sensor;

pub use decision::*;
pub use equipment::*;
pub use equipment_status::*;
pub use equipment_type::*;
pub use measurement::*;
pub use parameter_kind::*;
pub use parameter_status::*;
pub use room::*;
pub use sensor::*;
