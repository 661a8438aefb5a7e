//! Background tasks. Each runs on the local task set and shares the app
//! through [`crate::app::SharedApp`].

pub mod heartbeat;
pub mod ticker;
