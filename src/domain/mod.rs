//! Domain layer: value types, the splitter state machine and the ports its
//! collaborators implement.

pub mod account;
pub mod call;
pub mod ports;
pub mod splitter;
pub mod transfer;
