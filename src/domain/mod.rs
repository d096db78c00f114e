pub mod interaction;
pub mod operation;
pub mod ports;
pub mod redirect;
pub mod registration;
pub mod session;
pub mod smart_switch;
