//! Domain events and push-channel change notices

mod change;
mod domain_event;

pub use change::{ChangeNotice, ChangeOp, ChangeTopic, RowFilter, WatchedTable};
pub use domain_event::DomainEvent;
