// Draft tracking: pick records, the ledger and the controlled-team roster.

pub mod ledger;
pub mod pick;
pub mod roster;
