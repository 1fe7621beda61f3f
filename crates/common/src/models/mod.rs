pub mod dividend;

pub use dividend::{DATE_FORMAT, DividendObservation, DividendRecord, RecordError, SymbolState};
