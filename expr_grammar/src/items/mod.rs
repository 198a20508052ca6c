//! LR(1) item-set construction

pub mod analysis;
pub mod item;
pub mod set;

pub use analysis::GrammarAnalysis;
pub use item::ConfiguratingItem;
pub use set::ConfiguratingSet;
