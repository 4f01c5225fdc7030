pub mod policy;

pub use policy::FailureBudget;
