pub mod share_sweep;

pub use share_sweep::ShareSweepWorker;
