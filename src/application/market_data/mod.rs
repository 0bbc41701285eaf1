// Technical indicator series over daily data
pub mod indicators;
