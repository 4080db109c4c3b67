pub mod commands;
pub mod pcr;
pub mod run;
