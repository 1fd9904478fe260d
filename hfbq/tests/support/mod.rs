#![allow(dead_code)]

pub mod fakes;
pub mod google;
pub mod snapshots;
