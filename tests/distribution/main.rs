#![allow(clippy::float_cmp)]

mod categorical;
mod custom;
mod float;
