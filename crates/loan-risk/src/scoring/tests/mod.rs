mod common;
mod trainer;
