mod common;

mod facade;
mod qualification;
mod schema;
mod service;
mod underwriting;
